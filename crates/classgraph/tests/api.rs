//! End-to-end tests for the public generation API
//!
//! Each test builds a declaration tree, runs the whole pipeline and checks
//! the model or the rendered PlantUML.

use classgraph::diagram::RelationKind;
use classgraph::prelude::*;

fn class(name: &str, package: &str) -> Declaration {
    Declaration::new(DeclarationKind::Class, name, package)
}

fn list_of(element: &str) -> TypeRef {
    TypeRef::named("kotlin.collections.List").with_argument(TypeRef::named(element))
}

// =============================================================================
// Generic decomposition
// =============================================================================

#[test]
fn test_pair_field_produces_one_diamond() {
    let pair = TypeRef::named("kotlin.Pair")
        .with_argument(TypeRef::named("p.Text"))
        .with_argument(TypeRef::named("p.Text"));
    let tree = DeclarationTree::new()
        .with_declaration(class("p.Box", "p").with_field(FieldDecl::new("pair", pair)))
        .with_declaration(class("p.Text", "p"));
    let generator = Generator::default();

    let model = generator.build_model(&tree).unwrap();
    let diamond = "p_Box_pair_kotlin_Pair_p_Text__p_Text";
    assert!(model.graph().is_diamond(diamond));
    assert_eq!(model.graph().out_edges(diamond).len(), 2);
    assert!(model
        .graph()
        .out_edges(diamond)
        .iter()
        .all(|e| e.to == "p_Text"));

    let output = generator.render_model(&model).unwrap();
    assert!(output.contains(&format!("<> {}\n", diamond)));
    assert!(output.contains(&format!("p_Box o.. {} : pair\n", diamond)));
    assert_eq!(output.matches(&format!("{} o.. p_Text", diamond)).count(), 1);
}

#[test]
fn test_list_field_single_edge_without_diamond() {
    let tree = DeclarationTree::new()
        .with_declaration(class("p.Box", "p").with_field(FieldDecl::new("items", list_of("p.Item"))))
        .with_declaration(class("p.Item", "p"));

    let model = Generator::default().build_model(&tree).unwrap();
    let edges = model.graph().out_edges("p_Box");
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].to, "p_Item");
    assert_eq!(edges[0].kind, RelationKind::IndirectAggregation);
    assert_eq!(model.graph().diamond_count(), 0);
}

#[test]
fn test_function_return_relations() {
    let tree = DeclarationTree::new()
        .with_declaration(
            class("p.Repo", "p")
                .with_function(FunctionDecl::new("find", TypeRef::named("p.Item").with_nullable(true)))
                .with_function(FunctionDecl::new("all", list_of("p.Item"))),
        )
        .with_declaration(class("p.Item", "p"));

    let output = classgraph::generate(&tree, &DiagramConfig::default()).unwrap();
    assert!(output.contains("p_Repo ..> p_Item : find\n"));
    assert!(output.contains("p_Repo ...> p_Item : all\n"));
    assert!(output.contains("+find() : Item?"));
}

// =============================================================================
// Filtering
// =============================================================================

#[test]
fn test_excluded_package_and_subpackages() {
    let tree = DeclarationTree::new()
        .with_declaration(class("com.inactive.Old", "com.inactive"))
        .with_declaration(class("com.inactive.sub.Older", "com.inactive.sub"))
        .with_declaration(class("com.inactiveish.Near", "com.inactiveish"))
        .with_declaration(class("com.active.Current", "com.active"));
    let config = DiagramConfig {
        excluded_packages: vec!["com.inactive".to_string()],
        ..DiagramConfig::default()
    };

    let model = Generator::new(config).build_model(&tree).unwrap();
    let ids: Vec<&str> = model.entities().iter().map(|e| e.unique_id.as_str()).collect();
    assert_eq!(ids, vec!["com.active.Current"]);
}

#[test]
fn test_user_written_copy_and_component_are_kept() {
    let tree = DeclarationTree::new().with_declaration(
        class("p.Doc", "p")
            .with_function(FunctionDecl::new("copy", TypeRef::named("p.Doc")))
            .with_function(FunctionDecl::new("component1", TypeRef::named("kotlin.String")))
            .with_function(FunctionDecl::new("hashCode", TypeRef::named("kotlin.Int"))),
    );

    let output = classgraph::generate(&tree, &DiagramConfig::default()).unwrap();
    assert!(output.contains("+copy() : Doc"));
    assert!(output.contains("+component1() : String"));
    assert!(!output.contains("hashCode"));
}

#[test]
fn test_companion_extension_renders_on_owner() {
    let tree = DeclarationTree::new()
        .with_declaration(
            class("p.Config", "p").with_child(
                Declaration::new(DeclarationKind::Object, "p.Config.Companion", "p")
                    .with_modifier(Modifier::Companion),
            ),
        )
        .with_function(
            FunctionDecl::new("create", TypeRef::named("p.Config"))
                .with_receiver(TypeRef::named("p.Config.Companion")),
        );

    let output = classgraph::generate(&tree, &DiagramConfig::default()).unwrap();
    assert!(output.contains("+{static} <<ext>> create() : Config"));
    assert!(!output.contains("p_Config_Companion"));
    assert!(!output.contains("<<external>>"));
}

#[test]
fn test_public_only_toggles() {
    let tree = DeclarationTree::new()
        .with_declaration(
            class("p.Account", "p")
                .with_field(FieldDecl::new("id", TypeRef::named("kotlin.Long")))
                .with_field(
                    FieldDecl::new("balance", TypeRef::named("kotlin.Long"))
                        .with_visibility(Visibility::Private),
                )
                .with_function(
                    FunctionDecl::new("audit", TypeRef::named("kotlin.Unit"))
                        .with_visibility(Visibility::Internal),
                )
                .with_function(FunctionDecl::new("close", TypeRef::named("kotlin.Unit"))),
        )
        .with_declaration(class("p.Ledger", "p").with_visibility(Visibility::Internal));
    let config = DiagramConfig {
        classes: VisibilityToggles::public_only(),
        fields: VisibilityToggles::public_only(),
        methods: VisibilityToggles::public_only(),
        ..DiagramConfig::default()
    };

    let output = classgraph::generate(&tree, &config).unwrap();
    assert!(output.contains("+id : Long"));
    assert!(output.contains("+close() : Unit"));
    assert!(!output.contains("balance"));
    assert!(!output.contains("audit"));
    assert!(!output.contains("Ledger"));
}

// =============================================================================
// Output stability
// =============================================================================

#[test]
fn test_rendering_is_idempotent() {
    let tree = DeclarationTree::new()
        .with_declaration(
            class("p.Box", "p")
                .with_field(FieldDecl::new("items", list_of("p.Item")))
                .with_field(FieldDecl::new(
                    "index",
                    TypeRef::named("kotlin.collections.Map")
                        .with_argument(TypeRef::named("p.Key"))
                        .with_argument(TypeRef::named("p.Item")),
                )),
        )
        .with_declaration(class("p.Item", "p"))
        .with_declaration(class("p.Key", "p"));
    let generator = Generator::default();

    let model = generator.build_model(&tree).unwrap();
    let first = generator.render_model(&model).unwrap();
    let second = generator.render_model(&model).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, generator.generate(&tree).unwrap());
}

// =============================================================================
// Kotlin idioms
// =============================================================================

#[test]
fn test_sealed_hierarchy() {
    let tree = DeclarationTree::new().with_declaration(
        Declaration::new(DeclarationKind::Class, "p.Result", "p")
            .with_modifier(Modifier::Sealed)
            .with_modifier(Modifier::Abstract)
            .with_child(
                Declaration::new(DeclarationKind::Class, "p.Result.Success", "p")
                    .with_modifier(Modifier::Data)
                    .with_supertype(TypeRef::named("p.Result")),
            )
            .with_child(
                Declaration::new(DeclarationKind::Object, "p.Result.Loading", "p")
                    .with_supertype(TypeRef::named("p.Result")),
            ),
    );

    let output = classgraph::generate(&tree, &DiagramConfig::default()).unwrap();
    assert!(output.contains("abstract class \"Result\" as p_Result <<Sealed>> {"));
    assert!(output.contains("class \"Result.Success\" as p_Result_Success <<data>> {"));
    assert!(output.contains("class \"Result.Loading\" as p_Result_Loading <<object>> {"));
    assert!(output.contains("p_Result_Success --|> p_Result\n"));
    assert!(output.contains("p_Result_Loading --|> p_Result\n"));
}

#[test]
fn test_string_extensions_become_shell() {
    let tree = DeclarationTree::new()
        .with_declaration(class("p.Text", "p"))
        .with_function(
            FunctionDecl::new("slugify", TypeRef::named("kotlin.String"))
                .with_receiver(TypeRef::named("kotlin.String")),
        )
        .with_field(
            FieldDecl::new("asText", TypeRef::named("p.Text"))
                .with_receiver(TypeRef::named("kotlin.String")),
        );

    let model = Generator::default().build_model(&tree).unwrap();
    let shell = model.entity("kotlin.String").unwrap();
    assert!(shell.is_shell);
    assert_eq!(shell.attributes.len(), 1);
    assert_eq!(shell.methods.len(), 1);
    assert_eq!(model.entities().last().unwrap().unique_id, "kotlin.String");

    let output = Generator::default().render_model(&model).unwrap();
    assert!(output.contains(
        "class \"String\" as kotlin_String <<external>> {\n  ...\n  +<<ext>> asText : Text\n  +<<ext>> slugify() : String\n}"
    ));
    assert!(output.contains("kotlin_String o-- p_Text : asText\n"));
}

#[test]
fn test_companion_and_enum() {
    let tree = DeclarationTree::new().with_declaration(
        Declaration::new(DeclarationKind::Enum, "p.Level", "p")
            .with_supertype(TypeRef::named("kotlin.Enum").with_argument(TypeRef::named("p.Level")))
            .with_child(Declaration::new(DeclarationKind::EnumEntry, "p.Level.LOW", "p"))
            .with_child(Declaration::new(DeclarationKind::EnumEntry, "p.Level.HIGH", "p"))
            .with_child(
                Declaration::new(DeclarationKind::Object, "p.Level.Companion", "p")
                    .with_modifier(Modifier::Companion)
                    .with_function(
                        FunctionDecl::new("parse", TypeRef::named("p.Level"))
                            .with_parameter("raw", TypeRef::named("kotlin.String")),
                    ),
            ),
    );

    let output = classgraph::generate(&tree, &DiagramConfig::default()).unwrap();
    assert!(output.contains(
        "enum \"Level\" as p_Level {\n  LOW\n  HIGH\n  +{static} parse(String) : Level\n}"
    ));
    assert!(!output.contains("Companion"));
    assert!(!output.contains("--|>"));
}

#[test]
fn test_json_round_trip_through_generate() {
    let input = r#"{
        "declarations": [
            { "kind": "interface", "qualifiedName": "app.Shape", "package": "app" },
            { "kind": "class", "qualifiedName": "app.Circle", "package": "app",
              "supertypes": [ { "name": "app.Shape" } ],
              "fields": [ { "name": "radius", "type": { "name": "kotlin.Double" } },
                          { "name": "secret", "type": {}, "visibility": "private" } ] }
        ]
    }"#;
    let config = DiagramConfig::from_json_str(
        r#"{ "showPackages": true, "title": "Shapes", "fields": { "private": true } }"#,
    )
    .unwrap();

    let output = classgraph::generate_from_json(input, &config).unwrap();
    assert!(output.starts_with("@startuml\ntitle Shapes\npackage \"app\" {\n"));
    assert!(output.contains("  interface \"Shape\" as app_Shape {\n  }\n"));
    assert!(output.contains("    -secret : Unresolved\n"));
    assert!(output.contains("app_Circle --|> app_Shape\n"));
}
