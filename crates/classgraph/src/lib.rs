//! Classgraph - Generate PlantUML class diagrams from declaration trees
//!
//! A library that turns a tree of type declarations (classes, interfaces,
//! enums, objects and type aliases with their members and supertypes) into
//! PlantUML class-diagram text.
//!
//! # Quick Start
//!
//! ```rust
//! use classgraph::generate_from_json;
//!
//! let input = r#"{
//!   "declarations": [
//!     { "kind": "class", "qualifiedName": "shop.Cart", "package": "shop",
//!       "fields": [ { "name": "items",
//!                     "type": { "name": "kotlin.collections.List",
//!                               "arguments": [ { "name": "shop.Item" } ] } } ] },
//!     { "kind": "class", "qualifiedName": "shop.Item", "package": "shop" }
//!   ]
//! }"#;
//!
//! let diagram = generate_from_json(input, &Default::default()).unwrap();
//! assert!(diagram.contains("shop_Cart o.. shop_Item : items"));
//! ```
//!
//! # Advanced Usage
//!
//! The stages can be driven one at a time:
//!
//! ```rust
//! use classgraph::prelude::*;
//!
//! let tree = DeclarationTree::new()
//!     .with_declaration(Declaration::new(DeclarationKind::Interface, "shop.Priced", "shop"))
//!     .with_declaration(
//!         Declaration::new(DeclarationKind::Class, "shop.Item", "shop")
//!             .with_supertype(TypeRef::named("shop.Priced")),
//!     );
//! let config = DiagramConfig::default();
//!
//! // Build entities, then resolve their relations
//! let mut model = ModelBuilder::new(&config).build(&tree).unwrap();
//! RelationResolver::new(&config).resolve(&mut model).unwrap();
//! assert_eq!(model.entity_count(), 2);
//!
//! // Render to PlantUML
//! let text = PlantUmlRenderer::new(&config).render(&model).unwrap();
//! assert!(text.contains("shop_Item --|> shop_Priced"));
//! ```

pub mod core;
pub mod diagram;
pub mod generator;

pub use crate::core::*;
pub use crate::generator::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Database, Declaration, DeclarationKind, DeclarationSource, DeclarationTree,
        DiagramConfig, DiagramError, FieldDecl, FunctionDecl, Modifier, Renderer, TypeRef,
        Visibility, VisibilityToggles,
    };
    pub use crate::diagram::{
        DiagramModel, EntityKind, ModelBuilder, PlantUmlRenderer, RelationKind, RelationResolver,
    };
    pub use crate::generator::Generator;
}

/// Generate PlantUML text for a declaration source
///
/// # Example
/// ```rust
/// use classgraph::{generate, Declaration, DeclarationKind, DeclarationTree, DiagramConfig};
///
/// let tree = DeclarationTree::new()
///     .with_declaration(Declaration::new(DeclarationKind::Enum, "app.Color", "app"));
/// let text = generate(&tree, &DiagramConfig::default()).unwrap();
/// assert!(text.contains("enum \"Color\" as app_Color {"));
/// ```
pub fn generate<S: DeclarationSource + ?Sized>(
    source: &S,
    config: &DiagramConfig,
) -> anyhow::Result<String> {
    Generator::new(config.clone()).generate(source)
}

/// Parse a JSON declaration tree and generate PlantUML text for it
pub fn generate_from_json(input: &str, config: &DiagramConfig) -> anyhow::Result<String> {
    let tree = DeclarationTree::from_json_str(input)?;
    generate(&tree, config)
}
