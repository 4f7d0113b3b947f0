//! PlantUML renderer
//!
//! Serializes a resolved [`DiagramModel`] into PlantUML class-diagram text.
//! Output depends only on the model and the configuration, so rendering the
//! same model twice yields identical bytes.

use anyhow::Result;
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, span, Level};

use super::graph::RelationKind;
use super::model::{Decoration, DiagramModel, Entity, EntityKind, Field, MemberModifier, Method};
use crate::core::{DiagramConfig, DiagramError, Renderer, Visibility};

const INDENT: &str = "  ";

/// Renders diagram models as PlantUML
pub struct PlantUmlRenderer<'a> {
    config: &'a DiagramConfig,
}

impl<'a> PlantUmlRenderer<'a> {
    pub fn new(config: &'a DiagramConfig) -> Self {
        Self { config }
    }

    /// Render the full `@startuml ... @enduml` document
    pub fn render_model(&self, model: &DiagramModel) -> Result<String> {
        let render_span = span!(
            Level::INFO,
            "render_diagram",
            entities = model.entity_count(),
            edges = model.graph().edge_count()
        );
        let _enter = render_span.enter();

        check_endpoints(model)?;

        let mut out = String::from("@startuml\n");
        if let Some(title) = &self.config.title {
            out.push_str(&format!("title {}\n", title));
        }
        if let Some(prefix) = &self.config.prefix {
            push_verbatim(&mut out, prefix);
        }

        self.render_entities(model, &mut out);

        let graph = model.graph();
        let mut lines: IndexSet<String> = IndexSet::new();
        for edge in graph.edges() {
            lines.insert(edge.render_line());
        }
        if graph.diamond_count() > 0 || !lines.is_empty() {
            out.push('\n');
        }
        for diamond in graph.diamonds() {
            out.push_str(&format!("<> {}\n", diamond));
        }
        for line in &lines {
            out.push_str(line);
            out.push('\n');
        }
        debug!(
            edges = graph.edge_count(),
            lines = lines.len(),
            "Collapsed relation lines"
        );

        if let Some(postfix) = &self.config.postfix {
            push_verbatim(&mut out, postfix);
        }
        out.push_str("@enduml\n");

        debug!(bytes = out.len(), "Rendered diagram");
        Ok(out)
    }

    fn render_entities(&self, model: &DiagramModel, out: &mut String) {
        if !self.config.show_packages {
            for entity in model.entities() {
                self.render_entity(entity, "", out);
            }
            return;
        }

        let mut packages: IndexMap<&str, Vec<&Entity>> = IndexMap::new();
        for entity in model.entities() {
            packages.entry(entity.package.as_str()).or_default().push(entity);
        }

        for (package, entities) in packages {
            let block_name = if package.is_empty() {
                self.config.empty_package_name.as_deref()
            } else {
                Some(package)
            };
            match block_name {
                Some(name) => {
                    out.push_str(&format!("package \"{}\" {{\n", name));
                    for entity in entities {
                        self.render_entity(entity, INDENT, out);
                    }
                    out.push_str("}\n");
                }
                None => {
                    for entity in entities {
                        self.render_entity(entity, "", out);
                    }
                }
            }
        }
    }

    fn render_entity(&self, entity: &Entity, indent: &str, out: &mut String) {
        out.push_str(&format!(
            "{}{} \"{}\" as {}",
            indent,
            keyword(entity),
            entity.display_name,
            entity.alias
        ));
        let stereotypes = stereotypes(entity);
        if !stereotypes.is_empty() {
            out.push(' ');
            out.push_str(&stereotypes.join(" "));
        }
        out.push_str(" {\n");

        for entry in entity.enum_entries() {
            out.push_str(&format!("{}{}{}\n", indent, INDENT, entry));
        }
        if let Some(aliased) = entity.aliased_type() {
            out.push_str(&format!("{}{}= {}\n", indent, INDENT, aliased.display()));
        }
        if entity.is_shell {
            out.push_str(&format!("{}{}...\n", indent, INDENT));
        }
        for field in &entity.attributes {
            out.push_str(&format!("{}{}{}\n", indent, INDENT, self.field_line(field)));
        }
        for method in &entity.methods {
            out.push_str(&format!("{}{}{}\n", indent, INDENT, self.method_line(method)));
        }

        out.push_str(&format!("{}}}\n", indent));
    }

    /// `+{static} const NAME : Type`
    pub fn field_line(&self, field: &Field) -> String {
        let mut line = self.visibility_prefix(field.visibility);
        self.push_modifiers(&mut line, &field.modifiers);
        line.push_str(&format!("{} : {}", field.name, field.type_ref.display()));
        line
    }

    /// `+suspend load(String, Int) : Item`
    pub fn method_line(&self, method: &Method) -> String {
        let mut line = self.visibility_prefix(method.visibility);
        self.push_modifiers(&mut line, &method.modifiers);
        let parameters: Vec<String> = method.parameters.iter().map(|p| p.display()).collect();
        line.push_str(&format!(
            "{}({}) : {}",
            method.name,
            parameters.join(", "),
            method.return_type.display()
        ));
        line
    }

    fn visibility_prefix(&self, visibility: Visibility) -> String {
        if self.config.show_visibility_modifiers {
            visibility.symbol().to_string()
        } else {
            String::new()
        }
    }

    fn push_modifiers(&self, line: &mut String, modifiers: &[MemberModifier]) {
        for modifier in modifiers {
            let token = match modifier {
                MemberModifier::Static => "{static}",
                MemberModifier::Abstract => "{abstract}",
                MemberModifier::Const => "const",
                MemberModifier::Suspend => "suspend",
                MemberModifier::Extension if self.config.mark_extension_members => "<<ext>>",
                MemberModifier::Extension => continue,
            };
            line.push_str(token);
            line.push(' ');
        }
    }
}

impl Renderer<DiagramModel> for PlantUmlRenderer<'_> {
    type Output = String;

    fn render(&self, database: &DiagramModel) -> Result<String> {
        self.render_model(database)
    }

    fn name(&self) -> &'static str {
        "plantuml"
    }

    fn format(&self) -> &'static str {
        "puml"
    }
}

fn keyword(entity: &Entity) -> &'static str {
    match entity.kind {
        EntityKind::Class if entity.has_decoration(&Decoration::Abstract) => "abstract class",
        EntityKind::Class | EntityKind::Singleton | EntityKind::TypeAlias => "class",
        EntityKind::Interface => "interface",
        EntityKind::Enum => "enum",
    }
}

fn stereotypes(entity: &Entity) -> Vec<&'static str> {
    let mut tags = Vec::new();
    if entity.has_decoration(&Decoration::Sealed) {
        tags.push("<<Sealed>>");
    }
    if entity.has_decoration(&Decoration::Data) {
        tags.push("<<data>>");
    }
    if entity.has_decoration(&Decoration::Value) {
        tags.push("<<value>>");
    }
    if entity.has_decoration(&Decoration::Object) {
        tags.push("<<object>>");
    }
    if entity.kind == EntityKind::TypeAlias {
        tags.push("<<typealias>>");
    }
    if entity.has_decoration(&Decoration::External) {
        tags.push("<<external>>");
    }
    tags
}

fn push_verbatim(out: &mut String, text: &str) {
    out.push_str(text);
    if !text.ends_with('\n') {
        out.push('\n');
    }
}

/// Every edge must leave an entity or diamond; only inheritance may point at
/// a vertex that is not drawn
fn check_endpoints(model: &DiagramModel) -> Result<(), DiagramError> {
    let graph = model.graph();
    let is_vertex = |alias: &str| model.entity_by_alias(alias).is_some() || graph.is_diamond(alias);

    for edge in graph.edges() {
        if !is_vertex(&edge.from) {
            return Err(DiagramError::render_error(format!(
                "relation starts at unknown vertex '{}'",
                edge.from
            )));
        }
        if edge.kind != RelationKind::Inheritance && !is_vertex(&edge.to) {
            return Err(DiagramError::render_error(format!(
                "relation from '{}' points at unknown vertex '{}'",
                edge.from, edge.to
            )));
        }
    }
    Ok(())
}
