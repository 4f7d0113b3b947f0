//! Diagram model
//!
//! Entities (one per rendered declaration, plus shells) and the relation
//! graph between them.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use tracing::{debug, trace};

use super::graph::{RelationEdge, RelationGraph};
use crate::core::{canonical_alias, Database, DiagramError, TypeRef, Visibility};

/// Entity variant, fixed by the declaration kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Class,
    Interface,
    Enum,
    Singleton,
    TypeAlias,
}

/// Stereotype and body decorations attached to an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoration {
    Sealed,
    Data,
    Value,
    Object,
    Abstract,
    /// Target of a type alias
    AliasOf(TypeRef),
    /// Entry names of an enum, in declaration order
    EnumEntries(Vec<String>),
    /// Type outside the analyzed set
    External,
}

/// Member modifiers that survive into the diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberModifier {
    Static,
    Const,
    Suspend,
    Abstract,
    Extension,
}

/// A rendered property
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub type_ref: TypeRef,
    pub visibility: Visibility,
    pub modifiers: Vec<MemberModifier>,
}

/// A rendered function
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub parameters: Vec<TypeRef>,
    pub return_type: TypeRef,
    pub visibility: Visibility,
    pub modifiers: Vec<MemberModifier>,
}

impl Field {
    pub fn has_modifier(&self, modifier: MemberModifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

impl Method {
    pub fn has_modifier(&self, modifier: MemberModifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

/// A diagram node representing one declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    /// Fully-qualified source name
    pub unique_id: String,
    pub alias: String,
    pub display_name: String,
    pub package: String,
    pub attributes: Vec<Field>,
    pub methods: Vec<Method>,
    pub decorations: Vec<Decoration>,
    pub supertypes: Vec<TypeRef>,
    pub is_shell: bool,
}

impl Entity {
    pub fn new(
        kind: EntityKind,
        unique_id: impl Into<String>,
        display_name: impl Into<String>,
        package: impl Into<String>,
    ) -> Self {
        let unique_id = unique_id.into();
        Self {
            kind,
            alias: canonical_alias(&unique_id),
            unique_id,
            display_name: display_name.into(),
            package: package.into(),
            attributes: Vec::new(),
            methods: Vec::new(),
            decorations: Vec::new(),
            supertypes: Vec::new(),
            is_shell: false,
        }
    }

    /// Stub entity for a type outside the analyzed set
    pub fn shell(
        unique_id: impl Into<String>,
        display_name: impl Into<String>,
        package: impl Into<String>,
    ) -> Self {
        let mut entity = Self::new(EntityKind::Class, unique_id, display_name, package);
        entity.decorations.push(Decoration::External);
        entity.is_shell = true;
        entity
    }

    pub fn has_decoration(&self, decoration: &Decoration) -> bool {
        self.decorations.contains(decoration)
    }

    pub fn enum_entries(&self) -> &[String] {
        self.decorations
            .iter()
            .find_map(|d| match d {
                Decoration::EnumEntries(entries) => Some(entries.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn aliased_type(&self) -> Option<&TypeRef> {
        self.decorations.iter().find_map(|d| match d {
            Decoration::AliasOf(target) => Some(target),
            _ => None,
        })
    }
}

/// Entities plus relations for one run
#[derive(Debug, Clone, Default)]
pub struct DiagramModel {
    entities: Vec<Entity>,
    by_id: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
    /// Every valid declaration in the source, rendered or not
    known_declarations: HashSet<String>,
    graph: RelationGraph,
}

impl DiagramModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity
    ///
    /// Returns `Ok(false)` when an entity with the same id already exists and
    /// fails with [`DiagramError::AliasCollision`] when a different id
    /// canonicalizes to the same alias.
    pub fn add_entity(&mut self, entity: Entity) -> Result<bool> {
        if self.by_id.contains_key(&entity.unique_id) {
            trace!(entity = %entity.unique_id, "Entity already present, keeping the first");
            return Ok(false);
        }
        if let Some(&existing) = self.by_alias.get(&entity.alias) {
            let first = &self.entities[existing].unique_id;
            return Err(
                DiagramError::alias_collision(&entity.alias, first, &entity.unique_id).into(),
            );
        }

        trace!(
            entity = %entity.unique_id,
            alias = %entity.alias,
            kind = ?entity.kind,
            shell = entity.is_shell,
            "Adding entity to model"
        );
        let index = self.entities.len();
        self.by_id.insert(entity.unique_id.clone(), index);
        self.by_alias.insert(entity.alias.clone(), index);
        self.entities.push(entity);
        debug!(entity_count = self.entities.len(), "Entity added");
        Ok(true)
    }

    pub fn entity(&self, unique_id: &str) -> Option<&Entity> {
        self.by_id.get(unique_id).map(|&i| &self.entities[i])
    }

    pub fn entity_by_alias(&self, alias: &str) -> Option<&Entity> {
        self.by_alias.get(alias).map(|&i| &self.entities[i])
    }

    /// Entities in traversal order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn register_known_declaration(&mut self, qualified_name: impl Into<String>) {
        self.known_declarations.insert(qualified_name.into());
    }

    pub fn is_known_declaration(&self, qualified_name: &str) -> bool {
        self.known_declarations.contains(qualified_name)
    }

    pub fn graph(&self) -> &RelationGraph {
        &self.graph
    }

    pub fn set_graph(&mut self, graph: RelationGraph) {
        self.graph = graph;
    }
}

impl Database for DiagramModel {
    type Node = Entity;
    type Edge = RelationEdge;

    fn add_node(&mut self, node: Entity) -> Result<()> {
        self.add_entity(node).map(|_| ())
    }

    fn add_edge(&mut self, edge: RelationEdge) -> Result<()> {
        self.graph.add_edge(edge);
        Ok(())
    }

    fn get_node(&self, id: &str) -> Option<&Entity> {
        self.entity(id)
    }

    fn nodes(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    fn edges(&self) -> impl Iterator<Item = &RelationEdge> {
        self.graph.edges()
    }

    fn node_count(&self) -> usize {
        self.entities.len()
    }

    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
