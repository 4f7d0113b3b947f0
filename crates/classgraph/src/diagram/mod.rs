//! Class diagram model, relation resolution and PlantUML output
//!
//! The stages run in order: [`ModelBuilder`] turns declarations into
//! entities, [`RelationResolver`] fills the [`RelationGraph`], and
//! [`PlantUmlRenderer`] serializes the result.

mod builder;
mod graph;
mod model;
mod relations;
mod renderer;

pub use builder::ModelBuilder;
pub use graph::{RelationEdge, RelationGraph, RelationKind};
pub use model::{Decoration, DiagramModel, Entity, EntityKind, Field, MemberModifier, Method};
pub use relations::RelationResolver;
pub use renderer::PlantUmlRenderer;
