//! Relation resolution
//!
//! Computes inheritance, aggregation and function-return edges for a built
//! model. Generic member types are decomposed breadth-first: a single type
//! argument is passed through, two or more fan out from a diamond node.

use std::collections::VecDeque;

use anyhow::Result;
use tracing::{debug, span, trace, Level};

use super::graph::{RelationEdge, RelationGraph, RelationKind};
use super::model::{DiagramModel, Entity};
use crate::core::{canonical_alias, diamond_alias, DiagramConfig, TypeRef};

/// One pending step of generic decomposition
struct Pending<'t> {
    type_ref: &'t TypeRef,
    anchor: String,
    /// Reached through a container
    wrapped: bool,
    slot: Option<usize>,
}

/// Resolves relation edges between the entities of a model
pub struct RelationResolver<'a> {
    config: &'a DiagramConfig,
}

impl<'a> RelationResolver<'a> {
    pub fn new(config: &'a DiagramConfig) -> Self {
        Self { config }
    }

    /// Replace the model's relation graph with freshly resolved edges
    pub fn resolve(&self, model: &mut DiagramModel) -> Result<()> {
        let resolve_span = span!(
            Level::INFO,
            "resolve_relations",
            entities = model.entity_count()
        );
        let _enter = resolve_span.enter();

        let mut graph = RelationGraph::new();
        for entity in model.entities() {
            if self.config.show_inheritance {
                self.inheritance(model, entity, &mut graph);
            }
            if self.config.show_property_relations {
                for field in &entity.attributes {
                    self.member_relations(
                        model,
                        entity,
                        &field.name,
                        &field.type_ref,
                        RelationKind::Aggregation,
                        &mut graph,
                    );
                }
            }
            if self.config.show_function_relations {
                for method in &entity.methods {
                    self.member_relations(
                        model,
                        entity,
                        &method.name,
                        &method.return_type,
                        RelationKind::FunctionReturn,
                        &mut graph,
                    );
                }
            }
        }
        debug!(
            edges = graph.edge_count(),
            diamonds = graph.diamond_count(),
            "Relations resolved"
        );

        if let Some(max) = self.config.max_relations_per_vertex {
            graph.cap_out_degree(max);
        }

        model.set_graph(graph);
        Ok(())
    }

    fn inheritance(&self, model: &DiagramModel, entity: &Entity, graph: &mut RelationGraph) {
        for supertype in &entity.supertypes {
            let Some(name) = supertype.name.as_deref() else {
                continue;
            };
            if self.config.ignored_supertypes.iter().any(|s| s == name) {
                continue;
            }

            let target = match model.entity(name) {
                Some(target) => target.alias.clone(),
                None if self.config.show_hidden_supertypes && model.is_known_declaration(name) => {
                    trace!(entity = %entity.unique_id, supertype = name, "Keeping edge to hidden supertype");
                    canonical_alias(name)
                }
                None => {
                    trace!(entity = %entity.unique_id, supertype = name, "Supertype outside the diagram");
                    continue;
                }
            };
            graph.add_edge(RelationEdge::new(&entity.alias, target, RelationKind::Inheritance));
        }
    }

    fn member_relations(
        &self,
        model: &DiagramModel,
        owner: &Entity,
        member: &str,
        member_type: &TypeRef,
        kind: RelationKind,
        graph: &mut RelationGraph,
    ) {
        if member_type.arguments.is_empty() {
            if let Some(target) = target_entity(model, member_type) {
                graph.add_edge(RelationEdge::new(&owner.alias, &target.alias, kind).with_label(member));
            }
            return;
        }
        if !self.config.show_indirect_relations {
            return;
        }

        let mut local = RelationGraph::new();
        let mut queue = VecDeque::new();
        queue.push_back(Pending {
            type_ref: member_type,
            anchor: owner.alias.clone(),
            wrapped: false,
            slot: None,
        });

        while let Some(step) = queue.pop_front() {
            let from_owner = step.anchor == owner.alias;
            match step.type_ref.arguments.as_slice() {
                [] => {
                    let Some(target) = target_entity(model, step.type_ref) else {
                        continue;
                    };
                    let edge_kind = if step.wrapped { kind.indirect() } else { kind };
                    local.add_edge(edge(&step, &target.alias, edge_kind, from_owner.then_some(member)));
                }
                [argument] => queue.push_back(Pending {
                    type_ref: argument,
                    anchor: step.anchor,
                    wrapped: true,
                    slot: step.slot,
                }),
                arguments => {
                    let diamond = diamond_alias(
                        &owner.unique_id,
                        member,
                        &step.type_ref.qualified_display(),
                    );
                    local.add_diamond(diamond.clone());
                    local.add_edge(edge(&step, &diamond, kind.indirect(), from_owner.then_some(member)));
                    for (slot, argument) in arguments.iter().enumerate() {
                        queue.push_back(Pending {
                            type_ref: argument,
                            anchor: diamond.clone(),
                            wrapped: true,
                            slot: Some(slot),
                        });
                    }
                }
            }
        }

        local.prune_diamonds();
        trace!(
            owner = %owner.unique_id,
            member,
            edges = local.edge_count(),
            diamonds = local.diamond_count(),
            "Decomposed generic member type"
        );
        for diamond in local.diamonds() {
            graph.add_diamond(diamond.clone());
        }
        for edge in local.edges() {
            graph.add_edge(edge.clone());
        }
    }
}

fn edge(step: &Pending<'_>, to: &str, kind: RelationKind, label: Option<&str>) -> RelationEdge {
    let mut edge = RelationEdge::new(step.anchor.clone(), to, kind);
    if let Some(label) = label {
        edge = edge.with_label(label);
    }
    if let Some(slot) = step.slot {
        edge = edge.with_slot(slot);
    }
    edge
}

/// The rendered entity (regular or shell) a type points at
fn target_entity<'m>(model: &'m DiagramModel, type_ref: &TypeRef) -> Option<&'m Entity> {
    type_ref.name.as_deref().and_then(|name| model.entity(name))
}
