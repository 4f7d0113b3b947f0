//! Relation graph
//!
//! Stores relation edges and synthetic diamond nodes in insertion order.
//! The edge set is deduplicated structurally and never holds a self-edge.

use indexmap::IndexSet;
use tracing::{debug, trace};

/// Kind of relation between two diagram vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// Subtype to supertype
    Inheritance,
    /// Owner holds a value of the target type
    Aggregation,
    /// Owner holds the target type through a container
    IndirectAggregation,
    /// Function returns a value of the target type
    FunctionReturn,
    /// Function returns the target type through a container
    IndirectFunctionReturn,
}

impl RelationKind {
    /// PlantUML arrow token
    pub fn arrow(self) -> &'static str {
        match self {
            RelationKind::Inheritance => "--|>",
            RelationKind::Aggregation => "o--",
            RelationKind::IndirectAggregation => "o..",
            RelationKind::FunctionReturn => "..>",
            RelationKind::IndirectFunctionReturn => "...>",
        }
    }

    /// The variant used once a container has been unwrapped
    pub fn indirect(self) -> Self {
        match self {
            RelationKind::Aggregation => RelationKind::IndirectAggregation,
            RelationKind::FunctionReturn => RelationKind::IndirectFunctionReturn,
            other => other,
        }
    }

    pub fn is_indirect(self) -> bool {
        matches!(
            self,
            RelationKind::IndirectAggregation | RelationKind::IndirectFunctionReturn
        )
    }

    /// Lower values survive a per-vertex cap first
    pub fn priority(self) -> u8 {
        match self {
            RelationKind::Inheritance => 0,
            RelationKind::Aggregation => 1,
            RelationKind::IndirectAggregation => 2,
            RelationKind::FunctionReturn => 3,
            RelationKind::IndirectFunctionReturn => 4,
        }
    }
}

/// A relation between two vertices, identified by alias
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationEdge {
    pub from: String,
    pub to: String,
    pub kind: RelationKind,
    pub label: Option<String>,
    /// Type-argument position for edges leaving a diamond
    pub slot: Option<usize>,
}

impl RelationEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            label: None,
            slot: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_slot(mut self, slot: usize) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn is_self_edge(&self) -> bool {
        self.from == self.to
    }

    /// The PlantUML line for this edge
    pub fn render_line(&self) -> String {
        match &self.label {
            Some(label) => format!("{} {} {} : {}", self.from, self.kind.arrow(), self.to, label),
            None => format!("{} {} {}", self.from, self.kind.arrow(), self.to),
        }
    }
}

/// Insertion-ordered set of relation edges and diamond nodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationGraph {
    edges: IndexSet<RelationEdge>,
    diamonds: IndexSet<String>,
}

impl RelationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edge; returns false for self-edges and duplicates
    pub fn add_edge(&mut self, edge: RelationEdge) -> bool {
        if edge.is_self_edge() {
            trace!(vertex = %edge.from, kind = ?edge.kind, "Dropping self-edge");
            return false;
        }
        self.edges.insert(edge)
    }

    /// Register a diamond node; returns false if already present
    pub fn add_diamond(&mut self, alias: impl Into<String>) -> bool {
        self.diamonds.insert(alias.into())
    }

    pub fn contains(&self, edge: &RelationEdge) -> bool {
        self.edges.contains(edge)
    }

    pub fn is_diamond(&self, alias: &str) -> bool {
        self.diamonds.contains(alias)
    }

    pub fn edges(&self) -> impl Iterator<Item = &RelationEdge> {
        self.edges.iter()
    }

    pub fn diamonds(&self) -> impl Iterator<Item = &String> {
        self.diamonds.iter()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn diamond_count(&self) -> usize {
        self.diamonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.diamonds.is_empty()
    }

    /// Number of edges leaving `vertex`
    pub fn out_degree(&self, vertex: &str) -> usize {
        self.edges.iter().filter(|e| e.from == vertex).count()
    }

    /// Number of edges entering `vertex`
    pub fn in_degree(&self, vertex: &str) -> usize {
        self.edges.iter().filter(|e| e.to == vertex).count()
    }

    pub fn out_edges(&self, vertex: &str) -> Vec<&RelationEdge> {
        self.edges.iter().filter(|e| e.from == vertex).collect()
    }

    pub fn in_edges(&self, vertex: &str) -> Vec<&RelationEdge> {
        self.edges.iter().filter(|e| e.to == vertex).collect()
    }

    /// Limit every vertex to `max` outgoing edges
    ///
    /// Edges are kept by kind priority, then insertion order. Diamonds that
    /// lose their incoming edge are removed with everything below them.
    /// Returns the number of edges removed.
    pub fn cap_out_degree(&mut self, max: usize) -> usize {
        let before = self.edges.len();

        let mut sources: IndexSet<&str> = IndexSet::new();
        for edge in &self.edges {
            sources.insert(edge.from.as_str());
        }

        let mut dropped: IndexSet<RelationEdge> = IndexSet::new();
        for source in sources {
            let mut outgoing: Vec<(usize, &RelationEdge)> = self
                .edges
                .iter()
                .enumerate()
                .filter(|(_, e)| e.from == source)
                .collect();
            if outgoing.len() <= max {
                continue;
            }
            outgoing.sort_by_key(|(index, e)| (e.kind.priority(), *index));
            for (_, edge) in outgoing.into_iter().skip(max) {
                trace!(from = %edge.from, to = %edge.to, kind = ?edge.kind, "Dropping edge over vertex cap");
                dropped.insert(edge.clone());
            }
        }

        self.edges.retain(|e| !dropped.contains(e));
        self.prune_diamonds();

        let removed = before - self.edges.len();
        debug!(max, removed, "Applied per-vertex relation cap");
        removed
    }

    /// Remove diamonds without incoming or outgoing edges, transitively
    pub fn prune_diamonds(&mut self) {
        loop {
            let dead: Vec<String> = self
                .diamonds
                .iter()
                .filter(|d| self.in_degree(d) == 0 || self.out_degree(d) == 0)
                .cloned()
                .collect();
            if dead.is_empty() {
                break;
            }
            for diamond in &dead {
                trace!(diamond = %diamond, "Pruning detached diamond");
                self.diamonds.shift_remove(diamond);
            }
            self.edges
                .retain(|e| !dead.contains(&e.from) && !dead.contains(&e.to));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_self_edges_and_duplicates() {
        let mut graph = RelationGraph::new();
        assert!(!graph.add_edge(RelationEdge::new("A", "A", RelationKind::Aggregation)));
        assert!(graph.add_edge(RelationEdge::new("A", "B", RelationKind::Aggregation).with_label("b")));
        assert!(!graph.add_edge(RelationEdge::new("A", "B", RelationKind::Aggregation).with_label("b")));
        assert!(graph.add_edge(RelationEdge::new("A", "B", RelationKind::Aggregation).with_label("c")));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_degrees_and_adjacency() {
        let mut graph = RelationGraph::new();
        graph.add_edge(RelationEdge::new("A", "B", RelationKind::Inheritance));
        graph.add_edge(RelationEdge::new("A", "C", RelationKind::FunctionReturn));
        graph.add_edge(RelationEdge::new("C", "B", RelationKind::Aggregation));

        assert_eq!(graph.out_degree("A"), 2);
        assert_eq!(graph.in_degree("B"), 2);
        assert_eq!(graph.in_degree("A"), 0);
        assert_eq!(graph.out_edges("C")[0].to, "B");
        assert_eq!(graph.in_edges("C")[0].from, "A");
        assert!(graph.contains(&RelationEdge::new("A", "B", RelationKind::Inheritance)));
    }

    #[test]
    fn test_render_line() {
        let edge = RelationEdge::new("p_Box", "p_Item", RelationKind::IndirectAggregation)
            .with_label("items");
        assert_eq!(edge.render_line(), "p_Box o.. p_Item : items");
        assert_eq!(
            RelationEdge::new("p_Dog", "p_Animal", RelationKind::Inheritance).render_line(),
            "p_Dog --|> p_Animal"
        );
    }

    #[test]
    fn test_cap_keeps_highest_priority() {
        let mut graph = RelationGraph::new();
        graph.add_edge(RelationEdge::new("A", "R", RelationKind::FunctionReturn));
        graph.add_edge(RelationEdge::new("A", "F", RelationKind::Aggregation));
        graph.add_edge(RelationEdge::new("A", "S", RelationKind::Inheritance));
        graph.add_edge(RelationEdge::new("B", "S", RelationKind::Inheritance));

        let removed = graph.cap_out_degree(2);
        assert_eq!(removed, 1);
        let kept: Vec<&str> = graph.out_edges("A").iter().map(|e| e.to.as_str()).collect();
        assert_eq!(kept, vec!["F", "S"]);
        assert_eq!(graph.out_degree("B"), 1);
    }

    #[test]
    fn test_cap_prunes_orphaned_diamonds() {
        let mut graph = RelationGraph::new();
        graph.add_diamond("D");
        graph.add_edge(RelationEdge::new("A", "S", RelationKind::Inheritance));
        graph.add_edge(RelationEdge::new("A", "D", RelationKind::IndirectAggregation));
        graph.add_edge(RelationEdge::new("D", "X", RelationKind::IndirectAggregation).with_slot(0));
        graph.add_edge(RelationEdge::new("D", "Y", RelationKind::IndirectAggregation).with_slot(1));

        graph.cap_out_degree(1);
        assert_eq!(graph.diamond_count(), 0);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges().next().unwrap().to, "S");
    }
}
