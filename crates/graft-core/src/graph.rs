//! # Graph Access
//!
//! The loader reads its configuration through the [`GraphQuery`] trait and
//! never mutates the store. The backing triple store belongs to the
//! embedding application; [`MemoryGraph`] is the deterministic in-memory
//! implementation used by tests, benches, and embedders without a store of
//! their own.
//!
//! Edge order matters to consumers (`setProperty` edges are applied in
//! listed order), so implementations must return edges in declaration
//! order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{Node, Term};
use crate::vocab;

// =============================================================================
// GRAPHQUERY TRAIT
// =============================================================================

/// Read interface over a graph of nodes connected by named relations.
///
/// Only [`GraphQuery::edges`] is required; the remaining queries default to
/// scans over it and exist so implementations can answer them without
/// materializing a `Vec`.
pub trait GraphQuery {
    /// All edges of the relation on the node, in declaration order.
    fn edges(&self, node: &Node, relation: &str) -> Vec<Term>;

    /// The first edge of the relation on the node.
    fn first_edge(&self, node: &Node, relation: &str) -> Option<Term> {
        self.edges(node, relation).into_iter().next()
    }

    /// Whether the node carries at least one edge of the relation.
    fn has_edge(&self, node: &Node, relation: &str) -> bool {
        self.first_edge(node, relation).is_some()
    }

    /// Whether the node carries an edge of the relation to the given object.
    fn has_edge_to(&self, node: &Node, relation: &str, object: &Term) -> bool {
        self.edges(node, relation).iter().any(|t| t == object)
    }

    /// Whether the node is tagged with the given type.
    fn is_of_type(&self, node: &Node, type_tag: &str) -> bool {
        self.has_edge_to(node, vocab::TYPE, &Term::Node(Node::named(type_tag)))
    }
}

// =============================================================================
// MEMORY GRAPH
// =============================================================================

/// Deterministic in-memory graph.
///
/// Subjects are kept in a `BTreeMap`; each subject's edges are kept as an
/// ordered list, so declaration order is exactly insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryGraph {
    edges: BTreeMap<Node, Vec<(String, Term)>>,
    next_anon: u64,
}

impl MemoryGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh anonymous node scoped to this graph.
    pub fn anon(&mut self) -> Node {
        let id = self.next_anon;
        self.next_anon = self.next_anon.saturating_add(1);
        Node::Anon(id)
    }

    /// Append an edge. Declaration order is preserved per subject.
    pub fn insert(&mut self, subject: Node, relation: impl Into<String>, object: impl Into<Term>) {
        self.edges
            .entry(subject)
            .or_default()
            .push((relation.into(), object.into()));
    }

    /// Tag a node with a type.
    pub fn add_type(&mut self, subject: Node, type_tag: &str) {
        self.insert(subject, vocab::TYPE, Node::named(type_tag));
    }

    /// Attach an ordered list to a subject through the given relation.
    ///
    /// Builds the cell chain out of fresh anonymous nodes, terminated by
    /// the empty-list sentinel, and returns the head of the chain.
    pub fn insert_list(&mut self, subject: Node, relation: &str, items: Vec<Term>) -> Node {
        let mut head = Node::named(vocab::NIL);
        for item in items.into_iter().rev() {
            let cell = self.anon();
            self.insert(cell.clone(), vocab::FIRST, item);
            self.insert(cell.clone(), vocab::REST, head);
            head = cell;
        }
        self.insert(subject, relation, head.clone());
        head
    }

    /// Total number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}

impl GraphQuery for MemoryGraph {
    fn edges(&self, node: &Node, relation: &str) -> Vec<Term> {
        self.edges
            .get(node)
            .into_iter()
            .flatten()
            .filter(|(r, _)| r == relation)
            .map(|(_, t)| t.clone())
            .collect()
    }

    fn first_edge(&self, node: &Node, relation: &str) -> Option<Term> {
        self.edges
            .get(node)?
            .iter()
            .find(|(r, _)| r == relation)
            .map(|(_, t)| t.clone())
    }

    fn has_edge(&self, node: &Node, relation: &str) -> bool {
        self.edges
            .get(node)
            .is_some_and(|edges| edges.iter().any(|(r, _)| r == relation))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Literal;

    #[test]
    fn edges_come_back_in_declaration_order() {
        let mut graph = MemoryGraph::new();
        let subject = Node::named("app:editor");
        graph.insert(subject.clone(), "app:slot", Literal::string("third"));
        graph.insert(subject.clone(), "app:other", Literal::string("noise"));
        graph.insert(subject.clone(), "app:slot", Literal::string("first"));

        let slots = graph.edges(&subject, "app:slot");
        assert_eq!(
            slots,
            vec![
                Term::from(Literal::string("third")),
                Term::from(Literal::string("first")),
            ]
        );
    }

    #[test]
    fn first_edge_returns_the_earliest_declaration() {
        let mut graph = MemoryGraph::new();
        let subject = Node::named("app:editor");
        graph.insert(subject.clone(), "app:slot", Literal::string("a"));
        graph.insert(subject.clone(), "app:slot", Literal::string("b"));

        assert_eq!(
            graph.first_edge(&subject, "app:slot"),
            Some(Term::from(Literal::string("a")))
        );
        assert_eq!(graph.first_edge(&subject, "app:missing"), None);
    }

    #[test]
    fn minted_anons_are_distinct() {
        let mut graph = MemoryGraph::new();
        let a = graph.anon();
        let b = graph.anon();
        assert_ne!(a, b);
        assert!(a.is_anonymous());
    }

    #[test]
    fn type_tags_answer_is_of_type() {
        let mut graph = MemoryGraph::new();
        let subject = Node::named("app:editor");
        graph.add_type(subject.clone(), vocab::BEAN);

        assert!(graph.is_of_type(&subject, vocab::BEAN));
        assert!(!graph.is_of_type(&subject, vocab::ACTION));
    }

    #[test]
    fn list_builder_chains_cells_to_nil() {
        let mut graph = MemoryGraph::new();
        let subject = Node::named("app:editor");
        let head = graph.insert_list(
            subject.clone(),
            "app:items",
            vec![
                Term::from(Literal::int(1)),
                Term::from(Literal::int(2)),
            ],
        );

        assert_eq!(
            graph.first_edge(&subject, "app:items"),
            Some(Term::Node(head.clone()))
        );
        let first = graph.first_edge(&head, vocab::FIRST).expect("first");
        assert_eq!(first, Term::from(Literal::int(1)));

        let rest = graph.first_edge(&head, vocab::REST).expect("rest");
        let second_cell = rest.as_node().expect("cell").clone();
        let tail = graph.first_edge(&second_cell, vocab::REST).expect("rest");
        assert_eq!(tail, Term::Node(Node::named(vocab::NIL)));
    }

    #[test]
    fn empty_list_points_straight_at_nil() {
        let mut graph = MemoryGraph::new();
        let subject = Node::named("app:editor");
        let head = graph.insert_list(subject, "app:items", Vec::new());
        assert_eq!(head, Node::named(vocab::NIL));
    }
}
