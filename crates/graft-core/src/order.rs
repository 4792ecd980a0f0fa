//! # Dependency Ordering
//!
//! Orders a node set so that for every edge `a --requires--> b` inside the
//! set, `b` comes out strictly before `a`. Construction then walks the
//! result front to back and every bean's dependencies already exist.
//!
//! Depth-first with three colors (unvisited, in-progress, done). Roots are
//! taken in `BTreeSet` order, so the order among unrelated nodes is
//! implementation-defined but stable across calls on the same snapshot.

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::GraphQuery;
use crate::types::{GraftError, Node, Term};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Order `nodes` so dependencies precede dependents along `relation`.
///
/// A relation edge leaving the input set is
/// [`GraftError::ForeignRequirement`] — a configuration mistake, not a
/// cycle. Re-entering an in-progress node is
/// [`GraftError::DependencyCycle`]; nothing is returned partially ordered.
pub fn dependency_order<G: GraphQuery>(
    graph: &G,
    nodes: impl IntoIterator<Item = Node>,
    relation: &str,
) -> Result<Vec<Node>, GraftError> {
    let set: BTreeSet<Node> = nodes.into_iter().collect();
    let mut marks: BTreeMap<Node, Mark> = BTreeMap::new();
    let mut ordered = Vec::with_capacity(set.len());

    for node in &set {
        visit(graph, node, relation, &set, &mut marks, &mut ordered)?;
    }
    Ok(ordered)
}

fn visit<G: GraphQuery>(
    graph: &G,
    node: &Node,
    relation: &str,
    set: &BTreeSet<Node>,
    marks: &mut BTreeMap<Node, Mark>,
    ordered: &mut Vec<Node>,
) -> Result<(), GraftError> {
    match marks.get(node) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::InProgress) => return Err(GraftError::DependencyCycle(node.clone())),
        None => {}
    }
    marks.insert(node.clone(), Mark::InProgress);

    for term in graph.edges(node, relation) {
        match term {
            Term::Node(dep) => {
                if !set.contains(&dep) {
                    return Err(GraftError::ForeignRequirement {
                        subject: node.clone(),
                        target: dep,
                    });
                }
                visit(graph, &dep, relation, set, marks, ordered)?;
            }
            Term::Literal(_) => return Err(GraftError::LiteralRequirement(node.clone())),
        }
    }

    marks.insert(node.clone(), Mark::Done);
    ordered.push(node.clone());
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
