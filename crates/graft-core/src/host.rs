//! # Host Collaborators
//!
//! Interfaces to services the embedding application provides. Localization,
//! icon loading, and keystroke dispatch are not the loader's business; it
//! only asks for the results at the right points of initialization.
//!
//! Both collaborators are optional. A loader without a [`Decor`] leaves
//! windows untitled; a loader without an [`InputSink`] skips binding
//! registration with a debug note.

use std::rc::Rc;

use crate::types::{Node, Term};
use crate::value::Value;

/// Localized presentation lookup.
pub trait Decor {
    /// The localized label for a node, used as window titles.
    fn label(&self, _node: &Node) -> Option<String> {
        None
    }

    /// The localized description for a node, used by action proxies.
    fn description(&self, _node: &Node) -> Option<String> {
        None
    }

    /// The icon for a node. Representation is host-defined; the loader
    /// passes it through untouched.
    fn icon(&self, _node: &Node) -> Option<Value> {
        None
    }
}

/// Shared handle to the decor collaborator.
pub type DecorRef = Rc<dyn Decor>;

/// Receives input-binding declarations found on beans.
///
/// One call per binding edge, in declaration order, carrying the owning
/// bean's node, the binding relation (one of [`crate::vocab::INPUT_TYPES`]),
/// and the binding descriptor for the host's keystroke machinery to parse.
pub trait InputSink {
    /// Record one input binding.
    fn bind(&self, owner: &Node, relation: &'static str, descriptor: &Term);
}

/// Shared handle to the input-binding collaborator.
pub type InputSinkRef = Rc<dyn InputSink>;
