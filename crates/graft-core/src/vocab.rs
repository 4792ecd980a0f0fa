//! # Loader Vocabulary
//!
//! The relation and type-tag names of the graft schema. Graph documents
//! describe beans with these names; the engine hardcodes no others.
//!
//! Names are plain strings rather than interned identifiers so any
//! [`GraphQuery`] implementation can answer them without a shared symbol
//! table.

use crate::graph::GraphQuery;
use crate::types::Node;

/// Namespace prefix of the schema.
pub const NS: &str = "graft:";

/// Tags a node with a type; the loader's `rdf:type` analog.
pub const TYPE: &str = "graft:type";

// =============================================================================
// BEAN KINDS
// =============================================================================

/// An instance of a configurable application object.
pub const BEAN: &str = "graft:Bean";

/// A bean that is loaded when the application loads and lives for the
/// whole session.
pub const APPLICATION_BEAN: &str = "graft:ApplicationBean";

/// A bean that is relative to the current object and never stored.
/// Multiple copies may be live at once; referencing its node again simply
/// makes another one.
pub const TEMPORARY_BEAN: &str = "graft:TemporaryBean";

/// An event-proxy descriptor, constructed as an [`crate::Actionator`].
pub const ACTION: &str = "graft:Action";

// =============================================================================
// MARKER NODES
// =============================================================================

/// URI that means "the parent bean" of the current resolution context.
pub const PARENT: &str = "graft:Parent";

/// The empty-list sentinel terminating a cell chain.
pub const NIL: &str = "graft:nil";

// =============================================================================
// CONSTRUCTION & ORDERING
// =============================================================================

/// The registered type name a bean is constructed from.
pub const TYPE_NAME: &str = "graft:typeName";

/// References a bean that must be loaded before this one.
pub const REQUIRES: &str = "graft:requires";

/// Passes the referenced node itself rather than its resolved value.
pub const ADDRESS_OF: &str = "graft:addressOf";

/// Names a container bean the subject is attached to during
/// initialization.
pub const ADD_TO: &str = "graft:addTo";

// =============================================================================
// PROPERTIES
// =============================================================================

/// Sets the described property during initialization.
pub const SET_PROPERTY: &str = "graft:setProperty";

/// The name of a property.
pub const PROPERTY_NAME: &str = "graft:propertyName";

/// The bean a property descriptor reads from; defaults to the parent
/// context when absent.
pub const PROPERTY_OF: &str = "graft:propertyOf";

/// The value a property is set to.
pub const PROPERTY_VALUE: &str = "graft:propertyValue";

/// An icon for the subject, satisfied through the `Decor` collaborator.
pub const ICON: &str = "graft:icon";

// =============================================================================
// LISTENERS & ACTIONS
// =============================================================================

/// The bean an event listener is read from.
pub const LISTENER_BEAN: &str = "graft:listenerBean";

/// The property name on the listener bean that yields the listener.
pub const LISTENER_TYPE: &str = "graft:listenerType";

/// The command string an action sends with its events.
pub const ACTION_COMMAND: &str = "graft:actionCommand";

/// Selects a delegate to receive an action's events.
pub const SENDS_TO: &str = "graft:sendsTo";

// =============================================================================
// METHOD INVOCATION
// =============================================================================

/// Invokes the described method on the subject during initialization.
pub const INVOKE: &str = "graft:invoke";

/// Explicit target of a method invocation; defaults to the parent context.
pub const INVOKED_ON: &str = "graft:invokedOn";

/// The name of the method to invoke.
pub const METHOD_NAME: &str = "graft:methodName";

/// The ordered parameter list of an invocation.
pub const PARAMETERS: &str = "graft:parameters";

/// Explicit parameter types of an invocation; entries are type names or
/// pre-typed values. Inferred from the parameters when absent.
pub const PARAMETER_TYPES: &str = "graft:parameterTypes";

// =============================================================================
// LIST CELLS
// =============================================================================

/// The value held by a list cell.
pub const FIRST: &str = "graft:first";

/// The tail of a list cell; its presence is what marks a cell.
pub const REST: &str = "graft:rest";

// =============================================================================
// INPUT BINDINGS
// =============================================================================

/// An input binding dispatched when the subject's window is focused.
pub const INPUT_ACTION: &str = "graft:inputAction";

/// An input binding dispatched only when the subject itself is focused.
pub const LOCAL_INPUT_ACTION: &str = "graft:localInputAction";

/// An input binding dispatched when focus is on the subject or below it.
pub const ANCESTOR_INPUT_ACTION: &str = "graft:ancestorInputAction";

/// An input binding dispatched anywhere in the subject's window.
pub const WINDOW_INPUT_ACTION: &str = "graft:windowInputAction";

/// Every input-binding relation, in dispatch-precedence order. Edges of
/// these relations are forwarded to the `InputSink` collaborator during
/// initialization.
pub const INPUT_TYPES: [&str; 4] = [
    LOCAL_INPUT_ACTION,
    ANCESTOR_INPUT_ACTION,
    WINDOW_INPUT_ACTION,
    INPUT_ACTION,
];

// =============================================================================
// PREDICATES
// =============================================================================

/// The parent-marker node.
#[must_use]
pub fn parent_marker() -> Node {
    Node::named(PARENT)
}

/// The empty-list sentinel node.
#[must_use]
pub fn nil() -> Node {
    Node::named(NIL)
}

/// Whether the node describes a bean of any kind.
pub fn is_bean<G: GraphQuery + ?Sized>(graph: &G, node: &Node) -> bool {
    graph.is_of_type(node, BEAN)
        || graph.is_of_type(node, APPLICATION_BEAN)
        || graph.is_of_type(node, TEMPORARY_BEAN)
}

/// Whether the node describes, specifically, a temporary bean.
pub fn is_temporary_bean<G: GraphQuery + ?Sized>(graph: &G, node: &Node) -> bool {
    graph.is_of_type(node, TEMPORARY_BEAN)
}

/// Whether the node describes an application bean.
pub fn is_application_bean<G: GraphQuery + ?Sized>(graph: &G, node: &Node) -> bool {
    graph.is_of_type(node, APPLICATION_BEAN)
}
