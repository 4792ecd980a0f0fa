//! # Core Type Definitions
//!
//! This module contains the data model shared by every part of the loader:
//! - Graph identities (`Node`) and literal values (`Literal`, `Datatype`)
//! - The `Term` union a graph edge may point at
//! - Error types (`GraftError`, `BeanError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Implement `Ord` where they are used as `BTreeMap`/`BTreeSet` keys
//! - Use integer representations only (no floating-point)

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::value::Value;

// =============================================================================
// NODE
// =============================================================================

/// An identity in the configuration graph.
///
/// Two `Named` nodes with equal URIs denote the same entity. `Anon` identity
/// is scoped to the graph that minted it; anonymous nodes are never recorded
/// in the bean registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Node {
    /// A node with a stable URI.
    Named(String),
    /// An anonymous node, identified only within its graph.
    Anon(u64),
}

impl Node {
    /// Create a named node from a URI.
    #[must_use]
    pub fn named(uri: impl Into<String>) -> Self {
        Self::Named(uri.into())
    }

    /// Whether this node lacks a stable URI.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anon(_))
    }

    /// The URI of a named node.
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        match self {
            Self::Named(uri) => Some(uri),
            Self::Anon(_) => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(uri) => write!(f, "<{uri}>"),
            Self::Anon(id) => write!(f, "_:b{id}"),
        }
    }
}

// =============================================================================
// LITERAL
// =============================================================================

/// Datatype tag carried by a typed literal.
///
/// The loader is float-free; numeric literals are `int` (32-bit) or `long`
/// (64-bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Datatype {
    /// Boolean, lexical forms `true` and `false`.
    Bool,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Long => "long",
        })
    }
}

/// An opaque lexical form with an optional datatype tag.
///
/// Untagged literals resolve to the string itself; tagged literals resolve
/// through the datatype's parser.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Literal {
    lexical: String,
    datatype: Option<Datatype>,
}

impl Literal {
    /// Create an untagged (plain string) literal.
    #[must_use]
    pub fn string(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
        }
    }

    /// Create a literal with an explicit datatype tag.
    #[must_use]
    pub fn typed(lexical: impl Into<String>, datatype: Datatype) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: Some(datatype),
        }
    }

    /// Create a boolean literal.
    #[must_use]
    pub fn boolean(v: bool) -> Self {
        Self::typed(v.to_string(), Datatype::Bool)
    }

    /// Create a 32-bit integer literal.
    #[must_use]
    pub fn int(v: i32) -> Self {
        Self::typed(v.to_string(), Datatype::Int)
    }

    /// Create a 64-bit integer literal.
    #[must_use]
    pub fn long(v: i64) -> Self {
        Self::typed(v.to_string(), Datatype::Long)
    }

    /// The raw lexical form.
    #[must_use]
    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    /// The datatype tag, if any.
    #[must_use]
    pub fn datatype(&self) -> Option<Datatype> {
        self.datatype
    }

    /// Parse the lexical form into a runtime value.
    ///
    /// Untagged literals yield the string unchanged; tagged literals go
    /// through the datatype's parser and fail with
    /// [`GraftError::BadLiteral`] when the form does not parse.
    pub fn parse(&self) -> Result<Value, GraftError> {
        let Some(datatype) = self.datatype else {
            return Ok(Value::Str(self.lexical.clone()));
        };
        let bad = || GraftError::BadLiteral {
            lexical: self.lexical.clone(),
            datatype,
        };
        match datatype {
            Datatype::Bool => match self.lexical.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(bad()),
            },
            Datatype::Int => self.lexical.parse().map(Value::Int).map_err(|_| bad()),
            Datatype::Long => self.lexical.parse().map(Value::Long).map_err(|_| bad()),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.datatype {
            Some(dt) => write!(f, "{:?}^^{dt}", self.lexical),
            None => write!(f, "{:?}", self.lexical),
        }
    }
}

// =============================================================================
// TERM
// =============================================================================

/// The object position of a graph edge: a node or a literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Term {
    /// Reference to another node.
    Node(Node),
    /// An inline literal value.
    Literal(Literal),
}

impl Term {
    /// The node this term references, if it is one.
    #[must_use]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(n) => Some(n),
            Self::Literal(_) => None,
        }
    }

    /// The literal this term carries, if it is one.
    #[must_use]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Node(_) => None,
            Self::Literal(l) => Some(l),
        }
    }
}

impl From<Node> for Term {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(n) => n.fmt(f),
            Self::Literal(l) => l.fmt(f),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Error raised by host bean code: factories, getters, setters, and
/// invoked methods.
///
/// The engine never interprets the message; it wraps the failure as
/// [`GraftError::TargetFailure`] with this error attached as the cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BeanError(pub String);

impl BeanError {
    /// Create a bean error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors that can occur while ordering, resolving, or wiring a graph.
///
/// - Ordering and instantiation failures are fatal and abort the load
/// - Initialization failures are caught at the per-bean boundary and logged
/// - The engine never panics; all errors are recoverable by the caller
#[derive(Debug, Error)]
pub enum GraftError {
    /// A dependency cycle was found while ordering beans.
    #[error("dependency cycle through {0}")]
    DependencyCycle(Node),

    /// A dependency edge points at a node outside the set being ordered.
    #[error("{subject} requires {target}, which is outside the ordered set")]
    ForeignRequirement {
        /// The node carrying the dependency edge.
        subject: Node,
        /// The edge target missing from the input set.
        target: Node,
    },

    /// A dependency edge points at a literal.
    #[error("{0} requires a literal value, which cannot be ordered")]
    LiteralRequirement(Node),

    /// A descriptor is missing a required edge.
    #[error("{node} has no {relation} edge")]
    MissingEdge {
        /// The incomplete descriptor.
        node: Node,
        /// The relation that was expected.
        relation: &'static str,
    },

    /// An edge that must reference a node points at a literal instead.
    #[error("{relation} of {node} must reference a node")]
    NotANode {
        /// The descriptor carrying the edge.
        node: Node,
        /// The offending relation.
        relation: &'static str,
    },

    /// An edge that must carry a literal references a node instead.
    #[error("{relation} of {node} must be a literal")]
    NotALiteral {
        /// The descriptor carrying the edge.
        node: Node,
        /// The offending relation.
        relation: &'static str,
    },

    /// A descriptor that must yield an ordered sequence resolved to
    /// something else.
    #[error("{context} resolved to {found}, not a list")]
    NotAList {
        /// What the engine was resolving.
        context: String,
        /// Runtime type of the value actually found.
        found: String,
    },

    /// A bean node carries neither a type name nor a property definition.
    #[error("bean {0} must carry a type name or be defined as the property of another bean")]
    InvalidBean(Node),

    /// No factory is registered for a bean's declared type name.
    #[error("no factory registered for type {0:?}")]
    UnknownType(String),

    /// A bean exposes no readable property with the requested name.
    #[error("{type_name} has no readable property {property:?}")]
    UnknownGetter {
        /// Type name of the bean that was probed.
        type_name: String,
        /// The property that could not be read.
        property: String,
    },

    /// No setter overload accepts the resolved value.
    #[error("no overload of {setter} on {type_name} accepts {value_type} for property {property:?}")]
    SetterMismatch {
        /// Type name of the bean that was probed.
        type_name: String,
        /// The property being assigned.
        property: String,
        /// The setter name that was scanned.
        setter: String,
        /// Runtime type of the rejected value.
        value_type: String,
    },

    /// No method overload matches the requested signature.
    #[error("{type_name} has no method {method:?} with signature {signature}")]
    MethodMismatch {
        /// Type name of the invocation target.
        type_name: String,
        /// The method that was requested.
        method: String,
        /// The signature that failed to match.
        signature: String,
    },

    /// A parameter-type entry names an unknown type.
    #[error("unknown parameter type name {0:?}")]
    UnknownTypeTag(String),

    /// A value was used where a live bean instance was required.
    #[error("{context}: expected a bean instance, found {found}")]
    NotAnInstance {
        /// What the engine was doing when the mismatch surfaced.
        context: String,
        /// Runtime type of the value actually found.
        found: String,
    },

    /// A listener or action delegate did not resolve to an event handler.
    #[error("{0} did not resolve to an event handler")]
    NotAHandler(Node),

    /// An `addTo` target has not been loaded.
    #[error("container {holder} for {child} has not been loaded")]
    UnknownContainer {
        /// The bean being attached.
        child: Node,
        /// The missing holder.
        holder: Node,
    },

    /// An `addTo` target cannot receive children.
    #[error("cannot attach {child} to {holder}: not a container")]
    NotAContainer {
        /// The bean being attached.
        child: Node,
        /// The holder that lacks a content area.
        holder: Node,
    },

    /// An `addTo` edge points back at its own subject.
    #[error("{0} cannot be attached to itself")]
    SelfAttachment(Node),

    /// A property descriptor has no owning bean in the current context.
    #[error("property {property:?} on {node} has no owning bean in this context")]
    MissingContext {
        /// The property descriptor.
        node: Node,
        /// The property it names.
        property: String,
    },

    /// The designated root was not registered before loading.
    #[error("root bean {0} is not registered; register the core instance before loading")]
    UnregisteredRoot(Node),

    /// A tagged literal's lexical form does not parse.
    #[error("cannot parse {lexical:?} as {datatype}")]
    BadLiteral {
        /// The offending lexical form.
        lexical: String,
        /// The tag it failed to parse under.
        datatype: Datatype,
    },

    /// A descriptor re-entered itself while being resolved.
    #[error("recursive value definition through {0}")]
    RecursiveDefinition(Node),

    /// Resolution nested past the depth ceiling.
    #[error("value resolution nested too deeply at {0}")]
    ResolutionDepth(Node),

    /// Host bean code failed; the original cause is attached.
    #[error("{context}: {source}")]
    TargetFailure {
        /// What the engine was doing when the target failed.
        context: String,
        /// The underlying failure from host code.
        #[source]
        source: BeanError,
    },
}

impl GraftError {
    /// Wrap a failure from host bean code with engine-side context.
    #[must_use]
    pub fn target(context: impl Into<String>, source: BeanError) -> Self {
        Self::TargetFailure {
            context: context.into(),
            source,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
