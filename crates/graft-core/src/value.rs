//! # Runtime Value Model
//!
//! Values are what descriptors resolve to: literals become scalars, list
//! cells become ordered sequences, bean nodes become live instances, and
//! action descriptors become event handlers.
//!
//! `TypeTag` and `Signature` describe the callable surface of a bean for
//! the binder: overload selection is a pure introspection query over
//! declared signatures, never a probe that fails to discover a mismatch.

use std::fmt;
use std::rc::Rc;

use crate::action::HandlerRef;
use crate::bean::BeanHandle;
use crate::types::{GraftError, Node};

// =============================================================================
// VALUE
// =============================================================================

/// A runtime value produced by resolution.
#[derive(Clone)]
pub enum Value {
    /// Absence of a value (unset parent context, void method returns).
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// 32-bit integer scalar.
    Int(i32),
    /// 64-bit integer scalar.
    Long(i64),
    /// String scalar.
    Str(String),
    /// Ordered sequence.
    List(Vec<Value>),
    /// A raw graph reference, passed through uninterpreted.
    Node(Node),
    /// A live bean instance.
    Object(BeanHandle),
    /// An event handler.
    Handler(HandlerRef),
}

impl Value {
    /// The runtime tag of this value.
    #[must_use]
    pub fn kind(&self) -> TypeTag {
        TypeTag::of(self)
    }

    /// The bean handle, if this value is a live instance.
    #[must_use]
    pub fn as_object(&self) -> Option<&BeanHandle> {
        match self {
            Self::Object(handle) => Some(handle),
            _ => None,
        }
    }

    /// The handler, if this value is one.
    #[must_use]
    pub fn as_handler(&self) -> Option<&HandlerRef> {
        match self {
            Self::Handler(handler) => Some(handler),
            _ => None,
        }
    }

    /// The elements, if this value is an ordered sequence.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The string, if this value is a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Node(a), Self::Node(b)) => a == b,
            // Instances and handlers compare by identity, not contents.
            (Self::Object(a), Self::Object(b)) => {
                std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
            }
            (Self::Handler(a), Self::Handler(b)) => {
                std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::Int(v) => write!(f, "Int({v})"),
            Self::Long(v) => write!(f, "Long({v})"),
            Self::Str(v) => write!(f, "Str({v:?})"),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Node(n) => write!(f, "Node({n})"),
            // Instances are not borrowed here; a partially initialized bean
            // may be mutably held while diagnostics print.
            Self::Object(_) => f.write_str("Object(..)"),
            Self::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

// =============================================================================
// TYPE TAGS
// =============================================================================

/// The type of one parameter slot or runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    /// Boolean scalar.
    Bool,
    /// 32-bit integer scalar.
    Int,
    /// 64-bit integer scalar.
    Long,
    /// String scalar.
    Str,
    /// Ordered sequence.
    List,
    /// Raw graph reference.
    Node,
    /// Live bean instance.
    Object,
    /// Event handler.
    Handler,
    /// Accepts any value; also the tag of `Value::Null`.
    Any,
}

impl TypeTag {
    /// The tag of a runtime value.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Any,
            Value::Bool(_) => Self::Bool,
            Value::Int(_) => Self::Int,
            Value::Long(_) => Self::Long,
            Value::Str(_) => Self::Str,
            Value::List(_) => Self::List,
            Value::Node(_) => Self::Node,
            Value::Object(_) => Self::Object,
            Value::Handler(_) => Self::Handler,
        }
    }

    /// Parse a type name as written in a `parameterTypes` list.
    pub fn parse(name: &str) -> Result<Self, GraftError> {
        match name {
            "bool" | "boolean" => Ok(Self::Bool),
            "int" => Ok(Self::Int),
            "long" => Ok(Self::Long),
            "str" | "string" => Ok(Self::Str),
            "list" => Ok(Self::List),
            "node" => Ok(Self::Node),
            "object" | "bean" => Ok(Self::Object),
            "handler" | "listener" => Ok(Self::Handler),
            "any" => Ok(Self::Any),
            _ => Err(GraftError::UnknownTypeTag(name.to_string())),
        }
    }

    /// Whether a slot of this type accepts the given value.
    ///
    /// `Any` accepts everything and every slot accepts `Null`. A `long`
    /// slot accepts an `int` value (widening); no other cross-tag
    /// acceptance exists.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (Self::Any, _) | (_, Value::Null) => true,
            (Self::Long, Value::Int(_)) => true,
            _ => self == TypeTag::of(value),
        }
    }

    /// Convert a value to fit a slot of this type.
    ///
    /// Returns `None` when the slot does not accept the value. The only
    /// representation change is the `int`-to-`long` widening.
    #[must_use]
    pub fn coerce(self, value: Value) -> Option<Value> {
        if !self.accepts(&value) {
            return None;
        }
        match (self, value) {
            (Self::Long, Value::Int(v)) => Some(Value::Long(i64::from(v))),
            (_, value) => Some(value),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Long => "long",
            Self::Str => "str",
            Self::List => "list",
            Self::Node => "node",
            Self::Object => "object",
            Self::Handler => "handler",
            Self::Any => "any",
        })
    }
}

// =============================================================================
// SIGNATURE
// =============================================================================

/// The declared parameter types of one setter or method overload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Vec<TypeTag>);

impl Signature {
    /// Create a signature from parameter slots.
    #[must_use]
    pub fn new(slots: impl Into<Vec<TypeTag>>) -> Self {
        Self(slots.into())
    }

    /// Infer a signature from the runtime tags of resolved arguments.
    #[must_use]
    pub fn infer(args: &[Value]) -> Self {
        Self(args.iter().map(TypeTag::of).collect())
    }

    /// Number of parameter slots.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    /// The parameter slots.
    #[must_use]
    pub fn slots(&self) -> &[TypeTag] {
        &self.0
    }

    /// Bind a scalar value against a unary overload.
    #[must_use]
    pub fn bind_scalar(&self, value: &Value) -> Option<Vec<Value>> {
        match self.0.as_slice() {
            [slot] => slot.coerce(value.clone()).map(|v| vec![v]),
            _ => None,
        }
    }

    /// Spread an ordered sequence positionally across the slots.
    ///
    /// Succeeds only when the sequence length equals the arity and every
    /// element is accepted pairwise.
    #[must_use]
    pub fn bind_spread(&self, value: &Value) -> Option<Vec<Value>> {
        let items = value.as_list()?;
        if items.len() != self.0.len() {
            return None;
        }
        self.conform(items.to_vec())
    }

    /// Coerce positional arguments to the declared slots.
    #[must_use]
    pub fn conform(&self, args: Vec<Value>) -> Option<Vec<Value>> {
        if args.len() != self.0.len() {
            return None;
        }
        self.0
            .iter()
            .zip(args)
            .map(|(slot, arg)| slot.coerce(arg))
            .collect()
    }
}

impl From<Vec<TypeTag>> for Signature {
    fn from(slots: Vec<TypeTag>) -> Self {
        Self(slots)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, slot) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            slot.fmt(f)?;
        }
        f.write_str(")")
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_accept_their_own_kind() {
        assert!(TypeTag::Bool.accepts(&Value::Bool(true)));
        assert!(TypeTag::Int.accepts(&Value::Int(1)));
        assert!(TypeTag::Str.accepts(&Value::Str("x".into())));
        assert!(!TypeTag::Bool.accepts(&Value::Int(1)));
        assert!(!TypeTag::Str.accepts(&Value::List(vec![])));
    }

    #[test]
    fn any_accepts_everything_and_null_fits_anywhere() {
        assert!(TypeTag::Any.accepts(&Value::Int(1)));
        assert!(TypeTag::Any.accepts(&Value::Node(Node::Anon(0))));
        assert!(TypeTag::Int.accepts(&Value::Null));
        assert!(TypeTag::Handler.accepts(&Value::Null));
    }

    #[test]
    fn long_slots_widen_int_values() {
        assert!(TypeTag::Long.accepts(&Value::Int(7)));
        assert_eq!(TypeTag::Long.coerce(Value::Int(7)), Some(Value::Long(7)));
        // Never the other way around.
        assert!(!TypeTag::Int.accepts(&Value::Long(7)));
        assert_eq!(TypeTag::Int.coerce(Value::Long(7)), None);
    }

    #[test]
    fn scalar_binding_requires_a_unary_overload() {
        let unary = Signature::new(vec![TypeTag::Int]);
        let binary = Signature::new(vec![TypeTag::Int, TypeTag::Int]);

        assert_eq!(unary.bind_scalar(&Value::Int(3)), Some(vec![Value::Int(3)]));
        assert_eq!(binary.bind_scalar(&Value::Int(3)), None);
    }

    #[test]
    fn spread_binding_matches_arity_and_slots() {
        let sig = Signature::new(vec![TypeTag::Int, TypeTag::Str]);
        let args = Value::List(vec![Value::Int(1), Value::Str("a".into())]);

        assert_eq!(
            sig.bind_spread(&args),
            Some(vec![Value::Int(1), Value::Str("a".into())])
        );
        assert_eq!(sig.bind_spread(&Value::List(vec![Value::Int(1)])), None);
        assert_eq!(sig.bind_spread(&Value::Int(1)), None);
    }

    #[test]
    fn inferred_signatures_use_runtime_tags() {
        let args = [Value::Int(1), Value::Str("a".into())];
        assert_eq!(
            Signature::infer(&args),
            Signature::new(vec![TypeTag::Int, TypeTag::Str])
        );
    }

    #[test]
    fn type_names_parse() {
        assert_eq!(TypeTag::parse("long").expect("parse"), TypeTag::Long);
        assert_eq!(TypeTag::parse("string").expect("parse"), TypeTag::Str);
        assert!(matches!(
            TypeTag::parse("gizmo"),
            Err(GraftError::UnknownTypeTag(_))
        ));
    }

    #[test]
    fn signature_display() {
        let sig = Signature::new(vec![TypeTag::Long, TypeTag::Str]);
        assert_eq!(sig.to_string(), "(long, str)");
    }
}
