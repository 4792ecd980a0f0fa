//! # Bean Capabilities
//!
//! Beans are the application objects the loader constructs and configures.
//! Instead of probing objects reflectively, the engine works against the
//! [`Bean`] trait: properties and methods are introspected through declared
//! signatures and dispatched by name through checked entry points.
//!
//! Construction goes through the [`FactoryRegistry`]: a graph document names
//! a type, the embedder registers a factory for that name, and the loader
//! calls it when a bean node of that type is instantiated.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::types::{BeanError, GraftError};
use crate::value::{Signature, Value};

/// Shared, mutable handle to a live bean instance.
///
/// Handles are single-threaded (`Rc`); the engine holds mutable borrows
/// only while applying one setter, method call, or attachment, never across
/// a recursive resolution. Host code must not re-borrow a handle it was
/// handed as a `Value` while one of its own trait methods is running.
pub type BeanHandle = Rc<RefCell<dyn Bean>>;

/// Wrap a concrete bean into a [`BeanHandle`].
#[must_use]
pub fn handle<B: Bean + 'static>(bean: B) -> BeanHandle {
    Rc::new(RefCell::new(bean))
}

// =============================================================================
// BEAN TRAIT
// =============================================================================

/// The property-and-method surface a configurable object exposes.
///
/// Every entry point is total: signature queries return empty sets and the
/// dispatch defaults refuse politely, so a bean only implements the parts
/// of the surface it actually has.
pub trait Bean {
    /// Short type name used in diagnostics.
    fn type_name(&self) -> &'static str;

    /// Read the named property.
    ///
    /// `Ok(None)` means the bean exposes no such property; `Err` means the
    /// read itself failed inside host code.
    fn get(&self, _property: &str) -> Result<Option<Value>, BeanError> {
        Ok(None)
    }

    /// Setter overloads declared for a property, in declaration order.
    fn setter_signatures(&self, _property: &str) -> Vec<Signature> {
        Vec::new()
    }

    /// Apply a setter overload previously matched by the binder.
    ///
    /// `args` have already been coerced to one of the signatures returned
    /// by [`Bean::setter_signatures`].
    fn set(&mut self, property: &str, _args: Vec<Value>) -> Result<(), BeanError> {
        Err(BeanError::new(format!(
            "{} has no writable property {property:?}",
            self.type_name()
        )))
    }

    /// Method overloads declared under a name, in declaration order.
    fn method_signatures(&self, _method: &str) -> Vec<Signature> {
        Vec::new()
    }

    /// Invoke a method overload previously matched by the binder.
    fn call(&mut self, method: &str, _args: Vec<Value>) -> Result<Value, BeanError> {
        Err(BeanError::new(format!(
            "{} has no method {method:?}",
            self.type_name()
        )))
    }

    /// The window capability, for beans that own a top-level frame.
    fn as_window(&mut self) -> Option<&mut dyn Windowed> {
        None
    }

    /// The container capability, for beans that can receive children.
    fn as_container(&mut self) -> Option<&mut dyn Container> {
        None
    }
}

// =============================================================================
// STRUCTURAL CAPABILITIES
// =============================================================================

/// A bean that owns a top-level window.
///
/// During initialization the loader applies the localized label as the
/// title, hands over the icon, and attaches children through the window's
/// content area.
pub trait Windowed {
    /// Set the window title.
    fn set_title(&mut self, title: &str);

    /// Hand over the window icon. The representation is host-defined.
    fn set_icon(&mut self, _icon: Value) {}

    /// The content area children are attached to.
    fn content(&mut self) -> Option<&mut dyn Container> {
        None
    }
}

/// A bean that can receive child beans.
pub trait Container {
    /// Attach a child to this container.
    fn attach(&mut self, child: BeanHandle) -> Result<(), BeanError>;
}

// =============================================================================
// FACTORY REGISTRY
// =============================================================================

/// A no-argument constructor for a named bean type.
pub type Factory = Box<dyn Fn() -> Result<BeanHandle, BeanError>>;

/// Maps declared type names to constructors.
///
/// The graph document references types by name only; the embedder decides
/// which names exist. Lookup of an unregistered name is
/// [`GraftError::UnknownType`].
#[derive(Default)]
pub struct FactoryRegistry {
    factories: BTreeMap<String, Factory>,
}

impl FactoryRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under a type name, replacing any previous one.
    pub fn register<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<BeanHandle, BeanError> + 'static,
    {
        self.factories.insert(type_name.into(), Box::new(factory));
    }

    /// Whether a factory is registered under the name.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Registered type names, in deterministic order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Construct a fresh instance of the named type.
    pub fn construct(&self, type_name: &str) -> Result<BeanHandle, GraftError> {
        let factory = self
            .factories
            .get(type_name)
            .ok_or_else(|| GraftError::UnknownType(type_name.to_string()))?;
        factory().map_err(|e| GraftError::target(format!("constructing {type_name}"), e))
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("types", &self.names())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TypeTag;

    struct Knob {
        level: i32,
    }

    impl Bean for Knob {
        fn type_name(&self) -> &'static str {
            "test.Knob"
        }

        fn get(&self, property: &str) -> Result<Option<Value>, BeanError> {
            match property {
                "level" => Ok(Some(Value::Int(self.level))),
                _ => Ok(None),
            }
        }

        fn setter_signatures(&self, property: &str) -> Vec<Signature> {
            match property {
                "level" => vec![Signature::new(vec![TypeTag::Int])],
                _ => Vec::new(),
            }
        }

        fn set(&mut self, property: &str, args: Vec<Value>) -> Result<(), BeanError> {
            match (property, args.as_slice()) {
                ("level", [Value::Int(v)]) => {
                    self.level = *v;
                    Ok(())
                }
                _ => Err(BeanError::new("unmatched setter")),
            }
        }
    }

    #[test]
    fn factory_constructs_fresh_instances() {
        let mut factories = FactoryRegistry::new();
        factories.register("test.Knob", || Ok(handle(Knob { level: 0 })));

        let a = factories.construct("test.Knob").expect("construct");
        let b = factories.construct("test.Knob").expect("construct");
        assert!(!std::ptr::addr_eq(Rc::as_ptr(&a), Rc::as_ptr(&b)));
    }

    #[test]
    fn unknown_type_is_an_error() {
        let factories = FactoryRegistry::new();
        assert!(matches!(
            factories.construct("test.Missing"),
            Err(GraftError::UnknownType(_))
        ));
    }

    #[test]
    fn factory_failure_is_wrapped_with_context() {
        let mut factories = FactoryRegistry::new();
        factories.register("test.Broken", || Err(BeanError::new("out of widgets")));

        let err = match factories.construct("test.Broken") {
            Ok(_) => panic!("must fail"),
            Err(e) => e,
        };
        assert!(matches!(err, GraftError::TargetFailure { .. }));
        assert!(err.to_string().contains("test.Broken"));
    }

    #[test]
    fn default_surface_refuses_politely() {
        let mut knob = Knob { level: 3 };
        assert_eq!(knob.get("label").expect("get"), None);
        assert!(knob.method_signatures("spin").is_empty());
        assert!(knob.call("spin", Vec::new()).is_err());
        assert!(knob.as_window().is_none());
        assert!(knob.as_container().is_none());
    }

    #[test]
    fn names_are_deterministic() {
        let mut factories = FactoryRegistry::new();
        factories.register("test.Zeta", || Ok(handle(Knob { level: 0 })));
        factories.register("test.Alpha", || Ok(handle(Knob { level: 0 })));
        assert_eq!(factories.names(), vec!["test.Alpha", "test.Zeta"]);
    }
}
