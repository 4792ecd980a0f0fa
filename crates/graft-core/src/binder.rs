//! # Property & Method Binding
//!
//! Connects resolved values to bean surfaces. Overload selection is driven
//! entirely by the signatures a bean declares: the binder asks, matches,
//! coerces, and only then dispatches, so a mismatch is a returned error
//! rather than a caught probe.
//!
//! Setter selection scans a property's overloads in declaration order; for
//! each candidate the unary binding is tried first, then the positional
//! spread of an ordered sequence. The first candidate that binds wins.

use crate::bean::BeanHandle;
use crate::types::GraftError;
use crate::value::{Signature, Value};

/// The conventional setter name for a property, used in diagnostics.
#[must_use]
pub fn setter_name(property: &str) -> String {
    format!("set_{property}")
}

/// Read a property off a bean.
pub fn get_property(handle: &BeanHandle, property: &str) -> Result<Value, GraftError> {
    let bean = handle.borrow();
    match bean.get(property) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(GraftError::UnknownGetter {
            type_name: bean.type_name().to_string(),
            property: property.to_string(),
        }),
        Err(source) => Err(GraftError::target(
            format!("reading {property:?} from {}", bean.type_name()),
            source,
        )),
    }
}

/// Assign a resolved value to a named property.
///
/// A scalar prefers a unary overload; an ordered sequence may also spread
/// across a multi-parameter overload of matching arity. When nothing
/// binds, the error names the property, the setter, and the value's
/// runtime type.
pub fn set_property(handle: &BeanHandle, property: &str, value: Value) -> Result<(), GraftError> {
    let mut bean = handle.borrow_mut();
    let signatures = bean.setter_signatures(property);
    for signature in &signatures {
        let bound = signature
            .bind_scalar(&value)
            .or_else(|| signature.bind_spread(&value));
        if let Some(args) = bound {
            tracing::debug!(
                property,
                signature = %signature,
                bean = bean.type_name(),
                "applying setter"
            );
            return bean.set(property, args).map_err(|source| {
                GraftError::target(
                    format!("setting {property:?} on {}", bean.type_name()),
                    source,
                )
            });
        }
    }
    Err(GraftError::SetterMismatch {
        type_name: bean.type_name().to_string(),
        property: property.to_string(),
        setter: setter_name(property),
        value_type: value.kind().to_string(),
    })
}

/// Invoke a named method with an explicit or inferred signature.
///
/// The overload whose declared signature equals the requested one is
/// selected (declaration order, first match); arguments are coerced to its
/// slots before dispatch.
pub fn invoke_method(
    handle: &BeanHandle,
    method: &str,
    signature: &Signature,
    args: Vec<Value>,
) -> Result<Value, GraftError> {
    let mut bean = handle.borrow_mut();
    let mismatch = |bean_type: &str| GraftError::MethodMismatch {
        type_name: bean_type.to_string(),
        method: method.to_string(),
        signature: signature.to_string(),
    };

    let declared = bean.method_signatures(method);
    let Some(selected) = declared.iter().find(|s| *s == signature) else {
        return Err(mismatch(bean.type_name()));
    };
    let Some(args) = selected.conform(args) else {
        return Err(mismatch(bean.type_name()));
    };

    tracing::debug!(method, signature = %signature, bean = bean.type_name(), "invoking");
    bean.call(method, args).map_err(|source| {
        GraftError::target(
            format!("invoking {method:?} on {}", bean.type_name()),
            source,
        )
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::{Bean, handle};
    use crate::types::BeanError;
    use crate::value::TypeTag;

    /// Fixture with overloaded setters and methods. The `mode` property
    /// reports which overload ran last.
    #[derive(Default)]
    struct Gauge {
        count: i32,
        mode: &'static str,
    }

    impl Bean for Gauge {
        fn type_name(&self) -> &'static str {
            "test.Gauge"
        }

        fn get(&self, property: &str) -> Result<Option<Value>, BeanError> {
            match property {
                "count" => Ok(Some(Value::Int(self.count))),
                "mode" => Ok(Some(Value::Str(self.mode.to_string()))),
                "fragile" => Err(BeanError::new("sensor offline")),
                _ => Ok(None),
            }
        }

        fn setter_signatures(&self, property: &str) -> Vec<Signature> {
            match property {
                "count" => vec![
                    Signature::new(vec![TypeTag::Int]),
                    Signature::new(vec![TypeTag::Int, TypeTag::Int]),
                ],
                "range" => vec![
                    Signature::new(vec![TypeTag::Int, TypeTag::Int]),
                    Signature::new(vec![TypeTag::List]),
                ],
                _ => Vec::new(),
            }
        }

        fn set(&mut self, property: &str, args: Vec<Value>) -> Result<(), BeanError> {
            match (property, args.as_slice()) {
                ("count", [Value::Int(v)]) => {
                    self.count = *v;
                    self.mode = "count/1";
                    Ok(())
                }
                ("count", [Value::Int(a), Value::Int(b)]) => {
                    self.count = *a + *b;
                    self.mode = "count/2";
                    Ok(())
                }
                ("range", [Value::Int(_), Value::Int(_)]) => {
                    self.mode = "range/2";
                    Ok(())
                }
                ("range", [Value::List(_)]) => {
                    self.mode = "range/list";
                    Ok(())
                }
                _ => Err(BeanError::new("unmatched setter")),
            }
        }

        fn method_signatures(&self, method: &str) -> Vec<Signature> {
            match method {
                "configure" => vec![
                    Signature::new(vec![TypeTag::Int, TypeTag::Str]),
                    Signature::new(vec![TypeTag::Long, TypeTag::Str]),
                ],
                _ => Vec::new(),
            }
        }

        fn call(&mut self, method: &str, args: Vec<Value>) -> Result<Value, BeanError> {
            match (method, args.as_slice()) {
                ("configure", [Value::Int(_), Value::Str(_)]) => {
                    self.mode = "configure/int";
                    Ok(Value::Null)
                }
                ("configure", [Value::Long(_), Value::Str(_)]) => {
                    self.mode = "configure/long";
                    Ok(Value::Null)
                }
                _ => Err(BeanError::new("unmatched method")),
            }
        }
    }

    fn mode(gauge: &BeanHandle) -> Value {
        get_property(gauge, "mode").expect("mode readable")
    }

    #[test]
    fn scalar_prefers_the_unary_overload() {
        let gauge = handle(Gauge::default());
        set_property(&gauge, "count", Value::Int(5)).expect("set");
        assert_eq!(mode(&gauge), Value::Str("count/1".into()));
        assert_eq!(get_property(&gauge, "count").expect("get"), Value::Int(5));
    }

    #[test]
    fn sequences_spread_across_matching_arity() {
        let gauge = handle(Gauge::default());
        set_property(
            &gauge,
            "count",
            Value::List(vec![Value::Int(2), Value::Int(3)]),
        )
        .expect("set");
        assert_eq!(mode(&gauge), Value::Str("count/2".into()));
        assert_eq!(get_property(&gauge, "count").expect("get"), Value::Int(5));
    }

    #[test]
    fn earlier_spread_beats_later_scalar() {
        let gauge = handle(Gauge::default());
        // "range" declares (int, int) before (list); a two-element list
        // spreads into the first candidate rather than reaching the unary
        // list overload.
        set_property(
            &gauge,
            "range",
            Value::List(vec![Value::Int(1), Value::Int(9)]),
        )
        .expect("set");
        assert_eq!(mode(&gauge), Value::Str("range/2".into()));
    }

    #[test]
    fn mismatch_names_property_setter_and_type() {
        let gauge = handle(Gauge::default());
        let err =
            set_property(&gauge, "count", Value::Str("nope".into())).expect_err("must fail");
        let message = err.to_string();
        assert!(message.contains("set_count"));
        assert!(message.contains("str"));
        assert!(message.contains("count"));
    }

    #[test]
    fn unknown_getter_is_a_configuration_error() {
        let gauge = handle(Gauge::default());
        assert!(matches!(
            get_property(&gauge, "missing"),
            Err(GraftError::UnknownGetter { .. })
        ));
    }

    #[test]
    fn getter_failure_is_wrapped_with_cause() {
        let gauge = handle(Gauge::default());
        let err = get_property(&gauge, "fragile").expect_err("must fail");
        assert!(matches!(err, GraftError::TargetFailure { .. }));
    }

    #[test]
    fn explicit_signature_selects_the_wider_overload() {
        let gauge = handle(Gauge::default());
        let explicit = Signature::new(vec![TypeTag::Long, TypeTag::Str]);
        invoke_method(
            &gauge,
            "configure",
            &explicit,
            vec![Value::Int(1), Value::Str("a".into())],
        )
        .expect("invoke");
        assert_eq!(mode(&gauge), Value::Str("configure/long".into()));
    }

    #[test]
    fn inferred_signature_selects_the_narrow_overload() {
        let gauge = handle(Gauge::default());
        let args = vec![Value::Int(1), Value::Str("a".into())];
        let inferred = Signature::infer(&args);
        invoke_method(&gauge, "configure", &inferred, args).expect("invoke");
        assert_eq!(mode(&gauge), Value::Str("configure/int".into()));
    }

    #[test]
    fn unmatched_signature_is_an_error() {
        let gauge = handle(Gauge::default());
        let sig = Signature::new(vec![TypeTag::Bool]);
        assert!(matches!(
            invoke_method(&gauge, "configure", &sig, vec![Value::Bool(true)]),
            Err(GraftError::MethodMismatch { .. })
        ));
    }
}
