//! # Deep Structural Equality
//!
//! Used by `enum` and `uniqueItems`, and by `PartialEq for Value`.
//!
//! Variants must match. Numbers compare by raw IEEE value with no
//! tolerance (so `NaN` is unequal to itself and `0.0 == -0.0`). Arrays
//! compare element-wise in order. Objects compare by key set and per-key
//! value; key order is irrelevant.

use crate::value::Value;

/// Returns true if `a` and `b` are structurally equal.
pub fn equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, l)| y.get(k).is_some_and(|r| equal(l, r)))
        }
        _ => false,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::Map;
    use proptest::prelude::*;

    /// Values without NaN, so equality is reflexive.
    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-1.0e9f64..1.0e9).prop_map(Value::Number),
            "[a-zA-Z0-9_ ]{0,20}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,8}", inner, 0..8)
                    .prop_map(|m| Value::Object(m.into_iter().collect::<Map>())),
            ]
        })
    }

    /// Reverse the key order of every object in the tree.
    fn reorder(value: &Value) -> Value {
        match value {
            Value::Array(items) => Value::Array(items.iter().map(reorder).collect()),
            Value::Object(map) => Value::Object(
                map.iter()
                    .rev()
                    .map(|(k, v)| (k.clone(), reorder(v)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    proptest! {
        /// Every NaN-free value equals itself.
        #[test]
        fn equality_is_reflexive(value in arb_value()) {
            prop_assert!(equal(&value, &value));
        }

        /// Equality is symmetric.
        #[test]
        fn equality_is_symmetric(a in arb_value(), b in arb_value()) {
            prop_assert_eq!(equal(&a, &b), equal(&b, &a));
        }

        /// Object key order never affects equality.
        #[test]
        fn key_order_is_irrelevant(value in arb_value()) {
            prop_assert!(equal(&value, &reorder(&value)));
        }
    }
}
