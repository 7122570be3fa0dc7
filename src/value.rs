//! Attribute value storage
//!
//! Values are JSON values behind `Rc<RefCell<_>>` so that a literal default
//! declared once is aliased into every instance constructed from it: in-place
//! mutation through one instance is visible through the others. Factory
//! defaults produce a fresh cell per construction instead.

use std::cell::RefCell;
use std::rc::Rc;

/// Attribute value type
pub type Value = serde_json::Value;

/// A shared, interior-mutable attribute value.
///
/// Assignment (`set`, overrides, merge) replaces the cell; only explicit
/// `borrow_mut` mutation flows through aliases.
pub type SharedValue = Rc<RefCell<Value>>;

/// Wraps a value in a fresh shared cell
pub fn shared(value: Value) -> SharedValue {
    Rc::new(RefCell::new(value))
}

/// Returns a deep, independent copy of the current value
pub fn snapshot(value: &SharedValue) -> Value {
    value.borrow().clone()
}

/// Boolean coercion for predicate queries.
///
/// Only `null` and `false` are falsy; every other value is truthy, including
/// `0`, `""`, `[]`, and `{}`. This is deliberately not value equality with
/// any literal.
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));

        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(0)));
        assert!(is_truthy(&json!("")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_snapshot_is_independent() {
        let cell = shared(json!([1, 2]));
        let mut copy = snapshot(&cell);
        copy.as_array_mut().unwrap().push(json!(3));
        assert_eq!(*cell.borrow(), json!([1, 2]));
    }

    #[test]
    fn test_aliasing_through_clone() {
        let cell = shared(json!([1]));
        let alias = Rc::clone(&cell);
        alias.borrow_mut().as_array_mut().unwrap().push(json!(2));
        assert_eq!(*cell.borrow(), json!([1, 2]));
    }
}
