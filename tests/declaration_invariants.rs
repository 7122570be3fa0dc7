//! Declaration Protocol Invariant Tests
//!
//! - No name may be declared twice, in any combination of entry points
//! - A failed declaration leaves the schema unmodified for that call
//! - Declaration order is preserved
//! - Declaration is closed once the schema is frozen

use serde_json::json;
use stricthash::{AttributeDefault, Key, RecordError, RecordType, Schema};

// =============================================================================
// Helper Functions
// =============================================================================

fn declared_names(schema: &Schema) -> Vec<&str> {
    schema.keys().map(Key::as_str).collect()
}

// =============================================================================
// Duplicate Declaration Tests
// =============================================================================

/// Every pair of declaration entry points conflicts on the same name.
#[test]
fn test_duplicate_rejected_across_all_entry_points() {
    type Declare = fn(&mut Schema, &str) -> Result<(), RecordError>;
    let forms: [(&str, Declare); 6] = [
        ("attribute", |s, n| s.attribute(n, json!(1))),
        ("attribute_factory", |s, n| s.attribute_factory(n, || json!(1))),
        ("attributes", |s, n| s.attributes([(n, json!(1))])),
        ("predicate", |s, n| s.predicate(n, json!(true))),
        ("predicate_factory", |s, n| s.predicate_factory(n, || json!(true))),
        ("predicates", |s, n| s.predicates([(n, json!(true))])),
    ];

    for (first_name, first) in &forms {
        for (second_name, second) in &forms {
            let mut schema = Schema::new();
            first(&mut schema, "shared").unwrap();

            let err = second(&mut schema, "shared").unwrap_err();
            assert_eq!(
                err.code(),
                "INVALID_DECLARATION",
                "{first_name} then {second_name}"
            );
            assert_eq!(schema.len(), 1, "{first_name} then {second_name}");
        }
    }
}

/// The first declaration survives a later conflicting one untouched.
#[test]
fn test_first_declaration_intact_after_conflict() {
    let mut schema = Schema::new();
    schema.attribute("a", json!("original")).unwrap();

    assert!(schema.predicate("a", json!(false)).is_err());

    let spec = schema.get("a").unwrap();
    assert!(!spec.is_predicate());
    match spec.default() {
        AttributeDefault::Literal(value) => assert_eq!(*value.borrow(), json!("original")),
        AttributeDefault::Factory(_) => panic!("expected literal default"),
    }
}

// =============================================================================
// Name Validation Tests
// =============================================================================

/// Names outside symbol shape fail and change nothing.
#[test]
fn test_non_symbol_names_rejected() {
    let mut schema = Schema::new();
    for bad in ["", "9lives", "white space", "hy-phen", "dot.path"] {
        let err = schema.attribute(bad, json!(1)).unwrap_err();
        assert_eq!(err.code(), "INVALID_DECLARATION", "{bad:?}");
    }
    assert!(schema.is_empty());
}

/// Predicate-style names with a trailing marker are declarable.
#[test]
fn test_query_style_names_accepted() {
    let mut schema = Schema::new();
    schema.predicate("verbose?", json!(false)).unwrap();
    assert!(schema.contains("verbose?"));
}

// =============================================================================
// Ordering Tests
// =============================================================================

/// Declaration order is preserved across mixed entry points.
#[test]
fn test_mixed_declaration_order() {
    let mut schema = Schema::new();
    schema.attribute("first", json!(1)).unwrap();
    schema
        .attributes([("second", json!(2)), ("third", json!(3))])
        .unwrap();
    schema.predicate("fourth", json!(false)).unwrap();
    schema.attribute_factory("fifth", || json!([])).unwrap();

    assert_eq!(
        declared_names(&schema),
        vec!["first", "second", "third", "fourth", "fifth"]
    );
}

/// Bulk declaration applies entries up to the first conflict, then stops.
#[test]
fn test_bulk_short_circuit_keeps_prefix() {
    let mut schema = Schema::new();
    schema.attribute("conflict", json!(0)).unwrap();

    let result = schema.attributes([
        ("before", json!(1)),
        ("conflict", json!(2)),
        ("after", json!(3)),
    ]);

    assert!(result.is_err());
    assert_eq!(declared_names(&schema), vec!["conflict", "before"]);
}

// =============================================================================
// Two-Phase Lifecycle Tests
// =============================================================================

/// A frozen schema rejects every declaration form with NOT_PERMITTED.
#[test]
fn test_frozen_schema_rejects_all_forms() {
    let mut schema = Schema::new();
    schema.attribute("a", json!(1)).unwrap();
    schema.freeze();

    assert_eq!(
        schema.attribute("b", json!(1)).unwrap_err(),
        RecordError::DeclarationClosed
    );
    assert_eq!(
        schema.attribute_factory("b", || json!(1)).unwrap_err(),
        RecordError::DeclarationClosed
    );
    assert_eq!(
        schema.attributes([("b", json!(1))]).unwrap_err(),
        RecordError::DeclarationClosed
    );
    assert_eq!(
        schema.predicate("b", json!(1)).unwrap_err(),
        RecordError::DeclarationClosed
    );
    assert_eq!(RecordError::DeclarationClosed.code(), "NOT_PERMITTED");
}

/// The closure-built type hands out an already-frozen schema.
#[test]
fn test_defined_type_is_frozen() {
    let ty = RecordType::define("Frozen", |schema| schema.attribute("a", json!(1))).unwrap();
    assert!(ty.schema().is_frozen());
}

/// A declaration error inside the defining closure aborts the definition.
#[test]
fn test_definition_aborts_on_declaration_error() {
    let result = RecordType::define("Broken", |schema| {
        schema.attribute("a", json!(1))?;
        schema.attribute("a", json!(2))?;
        Ok(())
    });
    assert_eq!(
        result.unwrap_err(),
        RecordError::DuplicateAttribute("a".into())
    );
}

// =============================================================================
// Subtype Declaration Tests
// =============================================================================

/// A subtype extends the parent's schema without touching the parent.
#[test]
fn test_extend_leaves_parent_alone() {
    let parent = RecordType::define("Parent", |schema| {
        schema.attributes([("a", json!(1)), ("b", json!(2))])
    })
    .unwrap();

    let child = parent
        .extend("Child", |schema| schema.attribute("c", json!(3)))
        .unwrap();

    assert_eq!(declared_names(parent.schema()), vec!["a", "b"]);
    assert_eq!(declared_names(child.schema()), vec!["a", "b", "c"]);
    assert!(parent.schema().is_frozen());
    assert!(child.schema().is_frozen());
}

/// Parent attribute names conflict in the subtype's defining closure.
#[test]
fn test_extend_conflicts_with_parent_names() {
    let parent = RecordType::define("Parent", |schema| schema.attribute("a", json!(1))).unwrap();

    let err = parent
        .extend("Child", |schema| schema.predicate("a", json!(false)))
        .unwrap_err();
    assert_eq!(err, RecordError::DuplicateAttribute("a".into()));
}
