//! Nested Structure Invariant Tests
//!
//! Mapping sub-records, tuples, and deep composition:
//! - Aggregated errors name every failing leaf across branches
//! - Sub-records re-validate per field and allow ad-hoc extras
//! - Tuples rebuild atomically with per-position failures
//! - Arbitrary nesting depth compiles and validates

use conform::{ContentType, Error, SchemaNode, Value};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn profile_type() -> ContentType {
    let schema = SchemaNode::mapping("profile")
        .child(SchemaNode::string("name"))
        .child(
            SchemaNode::mapping("address")
                .child(SchemaNode::string("city"))
                .child(SchemaNode::integer("zip")),
        )
        .child(
            SchemaNode::mapping("employment")
                .child(SchemaNode::string("company"))
                .child(SchemaNode::integer("years")),
        );
    ContentType::compile(&schema, "Profile").unwrap()
}

fn raw(json: serde_json::Value) -> Value {
    Value::from_json(json)
}

// =============================================================================
// Aggregated Nested Errors
// =============================================================================

/// Two independently-invalid leaves in different branches both appear in one
/// error report.
#[test]
fn test_two_branch_failures_in_one_report() {
    let ty = profile_type();
    let err = ty
        .construct(raw(json!({
            "name": "Joe",
            "address": {"city": "NYC", "zip": "not a zip"},
            "employment": {"company": "Acme", "years": "many"}
        })))
        .unwrap_err();

    let Error::Invalid(invalid) = err else {
        panic!("expected validation failure");
    };
    let dict = invalid.asdict();
    assert_eq!(dict[&"address.zip".to_string()], "\"not a zip\" is not a number");
    assert_eq!(dict[&"employment.years".to_string()], "\"many\" is not a number");
    assert!(!dict.contains_key(&"name".to_string()));
}

#[test]
fn test_missing_nested_record_reports_its_children() {
    let ty = profile_type();
    let err = ty
        .construct(raw(json!({
            "name": "Joe",
            "employment": {"company": "Acme", "years": 3}
        })))
        .unwrap_err();

    let Error::Invalid(invalid) = err else {
        panic!("expected validation failure");
    };
    // A missing sub-record means all of its required fields are missing.
    let dict = invalid.asdict();
    assert_eq!(dict[&"address.city".to_string()], "Required");
    assert_eq!(dict[&"address.zip".to_string()], "Required");
}

#[test]
fn test_wrong_container_shape_reported_at_field() {
    let ty = profile_type();
    let err = ty
        .construct(raw(json!({
            "name": "Joe",
            "address": 7,
            "employment": {"company": "Acme", "years": 3}
        })))
        .unwrap_err();

    let Error::Invalid(invalid) = err else {
        panic!("expected validation failure");
    };
    assert_eq!(
        invalid.asdict()[&"address".to_string()],
        "7 is not a mapping"
    );
}

// =============================================================================
// Sub-Record Behavior
// =============================================================================

#[test]
fn test_sub_record_reads_and_writes() {
    let ty = profile_type();
    let mut joe = ty
        .construct(raw(json!({
            "name": "Joe",
            "address": {"city": "NYC", "zip": 10001},
            "employment": {"company": "Acme", "years": 3}
        })))
        .unwrap();

    let address = joe.mapping_mut("address").unwrap();
    assert_eq!(address.get("city").unwrap(), Value::String("NYC".into()));

    address.set("city", Value::from("Boston")).unwrap();
    assert_eq!(address.get("city").unwrap(), Value::String("Boston".into()));

    // The write is visible through the instance's serialization.
    assert_eq!(
        joe.serialize_json().unwrap()["address"]["city"],
        json!("Boston")
    );
}

#[test]
fn test_sub_record_write_failure_keyed_by_field() {
    let ty = profile_type();
    let mut joe = ty
        .construct(raw(json!({
            "name": "Joe",
            "address": {"city": "NYC", "zip": 10001},
            "employment": {"company": "Acme", "years": 3}
        })))
        .unwrap();

    let address = joe.mapping_mut("address").unwrap();
    let err = address.set("zip", Value::from("nope")).unwrap_err();
    let Error::Invalid(invalid) = err else {
        panic!("expected validation failure");
    };
    // Relative to the sub-record, not prefixed by "address".
    assert_eq!(invalid.asdict()[&"zip".to_string()], "\"nope\" is not a number");
}

#[test]
fn test_sub_record_ad_hoc_attributes() {
    let ty = profile_type();
    let mut joe = ty
        .construct(raw(json!({
            "name": "Joe",
            "address": {"city": "NYC", "zip": 10001},
            "employment": {"company": "Acme", "years": 3}
        })))
        .unwrap();

    let address = joe.mapping_mut("address").unwrap();
    // Undeclared names fall through to ad-hoc storage on sub-records.
    address.set("plus_four", Value::from(1234)).unwrap();
    assert_eq!(address.get("plus_four").unwrap(), Value::Int(1234));
    // But an undeclared read that was never written still fails.
    assert!(matches!(
        address.get("country"),
        Err(Error::NoSuchAttribute(_))
    ));

    // Ad-hoc data stays out of the wire representation.
    let wire = joe.serialize_json().unwrap();
    assert!(wire["address"].get("plus_four").is_none());
}

#[test]
fn test_reassigning_whole_sub_record() {
    let ty = profile_type();
    let mut joe = ty
        .construct(raw(json!({
            "name": "Joe",
            "address": {"city": "NYC", "zip": 10001},
            "employment": {"company": "Acme", "years": 3}
        })))
        .unwrap();

    joe.set("address", raw(json!({"city": "Chicago", "zip": 60601})))
        .unwrap();
    assert_eq!(
        joe.mapping("address").unwrap().get("city").unwrap(),
        Value::String("Chicago".into())
    );

    // Unknown keys in the new record are rejected.
    assert!(matches!(
        joe.set(
            "address",
            raw(json!({"city": "Austin", "zip": 73301, "planet": "Earth"}))
        ),
        Err(Error::UnexpectedKeywords { .. })
    ));
}

// =============================================================================
// Tuple Behavior
// =============================================================================

fn measurement_type() -> ContentType {
    // (sequence-of-int, string)
    let schema = SchemaNode::mapping("measurement").child(SchemaNode::tuple(
        "reading",
        vec![
            SchemaNode::sequence("samples", SchemaNode::integer("sample")),
            SchemaNode::string("unit"),
        ],
    ));
    ContentType::compile(&schema, "Measurement").unwrap()
}

#[test]
fn test_tuple_construct_and_read() {
    let ty = measurement_type();
    let m = ty
        .construct(raw(json!({"reading": [[1, 2, 3], "volts"]})))
        .unwrap();
    assert_eq!(
        m.tuple("reading").unwrap(),
        &[
            Value::Sequence(ints(&[1, 2, 3])),
            Value::String("volts".into())
        ]
    );
}

/// Both bad inner sequence positions are cited.
#[test]
fn test_tuple_inner_sequence_failures_aggregate() {
    let ty = measurement_type();
    let err = ty
        .construct(raw(json!({"reading": [["one", "two"], "abc"]})))
        .unwrap_err();
    let Error::Invalid(invalid) = err else {
        panic!("expected validation failure");
    };
    let dict = invalid.asdict();
    assert_eq!(
        dict[&"reading[0][0]".to_string()],
        "\"one\" is not a number"
    );
    assert_eq!(
        dict[&"reading[0][1]".to_string()],
        "\"two\" is not a number"
    );
}

/// A non-iterable first slot is cited as slot 0.
#[test]
fn test_tuple_non_iterable_slot_cited() {
    let ty = measurement_type();
    let err = ty
        .construct(raw(json!({"reading": [1, "abc"]})))
        .unwrap_err();
    let Error::Invalid(invalid) = err else {
        panic!("expected validation failure");
    };
    assert_eq!(
        invalid.asdict()[&"reading[0]".to_string()],
        "1 is not iterable"
    );
}

#[test]
fn test_tuple_reassignment_is_atomic() {
    let ty = measurement_type();
    let mut m = ty
        .construct(raw(json!({"reading": [[1, 2], "volts"]})))
        .unwrap();

    // A failed reassignment leaves the previous tuple fully intact.
    assert!(m
        .set("reading", raw(json!([[3, "x"], "amps"])))
        .is_err());
    assert_eq!(
        m.tuple("reading").unwrap(),
        &[
            Value::Sequence(ints(&[1, 2])),
            Value::String("volts".into())
        ]
    );

    m.set("reading", raw(json!([[9], "amps"]))).unwrap();
    assert_eq!(
        m.tuple("reading").unwrap(),
        &[Value::Sequence(ints(&[9])), Value::String("amps".into())]
    );
}

#[test]
fn test_tuple_arity_mismatch() {
    let ty = measurement_type();
    let err = ty
        .construct(raw(json!({"reading": [[1, 2]]})))
        .unwrap_err();
    let Error::Invalid(invalid) = err else {
        panic!("expected validation failure");
    };
    assert!(invalid.asdict()[&"reading".to_string()]
        .contains("incorrect number of elements (expected 2, was 1)"));
}

// =============================================================================
// Deep Nesting
// =============================================================================

/// mapping-of-sequence-of-tuple-of-mapping round trips and reports deep
/// failures with full relative paths.
#[test]
fn test_arbitrary_nesting_depth() {
    let schema = SchemaNode::mapping("ledger").child(SchemaNode::sequence(
        "entries",
        SchemaNode::tuple(
            "entry",
            vec![
                SchemaNode::integer("amount"),
                SchemaNode::mapping("party")
                    .child(SchemaNode::string("id"))
                    .child(SchemaNode::string("role")),
            ],
        ),
    ));
    let ty = ContentType::compile(&schema, "Ledger").unwrap();

    let ledger = ty
        .construct(raw(json!({
            "entries": [
                [100, {"id": "a1", "role": "payer"}],
                [-100, {"id": "b2", "role": "payee"}]
            ]
        })))
        .unwrap();
    let again = ty.deserialize(&ledger.serialize().unwrap()).unwrap();
    assert_eq!(ledger, again);

    let err = ty
        .construct(raw(json!({
            "entries": [
                [100, {"id": "a1", "role": "payer"}],
                ["x", {"id": "b2", "role": "payee"}]
            ]
        })))
        .unwrap_err();
    let Error::Invalid(invalid) = err else {
        panic!("expected validation failure");
    };
    assert_eq!(
        invalid.asdict()[&"entries[1][0]".to_string()],
        "\"x\" is not a number"
    );

    // A hole deep in the tree reports its full relative path.
    let err = ty
        .construct(raw(json!({"entries": [[100, {"id": "a1"}]]})))
        .unwrap_err();
    let Error::Invalid(invalid) = err else {
        panic!("expected validation failure");
    };
    assert_eq!(
        invalid.asdict()[&"entries[0][1].role".to_string()],
        "Required"
    );
}

// =============================================================================
// Helpers
// =============================================================================

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|&i| Value::Int(i)).collect()
}
