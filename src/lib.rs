//! conform - compile declarative schemas into validated content types
//!
//! A schema tree describes a record: named fields, nested mappings,
//! sequences, tuples, scalar leaves with defaults and validators. The
//! compiler walks that tree once and produces a [`ContentType`] whose
//! instances carry one validated, mutable attribute per top-level field.
//! Nested values are live sub-objects: mutating a sequence element or a
//! sub-record field re-validates against the same schema node used at
//! construction time, so construction and mutation can never diverge in
//! what they accept.
//!
//! ```
//! use conform::{ContentType, SchemaNode, Value};
//!
//! let schema = SchemaNode::mapping("person")
//!     .child(SchemaNode::string("name"))
//!     .child(SchemaNode::integer("age"));
//! let person = ContentType::compile(&schema, "Person").unwrap();
//!
//! let mut joe = person
//!     .construct_from([("name", Value::from("Joe")), ("age", Value::from(35))])
//!     .unwrap();
//! joe.set("age", Value::from(40)).unwrap();
//! assert!(joe.set("age", Value::from("forty")).is_err());
//! ```

pub mod content;
pub mod errors;
pub mod properties;
pub mod registry;
pub mod schema;
pub mod value;

pub use content::{ContentType, Instance};
pub use errors::{ConformResult, Error};
pub use properties::{
    LeafProperty, MappingProperty, MappingValue, Property, SequenceProperty, SequenceValue, Slot,
    TupleProperty,
};
pub use registry::Registry;
pub use schema::{Invalid, NodeType, Position, SchemaNode, Validator};
pub use value::Value;
