//! Per-node property descriptors and validated storage slots.
//!
//! A `Property` binds one schema node to a build contract: hand it raw
//! input, get back a validated `Slot` or a structured failure. The variant
//! is selected once per node when a content type is compiled: mapping
//! nodes get a live sub-record, sequence nodes a live list, tuple nodes an
//! atomic positional rebuild, every scalar the serialize-then-deserialize
//! round trip. Nesting recurses to arbitrary depth.
//!
//! A `Slot` is what instances actually store: every cell in it has already
//! passed its node's validation, and composite slots re-validate anything
//! later written into them.

mod leaf;
mod mapping;
mod sequence;
mod tuple;

pub use leaf::LeafProperty;
pub use mapping::{MappingProperty, MappingValue};
pub use sequence::{SequenceProperty, SequenceValue};
pub use tuple::TupleProperty;

use crate::errors::{ConformResult, Error};
use crate::schema::{NodeType, SchemaNode};
use crate::value::Value;

/// A shape-dispatched descriptor for one schema node.
#[derive(Debug, Clone)]
pub enum Property {
    Leaf(LeafProperty),
    Mapping(MappingProperty),
    Sequence(SequenceProperty),
    Tuple(TupleProperty),
}

impl Property {
    /// Builds the property for `node`, dispatching on its declared shape and
    /// recursing into composite children.
    ///
    /// Mapping children must carry non-empty names: they become attribute
    /// storage keys.
    pub fn for_node(node: &SchemaNode) -> ConformResult<Property> {
        match node.typ() {
            NodeType::Mapping { children } => {
                let mut properties = Vec::with_capacity(children.len());
                for child in children {
                    if child.name().is_empty() {
                        return Err(Error::UnnamedNode);
                    }
                    properties.push(Property::for_node(child)?);
                }
                Ok(Property::Mapping(MappingProperty::new(
                    node.clone(),
                    properties,
                )))
            }
            NodeType::Sequence {
                element,
                accept_scalar,
            } => {
                let element = Property::for_node(element)?;
                Ok(Property::Sequence(SequenceProperty::new(
                    node.clone(),
                    element,
                    *accept_scalar,
                )))
            }
            NodeType::Tuple { .. } => Ok(Property::Tuple(TupleProperty::new(node.clone()))),
            _ => Ok(Property::Leaf(LeafProperty::new(node.clone()))),
        }
    }

    /// The described node's name; the attribute key on instances.
    pub fn name(&self) -> &str {
        self.node().name()
    }

    pub fn node(&self) -> &SchemaNode {
        match self {
            Property::Leaf(p) => p.node(),
            Property::Mapping(p) => p.node(),
            Property::Sequence(p) => p.node(),
            Property::Tuple(p) => p.node(),
        }
    }

    /// Validates `raw` against the node and produces a storage slot.
    pub fn build(&self, raw: Value) -> ConformResult<Slot> {
        match self {
            Property::Leaf(p) => Ok(Slot::Scalar(p.build(&raw)?)),
            Property::Mapping(p) => Ok(Slot::Mapping(p.build(raw)?)),
            Property::Sequence(p) => Ok(Slot::Sequence(p.build(raw)?)),
            Property::Tuple(p) => p.build(&raw),
        }
    }
}

/// A validated storage cell on an instance or inside a composite value.
#[derive(Debug, Clone)]
pub enum Slot {
    /// A validated scalar application value.
    Scalar(Value),
    /// A live sub-record; mutating it re-validates per field.
    Mapping(MappingValue),
    /// A live list; mutating it re-validates per element.
    Sequence(SequenceValue),
    /// A validated positional record, rebuilt whole on every write.
    Tuple(Vec<Value>),
}

impl Slot {
    /// The plain application value, with composites rendering their nested
    /// representation.
    pub fn appstruct(&self) -> Value {
        match self {
            Slot::Scalar(v) => v.clone(),
            Slot::Mapping(m) => m.appstruct(),
            Slot::Sequence(s) => s.appstruct(),
            Slot::Tuple(items) => Value::Tuple(items.clone()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Slot::Scalar(_) => "scalar",
            Slot::Mapping(_) => "mapping",
            Slot::Sequence(_) => "sequence",
            Slot::Tuple(_) => "tuple",
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Slot::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&MappingValue> {
        match self {
            Slot::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut MappingValue> {
        match self {
            Slot::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&SequenceValue> {
        match self {
            Slot::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut SequenceValue> {
        match self {
            Slot::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Slot::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_shape() {
        let leaf = Property::for_node(&SchemaNode::string("s")).unwrap();
        assert!(matches!(leaf, Property::Leaf(_)));

        let mapping = Property::for_node(
            &SchemaNode::mapping("m").child(SchemaNode::string("a")),
        )
        .unwrap();
        assert!(matches!(mapping, Property::Mapping(_)));

        let sequence =
            Property::for_node(&SchemaNode::sequence("q", SchemaNode::integer("e"))).unwrap();
        assert!(matches!(sequence, Property::Sequence(_)));

        let tuple = Property::for_node(&SchemaNode::tuple(
            "t",
            vec![SchemaNode::integer("n")],
        ))
        .unwrap();
        assert!(matches!(tuple, Property::Tuple(_)));
    }

    #[test]
    fn test_unnamed_mapping_child_rejected() {
        let node = SchemaNode::mapping("m").child(SchemaNode::string(""));
        let err = Property::for_node(&node).unwrap_err();
        assert!(matches!(err, Error::UnnamedNode));
    }

    #[test]
    fn test_nested_dispatch_recurses() {
        // mapping-of-sequence-of-tuple-of-mapping compiles all the way down
        let node = SchemaNode::mapping("root").child(SchemaNode::sequence(
            "items",
            SchemaNode::tuple(
                "pair",
                vec![
                    SchemaNode::integer("n"),
                    SchemaNode::mapping("inner").child(SchemaNode::string("s")),
                ],
            ),
        ));
        assert!(Property::for_node(&node).is_ok());
    }

    #[test]
    fn test_slot_appstruct() {
        let slot = Slot::Scalar(Value::Int(3));
        assert_eq!(slot.appstruct(), Value::Int(3));
        assert_eq!(slot.kind(), "scalar");

        let slot = Slot::Tuple(vec![Value::Int(1), Value::String("a".into())]);
        assert_eq!(
            slot.appstruct(),
            Value::Tuple(vec![Value::Int(1), Value::String("a".into())])
        );
    }
}
