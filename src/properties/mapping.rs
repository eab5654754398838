//! Mapping property and the live sub-record it produces.

use std::collections::BTreeMap;

use crate::errors::{ConformResult, Error};
use crate::schema::{Invalid, Position, SchemaNode};
use crate::value::Value;

use super::{Property, SequenceValue, Slot};

/// Property for a nested mapping node.
///
/// Building treats null as an empty record (required children then fail
/// their own validation individually), pre-checks the container shape, and
/// assigns every child before raising one aggregated failure. Input keys
/// that name no child are rejected with the distinct unexpected-keyword
/// error, checked only after field validation.
#[derive(Debug, Clone)]
pub struct MappingProperty {
    node: SchemaNode,
    children: Vec<Property>,
}

impl MappingProperty {
    pub(crate) fn new(node: SchemaNode, children: Vec<Property>) -> Self {
        Self { node, children }
    }

    pub fn node(&self) -> &SchemaNode {
        &self.node
    }

    pub fn children(&self) -> &[Property] {
        &self.children
    }

    /// Validates `raw` and produces the live sub-record.
    pub fn build(&self, raw: Value) -> ConformResult<MappingValue> {
        let mut data = match raw {
            Value::Null => BTreeMap::new(),
            Value::Mapping(entries) => entries,
            other => {
                return Err(Invalid::new(&self.node, format!("{} is not a mapping", other)).into());
            }
        };

        let mut entries = BTreeMap::new();
        let mut error = Invalid::root(&self.node);
        for child in &self.children {
            let raw_child = data.remove(child.name()).unwrap_or(Value::Null);
            match child.build(raw_child) {
                Ok(slot) => {
                    entries.insert(child.name().to_string(), slot);
                }
                Err(Error::Invalid(e)) => {
                    error.add(Position::Key(child.name().to_string()), e);
                }
                Err(other) => return Err(other),
            }
        }
        if !error.is_empty() {
            return Err(error.into());
        }
        if !data.is_empty() {
            return Err(Error::UnexpectedKeywords {
                keys: data.into_keys().collect(),
            });
        }

        let record = MappingValue {
            node: self.node.clone(),
            children: self.children.clone(),
            entries,
            extras: BTreeMap::new(),
        };
        self.node.validate_value(&record.appstruct())?;
        Ok(record)
    }
}

/// A live, mutable sub-record backed by a mapping schema node.
///
/// Every declared field holds a validated slot at all times. Writing a
/// declared field re-validates through that field's own property; writing an
/// undeclared name falls through to ad-hoc storage (the escape hatch for
/// attaching non-schema data to a sub-record: the top-level instance is
/// stricter and rejects unknown names).
#[derive(Debug, Clone)]
pub struct MappingValue {
    node: SchemaNode,
    children: Vec<Property>,
    entries: BTreeMap<String, Slot>,
    extras: BTreeMap<String, Value>,
}

impl MappingValue {
    /// Declared field names, in schema order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|c| c.name())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.children.iter().any(|c| c.name() == name)
    }

    /// The plain application value of a field (or of previously stored
    /// ad-hoc data). Unknown names fail with an attribute-not-found error.
    pub fn get(&self, name: &str) -> ConformResult<Value> {
        if let Some(slot) = self.entries.get(name) {
            return Ok(slot.appstruct());
        }
        if let Some(value) = self.extras.get(name) {
            return Ok(value.clone());
        }
        Err(Error::NoSuchAttribute(name.to_string()))
    }

    /// The validated slot of a declared field.
    pub fn slot(&self, name: &str) -> ConformResult<&Slot> {
        self.entries
            .get(name)
            .ok_or_else(|| Error::NoSuchAttribute(name.to_string()))
    }

    /// Assigns `raw` to the named field, re-validating through the field's
    /// property. Undeclared names go to ad-hoc storage unvalidated.
    pub fn set(&mut self, name: &str, raw: Value) -> ConformResult<()> {
        let Some(child) = self.children.iter().find(|c| c.name() == name) else {
            self.extras.insert(name.to_string(), raw);
            return Ok(());
        };
        match child.build(raw) {
            Ok(slot) => {
                self.entries.insert(name.to_string(), slot);
                Ok(())
            }
            Err(Error::Invalid(e)) => {
                let mut root = Invalid::root(&self.node);
                root.add(Position::Key(name.to_string()), e);
                Err(root.into())
            }
            Err(other) => Err(other),
        }
    }

    /// Reads back previously stored ad-hoc data.
    pub fn extra(&self, name: &str) -> Option<&Value> {
        self.extras.get(name)
    }

    pub fn mapping(&self, name: &str) -> ConformResult<&MappingValue> {
        match self.slot(name)? {
            Slot::Mapping(m) => Ok(m),
            other => Err(wrong_shape(name, "mapping", other)),
        }
    }

    pub fn mapping_mut(&mut self, name: &str) -> ConformResult<&mut MappingValue> {
        match self.slot_mut(name)? {
            Slot::Mapping(m) => Ok(m),
            other => Err(wrong_shape(name, "mapping", other)),
        }
    }

    pub fn sequence(&self, name: &str) -> ConformResult<&SequenceValue> {
        match self.slot(name)? {
            Slot::Sequence(s) => Ok(s),
            other => Err(wrong_shape(name, "sequence", other)),
        }
    }

    pub fn sequence_mut(&mut self, name: &str) -> ConformResult<&mut SequenceValue> {
        match self.slot_mut(name)? {
            Slot::Sequence(s) => Ok(s),
            other => Err(wrong_shape(name, "sequence", other)),
        }
    }

    pub fn tuple(&self, name: &str) -> ConformResult<&[Value]> {
        match self.slot(name)? {
            Slot::Tuple(items) => Ok(items),
            other => Err(wrong_shape(name, "tuple", other)),
        }
    }

    fn slot_mut(&mut self, name: &str) -> ConformResult<&mut Slot> {
        self.entries
            .get_mut(name)
            .ok_or_else(|| Error::NoSuchAttribute(name.to_string()))
    }

    /// The plain nested representation, declared fields only, in schema
    /// order. Ad-hoc data never serializes.
    pub fn appstruct(&self) -> Value {
        let mut out = BTreeMap::new();
        for child in &self.children {
            if let Some(slot) = self.entries.get(child.name()) {
                out.insert(child.name().to_string(), slot.appstruct());
            }
        }
        Value::Mapping(out)
    }
}

fn wrong_shape(name: &str, expected: &'static str, actual: &Slot) -> Error {
    Error::WrongShape {
        location: name.to_string(),
        expected,
        actual: actual.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn address_property() -> MappingProperty {
        let node = SchemaNode::mapping("address")
            .child(SchemaNode::string("city"))
            .child(SchemaNode::string("zip"));
        match Property::for_node(&node).unwrap() {
            Property::Mapping(p) => p,
            _ => unreachable!(),
        }
    }

    fn raw(json: serde_json::Value) -> Value {
        Value::from_json(json)
    }

    #[test]
    fn test_build_validates_all_fields() {
        let prop = address_property();
        let record = prop
            .build(raw(json!({"city": "NYC", "zip": "10001"})))
            .unwrap();
        assert_eq!(record.get("city").unwrap(), Value::String("NYC".into()));
        assert_eq!(record.get("zip").unwrap(), Value::String("10001".into()));
    }

    #[test]
    fn test_null_means_empty_record() {
        let prop = address_property();
        let err = prop.build(Value::Null).unwrap_err();
        // Required children still fail individually.
        let Error::Invalid(invalid) = err else {
            panic!("expected validation failure");
        };
        let dict = invalid.asdict();
        assert_eq!(dict[&"city".to_string()], "Required");
        assert_eq!(dict[&"zip".to_string()], "Required");
    }

    #[test]
    fn test_wrong_container_shape() {
        let prop = address_property();
        let err = prop.build(Value::Int(1)).unwrap_err();
        assert!(err.to_string().contains("is not a mapping"));
    }

    #[test]
    fn test_unexpected_keys_after_field_validation() {
        let prop = address_property();
        let err = prop
            .build(raw(json!({"city": "NYC", "zip": "10001", "planet": "Earth"})))
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedKeywords { ref keys } if keys == &["planet"]));

        // A field error wins over an unexpected key.
        let err = prop
            .build(raw(json!({"zip": "10001", "planet": "Earth"})))
            .unwrap_err();
        assert!(matches!(err, Error::Invalid(_)));
    }

    #[test]
    fn test_set_revalidates() {
        let prop = address_property();
        let mut record = prop
            .build(raw(json!({"city": "NYC", "zip": "10001"})))
            .unwrap();

        record.set("city", Value::String("Boston".into())).unwrap();
        assert_eq!(record.get("city").unwrap(), Value::String("Boston".into()));

        let err = record.set("city", Value::Int(7)).unwrap_err();
        let Error::Invalid(invalid) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(invalid.asdict()[&"city".to_string()], "7 is not a string");
        // Failed write leaves the previous value in place.
        assert_eq!(record.get("city").unwrap(), Value::String("Boston".into()));
    }

    #[test]
    fn test_ad_hoc_escape_hatch() {
        let prop = address_property();
        let mut record = prop
            .build(raw(json!({"city": "NYC", "zip": "10001"})))
            .unwrap();

        record.set("note", Value::String("scribble".into())).unwrap();
        assert_eq!(record.get("note").unwrap(), Value::String("scribble".into()));
        assert_eq!(record.extra("note"), Some(&Value::String("scribble".into())));

        // Ad-hoc data is invisible to the schema-shaped representation.
        let appstruct = record.appstruct();
        assert!(appstruct.as_mapping().unwrap().get("note").is_none());
    }

    #[test]
    fn test_unknown_read_fails() {
        let prop = address_property();
        let record = prop
            .build(raw(json!({"city": "NYC", "zip": "10001"})))
            .unwrap();
        assert!(matches!(
            record.get("nope"),
            Err(Error::NoSuchAttribute(_))
        ));
    }
}
