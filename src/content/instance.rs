//! Instances of compiled content types.

use std::any::Any;
use std::fmt;

use crate::errors::{ConformResult, Error};
use crate::properties::{MappingValue, SequenceValue, Slot};
use crate::schema::{Invalid, Position};
use crate::value::Value;

use super::compiler::ContentType;

/// One object of a compiled content type.
///
/// Attribute storage is private and never aliased to constructor input.
/// Reads return the last validated value without re-validating; every write
/// funnels through the field's property, the identical path construction
/// used, so construction and mutation can never diverge in what they
/// accept. Unlike sub-records, the top level rejects undeclared names on
/// both read and write.
pub struct Instance {
    ty: ContentType,
    record: MappingValue,
    base: Option<Box<dyn Any + Send + Sync>>,
}

impl Instance {
    pub(crate) fn new(
        ty: ContentType,
        record: MappingValue,
        base: Option<Box<dyn Any + Send + Sync>>,
    ) -> Self {
        Self { ty, record, base }
    }

    pub fn content_type(&self) -> &ContentType {
        &self.ty
    }

    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    /// The plain application value of a field.
    pub fn get(&self, name: &str) -> ConformResult<Value> {
        self.record.get(name)
    }

    /// The validated slot of a field, for live access to composites.
    pub fn slot(&self, name: &str) -> ConformResult<&Slot> {
        self.record.slot(name)
    }

    /// Assigns `raw` to a declared field, validating it first. Undeclared
    /// names are rejected; there is no ad-hoc storage on instances.
    pub fn set(&mut self, name: &str, raw: Value) -> ConformResult<()> {
        if !self.record.has_field(name) {
            return Err(Error::NoSuchAttribute(name.to_string()));
        }
        self.record.set(name, raw)
    }

    pub fn mapping(&self, name: &str) -> ConformResult<&MappingValue> {
        self.record.mapping(name)
    }

    pub fn mapping_mut(&mut self, name: &str) -> ConformResult<&mut MappingValue> {
        self.record.mapping_mut(name)
    }

    pub fn sequence(&self, name: &str) -> ConformResult<&SequenceValue> {
        self.record.sequence(name)
    }

    pub fn sequence_mut(&mut self, name: &str) -> ConformResult<&mut SequenceValue> {
        self.record.sequence_mut(name)
    }

    pub fn tuple(&self, name: &str) -> ConformResult<&[Value]> {
        self.record.tuple(name)
    }

    /// The plain application representation: top-level children in schema
    /// order, composites rendering their nested plain values.
    pub fn appstruct(&self) -> Value {
        self.record.appstruct()
    }

    /// Serializes to the wire representation via the schema.
    pub fn serialize(&self) -> ConformResult<Value> {
        Ok(self.ty.schema().serialize(&self.appstruct())?)
    }

    /// Serializes to JSON via the wire representation.
    pub fn serialize_json(&self) -> ConformResult<serde_json::Value> {
        Ok(self.serialize()?.to_json())
    }

    /// Applies a partial update from wire data.
    ///
    /// Only the supplied keys are validated (failures aggregated across
    /// just those keys) and applied through the same set path as direct
    /// assignment. Fields not supplied are skipped, never reset to
    /// defaults. Successfully validated fields apply even when sibling
    /// fields fail; keys naming no schema field are rejected after the
    /// supplied fields validate.
    pub fn deserialize_update(&mut self, cstruct: &Value) -> ConformResult<()> {
        let entries = match cstruct {
            Value::Mapping(entries) => entries,
            other => {
                return Err(
                    Invalid::new(self.ty.schema(), format!("{} is not a mapping", other)).into(),
                );
            }
        };

        let mut validated = Vec::new();
        let mut unknown = Vec::new();
        let mut error = Invalid::root(self.ty.schema());
        for (key, wire) in entries {
            match self.ty.schema().child_named(key) {
                Some(node) => match node.deserialize(wire) {
                    Ok(appstruct) => validated.push((key.clone(), appstruct)),
                    Err(e) => error.add(Position::Key(key.clone()), e),
                },
                None => unknown.push(key.clone()),
            }
        }

        for (key, appstruct) in validated {
            self.set(&key, appstruct)?;
        }
        if !error.is_empty() {
            return Err(error.into());
        }
        if !unknown.is_empty() {
            return Err(Error::UnexpectedKeywords { keys: unknown });
        }
        Ok(())
    }

    /// The attached base object, when the type was compiled with one.
    pub fn base<B: Any>(&self) -> Option<&B> {
        self.base.as_deref().and_then(|b| b.downcast_ref::<B>())
    }

    pub fn base_mut<B: Any>(&mut self) -> Option<&mut B> {
        self.base.as_deref_mut().and_then(|b| b.downcast_mut::<B>())
    }
}

impl PartialEq for Instance {
    /// Attribute-wise equality between instances of the same type.
    fn eq(&self, other: &Self) -> bool {
        self.ty.name() == other.ty.name() && self.appstruct() == other.appstruct()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.ty.name())
            .field("fields", &self.appstruct())
            .finish()
    }
}
