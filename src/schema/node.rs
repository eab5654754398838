//! Schema tree definitions and the serialize/deserialize engine.
//!
//! A `SchemaNode` describes one field: its shape (`NodeType`), an optional
//! default (substituted at serialize time for null input), an optional
//! missing substitute (applied at deserialize time; absent means required),
//! and an optional value validator.
//!
//! Wire values are string-leaved: `serialize` normalizes typed application
//! values down to strings, `deserialize` parses them back up, validating as
//! it goes. Running a value through `serialize` then `deserialize` is the
//! canonical way to both coerce and validate arbitrary input.
//!
//! # Invariants
//!
//! - Composite deserialization attempts every child and aggregates all
//!   failures into one `Invalid`; it never stops at the first bad child
//! - Null handling is uniform: defaults on the way out, missing
//!   substitutes (or "Required") on the way in
//! - Validators run only after type conversion succeeds

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use super::errors::{Invalid, Position};
use super::validators::Validator;
use crate::value::Value;

/// The declared shape of a schema node.
#[derive(Debug, Clone)]
pub enum NodeType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Integer,
    /// 64-bit floating point
    Float,
    /// Boolean
    Boolean,
    /// Calendar date (ISO-8601 `YYYY-MM-DD` on the wire)
    Date,
    /// Instant in time (RFC 3339 on the wire)
    DateTime,
    /// Named, heterogeneous record
    Mapping { children: Vec<SchemaNode> },
    /// Homogeneous repetition of one element node
    Sequence {
        element: Box<SchemaNode>,
        /// Accept a bare scalar as a one-element sequence.
        accept_scalar: bool,
    },
    /// Fixed-arity, positionally typed record
    Tuple { slots: Vec<SchemaNode> },
}

/// One node of a schema tree.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    name: String,
    typ: NodeType,
    default: Option<Value>,
    missing: Option<Value>,
    validator: Option<Validator>,
    description: Option<String>,
}

impl SchemaNode {
    pub fn new(name: impl Into<String>, typ: NodeType) -> Self {
        Self {
            name: name.into(),
            typ,
            default: None,
            missing: None,
            validator: None,
            description: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, NodeType::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, NodeType::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, NodeType::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, NodeType::Boolean)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, NodeType::Date)
    }

    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, NodeType::DateTime)
    }

    pub fn mapping(name: impl Into<String>) -> Self {
        Self::new(
            name,
            NodeType::Mapping {
                children: Vec::new(),
            },
        )
    }

    pub fn sequence(name: impl Into<String>, element: SchemaNode) -> Self {
        Self::new(
            name,
            NodeType::Sequence {
                element: Box::new(element),
                accept_scalar: false,
            },
        )
    }

    pub fn tuple(name: impl Into<String>, slots: Vec<SchemaNode>) -> Self {
        Self::new(name, NodeType::Tuple { slots })
    }

    /// Appends a child to a mapping node.
    ///
    /// # Panics
    ///
    /// Panics when called on a non-mapping node; attaching named children to
    /// a scalar is a schema-authoring bug, not a runtime condition.
    pub fn child(mut self, node: SchemaNode) -> Self {
        match &mut self.typ {
            NodeType::Mapping { children } => children.push(node),
            other => panic!(
                "cannot add child '{}' to a {} node",
                node.name,
                type_kind(other)
            ),
        }
        self
    }

    /// Marks a sequence node as accepting a bare scalar as a one-element
    /// sequence.
    ///
    /// # Panics
    ///
    /// Panics when called on a non-sequence node.
    pub fn accept_scalar(mut self) -> Self {
        match &mut self.typ {
            NodeType::Sequence { accept_scalar, .. } => *accept_scalar = true,
            other => panic!("accept_scalar applies to sequences, not {}", type_kind(other)),
        }
        self
    }

    /// Sets the value substituted at serialize time when the input is null.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the value substituted at deserialize time when the wire value is
    /// null. A node without a missing substitute is required.
    pub fn missing(mut self, value: impl Into<Value>) -> Self {
        self.missing = Some(value.into());
        self
    }

    /// Shorthand for `missing(Value::Null)`: the field may be absent and
    /// deserializes to null.
    pub fn optional(self) -> Self {
        self.missing(Value::Null)
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn typ(&self) -> &NodeType {
        &self.typ
    }

    /// The shape name, for dispatch and error messages.
    pub fn kind(&self) -> &'static str {
        type_kind(&self.typ)
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.typ, NodeType::Mapping { .. })
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.typ, NodeType::Sequence { .. })
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self.typ, NodeType::Tuple { .. })
    }

    pub fn is_scalar(&self) -> bool {
        !self.is_mapping() && !self.is_sequence() && !self.is_tuple()
    }

    /// Ordered child nodes: mapping children, tuple slots, or the sequence
    /// element as a one-node slice. Scalars have none.
    pub fn children(&self) -> &[SchemaNode] {
        match &self.typ {
            NodeType::Mapping { children } => children,
            NodeType::Tuple { slots } => slots,
            NodeType::Sequence { element, .. } => std::slice::from_ref(element.as_ref()),
            _ => &[],
        }
    }

    /// By-name child lookup among a mapping node's children.
    pub fn child_named(&self, name: &str) -> Option<&SchemaNode> {
        match &self.typ {
            NodeType::Mapping { children } => children.iter().find(|c| c.name == name),
            _ => None,
        }
    }

    /// Serializes an application value to its wire representation.
    ///
    /// Null input takes the node's default when one is declared. Composite
    /// shapes treat null as empty; scalar null passes through (deserialize
    /// decides between a missing substitute and "Required").
    pub fn serialize(&self, appstruct: &Value) -> Result<Value, Invalid> {
        let effective = if appstruct.is_null() {
            match &self.default {
                Some(default) => default,
                None => appstruct,
            }
        } else {
            appstruct
        };
        self.serialize_typ(effective)
    }

    fn serialize_typ(&self, value: &Value) -> Result<Value, Invalid> {
        match &self.typ {
            NodeType::String => match value {
                Value::Null => Ok(Value::Null),
                Value::String(s) => Ok(Value::String(s.clone())),
                other => Err(Invalid::new(self, format!("{} is not a string", other))),
            },
            NodeType::Integer => match value {
                Value::Null => Ok(Value::Null),
                Value::Int(i) => Ok(Value::String(i.to_string())),
                Value::Float(f) if f.fract() == 0.0 => {
                    Ok(Value::String((*f as i64).to_string()))
                }
                Value::String(s) => match s.trim().parse::<i64>() {
                    Ok(i) => Ok(Value::String(i.to_string())),
                    Err(_) => Err(Invalid::new(self, format!("{} is not a number", value))),
                },
                other => Err(Invalid::new(self, format!("{} is not a number", other))),
            },
            NodeType::Float => match value {
                Value::Null => Ok(Value::Null),
                Value::Int(i) => Ok(Value::String(i.to_string())),
                Value::Float(f) => Ok(Value::String(f.to_string())),
                Value::String(s) => match s.trim().parse::<f64>() {
                    Ok(f) => Ok(Value::String(f.to_string())),
                    Err(_) => Err(Invalid::new(self, format!("{} is not a number", value))),
                },
                other => Err(Invalid::new(self, format!("{} is not a number", other))),
            },
            NodeType::Boolean => match value {
                Value::Null => Ok(Value::Null),
                Value::Bool(b) => Ok(Value::String(if *b { "true" } else { "false" }.into())),
                other => Err(Invalid::new(self, format!("{} is not a boolean", other))),
            },
            NodeType::Date => match value {
                Value::Null => Ok(Value::Null),
                Value::Date(d) => Ok(Value::String(d.format("%Y-%m-%d").to_string())),
                Value::String(s) => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    Ok(d) => Ok(Value::String(d.format("%Y-%m-%d").to_string())),
                    Err(_) => Err(Invalid::new(self, format!("{} is not a valid date", value))),
                },
                other => Err(Invalid::new(self, format!("{} is not a valid date", other))),
            },
            NodeType::DateTime => match value {
                Value::Null => Ok(Value::Null),
                Value::DateTime(dt) => Ok(Value::String(dt.to_rfc3339())),
                Value::String(s) => match DateTime::parse_from_rfc3339(s) {
                    Ok(dt) => Ok(Value::String(dt.with_timezone(&Utc).to_rfc3339())),
                    Err(_) => Err(Invalid::new(
                        self,
                        format!("{} is not a valid datetime", value),
                    )),
                },
                other => Err(Invalid::new(
                    self,
                    format!("{} is not a valid datetime", other),
                )),
            },
            NodeType::Mapping { children } => {
                let empty = BTreeMap::new();
                let entries = match value {
                    Value::Null => &empty,
                    Value::Mapping(entries) => entries,
                    other => {
                        return Err(Invalid::new(self, format!("{} is not a mapping", other)));
                    }
                };
                let mut out = BTreeMap::new();
                let mut error = Invalid::root(self);
                for child in children {
                    let raw = entries.get(child.name()).unwrap_or(&Value::Null);
                    match child.serialize(raw) {
                        Ok(wire) => {
                            out.insert(child.name().to_string(), wire);
                        }
                        Err(e) => error.add(Position::Key(child.name().to_string()), e),
                    }
                }
                if !error.is_empty() {
                    return Err(error);
                }
                Ok(Value::Mapping(out))
            }
            NodeType::Sequence {
                element,
                accept_scalar,
            } => {
                let single;
                let items: &[Value] = match value {
                    Value::Null => &[],
                    Value::Sequence(items) | Value::Tuple(items) => items,
                    other if *accept_scalar => {
                        single = [other.clone()];
                        &single
                    }
                    other => {
                        return Err(Invalid::new(self, format!("{} is not iterable", other)));
                    }
                };
                let mut out = Vec::with_capacity(items.len());
                let mut error = Invalid::root(self);
                for (i, item) in items.iter().enumerate() {
                    match element.serialize(item) {
                        Ok(wire) => out.push(wire),
                        Err(e) => error.add(Position::Index(i), e),
                    }
                }
                if !error.is_empty() {
                    return Err(error);
                }
                Ok(Value::Sequence(out))
            }
            NodeType::Tuple { slots } => {
                let items = match value {
                    Value::Null => return Ok(Value::Null),
                    Value::Tuple(items) | Value::Sequence(items) => items,
                    other => {
                        return Err(Invalid::new(self, format!("{} is not iterable", other)));
                    }
                };
                if items.len() != slots.len() {
                    return Err(Invalid::new(
                        self,
                        format!(
                            "{} has an incorrect number of elements (expected {}, was {})",
                            value,
                            slots.len(),
                            items.len()
                        ),
                    ));
                }
                let mut out = Vec::with_capacity(slots.len());
                let mut error = Invalid::root(self);
                for (i, (slot, item)) in slots.iter().zip(items).enumerate() {
                    match slot.serialize(item) {
                        Ok(wire) => out.push(wire),
                        Err(e) => error.add(Position::Index(i), e),
                    }
                }
                if !error.is_empty() {
                    return Err(error);
                }
                Ok(Value::Tuple(out))
            }
        }
    }

    /// Deserializes a wire value to a validated application value.
    ///
    /// Null wire input takes the node's missing substitute when one is
    /// declared and fails with "Required" otherwise. The node's validator,
    /// if any, runs after type conversion.
    pub fn deserialize(&self, cstruct: &Value) -> Result<Value, Invalid> {
        if cstruct.is_null() {
            return match &self.missing {
                Some(missing) => Ok(missing.clone()),
                None => Err(Invalid::new(self, "Required")),
            };
        }
        let appstruct = self.deserialize_typ(cstruct)?;
        self.validate_value(&appstruct)?;
        Ok(appstruct)
    }

    /// Runs the node's declared validator, if any, against an application
    /// value. Deserialization calls this itself; callers that assemble
    /// validated values cell-by-cell use it to apply the node-level
    /// constraint to the finished whole.
    pub fn validate_value(&self, value: &Value) -> Result<(), Invalid> {
        match &self.validator {
            Some(validator) => validator.validate(self, value),
            None => Ok(()),
        }
    }

    fn deserialize_typ(&self, value: &Value) -> Result<Value, Invalid> {
        match &self.typ {
            NodeType::String => match value {
                Value::String(s) => Ok(Value::String(s.clone())),
                other => Err(Invalid::new(self, format!("{} is not a string", other))),
            },
            NodeType::Integer => match value {
                Value::Int(i) => Ok(Value::Int(*i)),
                Value::Float(f) if f.fract() == 0.0 => Ok(Value::Int(*f as i64)),
                Value::String(s) => match s.trim().parse::<i64>() {
                    Ok(i) => Ok(Value::Int(i)),
                    Err(_) => Err(Invalid::new(self, format!("{} is not a number", value))),
                },
                other => Err(Invalid::new(self, format!("{} is not a number", other))),
            },
            NodeType::Float => match value {
                Value::Int(i) => Ok(Value::Float(*i as f64)),
                Value::Float(f) => Ok(Value::Float(*f)),
                Value::String(s) => match s.trim().parse::<f64>() {
                    Ok(f) => Ok(Value::Float(f)),
                    Err(_) => Err(Invalid::new(self, format!("{} is not a number", value))),
                },
                other => Err(Invalid::new(self, format!("{} is not a number", other))),
            },
            NodeType::Boolean => match value {
                Value::Bool(b) => Ok(Value::Bool(*b)),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" => Ok(Value::Bool(true)),
                    "false" | "0" => Ok(Value::Bool(false)),
                    _ => Err(Invalid::new(self, format!("{} is not a boolean", value))),
                },
                other => Err(Invalid::new(self, format!("{} is not a boolean", other))),
            },
            NodeType::Date => match value {
                Value::Date(d) => Ok(Value::Date(*d)),
                Value::String(s) => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    Ok(d) => Ok(Value::Date(d)),
                    Err(_) => Err(Invalid::new(self, format!("{} is not a valid date", value))),
                },
                other => Err(Invalid::new(self, format!("{} is not a valid date", other))),
            },
            NodeType::DateTime => match value {
                Value::DateTime(dt) => Ok(Value::DateTime(*dt)),
                Value::String(s) => match DateTime::parse_from_rfc3339(s) {
                    Ok(dt) => Ok(Value::DateTime(dt.with_timezone(&Utc))),
                    Err(_) => Err(Invalid::new(
                        self,
                        format!("{} is not a valid datetime", value),
                    )),
                },
                other => Err(Invalid::new(
                    self,
                    format!("{} is not a valid datetime", other),
                )),
            },
            NodeType::Mapping { children } => {
                let entries = match value {
                    Value::Mapping(entries) => entries,
                    other => {
                        return Err(Invalid::new(self, format!("{} is not a mapping", other)));
                    }
                };
                // Unknown keys are ignored here; rejecting them is the
                // content layer's concern, where the error kind differs.
                let mut out = BTreeMap::new();
                let mut error = Invalid::root(self);
                for child in children {
                    let raw = entries.get(child.name()).unwrap_or(&Value::Null);
                    match child.deserialize(raw) {
                        Ok(appstruct) => {
                            out.insert(child.name().to_string(), appstruct);
                        }
                        Err(e) => error.add(Position::Key(child.name().to_string()), e),
                    }
                }
                if !error.is_empty() {
                    return Err(error);
                }
                Ok(Value::Mapping(out))
            }
            NodeType::Sequence {
                element,
                accept_scalar,
            } => {
                let single;
                let items: &[Value] = match value {
                    Value::Sequence(items) | Value::Tuple(items) => items,
                    other if *accept_scalar => {
                        single = [other.clone()];
                        &single
                    }
                    other => {
                        return Err(Invalid::new(self, format!("{} is not iterable", other)));
                    }
                };
                let mut out = Vec::with_capacity(items.len());
                let mut error = Invalid::root(self);
                for (i, item) in items.iter().enumerate() {
                    match element.deserialize(item) {
                        Ok(appstruct) => out.push(appstruct),
                        Err(e) => error.add(Position::Index(i), e),
                    }
                }
                if !error.is_empty() {
                    return Err(error);
                }
                Ok(Value::Sequence(out))
            }
            NodeType::Tuple { slots } => {
                let items = match value {
                    Value::Tuple(items) | Value::Sequence(items) => items,
                    other => {
                        return Err(Invalid::new(self, format!("{} is not iterable", other)));
                    }
                };
                if items.len() != slots.len() {
                    return Err(Invalid::new(
                        self,
                        format!(
                            "{} has an incorrect number of elements (expected {}, was {})",
                            value,
                            slots.len(),
                            items.len()
                        ),
                    ));
                }
                let mut out = Vec::with_capacity(slots.len());
                let mut error = Invalid::root(self);
                for (i, (slot, item)) in slots.iter().zip(items).enumerate() {
                    match slot.deserialize(item) {
                        Ok(appstruct) => out.push(appstruct),
                        Err(e) => error.add(Position::Index(i), e),
                    }
                }
                if !error.is_empty() {
                    return Err(error);
                }
                Ok(Value::Tuple(out))
            }
        }
    }
}

fn type_kind(typ: &NodeType) -> &'static str {
    match typ {
        NodeType::String => "string",
        NodeType::Integer => "integer",
        NodeType::Float => "float",
        NodeType::Boolean => "boolean",
        NodeType::Date => "date",
        NodeType::DateTime => "datetime",
        NodeType::Mapping { .. } => "mapping",
        NodeType::Sequence { .. } => "sequence",
        NodeType::Tuple { .. } => "tuple",
    }
}
