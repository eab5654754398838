//! Value validators applied after type deserialization.
//!
//! A validator constrains an already type-converted application value:
//! numeric bounds, length bounds, pattern matching, enumeration membership.
//! Validators run inside `SchemaNode::deserialize`, after the node's type
//! has produced an appstruct, so a validator failure reports through the
//! same `Invalid` channel as a type failure.

use regex::Regex;

use super::errors::Invalid;
use super::node::SchemaNode;
use crate::value::Value;

/// A constraint on a deserialized value.
#[derive(Debug, Clone)]
pub enum Validator {
    /// Inclusive numeric bounds; applies to int and float values.
    Range { min: Option<f64>, max: Option<f64> },
    /// Inclusive length bounds; applies to strings (character count) and
    /// sequences (element count).
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },
    /// Pattern match over the whole of a string value.
    Regex(Regex),
    /// Membership in a fixed set of permitted values.
    OneOf(Vec<Value>),
}

impl Validator {
    pub fn range(min: impl Into<Option<f64>>, max: impl Into<Option<f64>>) -> Self {
        Validator::Range {
            min: min.into(),
            max: max.into(),
        }
    }

    pub fn length(min: impl Into<Option<usize>>, max: impl Into<Option<usize>>) -> Self {
        Validator::Length {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Compiles `pattern`; fails on an invalid regular expression.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Validator::Regex(Regex::new(pattern)?))
    }

    pub fn one_of<I: IntoIterator<Item = Value>>(choices: I) -> Self {
        Validator::OneOf(choices.into_iter().collect())
    }

    /// Checks `value` against this constraint, reporting at `node`.
    pub fn validate(&self, node: &SchemaNode, value: &Value) -> Result<(), Invalid> {
        match self {
            Validator::Range { min, max } => {
                let number = value
                    .as_float()
                    .ok_or_else(|| Invalid::new(node, format!("{} is not a number", value)))?;
                if let Some(min) = min {
                    if number < *min {
                        return Err(Invalid::new(
                            node,
                            format!("{} is less than minimum value {}", value, min),
                        ));
                    }
                }
                if let Some(max) = max {
                    if number > *max {
                        return Err(Invalid::new(
                            node,
                            format!("{} is greater than maximum value {}", value, max),
                        ));
                    }
                }
                Ok(())
            }
            Validator::Length { min, max } => {
                let len = match value {
                    Value::String(s) => s.chars().count(),
                    Value::Sequence(items) | Value::Tuple(items) => items.len(),
                    other => {
                        return Err(Invalid::new(node, format!("{} has no length", other)));
                    }
                };
                if let Some(min) = min {
                    if len < *min {
                        return Err(Invalid::new(
                            node,
                            format!("shorter than minimum length {}", min),
                        ));
                    }
                }
                if let Some(max) = max {
                    if len > *max {
                        return Err(Invalid::new(
                            node,
                            format!("longer than maximum length {}", max),
                        ));
                    }
                }
                Ok(())
            }
            Validator::Regex(pattern) => match value {
                Value::String(s) if pattern.is_match(s) => Ok(()),
                Value::String(_) => Err(Invalid::new(
                    node,
                    "string does not match expected pattern",
                )),
                other => Err(Invalid::new(node, format!("{} is not a string", other))),
            },
            Validator::OneOf(choices) => {
                if choices.contains(value) {
                    Ok(())
                } else {
                    Err(Invalid::new(
                        node,
                        format!("{} is not one of the permitted choices", value),
                    ))
                }
            }
        }
    }
}
