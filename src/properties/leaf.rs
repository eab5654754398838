//! Scalar property: the serialize-then-deserialize round trip.

use crate::schema::{Invalid, SchemaNode};
use crate::value::Value;

/// Property for a scalar schema node.
///
/// Every write runs `deserialize(serialize(raw))`: serialize first
/// normalizes arbitrary input (including already-typed application values)
/// into the node's wire shape, and deserialize then validates and fills in
/// declared defaults for null input. Construction and later mutation share
/// this path, so they can never diverge in what they accept.
#[derive(Debug, Clone)]
pub struct LeafProperty {
    node: SchemaNode,
}

impl LeafProperty {
    pub(crate) fn new(node: SchemaNode) -> Self {
        Self { node }
    }

    pub fn node(&self) -> &SchemaNode {
        &self.node
    }

    /// Validates `raw` through the round trip and returns the stored value.
    pub fn build(&self, raw: &Value) -> Result<Value, Invalid> {
        let wire = self.node.serialize(raw)?;
        self.node.deserialize(&wire)
    }
}
