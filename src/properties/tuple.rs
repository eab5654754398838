//! Tuple property: fixed-arity, positionally typed, rebuilt atomically.

use crate::errors::ConformResult;
use crate::schema::SchemaNode;
use crate::value::Value;

use super::Slot;

/// Property for a fixed-arity tuple node.
///
/// Unlike sequences, no per-element proxies persist across calls: every
/// assignment pre-checks the container shape and arity, validates each
/// positional slot against its own child node (aggregating per-position
/// failures), and reconstructs the whole tuple of plain validated values
/// atomically.
#[derive(Debug, Clone)]
pub struct TupleProperty {
    node: SchemaNode,
}

impl TupleProperty {
    pub(crate) fn new(node: SchemaNode) -> Self {
        Self { node }
    }

    pub fn node(&self) -> &SchemaNode {
        &self.node
    }

    /// Validates `raw` through the node round trip and rebuilds the tuple.
    pub fn build(&self, raw: &Value) -> ConformResult<Slot> {
        let wire = self.node.serialize(raw)?;
        let appstruct = self.node.deserialize(&wire)?;
        Ok(match appstruct {
            Value::Tuple(items) => Slot::Tuple(items),
            // A declared missing substitute need not be tuple-shaped.
            other => Slot::Scalar(other),
        })
    }
}
