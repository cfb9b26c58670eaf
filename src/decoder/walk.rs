//! Depth-tagged traversal of nested arrays.

use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;
use tensorgate_spec::Precision;

use super::coerce::push_leaf;
use crate::errors::InputErrorReason;
use crate::tensor::{DecodedTensor, TensorContent};

/// Return the payload of a `{"b64": "..."}` object.
pub(crate) fn b64_payload(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) if map.len() == 1 => map.get("b64").and_then(Value::as_str),
        _ => None,
    }
}

enum Leaves {
    /// No leaf has been visited yet.
    Pending,
    Numeric(Vec<u8>),
    Binary(Vec<Vec<u8>>),
}

/// Accumulates the shape and elements of one input.
///
/// The shape is discovered along the first path from the root to a leaf.
/// Every array visited afterwards must agree with it: an array at depth `d`
/// must have length `shape[d]`, and leaves may only appear at depth
/// `shape.len()`.
pub(crate) struct Walker {
    precision: Precision,
    shape: Vec<usize>,
    leaves: Leaves,
}

impl Walker {
    pub fn new(precision: Precision) -> Walker {
        Walker {
            precision,
            shape: Vec::new(),
            leaves: Leaves::Pending,
        }
    }

    /// Create a walker whose outermost dimension is already known.
    ///
    /// This is used to stack the values of row-format instances, which are
    /// then visited at depth 1.
    pub fn with_batch(precision: Precision, batch: usize) -> Walker {
        Walker {
            shape: vec![batch],
            ..Walker::new(precision)
        }
    }

    /// Visit the root value of an input, which must be an array.
    pub fn visit_root(&mut self, value: &Value) -> Result<(), InputErrorReason> {
        match value {
            Value::Array(_) => self.visit(value, 0),
            Value::Null => Err(InputErrorReason::Null),
            _ => Err(InputErrorReason::NotAnArray),
        }
    }

    pub fn visit(&mut self, value: &Value, depth: usize) -> Result<(), InputErrorReason> {
        let Value::Array(items) = value else {
            return self.visit_leaf(value, depth);
        };

        if let Some(&expected) = self.shape.get(depth) {
            if items.len() != expected {
                return Err(InputErrorReason::Ragged {
                    depth,
                    expected,
                    actual: items.len(),
                });
            }
        } else if matches!(self.leaves, Leaves::Pending) {
            self.shape.push(items.len());
        } else {
            return Err(InputErrorReason::UnexpectedArray { depth });
        }

        for item in items {
            self.visit(item, depth + 1)?;
        }
        Ok(())
    }

    fn visit_leaf(&mut self, value: &Value, depth: usize) -> Result<(), InputErrorReason> {
        if depth != self.shape.len() {
            return Err(InputErrorReason::UnexpectedValue { depth });
        }

        if let Some(payload) = b64_payload(value) {
            let bytes = general_purpose::STANDARD
                .decode(payload)
                .map_err(|err| InputErrorReason::InvalidBase64(err.to_string()))?;
            return match &mut self.leaves {
                Leaves::Pending => {
                    self.leaves = Leaves::Binary(vec![bytes]);
                    Ok(())
                }
                Leaves::Binary(items) => {
                    items.push(bytes);
                    Ok(())
                }
                Leaves::Numeric(_) => Err(InputErrorReason::MixedContent),
            };
        }

        match &mut self.leaves {
            Leaves::Pending => {
                let mut data = Vec::new();
                push_leaf(self.precision, value, &mut data)?;
                self.leaves = Leaves::Numeric(data);
                Ok(())
            }
            Leaves::Numeric(data) => push_leaf(self.precision, value, data),
            Leaves::Binary(_) => match value {
                Value::Number(_) | Value::Bool(_) => Err(InputErrorReason::MixedContent),
                _ => push_leaf(self.precision, value, &mut Vec::new()),
            },
        }
    }

    pub fn finish(self) -> DecodedTensor {
        let content = match self.leaves {
            Leaves::Pending => TensorContent::Numeric(Vec::new()),
            Leaves::Numeric(data) => TensorContent::Numeric(data),
            Leaves::Binary(items) => TensorContent::Binary(items),
        };
        DecodedTensor::new(self.precision, self.shape, content)
    }
}
