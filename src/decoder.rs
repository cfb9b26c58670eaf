//! Decoding of inference request documents into tensors.

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use tensorgate_spec::{Precision, TensorInfo};

use crate::errors::{DecodeError, InputErrorReason};
use crate::options::DecodeOptions;
use crate::session::{check_reserved_value, reserved_precision, SessionTag};
use crate::tensor::DecodedTensor;

mod coerce;
mod walk;

use walk::{b64_payload, Walker};

/// Expected inputs of a model, keyed by input name.
pub type TensorInfoMap = FxHashMap<String, TensorInfo>;

/// Precision used for inputs without a known precision.
pub const DEFAULT_PRECISION: Precision = Precision::Fp32;

/// Where the batch dimension of a request is introduced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    /// `"inputs"`: each input carries its own batch dimension.
    Column,

    /// `"instances"`: the outer array enumerates whole instances.
    Row,
}

/// Whether a request names its inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Named,

    /// The request has a single implicit input.
    NoKeys,
}

/// Result of decoding a request.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedRequest {
    order: Order,
    format: Format,
    signature_name: Option<String>,
    inputs: FxHashMap<String, DecodedTensor>,
    session: Option<SessionTag>,
}

impl DecodedRequest {
    pub fn order(&self) -> Order {
        self.order
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Return the `"signature_name"` field of the request, if present.
    pub fn signature_name(&self) -> Option<&str> {
        self.signature_name.as_deref()
    }

    pub fn inputs(&self) -> &FxHashMap<String, DecodedTensor> {
        &self.inputs
    }

    pub fn input(&self, name: &str) -> Option<&DecodedTensor> {
        self.inputs.get(name)
    }

    pub fn into_inputs(self) -> FxHashMap<String, DecodedTensor> {
        self.inputs
    }

    /// Return the session tag of a stateful request.
    ///
    /// This is only set when [`DecodeOptions::stateful`] is enabled.
    pub fn session(&self) -> Option<SessionTag> {
        self.session
    }
}

/// Decodes request documents into typed tensors.
///
/// A request is a JSON object with either an `"inputs"` field (column order)
/// or an `"instances"` field (row order):
///
/// ```text
/// {"inputs": {"a": [[1, 2]], "b": [[{"b64": "aGk="}]]}}
/// {"inputs": [[1, 2]]}
/// {"instances": [{"a": [1, 2], "b": 3}, {"a": [3, 4], "b": 5}]}
/// {"instances": [[1, 2], [3, 4]]}
/// ```
///
/// When the decoder is given the expected inputs of the model, their
/// precisions are used to convert numbers and inputs which the model does
/// not expect are discarded.
#[derive(Clone, Debug, Default)]
pub struct RequestDecoder<'a> {
    hints: Option<&'a TensorInfoMap>,
    options: DecodeOptions,
}

impl<'a> RequestDecoder<'a> {
    /// Create a decoder which accepts any inputs.
    pub fn new() -> RequestDecoder<'a> {
        RequestDecoder::default()
    }

    /// Create a decoder for a model with the given expected inputs.
    pub fn with_hints(hints: &'a TensorInfoMap) -> RequestDecoder<'a> {
        RequestDecoder {
            hints: Some(hints),
            options: DecodeOptions::default(),
        }
    }

    pub fn with_options(self, options: DecodeOptions) -> RequestDecoder<'a> {
        RequestDecoder { options, ..self }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Parse and decode a JSON request body.
    pub fn decode_str(&self, body: &str) -> Result<DecodedRequest, DecodeError> {
        let doc: Value =
            serde_json::from_str(body).map_err(|err| DecodeError::InvalidJson(err.to_string()))?;
        self.decode_value(&doc)
    }

    /// Decode a parsed request document.
    pub fn decode_value(&self, doc: &Value) -> Result<DecodedRequest, DecodeError> {
        let result = self.decode_document(doc);
        if let Err(err) = &result {
            tracing::debug!(error = %err, "failed to decode request");
        }
        result
    }

    fn decode_document(&self, doc: &Value) -> Result<DecodedRequest, DecodeError> {
        let Value::Object(body) = doc else {
            return Err(DecodeError::BodyNotAnObject);
        };

        let signature_name = match body.get("signature_name") {
            None => None,
            Some(Value::String(name)) => Some(name.clone()),
            Some(_) => return Err(DecodeError::SignatureNameNotAString),
        };

        let (order, (format, mut inputs)) = match (body.get("inputs"), body.get("instances")) {
            (Some(inputs), None) => (Order::Column, self.decode_columns(inputs)?),
            (None, Some(instances)) => (Order::Row, self.decode_rows(instances)?),
            (Some(_), Some(_)) => return Err(DecodeError::AmbiguousOrder),
            (None, None) => return Err(DecodeError::UnknownOrder),
        };

        let session = if self.options.stateful {
            Some(SessionTag::take_from(&mut inputs)?)
        } else {
            None
        };

        if let Some(hints) = self.hints {
            inputs.retain(|name, _| {
                let expected = hints.contains_key(name);
                if !expected {
                    tracing::trace!(input = %name, "dropping unexpected input");
                }
                expected
            });
        }

        Ok(DecodedRequest {
            order,
            format,
            signature_name,
            inputs,
            session,
        })
    }

    fn decode_columns(
        &self,
        inputs: &Value,
    ) -> Result<(Format, FxHashMap<String, DecodedTensor>), DecodeError> {
        match inputs {
            Value::Object(map) => {
                if map.is_empty() {
                    return Err(DecodeError::NoInputsFound);
                }
                let mut tensors = FxHashMap::default();
                for (name, value) in map {
                    self.check_reserved(name, value)?;
                    let mut walker = Walker::new(self.precision(name));
                    walker
                        .visit_root(value)
                        .map_err(|reason| DecodeError::input(name, reason))?;
                    tensors.insert(name.clone(), self.finish(name, walker)?);
                }
                Ok((Format::Named, tensors))
            }
            Value::Array(items) => {
                if items.is_empty() {
                    return Err(DecodeError::NoInputsFound);
                }
                let name = self.implicit_input_name()?;
                Ok((Format::NoKeys, self.decode_unnamed(name, inputs)?))
            }
            _ => Err(DecodeError::InputsNotAnObject),
        }
    }

    fn decode_rows(
        &self,
        instances: &Value,
    ) -> Result<(Format, FxHashMap<String, DecodedTensor>), DecodeError> {
        let Value::Array(items) = instances else {
            return Err(DecodeError::InstancesNotAnArray);
        };
        let Some(first) = items.first() else {
            return Err(DecodeError::NoInstancesFound);
        };

        let first = match first {
            Value::Object(map) if b64_payload(first).is_none() => map,
            _ => {
                let name = self.implicit_input_name()?;
                return Ok((Format::NoKeys, self.decode_unnamed(name, instances)?));
            }
        };
        if first.is_empty() {
            return Err(DecodeError::NoInputsFound);
        }

        let mut rows: Vec<&Map<String, Value>> = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let Value::Object(row) = item else {
                return Err(DecodeError::InstanceNotAnObject { index });
            };
            if let Some(name) = differing_key(first, row) {
                return Err(DecodeError::input(
                    name,
                    InputErrorReason::InstanceKeysDiffer { instance: index },
                ));
            }
            rows.push(row);
        }

        let mut tensors = FxHashMap::default();
        for name in first.keys() {
            let mut walker = Walker::with_batch(self.precision(name), rows.len());
            for row in &rows {
                if let Some(value) = row.get(name) {
                    self.check_reserved(name, value)?;
                    walker
                        .visit(value, 1)
                        .map_err(|reason| DecodeError::input(name, reason))?;
                }
            }
            tensors.insert(name.clone(), self.finish(name, walker)?);
        }
        Ok((Format::Named, tensors))
    }

    fn decode_unnamed(
        &self,
        name: &str,
        value: &Value,
    ) -> Result<FxHashMap<String, DecodedTensor>, DecodeError> {
        self.check_reserved(name, value)?;
        let mut walker = Walker::new(self.precision(name));
        walker
            .visit_root(value)
            .map_err(|reason| DecodeError::input(name, reason))?;
        let mut tensors = FxHashMap::default();
        tensors.insert(name.to_string(), self.finish(name, walker)?);
        Ok(tensors)
    }

    fn finish(&self, name: &str, walker: Walker) -> Result<DecodedTensor, DecodeError> {
        let tensor = walker.finish();

        if self.options.strict_shapes {
            if let Some(expected) = self.hint(name).map(|info| info.shape()) {
                if expected.rank() > 0 && !expected.matches(tensor.shape()) {
                    return Err(DecodeError::input(
                        name,
                        InputErrorReason::ShapeMismatch {
                            expected: expected.clone(),
                            actual: tensor.shape().to_vec(),
                        },
                    ));
                }
            }
        }

        tracing::debug!(
            input = %name,
            precision = %tensor.precision(),
            shape = ?tensor.shape(),
            bytes = tensor.byte_len(),
            "decoded input"
        );
        Ok(tensor)
    }

    /// Check the raw value of a reserved session input before it is coerced,
    /// so that fractional or negative values are not truncated or wrapped.
    fn check_reserved(&self, name: &str, value: &Value) -> Result<(), DecodeError> {
        if !self.options.stateful {
            return Ok(());
        }
        match reserved_precision(name) {
            Some(precision) => check_reserved_value(precision, value)
                .map_err(|reason| DecodeError::input(name, reason)),
            None => Ok(()),
        }
    }

    fn hint(&self, name: &str) -> Option<&'a TensorInfo> {
        self.hints.and_then(|hints| hints.get(name))
    }

    /// Return the precision that values of input `name` are converted to.
    fn precision(&self, name: &str) -> Precision {
        if self.options.stateful {
            if let Some(precision) = reserved_precision(name) {
                return precision;
            }
        }
        match self.hint(name).map(|info| info.precision()) {
            Some(Precision::Undefined) | None => DEFAULT_PRECISION,
            Some(precision) => precision,
        }
    }

    /// Return the name of the input of a request which does not name it.
    fn implicit_input_name(&self) -> Result<&str, DecodeError> {
        let hints = match self.hints {
            Some(hints) if !hints.is_empty() => hints,
            _ => return Ok(&self.options.unnamed_input),
        };
        let mut names = hints.keys();
        match (names.next(), names.next()) {
            (Some(name), None) => Ok(name),
            _ => Err(DecodeError::UnnamedInputAmbiguous {
                candidates: hints.len(),
            }),
        }
    }
}

/// Return a key which is present in exactly one of `expected` and `actual`.
fn differing_key<'m>(
    expected: &'m Map<String, Value>,
    actual: &'m Map<String, Value>,
) -> Option<&'m str> {
    let missing = expected.keys().find(|key| !actual.contains_key(key.as_str()));
    let extra = || actual.keys().find(|key| !expected.contains_key(key.as_str()));
    missing.or_else(extra).map(|key| key.as_str())
}
