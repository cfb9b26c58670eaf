//! Errors reported while decoding request documents.

use std::error::Error;
use std::fmt::{Display, Formatter};

use tensorgate_spec::Shape;

/// Broad classification of a [DecodeError].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document does not have the structure of a request.
    MalformedDocument,

    /// The document has an input collection with nothing in it.
    EmptyInputs,

    /// A specific input could not be converted into a tensor.
    UnparseableInput,
}

/// Reason why an individual input could not be decoded.
#[derive(Clone, Debug, PartialEq)]
pub enum InputErrorReason {
    /// The input value is not an array.
    NotAnArray,

    /// An array has a different length than its siblings at the same depth.
    Ragged {
        depth: usize,
        expected: usize,
        actual: usize,
    },

    /// An array was found at a depth where values were found elsewhere.
    UnexpectedArray { depth: usize },

    /// A value was found at a depth where arrays were found elsewhere.
    UnexpectedValue { depth: usize },

    /// A `null` value.
    Null,

    /// A value of a type which cannot be converted to the input's precision.
    UnsupportedValue { kind: &'static str },

    /// Numbers and binary payloads were mixed within one input.
    MixedContent,

    /// A `{"b64": ...}` payload is not valid standard Base64.
    InvalidBase64(String),

    /// A session input does not contain exactly one integer.
    NotASingleValue,

    /// The decoded shape does not satisfy the expected shape.
    ShapeMismatch { expected: Shape, actual: Vec<usize> },

    /// A row-format instance does not have the same inputs as the first one.
    InstanceKeysDiffer { instance: usize },
}

impl Display for InputErrorReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InputErrorReason::NotAnArray => write!(f, "value is not an array"),
            InputErrorReason::Ragged {
                depth,
                expected,
                actual,
            } => write!(
                f,
                "array at depth {} has length {} but siblings have length {}",
                depth, actual, expected
            ),
            InputErrorReason::UnexpectedArray { depth } => {
                write!(f, "expected a value but found an array at depth {}", depth)
            }
            InputErrorReason::UnexpectedValue { depth } => {
                write!(f, "expected an array but found a value at depth {}", depth)
            }
            InputErrorReason::Null => write!(f, "null is not a valid value"),
            InputErrorReason::UnsupportedValue { kind } => {
                write!(f, "{} is not a valid value", kind)
            }
            InputErrorReason::MixedContent => {
                write!(f, "numeric and binary values cannot be mixed")
            }
            InputErrorReason::InvalidBase64(err) => write!(f, "invalid base64 payload: {}", err),
            InputErrorReason::NotASingleValue => write!(f, "expected a single integer value"),
            InputErrorReason::ShapeMismatch { expected, actual } => {
                write!(f, "shape {:?} does not match expected shape {}", actual, expected)
            }
            InputErrorReason::InstanceKeysDiffer { instance } => write!(
                f,
                "instance {} does not have the same inputs as instance 0",
                instance
            ),
        }
    }
}

/// Errors that can occur when decoding a request document.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodeError {
    /// The request body is not valid JSON.
    InvalidJson(String),

    /// The request body is not a JSON object.
    BodyNotAnObject,

    /// The request has neither an "inputs" nor an "instances" field.
    UnknownOrder,

    /// The request has both "inputs" and "instances" fields.
    AmbiguousOrder,

    /// "inputs" is neither an object nor an array.
    InputsNotAnObject,

    /// "instances" is not an array.
    InstancesNotAnArray,

    /// A row-format instance is not an object, when the first one is.
    InstanceNotAnObject { index: usize },

    /// "signature_name" is present but not a string.
    SignatureNameNotAString,

    /// "inputs" is empty.
    NoInputsFound,

    /// "instances" is empty.
    NoInstancesFound,

    /// A request without input names was sent to a model with several
    /// inputs.
    UnnamedInputAmbiguous { candidates: usize },

    /// An input could not be converted into a tensor.
    CouldNotParseInput {
        name: String,
        reason: InputErrorReason,
    },
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::NoInputsFound | DecodeError::NoInstancesFound => ErrorKind::EmptyInputs,
            DecodeError::CouldNotParseInput { .. } => ErrorKind::UnparseableInput,
            _ => ErrorKind::MalformedDocument,
        }
    }

    /// Return the name of the input this error is attributed to, if any.
    pub fn input_name(&self) -> Option<&str> {
        match self {
            DecodeError::CouldNotParseInput { name, .. } => Some(name),
            _ => None,
        }
    }

    pub(crate) fn input(name: &str, reason: InputErrorReason) -> DecodeError {
        DecodeError::CouldNotParseInput {
            name: name.to_string(),
            reason,
        }
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::InvalidJson(err) => write!(f, "request is not valid JSON: {}", err),
            DecodeError::BodyNotAnObject => write!(f, "request is not a JSON object"),
            DecodeError::UnknownOrder => {
                write!(f, "request must contain \"inputs\" or \"instances\"")
            }
            DecodeError::AmbiguousOrder => write!(
                f,
                "request must not contain both \"inputs\" and \"instances\""
            ),
            DecodeError::InputsNotAnObject => {
                write!(f, "\"inputs\" is not an object or array")
            }
            DecodeError::InstancesNotAnArray => write!(f, "\"instances\" is not an array"),
            DecodeError::InstanceNotAnObject { index } => {
                write!(f, "instance {} is not an object", index)
            }
            DecodeError::SignatureNameNotAString => {
                write!(f, "\"signature_name\" is not a string")
            }
            DecodeError::NoInputsFound => write!(f, "no inputs found"),
            DecodeError::NoInstancesFound => write!(f, "no instances found"),
            DecodeError::UnnamedInputAmbiguous { candidates } => write!(
                f,
                "request does not name its input but the model has {} inputs",
                candidates
            ),
            DecodeError::CouldNotParseInput { name, reason } => {
                write!(f, "could not parse input \"{}\": {}", name, reason)
            }
        }
    }
}

impl Error for DecodeError {}
