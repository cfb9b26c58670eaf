//! tensorgate is the request ingestion layer of a model serving process.
//!
//! It converts JSON inference requests into typed, contiguous tensor buffers
//! and checks that the tensors produced and consumed by the nodes of a
//! serving pipeline are compatible.
//!
//! # Decoding requests
//!
//! Requests are decoded by a [RequestDecoder]. If the decoder is given the
//! inputs a model expects, as a [TensorInfoMap], numbers are converted to
//! the expected precision of each input and inputs the model does not expect
//! are discarded. Without a known precision, numbers are stored as `f32`.
//!
//! ```
//! use tensorgate::{Layout, Precision, RequestDecoder, Shape, TensorInfo, TensorInfoMap};
//!
//! let mut inputs = TensorInfoMap::default();
//! inputs.insert(
//!     "pixels".to_string(),
//!     TensorInfo::new(
//!         "pixels",
//!         Precision::U8,
//!         Shape::from_static(&[1, 4]),
//!         Layout::Unspecified,
//!     ),
//! );
//!
//! let decoder = RequestDecoder::with_hints(&inputs);
//! let request = decoder
//!     .decode_str(r#"{"inputs": {"pixels": [[0, 5, 15.0, 255]], "extra": [1]}}"#)
//!     .unwrap();
//!
//! let pixels = request.input("pixels").unwrap();
//! assert_eq!(pixels.shape(), [1, 4]);
//! assert_eq!(pixels.to_vec::<u8>(), Some(vec![0, 5, 15, 255]));
//! assert!(request.input("extra").is_none());
//! ```
//!
//! Nested arrays must be rectangular. Ragged arrays, `null` and strings are
//! rejected with a [DecodeError] naming the offending input. Binary payloads
//! can be passed as `{"b64": "..."}` objects in place of numbers.
//!
//! Integer precisions truncate fractional values toward zero and wrap values
//! which are out of range, so `32768` decodes as `-32768` for an `I16`
//! input.
//!
//! # Stateful models
//!
//! With [`DecodeOptions::stateful`] enabled, the reserved
//! [`sequence_id`](SEQUENCE_ID) and
//! [`sequence_control_input`](SEQUENCE_CONTROL_INPUT) inputs are removed
//! from the request and returned as a [SessionTag].
//!
//! # Pipelines
//!
//! [validate_connection] checks that a node output can feed another node's
//! input, using the specification lattice from
//! [tensorgate_spec](tensorgate_spec).

mod connection;
mod decoder;
mod env;
mod errors;
mod options;
mod session;
mod tensor;

pub use connection::{validate_connection, ConnectionError};
pub use decoder::{
    DecodedRequest, Format, Order, RequestDecoder, TensorInfoMap, DEFAULT_PRECISION,
};
pub use env::{env_flag, str_as_bool};
pub use errors::{DecodeError, ErrorKind, InputErrorReason};
pub use options::{DecodeOptions, DEFAULT_UNNAMED_INPUT, STATEFUL_ENV, STRICT_SHAPES_ENV};
pub use session::{SequenceControl, SessionTag, SEQUENCE_CONTROL_INPUT, SEQUENCE_ID};
pub use tensor::{DecodedTensor, Element, TensorContent};

pub use tensorgate_spec::{
    DimRange, Dimension, DimensionError, IntersectError, Layout, ParseError, Precision, Shape,
    TensorInfo,
};
