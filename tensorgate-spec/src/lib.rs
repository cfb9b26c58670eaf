//! tensorgate_spec describes the tensors that models and pipeline nodes
//! consume and produce, and decides whether two such descriptions can be
//! connected.
//!
//! # Specifications
//!
//! A [TensorInfo] combines a name, an element [Precision], a [Shape] and a
//! [Layout]. Shapes may be partially known: each [Dimension] is either an
//! exact size, an inclusive range of sizes or unconstrained.
//!
//! ```
//! use tensorgate_spec::{Dimension, Shape};
//!
//! let shape: Shape = "(1,3,224:448,-1)".parse().unwrap();
//! assert_eq!(shape[2], Dimension::range(224, 448).unwrap());
//! assert_eq!(shape[3], Dimension::Any);
//! assert!(shape.matches(&[1, 3, 300, 17]));
//! ```
//!
//! # Intersection
//!
//! When one pipeline stage feeds another, [TensorInfo::intersect] computes
//! the most specific specification satisfying both sides, or reports why
//! there is none via [IntersectError]. Undefined precisions, unspecified or
//! default layouts and [TensorInfo::unspecified] act as wildcards.
//!
//! ```
//! use tensorgate_spec::{Layout, Precision, TensorInfo};
//!
//! let produced = TensorInfo::new(
//!     "image",
//!     Precision::Fp32,
//!     "(1,3,224,220:230)".parse().unwrap(),
//!     Layout::axes("NCHW").unwrap(),
//! );
//! let expected = TensorInfo::new(
//!     "image",
//!     Precision::Undefined,
//!     "(-1,3,220:225,200:300)".parse().unwrap(),
//!     Layout::Default,
//! );
//! let joined = produced.intersect(&expected).unwrap();
//! assert_eq!(joined.shape().to_string(), "(1,3,224,220:230)");
//! assert_eq!(joined.precision(), Precision::Fp32);
//! ```
//!
//! # Serialization
//!
//! With the `serde` feature enabled, all types serialize using their text
//! forms, as accepted by their [FromStr](std::str::FromStr) impls.

mod dimension;
mod errors;
mod layout;
mod precision;
mod shape;
mod tensor_info;

#[cfg(feature = "serde")]
mod impl_serialize;

pub use dimension::{DimRange, Dimension};
pub use errors::{DimensionError, IntersectError, ParseError};
pub use layout::{Layout, DEFAULT_LAYOUT, UNSPECIFIED_LAYOUT};
pub use precision::Precision;
pub use shape::Shape;
pub use tensor_info::TensorInfo;
