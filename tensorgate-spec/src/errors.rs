//! Error types reported when constructing, parsing and intersecting tensor
//! specifications.

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::{Dimension, Layout, Precision};

/// Error when constructing a dimension range whose minimum exceeds its
/// maximum.
#[derive(Clone, Debug, PartialEq)]
pub struct DimensionError {
    pub min: usize,
    pub max: usize,
}

impl Display for DimensionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid dimension range {}:{}, min is greater than max",
            self.min, self.max
        )
    }
}

impl Error for DimensionError {}

/// Reason why two tensor specifications have no intersection.
///
/// Incompatibility is an expected outcome when validating pipelines, so it
/// is reported as a value rather than a panic. Each variant records the
/// offending parts of the left and right operands.
#[derive(Clone, Debug, PartialEq)]
pub enum IntersectError {
    /// The tensor names differ.
    NameMismatch { left: String, right: String },

    /// The mapped (externally exposed) names differ.
    MappedNameMismatch { left: String, right: String },

    /// Both precisions are defined and differ.
    PrecisionMismatch { left: Precision, right: Precision },

    /// Both layouts are concrete and differ.
    LayoutMismatch { left: Layout, right: Layout },

    /// The shapes have a different number of dimensions.
    RankMismatch { left: usize, right: usize },

    /// The constraints for a dimension have no size in common.
    DimensionMismatch {
        axis: usize,
        left: Dimension,
        right: Dimension,
    },

    /// The intersected layout labels a different number of axes than the
    /// intersected shape has.
    LayoutRankMismatch { layout: Layout, rank: usize },
}

impl Display for IntersectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IntersectError::NameMismatch { left, right } => {
                write!(f, "name mismatch (\"{}\" vs \"{}\")", left, right)
            }
            IntersectError::MappedNameMismatch { left, right } => {
                write!(f, "mapped name mismatch (\"{}\" vs \"{}\")", left, right)
            }
            IntersectError::PrecisionMismatch { left, right } => {
                write!(f, "precision mismatch ({} vs {})", left, right)
            }
            IntersectError::LayoutMismatch { left, right } => {
                write!(f, "layout mismatch ({} vs {})", left, right)
            }
            IntersectError::RankMismatch { left, right } => {
                write!(f, "rank mismatch ({} vs {})", left, right)
            }
            IntersectError::DimensionMismatch { axis, left, right } => {
                write!(f, "dimension {} mismatch ({} vs {})", axis, left, right)
            }
            IntersectError::LayoutRankMismatch { layout, rank } => write!(
                f,
                "layout {} does not match shape rank {}",
                layout, rank
            ),
        }
    }
}

impl Error for IntersectError {}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ParseErrorKind {
    /// A dimension is not an integer, `-1` or a `min:max` range.
    InvalidDimension,
    /// A `min:max` range has `min > max`.
    InvalidRange,
    /// A shape is not a comma separated list of dimensions.
    InvalidShape { message: String },
    /// A layout contains characters other than axis letters, or repeats one.
    InvalidLayout { message: String },
    /// Not the name of a known precision.
    UnknownPrecision,
}

/// Error when parsing the text form of a dimension, shape, layout or
/// precision.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseError {
    input: String,
    kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(input: &str, kind: ParseErrorKind) -> ParseError {
        ParseError {
            input: input.to_string(),
            kind,
        }
    }

    /// Return the text that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ParseErrorKind::InvalidDimension => write!(
                f,
                "invalid dimension \"{}\". Expected a size, \"-1\" or \"min:max\".",
                self.input
            ),
            ParseErrorKind::InvalidRange => write!(
                f,
                "invalid dimension range \"{}\": min is greater than max",
                self.input
            ),
            ParseErrorKind::InvalidShape { message } => {
                write!(f, "invalid shape \"{}\": {}", self.input, message)
            }
            ParseErrorKind::InvalidLayout { message } => {
                write!(f, "invalid layout \"{}\": {}", self.input, message)
            }
            ParseErrorKind::UnknownPrecision => {
                write!(f, "unknown precision \"{}\"", self.input)
            }
        }
    }
}

impl Error for ParseError {}
