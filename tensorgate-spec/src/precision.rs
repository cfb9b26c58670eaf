use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::errors::{ParseError, ParseErrorKind};

/// Element type of a tensor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Precision {
    Fp64,
    Fp32,
    Fp16,
    Bf16,
    I64,
    I32,
    I16,
    I8,
    U64,
    U32,
    U16,
    U8,
    Bool,

    /// Unknown element type. Matches any other precision.
    #[default]
    Undefined,
}

impl Precision {
    /// All precisions, in declaration order.
    pub const ALL: [Precision; 14] = [
        Precision::Fp64,
        Precision::Fp32,
        Precision::Fp16,
        Precision::Bf16,
        Precision::I64,
        Precision::I32,
        Precision::I16,
        Precision::I8,
        Precision::U64,
        Precision::U32,
        Precision::U16,
        Precision::U8,
        Precision::Bool,
        Precision::Undefined,
    ];

    /// Return the size of elements of this type in bytes, or `None` for
    /// [`Precision::Undefined`].
    pub fn size(self) -> Option<usize> {
        match self {
            Precision::Fp64 | Precision::I64 | Precision::U64 => Some(8),
            Precision::Fp32 | Precision::I32 | Precision::U32 => Some(4),
            Precision::Fp16 | Precision::Bf16 | Precision::I16 | Precision::U16 => Some(2),
            Precision::I8 | Precision::U8 | Precision::Bool => Some(1),
            Precision::Undefined => None,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(
            self,
            Precision::Fp64 | Precision::Fp32 | Precision::Fp16 | Precision::Bf16
        )
    }

    pub fn is_signed_int(self) -> bool {
        matches!(
            self,
            Precision::I64 | Precision::I32 | Precision::I16 | Precision::I8
        )
    }

    pub fn is_unsigned_int(self) -> bool {
        matches!(
            self,
            Precision::U64 | Precision::U32 | Precision::U16 | Precision::U8
        )
    }

    /// Return the upper-case name of this precision, eg. "FP32".
    pub fn name(self) -> &'static str {
        match self {
            Precision::Fp64 => "FP64",
            Precision::Fp32 => "FP32",
            Precision::Fp16 => "FP16",
            Precision::Bf16 => "BF16",
            Precision::I64 => "I64",
            Precision::I32 => "I32",
            Precision::I16 => "I16",
            Precision::I8 => "I8",
            Precision::U64 => "U64",
            Precision::U32 => "U32",
            Precision::U16 => "U16",
            Precision::U8 => "U8",
            Precision::Bool => "BOOL",
            Precision::Undefined => "UNDEFINED",
        }
    }

    /// Return the precision compatible with both `self` and `other`.
    ///
    /// An undefined precision yields to the other one. Two different defined
    /// precisions have no intersection.
    pub fn intersect(self, other: Precision) -> Option<Precision> {
        match (self, other) {
            (Precision::Undefined, p) | (p, Precision::Undefined) => Some(p),
            (a, b) => (a == b).then_some(a),
        }
    }
}

impl Display for Precision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Precision {
    type Err = ParseError;

    /// Parse a precision name, ignoring case.
    fn from_str(name: &str) -> Result<Precision, ParseError> {
        let trimmed = name.trim();
        Precision::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseError::new(name, ParseErrorKind::UnknownPrecision))
    }
}

#[cfg(test)]
mod tests {
    use super::Precision;

    #[test]
    fn test_parse() {
        for p in Precision::ALL {
            assert_eq!(p.name().parse::<Precision>(), Ok(p));
            assert_eq!(p.name().to_lowercase().parse::<Precision>(), Ok(p));
        }
        assert!("FP8".parse::<Precision>().is_err());
    }

    #[test]
    fn test_size() {
        assert_eq!(Precision::Fp32.size(), Some(4));
        assert_eq!(Precision::Bf16.size(), Some(2));
        assert_eq!(Precision::U64.size(), Some(8));
        assert_eq!(Precision::Bool.size(), Some(1));
        assert_eq!(Precision::Undefined.size(), None);
    }

    #[test]
    fn test_intersect() {
        use Precision::*;

        assert_eq!(Fp32.intersect(Fp32), Some(Fp32));
        assert_eq!(Fp32.intersect(Undefined), Some(Fp32));
        assert_eq!(Undefined.intersect(I8), Some(I8));
        assert_eq!(Undefined.intersect(Undefined), Some(Undefined));
        assert_eq!(Fp32.intersect(I32), None);
        assert_eq!(I32.intersect(Fp32), None);
    }
}
