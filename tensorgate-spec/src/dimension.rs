use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::errors::{DimensionError, ParseError, ParseErrorKind};

/// Inclusive size range `[min, max]` of a [`Dimension::Range`].
///
/// A `DimRange` always spans more than one size. Ranges with `min == max`
/// are represented as [`Dimension::Exact`] instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DimRange {
    min: usize,
    max: usize,
}

impl DimRange {
    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Return true if `size` lies within this range.
    pub fn contains(&self, size: usize) -> bool {
        (self.min..=self.max).contains(&size)
    }
}

/// Constraint on the size of a single axis of a tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// The axis has exactly this size.
    Exact(usize),

    /// The axis size lies within an inclusive range.
    Range(DimRange),

    /// The axis size is unconstrained.
    Any,
}

impl Dimension {
    /// Create a dimension whose size lies in `[min, max]`.
    ///
    /// If `min == max` this returns [`Dimension::Exact`].
    pub fn range(min: usize, max: usize) -> Result<Dimension, DimensionError> {
        match min.cmp(&max) {
            std::cmp::Ordering::Less => Ok(Dimension::Range(DimRange { min, max })),
            std::cmp::Ordering::Equal => Ok(Dimension::Exact(min)),
            std::cmp::Ordering::Greater => Err(DimensionError { min, max }),
        }
    }

    /// Return true if an axis of the given size satisfies this constraint.
    pub fn matches(&self, size: usize) -> bool {
        match self {
            Dimension::Exact(n) => *n == size,
            Dimension::Range(range) => range.contains(size),
            Dimension::Any => true,
        }
    }

    /// Return the size if this dimension is exact.
    pub fn as_static(&self) -> Option<usize> {
        match self {
            Dimension::Exact(n) => Some(*n),
            _ => None,
        }
    }

    /// Return the tightest constraint satisfied by sizes that satisfy both
    /// `self` and `other`, or `None` if there are no such sizes.
    pub fn intersect(&self, other: &Dimension) -> Option<Dimension> {
        match (*self, *other) {
            (Dimension::Any, dim) | (dim, Dimension::Any) => Some(dim),
            (Dimension::Exact(a), Dimension::Exact(b)) => (a == b).then_some(Dimension::Exact(a)),
            (Dimension::Exact(n), Dimension::Range(range))
            | (Dimension::Range(range), Dimension::Exact(n)) => {
                range.contains(n).then_some(Dimension::Exact(n))
            }
            (Dimension::Range(a), Dimension::Range(b)) => {
                Dimension::range(a.min.max(b.min), a.max.min(b.max)).ok()
            }
        }
    }
}

impl From<usize> for Dimension {
    fn from(size: usize) -> Dimension {
        Dimension::Exact(size)
    }
}

impl TryFrom<std::ops::RangeInclusive<usize>> for Dimension {
    type Error = DimensionError;

    fn try_from(range: std::ops::RangeInclusive<usize>) -> Result<Dimension, DimensionError> {
        Dimension::range(*range.start(), *range.end())
    }
}

impl Display for Dimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Exact(n) => write!(f, "{}", n),
            Dimension::Range(range) => write!(f, "{}:{}", range.min, range.max),
            Dimension::Any => write!(f, "-1"),
        }
    }
}

impl FromStr for Dimension {
    type Err = ParseError;

    /// Parse a dimension in the form `size`, `min:max` or `-1` (any size).
    fn from_str(spec: &str) -> Result<Dimension, ParseError> {
        let text = spec.trim();
        if text == "-1" {
            return Ok(Dimension::Any);
        }

        let parse_size = |s: &str| {
            s.trim()
                .parse::<usize>()
                .map_err(|_| ParseError::new(spec, ParseErrorKind::InvalidDimension))
        };

        match text.split_once(':') {
            Some((min, max)) => {
                let (min, max) = (parse_size(min)?, parse_size(max)?);
                Dimension::range(min, max)
                    .map_err(|_| ParseError::new(spec, ParseErrorKind::InvalidRange))
            }
            None => parse_size(text).map(Dimension::Exact),
        }
    }
}

#[cfg(test)]
mod tests {
    use tensorgate_testing::TestCases;

    use super::Dimension;

    fn dim(spec: &str) -> Dimension {
        spec.parse().unwrap()
    }

    #[test]
    fn test_range_normalizes_singleton() {
        assert_eq!(Dimension::range(3, 3), Ok(Dimension::Exact(3)));
        assert!(matches!(Dimension::range(1, 4), Ok(Dimension::Range(_))));
        assert!(Dimension::range(4, 1).is_err());
    }

    #[test]
    fn test_intersect() {
        #[derive(Debug)]
        struct Case<'a> {
            a: &'a str,
            b: &'a str,
            expected: Option<&'a str>,
        }

        let cases = [
            Case {
                a: "-1",
                b: "5",
                expected: Some("5"),
            },
            Case {
                a: "-1",
                b: "2:8",
                expected: Some("2:8"),
            },
            Case {
                a: "-1",
                b: "-1",
                expected: Some("-1"),
            },
            Case {
                a: "3",
                b: "3",
                expected: Some("3"),
            },
            Case {
                a: "3",
                b: "4",
                expected: None,
            },
            Case {
                a: "224",
                b: "220:225",
                expected: Some("224"),
            },
            Case {
                a: "226",
                b: "220:225",
                expected: None,
            },
            Case {
                a: "220:230",
                b: "200:300",
                expected: Some("220:230"),
            },
            Case {
                a: "1:5",
                b: "5:9",
                expected: Some("5"),
            },
            Case {
                a: "1:4",
                b: "5:9",
                expected: None,
            },
        ];

        cases.test_each(|case| {
            let (a, b) = (dim(case.a), dim(case.b));
            let expected = case.expected.map(dim);
            assert_eq!(a.intersect(&b), expected);
            assert_eq!(b.intersect(&a), expected);
        })
    }

    #[test]
    fn test_intersect_is_associative() {
        let dims: Vec<Dimension> = ["-1", "3", "7", "1:5", "2:9", "4:6", "8:12", "0:100"]
            .into_iter()
            .map(dim)
            .collect();

        for a in &dims {
            for b in &dims {
                for c in &dims {
                    let ab_c = a.intersect(b).and_then(|ab| ab.intersect(c));
                    let a_bc = b.intersect(c).and_then(|bc| a.intersect(&bc));
                    assert_eq!(ab_c, a_bc, "{} {} {}", a, b, c);
                }
            }
        }
    }

    #[test]
    fn test_matches() {
        assert!(dim("-1").matches(0));
        assert!(dim("3").matches(3));
        assert!(!dim("3").matches(2));
        assert!(dim("2:4").matches(2));
        assert!(dim("2:4").matches(4));
        assert!(!dim("2:4").matches(5));
    }

    #[test]
    fn test_parse_and_display() {
        #[derive(Debug)]
        struct Case<'a> {
            spec: &'a str,
            expected: Option<&'a str>,
        }

        let cases = [
            Case {
                spec: "12",
                expected: Some("12"),
            },
            Case {
                spec: " 1 : 10 ",
                expected: Some("1:10"),
            },
            Case {
                spec: "-1",
                expected: Some("-1"),
            },
            Case {
                spec: "6:6",
                expected: Some("6"),
            },
            Case {
                spec: "10:1",
                expected: None,
            },
            Case {
                spec: "-2",
                expected: None,
            },
            Case {
                spec: "abc",
                expected: None,
            },
            Case {
                spec: "1:",
                expected: None,
            },
        ];

        cases.test_each(|case| {
            let parsed = case.spec.parse::<Dimension>();
            assert_eq!(parsed.ok().map(|d| d.to_string()).as_deref(), case.expected);
        })
    }
}
