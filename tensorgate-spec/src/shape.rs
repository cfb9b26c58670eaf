use std::fmt::{Display, Formatter};
use std::str::FromStr;

use smallvec::SmallVec;

use crate::errors::{IntersectError, ParseError, ParseErrorKind};
use crate::Dimension;

/// Ordered list of per-axis size constraints.
///
/// The rank of a shape is the number of dimensions, including
/// [`Dimension::Any`] entries. A rank-0 shape describes a scalar.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Shape(SmallVec<[Dimension; 6]>);

impl Shape {
    /// Create a rank-0 shape.
    pub fn new() -> Shape {
        Shape(SmallVec::new())
    }

    /// Create a shape where every dimension has an exact size.
    pub fn from_static(sizes: &[usize]) -> Shape {
        sizes.iter().copied().map(Dimension::Exact).collect()
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    pub fn dims(&self) -> &[Dimension] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dimension> + '_ {
        self.0.iter()
    }

    /// Return true if every dimension has an exact size.
    pub fn is_static(&self) -> bool {
        self.0.iter().all(|dim| matches!(dim, Dimension::Exact(_)))
    }

    /// Return the sizes of this shape if every dimension is exact.
    pub fn to_static(&self) -> Option<Vec<usize>> {
        self.0.iter().map(|dim| dim.as_static()).collect()
    }

    /// Return true if a tensor with the given concrete shape satisfies
    /// these constraints.
    pub fn matches(&self, sizes: &[usize]) -> bool {
        self.rank() == sizes.len()
            && self
                .0
                .iter()
                .zip(sizes)
                .all(|(dim, &size)| dim.matches(size))
    }

    /// Intersect each dimension of `self` with the corresponding dimension
    /// of `other`.
    ///
    /// Fails if the ranks differ or if any pair of dimensions has no size in
    /// common. No partial result is produced.
    pub fn intersect(&self, other: &Shape) -> Result<Shape, IntersectError> {
        if self.rank() != other.rank() {
            return Err(IntersectError::RankMismatch {
                left: self.rank(),
                right: other.rank(),
            });
        }

        self.0
            .iter()
            .zip(other.0.iter())
            .enumerate()
            .map(|(axis, (left, right))| {
                left.intersect(right)
                    .ok_or(IntersectError::DimensionMismatch {
                        axis,
                        left: *left,
                        right: *right,
                    })
            })
            .collect()
    }
}

impl std::ops::Index<usize> for Shape {
    type Output = Dimension;

    fn index(&self, axis: usize) -> &Dimension {
        &self.0[axis]
    }
}

impl FromIterator<Dimension> for Shape {
    fn from_iter<I: IntoIterator<Item = Dimension>>(iter: I) -> Shape {
        Shape(iter.into_iter().collect())
    }
}

impl From<Vec<Dimension>> for Shape {
    fn from(dims: Vec<Dimension>) -> Shape {
        Shape(SmallVec::from_vec(dims))
    }
}

impl<const N: usize> From<[Dimension; N]> for Shape {
    fn from(dims: [Dimension; N]) -> Shape {
        dims.into_iter().collect()
    }
}

impl Display for Shape {
    /// Format the shape as `(d0,d1,...)`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, dim) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", dim)?;
        }
        write!(f, ")")
    }
}

impl FromStr for Shape {
    type Err = ParseError;

    /// Parse a comma-separated list of dimensions, optionally enclosed in
    /// parentheses or square brackets. eg. `(1,3,224:230,-1)`.
    fn from_str(spec: &str) -> Result<Shape, ParseError> {
        let text = spec.trim();
        let inner = match (text.chars().next(), text.chars().last()) {
            (Some('('), Some(')')) | (Some('['), Some(']')) if text.len() >= 2 => {
                &text[1..text.len() - 1]
            }
            (Some('(' | '['), _) | (_, Some(')' | ']')) => {
                return Err(ParseError::new(
                    spec,
                    ParseErrorKind::InvalidShape {
                        message: "unbalanced brackets".into(),
                    },
                ));
            }
            _ => text,
        };

        if inner.trim().is_empty() {
            return Ok(Shape::new());
        }

        inner
            .split(',')
            .map(|dim| {
                dim.parse::<Dimension>().map_err(|err| {
                    ParseError::new(
                        spec,
                        ParseErrorKind::InvalidShape {
                            message: err.to_string(),
                        },
                    )
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use tensorgate_testing::TestCases;

    use super::Shape;
    use crate::{Dimension, IntersectError};

    fn shape(spec: &str) -> Shape {
        spec.parse().unwrap()
    }

    #[test]
    fn test_parse() {
        #[derive(Debug)]
        struct Case<'a> {
            spec: &'a str,
            expected: Option<Vec<Dimension>>,
        }

        let cases = [
            Case {
                spec: "(1,3,224,224)",
                expected: Some(vec![
                    Dimension::Exact(1),
                    Dimension::Exact(3),
                    Dimension::Exact(224),
                    Dimension::Exact(224),
                ]),
            },
            Case {
                spec: "[1, -1, 220:230]",
                expected: Some(vec![
                    Dimension::Exact(1),
                    Dimension::Any,
                    Dimension::range(220, 230).unwrap(),
                ]),
            },
            Case {
                spec: "2,5",
                expected: Some(vec![Dimension::Exact(2), Dimension::Exact(5)]),
            },
            Case {
                spec: "()",
                expected: Some(vec![]),
            },
            Case {
                spec: "(1,3",
                expected: None,
            },
            Case {
                spec: "(1,,3)",
                expected: None,
            },
            Case {
                spec: "(1,x)",
                expected: None,
            },
        ];

        cases.test_each(|case| {
            let parsed = case.spec.parse::<Shape>().ok();
            assert_eq!(parsed, case.expected.clone().map(Shape::from));
        })
    }

    #[test]
    fn test_display_round_trip() {
        let s = shape("(1, 3, 224, 220:230, -1)");
        assert_eq!(s.to_string(), "(1,3,224,220:230,-1)");
        assert_eq!(shape(&s.to_string()), s);
        assert_eq!(Shape::new().to_string(), "()");
    }

    #[test]
    fn test_matches() {
        let s = shape("(1,-1,2:4)");
        assert!(s.matches(&[1, 100, 3]));
        assert!(!s.matches(&[2, 100, 3]));
        assert!(!s.matches(&[1, 100, 5]));
        assert!(!s.matches(&[1, 100]));
        assert!(Shape::new().matches(&[]));
    }

    #[test]
    fn test_static() {
        assert_eq!(shape("(2,3)").to_static(), Some(vec![2, 3]));
        assert!(shape("(2,3)").is_static());
        assert_eq!(shape("(2,-1)").to_static(), None);
        assert_eq!(Shape::from_static(&[4, 5]), shape("(4,5)"));
    }

    #[test]
    fn test_intersect() {
        #[derive(Debug)]
        struct Case<'a> {
            a: &'a str,
            b: &'a str,
            expected: Result<&'a str, IntersectError>,
        }

        let cases = [
            Case {
                a: "(1,3,224,220:230)",
                b: "(1,-1,220:225,200:300)",
                expected: Ok("(1,3,224,220:230)"),
            },
            Case {
                a: "()",
                b: "()",
                expected: Ok("()"),
            },
            Case {
                a: "(1,3)",
                b: "(1,3,1)",
                expected: Err(IntersectError::RankMismatch { left: 2, right: 3 }),
            },
            Case {
                a: "(1,2:4,8)",
                b: "(1,5:9,8)",
                expected: Err(IntersectError::DimensionMismatch {
                    axis: 1,
                    left: Dimension::range(2, 4).unwrap(),
                    right: Dimension::range(5, 9).unwrap(),
                }),
            },
            Case {
                a: "(-1,10:20)",
                b: "(-1,20:30)",
                expected: Ok("(-1,20)"),
            },
        ];

        cases.test_each(|case| {
            let result = shape(case.a).intersect(&shape(case.b));
            assert_eq!(result, case.expected.clone().map(shape));
        })
    }

    #[test]
    fn test_intersect_is_commutative_on_success() {
        let shapes: Vec<Shape> = ["(1,3)", "(-1,3)", "(1:4,-1)", "(2,2:3)", "(1,3,4)"]
            .into_iter()
            .map(shape)
            .collect();
        for a in &shapes {
            for b in &shapes {
                assert_eq!(a.intersect(b).ok(), b.intersect(a).ok());
            }
        }
    }
}
