use std::fmt::{Display, Formatter};
use std::str::FromStr;

use smallvec::SmallVec;

use crate::errors::{ParseError, ParseErrorKind};

/// Text form of [`Layout::Default`].
pub const DEFAULT_LAYOUT: &str = "N...";

/// Text form of [`Layout::Unspecified`].
pub const UNSPECIFIED_LAYOUT: &str = "...";

/// Label used for an axis with no particular meaning.
const UNKNOWN_AXIS: char = '?';

/// Semantic meaning of each axis of a tensor, eg. `NCHW` for
/// batch / channel / height / width.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Layout {
    /// No layout information. Matches any other layout.
    #[default]
    Unspecified,

    /// Placeholder layout assigned when a model does not declare one.
    ///
    /// This currently matches any concrete layout when intersected.
    Default,

    /// One label per axis.
    Axes(SmallVec<[char; 6]>),
}

impl Layout {
    /// Create a layout from a string of axis labels such as `"NHWC"`.
    pub fn axes(labels: &str) -> Result<Layout, ParseError> {
        let mut axes: SmallVec<[char; 6]> = SmallVec::new();
        for label in labels.chars() {
            if !label.is_ascii_alphabetic() && label != UNKNOWN_AXIS {
                return Err(ParseError::new(
                    labels,
                    ParseErrorKind::InvalidLayout {
                        message: format!("'{}' is not an axis label", label),
                    },
                ));
            }
            if label != UNKNOWN_AXIS && axes.contains(&label) {
                return Err(ParseError::new(
                    labels,
                    ParseErrorKind::InvalidLayout {
                        message: format!("axis '{}' appears more than once", label),
                    },
                ));
            }
            axes.push(label);
        }
        Ok(Layout::Axes(axes))
    }

    /// Return the axis labels, or `None` for the default and unspecified
    /// layouts.
    pub fn labels(&self) -> Option<&[char]> {
        match self {
            Layout::Axes(axes) => Some(axes.as_slice()),
            _ => None,
        }
    }

    /// Return the number of labelled axes, if this layout is concrete.
    pub fn rank(&self) -> Option<usize> {
        self.labels().map(|axes| axes.len())
    }

    /// Return the position of the axis with a given label.
    pub fn axis(&self, label: char) -> Option<usize> {
        self.labels()?.iter().position(|&l| l == label)
    }

    /// Return the layout compatible with both `self` and `other`, or `None`
    /// if they are different concrete layouts.
    ///
    /// [`Layout::Unspecified`] yields to anything, then [`Layout::Default`]
    /// yields to anything concrete.
    pub fn intersect(&self, other: &Layout) -> Option<Layout> {
        match (self, other) {
            (Layout::Unspecified, layout) | (layout, Layout::Unspecified) => Some(layout.clone()),
            (Layout::Default, layout) | (layout, Layout::Default) => Some(layout.clone()),
            (a, b) => (a == b).then(|| a.clone()),
        }
    }
}

impl Display for Layout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Layout::Unspecified => write!(f, "{}", UNSPECIFIED_LAYOUT),
            Layout::Default => write!(f, "{}", DEFAULT_LAYOUT),
            Layout::Axes(axes) => axes.iter().try_for_each(|label| write!(f, "{}", label)),
        }
    }
}

impl FromStr for Layout {
    type Err = ParseError;

    /// Parse a layout. `"..."` or an empty string is unspecified, `"N..."`
    /// or `"default"` is the default layout and anything else is a list of
    /// axis labels.
    fn from_str(spec: &str) -> Result<Layout, ParseError> {
        match spec.trim() {
            "" | UNSPECIFIED_LAYOUT => Ok(Layout::Unspecified),
            DEFAULT_LAYOUT | "default" => Ok(Layout::Default),
            labels => Layout::axes(labels),
        }
    }
}

#[cfg(test)]
mod tests {
    use tensorgate_testing::TestCases;

    use super::Layout;

    fn layout(spec: &str) -> Layout {
        spec.parse().unwrap()
    }

    #[test]
    fn test_parse() {
        assert_eq!(layout("..."), Layout::Unspecified);
        assert_eq!(layout(""), Layout::Unspecified);
        assert_eq!(layout("N..."), Layout::Default);
        assert_eq!(layout("NCHW").labels(), Some(['N', 'C', 'H', 'W'].as_slice()));
        assert_eq!(layout("N?C?").rank(), Some(4));
        assert!("NCHN".parse::<Layout>().is_err());
        assert!("NC.W".parse::<Layout>().is_err());
        assert!("N1".parse::<Layout>().is_err());
    }

    #[test]
    fn test_display() {
        for spec in ["...", "N...", "NCHW", "N?"] {
            assert_eq!(layout(spec).to_string(), spec);
        }
    }

    #[test]
    fn test_axis() {
        let nhwc = layout("NHWC");
        assert_eq!(nhwc.axis('C'), Some(3));
        assert_eq!(nhwc.axis('D'), None);
        assert_eq!(Layout::Default.axis('N'), None);
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
                a: "NCHW",
                b: "NCHW",
                expected: Some("NCHW"),
            },
            Case {
                a: "NCHW",
                b: "NHWC",
                expected: None,
            },
            Case {
                a: "N...",
                b: "NHWC",
                expected: Some("NHWC"),
            },
            Case {
                a: "...",
                b: "NHWC",
                expected: Some("NHWC"),
            },
            Case {
                a: "...",
                b: "N...",
                expected: Some("N..."),
            },
            Case {
                a: "...",
                b: "...",
                expected: Some("..."),
            },
        ];

        cases.test_each(|case| {
            let (a, b) = (layout(case.a), layout(case.b));
            let expected = case.expected.map(layout);
            assert_eq!(a.intersect(&b), expected);
            assert_eq!(b.intersect(&a), expected);
        })
    }
}
