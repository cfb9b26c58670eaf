use tensorgate_spec::{Layout, Precision, Shape, TensorInfo};

/// Parse a tensor specification given on the command line.
///
/// The format is `name[/mapped_name]:PRECISION:SHAPE[:LAYOUT]`, for example
/// `image:FP32:(1,3,224,220:230):NCHW`. Colons inside parentheses or brackets
/// belong to the shape. `unspecified` or `*` gives
/// [`TensorInfo::unspecified`].
pub fn parse_tensor_spec(spec: &str) -> Result<TensorInfo, ParseError> {
    if matches!(spec.trim(), "unspecified" | "*") {
        return Ok(TensorInfo::unspecified());
    }

    let fields = split_fields(spec);
    let (names, precision, shape, layout) = match fields.as_slice() {
        [names, precision, shape] => (names, precision, shape, None),
        [names, precision, shape, layout] => (names, precision, shape, Some(layout)),
        _ => {
            return Err(ParseError::new(
                spec,
                ParseErrorKind::InvalidFormat {
                    message: format!("expected 3 or 4 fields but found {}", fields.len()),
                },
            ));
        }
    };

    let (name, mapped_name) = match names.split_once('/') {
        Some((name, mapped_name)) => (name, mapped_name),
        None => (names.as_str(), ""),
    };
    if name.is_empty() {
        return Err(ParseError::new(spec, ParseErrorKind::InvalidName));
    }

    let field_error = |field: &'static str, error: tensorgate_spec::ParseError| {
        ParseError::new(spec, ParseErrorKind::InvalidField { field, error })
    };
    let precision: Precision = precision
        .parse()
        .map_err(|err| field_error("precision", err))?;
    let shape: Shape = shape.parse().map_err(|err| field_error("shape", err))?;
    let layout: Layout = match layout {
        Some(layout) => layout.parse().map_err(|err| field_error("layout", err))?,
        None => Layout::Unspecified,
    };

    Ok(TensorInfo::new(name, precision, shape, layout).with_mapped_name(mapped_name))
}

/// Split `spec` at colons which are not nested in brackets.
fn split_fields(spec: &str) -> Vec<String> {
    let mut fields = vec![String::new()];
    let mut depth = 0usize;

    for ch in spec.chars() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => {
                fields.push(String::new());
                continue;
            }
            _ => {}
        }
        if let Some(field) = fields.last_mut() {
            field.push(ch);
        }
    }

    fields
}

#[derive(Clone, Debug, PartialEq)]
enum ParseErrorKind {
    /// Spec doesn't have the expected number of fields
    InvalidFormat { message: String },
    /// Tensor name is empty
    InvalidName,
    /// A precision, shape or layout field could not be parsed
    InvalidField {
        field: &'static str,
        error: tensorgate_spec::ParseError,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParseError {
    spec: String,
    kind: ParseErrorKind,
}

impl ParseError {
    fn new(spec: &str, kind: ParseErrorKind) -> ParseError {
        ParseError {
            spec: spec.to_string(),
            kind,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ParseErrorKind::InvalidFormat { message } => write!(
                fmt,
                "invalid format for tensor spec \"{}\": {}",
                self.spec, message
            ),
            ParseErrorKind::InvalidName => {
                write!(fmt, "missing tensor name in tensor spec \"{}\"", self.spec)
            }
            ParseErrorKind::InvalidField { field, error } => write!(
                fmt,
                "invalid {} in tensor spec \"{}\": {}",
                field, self.spec, error
            ),
        }
    }
}

impl std::error::Error for ParseError {}
