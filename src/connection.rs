use std::error::Error;
use std::fmt::{Display, Formatter};

use tensorgate_spec::{IntersectError, TensorInfo};

/// Error returned when a node output cannot feed another node's input.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionError {
    source_node: String,
    output: String,
    target_node: String,
    input: String,
    error: IntersectError,
}

impl ConnectionError {
    pub fn source_node(&self) -> &str {
        &self.source_node
    }

    pub fn target_node(&self) -> &str {
        &self.target_node
    }

    /// Return the reason why the specifications do not intersect.
    pub fn intersect_error(&self) -> &IntersectError {
        &self.error
    }
}

impl Display for ConnectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "node \"{}\" output \"{}\" is incompatible with node \"{}\" input \"{}\": {}",
            self.source_node, self.output, self.target_node, self.input, self.error
        )
    }
}

impl Error for ConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

/// Check that `output` of `source_node` can be connected to `input` of
/// `target_node`, and return the narrowed specification of the tensor which
/// flows between them.
///
/// An output and an input are named independently, so the output is renamed
/// to match the input before the specifications are intersected. Unspecified
/// specifications are intersected as-is.
pub fn validate_connection(
    source_node: &str,
    output: &TensorInfo,
    target_node: &str,
    input: &TensorInfo,
) -> Result<TensorInfo, ConnectionError> {
    let aligned = if output.is_unspecified() || input.is_unspecified() {
        output.clone()
    } else {
        output.renamed(input.name(), input.mapped_name())
    };

    match aligned.intersect(input) {
        Ok(info) => {
            tracing::debug!(
                source = source_node,
                target = target_node,
                spec = %info,
                "validated connection"
            );
            Ok(info)
        }
        Err(error) => {
            let error = ConnectionError {
                source_node: source_node.to_string(),
                output: output.exposed_name().to_string(),
                target_node: target_node.to_string(),
                input: input.exposed_name().to_string(),
                error,
            };
            tracing::warn!("{}", error);
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use tensorgate_spec::{Dimension, IntersectError, Layout, Precision, Shape, TensorInfo};

    use super::validate_connection;

    fn spec(name: &str, precision: Precision, shape: Shape) -> TensorInfo {
        TensorInfo::new(name, precision, shape, Layout::Unspecified)
    }

    #[test]
    fn test_validate_connection() {
        let output = spec(
            "logits",
            Precision::Fp32,
            Shape::from([Dimension::Any, Dimension::Exact(10)]),
        );
        let input = spec(
            "scores",
            Precision::Fp32,
            Shape::from([Dimension::Exact(1), Dimension::Any]),
        );

        let info = validate_connection("classifier", &output, "argmax", &input).unwrap();
        assert_eq!(info.name(), "scores");
        assert_eq!(info.shape(), &Shape::from_static(&[1, 10]));
    }

    #[test]
    fn test_validate_connection_mismatch() {
        let output = spec("x", Precision::Fp32, Shape::from_static(&[1]));
        let input = spec("y", Precision::I32, Shape::from_static(&[1]));

        let err = validate_connection("a", &output, "b", &input).unwrap_err();
        assert_eq!(err.source_node(), "a");
        assert_eq!(err.target_node(), "b");
        assert_eq!(
            err.intersect_error(),
            &IntersectError::PrecisionMismatch {
                left: Precision::Fp32,
                right: Precision::I32,
            }
        );
        assert_eq!(
            err.to_string(),
            "node \"a\" output \"x\" is incompatible with node \"b\" input \"y\": precision mismatch (FP32 vs I32)"
        );
    }

    #[test]
    fn test_validate_unspecified_connection() {
        let output = TensorInfo::unspecified();
        let input = spec("y", Precision::U8, Shape::from_static(&[3]));
        assert_eq!(
            validate_connection("a", &output, "b", &input),
            Ok(input.clone())
        );
        assert_eq!(
            validate_connection("a", &input, "b", &output),
            Ok(input.clone())
        );
    }
}
