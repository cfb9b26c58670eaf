use serde::Deserialize;

use crate::env::env_flag;

/// Environment variable which enables [`DecodeOptions::strict_shapes`].
pub const STRICT_SHAPES_ENV: &str = "TENSORGATE_STRICT_SHAPES";

/// Environment variable which enables [`DecodeOptions::stateful`].
pub const STATEFUL_ENV: &str = "TENSORGATE_STATEFUL";

/// Name given to the input of a request which does not name its inputs,
/// when no single expected input is known.
pub const DEFAULT_UNNAMED_INPUT: &str = "input";

/// Options that control how a [RequestDecoder](crate::RequestDecoder)
/// interprets requests.
///
/// Options can be loaded from JSON, where missing fields take their default
/// values:
///
/// ```
/// use tensorgate::DecodeOptions;
///
/// let opts: DecodeOptions = serde_json::from_str(r#"{"strict_shapes": true}"#).unwrap();
/// assert!(opts.strict_shapes);
/// assert!(!opts.stateful);
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeOptions {
    /// Reject inputs whose decoded shape does not match the shape of the
    /// expected [TensorInfo](tensorgate_spec::TensorInfo).
    ///
    /// When disabled, the shape implied by the document is accepted as-is
    /// and checking it is left to the inference backend.
    pub strict_shapes: bool,

    /// Extract a [SessionTag](crate::SessionTag) from the reserved
    /// `sequence_id` and `sequence_control_input` inputs.
    pub stateful: bool,

    /// Input name used for requests which do not name their inputs, if the
    /// expected inputs are unknown.
    pub unnamed_input: String,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            strict_shapes: false,
            stateful: false,
            unnamed_input: DEFAULT_UNNAMED_INPUT.to_string(),
        }
    }
}

impl DecodeOptions {
    /// Return default options, with flags overridden by the
    /// `TENSORGATE_STRICT_SHAPES` and `TENSORGATE_STATEFUL` environment
    /// variables.
    pub fn from_env() -> DecodeOptions {
        DecodeOptions::default().with_env_overrides()
    }

    /// Override flags in `self` which have a corresponding environment
    /// variable set.
    pub fn with_env_overrides(self) -> DecodeOptions {
        DecodeOptions {
            strict_shapes: env_flag(STRICT_SHAPES_ENV, self.strict_shapes),
            stateful: env_flag(STATEFUL_ENV, self.stateful),
            ..self
        }
    }
}
