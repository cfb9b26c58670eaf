use std::fmt::{Display, Formatter};

use rustc_hash::FxHashMap;
use serde_json::Value;
use tensorgate_spec::Precision;

use crate::errors::{DecodeError, InputErrorReason};
use crate::tensor::{DecodedTensor, Element};

/// Reserved input holding the session identifier of a stateful request.
pub const SEQUENCE_ID: &str = "sequence_id";

/// Reserved input holding the [SequenceControl] flag of a stateful request.
pub const SEQUENCE_CONTROL_INPUT: &str = "sequence_control_input";

/// Return the precision that a reserved session input is decoded with.
pub(crate) fn reserved_precision(name: &str) -> Option<Precision> {
    match name {
        SEQUENCE_ID => Some(Precision::U64),
        SEQUENCE_CONTROL_INPUT => Some(Precision::U32),
        _ => None,
    }
}

/// Check that the raw value of a reserved input is a single non-negative
/// integer which fits in `precision`, optionally nested in one-element
/// arrays.
pub(crate) fn check_reserved_value(
    precision: Precision,
    value: &Value,
) -> Result<(), InputErrorReason> {
    let mut leaf = value;
    while let Value::Array(items) = leaf {
        match items.as_slice() {
            [item] => leaf = item,
            _ => return Err(InputErrorReason::NotASingleValue),
        }
    }

    let max = match precision {
        Precision::U32 => u32::MAX as u64,
        _ => u64::MAX,
    };
    match leaf.as_u64() {
        Some(value) if value <= max => Ok(()),
        _ => Err(InputErrorReason::NotASingleValue),
    }
}

/// Interpretation of [`SessionTag::control`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceControl {
    /// The request continues an existing session.
    NoControl,

    /// The request starts a new session.
    Start,

    /// The request ends its session.
    End,
}

impl SequenceControl {
    pub fn value(self) -> u32 {
        match self {
            SequenceControl::NoControl => 0,
            SequenceControl::Start => 1,
            SequenceControl::End => 2,
        }
    }

    pub fn from_value(value: u32) -> Option<SequenceControl> {
        match value {
            0 => Some(SequenceControl::NoControl),
            1 => Some(SequenceControl::Start),
            2 => Some(SequenceControl::End),
            _ => None,
        }
    }
}

/// Session identifier and control flag attached to a request for a stateful
/// model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SessionTag {
    pub control: u32,
    pub id: u64,
}

impl SessionTag {
    pub fn new(id: u64, control: SequenceControl) -> SessionTag {
        SessionTag {
            control: control.value(),
            id,
        }
    }

    /// Interpret the control flag, or return `None` if it has no known
    /// meaning.
    pub fn control_kind(&self) -> Option<SequenceControl> {
        SequenceControl::from_value(self.control)
    }

    /// Remove the reserved session inputs from `inputs` and return the tag
    /// they describe.
    pub(crate) fn take_from(
        inputs: &mut FxHashMap<String, DecodedTensor>,
    ) -> Result<SessionTag, DecodeError> {
        let id = match inputs.remove(SEQUENCE_ID) {
            Some(tensor) => single_value::<u64>(SEQUENCE_ID, &tensor)?,
            None => 0,
        };
        let control = match inputs.remove(SEQUENCE_CONTROL_INPUT) {
            Some(tensor) => single_value::<u32>(SEQUENCE_CONTROL_INPUT, &tensor)?,
            None => SequenceControl::NoControl.value(),
        };
        Ok(SessionTag { control, id })
    }
}

impl Display for SessionTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.control_kind() {
            Some(kind) => write!(f, "id {} ({:?})", self.id, kind),
            None => write!(f, "id {} (control {})", self.id, self.control),
        }
    }
}

fn single_value<T: Element>(name: &str, tensor: &DecodedTensor) -> Result<T, DecodeError> {
    match tensor.to_vec::<T>().as_deref() {
        Some(&[value]) => Ok(value),
        _ => Err(DecodeError::input(name, InputErrorReason::NotASingleValue)),
    }
}
