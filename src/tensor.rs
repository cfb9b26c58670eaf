use base64::{engine::general_purpose, Engine as _};
use half::{bf16, f16};
use serde_json::Value;
use tensorgate_spec::Precision;

/// Element type which can be read back from a numeric [DecodedTensor].
pub trait Element: Copy {
    /// Precision of tensors holding elements of this type.
    const PRECISION: Precision;

    /// Read an element from its little-endian representation.
    ///
    /// `bytes` must have the length of [`Precision::size`].
    fn from_le_slice(bytes: &[u8]) -> Self;

    /// Convert this element into a JSON value.
    fn to_json_value(self) -> Value;
}

macro_rules! impl_element {
    ($type:ty, $precision:ident, $to_json:expr) => {
        impl Element for $type {
            const PRECISION: Precision = Precision::$precision;

            fn from_le_slice(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$type>()];
                buf.copy_from_slice(bytes);
                <$type>::from_le_bytes(buf)
            }

            fn to_json_value(self) -> Value {
                let to_json: fn($type) -> Value = $to_json;
                to_json(self)
            }
        }
    };
}

fn float_value(x: f64) -> Value {
    serde_json::Number::from_f64(x)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

impl_element!(f64, Fp64, float_value);
impl_element!(f32, Fp32, |x| float_value(x as f64));
impl_element!(f16, Fp16, |x| float_value(x.to_f64()));
impl_element!(bf16, Bf16, |x| float_value(x.to_f64()));
impl_element!(i64, I64, Value::from);
impl_element!(i32, I32, Value::from);
impl_element!(i16, I16, Value::from);
impl_element!(i8, I8, Value::from);
impl_element!(u64, U64, Value::from);
impl_element!(u32, U32, Value::from);
impl_element!(u16, U16, Value::from);
impl_element!(u8, U8, Value::from);

impl Element for bool {
    const PRECISION: Precision = Precision::Bool;

    fn from_le_slice(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    fn to_json_value(self) -> Value {
        Value::Bool(self)
    }
}

/// Storage for the elements of a [DecodedTensor].
#[derive(Clone, Debug, PartialEq)]
pub enum TensorContent {
    /// Little-endian elements in row-major order.
    Numeric(Vec<u8>),

    /// Decoded `{"b64": ...}` payloads in row-major order.
    Binary(Vec<Vec<u8>>),
}

/// Tensor produced from one input of a request.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedTensor {
    precision: Precision,
    shape: Vec<usize>,
    content: TensorContent,
}

impl DecodedTensor {
    pub(crate) fn new(precision: Precision, shape: Vec<usize>, content: TensorContent) -> Self {
        DecodedTensor {
            precision,
            shape,
            content,
        }
    }

    /// Return the precision that numeric elements were converted to.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Return the size of each dimension.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn content(&self) -> &TensorContent {
        &self.content
    }

    pub fn into_content(self) -> TensorContent {
        self.content
    }

    /// Return true if this tensor holds binary payloads.
    pub fn is_binary(&self) -> bool {
        matches!(self.content, TensorContent::Binary(_))
    }

    /// Return the number of elements, which is the product of the shape.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the total size of the tensor's content in bytes.
    pub fn byte_len(&self) -> usize {
        match &self.content {
            TensorContent::Numeric(data) => data.len(),
            TensorContent::Binary(items) => items.iter().map(|item| item.len()).sum(),
        }
    }

    /// Return the elements of a numeric tensor as a vector.
    ///
    /// Returns `None` if the tensor is binary or `T` does not match the
    /// tensor's precision.
    pub fn to_vec<T: Element>(&self) -> Option<Vec<T>> {
        match &self.content {
            TensorContent::Numeric(data) if self.precision == T::PRECISION => Some(
                data.chunks_exact(std::mem::size_of::<T>())
                    .map(T::from_le_slice)
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Convert the tensor back into nested JSON arrays.
    ///
    /// Binary payloads are encoded as `{"b64": ...}` objects and non-finite
    /// floats, which JSON cannot represent, become `null`.
    pub fn to_json(&self) -> Value {
        let leaves: Vec<Value> = match &self.content {
            TensorContent::Binary(items) => items
                .iter()
                .map(|item| serde_json::json!({ "b64": general_purpose::STANDARD.encode(item) }))
                .collect(),
            TensorContent::Numeric(data) => match self.precision {
                Precision::Fp64 => json_leaves::<f64>(data),
                Precision::Fp32 => json_leaves::<f32>(data),
                Precision::Fp16 => json_leaves::<f16>(data),
                Precision::Bf16 => json_leaves::<bf16>(data),
                Precision::I64 => json_leaves::<i64>(data),
                Precision::I32 => json_leaves::<i32>(data),
                Precision::I16 => json_leaves::<i16>(data),
                Precision::I8 => json_leaves::<i8>(data),
                Precision::U64 => json_leaves::<u64>(data),
                Precision::U32 => json_leaves::<u32>(data),
                Precision::U16 => json_leaves::<u16>(data),
                Precision::U8 => json_leaves::<u8>(data),
                Precision::Bool => json_leaves::<bool>(data),
                Precision::Undefined => Vec::new(),
            },
        };
        nest(&mut leaves.into_iter(), &self.shape)
    }
}

fn json_leaves<T: Element>(data: &[u8]) -> Vec<Value> {
    data.chunks_exact(std::mem::size_of::<T>())
        .map(|bytes| T::from_le_slice(bytes).to_json_value())
        .collect()
}

fn nest(leaves: &mut impl Iterator<Item = Value>, shape: &[usize]) -> Value {
    match shape.split_first() {
        None => leaves.next().unwrap_or(Value::Null),
        Some((&size, inner)) => Value::Array((0..size).map(|_| nest(leaves, inner)).collect()),
    }
}
