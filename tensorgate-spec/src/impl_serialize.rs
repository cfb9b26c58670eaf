//! serde support. Dimensions, shapes, layouts and precisions use their text
//! forms, so a tensor specification serializes as:
//!
//! ```json
//! {
//!   "name": "image",
//!   "mapped_name": "",
//!   "precision": "U8",
//!   "shape": "(1,3,224:448,-1)",
//!   "layout": "NCHW"
//! }
//! ```

use std::fmt::Display;
use std::str::FromStr;

use serde::de::{Deserialize, Deserializer, Error};
use serde::ser::{Serialize, Serializer};

use crate::{Dimension, Layout, Precision, Shape, TensorInfo};

fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let text = String::deserialize(deserializer)?;
    text.parse().map_err(D::Error::custom)
}

macro_rules! impl_serde_via_str {
    ($type:ty) => {
        impl Serialize for $type {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $type {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserialize_from_str(deserializer)
            }
        }
    };
}

impl_serde_via_str!(Dimension);
impl_serde_via_str!(Shape);
impl_serde_via_str!(Layout);
impl_serde_via_str!(Precision);

#[derive(Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct TensorInfoRepr {
    name: String,
    mapped_name: String,
    precision: Precision,
    shape: Shape,
    layout: Layout,
}

impl Serialize for TensorInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TensorInfoRepr {
            name: self.name().to_string(),
            mapped_name: self.mapped_name().to_string(),
            precision: self.precision(),
            shape: self.shape().clone(),
            layout: self.layout().clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TensorInfo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = TensorInfoRepr::deserialize(deserializer)?;
        Ok(TensorInfo::new(repr.name, repr.precision, repr.shape, repr.layout)
            .with_mapped_name(repr.mapped_name))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Layout, Precision, Shape, TensorInfo};

    #[test]
    fn test_deserialize_tensor_info() {
        let json = r#"{"name": "image", "precision": "u8", "shape": "(1,3,224:448,-1)", "layout": "NCHW"}"#;
        let info: TensorInfo = serde_json::from_str(json).unwrap();

        assert_eq!(info.name(), "image");
        assert_eq!(info.mapped_name(), "");
        assert_eq!(info.precision(), Precision::U8);
        assert_eq!(info.shape(), &"(1,3,224:448,-1)".parse::<Shape>().unwrap());
        assert_eq!(info.layout(), &"NCHW".parse::<Layout>().unwrap());
    }

    #[test]
    fn test_missing_fields_are_unspecified() {
        let info: TensorInfo = serde_json::from_str("{}").unwrap();
        assert!(info.is_unspecified());
    }

    #[test]
    fn test_invalid_field() {
        let err = serde_json::from_str::<TensorInfo>(r#"{"name": "x", "shape": "(1,a)"}"#)
            .err()
            .unwrap();
        assert!(err.to_string().contains("invalid shape"));
    }

    #[test]
    fn test_serialize_round_trip() {
        let info = TensorInfo::new(
            "x",
            Precision::Fp16,
            "(2,1:8)".parse().unwrap(),
            Layout::Default,
        )
        .with_mapped_name("y");
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "x",
                "mapped_name": "y",
                "precision": "FP16",
                "shape": "(2,1:8)",
                "layout": "N...",
            })
        );
        assert_eq!(serde_json::from_value::<TensorInfo>(json).unwrap(), info);
    }
}
