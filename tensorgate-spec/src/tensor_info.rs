use std::fmt::{Display, Formatter};

use crate::{IntersectError, Layout, Precision, Shape};

/// Specification of a tensor which a model or pipeline node consumes or
/// produces.
///
/// `TensorInfo` is an immutable value. The special
/// [unspecified](TensorInfo::unspecified) value acts as a wildcard which
/// intersects with anything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TensorInfo {
    name: String,
    mapped_name: String,
    precision: Precision,
    shape: Shape,
    layout: Layout,
}

impl TensorInfo {
    pub fn new(
        name: impl Into<String>,
        precision: Precision,
        shape: Shape,
        layout: Layout,
    ) -> TensorInfo {
        TensorInfo {
            name: name.into(),
            mapped_name: String::new(),
            precision,
            shape,
            layout,
        }
    }

    /// Return the wildcard specification: empty name, undefined precision,
    /// rank-0 shape and unspecified layout.
    pub fn unspecified() -> TensorInfo {
        TensorInfo::default()
    }

    /// Return true if this is the [unspecified](TensorInfo::unspecified)
    /// wildcard.
    pub fn is_unspecified(&self) -> bool {
        self.name.is_empty()
            && self.mapped_name.is_empty()
            && self.precision == Precision::Undefined
            && self.shape.rank() == 0
            && self.layout == Layout::Unspecified
    }

    /// Set the alternate name under which this tensor is exposed to clients.
    pub fn with_mapped_name(mut self, mapped_name: impl Into<String>) -> TensorInfo {
        self.mapped_name = mapped_name.into();
        self
    }

    /// Return a copy of this specification with different names.
    pub fn renamed(&self, name: &str, mapped_name: &str) -> TensorInfo {
        TensorInfo {
            name: name.to_string(),
            mapped_name: mapped_name.to_string(),
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mapped_name(&self) -> &str {
        &self.mapped_name
    }

    /// Return the name clients use for this tensor: the mapped name if set,
    /// otherwise the name.
    pub fn exposed_name(&self) -> &str {
        if self.mapped_name.is_empty() {
            &self.name
        } else {
            &self.mapped_name
        }
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Return true if precision, shape and layout are equal. Names are not
    /// compared.
    pub fn is_spec_equal(&self, other: &TensorInfo) -> bool {
        self.precision == other.precision
            && self.shape == other.shape
            && self.layout == other.layout
    }

    /// Compute the most specific specification that satisfies both `self`
    /// and `other`.
    ///
    /// If either side is [unspecified](TensorInfo::unspecified), the other
    /// side is returned unchanged. Otherwise names and mapped names must be
    /// equal, precisions and layouts must be compatible and shapes must
    /// intersect dimension by dimension. A concrete layout in the result
    /// must label as many axes as the resulting shape has.
    ///
    /// The operation is commutative: `a.intersect(&b)` succeeds exactly when
    /// `b.intersect(&a)` does, with the same result.
    pub fn intersect(&self, other: &TensorInfo) -> Result<TensorInfo, IntersectError> {
        if self.is_unspecified() {
            return Ok(other.clone());
        }
        if other.is_unspecified() {
            return Ok(self.clone());
        }

        if self.name != other.name {
            return Err(IntersectError::NameMismatch {
                left: self.name.clone(),
                right: other.name.clone(),
            });
        }
        if self.mapped_name != other.mapped_name {
            return Err(IntersectError::MappedNameMismatch {
                left: self.mapped_name.clone(),
                right: other.mapped_name.clone(),
            });
        }

        let precision = self.precision.intersect(other.precision).ok_or(
            IntersectError::PrecisionMismatch {
                left: self.precision,
                right: other.precision,
            },
        )?;

        let layout =
            self.layout
                .intersect(&other.layout)
                .ok_or_else(|| IntersectError::LayoutMismatch {
                    left: self.layout.clone(),
                    right: other.layout.clone(),
                })?;

        let shape = self.shape.intersect(&other.shape)?;

        if let Some(rank) = layout.rank() {
            if rank != shape.rank() {
                return Err(IntersectError::LayoutRankMismatch {
                    layout,
                    rank: shape.rank(),
                });
            }
        }

        Ok(TensorInfo {
            name: self.name.clone(),
            mapped_name: self.mapped_name.clone(),
            precision,
            shape,
            layout,
        })
    }
}

impl Display for TensorInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "name: {}; mapped_name: {}; precision: {}; shape: {}; layout: {}",
            self.name, self.mapped_name, self.precision, self.shape, self.layout
        )
    }
}
