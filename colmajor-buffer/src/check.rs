//! Shape validation under a missing-metadata policy.
//!
//! A check compares the shape a buffer discovered from its container
//! against the shape agreed for the engine call. Known disagreements are
//! errors. What happens when part of the discovered shape is unknown is
//! decided by [`MissingMetadataPolicy`].

use std::fmt;

use colmajor_traits::Meta;

use crate::shape::{ShapeDesc, ShapeInfo};
use crate::{MarshalError, Result};

/// How unknown shape metadata is treated during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MissingMetadataPolicy {
    /// Skip the check entirely when any needed extent is unknown.
    /// Dimensionality is never cross-checked.
    Ignore,
    /// Skip unknown extents, but a known wrong dimensionality is an error.
    #[default]
    IgnoreMissing,
    /// As `IgnoreMissing`, then report missing metadata as a warning.
    MissingAsWarning,
    /// As `IgnoreMissing`, then report missing metadata as an error.
    MissingAsError,
}

/// Non-fatal report of missing shape metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeWarning {
    pub name: &'static str,
    pub expected: ShapeDesc,
    pub actual: ShapeDesc,
}

impl fmt::Display for ShapeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: shape could not be confirmed: expected {}, got {}",
            self.name, self.expected, self.actual
        )
    }
}

/// One argument's discovered shape against its expected shape.
#[derive(Debug, Clone, Copy)]
pub struct ShapeCheck<'e> {
    pub name: &'static str,
    pub actual: ShapeInfo,
    pub expected_extents: &'e [usize],
    /// Expected storage order; unknown skips the order comparison.
    pub expected_order: Meta<bool>,
}

impl<'e> ShapeCheck<'e> {
    pub fn new(
        name: &'static str,
        actual: ShapeInfo,
        expected_extents: &'e [usize],
        expected_order: Meta<bool>,
    ) -> Self {
        Self {
            name,
            actual,
            expected_extents,
            expected_order,
        }
    }

    fn axes(&self) -> impl Iterator<Item = (Meta<usize>, usize)> + '_ {
        self.expected_extents
            .iter()
            .enumerate()
            .map(|(i, &e)| (self.actual.extent(i + 1), e))
    }

    fn dims_disagree(&self) -> bool {
        u8::try_from(self.expected_extents.len()).map_or(true, |d| self.actual.dims != d)
    }

    fn extents_disagree(&self) -> bool {
        self.axes().any(|(actual, expected)| actual != expected)
    }

    fn order_disagrees(&self) -> bool {
        self.actual.column_major != self.expected_order
    }

    fn metadata_missing(&self) -> bool {
        !self.actual.dims.is_known() || self.axes().any(|(actual, _)| !actual.is_known())
    }

    /// Whether known metadata contradicts the expected shape.
    ///
    /// Unknown values never count as a mismatch.
    pub fn is_shape_mismatch(&self) -> bool {
        self.dims_disagree() || self.extents_disagree() || self.order_disagrees()
    }

    /// Validate under `policy`, returning a warning when the policy asks
    /// for one.
    pub fn validate(&self, policy: MissingMetadataPolicy) -> Result<Option<ShapeWarning>> {
        if policy == MissingMetadataPolicy::Ignore {
            if self.axes().any(|(actual, _)| !actual.is_known()) {
                return Ok(None);
            }
            if self.extents_disagree() || self.order_disagrees() {
                return Err(self.mismatch());
            }
            return Ok(None);
        }

        if self.is_shape_mismatch() {
            return Err(self.mismatch());
        }
        if !self.metadata_missing() {
            return Ok(None);
        }

        match policy {
            MissingMetadataPolicy::MissingAsWarning => {
                let warning = ShapeWarning {
                    name: self.name,
                    expected: self.expected_desc(),
                    actual: self.actual.describe(),
                };
                tracing::warn!(
                    name = self.name,
                    expected = %warning.expected,
                    actual = %warning.actual,
                    "shape metadata missing"
                );
                Ok(Some(warning))
            }
            MissingMetadataPolicy::MissingAsError => Err(MarshalError::MissingMetadata {
                name: self.name,
                expected: self.expected_desc(),
                actual: self.actual.describe(),
            }),
            MissingMetadataPolicy::Ignore | MissingMetadataPolicy::IgnoreMissing => Ok(None),
        }
    }

    fn expected_desc(&self) -> ShapeDesc {
        ShapeDesc::expected(self.expected_extents, self.expected_order)
    }

    fn mismatch(&self) -> MarshalError {
        MarshalError::ShapeMismatch {
            name: self.name,
            expected: self.expected_desc(),
            actual: self.actual.describe(),
        }
    }
}
