//! Capability probing for arbitrary container types.
//!
//! A container advertises each shape-describing operation through its own
//! small trait ([`HasExtent1`], [`HasDims`], [`Resizable`], ...). The
//! [`Probe`] trait is the table the marshaling layer actually reads: every
//! method answers "unsupported" ([`Meta::unset`]) by default, and a container
//! family overrides exactly the capabilities it has, usually through
//! [`probe_capabilities!`](crate::probe_capabilities).
//!
//! ```rust
//! use colmajor_traits::{probe_capabilities, HasExtent1, HasStorageOrder, Probe, RawData};
//!
//! struct Column(Vec<f64>);
//!
//! impl RawData for Column {
//!     type Elem = f64;
//!     fn raw_data(&self) -> Option<&[f64]> {
//!         Some(&self.0)
//!     }
//! }
//!
//! impl HasExtent1 for Column {
//!     fn extent1(&self) -> usize {
//!         self.0.len()
//!     }
//! }
//!
//! impl Probe for Column {
//!     probe_capabilities!(extent1);
//! }
//!
//! let c = Column(vec![1.0, 2.0, 3.0]);
//! assert_eq!(c.probe_dims().get(), Some(1));
//! assert_eq!(c.probe_extent(1).get(), Some(3));
//! assert!(!c.probe_column_major().is_known());
//! ```

use std::borrow::Cow;

use crate::meta::Meta;

// ============================================================================
// Capability traits
// ============================================================================

/// Access to the container's contiguous storage (the "raw pointer").
///
/// `raw_data` is `None` when the argument is absent, and also for a present
/// container whose elements are not contiguous in memory. Such containers
/// override [`has_storage`](RawData::has_storage) and
/// [`elements`](RawData::elements) so they are copied instead of being
/// marshaled as null.
pub trait RawData {
    /// Native element type of the container.
    type Elem: Copy + 'static;

    fn raw_data(&self) -> Option<&[Self::Elem]>;

    /// Whether the argument is present at all.
    fn has_storage(&self) -> bool {
        self.raw_data().is_some()
    }

    /// Every element in the container's native order: borrowed when
    /// contiguous, gathered into a copy otherwise. `None` only when absent.
    fn elements(&self) -> Option<Cow<'_, [Self::Elem]>> {
        self.raw_data().map(Cow::Borrowed)
    }
}

/// Mutable access to the container's contiguous storage.
pub trait RawDataMut: RawData {
    fn raw_data_mut(&mut self) -> Option<&mut [Self::Elem]>;
}

/// Total number of elements.
pub trait HasElementCount {
    fn element_count(&self) -> usize;
}

/// Extent of the first axis (rows for a matrix).
pub trait HasExtent1 {
    fn extent1(&self) -> usize;
}

/// Extent of the second axis (columns for a matrix).
pub trait HasExtent2 {
    fn extent2(&self) -> usize;
}

/// Extent of the third axis.
pub trait HasExtent3 {
    fn extent3(&self) -> usize;
}

/// Explicit dimensionality.
///
/// An explicit answer wins over the dimensionality inferred from the
/// answerable extents, even when the two disagree. Ragged containers use
/// this to present themselves with a shape their axes cannot express.
pub trait HasDims {
    fn dims(&self) -> u8;
}

/// Native storage order of a multi-dimensional container.
pub trait HasStorageOrder {
    fn is_column_major(&self) -> bool;
}

/// In-place reshaping of an output container.
///
/// `extents` has one entry per axis of the new shape. The previous contents
/// need not survive; the caller rewrites every element afterwards.
pub trait Resizable {
    fn resize(&mut self, extents: &[usize]);
}

/// Extent `axis` (zero-based) of a resize request, `1` when not given.
#[inline]
pub fn resize_extent(extents: &[usize], axis: usize) -> usize {
    extents.get(axis).copied().unwrap_or(1)
}

// ============================================================================
// Probe table
// ============================================================================

/// The capability table read by the buffer adapter.
///
/// The `probe_*` hooks default to "unsupported". Overriding them is what a
/// container-family impl does; the provided methods ([`Probe::probe_extent`],
/// [`Probe::probe_dims`]) combine the hooks and are not meant to be
/// overridden.
pub trait Probe: RawData {
    fn probe_element_count(&self) -> Meta<usize> {
        Meta::unset()
    }

    fn probe_extent1(&self) -> Meta<usize> {
        Meta::unset()
    }

    fn probe_extent2(&self) -> Meta<usize> {
        Meta::unset()
    }

    fn probe_extent3(&self) -> Meta<usize> {
        Meta::unset()
    }

    /// Dimensionality the container states explicitly.
    fn probe_explicit_dims(&self) -> Meta<u8> {
        Meta::unset()
    }

    fn probe_column_major(&self) -> Meta<bool> {
        Meta::unset()
    }

    /// Resize the container; returns `false` when it cannot be resized.
    fn probe_resize(&mut self, _extents: &[usize]) -> bool {
        false
    }

    /// Extent of a one-based `axis` (1, 2 or 3).
    fn probe_extent(&self, axis: usize) -> Meta<usize> {
        match axis {
            1 => self.probe_extent1(),
            2 => self.probe_extent2(),
            3 => self.probe_extent3(),
            _ => Meta::unset(),
        }
    }

    /// Explicit dimensionality, else the highest answerable axis.
    fn probe_dims(&self) -> Meta<u8> {
        let explicit = self.probe_explicit_dims();
        if explicit.is_known() {
            return explicit;
        }
        if self.probe_extent3().is_known() {
            Meta::from_value(3)
        } else if self.probe_extent2().is_known() {
            Meta::from_value(2)
        } else if self.probe_extent1().is_known() {
            Meta::from_value(1)
        } else {
            Meta::unset()
        }
    }

    /// Whether the container has backing storage at all.
    fn probe_present(&self) -> bool {
        self.has_storage()
    }
}

/// Wire a [`Probe`] impl to the capability traits a container implements.
///
/// Accepted capability names: `element_count`, `extent1`, `extent2`,
/// `extent3`, `dims`, `storage_order`, `resize`.
#[macro_export]
macro_rules! probe_capabilities {
    ($($cap:ident),* $(,)?) => {
        $( $crate::probe_capabilities!(@cap $cap); )*
    };
    (@cap element_count) => {
        fn probe_element_count(&self) -> $crate::Meta<usize> {
            $crate::Meta::from_value($crate::HasElementCount::element_count(self))
        }
    };
    (@cap extent1) => {
        fn probe_extent1(&self) -> $crate::Meta<usize> {
            $crate::Meta::from_value($crate::HasExtent1::extent1(self))
        }
    };
    (@cap extent2) => {
        fn probe_extent2(&self) -> $crate::Meta<usize> {
            $crate::Meta::from_value($crate::HasExtent2::extent2(self))
        }
    };
    (@cap extent3) => {
        fn probe_extent3(&self) -> $crate::Meta<usize> {
            $crate::Meta::from_value($crate::HasExtent3::extent3(self))
        }
    };
    (@cap dims) => {
        fn probe_explicit_dims(&self) -> $crate::Meta<u8> {
            $crate::Meta::from_value($crate::HasDims::dims(self))
        }
    };
    (@cap storage_order) => {
        fn probe_column_major(&self) -> $crate::Meta<bool> {
            $crate::Meta::from_value($crate::HasStorageOrder::is_column_major(self))
        }
    };
    (@cap resize) => {
        fn probe_resize(&mut self, extents: &[usize]) -> bool {
            $crate::Resizable::resize(self, extents);
            true
        }
    };
}

// ============================================================================
// Object-safe view
// ============================================================================

/// Object-safe, element-type-erased view of a probed container.
///
/// Lets heterogeneous containers sit side by side in one candidate list
/// (`&[&dyn ShapeSource]`). Every [`Probe`] type is a `ShapeSource`.
pub trait ShapeSource {
    /// Whether the container has backing storage.
    fn is_present(&self) -> bool;

    /// Extent of a one-based axis.
    fn extent_of(&self, axis: usize) -> Meta<usize>;

    fn ndims(&self) -> Meta<u8>;

    fn column_major(&self) -> Meta<bool>;

    fn count(&self) -> Meta<usize>;
}

impl<C: Probe + ?Sized> ShapeSource for C {
    #[inline]
    fn is_present(&self) -> bool {
        self.probe_present()
    }

    #[inline]
    fn extent_of(&self, axis: usize) -> Meta<usize> {
        self.probe_extent(axis)
    }

    #[inline]
    fn ndims(&self) -> Meta<u8> {
        self.probe_dims()
    }

    #[inline]
    fn column_major(&self) -> Meta<bool> {
        self.probe_column_major()
    }

    #[inline]
    fn count(&self) -> Meta<usize> {
        self.probe_element_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Answers only the second axis.
    struct OnlySecondAxis;

    impl RawData for OnlySecondAxis {
        type Elem = f64;
        fn raw_data(&self) -> Option<&[f64]> {
            None
        }
    }

    impl HasExtent2 for OnlySecondAxis {
        fn extent2(&self) -> usize {
            4
        }
    }

    impl Probe for OnlySecondAxis {
        probe_capabilities!(extent2);
    }

    /// Claims to be 1D while answering three axes.
    struct Ragged {
        rows: Vec<Vec<f64>>,
    }

    impl RawData for Ragged {
        type Elem = f64;
        fn raw_data(&self) -> Option<&[f64]> {
            self.rows.first().map(|r| r.as_slice())
        }
    }

    impl HasExtent1 for Ragged {
        fn extent1(&self) -> usize {
            self.rows.len()
        }
    }

    impl HasExtent2 for Ragged {
        fn extent2(&self) -> usize {
            self.rows.iter().map(Vec::len).max().unwrap_or(0)
        }
    }

    impl HasExtent3 for Ragged {
        fn extent3(&self) -> usize {
            1
        }
    }

    impl HasDims for Ragged {
        fn dims(&self) -> u8 {
            1
        }
    }

    impl Probe for Ragged {
        probe_capabilities!(extent1, extent2, extent3, dims);
    }

    struct Opaque;

    impl RawData for Opaque {
        type Elem = i32;
        fn raw_data(&self) -> Option<&[i32]> {
            Some(&[])
        }
    }

    impl Probe for Opaque {}

    #[test]
    fn test_dims_inferred_from_highest_axis() {
        let c = OnlySecondAxis;
        assert_eq!(c.probe_dims().get(), Some(2));
        assert_eq!(c.probe_extent(2).get(), Some(4));
        assert!(!c.probe_extent(1).is_known());
        assert!(!c.probe_present());
    }

    #[test]
    fn test_explicit_dims_wins() {
        let c = Ragged {
            rows: vec![vec![1.0, 2.0], vec![3.0]],
        };
        assert_eq!(c.probe_dims().get(), Some(1));
        assert_eq!(c.probe_extent(2).get(), Some(2));
    }

    #[test]
    fn test_unsupported_capabilities_are_unset() {
        let mut c = Opaque;
        assert!(!c.probe_dims().is_known());
        assert!(!c.probe_element_count().is_known());
        assert!(!c.probe_column_major().is_known());
        assert!(!c.probe_extent(4).is_known());
        assert!(!c.probe_resize(&[3]));
        assert!(c.probe_present());
    }

    #[test]
    fn test_shape_source_is_object_safe() {
        let a = OnlySecondAxis;
        let b = Opaque;
        let sources: [&dyn ShapeSource; 2] = [&a, &b];
        assert!(!sources[0].is_present());
        assert!(sources[1].is_present());
        assert_eq!(sources[0].ndims().get(), Some(2));
    }

    #[test]
    fn test_resize_extent_defaults_to_one() {
        assert_eq!(resize_extent(&[5, 4], 1), 4);
        assert_eq!(resize_extent(&[5], 1), 1);
    }
}
