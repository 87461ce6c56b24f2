//! Capability tables for standard-library containers.
//!
//! | Container | Capabilities |
//! |-----------|--------------|
//! | `Vec<T>` | data, element count, extent 1, resize |
//! | `[T]` | data, element count, extent 1 |
//! | `[T; N]` | data, element count, extent 1 |
//! | `Option<C>` | whatever `C` answers; `None` is a null argument |

use std::borrow::Cow;

use crate::meta::Meta;
use crate::probe::{
    resize_extent, HasElementCount, HasExtent1, Probe, RawData, RawDataMut, Resizable,
};

// ============================================================================
// Vec<T>
// ============================================================================

impl<T: Copy + 'static> RawData for Vec<T> {
    type Elem = T;

    fn raw_data(&self) -> Option<&[T]> {
        Some(self)
    }
}

impl<T: Copy + 'static> RawDataMut for Vec<T> {
    fn raw_data_mut(&mut self) -> Option<&mut [T]> {
        Some(self)
    }
}

impl<T> HasElementCount for Vec<T> {
    fn element_count(&self) -> usize {
        self.len()
    }
}

impl<T> HasExtent1 for Vec<T> {
    fn extent1(&self) -> usize {
        self.len()
    }
}

impl<T: Copy + Default> Resizable for Vec<T> {
    fn resize(&mut self, extents: &[usize]) {
        let n = (0..extents.len().max(1))
            .map(|axis| resize_extent(extents, axis))
            .product();
        self.clear();
        Vec::resize(self, n, T::default());
    }
}

impl<T: Copy + Default + 'static> Probe for Vec<T> {
    crate::probe_capabilities!(element_count, extent1, resize);
}

// ============================================================================
// Slices and fixed-size arrays
// ============================================================================

impl<T: Copy + 'static> RawData for [T] {
    type Elem = T;

    fn raw_data(&self) -> Option<&[T]> {
        Some(self)
    }
}

impl<T: Copy + 'static> RawDataMut for [T] {
    fn raw_data_mut(&mut self) -> Option<&mut [T]> {
        Some(self)
    }
}

impl<T> HasElementCount for [T] {
    fn element_count(&self) -> usize {
        self.len()
    }
}

impl<T> HasExtent1 for [T] {
    fn extent1(&self) -> usize {
        self.len()
    }
}

impl<T: Copy + 'static> Probe for [T] {
    crate::probe_capabilities!(element_count, extent1);
}

impl<T: Copy + 'static, const N: usize> RawData for [T; N] {
    type Elem = T;

    fn raw_data(&self) -> Option<&[T]> {
        Some(self)
    }
}

impl<T: Copy + 'static, const N: usize> RawDataMut for [T; N] {
    fn raw_data_mut(&mut self) -> Option<&mut [T]> {
        Some(self)
    }
}

impl<T, const N: usize> HasElementCount for [T; N] {
    fn element_count(&self) -> usize {
        N
    }
}

impl<T, const N: usize> HasExtent1 for [T; N] {
    fn extent1(&self) -> usize {
        N
    }
}

impl<T: Copy + 'static, const N: usize> Probe for [T; N] {
    crate::probe_capabilities!(element_count, extent1);
}

// ============================================================================
// Option<C>: optional arguments
// ============================================================================

impl<C: RawData> RawData for Option<C> {
    type Elem = C::Elem;

    fn raw_data(&self) -> Option<&[C::Elem]> {
        self.as_ref().and_then(RawData::raw_data)
    }

    fn has_storage(&self) -> bool {
        self.as_ref().is_some_and(RawData::has_storage)
    }

    fn elements(&self) -> Option<Cow<'_, [C::Elem]>> {
        self.as_ref().and_then(RawData::elements)
    }
}

impl<C: RawDataMut> RawDataMut for Option<C> {
    fn raw_data_mut(&mut self) -> Option<&mut [C::Elem]> {
        self.as_mut().and_then(RawDataMut::raw_data_mut)
    }
}

impl<C: Probe> Probe for Option<C> {
    fn probe_element_count(&self) -> Meta<usize> {
        self.as_ref().map_or(Meta::unset(), Probe::probe_element_count)
    }

    fn probe_extent1(&self) -> Meta<usize> {
        self.as_ref().map_or(Meta::unset(), Probe::probe_extent1)
    }

    fn probe_extent2(&self) -> Meta<usize> {
        self.as_ref().map_or(Meta::unset(), Probe::probe_extent2)
    }

    fn probe_extent3(&self) -> Meta<usize> {
        self.as_ref().map_or(Meta::unset(), Probe::probe_extent3)
    }

    fn probe_explicit_dims(&self) -> Meta<u8> {
        self.as_ref().map_or(Meta::unset(), Probe::probe_explicit_dims)
    }

    fn probe_column_major(&self) -> Meta<bool> {
        self.as_ref().map_or(Meta::unset(), Probe::probe_column_major)
    }

    fn probe_resize(&mut self, extents: &[usize]) -> bool {
        self.as_mut().is_some_and(|c| c.probe_resize(extents))
    }
}
