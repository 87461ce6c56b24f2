//! Owned dense 1D–3D array with an explicit storage order.
//!
//! [`DenseArray`] is the crate's own container family: it answers every
//! capability (extents up to its rank, storage order, resize), so it is the
//! natural choice for outputs whose shape is only known after the engine
//! call.

use std::ops::{Index, IndexMut};

use crate::meta::Meta;
use crate::order::{linear_offset, next_index_col_major, StorageOrder};
use crate::probe::{Probe, RawData, RawDataMut};

/// Owned dense multidimensional array (rank 1 to 3).
#[derive(Clone, PartialEq)]
pub struct DenseArray<T> {
    data: Vec<T>,
    dims: Vec<usize>,
    order: StorageOrder,
}

impl<T: std::fmt::Debug> std::fmt::Debug for DenseArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DenseArray")
            .field("dims", &self.dims)
            .field("order", &self.order)
            .finish()
    }
}

impl<T: Clone + Default> DenseArray<T> {
    /// Column-major array filled with `T::default()`.
    pub fn col_major(dims: &[usize]) -> Self {
        Self::filled(dims, StorageOrder::ColumnMajor)
    }

    /// Row-major array filled with `T::default()`.
    pub fn row_major(dims: &[usize]) -> Self {
        Self::filled(dims, StorageOrder::RowMajor)
    }

    /// Array of the given order filled with `T::default()`.
    pub fn filled(dims: &[usize], order: StorageOrder) -> Self {
        let total: usize = dims.iter().product();
        Self {
            data: vec![T::default(); total],
            dims: dims.to_vec(),
            order,
        }
    }

    /// Array whose element at each index is `f(index)`.
    pub fn from_fn(dims: &[usize], order: StorageOrder, mut f: impl FnMut(&[usize]) -> T) -> Self {
        let mut arr = Self::filled(dims, order);
        if arr.data.is_empty() {
            return arr;
        }
        let strides = order.strides(dims);
        let mut idx = vec![0usize; dims.len()];
        loop {
            arr.data[linear_offset(&idx, &strides)] = f(&idx);
            if !next_index_col_major(&mut idx, dims) {
                break;
            }
        }
        arr
    }

    /// Column-major array with values produced by a function.
    pub fn from_fn_col_major(dims: &[usize], f: impl FnMut(&[usize]) -> T) -> Self {
        Self::from_fn(dims, StorageOrder::ColumnMajor, f)
    }

    /// Row-major array with values produced by a function.
    pub fn from_fn_row_major(dims: &[usize], f: impl FnMut(&[usize]) -> T) -> Self {
        Self::from_fn(dims, StorageOrder::RowMajor, f)
    }
}

impl<T> DenseArray<T> {
    /// Wrap existing data laid out in `order`.
    ///
    /// Returns `None` when `data.len()` is not the product of `dims`.
    pub fn from_vec(data: Vec<T>, dims: &[usize], order: StorageOrder) -> Option<Self> {
        if data.len() != dims.iter().product::<usize>() {
            return None;
        }
        Some(Self {
            data,
            dims: dims.to_vec(),
            order,
        })
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn order(&self) -> StorageOrder {
        self.order
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    fn offset(&self, indices: &[usize]) -> usize {
        assert_eq!(indices.len(), self.dims.len(), "index rank mismatch");
        for (&i, &d) in indices.iter().zip(&self.dims) {
            assert!(i < d, "index {i} out of bounds for extent {d}");
        }
        linear_offset(indices, &self.order.strides(&self.dims))
    }
}

impl<T: Copy> DenseArray<T> {
    pub fn get(&self, indices: &[usize]) -> T {
        self.data[self.offset(indices)]
    }

    pub fn set(&mut self, indices: &[usize], value: T) {
        let off = self.offset(indices);
        self.data[off] = value;
    }
}

impl<T> Index<&[usize]> for DenseArray<T> {
    type Output = T;

    fn index(&self, indices: &[usize]) -> &T {
        &self.data[self.offset(indices)]
    }
}

impl<T> IndexMut<&[usize]> for DenseArray<T> {
    fn index_mut(&mut self, indices: &[usize]) -> &mut T {
        let off = self.offset(indices);
        &mut self.data[off]
    }
}

// ============================================================================
// Capabilities
// ============================================================================

impl<T: Copy + 'static> RawData for DenseArray<T> {
    type Elem = T;

    fn raw_data(&self) -> Option<&[T]> {
        Some(&self.data)
    }
}

impl<T: Copy + 'static> RawDataMut for DenseArray<T> {
    fn raw_data_mut(&mut self) -> Option<&mut [T]> {
        Some(&mut self.data)
    }
}

impl<T: Copy + Default + 'static> Probe for DenseArray<T> {
    fn probe_element_count(&self) -> Meta<usize> {
        Meta::from_value(self.data.len())
    }

    fn probe_extent1(&self) -> Meta<usize> {
        Meta::from_option(self.dims.first().copied())
    }

    fn probe_extent2(&self) -> Meta<usize> {
        Meta::from_option(self.dims.get(1).copied())
    }

    fn probe_extent3(&self) -> Meta<usize> {
        Meta::from_option(self.dims.get(2).copied())
    }

    fn probe_column_major(&self) -> Meta<bool> {
        Meta::from_value(self.order.is_column_major())
    }

    fn probe_resize(&mut self, extents: &[usize]) -> bool {
        *self = Self::filled(extents, self.order);
        true
    }
}
