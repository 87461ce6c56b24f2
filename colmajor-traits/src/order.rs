//! Storage orders and dense stride arithmetic.

/// Memory layout of a dense multi-dimensional buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageOrder {
    /// First index varies fastest (Fortran default).
    #[default]
    ColumnMajor,
    /// Last index varies fastest (C default).
    RowMajor,
}

impl StorageOrder {
    #[inline]
    pub fn from_column_major(column_major: bool) -> Self {
        if column_major {
            StorageOrder::ColumnMajor
        } else {
            StorageOrder::RowMajor
        }
    }

    #[inline]
    pub fn is_column_major(self) -> bool {
        matches!(self, StorageOrder::ColumnMajor)
    }

    /// Dense strides for `dims` in this order.
    pub fn strides(self, dims: &[usize]) -> Vec<usize> {
        match self {
            StorageOrder::ColumnMajor => col_major_strides(dims),
            StorageOrder::RowMajor => row_major_strides(dims),
        }
    }
}

/// Column-major strides: first index varies fastest.
pub fn col_major_strides(dims: &[usize]) -> Vec<usize> {
    let rank = dims.len();
    if rank == 0 {
        return vec![];
    }
    let mut strides = vec![1usize; rank];
    for i in 1..rank {
        strides[i] = strides[i - 1] * dims[i - 1];
    }
    strides
}

/// Row-major strides: last index varies fastest.
pub fn row_major_strides(dims: &[usize]) -> Vec<usize> {
    let rank = dims.len();
    if rank == 0 {
        return vec![];
    }
    let mut strides = vec![1usize; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * dims[i + 1];
    }
    strides
}

/// Linear offset of `index` under `strides`.
#[inline]
pub fn linear_offset(index: &[usize], strides: &[usize]) -> usize {
    index.iter().zip(strides).map(|(&i, &s)| i * s).sum()
}

/// Advance a multi-index in column-major iteration order.
///
/// Returns `false` once the index wraps back to all zeros.
pub fn next_index_col_major(index: &mut [usize], dims: &[usize]) -> bool {
    for d in 0..dims.len() {
        index[d] += 1;
        if index[d] < dims[d] {
            return true;
        }
        index[d] = 0;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_major_strides() {
        assert_eq!(col_major_strides(&[3, 4]), vec![1, 3]);
        assert_eq!(col_major_strides(&[2, 3, 4]), vec![1, 2, 6]);
    }

    #[test]
    fn test_row_major_strides() {
        assert_eq!(row_major_strides(&[3, 4]), vec![4, 1]);
        assert_eq!(row_major_strides(&[2, 3, 4]), vec![12, 4, 1]);
    }

    #[test]
    fn test_linear_offset() {
        let s = StorageOrder::RowMajor.strides(&[2, 3]);
        assert_eq!(linear_offset(&[1, 2], &s), 5);
        let s = StorageOrder::ColumnMajor.strides(&[2, 3]);
        assert_eq!(linear_offset(&[1, 2], &s), 5);
        assert_eq!(linear_offset(&[1, 0], &s), 1);
    }

    #[test]
    fn test_next_index_visits_all() {
        let dims = [2, 3];
        let mut idx = [0, 0];
        let mut seen = vec![idx];
        while next_index_col_major(&mut idx, &dims) {
            seen.push(idx);
        }
        assert_eq!(seen.len(), 6);
        assert_eq!(seen[1], [1, 0]);
        assert_eq!(seen[2], [0, 1]);
    }

    #[test]
    fn test_order_flags() {
        assert!(StorageOrder::default().is_column_major());
        assert_eq!(StorageOrder::from_column_major(false), StorageOrder::RowMajor);
    }
}
