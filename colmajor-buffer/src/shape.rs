//! Discovered shape metadata and its rendering in faults.

use std::fmt;

use colmajor_traits::{meta_product, Meta, Probe, StorageOrder};

/// Highest rank the engine accepts.
pub const MAX_RANK: usize = 3;

/// Shape metadata of a container or buffer, any part of which may be unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeInfo {
    pub element_count: Meta<usize>,
    pub dims: Meta<u8>,
    /// Per-axis extents; axes at or beyond `dims` are unused.
    pub extents: [Meta<usize>; MAX_RANK],
    /// `true` for column-major.
    pub column_major: Meta<bool>,
}

impl ShapeInfo {
    /// Nothing known, as for a null argument.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Read everything the container's probe table answers.
    ///
    /// The element count is the product of the extents when those are all
    /// known, else the container's own element count, else the length of
    /// its data.
    pub fn probe<C: Probe + ?Sized>(container: &C) -> Self {
        let dims = container.probe_dims();
        let extents = [
            container.probe_extent(1),
            container.probe_extent(2),
            container.probe_extent(3),
        ];

        let mut element_count = match dims.get() {
            Some(d) => meta_product(extents.iter().take(usize::from(d)).copied(), 1),
            None => Meta::unset(),
        };
        if !element_count.is_known() {
            element_count = container.probe_element_count();
        }
        if !element_count.is_known() {
            element_count = Meta::from_option(container.raw_data().map(<[_]>::len));
        }

        Self {
            element_count,
            dims,
            extents,
            column_major: container.probe_column_major(),
        }
    }

    /// Shape of a dense buffer with the given extents.
    ///
    /// Storage order is only recorded for multi-dimensional shapes. The
    /// element count is unknown when the rank is outside `1..=MAX_RANK` or
    /// the product of the extents overflows.
    pub fn from_extents(extents: &[usize], order: StorageOrder) -> Self {
        let rank = extents.len();
        let element_count = if (1..=MAX_RANK).contains(&rank) {
            meta_product(extents.iter().map(|&e| Meta::from_value(e)), 1)
        } else {
            Meta::unset()
        };
        let mut shape = Self {
            element_count,
            dims: Meta::from_value(rank.min(MAX_RANK) as u8),
            ..Self::default()
        };
        for (slot, &e) in shape.extents.iter_mut().zip(extents) {
            slot.set(e);
        }
        if rank > 1 {
            shape.column_major.set(order.is_column_major());
        }
        shape
    }

    /// Extent of a one-based axis.
    pub fn extent(&self, axis: usize) -> Meta<usize> {
        match axis {
            1..=MAX_RANK => self.extents[axis - 1],
            _ => Meta::unset(),
        }
    }

    /// Rank to use for layout decisions: known `dims` clamped to 1..=3, else 1.
    pub fn rank(&self) -> usize {
        usize::from(self.dims.value_or(1)).clamp(1, MAX_RANK)
    }

    /// Extents `1..=dims` if the rank and all of them are known.
    pub fn known_extents(&self) -> Option<Vec<usize>> {
        let d = usize::from(self.dims.get()?);
        if d == 0 || d > MAX_RANK {
            return None;
        }
        self.extents[..d].iter().map(Meta::get).collect()
    }

    pub fn describe(&self) -> ShapeDesc {
        let extents = match self.dims.get() {
            Some(d) => self.extents[..usize::from(d).min(MAX_RANK)].to_vec(),
            None => Vec::new(),
        };
        ShapeDesc {
            rank_known: self.dims.is_known(),
            extents,
            column_major: self.column_major,
        }
    }
}

/// Printable shape used in faults and warnings: `[3, ?] column-major`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDesc {
    rank_known: bool,
    extents: Vec<Meta<usize>>,
    column_major: Meta<bool>,
}

impl ShapeDesc {
    /// Shape the caller expects.
    pub fn expected(extents: &[usize], column_major: Meta<bool>) -> Self {
        Self {
            rank_known: true,
            extents: extents.iter().map(|&e| Meta::from_value(e)).collect(),
            column_major,
        }
    }

    pub fn extents(&self) -> &[Meta<usize>] {
        &self.extents
    }
}

impl fmt::Display for ShapeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rank_known {
            f.write_str("[")?;
            for (i, e) in self.extents.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{e}")?;
            }
            f.write_str("]")?;
        } else {
            f.write_str("[?]")?;
        }
        match self.column_major.get() {
            Some(true) => f.write_str(" column-major"),
            Some(false) => f.write_str(" row-major"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colmajor_traits::{DenseArray, RawData};

    struct Bare(Vec<f64>);

    impl RawData for Bare {
        type Elem = f64;
        fn raw_data(&self) -> Option<&[f64]> {
            Some(&self.0)
        }
    }

    impl Probe for Bare {}

    #[test]
    fn test_probe_dense() {
        let a = DenseArray::<f64>::row_major(&[3, 4]);
        let s = ShapeInfo::probe(&a);
        assert_eq!(s.dims.get(), Some(2));
        assert_eq!(s.element_count.get(), Some(12));
        assert_eq!(s.known_extents(), Some(vec![3, 4]));
        assert_eq!(s.column_major.get(), Some(false));
    }

    #[test]
    fn test_element_count_falls_back_to_data_length() {
        let s = ShapeInfo::probe(&Bare(vec![0.0; 7]));
        assert!(!s.dims.is_known());
        assert_eq!(s.element_count.get(), Some(7));
        assert_eq!(s.known_extents(), None);
        assert_eq!(s.rank(), 1);
    }

    #[test]
    fn test_null_container_is_unknown() {
        let absent: Option<Vec<f64>> = None;
        let s = ShapeInfo::probe(&absent);
        assert!(!s.element_count.is_known());
        assert!(!s.dims.is_known());
    }

    #[test]
    fn test_from_extents_records_order_for_matrices_only() {
        let v = ShapeInfo::from_extents(&[5], StorageOrder::RowMajor);
        assert!(!v.column_major.is_known());
        let m = ShapeInfo::from_extents(&[5, 2], StorageOrder::RowMajor);
        assert_eq!(m.column_major.get(), Some(false));
        assert_eq!(m.element_count.get(), Some(10));
        assert!(!m.extent(3).is_known());
    }

    #[test]
    fn test_from_extents_count_unknown_on_overflow_or_bad_rank() {
        let huge = ShapeInfo::from_extents(&[usize::MAX / 2, 4], StorageOrder::ColumnMajor);
        assert!(!huge.element_count.is_known());
        assert_eq!(huge.extent(1).get(), Some(usize::MAX / 2));

        assert!(!ShapeInfo::from_extents(&[], StorageOrder::ColumnMajor).element_count.is_known());
        let deep = ShapeInfo::from_extents(&[2, 2, 2, 2], StorageOrder::ColumnMajor);
        assert!(!deep.element_count.is_known());
        assert_eq!(deep.dims.get(), Some(3));
    }

    #[test]
    fn test_describe() {
        let mut s = ShapeInfo::from_extents(&[3, 4], StorageOrder::ColumnMajor);
        assert_eq!(s.describe().to_string(), "[3, 4] column-major");
        s.extents[1].clear();
        s.column_major.clear();
        assert_eq!(s.describe().to_string(), "[3, ?]");
        assert_eq!(ShapeInfo::unknown().describe().to_string(), "[?]");
        assert_eq!(
            ShapeDesc::expected(&[6], Meta::unset()).to_string(),
            "[6]"
        );
    }
}
