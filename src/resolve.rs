//! First-match resolution of sizes and storage order across arguments.
//!
//! Several arguments of one engine call usually share a dimension (the
//! rows of `a` and the length of `b`, say). Resolution asks the candidates
//! in the caller's order and takes the first answer; it does not
//! cross-validate. Disagreements surface later, when each buffer is checked
//! against the resolved shape.

use colmajor_buffer::MarshalError;
use colmajor_traits::{Meta, ShapeSource, StorageOrder};

/// Outcome of [`resolve_extent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtentResolution {
    /// A present candidate knew the requested axis.
    Found(usize),
    /// No candidate had storage; the size is legitimately zero.
    AllNull,
    /// Some candidate had storage but none knew the requested axis.
    Unascertainable,
}

impl ExtentResolution {
    /// The resolved size as metadata; unknown unless found.
    pub fn meta(self) -> Meta<usize> {
        match self {
            ExtentResolution::Found(n) => Meta::from_value(n),
            ExtentResolution::AllNull | ExtentResolution::Unascertainable => Meta::unset(),
        }
    }

    /// The resolved size, `0` when every candidate was null.
    pub fn require(self, name: &'static str) -> Result<usize, MarshalError> {
        match self {
            ExtentResolution::Found(n) => Ok(n),
            ExtentResolution::AllNull => Ok(0),
            ExtentResolution::Unascertainable => Err(MarshalError::SizeUnascertainable { name }),
        }
    }
}

/// Size of one logical dimension from `(container, one-based axis)` pairs.
pub fn resolve_extent(candidates: &[(&dyn ShapeSource, usize)]) -> ExtentResolution {
    let mut any_present = false;
    for &(source, axis) in candidates {
        if !source.is_present() {
            continue;
        }
        any_present = true;
        if let Some(n) = source.extent_of(axis).get() {
            return ExtentResolution::Found(n);
        }
    }
    if any_present {
        ExtentResolution::Unascertainable
    } else {
        ExtentResolution::AllNull
    }
}

/// Call-wide storage order: the first known answer, else `default`.
pub fn resolve_storage_order(default: StorageOrder, candidates: &[&dyn ShapeSource]) -> StorageOrder {
    candidates
        .iter()
        .find_map(|c| c.column_major().get())
        .map_or(default, StorageOrder::from_column_major)
}

#[cfg(test)]
mod tests {
    use super::*;
    use colmajor_traits::DenseArray;

    #[test]
    fn test_first_present_known_extent_wins() {
        let v = vec![0.0f64; 3];
        let m = DenseArray::<f64>::col_major(&[4, 5]);
        let r = resolve_extent(&[(&v, 2), (&m, 2), (&v, 1)]);
        assert_eq!(r, ExtentResolution::Found(5));
        assert_eq!(r.meta().get(), Some(5));
    }

    #[test]
    fn test_null_candidates_are_skipped() {
        let absent: Option<Vec<f64>> = None;
        let v = vec![0.0f64; 3];
        assert_eq!(resolve_extent(&[(&absent, 1), (&v, 1)]), ExtentResolution::Found(3));
    }

    #[test]
    fn test_all_null_is_zero() {
        let a: Option<Vec<f64>> = None;
        let b: Option<DenseArray<f64>> = None;
        let r = resolve_extent(&[(&a, 1), (&b, 2)]);
        assert_eq!(r, ExtentResolution::AllNull);
        assert_eq!(r.require("n").unwrap(), 0);
        assert!(!r.meta().is_known());
    }

    #[test]
    fn test_present_but_unknown_is_an_error() {
        let v = vec![0.0f64; 3];
        let r = resolve_extent(&[(&v, 2)]);
        assert_eq!(r, ExtentResolution::Unascertainable);
        assert!(matches!(
            r.require("k"),
            Err(MarshalError::SizeUnascertainable { name: "k" })
        ));
    }

    #[test]
    fn test_storage_order_first_known() {
        let v = vec![0.0f64; 3];
        let row = DenseArray::<f64>::row_major(&[2, 2]);
        let col = DenseArray::<f64>::col_major(&[2, 2]);
        assert_eq!(
            resolve_storage_order(StorageOrder::ColumnMajor, &[&v, &row, &col]),
            StorageOrder::RowMajor
        );
        assert_eq!(
            resolve_storage_order(StorageOrder::RowMajor, &[&v]),
            StorageOrder::RowMajor
        );
    }
}
