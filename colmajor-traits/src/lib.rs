//! Shared traits for the colmajor marshaling layer.
//!
//! This crate defines what the marshaling layer needs to know about a
//! container, and nothing about buffers or engines:
//!
//! - [`Meta`]: optional shape metadata with unknown-propagating comparisons
//! - Capability traits ([`RawData`], [`HasExtent1`], [`HasDims`],
//!   [`HasStorageOrder`], [`Resizable`], ...) and the [`Probe`] table that
//!   combines them, plus the object-safe [`ShapeSource`]
//! - [`EngineScalar`] and [`ElementCast`]: engine element types and the
//!   unchecked casts between them and container element types
//! - [`StorageOrder`] and dense stride helpers
//! - [`DenseArray`]: an owned 1D–3D container answering every capability
//!
//! External crates can depend on `colmajor-traits` to give their own
//! container types a probe table without orphan-rule problems.

pub mod containers;
pub mod dense;
pub mod interop;
pub mod meta;
pub mod order;
pub mod probe;
pub mod scalar;

pub use dense::DenseArray;
pub use meta::{meta_product, Meta};
pub use order::{
    col_major_strides, linear_offset, next_index_col_major, row_major_strides, StorageOrder,
};
pub use probe::{
    resize_extent, HasDims, HasElementCount, HasExtent1, HasExtent2, HasExtent3,
    HasStorageOrder, Probe, RawData, RawDataMut, Resizable, ShapeSource,
};
pub use scalar::{ElementCast, EngineScalar};
