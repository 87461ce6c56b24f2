//! Contiguous engine buffers for the colmajor marshaling layer.
//!
//! # Core Types
//!
//! - [`Buffer`]: one contiguous, engine-typed, single-storage-order buffer per
//!   logical engine argument, either borrowed from the user's container
//!   (zero-copy) or owned (copied, cast and/or transposed)
//! - [`In`], [`Out`], [`InOut`]: type-level argument directions
//! - [`ShapeInfo`]: discovered shape metadata of a container or buffer
//! - [`ShapeCheck`] and [`MissingMetadataPolicy`]: shape validation
//! - [`FixedWidthText`]: space-padded fixed-stride character buffers
//!
//! # Lifecycle
//!
//! A buffer is built from a container, validated against the shape every
//! argument of the call agreed on, handed to the engine as a raw pointer,
//! and, for writable directions, copied back into the container:
//!
//! ```rust
//! use colmajor_buffer::{Buffer, MissingMetadataPolicy, Out};
//! use colmajor_traits::{DenseArray, Meta, StorageOrder};
//!
//! let a = DenseArray::<f32>::from_fn_row_major(&[2, 3], |idx| (idx[0] * 3 + idx[1]) as f32);
//! let order = StorageOrder::ColumnMajor;
//!
//! // f32 row-major input becomes an owned f64 column-major buffer.
//! let input = Buffer::<f64>::from_container("a", &a, order).unwrap();
//! assert!(!input.is_borrowed());
//! assert_eq!(input.as_slice(), Some(&[0.0, 3.0, 1.0, 4.0, 2.0, 5.0][..]));
//! input
//!     .check(&[2, 3], Meta::from_value(true), MissingMetadataPolicy::MissingAsError)
//!     .unwrap();
//!
//! let mut b: Vec<f64> = Vec::new();
//! let mut out = Buffer::<f64, Out>::from_container("b", &b, order).unwrap();
//! out.resize(&[4]).unwrap();
//! if let Some(data) = out.as_mut_slice() {
//!     data.copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
//! }
//! out.copy_back(&mut b).unwrap();
//! assert_eq!(b, vec![1.0, 2.0, 3.0, 4.0]);
//! ```

mod buffer;
pub mod check;
pub mod direction;
pub mod shape;
pub mod text;

pub use buffer::{Buffer, Ownership};
pub use check::{MissingMetadataPolicy, ShapeCheck, ShapeWarning};
pub use direction::{Direction, DirectionKind, In, InOut, Out, Writable};
pub use shape::{ShapeDesc, ShapeInfo};
pub use text::FixedWidthText;

// ============================================================================
// Error types
// ============================================================================

/// Faults raised while marshaling one engine argument.
#[derive(Debug, thiserror::Error)]
pub enum MarshalError {
    /// A required array argument has no backing storage.
    #[error("{name}: required array argument has no data")]
    NullBuffer { name: &'static str },

    /// Dimensionality, an extent, or the storage order disagrees with the
    /// shape agreed for the call.
    #[error("{name}: shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        name: &'static str,
        expected: ShapeDesc,
        actual: ShapeDesc,
    },

    /// Shape metadata needed for validation is unknown and the policy
    /// treats that as an error.
    #[error("{name}: shape metadata missing: expected {expected}, got {actual}")]
    MissingMetadata {
        name: &'static str,
        expected: ShapeDesc,
        actual: ShapeDesc,
    },

    /// No candidate array could report a size, though at least one was present.
    #[error("{name}: size could not be determined from any supplied array")]
    SizeUnascertainable { name: &'static str },

    /// Allocating an owned buffer failed. `elements` is `usize::MAX` when
    /// the requested extents overflow.
    #[error("{name}: failed to allocate a buffer of {elements} elements")]
    AllocationFailure { name: &'static str, elements: usize },

    /// A requested shape has no axes or more than the engine accepts.
    #[error("{name}: cannot lay out a buffer of rank {rank}")]
    UnsupportedRank { name: &'static str, rank: usize },
}

/// Result type for marshaling operations.
pub type Result<T> = std::result::Result<T, MarshalError>;
