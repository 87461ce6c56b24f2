//! Marshal arbitrary Rust containers to and from a column-major,
//! Fortran-convention numerical engine.
//!
//! The engine itself is opaque: it receives flat buffer pointers, leading
//! dimensions, one storage-order flag and scalar options, and reports back
//! an error code with a fixed-size message buffer. This crate does the
//! marshaling around that call.
//!
//! # Core Types
//!
//! - [`Meta`]: shape metadata that may be unknown
//! - [`Probe`] and the capability traits: what a container can tell about itself
//! - [`resolve_extent`] / [`resolve_storage_order`]: first-match resolution
//!   of sizes and the call-wide storage order across several arguments
//! - [`Buffer`]: one contiguous, engine-typed buffer per argument
//! - [`ShapeCheck`] with a [`MissingMetadataPolicy`]: shape validation
//! - [`FixedWidthText`]: fixed-width character buffers for string options
//! - [`CallFrame`]: one engine call's order, policy and warnings
//! - [`Engine`], [`EngineArgs`], [`EngineStatus`]: the engine boundary
//!
//! # Example
//!
//! ```rust
//! use colmajor::{CallFrame, DenseArray, EngineArgs, EngineStatus, MarshalConfig, ShapeSource};
//!
//! // Scale a matrix in place; the "engine" here is a closure.
//! let mut a = DenseArray::<f64>::from_fn_row_major(&[2, 3], |idx| (idx[0] * 3 + idx[1]) as f64);
//!
//! let mut frame = CallFrame::new("dscal", MarshalConfig::default());
//! frame.agree_order(&[&a as &dyn ShapeSource]);
//! let m = frame.extent("m", &[(&a as &dyn ShapeSource, 1)]).unwrap();
//! let n = frame.extent("n", &[(&a as &dyn ShapeSource, 2)]).unwrap();
//!
//! let mut buf = frame.inout::<f64, _>("a", &a).unwrap();
//! frame.check(&buf, &[m, n]).unwrap();
//!
//! let lda = frame.leading_dimension(&buf, 1);
//! let mut engine = |args: &mut EngineArgs<'_>| {
//!     // SAFETY: argument 0 is the f64 output set up below.
//!     if let Some(x) = unsafe { args.arrays[0].as_mut_slice::<f64>() } {
//!         x.iter_mut().for_each(|v| *v *= 2.0);
//!     }
//!     EngineStatus::ok()
//! };
//! let mut args = frame.args().output(&mut buf).leading_dim(lda);
//! frame.invoke(&mut engine, &mut args).unwrap();
//! drop(args);
//!
//! buf.copy_back(&mut a).unwrap();
//! assert_eq!(a.get(&[1, 2]), 10.0);
//! ```

pub mod comm;
pub mod config;
pub mod engine;
pub mod frame;
pub mod resolve;

pub use colmajor_buffer::{
    Buffer, Direction, DirectionKind, FixedWidthText, In, InOut, MarshalError,
    MissingMetadataPolicy, Out, Ownership, ShapeCheck, ShapeDesc, ShapeInfo, ShapeWarning,
    Writable,
};
pub use colmajor_traits::{
    meta_product, probe_capabilities, DenseArray, ElementCast, EngineScalar, HasDims,
    HasElementCount, HasExtent1, HasExtent2, HasExtent3, HasStorageOrder, Meta, Probe, RawData,
    RawDataMut, Resizable, ShapeSource, StorageOrder,
};

pub use comm::CommBlob;
pub use config::MarshalConfig;
pub use engine::{
    Engine, EngineArgs, EngineElement, EngineStatus, RawArray, RawPtr, RawText, ScalarParam,
    ERROR_BUFFER_LEN,
};
pub use frame::CallFrame;
pub use resolve::{resolve_extent, resolve_storage_order, ExtentResolution};

// ============================================================================
// Error types
// ============================================================================

/// Errors raised while preparing, issuing or unpacking one engine call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Marshal(#[from] MarshalError),

    /// The engine reported a non-zero error code.
    #[error("{routine}: engine error {code}: {message}")]
    Engine {
        routine: &'static str,
        code: i32,
        message: String,
    },
}

/// Result type for colmajor operations.
pub type Result<T> = std::result::Result<T, Error>;
