//! The boundary to the opaque numerical engine.
//!
//! An engine call receives one raw pointer per array argument, one leading
//! dimension per matrix argument, the call-wide storage order, scalar and
//! string options and an optional communication blob. It answers with an
//! [`EngineStatus`]: a numeric code plus a fixed-size, space-padded message.

use std::marker::PhantomData;

use colmajor_buffer::{Buffer, Direction, FixedWidthText, Writable};
use colmajor_traits::{EngineScalar, StorageOrder};
use num_complex::Complex64;

use crate::comm::CommBlob;

/// Size of the engine's error message buffer, in bytes.
pub const ERROR_BUFFER_LEN: usize = 200;

// ============================================================================
// Arrays
// ============================================================================

/// Raw pointer to one contiguous engine buffer.
#[derive(Debug, Clone, Copy)]
pub struct RawPtr<T> {
    ptr: *mut T,
    len: usize,
    writable: bool,
}

impl<T> RawPtr<T> {
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.writable
    }
}

/// An array argument, tagged with the engine element type.
#[derive(Debug, Clone, Copy)]
pub enum RawArray {
    F64(RawPtr<f64>),
    I64(RawPtr<i64>),
    C64(RawPtr<Complex64>),
}

/// Element types the engine accepts for array arguments.
pub trait EngineElement: EngineScalar {
    fn wrap(ptr: RawPtr<Self>) -> RawArray;

    fn unwrap(array: &RawArray) -> Option<RawPtr<Self>>;
}

macro_rules! impl_engine_element {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl EngineElement for $t {
                #[inline]
                fn wrap(ptr: RawPtr<Self>) -> RawArray {
                    RawArray::$variant(ptr)
                }

                #[inline]
                fn unwrap(array: &RawArray) -> Option<RawPtr<Self>> {
                    match array {
                        RawArray::$variant(p) => Some(*p),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_engine_element!(f64 => F64, i64 => I64, Complex64 => C64);

impl RawArray {
    /// Read-only argument backed by `buffer`.
    pub fn input<E: EngineElement, D: Direction>(buffer: &Buffer<'_, E, D>) -> Self {
        E::wrap(RawPtr {
            ptr: buffer.as_ptr().cast_mut(),
            len: buffer.len(),
            writable: false,
        })
    }

    /// Writable argument backed by `buffer`.
    pub fn output<E: EngineElement, D: Writable>(buffer: &mut Buffer<'_, E, D>) -> Self {
        let len = buffer.len();
        E::wrap(RawPtr {
            ptr: buffer.as_mut_ptr(),
            len,
            writable: true,
        })
    }

    pub fn len(&self) -> usize {
        match self {
            RawArray::F64(p) => p.len(),
            RawArray::I64(p) => p.len(),
            RawArray::C64(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_writable(&self) -> bool {
        match self {
            RawArray::F64(p) => p.is_writable(),
            RawArray::I64(p) => p.is_writable(),
            RawArray::C64(p) => p.is_writable(),
        }
    }

    /// View the argument as a slice of `T`.
    ///
    /// `None` when the element type differs or the pointer is null.
    ///
    /// # Safety
    ///
    /// The buffer the argument was built from must still be alive and not
    /// mutated through any other path while the slice is in use.
    pub unsafe fn as_slice<T: EngineElement>(&self) -> Option<&[T]> {
        let p = T::unwrap(self)?;
        if p.is_null() {
            return None;
        }
        // SAFETY: guaranteed by the caller; `p` came from a live buffer of `len` elements.
        Some(unsafe { std::slice::from_raw_parts(p.ptr, p.len) })
    }

    /// View a writable argument as a mutable slice of `T`.
    ///
    /// `None` when the element type differs, the pointer is null or the
    /// argument is read-only.
    ///
    /// # Safety
    ///
    /// As [`RawArray::as_slice`], and no other slice of the same argument
    /// may be alive at the same time.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn as_mut_slice<T: EngineElement>(&self) -> Option<&mut [T]> {
        let p = T::unwrap(self)?;
        if p.is_null() || !p.is_writable() {
            return None;
        }
        // SAFETY: guaranteed by the caller; writable arguments come from owned buffers.
        Some(unsafe { std::slice::from_raw_parts_mut(p.ptr, p.len) })
    }
}

// ============================================================================
// Scalars and strings
// ============================================================================

/// A scalar option.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarParam {
    Int(i64),
    Real(f64),
    Complex(Complex64),
    Flag(bool),
}

/// A fixed-width character argument.
#[derive(Debug, Clone, Copy)]
pub struct RawText {
    ptr: *mut u8,
    width: usize,
    count: usize,
    writable: bool,
}

impl RawText {
    pub fn input(text: &FixedWidthText) -> Self {
        Self {
            ptr: text.as_ptr().cast_mut(),
            width: text.width(),
            count: text.count(),
            writable: false,
        }
    }

    pub fn output(text: &mut FixedWidthText) -> Self {
        Self {
            ptr: text.as_mut_ptr(),
            width: text.width(),
            count: text.count(),
            writable: true,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// # Safety
    ///
    /// The text buffer must still be alive.
    pub unsafe fn as_bytes(&self) -> &[u8] {
        // SAFETY: guaranteed by the caller.
        unsafe { std::slice::from_raw_parts(self.ptr, self.width * self.count) }
    }

    /// `None` for read-only text.
    ///
    /// # Safety
    ///
    /// The text buffer must still be alive and not otherwise borrowed.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn as_bytes_mut(&self) -> Option<&mut [u8]> {
        if !self.writable {
            return None;
        }
        // SAFETY: guaranteed by the caller.
        Some(unsafe { std::slice::from_raw_parts_mut(self.ptr, self.width * self.count) })
    }
}

// ============================================================================
// Call arguments
// ============================================================================

/// Everything one engine call receives.
///
/// `'b` ties the raw pointers to the buffers they were taken from.
#[derive(Debug)]
pub struct EngineArgs<'b> {
    pub arrays: Vec<RawArray>,
    pub leading_dims: Vec<i64>,
    pub order: StorageOrder,
    pub scalars: Vec<ScalarParam>,
    pub texts: Vec<RawText>,
    pub comm: Option<&'b mut CommBlob>,
    _buffers: PhantomData<&'b mut ()>,
}

impl<'b> EngineArgs<'b> {
    pub fn new(order: StorageOrder) -> Self {
        Self {
            arrays: Vec::new(),
            leading_dims: Vec::new(),
            order,
            scalars: Vec::new(),
            texts: Vec::new(),
            comm: None,
            _buffers: PhantomData,
        }
    }

    pub fn input<E: EngineElement, D: Direction>(mut self, buffer: &'b Buffer<'_, E, D>) -> Self {
        self.arrays.push(RawArray::input(buffer));
        self
    }

    pub fn output<E: EngineElement, D: Writable>(
        mut self,
        buffer: &'b mut Buffer<'_, E, D>,
    ) -> Self {
        self.arrays.push(RawArray::output(buffer));
        self
    }

    pub fn leading_dim(mut self, ld: usize) -> Self {
        self.leading_dims.push(ld as i64);
        self
    }

    pub fn scalar(mut self, param: ScalarParam) -> Self {
        self.scalars.push(param);
        self
    }

    pub fn text(mut self, text: &'b FixedWidthText) -> Self {
        self.texts.push(RawText::input(text));
        self
    }

    pub fn text_out(mut self, text: &'b mut FixedWidthText) -> Self {
        self.texts.push(RawText::output(text));
        self
    }

    pub fn comm(mut self, blob: &'b mut CommBlob) -> Self {
        self.comm = Some(blob);
        self
    }

    /// Storage-order flag as the engine reads it: `1` for column-major.
    pub fn order_flag(&self) -> i32 {
        i32::from(self.order.is_column_major())
    }
}

// ============================================================================
// Status
// ============================================================================

/// What the engine reports back: a code and a fixed-size message buffer.
#[derive(Clone)]
pub struct EngineStatus {
    pub code: i32,
    pub buffer: [u8; ERROR_BUFFER_LEN],
}

impl EngineStatus {
    /// Success: code `0`, blank message.
    pub fn ok() -> Self {
        Self {
            code: 0,
            buffer: [b' '; ERROR_BUFFER_LEN],
        }
    }

    /// Failure with `message` written space-padded into the buffer.
    pub fn failed(code: i32, message: &str) -> Self {
        let mut status = Self {
            code,
            ..Self::ok()
        };
        let n = message.len().min(ERROR_BUFFER_LEN);
        status.buffer[..n].copy_from_slice(&message.as_bytes()[..n]);
        status
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }

    /// The message with trailing spaces and NULs removed.
    pub fn message(&self) -> String {
        String::from_utf8_lossy(&self.buffer)
            .trim_end_matches([' ', '\0'])
            .to_owned()
    }
}

impl Default for EngineStatus {
    fn default() -> Self {
        Self::ok()
    }
}

impl std::fmt::Debug for EngineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineStatus")
            .field("code", &self.code)
            .field("message", &self.message())
            .finish()
    }
}

// ============================================================================
// Engine trait
// ============================================================================

/// A foreign numerical routine.
pub trait Engine {
    fn call(&mut self, args: &mut EngineArgs<'_>) -> EngineStatus;
}

impl<F> Engine for F
where
    F: FnMut(&mut EngineArgs<'_>) -> EngineStatus + ?Sized,
{
    fn call(&mut self, args: &mut EngineArgs<'_>) -> EngineStatus {
        self(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colmajor_buffer::{In, Out};

    #[test]
    fn test_status_message_is_trimmed() {
        let s = EngineStatus::failed(3, "matrix is singular");
        assert!(!s.is_ok());
        assert_eq!(s.message(), "matrix is singular");

        let mut raw = EngineStatus::ok();
        raw.buffer[..4].copy_from_slice(b"bad\0");
        assert_eq!(raw.message(), "bad");
        assert_eq!(EngineStatus::ok().message(), "");
    }

    #[test]
    fn test_long_message_is_truncated() {
        let long = "x".repeat(ERROR_BUFFER_LEN + 20);
        assert_eq!(EngineStatus::failed(1, &long).message().len(), ERROR_BUFFER_LEN);
    }

    #[test]
    fn test_raw_array_typing() {
        let v = vec![1.0f64, 2.0];
        let b = Buffer::<f64, In>::from_container("v", &v, StorageOrder::ColumnMajor).unwrap();
        let raw = RawArray::input(&b);
        assert_eq!(raw.len(), 2);
        assert!(!raw.is_writable());
        unsafe {
            assert_eq!(raw.as_slice::<f64>(), Some(&[1.0, 2.0][..]));
            assert!(raw.as_slice::<i64>().is_none());
            assert!(raw.as_mut_slice::<f64>().is_none());
        }
    }

    #[test]
    fn test_output_array_is_writable() {
        let mut out = Buffer::<i64, Out>::allocate_local("n", &[3], StorageOrder::ColumnMajor).unwrap();
        let raw = RawArray::output(&mut out);
        unsafe {
            if let Some(s) = raw.as_mut_slice::<i64>() {
                s.copy_from_slice(&[4, 5, 6]);
            }
        }
        assert_eq!(out.as_slice(), Some(&[4, 5, 6][..]));
    }

    #[test]
    fn test_closure_engine_reads_args() {
        let mut seen = None;
        let mut engine = |args: &mut EngineArgs<'_>| {
            seen = Some((args.order_flag(), args.leading_dims.clone(), args.scalars.len()));
            EngineStatus::ok()
        };
        let mut args = EngineArgs::new(StorageOrder::RowMajor)
            .leading_dim(7)
            .scalar(ScalarParam::Real(0.5));
        assert!(engine.call(&mut args).is_ok());
        assert_eq!(seen, Some((0, vec![7], 1)));
    }

    #[test]
    fn test_text_args() {
        let opt = FixedWidthText::pack("yes", 4);
        let mut out = FixedWidthText::allocate(1, 3);
        let args = EngineArgs::new(StorageOrder::ColumnMajor).text(&opt).text_out(&mut out);
        unsafe {
            assert_eq!(args.texts[0].as_bytes(), b"yes ");
            assert!(args.texts[0].as_bytes_mut().is_none());
            if let Some(bytes) = args.texts[1].as_bytes_mut() {
                bytes.copy_from_slice(b"abc");
            }
        }
        drop(args);
        assert_eq!(out.unpack(), vec!["abc"]);
    }
}
