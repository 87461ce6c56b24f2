//! Type-level argument directions.
//!
//! The direction of an argument is fixed when its buffer is built. It
//! decides whether the container is copied in, whether the buffer is copied
//! back, and whether the buffer may be resized; [`Writable`] gates the last
//! two at compile time.

/// Runtime tag for a [`Direction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectionKind {
    In,
    Out,
    InOut,
}

mod sealed {
    pub trait Sealed {}
}

/// Marker trait for argument directions.
pub trait Direction: sealed::Sealed + 'static {
    const KIND: DirectionKind;

    /// Container contents are copied into the buffer on construction.
    const COPY_IN: bool;

    /// Buffer contents are copied back into a container after the call.
    const COPY_BACK: bool;
}

/// Directions whose buffers the engine writes.
pub trait Writable: Direction {}

/// Read by the engine only.
#[derive(Debug, Clone, Copy, Default)]
pub struct In;

/// Written by the engine only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Out;

/// Read and written by the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct InOut;

impl sealed::Sealed for In {}
impl sealed::Sealed for Out {}
impl sealed::Sealed for InOut {}

impl Direction for In {
    const KIND: DirectionKind = DirectionKind::In;
    const COPY_IN: bool = true;
    const COPY_BACK: bool = false;
}

impl Direction for Out {
    const KIND: DirectionKind = DirectionKind::Out;
    const COPY_IN: bool = false;
    const COPY_BACK: bool = true;
}

impl Direction for InOut {
    const KIND: DirectionKind = DirectionKind::InOut;
    const COPY_IN: bool = true;
    const COPY_BACK: bool = true;
}

impl Writable for Out {}
impl Writable for InOut {}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags<D: Direction>() -> (DirectionKind, bool, bool) {
        (D::KIND, D::COPY_IN, D::COPY_BACK)
    }

    #[test]
    fn test_direction_flags() {
        assert_eq!(flags::<In>(), (DirectionKind::In, true, false));
        assert_eq!(flags::<Out>(), (DirectionKind::Out, false, true));
        assert_eq!(flags::<InOut>(), (DirectionKind::InOut, true, true));
    }
}
