//! Engine element types and unchecked element casts.
//!
//! Casting between a container's native element type and the engine's
//! element type is a plain `as`-style conversion. Nothing is range-checked:
//! `f64 -> f32` may lose precision and `i64 -> i32` may wrap. Callers are
//! responsible for passing values that fit.

use num_complex::{Complex32, Complex64};
use num_traits::{AsPrimitive, Zero};

/// Element types the engine accepts in its flat buffers.
pub trait EngineScalar: Copy + Default + Zero + PartialEq + std::fmt::Debug + 'static {
    /// Name used in diagnostics.
    const NAME: &'static str;
}

macro_rules! impl_engine_scalar {
    ($($t:ty => $name:literal),* $(,)?) => {
        $(
            impl EngineScalar for $t {
                const NAME: &'static str = $name;
            }
        )*
    };
}

impl_engine_scalar!(
    f64 => "f64",
    f32 => "f32",
    i64 => "i64",
    i32 => "i32",
    Complex64 => "Complex64",
    Complex32 => "Complex32",
);

/// Unchecked conversion of one element into another element type.
pub trait ElementCast<To>: Copy {
    fn cast(self) -> To;
}

macro_rules! impl_primitive_casts {
    ($($src:ty),* => $dsts:tt) => {
        $( impl_primitive_casts!(@one $src => $dsts); )*
    };
    (@one $src:ty => [$($dst:ty),*]) => {
        $(
            impl ElementCast<$dst> for $src {
                #[inline(always)]
                fn cast(self) -> $dst {
                    AsPrimitive::<$dst>::as_(self)
                }
            }
        )*
    };
}

impl_primitive_casts!(
    f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize
        => [f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize]
);

impl ElementCast<Complex64> for Complex64 {
    #[inline(always)]
    fn cast(self) -> Complex64 {
        self
    }
}

impl ElementCast<Complex32> for Complex32 {
    #[inline(always)]
    fn cast(self) -> Complex32 {
        self
    }
}

impl ElementCast<Complex64> for Complex32 {
    #[inline(always)]
    fn cast(self) -> Complex64 {
        Complex64::new(self.re as f64, self.im as f64)
    }
}

impl ElementCast<Complex32> for Complex64 {
    #[inline(always)]
    fn cast(self) -> Complex32 {
        Complex32::new(self.re as f32, self.im as f32)
    }
}

macro_rules! impl_real_to_complex {
    ($($src:ty),*) => {
        $(
            impl ElementCast<Complex64> for $src {
                #[inline(always)]
                fn cast(self) -> Complex64 {
                    Complex64::new(AsPrimitive::<f64>::as_(self), 0.0)
                }
            }

            impl ElementCast<Complex32> for $src {
                #[inline(always)]
                fn cast(self) -> Complex32 {
                    Complex32::new(AsPrimitive::<f32>::as_(self), 0.0)
                }
            }
        )*
    };
}

impl_real_to_complex!(f32, f64);
