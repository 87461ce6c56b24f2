//! Optional shape metadata with unknown-propagating comparisons.
//!
//! [`Meta`] looks like `Option`, but its comparison operators are
//! three-valued in disguise: a comparison involving an unknown operand is
//! *never* true, including `!=`. Shape validation relies on telling
//! "could not confirm" apart from "confirmed mismatch", so `a != b` being
//! `false` does **not** imply `a == b`.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Mul, MulAssign};

use num_traits::CheckedMul;

/// A scalar that may or may not be known.
#[derive(Clone, Copy, Default)]
pub struct Meta<T> {
    known: bool,
    value: T,
}

impl<T: Copy + Default> Meta<T> {
    /// An unknown value.
    #[inline]
    pub fn unset() -> Self {
        Self {
            known: false,
            value: T::default(),
        }
    }

    /// A known value.
    #[inline]
    pub fn from_value(value: T) -> Self {
        Self { known: true, value }
    }

    /// Overwrite with a known value.
    #[inline]
    pub fn set(&mut self, value: T) {
        self.known = true;
        self.value = value;
    }

    /// Forget the value.
    #[inline]
    pub fn clear(&mut self) {
        *self = Self::unset();
    }

    #[inline]
    pub fn get(&self) -> Option<T> {
        if self.known {
            Some(self.value)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        self.known
    }

    /// The value if known, otherwise `default`.
    #[inline]
    pub fn value_or(&self, default: T) -> T {
        if self.known {
            self.value
        } else {
            default
        }
    }

    /// `Some` becomes known, `None` unknown.
    #[inline]
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::from_value(v),
            None => Self::unset(),
        }
    }

    /// Apply `f` to a known value; unknown stays unknown.
    #[inline]
    pub fn map<U: Copy + Default>(self, f: impl FnOnce(T) -> U) -> Meta<U> {
        if self.known {
            Meta::from_value(f(self.value))
        } else {
            Meta::unset()
        }
    }
}

impl<T: Copy + Default> From<T> for Meta<T> {
    #[inline]
    fn from(value: T) -> Self {
        Self::from_value(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Meta<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.known {
            write!(f, "Meta({:?})", self.value)
        } else {
            f.write_str("Meta(?)")
        }
    }
}

impl<T: fmt::Display> fmt::Display for Meta<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.known {
            self.value.fmt(f)
        } else {
            f.write_str("?")
        }
    }
}

// ============================================================================
// Comparisons
// ============================================================================

// `ne` is deliberately not `!eq`.
#[allow(clippy::partialeq_ne_impl)]
impl<T: PartialEq> PartialEq for Meta<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.known && other.known && self.value == other.value
    }

    #[inline]
    fn ne(&self, other: &Self) -> bool {
        self.known && other.known && self.value != other.value
    }
}

impl<T: PartialOrd> PartialOrd for Meta<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.known && other.known {
            self.value.partial_cmp(&other.value)
        } else {
            None
        }
    }
}

macro_rules! impl_plain_cmp {
    ($($t:ty),*) => {
        $(
            #[allow(clippy::partialeq_ne_impl)]
            impl PartialEq<$t> for Meta<$t> {
                #[inline]
                fn eq(&self, other: &$t) -> bool {
                    self.known && self.value == *other
                }

                #[inline]
                fn ne(&self, other: &$t) -> bool {
                    self.known && self.value != *other
                }
            }

            impl PartialOrd<$t> for Meta<$t> {
                #[inline]
                fn partial_cmp(&self, other: &$t) -> Option<Ordering> {
                    if self.known {
                        self.value.partial_cmp(other)
                    } else {
                        None
                    }
                }
            }
        )*
    };
}

impl_plain_cmp!(usize, u8, bool, i32, i64);

// ============================================================================
// Arithmetic
// ============================================================================

/// An overflowing product is unknown, like one with an unknown factor.
impl<T: Copy + Default + CheckedMul> MulAssign for Meta<T> {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = match (self.get(), rhs.get()) {
            (Some(a), Some(b)) => Self::from_option(a.checked_mul(&b)),
            _ => Self::unset(),
        };
    }
}

impl<T: Copy + Default + CheckedMul> Mul for Meta<T> {
    type Output = Self;

    #[inline]
    fn mul(mut self, rhs: Self) -> Self {
        self *= rhs;
        self
    }
}

/// Product of a set of metadata values; unknown if any factor is unknown
/// or the product overflows.
pub fn meta_product<T>(values: impl IntoIterator<Item = Meta<T>>, one: T) -> Meta<T>
where
    T: Copy + Default + CheckedMul,
{
    let mut acc = Meta::from_value(one);
    for v in values {
        acc *= v;
    }
    acc
}

#[cfg(test)]
#[allow(clippy::nonminimal_bool, clippy::bool_comparison)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_and_set() {
        let mut m: Meta<usize> = Meta::unset();
        assert!(!m.is_known());
        assert_eq!(m.get(), None);
        m.set(7);
        assert!(m.is_known());
        assert_eq!(m.get(), Some(7));
        assert_eq!(Meta::from(3usize).get(), Some(3));
        m.clear();
        assert_eq!(m.get(), None);
    }

    #[test]
    fn test_unknown_is_neither_equal_nor_unequal() {
        let a: Meta<usize> = Meta::unset();
        let b: Meta<usize> = Meta::unset();
        assert!(!(a == b));
        assert!(!(a != b));

        let c = Meta::from_value(4usize);
        assert!(!(a == c));
        assert!(!(a != c));
        assert!(!(c != a));
    }

    #[test]
    fn test_known_comparisons() {
        let a = Meta::from_value(4usize);
        let b = Meta::from_value(5usize);
        assert!(a != b);
        assert!(!(a == b));
        assert!(b > a);
        assert!(!(a > b));
        assert!(a == Meta::from_value(4usize));
    }

    #[test]
    fn test_ordering_with_unknown_is_false() {
        let a: Meta<usize> = Meta::unset();
        let b = Meta::from_value(1usize);
        assert!(!(a > b));
        assert!(!(a < b));
        assert!(!(b > a));
        let a2 = a;
        assert!(!(a >= a2));
    }

    #[test]
    fn test_plain_value_comparison_requires_known() {
        let unknown: Meta<u8> = Meta::unset();
        assert!(!(unknown == 2u8));
        assert!(!(unknown != 2u8));
        let known = Meta::from_value(2u8);
        assert!(known == 2u8);
        assert!(known != 3u8);
        assert!(known > 1u8);
        let flag: Meta<bool> = Meta::from_value(true);
        assert!(flag == true);
    }

    #[test]
    fn test_mul_assign_propagates_unknown() {
        let mut a = Meta::from_value(3usize);
        a *= Meta::from_value(4usize);
        assert_eq!(a.get(), Some(12));

        a *= Meta::unset();
        assert!(!a.is_known());
        // value is reset, so re-knowing it would not resurrect 12
        assert_eq!(a.value_or(99), 99);

        let mut b: Meta<usize> = Meta::unset();
        b *= Meta::from_value(2usize);
        assert!(!b.is_known());
    }

    #[test]
    fn test_product() {
        let p = meta_product([Meta::from(2usize), Meta::from(3), Meta::from(5)], 1);
        assert_eq!(p.get(), Some(30));
        let q = meta_product([Meta::from(2usize), Meta::unset()], 1);
        assert_eq!(q.get(), None);
        let empty = meta_product(std::iter::empty::<Meta<usize>>(), 1);
        assert_eq!(empty.get(), Some(1));
    }

    #[test]
    fn test_overflowing_product_is_unknown() {
        let p = meta_product([Meta::from(usize::MAX / 2), Meta::from(4)], 1);
        assert!(!p.is_known());

        let mut a = Meta::from_value(u8::MAX);
        a *= Meta::from_value(2u8);
        assert!(!a.is_known());
    }

    #[test]
    fn test_display() {
        assert_eq!(Meta::from_value(5usize).to_string(), "5");
        assert_eq!(Meta::<usize>::unset().to_string(), "?");
    }
}
