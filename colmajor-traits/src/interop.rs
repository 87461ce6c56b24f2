//! Capability tables for third-party array crates.
//!
//! Fully gated behind the `ndarray` and `nalgebra` features so the core
//! crate carries no hard dependency on either.

// ndarray interop
#[cfg(feature = "ndarray")]
pub mod ndarray_impl {
    //! `ndarray` arrays answer extents from their shape and storage order
    //! from their strides. Arrays that are contiguous in neither C nor
    //! Fortran order (sliced with a step, permuted axes) expose no raw
    //! pointer; their elements are gathered in row-major order instead.
    //! Views expose their data but only owned arrays carry a probe table.

    use std::borrow::Cow;

    use ndarray::{
        Array1, Array2, Array3, ArrayBase, Data, DataMut, Dimension, Ix1, Ix2, Ix3, ShapeBuilder,
    };

    use crate::meta::Meta;
    use crate::probe::{resize_extent, Probe, RawData, RawDataMut};

    /// `Some(true)` for Fortran-contiguous, `Some(false)` for C-contiguous.
    ///
    /// Fortran layout is tested first: with a length-1 axis an array can be
    /// both, and its strides then say it was built column-major.
    fn contiguous_order<S, D>(a: &ArrayBase<S, D>) -> Option<bool>
    where
        S: Data,
        D: Dimension,
    {
        if a.view().reversed_axes().is_standard_layout() {
            Some(true)
        } else if a.is_standard_layout() {
            Some(false)
        } else {
            None
        }
    }

    /// Order of the elements `elements()` yields.
    fn native_column_major<S, D>(a: &ArrayBase<S, D>) -> bool
    where
        S: Data,
        D: Dimension,
    {
        contiguous_order(a).unwrap_or(false)
    }

    macro_rules! impl_raw_data {
        ($dim:ty) => {
            impl<A, S> RawData for ArrayBase<S, $dim>
            where
                A: Copy + 'static,
                S: Data<Elem = A>,
            {
                type Elem = A;

                fn raw_data(&self) -> Option<&[A]> {
                    contiguous_order(self)?;
                    self.as_slice_memory_order()
                }

                fn has_storage(&self) -> bool {
                    true
                }

                fn elements(&self) -> Option<Cow<'_, [A]>> {
                    Some(match self.raw_data() {
                        Some(data) => Cow::Borrowed(data),
                        None => Cow::Owned(self.iter().copied().collect()),
                    })
                }
            }

            impl<A, S> RawDataMut for ArrayBase<S, $dim>
            where
                A: Copy + 'static,
                S: DataMut<Elem = A>,
            {
                fn raw_data_mut(&mut self) -> Option<&mut [A]> {
                    contiguous_order(self)?;
                    self.as_slice_memory_order_mut()
                }
            }
        };
    }

    impl_raw_data!(Ix1);
    impl_raw_data!(Ix2);
    impl_raw_data!(Ix3);

    impl<A: Copy + Default + 'static> Probe for Array1<A> {
        fn probe_element_count(&self) -> Meta<usize> {
            Meta::from_value(self.len())
        }

        fn probe_extent1(&self) -> Meta<usize> {
            Meta::from_value(self.len())
        }

        fn probe_resize(&mut self, extents: &[usize]) -> bool {
            *self = Array1::from_elem(resize_extent(extents, 0), A::default());
            true
        }
    }

    impl<A: Copy + Default + 'static> Probe for Array2<A> {
        fn probe_element_count(&self) -> Meta<usize> {
            Meta::from_value(self.len())
        }

        fn probe_extent1(&self) -> Meta<usize> {
            Meta::from_value(self.nrows())
        }

        fn probe_extent2(&self) -> Meta<usize> {
            Meta::from_value(self.ncols())
        }

        fn probe_column_major(&self) -> Meta<bool> {
            Meta::from_value(native_column_major(self))
        }

        fn probe_resize(&mut self, extents: &[usize]) -> bool {
            let shape = (resize_extent(extents, 0), resize_extent(extents, 1));
            *self = if contiguous_order(self) == Some(true) {
                Array2::from_elem(shape.f(), A::default())
            } else {
                Array2::from_elem(shape, A::default())
            };
            true
        }
    }

    impl<A: Copy + Default + 'static> Probe for Array3<A> {
        fn probe_element_count(&self) -> Meta<usize> {
            Meta::from_value(self.len())
        }

        fn probe_extent1(&self) -> Meta<usize> {
            Meta::from_value(self.dim().0)
        }

        fn probe_extent2(&self) -> Meta<usize> {
            Meta::from_value(self.dim().1)
        }

        fn probe_extent3(&self) -> Meta<usize> {
            Meta::from_value(self.dim().2)
        }

        fn probe_column_major(&self) -> Meta<bool> {
            Meta::from_value(native_column_major(self))
        }

        fn probe_resize(&mut self, extents: &[usize]) -> bool {
            let shape = (
                resize_extent(extents, 0),
                resize_extent(extents, 1),
                resize_extent(extents, 2),
            );
            *self = if contiguous_order(self) == Some(true) {
                Array3::from_elem(shape.f(), A::default())
            } else {
                Array3::from_elem(shape, A::default())
            };
            true
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use ndarray::{array, s, ShapeBuilder};

        #[test]
        fn test_array2_row_major() {
            let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
            assert_eq!(a.probe_dims().get(), Some(2));
            assert_eq!(a.probe_extent(1).get(), Some(2));
            assert_eq!(a.probe_extent(2).get(), Some(3));
            assert_eq!(a.probe_column_major().get(), Some(false));
            assert_eq!(a.raw_data(), Some(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0][..]));
        }

        #[test]
        fn test_array2_fortran_order() {
            let a = Array2::<f64>::zeros((3, 2).f());
            assert_eq!(a.probe_column_major().get(), Some(true));
        }

        #[test]
        fn test_fortran_array_with_unit_axis_is_column_major() {
            let a = Array2::<f64>::zeros((3, 1).f());
            assert_eq!(a.probe_column_major().get(), Some(true));
            let b = Array2::<f64>::zeros((1, 3));
            assert_eq!(b.probe_column_major().get(), Some(true));
            assert_eq!(b.raw_data().map(<[f64]>::len), Some(3));
        }

        #[test]
        fn test_stepped_slice_is_present_and_gathered() {
            let full = Array2::from_shape_fn((4, 6), |(i, j)| (i * 10 + j) as f64);
            let stepped = full.slice_move(s![.., ..;2]);
            assert_eq!(stepped.dim(), (4, 3));
            assert!(stepped.raw_data().is_none());
            assert!(stepped.probe_present());
            assert_eq!(stepped.probe_column_major().get(), Some(false));

            let gathered = stepped.elements().unwrap();
            assert_eq!(gathered.len(), 12);
            assert_eq!(&gathered[..4], &[0.0, 2.0, 4.0, 10.0]);
        }

        #[test]
        fn test_array2_resize_keeps_fortran_order() {
            let mut a = Array2::<f64>::zeros((2, 2).f());
            assert!(a.probe_resize(&[4, 5]));
            assert_eq!(a.dim(), (4, 5));
            assert_eq!(a.probe_column_major().get(), Some(true));
        }

        #[test]
        fn test_array3_extents() {
            let a = Array3::<i32>::zeros((2, 3, 4));
            assert_eq!(a.probe_dims().get(), Some(3));
            assert_eq!(a.probe_extent(3).get(), Some(4));
        }
    }
}

// nalgebra interop
#[cfg(feature = "nalgebra")]
pub mod nalgebra_impl {
    //! `nalgebra` dynamic matrices are always column-major.

    use nalgebra::{DMatrix, DVector, Scalar};

    use crate::meta::Meta;
    use crate::probe::{resize_extent, Probe, RawData, RawDataMut};

    impl<T: Scalar + Copy> RawData for DMatrix<T> {
        type Elem = T;

        fn raw_data(&self) -> Option<&[T]> {
            Some(self.as_slice())
        }
    }

    impl<T: Scalar + Copy> RawDataMut for DMatrix<T> {
        fn raw_data_mut(&mut self) -> Option<&mut [T]> {
            Some(self.as_mut_slice())
        }
    }

    impl<T: Scalar + Copy + Default> Probe for DMatrix<T> {
        fn probe_element_count(&self) -> Meta<usize> {
            Meta::from_value(self.len())
        }

        fn probe_extent1(&self) -> Meta<usize> {
            Meta::from_value(self.nrows())
        }

        fn probe_extent2(&self) -> Meta<usize> {
            Meta::from_value(self.ncols())
        }

        fn probe_column_major(&self) -> Meta<bool> {
            Meta::from_value(true)
        }

        fn probe_resize(&mut self, extents: &[usize]) -> bool {
            *self = DMatrix::from_element(
                resize_extent(extents, 0),
                resize_extent(extents, 1),
                T::default(),
            );
            true
        }
    }

    impl<T: Scalar + Copy> RawData for DVector<T> {
        type Elem = T;

        fn raw_data(&self) -> Option<&[T]> {
            Some(self.as_slice())
        }
    }

    impl<T: Scalar + Copy> RawDataMut for DVector<T> {
        fn raw_data_mut(&mut self) -> Option<&mut [T]> {
            Some(self.as_mut_slice())
        }
    }

    impl<T: Scalar + Copy + Default> Probe for DVector<T> {
        fn probe_element_count(&self) -> Meta<usize> {
            Meta::from_value(self.len())
        }

        fn probe_extent1(&self) -> Meta<usize> {
            Meta::from_value(self.len())
        }

        fn probe_resize(&mut self, extents: &[usize]) -> bool {
            *self = DVector::from_element(resize_extent(extents, 0), T::default());
            true
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_dmatrix_is_column_major() {
            let m = DMatrix::<f64>::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
            assert_eq!(m.probe_column_major().get(), Some(true));
            assert_eq!(m.probe_extent(1).get(), Some(2));
            assert_eq!(m.probe_extent(2).get(), Some(3));
            assert_eq!(m.raw_data(), Some(&[1.0, 4.0, 2.0, 5.0, 3.0, 6.0][..]));
        }

        #[test]
        fn test_dvector_resize() {
            let mut v = DVector::<f64>::zeros(2);
            assert!(v.probe_resize(&[6]));
            assert_eq!(v.len(), 6);
            assert_eq!(v.probe_dims().get(), Some(1));
        }
    }
}
