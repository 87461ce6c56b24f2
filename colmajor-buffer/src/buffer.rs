//! The canonical buffer adapter.
//!
//! A [`Buffer`] turns one user container into the flat buffer the engine
//! reads or writes: contiguous, of the engine's element type, and laid out in
//! the storage order agreed for the call. It borrows the container's storage
//! when nothing has to change and otherwise owns a converted copy.

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use colmajor_traits::{
    linear_offset, next_index_col_major, ElementCast, EngineScalar, Meta, Probe, RawData,
    RawDataMut, StorageOrder,
};

use crate::check::{MissingMetadataPolicy, ShapeCheck, ShapeWarning};
use crate::direction::{Direction, In, Writable};
use crate::shape::{ShapeInfo, MAX_RANK};
use crate::{MarshalError, Result};

/// Storage behind a non-null [`Buffer`].
pub enum Ownership<'a, E> {
    /// The container's own memory, read without copying.
    Borrowed(&'a [E]),
    /// The container's own memory, written by the engine in place.
    BorrowedMut(&'a mut [E]),
    /// An adapter-allocated copy.
    Owned(Vec<E>),
}

impl<E> Ownership<'_, E> {
    #[inline]
    pub fn as_slice(&self) -> &[E] {
        match self {
            Ownership::Borrowed(data) => data,
            Ownership::BorrowedMut(data) => data,
            Ownership::Owned(data) => data,
        }
    }

    /// Writable view; `None` for a read-only borrow.
    #[inline]
    pub fn as_mut_slice(&mut self) -> Option<&mut [E]> {
        match self {
            Ownership::Borrowed(_) => None,
            Ownership::BorrowedMut(data) => Some(&mut **data),
            Ownership::Owned(data) => Some(data.as_mut_slice()),
        }
    }
}

/// Deferred copy of an owned buffer into the container it was built from.
type WriteBack<'a, E> = Box<dyn FnOnce(&[E], &[usize], StorageOrder) -> Result<()> + 'a>;

/// One engine argument, marshaled.
///
/// `'a` is the lifetime of a borrowed container. Buffers built with
/// `from_container` from a shared reference never borrow mutably, so the
/// writable ones are `Buffer<'static, E, D>` and leave the container free for
/// [`copy_back`](Buffer::copy_back). [`in_place`](Buffer::in_place) holds the
/// container mutably instead and finishes with [`finish`](Buffer::finish).
pub struct Buffer<'a, E, D = In> {
    name: &'static str,
    shape: ShapeInfo,
    order: StorageOrder,
    storage: Option<Ownership<'a, E>>,
    write_back: Option<WriteBack<'a, E>>,
    _direction: PhantomData<D>,
}

// ============================================================================
// Allocation and element copies
// ============================================================================

/// `n` copies of `value`, reporting allocation failure instead of aborting.
pub(crate) fn alloc_filled<T: Clone>(name: &'static str, n: usize, value: T) -> Result<Vec<T>> {
    let mut data = Vec::new();
    data.try_reserve_exact(n)
        .map_err(|_| MarshalError::AllocationFailure { name, elements: n })?;
    data.resize(n, value);
    Ok(data)
}

/// Element count of a dense shape the caller asked for.
///
/// The rank must be `1..=MAX_RANK`; a product that overflows `usize` can
/// never be allocated.
fn dense_len(name: &'static str, extents: &[usize]) -> Result<usize> {
    if extents.is_empty() || extents.len() > MAX_RANK {
        return Err(MarshalError::UnsupportedRank {
            name,
            rank: extents.len(),
        });
    }
    extents
        .iter()
        .try_fold(1usize, |acc, &e| acc.checked_mul(e))
        .ok_or(MarshalError::AllocationFailure {
            name,
            elements: usize::MAX,
        })
}

/// Copy the block two dense arrays of equal rank have in common, casting
/// each element, and fill the rest of `dst` with `zero`.
///
/// Out-of-range source offsets read as `zero`; out-of-range destination
/// offsets are skipped.
fn copy_block<S, T>(
    src: &[S],
    src_dims: &[usize],
    src_order: StorageOrder,
    dst: &mut [T],
    dst_dims: &[usize],
    dst_order: StorageOrder,
    zero: T,
) where
    S: ElementCast<T>,
    T: Copy,
{
    debug_assert_eq!(src_dims.len(), dst_dims.len());
    if dst.is_empty() || dst_dims.contains(&0) {
        return;
    }
    let src_strides = src_order.strides(src_dims);
    let dst_strides = dst_order.strides(dst_dims);
    let mut idx = vec![0usize; dst_dims.len()];
    loop {
        let inside = idx.iter().zip(src_dims).all(|(&i, &d)| i < d);
        let value = if inside {
            src.get(linear_offset(&idx, &src_strides))
                .map_or(zero, |&s| s.cast())
        } else {
            zero
        };
        if let Some(slot) = dst.get_mut(linear_offset(&idx, &dst_strides)) {
            *slot = value;
        }
        if !next_index_col_major(&mut idx, dst_dims) {
            break;
        }
    }
}

/// Element-by-element copy in memory order, zero-filling any tail.
fn copy_flat<S, T>(src: &[S], dst: &mut [T], zero: T)
where
    S: ElementCast<T>,
    T: Copy,
{
    for (i, slot) in dst.iter_mut().enumerate() {
        *slot = src.get(i).map_or(zero, |&s| s.cast());
    }
}

/// Whether a multi-dimensional container's known native order disagrees
/// with the agreed one.
fn needs_transpose(shape: &ShapeInfo, order: StorageOrder) -> bool {
    shape.dims > 1u8 && shape.column_major != order.is_column_major()
}

/// Whether `available` contiguous elements of type `S` can serve as the
/// buffer without a copy.
fn can_borrow<S: 'static, E: 'static>(
    shape: &ShapeInfo,
    order: StorageOrder,
    n: usize,
    available: usize,
) -> bool {
    TypeId::of::<S>() == TypeId::of::<E>() && n <= available && !needs_transpose(shape, order)
}

/// Owned copy of `src` in `order`, cast to the engine type.
fn copy_in<S, E>(
    name: &'static str,
    src: &[S],
    shape: &ShapeInfo,
    order: StorageOrder,
) -> Result<Vec<E>>
where
    S: ElementCast<E>,
    E: EngineScalar,
{
    let n = shape.element_count.value_or(src.len());
    let mut data = alloc_filled(name, n, E::zero())?;
    match shape.known_extents() {
        Some(dims) if needs_transpose(shape, order) => {
            let native = StorageOrder::from_column_major(!order.is_column_major());
            tracing::debug!(name, ?dims, ?native, ?order, "transposing container into owned buffer");
            copy_block(src, &dims, native, &mut data, &dims, order, E::zero());
        }
        _ => {
            tracing::debug!(name, elements = n, engine = E::NAME, "copying container into owned buffer");
            copy_flat(src, &mut data, E::zero());
        }
    }
    Ok(data)
}

/// Write `src` (laid out as `src_dims` in `src_order`) into `container`,
/// reshaped to `target`.
///
/// A present container that exposes no contiguous storage is rebuilt
/// through its resize capability before the copy.
fn write_into<E, C>(
    name: &'static str,
    src: &[E],
    src_dims: &[usize],
    src_order: StorageOrder,
    container: &mut C,
    target: &[usize],
) -> Result<()>
where
    E: EngineScalar + ElementCast<C::Elem>,
    C: Probe + RawDataMut + ?Sized,
{
    let target_len = dense_len(name, target)?;

    let before = ShapeInfo::probe(&*container);
    let contiguous = container.raw_data_mut().is_some();
    let reshape = before.known_extents().as_deref() != Some(target)
        || (!contiguous && container.probe_present());
    if reshape && container.probe_resize(target) {
        tracing::debug!(name, ?target, "resized container for copy-back");
    }
    let after = ShapeInfo::probe(&*container);
    let dst_order = after
        .column_major
        .get()
        .map_or(src_order, StorageOrder::from_column_major);
    let zero: C::Elem = E::zero().cast();

    let Some(dst) = container.raw_data_mut() else {
        return Err(MarshalError::NullBuffer { name });
    };
    let dst_dims = match after.known_extents() {
        Some(dims) if dims.len() == target.len() => Some(dims),
        _ if dst.len() == target_len => Some(target.to_vec()),
        _ => None,
    };

    match dst_dims {
        Some(dst_dims) if dst_dims.len() == src_dims.len() => {
            tracing::debug!(name, ?src_dims, ?dst_dims, "copying buffer back");
            copy_block(src, src_dims, src_order, dst, &dst_dims, dst_order, zero);
        }
        _ => {
            tracing::debug!(name, elements = dst.len(), "copying buffer back in memory order");
            copy_flat(src, dst, zero);
        }
    }
    Ok(())
}

/// A multi-dimensional buffer is laid out in the agreed order.
fn conform(shape: &mut ShapeInfo, order: StorageOrder) {
    if shape.dims > 1u8 {
        shape.column_major.set(order.is_column_major());
    }
}

// ============================================================================
// Construction
// ============================================================================

impl<'a, E: EngineScalar> Buffer<'a, E, In> {
    /// Marshal an input container.
    ///
    /// Borrows the container's storage when it is contiguous, its element
    /// type is `E` and a multi-dimensional container is not known to be
    /// stored in the other order; copies otherwise. A container without
    /// storage gives a null buffer.
    pub fn from_container<C>(name: &'static str, container: &'a C, order: StorageOrder) -> Result<Self>
    where
        C: Probe + ?Sized,
        C::Elem: ElementCast<E>,
    {
        let Some(data) = container.elements() else {
            return Ok(Self::null(name, order));
        };
        let mut shape = ShapeInfo::probe(container);
        let n = shape.element_count.value_or(data.len());

        let storage = match data {
            Cow::Borrowed(data) if can_borrow::<C::Elem, E>(&shape, order, n, data.len()) => {
                tracing::debug!(name, elements = n, "borrowing container storage");
                // SAFETY: `C::Elem` and `E` are the same type and `n` is in bounds.
                let data = unsafe { std::slice::from_raw_parts(data.as_ptr().cast::<E>(), n) };
                Ownership::Borrowed(data)
            }
            data => Ownership::Owned(copy_in(name, &data, &shape, order)?),
        };

        conform(&mut shape, order);
        Ok(Self::with_storage(name, shape, order, storage))
    }
}

impl<E: EngineScalar, D: Writable> Buffer<'static, E, D> {
    /// Marshal an output (`Out`) or input-output (`InOut`) container.
    ///
    /// Always allocates; `InOut` copies the contents in, `Out` leaves the
    /// buffer zeroed.
    pub fn from_container<C>(name: &'static str, container: &C, order: StorageOrder) -> Result<Self>
    where
        C: Probe + ?Sized,
        C::Elem: ElementCast<E>,
    {
        if !container.has_storage() {
            return Ok(Self::null(name, order));
        }
        let mut shape = ShapeInfo::probe(container);
        let buf = Self::fill(name, container, &shape, order)?;
        conform(&mut shape, order);
        Ok(Self::with_storage(name, shape, order, Ownership::Owned(buf)))
    }

    /// Scratch buffer never backed by a container.
    pub fn allocate_local(name: &'static str, extents: &[usize], order: StorageOrder) -> Result<Self> {
        let n = dense_len(name, extents)?;
        let shape = ShapeInfo::from_extents(extents, order);
        let buf = alloc_filled(name, n, E::zero())?;
        Ok(Self::with_storage(name, shape, order, Ownership::Owned(buf)))
    }

    /// Reallocate the buffer for `new_extents`.
    ///
    /// Contents are not preserved; the container itself is only resized by
    /// a later copy-back.
    pub fn resize(&mut self, new_extents: &[usize]) -> Result<()> {
        let n = dense_len(self.name, new_extents)?;
        let buf = alloc_filled(self.name, n, E::zero())?;
        self.storage = Some(Ownership::Owned(buf));
        self.shape = ShapeInfo::from_extents(new_extents, self.order);
        Ok(())
    }
}

impl<'a, E: EngineScalar, D: Writable> Buffer<'a, E, D> {
    /// Marshal a writable container the engine updates in place.
    ///
    /// When the container is contiguous, already holds `E`, and is stored in
    /// the agreed order, the buffer borrows its memory mutably and the engine
    /// writes straight into it. Otherwise the buffer owns a copy, as with
    /// `from_container`, and [`finish`](Self::finish) writes it back.
    pub fn in_place<C>(name: &'static str, container: &'a mut C, order: StorageOrder) -> Result<Self>
    where
        C: Probe + RawDataMut + ?Sized,
        C::Elem: ElementCast<E>,
        E: ElementCast<C::Elem>,
    {
        if !container.has_storage() {
            return Ok(Self::null(name, order));
        }
        let mut shape = ShapeInfo::probe(&*container);
        let available = container.raw_data().map(<[_]>::len);
        let n = shape.element_count.value_or(available.unwrap_or(0));

        if available.is_some_and(|len| can_borrow::<C::Elem, E>(&shape, order, n, len)) {
            let Some(data) = container.raw_data_mut() else {
                return Err(MarshalError::NullBuffer { name });
            };
            tracing::debug!(name, elements = n, "borrowing container storage for writing");
            // SAFETY: `C::Elem` and `E` are the same type and `n` is in bounds.
            let data = unsafe { std::slice::from_raw_parts_mut(data.as_mut_ptr().cast::<E>(), n) };
            conform(&mut shape, order);
            return Ok(Self::with_storage(name, shape, order, Ownership::BorrowedMut(data)));
        }

        let buf = Self::fill(name, &*container, &shape, order)?;
        conform(&mut shape, order);
        let mut buffer = Self::with_storage(name, shape, order, Ownership::Owned(buf));
        buffer.write_back = Some(Box::new(move |src: &[E], dims: &[usize], src_order: StorageOrder| {
            write_into(name, src, dims, src_order, container, dims)
        }));
        Ok(buffer)
    }

    /// Owned contents of a new writable buffer: the converted container for
    /// `InOut`, zeros for `Out`.
    fn fill<C>(name: &'static str, container: &C, shape: &ShapeInfo, order: StorageOrder) -> Result<Vec<E>>
    where
        C: Probe + ?Sized,
        C::Elem: ElementCast<E>,
    {
        if D::COPY_IN {
            let Some(data) = container.elements() else {
                return Err(MarshalError::NullBuffer { name });
            };
            copy_in(name, &data, shape, order)
        } else {
            let available = container.raw_data().map(<[_]>::len);
            let n = shape.element_count.value_or(available.unwrap_or(0));
            tracing::debug!(name, elements = n, "allocating output buffer");
            alloc_filled(name, n, E::zero())
        }
    }

    pub fn as_mut_slice(&mut self) -> Option<&mut [E]> {
        self.storage.as_mut().and_then(Ownership::as_mut_slice)
    }

    /// Mutable pointer handed to the engine; null for a null buffer.
    pub fn as_mut_ptr(&mut self) -> *mut E {
        self.as_mut_slice()
            .map_or(std::ptr::null_mut(), <[E]>::as_mut_ptr)
    }

    /// Write the whole buffer into `container`.
    ///
    /// The container is resized to the buffer's extents first when its shape
    /// differs and it can be resized.
    pub fn copy_back<C>(&self, container: &mut C) -> Result<()>
    where
        C: Probe + RawDataMut + ?Sized,
        E: ElementCast<C::Elem>,
    {
        let Some(src) = self.as_slice() else {
            return Ok(());
        };
        let dims = self.shape.known_extents().unwrap_or_else(|| vec![src.len()]);
        write_into(self.name, src, &dims, self.order, container, &dims)
    }

    /// Resize `container` to `new_extents` and write the part of the buffer
    /// that fits.
    ///
    /// Per axis, at most `min(buffer extent, new extent)` elements are
    /// copied; every other cell of the new shape is zero. When the buffer and
    /// the new shape differ in rank the copy is flat, in memory order.
    pub fn copy_back_resized<C>(&self, container: &mut C, new_extents: &[usize]) -> Result<()>
    where
        C: Probe + RawDataMut + ?Sized,
        E: ElementCast<C::Elem>,
    {
        let Some(src) = self.as_slice() else {
            return Ok(());
        };
        let dims = self.shape.known_extents().unwrap_or_else(|| vec![src.len()]);
        write_into(self.name, src, &dims, self.order, container, new_extents)
    }

    /// End an [`in_place`](Self::in_place) buffer's use.
    ///
    /// An owned copy is written back into the container it was built from;
    /// a borrowed buffer already left the results there. Buffers not built
    /// in place have nothing to do.
    pub fn finish(mut self) -> Result<()> {
        let Some(write_back) = self.write_back.take() else {
            return Ok(());
        };
        let Some(src) = self.as_slice() else {
            return Ok(());
        };
        let dims = self.shape.known_extents().unwrap_or_else(|| vec![src.len()]);
        write_back(src, &dims, self.order)
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl<'a, E: EngineScalar, D: Direction> Buffer<'a, E, D> {
    fn null(name: &'static str, order: StorageOrder) -> Self {
        tracing::debug!(name, "container has no storage, buffer is null");
        Self {
            name,
            shape: ShapeInfo::unknown(),
            order,
            storage: None,
            write_back: None,
            _direction: PhantomData,
        }
    }

    fn with_storage(name: &'static str, shape: ShapeInfo, order: StorageOrder, storage: Ownership<'a, E>) -> Self {
        Self {
            name,
            shape,
            order,
            storage: Some(storage),
            write_back: None,
            _direction: PhantomData,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn shape(&self) -> &ShapeInfo {
        &self.shape
    }

    /// Storage order the buffer is laid out in.
    #[inline]
    pub fn order(&self) -> StorageOrder {
        self.order
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.storage.is_none()
    }

    /// Whether the buffer uses the container's memory, for reading or
    /// writing.
    #[inline]
    pub fn is_borrowed(&self) -> bool {
        matches!(
            self.storage,
            Some(Ownership::Borrowed(_) | Ownership::BorrowedMut(_))
        )
    }

    pub fn storage(&self) -> Option<&Ownership<'a, E>> {
        self.storage.as_ref()
    }

    #[inline]
    pub fn as_slice(&self) -> Option<&[E]> {
        self.storage.as_ref().map(Ownership::as_slice)
    }

    /// Pointer handed to the engine; null for a null buffer.
    #[inline]
    pub fn as_ptr(&self) -> *const E {
        self.as_slice().map_or(std::ptr::null(), <[E]>::as_ptr)
    }

    pub fn len(&self) -> usize {
        self.as_slice().map_or(0, <[E]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at a zero-based multi-index, `None` when out of range or the
    /// shape is not fully known.
    pub fn get(&self, index: &[usize]) -> Option<E> {
        let dims = self.shape.known_extents()?;
        if index.len() != dims.len() || index.iter().zip(&dims).any(|(&i, &d)| i >= d) {
            return None;
        }
        let offset = linear_offset(index, &self.order.strides(&dims));
        self.as_slice()?.get(offset).copied()
    }

    /// Leading dimension for the engine: `max(minimum, extent of the
    /// fastest-varying axis)`.
    pub fn leading_dimension(&self, minimum: usize) -> usize {
        let axis = if self.order.is_column_major() {
            1
        } else {
            self.shape.rank()
        };
        minimum.max(self.shape.extent(axis).value_or(0))
    }

    /// Second leading dimension of a 3D argument.
    pub fn second_dimension(&self, minimum: usize) -> usize {
        minimum.max(self.shape.extent(2).value_or(0))
    }

    pub fn shape_check<'e>(&self, expected_extents: &'e [usize], expected_order: Meta<bool>) -> ShapeCheck<'e> {
        ShapeCheck::new(self.name, self.shape, expected_extents, expected_order)
    }

    /// Validate the discovered shape against the expected one.
    pub fn check(
        &self,
        expected_extents: &[usize],
        expected_order: Meta<bool>,
        policy: MissingMetadataPolicy,
    ) -> Result<Option<ShapeWarning>> {
        self.shape_check(expected_extents, expected_order)
            .validate(policy)
    }
}

impl<E: fmt::Debug, D> fmt::Debug for Buffer<'_, E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let storage = match &self.storage {
            None => "null",
            Some(Ownership::Borrowed(_)) => "borrowed",
            Some(Ownership::BorrowedMut(_)) => "borrowed mutably",
            Some(Ownership::Owned(_)) if self.write_back.is_some() => "owned, written back",
            Some(Ownership::Owned(_)) => "owned",
        };
        f.debug_struct("Buffer")
            .field("name", &self.name)
            .field("shape", &self.shape.describe().to_string())
            .field("order", &self.order)
            .field("storage", &storage)
            .finish()
    }
}

// ============================================================================
// Buffers as resolver candidates
// ============================================================================

impl<E: EngineScalar, D: Direction> RawData for Buffer<'_, E, D> {
    type Elem = E;

    fn raw_data(&self) -> Option<&[E]> {
        self.as_slice()
    }
}

impl<E: EngineScalar, D: Direction> Probe for Buffer<'_, E, D> {
    fn probe_element_count(&self) -> Meta<usize> {
        self.shape.element_count
    }

    fn probe_extent1(&self) -> Meta<usize> {
        self.shape.extents[0]
    }

    fn probe_extent2(&self) -> Meta<usize> {
        self.shape.extents[1]
    }

    fn probe_extent3(&self) -> Meta<usize> {
        self.shape.extents[2]
    }

    fn probe_explicit_dims(&self) -> Meta<u8> {
        self.shape.dims
    }

    fn probe_column_major(&self) -> Meta<bool> {
        self.shape.column_major
    }
}
