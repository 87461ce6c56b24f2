//! One engine call, from argument packing to status handling.
//!
//! A [`CallFrame`] holds what every argument of a call must agree on: the
//! storage order, the missing-metadata policy, and the warnings validation
//! produced. The usual sequence is
//!
//! 1. [`agree_order`](CallFrame::agree_order) over the matrix arguments,
//! 2. [`extent`](CallFrame::extent) for each problem dimension,
//! 3. build a buffer per argument ([`input`](CallFrame::input),
//!    [`output`](CallFrame::output), [`inout`](CallFrame::inout), or the
//!    `_in_place` variants that let the engine write into the container),
//! 4. [`check`](CallFrame::check) each buffer; the first failure aborts,
//! 5. [`invoke`](CallFrame::invoke) the engine,
//! 6. copy writable buffers back into their containers, or
//!    [`finish`](Buffer::finish) the in-place ones.

use colmajor_buffer::{Buffer, Direction, In, InOut, MarshalError, Out, ShapeWarning};
use colmajor_traits::{
    ElementCast, EngineScalar, Meta, Probe, RawDataMut, ShapeSource, StorageOrder,
};

use crate::config::MarshalConfig;
use crate::engine::{Engine, EngineArgs};
use crate::resolve::{resolve_extent, resolve_storage_order};
use crate::{Error, Result};

/// Marshaling state of a single engine call.
#[derive(Debug)]
pub struct CallFrame {
    routine: &'static str,
    config: MarshalConfig,
    order: Option<StorageOrder>,
    warnings: Vec<ShapeWarning>,
}

impl CallFrame {
    pub fn new(routine: &'static str, config: MarshalConfig) -> Self {
        Self {
            routine,
            config,
            order: None,
            warnings: Vec::new(),
        }
    }

    #[inline]
    pub fn routine(&self) -> &'static str {
        self.routine
    }

    #[inline]
    pub fn config(&self) -> &MarshalConfig {
        &self.config
    }

    /// Settle the call-wide storage order from the candidates.
    pub fn agree_order(&mut self, candidates: &[&dyn ShapeSource]) -> StorageOrder {
        let order = resolve_storage_order(self.config.default_order, candidates);
        tracing::debug!(routine = self.routine, ?order, "storage order agreed");
        self.order = Some(order);
        order
    }

    /// The agreed storage order, or the configured default before agreement.
    #[inline]
    pub fn order(&self) -> StorageOrder {
        self.order.unwrap_or(self.config.default_order)
    }

    /// Size of one problem dimension; `0` when every candidate is null.
    pub fn extent(&self, name: &'static str, candidates: &[(&dyn ShapeSource, usize)]) -> Result<usize> {
        Ok(resolve_extent(candidates).require(name)?)
    }

    pub fn input<'a, E, C>(&self, name: &'static str, container: &'a C) -> Result<Buffer<'a, E, In>>
    where
        E: EngineScalar,
        C: Probe + ?Sized,
        C::Elem: ElementCast<E>,
    {
        Ok(Buffer::<E, In>::from_container(name, container, self.order())?)
    }

    pub fn output<E, C>(&self, name: &'static str, container: &C) -> Result<Buffer<'static, E, Out>>
    where
        E: EngineScalar,
        C: Probe + ?Sized,
        C::Elem: ElementCast<E>,
    {
        Ok(Buffer::<E, Out>::from_container(name, container, self.order())?)
    }

    pub fn inout<E, C>(&self, name: &'static str, container: &C) -> Result<Buffer<'static, E, InOut>>
    where
        E: EngineScalar,
        C: Probe + ?Sized,
        C::Elem: ElementCast<E>,
    {
        Ok(Buffer::<E, InOut>::from_container(name, container, self.order())?)
    }

    /// Output the engine writes into `container` directly when it can.
    /// Call [`Buffer::finish`] once the engine has run.
    pub fn output_in_place<'a, E, C>(&self, name: &'static str, container: &'a mut C) -> Result<Buffer<'a, E, Out>>
    where
        E: EngineScalar + ElementCast<C::Elem>,
        C: Probe + RawDataMut + ?Sized,
        C::Elem: ElementCast<E>,
    {
        Ok(Buffer::<E, Out>::in_place(name, container, self.order())?)
    }

    /// Input-output argument updated in `container` directly when it can.
    /// Call [`Buffer::finish`] once the engine has run.
    pub fn inout_in_place<'a, E, C>(&self, name: &'static str, container: &'a mut C) -> Result<Buffer<'a, E, InOut>>
    where
        E: EngineScalar + ElementCast<C::Elem>,
        C: Probe + RawDataMut + ?Sized,
        C::Elem: ElementCast<E>,
    {
        Ok(Buffer::<E, InOut>::in_place(name, container, self.order())?)
    }

    /// Validate a required argument against `expected_extents`.
    ///
    /// A null buffer fails. Matrix arguments are also checked against the
    /// agreed order.
    pub fn check<E: EngineScalar, D: Direction>(
        &mut self,
        buffer: &Buffer<'_, E, D>,
        expected_extents: &[usize],
    ) -> Result<()> {
        if buffer.is_null() {
            return Err(MarshalError::NullBuffer {
                name: buffer.name(),
            }
            .into());
        }
        self.validate(buffer, expected_extents)
    }

    /// Validate an optional argument; a null buffer passes.
    pub fn check_optional<E: EngineScalar, D: Direction>(
        &mut self,
        buffer: &Buffer<'_, E, D>,
        expected_extents: &[usize],
    ) -> Result<()> {
        if buffer.is_null() {
            return Ok(());
        }
        self.validate(buffer, expected_extents)
    }

    fn validate<E: EngineScalar, D: Direction>(
        &mut self,
        buffer: &Buffer<'_, E, D>,
        expected_extents: &[usize],
    ) -> Result<()> {
        let expected_order = if expected_extents.len() > 1 {
            Meta::from_value(self.order().is_column_major())
        } else {
            Meta::unset()
        };
        if let Some(warning) = buffer.check(expected_extents, expected_order, self.config.policy)? {
            self.warnings.push(warning);
        }
        Ok(())
    }

    /// Leading dimension of a matrix argument.
    pub fn leading_dimension<E: EngineScalar, D: Direction>(
        &self,
        buffer: &Buffer<'_, E, D>,
        minimum: usize,
    ) -> usize {
        buffer.leading_dimension(minimum)
    }

    /// Second leading dimension of a 3D argument.
    pub fn second_dimension<E: EngineScalar, D: Direction>(
        &self,
        buffer: &Buffer<'_, E, D>,
        minimum: usize,
    ) -> usize {
        buffer.second_dimension(minimum)
    }

    /// Fresh argument list in the agreed order.
    pub fn args<'b>(&self) -> EngineArgs<'b> {
        EngineArgs::new(self.order())
    }

    /// Call the engine; a non-zero code becomes [`Error::Engine`].
    pub fn invoke<G: Engine + ?Sized>(&self, engine: &mut G, args: &mut EngineArgs<'_>) -> Result<()> {
        tracing::debug!(
            routine = self.routine,
            arrays = args.arrays.len(),
            order = ?args.order,
            "invoking engine"
        );
        let status = engine.call(args);
        if status.is_ok() {
            return Ok(());
        }
        let message = status.message();
        tracing::debug!(routine = self.routine, code = status.code, %message, "engine failed");
        Err(Error::Engine {
            routine: self.routine,
            code: status.code,
            message,
        })
    }

    /// Warnings collected by [`check`](CallFrame::check) so far.
    pub fn warnings(&self) -> &[ShapeWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<ShapeWarning> {
        std::mem::take(&mut self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineStatus;
    use colmajor_buffer::MissingMetadataPolicy;
    use colmajor_traits::{DenseArray, RawData};

    struct Bare(Vec<f64>);

    impl RawData for Bare {
        type Elem = f64;
        fn raw_data(&self) -> Option<&[f64]> {
            Some(&self.0)
        }
    }

    impl Probe for Bare {}

    #[test]
    fn test_order_defaults_until_agreed() {
        let mut frame = CallFrame::new(
            "r",
            MarshalConfig::new().with_default_order(StorageOrder::RowMajor),
        );
        assert_eq!(frame.order(), StorageOrder::RowMajor);
        let a = DenseArray::<f64>::col_major(&[2, 2]);
        assert_eq!(frame.agree_order(&[&a]), StorageOrder::ColumnMajor);
        assert_eq!(frame.order(), StorageOrder::ColumnMajor);
    }

    #[test]
    fn test_check_null_required_fails() {
        let mut frame = CallFrame::new("r", MarshalConfig::default());
        let absent: Option<Vec<f64>> = None;
        let b = frame.input::<f64, _>("x", &absent).unwrap();
        assert!(matches!(
            frame.check(&b, &[3]),
            Err(Error::Marshal(MarshalError::NullBuffer { name: "x" }))
        ));
        assert!(frame.check_optional(&b, &[3]).is_ok());
    }

    #[test]
    fn test_warnings_accumulate() {
        let mut frame = CallFrame::new(
            "r",
            MarshalConfig::new().with_policy(MissingMetadataPolicy::MissingAsWarning),
        );
        let c = Bare(vec![0.0; 3]);
        let b = frame.input::<f64, _>("c", &c).unwrap();
        frame.check(&b, &[3]).unwrap();
        assert_eq!(frame.warnings().len(), 1);
        assert_eq!(frame.warnings()[0].name, "c");
        assert_eq!(frame.take_warnings().len(), 1);
        assert!(frame.warnings().is_empty());
    }

    #[test]
    fn test_matrix_checked_against_agreed_order() {
        let mut frame = CallFrame::new("r", MarshalConfig::default());
        frame.agree_order(&[]);
        let a = DenseArray::<f64>::row_major(&[2, 3]);
        let b = frame.input::<f64, _>("a", &a).unwrap();
        assert!(frame.check(&b, &[2, 3]).is_ok());

        let r = Buffer::<f64, In>::from_container("a", &a, StorageOrder::RowMajor).unwrap();
        assert!(frame.check(&r, &[2, 3]).is_err());
    }

    #[test]
    fn test_invoke_maps_status() {
        let frame = CallFrame::new("dpotrf", MarshalConfig::default());
        let mut failing = |_: &mut EngineArgs<'_>| EngineStatus::failed(2, "not positive definite");
        let mut args = frame.args();
        let err = frame.invoke(&mut failing, &mut args).unwrap_err();
        match err {
            Error::Engine { routine, code, message } => {
                assert_eq!(routine, "dpotrf");
                assert_eq!(code, 2);
                assert_eq!(message, "not positive definite");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
