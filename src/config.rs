//! Per-call marshaling configuration.

use colmajor_buffer::MissingMetadataPolicy;
use colmajor_traits::StorageOrder;

/// Settings one engine call is marshaled under.
///
/// Passed explicitly to [`CallFrame::new`](crate::CallFrame::new); there is
/// no process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarshalConfig {
    /// How unknown shape metadata is treated by validation.
    pub policy: MissingMetadataPolicy,
    /// Storage order used when no argument reports one.
    pub default_order: StorageOrder,
}

impl MarshalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: MissingMetadataPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_default_order(mut self, order: StorageOrder) -> Self {
        self.default_order = order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = MarshalConfig::new();
        assert_eq!(c.policy, MissingMetadataPolicy::IgnoreMissing);
        assert_eq!(c.default_order, StorageOrder::ColumnMajor);
    }

    #[test]
    fn test_builder() {
        let c = MarshalConfig::new()
            .with_policy(MissingMetadataPolicy::MissingAsError)
            .with_default_order(StorageOrder::RowMajor);
        assert_eq!(c.policy, MissingMetadataPolicy::MissingAsError);
        assert_eq!(c.default_order, StorageOrder::RowMajor);
    }
}
