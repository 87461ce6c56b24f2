//! Opaque state carried between engine calls.

/// Communication array some engine routines fill on an initialising call
/// and read on later ones. The marshaling layer never interprets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommBlob {
    data: Vec<i64>,
}

impl CommBlob {
    /// A zeroed blob of `len` words.
    pub fn new(len: usize) -> Self {
        Self { data: vec![0; len] }
    }

    /// Whether an engine has written anything into the blob.
    pub fn is_initialized(&self) -> bool {
        self.data.iter().any(|&w| w != 0)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [i64] {
        &mut self.data
    }

    pub fn as_mut_ptr(&mut self) -> *mut i64 {
        self.data.as_mut_ptr()
    }

    /// Zero the blob so the next call re-initialises it.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialised_after_write() {
        let mut c = CommBlob::new(4);
        assert!(!c.is_initialized());
        c.as_mut_slice()[2] = 17;
        assert!(c.is_initialized());
        c.reset();
        assert!(!c.is_initialized());
        assert_eq!(c.len(), 4);
    }
}
