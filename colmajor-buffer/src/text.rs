//! Fixed-width, space-padded character buffers.
//!
//! The engine takes string options as `count` fields of exactly `width`
//! bytes each, padded with spaces and never NUL-terminated.

/// `count` strings packed at a fixed stride of `width` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedWidthText {
    bytes: Vec<u8>,
    width: usize,
    count: usize,
}

/// Longest prefix of `s` that fits in `width` bytes without splitting a char.
fn fit(s: &str, width: usize) -> &str {
    let mut end = width.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

impl FixedWidthText {
    /// One field of `width` bytes, truncated if `s` is longer.
    pub fn pack(s: &str, width: usize) -> Self {
        Self::pack_all(&[s], Some(width))
    }

    /// Pack every string at a common stride.
    ///
    /// `width` defaults to the longest string's length in bytes.
    pub fn pack_all<S: AsRef<str>>(strings: &[S], width: Option<usize>) -> Self {
        let width =
            width.unwrap_or_else(|| strings.iter().map(|s| s.as_ref().len()).max().unwrap_or(0));
        let mut text = Self::allocate(strings.len(), width);
        for (field, s) in text.bytes.chunks_exact_mut(width.max(1)).zip(strings) {
            let s = fit(s.as_ref(), width);
            field[..s.len()].copy_from_slice(s.as_bytes());
        }
        text
    }

    /// `count` blank fields for the engine to fill.
    pub fn allocate(count: usize, width: usize) -> Self {
        Self {
            bytes: vec![b' '; count * width],
            width,
            count,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.bytes.as_mut_ptr()
    }

    /// Field `i` with trailing padding removed.
    pub fn field(&self, i: usize) -> Option<String> {
        if i >= self.count {
            return None;
        }
        let raw = &self.bytes[i * self.width..(i + 1) * self.width];
        let text = String::from_utf8_lossy(raw);
        Some(text.trim_end_matches([' ', '\0']).to_owned())
    }

    /// Every field with trailing padding removed.
    pub fn unpack(&self) -> Vec<String> {
        (0..self.count).filter_map(|i| self.field(i)).collect()
    }

    /// Replace the contents of `out` with the unpacked fields.
    pub fn copy_back(&self, out: &mut Vec<String>) {
        out.clear();
        out.extend(self.unpack());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_pads_with_spaces() {
        let t = FixedWidthText::pack("ab", 5);
        assert_eq!(t.as_bytes(), b"ab   ");
        assert_eq!(t.count(), 1);
        assert_eq!(t.unpack(), vec!["ab".to_string()]);
    }

    #[test]
    fn test_pack_truncates() {
        let t = FixedWidthText::pack("abcdef", 3);
        assert_eq!(t.as_bytes(), b"abc");
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let t = FixedWidthText::pack("aé", 2);
        assert_eq!(t.as_bytes(), b"a ");
    }

    #[test]
    fn test_pack_all_default_width() {
        let t = FixedWidthText::pack_all(&["x", "long", "mid"], None);
        assert_eq!(t.width(), 4);
        assert_eq!(t.as_bytes(), b"x   longmid ");
        assert_eq!(t.unpack(), vec!["x", "long", "mid"]);
    }

    #[test]
    fn test_allocate_and_copy_back() {
        let mut t = FixedWidthText::allocate(2, 4);
        let ptr = t.as_mut_ptr();
        // SAFETY: 8 bytes are allocated.
        unsafe {
            std::ptr::copy_nonoverlapping(b"ok\0\0fail".as_ptr(), ptr, 8);
        }
        let mut out = vec!["stale".to_string()];
        t.copy_back(&mut out);
        assert_eq!(out, vec!["ok", "fail"]);
        assert_eq!(t.field(2), None);
    }

    #[test]
    fn test_zero_width_fields() {
        let t = FixedWidthText::pack_all(&["", ""], None);
        assert_eq!(t.width(), 0);
        assert_eq!(t.unpack(), vec!["", ""]);
    }
}
