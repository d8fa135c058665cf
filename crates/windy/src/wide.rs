use widestring::U16CString;

/// UTF-16 copy of `text` with a trailing nul, cut at the first interior nul.
pub fn to_wide(text: &str) -> U16CString {
    U16CString::from_str_truncate(text)
}

/// Decodes a nul-terminated UTF-16 buffer such as an adapter description.
pub fn from_wide(buffer: &[u16]) -> String {
    let end = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    String::from_utf16_lossy(&buffer[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_strings_end_with_nul() {
        let wide = to_wide("Cube");
        assert_eq!(wide.as_slice_with_nul(), &[67, 117, 98, 101, 0]);
    }

    #[test]
    fn interior_nul_truncates() {
        assert_eq!(to_wide("a\0b").as_slice(), &[97]);
    }

    #[test]
    fn fixed_buffers_stop_at_the_first_nul() {
        let mut description = [0u16; 128];
        for (slot, c) in description.iter_mut().zip("Microsoft Basic Render Driver".encode_utf16()) {
            *slot = c;
        }
        assert_eq!(from_wide(&description), "Microsoft Basic Render Driver");
    }
}
