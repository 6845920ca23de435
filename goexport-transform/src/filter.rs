//! Generated-file detection

use memchr::memmem;

/// Marker that tools such as `stringer` and `protoc-gen-go` leave in their output
pub const GENERATED_MARKER: &str = "DO NOT EDIT.";

/// Check whether raw file content carries the generated-file marker.
///
/// Works on bytes so it runs before any decoding or parsing.
pub fn is_generated(content: &[u8], marker: &str) -> bool {
    !marker.is_empty() && memmem::find(content, marker.as_bytes()).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_marker_anywhere() {
        let header = b"// Code generated by stringer; DO NOT EDIT.\n\npackage x\n";
        assert!(is_generated(header, GENERATED_MARKER));

        let trailing = b"package x\n\nvar s = 1 // DO NOT EDIT.";
        assert!(is_generated(trailing, GENERATED_MARKER));
    }

    #[test]
    fn test_requires_exact_marker() {
        assert!(!is_generated(b"// do not edit.\npackage x\n", GENERATED_MARKER));
        assert!(!is_generated(b"// DO NOT EDIT\npackage x\n", GENERATED_MARKER));
    }

    #[test]
    fn test_non_utf8_content() {
        let mut content = vec![0xff, 0xfe];
        content.extend_from_slice(GENERATED_MARKER.as_bytes());
        assert!(is_generated(&content, GENERATED_MARKER));
    }

    #[test]
    fn test_empty_marker_disables_filter() {
        assert!(!is_generated(b"DO NOT EDIT.", ""));
    }
}
