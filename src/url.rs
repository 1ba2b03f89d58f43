//! URL construction for the OneDrive v1.0 API.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Base URL for the OneDrive v1.0 API. Not configurable.
pub const API_BASE: &str = "https://api.onedrive.com/v1.0";

/// Characters escaped when encoding an API path.
///
/// The whole path is encoded in one pass, so `/` must stay unescaped for
/// nested segments to keep routing. The RFC 3986 unreserved characters are
/// left alone as well; everything else is percent-encoded.
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode an API path, preserving segment separators.
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ENCODE_SET).to_string()
}

/// Build a full request URL from an API path like `/drives/me/root`.
pub fn build_url(path: &str) -> String {
    format!("{}{}", API_BASE, encode_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path_unchanged() {
        assert_eq!(encode_path("/drives/me/root"), "/drives/me/root");
    }

    #[test]
    fn test_slashes_preserved_in_nested_path() {
        let path = "/drives/me/items/ABC123/children";
        assert_eq!(encode_path(path), path);
        assert_eq!(
            build_url(path),
            "https://api.onedrive.com/v1.0/drives/me/items/ABC123/children"
        );
    }

    #[test]
    fn test_special_characters_escaped() {
        assert_eq!(encode_path("/drives/a b"), "/drives/a%20b");
        assert_eq!(encode_path("/items/x#y"), "/items/x%23y");
        assert_eq!(encode_path("/items/x?y"), "/items/x%3Fy");
    }

    #[test]
    fn test_unreserved_characters_untouched() {
        assert_eq!(encode_path("/items/a-b_c.d~e"), "/items/a-b_c.d~e");
    }

    #[test]
    fn test_build_url_prefixes_api_base() {
        assert_eq!(build_url("/drives"), "https://api.onedrive.com/v1.0/drives");
    }
}
