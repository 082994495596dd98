//! String handling utilities
//!
//! ISO9660 identifiers come in several encodings: single-byte d-characters
//! and a-characters on the primary volume, UCS-2 big-endian on Joliet, and
//! whatever the authoring host used for Rock Ridge names.

use alloc::string::String;

use crate::options::TextEncoding;

/// Stand-in for `/`, which cannot appear inside a path component
pub const SLASH_SUBSTITUTE: char = '\u{2215}';

/// Trim trailing spaces from byte slice
pub fn trim_trailing_spaces(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == b' ' {
        end -= 1;
    }
    &bytes[..end]
}

/// Decode UTF-16 big-endian code units, unpaired surrogates replaced
pub fn decode_utf16be(bytes: &[u8]) -> String {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Decode a name field
///
/// Joliet names are UTF-16BE, everything else uses `encoding`.
pub fn decode_text(bytes: &[u8], encoding: TextEncoding, joliet: bool) -> String {
    if joliet {
        return decode_utf16be(bytes);
    }

    match encoding {
        TextEncoding::Iso8859_1 => bytes.iter().map(|&b| b as char).collect(),
        TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Normalise a decoded directory record name
///
/// Replaces `/`, turns `NAME.;1` into `NAME;1`, drops a trailing `.` and, for
/// Joliet, the `;1` some authoring tools append.
pub fn normalize_filename(name: &str, fold_version: bool) -> String {
    let mut name: String = name
        .chars()
        .map(|c| if c == '/' { SLASH_SUBSTITUTE } else { c })
        .collect();

    // Only Rock Ridge may keep a trailing dot; NM restores it
    if name.ends_with('.') {
        name.pop();
    }

    if name.ends_with(".;1") {
        name.truncate(name.len() - 3);
        name.push_str(";1");
    }

    if fold_version && name.ends_with(";1") {
        name.truncate(name.len() - 2);
    }

    name
}

/// Strip the `;1` version suffix (e.g., "FILE.TXT;1" -> "FILE.TXT")
pub fn strip_version(name: &str) -> &str {
    name.strip_suffix(";1").unwrap_or(name)
}
