//! Date format recovery from keystroke scripts.
//!
//! Acrobat date pickers validate input with a keystroke action such as
//! `AFDate_KeystrokeEx("mm/dd/yyyy");`. The pattern is the first quoted
//! argument of that call.

/// Call prefix that introduces the date pattern.
pub const DATE_KEYSTROKE_MARKER: &str = "AFDate_KeystrokeEx(\"";

/// Extract the date pattern from a keystroke script.
///
/// Returns the text between the first [`DATE_KEYSTROKE_MARKER`] and the
/// following `"`. Returns `""` when the marker is missing or the argument is
/// unterminated.
pub fn extract_date_format(script: &str) -> &str {
    let Some(start) = script.find(DATE_KEYSTROKE_MARKER) else {
        return "";
    };
    let rest = &script[start + DATE_KEYSTROKE_MARKER.len()..];
    match rest.find('"') {
        Some(end) => &rest[..end],
        None => "",
    }
}
