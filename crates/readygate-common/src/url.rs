//! Resource URL construction.
//!
//! Injected resources are addressed by plain string concatenation of a
//! configured base prefix, the module name and a file suffix. No escaping and
//! no relative-reference resolution is applied: the base is expected to carry
//! its own trailing slash, exactly as written in the bootstrap attribute.

/// Suffix appended to script module names.
pub const SCRIPT_SUFFIX: &str = ".js";

/// Suffix appended to stylesheet module names.
pub const STYLESHEET_SUFFIX: &str = ".css";

/// Join a base prefix, a module name and a suffix.
///
/// ```
/// use readygate_common::url::{SCRIPT_SUFFIX, resource_url};
///
/// assert_eq!(resource_url("http://x/", "jquery", SCRIPT_SUFFIX), "http://x/jquery.js");
/// ```
#[must_use]
pub fn resource_url(base: &str, name: &str, suffix: &str) -> String {
    let mut url = String::with_capacity(base.len() + name.len() + suffix.len());
    url.push_str(base);
    url.push_str(name);
    url.push_str(suffix);
    url
}

/// Split a `|`-delimited module list, dropping empty segments.
///
/// `"a||b"` yields `["a", "b"]`; an empty string yields nothing.
pub fn split_module_list(list: &str) -> impl Iterator<Item = &str> {
    list.split('|').filter(|segment| !segment.is_empty())
}
