//! Bootstrap configuration.
//!
//! The hosting page declares the loader's configuration inline, as a
//! `&`-separated list of `key=value` pairs on a marker element:
//!
//! ```html
//! <script id="readygate" src="readygate.js"
//!         data="dep=jquery|vue&jb=http://cdn/js/&err=1"></script>
//! ```
//!
//! Parsing never fails. Unknown keys and malformed entries are skipped and
//! recorded in [`Config::ignored`] so a host can surface them if it wants to.

use readygate_common::url::split_module_list;
use readygate_dom::DomTree;
use serde::Serialize;

use crate::resource::Scope;

/// Default base for remote scripts.
pub const DEFAULT_JS_BASE_URL: &str = "http://repo.bfw.wiki/bfwrepo/js/";

/// Default base for remote stylesheets.
pub const DEFAULT_CSS_BASE_URL: &str = "http://repo.bfw.wiki/bfwrepo/css/";

/// Default base for local scripts and stylesheets.
pub const DEFAULT_USER_BASE_URL: &str = "/";

/// Attribute on the marker element that carries the configuration.
pub const MARKER_ATTRIBUTE: &str = "data";

/// Parsed loader configuration. Immutable once the page is bootstrapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// `dep`: dependency modules, in declared order. Empty entries are kept.
    pub dependencies: Vec<String>,
    /// `jb`: base prefix for remote scripts.
    pub js_base_url: String,
    /// `cb`: base prefix for remote stylesheets.
    pub css_base_url: String,
    /// `ujb`: base prefix for local scripts.
    pub user_js_base_url: String,
    /// `ucb`: base prefix for local stylesheets.
    pub user_css_base_url: String,
    /// `err`: debug mode. Only the exact value `1` enables it.
    pub show_errors: bool,
    /// `loadjs`: local scripts loaded once the ready gate opens.
    pub user_load_js: Vec<String>,
    /// `loadcss`: local stylesheets loaded at bootstrap.
    pub user_load_css: Vec<String>,
    /// `loadpara`: opaque pass-through value for page code.
    pub load_parameter: Option<String>,
    /// Entries that were skipped: missing `=`, empty key or unknown key.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dependencies: Vec::new(),
            js_base_url: DEFAULT_JS_BASE_URL.to_string(),
            css_base_url: DEFAULT_CSS_BASE_URL.to_string(),
            user_js_base_url: DEFAULT_USER_BASE_URL.to_string(),
            user_css_base_url: DEFAULT_USER_BASE_URL.to_string(),
            show_errors: false,
            user_load_js: Vec::new(),
            user_load_css: Vec::new(),
            load_parameter: None,
            ignored: Vec::new(),
        }
    }
}

impl Config {
    /// Parse an attribute string. `None` (no marker, or no attribute) yields
    /// the default configuration.
    ///
    /// Each `&`-separated entry is split at its first `=`. An entry with no
    /// `=`, or with `=` in first position, is skipped. A repeated key
    /// overrides the earlier value.
    #[must_use]
    pub fn parse(attribute: Option<&str>) -> Self {
        let mut config = Self::default();
        let Some(attribute) = attribute else {
            return config;
        };

        for entry in attribute.split('&') {
            let Some((key, value)) = entry.split_once('=').filter(|(key, _)| !key.is_empty())
            else {
                if !entry.is_empty() {
                    config.ignored.push(entry.to_string());
                }
                continue;
            };

            match key {
                "dep" => config.dependencies = dependency_list(value),
                "jb" => config.js_base_url = value.to_string(),
                "cb" => config.css_base_url = value.to_string(),
                "ujb" => config.user_js_base_url = value.to_string(),
                "ucb" => config.user_css_base_url = value.to_string(),
                "err" => config.show_errors = value == "1",
                "loadjs" => config.user_load_js = module_list(value),
                "loadcss" => config.user_load_css = module_list(value),
                "loadpara" => config.load_parameter = Some(value.to_string()),
                _ => config.ignored.push(entry.to_string()),
            }
        }

        config
    }

    /// Read the configuration from the `data` attribute of the element whose
    /// id is `marker_id`.
    #[must_use]
    pub fn from_document(dom: &DomTree, marker_id: &str) -> Self {
        let attribute = dom
            .get_element_by_id(marker_id)
            .and_then(|marker| dom.attribute(marker, MARKER_ATTRIBUTE));
        Self::parse(attribute)
    }

    /// Script base prefix for a scope.
    #[must_use]
    pub fn js_base(&self, scope: Scope) -> &str {
        match scope {
            Scope::Local => &self.user_js_base_url,
            Scope::Remote => &self.js_base_url,
        }
    }

    /// Stylesheet base prefix for a scope.
    #[must_use]
    pub fn css_base(&self, scope: Scope) -> &str {
        match scope {
            Scope::Local => &self.user_css_base_url,
            Scope::Remote => &self.css_base_url,
        }
    }
}

fn module_list(value: &str) -> Vec<String> {
    split_module_list(value).map(str::to_string).collect()
}

/// Empty segments are kept: only the last entry gates readiness, and an
/// empty last entry resolves at once.
fn dependency_list(value: &str) -> Vec<String> {
    value.split('|').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_list_skips_empty_segments() {
        assert_eq!(module_list("a||b"), vec!["a", "b"]);
        assert!(module_list("").is_empty());
    }

    #[test]
    fn test_dependency_list_keeps_empty_segments() {
        assert_eq!(dependency_list("a|"), vec!["a", ""]);
        assert_eq!(dependency_list("a||b"), vec!["a", "", "b"]);
        assert_eq!(dependency_list(""), vec![""]);
    }

    #[test]
    fn test_base_selection_by_scope() {
        let config = Config::parse(Some("jb=R/&ujb=L/&cb=RC/&ucb=LC/"));
        assert_eq!(config.js_base(Scope::Remote), "R/");
        assert_eq!(config.js_base(Scope::Local), "L/");
        assert_eq!(config.css_base(Scope::Remote), "RC/");
        assert_eq!(config.css_base(Scope::Local), "LC/");
    }
}
