//! Stylesheet loader.

use readygate_common::url::{STYLESHEET_SUFFIX, resource_url};

use crate::error::LoaderError;
use crate::page::{Page, PageState};
use crate::resource::{ResourceKey, Scope};

impl PageState {
    pub(crate) fn load_stylesheet(&mut self, name: &str, scope: Scope) -> Result<(), LoaderError> {
        let head = self.dom.head().ok_or(LoaderError::MissingElement("head"))?;
        if !self
            .registry
            .mark_requested(ResourceKey::stylesheet(scope, name))
        {
            return Ok(());
        }

        let href = resource_url(self.config.css_base(scope), name, STYLESHEET_SUFFIX);
        let link = self.dom.create_element("link");
        let _ = self.dom.set_attribute(link, "type", "text/css");
        let _ = self.dom.set_attribute(link, "rel", "stylesheet");
        let _ = self.dom.set_attribute(link, "href", &href);
        self.dom.append_child(head, link);
        self.log_line(&format!("start downloading css {href}"));
        Ok(())
    }
}

impl Page {
    /// Inject `<link rel="stylesheet">` for `name` unless it was already
    /// requested in this scope. There is no completion callback.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::MissingElement`] if the document has no
    /// `<head>`.
    pub fn load_stylesheet(&self, name: &str, scope: Scope) -> Result<(), LoaderError> {
        self.state_mut().load_stylesheet(name, scope)
    }
}
