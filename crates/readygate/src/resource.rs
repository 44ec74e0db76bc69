//! Resource identity: scope, kind and module name.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Where a resource is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Default, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Served relative to the host page (`ujb`/`ucb` bases).
    Local,
    /// Served from the shared content base (`jb`/`cb` bases).
    #[default]
    Remote,
}

impl Scope {
    /// Interpret the positional scope parameter: `"local"` selects
    /// [`Scope::Local`], anything else (including empty) is remote.
    #[must_use]
    pub fn from_param(param: &str) -> Self {
        if param == "local" {
            Self::Local
        } else {
            Self::Remote
        }
    }
}

/// Script or stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    /// A `<script>` resource.
    Js,
    /// A `<link rel="stylesheet">` resource.
    Css,
}

/// Registry key: at most one injection per `(scope, kind, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    /// Serving scope.
    pub scope: Scope,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Module name, without base or suffix.
    pub name: String,
}

impl ResourceKey {
    /// Build a key.
    #[must_use]
    pub fn new(scope: Scope, kind: ResourceKind, name: &str) -> Self {
        Self {
            scope,
            kind,
            name: name.to_string(),
        }
    }

    /// Key for a script.
    #[must_use]
    pub fn script(scope: Scope, name: &str) -> Self {
        Self::new(scope, ResourceKind::Js, name)
    }

    /// Key for a stylesheet.
    #[must_use]
    pub fn stylesheet(scope: Scope, name: &str) -> Self {
        Self::new(scope, ResourceKind::Css, name)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}.{}", self.scope, self.kind, self.name)
    }
}
