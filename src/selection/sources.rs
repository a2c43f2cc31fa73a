use log::debug;
use std::path::{Path, PathBuf};

use crate::dpkg::{DEFAULT_EXTENDED_STATES_PATH, DEFAULT_STATUS_PATH};

/// Locations of the two databases a selection is computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    pub status: PathBuf,
    pub extended_states: PathBuf,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            status: PathBuf::from(DEFAULT_STATUS_PATH),
            extended_states: PathBuf::from(DEFAULT_EXTENDED_STATES_PATH),
        }
    }
}

impl Sources {
    /// Default locations below an alternative filesystem root, like `dpkg --root`.
    pub fn under_root(root: &Path) -> Self {
        Self {
            status: reroot(root, DEFAULT_STATUS_PATH),
            extended_states: reroot(root, DEFAULT_EXTENDED_STATES_PATH),
        }
    }

    /// Explicit paths win; anything left unset falls back to the default
    /// location, re-rooted when `root` is given.
    pub fn resolve(
        root: Option<PathBuf>,
        status: Option<PathBuf>,
        extended_states: Option<PathBuf>,
    ) -> Self {
        let base = match root {
            Some(root) => Self::under_root(&root),
            None => Self::default(),
        };
        let sources = Self {
            status: status.unwrap_or(base.status),
            extended_states: extended_states.unwrap_or(base.extended_states),
        };
        debug!("Using sources: {:?}", sources);
        sources
    }
}

fn reroot(root: &Path, absolute: &str) -> PathBuf {
    root.join(absolute.trim_start_matches('/'))
}
