use log::debug;
use std::collections::BTreeSet;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use super::stanza::{Continuation, Stanza, Stanzas};
use crate::error::SourceError;
use crate::runtime::Runtime;

pub const DEFAULT_EXTENDED_STATES_PATH: &str = "/var/lib/apt/extended_states";

/// Collect the names apt has marked `Auto-Installed: 1`.
#[tracing::instrument(skip(runtime))]
pub fn parse_extended_states<R: Runtime>(
    runtime: &R,
    path: &Path,
) -> Result<BTreeSet<String>, SourceError> {
    let file = runtime
        .open(path)
        .map_err(|e| SourceError::from_runtime(path, e))?;

    let auto_installed =
        read_extended_states(BufReader::new(file)).map_err(|e| SourceError::from_io(path, e))?;

    debug!(
        "{} package(s) marked auto-installed in {:?}",
        auto_installed.len(),
        path
    );
    Ok(auto_installed)
}

pub fn read_extended_states<B: BufRead>(reader: B) -> io::Result<BTreeSet<String>> {
    let mut auto_installed = BTreeSet::new();
    for stanza in Stanzas::from_reader(reader, Continuation::Ignore) {
        if let Some(name) = auto_installed_name(&stanza?) {
            auto_installed.insert(name.to_string());
        }
    }
    Ok(auto_installed)
}

fn auto_installed_name(stanza: &Stanza) -> Option<&str> {
    let name = stanza.get("Package").filter(|n| !n.is_empty())?;
    (stanza.get("Auto-Installed") == Some("1")).then_some(name)
}
