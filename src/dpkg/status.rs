use log::debug;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use super::record::PackageRecord;
use super::stanza::{Continuation, Stanzas};
use crate::error::SourceError;
use crate::runtime::Runtime;

pub const DEFAULT_STATUS_PATH: &str = "/var/lib/dpkg/status";

/// Read every package stanza of a dpkg status database, in file order.
#[tracing::instrument(skip(runtime))]
pub fn parse_status<R: Runtime>(
    runtime: &R,
    path: &Path,
) -> Result<Vec<PackageRecord>, SourceError> {
    let file = runtime
        .open(path)
        .map_err(|e| SourceError::from_runtime(path, e))?;

    let records =
        read_status(BufReader::new(file)).map_err(|e| SourceError::from_io(path, e))?;

    debug!("Read {} package record(s) from {:?}", records.len(), path);
    Ok(records)
}

/// Parse status stanzas from any buffered reader.
pub fn read_status<B: BufRead>(reader: B) -> io::Result<Vec<PackageRecord>> {
    Stanzas::from_reader(reader, Continuation::Append)
        .map(|stanza| stanza.map(PackageRecord::from))
        .collect()
}
