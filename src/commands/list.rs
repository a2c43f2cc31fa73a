use anyhow::Result;
use log::debug;
use serde::Serialize;
use std::io::{self, Write};

use super::{OutputOptions, print_diagnostics};
use crate::dpkg::PackageRecord;
use crate::runtime::Runtime;
use crate::selection::{Sources, resolve_user_installed};

#[derive(Serialize, Debug)]
struct ListedPackage<'a> {
    package: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a str>,
}

/// List the packages explicitly installed by the user
#[tracing::instrument(skip(runtime))]
pub fn list<R: Runtime>(runtime: &R, sources: &Sources, options: OutputOptions) -> Result<()> {
    let stdout = io::stdout();
    let stderr = io::stderr();
    list_with_io(runtime, sources, options, &mut stdout.lock(), &mut stderr.lock())
}

/// [`list`] writing to arbitrary streams.
pub fn list_with_io<R: Runtime, O: Write, E: Write>(
    runtime: &R,
    sources: &Sources,
    options: OutputOptions,
    out: &mut O,
    err: &mut E,
) -> Result<()> {
    let resolution = resolve_user_installed(runtime, sources);
    print_diagnostics(&resolution.diagnostics, err)?;

    let packages = resolution.sorted();
    debug!("{} user-installed package(s)", packages.len());

    if options.json {
        let listed: Vec<ListedPackage> = packages
            .iter()
            .map(|&record| ListedPackage {
                package: record.name().unwrap_or_default(),
                summary: options.verbose.then_some(record.summary()),
            })
            .collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&listed)?)?;
        return Ok(());
    }

    if packages.is_empty() {
        writeln!(out, "No user-installed packages found.")?;
        return Ok(());
    }

    writeln!(
        out,
        "Found {} packages explicitly installed by user:",
        packages.len()
    )?;
    for record in packages {
        print_package(out, record, options.verbose)?;
    }

    Ok(())
}

fn print_package<W: Write>(out: &mut W, record: &PackageRecord, verbose: bool) -> Result<()> {
    let name = record.name().unwrap_or_default();
    if verbose {
        writeln!(out, "{:<30} - {}", name, record.summary())?;
    } else {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}
