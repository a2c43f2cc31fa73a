use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};

use super::{OutputOptions, print_diagnostics};
use crate::runtime::Runtime;
use crate::selection::{Selection, Sources, Verdict};

#[derive(Serialize, Debug)]
struct Explanation<'a> {
    package: &'a str,
    verdict: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

/// Explain why a package is or is not reported as user-installed
#[tracing::instrument(skip(runtime))]
pub fn why<R: Runtime>(
    runtime: &R,
    sources: &Sources,
    package: &str,
    options: OutputOptions,
) -> Result<()> {
    let stdout = io::stdout();
    let stderr = io::stderr();
    why_with_io(
        runtime,
        sources,
        package,
        options,
        &mut stdout.lock(),
        &mut stderr.lock(),
    )
}

pub fn why_with_io<R: Runtime, O: Write, E: Write>(
    runtime: &R,
    sources: &Sources,
    package: &str,
    options: OutputOptions,
    out: &mut O,
    err: &mut E,
) -> Result<()> {
    let selection = Selection::load(runtime, sources);
    print_diagnostics(&selection.diagnostics, err)?;

    let verdict = selection.verdict(package);

    if options.json {
        let (label, detail) = match &verdict {
            Verdict::UserSelected => ("user-selected", None),
            Verdict::AutoInstalled => ("auto-installed", None),
            Verdict::Essential(reason) => ("essential", Some(reason.to_string())),
            Verdict::NotInstalled { status } => ("not-installed", status.clone()),
            Verdict::Unknown => ("unknown", None),
        };
        let explanation = Explanation {
            package,
            verdict: label,
            detail,
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&explanation)?)?;
        return Ok(());
    }

    match verdict {
        Verdict::UserSelected => writeln!(out, "{} was explicitly installed by the user", package)?,
        Verdict::AutoInstalled => writeln!(
            out,
            "{} was installed automatically as a dependency",
            package
        )?,
        Verdict::Essential(reason) => {
            writeln!(out, "{} is part of the base system ({})", package, reason)?
        }
        Verdict::NotInstalled { status } => writeln!(
            out,
            "{} is not installed (status: {})",
            package,
            status.as_deref().unwrap_or("unknown")
        )?,
        Verdict::Unknown => writeln!(out, "{} is not known to dpkg", package)?,
    }

    Ok(())
}
