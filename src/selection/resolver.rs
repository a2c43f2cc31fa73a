use log::debug;
use std::collections::BTreeSet;

use super::essential::{EssentialReason, essential_packages, essential_reason};
use super::sources::Sources;
use crate::dpkg::{PackageRecord, parse_extended_states, parse_status};
use crate::error::SourceError;
use crate::runtime::Runtime;

/// Which database a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Database {
    Status,
    ExtendedStates,
}

/// A database that could not be read and was treated as empty.
#[derive(Debug)]
pub struct Diagnostic {
    pub database: Database,
    pub error: SourceError,
}

/// Everything loaded from the two databases, before filtering.
#[derive(Debug, Default)]
pub struct Selection {
    pub records: Vec<PackageRecord>,
    pub auto_installed: BTreeSet<String>,
    pub essential: BTreeSet<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// How one package is classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    UserSelected,
    AutoInstalled,
    Essential(EssentialReason),
    NotInstalled { status: Option<String> },
    Unknown,
}

impl Selection {
    /// Read the status database, then the extended states, then derive the
    /// essential set. An unreadable database is recorded as a diagnostic and
    /// treated as empty.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, sources: &Sources) -> Self {
        let mut diagnostics = Vec::new();

        let records = parse_status(runtime, &sources.status).unwrap_or_else(|error| {
            debug!("Treating dpkg status as empty: {}", error);
            diagnostics.push(Diagnostic {
                database: Database::Status,
                error,
            });
            Vec::new()
        });

        let auto_installed = parse_extended_states(runtime, &sources.extended_states)
            .unwrap_or_else(|error| {
                debug!("Treating apt extended_states as empty: {}", error);
                diagnostics.push(Diagnostic {
                    database: Database::ExtendedStates,
                    error,
                });
                BTreeSet::new()
            });

        let essential = essential_packages(&records);

        debug!(
            "Loaded {} record(s), {} auto-installed, {} essential",
            records.len(),
            auto_installed.len(),
            essential.len()
        );

        Self {
            records,
            auto_installed,
            essential,
            diagnostics,
        }
    }

    /// Installed records that are neither auto-installed nor essential, in
    /// file order.
    pub fn user_installed(&self) -> impl Iterator<Item = &PackageRecord> {
        self.records.iter().filter(|r| r.is_installed()).filter(|r| {
            r.name().is_some_and(|name| {
                !self.auto_installed.contains(name) && !self.essential.contains(name)
            })
        })
    }

    /// Classify `name` with the same rules as [`Selection::user_installed`].
    ///
    /// A status file may hold several stanzas for one name (one per
    /// architecture). The package counts as installed if any of them is.
    pub fn verdict(&self, name: &str) -> Verdict {
        let same: Vec<&PackageRecord> = self
            .records
            .iter()
            .filter(|r| r.name() == Some(name))
            .collect();
        let Some(first) = same.first() else {
            return Verdict::Unknown;
        };
        if !same.iter().any(|r| r.is_installed()) {
            return Verdict::NotInstalled {
                status: first.status().map(str::to_string),
            };
        }
        if self.essential.contains(name) {
            let reason = same
                .iter()
                .find_map(|r| essential_reason(r))
                .unwrap_or(EssentialReason::Essential);
            return Verdict::Essential(reason);
        }
        if self.auto_installed.contains(name) {
            return Verdict::AutoInstalled;
        }
        Verdict::UserSelected
    }

    pub fn into_resolution(self) -> Resolution {
        let packages = self.user_installed().cloned().collect();
        Resolution {
            packages,
            diagnostics: self.diagnostics,
        }
    }
}

/// The packages explicitly installed by the user.
#[derive(Debug, Default)]
pub struct Resolution {
    /// In status-file order.
    pub packages: Vec<PackageRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    /// The packages ordered by name for display. Ties keep file order.
    pub fn sorted(&self) -> Vec<&PackageRecord> {
        let mut sorted: Vec<&PackageRecord> = self.packages.iter().collect();
        sorted.sort_by(|a, b| a.name().cmp(&b.name()));
        sorted
    }
}

/// Compute the user-installed packages from the databases at `sources`.
#[tracing::instrument(skip(runtime))]
pub fn resolve_user_installed<R: Runtime>(runtime: &R, sources: &Sources) -> Resolution {
    Selection::load(runtime, sources).into_resolution()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::io::{self, Cursor};
    use std::path::PathBuf;

    fn sources() -> Sources {
        Sources {
            status: PathBuf::from("/test/status"),
            extended_states: PathBuf::from("/test/extended_states"),
        }
    }

    fn expect_file(runtime: &mut MockRuntime, path: PathBuf, content: &'static str) {
        runtime
            .expect_open()
            .with(eq(path))
            .returning(move |_| Ok(Box::new(Cursor::new(content.as_bytes()))));
    }

    fn expect_missing(runtime: &mut MockRuntime, path: PathBuf) {
        runtime
            .expect_open()
            .with(eq(path))
            .returning(|_| Err(io::Error::from(io::ErrorKind::NotFound).into()));
    }

    fn names(resolution: &Resolution) -> Vec<&str> {
        resolution.packages.iter().filter_map(|r| r.name()).collect()
    }

    const STATUS: &str = "\
Package: zsh
Status: install ok installed
Priority: optional

Package: bash
Essential: yes
Status: install ok installed
Priority: required

Package: libzstd1
Status: install ok installed
Priority: optional

Package: apt
Status: install ok installed
Priority: important

Package: emacs
Status: deinstall ok config-files
Priority: optional

Package: curl
Status: install ok installed
Priority: optional
";

    const EXTENDED_STATES: &str = "\
Package: libzstd1
Auto-Installed: 1

Package: curl
Auto-Installed: 0
";

    #[test]
    fn test_resolve_user_installed() {
        let mut runtime = MockRuntime::new();
        let sources = sources();
        expect_file(&mut runtime, sources.status.clone(), STATUS);
        expect_file(&mut runtime, sources.extended_states.clone(), EXTENDED_STATES);

        let resolution = resolve_user_installed(&runtime, &sources);

        assert_eq!(names(&resolution), vec!["zsh", "curl"]);
        assert!(resolution.diagnostics.is_empty());
    }

    #[test]
    fn test_resolve_sorted_for_display() {
        let mut runtime = MockRuntime::new();
        let sources = sources();
        expect_file(&mut runtime, sources.status.clone(), STATUS);
        expect_file(&mut runtime, sources.extended_states.clone(), EXTENDED_STATES);

        let resolution = resolve_user_installed(&runtime, &sources);
        let sorted: Vec<_> = resolution
            .sorted()
            .into_iter()
            .filter_map(|r| r.name())
            .collect();

        assert_eq!(sorted, vec!["curl", "zsh"]);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut runtime = MockRuntime::new();
        let sources = sources();
        expect_file(&mut runtime, sources.status.clone(), STATUS);
        expect_file(&mut runtime, sources.extended_states.clone(), EXTENDED_STATES);

        let first = resolve_user_installed(&runtime, &sources);
        let second = resolve_user_installed(&runtime, &sources);

        assert_eq!(first.packages, second.packages);
    }

    #[test_log::test]
    fn test_missing_extended_states_reports_every_eligible_package() {
        // foo is optional, bar is required: only foo is user-selected
        let mut runtime = MockRuntime::new();
        let sources = sources();
        expect_file(
            &mut runtime,
            sources.status.clone(),
            "Package: foo\nStatus: install ok installed\nPriority: optional\n\n\
             Package: bar\nStatus: install ok installed\nPriority: required\n",
        );
        expect_missing(&mut runtime, sources.extended_states.clone());

        let resolution = resolve_user_installed(&runtime, &sources);

        assert_eq!(names(&resolution), vec!["foo"]);
        assert_eq!(resolution.diagnostics.len(), 1);
        assert_eq!(resolution.diagnostics[0].database, Database::ExtendedStates);
        assert!(resolution.diagnostics[0].error.is_missing());
    }

    #[test]
    fn test_auto_installed_is_excluded() {
        let mut runtime = MockRuntime::new();
        let sources = sources();
        expect_file(
            &mut runtime,
            sources.status.clone(),
            "Package: baz\nStatus: install ok installed\n",
        );
        expect_file(
            &mut runtime,
            sources.extended_states.clone(),
            "Package: baz\nAuto-Installed: 1\n",
        );

        let resolution = resolve_user_installed(&runtime, &sources);
        assert!(resolution.packages.is_empty());
    }

    #[test_log::test]
    fn test_missing_status_yields_empty_with_diagnostic() {
        let mut runtime = MockRuntime::new();
        let sources = sources();
        expect_missing(&mut runtime, sources.status.clone());
        expect_file(&mut runtime, sources.extended_states.clone(), EXTENDED_STATES);

        let resolution = resolve_user_installed(&runtime, &sources);

        assert!(resolution.packages.is_empty());
        assert_eq!(resolution.diagnostics.len(), 1);
        assert_eq!(resolution.diagnostics[0].database, Database::Status);
        assert!(resolution.diagnostics[0].error.is_missing());
    }

    #[test_log::test]
    fn test_unreadable_status_is_io_diagnostic() {
        let mut runtime = MockRuntime::new();
        let sources = sources();
        runtime
            .expect_open()
            .with(eq(sources.status.clone()))
            .returning(|_| Err(io::Error::from(io::ErrorKind::PermissionDenied).into()));
        expect_missing(&mut runtime, sources.extended_states.clone());

        let resolution = resolve_user_installed(&runtime, &sources);

        assert!(resolution.packages.is_empty());
        assert_eq!(resolution.diagnostics.len(), 2);
        assert!(matches!(
            resolution.diagnostics[0].error,
            SourceError::Io { .. }
        ));
    }

    #[test_log::test]
    fn test_unreadable_extended_states_keeps_every_eligible_package() {
        let mut runtime = MockRuntime::new();
        let sources = sources();
        expect_file(&mut runtime, sources.status.clone(), STATUS);
        runtime
            .expect_open()
            .with(eq(sources.extended_states.clone()))
            .returning(|_| Err(io::Error::from(io::ErrorKind::PermissionDenied).into()));

        let resolution = resolve_user_installed(&runtime, &sources);

        assert_eq!(names(&resolution), vec!["zsh", "libzstd1", "curl"]);
        assert_eq!(resolution.diagnostics.len(), 1);
        assert_eq!(resolution.diagnostics[0].database, Database::ExtendedStates);
        assert!(matches!(
            resolution.diagnostics[0].error,
            SourceError::Io { .. }
        ));
    }

    #[test_log::test]
    fn test_invalid_utf8_in_extended_states_discards_the_file() {
        let mut runtime = MockRuntime::new();
        let sources = sources();
        expect_file(&mut runtime, sources.status.clone(), STATUS);
        runtime
            .expect_open()
            .with(eq(sources.extended_states.clone()))
            .returning(|_| {
                Ok(Box::new(Cursor::new(
                    b"Package: libzstd1\nAuto-Installed: 1\n\nPackage: \xff\n".to_vec(),
                )))
            });

        let resolution = resolve_user_installed(&runtime, &sources);

        assert_eq!(names(&resolution), vec!["zsh", "libzstd1", "curl"]);
        assert_eq!(resolution.diagnostics.len(), 1);
        assert_eq!(resolution.diagnostics[0].database, Database::ExtendedStates);
        assert!(matches!(
            resolution.diagnostics[0].error,
            SourceError::Io { .. }
        ));
    }

    #[test]
    fn test_verdict_agrees_with_list_for_multiarch_duplicates() {
        let mut runtime = MockRuntime::new();
        let sources = sources();
        expect_file(
            &mut runtime,
            sources.status.clone(),
            "Package: libfoo\nArchitecture: i386\nStatus: deinstall ok config-files\n\n\
             Package: libfoo\nArchitecture: amd64\nStatus: install ok installed\n",
        );
        expect_file(&mut runtime, sources.extended_states.clone(), "");

        let selection = Selection::load(&runtime, &sources);
        let listed: Vec<_> = selection.user_installed().filter_map(|r| r.name()).collect();

        assert_eq!(listed, vec!["libfoo"]);
        assert_eq!(selection.verdict("libfoo"), Verdict::UserSelected);
    }

    #[test]
    fn test_verdict_uses_essential_reason_from_any_duplicate() {
        let mut runtime = MockRuntime::new();
        let sources = sources();
        expect_file(
            &mut runtime,
            sources.status.clone(),
            "Package: libbar\nArchitecture: amd64\nStatus: install ok installed\n\n\
             Package: libbar\nArchitecture: i386\nStatus: deinstall ok config-files\n\
             Priority: required\n",
        );
        expect_file(&mut runtime, sources.extended_states.clone(), "");

        let selection = Selection::load(&runtime, &sources);

        assert_eq!(selection.user_installed().count(), 0);
        assert_eq!(
            selection.verdict("libbar"),
            Verdict::Essential(EssentialReason::Required)
        );
    }

    #[test]
    fn test_verdict_not_installed_when_no_duplicate_is_installed() {
        let mut runtime = MockRuntime::new();
        let sources = sources();
        expect_file(
            &mut runtime,
            sources.status.clone(),
            "Package: libbaz\nStatus: deinstall ok config-files\n\n\
             Package: libbaz\nStatus: purge ok not-installed\n",
        );
        expect_file(&mut runtime, sources.extended_states.clone(), "");

        let selection = Selection::load(&runtime, &sources);

        assert_eq!(
            selection.verdict("libbaz"),
            Verdict::NotInstalled {
                status: Some("deinstall ok config-files".to_string())
            }
        );
    }

    #[test]
    fn test_installed_record_without_package_is_excluded() {
        let mut runtime = MockRuntime::new();
        let sources = sources();
        expect_file(
            &mut runtime,
            sources.status.clone(),
            "Status: install ok installed\nPriority: optional\n\n\
             Package: foo\nStatus: install ok installed\n",
        );
        expect_file(&mut runtime, sources.extended_states.clone(), "");

        let resolution = resolve_user_installed(&runtime, &sources);
        assert_eq!(names(&resolution), vec!["foo"]);
    }

    #[test]
    fn test_essential_wins_over_auto_installed() {
        let mut runtime = MockRuntime::new();
        let sources = sources();
        expect_file(
            &mut runtime,
            sources.status.clone(),
            "Package: dash\nStatus: install ok installed\nEssential: yes\n",
        );
        expect_file(
            &mut runtime,
            sources.extended_states.clone(),
            "Package: dash\nAuto-Installed: 1\n",
        );

        let selection = Selection::load(&runtime, &sources);
        assert_eq!(
            selection.verdict("dash"),
            Verdict::Essential(EssentialReason::Essential)
        );
        assert_eq!(selection.user_installed().count(), 0);
    }

    #[test]
    fn test_verdicts() {
        let mut runtime = MockRuntime::new();
        let sources = sources();
        expect_file(&mut runtime, sources.status.clone(), STATUS);
        expect_file(&mut runtime, sources.extended_states.clone(), EXTENDED_STATES);

        let selection = Selection::load(&runtime, &sources);

        assert_eq!(selection.verdict("zsh"), Verdict::UserSelected);
        assert_eq!(selection.verdict("curl"), Verdict::UserSelected);
        assert_eq!(selection.verdict("libzstd1"), Verdict::AutoInstalled);
        assert_eq!(
            selection.verdict("bash"),
            Verdict::Essential(EssentialReason::Essential)
        );
        assert_eq!(
            selection.verdict("apt"),
            Verdict::Essential(EssentialReason::Important)
        );
        assert_eq!(
            selection.verdict("emacs"),
            Verdict::NotInstalled {
                status: Some("deinstall ok config-files".to_string())
            }
        );
        assert_eq!(selection.verdict("nonexistent"), Verdict::Unknown);
    }

    #[test]
    fn test_sorted_keeps_file_order_for_equal_names() {
        let first: PackageRecord = [("Package", "dup"), ("Version", "1")]
            .into_iter()
            .collect::<crate::dpkg::Stanza>()
            .into();
        let second: PackageRecord = [("Package", "dup"), ("Version", "2")]
            .into_iter()
            .collect::<crate::dpkg::Stanza>()
            .into();
        let resolution = Resolution {
            packages: vec![first.clone(), second.clone()],
            diagnostics: Vec::new(),
        };

        assert_eq!(resolution.sorted(), vec![&first, &second]);
    }
}
