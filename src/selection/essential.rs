use std::collections::BTreeSet;
use std::fmt;

use crate::dpkg::PackageRecord;

/// Why a package counts as part of the base system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EssentialReason {
    /// `Essential: yes`
    Essential,
    /// `Priority: required`
    Required,
    /// `Priority: important`
    Important,
}

impl fmt::Display for EssentialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EssentialReason::Essential => write!(f, "Essential: yes"),
            EssentialReason::Required => write!(f, "Priority: required"),
            EssentialReason::Important => write!(f, "Priority: important"),
        }
    }
}

pub fn essential_reason(record: &PackageRecord) -> Option<EssentialReason> {
    if record.field("Essential") == Some("yes") {
        return Some(EssentialReason::Essential);
    }
    match record.field("Priority") {
        Some("required") => Some(EssentialReason::Required),
        Some("important") => Some(EssentialReason::Important),
        _ => None,
    }
}

/// Names of all base-system packages among `records`. Records without a
/// Package field are skipped even when they look essential.
pub fn essential_packages(records: &[PackageRecord]) -> BTreeSet<String> {
    records
        .iter()
        .filter(|r| essential_reason(r).is_some())
        .filter_map(|r| r.name())
        .map(str::to_string)
        .collect()
}
