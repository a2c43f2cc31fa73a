//! Working out which installed packages the user picked
//!
//! The resolver reads both databases, derives the base-system set and
//! subtracts the automatic and essential packages from the installed ones.

mod essential;
mod resolver;
mod sources;

pub use essential::{EssentialReason, essential_packages, essential_reason};
pub use resolver::{
    Database, Diagnostic, Resolution, Selection, Verdict, resolve_user_installed,
};
pub use sources::Sources;
