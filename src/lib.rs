//! Find the Debian packages a user installed on purpose.
//!
//! Reads `/var/lib/dpkg/status` and `/var/lib/apt/extended_states` directly
//! and reports installed packages that are neither automatically installed
//! dependencies nor part of the base system.

pub mod commands;
pub mod dpkg;
pub mod error;
pub mod runtime;
pub mod selection;
