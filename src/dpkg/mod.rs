//! Readers for the Debian package databases
//!
//! This module parses the dpkg status file and apt's extended_states file
//! directly, without running dpkg or apt.

mod extended_states;
mod record;
mod stanza;
mod status;

pub use extended_states::{
    DEFAULT_EXTENDED_STATES_PATH, parse_extended_states, read_extended_states,
};
pub use record::PackageRecord;
pub use stanza::{Continuation, Stanza, Stanzas};
pub use status::{DEFAULT_STATUS_PATH, parse_status, read_status};
