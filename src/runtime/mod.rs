//! Runtime abstraction for system operations.
//!
//! This module provides a trait-based abstraction over the file reads the
//! parsers perform, so the dpkg and apt databases can be swapped for
//! in-memory fixtures in tests.
//!
//! # Structure
//!
//! - `fs` - File system operations (open)

mod fs;

use anyhow::Result;
use std::io::Read;
use std::path::Path;

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // File System

    /// Open a file for streaming reads. The handle is closed when dropped.
    ///
    /// Errors keep the underlying [`std::io::Error`] reachable through
    /// `anyhow::Error::downcast_ref`, so callers can tell a missing file
    /// from other failures.
    fn open(&self, path: &Path) -> Result<Box<dyn Read + Send>>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn open(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        self.open_impl(path)
    }
}
