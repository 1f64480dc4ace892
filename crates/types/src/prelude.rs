// Path: crates/types/src/prelude.rs

//! A curated set of commonly used traits and types.

use crate::error::BootstrapError;
use std::path::Path;

/// An extension trait for `Option` that provides a convenient `required` method
/// to convert an `Option` to a `Result` with a specific error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, E>`, returning the provided
    /// error if the option is `None`.
    fn required<E>(self, err: E) -> Result<T, E>;
}

impl<T> OptionExt<T> for Option<T> {
    fn required<E>(self, err: E) -> Result<T, E> {
        self.ok_or(err)
    }
}

/// Attaches the artifact path to I/O failures.
pub trait IoResultExt<T> {
    /// Converts an `io::Result<T>` into a [`BootstrapError::Io`] naming `path`.
    fn at_path(self, path: &Path) -> Result<T, BootstrapError>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn at_path(self, path: &Path) -> Result<T, BootstrapError> {
        self.map_err(|source| BootstrapError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
