//! Error types for the scan core.
//!
//! `LoadError` mirrors the ways a class can fail to resolve through the
//! [`ClassLoader`](crate::loader::ClassLoader). Some of those failures are
//! linkage problems the prober tolerates; the rest surface as `ScanError`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("class {0} not found on the classpath")]
    NotFound(String),

    #[error("class {class} requires {missing}, which could not be loaded")]
    MissingDependency { class: String, missing: String },

    #[error("class file for {expected} declares {found}")]
    WrongName { expected: String, found: String },

    #[error("{0} is a module descriptor, not a class")]
    NotAClass(String),

    #[error("malformed class file for {name}: {reason}")]
    Malformed { name: String, reason: String },

    #[error("prohibited package name for {0}")]
    ProhibitedPackage(String),

    #[error("class circularity detected while loading {0}")]
    Circularity(String),

    #[error("failed to read class {name} from {origin}: {source}")]
    Io {
        name: String,
        origin: String,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// Failures of the `NoClassDefFoundError` family: the unit or one of its
    /// super types exists in some form but cannot be linked.
    pub fn is_linkage(&self) -> bool {
        matches!(
            self,
            LoadError::MissingDependency { .. } | LoadError::WrongName { .. } | LoadError::NotAClass(_)
        )
    }
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to visit {path}: {source}")]
    Visit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },

    #[error("failed to open archive {origin}: {source}")]
    Archive {
        origin: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("archive nesting deeper than {limit} levels at {origin}")]
    ArchiveTooDeep { origin: String, limit: usize },

    #[error("couldn't reflect on class {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: LoadError,
    },

    #[error("invalid include filter {pattern:?}: {reason}")]
    Filter { pattern: String, reason: String },

    #[error("failed to prepare output file {path}: {source}")]
    PrepareOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output file {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = ScanError> = std::result::Result<T, E>;
