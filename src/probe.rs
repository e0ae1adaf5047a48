use serde::Serialize;
use tracing::debug;

use crate::error::LoadError;
use crate::loader::{ClassLoader, LoadedClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Found,
    NotFound,
}

/// What to do when a candidate cannot be linked because one of its super
/// types is missing from the classpath.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyPolicy {
    /// Treat the candidate as having no entry point.
    #[default]
    Tolerate,
    /// Fail the candidate's branch.
    Strict,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EntryPointProber {
    policy: DependencyPolicy,
}

impl EntryPointProber {
    pub fn new(policy: DependencyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DependencyPolicy {
        self.policy
    }

    /// Loads `name` through `loader` and checks for `public static main(String[])`.
    ///
    /// Linkage failures are reported as `NotFound` (missing super types only
    /// under [`DependencyPolicy::Tolerate`]); every other load failure is
    /// returned.
    pub fn probe(&self, name: &str, loader: &ClassLoader) -> Result<Outcome, LoadError> {
        match loader.load_class(name) {
            Ok(class) => Ok(match find_entry_point(&class) {
                Some(declaring) => {
                    debug!("Found a class with a main method: {name} (declared by {declaring})");
                    Outcome::Found
                }
                None => Outcome::NotFound,
            }),
            Err(e @ LoadError::MissingDependency { .. }) => match self.policy {
                DependencyPolicy::Tolerate => {
                    debug!("skipping {name}: {e}");
                    Ok(Outcome::NotFound)
                }
                DependencyPolicy::Strict => Err(e),
            },
            Err(e) if e.is_linkage() => {
                debug!("skipping {name}: {e}");
                Ok(Outcome::NotFound)
            }
            Err(e) => Err(e),
        }
    }
}

/// Name of the class declaring the entry point visible on `class`.
///
/// Static methods are inherited from superclasses but not from interfaces,
/// so only the superclass chain is searched.
pub fn find_entry_point(class: &LoadedClass) -> Option<&str> {
    class
        .hierarchy()
        .find(|c| c.methods.iter().any(|m| m.is_entry_point()))
        .map(|c| c.name.as_str())
}
