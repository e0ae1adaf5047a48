use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::error::{Result, ScanError};
use crate::filter::IncludeFilter;
use crate::fs::{FileSystem, NativeFs};
use crate::loader::ClassLoader;
use crate::logging;
use crate::probe::{DependencyPolicy, EntryPointProber};
use crate::results::ResultSet;
use crate::walker::{DEFAULT_MAX_ARCHIVE_DEPTH, WalkContext, Walker};

#[derive(Debug, Clone, Serialize)]
pub struct ScanOptions {
    pub include: String,
    pub dependency_policy: DependencyPolicy,
    /// Walk top-level classpath locations concurrently.
    pub parallel: bool,
    /// Record a failed location and continue instead of aborting the scan.
    pub keep_going: bool,
    pub max_archive_depth: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            include: crate::filter::MATCH_ALL.to_string(),
            dependency_policy: DependencyPolicy::Tolerate,
            parallel: false,
            keep_going: false,
            max_archive_depth: DEFAULT_MAX_ARCHIVE_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedLocation {
    pub location: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    /// Sorted, deduplicated qualified names.
    pub discovered: Vec<String>,
    pub failed_locations: Vec<FailedLocation>,
}

/// Discovers every class on `classpath` exposing `public static main(String[])`.
///
/// # Panics
///
/// Panics if no global `tracing` subscriber is installed.
pub fn scan(classpath: &[PathBuf], options: &ScanOptions) -> Result<ScanOutcome> {
    logging::ensure_initialized();

    // Reject a bad pattern before touching the classpath.
    IncludeFilter::new(&options.include, NativeFs.separator())?;

    let loader = ClassLoader::new(classpath);
    let results = ResultSet::new();
    let prober = EntryPointProber::new(options.dependency_policy);
    debug!(
        "Scanning {} classpath entries, include {:?}, dependency policy {:?}",
        classpath.len(),
        options.include,
        prober.policy()
    );
    let ctx = WalkContext {
        results: &results,
        loader: &loader,
        prober: &prober,
        include: &options.include,
        max_archive_depth: options.max_archive_depth,
    };

    let walked: Vec<(&PathBuf, Result<()>)> = if options.parallel {
        classpath
            .par_iter()
            .map(|location| (location, walk_location(ctx, location)))
            .collect()
    } else {
        let mut walked = Vec::with_capacity(classpath.len());
        for location in classpath {
            let result = walk_location(ctx, location);
            let failed = result.is_err();
            walked.push((location, result));
            if failed && !options.keep_going {
                break;
            }
        }
        walked
    };
    debug!("Completed walk of classpath.");

    let mut failed_locations = Vec::new();
    for (location, result) in walked {
        if let Err(e) = result {
            error!("Failed to walk classpath entry {}: {e}", location.display());
            if !options.keep_going {
                return Err(e);
            }
            failed_locations.push(FailedLocation {
                location: location.display().to_string(),
                error: e.to_string(),
            });
        }
    }

    let discovered = results.finalize();
    info!("Located classes with main methods:");
    for name in &discovered {
        info!("  - {name}");
    }

    Ok(ScanOutcome {
        discovered,
        failed_locations,
    })
}

fn walk_location(ctx: WalkContext<'_>, location: &Path) -> Result<(), ScanError> {
    if !location.exists() {
        warn!("classpath entry {} does not exist, skipping", location.display());
        return Ok(());
    }
    debug!("Walking classpath entry {}", location.display());
    Walker::new(ctx, &NativeFs)?.walk(&NativeFs, location)
}
