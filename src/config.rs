use anyhow::{Result, bail};
use std::env;
use std::path::PathBuf;

use crate::cli::ScanArgs;
use crate::filter::MATCH_ALL;
use crate::output::DEFAULT_OUTPUT;
use crate::probe::DependencyPolicy;
use crate::scan::ScanOptions;
use crate::walker::DEFAULT_MAX_ARCHIVE_DEPTH;

pub const CLASSPATH_VAR: &str = "ENTRY_FINDER_CLASSPATH";
pub const JAVA_CLASSPATH_VAR: &str = "CLASSPATH";
pub const INCLUDE_VAR: &str = "ENTRY_FINDER_INCLUDE";
pub const OUTPUT_VAR: &str = "ENTRY_FINDER_OUTPUT";
pub const STRICT_VAR: &str = "ENTRY_FINDER_STRICT_DEPENDENCIES";

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub classpath: Vec<PathBuf>,
    pub output: PathBuf,
    pub options: ScanOptions,
}

impl ScanConfig {
    pub fn resolve(args: &ScanArgs) -> Result<Self> {
        Self::resolve_with(args, |key| env::var(key).ok())
    }

    /// Resolves flags first, then variables from `lookup`, then defaults.
    pub fn resolve_with(args: &ScanArgs, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let classpath = resolve_classpath(args, &lookup);
        if classpath.is_empty() {
            bail!(
                "No classpath given. Pass PATH arguments, --classpath, or set {CLASSPATH_VAR} or {JAVA_CLASSPATH_VAR}"
            );
        }

        let include = args
            .include
            .clone()
            .or_else(|| lookup(INCLUDE_VAR))
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| MATCH_ALL.to_string());

        let output = args
            .output
            .clone()
            .or_else(|| lookup(OUTPUT_VAR).filter(|p| !p.is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

        let strict = args.strict_dependencies || lookup(STRICT_VAR).is_some_and(|v| is_truthy(&v));

        Ok(Self {
            classpath,
            output,
            options: ScanOptions {
                include,
                dependency_policy: if strict {
                    DependencyPolicy::Strict
                } else {
                    DependencyPolicy::Tolerate
                },
                parallel: args.parallel,
                keep_going: args.keep_going,
                max_archive_depth: args.max_archive_depth.unwrap_or(DEFAULT_MAX_ARCHIVE_DEPTH),
            },
        })
    }
}

fn resolve_classpath(args: &ScanArgs, lookup: &impl Fn(&str) -> Option<String>) -> Vec<PathBuf> {
    let mut classpath = args.paths.clone();
    if let Some(list) = &args.classpath {
        classpath.extend(split_path_list(list));
    }
    if classpath.is_empty() {
        if let Some(list) = lookup(CLASSPATH_VAR).or_else(|| lookup(JAVA_CLASSPATH_VAR)) {
            classpath.extend(split_path_list(&list));
        }
    }
    classpath
}

/// Splits a platform path list, dropping empty segments.
pub fn split_path_list(list: &str) -> Vec<PathBuf> {
    env::split_paths(list)
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
