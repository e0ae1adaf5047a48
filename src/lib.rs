//! # entry-finder
//!
//! Scans a Java classpath (directories, jars and jars nested inside jars) and
//! lists every class exposing `public static main(String[])`.
//!
//! ## Architecture
//!
//! - **scan**: Top-level orchestration over the ordered classpath
//! - **walker**: Depth-first traversal of one filesystem tree, recursing into archives
//! - **fs**: `FileSystem`/`FileVisitor` seam and the native filesystem
//! - **archive**: Read-only zip filesystem over mapped or in-memory bytes
//! - **naming**: Path to qualified class name synthesis
//! - **filter**: Glob/regex include patterns over relative paths
//! - **loader**: Classpath-scoped class resolution from class-file headers
//! - **unit**: Class-file header parsing
//! - **probe**: Entry-point detection with dependency tolerance policy
//! - **results**: Concurrent, deduplicating result set
//! - **output**: Listing destination preparation and writing
//! - **config**: Flag and environment resolution
//! - **logging**: Subscriber setup and the logging contract

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod fs;
pub mod loader;
pub mod logging;
pub mod naming;
pub mod output;
pub mod probe;
pub mod results;
pub mod scan;
pub mod unit;
pub mod walker;

#[cfg(test)]
mod testing;
