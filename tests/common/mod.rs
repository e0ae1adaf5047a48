#![allow(dead_code)]

use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;

#[path = "../../src/testing.rs"]
mod testing;

pub use testing::ClassFileWriter;

pub const BIN: &str = env!("CARGO_BIN_EXE_entry-finder");

pub fn temp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "entry_finder_it_{}_{}_{}",
        std::process::id(),
        nanos,
        name
    ))
}

pub fn write_file(path: &Path, content: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

pub fn write_jar(path: &Path, entries: &[(&str, Vec<u8>)]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in entries {
        zip.start_file(*name, options)?;
        zip.write_all(content)?;
    }
    zip.finish()?;
    Ok(())
}

pub fn main_class(internal_name: &str) -> Vec<u8> {
    ClassFileWriter::new(internal_name).with_main().build()
}

pub fn plain_class(internal_name: &str) -> Vec<u8> {
    ClassFileWriter::new(internal_name).build()
}

pub fn run(args: &[&str]) -> anyhow::Result<Output> {
    let out = Command::new(BIN)
        .args(args)
        .env_remove("ENTRY_FINDER_CLASSPATH")
        .env_remove("ENTRY_FINDER_INCLUDE")
        .env_remove("ENTRY_FINDER_OUTPUT")
        .env_remove("ENTRY_FINDER_STRICT_DEPENDENCIES")
        .output()?;
    Ok(out)
}

pub fn run_json(args: &[&str]) -> anyhow::Result<Value> {
    let out = run(args)?;
    if !out.status.success() {
        return Err(anyhow::anyhow!(
            "command failed: status={:?}, stderr={}",
            out.status.code(),
            String::from_utf8_lossy(&out.stderr)
        ));
    }
    Ok(serde_json::from_slice(&out.stdout)?)
}
