//! Test-only helpers: a minimal class-file writer and jar/temp-dir builders.
//! Also compiled into the integration tests under `tests/common`.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use zip::write::{FileOptions, ZipWriter};

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;

static COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn temp_dir(name: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
        "entry_finder_test_{}_{}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos(),
        n,
        name
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

pub fn jar_bytes(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn write_jar(path: &Path, entries: &[(&str, Vec<u8>)]) {
    write_file(path, &jar_bytes(entries));
}

#[derive(Default)]
struct Pool {
    bytes: Vec<u8>,
    count: u16,
    utf8: HashMap<String, u16>,
}

impl Pool {
    fn utf8(&mut self, s: &str) -> u16 {
        if let Some(idx) = self.utf8.get(s) {
            return *idx;
        }
        self.bytes.push(1);
        self.bytes.extend_from_slice(&(s.len() as u16).to_be_bytes());
        self.bytes.extend_from_slice(s.as_bytes());
        self.count += 1;
        self.utf8.insert(s.to_string(), self.count);
        self.count
    }

    fn class(&mut self, name: &str) -> u16 {
        let name_idx = self.utf8(name);
        self.bytes.push(7);
        self.bytes.extend_from_slice(&name_idx.to_be_bytes());
        self.count += 1;
        self.count
    }
}

/// Writes just enough of a class file for header parsing: constant pool,
/// access flags, super types and method table without code.
pub struct ClassFileWriter {
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    access: u16,
    methods: Vec<(u16, String, String)>,
}

impl ClassFileWriter {
    pub fn new(internal_name: &str) -> Self {
        Self {
            name: internal_name.to_string(),
            super_name: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            access: ACC_PUBLIC | ACC_SUPER,
            methods: Vec::new(),
        }
    }

    pub fn extends(mut self, super_name: &str) -> Self {
        self.super_name = Some(super_name.to_string());
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(interface.to_string());
        self
    }

    pub fn interface(mut self) -> Self {
        self.access = ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT;
        self
    }

    pub fn method(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        self.methods
            .push((access, name.to_string(), descriptor.to_string()));
        self
    }

    pub fn with_main(self) -> Self {
        self.method(ACC_PUBLIC | ACC_STATIC, "main", "([Ljava/lang/String;)V")
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pool = Pool::default();
        let this_idx = pool.class(&self.name);
        let super_idx = self.super_name.as_deref().map(|s| pool.class(s)).unwrap_or(0);
        let interface_idx: Vec<u16> = self.interfaces.iter().map(|i| pool.class(i)).collect();
        let method_idx: Vec<(u16, u16, u16)> = self
            .methods
            .iter()
            .map(|(access, name, desc)| (*access, pool.utf8(name), pool.utf8(desc)))
            .collect();

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABE_u32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&52u16.to_be_bytes());
        out.extend_from_slice(&(pool.count + 1).to_be_bytes());
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&self.access.to_be_bytes());
        out.extend_from_slice(&this_idx.to_be_bytes());
        out.extend_from_slice(&super_idx.to_be_bytes());
        out.extend_from_slice(&(interface_idx.len() as u16).to_be_bytes());
        for idx in interface_idx {
            out.extend_from_slice(&idx.to_be_bytes());
        }
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&(method_idx.len() as u16).to_be_bytes());
        for (access, name, desc) in method_idx {
            out.extend_from_slice(&access.to_be_bytes());
            out.extend_from_slice(&name.to_be_bytes());
            out.extend_from_slice(&desc.to_be_bytes());
            out.extend_from_slice(&0u16.to_be_bytes());
        }
        out.extend_from_slice(&0u16.to_be_bytes());
        out
    }
}

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .try_init();
}
