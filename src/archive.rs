//! Jar and zip files mounted as read-only filesystems.
//!
//! Host archives are memory-mapped; archives nested inside another archive
//! are inflated into memory. A mount exposes a single root `/` and uses `/`
//! as its separator whatever the host platform is. Dropping the
//! [`ArchiveFs`] releases the mount's reader. The [`ArchiveBytes`] behind it
//! are reference counted and stay alive while the class loader indexes the
//! same archive, which it does for the rest of the scan.

use memmap2::Mmap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;
use zip::ZipArchive;

use crate::error::{Result, ScanError};
use crate::fs::{FileSystem, FileVisitor};

pub const ARCHIVE_SEPARATOR: &str = "/";

#[derive(Debug)]
enum ArchiveData {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

/// Archive bytes shared between a mount and the class loader indexing it.
#[derive(Debug, Clone)]
pub struct ArchiveBytes(Arc<ArchiveData>);

impl AsRef<[u8]> for ArchiveBytes {
    fn as_ref(&self) -> &[u8] {
        match self.0.as_ref() {
            ArchiveData::Mapped(m) => &m[..],
            ArchiveData::Owned(v) => v.as_slice(),
        }
    }
}

impl ArchiveBytes {
    pub fn map(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        // SAFETY: The file is opened read-only and the map owns its own handle
        // to the pages; concurrent truncation of a classpath jar mid-scan is
        // outside what we support.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self(Arc::new(ArchiveData::Mapped(mmap))))
    }

    pub fn owned(bytes: Vec<u8>) -> Self {
        Self(Arc::new(ArchiveData::Owned(bytes)))
    }
}

pub type ZipReader = ZipArchive<Cursor<ArchiveBytes>>;

pub fn open_zip(origin: &str, bytes: ArchiveBytes) -> Result<ZipReader> {
    ZipArchive::new(Cursor::new(bytes)).map_err(|source| ScanError::Archive {
        origin: origin.to_string(),
        source,
    })
}

/// Location string of an entry inside an archive, `outer.jar!/a/b.jar`.
pub fn nested_origin(outer: &str, entry: &str) -> String {
    format!("{outer}!/{entry}")
}

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_ENTRY_PREALLOC: u64 = 1 << 20;

/// Reads one entry fully. Used for nested archives and class bytes.
///
/// The declared size only sizes the initial buffer; a corrupt header cannot
/// force a huge allocation.
pub fn read_entry(zip: &mut ZipReader, name: &str) -> zip::result::ZipResult<Vec<u8>> {
    let mut entry = zip.by_name(name)?;
    let mut buf = Vec::with_capacity(entry.size().min(MAX_ENTRY_PREALLOC) as usize);
    entry.read_to_end(&mut buf)?;
    Ok(buf)
}

pub struct ArchiveFs {
    origin: String,
    bytes: ArchiveBytes,
    zip: Mutex<ZipReader>,
}

impl std::fmt::Debug for ArchiveFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveFs").field("origin", &self.origin).finish()
    }
}

impl ArchiveFs {
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = ArchiveBytes::map(path).map_err(|source| ScanError::Visit {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(path.display().to_string(), bytes)
    }

    pub fn from_bytes(origin: String, bytes: ArchiveBytes) -> Result<Self> {
        let zip = open_zip(&origin, bytes.clone())?;
        debug!("mounted {origin} ({} entries)", zip.len());
        Ok(Self {
            origin,
            bytes,
            zip: Mutex::new(zip),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn bytes(&self) -> ArchiveBytes {
        self.bytes.clone()
    }

    /// File entry names, sorted, without directories.
    pub fn file_names(&self) -> Vec<String> {
        let zip = self.zip.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = zip
            .file_names()
            .filter(|n| !n.ends_with('/'))
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }

    fn entry_name(path: &Path) -> String {
        path.to_string_lossy()
            .trim_start_matches(ARCHIVE_SEPARATOR)
            .to_string()
    }
}

impl Drop for ArchiveFs {
    fn drop(&mut self) {
        debug!("released mount {}", self.origin);
    }
}

impl FileSystem for ArchiveFs {
    fn separator(&self) -> &str {
        ARCHIVE_SEPARATOR
    }

    fn root_directories(&self) -> Vec<PathBuf> {
        vec![PathBuf::from(ARCHIVE_SEPARATOR)]
    }

    fn walk(&self, start: &Path, visitor: &mut dyn FileVisitor) -> Result<()> {
        let prefix = Self::entry_name(start);
        visitor.pre_visit_directory(start)?;
        for name in self.file_names() {
            if !prefix.is_empty() && !name.starts_with(&format!("{prefix}/")) {
                continue;
            }
            let path = PathBuf::from(ARCHIVE_SEPARATOR).join(name.trim_start_matches('/'));
            visitor.visit_file(self, &path)?;
        }
        Ok(())
    }

    fn mount(&self, file: &Path) -> Result<ArchiveFs> {
        let name = Self::entry_name(file);
        let origin = nested_origin(&self.origin, &name);
        let bytes = {
            let mut zip = self.zip.lock().unwrap_or_else(PoisonError::into_inner);
            read_entry(&mut zip, &name).map_err(|source| ScanError::Archive {
                origin: origin.clone(),
                source,
            })?
        };
        ArchiveFs::from_bytes(origin, ArchiveBytes::owned(bytes))
    }

    fn describe(&self, path: &Path) -> String {
        nested_origin(&self.origin, &Self::entry_name(path))
    }
}
