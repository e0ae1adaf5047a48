//! Isolated class resolution over one scan's classpath.
//!
//! The loader looks classes up by qualified name in classpath order (first
//! location wins), defines them from their class-file header and links their
//! super types. It is independent of the process that runs the scan: nothing
//! outside the classpath is consulted except the platform packages, which
//! resolve to empty stubs.
//!
//! Archives are indexed together with any archives nested inside them, and
//! every archive below a directory location is indexed right after that
//! directory. The whole context is built before the walk starts, so lookups
//! never depend on how far the walk has got. The loader keeps the archive
//! bytes it indexed and hands them out to walkers mounting the same archive.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, warn};

use crate::archive::{ArchiveBytes, ZipReader, nested_origin, open_zip, read_entry};
use crate::error::{LoadError, Result, ScanError};
use crate::fs::{FileSystem, FileVisitor, NativeFs};
use crate::naming::{class_name_to_class_path, is_archive_file, is_unit_file, simple_name};
use crate::unit::{MethodSig, UnitHeader};

/// Packages served by the platform rather than the classpath.
pub const PLATFORM_PACKAGES: [&str; 8] = [
    "java.",
    "javax.",
    "jdk.",
    "sun.",
    "com.sun.",
    "org.w3c.dom.",
    "org.xml.sax.",
    "org.ietf.jgss.",
];

const PROHIBITED_PREFIX: &str = "java.";
const MAX_NESTED_INDEX_DEPTH: usize = 16;

pub fn is_platform_class(name: &str) -> bool {
    PLATFORM_PACKAGES.iter().any(|p| name.starts_with(p))
}

#[derive(Debug)]
pub struct LoadedClass {
    pub name: String,
    /// `None` for platform stubs.
    pub origin: Option<String>,
    pub is_interface: bool,
    pub super_class: Option<Arc<LoadedClass>>,
    pub interfaces: Vec<Arc<LoadedClass>>,
    pub methods: Vec<MethodSig>,
}

impl LoadedClass {
    fn platform(name: &str) -> Self {
        Self {
            name: name.to_string(),
            origin: None,
            is_interface: false,
            super_class: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// This class followed by its superclass chain.
    pub fn hierarchy(&self) -> impl Iterator<Item = &LoadedClass> {
        std::iter::successors(Some(self), |c| c.super_class.as_deref())
    }
}

type SuperTypes = (Option<Arc<LoadedClass>>, Vec<Arc<LoadedClass>>);

enum ClassSource {
    Directory(PathBuf),
    /// A class file given directly as a location. Serves only its own name.
    Unit {
        resource: String,
        path: PathBuf,
    },
    Archive {
        origin: String,
        bytes: ArchiveBytes,
        zip: Mutex<ZipReader>,
    },
}

/// Collects the archives below a directory location, in walk order.
#[derive(Default)]
struct ArchiveCollector {
    archives: Vec<PathBuf>,
}

impl FileVisitor for ArchiveCollector {
    fn pre_visit_directory(&mut self, _dir: &Path) -> Result<()> {
        Ok(())
    }

    fn visit_file(&mut self, _fs: &dyn FileSystem, file: &Path) -> Result<()> {
        if file
            .file_name()
            .is_some_and(|n| is_archive_file(&n.to_string_lossy()))
        {
            self.archives.push(file.to_path_buf());
        }
        Ok(())
    }

    fn visit_file_failed(&mut self, path: &Path, error: ScanError) -> Result<()> {
        // The walk itself reports this.
        debug!("not indexing archives below {}: {error}", path.display());
        Ok(())
    }
}

#[derive(Default)]
pub struct ClassLoader {
    sources: RwLock<Vec<ClassSource>>,
    attached: Mutex<HashSet<String>>,
    defined: Mutex<HashMap<String, Arc<LoadedClass>>>,
}

impl std::fmt::Debug for ClassLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sources = self.sources.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("ClassLoader")
            .field("sources", &sources.len())
            .finish()
    }
}

impl ClassLoader {
    /// Builds the resolution context. Locations that are missing or cannot be
    /// opened are skipped here; the walk reports them.
    pub fn new(classpath: &[PathBuf]) -> Self {
        let loader = Self::default();
        for location in classpath {
            if location.is_dir() {
                loader.write_sources().push(ClassSource::Directory(location.clone()));
                loader.attach_contained_archives(location);
            } else if location.is_file() {
                let file_name = location
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                if is_unit_file(&file_name) {
                    loader.write_sources().push(ClassSource::Unit {
                        resource: file_name,
                        path: location.clone(),
                    });
                } else if let Err(e) = loader.attach_file(location) {
                    warn!("skipping unreadable classpath archive {}: {e}", location.display());
                }
            } else {
                debug!("classpath location {} does not exist", location.display());
            }
        }
        loader
    }

    fn attach_contained_archives(&self, dir: &Path) {
        let mut collector = ArchiveCollector::default();
        if let Err(e) = NativeFs.walk(dir, &mut collector) {
            debug!("not indexing archives below {}: {e}", dir.display());
        }
        for archive in collector.archives {
            if let Err(e) = self.attach_file(&archive) {
                warn!("skipping unreadable archive {}: {e}", archive.display());
            }
        }
    }

    /// Adds an archive found on the host filesystem to the end of the search
    /// order. No-op if it is already part of the context.
    pub fn attach_file(&self, path: &Path) -> Result<()> {
        let origin = path.display().to_string();
        if self.is_attached(&origin) {
            return Ok(());
        }
        let bytes = ArchiveBytes::map(path).map_err(|source| ScanError::Visit {
            path: path.to_path_buf(),
            source,
        })?;
        self.attach(&origin, bytes)
    }

    /// Adds archive bytes under `origin`, indexing nested archives after it.
    pub fn attach(&self, origin: &str, bytes: ArchiveBytes) -> Result<()> {
        self.attach_nested(origin, bytes, 0)
    }

    fn attach_nested(&self, origin: &str, bytes: ArchiveBytes, depth: usize) -> Result<()> {
        {
            let mut attached = self.attached.lock().unwrap_or_else(PoisonError::into_inner);
            if !attached.insert(origin.to_string()) {
                return Ok(());
            }
        }

        let mut zip = open_zip(origin, bytes.clone())?;
        let nested: Vec<String> = zip
            .file_names()
            .filter(|n| is_archive_file(n))
            .map(str::to_string)
            .collect();

        let mut inner = Vec::new();
        if depth < MAX_NESTED_INDEX_DEPTH {
            for name in nested {
                match read_entry(&mut zip, &name) {
                    Ok(data) => inner.push((nested_origin(origin, &name), data)),
                    Err(e) => warn!("cannot index nested archive {origin}!/{name}: {e}"),
                }
            }
        }

        debug!("indexed {origin} ({} entries)", zip.len());
        self.write_sources().push(ClassSource::Archive {
            origin: origin.to_string(),
            bytes,
            zip: Mutex::new(zip),
        });

        for (nested_origin, data) in inner {
            if let Err(e) = self.attach_nested(&nested_origin, ArchiveBytes::owned(data), depth + 1) {
                warn!("cannot index nested archive {nested_origin}: {e}");
            }
        }
        Ok(())
    }

    /// Bytes of the archive indexed under `origin`, shared rather than read
    /// again.
    pub fn archive_bytes(&self, origin: &str) -> Option<ArchiveBytes> {
        let sources = self.sources.read().unwrap_or_else(PoisonError::into_inner);
        sources.iter().find_map(|source| match source {
            ClassSource::Archive {
                origin: o, bytes, ..
            } if o == origin => Some(bytes.clone()),
            _ => None,
        })
    }

    pub fn is_attached(&self, origin: &str) -> bool {
        self.attached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(origin)
    }

    /// Resolves and links `name`, caching the result.
    pub fn load_class(&self, name: &str) -> Result<Arc<LoadedClass>, LoadError> {
        let mut loading = Vec::new();
        self.load(name, &mut loading)
    }

    fn load(&self, name: &str, loading: &mut Vec<String>) -> Result<Arc<LoadedClass>, LoadError> {
        if let Some(class) = self.cached(name) {
            return Ok(class);
        }
        // Super types in `java.*` always come from the platform.
        if !loading.is_empty() && name.starts_with(PROHIBITED_PREFIX) {
            return Ok(self.define(LoadedClass::platform(name)));
        }
        if loading.iter().any(|n| n == name) {
            return Err(LoadError::Circularity(name.to_string()));
        }

        let Some((origin, bytes)) = self.find_class_bytes(name)? else {
            if is_platform_class(name) {
                return Ok(self.define(LoadedClass::platform(name)));
            }
            return Err(LoadError::NotFound(name.to_string()));
        };

        if name.starts_with(PROHIBITED_PREFIX) {
            return Err(LoadError::ProhibitedPackage(name.to_string()));
        }
        if simple_name(name) == "module-info" {
            return Err(LoadError::NotAClass(name.to_string()));
        }

        let header = UnitHeader::parse(&bytes).map_err(|reason| LoadError::Malformed {
            name: name.to_string(),
            reason,
        })?;
        if header.is_module {
            return Err(LoadError::NotAClass(name.to_string()));
        }
        if header.name != name {
            return Err(LoadError::WrongName {
                expected: name.to_string(),
                found: header.name,
            });
        }

        loading.push(name.to_string());
        let linked = self.link(name, &header, loading);
        loading.pop();
        let (super_class, interfaces) = linked?;

        debug!("defined {name} from {origin}");
        Ok(self.define(LoadedClass {
            name: header.name,
            origin: Some(origin),
            is_interface: header.is_interface,
            super_class,
            interfaces,
            methods: header.methods,
        }))
    }

    fn link(
        &self,
        name: &str,
        header: &UnitHeader,
        loading: &mut Vec<String>,
    ) -> Result<SuperTypes, LoadError> {
        let super_class = match &header.super_class {
            Some(s) => Some(self.load_dependency(name, s, loading)?),
            None => None,
        };
        let interfaces = header
            .interfaces
            .iter()
            .map(|i| self.load_dependency(name, i, loading))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((super_class, interfaces))
    }

    fn load_dependency(
        &self,
        dependent: &str,
        dependency: &str,
        loading: &mut Vec<String>,
    ) -> Result<Arc<LoadedClass>, LoadError> {
        self.load(dependency, loading).map_err(|e| match e {
            LoadError::NotFound(_)
            | LoadError::MissingDependency { .. }
            | LoadError::WrongName { .. }
            | LoadError::NotAClass(_) => LoadError::MissingDependency {
                class: dependent.to_string(),
                missing: dependency.to_string(),
            },
            other => other,
        })
    }

    fn find_class_bytes(&self, name: &str) -> Result<Option<(String, Vec<u8>)>, LoadError> {
        let resource = class_name_to_class_path(name);
        let sources = self.sources.read().unwrap_or_else(PoisonError::into_inner);
        for source in sources.iter() {
            match source {
                ClassSource::Directory(dir) => {
                    let path = dir.join(&resource);
                    if !path.is_file() {
                        continue;
                    }
                    let bytes = std::fs::read(&path).map_err(|source| LoadError::Io {
                        name: name.to_string(),
                        origin: path.display().to_string(),
                        source,
                    })?;
                    return Ok(Some((path.display().to_string(), bytes)));
                }
                ClassSource::Unit { resource: r, path } => {
                    if *r != resource {
                        continue;
                    }
                    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
                        name: name.to_string(),
                        origin: path.display().to_string(),
                        source,
                    })?;
                    return Ok(Some((path.display().to_string(), bytes)));
                }
                ClassSource::Archive { origin, zip, .. } => {
                    let mut zip = zip.lock().unwrap_or_else(PoisonError::into_inner);
                    match read_entry(&mut zip, &resource) {
                        Ok(bytes) => return Ok(Some((nested_origin(origin, &resource), bytes))),
                        Err(zip::result::ZipError::FileNotFound) => continue,
                        Err(e) => {
                            return Err(LoadError::Io {
                                name: name.to_string(),
                                origin: origin.clone(),
                                source: std::io::Error::other(e),
                            });
                        }
                    }
                }
            }
        }
        Ok(None)
    }

    fn cached(&self, name: &str) -> Option<Arc<LoadedClass>> {
        self.defined
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn define(&self, class: LoadedClass) -> Arc<LoadedClass> {
        let class = Arc::new(class);
        self.defined
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(class.name.clone())
            .or_insert(class)
            .clone()
    }

    fn write_sources(&self) -> std::sync::RwLockWriteGuard<'_, Vec<ClassSource>> {
        self.sources.write().unwrap_or_else(PoisonError::into_inner)
    }
}
