//! Depth-first discovery over one filesystem tree.
//!
//! A [`Walker`] visits every file under a traversal root. Unit files are
//! named, filtered and probed; archives are mounted and walked by a fresh
//! walker that shares the scan's results, loader and prober but has its own
//! root and its own filter compiled for the archive's separator. Mounts reuse
//! the archive bytes the loader already holds.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::archive::ArchiveFs;
use crate::error::{Result, ScanError};
use crate::filter::IncludeFilter;
use crate::fs::{FileSystem, FileVisitor};
use crate::loader::ClassLoader;
use crate::naming::{is_archive_file, is_unit_file, to_qualified_name};
use crate::probe::{EntryPointProber, Outcome};
use crate::results::ResultSet;

pub const DEFAULT_MAX_ARCHIVE_DEPTH: usize = 16;

/// State shared by every walker of one scan.
#[derive(Debug, Clone, Copy)]
pub struct WalkContext<'a> {
    pub results: &'a ResultSet,
    pub loader: &'a ClassLoader,
    pub prober: &'a EntryPointProber,
    pub include: &'a str,
    pub max_archive_depth: usize,
}

#[derive(Debug)]
pub struct Walker<'a> {
    ctx: WalkContext<'a>,
    root: Option<PathBuf>,
    filter: IncludeFilter,
    depth: usize,
}

impl<'a> Walker<'a> {
    pub fn new(ctx: WalkContext<'a>, fs: &dyn FileSystem) -> Result<Self> {
        Self::at_depth(ctx, fs, 0)
    }

    fn at_depth(ctx: WalkContext<'a>, fs: &dyn FileSystem, depth: usize) -> Result<Self> {
        Ok(Self {
            ctx,
            root: None,
            filter: IncludeFilter::new(ctx.include, fs.separator())?,
            depth,
        })
    }

    pub fn walk(mut self, fs: &dyn FileSystem, start: &Path) -> Result<()> {
        fs.walk(start, &mut self)
    }

    fn visit_unit(&mut self, fs: &dyn FileSystem, file: &Path) -> Result<()> {
        // A walk that starts at a file never enters a directory.
        let root: &Path = self
            .root
            .get_or_insert_with(|| file.parent().map(Path::to_path_buf).unwrap_or_default());
        let relative = file.strip_prefix(root).unwrap_or(file);
        if !self.filter.matches(relative) {
            return Ok(());
        }

        let name = to_qualified_name(file, root, fs.separator());
        let outcome = self
            .ctx
            .prober
            .probe(&name, self.ctx.loader)
            .map_err(|source| ScanError::Load {
                path: fs.describe(file),
                source,
            })?;
        if outcome == Outcome::Found {
            info!("Found entry point: {name}");
            self.ctx.results.insert(name);
        }
        Ok(())
    }

    fn visit_archive(&mut self, fs: &dyn FileSystem, file: &Path) -> Result<()> {
        let origin = fs.describe(file);
        info!("Found jar: {origin}");
        if self.depth >= self.ctx.max_archive_depth {
            return Err(ScanError::ArchiveTooDeep {
                origin,
                limit: self.ctx.max_archive_depth,
            });
        }

        // The loader indexed this archive before the walk; reuse its bytes.
        let mounted = match self.ctx.loader.archive_bytes(&origin) {
            Some(bytes) => ArchiveFs::from_bytes(origin, bytes)?,
            None => {
                let mounted = fs.mount(file)?;
                self.ctx.loader.attach(mounted.origin(), mounted.bytes())?;
                mounted
            }
        };
        for root in mounted.root_directories() {
            debug!("Searching jar root: {}", mounted.describe(&root));
            let nested = Walker::at_depth(self.ctx, &mounted, self.depth + 1)?;
            nested.walk(&mounted, &root)?;
        }
        Ok(())
    }
}

impl FileVisitor for Walker<'_> {
    fn pre_visit_directory(&mut self, dir: &Path) -> Result<()> {
        if self.root.is_none() {
            self.root = Some(dir.to_path_buf());
        }
        Ok(())
    }

    fn visit_file(&mut self, fs: &dyn FileSystem, file: &Path) -> Result<()> {
        debug!("Checking: {}", fs.describe(file));
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if is_unit_file(&file_name) {
            self.visit_unit(fs, file)
        } else if is_archive_file(&file_name) {
            self.visit_archive(fs, file)
        } else {
            Ok(())
        }
    }

    fn visit_file_failed(&mut self, path: &Path, error: ScanError) -> Result<()> {
        error!("Visit to path failed: {}: {error}", path.display());
        Err(error)
    }
}
