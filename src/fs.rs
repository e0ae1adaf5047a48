//! Filesystems the walker can traverse.
//!
//! Two implementations exist: [`NativeFs`] for the host filesystem and
//! [`ArchiveFs`](crate::archive::ArchiveFs) for a mounted jar. Both drive a
//! [`FileVisitor`] with the same events so directories and archive contents
//! are walked uniformly.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::archive::ArchiveFs;
use crate::error::{Result, ScanError};

pub trait FileVisitor {
    /// Called before the files of a directory are visited. Not called when
    /// the walk starts at a file.
    fn pre_visit_directory(&mut self, dir: &Path) -> Result<()>;

    fn visit_file(&mut self, fs: &dyn FileSystem, file: &Path) -> Result<()>;

    fn visit_file_failed(&mut self, path: &Path, error: ScanError) -> Result<()>;
}

pub trait FileSystem {
    /// Literal separator used in this filesystem's path strings.
    fn separator(&self) -> &str;

    fn root_directories(&self) -> Vec<PathBuf>;

    /// Walks depth-first from `start`, stopping at the first error the
    /// visitor returns.
    fn walk(&self, start: &Path, visitor: &mut dyn FileVisitor) -> Result<()>;

    /// Opens the archive at `file` (a path in this filesystem) as a new
    /// filesystem.
    fn mount(&self, file: &Path) -> Result<ArchiveFs>;

    /// Human-readable location of `path`, for logs and errors.
    fn describe(&self, path: &Path) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFs;

impl FileSystem for NativeFs {
    fn separator(&self) -> &str {
        std::path::MAIN_SEPARATOR_STR
    }

    fn root_directories(&self) -> Vec<PathBuf> {
        vec![PathBuf::from(std::path::MAIN_SEPARATOR_STR)]
    }

    fn walk(&self, start: &Path, visitor: &mut dyn FileVisitor) -> Result<()> {
        let walker = WalkBuilder::new(start)
            .hidden(false)
            .ignore(false)
            .parents(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_some_and(|t| t.is_dir()) {
                        visitor.pre_visit_directory(path)?;
                    } else {
                        visitor.visit_file(self, path)?;
                    }
                }
                Err(source) => {
                    let path = failed_path(&source).unwrap_or(start).to_path_buf();
                    visitor.visit_file_failed(&path.clone(), ScanError::Walk { path, source })?;
                }
            }
        }
        Ok(())
    }

    fn mount(&self, file: &Path) -> Result<ArchiveFs> {
        ArchiveFs::open(file)
    }

    fn describe(&self, path: &Path) -> String {
        path.display().to_string()
    }
}

/// The entry an `ignore` walk error refers to, if it names one.
fn failed_path(error: &ignore::Error) -> Option<&Path> {
    match error {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::Loop { child, .. } => Some(child),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            failed_path(err)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{temp_dir, write_file};

    #[derive(Default)]
    struct Recorder {
        dirs: Vec<PathBuf>,
        files: Vec<PathBuf>,
    }

    impl FileVisitor for Recorder {
        fn pre_visit_directory(&mut self, dir: &Path) -> Result<()> {
            self.dirs.push(dir.to_path_buf());
            Ok(())
        }

        fn visit_file(&mut self, _fs: &dyn FileSystem, file: &Path) -> Result<()> {
            self.files.push(file.to_path_buf());
            Ok(())
        }

        fn visit_file_failed(&mut self, _path: &Path, error: ScanError) -> Result<()> {
            Err(error)
        }
    }

    #[test]
    fn walk_visits_top_directory_first_and_every_file() {
        let base = temp_dir("native_walk");
        write_file(&base.join("b/B.class"), b"");
        write_file(&base.join("a/A.class"), b"");
        write_file(&base.join(".hidden/H.class"), b"");

        let mut recorder = Recorder::default();
        NativeFs.walk(&base, &mut recorder).unwrap();

        assert_eq!(recorder.dirs[0], base);
        assert_eq!(
            recorder.files,
            vec![
                base.join(".hidden/H.class"),
                base.join("a/A.class"),
                base.join("b/B.class")
            ]
        );
        let _ = std::fs::remove_dir_all(base);
    }

    #[test]
    fn walk_starting_at_a_file_visits_only_that_file() {
        let base = temp_dir("native_walk_file");
        let jar = base.join("lib.jar");
        write_file(&jar, b"x");

        let mut recorder = Recorder::default();
        NativeFs.walk(&jar, &mut recorder).unwrap();
        assert!(recorder.dirs.is_empty());
        assert_eq!(recorder.files, vec![jar]);
        let _ = std::fs::remove_dir_all(base);
    }

    #[test]
    fn walk_of_missing_path_reports_failure() {
        let base = temp_dir("native_walk_missing");
        let mut recorder = Recorder::default();
        let err = NativeFs.walk(&base.join("nope"), &mut recorder).unwrap_err();
        assert!(matches!(err, ScanError::Walk { .. }));
        let _ = std::fs::remove_dir_all(base);
    }

    #[test]
    fn walk_failure_names_the_failing_entry() {
        let base = temp_dir("native_walk_failed_entry");
        let nested = base.join("a/b");
        let err = ignore::Error::WithDepth {
            depth: 2,
            err: Box::new(ignore::Error::WithPath {
                path: nested.clone(),
                err: Box::new(ignore::Error::Io(std::io::Error::other("denied"))),
            }),
        };
        assert_eq!(failed_path(&err), Some(nested.as_path()));
        assert_eq!(failed_path(&ignore::Error::Io(std::io::Error::other("x"))), None);

        let missing = base.join("gone");
        let mut recorder = Recorder::default();
        match NativeFs.walk(&missing, &mut recorder).unwrap_err() {
            ScanError::Walk { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
        let _ = std::fs::remove_dir_all(base);
    }
}
