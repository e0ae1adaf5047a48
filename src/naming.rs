use std::path::Path;
use tracing::debug;

pub const UNIT_SUFFIX: &str = ".class";
pub const ARCHIVE_SUFFIXES: [&str; 2] = [".jar", ".zip"];

pub fn is_unit_file(file_name: &str) -> bool {
    file_name.ends_with(UNIT_SUFFIX)
}

pub fn is_archive_file(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    ARCHIVE_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

/// Turns `root/a/b/C.class` into `a.b.C`.
///
/// `separator` must be the literal separator of the filesystem the candidate
/// lives in: the host separator for directories, `/` inside archives.
pub fn to_qualified_name(candidate: &Path, root: &Path, separator: &str) -> String {
    let rel = candidate.strip_prefix(root).unwrap_or(candidate);
    let dotted = rel.to_string_lossy().replace(separator, ".");
    let name = match dotted.strip_suffix(UNIT_SUFFIX) {
        Some(stripped) => stripped.to_string(),
        None => dotted,
    };
    debug!("toClassName: from {} to {}", candidate.display(), name);
    name
}

pub fn class_name_to_class_path(class_name: &str) -> String {
    format!("{}{UNIT_SUFFIX}", class_name.replace('.', "/"))
}

/// `a/b/C` (internal form) to `a.b.C`.
pub fn internal_to_qualified(internal: &str) -> String {
    internal.replace('/', ".")
}

pub fn simple_name(class_name: &str) -> &str {
    class_name.rsplit('.').next().unwrap_or(class_name)
}
