//! Discovery of step directories and field files in a run tree.
//!
//! Layout: `<root>/<step>/<data_subdir>/<field>.<extension>`, where step
//! directory names start with `step`. Listings are sorted so that two runs
//! over the same tree always visit entries in the same order. A missing root
//! lists no steps; a directory that exists but cannot be listed is a
//! [`ScanError`].

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Literal prefix every step directory name carries.
pub const STEP_PREFIX: &str = "step";

pub const DEFAULT_DATA_SUBDIR: &str = "matrix";
pub const DEFAULT_EXTENSION: &str = "csv";

/// Where field files live inside a step directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub data_subdir: String,
    /// Field file extension, without the leading dot.
    pub extension: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            data_subdir: DEFAULT_DATA_SUBDIR.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// Exact-name allow list. Empty means "allow everything".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFilter(BTreeSet<String>);

impl NameFilter {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn allows(&self, name: &str) -> bool {
        self.0.is_empty() || self.0.contains(name)
    }
}

/// A field file name as found on disk.
///
/// The raw name is kept so that files whose names are not UTF-8 are still
/// opened and compared; [`FieldFile::label`] is only for display and
/// matching.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FieldFile(OsString);

impl FieldFile {
    pub fn new(file_name: impl Into<OsString>) -> Self {
        Self(file_name.into())
    }

    pub fn file_name(&self) -> &OsStr {
        &self.0
    }

    /// Printable name; invalid UTF-8 sequences show as U+FFFD.
    pub fn label(&self) -> Cow<'_, str> {
        self.0.to_string_lossy()
    }
}

/// One side's run tree.
#[derive(Debug, Clone)]
pub struct RunTree {
    root: PathBuf,
    layout: Layout,
}

impl RunTree {
    pub fn new(root: impl Into<PathBuf>, layout: Layout) -> Self {
        Self { root: root.into(), layout }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Step directory names under the root, filtered and sorted.
    ///
    /// # Errors
    ///
    /// [`ScanError`] when the root exists but cannot be listed, or holds a
    /// step directory whose name is not UTF-8.
    pub fn steps(&self, filter: &NameFilter) -> Result<Vec<String>, ScanError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let scan_err = |source: io::Error| ScanError { dir: self.root.clone(), source };

        let mut steps = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(scan_err)? {
            let entry = entry.map_err(scan_err)?;
            let raw = entry.file_name();
            if !raw.as_encoded_bytes().starts_with(STEP_PREFIX.as_bytes()) || !entry.path().is_dir()
            {
                continue;
            }
            let name = raw.into_string().map_err(|raw| {
                scan_err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("step directory name {raw:?} is not UTF-8"),
                ))
            })?;
            if filter.allows(&name) {
                steps.push(name);
            }
        }
        steps.sort();
        Ok(steps)
    }

    /// `<root>/<step>/<data_subdir>`
    pub fn data_dir(&self, step: &str) -> PathBuf {
        self.root.join(step).join(&self.layout.data_subdir)
    }

    /// Regular files ending in `.<extension>` in a step's data directory,
    /// filtered by basename and sorted.
    ///
    /// # Errors
    ///
    /// [`ScanError`] when the data directory or one of its entries cannot be
    /// read.
    pub fn fields(&self, step: &str, filter: &NameFilter) -> Result<Vec<FieldFile>, ScanError> {
        let dir = self.data_dir(step);
        let scan_err = |source: io::Error| ScanError { dir: dir.clone(), source };

        let mut fields = Vec::new();
        for entry in fs::read_dir(&dir).map_err(scan_err)? {
            let entry = entry.map_err(scan_err)?;
            if !entry.path().is_file() {
                continue;
            }
            let field = FieldFile::new(entry.file_name());
            let selected = field_basename(&field.label(), &self.layout.extension)
                .is_some_and(|base| filter.allows(base));
            if selected {
                fields.push(field);
            }
        }
        fields.sort();
        Ok(fields)
    }

    /// Path of a field file, whether or not it exists.
    pub fn field_path(&self, step: &str, file_name: impl AsRef<Path>) -> PathBuf {
        self.data_dir(step).join(file_name)
    }
}

/// Strip `.<extension>` from a file name; `None` if it does not end with it.
pub fn field_basename<'a>(file_name: &'a str, extension: &str) -> Option<&'a str> {
    file_name.strip_suffix(extension)?.strip_suffix('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree() -> (tempfile::TempDir, RunTree) {
        let dir = tempfile::tempdir().unwrap();
        let run = RunTree::new(dir.path(), Layout::default());
        (dir, run)
    }

    fn names(fields: Vec<FieldFile>) -> Vec<String> {
        fields.iter().map(|f| f.label().into_owned()).collect()
    }

    #[test]
    fn steps_are_prefixed_dirs_sorted() {
        let (dir, run) = tree();
        for name in ["step0002_cycle000020", "step0001_cycle000010", "notes", "Step9"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("step_file.txt"), "x").unwrap();

        assert_eq!(
            run.steps(&NameFilter::default()).unwrap(),
            vec!["step0001_cycle000010", "step0002_cycle000020"]
        );
    }

    #[test]
    fn step_filter_intersects() {
        let (dir, run) = tree();
        for name in ["step_a", "step_b", "step_c"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        let filter = NameFilter::new(["step_c", "step_a", "step_missing"]);
        assert_eq!(run.steps(&filter).unwrap(), vec!["step_a", "step_c"]);
    }

    #[test]
    fn missing_root_lists_no_steps() {
        let run = RunTree::new("/no/such/root", Layout::default());
        assert!(run.steps(&NameFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn unlistable_data_dir_is_an_error() {
        let (dir, run) = tree();
        fs::create_dir(dir.path().join("step0")).unwrap();
        let err = run.fields("step0", &NameFilter::default()).unwrap_err();
        assert_eq!(err.dir, dir.path().join("step0").join("matrix"));
        assert_eq!(err.source.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn fields_match_extension_and_filter() {
        let (dir, run) = tree();
        let data = dir.path().join("step0").join("matrix");
        fs::create_dir_all(&data).unwrap();
        for name in ["velocity.csv", "energy.csv", "readme.txt", "csv", "pressure.csv.bak"] {
            fs::write(data.join(name), "1").unwrap();
        }
        fs::create_dir(data.join("nested.csv")).unwrap();

        let all = NameFilter::default();
        assert_eq!(names(run.fields("step0", &all).unwrap()), vec!["energy.csv", "velocity.csv"]);
        let velocity = NameFilter::new(["velocity"]);
        assert_eq!(names(run.fields("step0", &velocity).unwrap()), vec!["velocity.csv"]);
        let with_ext = NameFilter::new(["velocity.csv"]);
        assert!(run.fields("step0", &with_ext).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_field_names_are_listed() {
        use std::os::unix::ffi::OsStrExt;

        let (dir, run) = tree();
        let data = dir.path().join("step0").join("matrix");
        fs::create_dir_all(&data).unwrap();
        let raw = OsStr::from_bytes(b"vel\xffocity.csv");
        fs::write(data.join(raw), "1").unwrap();

        let fields = run.fields("step0", &NameFilter::default()).unwrap();
        assert_eq!(fields, vec![FieldFile::new(raw)]);
        assert_eq!(fields[0].label(), "vel\u{fffd}ocity.csv");
        assert!(run.field_path("step0", fields[0].file_name()).is_file());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_step_name_is_an_error() {
        use std::os::unix::ffi::OsStrExt;

        let (dir, run) = tree();
        fs::create_dir(dir.path().join(OsStr::from_bytes(b"step\xff"))).unwrap();
        fs::create_dir(dir.path().join(OsStr::from_bytes(b"other\xff"))).unwrap();
        let err = run.steps(&NameFilter::default()).unwrap_err();
        assert_eq!(err.source.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn custom_layout_paths() {
        let layout = Layout { data_subdir: "fields".into(), extension: "txt".into() };
        let run = RunTree::new("/r", layout);
        assert_eq!(run.data_dir("step1"), PathBuf::from("/r/step1/fields"));
        assert_eq!(run.field_path("step1", "e.txt"), PathBuf::from("/r/step1/fields/e.txt"));
    }

    #[test]
    fn basename_strips_only_exact_extension() {
        assert_eq!(field_basename("e.csv", "csv"), Some("e"));
        assert_eq!(field_basename("a.b.csv", "csv"), Some("a.b"));
        assert_eq!(field_basename("ecsv", "csv"), None);
        assert_eq!(field_basename("e.txt", "csv"), None);
    }

    #[test]
    fn empty_filter_allows_all() {
        assert!(NameFilter::default().allows("anything"));
        assert!(!NameFilter::new(["a"]).allows("b"));
    }
}
