use crate::options::Encoding;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

/// Reads the text of template files.
pub trait Loader: Send + Sync {
    /// Return the text of the file at the given path, decoded with the
    /// given [`Encoding`] and without a leading byte order mark.
    ///
    /// A file that cannot be read produces empty text.
    fn read(&self, path: &Path, encoding: Encoding) -> String;
}

/// A [`Loader`] that reads from the file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystem;

impl Loader for FileSystem {
    fn read(&self, path: &Path, encoding: Encoding) -> String {
        match std::fs::read(path) {
            Ok(bytes) => strip_bom(encoding.decode(&bytes)),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "template file could not be read");
                String::new()
            }
        }
    }
}

/// A [`Loader`] over files held in memory.
///
/// # Examples
///
/// ```
/// use kiln::{Engine, MemoryLoader, Options, Store};
///
/// let loader = MemoryLoader::new()
///     .with_file("views/page.ejs", "<% include header %>body")
///     .with_file("views/header.ejs", "head ");
/// let engine = Engine::new().with_loader(loader);
///
/// let options = Options::new().with_filename("views/page.ejs");
/// assert_eq!(engine.render_file(&Store::new(), &options).unwrap(), "head body");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    /// Create a new, empty [`MemoryLoader`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given path and text.
    pub fn insert<P, T>(&mut self, path: P, text: T)
    where
        P: Into<PathBuf>,
        T: Into<String>,
    {
        self.files.insert(path.into(), text.into());
    }

    /// Add a file with the given path and text.
    ///
    /// Returns the [`MemoryLoader`], so additional methods may be chained.
    #[inline]
    pub fn with_file<P, T>(mut self, path: P, text: T) -> Self
    where
        P: Into<PathBuf>,
        T: Into<String>,
    {
        self.insert(path, text);

        self
    }
}

impl Loader for MemoryLoader {
    fn read(&self, path: &Path, _: Encoding) -> String {
        match self.files.get(path) {
            Some(text) => strip_bom(text.clone()),
            None => {
                tracing::warn!(path = %path.display(), "template file not found");
                String::new()
            }
        }
    }
}

/// Remove a leading byte order mark.
fn strip_bom(text: String) -> String {
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_owned(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::{FileSystem, Loader, MemoryLoader};
    use crate::options::Encoding;
    use std::{fs, path::Path};

    #[test]
    fn test_file_system() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("page.ejs");
        fs::write(&path, "\u{feff}hello").unwrap();

        assert_eq!(FileSystem.read(&path, Encoding::Utf8), "hello");
    }

    #[test]
    fn test_file_system_latin1() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("page.ejs");
        fs::write(&path, [b'c', 0xe9]).unwrap();

        assert_eq!(FileSystem.read(&path, Encoding::Latin1), "c\u{e9}");
    }

    #[test]
    fn test_missing_file() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("missing.ejs");

        assert_eq!(FileSystem.read(&path, Encoding::Utf8), "");
        assert_eq!(MemoryLoader::new().read(&path, Encoding::Utf8), "");
    }

    #[test]
    fn test_memory() {
        let loader = MemoryLoader::new().with_file("a.ejs", "\u{feff}a");
        assert_eq!(loader.read(Path::new("a.ejs"), Encoding::Utf8), "a");
    }
}
