use super::emit::quote;
use std::path::{Component, Path, PathBuf};

/// Return the path named by an include directive such as `include header`,
/// if the fragment is one.
///
/// Only the first word after `include` is used, surrounding quotes are
/// removed.
pub fn directive(fragment: &str) -> Option<&str> {
    let rest = fragment.trim_start().strip_prefix("include")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let path = rest.split_whitespace().next()?;

    Some(unquote(path))
}

fn unquote(path: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = path
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }

    path
}

/// Resolve an include path against the file that includes it.
///
/// Relative paths are joined to the directory of `filename` (or the current
/// directory when there is none), `.` and `..` components are resolved
/// lexically, and `extension` is appended when the path has none.
///
/// # Examples
///
/// ```
/// use kiln::resolve_include;
/// use std::path::{Path, PathBuf};
///
/// let path = resolve_include("../shared/header", Some(Path::new("views/pages/index.ejs")), "ejs");
/// assert_eq!(path, PathBuf::from("views/shared/header.ejs"));
/// ```
pub fn resolve_include(name: &str, filename: Option<&Path>, extension: &str) -> PathBuf {
    let directory = filename.and_then(Path::parent).unwrap_or(Path::new(""));
    let mut path = normalize(&directory.join(name));

    if path.extension().is_none() && !extension.is_empty() {
        let mut text = path.into_os_string();
        text.push(".");
        text.push(extension);
        path = PathBuf::from(text);
    }

    path
}

/// Resolve `.` and `..` components of the path without touching the file
/// system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normal = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normal.components().next_back() {
                Some(Component::Normal(_)) => {
                    normal.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normal.push(".."),
            },
            component => normal.push(component),
        }
    }

    normal
}

/// Wrap the generated source of an included file in its own block.
///
/// When debugging, the block carries the text and name of the included file
/// along with its own line counter, so that faults point into the included
/// file rather than the one including it.
pub fn splice(source: &str, text: &str, filename: Option<&str>, debug: bool) -> String {
    if !debug {
        return format!("; {{\n{source}; }}\n");
    }

    format!("; {{\n{}; }}\n", harness(source, text, filename))
}

/// Return the source wrapped in the fault context harness.
pub fn harness(source: &str, text: &str, filename: Option<&str>) -> String {
    let filename = match filename {
        Some(filename) => quote(filename),
        None => "null".into(),
    };

    format!(
        "let __line = 1, __lines = {}, __filename = {filename};\n\
        try {{\n{source}}} catch (__error) {{\n\
        rethrow(__error, __lines, __filename, __line);\n}}\n",
        quote(text)
    )
}

#[cfg(test)]
mod tests {
    use super::{directive, harness, normalize, resolve_include, splice};
    use std::path::{Path, PathBuf};

    #[test]
    fn test_directive() {
        assert_eq!(directive(" include header "), Some("header"));
        assert_eq!(directive("include \"a b\""), Some("\"a"));
        assert_eq!(directive("include 'user/show' "), Some("user/show"));
        assert_eq!(directive("includes"), None);
        assert_eq!(directive("include"), None);
        assert_eq!(directive("x = include"), None);
    }

    #[test]
    fn test_resolve_include() {
        let parent = Some(Path::new("views/users/show.ejs"));

        assert_eq!(resolve_include("header", parent, "ejs"), PathBuf::from("views/users/header.ejs"));
        assert_eq!(resolve_include("./a/b.html", parent, "ejs"), PathBuf::from("views/users/a/b.html"));
        assert_eq!(resolve_include("../../x", parent, "ejs"), PathBuf::from("x.ejs"));
        assert_eq!(resolve_include("header", None, "ejs"), PathBuf::from("header.ejs"));
        assert_eq!(resolve_include("header", None, ""), PathBuf::from("header"));
        assert_eq!(
            resolve_include("/abs/file", parent, "ejs"),
            PathBuf::from("/abs/file.ejs")
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("a/./b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_splice() {
        assert_eq!(splice("x\n", "t", None, false), "; {\nx\n; }\n");

        let spliced = splice("x\n", "a\nb", Some("part.ejs"), true);
        assert!(spliced.starts_with("; {\nlet __line = 1, __lines = \"a\\nb\", __filename = \"part.ejs\";\n"));
        assert!(spliced.ends_with("}\n; }\n"));
    }

    #[test]
    fn test_harness_without_filename() {
        assert!(harness("", "", None).contains("__filename = null;"));
    }
}
