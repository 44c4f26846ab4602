use crate::{escape::escape_html, log::Error, syntax::Delimiters};
use serde_json::Value;
use std::{
    fmt::{Debug, Display},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Signature of the function used to escape output written with the
/// escaped output directive.
pub type Escape = fn(&str) -> String;

/// Name of the data parameter, unless configured otherwise.
pub const DEFAULT_LOCALS_NAME: &str = "locals";

/// Extension appended to include paths which do not have one.
pub const DEFAULT_EXTENSION: &str = "ejs";

/// Text encoding of template files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// UTF-8, invalid sequences are replaced.
    #[default]
    Utf8,
    /// ISO-8859-1, every byte is one character.
    Latin1,
}

impl Encoding {
    /// Decode the given bytes into a string.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Latin1 => bytes.iter().map(|byte| char::from(*byte)).collect(),
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" | "binary" => Ok(Encoding::Latin1),
            _ => Err(Error::build("unsupported encoding")
                .with_help(format!("encoding `{s}` is not supported, use `utf8` or `latin1`"))),
        }
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Encoding::Utf8 => write!(f, "utf8"),
            Encoding::Latin1 => write!(f, "latin1"),
        }
    }
}

/// Options that control how a template is compiled and rendered.
///
/// # Examples
///
/// ```
/// use kiln::{Delimiters, Options};
///
/// let options = Options::new()
///     .with_filename("views/index.ejs")
///     .with_delimiters(Delimiters::new().with_markers("{{", "}}"))
///     .with_use_with(false)
///     .with_locals_name("data");
///
/// assert!(options.debug());
/// assert_eq!(options.locals_name(), "data");
/// ```
#[derive(Clone)]
pub struct Options {
    escape: Escape,
    debug: bool,
    filename: Option<PathBuf>,
    delimiters: Delimiters,
    context: Value,
    cache: bool,
    locals_name: String,
    encoding: Encoding,
    use_with: bool,
    extension: String,
}

impl Options {
    /// Create a new [`Options`] with the defaults: HTML escaping, debug
    /// instrumentation and dynamic scope enabled, caching disabled.
    #[inline]
    pub fn new() -> Self {
        Self {
            escape: escape_html,
            debug: true,
            filename: None,
            delimiters: Delimiters::new(),
            context: Value::Null,
            cache: false,
            locals_name: DEFAULT_LOCALS_NAME.into(),
            encoding: Encoding::Utf8,
            use_with: true,
            extension: DEFAULT_EXTENSION.into(),
        }
    }

    /// Set the escape function.
    #[inline]
    pub fn set_escape(&mut self, escape: Escape) {
        self.escape = escape;
    }

    /// Set the escape function.
    ///
    /// Returns the [`Options`], so additional methods may be chained.
    #[inline]
    pub fn with_escape(mut self, escape: Escape) -> Self {
        self.set_escape(escape);

        self
    }

    /// Enable or disable debug instrumentation.
    ///
    /// When enabled, faults raised while rendering carry the template
    /// filename, the failing line and the lines around it.
    #[inline]
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Enable or disable debug instrumentation.
    ///
    /// Returns the [`Options`], so additional methods may be chained.
    #[inline]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.set_debug(debug);

        self
    }

    /// Set the filename of the template.
    ///
    /// Include paths are resolved relative to the directory of this file, and
    /// the cache is keyed by it.
    #[inline]
    pub fn set_filename<P>(&mut self, filename: P)
    where
        P: Into<PathBuf>,
    {
        self.filename = Some(filename.into());
    }

    /// Set the filename of the template.
    ///
    /// Returns the [`Options`], so additional methods may be chained.
    #[inline]
    pub fn with_filename<P>(mut self, filename: P) -> Self
    where
        P: Into<PathBuf>,
    {
        self.set_filename(filename);

        self
    }

    /// Set the [`Delimiters`].
    #[inline]
    pub fn set_delimiters(&mut self, delimiters: Delimiters) {
        self.delimiters = delimiters;
    }

    /// Set the [`Delimiters`].
    ///
    /// Returns the [`Options`], so additional methods may be chained.
    #[inline]
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.set_delimiters(delimiters);

        self
    }

    /// Set the value that `this` refers to while rendering.
    #[inline]
    pub fn set_context(&mut self, context: Value) {
        self.context = context;
    }

    /// Set the value that `this` refers to while rendering.
    ///
    /// Returns the [`Options`], so additional methods may be chained.
    #[inline]
    pub fn with_context(mut self, context: Value) -> Self {
        self.set_context(context);

        self
    }

    /// Enable or disable caching of compiled templates by filename.
    #[inline]
    pub fn set_cache(&mut self, cache: bool) {
        self.cache = cache;
    }

    /// Enable or disable caching of compiled templates by filename.
    ///
    /// Returns the [`Options`], so additional methods may be chained.
    #[inline]
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.set_cache(cache);

        self
    }

    /// Set the name that the data is bound to while rendering.
    #[inline]
    pub fn set_locals_name<T>(&mut self, name: T)
    where
        T: Into<String>,
    {
        self.locals_name = name.into();
    }

    /// Set the name that the data is bound to while rendering.
    ///
    /// Returns the [`Options`], so additional methods may be chained.
    #[inline]
    pub fn with_locals_name<T>(mut self, name: T) -> Self
    where
        T: Into<String>,
    {
        self.set_locals_name(name);

        self
    }

    /// Set the [`Encoding`] of template files.
    #[inline]
    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
    }

    /// Set the [`Encoding`] of template files.
    ///
    /// Returns the [`Options`], so additional methods may be chained.
    #[inline]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.set_encoding(encoding);

        self
    }

    /// Enable or disable dynamic scope.
    ///
    /// When enabled, the keys of the data (and of each loop element) can be
    /// referred to as bare identifiers. When disabled, the data must be
    /// reached through the locals name, as in `locals.user`.
    #[inline]
    pub fn set_use_with(&mut self, use_with: bool) {
        self.use_with = use_with;
    }

    /// Enable or disable dynamic scope.
    ///
    /// Returns the [`Options`], so additional methods may be chained.
    #[inline]
    pub fn with_use_with(mut self, use_with: bool) -> Self {
        self.set_use_with(use_with);

        self
    }

    /// Set the extension appended to include paths that have none.
    #[inline]
    pub fn set_extension<T>(&mut self, extension: T)
    where
        T: Into<String>,
    {
        self.extension = extension.into();
    }

    /// Set the extension appended to include paths that have none.
    ///
    /// Returns the [`Options`], so additional methods may be chained.
    #[inline]
    pub fn with_extension<T>(mut self, extension: T) -> Self
    where
        T: Into<String>,
    {
        self.set_extension(extension);

        self
    }

    #[inline]
    pub fn escape(&self) -> Escape {
        self.escape
    }

    #[inline]
    pub fn debug(&self) -> bool {
        self.debug
    }

    #[inline]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Return the filename as a displayable string, if there is one.
    pub fn name(&self) -> Option<String> {
        self.filename
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned())
    }

    #[inline]
    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    #[inline]
    pub fn context(&self) -> &Value {
        &self.context
    }

    #[inline]
    pub fn cache(&self) -> bool {
        self.cache
    }

    #[inline]
    pub fn locals_name(&self) -> &str {
        &self.locals_name
    }

    #[inline]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    #[inline]
    pub fn use_with(&self) -> bool {
        self.use_with
    }

    #[inline]
    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("debug", &self.debug)
            .field("filename", &self.filename)
            .field("delimiters", &self.delimiters)
            .field("context", &self.context)
            .field("cache", &self.cache)
            .field("locals_name", &self.locals_name)
            .field("encoding", &self.encoding)
            .field("use_with", &self.use_with)
            .field("extension", &self.extension)
            .finish()
    }
}
