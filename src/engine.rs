use crate::{
    cache::{Artifact, Cache, MemoryCache},
    compile::{generate, Template},
    loader::{FileSystem, Loader},
    log::{error_missing_filename, Error},
    options::Options,
    render::Renderer,
    Store,
};
use std::sync::Arc;

/// Facilitates compiling and rendering templates, and holds the [`Cache`]
/// and [`Loader`] used to do so.
pub struct Engine {
    /// Compiled templates, keyed by filename.
    cache: Box<dyn Cache>,
    /// Reads template files and the files they include.
    loader: Box<dyn Loader>,
}

impl Engine {
    /// Create a new [`Engine`] which caches templates in a [`MemoryCache`]
    /// and reads them from the [`FileSystem`].
    #[inline]
    pub fn new() -> Self {
        Self {
            cache: Box::new(MemoryCache::new()),
            loader: Box::new(FileSystem),
        }
    }

    /// Set the [`Cache`].
    #[inline]
    pub fn set_cache<T>(&mut self, cache: T)
    where
        T: Cache + 'static,
    {
        self.cache = Box::new(cache);
    }

    /// Set the [`Cache`].
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    #[inline]
    pub fn with_cache<T>(mut self, cache: T) -> Self
    where
        T: Cache + 'static,
    {
        self.set_cache(cache);

        self
    }

    /// Set the [`Loader`].
    #[inline]
    pub fn set_loader<T>(&mut self, loader: T)
    where
        T: Loader + 'static,
    {
        self.loader = Box::new(loader);
    }

    /// Set the [`Loader`].
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    #[inline]
    pub fn with_loader<T>(mut self, loader: T) -> Self
    where
        T: Loader + 'static,
    {
        self.set_loader(loader);

        self
    }

    /// Compile a new [`Template`] from the given text.
    ///
    /// Files included by the text are read through the [`Loader`], relative
    /// to the filename of the [`Options`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when compilation fails, which most likely means the
    /// text contains a malformed directive.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiln::{Engine, Options};
    ///
    /// let engine = Engine::default();
    /// let template = engine.compile("hello, <%= name %>!", &Options::new());
    /// assert!(template.is_ok());
    /// ```
    pub fn compile(&self, text: &str, options: &Options) -> Result<Template, Error> {
        let source = generate(text, options, self.loader.as_ref())?;

        Template::load(source, options)
    }

    /// Compile the file named by the filename of the [`Options`].
    ///
    /// When caching is enabled, a cached [`Template`] is returned without
    /// reading the file again, and a newly compiled one is stored.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the [`Options`] have no filename, or when
    /// compilation fails.
    pub fn compile_file(&self, options: &Options) -> Result<Arc<Template>, Error> {
        let path = options
            .filename()
            .ok_or_else(|| error_missing_filename("compiling a file"))?;
        let key = path.to_string_lossy().into_owned();

        self.cached(&key, options, || self.loader.read(path, options.encoding()))
    }

    /// Return the cached [`Template`] for the key when caching is enabled,
    /// or compile the text produced by `read`.
    fn cached<F>(&self, key: &str, options: &Options, read: F) -> Result<Arc<Template>, Error>
    where
        F: FnOnce() -> String,
    {
        if options.cache() {
            match self.cache.get(key) {
                Some(Artifact::Compiled(template)) => {
                    tracing::debug!(key, "template cache hit");
                    return Ok(template);
                }
                Some(Artifact::Source(source)) => {
                    tracing::debug!(key, "template source cache hit");
                    return Template::load(source, options).map(Arc::new);
                }
                None => tracing::debug!(key, "template cache miss"),
            }
        }

        let template = Arc::new(self.compile(&read(), options)?);
        if options.cache() {
            self.cache.set(key, Artifact::Compiled(template.clone()));
        }

        Ok(template)
    }

    /// Render a [`Template`] with the given [`Store`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when rendering fails. When the template was
    /// compiled in debug mode, the reason of the `Error` names the template
    /// line that failed.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiln::{Engine, Options, Store};
    ///
    /// let engine = Engine::default();
    /// let template = engine.compile("hello, <%= name %>!", &Options::new()).unwrap();
    /// let result = engine.render(&template, &Store::new().with_must("name", "taylor"));
    ///
    /// assert_eq!(result.unwrap(), "hello, taylor!");
    /// ```
    pub fn render(&self, template: &Template, store: &Store) -> Result<String, Error> {
        Renderer::new(self, template, store)
            .render()
            .map_err(|e| e.or_name(template.options().name()))
    }

    /// Compile and render the file named by the filename of the [`Options`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the [`Options`] have no filename, or when
    /// compilation or rendering fails.
    pub fn render_file(&self, store: &Store, options: &Options) -> Result<String, Error> {
        let template = self.compile_file(options)?;

        self.render(&template, store)
    }

    /// Compile and render the given text.
    ///
    /// When caching is enabled the compiled [`Template`] is cached under the
    /// filename of the [`Options`], which is then required.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when caching is enabled without a filename, or
    /// when compilation or rendering fails.
    pub fn render_text(&self, text: &str, store: &Store, options: &Options) -> Result<String, Error> {
        let template = if options.cache() {
            let filename = options
                .name()
                .ok_or_else(|| error_missing_filename("caching"))?;
            self.cached(&filename, options, || text.to_owned())?
        } else {
            Arc::new(self.compile(text, options)?)
        };

        self.render(&template, store)
    }

    /// Remove every [`Template`] from the [`Cache`].
    #[inline]
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
