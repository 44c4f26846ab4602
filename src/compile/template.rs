use crate::{
    log::Error,
    options::Options,
    script::{Parser, Program},
};
use std::path::Path;

/// A compiled template, ready to be rendered by an
/// [`Engine`][`crate::Engine`] with a [`Store`][`crate::Store`].
#[derive(Debug, Clone)]
pub struct Template {
    /// The generated render-script source.
    source: String,
    /// Parsed form of the generated source.
    program: Program,
    /// Options the template was compiled with.
    options: Options,
}

impl Template {
    /// Create a [`Template`] from generated source, such as the source held
    /// by a cache.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] with a pointer into the generated source when it
    /// is not valid render-script.
    pub fn load(source: String, options: &Options) -> Result<Self, Error> {
        let program = Parser::new(&source)
            .parse()
            .map_err(|e| e.or_name(options.name()))?;

        Ok(Self {
            source,
            program,
            options: options.clone(),
        })
    }

    /// Return the generated render-script source.
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[inline]
    pub fn filename(&self) -> Option<&Path> {
        self.options.filename()
    }

    #[inline]
    pub(crate) fn program(&self) -> &Program {
        &self.program
    }
}

#[cfg(test)]
mod tests {
    use super::Template;
    use crate::{log::INVALID_SYNTAX, options::Options};

    #[test]
    fn test_load() {
        let template = Template::load("; __append(\"a\");\n".into(), &Options::new()).unwrap();
        assert_eq!(template.source(), "; __append(\"a\");\n");
        assert!(template.filename().is_none());
    }

    #[test]
    fn test_load_invalid() {
        let options = Options::new().with_filename("broken.ejs");
        let error = Template::load("; __append(a;".into(), &options).unwrap_err();

        assert_eq!(error.reason(), INVALID_SYNTAX);
        assert_eq!(error.get_name(), Some("broken.ejs"));
    }
}
