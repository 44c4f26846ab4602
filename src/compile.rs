//! Translation of template text into render-script source.
//!
//! A template is split into tokens, and each token is handled according to
//! the directive it belongs to. The resulting statements are wrapped up as a
//! complete program by [`assemble`][assemble::assemble].

mod assemble;
mod emit;
mod include;
mod scan;
mod template;
mod tokenize;

pub use include::resolve_include;
pub use template::Template;

use crate::{loader::Loader, log::Error, options::Options};
use assemble::assemble;
pub(crate) use include::normalize;
use scan::Scanner;

/// Generate the render-script source of the given template text.
///
/// Includes are read through the loader as they are found.
///
/// # Errors
///
/// Returns an [`Error`] when the delimiters are invalid or the template
/// cannot be scanned.
pub(crate) fn generate(text: &str, options: &Options, loader: &dyn Loader) -> Result<String, Error> {
    options.delimiters().validate()?;

    let chain = options.filename().map(normalize).into_iter().collect();
    let body = Scanner::new(text, options, loader, chain)
        .scan()
        .map_err(|e| e.or_name(options.name()))?;
    tracing::debug!(
        name = options.name().as_deref().unwrap_or("template"),
        "generated {} bytes of source",
        body.len()
    );

    Ok(assemble(&body, text, options))
}

#[cfg(test)]
mod tests {
    use super::generate;
    use crate::{loader::MemoryLoader, log::INVALID_DELIMITERS, options::Options, syntax::Delimiters};

    #[test]
    fn test_generate() {
        let options = Options::new().with_debug(false);
        let source = generate("hi <%= name %>", &options, &MemoryLoader::new()).unwrap();

        assert_eq!(source, "with (locals) {\n; __append(\"hi \");\n; __append(name);\n}\n");
    }

    #[test]
    fn test_generate_invalid_delimiters() {
        let options = Options::new().with_delimiters(Delimiters::new().with_markers("", ""));
        let error = generate("", &options, &MemoryLoader::new()).unwrap_err();

        assert_eq!(error.reason(), INVALID_DELIMITERS);
    }

    #[test]
    fn test_generate_names_errors() {
        let options = Options::new().with_filename("views/bad.ejs");
        let error = generate("<%= oops", &options, &MemoryLoader::new()).unwrap_err();

        assert_eq!(error.get_name(), Some("views/bad.ejs"));
    }
}
