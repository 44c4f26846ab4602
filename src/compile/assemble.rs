use super::include::harness;
use crate::options::Options;

/// Produce the full generated source of a template from the body produced
/// by scanning it.
///
/// With dynamic scope enabled the body runs inside `with (<locals name>)`,
/// so the keys of the data are reachable as bare identifiers. With debug
/// instrumentation enabled the whole program is wrapped in the fault context
/// harness, which records the template text and name and contextualizes any
/// fault raised while rendering.
pub fn assemble(body: &str, text: &str, options: &Options) -> String {
    let source = if options.use_with() {
        format!("with ({}) {{\n{body}}}\n", options.locals_name())
    } else {
        body.to_owned()
    };

    if options.debug() {
        harness(&source, text, options.name().as_deref())
    } else {
        source
    }
}

#[cfg(test)]
mod tests {
    use super::assemble;
    use crate::options::Options;

    #[test]
    fn test_plain() {
        let options = Options::new().with_debug(false).with_use_with(false);
        assert_eq!(assemble("; a\n", "", &options), "; a\n");
    }

    #[test]
    fn test_with_scope() {
        let options = Options::new().with_debug(false).with_locals_name("data");
        assert_eq!(assemble("; a\n", "", &options), "with (data) {\n; a\n}\n");
    }

    #[test]
    fn test_debug_harness() {
        let options = Options::new()
            .with_use_with(false)
            .with_filename("page.ejs");
        let source = assemble("; a\n", "<%= a %>", &options);

        assert_eq!(
            source,
            "let __line = 1, __lines = \"<%= a %>\", __filename = \"page.ejs\";\n\
            try {\n; a\n} catch (__error) {\n\
            rethrow(__error, __lines, __filename, __line);\n}\n"
        );
    }
}
