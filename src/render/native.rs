use super::{compare::describe, Renderer};
use crate::{
    compile::resolve_include,
    log::{error_type, error_write, rethrow, Error, INCLUDE_CYCLE, INCLUDE_DEPTH},
    pipe::{to_text, Pipe},
};
use serde_json::Value;

/// Number of nested runtime includes allowed before rendering fails.
pub const MAX_INCLUDE_DEPTH: usize = 16;

impl Renderer<'_> {
    /// Call the native function with the given name.
    ///
    /// These are the only functions a template can call:
    ///
    /// - `__append(values...)` writes each value to the output.
    /// - `escape(value)` returns the value as escaped text.
    /// - `include(path[, data])` renders another template and returns its output.
    /// - `rethrow(error, lines, filename, line)` fails with the caught error,
    ///   annotated with the template location.
    /// - `len(value)` returns the length of an array, string or map.
    /// - `keys(value)` returns the keys of a map.
    pub(super) fn call(&mut self, name: &str, arguments: Vec<Value>) -> Result<Value, Error> {
        match name {
            "__append" => {
                let mut pipe = Pipe::new(&mut self.buffer);
                for argument in &arguments {
                    pipe.write_value(argument).map_err(|_| error_write())?;
                }
                Ok(Value::Null)
            }
            "escape" => {
                let escape = self.template.options().escape();
                Ok(Value::String(escape(&to_text(argument(&arguments, 0)))))
            }
            "include" => self.include(&arguments),
            "rethrow" => Err(self.rethrow(&arguments)),
            "len" => match argument(&arguments, 0) {
                Value::Array(items) => Ok(Value::from(items.len())),
                Value::String(string) => Ok(Value::from(string.chars().count())),
                Value::Object(object) => Ok(Value::from(object.len())),
                _ => Ok(Value::from(0)),
            },
            "keys" => match argument(&arguments, 0) {
                Value::Object(object) => Ok(Value::Array(
                    object.keys().cloned().map(Value::String).collect(),
                )),
                _ => Ok(Value::Array(vec![])),
            },
            name => Err(error_type(format!("`{name}` is not a function"))),
        }
    }

    /// Render the template at the given path with the data of this render,
    /// merged with the optional data argument.
    fn include(&mut self, arguments: &[Value]) -> Result<Value, Error> {
        if self.depth >= MAX_INCLUDE_DEPTH {
            return Err(Error::build(INCLUDE_DEPTH).with_help(format!(
                "templates may include each other at most {MAX_INCLUDE_DEPTH} levels deep"
            )));
        }

        let name = match argument(arguments, 0) {
            Value::String(name) => name,
            other => {
                return Err(error_type(format!(
                    "include path must be a string, found {}",
                    describe(other)
                )))
            }
        };
        let options = self.template.options();
        let path = resolve_include(name, options.filename(), options.extension());
        if self.chain.contains(&path) {
            let trail: Vec<String> = self
                .chain
                .iter()
                .chain(std::iter::once(&path))
                .map(|path| path.display().to_string())
                .collect();

            return Err(Error::build(INCLUDE_CYCLE).with_help(trail.join(" -> ")));
        }
        tracing::debug!(path = %path.display(), depth = self.depth + 1, "including template");

        let options = options.clone().with_filename(&path);
        let mut chain = self.chain.clone();
        chain.push(path);
        let template = self.engine.compile_file(&options)?;

        let mut store = self.store.clone();
        store.merge(argument(arguments, 1));

        let output = Renderer::new(self.engine, &template, &store)
            .with_include(self.depth + 1, chain)
            .render()?;

        Ok(Value::String(output))
    }

    /// Return the error caught by the innermost `catch`, annotated with a
    /// window of the template lines around the failure.
    fn rethrow(&mut self, arguments: &[Value]) -> Error {
        let error = self.caught.pop().unwrap_or_else(|| {
            let message = match argument(arguments, 0) {
                Value::Object(object) => object.get("message").map(to_text),
                other => Some(to_text(other)),
            };
            Error::build(message.unwrap_or_default())
        });

        let lines = to_text(argument(arguments, 1));
        let filename = match argument(arguments, 2) {
            Value::String(filename) => Some(filename.as_str()),
            _ => None,
        };
        let line = argument(arguments, 3)
            .as_u64()
            .and_then(|line| usize::try_from(line).ok())
            .unwrap_or(1);

        rethrow(error, &lines, filename, line)
    }
}

/// Return the argument at the given position, or null when it is missing.
fn argument(arguments: &[Value], index: usize) -> &Value {
    arguments.get(index).unwrap_or(&Value::Null)
}

#[cfg(test)]
mod tests {
    use super::MAX_INCLUDE_DEPTH;
    use crate::{
        compile::Template,
        loader::MemoryLoader,
        log::{INCLUDE_CYCLE, INCLUDE_DEPTH, TYPE_ERROR},
        options::Options,
        render::Renderer,
        Engine, Store,
    };

    fn run(source: &str) -> Result<String, crate::log::Error> {
        let template = Template::load(source.into(), &Options::new())?;
        Renderer::new(&Engine::default(), &template, &Store::new()).render()
    }

    #[test]
    fn test_len_and_keys() {
        assert_eq!(
            run("__append(len([1, 2]), len(\"abc\"), len({a: 1}), len(null), keys({b: 1, a: 2}))").unwrap(),
            "2310b,a"
        );
    }

    #[test]
    fn test_append_many() {
        assert_eq!(run("__append(1, null, \"x\", [2, 3])").unwrap(), "1x2,3");
    }

    #[test]
    fn test_include_path_type() {
        let error = run("include(1)").unwrap_err();
        assert!(error.reason().starts_with(TYPE_ERROR));
    }

    #[test]
    fn test_include_with_data() {
        let loader = MemoryLoader::new().with_file("views/part.ejs", "<%= locals.a %>-<%= b %>");
        let engine = Engine::new().with_loader(loader);
        let options = Options::new().with_filename("views/page.ejs");
        let template = Template::load(
            "__append(include(\"part\", {b: 2}))".into(),
            &options,
        )
        .unwrap();
        let store = Store::new().with_must("a", 1).with_must("b", 1);

        let output = Renderer::new(&engine, &template, &store).render().unwrap();
        assert_eq!(output, "1-2");
    }

    /// Run `f` on a thread with a stack as small as the default of spawned
    /// threads.
    fn on_small_stack<F>(f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        std::thread::Builder::new()
            .stack_size(2 << 20)
            .spawn(f)
            .unwrap()
            .join()
            .unwrap();
    }

    #[test]
    fn test_include_self() {
        on_small_stack(|| {
            let loader = MemoryLoader::new().with_file("self.ejs", "<%- include(\"self\") %>");
            let engine = Engine::new().with_loader(loader);
            let options = Options::new().with_filename("self.ejs");

            let error = engine.render_file(&Store::new(), &options).unwrap_err();
            assert!(error.reason().ends_with(INCLUDE_CYCLE));
            assert_eq!(error.help(), Some("self.ejs -> self.ejs"));
        });
    }

    #[test]
    fn test_include_cycle_between_files() {
        on_small_stack(|| {
            let loader = MemoryLoader::new()
                .with_file("a.ejs", "a<%- include(\"b\") %>")
                .with_file("b.ejs", "b<%- include(\"a\") %>");
            let engine = Engine::new().with_loader(loader);
            let options = Options::new().with_filename("a.ejs").with_debug(false);

            let error = engine.render_file(&Store::new(), &options).unwrap_err();
            assert_eq!(error.reason(), INCLUDE_CYCLE);
            assert_eq!(error.help(), Some("a.ejs -> b.ejs -> a.ejs"));
        });
    }

    #[test]
    fn test_include_depth() {
        on_small_stack(|| {
            let mut loader = MemoryLoader::new();
            for level in 0..=MAX_INCLUDE_DEPTH + 2 {
                let text = format!("<%- include(\"level{}\") %>", level + 1);
                loader = loader.with_file(format!("level{level}.ejs"), text);
            }
            let engine = Engine::new().with_loader(loader);
            let options = Options::new().with_filename("level0.ejs");

            let error = engine.render_file(&Store::new(), &options).unwrap_err();
            assert!(error.reason().ends_with(INCLUDE_DEPTH));
        });
    }

    #[test]
    fn test_include_same_file_twice() {
        let loader = MemoryLoader::new()
            .with_file("page.ejs", "<%- include(\"part\") %><%- include(\"part\") %>")
            .with_file("part.ejs", "x");
        let engine = Engine::new().with_loader(loader);
        let options = Options::new().with_filename("page.ejs");

        assert_eq!(engine.render_file(&Store::new(), &options).unwrap(), "xx");
    }

    #[test]
    fn test_rethrow_without_caught_error() {
        let error = run("rethrow({message: \"boom\"}, \"one\", null, 1)").unwrap_err();
        assert_eq!(error.reason(), "template:1\n >> 1| one\n\nboom");
        assert_eq!(error.get_name(), None);
    }
}
