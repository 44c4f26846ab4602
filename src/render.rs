//! Evaluation of compiled templates.
//!
//! A [`Renderer`] walks the [`Program`][`crate::script::Program`] of a
//! [`Template`] and writes everything the program appends to its output
//! buffer.

mod compare;
mod native;
mod scope;

use crate::{
    compile::{normalize, Template},
    log::{error_not_defined, error_type, Error},
    pipe::to_text,
    script::{Expression, Iteration, Label, Operator, Statement, Unary},
    Engine, Store,
};
use compare::{apply, describe, is_truthy, negate, values_equal};
use scope::Scope;
use serde_json::{json, Map, Number, Value};
use std::{fmt::Display, path::PathBuf};

static NULL: Value = Value::Null;

/// Signals how control leaves a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Normal,
    Break,
}

/// Renders a [`Template`] with a [`Store`].
pub struct Renderer<'a> {
    /// Engine used to compile templates included while rendering.
    engine: &'a Engine,
    template: &'a Template,
    store: &'a Store,
    scope: Scope,
    /// Output written by the template.
    buffer: String,
    /// Errors caught by the enclosing `catch` clauses, innermost last.
    caught: Vec<Error>,
    /// Number of runtime includes above this template.
    depth: usize,
    /// Files being rendered, from the outermost template down to this one.
    chain: Vec<PathBuf>,
}

impl<'a> Renderer<'a> {
    /// Create a new Renderer.
    pub fn new(engine: &'a Engine, template: &'a Template, store: &'a Store) -> Self {
        Self {
            engine,
            template,
            store,
            scope: Scope::new(),
            buffer: String::new(),
            caught: vec![],
            depth: 0,
            chain: template.filename().map(normalize).into_iter().collect(),
        }
    }

    /// Set the number of runtime includes above this template, and the files
    /// that include it.
    #[inline]
    fn with_include(mut self, depth: usize, chain: Vec<PathBuf>) -> Self {
        self.depth = depth;
        self.chain = chain;

        self
    }

    /// Render the [`Template`] and return the output.
    ///
    /// The data of the [`Store`] is bound to the locals name of the template
    /// options.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the program faults, such as when it refers to
    /// an undefined name or applies an operator to incompatible types.
    pub fn render(mut self) -> Result<String, Error> {
        let template = self.template;
        self.scope
            .declare(template.options().locals_name(), self.store.to_value());
        self.execute_all(&template.program().body)?;

        Ok(self.buffer)
    }

    fn execute_all(&mut self, statements: &[Statement]) -> Result<Flow, Error> {
        for statement in statements {
            if self.execute(statement)? == Flow::Break {
                return Ok(Flow::Break);
            }
        }

        Ok(Flow::Normal)
    }

    /// Run `f` within a new frame of the [`Scope`], which is removed again
    /// whether or not `f` succeeds.
    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, Error>) -> Result<T, Error> {
        self.scope.push();
        let result = f(self);
        self.scope.pop();

        result
    }

    fn execute(&mut self, statement: &Statement) -> Result<Flow, Error> {
        match statement {
            Statement::Let(declarations) => {
                for (name, value) in declarations {
                    let value = match value {
                        Some(value) => self.evaluate(value)?,
                        None => Value::Null,
                    };
                    self.scope.declare(name.as_str(), value);
                }
            }
            Statement::Expression(expression) => {
                self.evaluate(expression)?;
            }
            Statement::Block(statements) => {
                return self.scoped(|renderer| renderer.execute_all(statements))
            }
            Statement::If {
                test,
                then,
                otherwise,
            } => {
                if is_truthy(&self.evaluate(test)?) {
                    return self.execute(then);
                }
                if let Some(otherwise) = otherwise {
                    return self.execute(otherwise);
                }
            }
            Statement::Switch { subject, arms } => {
                let subject = self.evaluate(subject)?;

                let mut start = None;
                'search: for (index, arm) in arms.iter().enumerate() {
                    for label in &arm.labels {
                        if let Label::Case(test) = label {
                            if values_equal(&subject, &self.evaluate(test)?) {
                                start = Some(index);
                                break 'search;
                            }
                        }
                    }
                }
                let start = start.or_else(|| {
                    arms.iter()
                        .position(|arm| arm.labels.contains(&Label::Default))
                });

                if let Some(start) = start {
                    self.scoped(|renderer| {
                        for arm in &arms[start..] {
                            if renderer.execute_all(&arm.body)? == Flow::Break {
                                break;
                            }
                        }
                        Ok(())
                    })?;
                }
            }
            Statement::For {
                iteration,
                key,
                value,
                collection,
                body,
            } => {
                let collection = self.evaluate(collection)?;
                for (entry_key, entry_value) in entries(*iteration, collection)? {
                    let flow = self.scoped(|renderer| {
                        if let Some(key) = key {
                            renderer.scope.declare(key.as_str(), entry_key);
                        }
                        if let Some(value) = value {
                            renderer.scope.declare(value.as_str(), entry_value);
                        }
                        renderer.execute(body)
                    })?;
                    if flow == Flow::Break {
                        break;
                    }
                }
            }
            Statement::With { object, body } => {
                let object = self.evaluate(object)?;
                self.scope.push_with(object);
                let flow = self.execute(body);
                self.scope.pop();

                return flow;
            }
            Statement::Try {
                body,
                binding,
                handler,
            } => {
                let error = match self.scoped(|renderer| renderer.execute_all(body)) {
                    Ok(flow) => return Ok(flow),
                    Err(error) => error,
                };
                tracing::trace!(reason = error.reason(), "caught render fault");

                let caught = json!({"message": error.reason(), "name": error.get_name()});
                let mark = self.caught.len();
                self.caught.push(error);
                let flow = self.scoped(|renderer| {
                    renderer.scope.declare(binding.as_str(), caught);
                    renderer.execute_all(handler)
                });
                self.caught.truncate(mark);

                return flow;
            }
            Statement::Break => return Ok(Flow::Break),
        }

        Ok(Flow::Normal)
    }

    /// Find the value of a chain of names and members in place.
    ///
    /// Returns `None` when some part of the chain is not stored anywhere,
    /// such as the `length` of a list, and must be evaluated instead.
    fn resolve(&self, expression: &Expression) -> Result<Option<&Value>, Error> {
        let value = match expression {
            Expression::Identifier(name) => {
                self.scope.get(name).ok_or_else(|| error_not_defined(name))?
            }
            Expression::This => self.template.options().context(),
            Expression::Member(object, name) => match self.resolve(object)? {
                Some(Value::Object(object)) => object.get(name).unwrap_or(&NULL),
                Some(Value::Null) => return Err(error_read_null(name)),
                Some(Value::Array(_) | Value::String(_)) if name == "length" => return Ok(None),
                Some(_) => &NULL,
                None => return Ok(None),
            },
            _ => return Ok(None),
        };

        Ok(Some(value))
    }

    fn evaluate(&mut self, expression: &Expression) -> Result<Value, Error> {
        let value = match expression {
            Expression::Literal(value) => value.clone(),
            Expression::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.evaluate(item))
                    .collect::<Result<_, _>>()?,
            ),
            Expression::Object(entries) => {
                let mut object = Map::new();
                for (key, value) in entries {
                    object.insert(key.clone(), self.evaluate(value)?);
                }
                Value::Object(object)
            }
            Expression::Identifier(name) => self
                .scope
                .get(name)
                .cloned()
                .ok_or_else(|| error_not_defined(name))?,
            Expression::This => self.template.options().context().clone(),
            Expression::Member(object, name) => {
                let resolved = self.resolve(object)?.map(|object| member(object, name));
                match resolved {
                    Some(value) => value?,
                    None => member(&self.evaluate(object)?, name)?,
                }
            }
            Expression::Index(object, index) => {
                let object = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                match (&object, &index) {
                    (Value::Null, _) => return Err(error_read_null(to_text(&index))),
                    (Value::Array(items), Value::Number(number)) => position(number)
                        .and_then(|p| items.get(p))
                        .cloned()
                        .unwrap_or(Value::Null),
                    (Value::String(string), Value::Number(number)) => position(number)
                        .and_then(|p| string.chars().nth(p))
                        .map(|c| Value::String(c.to_string()))
                        .unwrap_or(Value::Null),
                    (object, index) => member(object, &to_text(index))?,
                }
            }
            Expression::Call(name, arguments) => {
                let arguments = arguments
                    .iter()
                    .map(|argument| self.evaluate(argument))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(name, arguments)?
            }
            Expression::Unary(Unary::Not, operand) => Value::Bool(!is_truthy(&self.evaluate(operand)?)),
            Expression::Unary(Unary::Negate, operand) => negate(&self.evaluate(operand)?)?,
            Expression::Binary(left, operator @ (Operator::And | Operator::Or), right) => {
                let left = self.evaluate(left)?;
                if is_truthy(&left) == (*operator == Operator::And) {
                    self.evaluate(right)?
                } else {
                    left
                }
            }
            Expression::Binary(left, operator, right) => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                apply(&left, *operator, &right)?
            }
            Expression::Conditional(test, then, otherwise) => {
                if is_truthy(&self.evaluate(test)?) {
                    self.evaluate(then)?
                } else {
                    self.evaluate(otherwise)?
                }
            }
            Expression::Assign(target, value) => {
                let value = self.evaluate(value)?;
                self.assign(target, value.clone())?;
                value
            }
        };

        Ok(value)
    }

    /// Store the value in the place described by the target expression.
    fn assign(&mut self, target: &Expression, value: Value) -> Result<(), Error> {
        let mut path = vec![];
        let mut current = target;
        let root = loop {
            match current {
                Expression::Identifier(name) => break name,
                Expression::Member(object, name) => {
                    path.push(Segment::Key(name.clone()));
                    current = object;
                }
                Expression::Index(object, index) => {
                    let index = self.evaluate(index)?;
                    path.push(Segment::from_value(&index)?);
                    current = object;
                }
                _ => return Err(error_type("only a name, member or index may be assigned to")),
            }
        };

        if path.is_empty() {
            self.scope.assign(root, value);
            return Ok(());
        }
        path.reverse();
        let slot = self
            .scope
            .get_mut(root)
            .ok_or_else(|| error_not_defined(root))?;

        set_path(slot, &path, value)
    }
}

/// One step of an assignment path, such as `.name` or `[0]`.
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Key(String),
    Position(usize),
}

impl Segment {
    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::String(key) => Ok(Segment::Key(key.clone())),
            Value::Number(number) => position(number)
                .map(Segment::Position)
                .ok_or_else(|| error_type(format!("`{number}` is not a valid index"))),
            other => Err(error_type(format!("{} cannot be used as an index", describe(other)))),
        }
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Key(key) => write!(f, "{key}"),
            Segment::Position(position) => write!(f, "{position}"),
        }
    }
}

fn set_path(target: &mut Value, path: &[Segment], value: Value) -> Result<(), Error> {
    let Some((segment, rest)) = path.split_first() else {
        *target = value;
        return Ok(());
    };

    let next = match (target, segment) {
        (Value::Object(object), segment) => {
            let key = segment.to_string();
            if rest.is_empty() {
                object.insert(key, value);
                return Ok(());
            }
            object.get_mut(&key)
        }
        (Value::Array(items), Segment::Position(position)) => {
            if rest.is_empty() && *position == items.len() {
                items.push(value);
                return Ok(());
            }
            items.get_mut(*position)
        }
        (other, segment) => {
            return Err(error_type(format!(
                "cannot set `{segment}` on {}",
                describe(other)
            )))
        }
    };

    match next {
        Some(next) => set_path(next, rest, value),
        None => Err(error_type(format!("cannot set properties of null (setting `{segment}`)"))),
    }
}

/// Read a member of a value.
///
/// Missing members read as null, as does any member of a boolean or number.
/// `length` is available on arrays and strings.
fn member(object: &Value, name: &str) -> Result<Value, Error> {
    let value = match object {
        Value::Object(object) => object.get(name).cloned().unwrap_or(Value::Null),
        Value::Array(items) if name == "length" => Value::from(items.len()),
        Value::String(string) if name == "length" => Value::from(string.chars().count()),
        Value::Null => return Err(error_read_null(name)),
        _ => Value::Null,
    };

    Ok(value)
}

fn error_read_null<T>(name: T) -> Error
where
    T: Display,
{
    error_type(format!("cannot read properties of null (reading `{name}`)"))
}

/// Return the number as a position within a list, if it is a whole,
/// non-negative number.
fn position(number: &Number) -> Option<usize> {
    if let Some(integer) = number.as_u64() {
        return usize::try_from(integer).ok();
    }
    number
        .as_f64()
        .filter(|float| float.fract() == 0.0 && *float >= 0.0)
        .map(|float| float as usize)
}

/// Return the key and value of every entry the loop visits.
fn entries(iteration: Iteration, collection: Value) -> Result<Vec<(Value, Value)>, Error> {
    let entries = match (iteration, collection) {
        (_, Value::Null) => return Err(error_type("null is not iterable")),
        (_, Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (Value::from(index), item))
            .collect(),
        (Iteration::Of, Value::String(string)) => string
            .chars()
            .enumerate()
            .map(|(index, c)| (Value::from(index), Value::String(c.to_string())))
            .collect(),
        (Iteration::In, Value::Object(object)) => object
            .into_iter()
            .map(|(key, value)| (Value::String(key), value))
            .collect(),
        (Iteration::In, _) => vec![],
        (Iteration::Of, other) => {
            return Err(error_type(format!(
                "{} is not iterable, use `in` to iterate the keys of a map",
                describe(&other)
            )))
        }
    };

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::Renderer;
    use crate::{
        compile::Template,
        script::Expression,
        log::{REFERENCE_ERROR, TYPE_ERROR},
        options::Options,
        Engine, Store,
    };
    use serde_json::json;

    fn run(source: &str, store: &Store) -> Result<String, crate::log::Error> {
        let options = Options::new().with_context(json!({"site": "kiln"}));
        let template = Template::load(source.into(), &options)?;
        Renderer::new(&Engine::default(), &template, store).render()
    }

    #[test]
    fn test_append_and_locals() {
        let store = Store::new().with_must("name", "taylor");
        assert_eq!(run("__append(\"hi \", locals.name)", &store).unwrap(), "hi taylor");
    }

    #[test]
    fn test_with_scope() {
        let store = Store::new().with_must("user", json!({"name": "taylor"}));
        assert_eq!(run("with (locals) { __append(user.name) }", &store).unwrap(), "taylor");
    }

    #[test]
    fn test_resolve_member_chain_in_place() {
        let options = Options::new();
        let template = Template::load("".into(), &options).unwrap();
        let engine = Engine::default();
        let store = Store::new();
        let mut renderer = Renderer::new(&engine, &template, &store);
        renderer
            .scope
            .declare("data", json!({"a": {"b": [1, 2]}, "n": null}));

        let name = |name: &str| Box::new(Expression::Identifier(name.into()));
        let path = Expression::Member(Box::new(Expression::Member(name("data"), "a".into())), "b".into());
        let resolved = renderer.resolve(&path).unwrap().unwrap();
        assert!(std::ptr::eq(resolved, &renderer.scope.get("data").unwrap()["a"]["b"]));

        let length = Expression::Member(Box::new(path), "length".into());
        assert_eq!(renderer.resolve(&length).unwrap(), None);
        assert_eq!(renderer.evaluate(&length).unwrap(), json!(2));

        let missing = Expression::Member(name("data"), "x".into());
        assert_eq!(renderer.resolve(&missing).unwrap(), Some(&json!(null)));

        let through_null = Expression::Member(Box::new(Expression::Member(name("data"), "n".into())), "x".into());
        assert!(renderer.resolve(&through_null).unwrap_err().reason().starts_with(TYPE_ERROR));
    }

    #[test]
    fn test_declarations_and_assignment() {
        let source = "let a = 1, b; b = a + 1; c = [1, {d: 2}]; c[1].d = 3; c[2] = 4; __append(a, b, c[1].d, len(c))";
        assert_eq!(run(source, &Store::new()).unwrap(), "1233");
    }

    #[test]
    fn test_blocks_scope_declarations() {
        let error = run("{ let a = 1; } __append(a)", &Store::new()).unwrap_err();
        assert_eq!(error.reason(), format!("{REFERENCE_ERROR}: `a` is not defined"));
    }

    #[test]
    fn test_switch_fallthrough() {
        let source = "switch (2) { case 1: __append(\"a\"); case 2: __append(\"b\"); case 3: __append(\"c\"); break; default: __append(\"d\"); }";
        assert_eq!(run(source, &Store::new()).unwrap(), "bc");

        let source = "switch (9) { default: __append(\"d\"); case 1: __append(\"a\"); break; }";
        assert_eq!(run(source, &Store::new()).unwrap(), "da");
    }

    #[test]
    fn test_loops() {
        let store = Store::new()
            .with_must("list", json!(["a", "b", "c"]))
            .with_must("map", json!({"x": 1, "y": 2}));
        let source = "for (i, v of locals.list) { if (i == 2) break; __append(i, v) } \
            for (k, v in locals.map) __append(k, \"=\", v, \";\") \
            for (c of \"hi\") __append(c, \".\")";

        assert_eq!(run(source, &store).unwrap(), "0a1bx=1;y=2;h.i.");
    }

    #[test]
    fn test_loop_over_null() {
        let error = run("for (v of locals.missing) {}", &Store::new()).unwrap_err();
        assert!(error.reason().starts_with(TYPE_ERROR));
    }

    #[test]
    fn test_try_catch() {
        let source = "try { __append(\"a\"); missing } catch (e) { __append(e.message) }";
        assert_eq!(
            run(source, &Store::new()).unwrap(),
            "areference error: `missing` is not defined"
        );
    }

    #[test]
    fn test_rethrow_context() {
        let source = "let __line = 2; try { missing } catch (e) { rethrow(e, \"a\\nb\", \"t.ejs\", __line) }";
        let error = run(source, &Store::new()).unwrap_err();

        assert!(error.reason().starts_with("t.ejs:2\n"));
        assert!(error.reason().contains(" >> 2| b"));
        assert!(error.reason().ends_with("`missing` is not defined"));
        assert_eq!(error.get_name(), Some("t.ejs"));
    }

    #[test]
    fn test_member_access() {
        let store = Store::new().with_must("user", json!({"tags": ["x"]}));
        assert_eq!(
            run("__append(locals.user.tags.length, locals.user.none, \"ab\".length, this.site)", &store).unwrap(),
            "12kiln"
        );
        assert!(run("__append(locals.nothing.name)", &store).is_err());
    }

    #[test]
    fn test_unknown_function() {
        let error = run("system(\"ls\")", &Store::new()).unwrap_err();
        assert!(error.reason().starts_with(TYPE_ERROR));
    }

    #[test]
    fn test_escape_and_logic() {
        let store = Store::new().with_must("html", "<b>");
        assert_eq!(
            run("__append(escape(locals.html), locals.x || \"-\", !0 ? \"y\" : \"n\")", &store).unwrap(),
            "&lt;b&gt;-y"
        );
    }
}
