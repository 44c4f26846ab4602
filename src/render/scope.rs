use serde_json::{Map, Value};
use std::collections::HashMap;

/// A single level of the [`Scope`].
#[derive(Debug)]
enum Frame {
    /// Names declared with `let`, loop bindings and catch bindings.
    Bindings(HashMap<String, Value>),
    /// The keys of an object, made available by `with`.
    With(Map<String, Value>),
}

impl Frame {
    fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Frame::Bindings(bindings) => bindings.get(name),
            Frame::With(object) => object.get(name),
        }
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        match self {
            Frame::Bindings(bindings) => bindings.get_mut(name),
            Frame::With(object) => object.get_mut(name),
        }
    }
}

/// A stack of frames that names are resolved against while rendering.
///
/// Names are looked up from the innermost frame outward. The root frame is
/// never removed, and holds names that are assigned without being declared.
#[derive(Debug)]
pub struct Scope {
    frames: Vec<Frame>,
}

impl Scope {
    /// Create a new [`Scope`] with an empty root frame.
    #[inline]
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::Bindings(HashMap::new())],
        }
    }

    /// Push a new frame for declarations onto the [`Scope`].
    #[inline]
    pub fn push(&mut self) {
        self.frames.push(Frame::Bindings(HashMap::new()));
    }

    /// Push a frame holding the keys of the given value.
    ///
    /// Any value other than an object contributes no names.
    pub fn push_with(&mut self, value: Value) {
        let object = match value {
            Value::Object(object) => object,
            _ => Map::new(),
        };
        self.frames.push(Frame::With(object));
    }

    /// Remove the top frame from the [`Scope`].
    #[inline]
    pub fn pop(&mut self) {
        if self.frames.len() == 1 {
            panic!("last scope must never be removed");
        }
        self.frames.pop();
    }

    /// Declare a name in the innermost declaration frame.
    pub fn declare<S>(&mut self, name: S, value: Value)
    where
        S: Into<String>,
    {
        for frame in self.frames.iter_mut().rev() {
            if let Frame::Bindings(bindings) = frame {
                bindings.insert(name.into(), value);
                return;
            }
        }
    }

    /// Get the [`Value`] of the given name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Get a mutable reference to the [`Value`] of the given name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(name))
    }

    /// Assign to the innermost frame that holds the name, or declare the name
    /// in the root frame if none does.
    pub fn assign(&mut self, name: &str, value: Value) {
        match self.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                if let Some(Frame::Bindings(root)) = self.frames.first_mut() {
                    root.insert(name.into(), value);
                }
            }
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Scope;
    use serde_json::json;

    #[test]
    fn test_shadowing() {
        let mut scope = Scope::new();
        scope.declare("a", json!(1));
        scope.push();
        scope.declare("a", json!(2));

        assert_eq!(scope.get("a"), Some(&json!(2)));
        scope.pop();
        assert_eq!(scope.get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_with_frame() {
        let mut scope = Scope::new();
        scope.declare("name", json!("outer"));
        scope.push_with(json!({"name": "inner"}));
        scope.declare("x", json!(1));

        assert_eq!(scope.get("name"), Some(&json!("inner")));
        scope.pop();
        assert_eq!(scope.get("name"), Some(&json!("outer")));
        assert_eq!(scope.get("x"), Some(&json!(1)));
    }

    #[test]
    fn test_with_non_object() {
        let mut scope = Scope::new();
        scope.push_with(json!(3));

        assert_eq!(scope.get("length"), None);
    }

    #[test]
    fn test_assign() {
        let mut scope = Scope::new();
        scope.push();
        scope.declare("a", json!(1));
        scope.assign("a", json!(2));
        scope.assign("b", json!(3));
        scope.pop();

        assert_eq!(scope.get("a"), None);
        assert_eq!(scope.get("b"), Some(&json!(3)));
    }

    #[test]
    #[should_panic]
    fn test_pop_root() {
        Scope::new().pop();
    }
}
