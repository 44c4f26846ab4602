use crate::log::Error;
use serde::Serialize;
use serde_json::{to_value, Map, Value};

/// Provides storage for data that a [`Template`][`crate::Template`] can be
/// rendered with.
///
/// While rendering, the data is bound to the locals name (`locals` by
/// default), and when dynamic scope is enabled each key is also available
/// as a bare identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    data: Map<String, Value>,
}

impl Store {
    /// Create a new [`Store`].
    ///
    /// # Examples
    ///
    /// ```
    /// use kiln::Store;
    ///
    /// let store = Store::new();
    /// assert!(store.is_empty());
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self { data: Map::new() }
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiln::Store;
    ///
    /// let mut store = Store::new();
    /// let result = store.insert("name", "taylor");
    ///
    /// assert!(result.is_ok());
    /// ```
    pub fn insert<S, T>(&mut self, key: S, value: T) -> Result<(), Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        let key = key.into();
        let value = to_value(value).map_err(|e| {
            Error::build(format!("value for key `{key}` is unserializable")).with_help(e.to_string())
        })?;
        self.data.insert(key, value);

        Ok(())
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// # Panics
    ///
    /// Panics if the serialization fails.
    #[inline]
    pub fn insert_must<S, T>(&mut self, key: S, value: T)
    where
        S: Into<String>,
        T: Serialize,
    {
        self.data
            .insert(key.into(), to_value(value).expect("value must be serializable"));
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// Returns the `Store`, so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    #[inline]
    pub fn with<S, T>(mut self, key: S, value: T) -> Result<Self, Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert(key, value)?;

        Ok(self)
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// Returns the `Store`, so additional methods may be chained.
    ///
    /// # Panics
    ///
    /// Panics if the serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiln::Store;
    ///
    /// let store = Store::new().with_must("name", "taylor").with_must("age", 30);
    /// assert_eq!(store.get("age").unwrap(), 30);
    /// ```
    #[inline]
    pub fn with_must<S, T>(mut self, key: S, value: T) -> Self
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert_must(key, value);

        self
    }

    /// Returns a reference to the [`Value`] corresponding to the key.
    #[inline]
    pub fn get(&self, index: &str) -> Option<&Value> {
        self.data.get(index)
    }

    /// Return true if the [`Store`] holds no keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Shallow merge the own keys of `other` into this [`Store`].
    ///
    /// Keys present in both are overwritten by the value from `other`. Only
    /// objects contribute keys, any other value is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiln::Store;
    /// use serde_json::json;
    ///
    /// let mut store = Store::new().with_must("a", 1).with_must("b", 2);
    /// store.merge(&json!({"b": 3, "c": 4}));
    ///
    /// assert_eq!(store.get("b").unwrap(), 3);
    /// assert_eq!(store.get("c").unwrap(), 4);
    /// ```
    pub fn merge(&mut self, other: &Value) {
        if let Value::Object(object) = other {
            for (key, value) in object {
                self.data.insert(key.clone(), value.clone());
            }
        }
    }

    /// Return the data as an object [`Value`].
    pub fn to_value(&self) -> Value {
        Value::Object(self.data.clone())
    }
}

impl From<Map<String, Value>> for Store {
    fn from(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

impl From<Value> for Store {
    /// Build a [`Store`] from the keys of an object, any other value
    /// produces an empty `Store`.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(data) => Self { data },
            _ => Self::new(),
        }
    }
}
