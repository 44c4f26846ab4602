use serde_json::{Map, Number, Value};
use std::fmt::{Arguments, Result, Write};

/// Wraps some underlying buffer by providing methods that write [`Value`]
/// instances to it as template output.
pub struct Pipe<'buffer> {
    buffer: &'buffer mut (dyn Write + 'buffer),
}

impl<'buffer> Pipe<'buffer> {
    /// Create a new Pipe that writes to the given buffer.
    pub fn new(buffer: &'buffer mut String) -> Self {
        Self { buffer }
    }

    /// Write the given Value to the Pipe buffer.
    ///
    /// Null writes nothing, strings are written as they are, numbers without
    /// a trailing fraction when they are whole, arrays as their comma
    /// separated elements and objects as JSON.
    ///
    /// # Errors
    ///
    /// The Pipe supports all Value types, so the only error that will
    /// be returned is propagated from the [write!] macro itself.
    pub fn write_value(&mut self, value: &Value) -> Result {
        match value {
            Value::Null => Ok(()),
            Value::Bool(boolean) => write!(self.buffer, "{boolean}"),
            Value::Number(number) => self.write_number(number),
            Value::String(string) => self.buffer.write_str(string),
            Value::Array(array) => self.write_array(array),
            Value::Object(object) => self.write_object(object),
        }
    }

    /// Write a number, whole floating point numbers lose their fraction.
    fn write_number(&mut self, number: &Number) -> Result {
        if let Some(integer) = number.as_i64() {
            return write!(self.buffer, "{integer}");
        }
        if let Some(integer) = number.as_u64() {
            return write!(self.buffer, "{integer}");
        }
        match number.as_f64() {
            Some(float) => write!(self.buffer, "{float}"),
            None => write!(self.buffer, "{number}"),
        }
    }

    /// Write the elements of the array separated by commas.
    fn write_array(&mut self, array: &[Value]) -> Result {
        for (index, item) in array.iter().enumerate() {
            if index > 0 {
                self.buffer.write_char(',')?;
            }
            self.write_value(item)?;
        }

        Ok(())
    }

    /// Write the object as compact JSON.
    fn write_object(&mut self, object: &Map<String, Value>) -> Result {
        let text = serde_json::to_string(object).map_err(|_| std::fmt::Error)?;
        self.buffer.write_str(&text)
    }
}

impl Write for Pipe<'_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> Result {
        Write::write_str(self.buffer, s)
    }

    #[inline]
    fn write_char(&mut self, c: char) -> Result {
        Write::write_char(self.buffer, c)
    }

    #[inline]
    fn write_fmt(&mut self, args: Arguments<'_>) -> Result {
        Write::write_fmt(self.buffer, args)
    }
}

/// Return the output text of the given [`Value`], as a [`Pipe`] would write it.
pub fn to_text(value: &Value) -> String {
    if let Value::String(string) = value {
        return string.clone();
    }
    let mut buffer = String::new();
    // Writing to a String cannot fail.
    let _ = Pipe::new(&mut buffer).write_value(value);

    buffer
}

#[cfg(test)]
mod tests {
    use super::to_text;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_eq!(to_text(&json!(null)), "");
        assert_eq!(to_text(&json!(true)), "true");
        assert_eq!(to_text(&json!(42)), "42");
        assert_eq!(to_text(&json!(-7)), "-7");
        assert_eq!(to_text(&json!(3.0)), "3");
        assert_eq!(to_text(&json!(2.5)), "2.5");
        assert_eq!(to_text(&json!("text")), "text");
    }

    #[test]
    fn test_collections() {
        assert_eq!(to_text(&json!([1, "two", null, [3, 4]])), "1,two,,3,4");
        assert_eq!(to_text(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
