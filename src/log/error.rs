use super::{Pointer, RED, RESET};
use crate::{log::Visual, region::Region};
use std::fmt::{Debug, Display, Formatter, Result};

/// Describes an error, and allows adding a contextual help text and visualization.
///
/// Every failure the crate produces is an [`Error`]: malformed templates found
/// while scanning, faults in the generated source found while loading it, and
/// faults raised while rendering.
///
/// # Examples
///
/// Creating an [`Error`] that includes a [`Visual`] of type [`Pointer`]:
///
/// ```
/// use kiln::log::Error;
///
/// let error = Error::build("unmatched delimiter")
///     .with_pointer("<% name", 0..2)
///     .with_name("page.ejs")
///     .with_help("no closing delimiter found for `<%`");
///
/// assert_eq!(error.reason(), "unmatched delimiter");
/// ```
///
/// When printed with `println!("{:#}", error)` the [`Error`] produces this output:
///
/// ```text
/// error: unmatched delimiter
///  --> page.ejs:1:1
///   |
/// 1 | <% name
///   | ^^-
///   |
///   = help: no closing delimiter found for `<%`
/// ```
pub struct Error {
    /// Describes the cause of the [`Error`].
    reason: String,
    /// A visualization to help illustrate the [`Error`].
    visual: Option<Box<dyn Visual>>,
    /// Additional information to display with the [`Error`].
    help: Option<String>,
    /// The name of the template that the [`Error`] comes from.
    name: Option<String>,
    /// True once the reason carries the location of the failure.
    located: bool,
}

impl Error {
    /// Create a new [`Error`] with the given reason text.
    ///
    /// The additional fields may be populated using the various methods
    /// defined on `Error`.
    pub fn build<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Error {
            reason: reason.into(),
            name: None,
            visual: None,
            help: None,
            located: false,
        }
    }

    /// Set the reason text, which is a short summary of the [`Error`].
    pub fn with_reason<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.reason = text.into();

        self
    }

    /// Set the name text, which is the name of the template that the
    /// [`Error`] is related to.
    pub fn with_name<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.name = Some(text.into());

        self
    }

    /// Set the name text unless the [`Error`] already has one.
    pub fn or_name<T>(mut self, text: Option<T>) -> Self
    where
        T: Into<String>,
    {
        if self.name.is_none() {
            self.name = text.map(Into::into);
        }

        self
    }

    /// Set the [`Visual`], which is a visualization that helps illustrate the
    /// cause of the error.
    pub fn with_visual(mut self, visual: impl Visual + 'static) -> Self {
        self.visual = Some(Box::new(visual));

        self
    }

    /// Set the visualization to a new [`Pointer`] with the given source text and
    /// [`Region`].
    ///
    /// This is a shortcut for creating a `Pointer` yourself and passing it to
    /// [`Error::with_visual`].
    pub fn with_pointer<T>(mut self, source: &str, region: T) -> Self
    where
        T: Into<Region>,
    {
        self.visual = Some(Box::new(Pointer::new(source, region.into())));

        self
    }

    /// Set the help text, which is contextual information to accompany the
    /// reason text.
    pub fn with_help<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.help = Some(text.into());

        self
    }

    /// Mark the [`Error`] as carrying the location of the failure.
    pub(crate) fn located(mut self) -> Self {
        self.located = true;

        self
    }

    /// Return true if the reason carries the location of the failure, which
    /// is the case for render faults of templates compiled in debug mode.
    pub fn is_located(&self) -> bool {
        self.located
    }

    /// Return the reason text.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Return the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Return the name of the template that the error is related to.
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if !f.alternate() {
            writeln!(f, "{self:#}")?;
        }
        f.debug_struct("Error")
            .field("reason", &self.reason)
            .field("name", &self.name)
            .field("visual", &self.visual)
            .field("help", &self.help)
            .finish()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let header = format!("{RED}error{RESET}");
        write!(f, "{header}: {}", self.reason)?;

        if !f.alternate() {
            return Ok(());
        }
        match &self.visual {
            Some(visual) => visual.display(f, self.name.as_deref(), self.help.as_deref()),
            None => {
                if let Some(help) = &self.help {
                    write!(f, "\n  = help: {help}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Error {}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.reason == other.reason && self.help == other.help && self.name == other.name
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn test_plain_display() {
        let error = Error::build("type error").with_help("cannot read `name` of null");

        assert_eq!(error.to_string(), "\x1B[31merror\x1B[0m: type error");
        assert!(format!("{error:#}").ends_with("= help: cannot read `name` of null"));
    }

    #[test]
    fn test_pointer_display() {
        let error = Error::build("unmatched delimiter")
            .with_pointer("hello <% name", 6..8)
            .with_name("page.ejs");
        let text = format!("{error:#}");

        assert!(text.contains("--> page.ejs:1:7"));
        assert!(text.contains("1 | hello <% name"));
    }

    #[test]
    fn test_or_name_keeps_existing() {
        let error = Error::build("x").with_name("a.ejs").or_name(Some("b.ejs"));
        assert_eq!(error.get_name(), Some("a.ejs"));

        let error = Error::build("x").or_name(Some("b.ejs"));
        assert_eq!(error.get_name(), Some("b.ejs"));
    }
}
