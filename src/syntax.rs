//! Templates find their directives by way of delimiters. This module defines
//! the [`Delimiters`] type, which describes the delimiters you would like to
//! use, and the [`Marker`] type, which identifies each of the eleven marker
//! strings that the delimiters combine into.
//!
//! After a `Delimiters` instance has been configured, it can be placed in the
//! compile [`Options`][`crate::Options`].
mod delimiters;
mod marker;

pub use delimiters::{Delimiters, Modifier};
pub use marker::Marker;
