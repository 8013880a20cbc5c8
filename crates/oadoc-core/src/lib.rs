pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod grammar;
pub mod lookup;
pub mod parse;
pub mod schema;

pub use document::{ContentItem, Document, Field, FieldLocation, HttpMethod, Link, Section};
pub use extract::{load, load_with_options};
