//! URL handling
//!
//! - [`parser`] - split a base address into protocol, host, port, path and query parts
//! - [`serializer`] - turn query parameter objects into query strings

pub mod parser;
pub mod serializer;

pub use parser::{parse_query, parse_url, strip_trailing_slashes, ParsedUrl};
pub use serializer::{serialize_list_parameter, serialize_parameter, serialize_parameters};
