//! Document tree and parser.

mod entities;
mod node;
mod parser;

pub use entities::unescape;
pub use node::{Element, Node, escape_attr, escape_text};
pub use parser::parse;
