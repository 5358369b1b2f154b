//! The `format` header value: a schema mini-language describing the layout
//! of the container body, compiled into a tree of [`node::Node`]s.

pub mod node;
pub mod parser;
pub mod token;

pub use node::{ArraySize, Node, NodeKind, ScalarKind, ScalarValue, StringFamily, ROOT_NAME};
pub use parser::{parse, ParseResult};
