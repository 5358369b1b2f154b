//! Reader/writer for the ReUsable (RU) self-describing binary container format:
//! a textual `key=value` header, followed by a binary body whose layout is
//! given by the header's `format` field, a small schema mini-language
//! compiled into a tree of typed nodes.
//!
//! # Getting started
//!
//! ```
//! use ru_format::{Container, Header};
//!
//! let mut header = Header::new();
//! header.global_id = Some("WNIJ".into());
//! header.category = Some("TEST".into());
//! header.data_id = Some("ABCDEFGH".into());
//! header.data_name = Some("sample".into());
//! header.format = Some("v:INT32".into());
//! header.header_version = Some("1".into());
//! header.revision = Some("1".into());
//! header.created = Header::parse_time("2024/01/01 00:00:00 GMT");
//! header.announced = header.created;
//!
//! let mut container = Container::create(header).expect("valid format string");
//! container.root_mut().member_mut("v").unwrap().set_int(42).unwrap();
//!
//! let mut bytes = Vec::new();
//! container.save(&mut bytes).expect("write succeeds");
//!
//! let loaded = Container::load(&mut &bytes[..], true).expect("read succeeds");
//! assert_eq!(loaded.root().member("v").unwrap().as_int().unwrap(), 42);
//! ```
//!
//! # Module overview
//!
//! - [`header`] — the textual preamble (`Header`, signature/sentinel bytes).
//! - [`schema`] — the `format` mini-language: tokenizer, parser, and the
//!   compiled [`schema::Node`] tree that does the actual reading/writing.
//! - [`resolver`] — tracks integer fields referenced as dynamic array sizes.
//! - [`compression`] — whole-buffer gzip/bzip2 codecs for the body.
//! - [`encoding`] — per-string-type text encoding cascade.
//! - [`time`] — recognizes and projects "time structs" to/from `chrono`.
//! - [`path`] — dotted-path navigation into a node tree.
//! - [`container`] — [`Container`], the facade tying the above together.

pub mod compression;
pub mod container;
pub mod cursor;
pub mod encoding;
pub mod error;
pub mod header;
pub mod path;
pub mod resolver;
pub mod schema;
pub mod time;

pub use container::Container;
pub use error::{Result, RuError};
pub use header::Header;
pub use schema::Node;
