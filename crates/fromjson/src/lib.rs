//! Convert JSON text into an interpreter's native value tree.
//!
//! Input is parsed in one pass into a [`Document`], then walked with a
//! [`Cursor`] to build values through a [`ValueFactory`]. Objects become
//! attribute sets keyed by interned [`Symbol`]s, arrays become lists, and
//! strings share the document's decoded string buffer.
//!
//! Object keys that repeat across sibling objects (arrays of records) are
//! resolved through a per-depth [`SymbolCache`], so the interning table is
//! consulted about once per distinct key and depth instead of once per
//! occurrence.
//!
//! ```rust
//! use fromjson::{Runtime, Symbol};
//!
//! let mut runtime = Runtime::new();
//! let v = runtime
//!     .parse_json(r#"[{"id":1,"name":"a"},{"id":2,"name":"b"}]"#)
//!     .unwrap();
//! let rows = v.as_list().unwrap();
//! let first = rows[0].as_attrs().unwrap().keys().next().unwrap();
//! let second = rows[1].as_attrs().unwrap().keys().next().unwrap();
//! assert!(Symbol::ptr_eq(first, second));
//! ```

#![allow(missing_docs)]

mod builder;
mod convert;
pub mod document;
mod error;
mod factory;
mod options;
mod symbol;
mod symbol_cache;
mod value;

#[cfg(test)]
mod tests;

pub use convert::{parse_json, parse_json_into, parse_json_into_with, parse_json_with};
pub use document::{Cursor, Document, NodeType, ParseError, Parser, SyntaxError};
pub use error::ConvertError;
pub use factory::{Runtime, ValueFactory};
pub use options::{ConvertOptions, DEFAULT_MAX_DEPTH, DuplicateKeys, StringStorage};
pub use symbol::{Symbol, SymbolTable};
pub use symbol_cache::SymbolCache;
pub use value::{Attrs, JsonStr, Value};
