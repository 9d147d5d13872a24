//! Document tree and source locations for troff
//!
//! ## Modules
//!
//! - `location` - file/line/column positions used in diagnostics
//! - `node` - the document tree produced by the parser

pub mod location;
pub mod node;

pub use location::Location;
pub use node::{Block, Document, Font, Inline, Section, Subsection};
