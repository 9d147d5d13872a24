//! Output formats for parsed documents
//!
//! The tree types implement `serde::Serialize`, so JSON and YAML come straight from
//! serde_json and serde_yaml. Only the treeviz view needs its own formatter.

pub mod treeviz;

pub use treeviz::to_treeviz_str;
