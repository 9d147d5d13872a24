//! Parser configuration
//!
//! These options only change how the lexical and grammar tables are obtained
//! and how much gets traced while doing so. Parse results never depend on them.
//!
//! The struct deserializes with every field optional, so a YAML file can override
//! just the options it cares about:
//!
//! ```yaml
//! grammar_optimize: false
//! grammar_debug: true
//! outputdir: target/tables
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the shared lexical table built into the crate.
pub const DEFAULT_LEXER_TABLE: &str = "troff_lextab";

/// Cache key of the man page parse table.
pub const DEFAULT_GRAMMAR_TABLE: &str = "troff_parsetab";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Reuse the shared precompiled lexical table instead of compiling a fresh one.
    pub lexer_optimize: bool,
    /// Which lexical table to reuse when `lexer_optimize` is set.
    pub lexer_table: String,
    /// Reuse the process-wide cached parse table instead of building a fresh one.
    pub grammar_optimize: bool,
    /// Cache key of the parse table when `grammar_optimize` is set.
    pub grammar_table: String,
    /// Trace table construction and automaton steps at debug level.
    pub grammar_debug: bool,
    /// Where generated table artifacts are written.
    pub outputdir: Option<PathBuf>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            lexer_optimize: true,
            lexer_table: DEFAULT_LEXER_TABLE.to_string(),
            grammar_optimize: true,
            grammar_table: DEFAULT_GRAMMAR_TABLE.to_string(),
            grammar_debug: false,
            outputdir: None,
        }
    }
}

impl ParserConfig {
    /// Configuration that builds both tables fresh and traces everything.
    pub fn unoptimized() -> Self {
        Self {
            lexer_optimize: false,
            grammar_optimize: false,
            grammar_debug: true,
            ..Self::default()
        }
    }

    /// Path of the parse table artifact: `<outputdir>/<grammar_table>.json`.
    ///
    /// Falls back to the current directory when no `outputdir` is set.
    pub fn table_artifact_path(&self) -> PathBuf {
        let dir = self.outputdir.clone().unwrap_or_else(|| PathBuf::from("."));
        dir.join(format!("{}.json", self.grammar_table))
    }

    /// Parse a configuration from YAML. Missing fields keep their defaults.
    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }
}
