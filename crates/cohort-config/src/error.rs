//! Error types for the cohort-config crate.
//!
//! All failures are local and synchronous. The store never retries,
//! never logs an error on the caller's behalf, and never silently
//! ignores a rejected write.

/// Errors that can occur during configuration access.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No stored value at any consulted layer, or an absent path segment.
    #[error("no value found for '{path}'")]
    NotFound {
        /// Dotted path (or path plus layer) that failed to resolve.
        path: String,
    },

    /// A mutation was attempted against a frozen node or tree.
    #[error("'{path}' is frozen and does not accept writes")]
    Frozen {
        /// Dotted path of the frozen node or tree.
        path: String,
    },

    /// A named layer is not present in the declared layer sequence.
    #[error("layer '{layer}' is not declared")]
    LayerNotDeclared {
        /// The undeclared layer name.
        layer: String,
    },

    /// Structured text could not be parsed into a nested mapping.
    #[error("failed to parse config YAML: {source}")]
    Parse {
        /// The underlying YAML parse error.
        #[from]
        source: serde_yml::Error,
    },

    /// A configuration file could not be read from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
