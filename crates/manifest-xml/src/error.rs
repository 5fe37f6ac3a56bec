//! Error types for manifest-xml

/// Result type for manifest-xml operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing or editing a manifest
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("XML syntax error at {line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Document has no root element")]
    NoRootElement,

    #[error("Unexpected second root element <{name}> at {line}:{column}")]
    MultipleRoots {
        name: String,
        line: usize,
        column: usize,
    },

    #[error("Element <{name}> opened at {line}:{column} is never closed")]
    Unclosed {
        name: String,
        line: usize,
        column: usize,
    },

    #[error("Edit did not produce an element at byte {offset}")]
    EditLostElement { offset: usize },
}
