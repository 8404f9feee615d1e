//! Error types and handling for HCL rendering operations

use thiserror::Error;

/// Main error type for HCL rendering operations
#[derive(Debug, Error)]
pub enum HclgenError {
    /// A flatmap attribute bag disagrees with its type schema
    #[error("Decode error at '{path}': {message}")]
    Decode { path: String, message: String },

    /// The canonicalizer met a node it cannot represent in the target grammar
    #[error("Canonicalize error: {message}: {text}")]
    Canonicalize { message: String, text: String },

    /// A line-heuristic invariant was violated during post-print rewriting
    #[error("Rewrite error at line {line}: {message}")]
    Rewrite { line: usize, message: String },

    /// Unknown output format requested
    #[error("error: unknown output format '{format}'")]
    Format { format: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Decode,
    Canonicalize,
    Rewrite,
    Format,
    Internal,
}

impl HclgenError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            HclgenError::Decode { .. } => ErrorKind::Decode,
            HclgenError::Canonicalize { .. } => ErrorKind::Canonicalize,
            HclgenError::Rewrite { .. } => ErrorKind::Rewrite,
            HclgenError::Format { .. } => ErrorKind::Format,
            HclgenError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (other resources can still render).
    ///
    /// Decode failures are scoped to one resource. Canonicalize and rewrite
    /// failures are internal-logic bugs and abort the whole render call.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Decode)
    }

    /// Create a decode error for a flatmap path
    pub fn decode_error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a canonicalize error carrying the offending raw text
    pub fn canonicalize_error(message: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Canonicalize {
            message: message.into(),
            text: text.into(),
        }
    }

    /// Create a rewrite error at a 1-based output line
    pub fn rewrite_error(line: usize, message: impl Into<String>) -> Self {
        Self::Rewrite {
            line,
            message: message.into(),
        }
    }

    /// Create an unknown-format error
    pub fn format_error(format: impl Into<String>) -> Self {
        Self::Format {
            format: format.into(),
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            HclgenError::decode_error("tags.%", "count mismatch").kind(),
            ErrorKind::Decode
        );
        assert_eq!(
            HclgenError::format_error("yaml").kind(),
            ErrorKind::Format
        );
    }

    #[test]
    fn test_recoverability() {
        assert!(HclgenError::decode_error("a", "bad bool").is_recoverable());
        assert!(!HclgenError::rewrite_error(10, "unclosed block").is_recoverable());
        assert!(!HclgenError::canonicalize_error("bad node", "<<EOF").is_recoverable());
    }
}
