use std::fmt;

use crate::value::{with_resolved, Spur, Value};

/// A source region: interned source name plus start/end positions.
///
/// Positions are 1-based. Rendering shows the start position only
/// (`source:line:col`), which is what error prefixes use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub source: Spur,
    pub line: u32,
    pub col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Span {
    /// Create a point span (start == end).
    pub fn point(source: Spur, line: u32, col: u32) -> Self {
        Span {
            source,
            line,
            col,
            end_line: line,
            end_col: col,
        }
    }

    /// Create a span from the start of `self` to the end of `other`.
    pub fn to(self, other: &Span) -> Span {
        Span {
            source: self.source,
            line: self.line,
            col: self.col,
            end_line: other.end_line,
            end_col: other.end_col,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        with_resolved(self.source, |src| {
            write!(f, "{src}:{}:{}", self.line, self.col)
        })
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SkiffError {
    #[error("{span}: {message}")]
    Reader { message: String, span: Span },

    #[error("invalid list")]
    InvalidList,

    #[error("expected {expected}, got {got}{}", got_value.as_ref().map(|v| format!(": {v}")).unwrap_or_default())]
    Type {
        expected: String,
        got: String,
        got_value: Option<String>,
    },

    #[error("{name}: expected {expected} arguments, got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },

    #[error("unbound symbol: {0}")]
    Unbound(String),

    #[error("set!: unbound symbol: {0}")]
    AssignUnbound(String),

    #[error("cannot modify constant: {0}")]
    Constant(String),

    #[error("{name}: index {index} out of range for list {list}")]
    OutOfRange {
        name: String,
        index: i64,
        list: String,
    },

    #[error("{0}")]
    Eval(String),

    #[error("i/o error: {0}")]
    Io(String),

    #[error("{span}: {inner}")]
    At { span: Span, inner: Box<SkiffError> },
}

impl SkiffError {
    pub fn eval(msg: impl Into<String>) -> Self {
        SkiffError::Eval(msg.into())
    }

    pub fn type_error(expected: impl Into<String>, got: impl Into<String>) -> Self {
        SkiffError::Type {
            expected: expected.into(),
            got: got.into(),
            got_value: None,
        }
    }

    /// Type error carrying the offending value's rendering, truncated so a
    /// long list does not swamp the message.
    pub fn type_error_with_value(expected: impl Into<String>, value: &Value) -> Self {
        let display = value.to_string();
        let truncated = if display.chars().count() > 40 {
            let prefix: String = display.chars().take(39).collect();
            format!("{prefix}…")
        } else {
            display
        };
        SkiffError::Type {
            expected: expected.into(),
            got: value.type_name().to_string(),
            got_value: Some(truncated),
        }
    }

    pub fn arity(name: impl Into<String>, expected: impl Into<String>, got: usize) -> Self {
        SkiffError::Arity {
            name: name.into(),
            expected: expected.into(),
            got,
        }
    }

    /// Prefix this error with a source position. Location enrichment happens
    /// at most once: an error that already carries a span is returned as-is.
    pub fn at(self, span: Span) -> Self {
        match self {
            SkiffError::At { .. } | SkiffError::Reader { .. } => self,
            other => SkiffError::At {
                span,
                inner: Box::new(other),
            },
        }
    }

    /// The span attached to this error, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            SkiffError::At { span, .. } | SkiffError::Reader { span, .. } => Some(*span),
            _ => None,
        }
    }

    /// Unwrap the location prefix, if present.
    pub fn inner(&self) -> &SkiffError {
        match self {
            SkiffError::At { inner, .. } => inner.inner(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::intern;

    fn span() -> Span {
        Span::point(intern("test.scm"), 3, 7)
    }

    #[test]
    fn span_display() {
        assert_eq!(span().to_string(), "test.scm:3:7");
    }

    #[test]
    fn type_error_display() {
        let e = SkiffError::type_error("pair", "number");
        assert_eq!(e.to_string(), "expected pair, got number");
        let e = SkiffError::type_error_with_value("pair", &Value::int(3));
        assert_eq!(e.to_string(), "expected pair, got number: 3");
    }

    #[test]
    fn arity_error_display() {
        let e = SkiffError::arity("cons", "2", 3);
        assert_eq!(e.to_string(), "cons: expected 2 arguments, got 3");
    }

    #[test]
    fn at_prefixes_position() {
        let e = SkiffError::Unbound("x".into()).at(span());
        assert_eq!(e.to_string(), "test.scm:3:7: unbound symbol: x");
    }

    #[test]
    fn at_applies_only_once() {
        let outer = Span::point(intern("test.scm"), 9, 1);
        let e = SkiffError::Unbound("x".into()).at(span()).at(outer);
        assert_eq!(e.span(), Some(span()));
        assert_eq!(e.to_string(), "test.scm:3:7: unbound symbol: x");
    }

    #[test]
    fn reader_errors_keep_their_own_span() {
        let e = SkiffError::Reader {
            message: "unterminated list".into(),
            span: span(),
        };
        let e = e.at(Span::point(intern("other.scm"), 1, 1));
        assert_eq!(e.to_string(), "test.scm:3:7: unterminated list");
    }

    #[test]
    fn inner_unwraps_location() {
        let e = SkiffError::InvalidList.at(span());
        assert!(matches!(e.inner(), SkiffError::InvalidList));
    }
}
