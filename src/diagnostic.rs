//! The diagnostic envelope consumed by an external reporter (spec §6), and
//! the speculative-buffering adapter the parser uses while backtracking
//! through a declaration reference (spec §4.D, §9).

use crate::source::SourceRange;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Note,
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub anchor: SourceRange,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, anchor: SourceRange) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
            anchor,
        }
    }

    pub fn warning(message: impl Into<String>, anchor: SourceRange) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
            anchor,
        }
    }

    pub fn note(message: impl Into<String>, anchor: SourceRange) -> Self {
        Self {
            level: Level::Note,
            message: message.into(),
            anchor,
        }
    }
}

/// A pluggable sink diagnostics are reported to. The parser never talks to a
/// concrete reporter directly, only through this trait, so that speculative
/// work can swap in a buffering adapter.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// The simplest sink: accumulate everything. What a driver or a test uses.
#[derive(Debug, Default)]
pub struct VecSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink for VecSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == Level::Error)
    }
}

/// Buffers diagnostics reported while speculative work (e.g. a qualified
/// decl-ref parse that might backtrack) is in progress. On `commit`, the
/// buffered diagnostics are replayed, in order, into the wrapped sink. On
/// drop without commit (i.e. the speculative parse was abandoned), they are
/// silently discarded — this is what keeps backtracking free of phantom
/// diagnostics.
pub struct BufferingSink<'a> {
    inner: &'a mut dyn DiagnosticSink,
    buffered: Vec<Diagnostic>,
}

impl<'a> BufferingSink<'a> {
    pub fn new(inner: &'a mut dyn DiagnosticSink) -> Self {
        Self {
            inner,
            buffered: Vec::new(),
        }
    }

    /// Replay every buffered diagnostic, in source order, into the wrapped
    /// sink.
    pub fn commit(self) {
        for diagnostic in self.buffered {
            self.inner.report(diagnostic);
        }
    }

    /// Discard everything buffered; nothing reaches the wrapped sink.
    pub fn discard(self) {}

    pub fn buffered(&self) -> &[Diagnostic] {
        &self.buffered
    }
}

impl<'a> DiagnosticSink for BufferingSink<'a> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.buffered.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceManager;

    fn range() -> SourceRange {
        let mut sm = SourceManager::new();
        let id = sm.load_synthesized("<test>", "ab");
        SourceRange::new(id, 0, 1)
    }

    #[test]
    fn buffering_sink_commit_replays_in_order() {
        let mut sink = VecSink::new();
        {
            let mut buffer = BufferingSink::new(&mut sink);
            buffer.report(Diagnostic::error("first", range()));
            buffer.report(Diagnostic::warning("second", range()));
            buffer.commit();
        }
        assert_eq!(sink.diagnostics.len(), 2);
        assert_eq!(sink.diagnostics[0].message, "first");
        assert_eq!(sink.diagnostics[1].message, "second");
    }

    #[test]
    fn buffering_sink_discard_drops_everything() {
        let mut sink = VecSink::new();
        {
            let mut buffer = BufferingSink::new(&mut sink);
            buffer.report(Diagnostic::error("never seen", range()));
            buffer.discard();
        }
        assert!(sink.diagnostics.is_empty());
    }
}
