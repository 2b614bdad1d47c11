//! Pattern nodes (spec §3).

use super::{DeclId, PatternId, Ranged, SignId};
use crate::source::SourceRange;

#[derive(Debug)]
pub struct PatternElement {
    pub label: Option<String>,
    pub pattern: PatternId,
}

#[derive(Debug)]
pub enum Pattern {
    /// Binds a variable declaration.
    Named {
        var_decl: DeclId,
        range: SourceRange,
    },
    /// `val`/`var` wrapping a subpattern, with an optional type signature.
    Binding {
        is_var: bool,
        sub: PatternId,
        sign: Option<SignId>,
        range: SourceRange,
    },
    Tuple {
        elements: Vec<PatternElement>,
        range: SourceRange,
    },
    Wildcard {
        range: SourceRange,
    },
}

impl Ranged for Pattern {
    fn range(&self) -> SourceRange {
        match self {
            Pattern::Named { range, .. }
            | Pattern::Binding { range, .. }
            | Pattern::Tuple { range, .. }
            | Pattern::Wildcard { range } => *range,
        }
    }
}
