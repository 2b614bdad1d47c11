//! Type signature nodes (spec §3, §4.D grammar: `sign`, `maxterm`,
//! `minterm`, `primary`).

use super::{Ranged, SignId};
use crate::source::SourceRange;

#[derive(Debug)]
pub struct TupleSignElement {
    pub label: Option<String>,
    pub sign: SignId,
}

#[derive(Debug)]
pub enum TypeSign {
    BareIdent {
        name: String,
        range: SourceRange,
    },
    SpecializedIdent {
        name: String,
        args: Vec<SignId>,
        range: SourceRange,
    },
    /// A `::`-separated path, where only the final component may carry
    /// generic arguments.
    CompoundIdent {
        path: Vec<String>,
        args: Vec<SignId>,
        range: SourceRange,
    },
    Tuple {
        elements: Vec<TupleSignElement>,
        range: SourceRange,
    },
    /// `(param) -> ret`, right-recursive; `volatile` only legal here.
    Function {
        param: SignId,
        output: SignId,
        is_volatile: bool,
        range: SourceRange,
    },
    /// `mut sign`
    Inout {
        inner: SignId,
        range: SourceRange,
    },
    /// `async sign`
    Async {
        inner: SignId,
        range: SourceRange,
    },
    /// `A | B | ...` (maxterm disjunction).
    Union {
        members: Vec<SignId>,
        range: SourceRange,
    },
    /// `A & B & ...` (minterm conjunction / view composition).
    ViewComposition {
        members: Vec<SignId>,
        range: SourceRange,
    },
    Error {
        range: SourceRange,
    },
}

impl Ranged for TypeSign {
    fn range(&self) -> SourceRange {
        match self {
            TypeSign::BareIdent { range, .. }
            | TypeSign::SpecializedIdent { range, .. }
            | TypeSign::CompoundIdent { range, .. }
            | TypeSign::Tuple { range, .. }
            | TypeSign::Function { range, .. }
            | TypeSign::Inout { range, .. }
            | TypeSign::Async { range, .. }
            | TypeSign::Union { range, .. }
            | TypeSign::ViewComposition { range, .. }
            | TypeSign::Error { range } => *range,
        }
    }
}
