//! Expression nodes (spec §3).

use super::{ExprId, PatternId, Ranged, SignId, StmtId, TypeSlot};
use crate::lex::IntRadix;
use crate::source::SourceRange;

#[derive(Debug)]
pub struct TupleElement {
    pub label: Option<String>,
    pub value: ExprId,
}

#[derive(Debug)]
pub struct Argument {
    pub label: Option<String>,
    pub value: ExprId,
}

#[derive(Debug, Clone)]
pub enum TupleIndex {
    Label(String),
    Position(usize),
}

#[derive(Debug)]
pub struct MatchCaseData {
    pub pattern: PatternId,
    pub guard: Option<ExprId>,
    pub body: StmtId,
    pub range: SourceRange,
}

#[derive(Debug)]
pub enum Expr {
    BoolLit {
        value: bool,
        ty: TypeSlot,
        range: SourceRange,
    },
    IntLit {
        text: String,
        radix: IntRadix,
        ty: TypeSlot,
        range: SourceRange,
    },
    FloatLit {
        text: String,
        ty: TypeSlot,
        range: SourceRange,
    },
    StringLit {
        value: String,
        ty: TypeSlot,
        range: SourceRange,
    },
    /// An unresolved reference to a declaration, optionally qualified by a
    /// namespace path (`Namespace::name`).
    UnresolvedDeclRef {
        namespace: Option<SignId>,
        name: String,
        ty: TypeSlot,
        range: SourceRange,
    },
    Tuple {
        elements: Vec<TupleElement>,
        ty: TypeSlot,
        range: SourceRange,
    },
    TupleMember {
        base: ExprId,
        index: TupleIndex,
        ty: TypeSlot,
        range: SourceRange,
    },
    Call {
        callee: ExprId,
        args: Vec<Argument>,
        ty: TypeSlot,
        range: SourceRange,
    },
    InfixCall {
        op: String,
        lhs: ExprId,
        rhs: ExprId,
        ty: TypeSlot,
        range: SourceRange,
    },
    PrefixCall {
        op: String,
        operand: ExprId,
        ty: TypeSlot,
        range: SourceRange,
    },
    PostfixCall {
        op: String,
        operand: ExprId,
        ty: TypeSlot,
        range: SourceRange,
    },
    /// An unresolved `.name` member access.
    Member {
        base: ExprId,
        name: String,
        ty: TypeSlot,
        range: SourceRange,
    },
    Receiver {
        is_self: bool,
        ty: TypeSlot,
        range: SourceRange,
    },
    Async {
        body: ExprId,
        ty: TypeSlot,
        range: SourceRange,
    },
    Await {
        operand: ExprId,
        ty: TypeSlot,
        range: SourceRange,
    },
    Match {
        subject: ExprId,
        cases: Vec<MatchCaseData>,
        ty: TypeSlot,
        range: SourceRange,
    },
    Assign {
        lhs: ExprId,
        rhs: ExprId,
        ty: TypeSlot,
        range: SourceRange,
    },
    AddrOf {
        operand: ExprId,
        ty: TypeSlot,
        range: SourceRange,
    },
    DynCast {
        operand: ExprId,
        target: SignId,
        ty: TypeSlot,
        range: SourceRange,
    },
    UnsafeCast {
        operand: ExprId,
        target: SignId,
        ty: TypeSlot,
        range: SourceRange,
    },
    Wildcard {
        ty: TypeSlot,
        range: SourceRange,
    },
    Error {
        range: SourceRange,
    },
}

impl Ranged for Expr {
    fn range(&self) -> SourceRange {
        match self {
            Expr::BoolLit { range, .. }
            | Expr::IntLit { range, .. }
            | Expr::FloatLit { range, .. }
            | Expr::StringLit { range, .. }
            | Expr::UnresolvedDeclRef { range, .. }
            | Expr::Tuple { range, .. }
            | Expr::TupleMember { range, .. }
            | Expr::Call { range, .. }
            | Expr::InfixCall { range, .. }
            | Expr::PrefixCall { range, .. }
            | Expr::PostfixCall { range, .. }
            | Expr::Member { range, .. }
            | Expr::Receiver { range, .. }
            | Expr::Async { range, .. }
            | Expr::Await { range, .. }
            | Expr::Match { range, .. }
            | Expr::Assign { range, .. }
            | Expr::AddrOf { range, .. }
            | Expr::DynCast { range, .. }
            | Expr::UnsafeCast { range, .. }
            | Expr::Wildcard { range, .. }
            | Expr::Error { range } => *range,
        }
    }
}
