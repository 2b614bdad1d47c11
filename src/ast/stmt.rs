//! Statement nodes (spec §3). Declarations and expressions are embeddable
//! as statements, matching "decls and exprs are also embeddable."

use super::{DeclId, DeclSpaceId, ExprId, Ranged};
use crate::source::SourceRange;

#[derive(Debug)]
pub enum Stmt {
    Block {
        space: DeclSpaceId,
        stmts: Vec<super::StmtId>,
        range: SourceRange,
    },
    Return {
        value: Option<ExprId>,
        range: SourceRange,
    },
    Break {
        range: SourceRange,
    },
    Continue {
        range: SourceRange,
    },
    /// A `match` expression used directly as a statement inside a brace
    /// block.
    MatchStmt {
        match_expr: ExprId,
        range: SourceRange,
    },
    Decl {
        decl: DeclId,
        range: SourceRange,
    },
    Expr {
        expr: ExprId,
        range: SourceRange,
    },
    /// Parse failure or an explicit stub (`break`/`continue`/`for`/`while`/
    /// `del` — spec §9 open question) that still needs a `StmtId` to embed.
    Error {
        range: SourceRange,
    },
}

impl Ranged for Stmt {
    fn range(&self) -> SourceRange {
        match self {
            Stmt::Block { range, .. }
            | Stmt::Return { range, .. }
            | Stmt::Break { range }
            | Stmt::Continue { range }
            | Stmt::MatchStmt { range, .. }
            | Stmt::Decl { range, .. }
            | Stmt::Expr { range, .. }
            | Stmt::Error { range } => *range,
        }
    }
}
