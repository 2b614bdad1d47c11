//! Declaration nodes (spec §3).

use super::{DeclId, DeclSpaceId, ExprId, Modifiers, PatternId, Ranged, SignId, StmtId, TypeSlot};
use crate::source::SourceRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementKind {
    /// `A == B`
    Equality,
    /// `A: B`
    Conformance,
}

#[derive(Debug)]
pub struct TypeRequirement {
    pub subject: SignId,
    pub kind: RequirementKind,
    pub target: SignId,
    pub range: SourceRange,
}

#[derive(Debug, Default)]
pub struct GenericClause {
    pub params: Vec<DeclId>,
    pub requirements: Vec<TypeRequirement>,
}

#[derive(Debug)]
pub struct Param {
    /// `None` means the parameter has no external label (`_` was written).
    pub label: Option<String>,
    pub name: String,
    pub sign: SignId,
    pub range: SourceRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Infix,
    Prefix,
    Postfix,
}

#[derive(Debug)]
pub enum Decl {
    /// `val`/`var` pattern binding, with an optional type signature and
    /// initializer.
    PatternBinding {
        is_var: bool,
        pattern: PatternId,
        sign: Option<SignId>,
        init: Option<ExprId>,
        modifiers: Modifiers,
        space: DeclSpaceId,
        ty: TypeSlot,
        range: SourceRange,
    },
    Function {
        name: Option<String>,
        operator_kind: Option<OperatorKind>,
        generic_clause: Option<GenericClause>,
        params: Vec<Param>,
        output: Option<SignId>,
        body: Option<StmtId>,
        modifiers: Modifiers,
        space: DeclSpaceId,
        body_space: DeclSpaceId,
        ty: TypeSlot,
        range: SourceRange,
    },
    Constructor {
        params: Vec<Param>,
        body: Option<StmtId>,
        modifiers: Modifiers,
        space: DeclSpaceId,
        body_space: DeclSpaceId,
        ty: TypeSlot,
        range: SourceRange,
    },
    Destructor {
        body: Option<StmtId>,
        space: DeclSpaceId,
        body_space: DeclSpaceId,
        ty: TypeSlot,
        range: SourceRange,
    },
    ProductType {
        name: String,
        generic_clause: Option<GenericClause>,
        inherits: Vec<SignId>,
        members: Vec<DeclId>,
        modifiers: Modifiers,
        space: DeclSpaceId,
        body_space: DeclSpaceId,
        range: SourceRange,
    },
    ViewType {
        name: String,
        requirements: Vec<DeclId>,
        inherits: Vec<SignId>,
        modifiers: Modifiers,
        space: DeclSpaceId,
        body_space: DeclSpaceId,
        range: SourceRange,
    },
    /// An abstract requirement nested in a view body: an associated type
    /// with optional conformance bounds.
    AbstractType {
        name: String,
        conformances: Vec<SignId>,
        space: DeclSpaceId,
        range: SourceRange,
    },
    AliasType {
        name: String,
        generic_clause: Option<GenericClause>,
        target: SignId,
        modifiers: Modifiers,
        space: DeclSpaceId,
        range: SourceRange,
    },
    Extension {
        target: SignId,
        members: Vec<DeclId>,
        space: DeclSpaceId,
        body_space: DeclSpaceId,
        range: SourceRange,
    },
    GenericParameter {
        name: String,
        space: DeclSpaceId,
        range: SourceRange,
    },
    /// A variable bound by a pattern; owned by the pattern-binding
    /// declaration whose pattern introduced it.
    Variable {
        name: String,
        pattern_binding: DeclId,
        ty: TypeSlot,
        range: SourceRange,
    },
}

impl Ranged for Decl {
    fn range(&self) -> SourceRange {
        match self {
            Decl::PatternBinding { range, .. }
            | Decl::Function { range, .. }
            | Decl::Constructor { range, .. }
            | Decl::Destructor { range, .. }
            | Decl::ProductType { range, .. }
            | Decl::ViewType { range, .. }
            | Decl::AbstractType { range, .. }
            | Decl::AliasType { range, .. }
            | Decl::Extension { range, .. }
            | Decl::GenericParameter { range, .. }
            | Decl::Variable { range, .. } => *range,
        }
    }
}

impl Decl {
    /// The declaration space this decl lives in (its parent scope), where
    /// applicable.
    pub fn space(&self) -> Option<DeclSpaceId> {
        match self {
            Decl::PatternBinding { space, .. }
            | Decl::Function { space, .. }
            | Decl::Constructor { space, .. }
            | Decl::Destructor { space, .. }
            | Decl::ProductType { space, .. }
            | Decl::ViewType { space, .. }
            | Decl::AbstractType { space, .. }
            | Decl::AliasType { space, .. }
            | Decl::Extension { space, .. }
            | Decl::GenericParameter { space, .. } => Some(*space),
            Decl::Variable { .. } => None,
        }
    }
}
