//! The AST (component C): tagged node families for declarations,
//! statements, expressions, patterns, and type signatures (spec §3, §4.C).
//!
//! Nodes are owned by a single arena (`Ast`) and reference each other by
//! index rather than by pointer, per the design notes in spec §9. Each
//! family is a plain sum type; runtime "kind" dispatch in a source written
//! in a language without algebraic data types becomes an ordinary Rust
//! `match` here.

pub mod decl;
pub mod expr;
pub mod pattern;
pub mod sign;
pub mod stmt;

pub use decl::Decl;
pub use expr::Expr;
pub use pattern::Pattern;
pub use sign::TypeSign;
pub use stmt::Stmt;

use crate::source::SourceRange;
use once_cell::unsync::OnceCell;
use std::fmt::{self, Display, Formatter};

macro_rules! arena_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", stringify!($name), self.0)
            }
        }
    };
}

arena_id!(DeclId);
arena_id!(StmtId);
arena_id!(ExprId);
arena_id!(PatternId);
arena_id!(SignId);
arena_id!(DeclSpaceId);

/// A declaration space: a scope that can contain declarations. Spaces form
/// a tree rooted at the source unit; `parent` is `None` only for that root.
#[derive(Debug)]
pub struct DeclSpace {
    pub parent: Option<DeclSpaceId>,
    pub decls: Vec<DeclId>,
}

/// The semantic type-checker is an external collaborator (spec §1); all
/// this crate needs from it is "a type slot that later passes mutate". This
/// is an opaque placeholder a real driver would fill with its own canonical
/// type representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType(pub String);

/// Every AST node's type slot: unresolved until a later pass mutates it.
/// Modeled with `OnceCell` the way the teacher models other lazily-computed
/// node state (e.g. `Code::line_breaks`).
#[derive(Debug, Default)]
pub struct TypeSlot(OnceCell<ResolvedType>);

impl TypeSlot {
    pub fn unresolved() -> Self {
        Self(OnceCell::new())
    }

    pub fn get(&self) -> Option<&ResolvedType> {
        self.0.get()
    }

    pub fn resolve(&self, ty: ResolvedType) -> Result<(), ResolvedType> {
        self.0.set(ty)
    }

    pub fn is_resolved(&self) -> bool {
        self.0.get().is_some()
    }
}

/// Owns every AST node produced while parsing one source unit. Nodes are
/// appended during parsing and never removed or moved, so indices into
/// these vectors are stable handles for the node's whole lifetime.
#[derive(Debug, Default)]
pub struct Ast {
    pub decl_spaces: Vec<DeclSpace>,
    pub decls: Vec<Decl>,
    pub stmts: Vec<Stmt>,
    pub exprs: Vec<Expr>,
    pub patterns: Vec<Pattern>,
    pub signs: Vec<TypeSign>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// The root declaration space of a freshly created AST, with no parent.
    pub fn alloc_root_space(&mut self) -> DeclSpaceId {
        self.alloc_space(None)
    }

    pub fn alloc_space(&mut self, parent: Option<DeclSpaceId>) -> DeclSpaceId {
        let id = DeclSpaceId(self.decl_spaces.len() as u32);
        self.decl_spaces.push(DeclSpace {
            parent,
            decls: Vec::new(),
        });
        id
    }

    pub fn space(&self, id: DeclSpaceId) -> &DeclSpace {
        &self.decl_spaces[id.index()]
    }

    pub fn space_mut(&mut self, id: DeclSpaceId) -> &mut DeclSpace {
        &mut self.decl_spaces[id.index()]
    }

    pub fn alloc_decl(&mut self, decl: Decl, space: DeclSpaceId) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        self.space_mut(space).decls.push(id);
        id
    }

    /// A variable bound by a pattern (spec §3): unlike other declarations it
    /// is not itself a declaration-space member, so it bypasses
    /// `alloc_decl`'s space registration.
    pub fn alloc_variable_decl(
        &mut self,
        name: String,
        pattern_binding: DeclId,
        range: SourceRange,
    ) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(Decl::Variable {
            name,
            pattern_binding,
            ty: TypeSlot::unresolved(),
            range,
        });
        id
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    /// Overwrite a previously allocated declaration's content in place,
    /// keeping its id stable. Used exactly once per pattern-binding decl:
    /// its own id must exist before its pattern can be parsed (variable
    /// decls inside the pattern point back to it), so the parser allocates
    /// a placeholder first and patches it once the real pattern is known.
    pub fn replace_decl(&mut self, id: DeclId, decl: Decl) {
        self.decls[id.index()] = decl;
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId(self.stmts.len() as u32);
        self.stmts.push(stmt);
        id
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn alloc_pattern(&mut self, pattern: Pattern) -> PatternId {
        let id = PatternId(self.patterns.len() as u32);
        self.patterns.push(pattern);
        id
    }

    pub fn pattern(&self, id: PatternId) -> &Pattern {
        &self.patterns[id.index()]
    }

    pub fn alloc_sign(&mut self, sign: TypeSign) -> SignId {
        let id = SignId(self.signs.len() as u32);
        self.signs.push(sign);
        id
    }

    pub fn sign(&self, id: SignId) -> &TypeSign {
        &self.signs[id.index()]
    }

    /// Every declaration's variable decls, by walking its pattern, point
    /// back to the binding that owns them (spec §8 invariant).
    pub fn variables_of(&self, pattern: PatternId) -> Vec<DeclId> {
        let mut out = Vec::new();
        self.collect_variables(pattern, &mut out);
        out
    }

    fn collect_variables(&self, pattern: PatternId, out: &mut Vec<DeclId>) {
        match self.pattern(pattern) {
            Pattern::Named { var_decl, .. } => out.push(*var_decl),
            Pattern::Binding { sub, .. } => self.collect_variables(*sub, out),
            Pattern::Tuple { elements, .. } => {
                for element in elements {
                    self.collect_variables(element.pattern, out);
                }
            }
            Pattern::Wildcard { .. } => {}
        }
    }
}

/// The modifier flags a declaration's head may carry (spec §4.D). Exclusion
/// and context legality are enforced by the parser while reading them; this
/// struct just records the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub is_pub: bool,
    pub is_mod: bool,
    pub is_mut: bool,
    pub is_infix: bool,
    pub is_prefix: bool,
    pub is_postfix: bool,
    pub is_volatile: bool,
    pub is_static: bool,
    pub is_moveonly: bool,
}

pub trait Ranged {
    fn range(&self) -> SourceRange;
}
