//! The IR model (component E, spec §4.E): functions as basic-block CFGs,
//! plus the query structures (`Cfg`, `DominatorTree`) built on top of them.
//!
//! Nodes are owned by a single arena per level — a `Module` owns its
//! `Function`s, a `Function` owns its `Block`s, a `Block` owns its
//! `Instruction`s — each backed by a `slotmap::SlotMap` so that handles
//! stay valid across insertion and removal of their siblings (spec §3
//! "stable-handle container"), the same guarantee the AST gets for free
//! from its never-shrinking `Vec` arenas (see `ast::Ast`).

pub mod block;
pub mod cfg;
pub mod dom;
pub mod function;
pub mod instruction;
pub mod render;

pub use block::{Block, BlockAddr, BlockId};
pub use cfg::Cfg;
pub use dom::DominatorTree;
pub use function::{
    CanonicalSpecialization, Function, FunctionId, FunctionOrigin, GenericParamId, Linkage,
    LoweredType, ParameterConvention, ParameterType,
};
pub use instruction::{
    AccessEffect, Const, FunctionRef, InstrAddr, Instruction, InstructionId, Operand, SwitchCase,
};
pub use render::render_function;

use crate::source::SourceRange;
use slotmap::SlotMap;
use std::collections::HashMap;

/// The function table a whole compilation unit lowers into. Functions are
/// never removed once declared — unlike blocks and instructions, nothing in
/// spec §3/§4 calls for function deletion — but they still get a
/// `SlotMap` for uniformity and so that a future incremental-compilation
/// driver (out of scope here, spec.md §1) would not need to change this
/// type.
#[derive(Debug, Default)]
pub struct Module {
    functions: SlotMap<FunctionId, Function>,
    /// `(base_id, canonical_specialization) -> Function.ID` (spec §4.F
    /// "Monomorphization memoization"). Owned here, not by `mono`, because
    /// it is keyed on `Function` identity, the IR model's own concern.
    mono_cache: HashMap<(FunctionId, CanonicalSpecialization), FunctionId>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn declare_function(
        &mut self,
        name: String,
        anchor: SourceRange,
        linkage: Linkage,
        inputs: Vec<ParameterType>,
        output: LoweredType,
        generic_parameters: Vec<GenericParamId>,
        origin: FunctionOrigin,
    ) -> FunctionId {
        self.functions.insert_with_key(|id| {
            Function::new(id, name, anchor, linkage, inputs, output, generic_parameters, origin)
        })
    }

    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id]
    }

    pub fn function_mut(&mut self, id: FunctionId) -> &mut Function {
        &mut self.functions[id]
    }

    pub fn functions(&self) -> impl Iterator<Item = (FunctionId, &Function)> {
        self.functions.iter()
    }

    /// Spec §4.F step 1: "if a function with that id already exists,
    /// return it" — prevents infinite recursion on mutually-recursive
    /// generics and duplicate monomorphized copies.
    pub fn lookup_monomorphization(
        &self,
        base: FunctionId,
        specialization: &CanonicalSpecialization,
    ) -> Option<FunctionId> {
        self.mono_cache.get(&(base, specialization.clone())).copied()
    }

    pub fn record_monomorphization(
        &mut self,
        base: FunctionId,
        specialization: CanonicalSpecialization,
        result: FunctionId,
    ) {
        self.mono_cache.insert((base, specialization), result);
    }

    /// Builds the CFG and dominator tree for `id`'s current body (spec
    /// §4.E query APIs). Returns `None` for a function with no entry block
    /// yet (a declaration still under construction).
    pub fn analyze(&self, id: FunctionId) -> Option<(Cfg, DominatorTree)> {
        let function = self.function(id);
        let entry = function.entry()?;
        let cfg = Cfg::build(function);
        let dom = DominatorTree::build(&cfg, entry);
        Some((cfg, dom))
    }
}
