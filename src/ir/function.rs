//! IR functions (spec §3 "IR Function", §4.E construction APIs).

use super::block::{Block, BlockAddr, BlockId};
use super::instruction::InstrAddr;
use crate::source::SourceRange;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// A module-wide function handle, also the `base_id` half of a
    /// monomorphized function's identity (spec §3 "monomorphized copy keyed
    /// by `(base_id, canonical_specialization)`").
    pub struct FunctionId;
}

/// Identifies one of a generic declaration's own generic parameters, for
/// use as a substitution key during monomorphization and as the payload of
/// `LoweredType::GenericParam`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenericParamId(pub u32);

/// A lowered type. The real type-checker is an external collaborator (spec
/// §1); this is the minimal structure the IR and monomorphizer need to
/// substitute and compare types, mirroring how `ast::ResolvedType` stands
/// in for the checker's richer representation at the AST layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoweredType {
    /// An already-concrete, checker-assigned type, named opaquely (e.g.
    /// `"Int"`, `"Bool"`, a product type's mangled name).
    Concrete(String),
    /// A reference to one of the enclosing generic function's own
    /// parameters; substituted away during monomorphization.
    GenericParam(GenericParamId),
    /// A generic type applied to concrete or still-generic arguments, e.g.
    /// `Array<T>`.
    Specialized { base: String, args: Vec<LoweredType> },
    Pointer(Box<LoweredType>),
    Tuple(Vec<LoweredType>),
}

impl LoweredType {
    /// Whether this type (or any type nested inside it) still refers to a
    /// generic parameter. A function is only a monomorphization candidate
    /// if its signature contains one of these (spec §4.F: "for each
    /// function with a body, if non-generic, rewrite...").
    pub fn is_generic(&self) -> bool {
        match self {
            LoweredType::Concrete(_) => false,
            LoweredType::GenericParam(_) => true,
            LoweredType::Specialized { args, .. } => args.iter().any(LoweredType::is_generic),
            LoweredType::Pointer(inner) => inner.is_generic(),
            LoweredType::Tuple(elems) => elems.iter().any(LoweredType::is_generic),
        }
    }
}

/// The ownership-aware parameter-passing convention a value is received
/// under (implied by the `Access`/`EndAccess`/capability instruction
/// family — see `instruction::AccessEffect`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterConvention {
    Let,
    Inout,
    Set,
    Sink,
}

#[derive(Debug, Clone)]
pub struct ParameterType {
    pub convention: ParameterConvention,
    pub ty: LoweredType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    External,
    Internal,
}

/// A mapping from generic-parameter identity to concrete type arguments
/// (glossary: "Specialization"), already passed through `canonical` (spec
/// §4.F: "every specialized type is passed through `canonical`... this
/// ensures equality of monomorphized functions keyed by specialization").
/// Sorted by `GenericParamId` so that two specializations naming the same
/// substitutions in a different order still compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CanonicalSpecialization {
    pub args: Vec<(GenericParamId, LoweredType)>,
}

impl CanonicalSpecialization {
    pub fn lookup(&self, param: GenericParamId) -> Option<&LoweredType> {
        self.args.iter().find(|(p, _)| *p == param).map(|(_, ty)| ty)
    }
}

/// Which of spec §3's function-identity cases produced this function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionOrigin {
    LoweredDecl,
    Constructor,
    GlobalAccessor,
    SynthesizedRequirement,
    /// `(base_id, canonical_specialization)`, the monomorphizer's
    /// memoization key (spec §4.F step 1, "Monomorphization memoization").
    Monomorphized {
        base: FunctionId,
        specialization: CanonicalSpecialization,
    },
}

#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub anchor: SourceRange,
    pub linkage: Linkage,
    pub inputs: Vec<ParameterType>,
    pub output: LoweredType,
    pub generic_parameters: Vec<GenericParamId>,
    pub origin: FunctionOrigin,
    id: FunctionId,
    blocks: SlotMap<BlockAddr, Block>,
    block_order: Vec<BlockAddr>,
}

impl Function {
    pub(super) fn new(
        id: FunctionId,
        name: String,
        anchor: SourceRange,
        linkage: Linkage,
        inputs: Vec<ParameterType>,
        output: LoweredType,
        generic_parameters: Vec<GenericParamId>,
        origin: FunctionOrigin,
    ) -> Self {
        Self {
            name,
            anchor,
            linkage,
            inputs,
            output,
            generic_parameters,
            origin,
            id,
            blocks: SlotMap::with_key(),
            block_order: Vec::new(),
        }
    }

    pub fn id(&self) -> FunctionId {
        self.id
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_parameters.is_empty()
    }

    /// Appends a new block with the given parameter types and returns its
    /// id (spec §4.E "`appendBlock(taking:)`").
    pub fn append_block(&mut self, inputs: Vec<LoweredType>) -> BlockId {
        let addr = self.blocks.insert(Block::new(inputs));
        self.block_order.push(addr);
        BlockId {
            function: self.id,
            addr,
        }
    }

    /// Removes a block. Every other block's address stays valid (spec §3
    /// invariant).
    pub fn remove_block(&mut self, id: BlockId) -> Option<Block> {
        debug_assert_eq!(id.function, self.id, "block belongs to a different function");
        let removed = self.blocks.remove(id.addr);
        if removed.is_some() {
            self.block_order.retain(|a| *a != id.addr);
        }
        removed
    }

    pub fn block(&self, id: BlockId) -> &Block {
        debug_assert_eq!(id.function, self.id, "block belongs to a different function");
        &self.blocks[id.addr]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        debug_assert_eq!(id.function, self.id, "block belongs to a different function");
        &mut self.blocks[id.addr]
    }

    /// `entry` is the first block (spec §3).
    pub fn entry(&self) -> Option<BlockId> {
        self.block_order.first().map(|addr| BlockId {
            function: self.id,
            addr: *addr,
        })
    }

    /// Blocks in program order (the "ordered list of Block").
    pub fn blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.block_order.iter().map(move |addr| BlockId {
            function: self.id,
            addr: *addr,
        })
    }

    pub fn block_count(&self) -> usize {
        self.block_order.len()
    }

    /// Every instruction id reachable in this function, for use by callers
    /// building a source-instruction → target-instruction table (spec §4.F
    /// step 5).
    pub fn instruction_ids(&self) -> Vec<(BlockId, InstrAddr)> {
        let mut out = Vec::new();
        for block_id in self.blocks() {
            for (addr, _) in self.block(block_id).instructions() {
                out.push((block_id, addr));
            }
        }
        out
    }
}
