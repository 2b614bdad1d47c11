//! IR instructions and operands (spec §3 "Instruction").
//!
//! The instruction set is deliberately flat: every kind named in the spec
//! gets one variant, and nothing else. The monomorphization rewriter (the
//! crate's `mono` module) matches on every one of them; adding a variant
//! here without a matching arm there is the one place this crate treats as
//! a programmer error rather than a diagnosable one (spec §4.F "Instruction
//! coverage").

use super::block::BlockId;
use super::function::{CanonicalSpecialization, FunctionId, LoweredType};
use crate::source::SourceRange;

slotmap::new_key_type! {
    /// A per-block instruction handle. Stable across insertion/removal of
    /// *other* instructions in the same block (spec §3 "stable-handle
    /// container"); invalidated only if the instruction itself is removed.
    pub struct InstrAddr;
}

/// `(block_id, instruction_address)`, per the glossary's `InstructionID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstructionId {
    pub block: BlockId,
    pub addr: InstrAddr,
}

/// The access convention a capability instruction operates under, implied
/// by the `Access`/`EndAccess`/`Open*`/`Close*` instruction family — this is
/// the ownership-aware systems language's parameter-passing discipline
/// (`let`/`inout`/`set`/`sink`), not something the distilled spec spells out
/// by name but required for those instructions to mean anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessEffect {
    Let,
    Inout,
    Set,
    Sink,
}

/// A reference to another IR function, carrying the (possibly still
/// generic) arguments it is applied to. Non-generic callees simply carry an
/// empty `specialization`. Keeping the specialization on the reference
/// itself, rather than inferring it elsewhere, is what lets the
/// monomorphizer compose it with an outer specialization when rewriting a
/// nested generic callee (spec §4.F step 6).
///
/// `requirement_receiver`, when present, marks `function` as a trait
/// requirement rather than a concrete callee: `function` names the
/// requirement's own declaration, and the receiver model here is what a
/// conformance lookup is keyed on (spec §4.F step 7, glossary
/// "Conformance").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionRef {
    pub function: FunctionId,
    pub specialization: CanonicalSpecialization,
    pub requirement_receiver: Option<LoweredType>,
}

/// A compile-time constant operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Const {
    Int(i64),
    Float(f64),
    Bool(bool),
    Unit,
    /// A reference to another IR function, e.g. the callee of a direct
    /// `Call`. Monomorphization recurses into these (spec §4.F step 5:
    /// "function references are themselves monomorphized").
    FunctionRef(FunctionRef),
    /// A first-class type value, e.g. the argument to `sizeof`/`alignof` or
    /// a witness-table slot. Monomorphization specializes these in place
    /// (spec §4.F step 5: "metatypes are specialized").
    Metatype(LoweredType),
}

/// One use of a value: a compile-time constant, a block's own parameter, or
/// a prior instruction's result (spec §3 "Operands are one of...").
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Constant(Const),
    /// The `index`-th input of `block`.
    Parameter { block: BlockId, index: u32 },
    Result(InstructionId),
}

/// A `switch` discriminant-to-target arm.
#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub discriminant: Const,
    pub target: BlockId,
}

/// One instruction. Variants are grouped exactly as spec §3 groups them;
/// the grouping has no runtime meaning, it just keeps this enum navigable.
#[derive(Debug, Clone)]
pub enum Instruction {
    // --- memory ---
    AllocStack {
        ty: LoweredType,
        range: SourceRange,
    },
    DeallocStack {
        alloc: Operand,
        range: SourceRange,
    },
    Load {
        source: Operand,
        range: SourceRange,
    },
    Store {
        value: Operand,
        target: Operand,
        range: SourceRange,
    },
    /// Marks the initialization state of a stored location, e.g. after a
    /// partial move (hylo/val's definite-initialization tracking).
    MarkState {
        target: Operand,
        initialized: bool,
        range: SourceRange,
    },
    AddressToPointer {
        source: Operand,
        range: SourceRange,
    },
    PointerToAddress {
        source: Operand,
        ty: LoweredType,
        range: SourceRange,
    },
    AdvancedByBytes {
        base: Operand,
        byte_offset: Operand,
        range: SourceRange,
    },
    AdvancedByStrides {
        base: Operand,
        stride_count: Operand,
        range: SourceRange,
    },
    /// Projects a named field of an aggregate without copying it.
    SubfieldView {
        base: Operand,
        field_index: u32,
        range: SourceRange,
    },

    // --- control flow (terminators; must be last in a block) ---
    Branch {
        target: BlockId,
        args: Vec<Operand>,
        range: SourceRange,
    },
    CondBranch {
        condition: Operand,
        then_target: BlockId,
        then_args: Vec<Operand>,
        else_target: BlockId,
        else_args: Vec<Operand>,
        range: SourceRange,
    },
    Switch {
        discriminant: Operand,
        cases: Vec<SwitchCase>,
        default: BlockId,
        range: SourceRange,
    },
    Return {
        value: Operand,
        range: SourceRange,
    },
    Unreachable {
        range: SourceRange,
    },

    // --- capability / access ---
    Access {
        effect: AccessEffect,
        source: Operand,
        range: SourceRange,
    },
    EndAccess {
        access: Operand,
        range: SourceRange,
    },
    CaptureIn {
        source: Operand,
        target: Operand,
        range: SourceRange,
    },
    OpenCapture {
        source: Operand,
        range: SourceRange,
    },
    CloseCapture {
        capture: Operand,
        range: SourceRange,
    },
    ReleaseCaptures {
        range: SourceRange,
    },

    // --- union handling ---
    OpenUnion {
        union: Operand,
        as_type: LoweredType,
        range: SourceRange,
    },
    CloseUnion {
        payload: Operand,
        range: SourceRange,
    },
    UnionDiscriminator {
        union: Operand,
        range: SourceRange,
    },

    // --- calls ---
    Call {
        callee: Operand,
        args: Vec<Operand>,
        range: SourceRange,
    },
    CallFFI {
        symbol: String,
        args: Vec<Operand>,
        return_type: LoweredType,
        range: SourceRange,
    },
    /// An escape hatch for target-specific codegen intrinsics; carries
    /// opaque textual IR the backend is responsible for interpreting (out
    /// of scope for this crate, spec.md §1 non-goals).
    LLVMInstruction {
        text: String,
        operands: Vec<Operand>,
        range: SourceRange,
    },

    // --- projections ---
    Project {
        subscript: Operand,
        args: Vec<Operand>,
        range: SourceRange,
    },
    EndProject {
        projection: Operand,
        range: SourceRange,
    },

    // --- literals ---
    ConstantString {
        value: String,
        range: SourceRange,
    },
    GlobalAddr {
        symbol: String,
        range: SourceRange,
    },

    Yield {
        value: Operand,
        range: SourceRange,
    },
}

impl Instruction {
    /// A terminator may appear only as the last instruction of a block
    /// (spec §3 invariant).
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Branch { .. }
                | Instruction::CondBranch { .. }
                | Instruction::Switch { .. }
                | Instruction::Return { .. }
                | Instruction::Unreachable { .. }
                | Instruction::Yield { .. }
        )
    }

    /// The blocks this instruction may transfer control to, in textual
    /// order. Empty for non-terminators. Used to build the CFG (spec §4.E
    /// "`cfg()` — builds predecessor/successor graph by walking
    /// terminators").
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Instruction::Branch { target, .. } => vec![*target],
            Instruction::CondBranch {
                then_target,
                else_target,
                ..
            } => vec![*then_target, *else_target],
            Instruction::Switch { cases, default, .. } => {
                let mut out: Vec<BlockId> = cases.iter().map(|c| c.target).collect();
                out.push(*default);
                out
            }
            _ => Vec::new(),
        }
    }

    pub fn range(&self) -> SourceRange {
        match self {
            Instruction::AllocStack { range, .. }
            | Instruction::DeallocStack { range, .. }
            | Instruction::Load { range, .. }
            | Instruction::Store { range, .. }
            | Instruction::MarkState { range, .. }
            | Instruction::AddressToPointer { range, .. }
            | Instruction::PointerToAddress { range, .. }
            | Instruction::AdvancedByBytes { range, .. }
            | Instruction::AdvancedByStrides { range, .. }
            | Instruction::SubfieldView { range, .. }
            | Instruction::Branch { range, .. }
            | Instruction::CondBranch { range, .. }
            | Instruction::Switch { range, .. }
            | Instruction::Return { range, .. }
            | Instruction::Unreachable { range }
            | Instruction::Access { range, .. }
            | Instruction::EndAccess { range, .. }
            | Instruction::CaptureIn { range, .. }
            | Instruction::OpenCapture { range, .. }
            | Instruction::CloseCapture { range, .. }
            | Instruction::ReleaseCaptures { range }
            | Instruction::OpenUnion { range, .. }
            | Instruction::CloseUnion { range, .. }
            | Instruction::UnionDiscriminator { range, .. }
            | Instruction::Call { range, .. }
            | Instruction::CallFFI { range, .. }
            | Instruction::LLVMInstruction { range, .. }
            | Instruction::Project { range, .. }
            | Instruction::EndProject { range, .. }
            | Instruction::ConstantString { range, .. }
            | Instruction::GlobalAddr { range, .. }
            | Instruction::Yield { range, .. } => *range,
        }
    }
}
