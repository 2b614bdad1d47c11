//! Basic blocks (spec §3 "Block").
//!
//! A block owns its instructions in a `SlotMap` keyed by [`InstrAddr`] plus
//! an explicit `order` vector. The slot map gives every instruction a
//! stable address that survives insertion and removal of its neighbors
//! (spec §3 invariant: "addresses remain valid after unrelated
//! insertions/removals"); the order vector is the actual "ordered list of
//! instructions" the spec describes, since a `SlotMap` has no iteration
//! order of its own.

use super::function::{FunctionId, LoweredType};
use super::instruction::{InstrAddr, Instruction};
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// A function-local block handle. Stable across insertion/removal of
    /// *other* blocks in the same function (spec §3 "Block addresses are
    /// stable across insertions and removals").
    pub struct BlockAddr;
}

/// `(function_id, block_address)`, per the glossary's `Block.ID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId {
    pub function: FunctionId,
    pub addr: BlockAddr,
}

#[derive(Debug)]
pub struct Block {
    pub inputs: Vec<LoweredType>,
    instructions: SlotMap<InstrAddr, Instruction>,
    order: Vec<InstrAddr>,
}

impl Block {
    pub fn new(inputs: Vec<LoweredType>) -> Self {
        Self {
            inputs,
            instructions: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Appends `instr` to the end of the block and returns the address it
    /// was stored at. Callers are responsible for keeping terminators last
    /// (spec §3 invariant; not mechanically enforced here, same as the
    /// parser's "diagnose, don't reject" posture for context rules).
    pub fn push(&mut self, instr: Instruction) -> InstrAddr {
        let addr = self.instructions.insert(instr);
        self.order.push(addr);
        addr
    }

    /// Removes the instruction at `addr`. Every other address in the block
    /// stays valid (spec §3 invariant).
    pub fn remove(&mut self, addr: InstrAddr) -> Option<Instruction> {
        let removed = self.instructions.remove(addr);
        if removed.is_some() {
            self.order.retain(|a| *a != addr);
        }
        removed
    }

    /// Overwrites the instruction at `addr` in place, preserving its
    /// address (spec §3: "Replacing an instruction preserves its address").
    pub fn replace(&mut self, addr: InstrAddr, instr: Instruction) {
        self.instructions[addr] = instr;
    }

    pub fn get(&self, addr: InstrAddr) -> Option<&Instruction> {
        self.instructions.get(addr)
    }

    /// Instructions in source/program order.
    pub fn instructions(&self) -> impl Iterator<Item = (InstrAddr, &Instruction)> {
        self.order.iter().map(move |addr| (*addr, &self.instructions[*addr]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The block's terminator, if one has been appended yet (spec §3
    /// invariant: a terminator is always the last instruction).
    pub fn terminator(&self) -> Option<&Instruction> {
        self.order
            .last()
            .map(|addr| &self.instructions[*addr])
            .filter(|instr| instr.is_terminator())
    }
}
