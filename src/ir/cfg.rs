//! Control-flow graph construction (spec §4.E: `cfg()` "builds
//! predecessor/successor graph by walking terminators").

use super::block::BlockId;
use super::function::Function;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Cfg {
    successors: HashMap<BlockId, Vec<BlockId>>,
    predecessors: HashMap<BlockId, Vec<BlockId>>,
}

impl Cfg {
    /// Walks every block's terminator to build the predecessor/successor
    /// maps. A block with no terminator yet (still under construction) is
    /// treated as having no successors.
    pub fn build(function: &Function) -> Self {
        let mut successors: HashMap<BlockId, Vec<BlockId>> = HashMap::new();
        let mut predecessors: HashMap<BlockId, Vec<BlockId>> = HashMap::new();

        for block_id in function.blocks() {
            predecessors.entry(block_id).or_default();
            let targets = function
                .block(block_id)
                .terminator()
                .map(|instr| instr.successors())
                .unwrap_or_default();
            for target in &targets {
                predecessors.entry(*target).or_default().push(block_id);
            }
            successors.insert(block_id, targets);
        }

        Cfg {
            successors,
            predecessors,
        }
    }

    pub fn successors(&self, block: BlockId) -> &[BlockId] {
        self.successors.get(&block).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn predecessors(&self, block: BlockId) -> &[BlockId] {
        self.predecessors.get(&block).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.successors.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::function::{FunctionOrigin, Linkage, LoweredType};
    use crate::ir::instruction::{Instruction, Operand};
    use crate::ir::Module;
    use crate::source::SourceRange;

    fn dummy_range() -> SourceRange {
        let mut sm = crate::source::SourceManager::new();
        let file = sm.load_synthesized("<test>", "");
        sm.eof_range(file)
    }

    #[test]
    fn straight_line_function_has_no_predecessors_on_entry() {
        let mut module = Module::new();
        let id = module.declare_function(
            "f".into(),
            dummy_range(),
            Linkage::Internal,
            Vec::new(),
            LoweredType::Concrete("Unit".into()),
            Vec::new(),
            FunctionOrigin::LoweredDecl,
        );
        let function = module.function_mut(id);
        let entry = function.append_block(Vec::new());
        function.block_mut(entry).push(Instruction::Return {
            value: Operand::Constant(crate::ir::instruction::Const::Unit),
            range: dummy_range(),
        });

        let cfg = Cfg::build(function);
        assert!(cfg.predecessors(entry).is_empty());
        assert!(cfg.successors(entry).is_empty());
    }

    #[test]
    fn branch_records_predecessor() {
        let mut module = Module::new();
        let id = module.declare_function(
            "f".into(),
            dummy_range(),
            Linkage::Internal,
            Vec::new(),
            LoweredType::Concrete("Unit".into()),
            Vec::new(),
            FunctionOrigin::LoweredDecl,
        );
        let function = module.function_mut(id);
        let entry = function.append_block(Vec::new());
        let target = function.append_block(Vec::new());
        function.block_mut(entry).push(Instruction::Branch {
            target,
            args: Vec::new(),
            range: dummy_range(),
        });
        function.block_mut(target).push(Instruction::Return {
            value: Operand::Constant(crate::ir::instruction::Const::Unit),
            range: dummy_range(),
        });

        let cfg = Cfg::build(function);
        assert_eq!(cfg.successors(entry), &[target]);
        assert_eq!(cfg.predecessors(target), &[entry]);
    }
}
