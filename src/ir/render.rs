//! Textual IR dumps (SPEC_FULL.md ambient-stack addition: "IR model gets
//! `Display`/debug-printing for functions"), built on [`ptree`] — the same
//! crate the teacher uses for its own AST pretty-printer, now pointed at a
//! function's block/instruction structure instead.

use super::function::{Function, FunctionId, LoweredType};
use super::instruction::{Const, Instruction, Operand};
use super::Module;
use ptree::TreeBuilder;

/// Renders one function as an indented tree: the function signature at the
/// root, one child per block (labeled with its inputs), one grandchild per
/// instruction. Useful for test assertions and for any driver that wants a
/// human-readable dump without writing its own printer.
pub fn render_function(module: &Module, id: FunctionId) -> String {
    let function = module.function(id);
    let mut builder = TreeBuilder::new(function_signature(function));

    for block_id in function.blocks() {
        let block = function.block(block_id);
        let inputs: Vec<String> = block.inputs.iter().map(type_text).collect();
        builder.begin_child(format!("block({})", inputs.join(", ")));
        for (_, instr) in block.instructions() {
            builder.add_empty_child(instruction_text(instr));
        }
        builder.end_child();
    }

    let tree = builder.build();
    let mut out = Vec::new();
    ptree::write_tree(&tree, &mut out).expect("writing to an in-memory buffer cannot fail");
    String::from_utf8(out).expect("ptree only ever writes the UTF-8 text we gave it")
}

fn function_signature(function: &Function) -> String {
    let inputs: Vec<String> = function
        .inputs
        .iter()
        .map(|p| format!("{:?} {}", p.convention, type_text(&p.ty)))
        .collect();
    format!(
        "fn {}({}) -> {}",
        function.name,
        inputs.join(", "),
        type_text(&function.output)
    )
}

fn type_text(ty: &LoweredType) -> String {
    match ty {
        LoweredType::Concrete(name) => name.clone(),
        LoweredType::GenericParam(param) => format!("T{}", param.0),
        LoweredType::Specialized { base, args } => {
            let args: Vec<String> = args.iter().map(type_text).collect();
            format!("{}<{}>", base, args.join(", "))
        }
        LoweredType::Pointer(inner) => format!("*{}", type_text(inner)),
        LoweredType::Tuple(elements) => {
            let elements: Vec<String> = elements.iter().map(type_text).collect();
            format!("({})", elements.join(", "))
        }
    }
}

fn operand_text(operand: &Operand) -> String {
    match operand {
        Operand::Constant(constant) => const_text(constant),
        Operand::Parameter { index, .. } => format!("%arg{index}"),
        Operand::Result(id) => format!("%{:?}", id.addr),
    }
}

fn const_text(constant: &Const) -> String {
    match constant {
        Const::Int(value) => value.to_string(),
        Const::Float(value) => value.to_string(),
        Const::Bool(value) => value.to_string(),
        Const::Unit => "()".to_string(),
        Const::FunctionRef(function_ref) => format!("@{:?}", function_ref.function),
        Const::Metatype(ty) => format!("metatype({})", type_text(ty)),
    }
}

fn instruction_text(instr: &Instruction) -> String {
    match instr {
        Instruction::AllocStack { ty, .. } => format!("alloc_stack {}", type_text(ty)),
        Instruction::DeallocStack { alloc, .. } => format!("dealloc_stack {}", operand_text(alloc)),
        Instruction::Load { source, .. } => format!("load {}", operand_text(source)),
        Instruction::Store { value, target, .. } => {
            format!("store {} to {}", operand_text(value), operand_text(target))
        }
        Instruction::MarkState { target, initialized, .. } => {
            format!("mark_state {} initialized={initialized}", operand_text(target))
        }
        Instruction::AddressToPointer { source, .. } => format!("address_to_pointer {}", operand_text(source)),
        Instruction::PointerToAddress { source, ty, .. } => {
            format!("pointer_to_address {} as {}", operand_text(source), type_text(ty))
        }
        Instruction::AdvancedByBytes { base, byte_offset, .. } => {
            format!("advanced {} by_bytes {}", operand_text(base), operand_text(byte_offset))
        }
        Instruction::AdvancedByStrides { base, stride_count, .. } => {
            format!("advanced {} by_strides {}", operand_text(base), operand_text(stride_count))
        }
        Instruction::SubfieldView { base, field_index, .. } => {
            format!("subfield_view {} .{}", operand_text(base), field_index)
        }
        Instruction::Branch { target, args, .. } => {
            format!("branch block({:?}) ({})", target.addr, operand_list(args))
        }
        Instruction::CondBranch {
            condition,
            then_target,
            then_args,
            else_target,
            else_args,
            ..
        } => format!(
            "cond_branch {} then block({:?}) ({}) else block({:?}) ({})",
            operand_text(condition),
            then_target.addr,
            operand_list(then_args),
            else_target.addr,
            operand_list(else_args)
        ),
        Instruction::Switch {
            discriminant,
            cases,
            default,
            ..
        } => {
            let arms: Vec<String> = cases
                .iter()
                .map(|case| format!("{} -> block({:?})", const_text(&case.discriminant), case.target.addr))
                .collect();
            format!(
                "switch {} [{}] default block({:?})",
                operand_text(discriminant),
                arms.join(", "),
                default.addr
            )
        }
        Instruction::Return { value, .. } => format!("return {}", operand_text(value)),
        Instruction::Unreachable { .. } => "unreachable".to_string(),
        Instruction::Access { effect, source, .. } => format!("access {:?} {}", effect, operand_text(source)),
        Instruction::EndAccess { access, .. } => format!("end_access {}", operand_text(access)),
        Instruction::CaptureIn { source, target, .. } => {
            format!("capture_in {} into {}", operand_text(source), operand_text(target))
        }
        Instruction::OpenCapture { source, .. } => format!("open_capture {}", operand_text(source)),
        Instruction::CloseCapture { capture, .. } => format!("close_capture {}", operand_text(capture)),
        Instruction::ReleaseCaptures { .. } => "release_captures".to_string(),
        Instruction::OpenUnion { union, as_type, .. } => {
            format!("open_union {} as {}", operand_text(union), type_text(as_type))
        }
        Instruction::CloseUnion { payload, .. } => format!("close_union {}", operand_text(payload)),
        Instruction::UnionDiscriminator { union, .. } => format!("union_discriminator {}", operand_text(union)),
        Instruction::Call { callee, args, .. } => {
            format!("call {} ({})", operand_text(callee), operand_list(args))
        }
        Instruction::CallFFI {
            symbol,
            args,
            return_type,
            ..
        } => format!("call_ffi {symbol} ({}) -> {}", operand_list(args), type_text(return_type)),
        Instruction::LLVMInstruction { text, operands, .. } => {
            format!("llvm \"{text}\" ({})", operand_list(operands))
        }
        Instruction::Project { subscript, args, .. } => {
            format!("project {} ({})", operand_text(subscript), operand_list(args))
        }
        Instruction::EndProject { projection, .. } => format!("end_project {}", operand_text(projection)),
        Instruction::ConstantString { value, .. } => format!("constant_string {value:?}"),
        Instruction::GlobalAddr { symbol, .. } => format!("global_addr {symbol}"),
        Instruction::Yield { value, .. } => format!("yield {}", operand_text(value)),
    }
}

fn operand_list(operands: &[Operand]) -> String {
    operands.iter().map(operand_text).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FunctionOrigin, Linkage, ParameterConvention, ParameterType};
    use crate::source::{SourceManager, SourceRange};

    fn dummy_range() -> SourceRange {
        let mut manager = SourceManager::new();
        let file = manager.load_synthesized("<render-test>", "");
        manager.eof_range(file)
    }

    #[test]
    fn renders_a_simple_return_function() {
        let mut module = Module::new();
        let range = dummy_range();
        let id = module.declare_function(
            "identity".to_string(),
            range,
            Linkage::External,
            vec![ParameterType {
                convention: ParameterConvention::Let,
                ty: LoweredType::Concrete("Int".to_string()),
            }],
            LoweredType::Concrete("Int".to_string()),
            Vec::new(),
            FunctionOrigin::LoweredDecl,
        );
        let entry = module.function_mut(id).append_block(vec![LoweredType::Concrete("Int".to_string())]);
        module.function_mut(id).block_mut(entry).push(Instruction::Return {
            value: Operand::Parameter { block: entry, index: 0 },
            range,
        });

        let rendered = render_function(&module, id);
        assert!(rendered.contains("fn identity"));
        assert!(rendered.contains("block(Int)"));
        assert!(rendered.contains("return %arg0"));
    }
}
