//! The monomorphization algorithm (spec §4.F "Depolymorphize").

use super::specialization::{compose, substitute};
use crate::ir::{
    BlockId, CanonicalSpecialization, Const, FunctionId, FunctionOrigin, FunctionRef, Instruction,
    InstructionId, Linkage, LoweredType, Module, Operand, ParameterType, SwitchCase,
};
use std::collections::HashMap;

/// Evidence that a concrete receiver type satisfies a trait: an
/// implementation map from requirement declarations to concrete function
/// ids (glossary "Conformance"). The real table lives with the external
/// type-checker (spec.md §1 non-goal: "type-checker internals"); this crate
/// only needs something it can query during rewriting.
pub trait ConformanceTable {
    fn resolve(&self, receiver: &LoweredType, requirement: FunctionId) -> Option<FunctionId>;
}

/// A conformance table with no known conformances, for callers (and the
/// crate's own tests) that never emit trait-requirement calls.
#[derive(Debug, Default)]
pub struct NoConformances;

impl ConformanceTable for NoConformances {
    fn resolve(&self, _receiver: &LoweredType, _requirement: FunctionId) -> Option<FunctionId> {
        None
    }
}

/// spec §4.F / §9 open question: "existentialization is stubbed —
/// `existentialize` returns its input unchanged. A faithful implementation
/// must add extra parameters per generic (witness table + size) and a
/// uniform raw-pointer representation for generic-typed values." This is
/// that stub, not a guessed implementation.
pub fn existentialize(_module: &Module, function: FunctionId) -> FunctionId {
    function
}

/// Entry point over a whole module (spec §4.F, unnumbered intro
/// paragraph): every non-generic function with a body gets its callees
/// resolved to concrete monomorphized copies in place; every generic public
/// (external-linkage) function gets an existentialized wrapper.
pub fn monomorphize_module(module: &mut Module, conformances: &dyn ConformanceTable) {
    let function_ids: Vec<FunctionId> = module.functions().map(|(id, _)| id).collect();
    for id in function_ids {
        let (is_generic, is_external, has_body) = {
            let f = module.function(id);
            (f.is_generic(), f.linkage == Linkage::External, f.entry().is_some())
        };
        if has_body && !is_generic {
            rewrite_callees_in_place(module, id, conformances);
        } else if is_generic && is_external {
            existentialize(module, id);
        }
    }
}

/// Rewrites every `Call`/`Project` callee reachable from a *non-generic*
/// function's own body to point at concrete monomorphized copies, without
/// creating a new function (there is no specialization of `id` itself to
/// apply — it already has none).
fn rewrite_callees_in_place(module: &mut Module, id: FunctionId, conformances: &dyn ConformanceTable) {
    let empty = CanonicalSpecialization::default();
    let block_ids: Vec<BlockId> = module.function(id).blocks().collect();
    let identity_block_map: HashMap<BlockId, BlockId> = block_ids.iter().map(|b| (*b, *b)).collect();
    let no_value_map = HashMap::new();

    for block_id in block_ids {
        let addrs: Vec<_> = module.function(id).block(block_id).instructions().map(|(a, _)| a).collect();
        for addr in addrs {
            let instr = module.function(id).block(block_id).get(addr).unwrap().clone();
            let rewritten = rewrite_instruction(
                module,
                &instr,
                &empty,
                &identity_block_map,
                &no_value_map,
                conformances,
            );
            module.function_mut(id).block_mut(block_id).replace(addr, rewritten);
        }
    }
}

/// Monomorphizes `base` for `specialization` (spec §4.F steps 1-7),
/// returning the resulting function's id. Memoized on `(base_id,
/// canonical_specialization)` so mutually-recursive generics terminate and
/// repeat requests return the same identity (spec §8 Scenario 6).
pub fn monomorphize_function(
    module: &mut Module,
    base: FunctionId,
    specialization: &CanonicalSpecialization,
    conformances: &dyn ConformanceTable,
) -> FunctionId {
    if specialization.args.is_empty() && !module.function(base).is_generic() {
        return base;
    }

    // Step 1.
    if let Some(existing) = module.lookup_monomorphization(base, specialization) {
        return existing;
    }

    let (name, anchor, linkage, inputs, output) = {
        let f = module.function(base);
        (
            f.name.clone(),
            f.anchor,
            f.linkage,
            f.inputs.iter().map(|p| p.ty.clone()).collect::<Vec<_>>(),
            f.output.clone(),
        )
    };
    let conventions: Vec<_> = {
        let f = module.function(base);
        f.inputs.iter().map(|p| p.convention).collect()
    };

    let specialized_inputs: Vec<ParameterType> = inputs
        .iter()
        .zip(conventions)
        .map(|(ty, convention)| ParameterType {
            convention,
            ty: substitute(ty, specialization),
        })
        .collect();
    let specialized_output = substitute(&output, specialization);

    // Step 2: declare the target with no generic parameters, empty blocks.
    let target_id = module.declare_function(
        mangled_name(&name, specialization),
        anchor,
        linkage,
        specialized_inputs,
        specialized_output,
        Vec::new(),
        FunctionOrigin::Monomorphized {
            base,
            specialization: specialization.clone(),
        },
    );
    // Recorded before walking the body so a generic function calling itself
    // terminates (spec §4.F "Monomorphization memoization": "Insert the
    // declaration before walking the body to ensure cycles... terminate").
    module.record_monomorphization(base, specialization.clone(), target_id);

    let Some((_cfg, dom)) = module.analyze(base) else {
        // A declaration with no body yet: nothing left to rewrite.
        return target_id;
    };

    // Step 3: one target block per source block, with specialized inputs.
    let mut block_map: HashMap<BlockId, BlockId> = HashMap::new();
    let source_blocks: Vec<BlockId> = module.function(base).blocks().collect();
    for source_block in source_blocks {
        let block_inputs: Vec<LoweredType> = module
            .function(base)
            .block(source_block)
            .inputs
            .iter()
            .map(|ty| substitute(ty, specialization))
            .collect();
        let target_block = module.function_mut(target_id).append_block(block_inputs);
        block_map.insert(source_block, target_block);
    }

    // Step 4: dominator-BFS visiting order, so every definition is rewritten
    // before any of its uses.
    let mut value_map: HashMap<InstructionId, InstructionId> = HashMap::new();
    for source_block in dom.bfs_order() {
        let target_block = block_map[&source_block];
        let instrs: Vec<_> = module
            .function(base)
            .block(source_block)
            .instructions()
            .map(|(addr, instr)| (addr, instr.clone()))
            .collect();

        // Step 5: rewrite operands, append an equivalent instruction.
        for (addr, instr) in instrs {
            let source_id = InstructionId {
                block: source_block,
                addr,
            };
            let rewritten =
                rewrite_instruction(module, &instr, specialization, &block_map, &value_map, conformances);
            let target_addr = module.function_mut(target_id).block_mut(target_block).push(rewritten);
            value_map.insert(
                source_id,
                InstructionId {
                    block: target_block,
                    addr: target_addr,
                },
            );
        }
    }

    target_id
}

fn mangled_name(base: &str, specialization: &CanonicalSpecialization) -> String {
    if specialization.args.is_empty() {
        return base.to_string();
    }
    let args = specialization
        .args
        .iter()
        .map(|(_, ty)| format!("{:?}", ty))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}<{}>", base, args)
}

fn rewrite_operand(
    module: &mut Module,
    operand: &Operand,
    specialization: &CanonicalSpecialization,
    block_map: &HashMap<BlockId, BlockId>,
    value_map: &HashMap<InstructionId, InstructionId>,
    conformances: &dyn ConformanceTable,
) -> Operand {
    match operand {
        Operand::Constant(c) => Operand::Constant(rewrite_const(module, c, specialization, conformances)),
        Operand::Parameter { block, index } => Operand::Parameter {
            block: *block_map.get(block).unwrap_or(block),
            index: *index,
        },
        Operand::Result(id) => Operand::Result(*value_map.get(id).unwrap_or(id)),
    }
}

fn rewrite_const(
    module: &mut Module,
    c: &Const,
    specialization: &CanonicalSpecialization,
    conformances: &dyn ConformanceTable,
) -> Const {
    match c {
        Const::FunctionRef(r) => Const::FunctionRef(rewrite_function_ref(module, r, specialization, conformances)),
        Const::Metatype(ty) => Const::Metatype(substitute(ty, specialization)),
        Const::Int(_) | Const::Float(_) | Const::Bool(_) | Const::Unit => c.clone(),
    }
}

fn rewrite_function_ref(
    module: &mut Module,
    r: &FunctionRef,
    specialization: &CanonicalSpecialization,
    conformances: &dyn ConformanceTable,
) -> FunctionRef {
    // Step 7: a trait-requirement callee resolves through a conformance
    // lookup before it can be monomorphized at all.
    if let Some(receiver) = &r.requirement_receiver {
        let receiver = substitute(receiver, specialization);
        let implementation = conformances
            .resolve(&receiver, r.function)
            .unwrap_or(r.function);
        let composed = compose(&r.specialization, specialization);
        let target = monomorphize_function(module, implementation, &composed, conformances);
        return FunctionRef {
            function: target,
            specialization: CanonicalSpecialization::default(),
            requirement_receiver: None,
        };
    }

    // Step 6: compose a nested generic callee's own specialization with the
    // specialization currently being applied, then monomorphize.
    let composed = compose(&r.specialization, specialization);
    let target = monomorphize_function(module, r.function, &composed, conformances);
    FunctionRef {
        function: target,
        specialization: CanonicalSpecialization::default(),
        requirement_receiver: None,
    }
}

/// The rewriter is total (spec §4.F "Instruction coverage"): this match has
/// one arm per `Instruction` variant and no wildcard, so the compiler
/// itself rejects a new variant with no corresponding case — stricter than
/// the spec's "fatal internal error at runtime" wording, but it is the same
/// "unrecognized kind is never silently skipped" guarantee enforced one
/// phase earlier.
fn rewrite_instruction(
    module: &mut Module,
    instr: &Instruction,
    specialization: &CanonicalSpecialization,
    block_map: &HashMap<BlockId, BlockId>,
    value_map: &HashMap<InstructionId, InstructionId>,
    conformances: &dyn ConformanceTable,
) -> Instruction {
    let op = |module: &mut Module, o: &Operand| {
        rewrite_operand(module, o, specialization, block_map, value_map, conformances)
    };
    let ops = |module: &mut Module, os: &[Operand]| -> Vec<Operand> {
        os.iter().map(|o| rewrite_operand(module, o, specialization, block_map, value_map, conformances)).collect()
    };
    let blk = |b: &BlockId| -> BlockId { *block_map.get(b).unwrap_or(b) };
    let ty = |t: &LoweredType| substitute(t, specialization);

    match instr {
        Instruction::AllocStack { ty: t, range } => Instruction::AllocStack {
            ty: ty(t),
            range: *range,
        },
        Instruction::DeallocStack { alloc, range } => Instruction::DeallocStack {
            alloc: op(module, alloc),
            range: *range,
        },
        Instruction::Load { source, range } => Instruction::Load {
            source: op(module, source),
            range: *range,
        },
        Instruction::Store { value, target, range } => Instruction::Store {
            value: op(module, value),
            target: op(module, target),
            range: *range,
        },
        Instruction::MarkState {
            target,
            initialized,
            range,
        } => Instruction::MarkState {
            target: op(module, target),
            initialized: *initialized,
            range: *range,
        },
        Instruction::AddressToPointer { source, range } => Instruction::AddressToPointer {
            source: op(module, source),
            range: *range,
        },
        Instruction::PointerToAddress { source, ty: t, range } => Instruction::PointerToAddress {
            source: op(module, source),
            ty: ty(t),
            range: *range,
        },
        Instruction::AdvancedByBytes {
            base,
            byte_offset,
            range,
        } => Instruction::AdvancedByBytes {
            base: op(module, base),
            byte_offset: op(module, byte_offset),
            range: *range,
        },
        Instruction::AdvancedByStrides {
            base,
            stride_count,
            range,
        } => Instruction::AdvancedByStrides {
            base: op(module, base),
            stride_count: op(module, stride_count),
            range: *range,
        },
        Instruction::SubfieldView {
            base,
            field_index,
            range,
        } => Instruction::SubfieldView {
            base: op(module, base),
            field_index: *field_index,
            range: *range,
        },
        Instruction::Branch { target, args, range } => Instruction::Branch {
            target: blk(target),
            args: ops(module, args),
            range: *range,
        },
        Instruction::CondBranch {
            condition,
            then_target,
            then_args,
            else_target,
            else_args,
            range,
        } => Instruction::CondBranch {
            condition: op(module, condition),
            then_target: blk(then_target),
            then_args: ops(module, then_args),
            else_target: blk(else_target),
            else_args: ops(module, else_args),
            range: *range,
        },
        Instruction::Switch {
            discriminant,
            cases,
            default,
            range,
        } => Instruction::Switch {
            discriminant: op(module, discriminant),
            cases: cases
                .iter()
                .map(|c| SwitchCase {
                    discriminant: c.discriminant.clone(),
                    target: blk(&c.target),
                })
                .collect(),
            default: blk(default),
            range: *range,
        },
        Instruction::Return { value, range } => Instruction::Return {
            value: op(module, value),
            range: *range,
        },
        Instruction::Unreachable { range } => Instruction::Unreachable { range: *range },
        Instruction::Access { effect, source, range } => Instruction::Access {
            effect: *effect,
            source: op(module, source),
            range: *range,
        },
        Instruction::EndAccess { access, range } => Instruction::EndAccess {
            access: op(module, access),
            range: *range,
        },
        Instruction::CaptureIn { source, target, range } => Instruction::CaptureIn {
            source: op(module, source),
            target: op(module, target),
            range: *range,
        },
        Instruction::OpenCapture { source, range } => Instruction::OpenCapture {
            source: op(module, source),
            range: *range,
        },
        Instruction::CloseCapture { capture, range } => Instruction::CloseCapture {
            capture: op(module, capture),
            range: *range,
        },
        Instruction::ReleaseCaptures { range } => Instruction::ReleaseCaptures { range: *range },
        Instruction::OpenUnion {
            union,
            as_type,
            range,
        } => Instruction::OpenUnion {
            union: op(module, union),
            as_type: ty(as_type),
            range: *range,
        },
        Instruction::CloseUnion { payload, range } => Instruction::CloseUnion {
            payload: op(module, payload),
            range: *range,
        },
        Instruction::UnionDiscriminator { union, range } => Instruction::UnionDiscriminator {
            union: op(module, union),
            range: *range,
        },
        Instruction::Call { callee, args, range } => Instruction::Call {
            callee: op(module, callee),
            args: ops(module, args),
            range: *range,
        },
        Instruction::CallFFI {
            symbol,
            args,
            return_type,
            range,
        } => Instruction::CallFFI {
            symbol: symbol.clone(),
            args: ops(module, args),
            return_type: ty(return_type),
            range: *range,
        },
        Instruction::LLVMInstruction { text, operands, range } => Instruction::LLVMInstruction {
            text: text.clone(),
            operands: ops(module, operands),
            range: *range,
        },
        Instruction::Project { subscript, args, range } => Instruction::Project {
            subscript: op(module, subscript),
            args: ops(module, args),
            range: *range,
        },
        Instruction::EndProject { projection, range } => Instruction::EndProject {
            projection: op(module, projection),
            range: *range,
        },
        Instruction::ConstantString { value, range } => Instruction::ConstantString {
            value: value.clone(),
            range: *range,
        },
        Instruction::GlobalAddr { symbol, range } => Instruction::GlobalAddr {
            symbol: symbol.clone(),
            range: *range,
        },
        Instruction::Yield { value, range } => Instruction::Yield {
            value: op(module, value),
            range: *range,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FunctionOrigin, GenericParamId, Linkage, LoweredType, Operand, ParameterConvention};
    use crate::source::SourceRange;

    fn dummy_range() -> SourceRange {
        let mut sm = crate::source::SourceManager::new();
        let file = sm.load_synthesized("<test>", "");
        sm.eof_range(file)
    }

    /// `id<T>(x: T) -> T`, matching spec §8 Scenario 6.
    fn declare_generic_identity(module: &mut Module) -> FunctionId {
        let param = GenericParamId(0);
        let id = module.declare_function(
            "id".into(),
            dummy_range(),
            Linkage::External,
            vec![ParameterType {
                convention: ParameterConvention::Sink,
                ty: LoweredType::GenericParam(param),
            }],
            LoweredType::GenericParam(param),
            vec![param],
            FunctionOrigin::LoweredDecl,
        );
        let function = module.function_mut(id);
        let entry = function.append_block(vec![LoweredType::GenericParam(param)]);
        function.block_mut(entry).push(Instruction::Return {
            value: Operand::Parameter { block: entry, index: 0 },
            range: dummy_range(),
        });
        id
    }

    #[test]
    fn monomorphize_identity_function_for_int() {
        let mut module = Module::new();
        let base = declare_generic_identity(&mut module);
        let specialization = CanonicalSpecialization {
            args: vec![(GenericParamId(0), LoweredType::Concrete("Int".into()))],
        };

        let mono = monomorphize_function(&mut module, base, &specialization, &NoConformances);

        let target = module.function(mono);
        assert_eq!(target.output, LoweredType::Concrete("Int".into()));
        assert_eq!(target.inputs[0].ty, LoweredType::Concrete("Int".into()));
        assert!(!target.is_generic());
        assert_eq!(target.block_count(), module.function(base).block_count());
    }

    #[test]
    fn repeated_monomorphization_returns_same_identity() {
        let mut module = Module::new();
        let base = declare_generic_identity(&mut module);
        let specialization = CanonicalSpecialization {
            args: vec![(GenericParamId(0), LoweredType::Concrete("Int".into()))],
        };

        let first = monomorphize_function(&mut module, base, &specialization, &NoConformances);
        let second = monomorphize_function(&mut module, base, &specialization, &NoConformances);
        assert_eq!(first, second);
    }

    #[test]
    fn non_generic_function_is_its_own_monomorphization() {
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
        let result = monomorphize_function(&mut module, id, &CanonicalSpecialization::default(), &NoConformances);
        assert_eq!(result, id);
    }

    #[test]
    fn nested_generic_call_composes_specializations() {
        let mut module = Module::new();
        let inner = declare_generic_identity(&mut module);

        // outer<U>(x: U) -> U { return id<U>(x) }
        let outer_param = GenericParamId(1);
        let outer = module.declare_function(
            "outer".into(),
            dummy_range(),
            Linkage::External,
            vec![ParameterType {
                convention: ParameterConvention::Sink,
                ty: LoweredType::GenericParam(outer_param),
            }],
            LoweredType::GenericParam(outer_param),
            vec![outer_param],
            FunctionOrigin::LoweredDecl,
        );
        let function = module.function_mut(outer);
        let entry = function.append_block(vec![LoweredType::GenericParam(outer_param)]);
        let call_addr = function.block_mut(entry).push(Instruction::Call {
            callee: Operand::Constant(Const::FunctionRef(FunctionRef {
                function: inner,
                specialization: CanonicalSpecialization {
                    args: vec![(GenericParamId(0), LoweredType::GenericParam(outer_param))],
                },
                requirement_receiver: None,
            })),
            args: vec![Operand::Parameter { block: entry, index: 0 }],
            range: dummy_range(),
        });
        function.block_mut(entry).push(Instruction::Return {
            value: Operand::Result(InstructionId { block: entry, addr: call_addr }),
            range: dummy_range(),
        });

        let specialization = CanonicalSpecialization {
            args: vec![(outer_param, LoweredType::Concrete("Int".into()))],
        };
        let mono_outer = monomorphize_function(&mut module, outer, &specialization, &NoConformances);

        let target_entry = module.function(mono_outer).entry().unwrap();
        let (_, call_instr) = module
            .function(mono_outer)
            .block(target_entry)
            .instructions()
            .next()
            .unwrap();
        match call_instr {
            Instruction::Call { callee: Operand::Constant(Const::FunctionRef(r)), .. } => {
                assert!(r.specialization.args.is_empty());
                let resolved = module.function(r.function);
                assert_eq!(resolved.output, LoweredType::Concrete("Int".into()));
            }
            other => panic!("expected a Call to a FunctionRef, got {:?}", other),
        }
    }

    /// A conformance table with exactly one known implementation, for
    /// exercising the trait-requirement dispatch branch of
    /// `rewrite_function_ref` (spec §4.F step 7).
    struct OneConformance {
        requirement: FunctionId,
        receiver: LoweredType,
        implementation: FunctionId,
    }

    impl ConformanceTable for OneConformance {
        fn resolve(&self, receiver: &LoweredType, requirement: FunctionId) -> Option<FunctionId> {
            if requirement == self.requirement && *receiver == self.receiver {
                Some(self.implementation)
            } else {
                None
            }
        }
    }

    #[test]
    fn trait_requirement_call_resolves_through_conformance_table() {
        let mut module = Module::new();

        // The trait requirement itself: a declaration with no body, stood in
        // for by whatever `ConformanceTable::resolve` returns.
        let requirement = module.declare_function(
            "eq".into(),
            dummy_range(),
            Linkage::External,
            Vec::new(),
            LoweredType::Concrete("Bool".into()),
            Vec::new(),
            FunctionOrigin::LoweredDecl,
        );

        // The concrete `Int` conformance's implementation: `intEq<U>(x: U) -> U`,
        // still generic in its own right, so resolving through it still needs
        // a real monomorphization, not just a direct substitution.
        let impl_param = GenericParamId(5);
        let implementation = module.declare_function(
            "intEq".into(),
            dummy_range(),
            Linkage::External,
            vec![ParameterType {
                convention: ParameterConvention::Sink,
                ty: LoweredType::GenericParam(impl_param),
            }],
            LoweredType::GenericParam(impl_param),
            vec![impl_param],
            FunctionOrigin::LoweredDecl,
        );
        let impl_function = module.function_mut(implementation);
        let impl_entry = impl_function.append_block(vec![LoweredType::GenericParam(impl_param)]);
        impl_function.block_mut(impl_entry).push(Instruction::Return {
            value: Operand::Parameter { block: impl_entry, index: 0 },
            range: dummy_range(),
        });

        // usesEq<T>(x: T) -> Bool { return eq(x) }, with `eq`'s call site
        // carrying `x`'s type as its requirement receiver and its own
        // specialization binding the implementation's generic parameter to
        // `T` (spec §4.F step 6/7: compose before resolving).
        let outer_param = GenericParamId(10);
        let outer = module.declare_function(
            "usesEq".into(),
            dummy_range(),
            Linkage::External,
            vec![ParameterType {
                convention: ParameterConvention::Sink,
                ty: LoweredType::GenericParam(outer_param),
            }],
            LoweredType::Concrete("Bool".into()),
            vec![outer_param],
            FunctionOrigin::LoweredDecl,
        );
        let function = module.function_mut(outer);
        let entry = function.append_block(vec![LoweredType::GenericParam(outer_param)]);
        let call_addr = function.block_mut(entry).push(Instruction::Call {
            callee: Operand::Constant(Const::FunctionRef(FunctionRef {
                function: requirement,
                specialization: CanonicalSpecialization {
                    args: vec![(impl_param, LoweredType::GenericParam(outer_param))],
                },
                requirement_receiver: Some(LoweredType::GenericParam(outer_param)),
            })),
            args: vec![Operand::Parameter { block: entry, index: 0 }],
            range: dummy_range(),
        });
        function.block_mut(entry).push(Instruction::Return {
            value: Operand::Result(InstructionId { block: entry, addr: call_addr }),
            range: dummy_range(),
        });

        let specialization = CanonicalSpecialization {
            args: vec![(outer_param, LoweredType::Concrete("Int".into()))],
        };
        let conformances = OneConformance {
            requirement,
            receiver: LoweredType::Concrete("Int".into()),
            implementation,
        };
        let mono_outer = monomorphize_function(&mut module, outer, &specialization, &conformances);

        let target_entry = module.function(mono_outer).entry().unwrap();
        let (_, call_instr) = module
            .function(mono_outer)
            .block(target_entry)
            .instructions()
            .next()
            .unwrap();
        match call_instr {
            Instruction::Call { callee: Operand::Constant(Const::FunctionRef(r)), .. } => {
                // The requirement has been resolved away entirely: no
                // leftover specialization or receiver, and the callee points
                // at a monomorphized copy of `implementation`, not the
                // generic declaration itself (receiver substitution +
                // composition + recursive monomorphization all ran).
                assert!(r.specialization.args.is_empty());
                assert!(r.requirement_receiver.is_none());
                assert_ne!(r.function, requirement);
                assert_ne!(r.function, implementation);

                let resolved = module.function(r.function);
                assert!(!resolved.is_generic());
                assert_eq!(resolved.output, LoweredType::Concrete("Int".into()));
                assert_eq!(resolved.inputs[0].ty, LoweredType::Concrete("Int".into()));
            }
            other => panic!("expected a Call to a FunctionRef, got {:?}", other),
        }
    }
}
