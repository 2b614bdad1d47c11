//! The `InfixTree` auxiliary structure (spec §4.D step 4, §9): encodes
//! operator precedence and associativity while an infix expression is being
//! read, then flattens into ordinary `Expr` call nodes.
//!
//! Built as the recursive sum type the design notes call for:
//! `Leaf(operand) | Node(op, group, left, right)`. Inserting a new
//! `(op, group, rhs)` descends into the pending right subtree while that
//! subtree's operator binds strictly tighter, or exactly as tight with
//! right-associativity; otherwise the new operator becomes the new root.

use crate::ast::{Ast, Expr, ExprId, Ranged, SignId, TypeSlot};
use crate::source::SourceRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    Dyn,
    Unsafe,
}

#[derive(Debug, Clone)]
pub enum Suffix {
    /// A `takeOperator`-lexed symbolic operator, e.g. `+`, `<=`, `=`.
    Operator(String),
    /// An identifier used as an infix operator (spec's "identifier" group).
    Identifier(String),
    /// `as?` / `as!`, whose right operand is a type signature rather than
    /// an expression.
    Cast(CastKind, SignId),
}

#[derive(Debug, Clone, Copy)]
pub struct Group {
    pub weight: i32,
    pub right_assoc: bool,
}

/// The group table (spec §9): standard weights per operator name, plus the
/// special `identifier` and `casting` groups. `=` has the lowest weight and
/// is right-associative.
pub fn group_for(suffix: &Suffix) -> Group {
    match suffix {
        Suffix::Operator(text) if text == "=" => Group {
            weight: 0,
            right_assoc: true,
        },
        Suffix::Cast(..) => Group {
            weight: 95,
            right_assoc: false,
        },
        Suffix::Identifier(_) => Group {
            weight: 90,
            right_assoc: false,
        },
        Suffix::Operator(text) => group_for_operator_text(text),
    }
}

fn group_for_operator_text(text: &str) -> Group {
    let weight = match text {
        "||" => 10,
        "&&" => 20,
        "==" | "!=" | "<" | "<=" | ">" | ">=" => 30,
        "|" => 40,
        "^" => 45,
        "&" => 50,
        "<<" | ">>" => 60,
        "+" | "-" => 70,
        "*" | "/" | "%" => 80,
        _ => 70, // unknown custom operators default to additive weight
    };
    Group {
        weight,
        right_assoc: false,
    }
}

#[derive(Debug)]
pub enum InfixTree {
    Leaf(ExprId),
    Node {
        suffix: Suffix,
        group: Group,
        left: Box<InfixTree>,
        right: Box<InfixTree>,
        op_range: SourceRange,
    },
}

impl InfixTree {
    pub fn leaf(id: ExprId) -> Self {
        InfixTree::Leaf(id)
    }

    /// Insert `(suffix, rhs)` onto the tree, rotating per precedence and
    /// associativity (spec §4.D step 4). `rhs` is ignored for `Cast`
    /// suffixes, whose operand lives in the suffix itself.
    pub fn append(self, suffix: Suffix, op_range: SourceRange, rhs: ExprId) -> Self {
        let group = group_for(&suffix);
        match self {
            InfixTree::Leaf(_) => InfixTree::Node {
                suffix,
                group,
                left: Box::new(self),
                right: Box::new(InfixTree::Leaf(rhs)),
                op_range,
            },
            InfixTree::Node {
                suffix: pending_suffix,
                group: pending_group,
                left,
                right,
                op_range: pending_range,
            } => {
                let descend = pending_group.weight > group.weight
                    || (pending_group.weight == group.weight && group.right_assoc);
                if descend {
                    let new_right = right.append(suffix, op_range, rhs);
                    InfixTree::Node {
                        suffix: pending_suffix,
                        group: pending_group,
                        left,
                        right: Box::new(new_right),
                        op_range: pending_range,
                    }
                } else {
                    let node = InfixTree::Node {
                        suffix: pending_suffix,
                        group: pending_group,
                        left,
                        right,
                        op_range: pending_range,
                    };
                    InfixTree::Node {
                        suffix,
                        group,
                        left: Box::new(node),
                        right: Box::new(InfixTree::Leaf(rhs)),
                        op_range,
                    }
                }
            }
        }
    }

    /// Flatten into ordinary `Expr` nodes: `=` becomes `Assign`, casts
    /// become `DynCast`/`UnsafeCast`, everything else an infix `Call`
    /// through the (unresolved) operator name.
    pub fn flatten(self, ast: &mut Ast) -> ExprId {
        match self {
            InfixTree::Leaf(id) => id,
            InfixTree::Node {
                suffix,
                left,
                right,
                ..
            } => {
                let lhs = left.flatten(ast);
                match suffix {
                    Suffix::Cast(kind, target) => {
                        let range = ast.expr(lhs).range();
                        match kind {
                            CastKind::Dyn => ast.alloc_expr(Expr::DynCast {
                                operand: lhs,
                                target,
                                ty: TypeSlot::unresolved(),
                                range,
                            }),
                            CastKind::Unsafe => ast.alloc_expr(Expr::UnsafeCast {
                                operand: lhs,
                                target,
                                ty: TypeSlot::unresolved(),
                                range,
                            }),
                        }
                    }
                    Suffix::Operator(text) if text == "=" => {
                        let rhs = right.flatten(ast);
                        let range = ast.expr(lhs).range().join(&ast.expr(rhs).range());
                        ast.alloc_expr(Expr::Assign {
                            lhs,
                            rhs,
                            ty: TypeSlot::unresolved(),
                            range,
                        })
                    }
                    Suffix::Operator(text) | Suffix::Identifier(text) => {
                        let rhs = right.flatten(ast);
                        let range = ast.expr(lhs).range().join(&ast.expr(rhs).range());
                        ast.alloc_expr(Expr::InfixCall {
                            op: text,
                            lhs,
                            rhs,
                            ty: TypeSlot::unresolved(),
                            range,
                        })
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceManager;

    fn lit(ast: &mut Ast, range: SourceRange) -> ExprId {
        ast.alloc_expr(Expr::IntLit {
            text: "0".into(),
            radix: crate::lex::IntRadix::Decimal,
            ty: TypeSlot::unresolved(),
            range,
        })
    }

    #[test]
    fn higher_weight_binds_tighter() {
        // 1 + 2 * 3 -> (1 + (2 * 3))
        let mut sm = SourceManager::new();
        let file = sm.load_synthesized("<test>", "1 + 2 * 3");
        let mut ast = Ast::new();
        let r = |s: u32, e: u32| SourceRange::new(file, s, e);
        let a = lit(&mut ast, r(0, 1));
        let b = lit(&mut ast, r(4, 5));
        let c = lit(&mut ast, r(8, 9));

        let tree = InfixTree::leaf(a)
            .append(Suffix::Operator("+".into()), r(2, 3), b)
            .append(Suffix::Operator("*".into()), r(6, 7), c);

        let flat = tree.flatten(&mut ast);
        match ast.expr(flat) {
            Expr::InfixCall { op, lhs, rhs, .. } => {
                assert_eq!(op, "+");
                assert!(matches!(ast.expr(*lhs), Expr::IntLit { .. }));
                match ast.expr(*rhs) {
                    Expr::InfixCall { op, .. } => assert_eq!(op, "*"),
                    other => panic!("expected nested infix call, got {:?}", other),
                }
            }
            other => panic!("expected infix call, got {:?}", other),
        }
    }

    #[test]
    fn equal_weight_right_assoc_groups_right() {
        // a = b = c -> a = (b = c)
        let mut sm = SourceManager::new();
        let file = sm.load_synthesized("<test>", "a = b = c");
        let mut ast = Ast::new();
        let r = |s: u32, e: u32| SourceRange::new(file, s, e);
        let a = lit(&mut ast, r(0, 1));
        let b = lit(&mut ast, r(4, 5));
        let c = lit(&mut ast, r(8, 9));

        let tree = InfixTree::leaf(a)
            .append(Suffix::Operator("=".into()), r(2, 3), b)
            .append(Suffix::Operator("=".into()), r(6, 7), c);

        let flat = tree.flatten(&mut ast);
        match ast.expr(flat) {
            Expr::Assign { lhs, rhs, .. } => {
                assert!(matches!(ast.expr(*lhs), Expr::IntLit { .. }));
                assert!(matches!(ast.expr(*rhs), Expr::Assign { .. }));
            }
            other => panic!("expected assign, got {:?}", other),
        }
    }

    #[test]
    fn equal_weight_left_assoc_groups_left() {
        // 1 - 2 - 3 -> (1 - 2) - 3
        let mut sm = SourceManager::new();
        let file = sm.load_synthesized("<test>", "1 - 2 - 3");
        let mut ast = Ast::new();
        let r = |s: u32, e: u32| SourceRange::new(file, s, e);
        let a = lit(&mut ast, r(0, 1));
        let b = lit(&mut ast, r(4, 5));
        let c = lit(&mut ast, r(8, 9));

        let tree = InfixTree::leaf(a)
            .append(Suffix::Operator("-".into()), r(2, 3), b)
            .append(Suffix::Operator("-".into()), r(6, 7), c);

        let flat = tree.flatten(&mut ast);
        match ast.expr(flat) {
            Expr::InfixCall { lhs, rhs, .. } => {
                assert!(matches!(ast.expr(*lhs), Expr::InfixCall { .. }));
                assert!(matches!(ast.expr(*rhs), Expr::IntLit { .. }));
            }
            other => panic!("expected infix call, got {:?}", other),
        }
    }
}
