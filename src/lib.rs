//! hyloc-core is a library implementing the front-end and mid-level IR
//! pipeline of a compiler for a statically-typed, ownership-aware systems
//! language: a lexer, a recursive-descent parser, an arena-based AST, an
//! IR model of functions as basic-block control-flow graphs, and a
//! monomorphization pass that rewrites generic IR functions into
//! specialized copies.
//!
//! # Overview
//!
//! The pipeline runs in six components, each its own module:
//!
//! - [`source`] — an immutable per-file text registry (component A).
//! - [`lex`] — a single-pass, lazy tokenizer (component B).
//! - [`ast`] — an arena of declaration/statement/expression/pattern/type
//!   nodes, referencing each other by index rather than by pointer
//!   (component C).
//! - [`parse`] — recursive-descent parsing with one token of lookahead,
//!   precedence-climbing for infix expressions via an explicit
//!   [`InfixTree`](parse::infix_tree::InfixTree), and diagnostic-buffering
//!   backtracking for speculative qualified-name parsing (component D).
//! - [`ir`] — functions as ordered lists of basic blocks, each block an
//!   ordered list of instructions, with `CFG`/dominator-tree query APIs
//!   built on top (component E).
//! - [`mono`] — the monomorphizer: given a generic IR function and a
//!   concrete specialization, produces a non-generic copy, memoized by
//!   `(base_id, canonical_specialization)` (component F).
//!
//! This crate is a library for a driver to embed, not a standalone
//! compiler: it has no command-line entry point, no type-checker, no
//! code generator, and no linker. A caller loads source text into a
//! [`source::SourceManager`], calls [`parse::parse_source_unit`] to get an
//! [`ast::Ast`], runs its own type-checking and IR-lowering pass to
//! produce [`ir::Module`]s, then calls [`mono::monomorphize_function`] (or
//! [`mono::monomorphize_module`]) to specialize generic functions before
//! handing the result to a code generator of its own.
//!
//! # Design
//!
//! Every pass is synchronous and single-threaded; nothing here spawns
//! threads or performs I/O beyond loading source text. Diagnostics are
//! reported through a [`diagnostic::DiagnosticSink`] the caller supplies,
//! never thrown as exceptions — parsing always produces a best-effort AST
//! plus a `has_error` flag, never a bare failure.
//!
//! Every arena (the AST's node vectors, an IR function's blocks, a block's
//! instructions) hands out handles that stay valid across insertion and,
//! for the IR, removal of their siblings — the AST never removes nodes, so
//! a growable `Vec` is enough there; IR blocks and instructions can be
//! removed and replaced in place, so those use
//! [`slotmap`](https://docs.rs/slotmap)'s generational keys instead.
//!
//! # License
//! Provided under the MIT license.

pub mod ast;
pub mod diagnostic;
pub mod ir;
pub mod lex;
pub mod mono;
pub mod parse;
pub mod source;

pub use ast::Ast;
pub use diagnostic::{Diagnostic, DiagnosticSink};
pub use ir::Module;
pub use parse::{parse_source_unit, ParsedUnit, ParserConfig};
pub use source::{FileId, SourceManager, SourceRange};
