//! The monomorphizer (component F, spec §4.F "Depolymorphize"): rewrites
//! generic IR functions into specialized copies for a concrete
//! specialization, including trait-requirement dispatch.

pub mod rewrite;
pub mod specialization;

pub use crate::ir::CanonicalSpecialization;
pub use rewrite::{existentialize, monomorphize_function, monomorphize_module, ConformanceTable, NoConformances};
pub use specialization::{compose, substitute, Specialization};
