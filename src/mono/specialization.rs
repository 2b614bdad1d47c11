//! Specializations (spec glossary: "a mapping from generic parameters to
//! concrete type or value arguments") and the substitution/composition
//! operations the monomorphizer builds on.

pub use crate::ir::CanonicalSpecialization;
use crate::ir::{GenericParamId, LoweredType};

/// The working, not-yet-canonical form of a specialization: built up while
/// walking a call site's type arguments, then turned into a
/// [`CanonicalSpecialization`] before it is used as a memoization key or
/// installed on an instruction (spec §4.F "Type canonicalization").
#[derive(Debug, Clone, Default)]
pub struct Specialization {
    args: Vec<(GenericParamId, LoweredType)>,
}

impl Specialization {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, param: GenericParamId, ty: LoweredType) -> &mut Self {
        self.args.push((param, ty));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Passes every bound type through `canonical` — here, deduplicated
    /// (last binding for a parameter wins) and sorted by parameter identity
    /// — so that two specializations naming the same substitutions in a
    /// different order produce an equal key. The external type-checker's
    /// own `canonical(_, in: scopeOfUse)` (normalizing aliases and
    /// associated types) is out of this crate's scope (spec.md §1); this is
    /// the slice of canonicalization that belongs to the IR layer itself.
    pub fn canonicalize(&self) -> CanonicalSpecialization {
        let mut merged: Vec<(GenericParamId, LoweredType)> = Vec::new();
        for (param, ty) in &self.args {
            match merged.iter_mut().find(|(p, _)| p == param) {
                Some(slot) => slot.1 = ty.clone(),
                None => merged.push((*param, ty.clone())),
            }
        }
        merged.sort_by_key(|(p, _)| p.0);
        CanonicalSpecialization { args: merged }
    }
}

/// Substitutes every `LoweredType::GenericParam` reachable in `ty` with its
/// binding in `specialization`, leaving unbound parameters untouched (the
/// case where `ty` belongs to a still-outer generic scope).
pub fn substitute(ty: &LoweredType, specialization: &CanonicalSpecialization) -> LoweredType {
    match ty {
        LoweredType::Concrete(_) => ty.clone(),
        LoweredType::GenericParam(param) => specialization
            .lookup(*param)
            .cloned()
            .unwrap_or_else(|| ty.clone()),
        LoweredType::Specialized { base, args } => LoweredType::Specialized {
            base: base.clone(),
            args: args.iter().map(|arg| substitute(arg, specialization)).collect(),
        },
        LoweredType::Pointer(inner) => LoweredType::Pointer(Box::new(substitute(inner, specialization))),
        LoweredType::Tuple(elements) => {
            LoweredType::Tuple(elements.iter().map(|elem| substitute(elem, specialization)).collect())
        }
    }
}

/// Composes a nested callee's own specialization with the specialization of
/// the generic function currently being monomorphized (spec §4.F step 6:
/// "specializations compose through substitution in the callee's
/// scope-of-use"). `inner`'s type arguments may themselves reference
/// `outer`'s generic parameters — e.g. a call to `g<T>()` written inside
/// `f<T>()`'s body refers to `f`'s own `T` — so composing substitutes
/// `outer` into every one of `inner`'s bindings.
pub fn compose(inner: &CanonicalSpecialization, outer: &CanonicalSpecialization) -> CanonicalSpecialization {
    let mut composed = Specialization::new();
    for (param, ty) in &inner.args {
        composed.bind(*param, substitute(ty, outer));
    }
    composed.canonicalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_dedups_and_sorts() {
        let mut spec = Specialization::new();
        spec.bind(GenericParamId(1), LoweredType::Concrete("A".into()));
        spec.bind(GenericParamId(0), LoweredType::Concrete("B".into()));
        spec.bind(GenericParamId(1), LoweredType::Concrete("C".into()));

        let canonical = spec.canonicalize();
        assert_eq!(
            canonical.args,
            vec![
                (GenericParamId(0), LoweredType::Concrete("B".into())),
                (GenericParamId(1), LoweredType::Concrete("C".into())),
            ]
        );
    }

    #[test]
    fn substitute_rewrites_nested_generic_params() {
        let specialization = CanonicalSpecialization {
            args: vec![(GenericParamId(0), LoweredType::Concrete("Int".into()))],
        };
        let ty = LoweredType::Pointer(Box::new(LoweredType::GenericParam(GenericParamId(0))));
        assert_eq!(
            substitute(&ty, &specialization),
            LoweredType::Pointer(Box::new(LoweredType::Concrete("Int".into())))
        );
    }

    #[test]
    fn compose_substitutes_inner_through_outer() {
        let inner = CanonicalSpecialization {
            args: vec![(GenericParamId(1), LoweredType::GenericParam(GenericParamId(0)))],
        };
        let outer = CanonicalSpecialization {
            args: vec![(GenericParamId(0), LoweredType::Concrete("Int".into()))],
        };
        let composed = compose(&inner, &outer);
        assert_eq!(composed.lookup(GenericParamId(1)), Some(&LoweredType::Concrete("Int".into())));
    }
}
