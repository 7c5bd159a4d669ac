// src/sema/bounds.rs
//
// Literal bounds checking against declared types.
//
// The check is deliberately shallow: it answers "does this literal value fit
// the declared type's range", recursing through array and set constructors
// element by element. Anything it cannot judge (reals, strings, class
// references) is in bounds by definition; flow analysis is out of scope.

use crate::frontend::Literal;
use crate::sema::registry::TypeRegistry;
use crate::sema::type_arena::{TypeArena, TypeId};
use crate::sema::types::Ty;

/// A constant value as far as bounds checking can see it.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i128),
    Real(f64),
    Str(String),
    Bool(bool),
    Array(Vec<LiteralValue>),
    Set(Vec<LiteralValue>),
    Nil,
}

impl LiteralValue {
    pub fn from_literal(lit: &Literal) -> Self {
        match lit {
            Literal::Int(v) => LiteralValue::Int(*v),
            Literal::Real(v) => LiteralValue::Real(*v),
            Literal::Str(s) => LiteralValue::Str(s.clone()),
            Literal::Char(c) => LiteralValue::Int(*c as i128),
            Literal::Bool(b) => LiteralValue::Bool(*b),
            Literal::Nil => LiteralValue::Nil,
        }
    }
}

/// Whether a literal value lies outside the declared type's range. Unknown
/// pairings answer false; only a provable violation reports.
pub fn violates_bounds(
    value: &LiteralValue,
    declared: TypeId,
    arena: &TypeArena,
    registry: &TypeRegistry,
) -> bool {
    let declared = arena.dealias(declared);
    match value {
        LiteralValue::Int(v) => match arena.ordinal_range(declared, registry) {
            Some((min, max)) => *v < min || *v > max,
            None => false,
        },
        LiteralValue::Array(elements) => match arena.get(declared) {
            Ty::Array { element, .. } => elements
                .iter()
                .any(|e| violates_bounds(e, *element, arena, registry)),
            _ => false,
        },
        LiteralValue::Set(elements) => match arena.get(declared) {
            Ty::Set { element } => elements
                .iter()
                .any(|e| violates_bounds(e, *element, arena, registry)),
            _ => false,
        },
        LiteralValue::Real(_)
        | LiteralValue::Str(_)
        | LiteralValue::Bool(_)
        | LiteralValue::Nil => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Interner;
    use crate::sema::config::ToolchainConfig;
    use crate::sema::factory::{IntrinsicTypes, TypeFactory};

    fn build() -> (TypeArena, IntrinsicTypes, TypeRegistry) {
        let mut interner = Interner::new();
        let (arena, intrinsics) = TypeFactory::build(&ToolchainConfig::default(), &mut interner);
        (arena, intrinsics, TypeRegistry::new())
    }

    #[test]
    fn byte_accepts_255_rejects_256() {
        let (arena, intrinsics, registry) = build();
        assert!(!violates_bounds(
            &LiteralValue::Int(255),
            intrinsics.byte,
            &arena,
            &registry
        ));
        assert!(violates_bounds(
            &LiteralValue::Int(256),
            intrinsics.byte,
            &arena,
            &registry
        ));
        assert!(violates_bounds(
            &LiteralValue::Int(-1),
            intrinsics.byte,
            &arena,
            &registry
        ));
    }

    #[test]
    fn shortint_splits_around_zero() {
        let (arena, intrinsics, registry) = build();
        for v in [-128, 127] {
            assert!(!violates_bounds(
                &LiteralValue::Int(v),
                intrinsics.shortint,
                &arena,
                &registry
            ));
        }
        for v in [-129, 128] {
            assert!(violates_bounds(
                &LiteralValue::Int(v),
                intrinsics.shortint,
                &arena,
                &registry
            ));
        }
    }

    #[test]
    fn array_elements_checked_individually() {
        let (mut arena, intrinsics, registry) = build();
        let arr = arena.array_of(intrinsics.byte, true);
        let ok = LiteralValue::Array(vec![LiteralValue::Int(0), LiteralValue::Int(255)]);
        let bad = LiteralValue::Array(vec![LiteralValue::Int(0), LiteralValue::Int(300)]);
        assert!(!violates_bounds(&ok, arr, &arena, &registry));
        assert!(violates_bounds(&bad, arr, &arena, &registry));
    }

    #[test]
    fn set_elements_checked_against_element_type() {
        let (mut arena, intrinsics, registry) = build();
        let set = arena.set_of(intrinsics.byte);
        let bad = LiteralValue::Set(vec![LiteralValue::Int(999)]);
        assert!(violates_bounds(&bad, set, &arena, &registry));
    }

    #[test]
    fn unjudgeable_pairings_pass() {
        let (arena, intrinsics, registry) = build();
        assert!(!violates_bounds(
            &LiteralValue::Real(1e300),
            intrinsics.single,
            &arena,
            &registry
        ));
        assert!(!violates_bounds(
            &LiteralValue::Int(42),
            intrinsics.string,
            &arena,
            &registry
        ));
        assert!(!violates_bounds(
            &LiteralValue::Nil,
            intrinsics.pointer,
            &arena,
            &registry
        ));
    }

    #[test]
    fn alias_checks_against_target_range() {
        let (mut arena, intrinsics, registry) = build();
        let mut interner = Interner::new();
        let name = interner.intern("TByteAlias");
        let alias = arena.alias(name, intrinsics.byte, true);
        assert!(violates_bounds(
            &LiteralValue::Int(500),
            alias,
            &arena,
            &registry
        ));
    }
}
