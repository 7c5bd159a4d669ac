// src/sema/operators.rs
//
// Operator and overload resolution.
//
// Built-in operator applicability is a total function of the dealiased
// operand's type kind: `candidates` dispatches on TypeKind and returns every
// invocable the language defines for that kind, then merges user-declared
// `class operator` overloads found on the operand's structured type and its
// helper. Aliases must be resolved and type parameters substituted before a
// type reaches the table; either arriving here is a caller bug, not user
// data.

use smallvec::smallvec;

use crate::frontend::{BinaryOp, Interner, Symbol, UnaryOp};
use crate::identity::DeclId;
use crate::sema::factory::IntrinsicTypes;
use crate::sema::registry::TypeRegistry;
use crate::sema::scope::ScopeArena;
use crate::sema::type_arena::{TypeArena, TypeId, TypeIdVec};
use crate::sema::types::TypeKind;

/// The closed set of resolvable operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    IntDivide,
    Modulus,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    In,
    Is,
    As,
    Not,
    Negate,
    Plus,
    AddressOf,
}

impl Operator {
    pub fn from_binary(op: BinaryOp) -> Self {
        match op {
            BinaryOp::Add => Operator::Add,
            BinaryOp::Subtract => Operator::Subtract,
            BinaryOp::Multiply => Operator::Multiply,
            BinaryOp::Divide => Operator::Divide,
            BinaryOp::IntDivide => Operator::IntDivide,
            BinaryOp::Modulus => Operator::Modulus,
            BinaryOp::And => Operator::And,
            BinaryOp::Or => Operator::Or,
            BinaryOp::Xor => Operator::Xor,
            BinaryOp::Shl => Operator::Shl,
            BinaryOp::Shr => Operator::Shr,
            BinaryOp::Equal => Operator::Equal,
            BinaryOp::NotEqual => Operator::NotEqual,
            BinaryOp::LessThan => Operator::LessThan,
            BinaryOp::GreaterThan => Operator::GreaterThan,
            BinaryOp::LessThanEqual => Operator::LessThanEqual,
            BinaryOp::GreaterThanEqual => Operator::GreaterThanEqual,
            BinaryOp::In => Operator::In,
            BinaryOp::Is => Operator::Is,
            BinaryOp::As => Operator::As,
        }
    }

    pub fn from_unary(op: UnaryOp) -> Self {
        match op {
            UnaryOp::Not => Operator::Not,
            UnaryOp::Negate => Operator::Negate,
            UnaryOp::Plus => Operator::Plus,
            UnaryOp::AddressOf => Operator::AddressOf,
        }
    }

    /// The `class operator` method name this operator binds to.
    pub fn image(self) -> &'static str {
        match self {
            Operator::Add => "Add",
            Operator::Subtract => "Subtract",
            Operator::Multiply => "Multiply",
            Operator::Divide => "Divide",
            Operator::IntDivide => "IntDivide",
            Operator::Modulus => "Modulus",
            Operator::And => "BitwiseAnd",
            Operator::Or => "BitwiseOr",
            Operator::Xor => "BitwiseXor",
            Operator::Shl => "LeftShift",
            Operator::Shr => "RightShift",
            Operator::Equal => "Equal",
            Operator::NotEqual => "NotEqual",
            Operator::LessThan => "LessThan",
            Operator::GreaterThan => "GreaterThan",
            Operator::LessThanEqual => "LessThanOrEqual",
            Operator::GreaterThanEqual => "GreaterThanOrEqual",
            Operator::In => "In",
            Operator::Is => "Is",
            Operator::As => "As",
            Operator::Not => "LogicalNot",
            Operator::Negate => "Negative",
            Operator::Plus => "Positive",
            Operator::AddressOf => "AddressOf",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Operator::Equal
                | Operator::NotEqual
                | Operator::LessThan
                | Operator::GreaterThan
                | Operator::LessThanEqual
                | Operator::GreaterThanEqual
        )
    }

    fn equality_only(self) -> bool {
        matches!(self, Operator::Equal | Operator::NotEqual)
    }
}

/// One viable application of an operator: the operand types it accepts and
/// the type it yields. Built-ins carry no declaration; user overloads point
/// at theirs.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocable {
    pub operator: Operator,
    pub operands: TypeIdVec,
    pub result: TypeId,
    pub decl: Option<DeclId>,
}

impl Invocable {
    fn builtin(operator: Operator, operands: TypeIdVec, result: TypeId) -> Self {
        Self {
            operator,
            operands,
            result,
            decl: None,
        }
    }
}

/// How ambiguous integer candidates are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreakPolicy {
    /// Prefer the candidate whose operand bounds lie nearest the actual
    /// operand's bounds.
    #[default]
    NearestOrdinal,
    /// Accept only an exact operand-type match.
    ExactOnly,
}

/// Resolves operator applications against the built-in table and user
/// overloads.
pub struct OperatorResolver<'a> {
    pub arena: &'a TypeArena,
    pub registry: &'a TypeRegistry,
    pub scopes: &'a ScopeArena,
    pub intrinsics: &'a IntrinsicTypes,
    pub policy: TieBreakPolicy,
}

impl<'a> OperatorResolver<'a> {
    pub fn new(
        arena: &'a TypeArena,
        registry: &'a TypeRegistry,
        scopes: &'a ScopeArena,
        intrinsics: &'a IntrinsicTypes,
    ) -> Self {
        Self {
            arena,
            registry,
            scopes,
            intrinsics,
            policy: TieBreakPolicy::default(),
        }
    }

    /// Every invocable the operand type admits for an operator: the built-in
    /// table first, then user overloads declared on the type or its helper.
    pub fn candidates(
        &self,
        operator: Operator,
        operand: TypeId,
        interner: &Interner,
    ) -> Vec<Invocable> {
        let operand = self.arena.dealias(operand);
        let mut out = self.builtin_candidates(operator, operand);
        self.collect_overloads(operator, operand, interner, &mut out);
        out
    }

    /// Pick the best binary candidate given both operand types. Exact operand
    /// matches win; otherwise integer candidates are ranked by ordinal
    /// distance to the right operand under the nearest-ordinal policy.
    pub fn select_binary(
        &self,
        operator: Operator,
        left: TypeId,
        right: TypeId,
        interner: &Interner,
    ) -> Option<Invocable> {
        let right = self.arena.dealias(right);
        let candidates = self.candidates(operator, left, interner);

        if let Some(exact) = candidates
            .iter()
            .find(|c| c.operands.get(1) == Some(&right))
        {
            return Some(exact.clone());
        }
        if self.policy == TieBreakPolicy::ExactOnly {
            return None;
        }

        candidates
            .into_iter()
            .filter(|c| {
                c.operands
                    .get(1)
                    .is_some_and(|&expected| self.operand_compatible(expected, right))
            })
            .min_by_key(|c| {
                // Candidates without an integer expected operand rank last;
                // only measurable distances may win the tie-break.
                c.operands
                    .get(1)
                    .and_then(|&expected| self.arena.ordinal_distance(expected, right))
                    .unwrap_or(u128::MAX)
            })
    }

    fn operand_compatible(&self, expected: TypeId, actual: TypeId) -> bool {
        if expected == actual {
            return true;
        }
        if self.arena.is_integer(expected) && self.arena.is_integer(actual) {
            return true;
        }
        if self.arena.is_real(expected) && self.arena.is_numeric(actual) {
            return true;
        }
        if self.arena.is_variant(expected) || self.arena.is_variant(actual) {
            return true;
        }
        self.arena.is_subtype_of(actual, expected, self.registry)
    }

    // ========================================================================
    // Built-in table
    // ========================================================================

    fn builtin_candidates(&self, operator: Operator, operand: TypeId) -> Vec<Invocable> {
        let kind = self.arena.kind(operand);
        let boolean = self.intrinsics.boolean;

        // The address-of operator is structural: it applies to designators,
        // not to values of a type, so the table never yields it.
        if operator == Operator::AddressOf {
            return Vec::new();
        }

        match kind {
            // The sentinels admit nothing; failed inference must not cascade
            // into phantom operator applications.
            TypeKind::Unknown | TypeKind::Untyped => Vec::new(),

            TypeKind::Integer => self.integer_candidates(operator, operand),

            TypeKind::Real => match operator {
                Operator::Add
                | Operator::Subtract
                | Operator::Multiply
                | Operator::Divide => {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, operand],
                        operand,
                    )]
                }
                Operator::Negate | Operator::Plus => {
                    vec![Invocable::builtin(operator, smallvec![operand], operand)]
                }
                _ if operator.is_comparison() => {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, operand],
                        boolean,
                    )]
                }
                _ => Vec::new(),
            },

            TypeKind::Boolean => match operator {
                Operator::And | Operator::Or | Operator::Xor => {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, operand],
                        operand,
                    )]
                }
                Operator::Not => {
                    vec![Invocable::builtin(operator, smallvec![operand], operand)]
                }
                _ if operator.equality_only() => {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, operand],
                        boolean,
                    )]
                }
                _ => Vec::new(),
            },

            TypeKind::Char => match operator {
                // Char + Char concatenates into the default string type.
                Operator::Add => {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, operand],
                        self.intrinsics.string,
                    )]
                }
                Operator::In => self.in_candidates(operand),
                _ if operator.is_comparison() => {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, operand],
                        boolean,
                    )]
                }
                _ => Vec::new(),
            },

            TypeKind::String => match operator {
                Operator::Add => {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, operand],
                        operand,
                    )]
                }
                _ if operator.is_comparison() => {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, operand],
                        boolean,
                    )]
                }
                _ => Vec::new(),
            },

            TypeKind::Enum => match operator {
                Operator::In => self.in_candidates(operand),
                _ if operator.is_comparison() => {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, operand],
                        boolean,
                    )]
                }
                _ => Vec::new(),
            },

            TypeKind::Set => match operator {
                // Union, difference, intersection.
                Operator::Add | Operator::Subtract | Operator::Multiply => {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, operand],
                        operand,
                    )]
                }
                // Equality and subset comparisons; no ordering.
                Operator::Equal
                | Operator::NotEqual
                | Operator::LessThanEqual
                | Operator::GreaterThanEqual => {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, operand],
                        boolean,
                    )]
                }
                _ => Vec::new(),
            },

            // Pointer arithmetic is deliberately narrow: difference and
            // comparison only, never addition.
            TypeKind::Pointer => match operator {
                Operator::Subtract => {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, operand],
                        self.intrinsics.native_int,
                    )]
                }
                _ if operator.is_comparison() => {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, operand],
                        boolean,
                    )]
                }
                _ => Vec::new(),
            },

            TypeKind::Class | TypeKind::Interface => match operator {
                Operator::Is => {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, TypeId::UNTYPED],
                        boolean,
                    )]
                }
                // The result of `as` is the right-hand type; the caller
                // substitutes it once the cast target is known.
                Operator::As => {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, TypeId::UNTYPED],
                        TypeId::UNKNOWN,
                    )]
                }
                _ if operator.equality_only() => {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, operand],
                        boolean,
                    )]
                }
                _ => Vec::new(),
            },

            TypeKind::Record | TypeKind::Helper => Vec::new(),

            // Variants accept nearly everything, late-bound; `is` and `as`
            // are the exceptions because a Variant carries no class identity.
            TypeKind::Variant => match operator {
                Operator::Is | Operator::As => Vec::new(),
                Operator::In => self.in_candidates(operand),
                Operator::Not | Operator::Negate | Operator::Plus => {
                    vec![Invocable::builtin(operator, smallvec![operand], operand)]
                }
                _ if operator.is_comparison() => {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, operand],
                        self.intrinsics.boolean,
                    )]
                }
                _ => {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, operand],
                        operand,
                    )]
                }
            },

            TypeKind::Array => {
                // Dynamic arrays compare against nil; nothing else, and in
                // particular no `as` view conversions.
                if self.arena.is_dynamic_array(operand) && operator.equality_only() {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, operand],
                        boolean,
                    )]
                } else {
                    Vec::new()
                }
            }

            TypeKind::Procedural => {
                if operator.equality_only() {
                    vec![Invocable::builtin(
                        operator,
                        smallvec![operand, operand],
                        boolean,
                    )]
                } else {
                    Vec::new()
                }
            }

            TypeKind::Alias => panic!(
                "INTERNAL ERROR: alias type reached the operator table un-dealiased"
            ),
            TypeKind::TypeParam => panic!(
                "INTERNAL ERROR: unsubstituted type parameter reached the operator table"
            ),
        }
    }

    fn integer_candidates(&self, operator: Operator, operand: TypeId) -> Vec<Invocable> {
        let boolean = self.intrinsics.boolean;
        match operator {
            Operator::Add
            | Operator::Subtract
            | Operator::Multiply
            | Operator::IntDivide
            | Operator::Modulus
            | Operator::And
            | Operator::Or
            | Operator::Xor
            | Operator::Shl
            | Operator::Shr => {
                vec![Invocable::builtin(
                    operator,
                    smallvec![operand, operand],
                    operand,
                )]
            }
            // `/` always yields a real quotient.
            Operator::Divide => {
                vec![Invocable::builtin(
                    operator,
                    smallvec![operand, operand],
                    self.intrinsics.extended,
                )]
            }
            Operator::Negate | Operator::Plus | Operator::Not => {
                vec![Invocable::builtin(operator, smallvec![operand], operand)]
            }
            Operator::In => self.in_candidates(operand),
            _ if operator.is_comparison() => {
                vec![Invocable::builtin(
                    operator,
                    smallvec![operand, operand],
                    boolean,
                )]
            }
            _ => Vec::new(),
        }
    }

    /// `x in S` for an ordinal (or Variant) left operand.
    fn in_candidates(&self, operand: TypeId) -> Vec<Invocable> {
        vec![Invocable::builtin(
            Operator::In,
            smallvec![operand, TypeId::UNTYPED],
            self.intrinsics.boolean,
        )]
    }

    // ========================================================================
    // User overloads
    // ========================================================================

    fn collect_overloads(
        &self,
        operator: Operator,
        operand: TypeId,
        interner: &Interner,
        out: &mut Vec<Invocable>,
    ) {
        let Some(name) = interner.get(operator.image()) else {
            return;
        };
        if let Some(helper) = self.registry.helper_for(operand) {
            if let Some(scope) = self.registry.def(helper).member_scope {
                self.overloads_in_scope(operator, name, scope, out);
            }
        }
        let Some(mut def) = self.arena.type_def_id(operand) else {
            return;
        };
        loop {
            if let Some(scope) = self.registry.def(def).member_scope {
                self.overloads_in_scope(operator, name, scope, out);
            }
            match self
                .registry
                .def(def)
                .super_type
                .and_then(|s| self.arena.type_def_id(s))
            {
                Some(next) => def = next,
                None => break,
            }
        }
    }

    fn overloads_in_scope(
        &self,
        operator: Operator,
        name: Symbol,
        scope: crate::identity::ScopeId,
        out: &mut Vec<Invocable>,
    ) {
        for &decl_id in self.scopes.scope(scope).local(name) {
            let decl = self.scopes.decl(decl_id);
            let Some(sig) = decl.as_routine().filter(|s| s.is_operator) else {
                continue;
            };
            out.push(Invocable {
                operator,
                operands: sig.params.iter().map(|p| p.ty).collect(),
                result: sig.ret,
                decl: Some(decl_id),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Span;
    use crate::identity::{RoutineId, UnitId};
    use crate::sema::config::ToolchainConfig;
    use crate::sema::declarations::{DeclarationBuilder, Parameter, RoutineSignature};
    use crate::sema::factory::TypeFactory;
    use crate::sema::registry::{TypeDef, TypeDefKind};
    use crate::sema::scope::ScopeKind;
    use crate::sema::types::StructKind;

    struct Fixture {
        arena: TypeArena,
        registry: TypeRegistry,
        scopes: ScopeArena,
        intrinsics: IntrinsicTypes,
        interner: Interner,
    }

    fn fixture() -> Fixture {
        let mut interner = Interner::new();
        let (arena, intrinsics) = TypeFactory::build(&ToolchainConfig::default(), &mut interner);
        Fixture {
            arena,
            registry: TypeRegistry::new(),
            scopes: ScopeArena::new(),
            intrinsics,
            interner,
        }
    }

    fn candidates(fx: &Fixture, op: Operator, ty: TypeId) -> Vec<Invocable> {
        OperatorResolver::new(&fx.arena, &fx.registry, &fx.scopes, &fx.intrinsics)
            .candidates(op, ty, &fx.interner)
    }

    #[test]
    fn pointer_subtracts_and_compares_but_never_adds() {
        let mut fx = fixture();
        let p = fx.arena.pointer_to(fx.intrinsics.byte);
        assert!(!candidates(&fx, Operator::Subtract, p).is_empty());
        assert!(!candidates(&fx, Operator::LessThan, p).is_empty());
        assert!(candidates(&fx, Operator::Add, p).is_empty());
    }

    #[test]
    fn variant_admits_in_but_not_as() {
        let fx = fixture();
        assert!(!candidates(&fx, Operator::In, TypeId::VARIANT).is_empty());
        assert!(candidates(&fx, Operator::As, TypeId::VARIANT).is_empty());
        assert!(candidates(&fx, Operator::Is, TypeId::VARIANT).is_empty());
    }

    #[test]
    fn dynamic_array_has_no_as_view() {
        let mut fx = fixture();
        let arr = fx.arena.array_of(fx.intrinsics.byte, true);
        assert!(candidates(&fx, Operator::As, arr).is_empty());
        assert!(!candidates(&fx, Operator::Equal, arr).is_empty());
    }

    #[test]
    fn address_of_is_structural_not_tabled() {
        let fx = fixture();
        assert!(candidates(&fx, Operator::AddressOf, fx.intrinsics.pointer).is_empty());
        assert!(candidates(&fx, Operator::AddressOf, fx.intrinsics.integer).is_empty());
    }

    #[test]
    fn sentinels_admit_nothing() {
        let fx = fixture();
        for op in [Operator::Add, Operator::Equal, Operator::Not] {
            assert!(candidates(&fx, op, TypeId::UNKNOWN).is_empty());
            assert!(candidates(&fx, op, TypeId::UNTYPED).is_empty());
        }
    }

    #[test]
    fn integer_division_yields_real() {
        let fx = fixture();
        let divide = candidates(&fx, Operator::Divide, fx.intrinsics.integer);
        assert_eq!(divide[0].result, fx.intrinsics.extended);
        let int_div = candidates(&fx, Operator::IntDivide, fx.intrinsics.integer);
        assert_eq!(int_div[0].result, fx.intrinsics.integer);
    }

    #[test]
    fn aliases_resolve_before_dispatch() {
        let mut fx = fixture();
        let name = fx.interner.intern("TMyInt");
        let alias = fx.arena.alias(name, fx.intrinsics.integer, false);
        assert!(!candidates(&fx, Operator::Add, alias).is_empty());
    }

    #[test]
    fn set_operators_are_additive_and_subtractive() {
        let mut fx = fixture();
        let set = fx.arena.set_of(fx.intrinsics.byte);
        for op in [Operator::Add, Operator::Subtract, Operator::Multiply] {
            assert_eq!(candidates(&fx, op, set)[0].result, set);
        }
        assert!(candidates(&fx, Operator::LessThan, set).is_empty());
        assert!(!candidates(&fx, Operator::LessThanEqual, set).is_empty());
    }

    #[test]
    fn user_overload_merges_with_builtins() {
        let mut fx = fixture();
        let name = fx.interner.intern("TVec");
        let def = fx.registry.add_def(TypeDef::new(
            name,
            UnitId::new(1),
            TypeDefKind::Struct(StructKind::Record),
        ));
        let vec_ty = fx.arena.structured(StructKind::Record, def, TypeIdVec::new());
        let members = fx
            .scopes
            .new_scope(ScopeKind::Type { type_def: def }, None);
        fx.registry.def_mut(def).member_scope = Some(members);

        let add_name = fx.interner.intern("Add");
        let sig = RoutineSignature {
            routine: RoutineId::new(0),
            params: vec![
                Parameter::new(None, vec_ty),
                Parameter::new(None, vec_ty),
            ],
            ret: vec_ty,
            is_class_method: true,
            is_operator: true,
        };
        let decl = DeclarationBuilder::new(add_name, Span::default(), UnitId::new(1))
            .routine(sig)
            .build();
        fx.scopes.add_declaration_unchecked(members, decl);

        let found = candidates(&fx, Operator::Add, vec_ty);
        assert_eq!(found.len(), 1);
        assert!(found[0].decl.is_some());
        assert_eq!(found[0].result, vec_ty);
    }

    #[test]
    fn binary_selection_prefers_nearest_integer_range() {
        let fx = fixture();
        let resolver =
            OperatorResolver::new(&fx.arena, &fx.registry, &fx.scopes, &fx.intrinsics);
        let chosen = resolver
            .select_binary(
                Operator::Add,
                fx.intrinsics.byte,
                fx.intrinsics.byte,
                &fx.interner,
            )
            .unwrap();
        assert_eq!(chosen.result, fx.intrinsics.byte);
    }

    #[test]
    fn nearest_integer_candidate_beats_variant_overload() {
        let mut fx = fixture();
        let name = fx.interner.intern("TIntHelper");
        let def = fx.registry.add_def(TypeDef::new(
            name,
            UnitId::new(1),
            TypeDefKind::Struct(StructKind::RecordHelper),
        ));
        let members = fx
            .scopes
            .new_scope(ScopeKind::Type { type_def: def }, None);
        fx.registry.def_mut(def).member_scope = Some(members);
        fx.registry.register_helper(fx.intrinsics.integer, def);

        // An overload whose right operand is Variant is compatible with any
        // argument but must not outrank a measurably nearer integer match.
        let add_name = fx.interner.intern("Add");
        let sig = RoutineSignature {
            routine: RoutineId::new(0),
            params: vec![
                Parameter::new(None, fx.intrinsics.integer),
                Parameter::new(None, fx.intrinsics.variant),
            ],
            ret: fx.intrinsics.variant,
            is_class_method: true,
            is_operator: true,
        };
        let decl = DeclarationBuilder::new(add_name, Span::default(), UnitId::new(1))
            .routine(sig)
            .build();
        fx.scopes.add_declaration_unchecked(members, decl);

        let resolver =
            OperatorResolver::new(&fx.arena, &fx.registry, &fx.scopes, &fx.intrinsics);
        let chosen = resolver
            .select_binary(
                Operator::Add,
                fx.intrinsics.integer,
                fx.intrinsics.byte,
                &fx.interner,
            )
            .unwrap();
        assert_eq!(chosen.result, fx.intrinsics.integer);
    }

    #[test]
    #[should_panic(expected = "INTERNAL ERROR")]
    fn unsubstituted_type_param_is_a_bug() {
        let mut fx = fixture();
        let param = fx
            .registry
            .add_param(crate::sema::registry::TypeParamDef {
                name: Symbol(0),
                constraint: None,
            });
        let ty = fx.arena.type_param(param);
        let resolver =
            OperatorResolver::new(&fx.arena, &fx.registry, &fx.scopes, &fx.intrinsics);
        resolver.candidates(Operator::Add, ty, &fx.interner);
    }
}
