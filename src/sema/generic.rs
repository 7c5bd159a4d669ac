// src/sema/generic.rs
//
// Generic specialization: mapping a generic definition plus concrete type
// arguments onto a specialized definition with substituted members.
//
// Specialization is two-phase. The specialized type handle is interned and
// published into the definition's cache *before* any member is substituted,
// so a member that mentions the enclosing generic with the same arguments
// (TNode<T>.Next: TNode<T>) hits the cache instead of recursing forever.
// Interning in the arena guarantees the other identity property: the same
// definition specialized twice under equal contexts yields the same TypeId.

use rustc_hash::FxHashMap;

use crate::identity::{TypeDefId, TypeParamId};
use crate::sema::declarations::{DeclDetails, Declaration};
use crate::sema::registry::{TypeDef, TypeDefKind, TypeRegistry};
use crate::sema::scope::{ScopeArena, ScopeKind};
use crate::sema::type_arena::{TypeArena, TypeId, TypeIdVec};
use crate::sema::types::Ty;

/// A substitution environment: which definition is being specialized, and
/// what each of its type parameters maps to. Equality and hashing are fully
/// structural; two contexts built independently from the same arguments are
/// interchangeable as cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecializationContext {
    pub target: Option<TypeDefId>,
    /// Parameter bindings in declaration order.
    pub args: Vec<(TypeParamId, TypeId)>,
}

impl SpecializationContext {
    /// The canonical "no substitution" context.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Bind a definition's declared parameters to concrete arguments,
    /// positionally. An arity mismatch (and a non-generic target) normalizes
    /// to the canonical empty context, so every invalid request compares
    /// equal and specializes nothing.
    pub fn for_def(registry: &TypeRegistry, def: TypeDefId, args: &[TypeId]) -> Self {
        let params = &registry.def(def).type_params;
        if params.is_empty() || params.len() != args.len() {
            return Self::empty();
        }
        Self {
            target: Some(def),
            args: params.iter().copied().zip(args.iter().copied()).collect(),
        }
    }

    pub fn substitutions(&self) -> FxHashMap<TypeParamId, TypeId> {
        self.args.iter().copied().collect()
    }
}

/// Drives specialization for one analysis, sharing the arena, registry and
/// scope storage with the resolver.
pub struct Specializer<'a> {
    pub arena: &'a mut TypeArena,
    pub registry: &'a mut TypeRegistry,
    pub scopes: &'a mut ScopeArena,
}

impl<'a> Specializer<'a> {
    pub fn new(
        arena: &'a mut TypeArena,
        registry: &'a mut TypeRegistry,
        scopes: &'a mut ScopeArena,
    ) -> Self {
        Self {
            arena,
            registry,
            scopes,
        }
    }

    /// Substitute a type under a context and remap any now-concrete generic
    /// references onto their specialized definitions. A substitution that
    /// changes nothing returns the original handle.
    pub fn specialize_type(&mut self, ty: TypeId, ctx: &SpecializationContext) -> TypeId {
        let substituted = self.arena.substitute(ty, &ctx.substitutions());
        self.remap(substituted)
    }

    /// Specialize a generic definition under a context, producing the
    /// structured type of the specialized definition.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn specialize_def(&mut self, def: TypeDefId, ctx: &SpecializationContext) -> TypeId {
        // The empty/invalid context and a context for some other definition
        // substitute nothing; the original type comes back unchanged.
        if ctx.target != Some(def) || ctx.args.len() != self.registry.def(def).arity() {
            return self.self_type(def);
        }
        if let Some(cached) = self.registry.cached_specialization(def, ctx) {
            return cached;
        }

        let source = self.registry.def(def);
        let struct_kind = match source.kind {
            TypeDefKind::Struct(k) => k,
            // Enumerations are never generic.
            TypeDefKind::Enum => return self.arena.enum_type(def),
        };
        let name = source.name;
        let unit = source.unit;
        let kind = source.kind;
        let super_type = source.super_type;
        let interfaces = source.interfaces.clone();
        let member_scope = source.member_scope;

        // Specializing a generic at its own parameters is the identity; hand
        // back the generic's canonical self-type instead of a copy.
        if self.is_identity(ctx) {
            let args: TypeIdVec = ctx.args.iter().map(|&(p, _)| self.arena.type_param(p)).collect();
            let ty = self.arena.structured(struct_kind, def, args);
            self.registry.cache_specialization(def, ctx.clone(), ty);
            return ty;
        }

        let mut specialized = TypeDef::new(name, unit, kind);
        specialized.generic_source = Some(def);
        let spec_def = self.registry.add_def(specialized);

        let args: TypeIdVec = ctx.args.iter().map(|&(_, t)| t).collect();
        let ty = self.arena.structured(struct_kind, spec_def, args);
        // Publish before members so self-references terminate.
        self.registry.cache_specialization(def, ctx.clone(), ty);

        let super_type = super_type.map(|s| self.specialize_type(s, ctx));
        let interfaces = interfaces
            .iter()
            .map(|&i| self.specialize_type(i, ctx))
            .collect();
        let member_scope = member_scope.map(|src| self.specialize_members(src, spec_def, ctx));

        let d = self.registry.def_mut(spec_def);
        d.super_type = super_type;
        d.interfaces = interfaces;
        d.member_scope = member_scope;

        ty
    }

    /// Copy a member scope with every declared type substituted.
    fn specialize_members(
        &mut self,
        source: crate::identity::ScopeId,
        spec_def: TypeDefId,
        ctx: &SpecializationContext,
    ) -> crate::identity::ScopeId {
        let target = self
            .scopes
            .new_scope(ScopeKind::Type { type_def: spec_def }, None);
        let members: Vec<Declaration> = self
            .scopes
            .scope(source)
            .declarations()
            .iter()
            .map(|&id| self.scopes.decl(id).clone())
            .collect();

        for mut decl in members {
            decl.ty = self.specialize_type(decl.ty, ctx);
            if let DeclDetails::Routine(sig) = &mut decl.details {
                for p in &mut sig.params {
                    p.ty = self.specialize_type(p.ty, ctx);
                }
                sig.ret = self.specialize_type(sig.ret, ctx);
            }
            self.scopes.add_declaration_unchecked(target, decl);
        }
        target
    }

    /// A definition's canonical type at its own parameters.
    fn self_type(&mut self, def: TypeDefId) -> TypeId {
        let d = self.registry.def(def);
        let kind = match d.kind {
            TypeDefKind::Struct(k) => k,
            TypeDefKind::Enum => return self.arena.enum_type(def),
        };
        let params = d.type_params.clone();
        let args: TypeIdVec = params
            .into_iter()
            .map(|p| self.arena.type_param(p))
            .collect();
        self.arena.structured(kind, def, args)
    }

    fn is_identity(&self, ctx: &SpecializationContext) -> bool {
        ctx.args
            .iter()
            .all(|&(param, ty)| matches!(self.arena.get(ty), Ty::TypeParam(p) if *p == param))
    }

    /// Replace structured references to generic definitions whose arguments
    /// are now fully concrete with the corresponding specialized definitions.
    fn remap(&mut self, ty: TypeId) -> TypeId {
        match self.arena.get(ty).clone() {
            Ty::Struct {
                type_def,
                type_args,
                ..
            } if self.registry.def(type_def).is_generic()
                && !type_args.is_empty()
                && !type_args.iter().any(|&a| self.contains_param(a)) =>
            {
                let ctx = SpecializationContext::for_def(self.registry, type_def, &type_args);
                self.specialize_def(type_def, &ctx)
            }
            Ty::Set { element } => {
                let e = self.remap(element);
                self.arena.set_of(e)
            }
            Ty::Array { element, dynamic } => {
                let e = self.remap(element);
                self.arena.array_of(e, dynamic)
            }
            Ty::Pointer { target } => {
                let t = self.remap(target);
                self.arena.pointer_to(t)
            }
            Ty::Procedural {
                params,
                ret,
                of_object,
            } => {
                let params: TypeIdVec = params.iter().map(|&p| self.remap(p)).collect();
                let ret = self.remap(ret);
                self.arena.procedural(params, ret, of_object)
            }
            Ty::Alias {
                name,
                aliased,
                strong,
            } => {
                let a = self.remap(aliased);
                self.arena.alias(name, a, strong)
            }
            _ => ty,
        }
    }

    fn contains_param(&self, ty: TypeId) -> bool {
        match self.arena.get(ty) {
            Ty::TypeParam(_) => true,
            Ty::Set { element } | Ty::Array { element, .. } => self.contains_param(*element),
            Ty::Pointer { target } => self.contains_param(*target),
            Ty::Procedural { params, ret, .. } => {
                params.iter().any(|&p| self.contains_param(p)) || self.contains_param(*ret)
            }
            Ty::Struct { type_args, .. } => type_args.iter().any(|&a| self.contains_param(a)),
            Ty::Alias { aliased, .. } => self.contains_param(*aliased),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::*;
    use crate::frontend::{Span, Symbol};
    use crate::identity::{RoutineId, UnitId};
    use crate::sema::declarations::{DeclarationBuilder, Parameter, RoutineSignature};
    use crate::sema::registry::TypeParamDef;
    use crate::sema::types::{IntegerType, StructKind};

    struct Fixture {
        arena: TypeArena,
        registry: TypeRegistry,
        scopes: ScopeArena,
        int: TypeId,
        list: TypeDefId,
        param: TypeParamId,
    }

    /// `TList<T>` with `Head: T` and `Next: TList<T>` members.
    fn generic_list() -> Fixture {
        let mut arena = TypeArena::new(8);
        let mut registry = TypeRegistry::new();
        let mut scopes = ScopeArena::new();

        let int = arena.integer(IntegerType::new(Symbol(100), 4, true));
        let param = registry.add_param(TypeParamDef {
            name: Symbol(1),
            constraint: None,
        });
        let t_ty = arena.type_param(param);

        let mut def = TypeDef::new(Symbol(0), UnitId::new(1), TypeDefKind::Struct(StructKind::Class));
        def.type_params.push(param);
        let list = registry.add_def(def);

        let members = scopes.new_scope(ScopeKind::Type { type_def: list }, None);
        let self_ty = arena.structured(StructKind::Class, list, smallvec![t_ty]);
        let head = DeclarationBuilder::new(Symbol(2), Span::default(), UnitId::new(1))
            .variable()
            .ty(t_ty)
            .build();
        let next = DeclarationBuilder::new(Symbol(3), Span::default(), UnitId::new(1))
            .variable()
            .ty(self_ty)
            .build();
        scopes.add_declaration_unchecked(members, head);
        scopes.add_declaration_unchecked(members, next);
        registry.def_mut(list).member_scope = Some(members);

        Fixture {
            arena,
            registry,
            scopes,
            int,
            list,
            param,
        }
    }

    #[test]
    fn equal_contexts_yield_identical_types() {
        let mut fx = generic_list();
        let ctx_a = SpecializationContext::for_def(&fx.registry, fx.list, &[fx.int]);
        let ctx_b = SpecializationContext::for_def(&fx.registry, fx.list, &[fx.int]);
        assert_eq!(ctx_a, ctx_b);

        let mut spec = Specializer::new(&mut fx.arena, &mut fx.registry, &mut fx.scopes);
        let a = spec.specialize_def(fx.list, &ctx_a);
        let b = spec.specialize_def(fx.list, &ctx_b);
        assert_eq!(a, b);
    }

    #[test]
    fn self_referential_member_maps_to_the_specialization_itself() {
        let mut fx = generic_list();
        let ctx = SpecializationContext::for_def(&fx.registry, fx.list, &[fx.int]);
        let mut spec = Specializer::new(&mut fx.arena, &mut fx.registry, &mut fx.scopes);
        let ty = spec.specialize_def(fx.list, &ctx);

        let spec_def = fx.arena.type_def_id(ty).unwrap();
        assert_eq!(fx.registry.def(spec_def).generic_source, Some(fx.list));
        let members = fx.registry.def(spec_def).member_scope.unwrap();
        let decls = fx.scopes.scope(members).declarations().to_vec();
        // Head: T becomes Head: Integer.
        assert_eq!(fx.scopes.decl(decls[0]).ty, fx.int);
        // Next: TList<T> becomes the published specialization, not a copy.
        assert_eq!(fx.scopes.decl(decls[1]).ty, ty);
    }

    #[test]
    fn identity_context_returns_the_generic_self_type() {
        let mut fx = generic_list();
        let t_ty = fx.arena.type_param(fx.param);
        let self_ty = fx.arena.structured(StructKind::Class, fx.list, smallvec![t_ty]);
        let ctx = SpecializationContext::for_def(&fx.registry, fx.list, &[t_ty]);
        let mut spec = Specializer::new(&mut fx.arena, &mut fx.registry, &mut fx.scopes);
        assert_eq!(spec.specialize_def(fx.list, &ctx), self_ty);
    }

    #[test]
    fn routine_member_signatures_are_substituted() {
        let mut fx = generic_list();
        let t_ty = fx.arena.type_param(fx.param);
        let members = fx.registry.def(fx.list).member_scope.unwrap();
        let sig = RoutineSignature {
            routine: RoutineId::new(0),
            params: vec![Parameter::new(Some(Symbol(5)), t_ty)],
            ret: t_ty,
            is_class_method: false,
            is_operator: false,
        };
        let get = DeclarationBuilder::new(Symbol(4), Span::default(), UnitId::new(1))
            .routine(sig)
            .build();
        fx.scopes.add_declaration_unchecked(members, get);

        let ctx = SpecializationContext::for_def(&fx.registry, fx.list, &[fx.int]);
        let mut spec = Specializer::new(&mut fx.arena, &mut fx.registry, &mut fx.scopes);
        let ty = spec.specialize_def(fx.list, &ctx);

        let spec_def = fx.arena.type_def_id(ty).unwrap();
        let spec_members = fx.registry.def(spec_def).member_scope.unwrap();
        let decls = fx.scopes.scope(spec_members).declarations().to_vec();
        let routine = fx.scopes.decl(decls[2]).as_routine().unwrap();
        assert_eq!(routine.ret, fx.int);
        assert_eq!(routine.params[0].ty, fx.int);
    }

    #[test]
    fn arity_mismatch_normalizes_to_the_empty_context() {
        let fx = generic_list();
        let none = SpecializationContext::for_def(&fx.registry, fx.list, &[]);
        let extra = SpecializationContext::for_def(&fx.registry, fx.list, &[fx.int, fx.int]);
        assert_eq!(none, SpecializationContext::empty());
        assert_eq!(extra, SpecializationContext::empty());
        assert_eq!(none, extra);
        assert!(none.is_empty());
    }

    #[test]
    fn invalid_context_specialization_is_a_no_op() {
        let mut fx = generic_list();
        let t_ty = fx.arena.type_param(fx.param);
        let self_ty = fx.arena.structured(StructKind::Class, fx.list, smallvec![t_ty]);
        let ctx = SpecializationContext::for_def(&fx.registry, fx.list, &[]);

        let mut spec = Specializer::new(&mut fx.arena, &mut fx.registry, &mut fx.scopes);
        let ty = spec.specialize_def(fx.list, &ctx);
        assert_eq!(ty, self_ty);
        assert_eq!(spec.specialize_def(fx.list, &SpecializationContext::empty()), self_ty);
        // No fresh definition was minted along the way.
        assert_eq!(fx.arena.type_def_id(ty), Some(fx.list));
    }

    #[test]
    fn specialize_type_is_identity_without_params() {
        let mut fx = generic_list();
        let arr = fx.arena.array_of(fx.int, true);
        let ctx = SpecializationContext::for_def(&fx.registry, fx.list, &[fx.int]);
        let mut spec = Specializer::new(&mut fx.arena, &mut fx.registry, &mut fx.scopes);
        assert_eq!(spec.specialize_type(arr, &ctx), arr);
    }
}
