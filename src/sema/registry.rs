// src/sema/registry.rs
//
// Registry of type definitions and type parameters.
//
// A TypeDefId identifies a *definition* (class TList<T>, an enum, a helper);
// the concrete instantiations live in the TypeArena. Definitions are built
// while the declaring unit is analyzed and read-only afterwards, except for
// the specialization cache, which fills lazily for the life of the generic
// definition.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::frontend::Symbol;
use crate::identity::{ScopeId, TypeDefId, TypeParamId, UnitId};
use crate::sema::generic::SpecializationContext;
use crate::sema::type_arena::TypeId;
use crate::sema::types::StructKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDefKind {
    Struct(StructKind),
    Enum,
}

impl TypeDefKind {
    pub fn is_structured(self) -> bool {
        matches!(self, TypeDefKind::Struct(_))
    }
}

/// One type definition. Structured definitions own a member scope; enums own
/// their value names; helpers record the type they inject members onto.
#[derive(Debug)]
pub struct TypeDef {
    pub name: Symbol,
    pub unit: UnitId,
    pub kind: TypeDefKind,
    pub super_type: Option<TypeId>,
    pub interfaces: SmallVec<[TypeId; 2]>,
    pub member_scope: Option<ScopeId>,
    pub type_params: Vec<TypeParamId>,
    pub helper_for: Option<TypeId>,
    /// Set on `TFoo = class;` until the completing declaration arrives.
    pub forward: bool,
    /// For specialized definitions, the generic definition they came from.
    pub generic_source: Option<TypeDefId>,
    pub enum_values: Vec<Symbol>,
    specializations: FxHashMap<SpecializationContext, TypeId>,
}

impl TypeDef {
    pub fn new(name: Symbol, unit: UnitId, kind: TypeDefKind) -> Self {
        Self {
            name,
            unit,
            kind,
            super_type: None,
            interfaces: SmallVec::new(),
            member_scope: None,
            type_params: Vec::new(),
            helper_for: None,
            forward: false,
            generic_source: None,
            enum_values: Vec::new(),
            specializations: FxHashMap::default(),
        }
    }

    /// Number of type parameters; zero for non-generic definitions.
    pub fn arity(&self) -> usize {
        self.type_params.len()
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

/// A declared type parameter, owned by one generic definition or routine.
#[derive(Debug, Clone)]
pub struct TypeParamDef {
    pub name: Symbol,
    pub constraint: Option<TypeId>,
}

#[derive(Debug, Default)]
pub struct TypeRegistry {
    defs: Vec<TypeDef>,
    params: Vec<TypeParamDef>,
    /// Helper association: subject type -> helper definition. The most
    /// recently registered helper for a type wins, matching compiler rules.
    helpers: FxHashMap<TypeId, TypeDefId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_def(&mut self, def: TypeDef) -> TypeDefId {
        let id = TypeDefId::new(self.defs.len() as u32);
        self.defs.push(def);
        id
    }

    pub fn def(&self, id: TypeDefId) -> &TypeDef {
        &self.defs[id.index() as usize]
    }

    pub fn def_mut(&mut self, id: TypeDefId) -> &mut TypeDef {
        &mut self.defs[id.index() as usize]
    }

    pub fn add_param(&mut self, param: TypeParamDef) -> TypeParamId {
        let id = TypeParamId::new(self.params.len() as u32);
        self.params.push(param);
        id
    }

    pub fn param(&self, id: TypeParamId) -> &TypeParamDef {
        &self.params[id.index() as usize]
    }

    pub fn register_helper(&mut self, subject: TypeId, helper: TypeDefId) {
        self.helpers.insert(subject, helper);
    }

    /// The active helper definition for a type, if any.
    pub fn helper_for(&self, subject: TypeId) -> Option<TypeDefId> {
        self.helpers.get(&subject).copied()
    }

    pub fn cached_specialization(
        &self,
        def: TypeDefId,
        ctx: &SpecializationContext,
    ) -> Option<TypeId> {
        self.def(def).specializations.get(ctx).copied()
    }

    /// Publish a specialization before its members are specialized; this is
    /// what lets self-referential generics terminate.
    pub fn cache_specialization(
        &mut self,
        def: TypeDefId,
        ctx: SpecializationContext,
        ty: TypeId,
    ) {
        self.def_mut(def).specializations.insert(ctx, ty);
    }

    pub fn def_count(&self) -> usize {
        self.defs.len()
    }
}
