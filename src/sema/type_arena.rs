// src/sema/type_arena.rs
//
// Interned type storage using TypeId handles for O(1) equality and minimal
// allocations.
//
// The arena is the type factory's backing store: every type value is created
// once, deduplicated on construction, and addressed by TypeId thereafter.
// Specialization never mutates a stored type; substitution builds new values
// and interning canonicalizes them, so a substitution that changes nothing
// hands back the original handle.

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::frontend::{Interner, Symbol};
use crate::identity::{TypeDefId, TypeParamId};
use crate::sema::registry::TypeRegistry;
use crate::sema::types::{IntegerType, StructKind, Ty, TypeKind};

/// Handle to an interned type value.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct TypeId(u32);

impl TypeId {
    // Reserved ids, guaranteed by TypeArena::new(). The sentinels exist so no
    // node ever carries a null type: failed inference yields UNKNOWN, untyped
    // constructs yield UNTYPED.
    pub const UNKNOWN: TypeId = TypeId(0);
    pub const UNTYPED: TypeId = TypeId(1);
    pub const VARIANT: TypeId = TypeId(2);

    /// First non-reserved index.
    pub const FIRST_DYNAMIC: u32 = 3;

    pub fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }

    #[inline]
    pub fn is_untyped(self) -> bool {
        self == Self::UNTYPED
    }
}

/// SmallVec for type children - inline up to 4 (covers most type-argument and
/// parameter lists).
pub type TypeIdVec = SmallVec<[TypeId; 4]>;

/// Per-analysis type storage with automatic deduplication.
pub struct TypeArena {
    types: Vec<Ty>,
    intern_map: HashMap<Ty, TypeId>,
    /// Target pointer width in bytes, from the toolchain configuration.
    pointer_size: u8,
}

impl std::fmt::Debug for TypeArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeArena")
            .field("types_count", &self.types.len())
            .finish_non_exhaustive()
    }
}

impl TypeArena {
    pub fn new(pointer_size: u8) -> Self {
        let mut arena = Self {
            types: Vec::new(),
            intern_map: HashMap::new(),
            pointer_size,
        };

        // Pre-intern the sentinels in the order the TypeId constants assume.
        let unknown = arena.intern(Ty::Unknown);
        debug_assert_eq!(unknown, TypeId::UNKNOWN);
        let untyped = arena.intern(Ty::Untyped);
        debug_assert_eq!(untyped, TypeId::UNTYPED);
        let variant = arena.intern(Ty::Variant);
        debug_assert_eq!(variant, TypeId::VARIANT);

        arena
    }

    fn intern(&mut self, ty: Ty) -> TypeId {
        let next_id = TypeId(self.types.len() as u32);
        *self.intern_map.entry(ty.clone()).or_insert_with(|| {
            self.types.push(ty);
            next_id
        })
    }

    pub fn get(&self, id: TypeId) -> &Ty {
        &self.types[id.0 as usize]
    }

    pub fn kind(&self, id: TypeId) -> TypeKind {
        self.get(id).kind()
    }

    pub fn pointer_size(&self) -> u8 {
        self.pointer_size
    }

    // ========================================================================
    // Builders - intern on construction
    // ========================================================================

    pub fn unknown(&self) -> TypeId {
        TypeId::UNKNOWN
    }

    pub fn untyped(&self) -> TypeId {
        TypeId::UNTYPED
    }

    pub fn variant(&self) -> TypeId {
        TypeId::VARIANT
    }

    pub fn integer(&mut self, ty: IntegerType) -> TypeId {
        self.intern(Ty::Integer(ty))
    }

    pub fn real(&mut self, name: Symbol, size: u8) -> TypeId {
        self.intern(Ty::Real { name, size })
    }

    pub fn boolean(&mut self, name: Symbol, size: u8) -> TypeId {
        self.intern(Ty::Boolean { name, size })
    }

    pub fn char_type(&mut self, name: Symbol, size: u8) -> TypeId {
        self.intern(Ty::Char { name, size })
    }

    pub fn string_type(&mut self, name: Symbol, char_size: u8) -> TypeId {
        self.intern(Ty::String { name, char_size })
    }

    pub fn enum_type(&mut self, type_def: TypeDefId) -> TypeId {
        self.intern(Ty::Enum { type_def })
    }

    pub fn set_of(&mut self, element: TypeId) -> TypeId {
        self.intern(Ty::Set { element })
    }

    pub fn array_of(&mut self, element: TypeId, dynamic: bool) -> TypeId {
        self.intern(Ty::Array { element, dynamic })
    }

    pub fn structured(
        &mut self,
        kind: StructKind,
        type_def: TypeDefId,
        type_args: impl Into<TypeIdVec>,
    ) -> TypeId {
        self.intern(Ty::Struct {
            kind,
            type_def,
            type_args: type_args.into(),
        })
    }

    pub fn pointer_to(&mut self, target: TypeId) -> TypeId {
        self.intern(Ty::Pointer { target })
    }

    /// The untyped `Pointer` intrinsic.
    pub fn untyped_pointer(&mut self) -> TypeId {
        self.pointer_to(TypeId::UNTYPED)
    }

    pub fn procedural(
        &mut self,
        params: impl Into<TypeIdVec>,
        ret: TypeId,
        of_object: bool,
    ) -> TypeId {
        self.intern(Ty::Procedural {
            params: params.into(),
            ret,
            of_object,
        })
    }

    pub fn type_param(&mut self, param: TypeParamId) -> TypeId {
        self.intern(Ty::TypeParam(param))
    }

    pub fn alias(&mut self, name: Symbol, aliased: TypeId, strong: bool) -> TypeId {
        self.intern(Ty::Alias {
            name,
            aliased,
            strong,
        })
    }

    // ========================================================================
    // Predicates and unwrap helpers
    // ========================================================================

    pub fn is_integer(&self, id: TypeId) -> bool {
        matches!(self.get(self.dealias(id)), Ty::Integer(_))
    }

    pub fn is_real(&self, id: TypeId) -> bool {
        matches!(self.get(self.dealias(id)), Ty::Real { .. })
    }

    pub fn is_numeric(&self, id: TypeId) -> bool {
        self.is_integer(id) || self.is_real(id)
    }

    pub fn is_struct(&self, id: TypeId) -> bool {
        matches!(self.get(self.dealias(id)), Ty::Struct { .. })
    }

    pub fn is_pointer(&self, id: TypeId) -> bool {
        matches!(self.get(self.dealias(id)), Ty::Pointer { .. })
    }

    pub fn is_variant(&self, id: TypeId) -> bool {
        matches!(self.get(self.dealias(id)), Ty::Variant)
    }

    pub fn is_set(&self, id: TypeId) -> bool {
        matches!(self.get(self.dealias(id)), Ty::Set { .. })
    }

    pub fn is_dynamic_array(&self, id: TypeId) -> bool {
        matches!(self.get(self.dealias(id)), Ty::Array { dynamic: true, .. })
    }

    /// Integer attributes, following aliases.
    pub fn as_integer(&self, id: TypeId) -> Option<&IntegerType> {
        match self.get(self.dealias(id)) {
            Ty::Integer(int) => Some(int),
            _ => None,
        }
    }

    pub fn unwrap_array(&self, id: TypeId) -> Option<TypeId> {
        match self.get(self.dealias(id)) {
            Ty::Array { element, .. } => Some(*element),
            _ => None,
        }
    }

    pub fn unwrap_set(&self, id: TypeId) -> Option<TypeId> {
        match self.get(self.dealias(id)) {
            Ty::Set { element } => Some(*element),
            _ => None,
        }
    }

    pub fn unwrap_pointer(&self, id: TypeId) -> Option<TypeId> {
        match self.get(self.dealias(id)) {
            Ty::Pointer { target } => Some(*target),
            _ => None,
        }
    }

    pub fn unwrap_struct(&self, id: TypeId) -> Option<(StructKind, TypeDefId, &[TypeId])> {
        match self.get(self.dealias(id)) {
            Ty::Struct {
                kind,
                type_def,
                type_args,
            } => Some((*kind, *type_def, type_args)),
            _ => None,
        }
    }

    pub fn unwrap_procedural(&self, id: TypeId) -> Option<(&TypeIdVec, TypeId, bool)> {
        match self.get(self.dealias(id)) {
            Ty::Procedural {
                params,
                ret,
                of_object,
            } => Some((params, *ret, *of_object)),
            _ => None,
        }
    }

    /// TypeDefId for enum and structured types.
    pub fn type_def_id(&self, id: TypeId) -> Option<TypeDefId> {
        match self.get(self.dealias(id)) {
            Ty::Enum { type_def } => Some(*type_def),
            Ty::Struct { type_def, .. } => Some(*type_def),
            _ => None,
        }
    }

    /// Follow the alias chain (weak and strong) to the representation type.
    pub fn dealias(&self, mut id: TypeId) -> TypeId {
        while let Ty::Alias { aliased, .. } = self.get(id) {
            id = *aliased;
        }
        id
    }

    // ========================================================================
    // Identity and subtyping
    // ========================================================================

    /// Case-insensitive match against a type image. Weak aliases also answer
    /// to their target's image; strong aliases are distinct types and do not.
    /// The sentinels match nothing but their own image, and in particular
    /// never match a concrete type name.
    pub fn is(
        &self,
        id: TypeId,
        image: &str,
        interner: &Interner,
        registry: &TypeRegistry,
    ) -> bool {
        if self.image(id, interner, registry).eq_ignore_ascii_case(image) {
            return true;
        }
        match self.get(id) {
            Ty::Alias {
                aliased,
                strong: false,
                ..
            } => self.is(*aliased, image, interner, registry),
            _ => false,
        }
    }

    /// Walk the super-type chain of a structured type. Only structured types
    /// have super types; everything else answers false.
    pub fn is_subtype_of(&self, id: TypeId, ancestor: TypeId, registry: &TypeRegistry) -> bool {
        let ancestor = self.dealias(ancestor);
        let Some((_, mut def_id, _)) = self.unwrap_struct(id) else {
            return false;
        };
        let ancestor_def = self.type_def_id(ancestor);
        loop {
            let def = registry.def(def_id);
            for &iface in &def.interfaces {
                if self.dealias(iface) == ancestor
                    || self.is_subtype_of(iface, ancestor, registry)
                {
                    return true;
                }
            }
            match def.super_type {
                Some(sup) => {
                    let sup = self.dealias(sup);
                    if sup == ancestor {
                        return true;
                    }
                    if ancestor_def.is_some() && self.type_def_id(sup) == ancestor_def {
                        return true;
                    }
                    match self.type_def_id(sup) {
                        Some(next) => def_id = next,
                        None => return false,
                    }
                }
                None => return false,
            }
        }
    }

    /// Display image of a type, resolving definition names via the registry.
    pub fn image(&self, id: TypeId, interner: &Interner, registry: &TypeRegistry) -> String {
        match self.get(id) {
            Ty::Unknown => "<unknown>".to_string(),
            Ty::Untyped => "<untyped>".to_string(),
            Ty::Variant => "Variant".to_string(),
            Ty::Integer(int) => interner.resolve(int.name).to_string(),
            Ty::Real { name, .. }
            | Ty::Boolean { name, .. }
            | Ty::Char { name, .. }
            | Ty::String { name, .. }
            | Ty::Alias { name, .. } => interner.resolve(*name).to_string(),
            Ty::Enum { type_def } => interner.resolve(registry.def(*type_def).name).to_string(),
            Ty::Set { element } => {
                format!("set of {}", self.image(*element, interner, registry))
            }
            Ty::Array { element, dynamic } => {
                let elem = self.image(*element, interner, registry);
                if *dynamic {
                    format!("array of {}", elem)
                } else {
                    format!("array [..] of {}", elem)
                }
            }
            Ty::Struct {
                type_def,
                type_args,
                ..
            } => {
                let name = interner.resolve(registry.def(*type_def).name).to_string();
                if type_args.is_empty() {
                    name
                } else {
                    let args: Vec<String> = type_args
                        .iter()
                        .map(|&a| self.image(a, interner, registry))
                        .collect();
                    format!("{}<{}>", name, args.join(", "))
                }
            }
            Ty::Pointer { target } => {
                if target.is_untyped() {
                    "Pointer".to_string()
                } else {
                    format!("^{}", self.image(*target, interner, registry))
                }
            }
            Ty::Procedural { ret, .. } => {
                // Procedures carry the untyped sentinel as their return slot.
                if ret.is_untyped() {
                    "procedure".to_string()
                } else {
                    "function".to_string()
                }
            }
            Ty::TypeParam(param) => interner.resolve(registry.param(*param).name).to_string(),
        }
    }

    // ========================================================================
    // Storage size and ordinal queries
    // ========================================================================

    /// Storage size in bytes. Enumerations report one storage unit, a
    /// deliberate simplification. Static arrays and records report zero
    /// because element counts and field layout live outside this core.
    pub fn size(&self, id: TypeId, registry: &TypeRegistry) -> u32 {
        match self.get(self.dealias(id)) {
            Ty::Unknown | Ty::Untyped | Ty::TypeParam(_) | Ty::Alias { .. } => 0,
            Ty::Variant => 16,
            Ty::Integer(int) => int.size as u32,
            Ty::Real { size, .. } | Ty::Boolean { size, .. } | Ty::Char { size, .. } => {
                *size as u32
            }
            // Long strings, dynamic arrays, classes, interfaces, procedure
            // values and pointers are all references on the target.
            Ty::String { .. } | Ty::Pointer { .. } => self.pointer_size as u32,
            Ty::Enum { .. } => 1,
            Ty::Set { element } => match self.ordinal_range(*element, registry) {
                Some((min, max)) => {
                    let bits = max.saturating_sub(min) + 1;
                    (((bits + 7) / 8) as u32).min(32)
                }
                None => 32,
            },
            Ty::Array { dynamic, .. } => {
                if *dynamic {
                    self.pointer_size as u32
                } else {
                    0
                }
            }
            Ty::Struct { kind, .. } => match kind {
                StructKind::Class | StructKind::Interface => self.pointer_size as u32,
                _ => 0,
            },
            Ty::Procedural { of_object, .. } => {
                let ptr = self.pointer_size as u32;
                // Method pointers carry a Self alongside the code pointer.
                if *of_object {
                    ptr * 2
                } else {
                    ptr
                }
            }
        }
    }

    /// Ordinal value range for integer, char, boolean and enum types.
    pub fn ordinal_range(&self, id: TypeId, registry: &TypeRegistry) -> Option<(i128, i128)> {
        match self.get(self.dealias(id)) {
            Ty::Integer(int) => Some((int.min, int.max)),
            Ty::Boolean { .. } => Some((0, 1)),
            Ty::Char { size, .. } => Some((0, (1i128 << (8 * *size as u32)) - 1)),
            Ty::Enum { type_def } => {
                let count = registry.def(*type_def).enum_values.len() as i128;
                Some((0, (count - 1).max(0)))
            }
            _ => None,
        }
    }

    /// Rank two integer types by range proximity; `None` when either side is
    /// not an integer type.
    pub fn ordinal_distance(&self, a: TypeId, b: TypeId) -> Option<u128> {
        Some(self.as_integer(a)?.ordinal_distance(self.as_integer(b)?))
    }

    // ========================================================================
    // Type-parameter substitution
    // ========================================================================

    /// Substitute type parameters with concrete types throughout a type's
    /// structure. Interning canonicalizes: when nothing changes, the original
    /// handle comes back, preserving reference identity for unaffected types.
    ///
    /// Structured types keep their definition id here; mapping a generic
    /// definition to its specialized definition is the specialization
    /// engine's job, layered on top of this.
    pub fn substitute(
        &mut self,
        ty: TypeId,
        subs: &rustc_hash::FxHashMap<TypeParamId, TypeId>,
    ) -> TypeId {
        if subs.is_empty() {
            return ty;
        }

        match self.get(ty).clone() {
            Ty::TypeParam(param) => subs.get(&param).copied().unwrap_or(ty),

            Ty::Set { element } => {
                let new_elem = self.substitute(element, subs);
                self.set_of(new_elem)
            }

            Ty::Array { element, dynamic } => {
                let new_elem = self.substitute(element, subs);
                self.array_of(new_elem, dynamic)
            }

            Ty::Pointer { target } => {
                let new_target = self.substitute(target, subs);
                self.pointer_to(new_target)
            }

            Ty::Procedural {
                params,
                ret,
                of_object,
            } => {
                let new_params: TypeIdVec =
                    params.iter().map(|&p| self.substitute(p, subs)).collect();
                let new_ret = self.substitute(ret, subs);
                self.procedural(new_params, new_ret, of_object)
            }

            Ty::Struct {
                kind,
                type_def,
                type_args,
            } => {
                let new_args: TypeIdVec = type_args
                    .iter()
                    .map(|&a| self.substitute(a, subs))
                    .collect();
                self.structured(kind, type_def, new_args)
            }

            Ty::Alias {
                name,
                aliased,
                strong,
            } => {
                let new_target = self.substitute(aliased, subs);
                self.alias(name, new_target, strong)
            }

            // No nested type parameters - unchanged.
            Ty::Unknown
            | Ty::Untyped
            | Ty::Variant
            | Ty::Integer(_)
            | Ty::Real { .. }
            | Ty::Boolean { .. }
            | Ty::Char { .. }
            | Ty::String { .. }
            | Ty::Enum { .. } => ty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    #[test]
    fn sentinels_at_reserved_indices() {
        let arena = TypeArena::new(8);
        assert_eq!(arena.unknown(), TypeId::UNKNOWN);
        assert_eq!(arena.untyped(), TypeId::UNTYPED);
        assert_eq!(arena.variant(), TypeId::VARIANT);
    }

    #[test]
    fn sentinels_unequal_to_everything() {
        let mut arena = TypeArena::new(8);
        let byte = arena.integer(IntegerType::new(Symbol(0), 1, false));
        assert_ne!(arena.unknown(), byte);
        assert_ne!(arena.untyped(), byte);
        assert_ne!(arena.unknown(), arena.untyped());
    }

    #[test]
    fn interning_deduplicates() {
        let mut arena = TypeArena::new(8);
        let int = arena.integer(IntegerType::new(Symbol(0), 4, true));
        let a = arena.set_of(int);
        let b = arena.set_of(int);
        assert_eq!(a, b);
    }

    #[test]
    fn substitution_preserves_identity_when_unchanged() {
        let mut arena = TypeArena::new(8);
        let int = arena.integer(IntegerType::new(Symbol(0), 4, true));
        let arr = arena.array_of(int, true);

        let mut subs = FxHashMap::default();
        subs.insert(TypeParamId::new(0), int);
        assert_eq!(arena.substitute(arr, &subs), arr);
    }

    #[test]
    fn substitution_replaces_params_in_structure() {
        let mut arena = TypeArena::new(8);
        let param = TypeParamId::new(0);
        let t = arena.type_param(param);
        let set_of_t = arena.set_of(t);
        let int = arena.integer(IntegerType::new(Symbol(0), 4, true));

        let mut subs = FxHashMap::default();
        subs.insert(param, int);
        let result = arena.substitute(set_of_t, &subs);
        let expected = arena.set_of(int);
        assert_eq!(result, expected);
    }

    #[test]
    fn dealias_follows_chains() {
        let mut arena = TypeArena::new(8);
        let int = arena.integer(IntegerType::new(Symbol(0), 4, true));
        let weak = arena.alias(Symbol(1), int, false);
        let strong = arena.alias(Symbol(2), weak, true);
        assert_eq!(arena.dealias(strong), int);
        assert!(arena.is_integer(strong));
    }

    #[test]
    fn untyped_pointer_shape() {
        let mut arena = TypeArena::new(8);
        let p = arena.untyped_pointer();
        assert!(arena.is_pointer(p));
        assert_eq!(arena.unwrap_pointer(p), Some(TypeId::UNTYPED));
    }
}
