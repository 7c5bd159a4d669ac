// src/sema/well_known.rs
//
// The System scope: the frozen root scope every unit resolves against last.
//
// Building it interns the intrinsic type names as declarations, registers
// the well-known structured types the rest of analysis relies on (TObject as
// the implicit class root, IInterface, TVarRec for open array of const,
// TClassHelperBase as the helper root) and freezes the scope so nothing can
// shadow or extend the universe afterwards.

use crate::frontend::{Interner, Span, Symbol};
use crate::identity::{RoutineId, ScopeId, TypeDefId, UnitId};
use crate::sema::declarations::{DeclarationBuilder, Parameter, RoutineSignature};
use crate::sema::factory::IntrinsicTypes;
use crate::sema::registry::{TypeDef, TypeDefKind, TypeRegistry};
use crate::sema::scope::{ScopeArena, ScopeKind};
use crate::sema::type_arena::{TypeArena, TypeId, TypeIdVec};
use crate::sema::types::StructKind;

/// Handles to the well-known structured types the analysis consults by role
/// rather than by name.
#[derive(Debug, Clone, Copy)]
pub struct WellKnownTypes {
    /// Implicit root of every class without an explicit ancestor.
    pub tobject: TypeId,
    /// Implicit root of every interface.
    pub iinterface: TypeId,
    /// Element type of `array of const` parameters.
    pub tvarrec: TypeId,
    /// Implicit ancestor of class helpers.
    pub tclass_helper_base: TypeId,
}

/// Builds the System scope. Routine ids allocated here are sequential from
/// zero; `next_routine` hands the continuation point to the session.
pub struct SystemScopeBuilder<'a> {
    arena: &'a mut TypeArena,
    registry: &'a mut TypeRegistry,
    scopes: &'a mut ScopeArena,
    interner: &'a mut Interner,
    intrinsics: &'a IntrinsicTypes,
    pub next_routine: u32,
}

impl<'a> SystemScopeBuilder<'a> {
    pub fn new(
        arena: &'a mut TypeArena,
        registry: &'a mut TypeRegistry,
        scopes: &'a mut ScopeArena,
        interner: &'a mut Interner,
        intrinsics: &'a IntrinsicTypes,
    ) -> Self {
        Self {
            arena,
            registry,
            scopes,
            interner,
            intrinsics,
            next_routine: 0,
        }
    }

    pub fn build(&mut self) -> (ScopeId, WellKnownTypes) {
        let system = self.scopes.new_scope(ScopeKind::System, None);

        self.intrinsic_types(system);
        self.boolean_constants(system);

        let tobject = self.build_tobject(system);
        let iinterface = self.build_iinterface(system);
        let tvarrec = self.build_tvarrec(system, tobject);
        let tclass_helper_base = self.build_class(system, "TClassHelperBase", Some(tobject), &[]);

        self.scopes.freeze(system);
        (
            system,
            WellKnownTypes {
                tobject,
                iinterface,
                tvarrec,
                tclass_helper_base,
            },
        )
    }

    fn intrinsic_types(&mut self, system: ScopeId) {
        let i = self.intrinsics;
        let entries: [(&str, TypeId); 20] = [
            ("Byte", i.byte),
            ("ShortInt", i.shortint),
            ("SmallInt", i.smallint),
            ("Word", i.word),
            ("Integer", i.integer),
            ("Cardinal", i.cardinal),
            ("Int64", i.int64),
            ("UInt64", i.uint64),
            ("NativeInt", i.native_int),
            ("NativeUInt", i.native_uint),
            ("Single", i.single),
            ("Double", i.double),
            ("Extended", i.extended),
            ("Boolean", i.boolean),
            ("Char", i.char),
            ("AnsiChar", i.ansi_char),
            ("String", i.string),
            ("AnsiString", i.ansi_string),
            ("Pointer", i.pointer),
            ("Variant", i.variant),
        ];
        for (name, ty) in entries {
            let sym = self.interner.intern(name);
            let decl = DeclarationBuilder::new(sym, Span::default(), UnitId::SYSTEM)
                .type_decl(None, 0, false)
                .ty(ty)
                .intrinsic()
                .build();
            self.scopes.add_declaration_unchecked(system, decl);
        }
    }

    fn boolean_constants(&mut self, system: ScopeId) {
        for name in ["True", "False"] {
            let sym = self.interner.intern(name);
            let decl = DeclarationBuilder::new(sym, Span::default(), UnitId::SYSTEM)
                .constant()
                .ty(self.intrinsics.boolean)
                .intrinsic()
                .build();
            self.scopes.add_declaration_unchecked(system, decl);
        }
        let sym = self.interner.intern("MaxInt");
        let decl = DeclarationBuilder::new(sym, Span::default(), UnitId::SYSTEM)
            .constant()
            .ty(self.intrinsics.integer)
            .intrinsic()
            .build();
        self.scopes.add_declaration_unchecked(system, decl);
    }

    fn build_tobject(&mut self, system: ScopeId) -> TypeId {
        let string = self.intrinsics.string;
        let integer = self.intrinsics.integer;
        let boolean = self.intrinsics.boolean;
        let ty = self.build_class(system, "TObject", None, &[]);
        let def = self.arena.type_def_id(ty).unwrap();
        let members = self.registry.def(def).member_scope.unwrap();

        self.method(members, "Create", &[], ty, false);
        self.method(members, "Destroy", &[], TypeId::UNTYPED, false);
        self.method(members, "Free", &[], TypeId::UNTYPED, false);
        self.method(members, "ClassName", &[], string, true);
        self.method(members, "ToString", &[], string, false);
        self.method(members, "GetHashCode", &[], integer, false);
        self.method(members, "Equals", &[("Obj", ty)], boolean, false);
        ty
    }

    fn build_iinterface(&mut self, system: ScopeId) -> TypeId {
        let name = self.interner.intern("IInterface");
        let def_id = self.registry.add_def(TypeDef::new(
            name,
            UnitId::SYSTEM,
            TypeDefKind::Struct(StructKind::Interface),
        ));
        let members = self
            .scopes
            .new_scope(ScopeKind::Type { type_def: def_id }, None);
        self.registry.def_mut(def_id).member_scope = Some(members);
        let ty = self
            .arena
            .structured(StructKind::Interface, def_id, TypeIdVec::new());

        let integer = self.intrinsics.integer;
        let pointer = self.intrinsics.pointer;
        self.method(
            members,
            "QueryInterface",
            &[("IID", pointer), ("Obj", pointer)],
            integer,
            false,
        );
        self.method(members, "_AddRef", &[], integer, false);
        self.method(members, "_Release", &[], integer, false);

        self.type_declaration(system, name, def_id, ty);
        ty
    }

    fn build_tvarrec(&mut self, system: ScopeId, tobject: TypeId) -> TypeId {
        let name = self.interner.intern("TVarRec");
        let def_id = self.registry.add_def(TypeDef::new(
            name,
            UnitId::SYSTEM,
            TypeDefKind::Struct(StructKind::Record),
        ));
        let members = self
            .scopes
            .new_scope(ScopeKind::Type { type_def: def_id }, None);
        self.registry.def_mut(def_id).member_scope = Some(members);
        let ty = self
            .arena
            .structured(StructKind::Record, def_id, TypeIdVec::new());

        let variant_ptr = self.arena.pointer_to(TypeId::VARIANT);
        let int64_ptr = self.arena.pointer_to(self.intrinsics.int64);
        let fields: [(&str, TypeId); 8] = [
            ("VType", self.intrinsics.byte),
            ("VInteger", self.intrinsics.native_int),
            ("VBoolean", self.intrinsics.boolean),
            ("VChar", self.intrinsics.ansi_char),
            ("VPointer", self.intrinsics.pointer),
            ("VObject", tobject),
            ("VInt64", int64_ptr),
            ("VVariant", variant_ptr),
        ];
        for (field, field_ty) in fields {
            let sym = self.interner.intern(field);
            let decl = DeclarationBuilder::new(sym, Span::default(), UnitId::SYSTEM)
                .variable()
                .ty(field_ty)
                .intrinsic()
                .build();
            self.scopes.add_declaration_unchecked(members, decl);
        }

        self.type_declaration(system, name, def_id, ty);
        ty
    }

    fn build_class(
        &mut self,
        system: ScopeId,
        name: &str,
        super_type: Option<TypeId>,
        interfaces: &[TypeId],
    ) -> TypeId {
        let sym = self.interner.intern(name);
        let mut def = TypeDef::new(sym, UnitId::SYSTEM, TypeDefKind::Struct(StructKind::Class));
        def.super_type = super_type;
        def.interfaces = interfaces.iter().copied().collect();
        let def_id = self.registry.add_def(def);
        let members = self
            .scopes
            .new_scope(ScopeKind::Type { type_def: def_id }, None);
        self.registry.def_mut(def_id).member_scope = Some(members);
        let ty = self
            .arena
            .structured(StructKind::Class, def_id, TypeIdVec::new());
        self.type_declaration(system, sym, def_id, ty);
        ty
    }

    fn type_declaration(&mut self, system: ScopeId, name: Symbol, def: TypeDefId, ty: TypeId) {
        let decl = DeclarationBuilder::new(name, Span::default(), UnitId::SYSTEM)
            .type_decl(Some(def), 0, false)
            .ty(ty)
            .intrinsic()
            .build();
        self.scopes.add_declaration_unchecked(system, decl);
    }

    fn method(
        &mut self,
        members: ScopeId,
        name: &str,
        params: &[(&str, TypeId)],
        ret: TypeId,
        is_class_method: bool,
    ) {
        let sym = self.interner.intern(name);
        let routine = RoutineId::new(self.next_routine);
        self.next_routine += 1;
        let params = params
            .iter()
            .map(|&(p, ty)| {
                let p_sym = self.interner.intern(p);
                let mut param = Parameter::new(Some(p_sym), ty);
                param.intrinsic = true;
                param
            })
            .collect();
        let decl = DeclarationBuilder::new(sym, Span::default(), UnitId::SYSTEM)
            .routine(RoutineSignature {
                routine,
                params,
                ret,
                is_class_method,
                is_operator: false,
            })
            .intrinsic()
            .build();
        self.scopes.add_declaration_unchecked(members, decl);
    }
}
