// src/sema/analyzer/mod.rs
//
// The analysis session: one type universe, one System scope, and a registry
// of analyzed units sharing them.
//
// Unit analysis runs in two passes. The first registers every declaration of
// the unit into its scope tree (creating type definitions, routine scopes and
// import links), so that bodies can reference declarations written later in
// the file. The second resolves the deferred work: constant initializers and
// routine body statements, producing per-node types and occurrences.
// Name-binding failures are tolerated (the occurrence stays unresolved) and
// bounds violations are collected as diagnostics; declaration conflicts are
// fatal for the unit and abort registration before the table corrupts.

use rustc_hash::FxHashMap;

use crate::errors::SemanticError;
use crate::frontend::{
    BinaryOp, Decl, Expr, Ident, Interner, Literal, NodeId, Param, RoutineDecl, RoutineKind, Stmt,
    Symbol, TypeDeclBody, TypeExpr, Unit, UnaryOp,
};
use crate::identity::{DeclId, OccurrenceId, RoutineId, ScopeId, TypeDefId, UnitId};
use crate::sema::bounds::{violates_bounds, LiteralValue};
use crate::sema::config::ToolchainConfig;
use crate::sema::declarations::{DeclDetails, DeclarationBuilder, Parameter, RoutineSignature};
use crate::sema::factory::{IntrinsicTypes, TypeFactory};
use crate::sema::generic::{SpecializationContext, Specializer};
use crate::sema::operators::{Operator, OperatorResolver};
use crate::sema::registry::{TypeDef, TypeDefKind, TypeParamDef, TypeRegistry};
use crate::sema::resolve::{Occurrence, OccurrenceFlags, Resolver};
use crate::sema::scope::{ScopeArena, ScopeKind};
use crate::sema::type_arena::{TypeArena, TypeId, TypeIdVec};
use crate::sema::types::StructKind;
use crate::sema::well_known::{SystemScopeBuilder, WellKnownTypes};

/// Results of analyzing one unit.
#[derive(Debug)]
pub struct UnitAnalysis {
    pub unit: UnitId,
    pub scope: ScopeId,
    /// Resolved type of each expression node.
    pub node_types: FxHashMap<NodeId, TypeId>,
    /// The occurrence recorded for each name-bearing node.
    pub node_occurrences: FxHashMap<NodeId, OccurrenceId>,
    pub diagnostics: Vec<SemanticError>,
}

/// Work deferred from registration to the resolution pass.
#[derive(Default)]
struct Pending {
    bodies: Vec<(ScopeId, Vec<Stmt>)>,
    consts: Vec<(ScopeId, DeclId, Expr)>,
}

/// One analysis session over a toolchain configuration.
pub struct Analysis {
    pub config: ToolchainConfig,
    pub interner: Interner,
    pub arena: TypeArena,
    pub registry: TypeRegistry,
    pub scopes: ScopeArena,
    pub intrinsics: IntrinsicTypes,
    pub well_known: WellKnownTypes,
    pub system_scope: ScopeId,
    /// Analyzed units by folded name.
    units: FxHashMap<Symbol, (UnitId, ScopeId)>,
    next_unit: u32,
    next_routine: u32,
}

impl Analysis {
    pub fn new(config: ToolchainConfig) -> Self {
        let mut interner = Interner::new();
        let (mut arena, intrinsics) = TypeFactory::build(&config, &mut interner);
        let mut registry = TypeRegistry::new();
        let mut scopes = ScopeArena::new();
        let mut builder = SystemScopeBuilder::new(
            &mut arena,
            &mut registry,
            &mut scopes,
            &mut interner,
            &intrinsics,
        );
        let (system_scope, well_known) = builder.build();
        let next_routine = builder.next_routine;

        let mut units = FxHashMap::default();
        let system_sym = interner.intern("System");
        units.insert(system_sym, (UnitId::SYSTEM, system_scope));

        Self {
            config,
            interner,
            arena,
            registry,
            scopes,
            intrinsics,
            well_known,
            system_scope,
            units,
            next_unit: 1,
            next_routine,
        }
    }

    /// The scope of an already-analyzed unit, by (folded) name.
    pub fn unit_scope(&self, name: Symbol) -> Option<ScopeId> {
        self.units.get(&name).map(|&(_, scope)| scope)
    }

    #[tracing::instrument(level = "trace", skip_all, fields(unit = ?unit.name.name))]
    pub fn analyze_unit(&mut self, unit: &Unit) -> Result<UnitAnalysis, SemanticError> {
        if self.units.contains_key(&unit.name.name) {
            return Err(SemanticError::DuplicateUnit {
                name: self.interner.resolve(unit.name.name).to_string(),
                span: unit.name.span.into(),
            });
        }
        let unit_id = UnitId::new(self.next_unit);
        self.next_unit += 1;
        let scope = self.scopes.new_scope(
            ScopeKind::Unit {
                unit: unit_id,
                imports: Vec::new(),
            },
            None,
        );
        self.units.insert(unit.name.name, (unit_id, scope));

        let mut out = UnitAnalysis {
            unit: unit_id,
            scope,
            node_types: FxHashMap::default(),
            node_occurrences: FxHashMap::default(),
            diagnostics: Vec::new(),
        };
        let mut pending = Pending::default();

        // Pass 1: registration.
        self.register_imports(scope, unit_id, &unit.interface_uses)?;
        for decl in &unit.interface_decls {
            self.register_decl(scope, unit_id, decl, &mut pending, &mut out)?;
        }
        self.register_imports(scope, unit_id, &unit.implementation_uses)?;
        for decl in &unit.implementation_decls {
            self.register_decl(scope, unit_id, decl, &mut pending, &mut out)?;
        }

        // Pass 2: resolution.
        for (cscope, decl_id, expr) in std::mem::take(&mut pending.consts) {
            self.resolve_const(cscope, decl_id, &expr, &mut out);
        }
        for (rscope, body) in std::mem::take(&mut pending.bodies) {
            for stmt in &body {
                self.analyze_stmt(rscope, stmt, &mut out);
            }
        }

        Ok(out)
    }

    // ========================================================================
    // Pass 1: declaration registration
    // ========================================================================

    fn register_imports(
        &mut self,
        scope: ScopeId,
        unit: UnitId,
        uses: &[Ident],
    ) -> Result<(), SemanticError> {
        for name in uses {
            let written = self.interner.resolve(name.name).to_string();
            let target = self.config.resolve_unit_name(&written).to_string();
            let target_sym = self.interner.intern(&target);
            // An import of a unit not in the session is tolerated; lookups
            // through it simply find nothing.
            let target_scope = self.units.get(&target_sym).map(|&(_, s)| s);
            let decl = DeclarationBuilder::new(name.name, name.span, unit)
                .unit_import(target_scope)
                .build();
            let id = self.scopes.add_declaration(scope, decl, &self.interner)?;
            self.scopes.add_import(scope, id);
        }
        Ok(())
    }

    fn register_decl(
        &mut self,
        scope: ScopeId,
        unit: UnitId,
        decl: &Decl,
        pending: &mut Pending,
        out: &mut UnitAnalysis,
    ) -> Result<(), SemanticError> {
        match decl {
            Decl::Var { names, ty } => {
                let ty = self.resolve_type_expr(scope, ty, out);
                for name in names {
                    let decl = DeclarationBuilder::new(name.name, name.span, unit)
                        .variable()
                        .ty(ty)
                        .build();
                    self.scopes.add_declaration(scope, decl, &self.interner)?;
                }
            }
            Decl::Const { name, ty, value } => {
                let declared = ty
                    .as_ref()
                    .map(|t| self.resolve_type_expr(scope, t, out))
                    .unwrap_or(TypeId::UNKNOWN);
                let decl = DeclarationBuilder::new(name.name, name.span, unit)
                    .constant()
                    .ty(declared)
                    .build();
                let id = self.scopes.add_declaration(scope, decl, &self.interner)?;
                pending.consts.push((scope, id, value.clone()));
            }
            Decl::TypeDecl {
                name,
                type_params,
                body,
            } => self.register_type_decl(scope, unit, name, type_params, body, pending, out)?,
            Decl::Routine(routine) => {
                self.register_routine(scope, unit, routine, pending, out)?;
            }
            Decl::Property { name, ty } => {
                let ty = self.resolve_type_expr(scope, ty, out);
                let decl = DeclarationBuilder::new(name.name, name.span, unit)
                    .property()
                    .ty(ty)
                    .build();
                self.scopes.add_declaration(scope, decl, &self.interner)?;
            }
        }
        Ok(())
    }

    fn register_type_decl(
        &mut self,
        scope: ScopeId,
        unit: UnitId,
        name: &Ident,
        type_params: &[Ident],
        body: &TypeDeclBody,
        pending: &mut Pending,
        out: &mut UnitAnalysis,
    ) -> Result<(), SemanticError> {
        match body {
            TypeDeclBody::Class {
                forward,
                super_class,
                interfaces,
                members,
            } => self.register_struct(
                scope,
                unit,
                name,
                type_params,
                StructKind::Class,
                *forward,
                super_class.as_ref(),
                interfaces,
                None,
                members,
                pending,
                out,
            )?,
            TypeDeclBody::Interface {
                forward,
                parents,
                members,
            } => self.register_struct(
                scope,
                unit,
                name,
                type_params,
                StructKind::Interface,
                *forward,
                parents.first(),
                parents.get(1..).unwrap_or(&[]),
                None,
                members,
                pending,
                out,
            )?,
            TypeDeclBody::Record { members } => self.register_struct(
                scope,
                unit,
                name,
                type_params,
                StructKind::Record,
                false,
                None,
                &[],
                None,
                members,
                pending,
                out,
            )?,
            TypeDeclBody::Helper {
                kind,
                for_type,
                members,
            } => {
                let skind = match kind {
                    crate::frontend::HelperKind::Class => StructKind::ClassHelper,
                    crate::frontend::HelperKind::Record => StructKind::RecordHelper,
                };
                self.register_struct(
                    scope,
                    unit,
                    name,
                    type_params,
                    skind,
                    false,
                    None,
                    &[],
                    Some(for_type),
                    members,
                    pending,
                    out,
                )?
            }
            TypeDeclBody::Enum { values } => self.register_enum(scope, unit, name, values)?,
            TypeDeclBody::SetOf { element } => {
                let elem = self.resolve_type_expr(scope, element, out);
                let ty = self.arena.set_of(elem);
                self.plain_type_decl(scope, unit, name, ty)?;
            }
            TypeDeclBody::ArrayOf { element, dynamic } => {
                let elem = self.resolve_type_expr(scope, element, out);
                let ty = self.arena.array_of(elem, *dynamic);
                self.plain_type_decl(scope, unit, name, ty)?;
            }
            TypeDeclBody::PointerTo { target } => {
                let target = self.resolve_type_expr(scope, target, out);
                let ty = self.arena.pointer_to(target);
                self.plain_type_decl(scope, unit, name, ty)?;
            }
            TypeDeclBody::Procedural {
                params,
                ret,
                of_object,
            } => {
                let param_tys: TypeIdVec = params
                    .iter()
                    .flat_map(|g| {
                        let ty = g
                            .ty
                            .as_ref()
                            .map(|t| self.resolve_type_expr(scope, t, out))
                            .unwrap_or(TypeId::UNTYPED);
                        std::iter::repeat(ty).take(g.names.len().max(1))
                    })
                    .collect();
                let ret = ret
                    .as_ref()
                    .map(|t| self.resolve_type_expr(scope, t, out))
                    .unwrap_or(TypeId::UNTYPED);
                let ty = self.arena.procedural(param_tys, ret, *of_object);
                self.plain_type_decl(scope, unit, name, ty)?;
            }
            TypeDeclBody::Alias { target, strong } => {
                let aliased = self.resolve_type_expr(scope, target, out);
                let ty = self.arena.alias(name.name, aliased, *strong);
                self.plain_type_decl(scope, unit, name, ty)?;
            }
        }
        Ok(())
    }

    /// A type declaration with no definition entry of its own (sets, arrays,
    /// pointers, procedural types, aliases).
    fn plain_type_decl(
        &mut self,
        scope: ScopeId,
        unit: UnitId,
        name: &Ident,
        ty: TypeId,
    ) -> Result<(), SemanticError> {
        let decl = DeclarationBuilder::new(name.name, name.span, unit)
            .type_decl(None, 0, false)
            .ty(ty)
            .build();
        self.scopes.add_declaration(scope, decl, &self.interner)?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn register_struct(
        &mut self,
        scope: ScopeId,
        unit: UnitId,
        name: &Ident,
        type_params: &[Ident],
        skind: StructKind,
        forward: bool,
        super_expr: Option<&TypeExpr>,
        iface_exprs: &[TypeExpr],
        helper_for: Option<&TypeExpr>,
        members: &[Decl],
        pending: &mut Pending,
        out: &mut UnitAnalysis,
    ) -> Result<(), SemanticError> {
        // A completing declaration reuses the forward one's definition, so
        // pointer types interned against the forward type stay valid.
        let reused = if forward {
            None
        } else {
            self.scopes
                .scope(scope)
                .local(name.name)
                .iter()
                .map(|&id| self.scopes.decl(id))
                .find(|d| d.is_forward_type() && d.type_arity() == Some(type_params.len()))
                .and_then(|d| d.type_def())
        };

        let def_id = match reused {
            Some(def) => def,
            None => {
                let mut def = TypeDef::new(name.name, unit, TypeDefKind::Struct(skind));
                def.forward = forward;
                for param in type_params {
                    let id = self.registry.add_param(TypeParamDef {
                        name: param.name,
                        constraint: None,
                    });
                    def.type_params.push(id);
                }
                self.registry.add_def(def)
            }
        };

        let param_tys: TypeIdVec = self
            .registry
            .def(def_id)
            .type_params
            .clone()
            .into_iter()
            .map(|p| self.arena.type_param(p))
            .collect();
        let ty = self.arena.structured(skind, def_id, param_tys);

        let decl = DeclarationBuilder::new(name.name, name.span, unit)
            .type_decl(Some(def_id), type_params.len(), forward)
            .ty(ty)
            .build();
        self.scopes.add_declaration(scope, decl, &self.interner)?;
        if forward {
            return Ok(());
        }
        self.registry.def_mut(def_id).forward = false;

        let mscope = self
            .scopes
            .new_scope(ScopeKind::Type { type_def: def_id }, Some(scope));
        self.registry.def_mut(def_id).member_scope = Some(mscope);

        // Type parameters are visible to member declarations.
        let params = self.registry.def(def_id).type_params.clone();
        for param_id in params {
            let param_name = self.registry.param(param_id).name;
            let param_ty = self.arena.type_param(param_id);
            let decl = DeclarationBuilder::new(param_name, name.span, unit)
                .type_param(param_id)
                .ty(param_ty)
                .build();
            self.scopes.add_declaration_unchecked(mscope, decl);
        }

        let super_type = match super_expr {
            Some(expr) => Some(self.resolve_type_expr(mscope, expr, out)),
            None => match skind {
                StructKind::Class if ty != self.well_known.tobject => {
                    Some(self.well_known.tobject)
                }
                StructKind::Interface if ty != self.well_known.iinterface => {
                    Some(self.well_known.iinterface)
                }
                StructKind::ClassHelper => Some(self.well_known.tclass_helper_base),
                _ => None,
            },
        };
        let interfaces = iface_exprs
            .iter()
            .map(|e| self.resolve_type_expr(mscope, e, out))
            .collect();
        let d = self.registry.def_mut(def_id);
        d.super_type = super_type;
        d.interfaces = interfaces;

        if let Some(for_expr) = helper_for {
            let subject = self.resolve_type_expr(mscope, for_expr, out);
            let subject = self.arena.dealias(subject);
            self.registry.def_mut(def_id).helper_for = Some(subject);
            // The most recent helper in scope wins.
            self.registry.register_helper(subject, def_id);
        }

        for member in members {
            self.register_decl(mscope, unit, member, pending, out)?;
        }
        Ok(())
    }

    fn register_enum(
        &mut self,
        scope: ScopeId,
        unit: UnitId,
        name: &Ident,
        values: &[Ident],
    ) -> Result<(), SemanticError> {
        let def_id = self
            .registry
            .add_def(TypeDef::new(name.name, unit, TypeDefKind::Enum));
        let ty = self.arena.enum_type(def_id);
        let decl = DeclarationBuilder::new(name.name, name.span, unit)
            .type_decl(Some(def_id), 0, false)
            .ty(ty)
            .build();
        self.scopes.add_declaration(scope, decl, &self.interner)?;

        let mscope = self
            .scopes
            .new_scope(ScopeKind::Type { type_def: def_id }, Some(scope));
        self.registry.def_mut(def_id).member_scope = Some(mscope);

        for value in values {
            self.registry.def_mut(def_id).enum_values.push(value.name);
            let member = DeclarationBuilder::new(value.name, value.span, unit)
                .constant()
                .ty(ty)
                .build();
            self.scopes.add_declaration_unchecked(mscope, member);
            // Unscoped enumerations inject their values into the declaring
            // scope as well.
            let injected = DeclarationBuilder::new(value.name, value.span, unit)
                .constant()
                .ty(ty)
                .build();
            self.scopes.add_declaration(scope, injected, &self.interner)?;
        }
        Ok(())
    }

    fn register_routine(
        &mut self,
        scope: ScopeId,
        unit: UnitId,
        routine: &RoutineDecl,
        pending: &mut Pending,
        out: &mut UnitAnalysis,
    ) -> Result<(), SemanticError> {
        let params = self.resolve_params(scope, &routine.params, out);
        let in_type_scope = self.scopes.scope(scope).type_def();
        let ret = match (&routine.ret, routine.kind) {
            (Some(expr), _) => self.resolve_type_expr(scope, expr, out),
            // A constructor yields the constructed type.
            (None, RoutineKind::Constructor) => in_type_scope
                .map(|def| self.self_type(def))
                .unwrap_or(TypeId::UNKNOWN),
            (None, _) => TypeId::UNTYPED,
        };

        let routine_id = RoutineId::new(self.next_routine);
        self.next_routine += 1;
        let param_tys: TypeIdVec = params.iter().map(|p| p.ty).collect();
        let proc_ty = self
            .arena
            .procedural(param_tys, ret, in_type_scope.is_some());
        let signature = RoutineSignature {
            routine: routine_id,
            params: params.clone(),
            ret,
            is_class_method: routine.is_class_method,
            is_operator: matches!(routine.kind, RoutineKind::Operator),
        };
        let decl = DeclarationBuilder::new(routine.name.name, routine.name.span, unit)
            .routine(signature)
            .ty(proc_ty)
            .build();
        self.scopes.add_declaration(scope, decl, &self.interner)?;

        let rscope = self.scopes.new_scope(
            ScopeKind::Routine {
                routine: routine_id,
                name: routine.name.name,
            },
            Some(scope),
        );
        for param in &params {
            if let Some(p_name) = param.name {
                let decl = DeclarationBuilder::new(p_name, routine.name.span, unit)
                    .variable()
                    .ty(param.ty)
                    .build();
                self.scopes.add_declaration(rscope, decl, &self.interner)?;
            }
        }
        for local in &routine.locals {
            self.register_decl(rscope, unit, local, pending, out)?;
        }
        if !routine.body.is_empty() {
            pending.bodies.push((rscope, routine.body.clone()));
        }
        Ok(())
    }

    fn resolve_params(
        &mut self,
        scope: ScopeId,
        groups: &[Param],
        out: &mut UnitAnalysis,
    ) -> Vec<Parameter> {
        let mut params = Vec::new();
        for group in groups {
            let ty = group
                .ty
                .as_ref()
                .map(|t| self.resolve_type_expr(scope, t, out))
                .unwrap_or(TypeId::UNTYPED);
            for name in &group.names {
                params.push(Parameter {
                    name: Some(name.name),
                    ty,
                    modifier: group.modifier,
                    has_default: group.has_default,
                    intrinsic: false,
                });
            }
        }
        params
    }

    /// The self-type of a structured definition at its own parameters.
    fn self_type(&mut self, def: TypeDefId) -> TypeId {
        let d = self.registry.def(def);
        let skind = match d.kind {
            TypeDefKind::Struct(k) => k,
            TypeDefKind::Enum => return self.arena.enum_type(def),
        };
        let params = d.type_params.clone();
        let args: TypeIdVec = params.into_iter().map(|p| self.arena.type_param(p)).collect();
        self.arena.structured(skind, def, args)
    }

    // ========================================================================
    // Type expression resolution
    // ========================================================================

    /// Resolve a written type reference to a TypeId. Unresolved names yield
    /// the unknown sentinel; explicit arguments on a generic name drive
    /// specialization.
    pub fn resolve_type_expr(
        &mut self,
        scope: ScopeId,
        expr: &TypeExpr,
        out: &mut UnitAnalysis,
    ) -> TypeId {
        let args: TypeIdVec = expr
            .type_args
            .iter()
            .map(|a| self.resolve_type_expr(scope, a, out))
            .collect();

        let occurrence =
            Occurrence::new(expr.name.name, expr.name.span).with_type_args(args.clone());
        let mut resolver = Resolver::new(
            &mut self.scopes,
            &mut self.arena,
            &mut self.registry,
            self.system_scope,
        );
        let occ_id = match expr.qualifier {
            Some(qualifier) => {
                let q_occ = resolver.resolve(scope, Occurrence::new(qualifier.name, qualifier.span));
                resolver.resolve_qualified(q_occ, occurrence)
            }
            None => resolver.resolve(scope, occurrence),
        };

        let Some(decl_id) = self.scopes.occurrence(occ_id).resolved else {
            return TypeId::UNKNOWN;
        };
        let decl = self.scopes.decl(decl_id);
        let base = decl.ty;
        let generic_def = decl
            .type_def()
            .filter(|_| decl.type_arity().is_some_and(|a| a > 0));

        match generic_def {
            Some(def) if args.len() == self.registry.def(def).arity() => {
                let ctx = SpecializationContext::for_def(&self.registry, def, &args);
                let mut specializer =
                    Specializer::new(&mut self.arena, &mut self.registry, &mut self.scopes);
                specializer.specialize_def(def, &ctx)
            }
            _ => base,
        }
    }

    // ========================================================================
    // Pass 2: constants, statements and expressions
    // ========================================================================

    fn resolve_const(
        &mut self,
        scope: ScopeId,
        decl_id: DeclId,
        value: &Expr,
        out: &mut UnitAnalysis,
    ) {
        let value_ty = self.type_expr(scope, value, out);
        let declared = self.scopes.decl(decl_id).ty;
        if declared.is_unknown() {
            // Untyped constant: infer from the initializer.
            self.scopes.decl_mut(decl_id).ty = value_ty;
            return;
        }
        if let Some(lit) = literal_value(value) {
            if violates_bounds(&lit, declared, &self.arena, &self.registry) {
                out.diagnostics.push(SemanticError::ValueOutOfBounds {
                    type_image: self.arena.image(declared, &self.interner, &self.registry),
                    span: value.span().into(),
                });
            }
        }
    }

    fn analyze_stmt(&mut self, scope: ScopeId, stmt: &Stmt, out: &mut UnitAnalysis) {
        match stmt {
            Stmt::Expr(expr) => {
                self.type_expr(scope, expr, out);
            }
            Stmt::Assign { lhs, rhs } => {
                let target = self.type_expr(scope, lhs, out);
                self.type_expr(scope, rhs, out);
                if let Some(lit) = literal_value(rhs) {
                    if violates_bounds(&lit, target, &self.arena, &self.registry) {
                        out.diagnostics.push(SemanticError::ValueOutOfBounds {
                            type_image: self.arena.image(target, &self.interner, &self.registry),
                            span: rhs.span().into(),
                        });
                    }
                }
            }
            Stmt::Block(stmts) => {
                for stmt in stmts {
                    self.analyze_stmt(scope, stmt, out);
                }
            }
        }
    }

    /// Infer the type of an expression, recording node types and occurrences.
    pub fn type_expr(&mut self, scope: ScopeId, expr: &Expr, out: &mut UnitAnalysis) -> TypeId {
        let ty = match expr {
            Expr::Literal { value, .. } => self.literal_type(value),
            Expr::Name {
                node,
                name,
                type_args,
            } => self.type_name(scope, *node, name, type_args, OccurrenceFlags::NONE, out),
            Expr::Member {
                node,
                base,
                name,
                type_args,
            } => self.type_member(scope, *node, base, name, type_args, OccurrenceFlags::NONE, out),
            Expr::Call { callee, args, .. } => {
                for arg in args {
                    self.type_expr(scope, arg, out);
                }
                self.type_call(scope, callee, out)
            }
            Expr::Binary {
                op, lhs, rhs, ..
            } => self.type_binary(scope, *op, lhs, rhs, out),
            Expr::Unary { op, operand, .. } => self.type_unary(scope, *op, operand, out),
            Expr::Inherited { name, span, .. } => {
                let mut resolver = Resolver::new(
                    &mut self.scopes,
                    &mut self.arena,
                    &mut self.registry,
                    self.system_scope,
                );
                let occ = resolver.resolve_inherited(scope, name.map(|n| n.name), *span);
                out.node_occurrences.insert(expr.node(), occ);
                self.occurrence_value_type(occ, true)
            }
            Expr::SetCtor { elements, .. } => {
                let elem = elements
                    .first()
                    .map(|e| self.type_expr(scope, e, out))
                    .unwrap_or(TypeId::UNKNOWN);
                for e in elements.iter().skip(1) {
                    self.type_expr(scope, e, out);
                }
                self.arena.set_of(elem)
            }
            Expr::ArrayCtor { elements, .. } => {
                let elem = elements
                    .first()
                    .map(|e| self.type_expr(scope, e, out))
                    .unwrap_or(TypeId::UNKNOWN);
                for e in elements.iter().skip(1) {
                    self.type_expr(scope, e, out);
                }
                self.arena.array_of(elem, true)
            }
        };
        out.node_types.insert(expr.node(), ty);
        ty
    }

    fn literal_type(&self, value: &Literal) -> TypeId {
        match value {
            Literal::Int(v) => {
                // The narrowest of the default integer ladder that holds the
                // value.
                for candidate in [
                    self.intrinsics.integer,
                    self.intrinsics.int64,
                    self.intrinsics.uint64,
                ] {
                    if let Some(int) = self.arena.as_integer(candidate) {
                        if *v >= int.min && *v <= int.max {
                            return candidate;
                        }
                    }
                }
                TypeId::UNKNOWN
            }
            Literal::Real(_) => self.intrinsics.extended,
            Literal::Str(_) => self.intrinsics.string,
            Literal::Char(_) => self.intrinsics.char,
            Literal::Bool(_) => self.intrinsics.boolean,
            Literal::Nil => self.intrinsics.pointer,
        }
    }

    fn type_name(
        &mut self,
        scope: ScopeId,
        node: NodeId,
        name: &Ident,
        type_args: &[TypeExpr],
        flags: OccurrenceFlags,
        out: &mut UnitAnalysis,
    ) -> TypeId {
        let args: TypeIdVec = type_args
            .iter()
            .map(|a| self.resolve_type_expr(scope, a, out))
            .collect();
        let occurrence = Occurrence::new(name.name, name.span)
            .with_flags(flags)
            .with_type_args(args)
            .with_node(node);
        let mut resolver = Resolver::new(
            &mut self.scopes,
            &mut self.arena,
            &mut self.registry,
            self.system_scope,
        );
        let occ = resolver.resolve(scope, occurrence);
        out.node_occurrences.insert(node, occ);
        self.occurrence_value_type(occ, flags.explicit_invocation)
    }

    fn type_member(
        &mut self,
        scope: ScopeId,
        node: NodeId,
        base: &Expr,
        name: &Ident,
        type_args: &[TypeExpr],
        flags: OccurrenceFlags,
        out: &mut UnitAnalysis,
    ) -> TypeId {
        let base_ty = self.type_expr(scope, base, out);
        let args: TypeIdVec = type_args
            .iter()
            .map(|a| self.resolve_type_expr(scope, a, out))
            .collect();
        let occurrence = Occurrence::new(name.name, name.span)
            .with_flags(flags)
            .with_type_args(args)
            .with_node(node);

        let base_occ = out.node_occurrences.get(&base.node()).copied();
        let mut resolver = Resolver::new(
            &mut self.scopes,
            &mut self.arena,
            &mut self.registry,
            self.system_scope,
        );
        // A resolved base name may denote a unit or a type; qualified
        // resolution dispatches on what it was. A value expression falls back
        // to member search on its type.
        let occ = match base_occ {
            Some(q) if resolver.scopes.occurrence(q).is_resolved() => {
                resolver.resolve_qualified(q, occurrence)
            }
            _ => resolver.resolve_member(base_ty, occurrence),
        };
        out.node_occurrences.insert(node, occ);
        self.occurrence_value_type(occ, flags.explicit_invocation)
    }

    fn type_call(&mut self, scope: ScopeId, callee: &Expr, out: &mut UnitAnalysis) -> TypeId {
        let flags = OccurrenceFlags::invocation();
        match callee {
            Expr::Name {
                node,
                name,
                type_args,
            } => {
                let ty = self.type_name(scope, *node, name, type_args, flags, out);
                out.node_types.insert(*node, ty);
                ty
            }
            Expr::Member {
                node,
                base,
                name,
                type_args,
            } => {
                let ty = self.type_member(scope, *node, base, name, type_args, flags, out);
                out.node_types.insert(*node, ty);
                ty
            }
            // Calling through a procedural value.
            other => {
                let ty = self.type_expr(scope, other, out);
                self.arena
                    .unwrap_procedural(ty)
                    .map(|(_, ret, _)| ret)
                    .unwrap_or(TypeId::UNKNOWN)
            }
        }
    }

    fn type_binary(
        &mut self,
        scope: ScopeId,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        out: &mut UnitAnalysis,
    ) -> TypeId {
        let left = self.type_expr(scope, lhs, out);
        let right = self.type_expr(scope, rhs, out);
        let operator = Operator::from_binary(op);

        // `x as T` takes its type from the cast target when the left operand
        // admits the conversion at all.
        if operator == Operator::As {
            let resolver = OperatorResolver::new(
                &self.arena,
                &self.registry,
                &self.scopes,
                &self.intrinsics,
            );
            let admits = !resolver
                .candidates(operator, left, &self.interner)
                .is_empty();
            return if admits { right } else { TypeId::UNKNOWN };
        }

        let resolver = OperatorResolver::new(
            &self.arena,
            &self.registry,
            &self.scopes,
            &self.intrinsics,
        );
        match operator {
            Operator::Is | Operator::In => {
                if resolver.candidates(operator, left, &self.interner).is_empty() {
                    TypeId::UNKNOWN
                } else {
                    self.intrinsics.boolean
                }
            }
            _ => resolver
                .select_binary(operator, left, right, &self.interner)
                .map(|inv| inv.result)
                .unwrap_or(TypeId::UNKNOWN),
        }
    }

    fn type_unary(
        &mut self,
        scope: ScopeId,
        op: UnaryOp,
        operand: &Expr,
        out: &mut UnitAnalysis,
    ) -> TypeId {
        let inner = self.type_expr(scope, operand, out);
        if op == UnaryOp::AddressOf {
            // Structural: a pointer to whatever the designator denotes.
            return self.arena.pointer_to(inner);
        }
        let operator = Operator::from_unary(op);
        let resolver = OperatorResolver::new(
            &self.arena,
            &self.registry,
            &self.scopes,
            &self.intrinsics,
        );
        resolver
            .candidates(operator, inner, &self.interner)
            .into_iter()
            .next()
            .map(|inv| inv.result)
            .unwrap_or(TypeId::UNKNOWN)
    }

    /// The value type an occurrence contributes to its expression: a
    /// function's return type when invoked, otherwise the declared type.
    fn occurrence_value_type(&self, occ: OccurrenceId, invoked: bool) -> TypeId {
        let Some(decl_id) = self.scopes.occurrence(occ).resolved else {
            return TypeId::UNKNOWN;
        };
        let decl = self.scopes.decl(decl_id);
        match &decl.details {
            DeclDetails::Routine(sig) if invoked => sig.ret,
            // A function reference without arguments still invokes in this
            // language family.
            DeclDetails::Routine(sig) if !sig.ret.is_untyped() => sig.ret,
            DeclDetails::UnitImport { .. } => TypeId::UNKNOWN,
            _ => decl.ty,
        }
    }
}

/// Fold an expression into a literal value if it is one, recursing through
/// constructors and sign application.
fn literal_value(expr: &Expr) -> Option<LiteralValue> {
    match expr {
        Expr::Literal { value, .. } => Some(LiteralValue::from_literal(value)),
        Expr::Unary {
            op: UnaryOp::Negate,
            operand,
            ..
        } => match literal_value(operand)? {
            LiteralValue::Int(v) => Some(LiteralValue::Int(-v)),
            LiteralValue::Real(v) => Some(LiteralValue::Real(-v)),
            _ => None,
        },
        Expr::Unary {
            op: UnaryOp::Plus,
            operand,
            ..
        } => literal_value(operand),
        Expr::SetCtor { elements, .. } => elements
            .iter()
            .map(literal_value)
            .collect::<Option<Vec<_>>>()
            .map(LiteralValue::Set),
        Expr::ArrayCtor { elements, .. } => elements
            .iter()
            .map(literal_value)
            .collect::<Option<Vec<_>>>()
            .map(LiteralValue::Array),
        _ => None,
    }
}
