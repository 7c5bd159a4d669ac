// src/sema/resolve.rs
//
// Name occurrence resolution.
//
// Each name use searches scopes innermost-to-outermost, then the unit's
// imports in declared order, then the System scope. The in-chain part of the
// search is "shallow": it never looks through imports, so a later, closer
// declaration correctly shadows an imported one. Qualified names resolve
// their first segment normally and every later segment inside the type scope
// of the previous segment's resolved type. Binding failures are tolerated -
// the occurrence is simply left unresolved.

use crate::frontend::{NodeId, Span, Symbol};
use crate::identity::{DeclId, OccurrenceId, ScopeId, TypeDefId};
use crate::sema::declarations::DeclDetails;
use crate::sema::generic::{SpecializationContext, Specializer};
use crate::sema::registry::TypeRegistry;
use crate::sema::scope::{ScopeArena, ScopeKind};
use crate::sema::type_arena::{TypeArena, TypeId, TypeIdVec};
use crate::sema::types::Ty;

/// Flags a name occurrence carries from its syntactic context; they narrow
/// what a lookup may match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OccurrenceFlags {
    /// The name is followed by an argument list.
    pub explicit_invocation: bool,
    /// The name is referenced as a method (e.g. `@TFoo.Bar`); only routine
    /// declarations match.
    pub method_reference: bool,
    /// The name carries explicit type arguments; only declarations of
    /// matching arity match.
    pub generic_instantiation: bool,
    /// The name appears in an attribute position.
    pub attribute_reference: bool,
}

impl OccurrenceFlags {
    pub const NONE: OccurrenceFlags = OccurrenceFlags {
        explicit_invocation: false,
        method_reference: false,
        generic_instantiation: false,
        attribute_reference: false,
    };

    pub fn invocation() -> Self {
        Self {
            explicit_invocation: true,
            ..Self::NONE
        }
    }

    pub fn method_reference() -> Self {
        Self {
            method_reference: true,
            ..Self::NONE
        }
    }

    pub fn attribute() -> Self {
        Self {
            attribute_reference: true,
            ..Self::NONE
        }
    }
}

/// A reference at a source location to a name. Once resolved it carries the
/// bound declaration and any supplied type arguments; qualified names form a
/// short chain through `qualifier`.
#[derive(Debug, Clone)]
pub struct Occurrence {
    pub name: Symbol,
    pub span: Span,
    pub flags: OccurrenceFlags,
    pub type_args: TypeIdVec,
    pub qualifier: Option<OccurrenceId>,
    pub resolved: Option<DeclId>,
    pub node: Option<NodeId>,
}

impl Occurrence {
    pub fn new(name: Symbol, span: Span) -> Self {
        Self {
            name,
            span,
            flags: OccurrenceFlags::NONE,
            type_args: TypeIdVec::new(),
            qualifier: None,
            resolved: None,
            node: None,
        }
    }

    pub fn with_flags(mut self, flags: OccurrenceFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_type_args(mut self, type_args: TypeIdVec) -> Self {
        if !type_args.is_empty() {
            self.flags.generic_instantiation = true;
        }
        self.type_args = type_args;
        self
    }

    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }
}

/// Binds occurrences to declarations for one unit's analysis.
pub struct Resolver<'a> {
    pub scopes: &'a mut ScopeArena,
    pub arena: &'a mut TypeArena,
    pub registry: &'a mut TypeRegistry,
    pub system_scope: ScopeId,
}

impl<'a> Resolver<'a> {
    pub fn new(
        scopes: &'a mut ScopeArena,
        arena: &'a mut TypeArena,
        registry: &'a mut TypeRegistry,
        system_scope: ScopeId,
    ) -> Self {
        Self {
            scopes,
            arena,
            registry,
            system_scope,
        }
    }

    /// Resolve an unqualified occurrence from the given scope and record it.
    pub fn resolve(&mut self, from: ScopeId, mut occurrence: Occurrence) -> OccurrenceId {
        occurrence.resolved = self.search(from, &occurrence);
        if occurrence.resolved.is_none() {
            tracing::trace!(name = ?occurrence.name, "unresolved occurrence");
        }
        self.scopes.add_occurrence(occurrence)
    }

    /// Resolve a qualified segment inside the scope of the previous
    /// segment's resolution, and record it.
    pub fn resolve_qualified(
        &mut self,
        qualifier: OccurrenceId,
        mut occurrence: Occurrence,
    ) -> OccurrenceId {
        occurrence.qualifier = Some(qualifier);
        occurrence.resolved = self
            .scopes
            .occurrence(qualifier)
            .resolved
            .and_then(|base| self.search_member_of_decl(base, &occurrence));
        self.scopes.add_occurrence(occurrence)
    }

    /// Resolve a member occurrence against a value of the given type.
    pub fn resolve_member(&mut self, base: TypeId, mut occurrence: Occurrence) -> OccurrenceId {
        occurrence.resolved = self.search_member(base, &occurrence);
        self.scopes.add_occurrence(occurrence)
    }

    /// Resolve a bare or named `inherited` from inside a method body: the
    /// search dispatches into the enclosing type's super-type rather than
    /// through ordinary lookup.
    pub fn resolve_inherited(
        &mut self,
        from: ScopeId,
        name: Option<Symbol>,
        span: Span,
    ) -> OccurrenceId {
        let mut enclosing_type = None;
        let mut enclosing_routine = None;
        for scope_id in self.scopes.chain(from) {
            match &self.scopes.scope(scope_id).kind {
                ScopeKind::Routine { name, .. } if enclosing_routine.is_none() => {
                    enclosing_routine = Some(*name);
                }
                ScopeKind::Type { type_def } => {
                    enclosing_type = Some(*type_def);
                    break;
                }
                _ => {}
            }
        }

        // A bare `inherited` names the enclosing routine itself.
        let target_name = name.or(enclosing_routine);
        let mut occurrence = match target_name {
            Some(n) => Occurrence::new(n, span),
            None => {
                let mut occ = Occurrence::new(Symbol(u32::MAX), span);
                occ.resolved = None;
                return self.scopes.add_occurrence(occ);
            }
        };

        occurrence.resolved = enclosing_type
            .and_then(|def| self.registry.def(def).super_type)
            .and_then(|sup| self.search_member(sup, &occurrence));
        self.scopes.add_occurrence(occurrence)
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Full unqualified search: shallow chain, imports in declared order,
    /// then the System scope.
    pub fn search(&mut self, from: ScopeId, occurrence: &Occurrence) -> Option<DeclId> {
        if let Some(found) = self.shallow_search(from, occurrence) {
            return Some(found);
        }

        // The nearest enclosing unit scope contributes its imports.
        let unit_scope = self
            .scopes
            .chain(from)
            .find(|&s| self.scopes.scope(s).is_unit());
        if let Some(unit_scope) = unit_scope {
            let imports: Vec<DeclId> = self.scopes.scope(unit_scope).imports().to_vec();
            for import in imports {
                let target = match &self.scopes.decl(import).details {
                    DeclDetails::UnitImport { scope: Some(s) } => *s,
                    _ => continue,
                };
                if let Some(found) = self.find_in_scope(target, occurrence) {
                    return Some(found);
                }
            }
        }

        self.find_in_scope(self.system_scope, occurrence)
    }

    /// Chain-only search that skips imports; detects same-file declarations
    /// before import resolution broadens the search.
    pub fn shallow_search(&self, from: ScopeId, occurrence: &Occurrence) -> Option<DeclId> {
        self.scopes
            .chain(from)
            .collect::<Vec<_>>()
            .into_iter()
            .find_map(|scope| self.find_in_scope(scope, occurrence))
    }

    /// Matching declarations from one scope only, filtered by occurrence
    /// flags.
    pub fn find_in_scope(&self, scope: ScopeId, occurrence: &Occurrence) -> Option<DeclId> {
        self.scopes
            .scope(scope)
            .local(occurrence.name)
            .iter()
            .copied()
            .find(|&id| self.matches_flags(id, occurrence))
    }

    fn matches_flags(&self, id: DeclId, occurrence: &Occurrence) -> bool {
        let decl = self.scopes.decl(id);
        if occurrence.flags.method_reference && !decl.is_routine() {
            return false;
        }
        // An attribute position names a class; only type declarations match.
        if occurrence.flags.attribute_reference
            && !matches!(decl.details, DeclDetails::Type { .. })
        {
            return false;
        }
        if occurrence.flags.generic_instantiation {
            return decl.type_arity() == Some(occurrence.type_args.len());
        }
        // A non-generic occurrence must not bind a generic-only declaration.
        if let Some(arity) = decl.type_arity() {
            if arity != 0 && occurrence.type_args.is_empty() {
                return false;
            }
        }
        true
    }

    /// Member search against a type: the active helper scope first, then the
    /// type's own members, then the super-type chain.
    fn search_member(&mut self, base: TypeId, occurrence: &Occurrence) -> Option<DeclId> {
        let base = self.arena.dealias(base);
        if let Some(helper) = self.registry.helper_for(base) {
            if let Some(scope) = self.registry.def(helper).member_scope {
                if let Some(found) = self.find_in_scope(scope, occurrence) {
                    return Some(found);
                }
            }
        }

        match self.arena.get(base).clone() {
            Ty::Struct {
                type_def,
                type_args,
                ..
            } => {
                let def = self.instantiated_def(type_def, &type_args);
                self.search_member_scopes(def, occurrence)
            }
            Ty::Enum { type_def } => {
                let scope = self.registry.def(type_def).member_scope?;
                self.find_in_scope(scope, occurrence)
            }
            _ => None,
        }
    }

    /// Map a generic definition plus concrete arguments onto its specialized
    /// definition, so member lookup sees substituted member types.
    fn instantiated_def(&mut self, def: TypeDefId, type_args: &[TypeId]) -> TypeDefId {
        if type_args.is_empty() || !self.registry.def(def).is_generic() {
            return def;
        }
        let ctx = SpecializationContext::for_def(self.registry, def, type_args);
        let mut specializer = Specializer::new(self.arena, self.registry, self.scopes);
        let specialized = specializer.specialize_def(def, &ctx);
        self.arena.type_def_id(specialized).unwrap_or(def)
    }

    /// Walk a definition's member scope and its super chain.
    fn search_member_scopes(
        &mut self,
        mut def: TypeDefId,
        occurrence: &Occurrence,
    ) -> Option<DeclId> {
        loop {
            if let Some(scope) = self.registry.def(def).member_scope {
                if let Some(found) = self.find_in_scope(scope, occurrence) {
                    return Some(found);
                }
            }
            let sup = self.registry.def(def).super_type?;
            def = self.arena.type_def_id(sup)?;
        }
    }

    /// Member search when the qualifier resolved to a declaration: unit
    /// imports open the imported unit's scope, type declarations open the
    /// type's member scope, anything else searches the value's type.
    fn search_member_of_decl(&mut self, base: DeclId, occurrence: &Occurrence) -> Option<DeclId> {
        let decl = self.scopes.decl(base);
        match &decl.details {
            DeclDetails::UnitImport { scope: Some(s) } => self.find_in_scope(*s, occurrence),
            DeclDetails::UnitImport { scope: None } => None,
            DeclDetails::Type { .. } => {
                let ty = decl.ty;
                self.search_member(ty, occurrence)
            }
            _ => {
                let ty = decl.ty;
                self.search_member(ty, occurrence)
            }
        }
    }
}
