// src/sema/scope.rs
//
// Lexical scope tree over shared declaration and occurrence storage.
//
// Scope kind is a closed tagged variant (system / unit / type / routine /
// block) rather than an inheritance ladder; kind-specific behavior such as
// import lists or the "is System scope" test is an explicit field or method.
// The arena owns every scope, declaration and occurrence for one analysis,
// so cross-references are plain ids.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::errors::SemanticError;
use crate::frontend::{Interner, Symbol};
use crate::identity::{DeclId, OccurrenceId, RoutineId, ScopeId, TypeDefId, UnitId};
use crate::sema::declarations::{DeclDetails, Declaration};
use crate::sema::resolve::Occurrence;

#[derive(Debug, Clone, PartialEq)]
pub enum ScopeKind {
    /// The distinguished, pre-populated root shared by every unit.
    System,
    /// A unit (file) scope; owns the import list in declared order.
    Unit {
        unit: UnitId,
        imports: Vec<DeclId>,
    },
    /// Member scope of a structured type.
    Type { type_def: TypeDefId },
    Routine { routine: RoutineId, name: Symbol },
    Block,
}

#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    decls: Vec<DeclId>,
    by_name: FxHashMap<Symbol, SmallVec<[DeclId; 2]>>,
    frozen: bool,
}

impl Scope {
    pub fn is_system(&self) -> bool {
        matches!(self.kind, ScopeKind::System)
    }

    pub fn is_unit(&self) -> bool {
        matches!(self.kind, ScopeKind::Unit { .. })
    }

    pub fn type_def(&self) -> Option<TypeDefId> {
        match self.kind {
            ScopeKind::Type { type_def } => Some(type_def),
            _ => None,
        }
    }

    /// Import declarations in declared order; empty for non-unit scopes.
    pub fn imports(&self) -> &[DeclId] {
        match &self.kind {
            ScopeKind::Unit { imports, .. } => imports,
            _ => &[],
        }
    }

    pub fn declarations(&self) -> &[DeclId] {
        &self.decls
    }

    /// Declarations with the given (case-folded) name in this scope only.
    pub fn local(&self, name: Symbol) -> &[DeclId] {
        self.by_name.get(&name).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
    decls: Vec<Declaration>,
    occurrences: Vec<Occurrence>,
    /// Occurrences that resolved to each declaration.
    usages: FxHashMap<DeclId, Vec<OccurrenceId>>,
    /// Forward declaration -> completing declaration.
    forward_links: FxHashMap<DeclId, DeclId>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId::new(self.scopes.len() as u32);
        self.scopes.push(Scope {
            kind,
            parent,
            decls: Vec::new(),
            by_name: FxHashMap::default(),
            frozen: false,
        });
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index() as usize]
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index() as usize]
    }

    pub fn decl(&self, id: DeclId) -> &Declaration {
        &self.decls[id.index() as usize]
    }

    /// Patch a declaration in place. The analyzer fills in resolved types
    /// after the declaring scope was populated.
    pub fn decl_mut(&mut self, id: DeclId) -> &mut Declaration {
        &mut self.decls[id.index() as usize]
    }

    /// Freeze a scope; further registration is a fatal error. Used for the
    /// System scope once the toolchain universe is built.
    pub fn freeze(&mut self, id: ScopeId) {
        self.scope_mut(id).frozen = true;
    }

    /// Register a declaration into a scope, enforcing the conflict rules:
    /// a new declaration conflicts with an existing same-named one unless it
    /// completes a forward-declared structured type, differs in generic
    /// arity, or is a routine overload with a distinct parameter list.
    /// Conflicts are raised immediately; silent acceptance would corrupt
    /// every later lookup in this scope.
    pub fn add_declaration(
        &mut self,
        scope: ScopeId,
        decl: Declaration,
        interner: &Interner,
    ) -> Result<DeclId, SemanticError> {
        if self.scope(scope).frozen {
            return Err(SemanticError::FrozenScope {
                scope: interner.resolve(decl.name).to_string(),
            });
        }

        let mut completes_forward = None;
        for &existing_id in self.scope(scope).local(decl.name) {
            let existing = self.decl(existing_id);
            match Self::disposition(existing, &decl) {
                Disposition::Allowed => {}
                Disposition::CompletesForward => completes_forward = Some(existing_id),
                Disposition::Conflict => {
                    return Err(SemanticError::DeclarationConflict {
                        name: interner.resolve(decl.name).to_string(),
                        span: decl.span.into(),
                        previous: existing.span.into(),
                    });
                }
            }
        }

        let name = decl.name;
        let id = DeclId::new(self.decls.len() as u32);
        self.decls.push(decl);
        let s = self.scope_mut(scope);
        s.decls.push(id);
        s.by_name.entry(name).or_default().push(id);

        if let Some(forward) = completes_forward {
            self.forward_links.insert(forward, id);
        }
        Ok(id)
    }

    fn disposition(existing: &Declaration, new: &Declaration) -> Disposition {
        match (&existing.details, &new.details) {
            (
                DeclDetails::Type {
                    arity: prev_arity,
                    forward,
                    ..
                },
                DeclDetails::Type {
                    arity: new_arity,
                    forward: new_forward,
                    ..
                },
            ) => {
                // Generic declarations of differing arity are never
                // duplicates of each other.
                if prev_arity != new_arity {
                    Disposition::Allowed
                } else if *forward && !*new_forward {
                    Disposition::CompletesForward
                } else {
                    Disposition::Conflict
                }
            }
            (DeclDetails::Routine(prev), DeclDetails::Routine(new_sig)) => {
                if prev.same_parameter_types(new_sig) {
                    Disposition::Conflict
                } else {
                    Disposition::Allowed
                }
            }
            // A variable and a type (or any other mixed pairing) sharing a
            // name always conflicts.
            _ => Disposition::Conflict,
        }
    }

    /// Insert without conflict checking. Only for declarations copied from an
    /// already-validated scope, such as specialized generic members.
    pub fn add_declaration_unchecked(&mut self, scope: ScopeId, decl: Declaration) -> DeclId {
        let name = decl.name;
        let id = DeclId::new(self.decls.len() as u32);
        self.decls.push(decl);
        let s = self.scope_mut(scope);
        s.decls.push(id);
        s.by_name.entry(name).or_default().push(id);
        id
    }

    /// Record an import declaration into a unit scope's declared-order list.
    pub fn add_import(&mut self, scope: ScopeId, import: DeclId) {
        if let ScopeKind::Unit { imports, .. } = &mut self.scope_mut(scope).kind {
            imports.push(import);
        }
    }

    /// The completing declaration for a forward declaration, once seen.
    pub fn forward_completion(&self, decl: DeclId) -> Option<DeclId> {
        self.forward_links.get(&decl).copied()
    }

    // ========================================================================
    // Occurrence storage
    // ========================================================================

    pub fn add_occurrence(&mut self, occurrence: Occurrence) -> OccurrenceId {
        let id = OccurrenceId::new(self.occurrences.len() as u32);
        if let Some(decl) = occurrence.resolved {
            self.usages.entry(decl).or_default().push(id);
        }
        self.occurrences.push(occurrence);
        id
    }

    pub fn occurrence(&self, id: OccurrenceId) -> &Occurrence {
        &self.occurrences[id.index() as usize]
    }

    /// Occurrences that resolved to a declaration.
    pub fn usages(&self, decl: DeclId) -> &[OccurrenceId] {
        self.usages.get(&decl).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Whether a resolved occurrence points at a declaration of this scope.
    pub fn contains(&self, scope: ScopeId, occurrence: &Occurrence) -> bool {
        match occurrence.resolved {
            Some(decl) => self.scope(scope).decls.contains(&decl),
            None => false,
        }
    }

    /// Walk a scope and its ancestors, innermost first.
    pub fn chain(&self, from: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        let mut current = Some(from);
        std::iter::from_fn(move || {
            let id = current?;
            current = self.scope(id).parent;
            Some(id)
        })
    }
}

enum Disposition {
    Allowed,
    CompletesForward,
    Conflict,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Span;
    use crate::sema::declarations::DeclarationBuilder;
    use crate::sema::type_arena::TypeId;

    fn setup() -> (ScopeArena, Interner, ScopeId) {
        let mut scopes = ScopeArena::new();
        let unit = scopes.new_scope(
            ScopeKind::Unit {
                unit: UnitId::new(1),
                imports: Vec::new(),
            },
            None,
        );
        (scopes, Interner::new(), unit)
    }

    fn var(name: Symbol) -> Declaration {
        DeclarationBuilder::new(name, Span::default(), UnitId::new(1))
            .variable()
            .ty(TypeId::UNKNOWN)
            .build()
    }

    fn class_decl(name: Symbol, arity: usize, forward: bool) -> Declaration {
        DeclarationBuilder::new(name, Span::default(), UnitId::new(1))
            .type_decl(Some(TypeDefId::new(0)), arity, forward)
            .build()
    }

    #[test]
    fn added_declaration_is_listed() {
        let (mut scopes, mut interner, unit) = setup();
        let foo = interner.intern("Foo");
        let id = scopes.add_declaration(unit, var(foo), &interner).unwrap();
        assert!(scopes.scope(unit).declarations().contains(&id));
        assert_eq!(scopes.scope(unit).local(foo), &[id]);
    }

    #[test]
    fn variable_then_type_conflicts() {
        let (mut scopes, mut interner, unit) = setup();
        let foo = interner.intern("Foo");
        scopes.add_declaration(unit, var(foo), &interner).unwrap();
        let err = scopes
            .add_declaration(unit, class_decl(foo, 0, false), &interner)
            .unwrap_err();
        assert!(matches!(err, SemanticError::DeclarationConflict { .. }));
    }

    #[test]
    fn conflict_is_case_insensitive() {
        let (mut scopes, mut interner, unit) = setup();
        let foo = interner.intern("Foo");
        let foo_upper = interner.intern("FOO");
        scopes.add_declaration(unit, var(foo), &interner).unwrap();
        assert!(scopes
            .add_declaration(unit, var(foo_upper), &interner)
            .is_err());
    }

    #[test]
    fn forward_completion_does_not_conflict() {
        let (mut scopes, mut interner, unit) = setup();
        let bar = interner.intern("Bar");
        let fwd = scopes
            .add_declaration(unit, class_decl(bar, 0, true), &interner)
            .unwrap();
        let full = scopes
            .add_declaration(unit, class_decl(bar, 0, false), &interner)
            .unwrap();
        assert_eq!(scopes.forward_completion(fwd), Some(full));
        // A second full declaration does conflict.
        assert!(scopes
            .add_declaration(unit, class_decl(bar, 0, false), &interner)
            .is_err());
    }

    #[test]
    fn differing_generic_arity_coexists_but_same_arity_conflicts() {
        let (mut scopes, mut interner, unit) = setup();
        let bar = interner.intern("Bar");
        scopes
            .add_declaration(unit, class_decl(bar, 0, false), &interner)
            .unwrap();
        scopes
            .add_declaration(unit, class_decl(bar, 1, false), &interner)
            .unwrap();
        assert!(scopes
            .add_declaration(unit, class_decl(bar, 1, false), &interner)
            .is_err());
    }

    #[test]
    fn frozen_scope_rejects_registration() {
        let (mut scopes, mut interner, unit) = setup();
        let foo = interner.intern("Foo");
        scopes.freeze(unit);
        let err = scopes.add_declaration(unit, var(foo), &interner).unwrap_err();
        assert!(matches!(err, SemanticError::FrozenScope { .. }));
    }
}
