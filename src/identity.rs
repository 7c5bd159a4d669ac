// src/identity.rs
//
// First-class identity types for language entities.
//
// These are u32 handles into the per-analysis arenas and registries. Using
// distinct newtypes prevents mix-ups between entity kinds (a TypeDefId is not
// a RoutineId) and keeps every cross-reference Copy + trivially hashable.

/// Identity for a type definition (class, record, interface, helper, enum).
///
/// Distinct from `TypeId`: a TypeDefId identifies the *definition* (e.g.
/// `TList<T>`), while a TypeId identifies a concrete type value (e.g.
/// `TList<Integer>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDefId(u32);

impl TypeDefId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Identity for a routine (procedure, function, constructor, destructor,
/// class operator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoutineId(u32);

impl RoutineId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Identity for a generic type parameter (e.g. T in `TList<T>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeParamId(u32);

impl TypeParamId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Identity for one translation unit in the current analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitId(u32);

impl UnitId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }

    /// The distinguished id for the System unit (owner of the System scope).
    pub const SYSTEM: UnitId = UnitId(0);
}

/// Identity for a lexical scope in the ScopeArena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Identity for a declaration stored in the ScopeArena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclId(u32);

impl DeclId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Identity for a name occurrence recorded during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OccurrenceId(u32);

impl OccurrenceId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}
