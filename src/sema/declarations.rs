// src/sema/declarations.rs
//
// Declarations: named, positioned entities that name occurrences resolve to.
//
// A Declaration is assembled by DeclarationBuilder while its scope is being
// populated and frozen on insert. Back-references that accrue later (forward
// completion links, usage lists) live in the ScopeArena, not here, so the
// frozen value stays immutable and safe to read across workers.

use crate::frontend::{ParamModifier, Span, Symbol};
use crate::identity::{RoutineId, ScopeId, TypeDefId, TypeParamId, UnitId};
use crate::sema::type_arena::TypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Variable,
    Constant,
    Type,
    Routine,
    Property,
    Unit,
    UnitImport,
    TypeParam,
}

/// A formal parameter of a routine signature.
///
/// Equality is case-insensitive name (Symbols already fold case) plus type
/// and modifier. Whether the parameter came from user source or from a
/// compiler intrinsic is deliberately not part of equality or hashing.
#[derive(Debug, Clone, Eq)]
pub struct Parameter {
    /// None for unnamed placeholder parameters in intrinsic signatures.
    pub name: Option<Symbol>,
    pub ty: TypeId,
    pub modifier: ParamModifier,
    pub has_default: bool,
    /// Compiler-provided rather than user-written. Excluded from equality.
    pub intrinsic: bool,
}

impl Parameter {
    pub fn new(name: Option<Symbol>, ty: TypeId) -> Self {
        Self {
            name,
            ty,
            modifier: ParamModifier::Value,
            has_default: false,
            intrinsic: false,
        }
    }
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.ty == other.ty
            && self.modifier == other.modifier
            && self.has_default == other.has_default
    }
}

// Manual Hash to match PartialEq semantics - ignore intrinsic origin.
impl std::hash::Hash for Parameter {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.ty.hash(state);
        self.modifier.hash(state);
        self.has_default.hash(state);
    }
}

/// Signature details of a routine declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineSignature {
    pub routine: RoutineId,
    pub params: Vec<Parameter>,
    /// `TypeId::UNTYPED` for procedures.
    pub ret: TypeId,
    pub is_class_method: bool,
    pub is_operator: bool,
}

impl RoutineSignature {
    /// Overload compatibility: two same-named routines coexist only when
    /// their parameter lists differ by count or by some parameter type.
    pub fn same_parameter_types(&self, other: &RoutineSignature) -> bool {
        self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.ty == b.ty)
    }
}

/// Kind-specific payload of a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclDetails {
    Variable,
    Constant,
    Type {
        /// `None` for intrinsic scalar types, which have no definition entry.
        type_def: Option<TypeDefId>,
        arity: usize,
        forward: bool,
    },
    Routine(RoutineSignature),
    Property,
    Unit,
    UnitImport {
        /// The imported unit's scope, when the search path resolved it.
        scope: Option<ScopeId>,
    },
    TypeParam(TypeParamId),
}

/// A frozen declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: Symbol,
    pub span: Span,
    pub unit: UnitId,
    pub ty: TypeId,
    /// Compiler-provided (System scope) rather than user-written.
    pub intrinsic: bool,
    pub details: DeclDetails,
}

impl Declaration {
    pub fn kind(&self) -> DeclKind {
        match &self.details {
            DeclDetails::Variable => DeclKind::Variable,
            DeclDetails::Constant => DeclKind::Constant,
            DeclDetails::Type { .. } => DeclKind::Type,
            DeclDetails::Routine(_) => DeclKind::Routine,
            DeclDetails::Property => DeclKind::Property,
            DeclDetails::Unit => DeclKind::Unit,
            DeclDetails::UnitImport { .. } => DeclKind::UnitImport,
            DeclDetails::TypeParam(_) => DeclKind::TypeParam,
        }
    }

    pub fn is_routine(&self) -> bool {
        matches!(self.details, DeclDetails::Routine(_))
    }

    pub fn as_routine(&self) -> Option<&RoutineSignature> {
        match &self.details {
            DeclDetails::Routine(sig) => Some(sig),
            _ => None,
        }
    }

    pub fn type_def(&self) -> Option<TypeDefId> {
        match &self.details {
            DeclDetails::Type { type_def, .. } => *type_def,
            _ => None,
        }
    }

    /// Generic arity for type declarations, `None` otherwise.
    pub fn type_arity(&self) -> Option<usize> {
        match &self.details {
            DeclDetails::Type { arity, .. } => Some(*arity),
            _ => None,
        }
    }

    pub fn is_forward_type(&self) -> bool {
        matches!(self.details, DeclDetails::Type { forward: true, .. })
    }

    /// Whether two declarations denote the same symbol: same folded name and
    /// matching kind, with routine signatures compared structurally. Generic
    /// type declarations of differing arity never denote the same symbol.
    pub fn denotes_same_symbol(&self, other: &Declaration) -> bool {
        if self.name != other.name || self.kind() != other.kind() {
            return false;
        }
        match (&self.details, &other.details) {
            (DeclDetails::Routine(a), DeclDetails::Routine(b)) => a.same_parameter_types(b),
            (DeclDetails::Type { arity: a, .. }, DeclDetails::Type { arity: b, .. }) => a == b,
            _ => true,
        }
    }
}

/// Builder stage for declarations: mutable while a scope is being populated,
/// yielding the immutable value on `build`.
#[derive(Debug)]
pub struct DeclarationBuilder {
    name: Symbol,
    span: Span,
    unit: UnitId,
    ty: TypeId,
    intrinsic: bool,
    details: DeclDetails,
}

impl DeclarationBuilder {
    pub fn new(name: Symbol, span: Span, unit: UnitId) -> Self {
        Self {
            name,
            span,
            unit,
            ty: TypeId::UNKNOWN,
            intrinsic: false,
            details: DeclDetails::Variable,
        }
    }

    pub fn ty(mut self, ty: TypeId) -> Self {
        self.ty = ty;
        self
    }

    pub fn intrinsic(mut self) -> Self {
        self.intrinsic = true;
        self
    }

    pub fn variable(mut self) -> Self {
        self.details = DeclDetails::Variable;
        self
    }

    pub fn constant(mut self) -> Self {
        self.details = DeclDetails::Constant;
        self
    }

    pub fn type_decl(mut self, type_def: Option<TypeDefId>, arity: usize, forward: bool) -> Self {
        self.details = DeclDetails::Type {
            type_def,
            arity,
            forward,
        };
        self
    }

    pub fn routine(mut self, signature: RoutineSignature) -> Self {
        self.details = DeclDetails::Routine(signature);
        self
    }

    pub fn property(mut self) -> Self {
        self.details = DeclDetails::Property;
        self
    }

    pub fn unit(mut self) -> Self {
        self.details = DeclDetails::Unit;
        self
    }

    pub fn unit_import(mut self, scope: Option<ScopeId>) -> Self {
        self.details = DeclDetails::UnitImport { scope };
        self
    }

    pub fn type_param(mut self, param: TypeParamId) -> Self {
        self.details = DeclDetails::TypeParam(param);
        self
    }

    pub fn build(self) -> Declaration {
        Declaration {
            name: self.name,
            span: self.span,
            unit: self.unit,
            ty: self.ty,
            intrinsic: self.intrinsic,
            details: self.details,
        }
    }
}
