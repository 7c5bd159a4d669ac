// src/sema/types/mod.rs
//
// Core type model for the Pascal semantic analyzer.
//
// Types are canonical, immutable values stored in the TypeArena and handled
// through TypeId. This module defines the stored representation:
// - `Ty` - the interned type value, one variant per type category
// - `TypeKind` - the closed kind tag used for dispatch and diagnostics
// - `IntegerType` - integer attributes (byte width, signedness, exact bounds)
// - `StructKind` - class/record/interface/helper discrimination

use crate::frontend::Symbol;
use crate::identity::{TypeDefId, TypeParamId};
use crate::sema::type_arena::{TypeId, TypeIdVec};

/// The closed set of type categories. Every `Ty` maps to exactly one kind;
/// dispatch on kind is how the operator table and bounds checker stay total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Integer,
    Real,
    Boolean,
    Char,
    String,
    Enum,
    Set,
    Array,
    Class,
    Record,
    Interface,
    Helper,
    Pointer,
    Procedural,
    Variant,
    TypeParam,
    Alias,
    Unknown,
    Untyped,
}

impl TypeKind {
    /// Canonical kind name for diagnostics and internal errors.
    pub fn image(self) -> &'static str {
        match self {
            TypeKind::Integer => "Integer",
            TypeKind::Real => "Real",
            TypeKind::Boolean => "Boolean",
            TypeKind::Char => "Char",
            TypeKind::String => "String",
            TypeKind::Enum => "Enumeration",
            TypeKind::Set => "Set",
            TypeKind::Array => "Array",
            TypeKind::Class => "Class",
            TypeKind::Record => "Record",
            TypeKind::Interface => "Interface",
            TypeKind::Helper => "Helper",
            TypeKind::Pointer => "Pointer",
            TypeKind::Procedural => "Procedural",
            TypeKind::Variant => "Variant",
            TypeKind::TypeParam => "TypeParameter",
            TypeKind::Alias => "Alias",
            TypeKind::Unknown => "Unknown",
            TypeKind::Untyped => "Untyped",
        }
    }
}

/// Structured-type discrimination for the `Ty::Struct` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructKind {
    Class,
    Record,
    Interface,
    ClassHelper,
    RecordHelper,
}

impl StructKind {
    pub fn type_kind(self) -> TypeKind {
        match self {
            StructKind::Class => TypeKind::Class,
            StructKind::Record => TypeKind::Record,
            StructKind::Interface => TypeKind::Interface,
            StructKind::ClassHelper | StructKind::RecordHelper => TypeKind::Helper,
        }
    }

    pub fn is_helper(self) -> bool {
        matches!(self, StructKind::ClassHelper | StructKind::RecordHelper)
    }
}

/// Integer type attributes. Bounds derive from byte width and signedness:
/// `capacity = 256^size - 1`; unsigned types span `0..capacity`, signed types
/// split the capacity with the negative bound rounded up and the positive
/// bound rounded down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegerType {
    pub name: Symbol,
    pub size: u8,
    pub signed: bool,
    pub min: i128,
    pub max: i128,
}

impl IntegerType {
    /// Compute bounds from width and signedness. Widths above 8 bytes are a
    /// factory configuration bug, not user data.
    pub fn new(name: Symbol, size: u8, signed: bool) -> Self {
        assert!(
            (1..=8).contains(&size),
            "INTERNAL ERROR: integer width {} out of range",
            size
        );
        let capacity: i128 = (1i128 << (8 * size as u32)) - 1;
        let (min, max) = if signed {
            (-((capacity + 1) / 2), capacity / 2)
        } else {
            (0, capacity)
        };
        Self {
            name,
            size,
            signed,
            min,
            max,
        }
    }

    pub fn is_signed(&self) -> bool {
        self.min != 0
    }

    /// Sum of the absolute bound differences; ranks otherwise-ambiguous
    /// overload candidates (closer ranges win).
    pub fn ordinal_distance(&self, other: &IntegerType) -> u128 {
        self.min.abs_diff(other.min) + self.max.abs_diff(other.max)
    }
}

/// The canonical interned type value. Child types are TypeId handles so
/// equality and hashing stay O(1) per node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    /// Sentinel for failed inference; unequal to every concrete type.
    Unknown,
    /// The untyped sentinel (untyped parameters, untyped pointer targets).
    Untyped,
    Variant,
    Integer(IntegerType),
    Real {
        name: Symbol,
        size: u8,
    },
    Boolean {
        name: Symbol,
        size: u8,
    },
    Char {
        name: Symbol,
        size: u8,
    },
    String {
        name: Symbol,
        char_size: u8,
    },
    Enum {
        type_def: TypeDefId,
    },
    Set {
        element: TypeId,
    },
    Array {
        element: TypeId,
        dynamic: bool,
    },
    Struct {
        kind: StructKind,
        type_def: TypeDefId,
        type_args: TypeIdVec,
    },
    Pointer {
        /// `TypeId::UNTYPED` for the untyped `Pointer` type.
        target: TypeId,
    },
    Procedural {
        params: TypeIdVec,
        ret: TypeId,
        of_object: bool,
    },
    TypeParam(TypeParamId),
    Alias {
        name: Symbol,
        aliased: TypeId,
        /// `type X = type Y` creates a distinct type; `type X = Y` does not.
        strong: bool,
    },
}

impl Ty {
    pub fn kind(&self) -> TypeKind {
        match self {
            Ty::Unknown => TypeKind::Unknown,
            Ty::Untyped => TypeKind::Untyped,
            Ty::Variant => TypeKind::Variant,
            Ty::Integer(_) => TypeKind::Integer,
            Ty::Real { .. } => TypeKind::Real,
            Ty::Boolean { .. } => TypeKind::Boolean,
            Ty::Char { .. } => TypeKind::Char,
            Ty::String { .. } => TypeKind::String,
            Ty::Enum { .. } => TypeKind::Enum,
            Ty::Set { .. } => TypeKind::Set,
            Ty::Array { .. } => TypeKind::Array,
            Ty::Struct { kind, .. } => kind.type_kind(),
            Ty::Pointer { .. } => TypeKind::Pointer,
            Ty::Procedural { .. } => TypeKind::Procedural,
            Ty::TypeParam(_) => TypeKind::TypeParam,
            Ty::Alias { .. } => TypeKind::Alias,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_bounds_from_width() {
        let name = Symbol(0);
        // For byte width s: max - min + 1 == 256^s, for both signednesses.
        for size in 1..=8u8 {
            let capacity = (1i128 << (8 * size as u32)) - 1;
            let unsigned = IntegerType::new(name, size, false);
            assert_eq!(unsigned.max - unsigned.min, capacity);
            assert!(!unsigned.is_signed());

            let signed = IntegerType::new(name, size, true);
            assert_eq!(signed.max - signed.min, capacity);
            assert!(signed.is_signed());
        }
    }

    #[test]
    fn signed_split_rounds_toward_negative() {
        let byte = IntegerType::new(Symbol(0), 1, true);
        assert_eq!(byte.min, -128);
        assert_eq!(byte.max, 127);
        let word = IntegerType::new(Symbol(0), 2, true);
        assert_eq!(word.min, -32768);
        assert_eq!(word.max, 32767);
    }

    #[test]
    fn ordinal_distance_sums_bound_deltas() {
        let shortint = IntegerType::new(Symbol(0), 1, true); // -128..127
        let byte = IntegerType::new(Symbol(1), 1, false); // 0..255
        assert_eq!(shortint.ordinal_distance(&byte), 128 + 128);
        assert_eq!(shortint.ordinal_distance(&shortint), 0);
    }

    #[test]
    fn helper_kinds_report_helper() {
        assert_eq!(StructKind::ClassHelper.type_kind(), TypeKind::Helper);
        assert_eq!(StructKind::RecordHelper.type_kind(), TypeKind::Helper);
        assert!(!StructKind::Class.is_helper());
    }
}
