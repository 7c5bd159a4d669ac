// src/sema/factory.rs
//
// The type factory: builds the arena and the intrinsic type universe for one
// toolchain configuration. Intrinsic widths follow the configured version and
// target, so a VER150 analysis sees 1-byte chars and no UInt64 distinct from
// Int64, while a modern 64-bit one sees UTF-16 chars and native 8-byte sizes.

use crate::frontend::Interner;
use crate::sema::config::ToolchainConfig;
use crate::sema::type_arena::{TypeArena, TypeId};
use crate::sema::types::IntegerType;

/// Handles to every intrinsic type, interned once at session start.
#[derive(Debug, Clone, Copy)]
pub struct IntrinsicTypes {
    pub byte: TypeId,
    pub shortint: TypeId,
    pub smallint: TypeId,
    pub word: TypeId,
    pub integer: TypeId,
    pub cardinal: TypeId,
    pub int64: TypeId,
    pub uint64: TypeId,
    pub native_int: TypeId,
    pub native_uint: TypeId,
    pub single: TypeId,
    pub double: TypeId,
    pub extended: TypeId,
    pub boolean: TypeId,
    pub char: TypeId,
    pub ansi_char: TypeId,
    pub string: TypeId,
    pub ansi_string: TypeId,
    pub pointer: TypeId,
    pub variant: TypeId,
}

/// Builds the arena and intrinsic universe for a configuration.
pub struct TypeFactory;

impl TypeFactory {
    pub fn build(config: &ToolchainConfig, interner: &mut Interner) -> (TypeArena, IntrinsicTypes) {
        let mut arena = TypeArena::new(config.pointer_size);
        let ptr = config.pointer_size;
        let unicode = config.version.unicode_strings();

        let mut int = |arena: &mut TypeArena, name: &str, size: u8, signed: bool| {
            let sym = interner.intern(name);
            arena.integer(IntegerType::new(sym, size, signed))
        };

        let byte = int(&mut arena, "Byte", 1, false);
        let shortint = int(&mut arena, "ShortInt", 1, true);
        let smallint = int(&mut arena, "SmallInt", 2, true);
        let word = int(&mut arena, "Word", 2, false);
        let integer = int(&mut arena, "Integer", 4, true);
        let cardinal = int(&mut arena, "Cardinal", 4, false);
        let int64 = int(&mut arena, "Int64", 8, true);
        let uint64 = int(&mut arena, "UInt64", 8, false);
        let native_int = int(&mut arena, "NativeInt", ptr, true);
        let native_uint = int(&mut arena, "NativeUInt", ptr, false);

        let single_sym = interner.intern("Single");
        let double_sym = interner.intern("Double");
        let extended_sym = interner.intern("Extended");
        let single = arena.real(single_sym, 4);
        let double = arena.real(double_sym, 8);
        // Extended is the x87 format only on 32-bit x86 targets.
        let extended = arena.real(extended_sym, if ptr == 4 { 10 } else { 8 });

        let boolean_sym = interner.intern("Boolean");
        let boolean = arena.boolean(boolean_sym, 1);

        let char_sym = interner.intern("Char");
        let ansi_char_sym = interner.intern("AnsiChar");
        let char = arena.char_type(char_sym, if unicode { 2 } else { 1 });
        let ansi_char = arena.char_type(ansi_char_sym, 1);

        let string_sym = interner.intern("String");
        let ansi_string_sym = interner.intern("AnsiString");
        let string = arena.string_type(string_sym, if unicode { 2 } else { 1 });
        let ansi_string = arena.string_type(ansi_string_sym, 1);

        let pointer = arena.untyped_pointer();
        let variant = arena.variant();

        let intrinsics = IntrinsicTypes {
            byte,
            shortint,
            smallint,
            word,
            integer,
            cardinal,
            int64,
            uint64,
            native_int,
            native_uint,
            single,
            double,
            extended,
            boolean,
            char,
            ansi_char,
            string,
            ansi_string,
            pointer,
            variant,
        };
        (arena, intrinsics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::registry::TypeRegistry;

    fn build(config: &ToolchainConfig) -> (TypeArena, IntrinsicTypes, Interner) {
        let mut interner = Interner::new();
        let (arena, intrinsics) = TypeFactory::build(config, &mut interner);
        (arena, intrinsics, interner)
    }

    #[test]
    fn byte_capacity_and_bounds() {
        let (arena, intrinsics, _) = build(&ToolchainConfig::default());
        let byte = arena.as_integer(intrinsics.byte).unwrap();
        assert_eq!((byte.min, byte.max), (0, 255));
        let shortint = arena.as_integer(intrinsics.shortint).unwrap();
        assert_eq!((shortint.min, shortint.max), (-128, 127));
    }

    #[test]
    fn native_widths_follow_pointer_size() {
        let config = ToolchainConfig::new("VER350", 4).unwrap();
        let (arena, intrinsics, _) = build(&config);
        assert_eq!(arena.as_integer(intrinsics.native_int).unwrap().size, 4);
        let (arena64, intrinsics64, _) = build(&ToolchainConfig::default());
        assert_eq!(arena64.as_integer(intrinsics64.native_int).unwrap().size, 8);
    }

    #[test]
    fn char_width_follows_version() {
        let old = ToolchainConfig::new("VER150", 4).unwrap();
        let (arena, intrinsics, _) = build(&old);
        assert_eq!(arena.ordinal_range(intrinsics.char, &TypeRegistry::new()), Some((0, 255)));

        let (arena, intrinsics, _) = build(&ToolchainConfig::default());
        assert_eq!(
            arena.ordinal_range(intrinsics.char, &TypeRegistry::new()),
            Some((0, 65535))
        );
    }

    #[test]
    fn intrinsics_answer_is_by_name() {
        let (arena, intrinsics, interner) = build(&ToolchainConfig::default());
        let registry = TypeRegistry::new();
        assert!(arena.is(intrinsics.integer, "integer", &interner, &registry));
        assert!(arena.is(intrinsics.pointer, "Pointer", &interner, &registry));
        assert!(!arena.is(intrinsics.integer, "Cardinal", &interner, &registry));
    }
}
