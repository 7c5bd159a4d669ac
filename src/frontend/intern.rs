// src/frontend/intern.rs

use rustc_hash::FxHashMap;

/// Interned identifier. Pascal identifiers compare case-insensitively, so two
/// spellings that differ only in case intern to the same Symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(pub u32);

/// Interns identifiers to unique Symbol ids, folding case.
///
/// The first spelling seen is the one `resolve` returns, so diagnostics show
/// the source's own casing.
#[derive(Debug, Default)]
pub struct Interner {
    map: FxHashMap<String, Symbol>,
    strings: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        let key = s.to_ascii_lowercase();
        if let Some(&sym) = self.map.get(&key) {
            return sym;
        }

        let sym = Symbol(self.strings.len() as u32);
        self.strings.push(s.to_string());
        self.map.insert(key, sym);
        sym
    }

    /// Look up an identifier without interning it.
    pub fn get(&self, s: &str) -> Option<Symbol> {
        self.map.get(&s.to_ascii_lowercase()).copied()
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_case_insensitive() {
        let mut interner = Interner::new();
        let a = interner.intern("TObject");
        let b = interner.intern("TOBJECT");
        let c = interner.intern("tobject");
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn resolve_keeps_first_spelling() {
        let mut interner = Interner::new();
        let sym = interner.intern("MyVar");
        interner.intern("MYVAR");
        assert_eq!(interner.resolve(sym), "MyVar");
    }

    #[test]
    fn get_does_not_intern() {
        let mut interner = Interner::new();
        assert!(interner.get("Foo").is_none());
        let sym = interner.intern("Foo");
        assert_eq!(interner.get("foo"), Some(sym));
    }
}
