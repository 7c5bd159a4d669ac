// src/sema/config.rs
//
// Toolchain configuration: the compiler version and target the analysis
// models. The version symbol drives which intrinsic types exist and how wide
// they are; unit aliases rewrite legacy unit names before import resolution.

use crate::errors::SemanticError;

/// A compiler version parsed from its conditional symbol (`VER350` is 35.0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompilerVersion(u32);

impl CompilerVersion {
    /// Parse a `VERnnn` conditional symbol, case-insensitively.
    pub fn parse(symbol: &str) -> Result<Self, SemanticError> {
        let malformed = || SemanticError::MalformedVersionSymbol {
            symbol: symbol.to_string(),
        };
        let digits = symbol
            .get(..3)
            .filter(|p| p.eq_ignore_ascii_case("VER"))
            .map(|_| &symbol[3..])
            .ok_or_else(malformed)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let value = digits.parse::<u32>().map_err(|_| malformed())?;
        Ok(Self(value))
    }

    pub fn number(self) -> u32 {
        self.0
    }

    /// VER200 and later default Char/String to UTF-16.
    pub fn unicode_strings(self) -> bool {
        self.0 >= 200
    }

    /// VER230 and later know 64-bit targets (and UInt64 on all of them).
    pub fn supports_64bit_targets(self) -> bool {
        self.0 >= 230
    }
}

impl Default for CompilerVersion {
    fn default() -> Self {
        Self(350)
    }
}

/// One `unit alias = target` rewrite, applied to import names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitAlias {
    pub alias: String,
    pub target: String,
}

/// The configuration one analysis session runs under.
#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    pub version: CompilerVersion,
    /// Target pointer width in bytes.
    pub pointer_size: u8,
    pub unit_aliases: Vec<UnitAlias>,
}

impl ToolchainConfig {
    pub fn new(version_symbol: &str, pointer_size: u8) -> Result<Self, SemanticError> {
        Ok(Self {
            version: CompilerVersion::parse(version_symbol)?,
            pointer_size,
            unit_aliases: Vec::new(),
        })
    }

    pub fn with_alias(mut self, alias: &str, target: &str) -> Self {
        self.unit_aliases.push(UnitAlias {
            alias: alias.to_string(),
            target: target.to_string(),
        });
        self
    }

    /// The aliased target for a unit name, case-insensitively, or the name
    /// itself.
    pub fn resolve_unit_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.unit_aliases
            .iter()
            .find(|a| a.alias.eq_ignore_ascii_case(name))
            .map(|a| a.target.as_str())
            .unwrap_or(name)
    }
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            version: CompilerVersion::default(),
            pointer_size: 8,
            unit_aliases: Vec::new(),
        }
    }
}
