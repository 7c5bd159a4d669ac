// src/errors/mod.rs
//! Structured error reporting for the semantic core.
//!
//! Only the fatal conditions live here: declaration conflicts that would
//! corrupt the symbol table, and configuration failures that invalidate the
//! whole type universe. Binding failures and specialization arity mismatches
//! are deliberately not errors; they degrade to the unknown sentinel.

pub mod sema;

pub use sema::SemanticError;
