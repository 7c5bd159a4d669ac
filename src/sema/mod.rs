// src/sema/mod.rs
//
// The semantic core: type universe, scope and declaration model, name
// occurrence resolution, generic specialization, operator resolution and
// literal bounds checking, driven by the per-unit analyzer session.

pub mod analyzer;
pub mod bounds;
pub mod config;
pub mod declarations;
pub mod factory;
pub mod generic;
pub mod operators;
pub mod registry;
pub mod resolve;
pub mod scope;
pub mod type_arena;
pub mod types;
pub mod well_known;

pub use analyzer::{Analysis, UnitAnalysis};
pub use config::{CompilerVersion, ToolchainConfig};
pub use type_arena::{TypeArena, TypeId};
