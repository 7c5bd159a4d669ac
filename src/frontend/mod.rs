// src/frontend/mod.rs
//
// The syntax-tree boundary consumed by the semantic core.
//
// Tokenization and grammar-driven tree construction happen upstream; this
// module only defines the parsed, position-annotated node shapes the analyzer
// walks, plus the case-insensitive identifier interner Pascal requires.

pub mod ast;
pub mod intern;

pub use ast::{
    BinaryOp, Decl, Expr, HelperKind, Ident, Literal, NodeId, Param, ParamModifier, RoutineDecl,
    RoutineKind, Span, Stmt, TypeDeclBody, TypeExpr, UnaryOp, Unit,
};
pub use intern::{Interner, Symbol};
