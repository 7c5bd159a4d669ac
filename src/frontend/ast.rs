// src/frontend/ast.rs
//
// Parsed syntax-tree shapes for one Pascal translation unit.
//
// The tree arrives already free of inactive conditional-compilation branches;
// every node carries a source span. Node ids are assigned by the upstream
// parser and give expressions a stable identity the analyzer can hang
// resolved types and occurrences on.

use crate::frontend::Symbol;

/// Identity of an expression node, assigned by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// Source location span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize, // Byte offset
    pub end: usize,   // Byte offset (exclusive)
    pub line: u32,    // Start line (1-indexed)
    pub column: u32,  // Start column (1-indexed)
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.len()).into()
    }
}

/// An identifier with its source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident {
    pub name: Symbol,
    pub span: Span,
}

impl Ident {
    pub fn new(name: Symbol, span: Span) -> Self {
        Self { name, span }
    }
}

/// A type reference as written in source, possibly unit-qualified and
/// possibly carrying generic arguments (`System.TArray<Integer>`).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub qualifier: Option<Ident>,
    pub name: Ident,
    pub type_args: Vec<TypeExpr>,
}

impl TypeExpr {
    pub fn named(name: Ident) -> Self {
        Self {
            qualifier: None,
            name,
            type_args: Vec::new(),
        }
    }

    pub fn generic(name: Ident, type_args: Vec<TypeExpr>) -> Self {
        Self {
            qualifier: None,
            name,
            type_args,
        }
    }
}

/// Parameter passing modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParamModifier {
    #[default]
    Value,
    Var,
    Out,
    Const,
}

/// A formal parameter group (`a, b: Integer`).
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub names: Vec<Ident>,
    /// None for untyped parameters (`var Buffer`).
    pub ty: Option<TypeExpr>,
    pub modifier: ParamModifier,
    pub has_default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    Procedure,
    Function,
    Constructor,
    Destructor,
    /// `class operator Add(...)` on a record or class.
    Operator,
}

/// A routine declaration, with its local declarations and body statements
/// when this is a defining (non-forward) declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineDecl {
    pub name: Ident,
    pub kind: RoutineKind,
    pub params: Vec<Param>,
    pub ret: Option<TypeExpr>,
    pub is_class_method: bool,
    pub locals: Vec<Decl>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperKind {
    Class,
    Record,
}

/// The right-hand side of a `type` declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDeclBody {
    Class {
        /// `TFoo = class;` — a forward declaration to be completed later.
        forward: bool,
        super_class: Option<TypeExpr>,
        interfaces: Vec<TypeExpr>,
        members: Vec<Decl>,
    },
    Interface {
        forward: bool,
        parents: Vec<TypeExpr>,
        members: Vec<Decl>,
    },
    Record {
        members: Vec<Decl>,
    },
    Helper {
        kind: HelperKind,
        for_type: TypeExpr,
        members: Vec<Decl>,
    },
    Enum {
        values: Vec<Ident>,
    },
    SetOf {
        element: TypeExpr,
    },
    ArrayOf {
        element: TypeExpr,
        dynamic: bool,
    },
    PointerTo {
        target: TypeExpr,
    },
    Procedural {
        params: Vec<Param>,
        ret: Option<TypeExpr>,
        of_object: bool,
    },
    /// `TAlias = TOther` (weak) or `TAlias = type TOther` (strong).
    Alias {
        target: TypeExpr,
        strong: bool,
    },
}

/// A declaration appearing in a unit section, type body, or routine locals.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Var {
        names: Vec<Ident>,
        ty: TypeExpr,
    },
    Const {
        name: Ident,
        ty: Option<TypeExpr>,
        value: Expr,
    },
    TypeDecl {
        name: Ident,
        type_params: Vec<Ident>,
        body: TypeDeclBody,
    },
    Routine(RoutineDecl),
    Property {
        name: Ident,
        ty: TypeExpr,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Assign { lhs: Expr, rhs: Expr },
    Block(Vec<Stmt>),
}

/// Literal constant values. Integer literals keep their exact value; anything
/// the scanner could not fit is out of range for every integer target anyway.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i128),
    Real(f64),
    Str(String),
    Char(char),
    Bool(bool),
    Nil,
}

/// Binary operators as written in source. The semantic core maps these onto
/// its closed operator set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    IntDivide,
    Modulus,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    In,
    Is,
    As,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
    Plus,
    AddressOf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A bare name reference, possibly with explicit generic arguments.
    Name {
        node: NodeId,
        name: Ident,
        type_args: Vec<TypeExpr>,
    },
    /// `base.name` — one link of a qualified chain.
    Member {
        node: NodeId,
        base: Box<Expr>,
        name: Ident,
        type_args: Vec<TypeExpr>,
    },
    Call {
        node: NodeId,
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    Literal {
        node: NodeId,
        value: Literal,
        span: Span,
    },
    Binary {
        node: NodeId,
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Unary {
        node: NodeId,
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    /// A bare `inherited` or `inherited Name`, recognized syntactically.
    Inherited {
        node: NodeId,
        name: Option<Ident>,
        span: Span,
    },
    SetCtor {
        node: NodeId,
        elements: Vec<Expr>,
        span: Span,
    },
    ArrayCtor {
        node: NodeId,
        elements: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn node(&self) -> NodeId {
        match self {
            Expr::Name { node, .. }
            | Expr::Member { node, .. }
            | Expr::Call { node, .. }
            | Expr::Literal { node, .. }
            | Expr::Binary { node, .. }
            | Expr::Unary { node, .. }
            | Expr::Inherited { node, .. }
            | Expr::SetCtor { node, .. }
            | Expr::ArrayCtor { node, .. } => *node,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Expr::Name { name, .. } => name.span,
            Expr::Member { base, name, .. } => {
                let b = base.span();
                Span::new(b.start, name.span.end, b.line, b.column)
            }
            Expr::Call { span, .. }
            | Expr::Literal { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Inherited { span, .. }
            | Expr::SetCtor { span, .. }
            | Expr::ArrayCtor { span, .. } => *span,
        }
    }
}

/// One translation unit: a unit header plus its interface and implementation
/// sections, each with its own uses clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub name: Ident,
    pub interface_uses: Vec<Ident>,
    pub interface_decls: Vec<Decl>,
    pub implementation_uses: Vec<Ident>,
    pub implementation_decls: Vec<Decl>,
}

impl Unit {
    pub fn new(name: Ident) -> Self {
        Self {
            name,
            interface_uses: Vec::new(),
            interface_decls: Vec::new(),
            implementation_uses: Vec::new(),
            implementation_decls: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_length() {
        let span = Span::new(10, 16, 2, 5);
        assert_eq!(span.len(), 6);
        assert!(!span.is_empty());
    }

    #[test]
    fn span_to_source_span() {
        let span = Span::new(4, 9, 1, 5);
        let ss: miette::SourceSpan = span.into();
        assert_eq!(ss.offset(), 4);
        assert_eq!(ss.len(), 5);
    }
}
