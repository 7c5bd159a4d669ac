// tests/unit_analysis.rs
//! End-to-end analysis of hand-built units: declaration registration,
//! cross-unit resolution, generic instantiation, operator typing and literal
//! bounds diagnostics through the public session API.

use pretty_assertions::assert_eq;

use opal::errors::SemanticError;
use opal::frontend::{
    BinaryOp, Decl, Expr, Ident, Literal, NodeId, RoutineDecl, RoutineKind, Span, Stmt,
    TypeDeclBody, TypeExpr, Unit,
};
use opal::sema::{Analysis, ToolchainConfig};

struct Session {
    a: Analysis,
    next_node: u32,
}

impl Session {
    fn new() -> Self {
        Self {
            a: Analysis::new(ToolchainConfig::default()),
            next_node: 0,
        }
    }

    fn ident(&mut self, name: &str) -> Ident {
        Ident::new(self.a.interner.intern(name), Span::default())
    }

    fn node(&mut self) -> NodeId {
        self.next_node += 1;
        NodeId(self.next_node)
    }

    fn name(&mut self, name: &str) -> (NodeId, Expr) {
        let node = self.node();
        let name = self.ident(name);
        (
            node,
            Expr::Name {
                node,
                name,
                type_args: vec![],
            },
        )
    }

    fn int(&mut self, value: i128) -> Expr {
        Expr::Literal {
            node: self.node(),
            value: Literal::Int(value),
            span: Span::default(),
        }
    }

    fn procedure(&mut self, name: &str, locals: Vec<Decl>, body: Vec<Stmt>) -> Decl {
        Decl::Routine(RoutineDecl {
            name: self.ident(name),
            kind: RoutineKind::Procedure,
            params: vec![],
            ret: None,
            is_class_method: false,
            locals,
            body,
        })
    }
}

#[test]
fn same_unit_declaration_shadows_import() {
    let mut s = Session::new();

    let mut provider = Unit::new(s.ident("Provider"));
    provider.interface_decls.push(Decl::Var {
        names: vec![s.ident("Value")],
        ty: TypeExpr::named(s.ident("Integer")),
    });
    s.a.analyze_unit(&provider).unwrap();

    let mut consumer = Unit::new(s.ident("Consumer"));
    consumer.interface_uses.push(s.ident("Provider"));
    consumer.interface_decls.push(Decl::Var {
        names: vec![s.ident("Value")],
        ty: TypeExpr::named(s.ident("String")),
    });
    let (node, value) = s.name("Value");
    let body = vec![Stmt::Expr(value)];
    let p = s.procedure("Touch", vec![], body);
    consumer.implementation_decls.push(p);

    let out = s.a.analyze_unit(&consumer).unwrap();
    assert!(out.diagnostics.is_empty());
    // The consumer's own String variable wins over the imported Integer one.
    assert_eq!(out.node_types.get(&node), Some(&s.a.intrinsics.string));
}

#[test]
fn conflicting_declarations_abort_the_unit() {
    let mut s = Session::new();
    let mut unit = Unit::new(s.ident("U"));
    unit.interface_decls.push(Decl::Var {
        names: vec![s.ident("Twice")],
        ty: TypeExpr::named(s.ident("Integer")),
    });
    unit.interface_decls.push(Decl::Var {
        names: vec![s.ident("TWICE")],
        ty: TypeExpr::named(s.ident("String")),
    });

    let err = s.a.analyze_unit(&unit).unwrap_err();
    // The error carries the first spelling seen, not the conflicting one.
    assert!(matches!(
        err,
        SemanticError::DeclarationConflict { ref name, .. } if name == "Twice"
    ));
}

#[test]
fn generic_method_call_is_typed_with_substituted_return() {
    let mut s = Session::new();
    let t = s.ident("T");
    let mut unit = Unit::new(s.ident("U"));
    unit.interface_decls.push(Decl::TypeDecl {
        name: s.ident("TPair"),
        type_params: vec![t],
        body: TypeDeclBody::Class {
            forward: false,
            super_class: None,
            interfaces: vec![],
            members: vec![
                Decl::Var {
                    names: vec![s.ident("First")],
                    ty: TypeExpr::named(t),
                },
                Decl::Routine(RoutineDecl {
                    name: s.ident("GetFirst"),
                    kind: RoutineKind::Function,
                    params: vec![],
                    ret: Some(TypeExpr::named(t)),
                    is_class_method: false,
                    locals: vec![],
                    body: vec![],
                }),
            ],
        },
    });
    let pair_of_double = TypeExpr::generic(
        s.ident("TPair"),
        vec![TypeExpr::named(s.ident("Double"))],
    );
    unit.interface_decls.push(Decl::Var {
        names: vec![s.ident("P")],
        ty: pair_of_double,
    });

    let (_, base) = s.name("P");
    let member_node = s.node();
    let get_first = s.ident("GetFirst");
    let call_node = s.node();
    let call = Expr::Call {
        node: call_node,
        callee: Box::new(Expr::Member {
            node: member_node,
            base: Box::new(base),
            name: get_first,
            type_args: vec![],
        }),
        args: vec![],
        span: Span::default(),
    };
    let p = s.procedure("Use", vec![], vec![Stmt::Expr(call)]);
    unit.implementation_decls.push(p);

    let out = s.a.analyze_unit(&unit).unwrap();
    assert!(out.diagnostics.is_empty());
    assert_eq!(out.node_types.get(&call_node), Some(&s.a.intrinsics.double));
}

#[test]
fn integer_slash_division_yields_extended() {
    let mut s = Session::new();
    let mut unit = Unit::new(s.ident("U"));
    let lhs = s.int(1);
    let rhs = s.int(2);
    let node = s.node();
    let div = Expr::Binary {
        node,
        op: BinaryOp::Divide,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        span: Span::default(),
    };
    let p = s.procedure("Calc", vec![], vec![Stmt::Expr(div)]);
    unit.interface_decls.push(p);

    let out = s.a.analyze_unit(&unit).unwrap();
    assert_eq!(out.node_types.get(&node), Some(&s.a.intrinsics.extended));
}

#[test]
fn set_union_keeps_the_set_type() {
    let mut s = Session::new();
    let mut unit = Unit::new(s.ident("U"));
    let a_elem = s.int(1);
    let a_node = s.node();
    let b_elem = s.int(2);
    let b_node = s.node();
    let union_node = s.node();
    let union = Expr::Binary {
        node: union_node,
        op: BinaryOp::Add,
        lhs: Box::new(Expr::SetCtor {
            node: a_node,
            elements: vec![a_elem],
            span: Span::default(),
        }),
        rhs: Box::new(Expr::SetCtor {
            node: b_node,
            elements: vec![b_elem],
            span: Span::default(),
        }),
        span: Span::default(),
    };
    let p = s.procedure("Sets", vec![], vec![Stmt::Expr(union)]);
    unit.interface_decls.push(p);

    let out = s.a.analyze_unit(&unit).unwrap();
    let lhs_ty = out.node_types.get(&a_node).copied().unwrap();
    assert_eq!(out.node_types.get(&union_node), Some(&lhs_ty));
}

#[test]
fn class_reference_supports_is_test() {
    let mut s = Session::new();
    let mut unit = Unit::new(s.ident("U"));
    unit.interface_decls.push(Decl::Var {
        names: vec![s.ident("O")],
        ty: TypeExpr::named(s.ident("TObject")),
    });
    let (_, lhs) = s.name("O");
    let (_, rhs) = s.name("TObject");
    let node = s.node();
    let is_test = Expr::Binary {
        node,
        op: BinaryOp::Is,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        span: Span::default(),
    };
    let p = s.procedure("Check", vec![], vec![Stmt::Expr(is_test)]);
    unit.interface_decls.push(p);

    let out = s.a.analyze_unit(&unit).unwrap();
    assert_eq!(out.node_types.get(&node), Some(&s.a.intrinsics.boolean));
}

#[test]
fn system_class_members_reachable_from_user_code() {
    let mut s = Session::new();
    let mut unit = Unit::new(s.ident("U"));
    unit.interface_decls.push(Decl::Var {
        names: vec![s.ident("O")],
        ty: TypeExpr::named(s.ident("TObject")),
    });
    let (_, base) = s.name("O");
    let node = s.node();
    let class_name = s.ident("ClassName");
    let member = Expr::Member {
        node,
        base: Box::new(base),
        name: class_name,
        type_args: vec![],
    };
    let p = s.procedure("Show", vec![], vec![Stmt::Expr(member)]);
    unit.interface_decls.push(p);

    let out = s.a.analyze_unit(&unit).unwrap();
    assert!(out.diagnostics.is_empty());
    assert_eq!(out.node_types.get(&node), Some(&s.a.intrinsics.string));
}

#[test]
fn constant_bounds_violations_surface_as_diagnostics() {
    let mut s = Session::new();
    let mut unit = Unit::new(s.ident("U"));
    let ok = s.int(-120);
    unit.interface_decls.push(Decl::Const {
        name: s.ident("Fits"),
        ty: Some(TypeExpr::named(s.ident("ShortInt"))),
        value: ok,
    });
    let bad = s.int(200);
    unit.interface_decls.push(Decl::Const {
        name: s.ident("Overflows"),
        ty: Some(TypeExpr::named(s.ident("ShortInt"))),
        value: bad,
    });

    let out = s.a.analyze_unit(&unit).unwrap();
    assert!(matches!(
        out.diagnostics.as_slice(),
        [SemanticError::ValueOutOfBounds { type_image, .. }] if type_image == "ShortInt"
    ));
}

#[test]
fn legacy_version_narrows_char() {
    let config = ToolchainConfig::new("VER150", 4).unwrap();
    let a = Analysis::new(config);
    assert_eq!(
        a.arena.ordinal_range(a.intrinsics.char, &a.registry),
        Some((0, 255))
    );
    let modern = Analysis::new(ToolchainConfig::default());
    assert_eq!(
        modern.arena.ordinal_range(modern.intrinsics.char, &modern.registry),
        Some((0, 65535))
    );
}

#[test]
fn unknown_import_degrades_without_failing() {
    let mut s = Session::new();
    let mut unit = Unit::new(s.ident("U"));
    unit.interface_uses.push(s.ident("NoSuchUnit"));
    let (node, missing) = s.name("FromNowhere");
    let p = s.procedure("Touch", vec![], vec![Stmt::Expr(missing)]);
    unit.interface_decls.push(p);

    let out = s.a.analyze_unit(&unit).unwrap();
    // The import itself is not an error and the unresolved name degrades to
    // the unknown sentinel.
    assert!(out.diagnostics.is_empty());
    let occ = out.node_occurrences.get(&node).unwrap();
    assert!(!s.a.scopes.occurrence(*occ).is_resolved());
}
