// src/errors/sema.rs
//! Semantic analysis errors (E2xxx).

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum SemanticError {
    #[error("redeclared identifier '{name}'")]
    #[diagnostic(code(E2004))]
    DeclarationConflict {
        name: String,
        #[label("conflicting declaration")]
        span: SourceSpan,
        #[label("previously declared here")]
        previous: SourceSpan,
    },

    #[error("malformed compiler version symbol '{symbol}'")]
    #[diagnostic(
        code(E2201),
        help("expected a symbol of the form VERnnn, e.g. VER350")
    )]
    MalformedVersionSymbol { symbol: String },

    #[error("declaration added to frozen scope '{scope}'")]
    #[diagnostic(code(E2202))]
    FrozenScope { scope: String },

    #[error("constant expression violates subrange bounds")]
    #[diagnostic(code(E2026))]
    ValueOutOfBounds {
        type_image: String,
        #[label("value does not fit '{type_image}'")]
        span: SourceSpan,
    },

    #[error("unit '{name}' was already analyzed")]
    #[diagnostic(code(E2203))]
    DuplicateUnit {
        name: String,
        #[label("second unit with this name")]
        span: SourceSpan,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_names_identifier() {
        let err = SemanticError::DeclarationConflict {
            name: "Foo".into(),
            span: (0, 3).into(),
            previous: (10, 3).into(),
        };
        assert_eq!(err.to_string(), "redeclared identifier 'Foo'");
    }

    #[test]
    fn malformed_version_message() {
        let err = SemanticError::MalformedVersionSymbol {
            symbol: "VERSION_35".into(),
        };
        assert!(err.to_string().contains("VERSION_35"));
    }
}
