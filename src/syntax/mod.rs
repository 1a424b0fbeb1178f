//! Comment-preserving Go declaration parser.
//!
//! This is not a full Go front-end. It understands exactly as much of the language as
//! doc generation needs: the package clause, top-level declarations with their byte
//! offsets and attached doc comments, function receivers and parameter lists, and struct
//! types with field tags. Function bodies and initializers are skipped by bracket
//! matching, so any syntactically balanced Go file can be read.
//!
//! # Example
//!
//! ```
//! use swag_from_source::syntax::parse_source;
//!
//! let file = parse_source("package handler\n\nfunc (h *UserHandler) GetUser(c *gin.Context) {}\n").unwrap();
//! let func = file.funcs().next().unwrap();
//! assert_eq!(func.name, "GetUser");
//! assert!(func.recv.is_some());
//! ```

pub mod ast;
pub mod lexer;
mod parse;

pub use ast::{CommentGroup, Decl, Field, FuncDecl, SourceFile, TypeDecl, TypeExpr, TypeSpec};
pub use lexer::Comment;
pub use parse::parse_source;

/// Half-open byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Lexing or parsing failure with the 1-based line it was detected on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}
