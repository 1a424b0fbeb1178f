use super::lexer::Comment;
use super::Span;

/// A parsed Go source file: package clause, top-level declarations and every comment.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub package: String,
    pub decls: Vec<Decl>,
    pub comments: Vec<Comment>,
}

impl SourceFile {
    /// Iterates over top-level function and method declarations in source order.
    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Func(func) => Some(func),
            _ => None,
        })
    }

    /// Iterates over all type specs, including those inside `type ( ... )` groups.
    pub fn type_specs(&self) -> impl Iterator<Item = &TypeSpec> {
        self.decls
            .iter()
            .filter_map(|decl| match decl {
                Decl::Type(group) => Some(group.specs.iter()),
                _ => None,
            })
            .flatten()
    }
}

#[derive(Debug, Clone)]
pub enum Decl {
    Func(FuncDecl),
    Type(TypeDecl),
    /// `import`, `var` or `const`; only the position is retained.
    Other { keyword: String, span: Span },
}

/// Contiguous comments attached to the declaration that follows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentGroup {
    pub comments: Vec<Comment>,
}

impl CommentGroup {
    pub fn span(&self) -> Span {
        let start = self.comments.first().map_or(0, |c| c.span.start);
        let end = self.comments.last().map_or(0, |c| c.span.end);
        Span::new(start, end)
    }

    /// Raw comment text, one comment per line.
    pub fn text(&self) -> String {
        self.comments
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: String,
    pub recv: Option<Vec<Field>>,
    pub params: Vec<Field>,
    pub doc: Option<CommentGroup>,
    /// Starts at the `func` keyword and ends after the body (or signature).
    pub span: Span,
}

impl FuncDecl {
    /// Offset where the attached doc comment begins, or the declaration itself when undocumented.
    pub fn doc_start(&self) -> usize {
        self.doc.as_ref().map_or(self.span.start, |doc| doc.span().start)
    }
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub specs: Vec<TypeSpec>,
    pub doc: Option<CommentGroup>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub name: String,
    pub ty: TypeExpr,
}

/// A struct field, function parameter or receiver.
///
/// `names` is empty for embedded fields and unnamed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub names: Vec<String>,
    pub ty: TypeExpr,
    /// Tag literal with its quotes stripped.
    pub tag: Option<String>,
}

impl Field {
    /// Number of entries this field contributes to its list.
    pub fn arity(&self) -> usize {
        self.names.len().max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Ident(String),
    Selector { package: String, name: String },
    Pointer(Box<TypeExpr>),
    Struct(Vec<Field>),
    /// Anything the parser does not model, kept as source text.
    Other(String),
}

impl TypeExpr {
    /// Name of the underlying type with one level of pointer indirection removed.
    pub fn base_name(&self) -> Option<&str> {
        match self {
            TypeExpr::Ident(name) => Some(name),
            TypeExpr::Selector { name, .. } => Some(name),
            TypeExpr::Pointer(inner) => match inner.as_ref() {
                TypeExpr::Ident(name) => Some(name),
                TypeExpr::Selector { name, .. } => Some(name),
                _ => None,
            },
            _ => None,
        }
    }
}
