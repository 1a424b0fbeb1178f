use super::ast::{CommentGroup, Decl, Field, FuncDecl, SourceFile, TypeDecl, TypeExpr, TypeSpec};
use super::lexer::{tokenize, Comment, Token, TokenKind};
use super::{Span, SyntaxError};

const DECL_KEYWORDS: &[&str] = &["func", "type", "var", "const", "import"];

/// Parses Go source text into a [`SourceFile`].
///
/// # Errors
///
/// Returns a [`SyntaxError`] for unterminated literals or comments, unbalanced
/// brackets, a missing package clause, or a function declaration without a name or
/// parameter list.
pub fn parse_source(src: &str) -> Result<SourceFile, SyntaxError> {
    let lexed = tokenize(src)?;
    let closers = match_brackets(&lexed.tokens)?;
    let parser = Parser {
        src,
        tokens: &lexed.tokens,
        comments: &lexed.comments,
        closers,
    };
    parser.parse_file()
}

/// For every opening bracket, the index of its closing partner.
fn match_brackets(tokens: &[Token]) -> Result<Vec<Option<usize>>, SyntaxError> {
    let mut closers = vec![None; tokens.len()];
    let mut stack: Vec<usize> = Vec::new();

    for (idx, tok) in tokens.iter().enumerate() {
        if tok.is_punct("(") || tok.is_punct("[") || tok.is_punct("{") {
            stack.push(idx);
            continue;
        }
        let opener = match tok.text.as_str() {
            ")" => "(",
            "]" => "[",
            "}" => "{",
            _ => continue,
        };
        match stack.pop() {
            Some(open) if tokens[open].text == opener => closers[open] = Some(idx),
            Some(open) => {
                return Err(SyntaxError {
                    line: tok.line,
                    message: format!(
                        "mismatched '{}' closes '{}' opened on line {}",
                        tok.text, tokens[open].text, tokens[open].line
                    ),
                })
            }
            None => {
                return Err(SyntaxError {
                    line: tok.line,
                    message: format!("unexpected '{}'", tok.text),
                })
            }
        }
    }

    if let Some(open) = stack.pop() {
        return Err(SyntaxError {
            line: tokens[open].line,
            message: format!("unclosed '{}'", tokens[open].text),
        });
    }
    Ok(closers)
}

struct Parser<'a> {
    src: &'a str,
    tokens: &'a [Token],
    comments: &'a [Comment],
    closers: Vec<Option<usize>>,
}

impl<'a> Parser<'a> {
    fn error(&self, idx: usize, message: impl Into<String>) -> SyntaxError {
        let line = self
            .tokens
            .get(idx)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line);
        SyntaxError {
            line,
            message: message.into(),
        }
    }

    fn tok(&self, idx: usize) -> Option<&'a Token> {
        self.tokens.get(idx)
    }

    /// Index just past the bracket group opened at `idx`, or `idx + 1` for other tokens.
    fn skip(&self, idx: usize) -> usize {
        self.closers[idx].map_or(idx + 1, |close| close + 1)
    }

    fn parse_file(&self) -> Result<SourceFile, SyntaxError> {
        let package = match (self.tok(0), self.tok(1)) {
            (Some(kw), Some(name)) if kw.is_keyword("package") && name.is_ident() => {
                name.text.clone()
            }
            _ => return Err(self.error(0, "expected package clause")),
        };

        let mut starts = Vec::new();
        let mut idx = 2;
        while idx < self.tokens.len() {
            let tok = &self.tokens[idx];
            if tok.line_start && DECL_KEYWORDS.iter().any(|kw| tok.is_keyword(kw)) {
                starts.push(idx);
            }
            idx = self.skip(idx);
        }

        let mut decls = Vec::with_capacity(starts.len());
        for (n, &start) in starts.iter().enumerate() {
            let end = starts.get(n + 1).copied().unwrap_or(self.tokens.len());
            decls.push(self.parse_decl(start, end)?);
        }

        Ok(SourceFile {
            package,
            decls,
            comments: self.comments.to_vec(),
        })
    }

    fn parse_decl(&self, start: usize, end: usize) -> Result<Decl, SyntaxError> {
        let keyword = &self.tokens[start];
        let span = Span::new(keyword.span.start, self.tokens[end - 1].span.end);
        match keyword.text.as_str() {
            "func" => self.parse_func(start, end, span).map(Decl::Func),
            "type" => Ok(Decl::Type(self.parse_type_decl(start, end, span))),
            _ => Ok(Decl::Other {
                keyword: keyword.text.clone(),
                span,
            }),
        }
    }

    /// Comment group ending on the line right above token `idx`.
    fn doc_for(&self, idx: usize) -> Option<CommentGroup> {
        let tok = &self.tokens[idx];
        let floor = if idx == 0 {
            0
        } else {
            self.tokens[idx - 1].span.end
        };

        let mut pos = self.comments.partition_point(|c| c.span.start < tok.span.start);
        let mut group: Vec<Comment> = Vec::new();
        let mut next_line = tok.line;

        while pos > 0 {
            let comment = &self.comments[pos - 1];
            if comment.span.start < floor || !comment.line_start || comment.end_line + 1 != next_line
            {
                break;
            }
            group.push(comment.clone());
            next_line = comment.line;
            pos -= 1;
        }

        if group.is_empty() {
            return None;
        }
        group.reverse();
        Some(CommentGroup { comments: group })
    }

    fn parse_func(&self, start: usize, end: usize, span: Span) -> Result<FuncDecl, SyntaxError> {
        let mut idx = start + 1;

        let recv = match self.tok(idx) {
            Some(tok) if tok.is_punct("(") && idx < end => {
                let close = self.closers[idx].unwrap_or(idx);
                let fields = self.parse_params(idx + 1, close);
                idx = close + 1;
                Some(fields)
            }
            _ => None,
        };

        let name = match self.tok(idx) {
            Some(tok) if tok.is_ident() && idx < end => tok.text.clone(),
            _ => return Err(self.error(idx, "expected function name")),
        };
        idx += 1;

        // type parameters
        if matches!(self.tok(idx), Some(tok) if tok.is_punct("[")) && idx < end {
            idx = self.skip(idx);
        }

        let params = match self.tok(idx) {
            Some(tok) if tok.is_punct("(") && idx < end => {
                let close = self.closers[idx].unwrap_or(idx);
                self.parse_params(idx + 1, close)
            }
            _ => {
                return Err(self.error(
                    idx,
                    format!("expected parameter list for function {}", name),
                ))
            }
        };

        Ok(FuncDecl {
            name,
            recv,
            params,
            doc: self.doc_for(start),
            span,
        })
    }

    /// Splits `[lo, hi)` on top-level commas.
    fn split_commas(&self, lo: usize, hi: usize) -> Vec<(usize, usize)> {
        let mut entries = Vec::new();
        let mut entry_start = lo;
        let mut idx = lo;
        while idx < hi {
            if self.tokens[idx].is_punct(",") {
                entries.push((entry_start, idx));
                entry_start = idx + 1;
                idx += 1;
            } else {
                idx = self.skip(idx);
            }
        }
        entries.push((entry_start, hi));
        entries.retain(|(s, e)| s < e);
        entries
    }

    /// Parses a parameter or receiver list, applying Go's `a, b T` grouping.
    fn parse_params(&self, lo: usize, hi: usize) -> Vec<Field> {
        let entries = self.split_commas(lo, hi);
        let named: Vec<bool> = entries
            .iter()
            .map(|&(s, e)| self.is_named_entry(s, e))
            .collect();

        if !named.iter().any(|n| *n) {
            return entries
                .into_iter()
                .map(|(s, e)| Field {
                    names: Vec::new(),
                    ty: self.parse_type(s, e),
                    tag: None,
                })
                .collect();
        }

        let mut fields = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        for (&(s, e), is_named) in entries.iter().zip(named) {
            if is_named {
                pending.push(self.tokens[s].text.clone());
                fields.push(Field {
                    names: std::mem::take(&mut pending),
                    ty: self.parse_type(s + 1, e),
                    tag: None,
                });
            } else {
                pending.push(self.text(s, e));
            }
        }
        for name in pending {
            fields.push(Field {
                names: vec![name],
                ty: TypeExpr::Other(String::new()),
                tag: None,
            });
        }
        fields
    }

    fn is_named_entry(&self, s: usize, e: usize) -> bool {
        if e - s < 2 || !self.tokens[s].is_ident() {
            return false;
        }
        let next = &self.tokens[s + 1];
        if next.is_punct(".") {
            return false;
        }
        if next.is_punct("[") {
            // `xs []T` names a parameter, `List[T]` is a generic type
            return self.skip(s + 1) < e;
        }
        true
    }

    fn text(&self, lo: usize, hi: usize) -> String {
        if lo >= hi {
            return String::new();
        }
        self.src[self.tokens[lo].span.start..self.tokens[hi - 1].span.end].to_string()
    }

    fn parse_type(&self, lo: usize, hi: usize) -> TypeExpr {
        if lo >= hi {
            return TypeExpr::Other(String::new());
        }
        let first = &self.tokens[lo];

        if first.is_punct("*") {
            return TypeExpr::Pointer(Box::new(self.parse_type(lo + 1, hi)));
        }

        if first.is_keyword("struct") && lo + 1 < hi && self.tokens[lo + 1].is_punct("{") {
            let close = self.closers[lo + 1].unwrap_or(lo + 1);
            return TypeExpr::Struct(self.parse_struct_fields(lo + 2, close));
        }

        if first.is_ident() {
            if hi - lo == 1 {
                return TypeExpr::Ident(first.text.clone());
            }
            if hi - lo == 3 && self.tokens[lo + 1].is_punct(".") && self.tokens[lo + 2].is_ident() {
                return TypeExpr::Selector {
                    package: first.text.clone(),
                    name: self.tokens[lo + 2].text.clone(),
                };
            }
        }

        TypeExpr::Other(self.text(lo, hi))
    }

    /// Splits `[lo, hi)` into line- or semicolon-separated entries at bracket depth 0.
    fn split_lines(&self, lo: usize, hi: usize) -> Vec<(usize, usize)> {
        let mut entries = Vec::new();
        let mut entry_start = lo;
        let mut idx = lo;
        while idx < hi {
            let tok = &self.tokens[idx];
            if tok.is_punct(";") {
                entries.push((entry_start, idx));
                entry_start = idx + 1;
                idx += 1;
                continue;
            }
            if tok.line_start && idx > entry_start {
                entries.push((entry_start, idx));
                entry_start = idx;
            }
            idx = self.skip(idx);
        }
        entries.push((entry_start, hi));
        entries.retain(|(s, e)| s < e);
        entries
    }

    fn parse_struct_fields(&self, lo: usize, hi: usize) -> Vec<Field> {
        self.split_lines(lo, hi)
            .into_iter()
            .map(|(s, e)| self.parse_field(s, e))
            .collect()
    }

    fn parse_field(&self, s: usize, mut e: usize) -> Field {
        let mut tag = None;
        if e - s >= 2 && self.tokens[e - 1].is_string() {
            tag = Some(unquote(&self.tokens[e - 1].text));
            e -= 1;
        }

        let mut names = Vec::new();
        let mut idx = s;
        if self.is_named_entry(s, e) {
            names.push(self.tokens[s].text.clone());
            while idx + 2 < e && self.tokens[idx + 1].is_punct(",") && self.tokens[idx + 2].is_ident() {
                names.push(self.tokens[idx + 2].text.clone());
                idx += 2;
            }
            idx += 1;
        }

        Field {
            names,
            ty: self.parse_type(idx, e),
            tag,
        }
    }

    fn parse_type_decl(&self, start: usize, end: usize, span: Span) -> TypeDecl {
        let specs = match self.tok(start + 1) {
            Some(tok) if tok.is_punct("(") => {
                let close = self.closers[start + 1].unwrap_or(start + 1).min(end);
                self.split_lines(start + 2, close)
                    .into_iter()
                    .filter_map(|(s, e)| self.parse_type_spec(s, e))
                    .collect()
            }
            _ => self.parse_type_spec(start + 1, end).into_iter().collect(),
        };

        TypeDecl {
            specs,
            doc: self.doc_for(start),
            span,
        }
    }

    fn parse_type_spec(&self, s: usize, e: usize) -> Option<TypeSpec> {
        let name_tok = self.tok(s).filter(|t| t.is_ident() && s < e)?;
        let mut idx = s + 1;

        if idx < e && self.tokens[idx].is_punct("[") && self.is_type_param_list(idx) {
            idx = self.skip(idx);
        }
        if idx < e && self.tokens[idx].is_punct("=") {
            idx += 1;
        }

        Some(TypeSpec {
            name: name_tok.text.clone(),
            ty: self.parse_type(idx, e),
        })
    }

    /// `[T any]` declares type parameters; `[4]` or `[N]` is an array length.
    fn is_type_param_list(&self, open: usize) -> bool {
        let close = match self.closers[open] {
            Some(close) => close,
            None => return false,
        };
        if close - open < 3 || !self.tokens[open + 1].is_ident() {
            return false;
        }
        let second = &self.tokens[open + 2];
        second.is_ident()
            || second.kind == TokenKind::Keyword
            || second.is_punct("*")
            || second.is_punct("~")
            || second.is_punct("[")
            || second.is_punct(",")
    }
}

/// Strips quotes from a tag literal and resolves escapes in interpreted strings.
fn unquote(literal: &str) -> String {
    if let Some(raw) = literal.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
        return raw.to_string();
    }
    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(literal);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
