use super::{Span, SyntaxError};

/// Go keywords the declaration parser cares about. Everything else lexes as an identifier.
const KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Keyword,
    /// Interpreted (`"..."`) string literal
    String,
    /// Raw (`` `...` ``) string literal
    RawString,
    Rune,
    Number,
    Punct,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    pub line: usize,
    pub end_line: usize,
    /// No other token or comment precedes this one on its line.
    pub line_start: bool,
}

impl Token {
    pub fn is_punct(&self, p: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == p
    }

    pub fn is_keyword(&self, k: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == k
    }

    pub fn is_ident(&self) -> bool {
        self.kind == TokenKind::Ident
    }

    pub fn is_string(&self) -> bool {
        matches!(self.kind, TokenKind::String | TokenKind::RawString)
    }
}

/// A `//` or `/* */` comment with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub span: Span,
    pub line: usize,
    pub end_line: usize,
    pub line_start: bool,
}

/// Output of lexing: code tokens and comments, both in source order.
#[derive(Debug, Default)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    // line of the most recently emitted token or comment
    last_line: usize,
    out: Lexed,
}

pub fn tokenize(src: &str) -> Result<Lexed, SyntaxError> {
    let mut lexer = Lexer {
        src,
        pos: 0,
        line: 1,
        last_line: 0,
        out: Lexed::default(),
    };
    lexer.run()?;
    Ok(lexer.out)
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(offset)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn error(&self, line: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            line,
            message: message.into(),
        }
    }

    fn run(&mut self) -> Result<(), SyntaxError> {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
                continue;
            }

            let start = self.pos;
            let line = self.line;

            if c == '/' && self.peek_at(1) == Some('/') {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
                self.push_comment(start, line);
                continue;
            }

            if c == '/' && self.peek_at(1) == Some('*') {
                self.bump();
                self.bump();
                loop {
                    match self.bump() {
                        Some('*') if self.peek() == Some('/') => {
                            self.bump();
                            break;
                        }
                        Some(_) => {}
                        None => return Err(self.error(line, "comment not terminated")),
                    }
                }
                self.push_comment(start, line);
                continue;
            }

            let kind = if c.is_alphabetic() || c == '_' {
                while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
                    self.bump();
                }
                if KEYWORDS.contains(&&self.src[start..self.pos]) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Ident
                }
            } else if c.is_ascii_digit() {
                self.lex_number();
                TokenKind::Number
            } else if c == '"' {
                self.lex_quoted('"', line, "string literal not terminated")?;
                TokenKind::String
            } else if c == '\'' {
                self.lex_quoted('\'', line, "rune literal not terminated")?;
                TokenKind::Rune
            } else if c == '`' {
                self.bump();
                loop {
                    match self.bump() {
                        Some('`') => break,
                        Some(_) => {}
                        None => return Err(self.error(line, "raw string literal not terminated")),
                    }
                }
                TokenKind::RawString
            } else if c == '.' && self.peek_at(1) == Some('.') && self.peek_at(2) == Some('.') {
                self.pos += 3;
                TokenKind::Punct
            } else {
                self.bump();
                TokenKind::Punct
            };

            self.push_token(kind, start, line);
        }
        Ok(())
    }

    fn lex_number(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                let exponent = matches!(c, 'e' | 'E' | 'p' | 'P');
                self.bump();
                if exponent && matches!(self.peek(), Some('+') | Some('-')) {
                    self.bump();
                }
            } else {
                break;
            }
        }
    }

    fn lex_quoted(&mut self, quote: char, line: usize, message: &str) -> Result<(), SyntaxError> {
        self.bump();
        loop {
            match self.bump() {
                Some('\\') => {
                    if self.bump().is_none() {
                        return Err(self.error(line, message));
                    }
                }
                Some('\n') | None => return Err(self.error(line, message)),
                Some(c) if c == quote => return Ok(()),
                Some(_) => {}
            }
        }
    }

    fn push_token(&mut self, kind: TokenKind, start: usize, line: usize) {
        let line_start = self.last_line != line;
        self.last_line = self.line;
        self.out.tokens.push(Token {
            kind,
            text: self.src[start..self.pos].to_string(),
            span: Span::new(start, self.pos),
            line,
            end_line: self.line,
            line_start,
        });
    }

    fn push_comment(&mut self, start: usize, line: usize) {
        let line_start = self.last_line != line;
        self.last_line = self.line;
        self.out.comments.push(Comment {
            text: self.src[start..self.pos].to_string(),
            span: Span::new(start, self.pos),
            line,
            end_line: self.line,
            line_start,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<(TokenKind, String)> {
        tokenize(src)
            .unwrap()
            .tokens
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_lex_func_signature() {
        let toks = kinds("func (h *UserHandler) GetUser(c *gin.Context) {}");
        assert_eq!(toks[0], (TokenKind::Keyword, "func".to_string()));
        assert_eq!(toks[4], (TokenKind::Ident, "UserHandler".to_string()));
        assert!(toks.iter().any(|(k, t)| *k == TokenKind::Ident && t == "gin"));
        assert_eq!(toks.last().unwrap().1, "}");
    }

    #[test]
    fn test_comments_are_kept_apart_from_tokens() {
        let lexed = tokenize("// hello\n/* block\n comment */\nvar x = 1 // trailing\n").unwrap();
        assert_eq!(lexed.comments.len(), 3);
        assert_eq!(lexed.comments[0].text, "// hello");
        assert!(lexed.comments[0].line_start);
        assert_eq!(lexed.comments[1].line, 2);
        assert_eq!(lexed.comments[1].end_line, 3);
        assert!(!lexed.comments[2].line_start);
        assert!(lexed.tokens.iter().all(|t| !t.text.starts_with("//")));
    }

    #[test]
    fn test_raw_string_spans_lines() {
        let lexed = tokenize("x := `a\nb`\ny").unwrap();
        let raw = lexed
            .tokens
            .iter()
            .find(|t| t.kind == TokenKind::RawString)
            .unwrap();
        assert_eq!(raw.text, "`a\nb`");
        assert_eq!(raw.line, 1);
        assert_eq!(raw.end_line, 2);
        let y = lexed.tokens.last().unwrap();
        assert_eq!(y.line, 3);
        assert!(y.line_start);
    }

    #[test]
    fn test_escaped_quote_in_string() {
        let toks = kinds(r#"s := "say \"hi\"""#);
        assert_eq!(toks.last().unwrap(), &(TokenKind::String, r#""say \"hi\"""#.to_string()));
    }

    #[test]
    fn test_byte_spans_with_multibyte_text() {
        let src = "// héllo\nfunc f() {}";
        let lexed = tokenize(src).unwrap();
        let func = &lexed.tokens[0];
        assert_eq!(&src[func.span.start..func.span.end], "func");
    }

    #[test]
    fn test_unterminated_literals_are_errors() {
        assert!(tokenize("s := \"open").is_err());
        assert!(tokenize("s := `open").is_err());
        assert!(tokenize("/* open").is_err());
    }

    #[test]
    fn test_numbers_with_exponent() {
        let toks = kinds("x := 1.5e-3 + 0x1F");
        assert!(toks.contains(&(TokenKind::Number, "1.5e-3".to_string())));
        assert!(toks.contains(&(TokenKind::Number, "0x1F".to_string())));
    }
}
