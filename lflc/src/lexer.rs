use crate::error::{LexError, Location};
use crate::token::{AssignOp, Keyword, Token, TokenKind};

/// Hand-written lexer (spec §4.1). Consumes UTF-8 source and produces a
/// token stream with `(line, column)` positions; skips whitespace and
/// `// ...` line comments. Block comments are not supported.
pub struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source: source.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn location(&self) -> Location {
        Location {
            line: self.line,
            column: self.column,
        }
    }

    fn advance(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        if c == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c == b' ' || c == b'\t' || c == b'\r' || c == b'\n' => {
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while self.peek().is_some() && self.peek() != Some(b'\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Returns the next token, ending with an infinite stream of `Eof`.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();
        let start = self.location();

        let c = match self.peek() {
            None => return Ok(Token::new(TokenKind::Eof, start)),
            Some(c) => c,
        };

        if is_ident_start(c) {
            return Ok(self.lex_identifier(start));
        }
        if c.is_ascii_digit() {
            return Ok(self.lex_int_literal(start));
        }

        self.lex_operator_or_punctuator(start)
    }

    fn lex_identifier(&mut self, start: Location) -> Token {
        let begin = self.pos;
        while self.peek().map(is_ident_continue).unwrap_or(false) {
            self.advance();
        }
        let text = std::str::from_utf8(&self.source[begin..self.pos])
            .expect("ASCII identifier is valid UTF-8")
            .to_string();

        match Keyword::from_source(&text) {
            Some(kw) => Token::new(TokenKind::Keyword(kw), start),
            None => Token::new(TokenKind::Identifier(text), start),
        }
    }

    fn lex_int_literal(&mut self, start: Location) -> Token {
        let begin = self.pos;
        while self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            self.advance();
        }
        let text = std::str::from_utf8(&self.source[begin..self.pos])
            .expect("ASCII digits are valid UTF-8")
            .to_string();
        Token::new(TokenKind::IntLit(text), start)
    }

    fn lex_operator_or_punctuator(&mut self, start: Location) -> Result<Token, LexError> {
        let c = self.advance().unwrap();
        let kind = match c {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'~' => TokenKind::Tilde,
            b'%' => TokenKind::Percent,
            b'=' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::EqEq
                } else {
                    TokenKind::Assign
                }
            }
            b'!' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::Ne
                } else {
                    return Err(LexError {
                        location: start,
                        message: "unrecognised character \"!\"".to_string(),
                    });
                }
            }
            b'+' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::CompoundAssign(AssignOp::Add)
                } else {
                    TokenKind::Plus
                }
            }
            b'-' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::CompoundAssign(AssignOp::Sub)
                } else {
                    TokenKind::Minus
                }
            }
            b'*' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::CompoundAssign(AssignOp::Mul)
                } else {
                    TokenKind::Star
                }
            }
            b'/' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::CompoundAssign(AssignOp::Div)
                } else {
                    TokenKind::Slash
                }
            }
            b'&' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::CompoundAssign(AssignOp::And)
                } else {
                    TokenKind::Amp
                }
            }
            b'|' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::CompoundAssign(AssignOp::Or)
                } else {
                    TokenKind::Pipe
                }
            }
            b'^' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::CompoundAssign(AssignOp::Pow)
                } else {
                    TokenKind::Caret
                }
            }
            b'<' => {
                if self.peek() == Some(b'<') {
                    self.advance();
                    TokenKind::Shl
                } else if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            b'>' => {
                if self.peek() == Some(b'>') {
                    self.advance();
                    TokenKind::Shr
                } else if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            other => {
                return Err(LexError {
                    location: start,
                    message: format!("unrecognised character \"{}\"", other as char),
                });
            }
        };
        Ok(Token::new(kind, start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().expect("lex ok");
            if tok.kind == TokenKind::Eof {
                break;
            }
            out.push(tok.kind);
        }
        out
    }

    #[test]
    fn lexes_function_header() {
        let toks = kinds("void main() {}");
        assert_eq!(
            toks,
            vec![
                TokenKind::Keyword(Keyword::void),
                TokenKind::Identifier("main".to_string()),
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
            ]
        );
    }

    #[test]
    fn greedily_matches_multichar_operators() {
        let toks = kinds("a <= b != c << d >>= e");
        assert!(toks.contains(&TokenKind::Le));
        assert!(toks.contains(&TokenKind::Ne));
        assert!(toks.contains(&TokenKind::Shl));
        // `>>=` is not a real operator: lexes as Shr then Assign.
        assert!(toks.contains(&TokenKind::Shr));
        assert!(toks.contains(&TokenKind::Assign));
    }

    #[test]
    fn skips_line_comments() {
        let toks = kinds("a // comment with + and -\n+ b");
        assert_eq!(
            toks,
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::Plus,
                TokenKind::Identifier("b".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_unknown_character() {
        let mut lexer = Lexer::new("@");
        assert!(lexer.next_token().is_err());
    }
}
