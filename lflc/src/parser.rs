use crate::ast::*;
use crate::error::{LexError, Location, ParseError, Result, SemError, SemErrorKind};
use crate::lexer::Lexer;
use crate::token::{AssignOp, BinOp, Keyword, Token, TokenKind, UnaryOp};

/// Recursive-descent parser (spec §4.2). One-token lookahead throughout;
/// the only place that needs a second token of lookahead is disambiguating
/// an identifier-led statement, which is handled by peeking the token
/// already consumed into `self.tokens`.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(source: &str) -> std::result::Result<Self, LexError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token()?;
            let done = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        Ok(Parser { tokens, pos: 0 })
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn location(&self) -> Location {
        self.peek().location
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn check_keyword(&self, kw: Keyword) -> bool {
        matches!(&self.peek().kind, TokenKind::Keyword(k) if *k == kw)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError {
            location: self.location(),
            expected: expected.to_string(),
            found: self.peek().describe(),
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected).into())
        }
    }

    fn expect_keyword(&mut self, kw: Keyword, expected: &str) -> Result<Location> {
        if self.check_keyword(kw) {
            Ok(self.advance().location)
        } else {
            Err(self.unexpected(expected).into())
        }
    }

    fn expect_identifier(&mut self, expected: &str) -> Result<(String, Location)> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok((name, tok.location))
            }
            _ => Err(self.unexpected(expected).into()),
        }
    }

    pub fn parse_program(&mut self) -> Result<Program> {
        let mut functions = Vec::new();
        while !self.check(&TokenKind::Eof) {
            functions.push(self.parse_function()?);
        }
        Ok(Program { functions })
    }

    fn parse_function(&mut self) -> Result<Function> {
        let returns_value = if self.check_keyword(Keyword::int) {
            self.advance();
            true
        } else if self.check_keyword(Keyword::void) {
            self.advance();
            false
        } else {
            return Err(self.unexpected("\"int\" or \"void\"").into());
        };

        let (name, name_location) = self.expect_identifier("a function name")?;

        self.expect(TokenKind::LParen, "\"(\"")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let (param, _) = self.expect_identifier("a parameter name")?;
                params.push(param);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "\")\"")?;

        let body = self.parse_braced_block()?;

        Ok(Function {
            name,
            name_location,
            params,
            returns_value,
            body,
        })
    }

    fn parse_braced_block(&mut self) -> Result<Block> {
        self.expect(TokenKind::LBrace, "\"{\"")?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            statements.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace, "\"}\"")?;
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        if self.check_keyword(Keyword::if_) {
            return self.parse_if_chain();
        }
        if self.check_keyword(Keyword::while_) {
            return self.parse_while();
        }
        if self.check_keyword(Keyword::return_) {
            return self.parse_return();
        }
        if self.check_keyword(Keyword::break_) {
            let location = self.advance().location;
            self.expect(TokenKind::Semicolon, "\";\"")?;
            return Ok(Statement::Break { location });
        }
        if self.check_keyword(Keyword::continue_) {
            let location = self.advance().location;
            self.expect(TokenKind::Semicolon, "\";\"")?;
            return Ok(Statement::Continue { location });
        }

        if matches!(self.peek().kind, TokenKind::Identifier(_)) {
            let (name, name_location) = self.expect_identifier("a name")?;
            if self.check(&TokenKind::LParen) {
                let args = self.parse_call_args()?;
                self.expect(TokenKind::Semicolon, "\";\"")?;
                return Ok(Statement::ExprStmt {
                    call: Expr::Call {
                        name,
                        name_location,
                        args,
                    },
                });
            }
            if self.check(&TokenKind::Assign) {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon, "\";\"")?;
                return Ok(Statement::Assign {
                    name,
                    name_location,
                    expr,
                });
            }
            if let TokenKind::CompoundAssign(op) = self.peek().kind {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon, "\";\"")?;
                return Ok(Statement::CompoundAssign {
                    name,
                    name_location,
                    op,
                    expr,
                });
            }
            return Err(self
                .unexpected("\"(\", \"=\" or a compound-assignment operator")
                .into());
        }

        Err(self.unexpected("a statement").into())
    }

    fn parse_if_chain(&mut self) -> Result<Statement> {
        let mut branches = Vec::new();
        loop {
            self.expect_keyword(Keyword::if_, "\"if\"")?;
            let cond = self.parse_expr()?;
            let body = self.parse_braced_block()?;
            branches.push((cond, body));

            if self.check_keyword(Keyword::else_) {
                self.advance();
                if self.check_keyword(Keyword::if_) {
                    continue;
                }
                let else_block = self.parse_braced_block()?;
                return Ok(Statement::If {
                    branches,
                    else_block: Some(else_block),
                });
            }
            return Ok(Statement::If {
                branches,
                else_block: None,
            });
        }
    }

    fn parse_while(&mut self) -> Result<Statement> {
        self.expect_keyword(Keyword::while_, "\"while\"")?;
        let cond = self.parse_expr()?;
        let body = self.parse_braced_block()?;
        Ok(Statement::While { cond, body })
    }

    fn parse_return(&mut self) -> Result<Statement> {
        let location = self.expect_keyword(Keyword::return_, "\"return\"")?;
        if self.check(&TokenKind::Semicolon) {
            self.advance();
            return Ok(Statement::Return {
                expr: None,
                location,
            });
        }
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "\";\"")?;
        Ok(Statement::Return {
            expr: Some(expr),
            location,
        })
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>> {
        self.expect(TokenKind::LParen, "\"(\"")?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "\")\"")?;
        Ok(args)
    }

    // Precedence, tightest to loosest (spec §4.2):
    //   1. ^  <<  >>
    //   2. *  /  %
    //   3. +  -
    //   4. ==  !=  <  <=  >  >=
    //   5. &  |
    // All left-associative within a level; unary `~`/`-` bind tighter than
    // any binary operator.
    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_level5()
    }

    fn parse_level5(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_level4()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Amp => BinOp::And,
                TokenKind::Pipe => BinOp::Or,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_level4()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_level4(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_level3()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::Ne => BinOp::Ne,
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Le => BinOp::Le,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Ge => BinOp::Ge,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_level3()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_level3(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_level2()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_level2()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_level2(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_level1()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Rem,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_level1()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_level1(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Caret => BinOp::Pow,
                TokenKind::Shl => BinOp::Shl,
                TokenKind::Shr => BinOp::Shr,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let location = self.location();
        if self.check(&TokenKind::Tilde) {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
                location,
            });
        }
        if self.check(&TokenKind::Minus) {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
                location,
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen, "\")\"")?;
                Ok(expr)
            }
            TokenKind::IntLit(text) => {
                self.advance();
                let value: i32 = text.parse().map_err(|_| {
                    SemError {
                        location: tok.location,
                        kind: SemErrorKind::IntegerOutOfRange(text.clone()),
                    }
                })?;
                Ok(Expr::IntLit {
                    value,
                    location: tok.location,
                })
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    let args = self.parse_call_args()?;
                    Ok(Expr::Call {
                        name,
                        name_location: tok.location,
                        args,
                    })
                } else {
                    Ok(Expr::Var {
                        name,
                        location: tok.location,
                    })
                }
            }
            _ => Err(self.unexpected("an expression").into()),
        }
    }
}

pub fn parse(source: &str) -> Result<Program> {
    Parser::new(source)?.parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_smallest_program() {
        let program = parse("void main() { signal_1 = 42; }").unwrap();
        assert_eq!(program.functions.len(), 1);
        assert_eq!(program.functions[0].name, "main");
        assert!(!program.functions[0].returns_value);
        assert_eq!(program.functions[0].body.len(), 1);
    }

    #[test]
    fn precedence_groups_multiplication_tighter_than_addition() {
        let expr = Parser::new("2 + 3 * 4").unwrap().parse_expr().unwrap();
        match expr {
            Expr::Binary {
                op: BinOp::Add,
                rhs,
                ..
            } => {
                assert!(matches!(*rhs, Expr::Binary { op: BinOp::Mul, .. }));
            }
            _ => panic!("expected a top-level addition"),
        }
    }

    #[test]
    fn comparisons_bind_tighter_than_bitwise_and() {
        // i < n & factors == 0  =>  (i < n) & (factors == 0)
        let expr = Parser::new("i < n & factors == 0")
            .unwrap()
            .parse_expr()
            .unwrap();
        match expr {
            Expr::Binary {
                op: BinOp::And,
                lhs,
                rhs,
            } => {
                assert!(matches!(*lhs, Expr::Binary { op: BinOp::Lt, .. }));
                assert!(matches!(*rhs, Expr::Binary { op: BinOp::Eq, .. }));
            }
            _ => panic!("expected a top-level bitwise and"),
        }
    }

    #[test]
    fn if_else_chain_without_parens() {
        let program = parse(
            "void main() { if signal_1 == 0 { signal_1 = 1; } else { signal_1 = 2; } }",
        )
        .unwrap();
        match &program.functions[0].body[0] {
            Statement::If {
                branches,
                else_block,
            } => {
                assert_eq!(branches.len(), 1);
                assert!(else_block.is_some());
            }
            _ => panic!("expected an if statement"),
        }
    }

    #[test]
    fn unary_minus_binds_tighter_than_any_binary_operator() {
        let expr = Parser::new("-2 * 3").unwrap().parse_expr().unwrap();
        match expr {
            Expr::Binary {
                op: BinOp::Mul,
                lhs,
                ..
            } => assert!(matches!(*lhs, Expr::Unary { op: UnaryOp::Neg, .. })),
            _ => panic!("expected a top-level multiplication"),
        }
    }
}
