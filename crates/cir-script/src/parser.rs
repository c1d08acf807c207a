//! Recursive-descent parser.
//!
//! ```text
//! expr    := and ( "||" and )*
//! and     := cmp ( "&&" cmp )*
//! cmp     := unary ( cmp_op unary )?
//! unary   := "!" unary | primary
//! primary := literal | "-" number | reference | call | "(" expr ")"
//! reference := ident | "`" ident "`" | "emr" "." ident
//! call    := ident "(" args ")"
//! ```
//!
//! Identifiers may start with a digit (`2nd_visit`). The backquoted form
//! names an item whose id is also a keyword, such as `` `true` ``.

use crate::ast::{CmpOp, Expr, Literal, Reference, Script};
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{tokenize, Token, TokenKind};

/// Size limits applied while compiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum source length in bytes.
    pub max_len: usize,
    /// Maximum nesting of parentheses and `!`.
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_len: 4096,
            max_depth: 64,
        }
    }
}

pub fn parse(source: &str, limits: &Limits) -> Result<Script, ParseError> {
    if source.len() > limits.max_len {
        return Err(ParseError::new(
            limits.max_len,
            ParseErrorKind::TooLong {
                limit: limits.max_len,
            },
        ));
    }
    if source.trim().is_empty() {
        return Err(ParseError::new(0, ParseErrorKind::Empty));
    }

    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        max_depth: limits.max_depth,
    };
    let expr = parser.expr()?;
    parser.expect_eof()?;

    tracing::trace!(nodes = expr.node_count(), "script compiled");
    Ok(Script {
        source: source.to_string(),
        expr,
    })
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // `tokenize` always ends with Eof and `advance` never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn expected(&self, expected: &'static str) -> ParseError {
        let token = self.peek();
        ParseError::new(
            token.offset,
            ParseErrorKind::Expected {
                expected,
                found: token.kind.to_string(),
            },
        )
    }

    fn eat(&mut self, kind: &TokenKind, expected: &'static str) -> Result<(), ParseError> {
        if &self.peek().kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.expected(expected))
        }
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        if self.peek().kind == TokenKind::Eof {
            Ok(())
        } else {
            Err(self.expected("an operator or end of expression"))
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::new(
                self.peek().offset,
                ParseErrorKind::TooDeep {
                    limit: self.max_depth,
                },
            ));
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.and()?;
        while self.peek().kind == TokenKind::OrOr {
            self.advance();
            let rhs = self.and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.comparison()?;
        while self.peek().kind == TokenKind::AndAnd {
            self.advance();
            let rhs = self.comparison()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.unary()?;
        let Some(op) = cmp_op(&self.peek().kind) else {
            return Ok(lhs);
        };
        self.advance();
        let rhs = self.unary()?;

        if cmp_op(&self.peek().kind).is_some() {
            return Err(ParseError::new(
                self.peek().offset,
                ParseErrorKind::ChainedComparison,
            ));
        }
        Ok(Expr::Compare {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.peek().kind == TokenKind::Not {
            self.advance();
            self.enter()?;
            let inner = self.unary()?;
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Str(s) => Ok(Expr::Literal(Literal::Str(s))),
            TokenKind::Num(n) => Ok(Expr::Literal(Literal::Num(n))),
            TokenKind::True => Ok(Expr::Literal(Literal::Bool(true))),
            TokenKind::False => Ok(Expr::Literal(Literal::Bool(false))),
            TokenKind::Minus => match self.advance().kind {
                TokenKind::Num(n) => Ok(Expr::Literal(Literal::Num(-n))),
                _ => Err(ParseError::new(
                    token.offset,
                    ParseErrorKind::Expected {
                        expected: "a number after '-'",
                        found: "'-'".to_string(),
                    },
                )),
            },
            TokenKind::LParen => {
                self.enter()?;
                let inner = self.expr()?;
                self.eat(&TokenKind::RParen, "')'")?;
                self.depth -= 1;
                Ok(inner)
            }
            TokenKind::QuotedRef(name) => Ok(Expr::Ref(Reference::Item(name))),
            TokenKind::Ident(name) => {
                if self.peek().kind == TokenKind::LParen {
                    self.call(name, token.offset)
                } else {
                    self.reference_tail(name).map(Expr::Ref)
                }
            }
            other => Err(ParseError::new(
                token.offset,
                ParseErrorKind::Expected {
                    expected: "a value",
                    found: other.to_string(),
                },
            )),
        }
    }

    /// Finish a reference whose first identifier was already consumed.
    fn reference_tail(&mut self, name: String) -> Result<Reference, ParseError> {
        if name == "emr" && self.peek().kind == TokenKind::Dot {
            self.advance();
            return match self.advance().kind {
                TokenKind::Ident(field) => Ok(Reference::Emr(field)),
                _ => Err(self.expected_previous("an EMR field name after 'emr.'")),
            };
        }
        Ok(Reference::Item(name))
    }

    fn reference(&mut self) -> Result<Reference, ParseError> {
        match self.advance().kind {
            TokenKind::Ident(name) => self.reference_tail(name),
            TokenKind::QuotedRef(name) => Ok(Reference::Item(name)),
            _ => Err(self.expected_previous("an item reference")),
        }
    }

    fn expected_previous(&self, expected: &'static str) -> ParseError {
        let token = &self.tokens[self.pos.saturating_sub(1)];
        ParseError::new(
            token.offset,
            ParseErrorKind::Expected {
                expected,
                found: token.kind.to_string(),
            },
        )
    }

    fn call(&mut self, name: String, offset: usize) -> Result<Expr, ParseError> {
        self.eat(&TokenKind::LParen, "'('")?;
        let expr = match name.as_str() {
            "isSet" => Expr::IsSet(self.reference()?),
            "num" => Expr::ToNumber(self.reference()?),
            "contains" => {
                let target = self.reference()?;
                if self.peek().kind != TokenKind::Comma {
                    return Err(ParseError::new(
                        offset,
                        ParseErrorKind::Arity {
                            function: "contains",
                            expected: 2,
                        },
                    ));
                }
                self.advance();
                match self.advance().kind {
                    TokenKind::Str(value) => Expr::Contains(target, value),
                    _ => return Err(self.expected_previous("a string literal")),
                }
            }
            _ => return Err(ParseError::new(offset, ParseErrorKind::UnknownFunction(name))),
        };

        if self.peek().kind == TokenKind::Comma {
            let function = match &expr {
                Expr::Contains(..) => ("contains", 2),
                Expr::ToNumber(_) => ("num", 1),
                _ => ("isSet", 1),
            };
            return Err(ParseError::new(
                offset,
                ParseErrorKind::Arity {
                    function: function.0,
                    expected: function.1,
                },
            ));
        }
        self.eat(&TokenKind::RParen, "')'")?;
        Ok(expr)
    }
}

fn cmp_op(kind: &TokenKind) -> Option<CmpOp> {
    match kind {
        TokenKind::EqEq => Some(CmpOp::Eq),
        TokenKind::NotEq => Some(CmpOp::Ne),
        TokenKind::Lt => Some(CmpOp::Lt),
        TokenKind::Le => Some(CmpOp::Le),
        TokenKind::Gt => Some(CmpOp::Gt),
        TokenKind::Ge => Some(CmpOp::Ge),
        _ => None,
    }
}
