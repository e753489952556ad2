//! Recursive-descent parser for expression text.
//!
//! Precedence, lowest first:
//! `|`/`or`, `&`/`and`, `~`/`not`, comparisons, `+ -`, `* / // %`,
//! unary `-`, `**` (right associative).
//!
//! Comparisons bind tighter than `&` and `|`, so `x > 1 & y < 2` needs no
//! parentheses.

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::tokenizer::{tokenize, Token};
use crate::dataframe::Value;
use crate::error::{PlyError, Result};

/// Parse expression text into a syntax tree.
pub fn parse(text: &str) -> Result<Expr> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(PlyError::ExpressionError("empty expression".into()));
    }

    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(PlyError::ExpressionError(format!(
            "unexpected token {:?} in '{}'",
            token, text
        ))),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        match self.advance() {
            Some(ref token) if token == expected => Ok(()),
            Some(token) => Err(PlyError::ExpressionError(format!(
                "expected {:?}, found {:?}",
                expected, token
            ))),
            None => Err(PlyError::ExpressionError(format!(
                "expected {:?}, found end of expression",
                expected
            ))),
        }
    }

    /// Left-associative chain of `next` joined by the operators in `ops`.
    fn binary_chain(
        &mut self,
        ops: &[(Token, BinaryOp)],
        next: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let mut left = next(self)?;
        while let Some(op) = self
            .peek()
            .and_then(|t| ops.iter().find(|(tok, _)| tok == t).map(|(_, op)| *op))
        {
            self.pos += 1;
            let right = next(self)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr> {
        self.binary_chain(&[(Token::Or, BinaryOp::Or)], Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        self.binary_chain(&[(Token::And, BinaryOp::And)], Self::parse_not)
    }

    fn parse_not(&mut self) -> Result<Expr> {
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            let expr = self.parse_not()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(expr),
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        self.binary_chain(
            &[
                (Token::Equal, BinaryOp::Eq),
                (Token::NotEqual, BinaryOp::Ne),
                (Token::Less, BinaryOp::Lt),
                (Token::LessEqual, BinaryOp::Le),
                (Token::Greater, BinaryOp::Gt),
                (Token::GreaterEqual, BinaryOp::Ge),
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        self.binary_chain(
            &[(Token::Plus, BinaryOp::Add), (Token::Minus, BinaryOp::Sub)],
            Self::parse_term,
        )
    }

    fn parse_term(&mut self) -> Result<Expr> {
        self.binary_chain(
            &[
                (Token::Star, BinaryOp::Mul),
                (Token::Slash, BinaryOp::Div),
                (Token::DoubleSlash, BinaryOp::FloorDiv),
                (Token::Percent, BinaryOp::Mod),
            ],
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                let expr = self.parse_unary()?;
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    expr: Box::new(expr),
                })
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr> {
        let base = self.parse_primary()?;
        if self.peek() == Some(&Token::Power) {
            self.pos += 1;
            // -x ** 2 is -(x ** 2), but 2 ** -1 is allowed
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary {
                op: BinaryOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.advance() {
            Some(Token::Int(v)) => Ok(Expr::Literal(Value::Int(v))),
            Some(Token::Float(v)) => Ok(Expr::Literal(Value::Float(v))),
            Some(Token::Str(v)) => Ok(Expr::Literal(Value::Str(v))),
            Some(Token::Bool(v)) => Ok(Expr::Literal(Value::Bool(v))),
            Some(Token::LeftParen) => {
                let expr = self.parse_or()?;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }
            Some(Token::Identifier(name)) => {
                if self.peek() != Some(&Token::LeftParen) {
                    return Ok(Expr::Name(name));
                }
                self.pos += 1;
                let mut args = Vec::new();
                if self.peek() != Some(&Token::RightParen) {
                    loop {
                        args.push(self.parse_or()?);
                        if self.peek() == Some(&Token::Comma) {
                            self.pos += 1;
                        } else {
                            break;
                        }
                    }
                }
                self.expect(&Token::RightParen)?;
                Ok(Expr::Call { name, args })
            }
            Some(token) => Err(PlyError::ExpressionError(format!(
                "unexpected token {:?}",
                token
            ))),
            None => Err(PlyError::ExpressionError(
                "unexpected end of expression".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: &str) -> Box<Expr> {
        Box::new(Expr::Name(n.into()))
    }

    fn int(v: i64) -> Box<Expr> {
        Box::new(Expr::Literal(Value::Int(v)))
    }

    #[test]
    fn test_precedence() {
        let expr = parse("a + b * 2").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinaryOp::Add,
                left: name("a"),
                right: Box::new(Expr::Binary {
                    op: BinaryOp::Mul,
                    left: name("b"),
                    right: int(2),
                }),
            }
        );
    }

    #[test]
    fn test_comparison_binds_tighter_than_and() {
        let expr = parse("x > 1 & y < 2").unwrap();
        match expr {
            Expr::Binary { op, left, right } => {
                assert_eq!(op, BinaryOp::And);
                assert!(matches!(*left, Expr::Binary { op: BinaryOp::Gt, .. }));
                assert!(matches!(*right, Expr::Binary { op: BinaryOp::Lt, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_negated_power() {
        let expr = parse("-x ** 2").unwrap();
        assert!(matches!(expr, Expr::Unary { op: UnaryOp::Neg, .. }));
    }

    #[test]
    fn test_calls() {
        let expr = parse("nth(y, 0)").unwrap();
        assert_eq!(
            expr,
            Expr::Call {
                name: "nth".into(),
                args: vec![Expr::Name("y".into()), Expr::Literal(Value::Int(0))],
            }
        );
        assert!(matches!(parse("f()").unwrap(), Expr::Call { ref args, .. } if args.is_empty()));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(parse("").is_err());
        assert!(parse("(a + 1").is_err());
        assert!(parse("a b").is_err());
        assert!(parse("f(a,)").is_err());
    }
}
