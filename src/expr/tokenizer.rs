//! Lexical analysis for expression text.
//!
//! `tokenize()` walks the characters once and hands off to a small helper per
//! token class (operators, strings, numbers, identifiers). Unary minus is not
//! folded into numbers here; the parser owns that decision.

use crate::error::{PlyError, Result};
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Identifier(String),

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    Power,

    // Comparison
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterEqual,
    LessEqual,

    // Logical
    And,
    Or,
    Not,

    // Punctuation
    LeftParen,
    RightParen,
    Comma,
}

fn syntax(msg: impl Into<String>) -> PlyError {
    PlyError::ExpressionError(msg.into())
}

/// Consume `next` if it is the upcoming character.
fn eat(chars: &mut Peekable<Chars<'_>>, next: char) -> bool {
    if chars.peek() == Some(&next) {
        chars.next();
        true
    } else {
        false
    }
}

fn parse_operator(ch: char, chars: &mut Peekable<Chars<'_>>) -> Result<Option<Token>> {
    let token = match ch {
        '+' => Token::Plus,
        '-' => Token::Minus,
        '%' => Token::Percent,
        '&' => Token::And,
        '|' => Token::Or,
        '~' => Token::Not,
        '(' => Token::LeftParen,
        ')' => Token::RightParen,
        ',' => Token::Comma,
        '*' => {
            chars.next();
            return Ok(Some(if eat(chars, '*') { Token::Power } else { Token::Star }));
        }
        '/' => {
            chars.next();
            return Ok(Some(if eat(chars, '/') {
                Token::DoubleSlash
            } else {
                Token::Slash
            }));
        }
        '=' => {
            chars.next();
            if eat(chars, '=') {
                return Ok(Some(Token::Equal));
            }
            return Err(syntax("assignment is not supported, use == to compare"));
        }
        '!' => {
            chars.next();
            if eat(chars, '=') {
                return Ok(Some(Token::NotEqual));
            }
            return Err(syntax("expected != but got single !"));
        }
        '>' => {
            chars.next();
            return Ok(Some(if eat(chars, '=') {
                Token::GreaterEqual
            } else {
                Token::Greater
            }));
        }
        '<' => {
            chars.next();
            return Ok(Some(if eat(chars, '=') {
                Token::LessEqual
            } else {
                Token::Less
            }));
        }
        _ => return Ok(None),
    };
    chars.next();
    Ok(Some(token))
}

/// Parse a quoted string literal; the opening quote is already consumed.
fn parse_string(quote: char, chars: &mut Peekable<Chars<'_>>) -> Result<String> {
    let mut string = String::new();
    while let Some(ch) = chars.next() {
        match ch {
            c if c == quote => return Ok(string),
            '\\' => match chars.next() {
                Some('n') => string.push('\n'),
                Some('t') => string.push('\t'),
                Some(other) => string.push(other),
                None => break,
            },
            c => string.push(c),
        }
    }
    Err(syntax("unterminated string literal"))
}

fn parse_number(chars: &mut Peekable<Chars<'_>>) -> Result<Token> {
    let mut num_str = String::new();
    let mut is_float = false;

    while let Some(&ch) = chars.peek() {
        if ch.is_ascii_digit() || ch == '_' {
            if ch != '_' {
                num_str.push(ch);
            }
        } else if ch == '.' && !is_float {
            is_float = true;
            num_str.push(ch);
        } else if (ch == 'e' || ch == 'E') && !num_str.is_empty() {
            is_float = true;
            num_str.push(ch);
            chars.next();
            if let Some(&sign) = chars.peek() {
                if sign == '+' || sign == '-' {
                    num_str.push(sign);
                    chars.next();
                }
            }
            continue;
        } else {
            break;
        }
        chars.next();
    }

    if is_float {
        num_str
            .parse::<f64>()
            .map(Token::Float)
            .map_err(|_| syntax(format!("invalid number: {}", num_str)))
    } else {
        num_str
            .parse::<i64>()
            .map(Token::Int)
            .map_err(|_| syntax(format!("invalid integer: {}", num_str)))
    }
}

fn parse_identifier(chars: &mut Peekable<Chars<'_>>) -> Token {
    let mut ident = String::new();
    while let Some(&ch) = chars.peek() {
        if ch.is_alphanumeric() || ch == '_' {
            ident.push(ch);
            chars.next();
        } else {
            break;
        }
    }

    match ident.as_str() {
        "True" | "true" => Token::Bool(true),
        "False" | "false" => Token::Bool(false),
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        _ => Token::Identifier(ident),
    }
}

/// Split expression text into tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        if let Some(token) = parse_operator(ch, &mut chars)? {
            tokens.push(token);
            continue;
        }

        if ch == '"' || ch == '\'' {
            chars.next();
            tokens.push(Token::Str(parse_string(ch, &mut chars)?));
        } else if ch.is_ascii_digit() || ch == '.' {
            tokens.push(parse_number(&mut chars)?);
        } else if ch.is_alphabetic() || ch == '_' {
            tokens.push(parse_identifier(&mut chars));
        } else {
            return Err(syntax(format!("unexpected character '{}'", ch)));
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_tokens() {
        let tokens = tokenize("x ** 2 // 3 - y").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Identifier("x".into()),
                Token::Power,
                Token::Int(2),
                Token::DoubleSlash,
                Token::Int(3),
                Token::Minus,
                Token::Identifier("y".into()),
            ]
        );
    }

    #[test]
    fn test_numbers_and_strings() {
        let tokens = tokenize("1.5e3 'it\\'s' \"b\" True").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Float(1500.0),
                Token::Str("it's".into()),
                Token::Str("b".into()),
                Token::Bool(true),
            ]
        );
    }

    #[test]
    fn test_comparison_and_logic() {
        let tokens = tokenize("a >= 1 & not b != 2 | ~c").unwrap();
        assert!(tokens.contains(&Token::GreaterEqual));
        assert!(tokens.contains(&Token::And));
        assert!(tokens.contains(&Token::Not));
        assert!(tokens.contains(&Token::NotEqual));
        assert!(tokens.contains(&Token::Or));
    }

    #[test]
    fn test_errors() {
        assert!(tokenize("a = 1").is_err());
        assert!(tokenize("'open").is_err());
        assert!(tokenize("a $ b").is_err());
    }
}
