use std::iter::Peekable;
use std::str::CharIndices;

use super::error::ConditionError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Text(String),
    Ident(String),
    And,
    Or,
    Not,
    In,
    Is,
    True,
    False,
    Null,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character of the token.
    pub pos: usize,
}

/// Split a condition into tokens. The result always ends with `Eof`.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ConditionError> {
    let mut lexer = Lexer {
        chars: input.char_indices().peekable(),
        len: input.len(),
    };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

struct Lexer<'a> {
    chars: Peekable<CharIndices<'a>>,
    len: usize,
}

impl Lexer<'_> {
    fn next_token(&mut self) -> Result<Token, ConditionError> {
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }

        let Some((pos, ch)) = self.chars.next() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                pos: self.len,
            });
        };

        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => {
                if self.eat('=') {
                    TokenKind::EqEq
                } else {
                    return Err(ConditionError::syntax(
                        pos,
                        "unexpected '=' (use '==' for equality)",
                    ));
                }
            }
            '!' => {
                if self.eat('=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Not
                }
            }
            '<' => {
                if self.eat('=') {
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::And
                } else {
                    return Err(ConditionError::syntax(pos, "unexpected '&' (use '&&' or 'and')"));
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::Or
                } else {
                    return Err(ConditionError::syntax(pos, "unexpected '|' (use '||' or 'or')"));
                }
            }
            '\'' | '"' => TokenKind::Text(self.string(pos, ch)?),
            c if c.is_ascii_digit() => self.number(pos, c)?,
            c if c.is_ascii_alphabetic() || c == '_' => keyword_or_ident(self.ident(c)),
            other => {
                return Err(ConditionError::syntax(
                    pos,
                    format!("unexpected character '{other}'"),
                ));
            }
        };

        Ok(Token { kind, pos })
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.chars.peek().map(|&(_, ch)| ch) == Some(expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn string(&mut self, start: usize, quote: char) -> Result<String, ConditionError> {
        let mut value = String::new();
        while let Some((pos, ch)) = self.chars.next() {
            match ch {
                c if c == quote => return Ok(value),
                '\\' => match self.chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, c @ ('\\' | '\'' | '"'))) => value.push(c),
                    Some((_, other)) => {
                        return Err(ConditionError::syntax(
                            pos,
                            format!("unknown escape sequence '\\{other}'"),
                        ));
                    }
                    None => break,
                },
                c => value.push(c),
            }
        }
        Err(ConditionError::syntax(start, "unterminated string literal"))
    }

    fn number(&mut self, start: usize, first: char) -> Result<TokenKind, ConditionError> {
        let mut raw = String::from(first);
        let mut seen_dot = false;
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_ascii_digit() || ch == '_' {
                if ch != '_' {
                    raw.push(ch);
                }
            } else if ch == '.' && !seen_dot {
                seen_dot = true;
                raw.push(ch);
            } else {
                break;
            }
            self.chars.next();
        }
        raw.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| ConditionError::syntax(start, format!("invalid number '{raw}'")))
    }

    fn ident(&mut self, first: char) -> String {
        let mut name = String::from(first);
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                name.push(ch);
                self.chars.next();
            } else {
                break;
            }
        }
        name
    }
}

fn keyword_or_ident(name: String) -> TokenKind {
    match name.as_str() {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "in" => TokenKind::In,
        "is" => TokenKind::Is,
        "true" | "True" => TokenKind::True,
        "false" | "False" => TokenKind::False,
        "null" | "None" => TokenKind::Null,
        _ => TokenKind::Ident(name),
    }
}
