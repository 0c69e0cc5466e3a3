//! Pattern string → token stream.
//!
//! The lexer walks the pattern one `char` at a time and tracks exactly one
//! bit of context beyond its cursor: whether it is currently inside a
//! character class (`[...]`), since `-`, `^` and the escapable set differ
//! in meaning there.

use crate::{
    error::SyntaxError,
    token::{Token, TokenKind},
};

/// Characters `\X` may escape to mean the literal `X`, outside a class.
fn is_escapable(c: char) -> bool {
    matches!(
        c,
        '.' | '*' | '+' | '?' | '|' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '\\'
    )
}

pub struct Lexer {
    pattern: Vec<char>,
    i: usize,
    in_class: bool,
}

impl Lexer {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.chars().collect(),
            i: 0,
            in_class: false,
        }
    }

    fn len(&self) -> usize {
        self.pattern.len()
    }

    fn peek(&self) -> Option<char> {
        self.pattern.get(self.i).copied()
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();
        while self.i < self.len() {
            let pos = self.i;
            let c = self.pattern[self.i];
            self.i += 1;

            let token = if c == '\\' {
                self.read_escape(pos)?
            } else if self.in_class {
                self.lex_class_char(c, pos)
            } else {
                self.lex_regular_char(c, pos)
            };
            tokens.push(token);
        }
        tokens.push(Token::new(TokenKind::Eof, None, self.len()));
        Ok(tokens)
    }

    fn lex_regular_char(&mut self, c: char, pos: usize) -> Token {
        let kind = match c {
            '.' => TokenKind::Dot,
            '*' => TokenKind::Star,
            '+' => TokenKind::Plus,
            '?' => TokenKind::Question,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '|' => TokenKind::Pipe,
            '^' => TokenKind::Caret,
            '$' => TokenKind::Dollar,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            '[' => {
                self.in_class = true;
                TokenKind::LBracket
            }
            // `-` is listed among the metacharacters but a bare `-` outside
            // a class is just a literal character; likewise a stray `]`.
            _ => TokenKind::Char,
        };
        if kind == TokenKind::Char {
            Token::new(TokenKind::Char, Some(c), pos)
        } else {
            Token::new(kind, None, pos)
        }
    }

    fn lex_class_char(&mut self, c: char, pos: usize) -> Token {
        match c {
            ']' => {
                self.in_class = false;
                Token::new(TokenKind::RBracket, None, pos)
            }
            '-' => Token::new(TokenKind::Dash, None, pos),
            '^' => Token::new(TokenKind::Caret, None, pos),
            _ => Token::new(TokenKind::Char, Some(c), pos),
        }
    }

    fn read_escape(&mut self, start: usize) -> Result<Token, SyntaxError> {
        let Some(c) = self.peek() else {
            return Err(SyntaxError::at("dangling escape", start));
        };
        self.i += 1;

        let literal = match c {
            't' => Some('\t'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            'x' => {
                let c = self.read_hex_escape(start)?;
                return Ok(Token::new(TokenKind::Char, Some(c), start));
            }
            'd' | 'D' | 'w' | 'W' | 's' | 'S' => {
                return Ok(Token::new(TokenKind::Shorthand, Some(c), start));
            }
            '-' | ']' if self.in_class => Some(c),
            _ if is_escapable(c) => Some(c),
            // Any other escape: treat as a literal character (non-fatal).
            other => Some(other),
        };
        Ok(Token::new(TokenKind::Char, literal, start))
    }

    fn read_hex_escape(&mut self, start: usize) -> Result<char, SyntaxError> {
        let mut digits = String::with_capacity(2);
        for _ in 0..2 {
            match self.peek() {
                Some(d) if d.is_ascii_hexdigit() => {
                    digits.push(d);
                    self.i += 1;
                }
                Some(_) => return Err(SyntaxError::at("invalid hex escape", start)),
                None => return Err(SyntaxError::at("incomplete hex escape", start)),
            }
        }
        let code = u32::from_str_radix(&digits, 16).map_err(|_| {
            SyntaxError::at("invalid hex escape", start)
        })?;
        char::from_u32(code).ok_or_else(|| SyntaxError::at("invalid hex escape", start))
    }
}

pub fn tokenize(pattern: &str) -> Result<Vec<Token>, SyntaxError> {
    Lexer::new(pattern).tokenize()
}
