//! Token stream → syntax tree.
//!
//! Recursive descent over the grammar in the crate's top-level
//! documentation: `Alt := Concat ('|' Concat)*`, `Concat := Repeat+`,
//! `Repeat := Primary ('*'|'+'|'?'|'{'...'}')?`, `Primary := ...`.

use crate::{
    ast::{ClassItem, Expr, RepeatRange},
    error::SyntaxError,
    lexer,
    token::{Token, TokenKind},
};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    group_index: u32,
}

/// A parsed pattern together with the total number of capturing groups it
/// declares — needed by the matcher to size a dense, zero-based group list
/// even for matches where a trailing group never actually fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub expr: Expr,
    pub group_count: u32,
}

pub fn parse(pattern: &str) -> Result<Parsed, SyntaxError> {
    let tokens = lexer::tokenize(pattern)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        group_index: 0,
    };
    let expr = parser.parse_alt()?;
    parser.expect_eof()?;
    Ok(Parsed {
        expr,
        group_count: parser.group_index,
    })
}

impl Parser {
    fn peek(&self) -> Token {
        self.peek_at(0)
    }

    fn peek_at(&self, k: usize) -> Token {
        let idx = (self.pos + k).min(self.tokens.len() - 1);
        self.tokens[idx]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect_eof(&mut self) -> Result<(), SyntaxError> {
        let tok = self.peek();
        if tok.kind != TokenKind::Eof {
            return Err(SyntaxError::at(
                "trailing input after a valid expression",
                tok.pos,
            ));
        }
        Ok(())
    }

    fn parse_alt(&mut self) -> Result<Expr, SyntaxError> {
        let mut options = vec![self.parse_concat()?];
        while self.peek().kind == TokenKind::Pipe {
            self.advance();
            options.push(self.parse_concat()?);
        }
        Ok(if options.len() == 1 {
            options.into_iter().next().unwrap()
        } else {
            Expr::Alt(options)
        })
    }

    fn parse_concat(&mut self) -> Result<Expr, SyntaxError> {
        let mut parts = Vec::new();
        while !matches!(
            self.peek().kind,
            TokenKind::Eof | TokenKind::RParen | TokenKind::Pipe
        ) {
            parts.push(self.parse_repeat()?);
        }
        Ok(match parts.len() {
            0 => Expr::Empty,
            1 => parts.into_iter().next().unwrap(),
            _ => Expr::Concat(parts),
        })
    }

    fn parse_repeat(&mut self) -> Result<Expr, SyntaxError> {
        let expr = self.parse_primary()?;
        let tok = self.peek();
        let range = match tok.kind {
            TokenKind::Star => {
                self.advance();
                Some(RepeatRange::star())
            }
            TokenKind::Plus => {
                self.advance();
                Some(RepeatRange::plus())
            }
            TokenKind::Question => {
                self.advance();
                Some(RepeatRange::question())
            }
            TokenKind::LBrace => {
                self.advance();
                Some(self.parse_brace_quant(tok.pos)?)
            }
            _ => None,
        };
        let Some(range) = range else {
            return Ok(expr);
        };
        let expr = Expr::Repeat {
            expr: Box::new(expr),
            range,
        };
        // A `?` directly after an already-applied quantifier is the lazy
        // hint (`a*?`, `a{2,3}?`, ...). The matcher is greedy-only, so it is
        // accepted syntactically and simply consumed.
        if self.peek().kind == TokenKind::Question {
            self.advance();
        }
        Ok(expr)
    }

    fn parse_number(&mut self) -> Option<u32> {
        let mut value = None;
        while self.peek().kind == TokenKind::Char {
            let Some(c) = self.peek().value else { break };
            let Some(d) = c.to_digit(10) else { break };
            value = Some(value.unwrap_or(0) * 10 + d);
            self.advance();
        }
        value
    }

    fn parse_brace_quant(&mut self, brace_pos: usize) -> Result<RepeatRange, SyntaxError> {
        let malformed = || SyntaxError::at("malformed quantifier body", brace_pos);
        let m = self.parse_number().ok_or_else(malformed)?;
        match self.peek().kind {
            TokenKind::RBrace => {
                self.advance();
                Ok(RepeatRange::exact(m))
            }
            TokenKind::Comma => {
                self.advance();
                let n = self.parse_number();
                if self.peek().kind != TokenKind::RBrace {
                    return Err(malformed());
                }
                self.advance();
                match n {
                    Some(n) if m > n => {
                        Err(SyntaxError::at("invalid range in quantifier", brace_pos))
                    }
                    Some(n) => Ok(RepeatRange { m, n: Some(n) }),
                    None => Ok(RepeatRange { m, n: None }),
                }
            }
            _ => Err(malformed()),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Char => Ok(Expr::Literal(tok.value.unwrap())),
            TokenKind::Dot => Ok(Expr::Dot),
            TokenKind::Caret => Ok(Expr::AnchorStart),
            TokenKind::Dollar => Ok(Expr::AnchorEnd),
            TokenKind::Shorthand => Ok(Expr::Shorthand(tok.value.unwrap())),
            TokenKind::LParen => {
                self.group_index += 1;
                let index = self.group_index;
                let inner = self.parse_alt()?;
                if self.peek().kind != TokenKind::RParen {
                    return Err(SyntaxError::at("unmatched ( or missing )", tok.pos));
                }
                self.advance();
                Ok(Expr::Group {
                    expr: Box::new(inner),
                    index,
                })
            }
            TokenKind::LBracket => self.parse_char_class(tok.pos),
            TokenKind::Star | TokenKind::Plus | TokenKind::Question | TokenKind::LBrace => {
                Err(SyntaxError::at("quantifier without target", tok.pos))
            }
            _ => Err(SyntaxError::at("expected expression", tok.pos)),
        }
    }

    fn parse_class_atom(&mut self) -> Result<ClassItem, SyntaxError> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Char => Ok(ClassItem::Literal(tok.value.unwrap())),
            TokenKind::Shorthand => Ok(ClassItem::Shorthand(tok.value.unwrap())),
            TokenKind::Dash => Ok(ClassItem::Literal('-')),
            TokenKind::Caret => Ok(ClassItem::Literal('^')),
            TokenKind::Eof => Err(SyntaxError::at("unterminated character class", tok.pos)),
            _ => Err(SyntaxError::at("unexpected token in character class", tok.pos)),
        }
    }

    fn parse_char_class(&mut self, lbracket_pos: usize) -> Result<Expr, SyntaxError> {
        let mut negated = false;
        if self.peek().kind == TokenKind::Caret {
            negated = true;
            self.advance();
        }

        let mut items = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::RBracket => break,
                TokenKind::Eof => {
                    return Err(SyntaxError::at(
                        "unterminated character class",
                        self.peek().pos,
                    ))
                }
                _ => {}
            }

            let start_pos = self.peek().pos;
            let lo = self.parse_class_atom()?;
            let is_range = self.peek().kind == TokenKind::Dash
                && self.peek_at(1).kind != TokenKind::RBracket
                && self.peek_at(1).kind != TokenKind::Eof;
            if is_range {
                self.advance();
                let hi = self.parse_class_atom()?;
                match (&lo, &hi) {
                    (ClassItem::Literal(lo), ClassItem::Literal(hi)) if lo <= hi => {
                        items.push(ClassItem::Range(*lo, *hi));
                    }
                    _ => return Err(SyntaxError::at("invalid range", start_pos)),
                }
            } else {
                items.push(lo);
            }
        }

        if items.is_empty() {
            return Err(SyntaxError::at("empty character class", lbracket_pos));
        }
        self.advance(); // RBracket
        Ok(Expr::CharClass { items, negated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pattern_is_empty_expr() {
        assert_eq!(parse("").unwrap().expr, Expr::Empty);
    }

    #[test]
    fn empty_group_is_empty_expr() {
        assert_eq!(
            parse("()").unwrap().expr,
            Expr::Group {
                expr: Box::new(Expr::Empty),
                index: 1,
            }
        );
    }

    #[test]
    fn literal_concat() {
        assert_eq!(
            parse("ab").unwrap().expr,
            Expr::Concat(vec![Expr::Literal('a'), Expr::Literal('b')])
        );
    }

    #[test]
    fn alternation_collapses_single_option() {
        assert_eq!(parse("a").unwrap().expr, Expr::Literal('a'));
    }

    #[test]
    fn alternation_of_two() {
        assert_eq!(
            parse("a|b").unwrap().expr,
            Expr::Alt(vec![Expr::Literal('a'), Expr::Literal('b')])
        );
    }

    #[test]
    fn group_numbering_is_by_open_paren_order() {
        let expr = parse("(a(b))(c)").unwrap().expr;
        let Expr::Concat(parts) = expr else {
            panic!("expected concat")
        };
        let Expr::Group { index: 1, .. } = parts[0] else {
            panic!("expected group 1")
        };
        let Expr::Group { index: 3, .. } = parts[1] else {
            panic!("expected group 3")
        };
    }

    #[test]
    fn quantifiers() {
        assert_eq!(
            parse("a*").unwrap().expr,
            Expr::Repeat {
                expr: Box::new(Expr::Literal('a')),
                range: RepeatRange::star()
            }
        );
        assert_eq!(
            parse("a{2,5}").unwrap().expr,
            Expr::Repeat {
                expr: Box::new(Expr::Literal('a')),
                range: RepeatRange { m: 2, n: Some(5) }
            }
        );
        assert_eq!(
            parse("a{2}").unwrap().expr,
            Expr::Repeat {
                expr: Box::new(Expr::Literal('a')),
                range: RepeatRange::exact(2)
            }
        );
        assert_eq!(
            parse("a{2,}").unwrap().expr,
            Expr::Repeat {
                expr: Box::new(Expr::Literal('a')),
                range: RepeatRange { m: 2, n: None }
            }
        );
    }

    #[test]
    fn lazy_suffix_is_accepted_and_ignored() {
        assert_eq!(
            parse("a*?").unwrap().expr,
            Expr::Repeat {
                expr: Box::new(Expr::Literal('a')),
                range: RepeatRange::star()
            }
        );
    }

    #[test]
    fn char_class_range_and_negation() {
        assert_eq!(
            parse("[^a-z0-9]").unwrap().expr,
            Expr::CharClass {
                items: vec![ClassItem::Range('a', 'z'), ClassItem::Range('0', '9')],
                negated: true,
            }
        );
    }

    #[test]
    fn char_class_leading_trailing_dash_is_literal() {
        assert_eq!(
            parse("[-a-]").unwrap().expr,
            Expr::CharClass {
                items: vec![
                    ClassItem::Literal('-'),
                    ClassItem::Literal('a'),
                    ClassItem::Literal('-'),
                ],
                negated: false,
            }
        );
    }

    #[test]
    fn quantifier_without_target_errors() {
        let err = parse("*a").unwrap_err();
        assert_eq!(err.message, "quantifier without target");
        assert_eq!(err.position, Some(0));
    }

    #[test]
    fn group_count_reflects_groups_that_never_fire() {
        assert_eq!(parse("(a)(b)?").unwrap().group_count, 2);
        assert_eq!(parse("abc").unwrap().group_count, 0);
    }

    #[test]
    fn unmatched_paren_reports_open_position() {
        let err = parse("(abc").unwrap_err();
        assert_eq!(err.message, "unmatched ( or missing )");
        assert_eq!(err.position, Some(0));
    }

    #[test]
    fn invalid_brace_range_reports_brace_position() {
        let err = parse("a{3,2}").unwrap_err();
        assert_eq!(err.message, "invalid range in quantifier");
        assert_eq!(err.position, Some(1));
    }

    #[test]
    fn malformed_brace_quant() {
        assert_eq!(parse("a{,3}").unwrap_err().message, "malformed quantifier body");
        assert_eq!(parse("a{a}").unwrap_err().message, "malformed quantifier body");
    }

    #[test]
    fn inverted_class_range_errors() {
        assert_eq!(parse("[z-a]").unwrap_err().message, "invalid range");
    }

    #[test]
    fn empty_class_errors() {
        assert_eq!(parse("[]").unwrap_err().message, "empty character class");
    }

    #[test]
    fn unterminated_class_errors() {
        assert_eq!(
            parse("[abc").unwrap_err().message,
            "unterminated character class"
        );
    }

    #[test]
    fn trailing_input_errors() {
        let err = parse("a)b").unwrap_err();
        assert_eq!(err.message, "trailing input after a valid expression");
        assert_eq!(err.position, Some(1));
    }
}
