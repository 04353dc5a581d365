//! Textual unit-expression parsing
//!
//! Hosts that surface annotation metadata as source text (rather than a
//! structured expression) go through here: a logos lexer and a small
//! recursive-descent parser produce a [`MetaExpr`]. Any lex or parse failure
//! yields `None`, matching the extractor's fail-open policy.
//!
//! Grammar:
//! ```text
//! expr   := term (('*' | '/') term)*
//! term   := factor (('^' | '**') int)?
//! factor := path | int | '(' expr ')'
//! path   := ident ('.' ident)*
//! ```

use super::MetaExpr;
use logos::Logos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Logos)]
#[logos(skip r"[ \t\r\n]+")]
enum TokenKind {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[regex(r"-?[0-9]+")]
    Int,
    #[token(".")]
    Dot,
    #[token("**")]
    DoubleStar,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
}

struct Token<'a> {
    kind: TokenKind,
    text: &'a str,
}

fn lex(source: &str) -> Option<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    for (result, span) in TokenKind::lexer(source).spanned() {
        let kind = result.ok()?;
        tokens.push(Token {
            kind,
            text: &source[span],
        });
    }
    Some(tokens)
}

/// Parse a textual unit expression like `pq.meter / pq.second` or `m^2`
pub fn parse_meta(source: &str) -> Option<MetaExpr> {
    let tokens = lex(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return None; // trailing tokens
    }
    Some(expr)
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn bump(&mut self) -> Option<&Token<'a>> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Option<MetaExpr> {
        let mut lhs = self.term()?;
        loop {
            if self.eat(TokenKind::Star) {
                lhs = lhs.mul(self.term()?);
            } else if self.eat(TokenKind::Slash) {
                lhs = lhs.div(self.term()?);
            } else {
                break;
            }
        }
        Some(lhs)
    }

    fn term(&mut self) -> Option<MetaExpr> {
        let base = self.factor()?;
        if self.eat(TokenKind::Caret) || self.eat(TokenKind::DoubleStar) {
            let token = self.bump()?;
            if token.kind != TokenKind::Int {
                return None;
            }
            let exponent: i64 = token.text.parse().ok()?;
            return Some(base.pow(exponent));
        }
        Some(base)
    }

    fn factor(&mut self) -> Option<MetaExpr> {
        match self.peek()? {
            TokenKind::Ident => self.path(),
            TokenKind::Int => {
                let token = self.bump()?;
                Some(MetaExpr::Int(token.text.parse().ok()?))
            }
            TokenKind::LParen => {
                self.pos += 1;
                let inner = self.expr()?;
                if !self.eat(TokenKind::RParen) {
                    return None;
                }
                Some(inner)
            }
            _ => None,
        }
    }

    fn path(&mut self) -> Option<MetaExpr> {
        let mut segments = Vec::new();
        let token = self.bump()?;
        segments.push(token.text.to_string());
        while self.eat(TokenKind::Dot) {
            let token = self.bump()?;
            if token.kind != TokenKind::Ident {
                return None;
            }
            segments.push(token.text.to_string());
        }
        Some(MetaExpr::Path(segments))
    }
}
