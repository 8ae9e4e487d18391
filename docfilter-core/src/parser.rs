//! Recursive descent parser for filter expressions.
//!
//! Grammar:
//!
//! ```text
//! expr       := and_expr ("or" and_expr)*
//! and_expr   := bool_term ("and" bool_term)*
//! bool_term  := ["not"] comparison
//! comparison := operand comp_op operand | operand "%" operand
//! comp_op    := "==" | "!=" | "<" | "<=" | ">" | ">=" | "in"
//! operand    := identifier | string | number | bool
//!             | "(" operand ("," operand)* [","] ")"
//!             | "[" operand ("," operand)* [","] "]"
//!             | "{" string ":" operand ("," string ":" operand)* [","] "}"
//! ```
//!
//! Patterns on the right of `%` are validated later with the [`regex`] crate's
//! syntax, whichever backend the query is emitted for. Operands nest at most
//! [`MAX_DEPTH`] levels deep.
//!
//! The parser only checks syntax. Field names are not resolved here, so an
//! expression over unknown fields still produces a tree.

use crate::{
    ast::{BinOp, BoolOp, CompareOp, Node},
    error::ParseError,
    lexer::{Lexer, Token, TokenKind},
};

/// How deeply brackets, parentheses and braces may nest inside one operand.
pub const MAX_DEPTH: usize = 64;

/// Parses a filter expression into a [`Node`] tree.
///
/// # Example
///
/// ```
/// use docfilter_core::{ast::{Node, BoolOp}, parser::parse};
///
/// let node = parse(r#"lastname == "Jones" and birthyear in (1900, 1950)"#).unwrap();
/// assert!(matches!(node, Node::BoolOp { op: BoolOp::And, .. }));
/// ```
pub fn parse(input: &str) -> Result<Node, ParseError> {
    Parser::new(Lexer::new(input).tokenize()?).parse_expression()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0, depth: 0 }
    }

    fn current(&self) -> &Token {
        // The lexer always terminates the stream with Eof and `advance` never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if &self.current().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.current();
        ParseError::new(
            format!("Expected {expected}, found {}", token.kind.describe()),
            token.offset,
        )
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<(), ParseError> {
        if self.match_token(kind) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn parse_expression(&mut self) -> Result<Node, ParseError> {
        if self.current().kind == TokenKind::Eof {
            return Err(ParseError::new("Empty expression", self.current().offset));
        }

        let node = self.parse_or()?;

        if self.current().kind != TokenKind::Eof {
            return Err(self.unexpected("'and', 'or' or end of expression"));
        }

        Ok(node)
    }

    fn parse_or(&mut self) -> Result<Node, ParseError> {
        let first = self.parse_and()?;
        self.parse_chain(first, BoolOp::Or, &TokenKind::Or, Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Node, ParseError> {
        let first = self.parse_term()?;
        self.parse_chain(first, BoolOp::And, &TokenKind::And, Self::parse_term)
    }

    /// Collects `first (keyword next)*` into one flat [`Node::BoolOp`].
    fn parse_chain(
        &mut self,
        first: Node,
        op: BoolOp,
        keyword: &TokenKind,
        next: fn(&mut Self) -> Result<Node, ParseError>,
    ) -> Result<Node, ParseError> {
        if &self.current().kind != keyword {
            return Ok(first);
        }

        let mut operands = vec![first];
        while self.match_token(keyword) {
            operands.push(next(self)?);
        }

        Ok(Node::BoolOp { op, operands })
    }

    fn parse_term(&mut self) -> Result<Node, ParseError> {
        if self.match_token(&TokenKind::Not) {
            Ok(Node::Not(Box::new(self.parse_comparison()?)))
        } else {
            self.parse_comparison()
        }
    }

    fn parse_comparison(&mut self) -> Result<Node, ParseError> {
        let left = self.parse_operand()?;

        let op = match self.current().kind {
            TokenKind::EqEq => CompareOp::Eq,
            TokenKind::Ne => CompareOp::Ne,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::Le => CompareOp::Le,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::Ge => CompareOp::Ge,
            TokenKind::In => CompareOp::In,
            TokenKind::Percent => {
                self.advance();
                let right = self.parse_operand()?;
                return Ok(Node::BinOp {
                    left: Box::new(left),
                    op: BinOp::Match,
                    right: Box::new(right),
                });
            }
            _ => return Err(self.unexpected("comparison operator")),
        };
        self.advance();

        let right = self.parse_operand()?;

        Ok(Node::Compare {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    fn parse_operand(&mut self) -> Result<Node, ParseError> {
        let node = match self.current().kind.clone() {
            TokenKind::Ident(name) => Node::Identifier(name),
            TokenKind::Str(value) => Node::String(value),
            TokenKind::Number(number, text) => Node::Number(number, text),
            TokenKind::True => Node::Bool(true),
            TokenKind::False => Node::Bool(false),
            TokenKind::LParen => {
                let (mut items, trailing_comma) =
                    self.nested(|parser| parser.parse_sequence(&TokenKind::RParen, "')'"))?;
                // A parenthesized operand without a comma is the operand itself.
                return Ok(if items.len() == 1 && !trailing_comma {
                    items.remove(0)
                } else {
                    Node::Tuple(items)
                });
            }
            TokenKind::LBracket => {
                let (items, _) = self.nested(|parser| parser.parse_sequence(&TokenKind::RBracket, "']'"))?;
                return Ok(Node::List(items));
            }
            TokenKind::LBrace => return self.nested(Self::parse_dict),
            _ => return Err(self.unexpected("operand")),
        };
        self.advance();

        Ok(node)
    }

    /// Consumes an opening bracket and runs `parse` one nesting level deeper.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T, ParseError>) -> Result<T, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::new("Expression nested too deeply", self.current().offset));
        }

        self.depth += 1;
        self.advance();
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parses `operand ("," operand)* [","] close`, the opening bracket already consumed.
    /// Returns the items and whether the sequence ended with a trailing comma.
    fn parse_sequence(&mut self, close: &TokenKind, expected: &str) -> Result<(Vec<Node>, bool), ParseError> {
        let mut items = vec![self.parse_operand()?];
        let mut trailing_comma = false;

        while self.match_token(&TokenKind::Comma) {
            if &self.current().kind == close {
                trailing_comma = true;
                break;
            }
            items.push(self.parse_operand()?);
        }

        self.expect(close, expected)?;

        Ok((items, trailing_comma))
    }

    fn parse_dict(&mut self) -> Result<Node, ParseError> {
        let mut pairs = vec![self.parse_dict_pair()?];

        while self.match_token(&TokenKind::Comma) {
            if self.current().kind == TokenKind::RBrace {
                break;
            }
            pairs.push(self.parse_dict_pair()?);
        }

        self.expect(&TokenKind::RBrace, "'}'")?;

        Ok(Node::Dict(pairs))
    }

    fn parse_dict_pair(&mut self) -> Result<(String, Node), ParseError> {
        let key = match &self.current().kind {
            TokenKind::Str(key) => key.clone(),
            _ => return Err(self.unexpected("string key")),
        };
        self.advance();
        self.expect(&TokenKind::Colon, "':'")?;

        Ok((key, self.parse_operand()?))
    }
}
