//! Tokenizer for filter expressions.

use std::{iter::Peekable, str::CharIndices};

use crate::{ast::Number, error::ParseError};


#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Str(String),
    /// A number and its source text.
    Number(Number, String),
    True,
    False,
    And,
    Or,
    Not,
    In,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    EqEq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Percent,
    Eof,
}

impl TokenKind {
    /// How the token is written, for error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier '{name}'"),
            TokenKind::Str(value) => format!("string {value:?}"),
            TokenKind::Number(_, text) => format!("number {text}"),
            TokenKind::True => "'true'".into(),
            TokenKind::False => "'false'".into(),
            TokenKind::And => "'and'".into(),
            TokenKind::Or => "'or'".into(),
            TokenKind::Not => "'not'".into(),
            TokenKind::In => "'in'".into(),
            TokenKind::LParen => "'('".into(),
            TokenKind::RParen => "')'".into(),
            TokenKind::LBracket => "'['".into(),
            TokenKind::RBracket => "']'".into(),
            TokenKind::LBrace => "'{'".into(),
            TokenKind::RBrace => "'}'".into(),
            TokenKind::Comma => "','".into(),
            TokenKind::Colon => "':'".into(),
            TokenKind::EqEq => "'=='".into(),
            TokenKind::Ne => "'!='".into(),
            TokenKind::Lt => "'<'".into(),
            TokenKind::Le => "'<='".into(),
            TokenKind::Gt => "'>'".into(),
            TokenKind::Ge => "'>='".into(),
            TokenKind::Percent => "'%'".into(),
            TokenKind::Eof => "end of expression".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

pub(crate) struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            pos: 0,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    fn advance(&mut self) -> Option<char> {
        let (pos, ch) = self.chars.next()?;
        self.pos = pos + ch.len_utf8();
        Some(ch)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.pos..].chars().nth(1)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn token(kind: TokenKind, offset: usize) -> Token {
        Token { kind, offset }
    }

    /// Consumes one character and produces `kind`.
    fn single(&mut self, kind: TokenKind, offset: usize) -> Result<Token, ParseError> {
        self.advance();
        Ok(Self::token(kind, offset))
    }

    /// Consumes one character, then produces `long` if the next character is `=`
    /// and `short` otherwise.
    fn with_optional_eq(&mut self, short: TokenKind, long: TokenKind, offset: usize) -> Result<Token, ParseError> {
        self.advance();
        if self.peek() == Some('=') {
            self.advance();
            Ok(Self::token(long, offset))
        } else {
            Ok(Self::token(short, offset))
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();
        let offset = self.pos;

        let Some(ch) = self.peek() else {
            return Ok(Self::token(TokenKind::Eof, offset));
        };

        match ch {
            '"' | '\'' => self.read_string(ch),
            '-' if self.peek_second().is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_alphabetic() || c == '_' => Ok(self.read_identifier()),
            '(' => self.single(TokenKind::LParen, offset),
            ')' => self.single(TokenKind::RParen, offset),
            '[' => self.single(TokenKind::LBracket, offset),
            ']' => self.single(TokenKind::RBracket, offset),
            '{' => self.single(TokenKind::LBrace, offset),
            '}' => self.single(TokenKind::RBrace, offset),
            ',' => self.single(TokenKind::Comma, offset),
            ':' => self.single(TokenKind::Colon, offset),
            '%' => self.single(TokenKind::Percent, offset),
            '<' => self.with_optional_eq(TokenKind::Lt, TokenKind::Le, offset),
            '>' => self.with_optional_eq(TokenKind::Gt, TokenKind::Ge, offset),
            '=' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Self::token(TokenKind::EqEq, offset))
                } else {
                    Err(ParseError::new("Unknown operator '=', expected '=='", offset))
                }
            }
            '!' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Self::token(TokenKind::Ne, offset))
                } else {
                    Err(ParseError::new("Unknown operator '!', expected '!='", offset))
                }
            }
            other => Err(ParseError::new(format!("Unexpected character '{other}'"), offset)),
        }
    }

    fn read_string(&mut self, quote: char) -> Result<Token, ParseError> {
        let offset = self.pos;
        self.advance();
        let mut value = String::new();

        loop {
            match self.advance() {
                None => return Err(ParseError::new("Unterminated string", offset)),
                Some(ch) if ch == quote => break,
                Some('\\') => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(ch) => value.push(ch),
                    None => return Err(ParseError::new("Unterminated escape sequence", self.pos)),
                },
                Some(ch) => value.push(ch),
            }
        }

        Ok(Self::token(TokenKind::Str(value), offset))
    }

    fn read_number(&mut self) -> Result<Token, ParseError> {
        let offset = self.pos;

        if self.peek() == Some('-') {
            self.advance();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        let mut fractional = false;
        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            fractional = true;
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = &self.input[offset..self.pos];
        let number = if fractional {
            text.parse::<f64>().map(Number::Float).ok()
        } else {
            text.parse::<i64>().map(Number::Int).ok()
        };

        number
            .map(|number| Self::token(TokenKind::Number(number, text.to_string()), offset))
            .ok_or_else(|| ParseError::new(format!("Invalid number '{text}'"), offset))
    }

    /// Identifiers may contain dots to address embedded fields (`address.city`).
    fn read_identifier(&mut self) -> Token {
        let offset = self.pos;

        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '.') {
            self.advance();
        }

        let kind = match &self.input[offset..self.pos] {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "in" => TokenKind::In,
            "true" | "True" => TokenKind::True,
            "false" | "False" => TokenKind::False,
            name => TokenKind::Ident(name.to_string()),
        };

        Self::token(kind, offset)
    }
}
