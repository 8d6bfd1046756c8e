pub mod token;

use crate::source::{SourceReader, END_OF_TEXT};
use thiserror::Error;
use token::{Token, TokenKind};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexerError {
    #[error("unknown symbol {0:?}")]
    UnknownSymbol(char),
}

pub struct Lexer<'a> {
    reader: SourceReader<'a>,
    current: char,
}

impl<'a> Lexer<'a> {
    pub fn new(mut reader: SourceReader<'a>) -> Self {
        let current = reader.next_character();
        Self { reader, current }
    }

    pub fn reader(&self) -> &SourceReader<'a> {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut SourceReader<'a> {
        &mut self.reader
    }

    pub fn into_reader(self) -> SourceReader<'a> {
        self.reader
    }

    fn advance(&mut self) {
        self.current = self.reader.next_character();
    }

    fn make_token(&self, kind: TokenKind, lexeme: impl Into<String>) -> Token {
        Token::new(
            kind,
            lexeme,
            self.reader.line_number(),
            self.reader.column(),
        )
    }

    fn skip_whitespace(&mut self) {
        while self.current.is_whitespace() {
            self.advance();
        }
    }

    fn take_while<F>(&mut self, pred: F) -> String
    where
        F: Fn(char) -> bool,
    {
        let mut lexeme = String::new();
        while self.current != END_OF_TEXT && pred(self.current) {
            lexeme.push(self.current);
            self.advance();
        }
        lexeme
    }

    fn integer(&mut self) -> Token {
        let lexeme = self.take_while(|c| c.is_ascii_digit());
        self.make_token(TokenKind::Integer, lexeme)
    }

    fn identifier(&mut self) -> Token {
        let lexeme = self.take_while(|c| c == '_' || c.is_alphanumeric());
        match TokenKind::from_spelling(&lexeme) {
            Some(kind) if kind.is_keyword() => self.make_token(kind, lexeme),
            _ => self.make_token(TokenKind::Identifier, lexeme),
        }
    }

    fn operator(&mut self) -> Option<Token> {
        let first = self.current;
        self.advance();

        let pair: String = [first, self.current].iter().collect();
        if let Some(kind) = TokenKind::from_spelling(&pair) {
            self.advance();
            return Some(self.make_token(kind, pair));
        }

        let single = first.to_string();
        TokenKind::from_spelling(&single).map(|kind| self.make_token(kind, single))
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();

            let token = match self.current {
                END_OF_TEXT => self.make_token(TokenKind::Eof, ""),
                c if c.is_ascii_digit() => self.integer(),
                c if c.is_alphabetic() => self.identifier(),
                c => match self.operator() {
                    Some(token) => token,
                    None => {
                        self.reader.report(LexerError::UnknownSymbol(c));
                        continue;
                    }
                },
            };

            log::trace!("token {:?} {:?}", token.kind, token.lexeme);
            return token;
        }
    }

    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            if token.kind == TokenKind::Eof {
                break;
            }
            tokens.push(token);
        }
        tokens
    }
}
