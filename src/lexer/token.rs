use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt::Display;

macro_rules! spelling_table {
    ( $( $kind: ident => $lit: literal ),* $(,)? ) => {
        const SPELLINGS: &[(TokenKind, &str)] = &[
            $( (TokenKind::$kind, $lit), )*
        ];
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    KAnd,
    KArray,
    KBegin,
    KConstant,
    KElse,
    KElsif,
    KEnd,
    KExit,
    KIf,
    KIn,
    KIs,
    KLoop,
    KMod,
    KNot,
    KNull,
    KOf,
    KOr,
    KOut,
    KPrint,
    KProcedure,
    KRange,
    KThen,
    KType,
    KWhen,
    KWhile,

    Assign,
    Colon,
    Comma,
    DotDot,
    Equal,
    Exponent,
    Greater,
    GreaterEq,
    LParen,
    Lesser,
    LesserEq,
    Minus,
    NotEqual,
    Plus,
    RParen,
    Semicolon,
    Slash,
    Star,

    Integer,
    Identifier,
    Eof,
}

spelling_table! {
    KAnd => "and",
    KArray => "array",
    KBegin => "begin",
    KConstant => "constant",
    KElse => "else",
    KElsif => "elsif",
    KEnd => "end",
    KExit => "exit",
    KIf => "if",
    KIn => "in",
    KIs => "is",
    KLoop => "loop",
    KMod => "mod",
    KNot => "not",
    KNull => "null",
    KOf => "of",
    KOr => "or",
    KOut => "out",
    KPrint => "print",
    KProcedure => "procedure",
    KRange => "range",
    KThen => "then",
    KType => "type",
    KWhen => "when",
    KWhile => "while",

    Assign => ":=",
    Colon => ":",
    Comma => ",",
    DotDot => "..",
    Equal => "=",
    Exponent => "**",
    Greater => ">",
    GreaterEq => ">=",
    LParen => "(",
    Lesser => "<",
    LesserEq => "<=",
    Minus => "-",
    NotEqual => "/=",
    Plus => "+",
    RParen => ")",
    Semicolon => ";",
    Slash => "/",
    Star => "*",
}

lazy_static! {
    static ref KIND_TO_SPELLING: HashMap<TokenKind, &'static str> =
        SPELLINGS.iter().copied().collect();
    static ref SPELLING_TO_KIND: HashMap<&'static str, TokenKind> =
        SPELLINGS.iter().map(|&(kind, lit)| (lit, kind)).collect();
}

impl TokenKind {
    /// Fixed spelling of a keyword or operator; `None` for integers,
    /// identifiers and end of input.
    pub fn spelling(self) -> Option<&'static str> {
        KIND_TO_SPELLING.get(&self).copied()
    }

    pub fn from_spelling(lit: &str) -> Option<TokenKind> {
        SPELLING_TO_KIND.get(lit).copied()
    }

    pub fn is_keyword(self) -> bool {
        self.spelling()
            .is_some_and(|s| s.starts_with(|c: char| c.is_alphabetic()))
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Integer => write!(f, "integer"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Eof => write!(f, "end of input"),
            kind => write!(f, "'{}'", kind.spelling().unwrap_or("?")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            _ => write!(f, "`{}`", self.lexeme),
        }
    }
}
