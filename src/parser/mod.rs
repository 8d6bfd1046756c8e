mod expr;
mod stmt;

use std::fmt::Display;
use std::io::{self, Write};

use crate::lexer::token::{Token, TokenKind};
use crate::lexer::Lexer;
use crate::source::SourceReader;
use crate::symbol_table::entry::{EntryId, GroupId, Role, Value};
use crate::symbol_table::{SemanticError, SymbolTable};
use thiserror::Error;

// <compilation>        ::= <subprogram-body> EOF
// <subprogram-body>    ::= <subprogram-spec> "is" <declarative-part>
//                          "begin" <statements> "end" [ <identifier> ] ";"
// <subprogram-spec>    ::= "procedure" <identifier> [ <formal-part> ]
// <formal-part>        ::= "(" <param-spec> { ";" <param-spec> } ")"
// <param-spec>         ::= <identifier-list> ":" <mode> <type-name>
// <mode>               ::= [ "in" ] [ "out" ]
// <declarative-part>   ::= { <basic-declaration> }
// <basic-declaration>  ::= <type-decl> | <number-or-object-decl> | <subprogram-body>
// <type-decl>          ::= "type" <identifier> "is" <type-definition> ";"
// <number-or-object-decl>
//                      ::= <identifier-list> ":" ( "constant" ":=" <expr> | <type-definition> ) ";"
// <type-definition>    ::= <enumeration> | <array> | <range> | <type-name>
// <enumeration>        ::= "(" <identifier-list> ")"
// <array>              ::= "array" "(" <index> { "," <index> } ")" "of" <type-name>
// <index>              ::= <range> | <type-name>
// <range>              ::= "range" <simple-expr> ".." <simple-expr>

#[derive(Error, Debug)]
#[error("{error}")]
pub struct ParseError {
    pub token: Token,
    #[source]
    pub error: ParseErrorType,
}

#[derive(Error, Debug)]
pub enum ParseErrorType {
    #[error("{exp} expected, got {got}")]
    Expected { exp: &'static str, got: String },

    #[error("illegal print operand")]
    IllegalPrintOperand,
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Syntactic position a name is used in, and the roles allowed there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameUse {
    TypeName,
    Target,
    Operand,
    Procedure,
}

impl NameUse {
    fn roles(self) -> &'static [Role] {
        match self {
            NameUse::TypeName => &[Role::Type],
            NameUse::Target => &[Role::Var, Role::Param],
            NameUse::Operand => &[Role::Var, Role::Param, Role::Const],
            NameUse::Procedure => &[Role::Proc],
        }
    }

    fn description(self) -> &'static str {
        match self {
            NameUse::TypeName => "type name",
            NameUse::Target => "variable or parameter name",
            NameUse::Operand => "variable, parameter or constant name",
            NameUse::Procedure => "procedure name",
        }
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    table: SymbolTable,
    token: Token,
    output: &'a mut dyn Write,
    output_error: Option<io::Error>,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>, output: &'a mut dyn Write) -> Self {
        let table = SymbolTable::with_builtins();
        lexer
            .reader_mut()
            .note(format_args!("*** Entered level {}", table.level()));
        let token = lexer.next_token();
        Self {
            lexer,
            table,
            token,
            output,
            output_error: None,
        }
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn reader(&self) -> &SourceReader<'a> {
        self.lexer.reader()
    }

    /// Hands back the diagnostic reader together with the first failure to
    /// write program output, if any.
    pub fn finish(self) -> (SourceReader<'a>, Option<io::Error>) {
        (self.lexer.into_reader(), self.output_error)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.token.kind == kind
    }

    fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();
        std::mem::replace(&mut self.token, next)
    }

    fn expect(&mut self, kind: TokenKind, exp: &'static str) -> ParseResult<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            let got = self.token.to_string();
            Err(self.fatal(ParseErrorType::Expected { exp, got }))
        }
    }

    fn report(&mut self, message: impl Display) {
        self.lexer.reader_mut().report(message);
    }

    fn fatal(&mut self, error: ParseErrorType) -> ParseError {
        let err = ParseError {
            token: self.token.clone(),
            error,
        };
        self.report(&err);
        err
    }

    fn declare(&mut self, role: Role) -> ParseResult<Option<EntryId>> {
        let name = self.expect(TokenKind::Identifier, "identifier")?;
        match self.table.declare(&name.lexeme, role) {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                self.report(e);
                Ok(None)
            }
        }
    }

    fn find(&mut self) -> ParseResult<Option<EntryId>> {
        let name = self.expect(TokenKind::Identifier, "identifier")?;
        match self.table.lookup(&name.lexeme) {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                self.report(e);
                Ok(None)
            }
        }
    }

    fn open_scope(&mut self) {
        self.table.enter_scope();
        let level = self.table.level();
        self.lexer
            .reader_mut()
            .note(format_args!("*** Entered level {}", level));
    }

    /// Pops the innermost scope. Verbose runs get a dump of its entries.
    fn close_scope(&mut self) {
        let level = self.table.level();
        let Some(frame) = self.table.exit_scope() else {
            return;
        };
        let reader = self.lexer.reader_mut();
        reader.note(format_args!("*** Symbol table for level {}", level));
        for &id in frame.values() {
            reader.note(self.table.entry(id));
        }
        reader.note(format_args!("*** Exited level {}", level));
    }

    fn check_role(&mut self, entry: Option<EntryId>, usage: NameUse) {
        let Some(id) = entry else {
            return;
        };
        let role = self.table.entry(id).role;
        if role != Role::Unset && !usage.roles().contains(&role) {
            self.report(SemanticError::RoleMismatch(usage.description()));
        }
    }

    fn integer_value(&self, entry: Option<EntryId>) -> Option<i64> {
        entry
            .and_then(|id| self.table.entry(id).value)
            .and_then(Value::as_integer)
    }

    fn emit_value(&mut self, value: i64) {
        log::info!("print {}", value);
        if let Err(e) = writeln!(self.output, "{}", value) {
            log::error!("failed to write program output: {}", e);
            self.output_error.get_or_insert(e);
        }
    }
}

impl<'a> Parser<'a> {
    pub fn compilation(&mut self) -> ParseResult<()> {
        self.subprogram_body()?;
        self.expect(TokenKind::Eof, "end of input")?;
        self.close_scope();
        Ok(())
    }

    fn subprogram_body(&mut self) -> ParseResult<()> {
        self.subprogram_spec()?;
        self.expect(TokenKind::KIs, "'is'")?;
        self.declarative_part()?;
        self.expect(TokenKind::KBegin, "'begin'")?;
        self.sequence_of_statements()?;
        self.expect(TokenKind::KEnd, "'end'")?;
        self.close_scope();

        if self.at(TokenKind::Identifier) {
            let entry = self.find()?;
            self.check_role(entry, NameUse::Procedure);
        }
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(())
    }

    fn subprogram_spec(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::KProcedure, "'procedure'")?;
        self.declare(Role::Proc)?;
        self.open_scope();
        if self.at(TokenKind::LParen) {
            self.formal_part()?;
        }
        Ok(())
    }

    fn formal_part(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::LParen, "'('")?;
        self.parameter_spec()?;
        while self.at(TokenKind::Semicolon) {
            self.advance();
            self.parameter_spec()?;
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(())
    }

    fn parameter_spec(&mut self) -> ParseResult<()> {
        let group = self.identifier_list()?;
        self.set_role(group, Role::Param);
        self.expect(TokenKind::Colon, "':'")?;
        self.mode();
        self.type_name()
    }

    fn mode(&mut self) {
        if self.at(TokenKind::KIn) {
            self.advance();
        }
        if self.at(TokenKind::KOut) {
            self.advance();
        }
    }

    fn type_name(&mut self) -> ParseResult<()> {
        let entry = self.find()?;
        self.check_role(entry, NameUse::TypeName);
        Ok(())
    }

    /// Declares every name of the list into one group. The group is `None`
    /// only when no name could be declared.
    fn identifier_list(&mut self) -> ParseResult<Option<GroupId>> {
        let mut group = None;
        loop {
            let name = self.expect(TokenKind::Identifier, "identifier")?;
            let declared = match group {
                Some(group) => self.table.declare_in(&name.lexeme, group),
                None => self.table.declare(&name.lexeme, Role::Unset),
            };
            match declared {
                Ok(id) => {
                    group.get_or_insert(self.table.group_of(id));
                }
                Err(e) => self.report(e),
            }

            if !self.at(TokenKind::Comma) {
                return Ok(group);
            }
            self.advance();
        }
    }

    fn set_role(&mut self, group: Option<GroupId>, role: Role) {
        if let Some(group) = group {
            self.table.set_role(group, role);
        }
    }

    fn declarative_part(&mut self) -> ParseResult<()> {
        while let TokenKind::KType | TokenKind::KProcedure | TokenKind::Identifier = self.token.kind
        {
            self.basic_declaration()?;
        }
        Ok(())
    }

    fn basic_declaration(&mut self) -> ParseResult<()> {
        match self.token.kind {
            TokenKind::KType => self.type_declaration(),
            TokenKind::KProcedure => self.subprogram_body(),
            _ => self.number_or_object_declaration(),
        }
    }

    fn number_or_object_declaration(&mut self) -> ParseResult<()> {
        let group = self.identifier_list()?;
        self.expect(TokenKind::Colon, "':'")?;

        if self.at(TokenKind::KConstant) {
            self.set_role(group, Role::Const);
            self.advance();
            self.expect(TokenKind::Assign, "':='")?;
            if let (Some(group), Some(value)) = (group, self.expression()?) {
                self.table.set_value(group, Some(Value::Integer(value)));
            }
        } else {
            self.set_role(group, Role::Var);
            self.type_definition()?;
        }

        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(())
    }

    fn type_declaration(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::KType, "'type'")?;
        self.declare(Role::Type)?;
        self.expect(TokenKind::KIs, "'is'")?;
        self.type_definition()?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(())
    }

    fn type_definition(&mut self) -> ParseResult<()> {
        match self.token.kind {
            TokenKind::LParen => self.enumeration_type_definition(),
            TokenKind::KArray => self.array_type_definition(),
            TokenKind::KRange => self.range(),
            TokenKind::Identifier => self.type_name(),
            _ => {
                let got = self.token.to_string();
                Err(self.fatal(ParseErrorType::Expected {
                    exp: "type definition",
                    got,
                }))
            }
        }
    }

    fn enumeration_type_definition(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::LParen, "'('")?;
        let group = self.identifier_list()?;
        self.set_role(group, Role::Const);
        self.expect(TokenKind::RParen, "')'")?;
        Ok(())
    }

    fn array_type_definition(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::KArray, "'array'")?;
        self.expect(TokenKind::LParen, "'('")?;
        self.index()?;
        while self.at(TokenKind::Comma) {
            self.advance();
            self.index()?;
        }
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::KOf, "'of'")?;
        self.type_name()
    }

    fn index(&mut self) -> ParseResult<()> {
        match self.token.kind {
            TokenKind::KRange => self.range(),
            TokenKind::Identifier => self.type_name(),
            _ => {
                let got = self.token.to_string();
                Err(self.fatal(ParseErrorType::Expected { exp: "index", got }))
            }
        }
    }

    fn range(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::KRange, "'range'")?;
        self.simple_expression()?;
        self.expect(TokenKind::DotDot, "'..'")?;
        self.simple_expression()?;
        Ok(())
    }
}
