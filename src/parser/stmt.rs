use super::*;

// <statements>          ::= <statement> { <statement> }
// <statement>           ::= <assignment-or-call> | <if> | <loop> | <exit> | <null> | <print>
// <assignment-or-call>  ::= <name> [ ":=" <expr> ] ";"
// <if>                  ::= "if" <condition> "then" <statements>
//                           { "elsif" <condition> "then" <statements> }
//                           [ "else" <statements> ] "end" "if" ";"
// <loop>                ::= [ "while" <condition> ] "loop" <statements> "end" "loop" ";"
// <exit>                ::= "exit" [ "when" <condition> ] ";"
// <null>                ::= "null" ";"
// <print>               ::= "print" "(" <expr> ")" ";"

fn starts_statement(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
            | TokenKind::KExit
            | TokenKind::KIf
            | TokenKind::KLoop
            | TokenKind::KNull
            | TokenKind::KPrint
            | TokenKind::KWhile
    )
}

impl<'a> Parser<'a> {
    pub(super) fn sequence_of_statements(&mut self) -> ParseResult<()> {
        self.statement()?;
        while starts_statement(self.token.kind) {
            self.statement()?;
        }
        Ok(())
    }

    fn statement(&mut self) -> ParseResult<()> {
        match self.token.kind {
            TokenKind::Identifier => self.assignment_or_call(),
            TokenKind::KExit => self.exit_statement(),
            TokenKind::KIf => self.if_statement(),
            TokenKind::KNull => self.null_statement(),
            TokenKind::KWhile | TokenKind::KLoop => self.loop_statement(),
            TokenKind::KPrint => self.print_statement(),
            _ => {
                let got = self.token.to_string();
                Err(self.fatal(ParseErrorType::Expected {
                    exp: "statement",
                    got,
                }))
            }
        }
    }

    fn assignment_or_call(&mut self) -> ParseResult<()> {
        let (entry, indexed) = self.name()?;

        if self.at(TokenKind::Assign) {
            self.check_role(entry, NameUse::Target);
            self.advance();
            let value = self.expression()?;

            // Indexed stores never touch the entry's value.
            if let Some(id) = entry.filter(|_| !indexed) {
                if NameUse::Target.roles().contains(&self.table.entry(id).role) {
                    let group = self.table.group_of(id);
                    self.table.set_value(group, value.map(Value::Integer));
                }
            }
        } else {
            self.check_role(entry, NameUse::Procedure);
        }

        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(())
    }

    fn exit_statement(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::KExit, "'exit'")?;
        if self.at(TokenKind::KWhen) {
            self.advance();
            self.condition()?;
        }
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(())
    }

    fn if_statement(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::KIf, "'if'")?;
        self.condition()?;
        self.expect(TokenKind::KThen, "'then'")?;
        self.sequence_of_statements()?;

        while self.at(TokenKind::KElsif) {
            self.advance();
            self.condition()?;
            self.expect(TokenKind::KThen, "'then'")?;
            self.sequence_of_statements()?;
        }

        if self.at(TokenKind::KElse) {
            self.advance();
            self.sequence_of_statements()?;
        }

        self.expect(TokenKind::KEnd, "'end'")?;
        self.expect(TokenKind::KIf, "'if'")?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(())
    }

    fn null_statement(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::KNull, "'null'")?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(())
    }

    fn loop_statement(&mut self) -> ParseResult<()> {
        if self.at(TokenKind::KWhile) {
            self.advance();
            self.condition()?;
        }
        self.expect(TokenKind::KLoop, "'loop'")?;
        self.sequence_of_statements()?;
        self.expect(TokenKind::KEnd, "'end'")?;
        self.expect(TokenKind::KLoop, "'loop'")?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(())
    }

    fn print_statement(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::KPrint, "'print'")?;
        self.expect(TokenKind::LParen, "'('")?;
        match self.expression()? {
            Some(value) => self.emit_value(value),
            None => return Err(self.fatal(ParseErrorType::IllegalPrintOperand)),
        }
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(())
    }
}
