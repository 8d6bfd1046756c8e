use super::*;

// <expr>         ::= <relation> { "and" <relation> } | <relation> { "or" <relation> }
// <relation>     ::= <simple-expr> [ <relop> <simple-expr> ]
// <simple-expr>  ::= [ "+" | "-" ] <term> { ( "+" | "-" ) <term> }
// <term>         ::= <factor> { ( "*" | "/" | "mod" ) <factor> }
// <factor>       ::= "not" <primary> | <primary> [ "**" <primary> ]
// <primary>      ::= <integer> | "(" <expr> ")" | <name>
// <name>         ::= <identifier> [ "(" <expr> { "," <expr> } ")" ]
//
// Every routine returns the folded value of what it parsed, or `None` once
// anything that is not compile-time integer arithmetic took part.

pub(super) type Folded = Option<i64>;

impl<'a> Parser<'a> {
    pub(super) fn expression(&mut self) -> ParseResult<Folded> {
        let value = self.relation()?;

        let logical_op = match self.token.kind {
            op @ (TokenKind::KAnd | TokenKind::KOr) => op,
            _ => return Ok(value),
        };
        while self.at(logical_op) {
            self.advance();
            self.relation()?;
        }
        Ok(None)
    }

    pub(super) fn condition(&mut self) -> ParseResult<()> {
        self.expression()?;
        Ok(())
    }

    fn relation(&mut self) -> ParseResult<Folded> {
        let value = self.simple_expression()?;
        match self.token.kind {
            TokenKind::Equal
            | TokenKind::NotEqual
            | TokenKind::Lesser
            | TokenKind::LesserEq
            | TokenKind::Greater
            | TokenKind::GreaterEq => {
                self.advance();
                self.simple_expression()?;
                Ok(None)
            }
            _ => Ok(value),
        }
    }

    pub(super) fn simple_expression(&mut self) -> ParseResult<Folded> {
        let sign = match self.token.kind {
            TokenKind::Plus | TokenKind::Minus => Some(self.advance().kind),
            _ => None,
        };

        let mut value = self.term()?;
        if sign == Some(TokenKind::Minus) {
            value = self.fold(TokenKind::Minus, Some(0), value);
        }

        while let TokenKind::Plus | TokenKind::Minus = self.token.kind {
            let op = self.advance().kind;
            let rhs = self.term()?;
            value = self.fold(op, value, rhs);
        }
        Ok(value)
    }

    fn term(&mut self) -> ParseResult<Folded> {
        let mut value = self.factor()?;
        while let TokenKind::Star | TokenKind::Slash | TokenKind::KMod = self.token.kind {
            let op = self.advance().kind;
            let rhs = self.factor()?;
            value = self.fold(op, value, rhs);
        }
        Ok(value)
    }

    fn factor(&mut self) -> ParseResult<Folded> {
        if self.at(TokenKind::KNot) {
            self.advance();
            self.primary()?;
            return Ok(None);
        }

        let base = self.primary()?;
        if self.at(TokenKind::Exponent) {
            self.advance();
            let exponent = self.primary()?;
            return Ok(self.fold(TokenKind::Exponent, base, exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> ParseResult<Folded> {
        match self.token.kind {
            TokenKind::Integer => {
                let literal = self.advance();
                match literal.lexeme.parse::<i64>() {
                    Ok(value) => Ok(Some(value)),
                    Err(_) => {
                        self.report(SemanticError::ConstantOverflow);
                        Ok(None)
                    }
                }
            }
            TokenKind::LParen => {
                self.advance();
                let value = self.expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(value)
            }
            TokenKind::Identifier => {
                let (entry, indexed) = self.name()?;
                self.check_role(entry, NameUse::Operand);
                if indexed {
                    Ok(None)
                } else {
                    Ok(self.integer_value(entry))
                }
            }
            _ => {
                let got = self.token.to_string();
                Err(self.fatal(ParseErrorType::Expected {
                    exp: "expression",
                    got,
                }))
            }
        }
    }

    /// Resolves a name and parses an optional index or argument list. The
    /// flag tells whether such a list followed.
    pub(super) fn name(&mut self) -> ParseResult<(Option<EntryId>, bool)> {
        let entry = self.find()?;
        if self.at(TokenKind::LParen) {
            self.indexed_component()?;
            return Ok((entry, true));
        }
        Ok((entry, false))
    }

    fn indexed_component(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::LParen, "'('")?;
        self.expression()?;
        while self.at(TokenKind::Comma) {
            self.advance();
            self.expression()?;
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(())
    }

    fn fold(&mut self, op: TokenKind, lhs: Folded, rhs: Folded) -> Folded {
        let (lhs, rhs) = (lhs?, rhs?);
        let result = match op {
            TokenKind::Plus => lhs.checked_add(rhs),
            TokenKind::Minus => lhs.checked_sub(rhs),
            TokenKind::Star => lhs.checked_mul(rhs),
            TokenKind::Slash | TokenKind::KMod if rhs == 0 => {
                self.report(SemanticError::DivisionByZero);
                return None;
            }
            TokenKind::Slash => lhs.checked_div(rhs),
            // Only `i64::MIN mod -1` wraps, and its remainder is 0 either way.
            TokenKind::KMod => Some(lhs.wrapping_rem(rhs)),
            TokenKind::Exponent if rhs < 0 => return None,
            TokenKind::Exponent => u32::try_from(rhs)
                .ok()
                .and_then(|exp| lhs.checked_pow(exp)),
            _ => unreachable!(),
        };

        if result.is_none() {
            log::warn!("constant {} {} {} overflows", lhs, op, rhs);
            self.report(SemanticError::ConstantOverflow);
        }
        result
    }
}
