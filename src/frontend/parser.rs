//! Parser for Offside
//!
//! Recursive descent with precedence climbing for expressions. Blocks are
//! delimited by the off-side rule: a body records the indentation depth of
//! its first token and keeps consuming statements while the next token is at
//! least that deep. Any lexical/syntax failure aborts the whole parse as an
//! `Err` propagated to the driver.

use crate::frontend::ast::*;
use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Result};

/// The parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> Result<&Token> {
        self.tokens.get(self.pos).ok_or(Error::UnexpectedEof)
    }

    fn lookahead(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn advance(&mut self) -> Result<Token> {
        let token = self.tokens.get(self.pos).cloned().ok_or(Error::UnexpectedEof)?;
        self.pos += 1;
        Ok(token)
    }

    fn check_operator(&self, op: &str) -> bool {
        self.tokens.get(self.pos).is_some_and(|t| t.is_operator(op))
    }

    fn check_keyword(&self, word: &str) -> bool {
        self.tokens.get(self.pos).is_some_and(|t| t.is_keyword(word))
    }

    fn eat_operator(&mut self, op: &str) -> bool {
        if self.check_operator(op) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        if self.check_keyword(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_operator(&mut self, op: &str) -> Result<Token> {
        let token = self.current()?;
        if token.is_operator(op) {
            self.advance()
        } else {
            Err(Error::Expected {
                expected: format!("'{op}'"),
                got: token.lexeme.clone(),
                line: token.line,
            })
        }
    }

    /// Whether a token can begin an expression
    fn starts_expression(token: &Token) -> bool {
        match token.kind {
            TokenKind::Number
            | TokenKind::FloatNumber
            | TokenKind::StringLiteral
            | TokenKind::CharLiteral
            | TokenKind::Identifier => true,
            TokenKind::Keyword => matches!(token.lexeme.as_str(), "true" | "false" | "Map"),
            TokenKind::Operator => token.lexeme == "(" || token.lexeme == "[",
            _ => false,
        }
    }

    // ==================== Validation Pass ====================

    /// Structural checks over the raw token stream, run before parsing:
    /// parentheses must balance and no two checked operators may be adjacent.
    pub fn validate_tokens(&self) -> Result<()> {
        let mut stack: Vec<&Token> = Vec::new();
        for token in &self.tokens {
            if token.is_operator("(") {
                stack.push(token);
            } else if token.is_operator(")") && stack.pop().is_none() {
                return Err(Error::UnmatchedClosingParen { line: token.line });
            }
        }
        if let Some(open) = stack.last() {
            return Err(Error::UnmatchedOpeningParen { line: open.line });
        }

        const CHECKED: &[&str] = &["+", "-", "*", "/", "=", "<", ">", "==", "!=", "<=", ">="];
        let mut prev: Option<&Token> = None;
        for token in &self.tokens {
            if let Some(p) = prev {
                if CHECKED.contains(&p.lexeme.as_str()) && CHECKED.contains(&token.lexeme.as_str())
                {
                    return Err(Error::ConsecutiveOperators {
                        first: p.lexeme.clone(),
                        second: token.lexeme.clone(),
                        line: token.line,
                    });
                }
            }
            prev = Some(token);
        }
        Ok(())
    }

    // ==================== Statements ====================

    /// Parse the complete token sequence into a program
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut stmts = Vec::new();
        while !self.at_end() {
            stmts.push(self.parse_statement()?);
        }
        Ok(Program { stmts })
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        let tok = self.current()?.clone();
        if tok.kind == TokenKind::Error {
            return Err(Error::InvalidToken { lexeme: tok.lexeme, line: tok.line });
        }
        match tok.kind {
            TokenKind::Keyword => match tok.lexeme.as_str() {
                "if" => self.parse_if().map(Stmt::If),
                "let" => {
                    let is_function = self
                        .lookahead(1)
                        .is_some_and(|t| t.kind == TokenKind::Identifier)
                        && self.lookahead(2).is_some_and(|t| t.is_operator("("));
                    if is_function {
                        self.parse_function_decl().map(Stmt::FunctionDecl)
                    } else {
                        self.parse_variable_decl().map(Stmt::VariableDecl)
                    }
                }
                "type" => self.parse_class_decl().map(Stmt::ClassDecl),
                "while" => self.parse_while().map(Stmt::While),
                "for" => self.parse_for(),
                "printfn" | "printf" => self.parse_print().map(Stmt::Print),
                "return" => self.parse_return().map(Stmt::Return),
                "true" | "false" | "Map" => self.parse_expression().map(Stmt::Expr),
                _ => Err(Error::UnexpectedToken { lexeme: tok.lexeme, line: tok.line }),
            },
            TokenKind::Identifier => {
                if self.lookahead(1).is_some_and(|t| t.is_operator("(")) {
                    self.parse_call().map(Stmt::Call)
                } else if self
                    .lookahead(1)
                    .is_some_and(|t| t.is_operator("=") || t.is_operator("<-"))
                {
                    self.parse_assignment().map(Stmt::Assignment)
                } else {
                    self.parse_expression().map(Stmt::Expr)
                }
            }
            _ if Self::starts_expression(&tok) => self.parse_expression().map(Stmt::Expr),
            _ => Err(Error::UnexpectedToken { lexeme: tok.lexeme, line: tok.line }),
        }
    }

    /// Off-side block: consume statements while the next token is at least as
    /// deep as the body's first token. A dangling `elif`/`else` also ends the
    /// block so single-line conditionals parse.
    fn parse_block(&mut self) -> Result<Block> {
        let depth = self.current()?.indent;
        let mut stmts = Vec::new();
        while !self.at_end() {
            let next = &self.tokens[self.pos];
            if next.indent < depth || next.is_keyword("elif") || next.is_keyword("else") {
                break;
            }
            stmts.push(self.parse_statement()?);
        }
        Ok(Block { stmts })
    }

    fn parse_function_decl(&mut self) -> Result<FunctionDecl> {
        let let_tok = self.advance()?;
        let name_tok = self.advance()?;
        self.expect_operator("(")?;
        let params = self.parse_params()?;
        self.expect_operator(")")?;
        self.eat_operator("=");
        let mut body = self.parse_block()?;
        desugar_trailing_return(&mut body);
        Ok(FunctionDecl {
            name: name_tok.lexeme,
            params,
            body,
            line: let_tok.line,
        })
    }

    /// Comma-separated parameters with optional `: Type` annotations,
    /// up to (not including) the closing parenthesis
    fn parse_params(&mut self) -> Result<Vec<Param>> {
        let mut params = Vec::new();
        while !self.check_operator(")") {
            let tok = self.advance()?;
            let ty = if self.eat_operator(":") {
                Some(self.advance()?.lexeme)
            } else {
                None
            };
            params.push(Param { name: tok.lexeme, ty, line: tok.line });
            self.eat_operator(",");
        }
        Ok(params)
    }

    fn parse_variable_decl(&mut self) -> Result<VariableDecl> {
        self.advance()?; // let
        let mutable = self.eat_keyword("mutable");
        let name_tok = self.advance()?;
        if name_tok.kind != TokenKind::Identifier {
            return Err(Error::InvalidVariableDeclaration {
                message: format!("expected a variable name, got '{}'", name_tok.lexeme),
                line: name_tok.line,
            });
        }

        let ty = if self.eat_operator(":") {
            Some(self.advance()?.lexeme)
        } else {
            None
        };

        let mut init = None;
        if self.check_operator("=") || self.check_operator("<-") {
            self.advance()?;
            let next = self.current()?;
            if next.kind == TokenKind::Operator && next.lexeme != "[" && next.lexeme != "(" {
                return Err(Error::InvalidVariableDeclaration {
                    message: format!("invalid initializer '{}'", next.lexeme),
                    line: next.line,
                });
            }
            init = Some(self.parse_expression()?);
        } else if !self.at_end() {
            let next = &self.tokens[self.pos];
            if next.indent == name_tok.indent {
                return Err(Error::InvalidVariableDeclaration {
                    message: format!("expected '=' or end of line, got '{}'", next.lexeme),
                    line: next.line,
                });
            }
        }

        Ok(VariableDecl {
            name: name_tok.lexeme,
            mutable,
            ty,
            init,
            line: name_tok.line,
        })
    }

    fn parse_assignment(&mut self) -> Result<Assignment> {
        let name_tok = self.advance()?;
        let mut value = None;
        if self.check_operator("=") || self.check_operator("<-") {
            self.advance()?;
            value = Some(self.parse_expression()?);
        }
        Ok(Assignment {
            target: name_tok.lexeme,
            value,
            line: name_tok.line,
        })
    }

    fn parse_if(&mut self) -> Result<IfStmt> {
        let if_tok = self.advance()?;
        let cond = self.parse_paren_condition()?;

        let then_block = if self.eat_keyword("then") {
            self.parse_block()?
        } else {
            Block { stmts: Vec::new() }
        };

        let mut elifs = Vec::new();
        while self.check_keyword("elif") {
            let elif_tok = self.advance()?;
            let cond = self.parse_paren_condition()?;
            let body = if self.eat_keyword("then") {
                self.parse_block()?
            } else {
                Block { stmts: Vec::new() }
            };
            elifs.push(ElifBranch { cond, body, line: elif_tok.line });
        }

        let else_block = if self.eat_keyword("else") {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(IfStmt {
            cond,
            then_block,
            elifs,
            else_block,
            line: if_tok.line,
        })
    }

    fn parse_paren_condition(&mut self) -> Result<Condition> {
        self.eat_operator("(");
        self.parse_condition()
    }

    /// Left expression, optional comparison operator, optional right
    /// expression. `=`, `<>` and `mod` normalize to the target operators.
    fn parse_condition(&mut self) -> Result<Condition> {
        let line = self.current()?.line;
        let left = self.parse_expression()?;

        let op = match self.tokens.get(self.pos) {
            Some(t) => match (t.kind, t.lexeme.as_str()) {
                (TokenKind::Operator, "=") => Some(CmpOp::Eq),
                (TokenKind::Operator, "<>") => Some(CmpOp::Ne),
                (TokenKind::Operator, "<") => Some(CmpOp::Lt),
                (TokenKind::Operator, ">") => Some(CmpOp::Gt),
                (TokenKind::Operator, "<=") => Some(CmpOp::Le),
                (TokenKind::Operator, ">=") => Some(CmpOp::Ge),
                (TokenKind::Operator, "%") | (TokenKind::Identifier, "mod") => Some(CmpOp::Mod),
                _ => None,
            },
            None => None,
        };
        let cmp = if let Some(op) = op {
            self.advance()?;
            Some((op, self.parse_expression()?))
        } else {
            None
        };

        self.eat_operator(")");
        Ok(Condition { left, cmp, line })
    }

    fn parse_while(&mut self) -> Result<WhileStmt> {
        let while_tok = self.advance()?;
        let cond = self.parse_condition()?;
        self.eat_keyword("do");
        let body = self.parse_block()?;
        Ok(WhileStmt { cond, body, line: while_tok.line })
    }

    /// `for` is disambiguated by the token two past it: `=` selects the
    /// bounded counting loop, `in` selects iteration.
    fn parse_for(&mut self) -> Result<Stmt> {
        let two_ahead = self.lookahead(2).ok_or(Error::UnexpectedEof)?;
        if two_ahead.is_operator("=") {
            self.parse_for_to().map(Stmt::ForTo)
        } else if two_ahead.is_keyword("in") {
            self.parse_for_in().map(Stmt::ForIn)
        } else {
            Err(Error::UnexpectedAfterFor {
                lexeme: two_ahead.lexeme.clone(),
                line: two_ahead.line,
            })
        }
    }

    fn parse_for_to(&mut self) -> Result<ForToStmt> {
        let for_tok = self.advance()?;
        let var_tok = self.advance()?;
        self.eat_operator("=");
        let start = self.parse_expression()?;
        let direction = if self.eat_keyword("downto") {
            ForDirection::Downto
        } else {
            self.eat_keyword("to");
            ForDirection::To
        };
        let end = self.parse_expression()?;
        self.eat_keyword("do");
        let body = self.parse_block()?;
        Ok(ForToStmt {
            var_name: var_tok.lexeme,
            start,
            direction,
            end,
            body,
            line: for_tok.line,
        })
    }

    fn parse_for_in(&mut self) -> Result<ForInStmt> {
        let for_tok = self.advance()?;
        let var_tok = self.advance()?;
        self.eat_keyword("in");

        // `a..b` is a numeric range when the expression starts with a number
        // immediately followed by the range operator
        let iterable = if self.current()?.kind == TokenKind::Number
            && self.lookahead(1).is_some_and(|t| t.is_operator(".."))
        {
            let start = self.parse_term()?;
            self.expect_operator("..")?;
            let end = self.parse_term()?;
            let line = start.line();
            Expr::Range {
                start: Box::new(start),
                end: Box::new(end),
                line,
            }
        } else {
            self.parse_expression()?
        };

        self.eat_keyword("do");
        let body = self.parse_block()?;
        Ok(ForInStmt {
            var_name: var_tok.lexeme,
            iterable,
            body,
            line: for_tok.line,
        })
    }

    fn parse_print(&mut self) -> Result<PrintStmt> {
        let tok = self.advance()?;
        let newline = tok.lexeme == "printfn";
        let line = tok.line;

        let mut format = None;
        if self.eat_operator("$") {
            if self.current()?.kind == TokenKind::StringLiteral {
                let s = self.advance()?;
                format = Some(FormatString { interpolated: true, text: s.lexeme });
            }
        } else if self.tokens.get(self.pos).is_some_and(|t| t.kind == TokenKind::StringLiteral) {
            let s = self.advance()?;
            format = Some(FormatString { interpolated: false, text: s.lexeme });
        }

        // any further expressions on the same line are positional arguments
        let mut args = Vec::new();
        while !self.at_end() && self.tokens[self.pos].line == line {
            args.push(self.parse_expression()?);
        }

        Ok(PrintStmt { newline, format, args, line })
    }

    fn parse_return(&mut self) -> Result<ReturnStmt> {
        let tok = self.advance()?;
        let mut value = None;
        if let Some(next) = self.tokens.get(self.pos) {
            if next.line == tok.line && Self::starts_expression(next) {
                value = Some(self.parse_expression()?);
            }
        }
        Ok(ReturnStmt { value, line: tok.line })
    }

    fn parse_call(&mut self) -> Result<CallExpr> {
        let name_tok = self.advance()?;
        self.expect_operator("(")?;
        let mut args = Vec::new();
        while !self.check_operator(")") {
            args.push(self.parse_expression()?);
            self.eat_operator(",");
        }
        self.advance()?; // )
        Ok(CallExpr {
            callee: name_tok.lexeme,
            args,
            line: name_tok.line,
        })
    }

    fn parse_class_decl(&mut self) -> Result<ClassDecl> {
        self.advance()?; // type
        let name_tok = self.advance()?;

        let mut ctor_params = Vec::new();
        if self.eat_operator("(") {
            ctor_params = self.parse_params()?;
            self.expect_operator(")")?;
        }
        self.eat_operator("=");

        let mut members = Vec::new();
        if !self.at_end() {
            let depth = self.tokens[self.pos].indent;
            while !self.at_end()
                && self.tokens[self.pos].indent >= depth
                && self.tokens[self.pos].is_keyword("member")
            {
                members.push(self.parse_member()?);
            }
        }

        Ok(ClassDecl {
            name: name_tok.lexeme,
            ctor_params,
            members,
            line: name_tok.line,
        })
    }

    /// `member this.Name(params) = body` (method) or `member this.Name = value` (field)
    fn parse_member(&mut self) -> Result<Member> {
        self.advance()?; // member
        self.advance()?; // this
        self.expect_operator(".")?;
        let name_tok = self.advance()?;

        if self.eat_operator("(") {
            let params = self.parse_params()?;
            self.expect_operator(")")?;
            self.eat_operator("=");
            let body = self.parse_block()?;
            return Ok(Member {
                name: name_tok.lexeme,
                kind: MemberKind::Method { params, body },
                line: name_tok.line,
            });
        }

        self.eat_operator("=");
        let mut value = None;
        if let Some(next) = self.tokens.get(self.pos) {
            if next.line == name_tok.line && Self::starts_expression(next) {
                value = Some(self.parse_expression()?);
            }
        }
        Ok(Member {
            name: name_tok.lexeme,
            kind: MemberKind::Field { value },
            line: name_tok.line,
        })
    }

    // ==================== Expressions ====================

    fn parse_expression(&mut self) -> Result<Expr> {
        self.parse_addition()
    }

    fn parse_addition(&mut self) -> Result<Expr> {
        let mut left = self.parse_multiplication()?;
        loop {
            let op = if self.check_operator("+") {
                BinOp::Add
            } else if self.check_operator("-") {
                BinOp::Sub
            } else {
                break;
            };
            let op_tok = self.advance()?;
            let right = self.parse_multiplication()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                line: op_tok.line,
            };
        }
        Ok(left)
    }

    fn parse_multiplication(&mut self) -> Result<Expr> {
        let mut left = self.parse_term()?;
        loop {
            let op = if self.check_operator("*") {
                BinOp::Mul
            } else if self.check_operator("/") {
                BinOp::Div
            } else {
                break;
            };
            let op_tok = self.advance()?;
            let right = self.parse_term()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                line: op_tok.line,
            };
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let tok = self.current()?.clone();
        match tok.kind {
            TokenKind::Error => Err(Error::InvalidToken { lexeme: tok.lexeme, line: tok.line }),
            TokenKind::Number => {
                self.advance()?;
                Ok(Expr::Number { text: tok.lexeme, line: tok.line })
            }
            TokenKind::FloatNumber => {
                self.advance()?;
                Ok(Expr::Float { text: tok.lexeme, line: tok.line })
            }
            TokenKind::StringLiteral => {
                self.advance()?;
                Ok(Expr::Str { text: tok.lexeme, line: tok.line })
            }
            TokenKind::CharLiteral => {
                self.advance()?;
                Ok(Expr::Char { text: tok.lexeme, line: tok.line })
            }
            TokenKind::Keyword if tok.lexeme == "true" || tok.lexeme == "false" => {
                self.advance()?;
                Ok(Expr::Bool { value: tok.lexeme == "true", line: tok.line })
            }
            TokenKind::Keyword if tok.lexeme == "Map" => self.parse_map(),
            TokenKind::Identifier => self.parse_identifier_term(),
            TokenKind::Operator if tok.lexeme == "(" => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.eat_operator(")");
                Ok(expr)
            }
            TokenKind::Operator if tok.lexeme == "[" => self.parse_array_or_list(),
            _ => Err(Error::UnexpectedToken { lexeme: tok.lexeme, line: tok.line }),
        }
    }

    /// Identifier-led terms: call, `seq { }`, `Set.ofArray`, `name.[index]`,
    /// `object.property`, or a plain identifier
    fn parse_identifier_term(&mut self) -> Result<Expr> {
        if self.lookahead(1).is_some_and(|t| t.is_operator("(")) {
            return self.parse_call().map(Expr::Call);
        }
        let ident = self.advance()?;

        if ident.lexeme == "seq" && self.check_operator("{") {
            return self.parse_seq(ident.line);
        }

        if self.eat_operator(".") {
            if self.eat_operator("[") {
                let index = self.parse_index_expression()?;
                self.eat_operator("]");
                return Ok(Expr::ArrayIndex {
                    target: ident.lexeme,
                    index: Box::new(index),
                    line: ident.line,
                });
            }
            let prop = self.advance()?;
            if ident.lexeme == "Set" && prop.lexeme == "ofArray" {
                return self.parse_set_of_array(ident.line);
            }
            return Ok(Expr::PropertyAccess {
                object: ident.lexeme,
                property: prop.lexeme,
                line: prop.line,
            });
        }

        Ok(Expr::Ident { name: ident.lexeme, line: ident.line })
    }

    /// An index expression; a literal `-<digits>` is kept as a signed number
    /// so the analyzer can flag it
    fn parse_index_expression(&mut self) -> Result<Expr> {
        if self.check_operator("-")
            && self.lookahead(1).is_some_and(|t| t.kind == TokenKind::Number)
        {
            let minus = self.advance()?;
            let number = self.advance()?;
            return Ok(Expr::Number {
                text: format!("-{}", number.lexeme),
                line: minus.line,
            });
        }
        self.parse_expression()
    }

    /// `[|...|]` array or `[...]` list, both semicolon-separated
    fn parse_array_or_list(&mut self) -> Result<Expr> {
        let bracket = self.advance()?; // [
        if self.eat_operator("|") {
            let elements = self.parse_elements_until("|")?;
            self.expect_operator("|")?;
            self.expect_operator("]")?;
            Ok(Expr::Array { elements, line: bracket.line })
        } else {
            let elements = self.parse_elements_until("]")?;
            self.expect_operator("]")?;
            Ok(Expr::List { elements, line: bracket.line })
        }
    }

    fn parse_elements_until(&mut self, closer: &str) -> Result<Vec<Expr>> {
        let mut elements = Vec::new();
        while !self.check_operator(closer) {
            elements.push(self.parse_expression()?);
            self.eat_operator(";");
        }
        Ok(elements)
    }

    fn parse_set_of_array(&mut self, line: usize) -> Result<Expr> {
        let mut elements = Vec::new();
        if self.check_operator("[") && self.lookahead(1).is_some_and(|t| t.is_operator("|")) {
            self.advance()?;
            self.advance()?;
            elements = self.parse_elements_until("|")?;
            self.expect_operator("|")?;
            self.expect_operator("]")?;
        }
        Ok(Expr::SetLit { elements, line })
    }

    /// `seq { ... }`: a `start..end` entry becomes a range, anything else is
    /// a semicolon-separated element
    fn parse_seq(&mut self, line: usize) -> Result<Expr> {
        self.advance()?; // {
        let mut entries = Vec::new();
        while !self.check_operator("}") {
            let is_range = self.lookahead(1).is_some_and(|t| t.is_operator(".."))
                && self.lookahead(2).is_some_and(|t| t.kind == TokenKind::Number);
            if is_range {
                let start = self.advance()?;
                self.advance()?; // ..
                let end = self.advance()?;
                let range_line = start.line;
                entries.push(Expr::Range {
                    start: Box::new(Expr::Number { text: start.lexeme, line: range_line }),
                    end: Box::new(Expr::Number { text: end.lexeme, line: end.line }),
                    line: range_line,
                });
            } else {
                entries.push(self.parse_expression()?);
            }
            self.eat_operator(";");
        }
        self.advance()?; // }
        Ok(Expr::Seq { entries, line })
    }

    /// `Map [key, value; key, value; ...]`
    fn parse_map(&mut self) -> Result<Expr> {
        let map_tok = self.advance()?;
        let mut pairs = Vec::new();
        if self.eat_operator("[") {
            while !self.check_operator("]") {
                let key = self.parse_expression()?;
                self.eat_operator(",");
                let value = self.parse_expression()?;
                pairs.push((key, value));
                self.eat_operator(";");
            }
            self.advance()?; // ]
        }
        Ok(Expr::MapLit { pairs, line: map_tok.line })
    }
}

/// A function's value is its last non-print statement: re-wrap it as a
/// synthetic `Return` during construction.
fn desugar_trailing_return(body: &mut Block) {
    match body.stmts.pop() {
        Some(Stmt::Expr(expr)) => {
            let line = expr.line();
            body.stmts.push(Stmt::Return(ReturnStmt { value: Some(expr), line }));
        }
        Some(Stmt::Call(call)) => {
            let line = call.line;
            body.stmts.push(Stmt::Return(ReturnStmt {
                value: Some(Expr::Call(call)),
                line,
            }));
        }
        Some(other) => body.stmts.push(other),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Result<Program> {
        let tokens = Lexer::new(source).tokenize();
        let mut parser = Parser::new(tokens);
        parser.validate_tokens()?;
        parser.parse_program()
    }

    #[test]
    fn test_function_declaration_with_return_desugaring() {
        let program = parse("let add(a, b) =\n    a + b\n").unwrap();
        assert_eq!(program.stmts.len(), 1);
        let Stmt::FunctionDecl(func) = &program.stmts[0] else {
            panic!("expected a function declaration");
        };
        assert_eq!(func.name, "add");
        assert_eq!(func.params.len(), 2);
        assert_eq!(func.params[0].name, "a");
        assert_eq!(func.body.stmts.len(), 1);
        let Stmt::Return(ret) = &func.body.stmts[0] else {
            panic!("expected the body to end in a synthetic return");
        };
        let Some(Expr::Binary { op, left, right, .. }) = &ret.value else {
            panic!("expected a binary operation");
        };
        assert_eq!(*op, BinOp::Add);
        assert!(matches!(**left, Expr::Ident { ref name, .. } if name == "a"));
        assert!(matches!(**right, Expr::Ident { ref name, .. } if name == "b"));
    }

    #[test]
    fn test_print_terminated_function_not_wrapped() {
        let program = parse("let hello(name) =\n    printfn \"hi\" name\n").unwrap();
        let Stmt::FunctionDecl(func) = &program.stmts[0] else {
            panic!("expected a function declaration");
        };
        assert!(matches!(func.body.stmts.last(), Some(Stmt::Print(_))));
    }

    #[test]
    fn test_variable_declarations() {
        let program = parse("let x = 5\nlet mutable y = 1.5\nlet z: int = 3\n").unwrap();
        assert_eq!(program.stmts.len(), 3);
        let Stmt::VariableDecl(x) = &program.stmts[0] else { panic!() };
        assert!(!x.mutable);
        assert!(matches!(x.init, Some(Expr::Number { .. })));
        let Stmt::VariableDecl(y) = &program.stmts[1] else { panic!() };
        assert!(y.mutable);
        let Stmt::VariableDecl(z) = &program.stmts[2] else { panic!() };
        assert_eq!(z.ty.as_deref(), Some("int"));
    }

    #[test]
    fn test_assignment_forms() {
        let program = parse("x = 6\ny <- 7\n").unwrap();
        let Stmt::Assignment(a) = &program.stmts[0] else { panic!() };
        assert_eq!(a.target, "x");
        let Stmt::Assignment(b) = &program.stmts[1] else { panic!() };
        assert_eq!(b.target, "y");
        assert!(b.value.is_some());
    }

    #[test]
    fn test_if_elif_else_blocks() {
        let source = "if x > 1 then\n    printfn \"a\"\nelif x > 0 then\n    printfn \"b\"\nelse\n    printfn \"c\"\n";
        let program = parse(source).unwrap();
        assert_eq!(program.stmts.len(), 1);
        let Stmt::If(stmt) = &program.stmts[0] else { panic!() };
        assert_eq!(stmt.then_block.stmts.len(), 1);
        assert_eq!(stmt.elifs.len(), 1);
        assert!(stmt.else_block.is_some());
    }

    #[test]
    fn test_condition_operator_normalization() {
        let program = parse("if x = 1 then\n    printfn \"eq\"\n").unwrap();
        let Stmt::If(stmt) = &program.stmts[0] else { panic!() };
        assert_eq!(stmt.cond.cmp.as_ref().unwrap().0.as_str(), "==");

        let program = parse("if x <> 1 then\n    printfn \"ne\"\n").unwrap();
        let Stmt::If(stmt) = &program.stmts[0] else { panic!() };
        assert_eq!(stmt.cond.cmp.as_ref().unwrap().0.as_str(), "!=");

        let program = parse("if x mod 2 then\n    printfn \"odd\"\n").unwrap();
        let Stmt::If(stmt) = &program.stmts[0] else { panic!() };
        assert_eq!(stmt.cond.cmp.as_ref().unwrap().0.as_str(), "%");
    }

    #[test]
    fn test_single_line_if() {
        let program = parse("if z then 1 else 0\n").unwrap();
        let Stmt::If(stmt) = &program.stmts[0] else { panic!() };
        assert!(matches!(stmt.cond.left, Expr::Ident { ref name, .. } if name == "z"));
        assert!(stmt.cond.cmp.is_none());
        assert_eq!(stmt.then_block.stmts.len(), 1);
        let else_block = stmt.else_block.as_ref().unwrap();
        assert_eq!(else_block.stmts.len(), 1);
    }

    #[test]
    fn test_block_ends_on_dedent() {
        let source = "while x > 0 do\n    x <- x - 1\n    printfn \"tick\"\nlet y = 1\n";
        let program = parse(source).unwrap();
        assert_eq!(program.stmts.len(), 2);
        let Stmt::While(stmt) = &program.stmts[0] else { panic!() };
        assert_eq!(stmt.body.stmts.len(), 2);
    }

    #[test]
    fn test_for_in_range() {
        let program = parse("for i in 1..5 do\n    printfn \"%d\" i\n").unwrap();
        let Stmt::ForIn(stmt) = &program.stmts[0] else { panic!() };
        assert_eq!(stmt.var_name, "i");
        let Expr::Range { start, end, .. } = &stmt.iterable else {
            panic!("expected a range");
        };
        assert!(matches!(**start, Expr::Number { ref text, .. } if text == "1"));
        assert!(matches!(**end, Expr::Number { ref text, .. } if text == "5"));
        assert_eq!(stmt.body.stmts.len(), 1);
    }

    #[test]
    fn test_for_in_collection() {
        let program = parse("for item in items do\n    printfn \"%A\" item\n").unwrap();
        let Stmt::ForIn(stmt) = &program.stmts[0] else { panic!() };
        assert!(matches!(stmt.iterable, Expr::Ident { .. }));
    }

    #[test]
    fn test_for_to_and_downto() {
        let program = parse("for i = 1 to 10 do\n    printfn \"%d\" i\n").unwrap();
        let Stmt::ForTo(stmt) = &program.stmts[0] else { panic!() };
        assert_eq!(stmt.direction, ForDirection::To);

        let program = parse("for i = 10 downto 1 do\n    printfn \"%d\" i\n").unwrap();
        let Stmt::ForTo(stmt) = &program.stmts[0] else { panic!() };
        assert_eq!(stmt.direction, ForDirection::Downto);
    }

    #[test]
    fn test_bad_for_header() {
        let err = parse("for i of 1 do\n    printfn \"x\"\n").unwrap_err();
        assert!(matches!(err, Error::UnexpectedAfterFor { .. }));
    }

    #[test]
    fn test_print_interpolated_and_args() {
        let program = parse("printfn $\"value {x}\"\nprintf \"%d %d\" a b\n").unwrap();
        let Stmt::Print(p) = &program.stmts[0] else { panic!() };
        assert!(p.newline);
        assert!(p.format.as_ref().unwrap().interpolated);
        let Stmt::Print(q) = &program.stmts[1] else { panic!() };
        assert!(!q.newline);
        assert_eq!(q.args.len(), 2);
    }

    #[test]
    fn test_class_declaration() {
        let source = "type Point(x: int, y: int) =\n    member this.Sum() =\n        x + y\n    member this.X = x\n";
        let program = parse(source).unwrap();
        let Stmt::ClassDecl(class) = &program.stmts[0] else { panic!() };
        assert_eq!(class.name, "Point");
        assert_eq!(class.ctor_params.len(), 2);
        assert_eq!(class.ctor_params[0].ty.as_deref(), Some("int"));
        assert_eq!(class.members.len(), 2);
        assert!(matches!(class.members[0].kind, MemberKind::Method { .. }));
        assert!(matches!(class.members[1].kind, MemberKind::Field { .. }));
    }

    #[test]
    fn test_collection_literals() {
        let program =
            parse("let xs = [1; 2; 3]\nlet ys = [|4; 5|]\nlet m = Map [\"a\", 1; \"b\", 2]\n")
                .unwrap();
        let Stmt::VariableDecl(xs) = &program.stmts[0] else { panic!() };
        assert!(matches!(xs.init, Some(Expr::List { ref elements, .. }) if elements.len() == 3));
        let Stmt::VariableDecl(ys) = &program.stmts[1] else { panic!() };
        assert!(matches!(ys.init, Some(Expr::Array { ref elements, .. }) if elements.len() == 2));
        let Stmt::VariableDecl(m) = &program.stmts[2] else { panic!() };
        assert!(matches!(m.init, Some(Expr::MapLit { ref pairs, .. }) if pairs.len() == 2));
    }

    #[test]
    fn test_seq_and_set() {
        let program = parse("let s = seq { 1..5 }\nlet t = Set.ofArray [|1; 2|]\n").unwrap();
        let Stmt::VariableDecl(s) = &program.stmts[0] else { panic!() };
        let Some(Expr::Seq { entries, .. }) = &s.init else { panic!() };
        assert!(matches!(entries[0], Expr::Range { .. }));
        let Stmt::VariableDecl(t) = &program.stmts[1] else { panic!() };
        assert!(matches!(t.init, Some(Expr::SetLit { ref elements, .. }) if elements.len() == 2));
    }

    #[test]
    fn test_array_index_forms() {
        let program = parse("let a = arr.[0]\nlet b = arr.[-1]\n").unwrap();
        let Stmt::VariableDecl(a) = &program.stmts[0] else { panic!() };
        assert!(matches!(a.init, Some(Expr::ArrayIndex { .. })));
        let Stmt::VariableDecl(b) = &program.stmts[1] else { panic!() };
        let Some(Expr::ArrayIndex { index, .. }) = &b.init else { panic!() };
        assert!(matches!(**index, Expr::Number { ref text, .. } if text == "-1"));
    }

    #[test]
    fn test_property_access() {
        let program = parse("let n = p.Name\n").unwrap();
        let Stmt::VariableDecl(v) = &program.stmts[0] else { panic!() };
        let Some(Expr::PropertyAccess { object, property, .. }) = &v.init else { panic!() };
        assert_eq!(object, "p");
        assert_eq!(property, "Name");
    }

    #[test]
    fn test_unmatched_open_paren() {
        let err = parse("let y = (1 + 2\n").unwrap_err();
        assert_eq!(err, Error::UnmatchedOpeningParen { line: 1 });
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_unmatched_close_paren() {
        let err = parse("let y = 1 + 2)\n").unwrap_err();
        assert!(matches!(err, Error::UnmatchedClosingParen { line: 1 }));
    }

    #[test]
    fn test_consecutive_operators() {
        let err = parse("let y = 1 + * 2\n").unwrap_err();
        assert!(matches!(err, Error::ConsecutiveOperators { .. }));
    }

    #[test]
    fn test_error_token_aborts_parse() {
        let err = parse("let x = 12abc\n").unwrap_err();
        assert!(matches!(err, Error::InvalidToken { .. }));
    }

    #[test]
    fn test_operator_precedence() {
        let program = parse("let x = 1 + 2 * 3\n").unwrap();
        let Stmt::VariableDecl(v) = &program.stmts[0] else { panic!() };
        let Some(Expr::Binary { op, right, .. }) = &v.init else { panic!() };
        assert_eq!(*op, BinOp::Add);
        assert!(matches!(**right, Expr::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn test_call_statement_and_expression() {
        let program = parse("let r = add(1, 2)\nshow(r)\n").unwrap();
        let Stmt::VariableDecl(v) = &program.stmts[0] else { panic!() };
        assert!(matches!(v.init, Some(Expr::Call(ref c)) if c.args.len() == 2));
        assert!(matches!(&program.stmts[1], Stmt::Call(c) if c.callee == "show"));
    }
}
