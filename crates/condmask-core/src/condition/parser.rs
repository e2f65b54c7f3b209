use super::ast::{BinaryOp, CompareOp, Expr, Literal, LogicalOp, UnaryOp};
use super::error::ConditionError;
use super::lexer::{Token, TokenKind, tokenize};

const MAX_DEPTH: usize = 64;

/// Parse a condition into an expression tree.
pub fn parse_condition(input: &str) -> Result<Expr, ConditionError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_expr()?;
    let trailing = parser.peek();
    if trailing.kind != TokenKind::Eof {
        return Err(ConditionError::syntax(
            trailing.pos,
            format!("unexpected {} after expression", describe(&trailing.kind)),
        ));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // tokenize always ends with Eof, and Eof is never consumed.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind_at(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ConditionError> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            let token = self.peek();
            Err(ConditionError::syntax(
                token.pos,
                format!("expected {what}, found {}", describe(&token.kind)),
            ))
        }
    }

    fn enter(&mut self) -> Result<(), ConditionError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ConditionError::syntax(
                self.peek().pos,
                format!("expression nests deeper than {MAX_DEPTH} levels"),
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_expr(&mut self) -> Result<Expr, ConditionError> {
        self.enter()?;
        let expr = self.parse_or();
        self.leave();
        expr
    }

    fn parse_or(&mut self) -> Result<Expr, ConditionError> {
        let mut operands = vec![self.parse_and()?];
        while self.check(&TokenKind::Or) {
            self.advance();
            operands.push(self.parse_and()?);
        }
        Ok(logical(LogicalOp::Or, operands))
    }

    fn parse_and(&mut self) -> Result<Expr, ConditionError> {
        let mut operands = vec![self.parse_not()?];
        while self.check(&TokenKind::And) {
            self.advance();
            operands.push(self.parse_not()?);
        }
        Ok(logical(LogicalOp::And, operands))
    }

    fn parse_not(&mut self) -> Result<Expr, ConditionError> {
        if self.check(&TokenKind::Not) {
            self.advance();
            self.enter()?;
            let operand = self.parse_not();
            self.leave();
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand?),
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ConditionError> {
        let first = self.parse_additive()?;
        let mut rest = Vec::new();
        while let Some(op) = self.comparison_op() {
            let rhs = self.parse_additive()?;
            rest.push((op, rhs));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    /// Consume a comparison operator if one is next, including the two-word
    /// forms `not in` and `is not`.
    fn comparison_op(&mut self) -> Option<CompareOp> {
        let (op, width) = match (&self.peek().kind, self.peek_kind_at(1)) {
            (TokenKind::EqEq, _) => (CompareOp::Eq, 1),
            (TokenKind::NotEq, _) => (CompareOp::Ne, 1),
            (TokenKind::Lt, _) => (CompareOp::Lt, 1),
            (TokenKind::Le, _) => (CompareOp::Le, 1),
            (TokenKind::Gt, _) => (CompareOp::Gt, 1),
            (TokenKind::Ge, _) => (CompareOp::Ge, 1),
            (TokenKind::In, _) => (CompareOp::In, 1),
            (TokenKind::Not, TokenKind::In) => (CompareOp::NotIn, 2),
            (TokenKind::Is, TokenKind::Not) => (CompareOp::Ne, 2),
            (TokenKind::Is, _) => (CompareOp::Eq, 1),
            _ => return None,
        };
        for _ in 0..width {
            self.advance();
        }
        Some(op)
    }

    fn parse_additive(&mut self) -> Result<Expr, ConditionError> {
        let first = self.parse_term()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(binary(first, rest)),
            };
            self.advance();
            rest.push((op, self.parse_term()?));
        }
    }

    fn parse_term(&mut self) -> Result<Expr, ConditionError> {
        let first = self.parse_unary()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => return Ok(binary(first, rest)),
            };
            self.advance();
            rest.push((op, self.parse_unary()?));
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ConditionError> {
        if self.check(&TokenKind::Minus) {
            self.advance();
            self.enter()?;
            let operand = self.parse_unary();
            self.leave();
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand?),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ConditionError> {
        let mut expr = self.parse_primary()?;
        let depth = self.depth;
        while self.check(&TokenKind::LBracket) {
            // Each subscript nests the tree one level deeper.
            self.enter()?;
            self.advance();
            let index = self.parse_expr()?;
            self.expect(TokenKind::RBracket, "']'")?;
            expr = Expr::Index {
                target: Box::new(expr),
                index: Box::new(index),
            };
        }
        self.depth = depth;
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ConditionError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(value) => Ok(Expr::Literal(Literal::Number(value))),
            TokenKind::Text(value) => Ok(Expr::Literal(Literal::Text(value))),
            TokenKind::True => Ok(Expr::Literal(Literal::Bool(true))),
            TokenKind::False => Ok(Expr::Literal(Literal::Bool(false))),
            TokenKind::Null => Ok(Expr::Literal(Literal::Null)),
            TokenKind::Ident(name) => Ok(Expr::Ident(name)),
            TokenKind::LParen => {
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::LBracket => self.parse_list(),
            other => Err(ConditionError::syntax(
                token.pos,
                format!("expected an expression, found {}", describe(&other)),
            )),
        }
    }

    fn parse_list(&mut self) -> Result<Expr, ConditionError> {
        let mut items = Vec::new();
        while !self.check(&TokenKind::RBracket) {
            items.push(self.parse_expr()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RBracket, "']' or ','")?;
        Ok(Expr::List(items))
    }
}

fn logical(op: LogicalOp, mut operands: Vec<Expr>) -> Expr {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        Expr::Logical { op, operands }
    }
}

fn binary(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
    if rest.is_empty() {
        first
    } else {
        Expr::Binary {
            first: Box::new(first),
            rest,
        }
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Number(value) => format!("number {value}"),
        TokenKind::Text(value) => format!("string '{value}'"),
        TokenKind::Ident(name) => format!("identifier '{name}'"),
        TokenKind::And => "'and'".to_string(),
        TokenKind::Or => "'or'".to_string(),
        TokenKind::Not => "'not'".to_string(),
        TokenKind::In => "'in'".to_string(),
        TokenKind::Is => "'is'".to_string(),
        TokenKind::True => "'true'".to_string(),
        TokenKind::False => "'false'".to_string(),
        TokenKind::Null => "'null'".to_string(),
        TokenKind::EqEq => "'=='".to_string(),
        TokenKind::NotEq => "'!='".to_string(),
        TokenKind::Lt => "'<'".to_string(),
        TokenKind::Le => "'<='".to_string(),
        TokenKind::Gt => "'>'".to_string(),
        TokenKind::Ge => "'>='".to_string(),
        TokenKind::Plus => "'+'".to_string(),
        TokenKind::Minus => "'-'".to_string(),
        TokenKind::Star => "'*'".to_string(),
        TokenKind::Slash => "'/'".to_string(),
        TokenKind::Percent => "'%'".to_string(),
        TokenKind::LParen => "'('".to_string(),
        TokenKind::RParen => "')'".to_string(),
        TokenKind::LBracket => "'['".to_string(),
        TokenKind::RBracket => "']'".to_string(),
        TokenKind::Comma => "','".to_string(),
        TokenKind::Eof => "end of input".to_string(),
    }
}
