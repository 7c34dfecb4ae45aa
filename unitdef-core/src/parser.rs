//! Expression parser
//!
//! Recursive descent over the token stream, lowest precedence first:
//! additive, multiplicative, unary, power, primary. `**` is right
//! associative and binds tighter than a unary minus on its left, so
//! `-2**2` is `-(2**2)` and `10**-3` is `10**(-3)`. Two operands written
//! next to each other (`1 W`) multiply.
//!
//! Input is bounded: at most `MAX_TOKENS` tokens and `MAX_DEPTH` levels of
//! nesting (parentheses, signs and exponents), so the recursive parser and
//! the tree walkers downstream stay within the stack.

use crate::ast::{BinOp, Expr, UnaryOp};
use crate::lexer::{tokenize, Token};
use crate::ExprError;

/// Deepest nesting accepted by `parse_expr`
pub const MAX_DEPTH: usize = 256;

/// Longest token stream accepted by `parse_expr`
pub const MAX_TOKENS: usize = 1024;

/// Parse an expression string to AST
pub fn parse_expr(input: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }
    if tokens.len() > MAX_TOKENS {
        return Err(ExprError::TooLong(MAX_TOKENS));
    }

    let mut parser = Parser { tokens, pos: 0, depth: 0 };
    let expr = parser.parse_additive()?;

    match parser.peek() {
        None => Ok(expr),
        Some(tok) => Err(ExprError::UnexpectedToken(tok.to_string())),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn parse_additive(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_multiplicative()?;
            left = Expr::BinaryOp(Box::new(left), op, Box::new(right));
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_unary()?;

        loop {
            let (op, explicit) = match self.peek() {
                Some(Token::Star) => (BinOp::Mul, true),
                Some(Token::Slash) => (BinOp::Div, true),
                // Implicit multiplication: "1 W", "2 (m)"
                Some(tok) if tok.starts_operand() => (BinOp::Mul, false),
                _ => break,
            };
            if explicit {
                self.pos += 1;
            }
            let right = self.parse_unary()?;
            left = Expr::BinaryOp(Box::new(left), op, Box::new(right));
        }

        Ok(left)
    }

    // Every recursive path (sign, exponent, parenthesis) re-enters here
    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let result = self.parse_signed();
        self.depth -= 1;
        result
    }

    fn parse_signed(&mut self) -> Result<Expr, ExprError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                let inner = self.parse_unary()?;
                Ok(Expr::UnaryOp(UnaryOp::Neg, Box::new(inner)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr, ExprError> {
        let base = self.parse_primary()?;

        if let Some(Token::Pow) = self.peek() {
            self.pos += 1;
            let exponent = self.parse_unary()?;
            return Ok(Expr::BinaryOp(Box::new(base), BinOp::Pow, Box::new(exponent)));
        }

        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Name(n)) => Ok(Expr::Name(n)),
            Some(Token::LParen) => {
                let inner = self.parse_additive()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    Some(tok) => Err(ExprError::UnexpectedToken(tok.to_string())),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(tok) => Err(ExprError::UnexpectedToken(tok.to_string())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> Box<Expr> {
        Box::new(Expr::Number(s.to_string()))
    }

    fn name(s: &str) -> Box<Expr> {
        Box::new(Expr::Name(s.to_string()))
    }

    #[test]
    fn test_left_associative_division() {
        // 9 / 5 * kelvin == (9 / 5) * kelvin
        let expr = parse_expr("9 / 5 * kelvin").unwrap();
        let expected = Expr::BinaryOp(
            Box::new(Expr::BinaryOp(num("9"), BinOp::Div, num("5"))),
            BinOp::Mul,
            name("kelvin"),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_power_right_associative() {
        let expr = parse_expr("2 ** 3 ** 2").unwrap();
        let expected = Expr::BinaryOp(
            num("2"),
            BinOp::Pow,
            Box::new(Expr::BinaryOp(num("3"), BinOp::Pow, num("2"))),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_negative_exponent() {
        let expr = parse_expr("10**-3").unwrap();
        let expected = Expr::BinaryOp(
            num("10"),
            BinOp::Pow,
            Box::new(Expr::UnaryOp(UnaryOp::Neg, num("3"))),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_unary_minus_below_power() {
        let expr = parse_expr("-2**2").unwrap();
        let expected = Expr::UnaryOp(
            UnaryOp::Neg,
            Box::new(Expr::BinaryOp(num("2"), BinOp::Pow, num("2"))),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_implicit_multiplication() {
        let expr = parse_expr("1 W").unwrap();
        assert_eq!(expr, Expr::BinaryOp(num("1"), BinOp::Mul, name("W")));
    }

    #[test]
    fn test_parentheses() {
        let expr = parse_expr("(1 + 2) * m").unwrap();
        let expected = Expr::BinaryOp(
            Box::new(Expr::BinaryOp(num("1"), BinOp::Add, num("2"))),
            BinOp::Mul,
            name("m"),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_expr("   "), Err(ExprError::Empty));
        assert_eq!(parse_expr("(1 + 2"), Err(ExprError::UnexpectedEnd));
        assert_eq!(parse_expr("2 *"), Err(ExprError::UnexpectedEnd));
        assert_eq!(parse_expr("2 )"), Err(ExprError::UnexpectedToken(")".to_string())));
        assert_eq!(parse_expr("* 2"), Err(ExprError::UnexpectedToken("*".to_string())));
    }

    #[test]
    fn test_nesting_limit() {
        let parens = format!("{}1{}", "(".repeat(300), ")".repeat(300));
        assert_eq!(parse_expr(&parens), Err(ExprError::TooDeep(MAX_DEPTH)));

        let signs = format!("{}1", "-".repeat(300));
        assert_eq!(parse_expr(&signs), Err(ExprError::TooDeep(MAX_DEPTH)));

        let powers = vec!["2"; 300].join("**");
        assert_eq!(parse_expr(&powers), Err(ExprError::TooDeep(MAX_DEPTH)));

        let nested = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse_expr(&nested), Ok(Expr::Number("1".to_string())));
    }

    #[test]
    fn test_length_limit() {
        let signs = format!("{}1", "-".repeat(10_000));
        assert_eq!(parse_expr(&signs), Err(ExprError::TooLong(MAX_TOKENS)));

        let sum = vec!["1"; 600].join(" + ");
        assert_eq!(parse_expr(&sum), Err(ExprError::TooLong(MAX_TOKENS)));
    }
}
