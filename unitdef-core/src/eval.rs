//! Numeric evaluator
//!
//! Evaluates literal-only expressions (`1e-3`, `10**-3`, `9/5`). This is a
//! closed arithmetic language: numbers, `+ - * / **` and parentheses.
//! Names are rejected.

use crate::ast::{BinOp, Expr, UnaryOp};
use crate::parser::parse_expr;
use crate::ExprError;

/// Parse and evaluate a numeric expression
pub fn eval_number(input: &str) -> Result<f64, ExprError> {
    let expr = parse_expr(input)?;
    evaluate(&expr)
}

/// Evaluate a parsed expression to a number
pub fn evaluate(expr: &Expr) -> Result<f64, ExprError> {
    match expr {
        Expr::Number(s) => parse_number(s),
        Expr::Name(n) => Err(ExprError::UnitReference(n.clone())),
        Expr::UnaryOp(UnaryOp::Neg, inner) => Ok(-evaluate(inner)?),
        Expr::BinaryOp(left, op, right) => {
            let l = evaluate(left)?;
            let r = evaluate(right)?;
            apply(l, *op, r)
        }
    }
}

/// Parse a numeric literal as produced by the lexer. Literals beyond the
/// f64 range are an overflow, not infinity.
pub fn parse_number(s: &str) -> Result<f64, ExprError> {
    let value = s
        .parse::<f64>()
        .map_err(|_| ExprError::InvalidNumber(s.to_string()))?;
    check_finite(value)
}

fn apply(l: f64, op: BinOp, r: f64) -> Result<f64, ExprError> {
    let value = match op {
        BinOp::Add => l + r,
        BinOp::Sub => l - r,
        BinOp::Mul => l * r,
        BinOp::Div => {
            if r == 0.0 {
                return Err(ExprError::DivisionByZero);
            }
            l / r
        }
        BinOp::Pow => return power(l, r),
    };
    check_finite(value)
}

/// Raise `base` to `exp`; integral exponents use repeated multiplication
/// so `10**-3` lands on the same value as the literal `0.001`.
pub fn power(base: f64, exp: f64) -> Result<f64, ExprError> {
    check_finite(base)?;
    check_finite(exp)?;
    if base == 0.0 && exp < 0.0 {
        return Err(ExprError::DivisionByZero);
    }

    let value = if exp.fract() == 0.0 && exp.abs() <= i32::MAX as f64 {
        base.powi(exp as i32)
    } else {
        base.powf(exp)
    };

    if value.is_nan() {
        return Err(ExprError::DomainError(format!("{} ** {} is undefined", base, exp)));
    }
    check_finite(value)
}

/// NaN is a domain error, infinity an overflow
pub fn check_finite(value: f64) -> Result<f64, ExprError> {
    if value.is_nan() {
        Err(ExprError::DomainError("result is not a number".to_string()))
    } else if value.is_infinite() {
        Err(ExprError::Overflow)
    } else {
        Ok(value)
    }
}
