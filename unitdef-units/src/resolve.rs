//! Resolve unit expressions such as "9 / 5 * kelvin" or "[length]/[time]"
//! into an overall numeric scale and a composition of names.

use std::fmt;
use unitdef_core::{BinOp, Expr, ExprError, UnaryOp};
use unitdef_core::eval::{check_finite, parse_number, power};
use crate::UnitsContainer;

/// A unit expression reduced to `scale * product(name ** exponent)`
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExpression {
    pub scale: f64,
    pub units: UnitsContainer,
}

impl ParsedExpression {
    /// A bare number
    pub fn number(scale: f64) -> Self {
        ParsedExpression { scale, units: UnitsContainer::new() }
    }

    /// A single name with exponent 1
    pub fn name(name: &str) -> Self {
        ParsedExpression { scale: 1.0, units: UnitsContainer::single(name) }
    }

    /// True if no names remain
    pub fn is_dimensionless(&self) -> bool {
        self.units.is_empty()
    }

    pub fn multiply(&self, other: &ParsedExpression) -> Result<ParsedExpression, ExprError> {
        ParsedExpression {
            scale: self.scale * other.scale,
            units: self.units.multiply(&other.units),
        }
        .checked()
    }

    pub fn divide(&self, other: &ParsedExpression) -> Result<ParsedExpression, ExprError> {
        if other.scale == 0.0 {
            return Err(ExprError::DivisionByZero);
        }
        ParsedExpression {
            scale: self.scale / other.scale,
            units: self.units.divide(&other.units),
        }
        .checked()
    }

    pub fn power(&self, exp: f64) -> Result<ParsedExpression, ExprError> {
        ParsedExpression {
            scale: power(self.scale, exp)?,
            units: self.units.power(exp),
        }
        .checked()
    }

    /// Scale and every exponent must stay finite
    fn checked(self) -> Result<ParsedExpression, ExprError> {
        check_finite(self.scale)?;
        for (_, exp) in self.units.iter() {
            check_finite(exp)?;
        }
        Ok(self)
    }
}

impl fmt::Display for ParsedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.units.is_empty() {
            write!(f, "{}", self.scale)
        } else if self.scale == 1.0 {
            write!(f, "{}", self.units)
        } else {
            write!(f, "{} {}", self.scale, self.units)
        }
    }
}

/// Parse a unit expression. An empty string resolves to scale 1 with no names.
pub fn parse_expression(input: &str) -> Result<ParsedExpression, ExprError> {
    if input.trim().is_empty() {
        return Ok(ParsedExpression::number(1.0));
    }

    let expr = unitdef_core::parse_expr(input)?;
    resolve(&expr)
}

/// Reduce a parsed expression tree
pub fn resolve(expr: &Expr) -> Result<ParsedExpression, ExprError> {
    match expr {
        Expr::Number(s) => Ok(ParsedExpression::number(parse_number(s)?)),
        Expr::Name(n) => Ok(ParsedExpression::name(n)),
        Expr::UnaryOp(UnaryOp::Neg, inner) => {
            let mut value = resolve(inner)?;
            value.scale = -value.scale;
            Ok(value)
        }
        Expr::BinaryOp(left, op, right) => {
            let l = resolve(left)?;
            let r = resolve(right)?;
            match op {
                BinOp::Mul => l.multiply(&r),
                BinOp::Div => l.divide(&r),
                BinOp::Pow => {
                    if !r.is_dimensionless() {
                        return Err(ExprError::NonNumericExponent(r.to_string()));
                    }
                    l.power(r.scale)
                }
                BinOp::Add | BinOp::Sub => {
                    if !l.is_dimensionless() || !r.is_dimensionless() {
                        return Err(ExprError::InvalidOperation(format!(
                            "cannot add or subtract '{}' and '{}'", l, r
                        )));
                    }
                    let value = if *op == BinOp::Add { l.scale + r.scale } else { l.scale - r.scale };
                    Ok(ParsedExpression::number(check_finite(value)?))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_expression() {
        let parsed = parse_expression("  ").unwrap();
        assert_eq!(parsed.scale, 1.0);
        assert!(parsed.units.is_empty());
    }

    #[test]
    fn test_product() {
        let parsed = parse_expression("ampere * second").unwrap();
        assert_eq!(parsed.scale, 1.0);
        assert_eq!(parsed.units, UnitsContainer::from([("ampere", 1.0), ("second", 1.0)]));
    }

    #[test]
    fn test_scaled_unit() {
        let parsed = parse_expression("9 / 5 * kelvin").unwrap();
        assert_eq!(parsed.scale, 9.0 / 5.0);
        assert_eq!(parsed.units, UnitsContainer::single("kelvin"));

        let parsed = parse_expression("96485.3399 * coulomb").unwrap();
        assert_eq!(parsed.scale, 96485.3399);
    }

    #[test]
    fn test_implicit_product() {
        let parsed = parse_expression("1 W").unwrap();
        assert_eq!(parsed.scale, 1.0);
        assert_eq!(parsed.units, UnitsContainer::single("W"));
    }

    #[test]
    fn test_dimensions() {
        let parsed = parse_expression("[length]/[time]").unwrap();
        assert_eq!(parsed.units, UnitsContainer::from([("[length]", 1.0), ("[time]", -1.0)]));

        let parsed = parse_expression("[length] ** 2").unwrap();
        assert_eq!(parsed.units.get("[length]"), 2.0);
    }

    #[test]
    fn test_powers() {
        let parsed = parse_expression("1000 * (3/5)**0.5 * volt").unwrap();
        assert!((parsed.scale - 1000.0 * 0.6f64.sqrt()).abs() < 1e-9);

        let parsed = parse_expression("(2 * meter) ** 2 / second").unwrap();
        assert_eq!(parsed.scale, 4.0);
        assert_eq!(parsed.units, UnitsContainer::from([("meter", 2.0), ("second", -1.0)]));
    }

    #[test]
    fn test_negation_and_sums() {
        let parsed = parse_expression("-(1 + 2) * meter").unwrap();
        assert_eq!(parsed.scale, -3.0);

        assert!(matches!(
            parse_expression("meter + second"),
            Err(ExprError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse_expression("meter ** second"),
            Err(ExprError::NonNumericExponent(_))
        ));
        assert_eq!(parse_expression("meter / 0"), Err(ExprError::DivisionByZero));
        assert_eq!(parse_expression("meter *"), Err(ExprError::UnexpectedEnd));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert_eq!(parse_expression("meter ** 1e400"), Err(ExprError::Overflow));
        assert_eq!(parse_expression("[length] ** 1e400"), Err(ExprError::Overflow));
        assert_eq!(parse_expression("1e200 * 1e200 * meter"), Err(ExprError::Overflow));
        // exponents that overflow through composition
        assert_eq!(parse_expression("(meter ** 1e300) ** 1e300"), Err(ExprError::Overflow));
        assert_eq!(
            ParsedExpression::name("meter").power(f64::INFINITY),
            Err(ExprError::Overflow)
        );
    }
}
