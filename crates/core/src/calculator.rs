//! Expression Evaluator
//!
//! Evaluates `<int> <op> <int>` expressions found by the arithmetic extractor.
//! Operands are ASCII digit runs of any length.

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use regex::Regex;
use std::sync::OnceLock;

use crate::types::{EvalError, Number};

/// Evaluates a single binary expression
pub trait Evaluator {
    fn evaluate(&self, expression: &str) -> Result<Number, EvalError>;
}

/// Arbitrary-precision integer calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct Calculator;

impl Evaluator for Calculator {
    fn evaluate(&self, expression: &str) -> Result<Number, EvalError> {
        calculate(expression)
    }
}

fn binary_expression() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([0-9]+)\s*([+\-*/])\s*([0-9]+)\s*$").expect("Invalid regex"))
}

fn parse_operand(digits: &str) -> Result<BigInt, EvalError> {
    digits
        .parse::<BigInt>()
        .map_err(|_| EvalError::InvalidExpression(digits.to_string()))
}

/// Evaluate `<int> <op> <int>`, whitespace-insensitive.
///
/// Division stays integral when exact and falls back to a float otherwise.
pub fn calculate(expression: &str) -> Result<Number, EvalError> {
    let cap = binary_expression()
        .captures(expression)
        .ok_or_else(|| EvalError::InvalidExpression(expression.trim().to_string()))?;

    let lhs = parse_operand(&cap[1])?;
    let rhs = parse_operand(&cap[3])?;

    let value = match &cap[2] {
        "+" => Number::Int(lhs + rhs),
        "-" => Number::Int(lhs - rhs),
        "*" => Number::Int(lhs * rhs),
        "/" => divide(&lhs, &rhs)?,
        op => return Err(EvalError::InvalidExpression(format!("unknown operator {}", op))),
    };

    Ok(value)
}

fn divide(lhs: &BigInt, rhs: &BigInt) -> Result<Number, EvalError> {
    if rhs.is_zero() {
        return Err(EvalError::DivisionByZero);
    }
    if (lhs % rhs).is_zero() {
        return Ok(Number::Int(lhs / rhs));
    }

    // Integer part plus fractional remainder, each converted separately
    let whole = (lhs / rhs).to_f64().ok_or(EvalError::Overflow)?;
    let rem = (lhs % rhs).to_f64().ok_or(EvalError::Overflow)?;
    let divisor = rhs.to_f64().ok_or(EvalError::Overflow)?;
    let quotient = whole + rem / divisor;

    if quotient.is_finite() {
        Ok(Number::Float(quotient))
    } else {
        Err(EvalError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        assert_eq!(calculate("45 + 30"), Ok(Number::from(75)));
        assert_eq!(calculate("9 * 8"), Ok(Number::from(72)));
        assert_eq!(calculate("10 - 25"), Ok(Number::from(-15)));
        assert_eq!(calculate("81/9"), Ok(Number::from(9)));
    }

    #[test]
    fn test_whitespace_insensitive() {
        assert_eq!(calculate("  7*6 "), Ok(Number::from(42)));
        assert_eq!(calculate("7 *   6"), Ok(Number::from(42)));
    }

    #[test]
    fn test_inexact_division() {
        assert_eq!(calculate("7 / 2"), Ok(Number::Float(3.5)));
        assert_eq!(calculate("10 / 4").unwrap().to_string(), "2.5");
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(calculate("5 / 0"), Err(EvalError::DivisionByZero));
        assert_eq!(
            calculate("5 / 0").unwrap_err().to_string(),
            "division by zero"
        );
    }

    #[test]
    fn test_large_operands() {
        assert_eq!(
            calculate("9999999999 * 9999999999").unwrap().to_string(),
            "99999999980000000001"
        );
        assert_eq!(
            calculate("99999999999999999999 + 1").unwrap().to_string(),
            "100000000000000000000"
        );
        assert_eq!(
            calculate("9223372036854775807 + 1").unwrap().to_string(),
            "9223372036854775808"
        );
        assert_eq!(
            calculate("100000000000000000000 / 10").unwrap().to_string(),
            "10000000000000000000"
        );
    }

    #[test]
    fn test_large_inexact_division() {
        assert_eq!(
            calculate("100000000000000000001 / 2"),
            Ok(Number::Float(5e19))
        );
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        assert!(matches!(
            calculate("٣+٤"),
            Err(EvalError::InvalidExpression(_))
        ));
        assert!(matches!(
            calculate("１２*３"),
            Err(EvalError::InvalidExpression(_))
        ));
    }

    #[test]
    fn test_invalid_expression() {
        assert!(matches!(
            calculate("two plus two"),
            Err(EvalError::InvalidExpression(_))
        ));
        assert!(matches!(calculate(""), Err(EvalError::InvalidExpression(_))));
    }

    #[test]
    fn test_evaluator_trait() {
        let evaluator: &dyn Evaluator = &Calculator;
        assert_eq!(evaluator.evaluate("2 + 2"), Ok(Number::from(4)));
    }
}
