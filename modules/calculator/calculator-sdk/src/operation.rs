//! Operation selector and the pure dispatcher shared by server and client fallback.

use std::fmt;
use std::str::FromStr;

use crate::api::{Fault, FaultKind};

/// One of the four supported arithmetic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    /// All operations in console menu order (`1`..`4`).
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    /// RPC method name, as it appears in `/calculator.CalculatorService/<name>`.
    #[must_use]
    pub const fn method_name(self) -> &'static str {
        match self {
            Operation::Add => "Add",
            Operation::Subtract => "Subtract",
            Operation::Multiply => "Multiply",
            Operation::Divide => "Divide",
        }
    }

    /// Full RPC path, e.g. `/calculator.CalculatorService/Add`.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Operation::Add => "/calculator.CalculatorService/Add",
            Operation::Subtract => "/calculator.CalculatorService/Subtract",
            Operation::Multiply => "/calculator.CalculatorService/Multiply",
            Operation::Divide => "/calculator.CalculatorService/Divide",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

impl FromStr for Operation {
    type Err = Fault;

    /// Accepts a method name (any case) or a console menu selector `1`..`4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let selector = s.trim();
        let op = match selector {
            "1" => Operation::Add,
            "2" => Operation::Subtract,
            "3" => Operation::Multiply,
            "4" => Operation::Divide,
            other if other.eq_ignore_ascii_case("add") => Operation::Add,
            other if other.eq_ignore_ascii_case("subtract") => Operation::Subtract,
            other if other.eq_ignore_ascii_case("multiply") => Operation::Multiply,
            other if other.eq_ignore_ascii_case("divide") => Operation::Divide,
            other => {
                return Err(Fault::new(
                    FaultKind::InvalidOperation,
                    format!("Unknown operation: '{other}'"),
                ));
            }
        };
        Ok(op)
    }
}

/// Compute `op` over `a` and `b`.
///
/// Division by exactly zero (either sign) is a [`FaultKind::DivideByZero`] fault;
/// any other divisor, however small, divides normally.
///
/// # Errors
/// Returns [`FaultKind::DivideByZero`] when `op` is [`Operation::Divide`] and `b == 0.0`.
pub fn dispatch(op: Operation, a: f64, b: f64) -> Result<f64, Fault> {
    match op {
        Operation::Add => Ok(a + b),
        Operation::Subtract => Ok(a - b),
        Operation::Multiply => Ok(a * b),
        Operation::Divide if b == 0.0 => Err(Fault::divide_by_zero()),
        Operation::Divide => Ok(a / b),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_scenarios() {
        assert_eq!(dispatch(Operation::Add, 2.0, 3.0).unwrap(), 5.0);
        assert_eq!(dispatch(Operation::Subtract, 10.0, 4.0).unwrap(), 6.0);
        assert_eq!(dispatch(Operation::Multiply, -2.0, 5.0).unwrap(), -10.0);
        assert_eq!(dispatch(Operation::Divide, 10.0, 2.0).unwrap(), 5.0);
    }

    #[test]
    fn test_divide_by_zero() {
        let err = dispatch(Operation::Divide, 7.0, 0.0).unwrap_err();
        assert_eq!(err.kind(), FaultKind::DivideByZero);
        assert_eq!(err.message(), "Cannot divide by zero");

        let err = dispatch(Operation::Divide, 7.0, -0.0).unwrap_err();
        assert_eq!(err.kind(), FaultKind::DivideByZero);

        let err = dispatch(Operation::Divide, 0.0, 0.0).unwrap_err();
        assert_eq!(err.kind(), FaultKind::DivideByZero);
    }

    #[test]
    fn test_subnormal_divisor_is_not_zero() {
        let tiny = f64::from_bits(1);
        let result = dispatch(Operation::Divide, 1.0, tiny).unwrap();
        assert!(result.is_infinite());
    }

    #[test]
    fn test_matches_native_arithmetic() {
        let samples = [0.0, -1.5, 3.25, 1e300, -7e-300, 42.0];
        for &a in &samples {
            for &b in &samples {
                assert_eq!(dispatch(Operation::Add, a, b).unwrap(), a + b);
                assert_eq!(dispatch(Operation::Subtract, a, b).unwrap(), a - b);
                assert_eq!(dispatch(Operation::Multiply, a, b).unwrap(), a * b);
                if b != 0.0 {
                    assert_eq!(dispatch(Operation::Divide, a, b).unwrap(), a / b);
                }
            }
        }
    }

    #[test]
    fn test_dispatch_is_idempotent() {
        let first = dispatch(Operation::Divide, 1.0, 3.0).unwrap();
        for _ in 0..10 {
            assert_eq!(
                dispatch(Operation::Divide, 1.0, 3.0).unwrap().to_bits(),
                first.to_bits()
            );
        }
    }

    #[test]
    fn test_parse_selectors() {
        assert_eq!("1".parse::<Operation>().unwrap(), Operation::Add);
        assert_eq!(" 4 ".parse::<Operation>().unwrap(), Operation::Divide);
        assert_eq!(
            "Multiply".parse::<Operation>().unwrap(),
            Operation::Multiply
        );
        assert_eq!(
            "subtract".parse::<Operation>().unwrap(),
            Operation::Subtract
        );

        for op in Operation::ALL {
            assert_eq!(op.method_name().parse::<Operation>().unwrap(), op);
            assert_eq!(
                op.path(),
                format!("/{}/{}", crate::SERVICE_NAME, op.method_name())
            );
        }
    }

    #[test]
    fn test_unknown_selector_is_invalid_operation() {
        let err = "99".parse::<Operation>().unwrap_err();
        assert_eq!(err.kind(), FaultKind::InvalidOperation);
        assert!(err.message().contains("99"));

        assert!("5".parse::<Operation>().is_err());
        assert!("".parse::<Operation>().is_err());
        assert!("modulo".parse::<Operation>().is_err());
    }
}
