//! Constraint expressions: linear expression with comparison sense and RHS.

use crate::expr::core::Expr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonSense {
    LessEqual,
    GreaterEqual,
    Equal,
}

impl ComparisonSense {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonSense::LessEqual => "le",
            ComparisonSense::GreaterEqual => "ge",
            ComparisonSense::Equal => "eq",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintExpr {
    expr: Expr,
    sense: ComparisonSense,
    rhs: f64,
}

impl ConstraintExpr {
    pub fn new(expr: Expr, sense: ComparisonSense, rhs: f64) -> Self {
        Self { expr, sense, rhs }
    }

    /// `expr <= rhs`
    pub fn less_equal(expr: Expr, rhs: f64) -> Self {
        Self::new(expr, ComparisonSense::LessEqual, rhs)
    }

    /// `expr >= rhs`
    pub fn greater_equal(expr: Expr, rhs: f64) -> Self {
        Self::new(expr, ComparisonSense::GreaterEqual, rhs)
    }

    /// `expr == rhs`
    pub fn equal(expr: Expr, rhs: f64) -> Self {
        Self::new(expr, ComparisonSense::Equal, rhs)
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn sense(&self) -> ComparisonSense {
        self.sense
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// Consume and return (expr, sense, rhs) with the expression constant
    /// folded into the right-hand side.
    pub fn into_parts(self) -> (Expr, ComparisonSense, f64) {
        let (terms, constant) = self.expr.into_parts();
        (Expr::from_linear(terms), self.sense, self.rhs - constant)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::ids::VariableId;

    #[test]
    fn sense_as_str() {
        assert_eq!(ComparisonSense::LessEqual.as_str(), "le");
        assert_eq!(ComparisonSense::GreaterEqual.as_str(), "ge");
        assert_eq!(ComparisonSense::Equal.as_str(), "eq");
    }

    #[test]
    fn into_parts_folds_constant_into_rhs() {
        let expr = Expr::new(vec![(VariableId::new(0), 1.0)], 2.0);
        let constraint = ConstraintExpr::less_equal(expr, 5.0);
        let (expr, sense, rhs) = constraint.into_parts();
        assert_eq!(sense, ComparisonSense::LessEqual);
        assert_eq!(rhs, 3.0);
        assert_eq!(expr.constant(), 0.0);
        assert_eq!(expr.linear_terms(), &[(VariableId::new(0), 1.0)]);
    }
}
