//! Core expression type: linear terms + constant.
//!
//! Terms are kept in insertion order and are not merged here; the model
//! normalizes duplicates when the expression is lowered into a row or the
//! objective.

use crate::ids::VariableId;
use std::ops::Add;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expr {
    constant: f64,
    linear: Vec<(VariableId, f64)>,
}

impl Expr {
    // ── Constructors ────────────────────────────────────────

    /// Empty expression (all zeros).
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// Expression from linear terms and constant.
    pub fn new(linear: Vec<(VariableId, f64)>, constant: f64) -> Self {
        Self { constant, linear }
    }

    /// Single linear term: coeff * var.
    pub fn term(var_id: VariableId, coeff: f64) -> Self {
        if coeff == 0.0 {
            return Self::default();
        }
        Self {
            linear: vec![(var_id, coeff)],
            ..Default::default()
        }
    }

    /// Single variable with coefficient 1.0.
    pub fn var(var_id: VariableId) -> Self {
        Self::term(var_id, 1.0)
    }

    /// From raw linear terms, no constant.
    pub fn from_linear(linear: Vec<(VariableId, f64)>) -> Self {
        Self {
            linear,
            ..Default::default()
        }
    }

    /// Unit-coefficient sum of the given variables.
    pub fn sum<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = VariableId>,
    {
        Self::from_linear(vars.into_iter().map(|var_id| (var_id, 1.0)).collect())
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn linear_terms(&self) -> &[(VariableId, f64)] {
        &self.linear
    }

    pub fn is_empty(&self) -> bool {
        self.linear.is_empty()
    }

    /// Consume and return linear terms.
    pub fn into_linear_terms(self) -> Vec<(VariableId, f64)> {
        self.linear
    }

    /// Consume and return (linear_terms, constant).
    pub fn into_parts(self) -> (Vec<(VariableId, f64)>, f64) {
        (self.linear, self.constant)
    }

    // ── Operations ──────────────────────────────────────────

    /// Append `coeff * var`; zero coefficients are dropped.
    pub fn with_term(mut self, var_id: VariableId, coeff: f64) -> Self {
        if coeff != 0.0 {
            self.linear.push((var_id, coeff));
        }
        self
    }

    /// Scale all terms and constant by a factor.
    pub fn scale(&self, by: f64) -> Self {
        Self {
            constant: self.constant * by,
            linear: self
                .linear
                .iter()
                .map(|(v, c)| (*v, *c * by))
                .filter(|(_, c)| *c != 0.0)
                .collect(),
        }
    }

    /// Evaluate the expression against dense primal values.
    ///
    /// Returns `None` if a referenced variable has no value.
    pub fn evaluate(&self, values: &[f64]) -> Option<f64> {
        let mut total = self.constant;
        for (var_id, coeff) in &self.linear {
            total += coeff * values.get(var_id.index())?;
        }
        Some(total)
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(mut self, rhs: Expr) -> Expr {
        self.constant += rhs.constant;
        self.linear.extend(rhs.linear);
        self
    }
}
