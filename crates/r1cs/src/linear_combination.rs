// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::fmt;
use std::ops::{Add, Neg, Sub};
use zkhe_ring::RingElement;

/// Handle of a constraint-system variable.
///
/// Index `0` is the constant one; allocated variables start at `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(usize);

impl Variable {
    pub const ONE: Variable = Variable(0);

    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            write!(f, "ONE")
        } else {
            write!(f, "x{}", self.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
    pub variable: Variable,
    pub coefficient: i64,
}

/// `Σ c_k · x_k` with small integer coefficients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearCombination {
    terms: Vec<Term>,
}

impl LinearCombination {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_variable(variable: Variable) -> Self {
        Self::from_term(variable, 1)
    }

    pub fn from_term(variable: Variable, coefficient: i64) -> Self {
        let mut lc = Self::zero();
        lc.add_term(variable, coefficient);
        lc
    }

    /// Adds `coefficient · variable`, merging with an existing term on the same variable.
    pub fn add_term(&mut self, variable: Variable, coefficient: i64) {
        match self.terms.iter_mut().find(|t| t.variable == variable) {
            Some(t) => t.coefficient += coefficient,
            None => self.terms.push(Term {
                variable,
                coefficient,
            }),
        }
        self.terms.retain(|t| t.coefficient != 0);
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Coefficient of `variable`, zero when absent.
    pub fn coefficient(&self, variable: Variable) -> i64 {
        self.terms
            .iter()
            .find(|t| t.variable == variable)
            .map_or(0, |t| t.coefficient)
    }

    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.terms.iter().map(|t| t.variable)
    }

    /// Evaluates against a full assignment `z`, where `z[0]` is the constant one.
    ///
    /// Polynomial values are taken in evaluation form so that the result can be multiplied.
    ///
    /// # Panics
    ///
    /// Panics if a term references a variable outside `z`.
    pub fn evaluate(&self, z: &[RingElement], zero: &RingElement) -> RingElement {
        let mut acc = zero.clone();
        for t in &self.terms {
            let mut v = z[t.variable.index()].clone();
            v.to_evaluation_form();
            if t.coefficient != 1 {
                v *= &RingElement::from_i64(zero.context(), t.coefficient);
            }
            acc += &v;
        }
        acc
    }
}

impl From<Variable> for LinearCombination {
    fn from(variable: Variable) -> Self {
        Self::from_variable(variable)
    }
}

impl Add<Variable> for LinearCombination {
    type Output = LinearCombination;

    fn add(mut self, rhs: Variable) -> Self::Output {
        self.add_term(rhs, 1);
        self
    }
}

impl Sub<Variable> for LinearCombination {
    type Output = LinearCombination;

    fn sub(mut self, rhs: Variable) -> Self::Output {
        self.add_term(rhs, -1);
        self
    }
}

impl Add<Variable> for Variable {
    type Output = LinearCombination;

    fn add(self, rhs: Variable) -> Self::Output {
        LinearCombination::from(self) + rhs
    }
}

impl Sub<Variable> for Variable {
    type Output = LinearCombination;

    fn sub(self, rhs: Variable) -> Self::Output {
        LinearCombination::from(self) - rhs
    }
}

impl Neg for LinearCombination {
    type Output = LinearCombination;

    fn neg(mut self) -> Self::Output {
        for t in &mut self.terms {
            t.coefficient = -t.coefficient;
        }
        self
    }
}

impl fmt::Display for LinearCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, t) in self.terms.iter().enumerate() {
            match (i, t.coefficient) {
                (0, 1) => write!(f, "{}", t.variable)?,
                (0, -1) => write!(f, "-{}", t.variable)?,
                (0, c) => write!(f, "{c}·{}", t.variable)?,
                (_, 1) => write!(f, " + {}", t.variable)?,
                (_, -1) => write!(f, " - {}", t.variable)?,
                (_, c) if c < 0 => write!(f, " - {}·{}", -c, t.variable)?,
                (_, c) => write!(f, " + {c}·{}", t.variable)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_merge_and_cancel() {
        let a = Variable::new(1);
        let b = Variable::new(2);
        let lc = (a + b) - a;
        assert_eq!(lc.terms().len(), 1);
        assert_eq!(lc.coefficient(b), 1);
        assert_eq!(lc.coefficient(a), 0);
    }

    #[test]
    fn test_display() {
        let lc = Variable::new(3) - Variable::new(4);
        assert_eq!(lc.to_string(), "x3 - x4");
        assert_eq!(LinearCombination::from(Variable::ONE).to_string(), "ONE");
        assert_eq!((-lc).to_string(), "-x3 + x4");
    }
}
