//! Polynomial constraints over table cells
//!
//! [`Expression`] is an owned expression tree with [`Variable`] leaves and
//! field constants. A [`Constraint`] is an expression asserted to equal
//! zero on every row where its gate's selector is active. The tree supports
//! the three operations the stretcher needs: visiting every leaf (zoning
//! analysis), rewriting every leaf (relocation into a wider table), and
//! evaluation against an assignment (testing that relocation preserved
//! semantics).

use std::ops::{Add, Mul, Neg, Sub};

use p3_field::{Field, AbstractField};

use crate::types::Variable;
use crate::witness::Assignment;

/// A polynomial expression over table cells
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expression<F> {
    /// A single cell reference
    Var(Variable),
    /// A field constant baked into the polynomial
    Constant(F),
    /// Sum of two subexpressions
    Sum(Box<Expression<F>>, Box<Expression<F>>),
    /// Product of two subexpressions
    Product(Box<Expression<F>>, Box<Expression<F>>),
    /// Negation of a subexpression
    Neg(Box<Expression<F>>),
}

/// An expression asserted to equal zero wherever its gate is active
pub type Constraint<F> = Expression<F>;

impl<F: Field + AbstractField> Expression<F> {
    /// Visit every variable leaf, left to right
    pub fn for_each_variable(&self, f: &mut impl FnMut(&Variable)) {
        match self {
            Expression::Var(var) => f(var),
            Expression::Constant(_) => {}
            Expression::Sum(a, b) | Expression::Product(a, b) => {
                a.for_each_variable(f);
                b.for_each_variable(f);
            }
            Expression::Neg(a) => a.for_each_variable(f),
        }
    }

    /// Rebuild the tree with every variable leaf rewritten through `f`
    pub fn map_variables<E>(
        &self,
        f: &mut impl FnMut(Variable) -> Result<Variable, E>,
    ) -> Result<Expression<F>, E> {
        Ok(match self {
            Expression::Var(var) => Expression::Var(f(*var)?),
            Expression::Constant(c) => Expression::Constant(*c),
            Expression::Sum(a, b) => Expression::Sum(
                Box::new(a.map_variables(f)?),
                Box::new(b.map_variables(f)?),
            ),
            Expression::Product(a, b) => Expression::Product(
                Box::new(a.map_variables(f)?),
                Box::new(b.map_variables(f)?),
            ),
            Expression::Neg(a) => Expression::Neg(Box::new(a.map_variables(f)?)),
        })
    }

    /// Evaluate at `row`, resolving relative references against it
    pub fn evaluate(&self, assignment: &Assignment<F>, row: usize) -> F {
        match self {
            Expression::Var(var) => assignment.value_of(var, row),
            Expression::Constant(c) => *c,
            Expression::Sum(a, b) => a.evaluate(assignment, row) + b.evaluate(assignment, row),
            Expression::Product(a, b) => a.evaluate(assignment, row) * b.evaluate(assignment, row),
            Expression::Neg(a) => -a.evaluate(assignment, row),
        }
    }
}

impl<F> From<Variable> for Expression<F> {
    fn from(var: Variable) -> Self {
        Expression::Var(var)
    }
}

impl<F> Add for Expression<F> {
    type Output = Expression<F>;

    fn add(self, rhs: Self) -> Self::Output {
        Expression::Sum(Box::new(self), Box::new(rhs))
    }
}

impl<F> Sub for Expression<F> {
    type Output = Expression<F>;

    fn sub(self, rhs: Self) -> Self::Output {
        Expression::Sum(Box::new(self), Box::new(Expression::Neg(Box::new(rhs))))
    }
}

impl<F> Mul for Expression<F> {
    type Output = Expression<F>;

    fn mul(self, rhs: Self) -> Self::Output {
        Expression::Product(Box::new(self), Box::new(rhs))
    }
}

impl<F> Neg for Expression<F> {
    type Output = Expression<F>;

    fn neg(self) -> Self::Output {
        Expression::Neg(Box::new(self))
    }
}

/// A set of constraints enforced wherever one selector column is nonzero
#[derive(Clone, Debug)]
pub struct Gate<F> {
    /// Index of the activation column, allocated by the owning circuit
    pub selector: usize,
    /// Constraints enforced on every active row
    pub constraints: Vec<Constraint<F>>,
}
