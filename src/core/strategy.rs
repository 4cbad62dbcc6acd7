/*!

Strategy primitives. A *strategy* maps a set of terms to a set of terms:

- `Identity` returns its input unchanged;
- `Union` applies each of its operands and unions the results (at least two operands);
- `Fixpoint` iterates its inner strategy until the set stabilizes under set equality.

Any `Fn(&Term) -> Term` closure lifts to a strategy by mapping over the set, and a
single term lifts to a singleton set through `transform_one`. The `Normalize` strategy
wraps the rule evaluator; terms that fail to normalize pass through unchanged, keeping
the strategy total.

Termination of `Fixpoint` is the user's responsibility.

*/

use crate::{
  api::term::{Term, TermSet},
  core::{
    error::{ArgumentError, StewError},
    evaluator,
    registry::Registry,
  },
};

pub trait Strategy {
  /// Maps a set of terms to a set of terms.
  fn transform(&self, terms: &TermSet) -> TermSet;

  /// Lifts a single term to a singleton set and applies the strategy.
  fn transform_one(&self, term: &Term) -> TermSet {
    let mut singleton = TermSet::new();
    singleton.insert(term.clone());
    self.transform(&singleton)
  }
}

/// Every per-term function is a strategy, lifted pointwise over the set.
impl<F> Strategy for F
where
  F: Fn(&Term) -> Term,
{
  fn transform(&self, terms: &TermSet) -> TermSet {
    terms.iter().map(self).collect()
  }
}

/// `identity(T) = T`.
pub struct Identity;

impl Strategy for Identity {
  fn transform(&self, terms: &TermSet) -> TermSet {
    terms.clone()
  }
}

/// `union(s1, …, sk)(T) = s1(T) ∪ … ∪ sk(T)`, for k >= 2.
pub struct Union<'a> {
  operands: Vec<Box<dyn Strategy + 'a>>,
}

impl<'a> Union<'a> {
  pub fn new(operands: Vec<Box<dyn Strategy + 'a>>) -> Result<Union<'a>, StewError> {
    if operands.len() < 2 {
      return Err(
        ArgumentError::TooFewOperands {
          strategy: "union",
          given   : operands.len(),
        }
        .into(),
      );
    }
    Ok(Union { operands })
  }
}

impl<'a> Strategy for Union<'a> {
  fn transform(&self, terms: &TermSet) -> TermSet {
    let mut result = TermSet::new();
    for operand in &self.operands {
      result.extend(operand.transform(terms));
    }
    result
  }
}

/// `fixpoint(s)(T)`: iterate `T <- s(T)` until `T` stabilizes under set equality.
pub struct Fixpoint<'a> {
  inner: Box<dyn Strategy + 'a>,
}

impl<'a> Fixpoint<'a> {
  pub fn new(inner: Box<dyn Strategy + 'a>) -> Fixpoint<'a> {
    Fixpoint { inner }
  }
}

impl<'a> Strategy for Fixpoint<'a> {
  fn transform(&self, terms: &TermSet) -> TermSet {
    let mut current = terms.clone();
    loop {
      let next = self.inner.transform(&current);
      if next == current {
        return next;
      }
      current = next;
    }
  }
}

/// The strategy that drives every term of the set to normal form. Terms that fail to
/// normalize pass through unchanged.
pub struct Normalize<'r> {
  registry: &'r Registry,
}

impl<'r> Normalize<'r> {
  pub fn new(registry: &'r Registry) -> Normalize<'r> {
    Normalize { registry }
  }
}

impl<'r> Strategy for Normalize<'r> {
  fn transform(&self, terms: &TermSet) -> TermSet {
    terms
        .iter()
        .map(|term| evaluator::normalize(self.registry, term).unwrap_or_else(|_| term.clone()))
        .collect()
  }
}
