/*!

A `Binding` holds the variable bindings produced by one rule attempt: a mapping from
variable names to the subterms they matched. A binding is local to its rule attempt and
never leaks between rules.

Instantiation substitutes a binding into a term template, rebuilding the term bottom-up.
Looking up a variable the binding does not hold is the internal `MatchError`; the rule
evaluator converts it to "this rule did not apply".

*/

use std::fmt::{Display, Formatter};

use crate::{
  abstractions::{join_string, HashMap, IString},
  api::term::{Term, TermKind},
  core::error::MatchError,
};

#[derive(Clone, Default)]
pub struct Binding {
  bindings: HashMap<IString, Term>,
}

impl Binding {
  #[inline(always)]
  pub fn new() -> Binding {
    Binding::default()
  }

  #[inline(always)]
  pub fn len(&self) -> usize {
    self.bindings.len()
  }

  #[inline(always)]
  pub fn is_empty(&self) -> bool {
    self.bindings.is_empty()
  }

  /// The term bound to `name`, if any.
  #[inline(always)]
  pub fn value(&self, name: &IString) -> Option<&Term> {
    self.bindings.get(name)
  }

  /// Like `value`, but an unbound variable is the internal `MatchError`.
  pub(crate) fn lookup(&self, name: &IString) -> Result<&Term, MatchError> {
    self.bindings.get(name).ok_or_else(|| MatchError { variable: name.clone() })
  }

  #[inline(always)]
  pub fn bind(&mut self, name: IString, term: Term) {
    self.bindings.insert(name, term);
  }

  pub fn iter(&self) -> impl Iterator<Item = (&IString, &Term)> {
    self.bindings.iter()
  }
}

impl Display for Binding {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    if self.bindings.is_empty() {
      return write!(f, "empty binding");
    }
    write!(
      f,
      "{}",
      join_string(self.bindings.iter().map(|(name, term)| format!("{} --> {}", name, term)), ", ")
    )
  }
}

/// Substitutes `binding` into the template, yielding a fresh term. Ground templates
/// are returned as-is (terms are immutable and freely shared).
pub(crate) fn instantiate(template: &Term, binding: &Binding) -> Result<Term, MatchError> {
  if template.is_ground() {
    return Ok(template.clone());
  }

  match template.kind() {
    TermKind::Variable { name, .. } => Ok(binding.lookup(name)?.clone()),

    TermKind::Application { symbol, sort, args } => {
      let mut instantiated = Vec::with_capacity(args.len());
      for (parameter, argument) in args {
        instantiated.push((parameter.clone(), instantiate(argument, binding)?));
      }
      Ok(Term::raw_application(symbol.clone(), *sort, instantiated))
    }

    TermKind::Record { sort, attributes } => {
      let mut instantiated = Vec::with_capacity(attributes.len());
      for (name, value) in attributes {
        instantiated.push((name.clone(), instantiate(value, binding)?));
      }
      Ok(Term::raw_record(sort.clone(), instantiated))
    }
  }
}
