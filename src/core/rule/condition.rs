/*!

Compiled guard conditions. Rules can have optional guards that must be satisfied in
order for the rule to apply. Guards are a "lite" version of the rule itself: term
templates instantiated against the rule's binding and normalized.

A boolean guard is the shortcut version of an equality condition of the form
`expr = true`; the `true` constant of the guard's sort is resolved once at load time.

*/

use std::fmt::{Display, Formatter};

use once_cell::sync::Lazy;

use crate::{abstractions::IString, api::term::Term};

/// The interned name every boolean-ish sort is expected to declare a nullary
/// generator under.
pub(crate) static TRUE_NAME: Lazy<IString> = Lazy::new(|| IString::from("true"));

pub enum Guard {
  /// Equality condition, `x = y`: both sides normalize to equal terms.
  Equality {
    lhs: Term,
    rhs: Term,
  },

  /// Disequality condition, `x != y`: both sides normalize to unequal terms.
  Disequality {
    lhs: Term,
    rhs: Term,
  },

  /// Boolean condition, shortcut for `term = true`. The `truth` term is the nullary
  /// `true` constant of the guard's sort, resolved at load time.
  Boolean {
    term : Term,
    truth: Term,
  },
}

impl Display for Guard {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Guard::Equality { lhs, rhs } => write!(f, "({} == {})", lhs, rhs),
      Guard::Disequality { lhs, rhs } => write!(f, "({} != {})", lhs, rhs),
      Guard::Boolean { term, .. } => write!(f, "({})", term),
    }
  }
}
