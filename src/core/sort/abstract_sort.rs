/*!

An `AbstractSort` is a named placeholder declared on a sort, substituted with a
concrete sort by specialization. It may carry an `implements` constraint restricting
admissible substitutions and a `default` concrete sort used when a specialization
request omits the parameter.

*/

use std::fmt::Display;

use crate::{abstractions::IString, core::sort::SortId};

#[derive(Clone, Debug)]
pub struct AbstractSort {
  pub name      : IString,
  /// Only sorts that are subtypes of this sort may be substituted for the parameter.
  pub implements: Option<SortId>,
  /// The concrete sort used when a specialization omits the parameter.
  pub default   : Option<SortId>,
}

impl AbstractSort {
  pub fn new(name: IString) -> AbstractSort {
    AbstractSort {
      name,
      implements: None,
      default   : None,
    }
  }
}

impl Display for AbstractSort {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "<{}>", self.name)
  }
}
