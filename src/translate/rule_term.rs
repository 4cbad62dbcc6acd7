/*!

The term representation of the translator output. A `RuleTerm` is a flattened,
name-based term: variables print bare, applications print as
`Qualified.name(arg, …)`. The structure is deliberately independent of the registry's
`Term` so that the linearization pass can introduce synthetic operations (`copy`,
`pair`, `combine`) that exist only in the emitted rule set.

*/

use std::fmt::{Display, Formatter};

use crate::{
  abstractions::{join_string, IString},
  core::sort::SortId,
};

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RuleTerm {
  Variable {
    name: IString,
    sort: SortId,
  },
  Apply {
    name: IString,
    args: Vec<RuleTerm>,
  },
}

impl RuleTerm {
  pub fn variable(name: IString, sort: SortId) -> RuleTerm {
    RuleTerm::Variable { name, sort }
  }

  pub fn apply(name: IString, args: Vec<RuleTerm>) -> RuleTerm {
    RuleTerm::Apply { name, args }
  }
}

impl Display for RuleTerm {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      RuleTerm::Variable { name, .. } => write!(f, "{}", name),

      RuleTerm::Apply { name, args } => {
        if args.is_empty() {
          write!(f, "{}", name)
        } else {
          write!(f, "{}({})", name, join_string(args.iter(), ", "))
        }
      }
    }
  }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum GuardOp {
  Eq,
  Ne,
}

impl Display for GuardOp {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      GuardOp::Eq => write!(f, "=="),
      GuardOp::Ne => write!(f, "!="),
    }
  }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FlatGuard {
  pub lhs: RuleTerm,
  pub op : GuardOp,
  pub rhs: RuleTerm,
}

impl Display for FlatGuard {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "({} {} {})", self.lhs, self.op, self.rhs)
  }
}

/// One emitted rewriting rule: `guard => head(p1, …, pn) = rhs`, where the guard is an
/// `and`-joined conjunction of equalities and is omitted when empty.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FlatRule {
  pub guards: Vec<FlatGuard>,
  pub head  : IString,
  pub params: Vec<RuleTerm>,
  pub rhs   : RuleTerm,
}

impl Display for FlatRule {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    if !self.guards.is_empty() {
      write!(f, "{} => ", join_string(self.guards.iter(), " and "))?;
    }

    if self.params.is_empty() {
      write!(f, "{} = {}", self.head, self.rhs)
    } else {
      write!(f, "{}({}) = {}", self.head, join_string(self.params.iter(), ", "), self.rhs)
    }
  }
}
