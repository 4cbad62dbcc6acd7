/*!

A `RewriteRule` is the compiled form of one guarded, pattern-matching equation of an
operation. Declared conditions form a tree; loading rewrites the tree to disjunctive
normal form and emits one compiled rule per disjunct, in declaration order, with
equalities against bare operation parameters promoted into the matching phase.

*/

pub mod condition;

use std::fmt::{Display, Formatter};

use enumflags2::{bitflags, BitFlags};

use crate::{
  abstractions::{join_string, IString},
  api::term::Term,
  core::rule::condition::Guard,
};

#[bitflags]
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum RuleAttribute {
  /// The rule was produced by expanding a disjunction in its clause's conditions;
  /// it shares a declaration site with the rule preceding it.
  ExpandedDisjunct,

  /// At least one equality condition was compiled into the matching phase.
  PromotedMatch,
}

pub type RuleAttributes = BitFlags<RuleAttribute, u8>;

pub struct RewriteRule {
  /// Per-parameter match patterns: the named argument must match the pattern.
  pub matches   : Vec<(IString, Term)>,
  /// Guards tried in order after the match phase succeeds.
  pub guards    : Vec<Guard>,
  /// The right-hand-side template, instantiated against the binding on success.
  pub rhs       : Term,
  pub attributes: RuleAttributes,
}

impl Display for RewriteRule {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    if !self.matches.is_empty() {
      let matches = join_string(
        self.matches.iter().map(|(parameter, pattern)| format!("{} := {}", parameter, pattern)),
        ", ",
      );
      write!(f, "[{}] ", matches)?;
    }

    if !self.guards.is_empty() {
      write!(f, "if {} ", join_string(self.guards.iter(), r" /\ "))?;
    }

    write!(f, "=> {}", self.rhs)
  }
}
