/*!

Definitions related to symbols. A symbol is a generator or operation descriptor: a name
to which a typed domain, a codomain, and (for operations) an ordered list of rewrite
rules are attached.

Generators are *free*: two generator terms are equal iff the generator and all argument
terms are equal, and no rule ever rewrites a generator application. Operations are
*defined*: an operation term means the normal form the rule evaluator reduces it to.

*/

use std::fmt::Display;

use crate::{
  abstractions::{join_string, IString},
  core::{
    rule::RewriteRule,
    sort::{SortId, SortSpec},
  },
};

/// The index of a symbol within its registry. Stable for the life of the registry.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
  #[inline(always)]
  pub(crate) fn idx(self) -> usize {
    self.0 as usize
  }
}

impl Display for SymbolId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Distinguishes free generators from defined operations.
pub enum SymbolKind {
  Generator,
  Operation {
    /// Compiled rewrite rules in declaration order.
    rules: Vec<RewriteRule>,
  },
}

pub struct Symbol {
  /// The short name, e.g. `suc`.
  pub name          : IString,
  /// The registry-unique qualified name, e.g. `Nat.suc`.
  pub qualified_name: IString,
  pub index         : SymbolId,

  /// The sort the symbol was declared under.
  pub parent  : SortId,
  /// Ordered (parameter name, sort) pairs.
  pub domain  : Vec<(IString, SortSpec)>,
  pub codomain: SortId,

  pub kind: SymbolKind,
}

impl Symbol {
  #[inline(always)]
  pub fn arity(&self) -> usize {
    self.domain.len()
  }

  #[inline(always)]
  pub fn is_generator(&self) -> bool {
    matches!(self.kind, SymbolKind::Generator)
  }

  #[inline(always)]
  pub fn is_operation(&self) -> bool {
    matches!(self.kind, SymbolKind::Operation { .. })
  }

  pub fn parameter(&self, name: &IString) -> Option<&SortSpec> {
    self
        .domain
        .iter()
        .find(|(parameter, _)| parameter == name)
        .map(|(_, sort)| sort)
  }

  #[inline(always)]
  pub fn is_parameter(&self, name: &IString) -> bool {
    self.domain.iter().any(|(parameter, _)| parameter == name)
  }

  /// The rewrite rules of an operation in declaration order; empty for a generator.
  pub fn rules(&self) -> &[RewriteRule] {
    match &self.kind {
      SymbolKind::Generator => &[],
      SymbolKind::Operation { rules } => rules,
    }
  }
}

impl Display for Symbol {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let domain = join_string(
      self.domain.iter().map(|(name, sort)| {
        match sort {
          SortSpec::Concrete(id) => format!("{}: #{}", name, id),
          SortSpec::Abstract(param) => format!("{}: <{}>", name, param),
        }
      }),
      ", ",
    );
    write!(f, "{} : ({}) -> #{}", self.qualified_name, domain, self.codomain)
  }
}
