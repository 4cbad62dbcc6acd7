/*!

A `Sort` is a named type of terms. A sort carries its attribute descriptors, the
generators and operations declared under it, and its abstract sort parameters (if any).

See the module level documentation for [`sort`](crate::core::sort) for more about
sorts, specialization, and how the subtype relation is represented in this codebase.

*/

use std::fmt::Display;

use crate::{
  abstractions::{IString, NatSet},
  api::term::Term,
  core::{sort::abstract_sort::AbstractSort, symbol::SymbolId},
};

/// The index of a sort within its registry. Stable for the life of the registry.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SortId(pub(crate) u32);

impl SortId {
  #[inline(always)]
  pub(crate) fn idx(self) -> usize {
    self.0 as usize
  }
}

impl Display for SortId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A resolved sort reference inside a signature. Domains of generators and operations
/// declared on an abstract-parameterized sort may reference the parameters by name;
/// specialization substitutes them with concrete sorts.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum SortSpec {
  Concrete(SortId),
  Abstract(IString),
}

impl SortSpec {
  /// The concrete sort, if this reference has one.
  #[inline(always)]
  pub fn concrete(&self) -> Option<SortId> {
    match self {
      SortSpec::Concrete(sort) => Some(*sort),
      SortSpec::Abstract(_) => None,
    }
  }
}

/// An attribute descriptor: a (name, domain sort, optional default term) triple. An
/// attributed sort is structurally a labelled record over its attributes.
#[derive(Clone, Debug)]
pub struct AttributeDescriptor {
  pub name   : IString,
  pub domain : SortSpec,
  pub default: Option<Term>,
}

#[derive(Clone)]
pub struct Sort {
  pub name : IString,
  /// The index of the sort within its registry.
  pub index: SortId,

  /// Attribute descriptors in declaration order.
  pub attributes: Vec<AttributeDescriptor>,
  /// Generators whose codomain is this sort, in declaration order.
  pub generators: Vec<SymbolId>,
  /// Operations declared under this sort, in declaration order.
  pub operations: Vec<SymbolId>,

  /// Abstract sort parameters, empty unless the sort is abstract-parameterized.
  pub abstract_params: Vec<AbstractSort>,
  /// The base sort a specialization was derived from.
  pub base: Option<SortId>,
  /// The substitutions a specialization was derived with, in parameter declaration
  /// order. Empty for unspecialized sorts.
  pub bindings: Vec<(IString, SortId)>,

  /// Holds the registry indices of sorts that are subtypes of this sort, including
  /// this sort itself and, transitively, every specialization derived from it.
  pub(crate) leq_sorts: NatSet,
}

impl Sort {
  pub(crate) fn new(name: IString, index: SortId) -> Sort {
    let mut leq_sorts = NatSet::default();
    leq_sorts.insert(index.idx());

    Sort {
      name,
      index,
      attributes     : Vec::new(),
      generators     : Vec::new(),
      operations     : Vec::new(),
      abstract_params: Vec::new(),
      base           : None,
      bindings       : Vec::new(),
      leq_sorts,
    }
  }

  /// Does the sort still declare unsubstituted abstract parameters?
  #[inline(always)]
  pub fn is_abstract(&self) -> bool {
    !self.abstract_params.is_empty()
  }

  /// Is the sort a specialization of another sort?
  #[inline(always)]
  pub fn is_specialization(&self) -> bool {
    self.base.is_some()
  }

  pub fn attribute(&self, name: &IString) -> Option<&AttributeDescriptor> {
    self.attributes.iter().find(|attribute| attribute.name == *name)
  }

  pub fn abstract_param(&self, name: &IString) -> Option<&AbstractSort> {
    self.abstract_params.iter().find(|param| param.name == *name)
  }

  /// The concrete sort an abstract parameter was substituted with, if this sort is a
  /// specialization binding that parameter.
  pub fn binding(&self, param: &IString) -> Option<SortId> {
    self
        .bindings
        .iter()
        .find(|(name, _)| name == param)
        .map(|(_, sort)| *sort)
  }

  /// Determines if `self <= other`, that is, whether `self` is `other` or a
  /// specialization of it.
  #[inline(always)]
  pub fn leq(&self, other: &Sort) -> bool {
    other.leq_sorts.contains(self.index.idx())
  }
}

impl Display for Sort {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.name)
  }
}
