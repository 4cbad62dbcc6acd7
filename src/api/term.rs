/*!

A `Term` is a node in the expression tree: a variable, a generator or operation
application, or an attribute record. Terms are immutable; every transformation the
engine performs yields a fresh term, and subterms are shared freely behind `Rc`.

Structural equality and hashing are defined over the term tree only; the attribute
flags a term carries (`Ground`, `Normalized`) never participate. Equality on two ground
generator applications is the generator plus pointwise equality of arguments, equality
on records is pointwise on attributes, and an application is never equal to a record,
even of the same sort.

*/

use std::{
  collections::HashSet,
  fmt::{Debug, Display, Formatter},
  hash::{Hash, Hasher},
  rc::Rc,
};

use enumflags2::{bitflags, BitFlags};

use crate::{
  abstractions::{join_string, IString},
  core::{
    error::{ArgumentError, StewError},
    registry::Registry,
    sort::SortId,
    symbol::SymbolId,
  },
};

pub type TermSet = HashSet<Term>;

#[bitflags]
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TermAttribute {
  /// No variables occur in this term or any of its descendants.
  Ground,

  /// The term was produced by the evaluator and is already in normal form, so
  /// re-normalization can short-circuit.
  Normalized,
}

pub type TermAttributes = BitFlags<TermAttribute, u8>;

/// A symbol occurrence inside a term: the registry index plus the qualified name, so
/// terms can be displayed without consulting the registry.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SymbolRef {
  pub index: SymbolId,
  pub name : IString,
}

/// A sort occurrence inside a record term, index plus name for the same reason.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SortRef {
  pub index: SortId,
  pub name : IString,
}

#[derive(Eq, PartialEq, Hash)]
pub enum TermKind {
  /// A variable with a name and a domain sort.
  Variable {
    name  : IString,
    domain: SortId,
  },

  /// A generator or operation application. Arguments are keyed by parameter name in
  /// domain order.
  Application {
    symbol: SymbolRef,
    sort  : SortId,
    args  : Vec<(IString, Term)>,
  },

  /// An attribute record: a labelled record over the attributes of its sort, in
  /// attribute declaration order.
  Record {
    sort      : SortRef,
    attributes: Vec<(IString, Term)>,
  },
}

#[derive(Clone)]
pub struct Term {
  kind      : Rc<TermKind>,
  attributes: TermAttributes,
}

impl Term {
  // region Constructors

  /// Constructs a variable term with the given name and domain sort.
  pub fn variable(name: &str, domain: SortId) -> Term {
    Term {
      kind      : Rc::new(TermKind::Variable {
        name: IString::from(name),
        domain,
      }),
      attributes: TermAttributes::default(),
    }
  }

  /// Constructs a nullary application of `symbol`.
  pub fn constant(registry: &Registry, symbol: SymbolId) -> Result<Term, StewError> {
    Term::apply_named::<&str>(registry, symbol, &[])
  }

  /// Constructs an application of `symbol` with positional arguments. A symbol with a
  /// single-parameter domain may be applied to a single positional value; more than
  /// one positional argument is an `ArgumentError`.
  pub fn apply(registry: &Registry, symbol: SymbolId, args: &[Term]) -> Result<Term, StewError> {
    if args.is_empty() {
      return Term::apply_named::<&str>(registry, symbol, &[]);
    }

    let descriptor = registry.symbol(symbol);
    if args.len() > 1 || descriptor.arity() != 1 {
      return Err(
        ArgumentError::Positional {
          symbol: descriptor.qualified_name.clone(),
          given : args.len(),
        }
        .into(),
      );
    }

    let parameter = descriptor.domain[0].0.clone();
    Term::apply_named(registry, symbol, &[(&*parameter, args[0].clone())])
  }

  /// Constructs an application of `symbol` with named arguments. Validates arity and
  /// that each argument's sort is assignable to the declared domain.
  pub fn apply_named<N: AsRef<str>>(
    registry: &Registry,
    symbol: SymbolId,
    args: &[(N, Term)],
  ) -> Result<Term, StewError> {
    let descriptor = registry.symbol(symbol);

    for (name, _) in args {
      let name = IString::from(name.as_ref());
      if !descriptor.is_parameter(&name) {
        return Err(
          ArgumentError::Unexpected {
            symbol   : descriptor.qualified_name.clone(),
            parameter: name,
          }
          .into(),
        );
      }
    }

    let mut resolved = Vec::with_capacity(descriptor.arity());
    for (parameter, spec) in &descriptor.domain {
      let domain = spec.concrete().ok_or_else(|| ArgumentError::UnboundAbstractParameter {
        symbol   : descriptor.qualified_name.clone(),
        parameter: parameter.clone(),
      })?;

      let value = args
          .iter()
          .find(|(name, _)| name.as_ref() == &**parameter)
          .map(|(_, value)| value)
          .ok_or_else(|| ArgumentError::Missing {
            symbol   : descriptor.qualified_name.clone(),
            parameter: parameter.clone(),
          })?;

      check_assignable(registry, &descriptor.qualified_name, parameter, value, domain)?;
      resolved.push((parameter.clone(), value.clone()));
    }

    Ok(Term::raw_application(
      SymbolRef {
        index: symbol,
        name : descriptor.qualified_name.clone(),
      },
      descriptor.codomain,
      resolved,
    ))
  }

  /// Constructs an attribute record of `sort`. Missing attributes take their declared
  /// defaults; a missing attribute without a default is an `ArgumentError`.
  pub fn record<N: AsRef<str>>(
    registry: &Registry,
    sort: SortId,
    attributes: &[(N, Term)],
  ) -> Result<Term, StewError> {
    let descriptor = registry.sort(sort);

    for (name, _) in attributes {
      let name = IString::from(name.as_ref());
      if descriptor.attribute(&name).is_none() {
        return Err(
          ArgumentError::Unexpected {
            symbol   : descriptor.name.clone(),
            parameter: name,
          }
          .into(),
        );
      }
    }

    let mut resolved = Vec::with_capacity(descriptor.attributes.len());
    for attribute in &descriptor.attributes {
      let domain = attribute.domain.concrete().ok_or_else(|| {
        ArgumentError::UnboundAbstractParameter {
          symbol   : descriptor.name.clone(),
          parameter: attribute.name.clone(),
        }
      })?;

      let value = attributes
          .iter()
          .find(|(name, _)| name.as_ref() == &*attribute.name)
          .map(|(_, value)| value.clone())
          .or_else(|| attribute.default.clone())
          .ok_or_else(|| ArgumentError::Missing {
            symbol   : descriptor.name.clone(),
            parameter: attribute.name.clone(),
          })?;

      check_assignable(registry, &descriptor.name, &attribute.name, &value, domain)?;
      resolved.push((attribute.name.clone(), value));
    }

    Ok(Term::raw_record(
      SortRef {
        index: sort,
        name : descriptor.name.clone(),
      },
      resolved,
    ))
  }

  /// Builds an application without registry validation. Internal: callers guarantee
  /// the arguments were validated or produced by substitution into validated terms.
  pub(crate) fn raw_application(symbol: SymbolRef, sort: SortId, args: Vec<(IString, Term)>) -> Term {
    let ground = args.iter().all(|(_, argument)| argument.is_ground());
    Term {
      kind      : Rc::new(TermKind::Application { symbol, sort, args }),
      attributes: if ground { TermAttribute::Ground.into() } else { TermAttributes::default() },
    }
  }

  /// Builds a record without registry validation. See `raw_application`.
  pub(crate) fn raw_record(sort: SortRef, attributes: Vec<(IString, Term)>) -> Term {
    let ground = attributes.iter().all(|(_, value)| value.is_ground());
    Term {
      kind      : Rc::new(TermKind::Record { sort, attributes }),
      attributes: if ground { TermAttribute::Ground.into() } else { TermAttributes::default() },
    }
  }

  // endregion Constructors

  // region Accessors

  #[inline(always)]
  pub fn kind(&self) -> &TermKind {
    &self.kind
  }

  /// Is the term ground, that is, free of variables?
  #[inline(always)]
  pub fn is_ground(&self) -> bool {
    self.attributes.contains(TermAttribute::Ground)
  }

  #[inline(always)]
  pub fn is_normalized(&self) -> bool {
    self.attributes.contains(TermAttribute::Normalized)
  }

  #[inline(always)]
  pub fn is_variable(&self) -> bool {
    matches!(*self.kind, TermKind::Variable { .. })
  }

  /// The sort of the term: a variable's domain, an application's codomain, or a
  /// record's sort.
  pub fn sort(&self) -> SortId {
    match &*self.kind {
      TermKind::Variable { domain, .. } => *domain,
      TermKind::Application { sort, .. } => *sort,
      TermKind::Record { sort, .. } => sort.index,
    }
  }

  /// Marks the term as a normal form. Internal: only the evaluator produces normal
  /// forms.
  pub(crate) fn mark_normalized(mut self) -> Term {
    self.attributes.insert(TermAttribute::Normalized);
    self
  }

  // endregion Accessors
}

fn check_assignable(
  registry: &Registry,
  symbol: &IString,
  parameter: &IString,
  value: &Term,
  expected: SortId,
) -> Result<(), StewError> {
  let actual = value.sort();
  if !registry.is_subtype(actual, expected) {
    return Err(
      ArgumentError::WrongSort {
        symbol   : symbol.clone(),
        parameter: parameter.clone(),
        expected : registry.sort(expected).name.clone(),
        actual   : registry.sort(actual).name.clone(),
      }
      .into(),
    );
  }
  Ok(())
}

impl PartialEq for Term {
  fn eq(&self, other: &Self) -> bool {
    *self.kind == *other.kind
  }
}

impl Eq for Term {}

impl Hash for Term {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.kind.hash(state);
  }
}

impl Display for Term {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match &*self.kind {
      TermKind::Variable { name, .. } => write!(f, "${}", name),

      TermKind::Application { symbol, args, .. } => {
        if args.is_empty() {
          write!(f, "{}", symbol.name)
        } else {
          let arguments = join_string(args.iter().map(|(_, argument)| argument), ", ");
          write!(f, "{}({})", symbol.name, arguments)
        }
      }

      TermKind::Record { sort, attributes } => {
        let fields = join_string(
          attributes.iter().map(|(name, value)| format!("{} = {}", name, value)),
          ", ",
        );
        write!(f, "{}({})", sort.name, fields)
      }
    }
  }
}

impl Debug for Term {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    Display::fmt(self, f)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tests::fixtures::peano_registry;

  #[test]
  fn constant_equality_is_free() {
    let registry = peano_registry();
    let nil = registry.symbol_named("S.nil").unwrap();
    let suc = registry.symbol_named("S.suc").unwrap();

    let zero = Term::constant(&registry, nil).unwrap();
    let one = Term::apply(&registry, suc, &[zero.clone()]).unwrap();
    let one_again = Term::apply(&registry, suc, &[Term::constant(&registry, nil).unwrap()]).unwrap();

    assert_eq!(zero, Term::constant(&registry, nil).unwrap());
    assert_eq!(one, one_again);
    assert_ne!(zero, one);
  }

  #[test]
  fn hashing_is_consistent_with_equality() {
    use std::collections::hash_map::DefaultHasher;

    let registry = peano_registry();
    let suc = registry.symbol_named("S.suc").unwrap();
    let nil = registry.symbol_named("S.nil").unwrap();

    let hash = |term: &Term| {
      let mut hasher = DefaultHasher::new();
      term.hash(&mut hasher);
      hasher.finish()
    };

    let one = Term::apply(&registry, suc, &[Term::constant(&registry, nil).unwrap()]).unwrap();
    let one_again = Term::apply(&registry, suc, &[Term::constant(&registry, nil).unwrap()]).unwrap();
    assert_eq!(one, one_again);
    assert_eq!(hash(&one), hash(&one_again));
  }

  #[test]
  fn positional_application_requires_single_parameter() {
    let registry = peano_registry();
    let nil = registry.symbol_named("S.nil").unwrap();
    let cons = registry.symbol_named("T.cons").unwrap();

    let zero = Term::constant(&registry, nil).unwrap();
    let result = Term::apply(&registry, cons, &[zero.clone(), zero.clone()]);
    assert!(matches!(
      result,
      Err(StewError::Argument(ArgumentError::Positional { .. }))
    ));

    // Named application of the same arguments is fine.
    let pair = Term::apply_named(&registry, cons, &[("lhs", zero.clone()), ("rhs", zero)]);
    assert!(pair.is_ok());
  }

  #[test]
  fn application_validates_arity_and_sorts() {
    let registry = peano_registry();
    let nil = registry.symbol_named("S.nil").unwrap();
    let cons = registry.symbol_named("T.cons").unwrap();

    let zero = Term::constant(&registry, nil).unwrap();

    let missing = Term::apply_named(&registry, cons, &[("lhs", zero.clone())]);
    assert!(matches!(
      missing,
      Err(StewError::Argument(ArgumentError::Missing { .. }))
    ));

    let unexpected = Term::apply_named(&registry, cons, &[("lhs", zero.clone()), ("middle", zero.clone())]);
    assert!(matches!(
      unexpected,
      Err(StewError::Argument(ArgumentError::Unexpected { .. }))
    ));

    // A `T` where an `S` is expected.
    let pair = Term::apply_named(&registry, cons, &[("lhs", zero.clone()), ("rhs", zero.clone())]).unwrap();
    let wrong = Term::apply_named(&registry, cons, &[("lhs", pair), ("rhs", zero)]);
    assert!(matches!(
      wrong,
      Err(StewError::Argument(ArgumentError::WrongSort { .. }))
    ));
  }

  #[test]
  fn record_defaults_and_equality() {
    let registry = peano_registry();
    let sort_u = registry.sort_named("U").unwrap();
    let nil = registry.symbol_named("S.nil").unwrap();
    let suc = registry.symbol_named("S.suc").unwrap();

    let zero = Term::constant(&registry, nil).unwrap();
    let one = Term::apply(&registry, suc, &[zero.clone()]).unwrap();

    // `foo` defaults to `S.nil`.
    let defaulted = Term::record::<&str>(&registry, sort_u, &[]).unwrap();
    let explicit = Term::record(&registry, sort_u, &[("foo", zero)]).unwrap();
    assert_eq!(defaulted, explicit);

    let other = Term::record(&registry, sort_u, &[("foo", one)]).unwrap();
    assert_ne!(defaulted, other);

    let unexpected = Term::record(&registry, sort_u, &[("bar", Term::constant(&registry, nil).unwrap())]);
    assert!(matches!(
      unexpected,
      Err(StewError::Argument(ArgumentError::Unexpected { .. }))
    ));
  }

  #[test]
  fn display_renders_qualified_applications() {
    let registry = peano_registry();
    let nil = registry.symbol_named("S.nil").unwrap();
    let suc = registry.symbol_named("S.suc").unwrap();

    let one = Term::apply(&registry, suc, &[Term::constant(&registry, nil).unwrap()]).unwrap();
    assert_eq!(one.to_string(), "S.suc(S.nil)");

    let variable = Term::variable("x", registry.sort_named("S").unwrap());
    assert_eq!(variable.to_string(), "$x");
    assert!(!variable.is_ground());
    assert!(one.is_ground());
  }
}
