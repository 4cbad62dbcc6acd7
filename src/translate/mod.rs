/*!

The optional translator to an external rewriting backend. A `Translator` collects the
sorts and operations to emit; registering a sort cascades to its members, and
registering a symbol cascades to its domain and codomain sorts, so the emitted rule
set is closed over everything it references.

Attributed sorts have no generators of their own; they contribute a synthesized
constructor `Sort.make(attr, …)` and one accessor rule per attribute,
`Sort.get_attr(Sort.make(…)) = attr`.

The text backend ([`text`]) renders one block of rules per registered operation;
the [`linearize`] pass rewrites the rule set so that no right-hand side repeats a
variable.

*/

pub mod linearize;
pub mod rule_term;
pub mod text;

use crate::{
  abstractions::{HashSet, IString},
  api::term::{Term, TermKind},
  core::{
    error::{StewError, TranslationError},
    registry::Registry,
    rule::condition::Guard,
    sort::{Sort, SortId, SortSpec},
    symbol::SymbolId,
  },
  debug,
};
use rule_term::{FlatGuard, FlatRule, GuardOp, RuleTerm};

#[derive(Default)]
pub struct Translator {
  sorts     : Vec<SortId>,
  operations: Vec<SymbolId>,
  sort_set  : HashSet<SortId>,
  symbol_set: HashSet<SymbolId>,
}

impl Translator {
  pub fn new() -> Translator {
    Translator::default()
  }

  /// Registers a sort and, transitively, its members and their signature sorts.
  /// Sorts with unsubstituted abstract parameters have no external representation.
  pub fn register_sort(&mut self, registry: &Registry, sort: SortId) -> Result<(), StewError> {
    if self.sort_set.contains(&sort) {
      return Ok(());
    }

    let descriptor = registry.sort(sort);
    if descriptor.is_abstract() {
      return Err(TranslationError::AbstractSort { sort: descriptor.name.clone() }.into());
    }

    debug!(2, "translator: registering sort `{}`", descriptor.name);
    self.sort_set.insert(sort);
    self.sorts.push(sort);

    for attribute in &descriptor.attributes {
      let domain = self.concrete_domain(descriptor, &attribute.domain)?;
      self.register_sort(registry, domain)?;
    }

    let members: Vec<SymbolId> = descriptor
        .generators
        .iter()
        .chain(descriptor.operations.iter())
        .copied()
        .collect();
    for member in members {
      self.register_symbol(registry, member)?;
    }

    Ok(())
  }

  /// Registers a generator or operation and, transitively, the sorts of its domain
  /// and codomain.
  pub fn register_symbol(&mut self, registry: &Registry, symbol: SymbolId) -> Result<(), StewError> {
    if self.symbol_set.contains(&symbol) {
      return Ok(());
    }

    self.symbol_set.insert(symbol);
    if registry.symbol(symbol).is_operation() {
      self.operations.push(symbol);
    }

    let descriptor = registry.symbol(symbol);
    let parent = registry.sort(descriptor.parent);
    let mut dependencies = Vec::with_capacity(descriptor.arity() + 1);
    for (_, spec) in &descriptor.domain {
      dependencies.push(self.concrete_domain(parent, spec)?);
    }
    dependencies.push(descriptor.codomain);

    for dependency in dependencies {
      self.register_sort(registry, dependency)?;
    }

    Ok(())
  }

  #[inline(always)]
  pub fn contains_sort(&self, sort: SortId) -> bool {
    self.sort_set.contains(&sort)
  }

  #[inline(always)]
  pub fn contains_symbol(&self, symbol: SymbolId) -> bool {
    self.symbol_set.contains(&symbol)
  }

  /// The registered operations in registration order.
  pub fn operations(&self) -> &[SymbolId] {
    &self.operations
  }

  /// The registered sorts in registration order.
  pub fn sorts(&self) -> &[SortId] {
    &self.sorts
  }

  /// Produces the flat rule blocks to emit: the accessor rules of every attributed
  /// sort, then one block per operation in registration order.
  pub fn flat_rules(&self, registry: &Registry) -> Result<Vec<Vec<FlatRule>>, StewError> {
    let mut blocks = Vec::new();

    for &sort in &self.sorts {
      let block = self.accessor_rules(registry, sort)?;
      if !block.is_empty() {
        blocks.push(block);
      }
    }

    for &operation in &self.operations {
      let block = self.operation_rules(registry, operation)?;
      if !block.is_empty() {
        blocks.push(block);
      }
    }

    Ok(blocks)
  }

  fn operation_rules(&self, registry: &Registry, operation: SymbolId) -> Result<Vec<FlatRule>, StewError> {
    let descriptor = registry.symbol(operation);
    let parent = registry.sort(descriptor.parent);

    let mut rules = Vec::with_capacity(descriptor.rules().len());
    for rule in descriptor.rules() {
      let mut params = Vec::with_capacity(descriptor.arity());
      for (name, spec) in &descriptor.domain {
        let sort = self.concrete_domain(parent, spec)?;
        let param = match rule.matches.iter().find(|(parameter, _)| parameter == name) {
          Some((_, pattern)) => self.rule_term(registry, pattern)?,
          // Unmatched parameters print as bare variables.
          None => RuleTerm::variable(name.clone(), sort),
        };
        params.push(param);
      }

      let mut guards = Vec::with_capacity(rule.guards.len());
      for guard in &rule.guards {
        guards.push(self.flat_guard(registry, guard)?);
      }

      rules.push(FlatRule {
        guards,
        head: descriptor.qualified_name.clone(),
        params,
        rhs: self.rule_term(registry, &rule.rhs)?,
      });
    }

    Ok(rules)
  }

  fn accessor_rules(&self, registry: &Registry, sort: SortId) -> Result<Vec<FlatRule>, StewError> {
    let descriptor = registry.sort(sort);
    if descriptor.attributes.is_empty() {
      return Ok(Vec::new());
    }

    let mut fields = Vec::with_capacity(descriptor.attributes.len());
    for attribute in &descriptor.attributes {
      let domain = self.concrete_domain(descriptor, &attribute.domain)?;
      fields.push((attribute.name.clone(), domain));
    }

    let constructor = RuleTerm::apply(
      record_constructor_name(descriptor),
      fields
          .iter()
          .map(|(name, domain)| RuleTerm::variable(name.clone(), *domain))
          .collect(),
    );

    let mut rules = Vec::with_capacity(fields.len());
    for (name, domain) in &fields {
      rules.push(FlatRule {
        guards: Vec::new(),
        head  : IString::from(format!("{}.get_{}", descriptor.name, name).as_str()),
        params: vec![constructor.clone()],
        rhs   : RuleTerm::variable(name.clone(), *domain),
      });
    }

    Ok(rules)
  }

  fn flat_guard(&self, registry: &Registry, guard: &Guard) -> Result<FlatGuard, StewError> {
    let (lhs, op, rhs) = match guard {
      Guard::Equality { lhs, rhs } => (lhs, GuardOp::Eq, rhs),
      Guard::Disequality { lhs, rhs } => (lhs, GuardOp::Ne, rhs),
      // A boolean guard is the `term = true` equality it abbreviates.
      Guard::Boolean { term, truth } => (term, GuardOp::Eq, truth),
    };
    Ok(FlatGuard {
      lhs: self.rule_term(registry, lhs)?,
      op,
      rhs: self.rule_term(registry, rhs)?,
    })
  }

  /// Converts an engine term to a translator term. Every symbol and record sort the
  /// term references must be registered.
  fn rule_term(&self, registry: &Registry, term: &Term) -> Result<RuleTerm, StewError> {
    match term.kind() {
      TermKind::Variable { name, domain } => Ok(RuleTerm::variable(name.clone(), *domain)),

      TermKind::Application { symbol, args, .. } => {
        if !self.contains_symbol(symbol.index) {
          return Err(TranslationError::UnregisteredSymbol { name: symbol.name.clone() }.into());
        }
        let mut converted = Vec::with_capacity(args.len());
        for (_, argument) in args {
          converted.push(self.rule_term(registry, argument)?);
        }
        Ok(RuleTerm::apply(symbol.name.clone(), converted))
      }

      TermKind::Record { sort, attributes } => {
        if !self.contains_sort(sort.index) {
          return Err(TranslationError::UnregisteredSymbol {
            name: record_constructor_name(registry.sort(sort.index)),
          }
          .into());
        }
        let mut converted = Vec::with_capacity(attributes.len());
        for (_, value) in attributes {
          converted.push(self.rule_term(registry, value)?);
        }
        Ok(RuleTerm::apply(record_constructor_name(registry.sort(sort.index)), converted))
      }
    }
  }

  fn concrete_domain(&self, parent: &Sort, spec: &SortSpec) -> Result<SortId, StewError> {
    spec
        .concrete()
        .ok_or_else(|| TranslationError::AbstractSort { sort: parent.name.clone() }.into())
  }
}

/// The synthesized constructor name of an attributed sort.
pub(crate) fn record_constructor_name(sort: &Sort) -> IString {
  IString::from(format!("{}.make", sort.name).as_str())
}
