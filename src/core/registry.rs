/*!

A `Registry` owns all items of one specification: the declaration-ordered sorts and
symbols, with name indices. The registry is a kind of namespace; evaluation and
matching happen within the context of some registry.

## Registry Construction

Loading is monotone: declarations only ever append. The `RegistryStatus` tracks the
two phases of the registry's life. While `Open`, sorts and symbols can be declared;
`seal` moves the registry to `Loaded`, after which declarations are rejected and the
registry is read-only.

### Self-Referential Signatures

During a sort's declaration its own name may appear in attribute domains, generator
domains, and operation signatures before the sort is complete. Declaration is therefore
two-phase: the sort's `SortId` is reserved and its name installed first, and only then
are member declarations resolved, so a reference to the sort under declaration is an
ordinary lookup against the reserved skeleton.

*/

use std::fmt::{Debug, Formatter};

use crate::{
  abstractions::{HashMap, IString},
  api::{
    decl::{ConditionAST, GeneratorDecl, OperationDecl, RuleDecl, SortDecl, TermAST},
    term::{SortRef, SymbolRef, Term, TermKind},
  },
  core::{
    error::{ArgumentError, SortError, StewError},
    rule::{
      condition::{Guard, TRUE_NAME},
      RewriteRule,
      RuleAttribute,
      RuleAttributes,
    },
    sort::{AbstractSort, AttributeDescriptor, Sort, SortCollection, SortId, SortSpec},
    symbol::{Symbol, SymbolId, SymbolKind},
  },
  debug,
};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Default, Debug)]
pub enum RegistryStatus {
  #[default]
  Open,
  Loaded,
}

pub struct Registry {
  pub name: IString,
  status  : RegistryStatus,

  sorts          : SortCollection,
  symbols        : Vec<Symbol>,
  symbols_by_name: HashMap<IString, SymbolId>,
}

impl Registry {
  pub fn new(name: &str) -> Registry {
    Registry {
      name           : IString::from(name),
      status         : RegistryStatus::default(),
      sorts          : SortCollection::new(),
      symbols        : Vec::new(),
      symbols_by_name: HashMap::new(),
    }
  }

  // region Status

  #[inline(always)]
  pub fn status(&self) -> RegistryStatus {
    self.status
  }

  /// Seals the registry. A sealed registry rejects further declarations; reads are
  /// always allowed.
  pub fn seal(&mut self) {
    self.status = RegistryStatus::Loaded;
  }

  fn ensure_open(&self) -> Result<(), StewError> {
    if self.status != RegistryStatus::Open {
      return Err(StewError::Sealed { registry: self.name.clone() });
    }
    Ok(())
  }

  // endregion Status

  // region Lookup

  #[inline(always)]
  pub fn sort(&self, index: SortId) -> &Sort {
    self.sorts.get(index)
  }

  pub fn sort_named(&self, name: &str) -> Option<SortId> {
    self.sorts.id_of(&IString::from(name))
  }

  #[inline(always)]
  pub fn symbol(&self, index: SymbolId) -> &Symbol {
    &self.symbols[index.idx()]
  }

  /// Looks up a symbol by qualified name, e.g. `Nat.suc`.
  pub fn symbol_named(&self, qualified_name: &str) -> Option<SymbolId> {
    self.symbols_by_name.get(&IString::from(qualified_name)).copied()
  }

  /// Iterates the sorts in declaration order.
  pub fn sorts(&self) -> impl Iterator<Item = &Sort> {
    self.sorts.iter()
  }

  /// Iterates the symbols in declaration order.
  pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
    self.symbols.iter()
  }

  /// Determines whether `a` is `b` or a specialization of `b`.
  #[inline(always)]
  pub fn is_subtype(&self, a: SortId, b: SortId) -> bool {
    self.sorts.get(a).leq(self.sorts.get(b))
  }

  /// The nullary `true` constant of `sort`, if the sort declares one.
  pub(crate) fn truth_constant(&self, sort: SortId) -> Option<Term> {
    self.sorts.get(sort).generators.iter().find_map(|&index| {
      let symbol = self.symbol(index);
      if symbol.name == *TRUE_NAME && symbol.arity() == 0 {
        Some(
          Term::raw_application(
            SymbolRef {
              index,
              name: symbol.qualified_name.clone(),
            },
            symbol.codomain,
            Vec::new(),
          )
          .mark_normalized(),
        )
      } else {
        None
      }
    })
  }

  // endregion Lookup

  // region Declaration

  /// Declares a sort together with its members. Returns the new sort's id.
  pub fn declare_sort(&mut self, decl: SortDecl) -> Result<SortId, StewError> {
    self.ensure_open()?;

    if self.sorts.contains(&decl.name) {
      return Err(StewError::Duplicate {
        kind: "sort",
        name: decl.name,
      });
    }

    debug!(1, "declaring sort `{}`", decl.name);

    // Phase one: reserve the sort's identity so members can reference it.
    let sort = self.sorts.reserve(decl.name.clone());

    // Abstract parameters resolve against already-registered sorts.
    for param in &decl.abstract_params {
      let implements = match &param.implements {
        Some(name) => Some(self.resolve_registered_sort(name, &decl.name)?),
        None => None,
      };
      let default = match &param.default {
        Some(name) => Some(self.resolve_registered_sort(name, &decl.name)?),
        None => None,
      };
      self.sorts.get_mut(sort).abstract_params.push(AbstractSort {
        name: param.name.clone(),
        implements,
        default,
      });
    }

    // Phase two: members. Signatures first so that attribute defaults and rule
    // bodies can reference any member of the sort, then rule compilation.
    for generator in decl.generators {
      self.declare_generator(sort, generator)?;
    }

    let mut pending_rules = Vec::with_capacity(decl.operations.len());
    for mut operation in decl.operations {
      let rules = std::mem::take(&mut operation.rules);
      let index = self.reserve_operation(sort, &operation)?;
      pending_rules.push((index, rules));
    }

    for attribute in &decl.attributes {
      let domain = self.resolve_sort_spec(sort, &attribute.domain, &decl.name)?;
      let default = match &attribute.default {
        Some(ast) => Some(self.resolve_term(sort, &decl.name, ast, false)?),
        None => None,
      };
      self.sorts.get_mut(sort).attributes.push(AttributeDescriptor {
        name: attribute.name.clone(),
        domain,
        default,
      });
    }

    for (index, rules) in pending_rules {
      let compiled = self.compile_rules(index, &rules)?;
      self.install_rules(index, compiled);
    }

    Ok(sort)
  }

  /// Declares a generator under an existing sort. The codomain is the declaring sort.
  pub fn declare_generator(&mut self, sort: SortId, decl: GeneratorDecl) -> Result<SymbolId, StewError> {
    self.ensure_open()?;

    let qualified_name = self.qualify(sort, &decl.name)?;
    let domain = self.resolve_parameters(sort, &decl.parameters, &qualified_name)?;

    let index = SymbolId(self.symbols.len() as u32);
    self.symbols.push(Symbol {
      name: decl.name,
      qualified_name: qualified_name.clone(),
      index,
      parent: sort,
      domain,
      codomain: sort,
      kind: SymbolKind::Generator,
    });
    self.symbols_by_name.insert(qualified_name, index);
    self.sorts.get_mut(sort).generators.push(index);

    debug!(2, "declared generator {}", self.symbol(index));
    Ok(index)
  }

  /// Declares an operation under an existing sort, compiling its rule clauses.
  pub fn declare_operation(&mut self, sort: SortId, mut decl: OperationDecl) -> Result<SymbolId, StewError> {
    self.ensure_open()?;

    let rules = std::mem::take(&mut decl.rules);
    let index = self.reserve_operation(sort, &decl)?;
    let compiled = self.compile_rules(index, &rules)?;
    self.install_rules(index, compiled);

    debug!(2, "declared operation {}", self.symbol(index));
    Ok(index)
  }

  /// Registers an operation's signature without compiling its rules, so rule bodies
  /// can reference operations declared later in the same sort declaration.
  fn reserve_operation(&mut self, sort: SortId, decl: &OperationDecl) -> Result<SymbolId, StewError> {
    let qualified_name = self.qualify(sort, &decl.name)?;
    let domain = self.resolve_parameters(sort, &decl.parameters, &qualified_name)?;

    let codomain = match &decl.codomain {
      Some(name) => {
        match self.resolve_sort_spec(sort, name, &qualified_name)? {
          SortSpec::Concrete(codomain) => codomain,
          SortSpec::Abstract(param) => {
            return Err(
              SortError::UnresolvedReference {
                name   : param,
                context: qualified_name,
              }
              .into(),
            );
          }
        }
      }
      None => sort,
    };

    let index = SymbolId(self.symbols.len() as u32);
    self.symbols.push(Symbol {
      name: decl.name.clone(),
      qualified_name: qualified_name.clone(),
      index,
      parent: sort,
      domain,
      codomain,
      kind: SymbolKind::Operation { rules: Vec::new() },
    });
    self.symbols_by_name.insert(qualified_name, index);
    self.sorts.get_mut(sort).operations.push(index);

    Ok(index)
  }

  fn install_rules(&mut self, index: SymbolId, compiled: Vec<RewriteRule>) {
    if let SymbolKind::Operation { rules } = &mut self.symbols[index.idx()].kind {
      *rules = compiled;
    }
  }

  /// Checks for a duplicate qualified name and returns it interned.
  fn qualify(&self, sort: SortId, name: &IString) -> Result<IString, StewError> {
    let qualified_name = IString::from(format!("{}.{}", self.sorts.get(sort).name, name).as_str());
    if self.symbols_by_name.contains_key(&qualified_name) {
      return Err(StewError::Duplicate {
        kind: "symbol",
        name: qualified_name,
      });
    }
    Ok(qualified_name)
  }

  fn resolve_parameters(
    &self,
    sort: SortId,
    parameters: &[(IString, IString)],
    context: &IString,
  ) -> Result<Vec<(IString, SortSpec)>, StewError> {
    let mut domain = Vec::with_capacity(parameters.len());
    for (name, sort_name) in parameters {
      domain.push((name.clone(), self.resolve_sort_spec(sort, sort_name, context)?));
    }
    Ok(domain)
  }

  /// Resolves a sort name inside a declaration: abstract parameters of the declaring
  /// sort shadow registered sorts; the declaring sort's own name resolves to its
  /// reserved skeleton.
  fn resolve_sort_spec(&self, declaring: SortId, name: &IString, context: &IString) -> Result<SortSpec, StewError> {
    if self.sorts.get(declaring).abstract_param(name).is_some() {
      return Ok(SortSpec::Abstract(name.clone()));
    }
    match self.sorts.id_of(name) {
      Some(index) => Ok(SortSpec::Concrete(index)),
      None => {
        Err(
          SortError::UnresolvedReference {
            name   : name.clone(),
            context: context.clone(),
          }
          .into(),
        )
      }
    }
  }

  /// Resolves a sort name that must already be registered (no abstract parameters,
  /// no self-reference).
  fn resolve_registered_sort(&self, name: &IString, context: &IString) -> Result<SortId, StewError> {
    self.sorts.id_of(name).ok_or_else(|| {
      SortError::UnresolvedReference {
        name   : name.clone(),
        context: context.clone(),
      }
      .into()
    })
  }

  /// Resolves a symbol reference inside a rule body. Qualified names resolve
  /// globally; short names resolve against the declaring sort's members first, then
  /// against a unique global match.
  fn resolve_symbol_name(&self, declaring: SortId, context: &IString, name: &IString) -> Result<SymbolId, StewError> {
    if name.contains('.') {
      return self.symbols_by_name.get(name).copied().ok_or_else(|| {
        SortError::UnresolvedReference {
          name   : name.clone(),
          context: context.clone(),
        }
        .into()
      });
    }

    let sort = self.sorts.get(declaring);
    for &index in sort.generators.iter().chain(sort.operations.iter()) {
      if self.symbol(index).name == *name {
        return Ok(index);
      }
    }

    let mut candidates = self.symbols.iter().filter(|symbol| symbol.name == *name);
    match (candidates.next(), candidates.next()) {
      (Some(symbol), None) => Ok(symbol.index),
      (Some(_), Some(_)) => {
        Err(
          SortError::AmbiguousReference {
            name   : name.clone(),
            context: context.clone(),
          }
          .into(),
        )
      }
      (None, _) => {
        Err(
          SortError::UnresolvedReference {
            name   : name.clone(),
            context: context.clone(),
          }
          .into(),
        )
      }
    }
  }

  /// Resolves a declaration term to a `Term`. With `pattern` set, applications are
  /// restricted to generators.
  fn resolve_term(&self, declaring: SortId, context: &IString, ast: &TermAST, pattern: bool) -> Result<Term, StewError> {
    match ast {
      TermAST::Variable { name, sort } => {
        match self.resolve_sort_spec(declaring, sort, context)? {
          SortSpec::Concrete(domain) => Ok(Term::variable(name, domain)),
          SortSpec::Abstract(param) => {
            // A variable cannot range over an abstract parameter; rules become
            // available on the specialized sort instead.
            Err(
              SortError::UnresolvedReference {
                name   : param,
                context: context.clone(),
              }
              .into(),
            )
          }
        }
      }

      TermAST::Apply { name, args } => {
        let index = self.resolve_symbol_name(declaring, context, name)?;
        let descriptor = self.symbol(index);

        if pattern && descriptor.is_operation() {
          return Err(
            ArgumentError::OperationInPattern {
              operation: context.clone(),
              symbol   : descriptor.qualified_name.clone(),
            }
            .into(),
          );
        }

        let resolved = self.resolve_apply_args(declaring, context, descriptor, args, pattern)?;
        Ok(Term::raw_application(
          SymbolRef {
            index,
            name: descriptor.qualified_name.clone(),
          },
          descriptor.codomain,
          resolved,
        ))
      }

      TermAST::Record { sort, attributes } => {
        let index = match self.resolve_sort_spec(declaring, sort, context)? {
          SortSpec::Concrete(index) => index,
          SortSpec::Abstract(param) => {
            return Err(
              SortError::UnresolvedReference {
                name   : param,
                context: context.clone(),
              }
              .into(),
            );
          }
        };
        let descriptor = self.sorts.get(index);

        for (name, _) in attributes {
          if descriptor.attribute(name).is_none() {
            return Err(
              ArgumentError::Unexpected {
                symbol   : descriptor.name.clone(),
                parameter: name.clone(),
              }
              .into(),
            );
          }
        }

        let mut resolved = Vec::with_capacity(descriptor.attributes.len());
        for attribute in &descriptor.attributes {
          let value = match attributes.iter().find(|(name, _)| name == &attribute.name) {
            Some((_, ast)) => self.resolve_term(declaring, context, ast, pattern)?,
            None => {
              attribute.default.clone().ok_or_else(|| ArgumentError::Missing {
                symbol   : descriptor.name.clone(),
                parameter: attribute.name.clone(),
              })?
            }
          };
          if let Some(domain) = attribute.domain.concrete() {
            self.check_assignable(&descriptor.name, &attribute.name, &value, domain)?;
          }
          resolved.push((attribute.name.clone(), value));
        }

        Ok(Term::raw_record(
          SortRef {
            index,
            name: descriptor.name.clone(),
          },
          resolved,
        ))
      }
    }
  }

  fn resolve_apply_args(
    &self,
    declaring: SortId,
    context: &IString,
    descriptor: &Symbol,
    args: &[(Option<IString>, TermAST)],
    pattern: bool,
  ) -> Result<Vec<(IString, Term)>, StewError> {
    let arity = descriptor.arity();
    let mut provided: Vec<Option<&TermAST>> = vec![None; arity];
    let mut positional = 0usize;

    for (name, value) in args {
      match name {
        None => {
          if positional >= arity {
            return Err(
              ArgumentError::Unexpected {
                symbol   : descriptor.qualified_name.clone(),
                parameter: IString::from(format!("#{}", positional).as_str()),
              }
              .into(),
            );
          }
          provided[positional] = Some(value);
          positional += 1;
        }
        Some(parameter) => {
          let position = descriptor
              .domain
              .iter()
              .position(|(name, _)| name == parameter)
              .ok_or_else(|| ArgumentError::Unexpected {
                symbol   : descriptor.qualified_name.clone(),
                parameter: parameter.clone(),
              })?;
          if provided[position].is_some() {
            return Err(
              ArgumentError::Unexpected {
                symbol   : descriptor.qualified_name.clone(),
                parameter: parameter.clone(),
              }
              .into(),
            );
          }
          provided[position] = Some(value);
        }
      }
    }

    let mut resolved = Vec::with_capacity(arity);
    for (position, (parameter, spec)) in descriptor.domain.iter().enumerate() {
      let ast = provided[position].ok_or_else(|| ArgumentError::Missing {
        symbol   : descriptor.qualified_name.clone(),
        parameter: parameter.clone(),
      })?;
      let value = self.resolve_term(declaring, context, ast, pattern)?;
      if let Some(domain) = spec.concrete() {
        self.check_assignable(&descriptor.qualified_name, parameter, &value, domain)?;
      }
      resolved.push((parameter.clone(), value));
    }

    Ok(resolved)
  }

  fn check_assignable(&self, symbol: &IString, parameter: &IString, value: &Term, expected: SortId) -> Result<(), StewError> {
    let actual = value.sort();
    if !self.is_subtype(actual, expected) {
      return Err(
        ArgumentError::WrongSort {
          symbol   : symbol.clone(),
          parameter: parameter.clone(),
          expected : self.sorts.get(expected).name.clone(),
          actual   : self.sorts.get(actual).name.clone(),
        }
        .into(),
      );
    }
    Ok(())
  }

  // endregion Declaration

  // region Rule compilation

  /// Compiles the rule clauses of an operation. Condition trees are rewritten to DNF,
  /// one compiled rule per disjunct, and equalities against bare operation parameters
  /// are promoted into the matching phase.
  fn compile_rules(&self, operation: SymbolId, decls: &[RuleDecl]) -> Result<Vec<RewriteRule>, StewError> {
    let descriptor = self.symbol(operation);
    let qualified_name = descriptor.qualified_name.clone();
    let parent = descriptor.parent;
    let codomain = descriptor.codomain;

    let mut rules = Vec::new();
    for decl in decls {
      let mut base_matches = Vec::with_capacity(decl.matches.len());
      for (parameter, ast) in &decl.matches {
        if !self.symbol(operation).is_parameter(parameter) {
          return Err(
            ArgumentError::Unexpected {
              symbol   : qualified_name.clone(),
              parameter: parameter.clone(),
            }
            .into(),
          );
        }
        let pattern = self.resolve_term(parent, &qualified_name, ast, true)?;
        base_matches.push((parameter.clone(), pattern));
      }

      for (disjunct_index, conjuncts) in ConditionAST::dnf_of_list(&decl.conditions).into_iter().enumerate() {
        let mut matches = base_matches.clone();
        let mut guards = Vec::new();
        let mut attributes = RuleAttributes::default();
        if disjunct_index > 0 {
          attributes.insert(RuleAttribute::ExpandedDisjunct);
        }

        for condition in &conjuncts {
          match condition {
            ConditionAST::Equality { lhs, rhs } => {
              match self.try_promote_match(operation, &qualified_name, &matches, lhs, rhs)? {
                Some(promoted) => {
                  matches.push(promoted);
                  attributes.insert(RuleAttribute::PromotedMatch);
                }
                None => {
                  guards.push(Guard::Equality {
                    lhs: self.resolve_term(parent, &qualified_name, lhs, false)?,
                    rhs: self.resolve_term(parent, &qualified_name, rhs, false)?,
                  });
                }
              }
            }

            ConditionAST::Disequality { lhs, rhs } => {
              guards.push(Guard::Disequality {
                lhs: self.resolve_term(parent, &qualified_name, lhs, false)?,
                rhs: self.resolve_term(parent, &qualified_name, rhs, false)?,
              });
            }

            ConditionAST::Boolean(ast) => {
              let term = self.resolve_term(parent, &qualified_name, ast, false)?;
              let truth = self.truth_constant(term.sort()).ok_or_else(|| ArgumentError::NotBoolean {
                operation: qualified_name.clone(),
                guard    : term.to_string(),
              })?;
              guards.push(Guard::Boolean { term, truth });
            }

            // DNF leaves only; `dnf_of_list` never yields nested combinators.
            ConditionAST::All(_) | ConditionAST::Any(_) => unreachable!("DNF yielded a non-leaf condition"),
          }
        }

        let rhs = self.resolve_term(parent, &qualified_name, &decl.rhs, false)?;
        self.check_assignable(&qualified_name, &IString::from("return"), &rhs, codomain)?;

        rules.push(RewriteRule {
          matches,
          guards,
          rhs,
          attributes,
        });
      }
    }

    Ok(rules)
  }

  /// An equality between a bare operation parameter and a pattern compiles into the
  /// matching phase. Returns the promoted (parameter, pattern) pair, or `None` when
  /// the condition must stay a guard.
  fn try_promote_match(
    &self,
    operation: SymbolId,
    context: &IString,
    matches: &[(IString, Term)],
    lhs: &TermAST,
    rhs: &TermAST,
  ) -> Result<Option<(IString, Term)>, StewError> {
    let descriptor = self.symbol(operation);
    let already_matched =
      |parameter: &IString| matches.iter().any(|(name, _)| name == parameter);

    for (candidate, other) in [(lhs, rhs), (rhs, lhs)] {
      if let TermAST::Variable { name, .. } = candidate {
        if descriptor.is_parameter(name) && !already_matched(name) {
          match self.resolve_term(descriptor.parent, context, other, true) {
            Ok(pattern) => return Ok(Some((name.clone(), pattern))),
            // The other side is not a pattern; leave the condition as a guard.
            Err(StewError::Argument(ArgumentError::OperationInPattern { .. })) => break,
            Err(error) => return Err(error),
          }
        }
      }
    }

    Ok(None)
  }

  // endregion Rule compilation

  // region Specialization

  /// Produces a concrete sort from an abstract-parameterized base by substituting the
  /// parameters with concrete sorts. Omitted parameters take their declared defaults.
  /// The derived sort is a subtype of the base; distinct specializations of the same
  /// base are incomparable. Specializing twice with identical bindings returns the
  /// existing sort.
  pub fn specialize(&mut self, base: SortId, bindings: &[(&str, SortId)]) -> Result<SortId, StewError> {
    self.ensure_open()?;

    let base_name = self.sorts.get(base).name.clone();
    if !self.sorts.get(base).is_abstract() {
      return Err(SortError::NotAbstract { sort: base_name }.into());
    }

    for (name, _) in bindings {
      let name = IString::from(*name);
      if self.sorts.get(base).abstract_param(&name).is_none() {
        return Err(
          SortError::UnknownAbstractParameter {
            sort     : base_name.clone(),
            parameter: name,
          }
          .into(),
        );
      }
    }

    // Complete the binding list in parameter declaration order, falling back to
    // declared defaults, and check `implements` constraints.
    let params = self.sorts.get(base).abstract_params.clone();
    let mut substitution: Vec<(IString, SortId)> = Vec::with_capacity(params.len());
    for param in &params {
      let concrete = bindings
          .iter()
          .find(|(name, _)| *name == &*param.name)
          .map(|(_, sort)| *sort)
          .or(param.default)
          .ok_or_else(|| SortError::MissingSpecialization {
            sort     : base_name.clone(),
            parameter: param.name.clone(),
          })?;

      if let Some(implements) = param.implements {
        if !self.is_subtype(concrete, implements) {
          return Err(
            SortError::UnsatisfiedConstraint {
              sort      : base_name.clone(),
              parameter : param.name.clone(),
              concrete  : self.sorts.get(concrete).name.clone(),
              implements: self.sorts.get(implements).name.clone(),
            }
            .into(),
          );
        }
      }

      substitution.push((param.name.clone(), concrete));
    }

    let derived_name = {
      let bindings_repr = substitution
          .iter()
          .map(|(name, sort)| format!("{}={}", name, self.sorts.get(*sort).name))
          .collect::<Vec<_>>()
          .join(",");
      IString::from(format!("{}[{}]", base_name, bindings_repr).as_str())
    };

    if let Some(existing) = self.sorts.id_of(&derived_name) {
      return Ok(existing);
    }

    debug!(1, "specializing `{}` as `{}`", base_name, derived_name);

    let derived = self.sorts.reserve(derived_name);
    {
      let sort = self.sorts.get_mut(derived);
      sort.base = Some(base);
      sort.bindings = substitution.clone();
    }

    // The derived sort is a subtype of its base and, transitively, of the base's
    // ancestors.
    let mut ancestor = Some(base);
    while let Some(current) = ancestor {
      self.sorts.get_mut(current).leq_sorts.insert(derived.idx());
      ancestor = self.sorts.get(current).base;
    }

    let substitution_map: HashMap<IString, SortId> = substitution.into_iter().collect();

    // First pass: clone member signatures under the derived sort, building the
    // symbol remapping used by the second pass.
    let base_generators = self.sorts.get(base).generators.clone();
    let base_operations = self.sorts.get(base).operations.clone();
    let mut symbol_map: HashMap<SymbolId, SymbolId> = HashMap::new();

    for &member in base_generators.iter().chain(base_operations.iter()) {
      let old = self.symbol(member);
      let name = old.name.clone();
      let is_generator = old.is_generator();
      let domain = old
          .domain
          .iter()
          .map(|(parameter, spec)| (parameter.clone(), self.substitute_spec(spec, base, derived, &substitution_map)))
          .collect::<Vec<_>>();
      let codomain = if old.codomain == base { derived } else { old.codomain };

      let qualified_name = self.qualify(derived, &name)?;
      let index = SymbolId(self.symbols.len() as u32);
      self.symbols.push(Symbol {
        name,
        qualified_name: qualified_name.clone(),
        index,
        parent: derived,
        domain,
        codomain,
        kind: if is_generator {
          SymbolKind::Generator
        } else {
          SymbolKind::Operation { rules: Vec::new() }
        },
      });
      self.symbols_by_name.insert(qualified_name, index);
      if is_generator {
        self.sorts.get_mut(derived).generators.push(index);
      } else {
        self.sorts.get_mut(derived).operations.push(index);
      }
      symbol_map.insert(member, index);
    }

    // Attributes, with domains substituted and default terms remapped.
    let attributes = self
        .sorts
        .get(base)
        .attributes
        .clone()
        .into_iter()
        .map(|attribute| {
          AttributeDescriptor {
            name   : attribute.name.clone(),
            domain : self.substitute_spec(&attribute.domain, base, derived, &substitution_map),
            default: attribute.default.as_ref().map(|term| self.remap_term(term, base, derived, &symbol_map)),
          }
        })
        .collect::<Vec<_>>();
    self.sorts.get_mut(derived).attributes = attributes;

    // Second pass: remap the rules of every cloned operation.
    for &member in &base_operations {
      let remapped = self
          .symbol(member)
          .rules()
          .iter()
          .map(|rule| {
            RewriteRule {
              matches   : rule
                  .matches
                  .iter()
                  .map(|(parameter, pattern)| (parameter.clone(), self.remap_term(pattern, base, derived, &symbol_map)))
                  .collect(),
              guards    : rule.guards.iter().map(|guard| self.remap_guard(guard, base, derived, &symbol_map)).collect(),
              rhs       : self.remap_term(&rule.rhs, base, derived, &symbol_map),
              attributes: rule.attributes,
            }
          })
          .collect::<Vec<_>>();
      self.install_rules(symbol_map[&member], remapped);
    }

    Ok(derived)
  }

  fn substitute_spec(
    &self,
    spec: &SortSpec,
    base: SortId,
    derived: SortId,
    substitution: &HashMap<IString, SortId>,
  ) -> SortSpec {
    match spec {
      SortSpec::Abstract(name) => {
        match substitution.get(name) {
          Some(concrete) => SortSpec::Concrete(*concrete),
          None => SortSpec::Abstract(name.clone()),
        }
      }
      // A recursive reference to the base follows the specialization.
      SortSpec::Concrete(index) if *index == base => SortSpec::Concrete(derived),
      SortSpec::Concrete(index) => SortSpec::Concrete(*index),
    }
  }

  fn remap_guard(&self, guard: &Guard, base: SortId, derived: SortId, symbol_map: &HashMap<SymbolId, SymbolId>) -> Guard {
    match guard {
      Guard::Equality { lhs, rhs } => {
        Guard::Equality {
          lhs: self.remap_term(lhs, base, derived, symbol_map),
          rhs: self.remap_term(rhs, base, derived, symbol_map),
        }
      }
      Guard::Disequality { lhs, rhs } => {
        Guard::Disequality {
          lhs: self.remap_term(lhs, base, derived, symbol_map),
          rhs: self.remap_term(rhs, base, derived, symbol_map),
        }
      }
      Guard::Boolean { term, truth } => {
        Guard::Boolean {
          term : self.remap_term(term, base, derived, symbol_map),
          truth: self.remap_term(truth, base, derived, symbol_map),
        }
      }
    }
  }

  /// Rebuilds a rule term for a specialized sort: member symbols follow the symbol
  /// remapping and references to the base sort follow to the derived sort.
  fn remap_term(&self, term: &Term, base: SortId, derived: SortId, symbol_map: &HashMap<SymbolId, SymbolId>) -> Term {
    match term.kind() {
      TermKind::Variable { name, domain } => {
        let domain = if *domain == base { derived } else { *domain };
        Term::variable(name, domain)
      }

      TermKind::Application { symbol, sort, args } => {
        let symbol = match symbol_map.get(&symbol.index) {
          Some(&index) => {
            SymbolRef {
              index,
              name: self.symbol(index).qualified_name.clone(),
            }
          }
          None => symbol.clone(),
        };
        let sort = if *sort == base { derived } else { *sort };
        let args = args
            .iter()
            .map(|(parameter, argument)| (parameter.clone(), self.remap_term(argument, base, derived, symbol_map)))
            .collect();
        Term::raw_application(symbol, sort, args)
      }

      TermKind::Record { sort, attributes } => {
        let sort = if sort.index == base {
          SortRef {
            index: derived,
            name : self.sorts.get(derived).name.clone(),
          }
        } else {
          sort.clone()
        };
        let attributes = attributes
            .iter()
            .map(|(name, value)| (name.clone(), self.remap_term(value, base, derived, symbol_map)))
            .collect();
        Term::raw_record(sort, attributes)
      }
    }
  }

  // endregion Specialization
}

impl Debug for Registry {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "Registry {{")?;
    writeln!(f, "  name: {}", self.name)?;
    writeln!(f, "  status: {:?}", self.status)?;
    writeln!(f, "  sorts: [")?;
    for sort in self.sorts.iter() {
      writeln!(f, "    {}", sort)?;
    }
    writeln!(f, "  ]")?;
    writeln!(f, "  symbols: [")?;
    for symbol in &self.symbols {
      writeln!(f, "    {}", symbol)?;
    }
    writeln!(f, "  ]")?;
    writeln!(f, "}}")
  }
}
