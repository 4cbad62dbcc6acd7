/*!

The declaration AST for the specification API. The user describes sorts, generators,
and operations as plain data and hands the declarations to a
[`Registry`](crate::core::registry::Registry), which resolves every name, validates the
signature, and compiles operation bodies into rewrite rules.

Names inside declarations are strings: a sort name resolves against the abstract
parameters of the declaring sort, then the registered sorts, then the sort under
declaration itself (which is how self-referential signatures work). A symbol name
resolves against the declaring sort's members first, `Sort.name`-qualified names
resolve globally.

An operation body is an ordered sequence of [`RuleDecl`] clauses. Each clause has zero
or more match clauses, zero or more conditions, and exactly one right-hand-side term
template; the first clause whose matches and guards all succeed provides the
operation's value.

*/

use crate::abstractions::IString;

/// A term template inside a declaration, naming sorts and symbols by string.
#[derive(Clone, Debug)]
pub enum TermAST {
  /// A variable with a name and a domain sort.
  Variable {
    name: IString,
    sort: IString,
  },

  /// An application of a generator or operation. Arguments are positional
  /// (`name: None`, mapped to parameters in domain order) or named.
  Apply {
    name: IString,
    args: Vec<(Option<IString>, TermAST)>,
  },

  /// An attribute record; missing attributes take their declared defaults.
  Record {
    sort      : IString,
    attributes: Vec<(IString, TermAST)>,
  },
}

impl TermAST {
  pub fn var(name: &str, sort: &str) -> TermAST {
    TermAST::Variable {
      name: IString::from(name),
      sort: IString::from(sort),
    }
  }

  /// A nullary application.
  pub fn symbol(name: &str) -> TermAST {
    TermAST::Apply {
      name: IString::from(name),
      args: Vec::new(),
    }
  }

  /// An application with positional arguments, mapped to parameters in domain order.
  pub fn apply(name: &str, args: Vec<TermAST>) -> TermAST {
    TermAST::Apply {
      name: IString::from(name),
      args: args.into_iter().map(|argument| (None, argument)).collect(),
    }
  }

  /// An application with named arguments.
  pub fn apply_named(name: &str, args: Vec<(&str, TermAST)>) -> TermAST {
    TermAST::Apply {
      name: IString::from(name),
      args: args
          .into_iter()
          .map(|(parameter, argument)| (Some(IString::from(parameter)), argument))
          .collect(),
    }
  }

  pub fn record(sort: &str, attributes: Vec<(&str, TermAST)>) -> TermAST {
    TermAST::Record {
      sort      : IString::from(sort),
      attributes: attributes
          .into_iter()
          .map(|(name, value)| (IString::from(name), value))
          .collect(),
    }
  }
}

/// A condition tree attached to a rule clause. Loading rewrites the tree to
/// disjunctive normal form; each disjunct becomes one compiled rule.
#[derive(Clone, Debug)]
pub enum ConditionAST {
  Equality {
    lhs: TermAST,
    rhs: TermAST,
  },
  Disequality {
    lhs: TermAST,
    rhs: TermAST,
  },
  /// A boolean-valued term, shortcut for `term = true`.
  Boolean(TermAST),
  All(Vec<ConditionAST>),
  Any(Vec<ConditionAST>),
}

impl ConditionAST {
  pub fn eq(lhs: TermAST, rhs: TermAST) -> ConditionAST {
    ConditionAST::Equality { lhs, rhs }
  }

  pub fn ne(lhs: TermAST, rhs: TermAST) -> ConditionAST {
    ConditionAST::Disequality { lhs, rhs }
  }

  pub fn boolean(term: TermAST) -> ConditionAST {
    ConditionAST::Boolean(term)
  }

  pub fn all(conditions: Vec<ConditionAST>) -> ConditionAST {
    ConditionAST::All(conditions)
  }

  pub fn any(conditions: Vec<ConditionAST>) -> ConditionAST {
    ConditionAST::Any(conditions)
  }

  /// The disjunctive normal form of the tree: a disjunction of conjunctions of leaf
  /// conditions, in left-to-right declaration order.
  fn dnf(&self) -> Vec<Vec<ConditionAST>> {
    match self {
      ConditionAST::Any(children) => children.iter().flat_map(|child| child.dnf()).collect(),

      ConditionAST::All(children) => {
        let mut disjuncts: Vec<Vec<ConditionAST>> = vec![Vec::new()];
        for child in children {
          let child_disjuncts = child.dnf();
          let mut expanded = Vec::with_capacity(disjuncts.len() * child_disjuncts.len());
          for conjunct in &disjuncts {
            for extension in &child_disjuncts {
              let mut combined = conjunct.clone();
              combined.extend(extension.iter().cloned());
              expanded.push(combined);
            }
          }
          disjuncts = expanded;
        }
        disjuncts
      }

      leaf => vec![vec![leaf.clone()]],
    }
  }

  /// DNF of an implicitly conjoined condition list. Always yields at least one
  /// disjunct; an empty list yields a single empty conjunction.
  pub(crate) fn dnf_of_list(conditions: &[ConditionAST]) -> Vec<Vec<ConditionAST>> {
    ConditionAST::All(conditions.to_vec()).dnf()
  }
}

/// An attribute declaration: name, domain sort, optional default term.
#[derive(Clone, Debug)]
pub struct AttributeDecl {
  pub name   : IString,
  pub domain : IString,
  pub default: Option<TermAST>,
}

impl AttributeDecl {
  pub fn new(name: &str, domain: &str) -> AttributeDecl {
    AttributeDecl {
      name   : IString::from(name),
      domain : IString::from(domain),
      default: None,
    }
  }

  pub fn default(mut self, term: TermAST) -> AttributeDecl {
    self.default = Some(term);
    self
  }
}

/// An abstract sort parameter declaration.
#[derive(Clone, Debug)]
pub struct AbstractParamDecl {
  pub name      : IString,
  pub implements: Option<IString>,
  pub default   : Option<IString>,
}

impl AbstractParamDecl {
  pub fn new(name: &str) -> AbstractParamDecl {
    AbstractParamDecl {
      name      : IString::from(name),
      implements: None,
      default   : None,
    }
  }

  pub fn implements(mut self, sort: &str) -> AbstractParamDecl {
    self.implements = Some(IString::from(sort));
    self
  }

  pub fn default(mut self, sort: &str) -> AbstractParamDecl {
    self.default = Some(IString::from(sort));
    self
  }
}

/// A generator declaration: a free constructor with typed parameters. The codomain is
/// always the declaring sort.
#[derive(Clone, Debug)]
pub struct GeneratorDecl {
  pub name      : IString,
  pub parameters: Vec<(IString, IString)>,
}

impl GeneratorDecl {
  pub fn new(name: &str) -> GeneratorDecl {
    GeneratorDecl {
      name      : IString::from(name),
      parameters: Vec::new(),
    }
  }

  pub fn parameter(mut self, name: &str, sort: &str) -> GeneratorDecl {
    self.parameters.push((IString::from(name), IString::from(sort)));
    self
  }
}

/// One clause of an operation body.
#[derive(Clone, Debug)]
pub struct RuleDecl {
  pub matches   : Vec<(IString, TermAST)>,
  pub conditions: Vec<ConditionAST>,
  pub rhs       : TermAST,
}

impl RuleDecl {
  pub fn new(rhs: TermAST) -> RuleDecl {
    RuleDecl {
      matches   : Vec::new(),
      conditions: Vec::new(),
      rhs,
    }
  }

  /// Requires the named parameter to match `pattern`.
  pub fn matches(mut self, parameter: &str, pattern: TermAST) -> RuleDecl {
    self.matches.push((IString::from(parameter), pattern));
    self
  }

  pub fn condition(mut self, condition: ConditionAST) -> RuleDecl {
    self.conditions.push(condition);
    self
  }
}

/// An operation declaration: typed parameters, a codomain (the declaring sort unless
/// overridden), and an ordered list of rule clauses.
#[derive(Clone, Debug)]
pub struct OperationDecl {
  pub name      : IString,
  pub parameters: Vec<(IString, IString)>,
  pub codomain  : Option<IString>,
  pub rules     : Vec<RuleDecl>,
}

impl OperationDecl {
  pub fn new(name: &str) -> OperationDecl {
    OperationDecl {
      name      : IString::from(name),
      parameters: Vec::new(),
      codomain  : None,
      rules     : Vec::new(),
    }
  }

  pub fn parameter(mut self, name: &str, sort: &str) -> OperationDecl {
    self.parameters.push((IString::from(name), IString::from(sort)));
    self
  }

  pub fn codomain(mut self, sort: &str) -> OperationDecl {
    self.codomain = Some(IString::from(sort));
    self
  }

  pub fn rule(mut self, rule: RuleDecl) -> OperationDecl {
    self.rules.push(rule);
    self
  }
}

/// A sort declaration with its members.
#[derive(Clone, Debug)]
pub struct SortDecl {
  pub name           : IString,
  pub attributes     : Vec<AttributeDecl>,
  pub abstract_params: Vec<AbstractParamDecl>,
  pub generators     : Vec<GeneratorDecl>,
  pub operations     : Vec<OperationDecl>,
}

impl SortDecl {
  pub fn new(name: &str) -> SortDecl {
    SortDecl {
      name           : IString::from(name),
      attributes     : Vec::new(),
      abstract_params: Vec::new(),
      generators     : Vec::new(),
      operations     : Vec::new(),
    }
  }

  pub fn attribute(mut self, attribute: AttributeDecl) -> SortDecl {
    self.attributes.push(attribute);
    self
  }

  pub fn abstract_param(mut self, param: AbstractParamDecl) -> SortDecl {
    self.abstract_params.push(param);
    self
  }

  pub fn generator(mut self, generator: GeneratorDecl) -> SortDecl {
    self.generators.push(generator);
    self
  }

  pub fn operation(mut self, operation: OperationDecl) -> SortDecl {
    self.operations.push(operation);
    self
  }
}
