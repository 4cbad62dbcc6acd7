/*!

The linearization pass. Backends that require *linear* rules reject a right-hand side
that uses the same variable more than once. This pass rewrites such rules into a
semantically equivalent linear set by duplicating the shared variable through a
generated `copy` operation producing `pair` tuples:

```text
T.dup(x) = T.cons(x, x)
```

becomes

```text
T.dup(x) = T.dup__lin1(S.copy(x))
T.dup__lin1(S.pair(x_1_1, x_1_2)) = T.cons(x_1_1, x_1_2)
S.copy(S.nil) = S.pair(S.nil, S.nil)
S.copy(S.suc(self)) = S.combine_suc(S.copy(self))
S.combine_suc(S.pair(l_self, r_self)) = S.pair(S.suc(l_self), S.suc(r_self))
```

Support rules are generated once per sort and transitively over the argument sorts of
its generators; an attributed sort copies through its synthesized `make` constructor.

*/

use crate::{
  abstractions::{HashMap, IString},
  core::{
    error::{StewError, TranslationError},
    registry::Registry,
    sort::SortId,
  },
  translate::{
    record_constructor_name,
    rule_term::{FlatRule, RuleTerm},
  },
};

/// Rewrites `rules` into an equivalent linear rule set, appending the generated
/// `copy`/`pair`/`combine` support rules of every sort that needed copying.
pub fn linearize(registry: &Registry, rules: Vec<FlatRule>) -> Result<Vec<FlatRule>, StewError> {
  let mut out = Vec::with_capacity(rules.len());
  let mut copy_sorts: Vec<SortId> = Vec::new();
  let mut counter = 0usize;

  for rule in rules {
    linearize_rule(registry, rule, &mut out, &mut copy_sorts, &mut counter);
  }

  // Copying a sort requires copying the argument sorts of its generators, so the
  // work list grows while it is drained.
  let mut index = 0;
  while index < copy_sorts.len() {
    let sort = copy_sorts[index];
    index += 1;
    let support = copy_rules(registry, sort, &mut copy_sorts)?;
    out.extend(support);
  }

  Ok(out)
}

/// Is every variable of the rule's right-hand side used at most once?
pub fn is_linear(rule: &FlatRule) -> bool {
  let mut order = Vec::new();
  let mut counts = HashMap::new();
  count_occurrences(&rule.rhs, &mut order, &mut counts);
  counts.values().all(|&count| count <= 1)
}

fn linearize_rule(
  registry: &Registry,
  rule: FlatRule,
  out: &mut Vec<FlatRule>,
  copy_sorts: &mut Vec<SortId>,
  counter: &mut usize,
) {
  let mut order: Vec<(IString, SortId)> = Vec::new();
  let mut counts: HashMap<IString, usize> = HashMap::new();
  count_occurrences(&rule.rhs, &mut order, &mut counts);

  let repeated = order.iter().find(|(name, _)| counts[name] >= 2).cloned();
  let (name, sort) = match repeated {
    None => {
      out.push(rule);
      return;
    }
    Some(found) => found,
  };

  if !copy_sorts.contains(&sort) {
    copy_sorts.push(sort);
  }

  *counter += 1;
  let sort_name = &registry.sort(sort).name;
  let aux = IString::from(format!("{}__lin{}", rule.head, counter).as_str());
  let first = IString::from(format!("{}_{}_1", name, counter).as_str());
  let second = IString::from(format!("{}_{}_2", name, counter).as_str());

  let others: Vec<(IString, SortId)> =
    order.into_iter().filter(|(other, _)| *other != name).collect();

  // The original rule now defers to the auxiliary operation, feeding it the copied
  // variable; its guards stay here, where all parameters are still in scope.
  let mut aux_args = Vec::with_capacity(others.len() + 1);
  aux_args.push(RuleTerm::apply(
    IString::from(format!("{}.copy", sort_name).as_str()),
    vec![RuleTerm::variable(name.clone(), sort)],
  ));
  aux_args.extend(others.iter().map(|(other, other_sort)| RuleTerm::variable(other.clone(), *other_sort)));

  out.push(FlatRule {
    guards: rule.guards,
    head  : rule.head,
    params: rule.params,
    rhs   : RuleTerm::apply(aux.clone(), aux_args),
  });

  // The auxiliary rule unpacks the pair into the two occurrences. A variable used
  // three or more times is still repeated here, so recurse.
  let mut replaced_first = false;
  let rhs = split_variable(&rule.rhs, &name, &first, &second, &mut replaced_first);

  let mut params = Vec::with_capacity(others.len() + 1);
  params.push(RuleTerm::apply(
    IString::from(format!("{}.pair", sort_name).as_str()),
    vec![RuleTerm::variable(first, sort), RuleTerm::variable(second, sort)],
  ));
  params.extend(others.into_iter().map(|(other, other_sort)| RuleTerm::variable(other, other_sort)));

  linearize_rule(
    registry,
    FlatRule {
      guards: Vec::new(),
      head: aux,
      params,
      rhs,
    },
    out,
    copy_sorts,
    counter,
  );
}

/// Counts variable occurrences in first-occurrence order.
fn count_occurrences(term: &RuleTerm, order: &mut Vec<(IString, SortId)>, counts: &mut HashMap<IString, usize>) {
  match term {
    RuleTerm::Variable { name, sort } => {
      let count = counts.entry(name.clone()).or_insert(0);
      if *count == 0 {
        order.push((name.clone(), *sort));
      }
      *count += 1;
    }

    RuleTerm::Apply { args, .. } => {
      for argument in args {
        count_occurrences(argument, order, counts);
      }
    }
  }
}

/// Replaces the first occurrence of `target` with `first` and every later occurrence
/// with `second`.
fn split_variable(
  term: &RuleTerm,
  target: &IString,
  first: &IString,
  second: &IString,
  replaced_first: &mut bool,
) -> RuleTerm {
  match term {
    RuleTerm::Variable { name, sort } if name == target => {
      let replacement = if *replaced_first { second } else { first };
      *replaced_first = true;
      RuleTerm::variable(replacement.clone(), *sort)
    }

    RuleTerm::Variable { .. } => term.clone(),

    RuleTerm::Apply { name, args } => {
      RuleTerm::apply(
        name.clone(),
        args
            .iter()
            .map(|argument| split_variable(argument, target, first, second, replaced_first))
            .collect(),
      )
    }
  }
}

/// The generated support rules defining `Sort.copy` over every constructor of `sort`.
fn copy_rules(registry: &Registry, sort: SortId, copy_sorts: &mut Vec<SortId>) -> Result<Vec<FlatRule>, StewError> {
  let descriptor = registry.sort(sort);
  let sort_name = descriptor.name.clone();
  let copy_name = IString::from(format!("{}.copy", sort_name).as_str());
  let pair_name = IString::from(format!("{}.pair", sort_name).as_str());

  // An attributed sort copies through its synthesized constructor; otherwise every
  // generator contributes.
  let mut constructors: Vec<(IString, IString, Vec<(IString, SortId)>)> = Vec::new();
  if descriptor.generators.is_empty() && !descriptor.attributes.is_empty() {
    let mut fields = Vec::with_capacity(descriptor.attributes.len());
    for attribute in &descriptor.attributes {
      let domain = attribute.domain.concrete().ok_or_else(|| TranslationError::AbstractSort {
        sort: sort_name.clone(),
      })?;
      fields.push((attribute.name.clone(), domain));
    }
    constructors.push((record_constructor_name(descriptor), IString::from("make"), fields));
  } else {
    for &generator in &descriptor.generators {
      let symbol = registry.symbol(generator);
      let mut fields = Vec::with_capacity(symbol.arity());
      for (parameter, spec) in &symbol.domain {
        let domain = spec.concrete().ok_or_else(|| TranslationError::AbstractSort {
          sort: sort_name.clone(),
        })?;
        fields.push((parameter.clone(), domain));
      }
      constructors.push((symbol.qualified_name.clone(), symbol.name.clone(), fields));
    }
  }

  let mut rules = Vec::new();
  for (constructor, short_name, fields) in constructors {
    if fields.is_empty() {
      // S.copy(g) = S.pair(g, g)
      let ground = RuleTerm::apply(constructor, Vec::new());
      rules.push(FlatRule {
        guards: Vec::new(),
        head  : copy_name.clone(),
        params: vec![ground.clone()],
        rhs   : RuleTerm::apply(pair_name.clone(), vec![ground.clone(), ground]),
      });
      continue;
    }

    for (_, domain) in &fields {
      if !copy_sorts.contains(domain) {
        copy_sorts.push(*domain);
      }
    }

    let combine_name = IString::from(format!("{}.combine_{}", sort_name, short_name).as_str());

    // S.copy(g(p, …)) = S.combine_g(S1.copy(p), …)
    rules.push(FlatRule {
      guards: Vec::new(),
      head  : copy_name.clone(),
      params: vec![RuleTerm::apply(
        constructor.clone(),
        fields
            .iter()
            .map(|(parameter, domain)| RuleTerm::variable(parameter.clone(), *domain))
            .collect(),
      )],
      rhs: RuleTerm::apply(
        combine_name.clone(),
        fields
            .iter()
            .map(|(parameter, domain)| {
              RuleTerm::apply(
                IString::from(format!("{}.copy", registry.sort(*domain).name).as_str()),
                vec![RuleTerm::variable(parameter.clone(), *domain)],
              )
            })
            .collect(),
      ),
    });

    // S.combine_g(S1.pair(l_p, r_p), …) = S.pair(g(l_p, …), g(r_p, …))
    let left = |parameter: &IString| IString::from(format!("l_{}", parameter).as_str());
    let right = |parameter: &IString| IString::from(format!("r_{}", parameter).as_str());

    rules.push(FlatRule {
      guards: Vec::new(),
      head  : combine_name,
      params: fields
          .iter()
          .map(|(parameter, domain)| {
            RuleTerm::apply(
              IString::from(format!("{}.pair", registry.sort(*domain).name).as_str()),
              vec![
                RuleTerm::variable(left(parameter), *domain),
                RuleTerm::variable(right(parameter), *domain),
              ],
            )
          })
          .collect(),
      rhs: RuleTerm::apply(
        pair_name.clone(),
        vec![
          RuleTerm::apply(
            constructor.clone(),
            fields
                .iter()
                .map(|(parameter, domain)| RuleTerm::variable(left(parameter), *domain))
                .collect(),
          ),
          RuleTerm::apply(
            constructor.clone(),
            fields
                .iter()
                .map(|(parameter, domain)| RuleTerm::variable(right(parameter), *domain))
                .collect(),
          ),
        ],
      ),
    });
  }

  Ok(rules)
}
