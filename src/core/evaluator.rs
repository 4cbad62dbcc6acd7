/*!

The rule evaluator drives terms to normal form. Arguments normalize first
(call-by-value); an operation application then tries the operation's compiled rules in
declaration order and the first rule whose patterns all match and whose guards all
normalize to `true` provides the result, which is normalized recursively.

A rule attempt runs against a fresh binding seeded with the operation's parameter
names bound to the normalized arguments; the binding never leaks between rules. An
internal `MatchError` anywhere inside the attempt (guard or right-hand-side
instantiation) skips the rule; a `RewritingError` raised by normalization inside a
guard or the right-hand side propagates and fails the enclosing call. Intermediate
recursive calls do not attempt recovery.

Termination is not guaranteed; the user is responsible. The engine makes no cycle
detection.

*/

use crate::{
  abstractions::IString,
  api::term::{Term, TermKind},
  core::{
    binding::{instantiate, Binding},
    error::{RewritingError, StewError},
    matcher::matches_all,
    registry::Registry,
    rule::{condition::Guard, RewriteRule},
    symbol::Symbol,
  },
  trace,
};

/// Drives `term` to normal form with respect to `registry`. Fails with
/// `RewritingError` naming the operation when an operation application reduces to no
/// rule.
pub fn normalize(registry: &Registry, term: &Term) -> Result<Term, StewError> {
  if term.is_normalized() {
    return Ok(term.clone());
  }

  match term.kind() {
    // A variable is inert.
    TermKind::Variable { .. } => Ok(term.clone()),

    TermKind::Record { sort, attributes } => {
      let mut normalized = Vec::with_capacity(attributes.len());
      for (name, value) in attributes {
        normalized.push((name.clone(), normalize(registry, value)?));
      }
      Ok(Term::raw_record(sort.clone(), normalized).mark_normalized())
    }

    TermKind::Application { symbol, sort, args } => {
      // Call-by-value: arguments first.
      let mut normalized = Vec::with_capacity(args.len());
      for (parameter, argument) in args {
        normalized.push((parameter.clone(), normalize(registry, argument)?));
      }

      let descriptor = registry.symbol(symbol.index);
      if descriptor.is_generator() {
        // Generators are free; once the arguments are normal the term is.
        Ok(Term::raw_application(symbol.clone(), *sort, normalized).mark_normalized())
      } else {
        rewrite(registry, descriptor, &normalized)
      }
    }
  }
}

/// Tries each rule of `operation` in declaration order against the normalized
/// arguments, returning the normalized right-hand side of the first rule that applies.
fn rewrite(registry: &Registry, operation: &Symbol, args: &[(IString, Term)]) -> Result<Term, StewError> {
  for (rule_index, rule) in operation.rules().iter().enumerate() {
    trace!(2, "{}: trying rule {} {}", operation.qualified_name, rule_index, rule);

    let mut binding = Binding::new();
    for (parameter, argument) in args {
      binding.bind(parameter.clone(), argument.clone());
    }

    let pairs: Vec<(Term, Term)> = rule
        .matches
        .iter()
        .filter_map(|(parameter, pattern)| {
          binding
              .value(parameter)
              .map(|subject| (subject.clone(), pattern.clone()))
        })
        .collect();
    if pairs.len() != rule.matches.len() || !matches_all(registry, &pairs, &mut binding) {
      continue;
    }

    match apply_rule(registry, rule, &binding)? {
      Some(rhs) => {
        trace!(2, "{}: rule {} applied", operation.qualified_name, rule_index);
        return normalize(registry, &rhs);
      }
      None => continue,
    }
  }

  Err(
    RewritingError {
      operation: operation.qualified_name.clone(),
    }
    .into(),
  )
}

/// Checks the rule's guards against the binding and instantiates the right-hand side.
/// Returns `None` when the rule does not apply; `MatchError`s inside the attempt are
/// converted to `None` so the next rule can be tried.
fn apply_rule(registry: &Registry, rule: &RewriteRule, binding: &Binding) -> Result<Option<Term>, StewError> {
  for guard in &rule.guards {
    match check_guard(registry, guard, binding)? {
      true => {}
      false => return Ok(None),
    }
  }

  match instantiate(&rule.rhs, binding) {
    Ok(rhs) => Ok(Some(rhs)),
    Err(error) => {
      trace!(3, "rule skipped: {}", error);
      Ok(None)
    }
  }
}

/// Instantiates and normalizes a guard. Equality holds iff both sides normalize to
/// equal terms, disequality iff they normalize to unequal terms, and a boolean guard
/// iff its normal form equals the `true` constant of its sort.
fn check_guard(registry: &Registry, guard: &Guard, binding: &Binding) -> Result<bool, StewError> {
  match guard {
    Guard::Equality { lhs, rhs } => {
      let (lhs, rhs) = match (instantiate(lhs, binding), instantiate(rhs, binding)) {
        (Ok(lhs), Ok(rhs)) => (lhs, rhs),
        _ => return Ok(false),
      };
      Ok(normalize(registry, &lhs)? == normalize(registry, &rhs)?)
    }

    Guard::Disequality { lhs, rhs } => {
      let (lhs, rhs) = match (instantiate(lhs, binding), instantiate(rhs, binding)) {
        (Ok(lhs), Ok(rhs)) => (lhs, rhs),
        _ => return Ok(false),
      };
      Ok(normalize(registry, &lhs)? != normalize(registry, &rhs)?)
    }

    Guard::Boolean { term, truth } => {
      let term = match instantiate(term, binding) {
        Ok(term) => term,
        Err(_) => return Ok(false),
      };
      Ok(normalize(registry, &term)? == *truth)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    api::{
      decl::{ConditionAST, OperationDecl, RuleDecl, TermAST},
      term::Term,
    },
    core::error::StewError,
    tests::fixtures::peano_registry,
  };

  #[test]
  fn identity_operation_returns_its_argument() {
    let mut registry = peano_registry();
    let sort = registry.sort_named("S").unwrap();
    registry
        .declare_operation(
          sort,
          OperationDecl::new("f")
              .parameter("x", "S")
              .rule(RuleDecl::new(TermAST::var("x", "S"))),
        )
        .unwrap();

    let f = registry.symbol_named("S.f").unwrap();
    let nil = registry.symbol_named("S.nil").unwrap();
    let suc = registry.symbol_named("S.suc").unwrap();

    let zero = Term::constant(&registry, nil).unwrap();
    let one = Term::apply(&registry, suc, &[zero.clone()]).unwrap();

    let call = Term::apply(&registry, f, &[zero.clone()]).unwrap();
    assert_eq!(normalize(&registry, &call).unwrap(), zero);

    let call = Term::apply(&registry, f, &[one.clone()]).unwrap();
    assert_eq!(normalize(&registry, &call).unwrap(), one);
  }

  #[test]
  fn operation_without_applicable_rules_fails() {
    let mut registry = peano_registry();
    let sort = registry.sort_named("S").unwrap();
    registry
        .declare_operation(sort, OperationDecl::new("f").parameter("x", "S"))
        .unwrap();

    let f = registry.symbol_named("S.f").unwrap();
    let nil = registry.symbol_named("S.nil").unwrap();

    let call = Term::apply(&registry, f, &[Term::constant(&registry, nil).unwrap()]).unwrap();
    let result = normalize(&registry, &call);
    match result {
      Err(StewError::Rewriting(error)) => assert_eq!(&*error.operation, "S.f"),
      other => panic!("expected a rewriting error, got {:?}", other),
    }
  }

  #[test]
  fn rules_are_tried_in_declaration_order() {
    let mut registry = peano_registry();
    let sort = registry.sort_named("S").unwrap();

    // Both rules match every argument; the first one wins.
    registry
        .declare_operation(
          sort,
          OperationDecl::new("f")
              .parameter("x", "S")
              .rule(RuleDecl::new(TermAST::symbol("S.nil")))
              .rule(RuleDecl::new(TermAST::apply("S.suc", vec![TermAST::symbol("S.nil")]))),
        )
        .unwrap();

    let f = registry.symbol_named("S.f").unwrap();
    let suc = registry.symbol_named("S.suc").unwrap();
    let nil = registry.symbol_named("S.nil").unwrap();

    let zero = Term::constant(&registry, nil).unwrap();
    let one = Term::apply(&registry, suc, &[zero.clone()]).unwrap();

    let call = Term::apply(&registry, f, &[one]).unwrap();
    assert_eq!(normalize(&registry, &call).unwrap(), zero);
  }

  #[test]
  fn pattern_binding_extracts_subterms() {
    let mut registry = peano_registry();
    let sort = registry.sort_named("S").unwrap();

    // f(x) = v if x matches suc(v); x otherwise.
    registry
        .declare_operation(
          sort,
          OperationDecl::new("f")
              .parameter("x", "S")
              .rule(
                RuleDecl::new(TermAST::var("v", "S"))
                    .matches("x", TermAST::apply("S.suc", vec![TermAST::var("v", "S")])),
              )
              .rule(RuleDecl::new(TermAST::var("x", "S"))),
        )
        .unwrap();

    let f = registry.symbol_named("S.f").unwrap();
    let suc = registry.symbol_named("S.suc").unwrap();
    let nil = registry.symbol_named("S.nil").unwrap();

    let zero = Term::constant(&registry, nil).unwrap();
    let one = Term::apply(&registry, suc, &[zero.clone()]).unwrap();
    let two = Term::apply(&registry, suc, &[one.clone()]).unwrap();

    let call = Term::apply(&registry, f, &[zero.clone()]).unwrap();
    assert_eq!(normalize(&registry, &call).unwrap(), zero);

    let call = Term::apply(&registry, f, &[one.clone()]).unwrap();
    assert_eq!(normalize(&registry, &call).unwrap(), zero);

    let call = Term::apply(&registry, f, &[two]).unwrap();
    assert_eq!(normalize(&registry, &call).unwrap(), one);
  }

  #[test]
  fn equality_conditions_against_parameters_behave_as_matches() {
    let mut registry = peano_registry();
    let sort = registry.sort_named("S").unwrap();

    // f(x) = nil if x != nil; suc(nil) otherwise.
    registry
        .declare_operation(
          sort,
          OperationDecl::new("f")
              .parameter("x", "S")
              .rule(
                RuleDecl::new(TermAST::symbol("S.nil"))
                    .condition(ConditionAST::ne(TermAST::var("x", "S"), TermAST::symbol("S.nil"))),
              )
              .rule(RuleDecl::new(TermAST::apply("S.suc", vec![TermAST::symbol("S.nil")]))),
        )
        .unwrap();

    let f = registry.symbol_named("S.f").unwrap();
    let suc = registry.symbol_named("S.suc").unwrap();
    let nil = registry.symbol_named("S.nil").unwrap();

    let zero = Term::constant(&registry, nil).unwrap();
    let one = Term::apply(&registry, suc, &[zero.clone()]).unwrap();

    let call = Term::apply(&registry, f, &[one.clone()]).unwrap();
    assert_eq!(normalize(&registry, &call).unwrap(), zero);

    let call = Term::apply(&registry, f, &[zero]).unwrap();
    assert_eq!(normalize(&registry, &call).unwrap(), one);
  }

  #[test]
  fn conjunction_of_conditions_requires_all_of_them() {
    let mut registry = peano_registry();
    let sort = registry.sort_named("S").unwrap();

    // f(x, y) = nil if x = nil and y = nil; suc(nil) otherwise.
    registry
        .declare_operation(
          sort,
          OperationDecl::new("f")
              .parameter("x", "S")
              .parameter("y", "S")
              .rule(
                RuleDecl::new(TermAST::symbol("S.nil")).condition(ConditionAST::all(vec![
                  ConditionAST::eq(TermAST::var("x", "S"), TermAST::symbol("S.nil")),
                  ConditionAST::eq(TermAST::var("y", "S"), TermAST::symbol("S.nil")),
                ])),
              )
              .rule(RuleDecl::new(TermAST::apply("S.suc", vec![TermAST::symbol("S.nil")]))),
        )
        .unwrap();

    let f = registry.symbol_named("S.f").unwrap();
    let suc = registry.symbol_named("S.suc").unwrap();
    let nil = registry.symbol_named("S.nil").unwrap();

    let zero = Term::constant(&registry, nil).unwrap();
    let one = Term::apply(&registry, suc, &[zero.clone()]).unwrap();

    let eval = |lhs: &Term, rhs: &Term| {
      let call =
        Term::apply_named(&registry, f, &[("x", lhs.clone()), ("y", rhs.clone())]).unwrap();
      normalize(&registry, &call).unwrap()
    };

    assert_eq!(eval(&zero, &zero), zero);
    assert_eq!(eval(&zero, &one), one);
    assert_eq!(eval(&one, &zero), one);
    assert_eq!(eval(&one, &one), one);
  }

  #[test]
  fn disjunction_of_conditions_requires_any_of_them() {
    let mut registry = peano_registry();
    let sort = registry.sort_named("S").unwrap();

    // f(x, y) = nil if x = nil or y = nil; suc(nil) otherwise.
    registry
        .declare_operation(
          sort,
          OperationDecl::new("f")
              .parameter("x", "S")
              .parameter("y", "S")
              .rule(
                RuleDecl::new(TermAST::symbol("S.nil")).condition(ConditionAST::any(vec![
                  ConditionAST::eq(TermAST::var("x", "S"), TermAST::symbol("S.nil")),
                  ConditionAST::eq(TermAST::var("y", "S"), TermAST::symbol("S.nil")),
                ])),
              )
              .rule(RuleDecl::new(TermAST::apply("S.suc", vec![TermAST::symbol("S.nil")]))),
        )
        .unwrap();

    let f = registry.symbol_named("S.f").unwrap();
    let suc = registry.symbol_named("S.suc").unwrap();
    let nil = registry.symbol_named("S.nil").unwrap();

    let zero = Term::constant(&registry, nil).unwrap();
    let one = Term::apply(&registry, suc, &[zero.clone()]).unwrap();

    let eval = |lhs: &Term, rhs: &Term| {
      let call =
        Term::apply_named(&registry, f, &[("x", lhs.clone()), ("y", rhs.clone())]).unwrap();
      normalize(&registry, &call).unwrap()
    };

    assert_eq!(eval(&zero, &zero), zero);
    assert_eq!(eval(&zero, &one), zero);
    assert_eq!(eval(&one, &zero), zero);
    assert_eq!(eval(&one, &one), one);
  }

  #[test]
  fn evaluation_is_deterministic() {
    let registry = peano_registry();
    let nil = registry.symbol_named("S.nil").unwrap();
    let suc = registry.symbol_named("S.suc").unwrap();

    let zero = Term::constant(&registry, nil).unwrap();
    let two = Term::apply(&registry, suc, &[Term::apply(&registry, suc, &[zero]).unwrap()]).unwrap();

    let first = normalize(&registry, &two).unwrap();
    let second = normalize(&registry, &two).unwrap();
    assert_eq!(first, second);
  }
}
