/*!

The Peano naturals: generators `zero` and `suc`, arithmetic operations `add`, `sub`,
`mul`, `div`, and `mod`, and the comparisons `lt` and `le` with boolean codomain.

`sub`, `div`, and `mod` are partial: `sub(x, y)` for `x < y` and division or remainder
by zero reduce to no rule and fail with a rewriting error.

*/

use crate::{
  api::{
    decl::{ConditionAST, GeneratorDecl, OperationDecl, RuleDecl, SortDecl, TermAST},
    term::{Term, TermKind},
  },
  builtin::boolean::declare_boolean,
  core::{
    error::{SortError, StewError},
    registry::Registry,
    sort::SortId,
    symbol::SymbolId,
  },
  IString,
};

/// Declares the `Nat` sort into `registry` and returns its id. Declares `Bool` first
/// if the registry does not already have it; the comparisons need it.
pub fn declare_natural(registry: &mut Registry) -> Result<SortId, StewError> {
  if registry.sort_named("Bool").is_none() {
    declare_boolean(registry)?;
  }

  let var = |name: &str| TermAST::var(name, "Nat");
  let suc = |inner: TermAST| TermAST::apply("suc", vec![inner]);

  registry.declare_sort(
    SortDecl::new("Nat")
        .generator(GeneratorDecl::new("zero"))
        .generator(GeneratorDecl::new("suc").parameter("self", "Nat"))
        // zero + y = y;  suc(x) + y = suc(x + y)
        .operation(
          OperationDecl::new("add")
              .parameter("self", "Nat")
              .parameter("other", "Nat")
              .rule(RuleDecl::new(var("other")).matches("self", TermAST::symbol("zero")))
              .rule(
                RuleDecl::new(suc(TermAST::apply("add", vec![var("x"), var("other")])))
                    .matches("self", suc(var("x"))),
              ),
        )
        // x - 0 = x;  suc(x) - suc(y) = x - y
        .operation(
          OperationDecl::new("sub")
              .parameter("self", "Nat")
              .parameter("other", "Nat")
              .rule(RuleDecl::new(var("self")).matches("other", TermAST::symbol("zero")))
              .rule(
                RuleDecl::new(TermAST::apply("sub", vec![var("x"), var("y")]))
                    .matches("self", suc(var("x")))
                    .matches("other", suc(var("y"))),
              ),
        )
        // 0 * y = 0;  suc(x) * y = x * y + y
        .operation(
          OperationDecl::new("mul")
              .parameter("self", "Nat")
              .parameter("other", "Nat")
              .rule(RuleDecl::new(TermAST::symbol("zero")).matches("self", TermAST::symbol("zero")))
              .rule(
                RuleDecl::new(TermAST::apply(
                  "add",
                  vec![TermAST::apply("mul", vec![var("x"), var("other")]), var("other")],
                ))
                .matches("self", suc(var("x"))),
              ),
        )
        // x < 0 = false;  0 < suc(y) = true;  suc(x) < suc(y) = x < y
        .operation(
          OperationDecl::new("lt")
              .parameter("self", "Nat")
              .parameter("other", "Nat")
              .codomain("Bool")
              .rule(RuleDecl::new(TermAST::symbol("Bool.false")).matches("other", TermAST::symbol("zero")))
              .rule(RuleDecl::new(TermAST::symbol("Bool.true")).matches("self", TermAST::symbol("zero")))
              .rule(
                RuleDecl::new(TermAST::apply("lt", vec![var("x"), var("y")]))
                    .matches("self", suc(var("x")))
                    .matches("other", suc(var("y"))),
              ),
        )
        // 0 <= y = true;  suc(x) <= 0 = false;  suc(x) <= suc(y) = x <= y
        .operation(
          OperationDecl::new("le")
              .parameter("self", "Nat")
              .parameter("other", "Nat")
              .codomain("Bool")
              .rule(RuleDecl::new(TermAST::symbol("Bool.true")).matches("self", TermAST::symbol("zero")))
              .rule(RuleDecl::new(TermAST::symbol("Bool.false")).matches("other", TermAST::symbol("zero")))
              .rule(
                RuleDecl::new(TermAST::apply("le", vec![var("x"), var("y")]))
                    .matches("self", suc(var("x")))
                    .matches("other", suc(var("y"))),
              ),
        )
        // x / y = 0 if x < y;  x / suc(y') = suc((x - suc(y')) / suc(y')) if not x < suc(y')
        .operation(
          OperationDecl::new("div")
              .parameter("self", "Nat")
              .parameter("other", "Nat")
              .rule(
                RuleDecl::new(TermAST::symbol("zero"))
                    .condition(ConditionAST::boolean(TermAST::apply("lt", vec![var("self"), var("other")]))),
              )
              .rule(
                RuleDecl::new(suc(TermAST::apply(
                  "div",
                  vec![TermAST::apply("sub", vec![var("self"), var("other")]), var("other")],
                )))
                .matches("other", suc(var("y")))
                .condition(ConditionAST::boolean(TermAST::apply(
                  "Bool.not",
                  vec![TermAST::apply("lt", vec![var("self"), var("other")])],
                ))),
              ),
        )
        // x mod y = x if x < y;  x mod suc(y') = (x - suc(y')) mod suc(y') otherwise
        .operation(
          OperationDecl::new("mod")
              .parameter("self", "Nat")
              .parameter("other", "Nat")
              .rule(
                RuleDecl::new(var("self"))
                    .condition(ConditionAST::boolean(TermAST::apply("lt", vec![var("self"), var("other")]))),
              )
              .rule(
                RuleDecl::new(TermAST::apply(
                  "mod",
                  vec![TermAST::apply("sub", vec![var("self"), var("other")]), var("other")],
                ))
                .matches("other", suc(var("y")))
                .condition(ConditionAST::boolean(TermAST::apply(
                  "Bool.not",
                  vec![TermAST::apply("lt", vec![var("self"), var("other")])],
                ))),
              ),
        ),
  )
}

/// Builds the numeral `suc^n(zero)`.
pub fn numeral(registry: &Registry, n: usize) -> Result<Term, StewError> {
  let zero = lookup(registry, "Nat.zero")?;
  let suc = lookup(registry, "Nat.suc")?;

  let mut term = Term::constant(registry, zero)?;
  for _ in 0..n {
    term = Term::apply(registry, suc, &[term])?;
  }
  Ok(term)
}

/// Reads a ground numeral back as a machine integer. Returns `None` for terms that
/// are not `suc`/`zero` towers.
pub fn as_usize(term: &Term) -> Option<usize> {
  match term.kind() {
    TermKind::Application { symbol, args, .. } if &*symbol.name == "Nat.zero" && args.is_empty() => Some(0),
    TermKind::Application { symbol, args, .. } if &*symbol.name == "Nat.suc" && args.len() == 1 => {
      as_usize(&args[0].1).map(|count| count + 1)
    }
    _ => None,
  }
}

fn lookup(registry: &Registry, qualified_name: &str) -> Result<SymbolId, StewError> {
  registry.symbol_named(qualified_name).ok_or_else(|| {
    StewError::Sort(SortError::UnresolvedReference {
      name   : IString::from(qualified_name),
      context: IString::from("builtin naturals"),
    })
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    api::normalize,
    builtin::boolean::{falsity, truth},
    core::error::StewError,
  };

  fn nat_registry() -> Registry {
    let mut registry = Registry::new("naturals");
    declare_natural(&mut registry).unwrap();
    registry
  }

  fn eval_binary(registry: &Registry, operation: &str, lhs: usize, rhs: usize) -> Result<Term, StewError> {
    let symbol = registry.symbol_named(operation).unwrap();
    let call = Term::apply_named(
      registry,
      symbol,
      &[
        ("self", numeral(registry, lhs).unwrap()),
        ("other", numeral(registry, rhs).unwrap()),
      ],
    )?;
    normalize(registry, &call)
  }

  #[test]
  fn numerals_round_trip() {
    let registry = nat_registry();
    for n in [0usize, 1, 2, 7] {
      assert_eq!(as_usize(&numeral(&registry, n).unwrap()), Some(n));
    }
  }

  #[test]
  fn addition() {
    let registry = nat_registry();
    for (lhs, rhs) in [(0usize, 0usize), (0, 2), (2, 0), (2, 2)] {
      let result = eval_binary(&registry, "Nat.add", lhs, rhs).unwrap();
      assert_eq!(as_usize(&result), Some(lhs + rhs), "{} + {}", lhs, rhs);
    }
  }

  #[test]
  fn subtraction_and_its_partiality() {
    let registry = nat_registry();
    for (lhs, rhs) in [(0usize, 0usize), (2, 0), (2, 1), (2, 2)] {
      let result = eval_binary(&registry, "Nat.sub", lhs, rhs).unwrap();
      assert_eq!(as_usize(&result), Some(lhs - rhs), "{} - {}", lhs, rhs);
    }

    // 1 - 2 reduces to no rule.
    let result = eval_binary(&registry, "Nat.sub", 1, 2);
    match result {
      Err(StewError::Rewriting(error)) => assert_eq!(&*error.operation, "Nat.sub"),
      other => panic!("expected a rewriting error, got {:?}", other),
    }
  }

  #[test]
  fn multiplication() {
    let registry = nat_registry();
    for (lhs, rhs) in [(0usize, 2usize), (2, 0), (2, 3), (3, 2)] {
      let result = eval_binary(&registry, "Nat.mul", lhs, rhs).unwrap();
      assert_eq!(as_usize(&result), Some(lhs * rhs), "{} * {}", lhs, rhs);
    }
  }

  #[test]
  fn comparisons() {
    let registry = nat_registry();
    let yes = truth(&registry).unwrap();
    let no = falsity(&registry).unwrap();

    for (lhs, rhs) in [(1usize, 2usize), (2, 2), (3, 2)] {
      let lt = eval_binary(&registry, "Nat.lt", lhs, rhs).unwrap();
      assert_eq!(lt == yes, lhs < rhs, "{} < {}", lhs, rhs);
      assert_eq!(lt == no, lhs >= rhs);

      let le = eval_binary(&registry, "Nat.le", lhs, rhs).unwrap();
      assert_eq!(le == yes, lhs <= rhs, "{} <= {}", lhs, rhs);
    }
  }

  #[test]
  fn division_and_remainder() {
    let registry = nat_registry();
    for (lhs, rhs) in [(0usize, 2usize), (1, 2), (2, 2), (3, 2), (4, 2)] {
      let quotient = eval_binary(&registry, "Nat.div", lhs, rhs).unwrap();
      assert_eq!(as_usize(&quotient), Some(lhs / rhs), "{} / {}", lhs, rhs);

      let remainder = eval_binary(&registry, "Nat.mod", lhs, rhs).unwrap();
      assert_eq!(as_usize(&remainder), Some(lhs % rhs), "{} mod {}", lhs, rhs);
    }

    assert!(matches!(
      eval_binary(&registry, "Nat.div", 2, 0),
      Err(StewError::Rewriting(_))
    ));
    assert!(matches!(
      eval_binary(&registry, "Nat.mod", 2, 0),
      Err(StewError::Rewriting(_))
    ));
  }
}
