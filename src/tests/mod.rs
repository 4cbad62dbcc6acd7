/*!

End-to-end tests that exercise the whole engine: declaration, matching, rewriting,
specialization, strategies, and translation working together. Narrow unit tests live
next to the code they test; the fixtures here are shared with those.

*/

pub(crate) mod fixtures {
  use crate::{
    api::decl::{AttributeDecl, GeneratorDecl, SortDecl, TermAST},
    core::registry::Registry,
  };

  /// The recurring specification of the matching/rewriting tests: a Peano-style sort
  /// `S`, a pair sort `T`, and an attributed sort `U` with a defaulted `foo`.
  pub(crate) fn peano_registry() -> Registry {
    let mut registry = Registry::new("fixtures");
    registry
        .declare_sort(
          SortDecl::new("S")
              .generator(GeneratorDecl::new("nil"))
              .generator(GeneratorDecl::new("suc").parameter("self", "S")),
        )
        .unwrap();
    registry
        .declare_sort(
          SortDecl::new("T")
              .generator(GeneratorDecl::new("cons").parameter("lhs", "S").parameter("rhs", "S")),
        )
        .unwrap();
    registry
        .declare_sort(
          SortDecl::new("U")
              .attribute(AttributeDecl::new("foo", "S").default(TermAST::symbol("S.nil"))),
        )
        .unwrap();
    registry
  }
}

use rand::Rng;

use crate::{
  abstractions::IString,
  api::{
    decl::{AbstractParamDecl, GeneratorDecl, OperationDecl, RuleDecl, SortDecl, TermAST},
    normalize,
    term::{Term, TermSet},
    Fixpoint,
    Normalize,
    Strategy,
  },
  builtin::{
    boolean::{falsity, truth},
    declare_natural,
    nat::{as_usize, numeral},
  },
  core::{
    error::{ArgumentError, SortError, StewError},
    registry::Registry,
  },
};

#[test]
fn peano_addition() {
  let mut registry = Registry::new("arith");
  declare_natural(&mut registry).unwrap();

  let add = registry.symbol_named("Nat.add").unwrap();
  let call = Term::apply_named(
    &registry,
    add,
    &[
      ("self", numeral(&registry, 1).unwrap()),
      ("other", numeral(&registry, 2).unwrap()),
    ],
  )
  .unwrap();

  let result = normalize(&registry, &call).unwrap();
  assert_eq!(result, numeral(&registry, 3).unwrap());
  assert_eq!(result.to_string(), "Nat.suc(Nat.suc(Nat.suc(Nat.zero)))");
}

#[test]
fn peano_subtraction_partiality() {
  let mut registry = Registry::new("arith");
  declare_natural(&mut registry).unwrap();

  let sub = registry.symbol_named("Nat.sub").unwrap();
  let call = Term::apply_named(
    &registry,
    sub,
    &[
      ("self", numeral(&registry, 1).unwrap()),
      ("other", numeral(&registry, 2).unwrap()),
    ],
  )
  .unwrap();

  match normalize(&registry, &call) {
    Err(StewError::Rewriting(error)) => assert_eq!(&*error.operation, "Nat.sub"),
    other => panic!("expected a rewriting error, got {:?}", other),
  }
}

#[test]
fn boolean_algebra() {
  let mut registry = Registry::new("logic");
  crate::builtin::declare_boolean(&mut registry).unwrap();

  let not = registry.symbol_named("Bool.not").unwrap();
  let and = registry.symbol_named("Bool.and").unwrap();
  let or = registry.symbol_named("Bool.or").unwrap();

  // not(not(true)) = true
  let doubled = Term::apply(
    &registry,
    not,
    &[Term::apply(&registry, not, &[truth(&registry).unwrap()]).unwrap()],
  )
  .unwrap();
  assert_eq!(normalize(&registry, &doubled).unwrap(), truth(&registry).unwrap());

  // and(or(true, false), not(false)) = true
  let lhs = Term::apply_named(
    &registry,
    or,
    &[("self", truth(&registry).unwrap()), ("other", falsity(&registry).unwrap())],
  )
  .unwrap();
  let rhs = Term::apply(&registry, not, &[falsity(&registry).unwrap()]).unwrap();
  let conjunction = Term::apply_named(&registry, and, &[("self", lhs), ("other", rhs)]).unwrap();
  assert_eq!(normalize(&registry, &conjunction).unwrap(), truth(&registry).unwrap());
}

#[test]
fn nonlinear_patterns_require_equal_subterms() {
  let mut registry = fixtures::peano_registry();
  let sort_t = registry.sort_named("T").unwrap();

  // same(p) = x if p matches cons(x, x).
  registry
      .declare_operation(
        sort_t,
        OperationDecl::new("same")
            .parameter("p", "T")
            .codomain("S")
            .rule(
              RuleDecl::new(TermAST::var("x", "S")).matches(
                "p",
                TermAST::apply_named(
                  "cons",
                  vec![("lhs", TermAST::var("x", "S")), ("rhs", TermAST::var("x", "S"))],
                ),
              ),
            ),
      )
      .unwrap();

  let same = registry.symbol_named("T.same").unwrap();
  let cons = registry.symbol_named("T.cons").unwrap();
  let nil = registry.symbol_named("S.nil").unwrap();
  let suc = registry.symbol_named("S.suc").unwrap();

  let zero = Term::constant(&registry, nil).unwrap();
  let one = Term::apply(&registry, suc, &[zero.clone()]).unwrap();

  let equal = Term::apply_named(&registry, cons, &[("lhs", zero.clone()), ("rhs", zero.clone())]).unwrap();
  let call = Term::apply(&registry, same, &[equal]).unwrap();
  assert_eq!(normalize(&registry, &call).unwrap(), zero);

  let unequal = Term::apply_named(&registry, cons, &[("lhs", zero), ("rhs", one)]).unwrap();
  let call = Term::apply(&registry, same, &[unequal]).unwrap();
  assert!(matches!(normalize(&registry, &call), Err(StewError::Rewriting(_))));
}

#[test]
fn operations_over_attribute_records() {
  let mut registry = fixtures::peano_registry();
  let sort_u = registry.sort_named("U").unwrap();

  // unwrap(u) = x if u matches U(foo = x).
  registry
      .declare_operation(
        sort_u,
        OperationDecl::new("unwrap")
            .parameter("u", "U")
            .codomain("S")
            .rule(
              RuleDecl::new(TermAST::var("x", "S"))
                  .matches("u", TermAST::record("U", vec![("foo", TermAST::var("x", "S"))])),
            ),
      )
      .unwrap();

  let unwrap_op = registry.symbol_named("U.unwrap").unwrap();
  let suc = registry.symbol_named("S.suc").unwrap();
  let nil = registry.symbol_named("S.nil").unwrap();

  let one = Term::apply(&registry, suc, &[Term::constant(&registry, nil).unwrap()]).unwrap();
  let record = Term::record(&registry, registry.sort_named("U").unwrap(), &[("foo", one.clone())]).unwrap();

  let call = Term::apply(&registry, unwrap_op, &[record]).unwrap();
  assert_eq!(normalize(&registry, &call).unwrap(), one);

  // The defaulted record unwraps to `nil`.
  let defaulted = Term::record::<&str>(&registry, registry.sort_named("U").unwrap(), &[]).unwrap();
  let call = Term::apply(&registry, unwrap_op, &[defaulted]).unwrap();
  assert_eq!(normalize(&registry, &call).unwrap(), Term::constant(&registry, nil).unwrap());
}

#[test]
fn specialization_subtyping() {
  let mut registry = Registry::new("abstract");
  let sort_s = registry.declare_sort(SortDecl::new("S").generator(GeneratorDecl::new("mk"))).unwrap();
  let sort_t = registry.declare_sort(SortDecl::new("T").generator(GeneratorDecl::new("mk"))).unwrap();

  let base = registry
      .declare_sort(
        SortDecl::new("U")
            .abstract_param(AbstractParamDecl::new("A"))
            .generator(GeneratorDecl::new("cons").parameter("arg", "A")),
      )
      .unwrap();

  let first = registry.specialize(base, &[("A", sort_s)]).unwrap();
  let second = registry.specialize(base, &[("A", sort_t)]).unwrap();

  assert!(registry.is_subtype(first, base));
  assert!(registry.is_subtype(second, base));
  assert!(!registry.is_subtype(first, second));
  assert!(!registry.is_subtype(second, first));
  assert!(!registry.is_subtype(base, first));

  assert_eq!(registry.sort(first).binding(&IString::from("A")), Some(sort_s));
  assert_eq!(registry.sort(second).binding(&IString::from("A")), Some(sort_t));

  // The specialized generator takes the concrete sort; the base generator cannot be
  // applied at all.
  let value = Term::constant(&registry, registry.symbol_named("S.mk").unwrap()).unwrap();
  let cons_first = registry.symbol_named("U[A=S].cons").unwrap();
  let wrapped = Term::apply(&registry, cons_first, &[value.clone()]).unwrap();
  assert_eq!(wrapped.sort(), first);

  let cons_base = registry.symbol_named("U.cons").unwrap();
  assert!(matches!(
    Term::apply(&registry, cons_base, &[value.clone()]),
    Err(StewError::Argument(ArgumentError::UnboundAbstractParameter { .. }))
  ));

  // The wrong concrete sort is rejected by the specialized signature.
  let other = Term::constant(&registry, registry.symbol_named("T.mk").unwrap()).unwrap();
  assert!(matches!(
    Term::apply(&registry, cons_first, &[other]),
    Err(StewError::Argument(ArgumentError::WrongSort { .. }))
  ));

  // Specialization is idempotent per binding.
  assert_eq!(registry.specialize(base, &[("A", sort_s)]).unwrap(), first);
}

#[test]
fn specialization_defaults_and_constraints() {
  let mut registry = Registry::new("abstract");
  let sort_s = registry.declare_sort(SortDecl::new("S").generator(GeneratorDecl::new("mk"))).unwrap();
  let _sort_t = registry.declare_sort(SortDecl::new("T").generator(GeneratorDecl::new("mk"))).unwrap();

  // Defaulted parameter: specializing with no bindings uses the default.
  let defaulted = registry
      .declare_sort(
        SortDecl::new("V")
            .abstract_param(AbstractParamDecl::new("B").default("S"))
            .generator(GeneratorDecl::new("wrap").parameter("value", "B")),
      )
      .unwrap();
  let concrete = registry.specialize(defaulted, &[]).unwrap();
  assert_eq!(registry.sort(concrete).binding(&IString::from("B")), Some(sort_s));
  assert!(registry.is_subtype(concrete, defaulted));

  // A parameter without binding or default fails.
  let bare = registry
      .declare_sort(SortDecl::new("W").abstract_param(AbstractParamDecl::new("C")))
      .unwrap();
  assert!(matches!(
    registry.specialize(bare, &[]),
    Err(StewError::Sort(SortError::MissingSpecialization { .. }))
  ));

  // An `implements` constraint only admits subtypes of the named sort.
  let constrained = registry
      .declare_sort(SortDecl::new("X").abstract_param(AbstractParamDecl::new("D").implements("S")))
      .unwrap();
  let sort_t = registry.sort_named("T").unwrap();
  assert!(matches!(
    registry.specialize(constrained, &[("D", sort_t)]),
    Err(StewError::Sort(SortError::UnsatisfiedConstraint { .. }))
  ));
  assert!(registry.specialize(constrained, &[("D", sort_s)]).is_ok());

  // Specializing a sort without abstract parameters is an error.
  assert!(matches!(
    registry.specialize(sort_s, &[("A", sort_s)]),
    Err(StewError::Sort(SortError::NotAbstract { .. }))
  ));
}

#[test]
fn specialized_rules_rewrite_on_the_derived_sort() {
  let mut registry = Registry::new("abstract");
  registry
      .declare_sort(SortDecl::new("S").generator(GeneratorDecl::new("mk")))
      .unwrap();

  // `reset` collapses any `P` to `unit`; `ident` passes its argument through. Both
  // rules have to be remapped onto the derived sort's symbols.
  let base = registry
      .declare_sort(
        SortDecl::new("P")
            .abstract_param(AbstractParamDecl::new("A"))
            .generator(GeneratorDecl::new("unit"))
            .generator(GeneratorDecl::new("wrap").parameter("arg", "A"))
            .operation(
              OperationDecl::new("reset")
                  .parameter("p", "P")
                  .rule(RuleDecl::new(TermAST::symbol("unit"))),
            )
            .operation(
              OperationDecl::new("ident")
                  .parameter("p", "P")
                  .rule(RuleDecl::new(TermAST::var("p", "P"))),
            ),
      )
      .unwrap();

  let sort_s = registry.sort_named("S").unwrap();
  let derived = registry.specialize(base, &[("A", sort_s)]).unwrap();

  let mk = registry.symbol_named("S.mk").unwrap();
  let wrap = registry.symbol_named("P[A=S].wrap").unwrap();
  let unit = registry.symbol_named("P[A=S].unit").unwrap();
  let reset = registry.symbol_named("P[A=S].reset").unwrap();
  let ident = registry.symbol_named("P[A=S].ident").unwrap();

  let value = Term::constant(&registry, mk).unwrap();
  let subject = Term::apply(&registry, wrap, &[value]).unwrap();
  assert_eq!(subject.sort(), derived);

  // The remapped right-hand side produces the derived sort's `unit`.
  let call = Term::apply(&registry, reset, &[subject.clone()]).unwrap();
  assert_eq!(
    normalize(&registry, &call).unwrap(),
    Term::constant(&registry, unit).unwrap()
  );

  // The remapped variable domain accepts the derived sort's terms.
  let call = Term::apply(&registry, ident, &[subject.clone()]).unwrap();
  assert_eq!(normalize(&registry, &call).unwrap(), subject);
}

#[test]
fn randomized_evaluation_is_deterministic() {
  let mut registry = Registry::new("arith");
  declare_natural(&mut registry).unwrap();
  let add = registry.symbol_named("Nat.add").unwrap();
  let mul = registry.symbol_named("Nat.mul").unwrap();

  let mut rng = rand::rng();
  for _ in 0..16 {
    let n: usize = rng.random_range(0..8);
    let m: usize = rng.random_range(0..8);

    let sum = Term::apply_named(
      &registry,
      add,
      &[("self", numeral(&registry, n).unwrap()), ("other", numeral(&registry, m).unwrap())],
    )
    .unwrap();
    let first = normalize(&registry, &sum).unwrap();
    let second = normalize(&registry, &sum).unwrap();
    assert_eq!(first, second);
    assert_eq!(as_usize(&first), Some(n + m));

    let product = Term::apply_named(
      &registry,
      mul,
      &[("self", numeral(&registry, n).unwrap()), ("other", numeral(&registry, m).unwrap())],
    )
    .unwrap();
    assert_eq!(as_usize(&normalize(&registry, &product).unwrap()), Some(n * m));
  }
}

#[test]
fn normalization_strategy_reaches_a_fixpoint() {
  let mut registry = Registry::new("arith");
  declare_natural(&mut registry).unwrap();
  let add = registry.symbol_named("Nat.add").unwrap();

  let calls: TermSet = (0..3usize)
      .map(|n| {
        Term::apply_named(
          &registry,
          add,
          &[("self", numeral(&registry, n).unwrap()), ("other", numeral(&registry, 1).unwrap())],
        )
        .unwrap()
      })
      .collect();

  let strategy = Fixpoint::new(Box::new(Normalize::new(&registry)));
  let normalized = strategy.transform(&calls);

  let expected: TermSet = (1..4usize).map(|n| numeral(&registry, n).unwrap()).collect();
  assert_eq!(normalized, expected);

  // fixpoint(s)(fixpoint(s)(T)) = fixpoint(s)(T)
  assert_eq!(strategy.transform(&normalized), normalized);
}
