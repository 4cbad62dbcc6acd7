/*!

The boolean signature: generators `true` and `false`, operations `not`, `and`, `or`,
and `xor`. Any sort with a nullary `true` generator can serve as the codomain of a
guard; this is the standard one.

*/

use crate::{
  abstractions::IString,
  api::{
    decl::{GeneratorDecl, OperationDecl, RuleDecl, SortDecl, TermAST},
    term::Term,
  },
  core::{
    error::{SortError, StewError},
    registry::Registry,
    sort::SortId,
  },
};

/// Declares the `Bool` sort into `registry` and returns its id.
pub fn declare_boolean(registry: &mut Registry) -> Result<SortId, StewError> {
  registry.declare_sort(
    SortDecl::new("Bool")
        .generator(GeneratorDecl::new("true"))
        .generator(GeneratorDecl::new("false"))
        .operation(
          OperationDecl::new("not")
              .parameter("self", "Bool")
              .rule(RuleDecl::new(TermAST::symbol("false")).matches("self", TermAST::symbol("true")))
              .rule(RuleDecl::new(TermAST::symbol("true"))),
        )
        .operation(
          OperationDecl::new("and")
              .parameter("self", "Bool")
              .parameter("other", "Bool")
              .rule(
                RuleDecl::new(TermAST::symbol("true"))
                    .matches("self", TermAST::symbol("true"))
                    .matches("other", TermAST::symbol("true")),
              )
              .rule(RuleDecl::new(TermAST::symbol("false"))),
        )
        .operation(
          OperationDecl::new("or")
              .parameter("self", "Bool")
              .parameter("other", "Bool")
              .rule(RuleDecl::new(TermAST::symbol("true")).matches("self", TermAST::symbol("true")))
              .rule(RuleDecl::new(TermAST::symbol("true")).matches("other", TermAST::symbol("true")))
              .rule(RuleDecl::new(TermAST::symbol("false"))),
        )
        .operation(
          OperationDecl::new("xor")
              .parameter("self", "Bool")
              .parameter("other", "Bool")
              .rule(
                RuleDecl::new(TermAST::symbol("true"))
                    .matches("self", TermAST::symbol("true"))
                    .matches("other", TermAST::symbol("false")),
              )
              .rule(
                RuleDecl::new(TermAST::symbol("true"))
                    .matches("self", TermAST::symbol("false"))
                    .matches("other", TermAST::symbol("true")),
              )
              .rule(RuleDecl::new(TermAST::symbol("false"))),
        ),
  )
}

/// The `Bool.true` constant.
pub fn truth(registry: &Registry) -> Result<Term, StewError> {
  constant(registry, "Bool.true")
}

/// The `Bool.false` constant.
pub fn falsity(registry: &Registry) -> Result<Term, StewError> {
  constant(registry, "Bool.false")
}

fn constant(registry: &Registry, qualified_name: &str) -> Result<Term, StewError> {
  let symbol = registry.symbol_named(qualified_name).ok_or_else(|| {
    StewError::Sort(SortError::UnresolvedReference {
      name   : IString::from(qualified_name),
      context: IString::from("builtin boolean"),
    })
  })?;
  Term::constant(registry, symbol)
}

#[cfg(test)]
mod tests {
  use paste::paste;

  use super::*;
  use crate::api::normalize;

  fn bool_registry() -> Registry {
    let mut registry = Registry::new("booleans");
    declare_boolean(&mut registry).unwrap();
    registry
  }

  fn value(registry: &Registry, which: &str) -> Term {
    match which {
      "t" => truth(registry).unwrap(),
      _ => falsity(registry).unwrap(),
    }
  }

  /// One truth-table entry per test, named after its inputs: `t` is `Bool.true`,
  /// `f` is `Bool.false`.
  macro_rules! truth_table_test {
    ($op:ident, $lhs:ident, $rhs:ident, $expected:ident) => {
      paste! {
        #[test]
        fn [<$op _ $lhs _ $rhs _is_ $expected>]() {
          let registry = bool_registry();
          let operation = registry.symbol_named(concat!("Bool.", stringify!($op))).unwrap();
          let call = Term::apply_named(
            &registry,
            operation,
            &[
              ("self", value(&registry, stringify!($lhs))),
              ("other", value(&registry, stringify!($rhs))),
            ],
          )
          .unwrap();
          assert_eq!(
            normalize(&registry, &call).unwrap(),
            value(&registry, stringify!($expected))
          );
        }
      }
    };
  }

  truth_table_test!(and, t, t, t);
  truth_table_test!(and, t, f, f);
  truth_table_test!(and, f, t, f);
  truth_table_test!(and, f, f, f);

  truth_table_test!(or, t, t, t);
  truth_table_test!(or, t, f, t);
  truth_table_test!(or, f, t, t);
  truth_table_test!(or, f, f, f);

  truth_table_test!(xor, t, t, f);
  truth_table_test!(xor, t, f, t);
  truth_table_test!(xor, f, t, t);
  truth_table_test!(xor, f, f, f);

  #[test]
  fn not_inverts() {
    let registry = bool_registry();
    let not = registry.symbol_named("Bool.not").unwrap();

    let call = Term::apply(&registry, not, &[truth(&registry).unwrap()]).unwrap();
    assert_eq!(normalize(&registry, &call).unwrap(), falsity(&registry).unwrap());

    let call = Term::apply(&registry, not, &[falsity(&registry).unwrap()]).unwrap();
    assert_eq!(normalize(&registry, &call).unwrap(), truth(&registry).unwrap());
  }

  #[test]
  fn double_negation_is_the_identity() {
    let registry = bool_registry();
    let not = registry.symbol_named("Bool.not").unwrap();

    let inner = Term::apply(&registry, not, &[truth(&registry).unwrap()]).unwrap();
    let call = Term::apply(&registry, not, &[inner]).unwrap();
    assert_eq!(normalize(&registry, &call).unwrap(), truth(&registry).unwrap());
  }
}
