/*!

The syntactic matcher. `matches(…)` decides whether a subject term is an instance of a
pattern term and extends a binding accordingly:

1. A variable pattern with domain `D` matches any subject whose sort is `D` or a
   specialization of `D`; an unbound variable binds to the subject, a bound one
   requires the subject to equal the previously bound term (consistent binding).
2. Variables are forbidden on the subject side; a variable subject never matches.
3. Two generator applications match iff they use the same generator and each argument
   matches pairwise.
4. Two attribute records match iff the subject's sort is the pattern's sort or a
   specialization of it and each attribute matches pairwise.
5. Everything else fails.

Matching is transactional within one invocation: a mismatch restores the binding to
its state at entry. The matcher is pure; given the same subject, pattern, and starting
binding it is deterministic.

*/

use crate::{
  api::term::{Term, TermKind},
  core::{binding::Binding, registry::Registry},
  trace,
};

/// Decides whether `subject` is an instance of `pattern`, extending `binding` with the
/// variable bindings of the match. On failure the binding is left untouched.
pub fn matches(registry: &Registry, subject: &Term, pattern: &Term, binding: &mut Binding) -> bool {
  let mut scratch = binding.clone();
  if match_inner(registry, subject, pattern, &mut scratch) {
    *binding = scratch;
    true
  } else {
    false
  }
}

/// The multi-match primitive: all (subject, pattern) pairs must match against the same
/// growing binding. Transactional per pair and over the whole sequence.
pub fn matches_all(
  registry: &Registry,
  pairs: &[(Term, Term)],
  binding: &mut Binding,
) -> bool {
  let mut scratch = binding.clone();
  for (subject, pattern) in pairs {
    if !match_inner(registry, subject, pattern, &mut scratch) {
      return false;
    }
  }
  *binding = scratch;
  true
}

fn match_inner(registry: &Registry, subject: &Term, pattern: &Term, binding: &mut Binding) -> bool {
  if subject.is_variable() {
    trace!(3, "match failed: variables cannot appear on the subject side");
    return false;
  }

  match pattern.kind() {
    TermKind::Variable { name, domain } => {
      if !registry.is_subtype(subject.sort(), *domain) {
        return false;
      }
      match binding.value(name) {
        None => {
          binding.bind(name.clone(), subject.clone());
          true
        }
        // Consistent binding: a second occurrence must match an equal subterm.
        Some(previous) => previous == subject,
      }
    }

    TermKind::Application {
      symbol: pattern_symbol,
      args: pattern_args,
      ..
    } => {
      match subject.kind() {
        TermKind::Application { symbol, args, .. } if symbol.index == pattern_symbol.index => {
          args
              .iter()
              .zip(pattern_args.iter())
              .all(|((_, argument), (_, sub_pattern))| {
                match_inner(registry, argument, sub_pattern, binding)
              })
        }
        _ => false,
      }
    }

    TermKind::Record {
      sort: pattern_sort,
      attributes: pattern_attributes,
    } => {
      match subject.kind() {
        TermKind::Record { sort, attributes } if registry.is_subtype(sort.index, pattern_sort.index) => {
          pattern_attributes.iter().all(|(name, sub_pattern)| {
            match attributes.iter().find(|(attribute, _)| attribute == name) {
              Some((_, value)) => match_inner(registry, value, sub_pattern, binding),
              None => false,
            }
          })
        }
        _ => false,
      }
    }
  }
}
