/*!

The public API of the library.

*/

pub mod decl;
pub mod term;

pub use crate::core::{
  binding::Binding,
  error::{ArgumentError, RewritingError, SortError, StewError, TranslationError},
  evaluator::normalize,
  matcher::{matches, matches_all},
  registry::{Registry, RegistryStatus},
  rule::{condition::Guard, RewriteRule, RuleAttribute, RuleAttributes},
  sort::{AbstractSort, AttributeDescriptor, Sort, SortId, SortSpec},
  strategy::{Fixpoint, Identity, Normalize, Strategy, Union},
  symbol::{Symbol, SymbolId, SymbolKind},
};
