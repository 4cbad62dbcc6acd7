/*!

A sort (represented in code by the [`Sort`](crate::core::sort::Sort) struct) is a named
type of terms. Sorts are related to each other by *specialization*: a sort may declare
abstract sort parameters, and substituting those parameters with concrete sorts derives
a fresh sort that is a subtype of its base. Two specializations of the same base with
distinct substitutions are incomparable.

## Lifecycle and Ownership

`Sort`s are owned by the [`Registry`](crate::core::registry::Registry) in which they are
declared. Once declared they are immutable for the lifetime of the registry, with one
monotone exception: specializing a sort appends the derived sort's index to the
`leq_sorts` set of its ancestors. All of this happens during specification loading;
after loading the registry is read-only.

## Computing the Subtype Relation

Each sort is identified by its [`SortId`], its index in the registry's
declaration-ordered sort vector. Each sort stores a `leq_sorts` set (a `NatSet`) holding
the indices of the sorts that are less than or equal to it, that is, itself and every
specialization derived from it. The subtype check `a <= b` is then a single membership
test `b.leq_sorts.contains(a.index)`, with no graph traversal at matching time.

*/

mod abstract_sort;
mod collection;
#[allow(clippy::module_inception)]
mod sort;

pub use abstract_sort::AbstractSort;
pub(crate) use collection::SortCollection;
pub use sort::{AttributeDescriptor, Sort, SortId, SortSpec};
