/*!

Types/type aliases that abstract over the implementing backing type.

A motivating example is the `IString` type, an interned string type used for every sort,
symbol, parameter, and variable name in the crate. A number of external crates could
provide this functionality. This module redirects to whatever chosen implementation we
want. To use the [`string_cache` crate](https://crates.io/crates/string_cache), we just
define `IString` as an alias for `string_cache::DefaultAtom`. If we later switch to the
[`ustr` crate](https://crates.io/crates/ustr), only this module changes.

For infrastructure with a wider API surface, we define an abstraction layer over the
implementation. The `log` module is the main example: its (crate) public interface is
`set_global_logging_threshold()`/`get_global_logging_threshold()` and the macros
`critical!`, `error!`, `warning!`, `info!`, `debug!`, and `trace!`, while the backing
implementation (currently the `tracing` crate) is encapsulated inside the module.

*/

mod string_join;

// Logging
pub mod log;

// Interned string. Use `DefaultAtom` for a global cache that can be used across threads.
pub use string_cache::DefaultAtom as IString;

// A set of (small) natural numbers. Backs the specialization (subtype) relation on
// registry sort indices.
pub(crate) use bit_set::BitSet as NatSet;

pub(crate) use string_join::join_string;

pub(crate) use std::collections::{HashMap, HashSet};
