/*!

The plain-text backend. Renders the registered rule set, one rule per line, in the
form

```text
(lhs == rhs) and (lhs != rhs) => Sort.op(p1, …, pn) = rhs
```

with one block per registered operation, blocks separated by a blank line.

*/

use crate::{
  abstractions::join_string,
  core::{error::StewError, registry::Registry},
  translate::{linearize::linearize, Translator},
};

pub struct TextTranslator;

impl TextTranslator {
  /// Emits the rules of every registered operation, one block per operation.
  pub fn translate(registry: &Registry, translator: &Translator) -> Result<String, StewError> {
    let blocks = translator.flat_rules(registry)?;
    let rendered = blocks
        .iter()
        .map(|block| join_string(block.iter(), "\n"))
        .collect::<Vec<_>>()
        .join("\n\n");
    Ok(rendered)
  }

  /// Emits the linearized rule set: no emitted right-hand side repeats a variable,
  /// with the generated `copy`/`pair`/`combine` support rules appended.
  pub fn translate_linearized(registry: &Registry, translator: &Translator) -> Result<String, StewError> {
    let rules: Vec<_> = translator.flat_rules(registry)?.into_iter().flatten().collect();
    let linear = linearize(registry, rules)?;
    Ok(join_string(linear.iter(), "\n"))
  }
}
