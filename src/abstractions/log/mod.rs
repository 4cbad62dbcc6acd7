/*!

The `log` module provides logging with customizable levels and a global numeric
verbosity threshold. The level describes what _kind_ of message is logged (critical,
error, warning, info, debug, trace); the threshold describes its _verbosity_.

Individual log entries are logged "at" a given threshold and are only emitted if their
threshold is at most the global threshold. A message with threshold 0 is always emitted.
If the threshold argument is omitted in a macro, it defaults to 0.

```
use stew::log::*;

set_global_logging_threshold(1);

critical!(3, "A critical error occurred!"); // Not emitted
warning!(2, "Check your input.");           // Not emitted
info!(1, "Loading specification.");         // Emitted
debug!("Sort registered.");                 // Emitted (threshold 0)
```

The logger is initialized implicitly by the first logging macro invocation; no explicit
setup is required. The global threshold is managed with atomic operations and can be
changed at any time with `set_global_logging_threshold`.

*/
mod formatter;
mod macros;
mod threshold_filter;

use std::sync::atomic::{AtomicU8, Ordering};

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, layer::SubscriberExt, Registry};

use formatter::ThresholdFieldFormatter;
pub use macros::*;
use threshold_filter::ThresholdFilterLayer;

/// Used for implicit initialization.
static INIT_LOGGER: Lazy<()> = Lazy::new(|| {
  let subscriber = Registry::default().with(ThresholdFilterLayer).with(
    fmt::layer()
        .fmt_fields(ThresholdFieldFormatter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stdout),
  );

  // Tests may install their own subscriber first; losing that race is harmless.
  let _ = tracing::subscriber::set_global_default(subscriber);
});

/// This does not need to be called directly. Initializes the logging system.
pub fn init_logger() {
  Lazy::force(&INIT_LOGGER);
}

static GLOBAL_LOGGING_THRESHOLD: AtomicU8 = AtomicU8::new(3); // Default threshold

/// Sets the global verbosity threshold.
pub fn set_global_logging_threshold(new_threshold: u8) {
  GLOBAL_LOGGING_THRESHOLD.store(new_threshold, Ordering::SeqCst);
}

/// Retrieves the global verbosity threshold.
pub fn get_global_logging_threshold() -> u8 {
  GLOBAL_LOGGING_THRESHOLD.load(Ordering::SeqCst)
}
