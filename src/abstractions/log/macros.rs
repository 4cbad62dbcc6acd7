//! Macros for generating log messages.

#[macro_export]
macro_rules! critical {
  ($threshold:expr, $($arg:tt)+) => {{
    $crate::log::init_logger();
    tracing::event!(
      tracing::Level::ERROR,
      critical = true,
      threshold = $threshold,
      message = format_args!($($arg)+)
    );
  }};
  ($($arg:tt)+) => {
    $crate::log::critical!(0, $($arg)+)
  };
}

#[macro_export]
macro_rules! error {
  ($threshold:expr, $($arg:tt)+) => {{
    $crate::log::init_logger();
    tracing::event!(
      tracing::Level::ERROR,
      threshold = $threshold,
      message = format_args!($($arg)+)
    );
  }};
  ($($arg:tt)+) => {
    $crate::log::error!(0, $($arg)+)
  };
}

#[macro_export]
macro_rules! warning {
  ($threshold:expr, $($arg:tt)+) => {{
    $crate::log::init_logger();
    tracing::event!(
      tracing::Level::WARN,
      threshold = $threshold,
      message = format_args!($($arg)+)
    );
  }};
  ($($arg:tt)+) => {
    $crate::log::warning!(0, $($arg)+)
  };
}

#[macro_export]
macro_rules! info {
  ($threshold:expr, $($arg:tt)+) => {{
    $crate::log::init_logger();
    tracing::event!(
      tracing::Level::INFO,
      threshold = $threshold,
      message = format_args!($($arg)+)
    );
  }};
  ($($arg:tt)+) => {
    $crate::log::info!(0, $($arg)+)
  };
}

#[macro_export]
macro_rules! debug {
  ($threshold:expr, $($arg:tt)+) => {{
    $crate::log::init_logger();
    tracing::event!(
      tracing::Level::DEBUG,
      threshold = $threshold,
      message = format_args!($($arg)+)
    );
  }};
  ($($arg:tt)+) => {
    $crate::log::debug!(0, $($arg)+)
  };
}

#[macro_export]
macro_rules! trace {
  ($threshold:expr, $($arg:tt)+) => {{
    $crate::log::init_logger();
    tracing::event!(
      tracing::Level::TRACE,
      threshold = $threshold,
      message = format_args!($($arg)+)
    );
  }};
  ($($arg:tt)+) => {
    $crate::log::trace!(0, $($arg)+)
  };
}

// The following makes the macros importable directly from the `log` module.
pub use {critical, debug, error, info, trace, warning};
