/*!

The error taxonomy of the crate.

*Usage errors* (`ArgumentError`, `SortError`, duplicate registrations) are raised
immediately at the point of declaration or construction and abort specification loading.
*Evaluation errors* (`RewritingError`) propagate out of the top-level call. The internal
`MatchError` is raised when an unbound variable is looked up in a binding; the rule
evaluator catches it and converts it to "this rule did not apply".

Every error type hand-implements `Display` and `std::error::Error`; the top-level
`StewError` aggregates the others with `From` conversions so fallible operations can
propagate with `?`.

*/

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::abstractions::IString;

/// Raised when a record, generator, or operation is applied with inappropriate
/// arguments, or when an operation body is malformed.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ArgumentError {
  /// A declared parameter or attribute was not supplied and has no default.
  Missing {
    symbol   : IString,
    parameter: IString,
  },
  /// An argument name that does not appear in the domain.
  Unexpected {
    symbol   : IString,
    parameter: IString,
  },
  /// More than one positional argument. Positional application is only valid for a
  /// domain with a single parameter.
  Positional {
    symbol: IString,
    given : usize,
  },
  /// An argument whose sort is not assignable to the declared domain.
  WrongSort {
    symbol   : IString,
    parameter: IString,
    expected : IString,
    actual   : IString,
  },
  /// A generator or operation whose domain still mentions an abstract sort parameter
  /// cannot be applied; specialize the sort first.
  UnboundAbstractParameter {
    symbol   : IString,
    parameter: IString,
  },
  /// A guard term whose sort declares no nullary `true` generator. Rejects
  /// expression-as-boolean bugs at load time instead of guessing intent.
  NotBoolean {
    operation: IString,
    guard    : String,
  },
  /// An operation symbol inside a match pattern. Patterns are built from generators
  /// and variables only.
  OperationInPattern {
    operation: IString,
    symbol   : IString,
  },
  /// A strategy combinator applied to fewer operands than it requires.
  TooFewOperands {
    strategy: &'static str,
    given   : usize,
  },
}

impl Display for ArgumentError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      ArgumentError::Missing { symbol, parameter } => {
        write!(f, "{} missing argument `{}`", symbol, parameter)
      }

      ArgumentError::Unexpected { symbol, parameter } => {
        write!(f, "{} got an unexpected argument `{}`", symbol, parameter)
      }

      ArgumentError::Positional { symbol, given } => {
        write!(
          f,
          "{} cannot take {} positional arguments; name arguments beyond the first",
          symbol, given
        )
      }

      ArgumentError::WrongSort {
        symbol,
        parameter,
        expected,
        actual,
      } => {
        write!(
          f,
          "{} argument `{}` has sort {} but {} was expected",
          symbol, parameter, actual, expected
        )
      }

      ArgumentError::UnboundAbstractParameter { symbol, parameter } => {
        write!(
          f,
          "{} cannot be applied while abstract sort parameter `{}` is unsubstituted",
          symbol, parameter
        )
      }

      ArgumentError::NotBoolean { operation, guard } => {
        write!(
          f,
          "guard `{}` of {} is not boolean-valued; its sort declares no `true` constant",
          guard, operation
        )
      }

      ArgumentError::OperationInPattern { operation, symbol } => {
        write!(
          f,
          "pattern of {} applies operation {}; patterns are built from generators and variables only",
          operation, symbol
        )
      }

      ArgumentError::TooFewOperands { strategy, given } => {
        write!(f, "{} requires at least 2 operands but was given {}", strategy, given)
      }
    }
  }
}

impl Error for ArgumentError {}

/// Raised when a sort reference cannot be resolved, or when a specialization request
/// is malformed.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SortError {
  /// A name that resolves to no abstract parameter, no registered sort, and not the
  /// sort under declaration.
  UnresolvedReference {
    name   : IString,
    context: IString,
  },
  /// A short symbol name that resolves to more than one registered symbol.
  AmbiguousReference {
    name   : IString,
    context: IString,
  },
  /// A specialization binding that names no abstract parameter of the base sort.
  UnknownAbstractParameter {
    sort     : IString,
    parameter: IString,
  },
  /// An abstract parameter that was neither bound nor declared with a default.
  MissingSpecialization {
    sort     : IString,
    parameter: IString,
  },
  /// A concrete sort that does not satisfy the parameter's `implements` constraint.
  UnsatisfiedConstraint {
    sort      : IString,
    parameter : IString,
    concrete  : IString,
    implements: IString,
  },
  /// Specialization of a sort that declares no abstract parameters.
  NotAbstract {
    sort: IString,
  },
}

impl Display for SortError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      SortError::UnresolvedReference { name, context } => {
        write!(f, "unresolved sort or symbol reference `{}` in {}", name, context)
      }

      SortError::AmbiguousReference { name, context } => {
        write!(f, "ambiguous symbol reference `{}` in {}; qualify it with its sort", name, context)
      }

      SortError::UnknownAbstractParameter { sort, parameter } => {
        write!(f, "{} declares no abstract sort parameter `{}`", sort, parameter)
      }

      SortError::MissingSpecialization { sort, parameter } => {
        write!(
          f,
          "abstract sort parameter `{}` of {} has no binding and no default",
          parameter, sort
        )
      }

      SortError::UnsatisfiedConstraint {
        sort,
        parameter,
        concrete,
        implements,
      } => {
        write!(
          f,
          "{} does not implement {} as required by abstract sort parameter `{}` of {}",
          concrete, implements, parameter, sort
        )
      }

      SortError::NotAbstract { sort } => {
        write!(f, "{} declares no abstract sort parameters and cannot be specialized", sort)
      }
    }
  }
}

impl Error for SortError {}

/// Raised when no rewrite rule of an operation applies to the (normalized) arguments.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RewritingError {
  pub operation: IString,
}

impl Display for RewritingError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "no rule of {} applies", self.operation)
  }
}

impl Error for RewritingError {}

/// Raised when the translator cannot map a construct onto the external rule format.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TranslationError {
  /// A rule references a symbol that was never registered with the translator.
  UnregisteredSymbol {
    name: IString,
  },
  /// A sort whose signature still mentions abstract parameters has no external
  /// representation; specialize it first.
  AbstractSort {
    sort: IString,
  },
}

impl Display for TranslationError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      TranslationError::UnregisteredSymbol { name } => {
        write!(f, "cannot translate unregistered symbol {}", name)
      }

      TranslationError::AbstractSort { sort } => {
        write!(f, "cannot translate {} while its abstract sort parameters are unsubstituted", sort)
      }
    }
  }
}

impl Error for TranslationError {}

/// Internal error raised when a variable lookup in a binding finds the variable
/// unbound. The rule evaluator converts it to "this rule did not apply".
#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) struct MatchError {
  pub variable: IString,
}

impl Display for MatchError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "variable `{}` is not bound", self.variable)
  }
}

impl Error for MatchError {}

/// The top-level error type of the crate.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum StewError {
  /// Duplicate registration of a sort or of a qualified symbol name.
  Duplicate {
    kind: &'static str,
    name: IString,
  },
  /// A declaration against a registry that has been sealed.
  Sealed {
    registry: IString,
  },
  Argument(ArgumentError),
  Sort(SortError),
  Rewriting(RewritingError),
  Translation(TranslationError),
}

impl Display for StewError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      StewError::Duplicate { kind, name } => write!(f, "duplicate {}: `{}`", kind, name),
      StewError::Sealed { registry } => {
        write!(f, "registry `{}` is sealed; no further declarations are accepted", registry)
      }
      StewError::Argument(inner) => Display::fmt(inner, f),
      StewError::Sort(inner) => Display::fmt(inner, f),
      StewError::Rewriting(inner) => Display::fmt(inner, f),
      StewError::Translation(inner) => Display::fmt(inner, f),
    }
  }
}

impl Error for StewError {}

impl From<ArgumentError> for StewError {
  fn from(error: ArgumentError) -> Self {
    StewError::Argument(error)
  }
}

impl From<SortError> for StewError {
  fn from(error: SortError) -> Self {
    StewError::Sort(error)
  }
}

impl From<RewritingError> for StewError {
  fn from(error: RewritingError) -> Self {
    StewError::Rewriting(error)
  }
}

impl From<TranslationError> for StewError {
  fn from(error: TranslationError) -> Self {
    StewError::Translation(error)
  }
}
