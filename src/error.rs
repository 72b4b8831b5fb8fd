use thiserror::Error;

use crate::parse::ParseError;
use crate::{ExchangeError, RuleError};

/// Unified error type for plan files, settings and the editing operations.
///
/// Returned at the load and save boundary, e.g. by
/// [`Plan::load()`](crate::Plan::load) and
/// [`Settings::load()`](crate::Settings::load).
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error("plan document must be a mapping")]
    NotAMapping,

    #[error("unknown plan type '{0}'")]
    UnknownPlanType(String),
}
