//! Alias match conditions.
//!
//! # Responsibilities
//! - Literal compare against one parameter (`key=value`, bare value = `reqPath`)
//! - Regular expression test against `reqPath`
//! - User predicates, immediate or deferred
//!
//! # Design Decisions
//! - Conditions are OR-ed, first success wins
//! - Evaluation is strictly sequential: a condition never starts before the
//!   previous one has settled, and nothing after the winner is evaluated
//! - Empty condition list = always matches (wildcard)
//! - Patterns are compiled once, when the rule is built

use regex::Regex;

use crate::routing::exchange::{BoxError, Callable, EvalError, Exchange};
use crate::routing::params::ParamBag;

/// A single alias match condition.
#[derive(Debug, Clone)]
pub enum MatchCondition {
    /// Parameter `key` must equal `value`.
    Literal { key: String, value: String },
    /// Expression must match `reqPath`.
    Pattern(Regex),
    /// User-supplied predicate.
    Predicate(Callable<bool>),
}

/// Result of evaluating a rule's condition list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// Matched at the given condition index; `None` for an empty list.
    Matched(Option<usize>),
    Unmatched,
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched(_))
    }
}

impl MatchCondition {
    /// Parse `key=value` (split on the first `=`). A bare value, or an empty
    /// key, compares against `reqPath`.
    pub fn literal(spec: &str) -> Self {
        let (key, value) = match spec.split_once('=') {
            Some((key, value)) if !key.is_empty() => (key, value),
            Some((_, value)) => ("reqPath", value),
            None => ("reqPath", spec),
        };
        MatchCondition::Literal {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    pub fn pattern(expr: &str) -> Result<Self, regex::Error> {
        Ok(MatchCondition::Pattern(Regex::new(expr)?))
    }

    pub fn predicate(predicate: Callable<bool>) -> Self {
        MatchCondition::Predicate(predicate)
    }

    /// Evaluate this condition against one request.
    pub async fn evaluate(
        &self,
        params: &ParamBag,
        exchange: &Exchange,
    ) -> Result<bool, BoxError> {
        match self {
            MatchCondition::Literal { key, value } => {
                Ok(params.get(key).is_some_and(|actual| actual == value.as_str()))
            }
            MatchCondition::Pattern(regex) => Ok(regex.is_match(params.req_path())),
            MatchCondition::Predicate(predicate) => predicate.call(params, exchange).await,
        }
    }
}

/// Return the index of the first satisfied condition.
pub async fn first_match(
    conditions: &[MatchCondition],
    params: &ParamBag,
    exchange: &Exchange,
) -> Result<MatchResult, EvalError> {
    if conditions.is_empty() {
        return Ok(MatchResult::Matched(None));
    }

    for (index, condition) in conditions.iter().enumerate() {
        let matched = condition
            .evaluate(params, exchange)
            .await
            .map_err(|source| EvalError { index, source })?;
        if matched {
            return Ok(MatchResult::Matched(Some(index)));
        }
    }

    Ok(MatchResult::Unmatched)
}
