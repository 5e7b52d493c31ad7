//! Compiled alias rules.

use std::future::Future;

use crate::config::schema::{AliasConfig, MatchSpec};
use crate::routing::exchange::{BoxError, Callable, Exchange};
use crate::routing::matcher::MatchCondition;
use crate::routing::params::ParamBag;
use crate::routing::serve::ServeCandidate;

/// Error compiling an alias rule from configuration.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("match[{condition}]: invalid regular expression: {source}")]
    InvalidPattern {
        condition: usize,
        #[source]
        source: regex::Error,
    },
}

/// One alias rule: conditions, serve candidates and flags.
///
/// Immutable once built; shared read-only by every in-flight resolution.
#[derive(Debug, Clone)]
pub struct AliasRule {
    conditions: Vec<MatchCondition>,
    candidates: Vec<ServeCandidate>,
    force: bool,
    allow_outside: bool,
}

impl AliasRule {
    pub fn builder() -> AliasRuleBuilder {
        AliasRuleBuilder::default()
    }

    /// Compile a rule from its configuration form.
    pub fn from_config(config: &AliasConfig) -> Result<Self, RuleError> {
        let mut builder = Self::builder()
            .force(config.force)
            .allow_outside(config.allow_outside);

        for (condition, spec) in config.conditions.iter().enumerate() {
            builder = match spec {
                MatchSpec::Literal(literal) => builder.when_literal(literal),
                MatchSpec::Pattern { regex } => {
                    let compiled = MatchCondition::pattern(regex)
                        .map_err(|source| RuleError::InvalidPattern { condition, source })?;
                    builder.when(compiled)
                }
            };
        }

        for template in &config.serve {
            builder = builder.serve_template(template);
        }

        Ok(builder.build())
    }

    pub fn conditions(&self) -> &[MatchCondition] {
        &self.conditions
    }

    /// Serve candidates; never empty.
    pub fn candidates(&self) -> &[ServeCandidate] {
        &self.candidates
    }

    pub fn force(&self) -> bool {
        self.force
    }

    pub fn allow_outside(&self) -> bool {
        self.allow_outside
    }
}

/// Builder for [`AliasRule`], the only way to attach predicates and producers.
#[derive(Debug, Default)]
pub struct AliasRuleBuilder {
    conditions: Vec<MatchCondition>,
    candidates: Vec<ServeCandidate>,
    force: bool,
    allow_outside: bool,
}

impl AliasRuleBuilder {
    pub fn when(mut self, condition: MatchCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// `key=value`, or a bare value compared with `reqPath`.
    pub fn when_literal(self, spec: &str) -> Self {
        self.when(MatchCondition::literal(spec))
    }

    pub fn when_pattern(self, regex: regex::Regex) -> Self {
        self.when(MatchCondition::Pattern(regex))
    }

    pub fn when_fn<F>(self, predicate: F) -> Self
    where
        F: Fn(&ParamBag, &Exchange) -> bool + Send + Sync + 'static,
    {
        self.when(MatchCondition::predicate(Callable::immediate(predicate)))
    }

    pub fn when_async<F, Fut>(self, predicate: F) -> Self
    where
        F: Fn(&ParamBag, &Exchange) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, BoxError>> + Send + 'static,
    {
        self.when(MatchCondition::predicate(Callable::deferred(predicate)))
    }

    pub fn serve(mut self, candidate: ServeCandidate) -> Self {
        self.candidates.push(candidate);
        self
    }

    pub fn serve_template(self, template: impl Into<String>) -> Self {
        self.serve(ServeCandidate::template(template))
    }

    pub fn serve_fn<F>(self, producer: F) -> Self
    where
        F: Fn(&ParamBag, &Exchange) -> String + Send + Sync + 'static,
    {
        self.serve(ServeCandidate::producer(Callable::immediate(producer)))
    }

    pub fn serve_async<F, Fut>(self, producer: F) -> Self
    where
        F: Fn(&ParamBag, &Exchange) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, BoxError>> + Send + 'static,
    {
        self.serve(ServeCandidate::producer(Callable::deferred(producer)))
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn allow_outside(mut self, allow_outside: bool) -> Self {
        self.allow_outside = allow_outside;
        self
    }

    /// Finish the rule. Without any serve candidate the rule serves the
    /// request's own path.
    pub fn build(self) -> AliasRule {
        let candidates = if self.candidates.is_empty() {
            vec![ServeCandidate::Implicit]
        } else {
            self.candidates
        };
        AliasRule {
            conditions: self.conditions,
            candidates,
            force: self.force,
            allow_outside: self.allow_outside,
        }
    }
}
