//! Alias resolution.
//!
//! # Responsibilities
//! - Build the parameter bag for a request
//! - Walk alias rules in order: match, then serve
//! - Run the containment guard on whatever path comes out
//!
//! # Design Decisions
//! - Immutable after construction (shared across requests without locks)
//! - First rule that both matches and yields an accepted candidate wins
//! - A rule that matches but yields nothing hands over to the next rule
//! - No rule applies => literal request path, still root-checked
//! - Failed deferred predicates/producers are errors, never "no match"

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::loader::ConfigError;
use crate::config::schema::ServerConfig;
use crate::routing::containment::ContainmentGuard;
use crate::routing::exchange::{BoxError, Exchange};
use crate::routing::matcher::{first_match, MatchResult};
use crate::routing::params::{ParamBag, RequestInfo};
use crate::routing::rule::AliasRule;
use crate::routing::serve::{first_serve, FsProbe, PathProbe};

/// Which rule, condition and candidate served a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasHit {
    pub rule: usize,
    /// `None` when the rule has no conditions.
    pub condition: Option<usize>,
    pub candidate: usize,
}

/// Outcome of resolving one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// An alias rule produced this path.
    Alias { path: PathBuf, hit: AliasHit },
    /// No rule applied; this is the literal request path.
    Fallthrough { path: PathBuf },
    /// The chosen path lies outside the root.
    Rejected { path: PathBuf },
}

impl Resolution {
    /// The path to serve, unless rejected.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Resolution::Alias { path, .. } | Resolution::Fallthrough { path } => Some(path),
            Resolution::Rejected { .. } => None,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Resolution::Alias { .. } => "alias",
            Resolution::Fallthrough { .. } => "fallthrough",
            Resolution::Rejected { .. } => "rejected",
        }
    }
}

/// Internal failure while resolving a request.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("alias[{rule}] match[{condition}]: predicate failed: {source}")]
    Predicate {
        rule: usize,
        condition: usize,
        #[source]
        source: BoxError,
    },

    #[error("alias[{rule}] serve[{candidate}]: producer failed: {source}")]
    Producer {
        rule: usize,
        candidate: usize,
        #[source]
        source: BoxError,
    },
}

/// Resolves request paths through the configured alias rules.
#[derive(Debug, Clone)]
pub struct AliasRouter {
    guard: ContainmentGuard,
    rules: Vec<AliasRule>,
    probe: Arc<dyn PathProbe>,
}

impl AliasRouter {
    /// Create a router over an absolute `root`, checking existence on the
    /// real filesystem.
    pub fn new(root: impl Into<PathBuf>, rules: Vec<AliasRule>) -> Self {
        Self {
            guard: ContainmentGuard::new(root),
            rules,
            probe: Arc::new(FsProbe),
        }
    }

    /// Compile the alias rules of a validated configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let rules = config
            .aliases
            .iter()
            .enumerate()
            .map(|(alias, rule)| {
                AliasRule::from_config(rule).map_err(|source| ConfigError::Compile { alias, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(root = %config.root.display(), aliases = rules.len(), "Alias rules compiled");
        Ok(Self::new(config.root.clone(), rules))
    }

    /// Replace the existence check.
    pub fn with_probe(mut self, probe: impl PathProbe + 'static) -> Self {
        self.probe = Arc::new(probe);
        self
    }

    /// Append a rule after the existing ones.
    pub fn push_rule(&mut self, rule: AliasRule) {
        self.rules.push(rule);
    }

    pub fn root(&self) -> &Path {
        self.guard.root()
    }

    pub fn rules(&self) -> &[AliasRule] {
        &self.rules
    }

    /// Resolve one request to the path that should be served.
    pub async fn resolve(
        &self,
        request: &RequestInfo,
        exchange: &Exchange,
    ) -> Result<Resolution, ResolveError> {
        let params = ParamBag::build(self.root(), request);

        tracing::info!(
            req_path = %params.req_path(),
            abs_path = %params.abs_path().display(),
            "Requested"
        );

        if self.rules.is_empty() {
            return Ok(self.fallthrough(&params));
        }

        for (rule_index, rule) in self.rules.iter().enumerate() {
            let condition = match first_match(rule.conditions(), &params, exchange)
                .await
                .map_err(|e| ResolveError::Predicate {
                    rule: rule_index,
                    condition: e.index,
                    source: e.source,
                })? {
                MatchResult::Matched(condition) => condition,
                MatchResult::Unmatched => continue,
            };

            let served = first_serve(
                rule.candidates(),
                rule.force(),
                rule.allow_outside(),
                self.root(),
                &params,
                exchange,
                self.probe.as_ref(),
            )
            .await
            .map_err(|e| ResolveError::Producer {
                rule: rule_index,
                candidate: e.index,
                source: e.source,
            })?;

            let Some(served) = served else {
                tracing::debug!(alias = rule_index, "Alias matched but no serve candidate exists");
                continue;
            };

            let hit = AliasHit {
                rule: rule_index,
                condition,
                candidate: served.index,
            };

            tracing::info!(
                req_path = %params.req_path(),
                path = %served.path.display(),
                alias = hit.rule,
                condition = ?hit.condition,
                serve = hit.candidate,
                "For serve"
            );

            return Ok(match self.guard.check(served.path, rule.allow_outside()) {
                Ok(path) => Resolution::Alias { path, hit },
                Err(path) => self.rejected(&params, path),
            });
        }

        Ok(self.fallthrough(&params))
    }

    fn fallthrough(&self, params: &ParamBag) -> Resolution {
        match self.guard.check(params.abs_path().to_path_buf(), false) {
            Ok(path) => Resolution::Fallthrough { path },
            Err(path) => self.rejected(params, path),
        }
    }

    fn rejected(&self, params: &ParamBag, path: PathBuf) -> Resolution {
        tracing::warn!(
            req_path = %params.req_path(),
            path = %path.display(),
            root = %self.root().display(),
            "Resolved path escapes root"
        );
        Resolution::Rejected { path }
    }
}
