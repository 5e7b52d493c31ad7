//! Alias serve candidates.
//!
//! # Responsibilities
//! - Turn each candidate (template, producer, implicit) into an absolute path
//! - Accept the first candidate that exists, or any candidate under `force`
//!
//! # Design Decisions
//! - Templates are filesystem paths, never URLs: no decoding, no query
//! - Existence is checked through [`PathProbe`] so tests and embedders can
//!   substitute their own view of the filesystem
//! - Files and directories both count as existing

use std::fmt;
use std::path::{Path, PathBuf};

use futures_util::future::{BoxFuture, FutureExt};

use crate::routing::exchange::{BoxError, Callable, EvalError, Exchange};
use crate::routing::params::ParamBag;
use crate::routing::path;
use crate::routing::template;

/// A single alias serve candidate.
#[derive(Debug, Clone)]
pub enum ServeCandidate {
    /// `<% name %>` template, resolved against the root.
    Template(String),
    /// User-supplied producer, resolved against the root.
    Producer(Callable<String>),
    /// The request's own `absPath`.
    Implicit,
}

impl ServeCandidate {
    pub fn template(template: impl Into<String>) -> Self {
        ServeCandidate::Template(template.into())
    }

    pub fn producer(producer: Callable<String>) -> Self {
        ServeCandidate::Producer(producer)
    }

    /// Compute the absolute path this candidate points at. With
    /// `allow_outside`, absolute results are used as written.
    pub async fn target(
        &self,
        root: &Path,
        allow_outside: bool,
        params: &ParamBag,
        exchange: &Exchange,
    ) -> Result<PathBuf, BoxError> {
        match self {
            ServeCandidate::Template(template) => Ok(path::resolve_target(
                root,
                &template::interpolate(template, params),
                allow_outside,
            )),
            ServeCandidate::Producer(producer) => {
                let target = producer.call(params, exchange).await?;
                Ok(path::resolve_target(root, &target, allow_outside))
            }
            ServeCandidate::Implicit => Ok(params.abs_path().to_path_buf()),
        }
    }
}

/// Existence check used by the serve resolver.
pub trait PathProbe: Send + Sync + fmt::Debug {
    /// Whether `path` exists (file or directory).
    fn exists<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, bool>;
}

/// Probe backed by the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsProbe;

impl PathProbe for FsProbe {
    fn exists<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, bool> {
        async move { tokio::fs::try_exists(path).await.unwrap_or(false) }.boxed()
    }
}

/// An accepted serve candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeHit {
    pub path: PathBuf,
    pub index: usize,
}

/// Try `candidates` in order and return the first accepted one.
pub async fn first_serve(
    candidates: &[ServeCandidate],
    force: bool,
    allow_outside: bool,
    root: &Path,
    params: &ParamBag,
    exchange: &Exchange,
    probe: &dyn PathProbe,
) -> Result<Option<ServeHit>, EvalError> {
    for (index, candidate) in candidates.iter().enumerate() {
        let path = candidate
            .target(root, allow_outside, params, exchange)
            .await
            .map_err(|source| EvalError { index, source })?;

        if force || probe.exists(&path).await {
            return Ok(Some(ServeHit { path, index }));
        }
        tracing::debug!(candidate = index, path = %path.display(), "Serve candidate not found");
    }
    Ok(None)
}
