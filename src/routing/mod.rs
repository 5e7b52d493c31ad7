//! Alias routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (path, headers, query)
//!     → params.rs (build the parameter bag)
//!     → router.rs, for each alias rule in order:
//!         → matcher.rs (first satisfied condition)
//!         → serve.rs (first existing / forced candidate, via template.rs)
//!     → containment.rs (root check, unless the rule allows outside)
//!     → Return: Alias path, Fallthrough path, or Rejected
//!
//! Rule compilation (at startup):
//!     AliasConfig[]
//!     → Normalize match/serve to lists
//!     → Compile regular expressions
//!     → Freeze as immutable AliasRouter
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - Order is the only precedence: first rule that serves wins
//! - Predicates and producers may be deferred; evaluation stays sequential
//! - The root can only be left through a rule with `allow_outside`

pub mod containment;
pub mod exchange;
pub mod matcher;
pub mod params;
pub mod path;
pub mod router;
pub mod rule;
pub mod serve;
pub mod template;

pub use containment::ContainmentGuard;
pub use exchange::{BoxError, Callable, Exchange, ResponseHeaders};
pub use matcher::{MatchCondition, MatchResult};
pub use params::{ParamBag, RequestInfo};
pub use router::{AliasHit, AliasRouter, ResolveError, Resolution};
pub use rule::{AliasRule, AliasRuleBuilder, RuleError};
pub use serve::{FsProbe, PathProbe, ServeCandidate};
