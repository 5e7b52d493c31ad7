//! `<% name %>` template interpolation.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::routing::params::ParamBag;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<%\s*(.+?)\s*%>").expect("placeholder pattern is a valid regex")
});

/// Replace every `<% name %>` token with the bag's value for `name`.
/// Unknown names render as an empty string.
pub fn interpolate(template: &str, params: &ParamBag) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            params.get(&caps[1]).map(|v| v.into_owned()).unwrap_or_default()
        })
        .into_owned()
}
