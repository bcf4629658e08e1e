use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatcherError {
    #[error("Invalid route matcher '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Selects which request paths the route gate checks.
///
/// The `regex` crate has no lookaround, so an exclusion matcher of the form
/// `/((?!a|b|c).*)` is split into its alternatives: a path is selected when it
/// starts with `/` and no alternative matches right after that slash.
/// Any other pattern is compiled as an anchored regex of selected paths.
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    kind: MatchKind,
}

#[derive(Debug, Clone)]
enum MatchKind {
    Excluding(Regex),
    Including(Regex),
}

impl RouteMatcher {
    const EXCLUSION_PREFIX: &'static str = "/((?!";
    const EXCLUSION_SUFFIX: &'static str = ").*)";

    pub fn parse(pattern: &str) -> Result<Self, MatcherError> {
        let compile = |source: &str| {
            Regex::new(source).map_err(|e| MatcherError::InvalidPattern {
                pattern: pattern.to_string(),
                source: e,
            })
        };

        let kind = match pattern
            .strip_prefix(Self::EXCLUSION_PREFIX)
            .and_then(|rest| rest.strip_suffix(Self::EXCLUSION_SUFFIX))
        {
            Some(alternatives) => MatchKind::Excluding(compile(&format!("^/(?:{})", alternatives))?),
            None => MatchKind::Including(compile(&format!("^(?:{})$", pattern))?),
        };

        Ok(Self { kind })
    }

    /// True when the gate must run for this path
    pub fn matches(&self, path: &str) -> bool {
        match &self.kind {
            MatchKind::Excluding(excluded) => path.starts_with('/') && !excluded.is_match(path),
            MatchKind::Including(included) => included.is_match(path),
        }
    }
}
