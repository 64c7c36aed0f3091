//! Inclusion filter for discovered links
//!
//! The filter is driven entirely by `FilterConfig`, so operators extend it
//! by adding exclusion rules rather than touching the pipeline.

use crate::config::{ExclusionRule, FilterConfig};

/// Where an accepted link points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkClass {
    /// Same-source page; eligible for fetching
    Internal,

    /// Absolute URL elsewhere; recorded as a graph leaf, never fetched
    External,
}

impl ExclusionRule {
    /// Returns true if `href` is excluded by this rule
    pub fn matches(&self, href: &str) -> bool {
        match self {
            Self::Contains(pattern) => href.contains(pattern.as_str()),
            Self::Prefix(pattern) => href.starts_with(pattern.as_str()),
            Self::Suffix(pattern) => href.ends_with(pattern.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LinkFilter {
    internal_prefix: String,
    record_external: bool,
    exclude: Vec<ExclusionRule>,
}

impl LinkFilter {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            internal_prefix: config.internal_prefix.clone(),
            record_external: config.record_external,
            exclude: config.exclude.clone(),
        }
    }

    /// Returns true if `href` uses the internal-reference form
    pub fn is_internal(&self, href: &str) -> bool {
        href.starts_with(&self.internal_prefix)
    }

    /// Decides whether a discovered href belongs in the graph
    ///
    /// Returns `None` for hrefs that must not be recorded: empty and
    /// fragment-only hrefs, anything matching an exclusion rule, external
    /// URLs when external recording is off, and every other non-internal
    /// form (relative paths, `mailto:` and so on).
    pub fn classify(&self, href: &str) -> Option<LinkClass> {
        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        if self.exclude.iter().any(|rule| rule.matches(href)) {
            return None;
        }

        if self.is_internal(href) {
            return Some(LinkClass::Internal);
        }

        let external = href.starts_with("https://") || href.starts_with("http://");
        (external && self.record_external).then_some(LinkClass::External)
    }
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self::new(&FilterConfig::default())
    }
}
