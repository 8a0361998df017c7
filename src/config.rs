//! Parse configuration
//!
//! Every parser owns its `ParseConfig`; there are no process-wide settings,
//! so a parse depends only on its input and the config it was built with.

// ============================================================================
// Limits
// ============================================================================

/// Nesting depth allowed when no explicit limit is configured
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Hard ceiling on the nesting depth. Enclosures are captured recursively,
/// so larger configured depths are clamped to this value.
pub const MAX_DEPTH_LIMIT: usize = 1024;

// ============================================================================
// Per-parse Configuration
// ============================================================================

/// Settings for a single section parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseConfig {
    /// Enclosures nested deeper than this fail with `RecursionLimitExceeded`
    pub max_depth: usize,
    pub collapse_whitespace: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            collapse_whitespace: true,
        }
    }
}

impl ParseConfig {
    /// Set the nesting limit, clamped to `MAX_DEPTH_LIMIT`
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.min(MAX_DEPTH_LIMIT);
        self
    }

    pub fn with_collapse_whitespace(mut self, collapse: bool) -> Self {
        self.collapse_whitespace = collapse;
        self
    }

    /// Depth limit actually enforced; `max_depth` is a public field and may
    /// have been set past the ceiling directly.
    pub fn effective_max_depth(&self) -> usize {
        self.max_depth.min(MAX_DEPTH_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let config = ParseConfig::default()
            .with_max_depth(4)
            .with_collapse_whitespace(false);
        assert_eq!(config.max_depth, 4);
        assert!(!config.collapse_whitespace);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(
            ParseConfig::default(),
            ParseConfig {
                max_depth: DEFAULT_MAX_DEPTH,
                collapse_whitespace: true,
            }
        );
    }

    #[test]
    fn test_max_depth_is_clamped() {
        let config = ParseConfig::default().with_max_depth(usize::MAX);
        assert_eq!(config.max_depth, MAX_DEPTH_LIMIT);

        let config = ParseConfig {
            max_depth: usize::MAX,
            collapse_whitespace: true,
        };
        assert_eq!(config.effective_max_depth(), MAX_DEPTH_LIMIT);
    }
}
