//! Legacy sequential retrieval strategies
//!
//! When the hybrid path fuses to nothing, the engine walks this ordered
//! list with a uniform contract: a strategy that errors or returns empty
//! hands over to the next one. The attempted names end up in the
//! retrieval trace, so a degraded search leaves a finite, inspectable
//! record of what was tried.

/// One legacy strategy, tried in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyStrategy {
    /// Semantic search first; merges a trigram fallback (deduplicated by
    /// dish id) when it finds fewer than the configured minimum hits.
    /// An embedding failure counts as a strategy failure.
    SemanticFirst,
    /// Trigram search alone; the terminal fallback.
    TrigramOnly,
}

impl LegacyStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            LegacyStrategy::SemanticFirst => "legacy_semantic",
            LegacyStrategy::TrigramOnly => "legacy_trigram",
        }
    }
}

/// The fixed strategy order
pub const LEGACY_STRATEGIES: &[LegacyStrategy] =
    &[LegacyStrategy::SemanticFirst, LegacyStrategy::TrigramOnly];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_is_semantic_then_trigram() {
        assert_eq!(
            LEGACY_STRATEGIES
                .iter()
                .map(|s| s.name())
                .collect::<Vec<_>>(),
            vec!["legacy_semantic", "legacy_trigram"]
        );
    }
}
