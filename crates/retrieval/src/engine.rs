//! Hybrid search engine
//!
//! One entry point dispatching on the planned search shape: tag-only when
//! no dish text exists, otherwise parallel semantic + lexical retrieval
//! with score fusion. Every external failure degrades to a smaller result
//! and a trace entry; nothing here errors out of a turn.

use std::sync::Arc;

use dishcovery_core::{
    DishStore, EmbeddingProvider, HybridCandidate, Language, SearchParams, SemanticRow,
    Translator, TrigramRow,
};
use dishcovery_text::leftover_tokens;

use crate::cache::TranslationCache;
use crate::fusion::{self, fuse};
use crate::strategy::{LegacyStrategy, LEGACY_STRATEGIES};
use crate::token_filter::apply_token_filter;
use crate::weighting::classify_query;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Feature flag for the fused hybrid path; legacy strategies still run
    /// when it yields nothing
    pub hybrid_enabled: bool,
    /// Per-branch row limit
    pub fetch_limit: usize,
    /// Legacy path: semantic hit count below which trigram results are
    /// merged in
    pub min_semantic_hits: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hybrid_enabled: true,
            fetch_limit: 40,
            min_semantic_hits: 3,
        }
    }
}

/// Result of one retrieval dispatch
#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    pub candidates: Vec<HybridCandidate>,
    /// Paths attempted, in order ("tag_only", "hybrid", "legacy_semantic", ...)
    pub trace: Vec<&'static str>,
}

/// Hybrid retrieval engine combining semantic and trigram search
pub struct HybridSearchEngine {
    store: Arc<dyn DishStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    translator: Option<Arc<dyn Translator>>,
    translation_cache: Arc<TranslationCache>,
    config: EngineConfig,
}

impl HybridSearchEngine {
    pub fn new(
        store: Arc<dyn DishStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            translator: None,
            translation_cache: Arc::new(TranslationCache::default()),
            config,
        }
    }

    /// Attach a best-effort translator with its injected cache
    pub fn with_translator(
        mut self,
        translator: Arc<dyn Translator>,
        cache: Arc<TranslationCache>,
    ) -> Self {
        self.translator = Some(translator);
        self.translation_cache = cache;
        self
    }

    /// Dispatch a planned search
    pub async fn run(&self, params: &SearchParams, language: Language) -> RetrievalOutcome {
        let filters = dishcovery_core::SearchFilters {
            tag_slugs: params.tags.clone(),
            city: params.city.clone(),
            budget_max_sek: params.budget_max_sek,
        };

        match params.query_text.as_deref() {
            None => self.tag_only(&filters).await,
            Some(query) if query.trim().is_empty() => self.tag_only(&filters).await,
            Some(query) => self.text_search(query, &filters, language).await,
        }
    }

    /// Tag-only dispatch: no text, the tag filter does all the work
    async fn tag_only(&self, filters: &dishcovery_core::SearchFilters) -> RetrievalOutcome {
        let mut trace = vec!["tag_only"];
        if filters.tag_slugs.is_empty() {
            tracing::debug!(reason = "tag_only_without_tags", "nothing to dispatch");
            return RetrievalOutcome {
                candidates: Vec::new(),
                trace,
            };
        }
        let candidates = match self
            .store
            .tag_search(&filters.tag_slugs, filters, self.config.fetch_limit)
            .await
        {
            Ok(rows) => rows.into_iter().map(fusion::candidate_from_tag).collect(),
            Err(err) => {
                tracing::warn!(reason = "tag_search_failed", error = %err, "degrading to empty result");
                trace.push("tag_only_failed");
                Vec::new()
            }
        };
        RetrievalOutcome { candidates, trace }
    }

    /// Text dispatch: parallel semantic + lexical branches, fused
    async fn text_search(
        &self,
        query: &str,
        filters: &dishcovery_core::SearchFilters,
        language: Language,
    ) -> RetrievalOutcome {
        let mut trace = Vec::new();
        let leftover = leftover_tokens(query);

        let mut candidates = if self.config.hybrid_enabled {
            trace.push("hybrid");
            let (semantic, lexical) = tokio::join!(
                self.semantic_branch(query, filters),
                self.lexical_branch(query, filters, language)
            );
            let profile = classify_query(query);
            fuse(query, semantic, lexical, profile)
        } else {
            Vec::new()
        };

        if candidates.is_empty() {
            candidates = self.run_legacy(query, filters, &mut trace).await;
        }

        let candidates = apply_token_filter(candidates, &leftover);
        RetrievalOutcome { candidates, trace }
    }

    /// Semantic branch: embed then similarity-search. A failure in either
    /// step degrades this branch to empty without touching the other.
    async fn semantic_branch(
        &self,
        query: &str,
        filters: &dishcovery_core::SearchFilters,
    ) -> Vec<SemanticRow> {
        let embedding = match self.embedder.embed(query).await {
            Ok(embedding) => embedding,
            Err(err) => {
                tracing::warn!(reason = "embedding_failed", error = %err, "semantic branch degraded");
                return Vec::new();
            }
        };
        match self
            .store
            .semantic_search(&embedding, filters, self.config.fetch_limit)
            .await
        {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(reason = "semantic_search_failed", error = %err, "semantic branch degraded");
                Vec::new()
            }
        }
    }

    /// Lexical branch: trigram search on the original query, and on a
    /// best-effort translation when one is available. The translation call
    /// may fail silently; results merge by dish id keeping the higher
    /// similarity.
    async fn lexical_branch(
        &self,
        query: &str,
        filters: &dishcovery_core::SearchFilters,
        language: Language,
    ) -> Vec<TrigramRow> {
        let mut rows = match self
            .store
            .fuzzy_search(query, filters, self.config.fetch_limit)
            .await
        {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(reason = "fuzzy_search_failed", error = %err, "lexical branch degraded");
                Vec::new()
            }
        };

        if let Some(translated) = self.translate_query(query, language).await {
            if translated != query {
                if let Ok(extra) = self
                    .store
                    .fuzzy_search(&translated, filters, self.config.fetch_limit)
                    .await
                {
                    for row in extra {
                        match rows.iter_mut().find(|r| r.dish.dish_id == row.dish.dish_id) {
                            Some(existing) => {
                                existing.similarity = existing.similarity.max(row.similarity)
                            }
                            None => rows.push(row),
                        }
                    }
                }
            }
        }
        rows
    }

    /// Best-effort English translation through the injected cache
    async fn translate_query(&self, query: &str, language: Language) -> Option<String> {
        if language == Language::En {
            return None;
        }
        let translator = self.translator.as_ref()?;
        let key = format!("{}:{}", query, Language::En.code());
        if let Some(cached) = self.translation_cache.get(&key) {
            return Some(cached);
        }
        match translator.translate(query, Language::En).await {
            Ok(translated) => {
                self.translation_cache.insert(key, translated.clone());
                Some(translated)
            }
            Err(err) => {
                tracing::debug!(reason = "translation_failed", error = %err, "falling back to original query");
                None
            }
        }
    }

    /// Walk the ordered legacy strategies until one produces candidates
    async fn run_legacy(
        &self,
        query: &str,
        filters: &dishcovery_core::SearchFilters,
        trace: &mut Vec<&'static str>,
    ) -> Vec<HybridCandidate> {
        for strategy in LEGACY_STRATEGIES {
            trace.push(strategy.name());
            let result = match strategy {
                LegacyStrategy::SemanticFirst => self.legacy_semantic(query, filters).await,
                LegacyStrategy::TrigramOnly => self.legacy_trigram(query, filters).await,
            };
            match result {
                Ok(candidates) if !candidates.is_empty() => return candidates,
                Ok(_) => tracing::debug!(strategy = strategy.name(), "empty, trying next"),
                Err(err) => {
                    tracing::debug!(strategy = strategy.name(), error = %err, "failed, trying next")
                }
            }
        }
        Vec::new()
    }

    async fn legacy_semantic(
        &self,
        query: &str,
        filters: &dishcovery_core::SearchFilters,
    ) -> dishcovery_core::Result<Vec<HybridCandidate>> {
        let embedding = self.embedder.embed(query).await?;
        let rows = self
            .store
            .semantic_search(&embedding, filters, self.config.fetch_limit)
            .await?;
        let mut candidates: Vec<HybridCandidate> = rows
            .into_iter()
            .map(fusion::candidate_from_semantic)
            .collect();

        if candidates.len() < self.config.min_semantic_hits {
            if let Ok(rows) = self
                .store
                .fuzzy_search(query, filters, self.config.fetch_limit)
                .await
            {
                for row in rows {
                    if !candidates.iter().any(|c| c.dish_id == row.dish.dish_id) {
                        candidates.push(fusion::candidate_from_trigram(row));
                    }
                }
            }
        }
        Ok(candidates)
    }

    async fn legacy_trigram(
        &self,
        query: &str,
        filters: &dishcovery_core::SearchFilters,
    ) -> dishcovery_core::Result<Vec<HybridCandidate>> {
        let rows = self
            .store
            .fuzzy_search(query, filters, self.config.fetch_limit)
            .await?;
        Ok(rows.into_iter().map(fusion::candidate_from_trigram).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dishcovery_core::{
        DishRow, Error, RestaurantCandidate, Result, SearchFilters, TagRow,
    };
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn row(name: &str) -> DishRow {
        DishRow {
            dish_id: Uuid::new_v4(),
            dish_name: name.to_string(),
            restaurant_id: Uuid::new_v4(),
            restaurant_name: "Kitchen".to_string(),
            description: None,
            section_name: None,
            price_sek: Some(100),
        }
    }

    #[derive(Default)]
    struct StubStore {
        semantic: Vec<SemanticRow>,
        trigram: Vec<TrigramRow>,
        tag: Vec<TagRow>,
        fuzzy_queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DishStore for StubStore {
        async fn semantic_search(
            &self,
            _embedding: &[f32],
            _filters: &SearchFilters,
            _limit: usize,
        ) -> Result<Vec<SemanticRow>> {
            Ok(self.semantic.clone())
        }

        async fn fuzzy_search(
            &self,
            text: &str,
            _filters: &SearchFilters,
            _limit: usize,
        ) -> Result<Vec<TrigramRow>> {
            self.fuzzy_queries.lock().push(text.to_string());
            Ok(self.trigram.clone())
        }

        async fn tag_search(
            &self,
            _tag_slugs: &[String],
            _filters: &SearchFilters,
            _limit: usize,
        ) -> Result<Vec<TagRow>> {
            Ok(self.tag.clone())
        }

        async fn lookup_restaurant_by_name(&self, _text: &str) -> Result<Vec<RestaurantCandidate>> {
            Ok(Vec::new())
        }

        async fn fetch_tags(&self, _dish_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<String>>> {
            Ok(HashMap::new())
        }
    }

    struct OkEmbedder;

    #[async_trait]
    impl EmbeddingProvider for OkEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.1; 8])
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::Embedding("down".to_string()))
        }
    }

    fn params(query: Option<&str>, tags: &[&str]) -> SearchParams {
        SearchParams {
            query_text: query.map(str::to_string),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            city: None,
            budget_max_sek: None,
        }
    }

    #[tokio::test]
    async fn test_tag_only_dispatch() {
        let store = StubStore {
            tag: vec![TagRow { dish: row("Dal Tadka") }],
            ..Default::default()
        };
        let engine = HybridSearchEngine::new(
            Arc::new(store),
            Arc::new(OkEmbedder),
            EngineConfig::default(),
        );
        let outcome = engine
            .run(&params(None, &["vegetarian"]), Language::En)
            .await;
        assert_eq!(outcome.trace, vec!["tag_only"]);
        assert_eq!(outcome.candidates.len(), 1);
    }

    #[tokio::test]
    async fn test_hybrid_runs_both_branches() {
        let store = StubStore {
            semantic: vec![SemanticRow {
                dish: row("Margherita Pizza"),
                similarity: 0.8,
            }],
            trigram: vec![TrigramRow {
                dish: row("Pizza Bianca"),
                similarity: 0.7,
            }],
            ..Default::default()
        };
        let engine = HybridSearchEngine::new(
            Arc::new(store),
            Arc::new(OkEmbedder),
            EngineConfig::default(),
        );
        let outcome = engine.run(&params(Some("pizza"), &[]), Language::En).await;
        assert_eq!(outcome.trace, vec!["hybrid"]);
        assert_eq!(outcome.candidates.len(), 2);
    }

    #[tokio::test]
    async fn test_embedding_failure_degrades_to_trigram() {
        let store = StubStore {
            trigram: vec![TrigramRow {
                dish: row("Margherita Pizza"),
                similarity: 0.9,
            }],
            ..Default::default()
        };
        let engine = HybridSearchEngine::new(
            Arc::new(store),
            Arc::new(FailingEmbedder),
            EngineConfig::default(),
        );
        let outcome = engine.run(&params(Some("pizza"), &[]), Language::En).await;
        // Hybrid still works off the surviving lexical branch
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].dish_name, "Margherita Pizza");
    }

    #[tokio::test]
    async fn test_legacy_fallback_trace() {
        // Hybrid disabled and nothing in the store: every strategy shows
        // up in the trace, result is empty, no error escapes
        let engine = HybridSearchEngine::new(
            Arc::new(StubStore::default()),
            Arc::new(FailingEmbedder),
            EngineConfig {
                hybrid_enabled: false,
                ..Default::default()
            },
        );
        let outcome = engine.run(&params(Some("pizza"), &[]), Language::En).await;
        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.trace, vec!["legacy_semantic", "legacy_trigram"]);
    }

    #[tokio::test]
    async fn test_token_filter_applied_after_fusion() {
        let store = StubStore {
            semantic: vec![
                SemanticRow {
                    dish: row("Margherita Pizza"),
                    similarity: 0.8,
                },
                SemanticRow {
                    dish: row("Tomato Soup"),
                    similarity: 0.75,
                },
            ],
            ..Default::default()
        };
        let engine = HybridSearchEngine::new(
            Arc::new(store),
            Arc::new(OkEmbedder),
            EngineConfig::default(),
        );
        let outcome = engine.run(&params(Some("pizza"), &[]), Language::En).await;
        // The soup has no "pizza" token anywhere and is filtered out
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].dish_name, "Margherita Pizza");
    }

    struct UppercaseTranslator;

    #[async_trait]
    impl Translator for UppercaseTranslator {
        async fn translate(&self, text: &str, _target: Language) -> Result<String> {
            Ok(text.to_uppercase())
        }
    }

    #[tokio::test]
    async fn test_lexical_branch_uses_translation() {
        let store = Arc::new(StubStore::default());
        let cache = Arc::new(TranslationCache::default());
        let engine = HybridSearchEngine::new(
            store.clone(),
            Arc::new(OkEmbedder),
            EngineConfig::default(),
        )
        .with_translator(Arc::new(UppercaseTranslator), cache.clone());

        engine
            .run(&params(Some("vegansk pizza"), &[]), Language::Sv)
            .await;
        let queries = store.fuzzy_queries.lock().clone();
        assert!(queries.contains(&"vegansk pizza".to_string()));
        assert!(queries.contains(&"VEGANSK PIZZA".to_string()));
        // Second run hits the cache, translator output unchanged
        assert_eq!(cache.len(), 1);
    }
}
