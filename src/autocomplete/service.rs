use super::*;
use moka::future::Cache;
use std::time::Duration;

/// Computes [`SqlContext`]s. Shared by every request; the only state is the
/// catalog source and a latency-only extraction cache keyed by exact text.
pub struct ContextService {
    catalog: CatalogSource,
    cache: Cache<(Language, String), Arc<Extraction>>,
    engine: RuleEngine,
    ranker: Ranker,
}

impl ContextService {
    pub fn new(catalog: CatalogSource, config: &CompletionConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(Duration::from_millis(config.cache_ttl_ms))
            .build();
        Self {
            catalog,
            cache,
            engine: RuleEngine::with_builtin_rules(),
            ranker: Ranker::new(config.max_suggestions),
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        let catalog = CatalogSource::from_config(&config.catalog).await?;
        Ok(Self::new(catalog, &config.completion))
    }

    pub fn with_engine(mut self, engine: RuleEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Completion context for the caret at `position`.
    ///
    /// Fails on an unsupported language or when no catalog snapshot can be
    /// taken. Text that cannot be extracted degrades to an empty scope and
    /// keyword-only suggestions.
    pub async fn context(
        &self,
        sql: &str,
        position: CaretPosition,
        language: Option<&str>,
    ) -> Result<SqlContext> {
        let language = Language::from_request(language)?;
        let catalog = self.catalog.snapshot().await?;
        let offset = position.to_offset(sql);
        let caret = CaretPosition::from_offset(sql, offset);

        let extractor = TokenExtractor::new(language);
        let extraction = match self.extract(&extractor, sql, language).await {
            Ok(extraction) => Some(extraction),
            Err(e) => {
                warn!("Falling back to keyword suggestions: {e}");
                None
            }
        };

        let ctx = match &extraction {
            Some(extraction) => {
                let syntax = extractor.suggest_at_position(extraction, offset);
                ScopeContext::new(extraction, syntax, offset, catalog)
            }
            None => ScopeContext::empty(sql, offset, catalog),
        };

        let candidates = self.engine.run(&ctx);
        let suggestions = self.ranker.rank(candidates, &ctx.word.prefix, caret);
        debug!(
            "Caret {caret} in clause {:?} at depth {}: {} suggestions",
            ctx.clause,
            ctx.depth(),
            suggestions.len()
        );
        Ok(SqlContext::build(
            sql,
            offset,
            extraction.as_deref(),
            &ctx,
            suggestions,
        ))
    }

    async fn extract(
        &self,
        extractor: &TokenExtractor,
        sql: &str,
        language: Language,
    ) -> Result<Arc<Extraction>> {
        self.cache
            .try_get_with((language, sql.to_string()), async {
                extractor.extract_entities(sql).map(Arc::new)
            })
            .await
            .map_err(|e| Arc::try_unwrap(e).unwrap_or_else(|e| Error::Extraction(e.to_string())))
    }
}
