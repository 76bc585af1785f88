use super::*;
use std::time::Duration;

/// Where catalog snapshots come from.
pub enum CatalogSource {
    /// Fixed snapshot, loaded once (possibly empty).
    Static(Arc<Catalog>),
    Postgres(PostgresCatalog),
}

impl CatalogSource {
    /// A JSON file wins over a database URL; with neither the catalog only
    /// carries the built-in functions.
    pub async fn from_config(config: &CatalogConfig) -> Result<Self> {
        let default_database = config.default_database.clone();
        if let Some(path) = &config.file {
            let catalog = Catalog::from_file(path)
                .await?
                .with_default_database(default_database);
            return Ok(CatalogSource::Static(Arc::new(catalog)));
        }
        if let Some(url) = &config.database_url {
            info!("Using live Postgres catalog");
            return Ok(CatalogSource::Postgres(PostgresCatalog::connect_lazy(
                url,
                Duration::from_secs(config.refresh_secs),
                default_database,
            )?));
        }
        warn!("No catalog configured, only built-in functions will be suggested");
        Ok(CatalogSource::Static(Arc::new(
            Catalog::default().with_default_database(default_database),
        )))
    }

    /// Consistent view for one computation. Failures surface as
    /// [`Error::Catalog`].
    pub async fn snapshot(&self) -> Result<Arc<Catalog>> {
        match self {
            CatalogSource::Static(catalog) => Ok(catalog.clone()),
            CatalogSource::Postgres(source) => source.snapshot().await.map_err(|e| match e {
                Error::Database(e) => Error::Catalog(e.to_string()),
                other => other,
            }),
        }
    }
}

impl From<Catalog> for CatalogSource {
    fn from(catalog: Catalog) -> Self {
        CatalogSource::Static(Arc::new(catalog))
    }
}
