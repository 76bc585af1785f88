reexport!(testing, test);
reexport!(config);
reexport!(error);
reexport!(position);
reexport!(sql);
reexport!(extractor);
reexport!(metadata);
reexport!(scope);
reexport!(autocomplete);
reexport!(server);
#[allow(unused_imports)]
pub(crate) use tracing::{debug, error, info, span, trace, warn};

#[tokio::main]
async fn main() -> Result {
    let config = Config::load()?;
    init_tracing(&config.log.filter);
    info!(
        "Starting sqlctx on {}:{}",
        config.server.host, config.server.port
    );
    serve(config).await
}

fn init_tracing(default_filter: &str) {
    use tracing_subscriber::EnvFilter;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[macro_export]
macro_rules! reexport {
    ($module:ident) => {
        $crate::reexport!($module, false);
    };
    ($module:ident, test) => {
        $crate::reexport!($module, true);
    };
    ($module:ident, $is_test:literal) => {
        #[cfg_attr($is_test, cfg(test))]
        mod $module;
        #[cfg_attr($is_test, cfg(test))]
        #[allow(unused_imports)]
        #[allow(ambiguous_glob_reexports)]
        pub use $module::*;
    };
}
