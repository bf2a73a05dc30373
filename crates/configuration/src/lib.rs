use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    AnalyticsSettings, DataSettings, LoggingSettings, OptimizerSettings, RegimeSettings, Settings,
};

/// Loads the application configuration.
///
/// Sources are layered over the built-in defaults: the given TOML file (or an
/// optional `flux.toml` in the working directory when no path is given), then
/// environment variables such as `FLUX__ANALYTICS__RISK_FREE_RATE=0.03`.
pub fn load_config(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("flux").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("FLUX")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    tracing::debug!(risk_free_rate = settings.risk_free_rate(), "Configuration loaded.");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[analytics]\nrisk_free_rate = 0.015\n\n[analytics.regime]\nvol_threshold = 0.3\n\n[data]\ntimeout = 5"
        )
        .unwrap();

        let settings = load_config(Some(file.path())).unwrap();

        assert_eq!(settings.analytics.risk_free_rate, 0.015);
        assert_eq!(settings.analytics.regime.vol_threshold, 0.3);
        assert_eq!(settings.analytics.regime.short_window, 20);
        assert_eq!(settings.data.timeout, 5);
        assert_eq!(settings.optimizer.max_iters, 10_000);
    }

    #[test]
    fn invalid_file_values_fail_validation() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[optimizer]\nmax_iters = 0").unwrap();

        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/flux-config.toml")));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
