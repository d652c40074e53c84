pub mod client;
pub mod error;
pub mod protocol;
pub mod render;
pub mod selection;
pub mod server;
pub mod session;

#[cfg(test)]
mod testing;

/// Imagelens configuration. The constants are the compiled-in values; a
/// deployment may replace them once at startup through `Settings::load`
pub mod config {
    use ::config::{Config, ConfigError, Environment, File};
    use serde::Deserialize;
    use std::path::PathBuf;

    /// The analysis service endpoint
    pub const API_ENDPOINT: &str = "https://example.execute-api.us-east-1.amazonaws.com/prod/analyze";

    /// The bucket the analysis service reads uploaded images from
    pub const S3_BUCKET: &str = "imagelens-uploads";

    /// Region of the analysis service
    pub const REGION: &str = "us-east-1";

    /// Default log filter when `RUST_LOG` is unset
    pub const RUST_LOG: &str = "imagelens=info,actix_web=info";

    /// Port the UI is served on
    pub const LISTEN_PORT: u16 = 8080;

    /// Largest upload accepted by `POST /select`
    pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

    /// Settings file looked up next to the binary (`imagelens.toml`)
    pub const SETTINGS_FILE: &str = "imagelens";

    /// `imagelens` in the directory of the running binary. Falls back to the
    /// working directory when the binary's location cannot be resolved
    pub fn settings_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(SETTINGS_FILE)))
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE))
    }

    #[derive(Debug, Clone, Deserialize, PartialEq)]
    pub struct Settings {
        pub endpoint: String,
        pub bucket: String,
        pub region: String,
        pub listen_port: u16,
        pub log: String,
    }

    impl Settings {
        /// Load `imagelens.toml` from next to the binary and `IMAGELENS_*`
        /// variables over the compiled-in defaults
        pub fn load() -> Result<Self, ConfigError> {
            Self::load_from(&settings_path().to_string_lossy())
        }

        pub fn load_from(file: &str) -> Result<Self, ConfigError> {
            Config::builder()
                .set_default("endpoint", API_ENDPOINT)?
                .set_default("bucket", S3_BUCKET)?
                .set_default("region", REGION)?
                .set_default("listen_port", LISTEN_PORT as i64)?
                .set_default("log", RUST_LOG)?
                .add_source(File::with_name(file).required(false))
                .add_source(Environment::with_prefix("IMAGELENS"))
                .build()?
                .try_deserialize()
        }
    }

}

pub mod util {
    use tracing_subscriber::EnvFilter;

    /// Install the global tracing subscriber. `RUST_LOG` wins over
    /// `default_filter`. Logs go to stderr so stdout stays clean for output
    pub fn init_logging(default_filter: &str) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
