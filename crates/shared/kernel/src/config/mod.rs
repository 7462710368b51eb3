use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_SETTINGS: &str = "harbor";
const ENV_PREFIX: &str = "HARBOR";

/// Error raised while loading host settings.
#[harbor_derive::harbor_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads settings from a file layered with environment overrides.
///
/// 1. **Base file**: `path` when given (must exist), otherwise an optional
///    `harbor.{toml,json,yaml}` in the working directory.
/// 2. **Environment**: variables prefixed with `HARBOR__`; nested keys use
///    double underscores (`HARBOR__LOGGING__LEVEL` maps to `logging.level`).
///
/// Every field of `T` should carry a serde default so that a missing file
/// yields a usable value.
///
/// # Errors
/// Returns [`ConfigError::Config`] when an explicit file is missing, a source
/// is malformed, or the merged values do not match `T`.
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (effective_path, required) = path.map_or_else(
        || (PathBuf::from(DEFAULT_SETTINGS), false),
        |p| (p.as_ref().to_path_buf(), true),
    );

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    info!(path = %effective_path.display(), required, "Loading settings");

    let settings = builder
        .build()
        .context("Failed to build settings")?
        .try_deserialize::<T>()
        .context("Failed to deserialize settings")?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use harbor_domain::HostSettings;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_missing_default_file_yields_defaults() {
        let settings: HostSettings = load_config(None::<&str>).unwrap();
        assert_eq!(settings.document.path, PathBuf::from("harbor.json"));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let err = load_config::<HostSettings>(Some("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to build settings"));
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "debug_commands = true\n\n[extensions]\nprimary_dir = \"plugins\"\n\n[logging]\nlevel = \"trace\""
        )
        .unwrap();

        let settings: HostSettings = load_config(Some(file.path())).unwrap();
        assert!(settings.debug_commands);
        assert_eq!(settings.extensions.primary_dir, PathBuf::from("plugins"));
        assert_eq!(settings.logging.level, "trace");
        assert_eq!(settings.logging.max_files, 7);
    }
}
