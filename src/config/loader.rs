//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::VeilConfig;
use crate::config::secret;
use crate::domain::errors::VeilError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`VeilConfig`]
/// 4. Applies environment variable overrides (`VEIL_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsing fails, a
/// referenced environment variable is unset, or validation fails.
pub fn load_config(path: impl AsRef<Path>) -> Result<VeilConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(VeilError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        VeilError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: VeilConfig = toml::from_str(&contents)
        .map_err(|e| VeilError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config
        .validate()
        .map_err(|e| VeilError::Configuration(format!("Configuration validation failed: {e}")))?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("static regex");
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let substituted = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    missing_vars.push(var_name.to_string());
                    String::new()
                }
            }
        });
        result.push_str(&substituted);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(VeilError::Configuration(format!(
            "Missing environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies `VEIL_*` environment variable overrides
fn apply_env_overrides(config: &mut VeilConfig) -> Result<()> {
    if let Ok(val) = std::env::var("VEIL_BOUNDARY_ENDPOINT") {
        config.boundary.endpoint = val;
    }

    if let Ok(val) = std::env::var("VEIL_BOUNDARY_API_KEY") {
        config.boundary.api_key = Some(secret(val));
    }

    if let Ok(val) = std::env::var("VEIL_BOUNDARY_TIMEOUT_SECONDS") {
        config.boundary.timeout_seconds = val.parse().map_err(|_| {
            VeilError::Configuration(format!("Invalid VEIL_BOUNDARY_TIMEOUT_SECONDS: {val}"))
        })?;
    }

    if let Ok(val) = std::env::var("VEIL_LOG_LEVEL") {
        config.logging.level = val;
    }

    if let Ok(val) = std::env::var("VEIL_WEEKLY_CEILING") {
        config.validation.weekly_ceiling = val
            .parse()
            .map_err(|_| VeilError::Configuration(format!("Invalid VEIL_WEEKLY_CEILING: {val}")))?;
    }

    if let Ok(val) = std::env::var("VEIL_DAILY_FLOOR") {
        config.validation.daily_floor = val
            .parse()
            .map_err(|_| VeilError::Configuration(format!("Invalid VEIL_DAILY_FLOOR: {val}")))?;
    }

    if let Ok(val) = std::env::var("VEIL_AUDIT_ENABLED") {
        config.audit.enabled = val
            .parse()
            .map_err(|_| VeilError::Configuration(format!("Invalid VEIL_AUDIT_ENABLED: {val}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_minimal_config() {
        let file = write_config(
            r#"
            [boundary]
            endpoint = "https://optimizer.example.com/v1/plan"
            "#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.boundary.timeout_seconds, 30);
        assert_eq!(config.validation.weekly_ceiling, 40);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config("/nonexistent/veil.toml").unwrap_err();
        assert!(matches!(err, VeilError::Configuration(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let file = write_config("boundary = endpoint =");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_env_substitution_comment_lines_skipped() {
        let contents = "# ${NOT_A_REAL_VAR}\nkey = 1\n";
        let out = substitute_env_vars(contents).unwrap();
        assert!(out.contains("${NOT_A_REAL_VAR}"));
    }

    #[test]
    fn test_env_substitution_missing_var() {
        let contents = "key = \"${VEIL_TEST_DEFINITELY_UNSET_VAR}\"\n";
        assert!(substitute_env_vars(contents).is_err());
    }
}
