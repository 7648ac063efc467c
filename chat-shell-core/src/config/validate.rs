//! Configuration validation rules.

use super::schema::Config;

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if config.storage.dir.trim().is_empty() {
        errors.push("storage.dir must not be empty".to_string());
    }
    if config.storage.history_key.trim().is_empty() {
        errors.push("storage.history_key must not be empty".to_string());
    }
    if config.storage.credential_key.trim().is_empty() {
        errors.push("storage.credential_key must not be empty".to_string());
    }
    if config.storage.history_key == config.storage.credential_key {
        errors.push("storage.history_key and storage.credential_key must differ".to_string());
    }

    if config.generator.assistant_name.trim().is_empty() {
        errors.push("generator.assistant_name must not be empty".to_string());
    }

    let format = config.logging.format.to_ascii_lowercase();
    if format != "text" && format != "json" {
        errors.push(format!(
            "logging.format must be \"text\" or \"json\", got \"{}\"",
            config.logging.format
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_defaults() {
        validate_config(&Config::default()).unwrap();
    }

    #[test]
    fn test_validate_rejects_shared_keys() {
        let mut config = Config::default();
        config.storage.credential_key = config.storage.history_key.clone();

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn test_validate_aggregates_errors() {
        let mut config = Config::default();
        config.storage.history_key = " ".to_string();
        config.logging.format = "xml".to_string();

        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("storage.history_key"));
        assert!(err.contains("logging.format"));
    }
}
