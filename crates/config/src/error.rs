use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The requested entry is absent. Callers usually fall back to a default.
    #[error("{message}{}", render_options(.options))]
    NotConfigured { message: String, options: Option<(String, Vec<String>)> },
    #[error("parsing configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("{0}")]
    Unused(String),
    #[error("{}", render_aggregate(.0))]
    Aggregate(Vec<ConfigError>),
}

impl ConfigError {
    pub fn not_configured(message: impl Into<String>) -> Self {
        ConfigError::NotConfigured { message: message.into(), options: None }
    }

    /// Attaches the sorted names configured at the level where the lookup missed.
    pub fn with_options(self, kind: &str, options: impl IntoIterator<Item = String>) -> Self {
        match self {
            ConfigError::NotConfigured { message, .. } => {
                let mut options: Vec<String> = options.into_iter().collect();
                options.sort();
                ConfigError::NotConfigured { message, options: Some((kind.to_string(), options)) }
            }
            other => other,
        }
    }

    pub fn is_not_configured(&self) -> bool { matches!(self, ConfigError::NotConfigured { .. }) }

    /// Number of individual problems carried by this error.
    pub fn len(&self) -> usize {
        match self {
            ConfigError::Aggregate(errs) => errs.iter().map(ConfigError::len).sum(),
            _ => 1,
        }
    }
}

fn render_options(options: &Option<(String, Vec<String>)>) -> String {
    match options {
        Some((kind, names)) if !names.is_empty() => format!(" (available {kind}: {})", names.join(", ")),
        _ => String::new(),
    }
}

fn render_aggregate(errs: &[ConfigError]) -> String {
    match errs {
        [single] => single.to_string(),
        _ => {
            let lines: Vec<String> = errs.iter().map(|e| format!("  - {e}")).collect();
            format!("{} configuration problems:\n{}", errs.len(), lines.join("\n"))
        }
    }
}

/// Converts the distinguished "not configured" miss into `Ok(None)`.
pub trait ConfigResultExt<T> {
    fn optional(self) -> Result<Option<T>, ConfigError>;
}

impl<T> ConfigResultExt<T> for Result<T, ConfigError> {
    fn optional(self) -> Result<Option<T>, ConfigError> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.is_not_configured() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_render_sorted() {
        let e = ConfigError::not_configured("type Foo has no detail for property Bar")
            .with_options("properties", ["Zeta".to_string(), "Alpha".to_string()]);
        assert_eq!(e.to_string(), "type Foo has no detail for property Bar (available properties: Alpha, Zeta)");
    }

    #[test]
    fn optional_only_swallows_misses() {
        let miss: Result<bool, ConfigError> = Err(ConfigError::not_configured("nope"));
        assert_eq!(miss.optional().unwrap(), None);
        let fail: Result<bool, ConfigError> = Err(ConfigError::Unused("x".into()));
        assert!(fail.optional().is_err());
    }

    #[test]
    fn aggregate_lists_every_problem() {
        let e = ConfigError::Aggregate(vec![ConfigError::Unused("a".into()), ConfigError::Unused("b".into())]);
        assert_eq!(e.len(), 2);
        assert_eq!(e.to_string(), "2 configuration problems:\n  - a\n  - b");
    }
}
