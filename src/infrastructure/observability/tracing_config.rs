pub const DEFAULT_LOG_FILTER: &str = "info,auditpilot=debug";

#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    pub default_filter: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: "local".to_string(),
            json_format: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            default_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
