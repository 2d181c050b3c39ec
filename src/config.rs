use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaConfig {
    pub data_dir: PathBuf,
    pub search: SearchConfig,
    pub answer: AnswerConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum subset size returned by retrieval.
    pub default_k: usize,
    /// Share of `k` filled from canceled records for cancellation queries.
    pub cancellation_priority: f64,
    /// How many top countries contribute to country sampling.
    pub top_countries: usize,
}

/// Answer-rendering policy. The trigger lists decide when a renderer
/// answers from the whole record set instead of the retrieved subset;
/// defaults mirror the literal keyword checks of the source system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerConfig {
    pub currency_symbol: String,
    pub cancellation_global_triggers: Vec<String>,
    pub family_global_triggers: Vec<String>,
    pub hotel_global_triggers: Vec<String>,
    pub country_global_triggers: Vec<String>,
    pub requests_global_triggers: Vec<String>,
    pub average_triggers: Vec<String>,
    pub total_triggers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// `None` keeps the query cache unbounded, matching the source
    /// behavior; `Some(n)` switches it to an LRU of capacity `n`.
    pub query_cache_capacity: Option<usize>,
}

impl QaConfig {
    /// Validate config values, returning errors for clearly broken configurations.
    pub fn validate(&self) -> Result<(), String> {
        if self.search.default_k == 0 {
            return Err("search.default_k must be > 0".into());
        }
        if !(0.0..=1.0).contains(&self.search.cancellation_priority) {
            return Err("search.cancellation_priority must be in [0.0, 1.0]".into());
        }
        if self.search.top_countries == 0 {
            return Err("search.top_countries must be > 0".into());
        }
        if self.answer.currency_symbol.is_empty() {
            return Err("answer.currency_symbol must not be empty".into());
        }
        if self.cache.query_cache_capacity == Some(0) {
            return Err("cache.query_cache_capacity must be > 0 when set".into());
        }
        Ok(())
    }

    /// Load config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for QaConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("booking-qa");

        Self {
            data_dir,
            search: SearchConfig {
                default_k: 5,
                cancellation_priority: 0.8,
                top_countries: 5,
            },
            answer: AnswerConfig::default(),
            cache: CacheConfig {
                query_cache_capacity: None,
            },
        }
    }
}

impl Default for AnswerConfig {
    fn default() -> Self {
        fn words(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }
        Self {
            currency_symbol: "€".to_string(),
            cancellation_global_triggers: words(&["rate"]),
            family_global_triggers: words(&["include children", "how many"]),
            hotel_global_triggers: words(&["most bookings"]),
            country_global_triggers: words(&["most", "top"]),
            requests_global_triggers: words(&["average", "mean"]),
            average_triggers: words(&["average", "mean"]),
            total_triggers: words(&["total"]),
        }
    }
}
