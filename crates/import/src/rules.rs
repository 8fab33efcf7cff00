use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Keyword lists per category. Matching is case-insensitive substring
/// containment; list order matters only for picking the salary name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeywordRules {
    /// Staff names as they should appear in item labels.
    pub salary_names: Vec<String>,
    pub salary_keywords: Vec<String>,
    pub utility: Vec<String>,
    pub rent: Vec<String>,
    pub ingredient: Vec<String>,
    pub milk: Vec<String>,
    pub coffee: Vec<String>,
}

impl Default for KeywordRules {
    fn default() -> Self {
        Self {
            salary_names: strings(&["Heng Alisa", "Morn Monita", "Luy Solay"]),
            salary_keywords: Vec::new(),
            utility: strings(&["utilities bill"]),
            rent: strings(&["rental fee"]),
            ingredient: strings(&["meiji", "gbs", "kirisu", "milk"]),
            milk: strings(&["meiji", "kirisu", "milk"]),
            coffee: strings(&["gbs"]),
        }
    }
}

/// Substrings used to pick the date, details and outgoing-amount columns
/// out of a statement's (lower-cased) header row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnRules {
    pub date: String,
    pub details: String,
    pub amount: String,
}

impl Default for ColumnRules {
    fn default() -> Self {
        Self {
            date: "date".to_string(),
            details: "detail".to_string(),
            amount: "money out".to_string(),
        }
    }
}

/// Everything loaded from the rule file. Built once at startup and passed by
/// reference to the classifier and statement reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleSet {
    /// How many leading rows are searched for the header.
    pub header_scan_rows: usize,
    pub columns: ColumnRules,
    pub keywords: KeywordRules,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            header_scan_rows: 10,
            columns: ColumnRules::default(),
            keywords: KeywordRules::default(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read rule file {}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed rule file")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid rule set: {0}")]
    Invalid(String),
}

impl RuleSet {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let rules = Self::from_toml(&content)?;
        tracing::info!(
            path = %path.display(),
            salary_names = rules.keywords.salary_names.len(),
            "Loaded rule file"
        );
        Ok(rules)
    }

    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let rules: RuleSet = toml::from_str(toml_content)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.header_scan_rows == 0 {
            return Err(ConfigError::Invalid(
                "header_scan_rows must be at least 1".to_string(),
            ));
        }
        for (name, pattern) in [
            ("columns.date", &self.columns.date),
            ("columns.details", &self.columns.details),
            ("columns.amount", &self.columns.amount),
        ] {
            if pattern.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} must not be blank")));
            }
        }
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
