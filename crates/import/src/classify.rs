use ledgerline_core::FsLine;

use crate::rules::{KeywordRules, RuleSet};

const SUMMARY_WORDS: usize = 5;

/// Both labels assigned to one transaction description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub fs_line: FsLine,
    pub item: String,
}

/// Keyword lists lower-cased once, so per-row matching is plain substring
/// search.
struct LoweredKeywords {
    salary_names: Vec<(String, String)>,
    salary_keywords: Vec<String>,
    utility: Vec<String>,
    rent: Vec<String>,
    ingredient: Vec<String>,
    milk: Vec<String>,
    coffee: Vec<String>,
}

impl LoweredKeywords {
    fn new(rules: &KeywordRules) -> Self {
        Self {
            salary_names: rules
                .salary_names
                .iter()
                .filter(|n| !n.is_empty())
                .map(|n| (n.to_lowercase(), n.clone()))
                .collect(),
            salary_keywords: lower_all(&rules.salary_keywords),
            utility: lower_all(&rules.utility),
            rent: lower_all(&rules.rent),
            ingredient: lower_all(&rules.ingredient),
            milk: lower_all(&rules.milk),
            coffee: lower_all(&rules.coffee),
        }
    }
}

/// Assigns FS lines and item labels from a [`RuleSet`].
///
/// The two decisions use different priority orders. `classify` checks salary
/// before utility and rent; `summarize` checks utility and rent before the
/// salary names. Both orders are kept as configured by the bookkeepers.
pub struct Classifier {
    keywords: LoweredKeywords,
}

impl Classifier {
    pub fn new(rules: &RuleSet) -> Self {
        Self {
            keywords: LoweredKeywords::new(&rules.keywords),
        }
    }

    pub fn classify(&self, description: &str) -> FsLine {
        let text = description.to_lowercase();
        let kw = &self.keywords;

        if kw.salary_names.iter().any(|(lower, _)| text.contains(lower.as_str()))
            || contains_any(&text, &kw.salary_keywords)
        {
            FsLine::Salary
        } else if contains_any(&text, &kw.utility) {
            FsLine::Utility
        } else if contains_any(&text, &kw.rent) {
            FsLine::Rent
        } else if contains_any(&text, &kw.ingredient) {
            FsLine::Ingredient
        } else {
            FsLine::Other
        }
    }

    pub fn summarize(&self, description: &str) -> String {
        let text = description.to_lowercase();
        let kw = &self.keywords;

        if contains_any(&text, &kw.utility) {
            return "Utilities".to_string();
        }
        if contains_any(&text, &kw.rent) {
            return "Rent".to_string();
        }
        if let Some((_, name)) = kw
            .salary_names
            .iter()
            .find(|(lower, _)| text.contains(lower.as_str()))
        {
            return format!("Salary - {name}");
        }
        if contains_any(&text, &kw.milk) {
            return "Milk Purchase".to_string();
        }
        if contains_any(&text, &kw.coffee) {
            return "Coffee Purchase".to_string();
        }

        let words: Vec<&str> = description.split_whitespace().take(SUMMARY_WORDS).collect();
        if words.is_empty() {
            "Unknown".to_string()
        } else {
            words.join(" ")
        }
    }

    pub fn classification(&self, description: &str) -> Classification {
        Classification {
            fs_line: self.classify(description),
            item: self.summarize(description),
        }
    }
}

pub fn classify(rules: &RuleSet, description: &str) -> FsLine {
    Classifier::new(rules).classify(description)
}

pub fn summarize(rules: &RuleSet, description: &str) -> String {
    Classifier::new(rules).summarize(description)
}

fn lower_all(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .filter(|k| !k.is_empty())
        .map(|k| k.to_lowercase())
        .collect()
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| text.contains(k.as_str()))
}
