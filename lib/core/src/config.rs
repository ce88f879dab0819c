//! Analyzer catalog configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const STOCK_LANGUAGES: &[&str] = &[
    "arabic", "armenian", "basque", "bengali", "brazilian", "bulgarian", "catalan", "chinese",
    "cjk", "czech", "danish", "dutch", "english", "finnish", "french", "galician", "german",
    "greek", "hindi", "hungarian", "indonesian", "irish", "italian", "japanese", "korean",
    "kuromoji", "latvian", "lithuanian", "morfologik", "nori", "norwegian", "persian",
    "polish", "portuguese", "romanian", "russian", "smartcn", "sorani", "spanish", "swedish",
    "thai", "turkish", "ukrainian",
];

const STOCK_BASE: &[&str] = &["standard", "simple", "whitespace", "keyword"];

/// Names of the built-in analyzers, passed explicitly wherever definitions need to tell
/// stock analyzers from custom ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzerCatalog {
    pub stock_analyzers: BTreeSet<String>,
    /// Used when neither the field nor the index names an analyzer.
    pub default_analyzer: String,
}

impl Default for AnalyzerCatalog {
    fn default() -> Self {
        let stock_analyzers = STOCK_BASE
            .iter()
            .chain(STOCK_LANGUAGES)
            .map(|name| format!("lucene.{name}"))
            .collect();

        Self {
            stock_analyzers,
            default_analyzer: "lucene.standard".to_string(),
        }
    }
}

impl AnalyzerCatalog {
    pub fn is_stock_analyzer(&self, name: &str) -> bool {
        self.stock_analyzers.contains(name)
    }
}
