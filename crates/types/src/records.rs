//! Row types for the backend's model-management, history, and compare
//! endpoints.

use std::{error::Error, fmt};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Providers the backend accepts for new model configurations.
pub const ALLOWED_PROVIDERS: &[&str] = &["kimi", "qwen", "doubao"];

/// Generic `{"items": [...]}` list envelope used by `/models` and `/history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// One registered model configuration, as returned by `GET /models`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    pub provider: String,
    #[serde(default)]
    pub label: String,
    pub base_url: String,
    pub model: String,
    /// Stored as 0/1 in the backend's sqlite schema.
    #[serde(default)]
    pub enabled: i64,
}

impl ModelEntry {
    pub fn is_enabled(&self) -> bool {
        self.enabled != 0
    }

    /// Display label: the free-form label when set, the model name otherwise.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.model
        } else {
            &self.label
        }
    }
}

/// Payload for `POST /models`. Also the import row format, which is why
/// `enabled` tolerates the 0/1 integers an export of [`ModelEntry`] carries
/// and why `api_key` may be absent (the backend never returns keys).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewModel {
    pub provider: String,
    #[serde(default)]
    pub label: String,
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub enabled: bool,
}

/// Accepts `true`/`false`, 0/1 integers, or null for boolean-ish columns.
fn deserialize_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error as _;
    match Value::deserialize(deserializer)? {
        Value::Bool(flag) => Ok(flag),
        Value::Number(n) => Ok(n.as_i64().unwrap_or(0) != 0),
        Value::Null => Ok(false),
        other => Err(D::Error::custom(format!(
            "expected a boolean or 0/1, got {other}"
        ))),
    }
}

impl NewModel {
    /// The backend rejects unknown providers with a 400; validate up front so
    /// the form can point at the offending field.
    pub fn validate(&self) -> Result<(), ProviderError> {
        let provider = self.provider.trim().to_lowercase();
        if ALLOWED_PROVIDERS.contains(&provider.as_str()) {
            Ok(())
        } else {
            Err(ProviderError(self.provider.clone()))
        }
    }
}

/// Unknown provider name in a [`NewModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError(pub String);

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "provider '{}' must be one of {}",
            self.0,
            ALLOWED_PROVIDERS.join("/")
        )
    }
}

impl Error for ProviderError {}

/// One row of `GET /history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Full record from `GET /history/{id}`.
///
/// Newer records carry `results_json` (a map of model id to result); older
/// rows only have the per-provider columns. Either may hold a Python-repr
/// string instead of strict JSON, hence [`parse_loose_json`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryDetail {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub results_json: Option<Value>,
    #[serde(default)]
    pub kimi_json: Option<String>,
    #[serde(default)]
    pub qwen_json: Option<String>,
    #[serde(default)]
    pub doubao_json: Option<String>,
}

impl HistoryDetail {
    /// Flattens the record into `(section name, result)` pairs, preferring
    /// the multi-model `results_json` field and falling back to the legacy
    /// per-provider columns. Sections that fail to parse are skipped.
    pub fn result_sections(&self) -> Vec<(String, ModelResult)> {
        let mut sections = Vec::new();

        if let Some(raw) = &self.results_json {
            let value = match raw {
                Value::String(s) => parse_loose_json(s),
                other => Some(other.clone()),
            };
            if let Some(Value::Object(map)) = value {
                for (model_id, entry) in map {
                    if let Ok(result) = serde_json::from_value::<ModelResult>(entry) {
                        let name = if result.label.is_empty() {
                            format!("model {model_id}")
                        } else {
                            result.label.clone()
                        };
                        sections.push((name, result));
                    }
                }
            }
            if !sections.is_empty() {
                return sections;
            }
        }

        let legacy = [
            ("Kimi", &self.kimi_json),
            ("Qwen", &self.qwen_json),
            ("Doubao", &self.doubao_json),
        ];
        for (provider, raw) in legacy {
            let Some(raw) = raw else { continue };
            if let Some(value) = parse_loose_json(raw) {
                if let Ok(result) = serde_json::from_value::<ModelResult>(value) {
                    sections.push((provider.to_string(), result));
                }
            }
        }
        sections
    }
}

/// Result of one model within a comparison run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModelResult {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub elapsed_ms: Option<u64>,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub model: String,
}

/// Response of `POST /compare`: the stored history id plus per-model results
/// keyed by model id, in backend order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareOutcome {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub results: IndexMap<String, ModelResult>,
}

/// Parses a value that is usually JSON but may be a Python literal repr
/// (single quotes, `True`/`False`/`None`), as old history rows stored.
pub fn parse_loose_json(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "None" {
        return None;
    }
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }
    let repaired = trimmed
        .replace('\'', "\"")
        .replace("True", "true")
        .replace("False", "false")
        .replace("None", "null");
    serde_json::from_str(&repaired).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_entry_decodes_backend_row() {
        let json = r#"{
            "id": 3,
            "created_at": "2025-01-02 10:00:00",
            "provider": "qwen",
            "label": "",
            "base_url": "https://dashscope.example.com/v1",
            "model": "qwen-vl-plus",
            "enabled": 1
        }"#;
        let entry: ModelEntry = serde_json::from_str(json).expect("decode");
        assert!(entry.is_enabled());
        assert_eq!(entry.display_label(), "qwen-vl-plus");
    }

    #[test]
    fn new_model_provider_validation() {
        let mut model = NewModel {
            provider: "Kimi".into(),
            label: String::new(),
            base_url: "https://api.moonshot.cn/v1".into(),
            api_key: "sk-test".into(),
            model: "moonshot-v1-8k".into(),
            enabled: true,
        };
        assert!(model.validate().is_ok());
        model.provider = "openai".into();
        let err = model.validate().unwrap_err();
        assert!(err.to_string().contains("kimi/qwen/doubao"));
    }

    #[test]
    fn exported_model_rows_import_back() {
        // `GET /models` rows carry `enabled` as 0/1 and never an api_key;
        // the import side has to take that shape as-is.
        let exported = ItemList {
            items: vec![ModelEntry {
                id: 3,
                created_at: Some("2025-01-02 10:00:00".into()),
                provider: "qwen".into(),
                label: "Q1".into(),
                base_url: "https://dashscope.example.com/v1".into(),
                model: "qwen-vl-plus".into(),
                enabled: 1,
            }],
        };
        let json = serde_json::to_string(&exported).expect("encode");
        let imported: ItemList<NewModel> = serde_json::from_str(&json).expect("decode");
        assert_eq!(imported.items.len(), 1);
        let row = &imported.items[0];
        assert!(row.enabled);
        assert!(row.api_key.is_empty());
        assert_eq!(row.model, "qwen-vl-plus");
        assert!(row.validate().is_ok());
    }

    #[test]
    fn loose_json_accepts_python_repr() {
        let value = parse_loose_json("{'ok': True, 'text': 'fine', 'error': None}")
            .expect("repaired parse");
        assert_eq!(value["ok"], Value::Bool(true));
        assert_eq!(value["text"], Value::String("fine".into()));
        assert!(parse_loose_json("None").is_none());
        assert!(parse_loose_json("").is_none());
    }

    #[test]
    fn history_detail_prefers_results_json() {
        let json = r#"{
            "id": 7,
            "results_json": {"4": {"ok": true, "text": "a", "provider": "kimi", "label": "k1"}},
            "kimi_json": "{'ok': False, 'error': 'stale'}"
        }"#;
        let detail: HistoryDetail = serde_json::from_str(json).expect("decode");
        let sections = detail.result_sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, "k1");
        assert!(sections[0].1.ok);
    }

    #[test]
    fn history_detail_falls_back_to_provider_columns() {
        let json = r#"{
            "id": 8,
            "kimi_json": "{'ok': True, 'text': 'legacy'}",
            "doubao_json": "None"
        }"#;
        let detail: HistoryDetail = serde_json::from_str(json).expect("decode");
        let sections = detail.result_sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, "Kimi");
        assert_eq!(sections[0].1.text.as_deref(), Some("legacy"));
    }

    #[test]
    fn compare_outcome_preserves_result_order() {
        let json = r#"{
            "id": 11,
            "results": {
                "9": {"ok": true, "text": "first", "provider": "kimi"},
                "2": {"ok": false, "error": "boom", "provider": "qwen"}
            }
        }"#;
        let outcome: CompareOutcome = serde_json::from_str(json).expect("decode");
        let keys: Vec<&str> = outcome.results.keys().map(String::as_str).collect();
        assert_eq!(keys, ["9", "2"]);
    }
}
