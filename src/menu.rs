// 🍽️ Menu Model - Tagesmenüs as delivered by the feed, plus the derived annex
//
// MenuEntry mirrors the feed's JSON record (German field names kept on the
// wire). ProcessedMenuEntry wraps a copy of the entry together with the
// display text and resolved codes computed by the parser.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// RAW ENTRY
// ============================================================================

/// One menu of a day, exactly as the feed sends it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuEntry {
    // ========================================================================
    // CORE FIELDS (read by the parser, the sort and the renderer)
    // ========================================================================
    /// Free text with "[br]" markers and code groups
    #[serde(default, deserialize_with = "text_or_empty")]
    pub menue_text: String,

    /// Display name, e.g. "Menü 1" or "Vegetarisch"
    #[serde(default, deserialize_with = "text_or_empty")]
    pub bezeichnung: String,

    /// Sort priority (higher first)
    #[serde(default, deserialize_with = "group_or_zero")]
    pub menue_gruppe: i64,

    /// Locked / not orderable
    #[serde(default, deserialize_with = "truthy")]
    pub gesperrt: bool,

    // ========================================================================
    // PASS-THROUGH FIELDS (kurzBez, allergeneIds, naehrwerte, ...)
    // ========================================================================
    /// Everything else the record carries, kept verbatim for the JSON API
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MenuEntry {
    /// Create an entry from the four fields the core works with
    pub fn new(menue_text: &str, bezeichnung: &str, menue_gruppe: i64, gesperrt: bool) -> Self {
        MenuEntry {
            menue_text: menue_text.to_string(),
            bezeichnung: bezeichnung.to_string(),
            menue_gruppe,
            gesperrt,
            ..Default::default()
        }
    }
}

// ============================================================================
// LENIENT FIELD READERS
// ============================================================================
// The feed is produced by JavaScript: numbers arrive as floats, absent values
// as null. A single odd field must not cost the whole day.

fn text_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// Integers as-is; floats and numeric strings are floored; anything else is 0
fn group_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let number = match Value::deserialize(deserializer)? {
        Value::Number(n) => match n.as_i64() {
            Some(whole) => return Ok(whole),
            None => n.as_f64(),
        },
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    Ok(number
        .filter(|f| f.is_finite())
        .map(|f| f.floor() as i64)
        .unwrap_or_default())
}

/// JavaScript truthiness: false, 0, "" and null are false
fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
        Value::Null => false,
    })
}

// ============================================================================
// DERIVED ANNEX
// ============================================================================

/// Everything the parser derives from `menueText`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuAnnex {
    /// Display lines joined with `<br/>`
    pub menue_text_with_br: String,

    /// Display lines joined with a single space
    pub menue_text_with_spaces: String,

    pub additive_codes: Vec<String>,
    pub additive_descriptions: Vec<String>,
    pub allergen_codes: Vec<String>,
    pub allergen_descriptions: Vec<String>,
}

/// A copy of the raw entry plus its annex
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedMenuEntry {
    #[serde(flatten)]
    pub entry: MenuEntry,

    pub processed: MenuAnnex,
}

impl ProcessedMenuEntry {
    pub fn bezeichnung(&self) -> &str {
        &self.entry.bezeichnung
    }

    pub fn menue_gruppe(&self) -> i64 {
        self.entry.menue_gruppe
    }

    pub fn is_locked(&self) -> bool {
        self.entry.gesperrt
    }

    /// Additive (code, description) pairs; codes without a table entry are skipped
    pub fn additives(&self) -> Vec<(&str, &'static str)> {
        pair_with_descriptions(&self.processed.additive_codes, crate::reference::additive_description)
    }

    /// Allergen (code, description) pairs; codes without a table entry are skipped
    pub fn allergens(&self) -> Vec<(&str, &'static str)> {
        pair_with_descriptions(&self.processed.allergen_codes, crate::reference::allergen_description)
    }
}

fn pair_with_descriptions<'a>(
    codes: &'a [String],
    describe: fn(&str) -> Option<&'static str>,
) -> Vec<(&'a str, &'static str)> {
    codes
        .iter()
        .filter_map(|code| describe(code).map(|d| (code.as_str(), d)))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_feed_record() {
        let json = r#"{
            "allergeneIds": [1, 7],
            "bestellbarWenn": [],
            "bezeichnung": "Menü 1",
            "gesperrt": false,
            "inhaltsstoffeIds": [],
            "zusatzstoffeIds": [2],
            "kurzBez": "M1",
            "mehrfachbestellbar": false,
            "menueGruppe": 3,
            "menueNr": 1,
            "menueText": "Gulasch (1)[br]mit Nudeln",
            "menueTyp": "HG",
            "menueId": "abc",
            "portionsGroesse": 1,
            "naehrwertMassTyp": "100g",
            "naehrwerte": [],
            "symbol": null,
            "splanId": "42"
        }"#;

        let entry: MenuEntry = serde_json::from_str(json).unwrap();

        assert_eq!(entry.bezeichnung, "Menü 1");
        assert_eq!(entry.menue_gruppe, 3);
        assert_eq!(entry.menue_text, "Gulasch (1)[br]mit Nudeln");
        assert!(!entry.gesperrt);
        assert_eq!(entry.extra["kurzBez"], "M1");
        assert_eq!(entry.extra["allergeneIds"], serde_json::json!([1, 7]));
        assert_eq!(entry.extra["symbol"], Value::Null);
        assert!(!entry.extra.contains_key("menueText"));
    }

    #[test]
    fn test_null_and_off_type_fields_still_read() {
        let json = r#"{
            "allergeneIds": null,
            "naehrwerte": null,
            "menueId": 17,
            "portionsGroesse": "groß",
            "menueGruppe": 2.0,
            "menueText": "Eintopf (8)[br]Brot",
            "bezeichnung": null,
            "gesperrt": null
        }"#;

        let entry: MenuEntry = serde_json::from_str(json).unwrap();

        assert_eq!(entry.menue_gruppe, 2);
        assert_eq!(entry.menue_text, "Eintopf (8)[br]Brot");
        assert_eq!(entry.bezeichnung, "");
        assert!(!entry.gesperrt);
        assert_eq!(entry.extra["menueId"], 17);
        assert_eq!(entry.extra["allergeneIds"], Value::Null);
    }

    #[test]
    fn test_menue_gruppe_spellings() {
        let gruppe = |raw: &str| {
            serde_json::from_str::<MenuEntry>(&format!(r#"{{"menueGruppe": {}}}"#, raw))
                .unwrap()
                .menue_gruppe
        };

        assert_eq!(gruppe("3"), 3);
        assert_eq!(gruppe("-1"), -1);
        assert_eq!(gruppe("4.0"), 4);
        assert_eq!(gruppe("2.5"), 2);
        assert_eq!(gruppe(r#""7""#), 7);
        assert_eq!(gruppe("null"), 0);
        assert_eq!(gruppe(r#""Hauptgang""#), 0);
    }

    #[test]
    fn test_gesperrt_follows_truthiness() {
        let locked = |raw: &str| {
            serde_json::from_str::<MenuEntry>(&format!(r#"{{"gesperrt": {}}}"#, raw))
                .unwrap()
                .gesperrt
        };

        assert!(locked("true"));
        assert!(locked("1"));
        assert!(!locked("0"));
        assert!(!locked(r#""""#));
        assert!(!locked("null"));
    }

    #[test]
    fn test_sparse_record_uses_defaults() {
        let entry: MenuEntry = serde_json::from_str(r#"{"bezeichnung": "Dessert"}"#).unwrap();

        assert_eq!(entry, MenuEntry::new("", "Dessert", 0, false));
    }

    #[test]
    fn test_processed_entry_serializes_flat_with_annex() {
        let processed = ProcessedMenuEntry {
            entry: MenuEntry::new("Suppe", "Menü 2", 1, false),
            processed: MenuAnnex {
                menue_text_with_br: "Suppe".to_string(),
                menue_text_with_spaces: "Suppe".to_string(),
                ..Default::default()
            },
        };

        let value = serde_json::to_value(&processed).unwrap();

        assert_eq!(value["bezeichnung"], "Menü 2");
        assert_eq!(value["menueGruppe"], 1);
        assert_eq!(value["processed"]["menueTextWithBr"], "Suppe");
        assert_eq!(value["processed"]["additiveCodes"], serde_json::json!([]));
        assert!(value.get("kurzBez").is_none());
    }

    #[test]
    fn test_pass_through_fields_survive_processing_output() {
        let entry: MenuEntry =
            serde_json::from_str(r#"{"bezeichnung": "Menü 1", "kurzBez": "M1", "naehrwerte": null}"#).unwrap();
        let processed = ProcessedMenuEntry { entry, processed: MenuAnnex::default() };

        let value = serde_json::to_value(&processed).unwrap();

        assert_eq!(value["kurzBez"], "M1");
        assert_eq!(value["naehrwerte"], Value::Null);
        assert_eq!(value["bezeichnung"], "Menü 1");
    }

    #[test]
    fn test_code_description_pairs() {
        let processed = ProcessedMenuEntry {
            entry: MenuEntry::default(),
            processed: MenuAnnex {
                additive_codes: vec!["1".to_string(), "15".to_string()],
                allergen_codes: vec!["G".to_string(), "Z".to_string()],
                ..Default::default()
            },
        };

        assert_eq!(
            processed.additives(),
            vec![("1", "mit Konservierungsstoff"), ("15", "mit Schweinefleisch")]
        );
        assert_eq!(processed.allergens(), vec![("G", "Milch und Milcherzeugnisse")]);
    }
}
