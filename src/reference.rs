// 📖 Reference Tables - Zusatzstoffe & Allergene
// Static lookup tables for the codes embedded in menu texts

use serde::Serialize;

// ============================================================================
// TABLES
// ============================================================================

/// Allergen letter codes (historical letter set, B sits at the end of the list)
pub const ALLERGENE: &[(&str, &str)] = &[
    ("A", "Glutenhaltige Getreide"),
    ("C", "Eier- und Eiererzeugnisse"),
    ("D", "Fisch- und Fischerzeugnisse"),
    ("E", "Erdnüsse und Erdnusserzeugnisse"),
    ("F", "Soja und Sojaerzeugnisse"),
    ("G", "Milch und Milcherzeugnisse"),
    ("H", "Schalenfrüchte"),
    ("I", "Sellerie und Sellerieerzeugnisse"),
    ("J", "Senf und Senferzeugnisse"),
    ("K", "Sesamsamen"),
    ("L", "Schwefeldioxid und Sulfite"),
    ("M", "Lupinen"),
    ("N", "Weichtiere"),
    ("B", "Krebstiere"),
];

/// Additive number codes "1".."15"
pub const ZUSATZSTOFFE: &[(&str, &str)] = &[
    ("1", "mit Konservierungsstoff"),
    ("2", "mit Farbstoff"),
    ("3", "mit Antioxydationsmittel"),
    ("4", "mit Süßungsmittel Saccarin"),
    ("5", "mit Süßungsmittel Cyclamat"),
    ("6", "mit Süßungsmittel Aspartam"),
    ("7", "mit Süßungsmittel Acesulfam"),
    ("8", "mit Phosphat"),
    ("9", "geschwefelt"),
    ("10", "chininhaltig"),
    ("11", "coffeinhaltig"),
    ("12", "mit Geschmacksverstärker"),
    ("13", "geschwärzt"),
    ("14", "gewachst"),
    ("15", "mit Schweinefleisch"),
];

// ============================================================================
// LOOKUPS
// ============================================================================

fn lookup(table: &'static [(&'static str, &'static str)], code: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, description)| *description)
}

/// Description for an allergen letter, e.g. "G" → "Milch und Milcherzeugnisse"
pub fn allergen_description(code: &str) -> Option<&'static str> {
    lookup(ALLERGENE, code)
}

/// Description for an additive number, e.g. "1" → "mit Konservierungsstoff"
pub fn additive_description(code: &str) -> Option<&'static str> {
    lookup(ZUSATZSTOFFE, code)
}

/// One table row, as exposed by the JSON API
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceRow {
    pub code: &'static str,
    pub description: &'static str,
}

/// Both tables in a serializable form
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceTables {
    pub zusatzstoffe: Vec<ReferenceRow>,
    pub allergene: Vec<ReferenceRow>,
}

impl ReferenceTables {
    pub fn snapshot() -> Self {
        let rows = |table: &'static [(&'static str, &'static str)]| {
            table
                .iter()
                .map(|&(code, description)| ReferenceRow { code, description })
                .collect::<Vec<_>>()
        };

        ReferenceTables {
            zusatzstoffe: rows(ZUSATZSTOFFE),
            allergene: rows(ALLERGENE),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
