// 🔤 Code Groups - Shapes of the markers embedded in menu texts
//
// Menu texts carry reference codes in parentheses:
// - Zusatzstoffe: "(1)", "(2,3)", "(1,15)"  → numbers 1-15, no leading zeros
// - Allergene:    "(A)", "(A,G,I)"          → single uppercase letters
//
// Both the line cleaner (parser.rs) and the whole-text scanner use the
// definitions below, so stripping and extraction always agree on what a
// code group is.

use crate::reference::{additive_description, allergen_description};

// ============================================================================
// CODE SHAPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeShape {
    /// Zusatzstoff number: 1-9 or 10-15
    Additive,

    /// Allergen letter: A-Z
    Allergen,
}

impl CodeShape {
    /// Does a single token (one entry of a comma list) have this shape?
    pub fn accepts(&self, token: &str) -> bool {
        match self {
            CodeShape::Additive => {
                matches!(token.as_bytes(), [b'1'..=b'9'] | [b'1', b'0'..=b'5'])
            }
            CodeShape::Allergen => matches!(token.as_bytes(), [b'A'..=b'Z']),
        }
    }

    /// Resolve a code through the matching reference table
    pub fn describe(&self, code: &str) -> Option<&'static str> {
        match self {
            CodeShape::Additive => additive_description(code),
            CodeShape::Allergen => allergen_description(code),
        }
    }
}

// ============================================================================
// GROUP MATCHING
// ============================================================================

/// A parenthesized code group located in a text (byte offsets, `end` exclusive)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeGroup<'a> {
    pub start: usize,
    pub end: usize,
    pub codes: Vec<&'a str>,
}

/// Read a group of `shape` codes whose opening paren sits at byte `start`
pub fn group_at(text: &str, start: usize, shape: CodeShape) -> Option<CodeGroup<'_>> {
    let inner = text.get(start..)?.strip_prefix('(')?;
    let close = inner.find(')')?;
    let body = &inner[..close];

    let codes: Vec<&str> = body.split(',').collect();
    if !codes.iter().all(|code| shape.accepts(code)) {
        return None;
    }

    Some(CodeGroup {
        start,
        end: start + close + 2,
        codes,
    })
}

/// All non-overlapping groups of `shape`, scanning left to right
pub fn scan_groups(text: &str, shape: CodeShape) -> Vec<CodeGroup<'_>> {
    let mut groups = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('(') {
        let start = pos + offset;
        match group_at(text, start, shape) {
            Some(group) => {
                pos = group.end;
                groups.push(group);
            }
            None => pos = start + 1,
        }
    }

    groups
}

/// Flattened codes of every group, in scan order (duplicates kept)
pub fn scan_codes(text: &str, shape: CodeShape) -> Vec<String> {
    scan_groups(text, shape)
        .into_iter()
        .flat_map(|group| group.codes)
        .map(str::to_string)
        .collect()
}

/// Remove every group of `shape` from a single line.
///
/// When a group sat between two words the surrounding whitespace collapses
/// to one space; the result is trimmed.
pub fn strip_groups(line: &str, shape: CodeShape) -> String {
    let mut out = String::with_capacity(line.len());
    let mut pos = 0;

    for group in scan_groups(line, shape) {
        out.push_str(&line[pos..group.start]);
        pos = group.end;

        if out.ends_with(char::is_whitespace) {
            let rest = &line[pos..];
            pos += rest.len() - rest.trim_start().len();
        }
    }
    out.push_str(&line[pos..]);

    out.trim().to_string()
}

/// Does the line contain "(" + at least one non-")" char + ")"?
///
/// Used to spot the trailing legend line of a menu text.
pub fn has_parenthetical(line: &str) -> bool {
    let mut pos = 0;

    while let Some(offset) = line[pos..].find('(') {
        let open = pos + offset;
        match line[open + 1..].find(')') {
            Some(0) => pos = open + 1,
            Some(_) => return true,
            None => return false,
        }
    }

    false
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_additive_token_shape() {
        for ok in ["1", "9", "10", "15"] {
            assert!(CodeShape::Additive.accepts(ok), "{} should match", ok);
        }
        for bad in ["0", "01", "16", "20", "100", "", "A", " 1"] {
            assert!(!CodeShape::Additive.accepts(bad), "{} should not match", bad);
        }
    }

    #[test]
    fn test_allergen_token_shape() {
        assert!(CodeShape::Allergen.accepts("A"));
        assert!(CodeShape::Allergen.accepts("Z"));
        assert!(!CodeShape::Allergen.accepts("AB"));
        assert!(!CodeShape::Allergen.accepts("a"));
        assert!(!CodeShape::Allergen.accepts("Ä"));
        assert!(!CodeShape::Allergen.accepts("1"));
    }

    #[test]
    fn test_group_at_requires_whole_group() {
        let text = "(1,16)";
        assert_eq!(group_at(text, 0, CodeShape::Additive), None);

        let text = "x (2,3) y";
        let group = group_at(text, 2, CodeShape::Additive).unwrap();
        assert_eq!(group.codes, vec!["2", "3"]);
        assert_eq!(&text[group.start..group.end], "(2,3)");
    }

    #[test]
    fn test_group_rejects_empty_and_spaced_lists() {
        assert!(scan_groups("()", CodeShape::Additive).is_empty());
        assert!(scan_groups("(1,,2)", CodeShape::Additive).is_empty());
        assert!(scan_groups("(1, 2)", CodeShape::Additive).is_empty());
        assert!(scan_groups("(A, G)", CodeShape::Allergen).is_empty());
    }

    #[test]
    fn test_scan_codes_in_order_with_duplicates() {
        let text = "Nudeln (1,2) mit Soße (2) und Käse (A,G) (G)";

        assert_eq!(scan_codes(text, CodeShape::Additive), vec!["1", "2", "2"]);
        assert_eq!(scan_codes(text, CodeShape::Allergen), vec!["A", "G", "G"]);
    }

    #[test]
    fn test_scan_skips_nested_open_paren() {
        assert_eq!(scan_codes("((1))", CodeShape::Additive), vec!["1"]);
        assert_eq!(scan_codes("(unbalanced (3", CodeShape::Additive), Vec::<String>::new());
    }

    #[test]
    fn test_strip_collapses_gap() {
        assert_eq!(
            strip_groups("Chicken Curry (1,2) mit Reis", CodeShape::Additive),
            "Chicken Curry mit Reis"
        );
        assert_eq!(strip_groups("Reis(1) mit Soße", CodeShape::Additive), "Reis mit Soße");
        assert_eq!(strip_groups("(3) Suppe", CodeShape::Additive), "Suppe");
        assert_eq!(strip_groups("Suppe (1)", CodeShape::Additive), "Suppe");
    }

    #[test]
    fn test_strip_leaves_other_parentheses() {
        assert_eq!(
            strip_groups("Salat (A,G) (vegan) (16)", CodeShape::Additive),
            "Salat (A,G) (vegan) (16)"
        );
    }

    #[test]
    fn test_has_parenthetical() {
        assert!(has_parenthetical("Allergene (A,G)"));
        assert!(has_parenthetical("(x)"));
        assert!(has_parenthetical("(()"));
        assert!(!has_parenthetical("() leer"));
        assert!(!has_parenthetical("offen ( ohne Ende"));
        assert!(!has_parenthetical("keine Klammern"));
        assert!(!has_parenthetical(""));
    }
}
