// 🧾 Menu Text Parser
// Turns one raw `menueText` into display text + resolved Zusatzstoffe/Allergene
//
// Two independent passes:
// - Line cleaner: split on "[br]", drop the legend line, strip additive groups,
//   normalize comma spacing
// - Code scanner: read code groups from the UNSPLIT text (legend line included)

use crate::codes::{has_parenthetical, scan_codes, strip_groups, CodeShape};
use crate::menu::{MenuAnnex, MenuEntry, ProcessedMenuEntry};

/// Line-break marker used by the feed inside `menueText`
pub const BR_MARKER: &str = "[br]";

/// Line-break marker written into `menueTextWithBr`
pub const BR_OUTPUT: &str = "<br/>";

// ============================================================================
// ENTRY POINT
// ============================================================================

/// Process one entry. The source entry is left untouched; the result owns a copy.
pub fn process(entry: &MenuEntry) -> ProcessedMenuEntry {
    ProcessedMenuEntry {
        entry: entry.clone(),
        processed: annex_for(&entry.menue_text),
    }
}

/// Derive the full annex from a raw menu text
pub fn annex_for(menue_text: &str) -> MenuAnnex {
    let lines = clean_lines(menue_text);

    let additive_codes = scan_codes(menue_text, CodeShape::Additive);
    let allergen_codes = scan_codes(menue_text, CodeShape::Allergen);

    MenuAnnex {
        menue_text_with_br: lines.join(BR_OUTPUT),
        menue_text_with_spaces: lines.join(" "),
        additive_descriptions: resolve(&additive_codes, CodeShape::Additive),
        additive_codes,
        allergen_descriptions: resolve(&allergen_codes, CodeShape::Allergen),
        allergen_codes,
    }
}

// ============================================================================
// LINE CLEANER
// ============================================================================

/// Display lines of a menu text, legend removed and markers stripped
pub fn clean_lines(menue_text: &str) -> Vec<String> {
    let mut lines: Vec<&str> = menue_text.split(BR_MARKER).map(str::trim).collect();

    // Trailing legend line, e.g. "Allergene: (A,C,G)"
    if lines.last().is_some_and(|last| has_parenthetical(last)) {
        lines.pop();
    }

    lines
        .into_iter()
        .map(|line| space_after_commas(&strip_groups(line, CodeShape::Additive)))
        .collect()
}

/// "Reis,Salat" → "Reis, Salat"; commas already followed by whitespace stay as they are
pub fn space_after_commas(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 8);
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        if c == ',' && chars.peek().is_some_and(|next| !next.is_whitespace()) {
            out.push(' ');
        }
    }

    out
}

// ============================================================================
// CODE RESOLUTION
// ============================================================================

fn resolve(codes: &[String], shape: CodeShape) -> Vec<String> {
    codes
        .iter()
        .filter_map(|code| shape.describe(code))
        .map(str::to_string)
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
