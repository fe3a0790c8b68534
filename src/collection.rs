// 📚 Menu Collection Processor
// Parse every entry of a day and order by menu group (highest first)

use crate::menu::{MenuEntry, ProcessedMenuEntry};
use crate::parser::process;
use std::cmp::Ordering;

/// Process all entries and sort them by `menueGruppe`, descending.
///
/// `sort_by` is stable: entries of the same group keep their input order.
pub fn process_and_sort<'a, I>(entries: I) -> Vec<ProcessedMenuEntry>
where
    I: IntoIterator<Item = &'a MenuEntry>,
{
    let mut processed: Vec<ProcessedMenuEntry> = entries.into_iter().map(process).collect();
    processed.sort_by(|a, b| b.menue_gruppe().cmp(&a.menue_gruppe()));
    processed
}

/// The feed keys a day's menus by menu number ("1", "2", ... "10").
///
/// Takes the pairs in document order and returns the entries in the order a
/// JavaScript object enumerates its keys: integer-like keys ascending by
/// value, then the remaining keys in document order.
pub fn in_feed_order(menues: &[(String, MenuEntry)]) -> Vec<&MenuEntry> {
    let mut keyed: Vec<(Option<u32>, &MenuEntry)> = menues
        .iter()
        .map(|(key, entry)| (index_key(key), entry))
        .collect();

    keyed.sort_by(|a, b| match (a.0, b.0) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    keyed.into_iter().map(|(_, entry)| entry).collect()
}

/// Canonical array-index form: digits only, no leading zero (except "0")
fn index_key(key: &str) -> Option<u32> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<u32>().ok().filter(|v| *v < u32::MAX)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn named(bezeichnung: &str, gruppe: i64) -> MenuEntry {
        MenuEntry::new("Essen", bezeichnung, gruppe, false)
    }

    #[test]
    fn test_sort_descending_and_stable() {
        let entries = vec![
            named("first-3", 3),
            named("only-1", 1),
            named("second-3", 3),
            named("only-2", 2),
        ];

        let sorted = process_and_sort(&entries);
        let names: Vec<&str> = sorted.iter().map(|p| p.bezeichnung()).collect();
        let groups: Vec<i64> = sorted.iter().map(|p| p.menue_gruppe()).collect();

        assert_eq!(groups, vec![3, 3, 2, 1]);
        assert_eq!(names, vec!["first-3", "second-3", "only-2", "only-1"]);
    }

    #[test]
    fn test_every_entry_is_processed() {
        let entries = vec![
            MenuEntry::new("Suppe (1)[br]Brot", "A", 1, false),
            MenuEntry::new("Salat (A)[br]Dressing", "B", 2, true),
        ];

        let sorted = process_and_sort(&entries);

        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted[0].processed.menue_text_with_br, "Salat (A)<br/>Dressing");
        assert_eq!(sorted[0].processed.allergen_codes, vec!["A"]);
        assert!(sorted[0].is_locked());
        assert_eq!(sorted[1].processed.menue_text_with_br, "Suppe<br/>Brot");
        assert_eq!(sorted[1].processed.additive_codes, vec!["1"]);
    }

    #[test]
    fn test_empty_collection() {
        let entries: Vec<MenuEntry> = Vec::new();
        assert!(process_and_sort(&entries).is_empty());
    }

    #[test]
    fn test_negative_groups_sort_last() {
        let entries = vec![named("neg", -1), named("zero", 0), named("pos", 5)];

        let names: Vec<String> = process_and_sort(&entries)
            .into_iter()
            .map(|p| p.entry.bezeichnung)
            .collect();

        assert_eq!(names, vec!["pos", "zero", "neg"]);
    }

    #[test]
    fn test_feed_order_is_numeric() {
        let menues = vec![
            ("10".to_string(), named("ten", 1)),
            ("2".to_string(), named("two", 1)),
            ("extra".to_string(), named("extra", 1)),
            ("1".to_string(), named("one", 1)),
            ("01".to_string(), named("padded", 1)),
        ];

        let names: Vec<&str> = in_feed_order(&menues)
            .into_iter()
            .map(|e| e.bezeichnung.as_str())
            .collect();

        assert_eq!(names, vec!["one", "two", "ten", "extra", "padded"]);
    }

    #[test]
    fn test_feed_order_feeds_stable_sort() {
        let menues = vec![
            ("10".to_string(), named("late", 2)),
            ("9".to_string(), named("early", 2)),
        ];

        let sorted = process_and_sort(in_feed_order(&menues));

        assert_eq!(sorted[0].bezeichnung(), "early");
        assert_eq!(sorted[1].bezeichnung(), "late");
    }
}
