//! Identifier allocation: `<category><n>_<entityCode>`.
//!
//! `n` is the smallest non-negative integer not used by any existing identifier and the
//! category is `CATEGORIES[n % CATEGORIES.len()]`, so category and number are derived
//! together and never chosen independently.

use std::collections::HashSet;

/// Fixed, ordered identifier categories.
pub const CATEGORIES: [&str; 6] = ["eth", "wlan", "br", "lo", "bond", "vlan"];

/// Split an identifier into its `<category><n>` prefix and the remainder at the first `_`.
pub fn split_identifier(identifier: &str) -> Option<(&str, &str)> {
    identifier.split_once('_')
}

/// Segment between the first and second `_`, if the identifier has a separator.
pub fn code_segment(identifier: &str) -> Option<&str> {
    identifier.split('_').nth(1)
}

/// Entity code embedded in an identifier, or the input itself when it carries no prefix
/// (bare codes are accepted for lookups prior to registration).
pub fn entity_code(identifier: &str) -> &str {
    code_segment(identifier).unwrap_or(identifier)
}

/// Category of an identifier, if its prefix starts with a known one.
pub fn category_of(identifier: &str) -> Option<&'static str> {
    let (prefix, _) = split_identifier(identifier)?;
    CATEGORIES
        .into_iter()
        .find(|category| prefix.starts_with(category))
}

/// Number used by an identifier's prefix.
///
/// Returns `None` for identifiers with no `_`, an unknown category, or no digits after the
/// category (e.g. `lo_068270`).
pub fn used_number(identifier: &str) -> Option<u32> {
    let (prefix, _) = split_identifier(identifier)?;
    let category = category_of(identifier)?;
    let digits: String = prefix[category.len()..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Smallest non-negative integer not used by any of `identifiers`.
pub fn next_number<'a, I>(identifiers: I) -> u32
where
    I: IntoIterator<Item = &'a str>,
{
    let used: HashSet<u32> = identifiers.into_iter().filter_map(used_number).collect();
    (0..).find(|n| !used.contains(n)).unwrap_or(u32::MAX)
}

/// Category assigned to number `n`.
pub fn category_for(n: u32) -> &'static str {
    CATEGORIES[n as usize % CATEGORIES.len()]
}

/// Allocate a new identifier for `entity_code` given the identifiers already registered.
pub fn allocate<'a, I>(identifiers: I, entity_code: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let n = next_number(identifiers);
    format!("{}{}_{}", category_for(n), n, entity_code)
}

/// Whether `code` is acceptable on the add-by-code path (exactly six ASCII digits).
pub fn is_valid_entity_code(code: &str) -> bool {
    code.len() == 6 && code.chars().all(|c| c.is_ascii_digit())
}
