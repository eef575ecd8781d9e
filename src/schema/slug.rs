//! Deriving URL- and storage-safe keys from human labels.

use std::sync::OnceLock;

use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;

fn separator_run() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static pattern compiles"))
}

/// Lowercases `label`, turns every run of non-alphanumeric characters into a
/// single hyphen and trims hyphens from both ends.
///
/// ```rust
/// use formkit::schema::slugify;
///
/// assert_eq!(slugify("  Full Name (as on ID) "), "full-name-as-on-id");
/// assert_eq!(slugify("!!!"), "");
/// ```
pub fn slugify(label: &str) -> String {
    let lowered = label.to_lowercase();
    separator_run()
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Returns `base` if it is free, otherwise the first free `base-N` (N >= 2).
pub fn disambiguate(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// A random lowercase alphanumeric suffix of `len` characters.
pub fn random_suffix(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("First   Name"), "first-name");
        assert_eq!(slugify("e-mail / phone"), "e-mail-phone");
        assert_eq!(slugify("--Lead--"), "lead");
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        assert_eq!(slugify("Café Order"), "caf-order");
    }

    #[test]
    fn test_slugify_keeps_digits() {
        assert_eq!(slugify("Address Line 2"), "address-line-2");
    }

    #[test]
    fn test_disambiguate() {
        let taken = ["name", "name-2"];
        assert_eq!(disambiguate("email", |c| taken.contains(&c)), "email");
        assert_eq!(disambiguate("name", |c| taken.contains(&c)), "name-3");
    }

    #[test]
    fn test_random_suffix_shape() {
        let suffix = random_suffix(6);
        assert_eq!(suffix.len(), 6);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
