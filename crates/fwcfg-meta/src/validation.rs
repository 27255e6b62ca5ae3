//! Identifier validation for setting names

use regex::Regex;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Check whether `name` is usable as a preprocessor identifier.
///
/// Setting ids, environment keys and guard names all share this rule.
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_macro_style_names() {
        assert!(is_valid_identifier("USE_DISPLAY_ST7789"));
        assert!(is_valid_identifier("_USER_CONFIG_OVERRIDE_H_"));
        assert!(is_valid_identifier("MY_DNS2"));
    }

    #[test]
    fn rejects_malformed_names() {
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2FAST"));
        assert!(!is_valid_identifier("USE-SPI"));
        assert!(!is_valid_identifier("USE SPI"));
    }
}
