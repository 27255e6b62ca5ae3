//! Setting types and typed values
//!
//! Values arrive from three places: TOML catalogs and overlays (already
//! typed), directive overlays and environment inputs (raw text). Everything is
//! carried as a [`RawValue`] until it is coerced against the declared
//! [`SettingType`] of the setting it targets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Declared type of a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    /// Feature toggle: defined (enabled) or undefined (disabled)
    Bool,
    /// Free-form text, emitted quoted
    String,
    /// Signed 64-bit integer
    Integer,
    /// Dotted-quad IPv4 address, emitted quoted
    Ip,
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Ip => write!(f, "ip"),
        }
    }
}

/// An uncoerced value as supplied by a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl RawValue {
    /// Convert a TOML value, rejecting shapes no setting can hold
    pub fn from_toml(value: &toml::Value) -> std::result::Result<Self, ValueError> {
        match value {
            toml::Value::Boolean(b) => Ok(Self::Bool(*b)),
            toml::Value::Integer(i) => Ok(Self::Integer(*i)),
            toml::Value::String(s) => Ok(Self::Text(s.clone())),
            other => Err(ValueError::Unsupported {
                found: other.type_str().to_string(),
            }),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Bool(b) => format!("bool {}", b),
            Self::Integer(i) => format!("integer {}", i),
            Self::Text(t) => format!("'{}'", t),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Text(t) => write!(f, "{}", t),
        }
    }
}

/// A value that matches its setting's declared type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    String(String),
    Ip(Ipv4Addr),
}

impl Value {
    /// Whether the value counts as "defined" to a downstream `#ifdef`.
    ///
    /// Only a disabled flag is undefined; every valued setting is defined.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Bool(false))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ip(&self) -> Option<Ipv4Addr> {
        match self {
            Self::Ip(ip) => Some(*ip),
            _ => None,
        }
    }

    /// Render as a C preprocessor replacement list.
    ///
    /// Flags have no replacement text and return `None`.
    pub fn to_c_literal(&self) -> Option<String> {
        match self {
            Self::Bool(_) => None,
            Self::Integer(i) => Some(i.to_string()),
            Self::String(s) => Some(quote_c(s)),
            Self::Ip(ip) => Some(quote_c(&ip.to_string())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::String(s) => write!(f, "\"{}\"", s),
            Self::Ip(ip) => write!(f, "{}", ip),
        }
    }
}

fn quote_c(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Why a raw value could not be coerced
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: SettingType,
        found: String,
    },

    #[error("'{text}' is not a valid {expected} literal")]
    InvalidLiteral { expected: SettingType, text: String },

    #[error("integer literal '{text}' is out of range")]
    OutOfRange { text: String },

    #[error("unsupported value of type {found}")]
    Unsupported { found: String },
}

impl SettingType {
    /// Coerce a raw value to this type
    pub fn coerce(self, raw: &RawValue) -> std::result::Result<Value, ValueError> {
        match (self, raw) {
            (Self::Bool, RawValue::Bool(b)) => Ok(Value::Bool(*b)),
            (Self::Bool, RawValue::Integer(i)) if *i == 0 || *i == 1 => Ok(Value::Bool(*i == 1)),
            (Self::Bool, RawValue::Text(t)) => parse_bool(t)
                .map(Value::Bool)
                .ok_or_else(|| self.invalid(t)),

            (Self::Integer, RawValue::Integer(i)) => Ok(Value::Integer(*i)),
            (Self::Integer, RawValue::Text(t)) => parse_integer(t).map(Value::Integer),

            (Self::String, RawValue::Text(t)) => Ok(Value::String(string_literal(t))),

            (Self::Ip, RawValue::Text(t)) => unquote(t)
                .parse::<Ipv4Addr>()
                .map(Value::Ip)
                .map_err(|_| self.invalid(t)),

            (expected, raw) => Err(ValueError::TypeMismatch {
                expected,
                found: raw.describe(),
            }),
        }
    }

    fn invalid(self, text: &str) -> ValueError {
        ValueError::InvalidLiteral {
            expected: self,
            text: text.to_string(),
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match unquote(text).to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn parse_integer(text: &str) -> std::result::Result<i64, ValueError> {
    let trimmed = text.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let (radix, body) = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, digits),
    };

    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return Err(SettingType::Integer.invalid(text));
    }

    let magnitude = i128::from_str_radix(body, radix).map_err(|_| ValueError::OutOfRange {
        text: text.to_string(),
    })?;
    let signed = if negative { -magnitude } else { magnitude };
    i64::try_from(signed).map_err(|_| ValueError::OutOfRange {
        text: text.to_string(),
    })
}

/// The logical string behind a possibly quoted C string literal
///
/// Bare text is taken as is; escapes are only decoded inside quotes.
fn string_literal(text: &str) -> String {
    let trimmed = text.trim();
    let quoted = unquote(trimmed);
    if quoted.len() == trimmed.len() {
        return trimmed.to_string();
    }

    let mut out = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(c @ ('"' | '\\' | '\'')) => out.push(c),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Strip one pair of surrounding double quotes, if present
pub fn unquote(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("true", true)]
    #[case("TRUE", true)]
    #[case("1", true)]
    #[case("on", true)]
    #[case("no", false)]
    #[case("0", false)]
    #[case("\"false\"", false)]
    fn bool_literals(#[case] text: &str, #[case] expected: bool) {
        let value = SettingType::Bool
            .coerce(&RawValue::Text(text.to_string()))
            .unwrap();
        assert_eq!(value, Value::Bool(expected));
    }

    #[rstest]
    #[case("4617", 4617)]
    #[case("-12", -12)]
    #[case("+7", 7)]
    #[case("0x1F", 31)]
    #[case(" 1883 ", 1883)]
    fn integer_literals(#[case] text: &str, #[case] expected: i64) {
        let value = SettingType::Integer
            .coerce(&RawValue::Text(text.to_string()))
            .unwrap();
        assert_eq!(value, Value::Integer(expected));
    }

    #[test]
    fn integer_out_of_range() {
        let err = SettingType::Integer
            .coerce(&RawValue::Text("99999999999999999999".into()))
            .unwrap_err();
        assert!(matches!(err, ValueError::OutOfRange { .. }));
    }

    #[test]
    fn integer_rejects_garbage() {
        let err = SettingType::Integer
            .coerce(&RawValue::Text("12abc".into()))
            .unwrap_err();
        assert!(matches!(err, ValueError::InvalidLiteral { .. }));
    }

    #[test]
    fn string_strips_quotes() {
        let value = SettingType::String
            .coerce(&RawValue::Text("\"YourSSID\"".into()))
            .unwrap();
        assert_eq!(value.as_str(), Some("YourSSID"));
    }

    #[rstest]
    #[case(r#""a\"b""#, "a\"b")]
    #[case(r#""C:\\fw""#, "C:\\fw")]
    #[case(r#""line\nbreak""#, "line\nbreak")]
    #[case(r#"bare\"text"#, "bare\\\"text")]
    fn string_escapes_decoded_inside_quotes(#[case] text: &str, #[case] expected: &str) {
        let value = SettingType::String
            .coerce(&RawValue::Text(text.to_string()))
            .unwrap();
        assert_eq!(value.as_str(), Some(expected));
    }

    #[test]
    fn quoted_string_survives_c_round_trip() {
        let written = r#""a\"b\\c""#;
        let value = SettingType::String
            .coerce(&RawValue::Text(written.to_string()))
            .unwrap();
        assert_eq!(value.to_c_literal().as_deref(), Some(written));
    }

    #[test]
    fn ip_parses_quoted_address() {
        let value = SettingType::Ip
            .coerce(&RawValue::Text("\"192.168.1.99\"".into()))
            .unwrap();
        assert_eq!(value.as_ip(), Some(Ipv4Addr::new(192, 168, 1, 99)));
    }

    #[test]
    fn ip_rejects_hostname() {
        let err = SettingType::Ip
            .coerce(&RawValue::Text("gateway.local".into()))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "'gateway.local' is not a valid ip literal"
        );
    }

    #[test]
    fn type_mismatch_names_both_sides() {
        let err = SettingType::Ip.coerce(&RawValue::Bool(true)).unwrap_err();
        assert_eq!(err.to_string(), "expected ip, found bool true");
    }

    #[test]
    fn c_literals() {
        assert_eq!(Value::Bool(true).to_c_literal(), None);
        assert_eq!(Value::Integer(42).to_c_literal().as_deref(), Some("42"));
        assert_eq!(
            Value::String("a \"b\"".into()).to_c_literal().as_deref(),
            Some("\"a \\\"b\\\"\"")
        );
        assert_eq!(
            Value::Ip(Ipv4Addr::new(10, 0, 0, 1)).to_c_literal().as_deref(),
            Some("\"10.0.0.1\"")
        );
    }

    #[test]
    fn only_disabled_flags_are_undefined() {
        assert!(!Value::Bool(false).is_enabled());
        assert!(Value::Bool(true).is_enabled());
        assert!(Value::Integer(0).is_enabled());
        assert!(Value::String(String::new()).is_enabled());
    }
}
