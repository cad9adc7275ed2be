//! Conversions applied to raw operator arguments.

use std::fs::File;
use std::path::Path;

use crate::errors::Rejected;
use crate::pipeline::Value;

/// Parses decimal or `0x`-prefixed hexadecimal text.
///
/// # Errors
///
/// [`Rejected`] for anything else, including an empty hex body.
pub fn to_int(text: &str) -> Result<i64, Rejected> {
    let parsed = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(digits) => i64::from_str_radix(digits, 16),
        None => text.parse::<i64>(),
    };
    parsed.map_err(|_| Rejected)
}

/// Transform form of [`to_int`]; integers pass through.
///
/// # Errors
///
/// [`Rejected`] when the text is not a number.
pub fn int_value(value: Value) -> Result<Value, Rejected> {
    match value {
        Value::Int(_) => Ok(value),
        Value::Text(text) => to_int(&text).map(Value::Int),
    }
}

/// Replaces the token `pc` (any case) with the program counter in decimal.
#[must_use]
pub fn substitute_pc(pc: u16, value: Value) -> Value {
    match value {
        Value::Text(text) if text.eq_ignore_ascii_case("pc") => Value::Text(pc.to_string()),
        other => other,
    }
}

/// Whether `path` names a regular file that can be opened for reading.
#[must_use]
pub fn file_accessible(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{file_accessible, int_value, substitute_pc, to_int};
    use crate::errors::Rejected;
    use crate::pipeline::Value;

    #[rstest]
    #[case("10", Ok(10))]
    #[case("0x0a", Ok(10))]
    #[case("0XFF", Ok(255))]
    #[case("-3", Ok(-3))]
    #[case("0x", Err(Rejected))]
    #[case("ten", Err(Rejected))]
    #[case("", Err(Rejected))]
    #[case("-0x5", Err(Rejected))]
    fn parses_decimal_and_hex(#[case] text: &str, #[case] expected: Result<i64, Rejected>) {
        assert_eq!(to_int(text), expected);
    }

    #[test]
    fn int_value_passes_integers_through() {
        assert_eq!(int_value(Value::Int(7)), Ok(Value::Int(7)));
        assert_eq!(int_value(Value::Text("0x10".into())), Ok(Value::Int(16)));
    }

    #[rstest]
    #[case("pc")]
    #[case("PC")]
    #[case("Pc")]
    fn pc_token_is_case_insensitive(#[case] token: &str) {
        assert_eq!(
            substitute_pc(0xE003, Value::Text(token.into())),
            Value::Text("57347".into())
        );
    }

    #[test]
    fn other_tokens_are_untouched() {
        assert_eq!(
            substitute_pc(0, Value::Text("0x10".into())),
            Value::Text("0x10".into())
        );
    }

    #[test]
    fn accessibility_requires_a_regular_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let file = dir.path().join("rom.bin");
        std::fs::write(&file, [0u8; 4]).expect("write temp file");

        assert!(file_accessible(&file));
        assert!(!file_accessible(dir.path()));
        assert!(!file_accessible(&dir.path().join("missing.bin")));
    }
}
