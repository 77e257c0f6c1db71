//! Scalar value encoding for nGQL statements.
//!
//! Every value interpolated into a statement goes through this module; no
//! other module formats literals. String escaping is the sole injection
//! defense, so row values can never break out of their literal or smuggle
//! extra clauses into a statement.

/// Escape the characters that could terminate or corrupt an nGQL string
/// literal. Backslash first, then quote, newline, carriage return, tab.
pub fn escape_string(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Render a double-quoted nGQL string literal.
pub fn string_literal(value: &str) -> String {
    format!("\"{}\"", escape_string(value))
}

/// Render an int literal. Missing values collapse to the column default 0.
pub fn int_literal(value: Option<i64>) -> String {
    value.unwrap_or(0).to_string()
}

/// Render a double literal. Missing, NaN, and infinite values collapse to
/// the column default 0.0. Whole numbers keep a decimal point so the
/// literal stays a double.
pub fn float_literal(value: Option<f64>) -> String {
    let v = match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    };
    if v == v.trunc() {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reverse the escape sequences produced by [`escape_string`].
    fn unescape(escaped: &str) -> String {
        let mut out = String::with_capacity(escaped.len());
        let mut chars = escaped.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some(other) => panic!("unexpected escape: \\{other}"),
                None => panic!("dangling backslash"),
            }
        }
        out
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("plain"), "plain");
        assert_eq!(escape_string("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(escape_string("a\\b"), "a\\\\b");
        assert_eq!(escape_string("line\nbreak"), "line\\nbreak");
        assert_eq!(escape_string("tab\there"), "tab\\there");
    }

    #[test]
    fn test_escape_round_trips() {
        for original in [
            "backslash \\ quote \" newline \n cr \r tab \t",
            "\\n is not a newline",
            "\\\"",
            "trailing backslash \\",
            "",
        ] {
            assert_eq!(unescape(&escape_string(original)), original);
        }
    }

    #[test]
    fn test_string_literal_cannot_break_out() {
        let hostile = "x\", (0): (\"injected";
        let literal = string_literal(hostile);
        // Every interior quote must be escaped: the only unescaped quotes
        // are the literal's own delimiters.
        let interior = &literal[1..literal.len() - 1];
        let mut prev_backslashes = 0;
        for c in interior.chars() {
            if c == '"' {
                assert!(prev_backslashes % 2 == 1, "unescaped quote in {literal}");
            }
            prev_backslashes = if c == '\\' { prev_backslashes + 1 } else { 0 };
        }
    }

    #[test]
    fn test_numeric_literals_default_missing_values() {
        assert_eq!(int_literal(None), "0");
        assert_eq!(int_literal(Some(42)), "42");
        assert_eq!(float_literal(None), "0.0");
        assert_eq!(float_literal(Some(f64::NAN)), "0.0");
        assert_eq!(float_literal(Some(f64::INFINITY)), "0.0");
    }

    #[test]
    fn test_float_literal_formatting() {
        assert_eq!(float_literal(Some(0.0)), "0.0");
        assert_eq!(float_literal(Some(3.0)), "3.0");
        assert_eq!(float_literal(Some(-1.5)), "-1.5");
        assert_eq!(float_literal(Some(0.25)), "0.25");
    }
}
