// Log redaction for HTTP request/response dumps.
//
// The API key and the robot's nickname travel in every control payload;
// `cmd`/`act` reveal what the household is doing. All four are masked
// before a payload reaches the log.

use std::sync::LazyLock;

use regex::Regex;

/// Fields masked by [`redact`].
pub const SENSITIVE_KEYS: [&str; 4] = ["ak", "nickName", "cmd", "act"];

const MASK: &str = "XXXXXXXXX";

static PATTERNS: LazyLock<Vec<(Regex, String)>> = LazyLock::new(|| {
    let mut patterns = Vec::with_capacity(SENSITIVE_KEYS.len() * 2);
    for key in SENSITIVE_KEYS {
        for tick in ['"', '\''] {
            let pattern = format!("{tick}{key}{tick}:\\s*{tick}[^{tick}]+{tick}");
            if let Ok(re) = Regex::new(&pattern) {
                patterns.push((re, format!("{tick}{key}{tick}: {tick}{MASK}{tick}")));
            }
        }
    }
    patterns
});

/// Replace the values of [`SENSITIVE_KEYS`] with a fixed mask, preserving
/// the surrounding JSON (or Python-style single-quoted) structure.
pub fn redact(data: &str) -> String {
    let mut out = data.to_owned();
    for (re, replacement) in PATTERNS.iter() {
        out = re
            .replace_all(&out, regex::NoExpand(replacement))
            .into_owned();
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn masks_api_key() {
        assert_eq!(
            redact(r#"{"ak": "secret123", "x": "1"}"#),
            r#"{"ak": "XXXXXXXXX", "x": "1"}"#
        );
    }

    #[test]
    fn masks_compact_json_and_single_quotes() {
        assert_eq!(
            redact(r#"{"nickName":"Robot1","cmd":"Clean","act":"s"}"#),
            r#"{"nickName": "XXXXXXXXX","cmd": "XXXXXXXXX","act": "XXXXXXXXX"}"#
        );
        assert_eq!(redact("{'ak': 'k'}"), "{'ak': 'XXXXXXXXX'}");
    }

    #[test]
    fn leaves_other_fields_alone() {
        let raw = r#"{"code": "0", "msg": "ok", "track": "ak"}"#;
        assert_eq!(redact(raw), raw);
    }

    #[test]
    fn empty_values_are_not_matched() {
        let raw = r#"{"act": ""}"#;
        assert_eq!(redact(raw), raw);
    }
}
