use serde::ser::{Error as _, SerializeMap};
use serde::Serialize;
use serde_json::value::RawValue;
use serde_json::Value;

use crate::types::{Params, PushError};

/// Prefix a scheme onto bare hosts and paths.
///
/// Empty input stays empty; `http://` and `https://` URLs are returned as-is.
pub fn normalize_url(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return raw.to_string();
    }
    format!("https://{}", raw)
}

/// Escape a string for embedding between JSON quotes.
///
/// Quote, backslash and the short control escapes (`\b \f \n \r \t`) use their
/// two-character forms; any other code point below 0x20 becomes `\u00xx`.
pub fn escape_json(input: &str) -> String {
    let quoted = Value::from(input).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

/// True when `s` is a complete JSON number literal:
/// `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`
pub fn is_json_number(s: &str) -> bool {
    let b = s.as_bytes();
    let mut i = 0;

    if b.get(i) == Some(&b'-') {
        i += 1;
    }

    match b.get(i) {
        Some(b'0') => i += 1,
        Some(c) if c.is_ascii_digit() => i = skip_digits(b, i),
        _ => return false,
    }

    if b.get(i) == Some(&b'.') {
        let start = i + 1;
        i = skip_digits(b, start);
        if i == start {
            return false;
        }
    }

    if matches!(b.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(b.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let start = i;
        i = skip_digits(b, start);
        if i == start {
            return false;
        }
    }

    i == b.len()
}

fn skip_digits(b: &[u8], mut i: usize) -> usize {
    while b.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    i
}

/// How a parameter value is written into the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamValue<'a> {
    Bool(bool),
    /// Emitted unquoted, exactly as given.
    Number(&'a str),
    Text(&'a str),
}

impl<'a> ParamValue<'a> {
    pub fn classify(value: &'a str) -> Self {
        match value {
            "true" => ParamValue::Bool(true),
            "false" => ParamValue::Bool(false),
            v if is_json_number(v) => ParamValue::Number(v),
            v => ParamValue::Text(v),
        }
    }
}

impl Serialize for ParamValue<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            ParamValue::Bool(b) => serializer.serialize_bool(b),
            ParamValue::Number(n) => RawValue::from_string(n.to_string())
                .map_err(S::Error::custom)?
                .serialize(serializer),
            ParamValue::Text(t) => serializer.serialize_str(t),
        }
    }
}

/// JSON body of a push request.
///
/// Serializes as `{"device_keys":[..],"title":..,"body":..,<params>}` with the
/// parameters in key order.
#[derive(Debug, Clone, Copy)]
pub struct PushPayload<'a> {
    pub device_keys: &'a [String],
    pub title: &'a str,
    pub body: &'a str,
    pub params: &'a Params,
}

impl Serialize for PushPayload<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3 + self.params.len()))?;
        map.serialize_entry("device_keys", self.device_keys)?;
        map.serialize_entry("title", self.title)?;
        map.serialize_entry("body", self.body)?;

        for (key, value) in self.params {
            map.serialize_entry(key, &ParamValue::classify(value))?;
        }

        map.end()
    }
}

impl PushPayload<'_> {
    pub fn to_json(&self) -> Result<String, PushError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Build the JSON body for a push.
pub fn build_payload(
    device_keys: &[String],
    title: &str,
    body: &str,
    params: &Params,
) -> Result<String, PushError> {
    PushPayload {
        device_keys,
        title,
        body,
        params,
    }
    .to_json()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url(""), "");
        assert_eq!(normalize_url("example.com/a"), "https://example.com/a");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url("https://example.com/x?y=1"), "https://example.com/x?y=1");
    }

    #[test]
    fn test_escape_short_forms() {
        assert_eq!(escape_json(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape_json(r"C:\tmp"), r"C:\\tmp");
        assert_eq!(escape_json("a\nb\tc\rd"), r"a\nb\tc\rd");
        assert_eq!(escape_json("\u{8}\u{c}"), r"\b\f");
    }

    #[test]
    fn test_escape_other_control_chars() {
        assert_eq!(escape_json("\u{1}"), r"\u0001");
        assert_eq!(escape_json("\u{1f}"), r"\u001f");
        assert_eq!(escape_json("\u{0}x"), r"\u0000x");
    }

    #[test]
    fn test_escape_passthrough() {
        assert_eq!(escape_json("plain text"), "plain text");
        assert_eq!(escape_json("磁盘已满 ✓"), "磁盘已满 ✓");
    }

    #[test]
    fn test_escape_round_trip() {
        let inputs = [
            "",
            "hello",
            "quote \" and \\ backslash",
            "ctrl \u{0}\u{1}\u{7}\u{8}\u{b}\u{c}\u{e}\u{1b}\u{1f} end",
            "lines\r\n\ttabbed",
            "unicode ünïcødé 🚀",
        ];
        for input in inputs {
            let doc = format!("\"{}\"", escape_json(input));
            let back: String = serde_json::from_str(&doc).unwrap();
            assert_eq!(back, input);
        }
    }

    #[test]
    fn test_is_json_number() {
        for n in ["0", "42", "-3.14", "1e10", "2.5E-3", "-0", "1e+2"] {
            assert!(is_json_number(n), "{} should be a number", n);
        }
        for s in ["", "-", "+1", "01", "1.", ".5", "1e", "1e+", "abc", "12abc", "0x10", " 1"] {
            assert!(!is_json_number(s), "{:?} should not be a number", s);
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(ParamValue::classify("true"), ParamValue::Bool(true));
        assert_eq!(ParamValue::classify("false"), ParamValue::Bool(false));
        assert_eq!(ParamValue::classify("1"), ParamValue::Number("1"));
        assert_eq!(ParamValue::classify("True"), ParamValue::Text("True"));
        assert_eq!(ParamValue::classify("critical"), ParamValue::Text("critical"));
    }

    #[test]
    fn test_build_minimal_payload() {
        let keys = vec!["abc123".to_string()];
        let json = build_payload(&keys, "Hello", "World", &Params::new()).unwrap();
        assert_eq!(json, r#"{"device_keys":["abc123"],"title":"Hello","body":"World"}"#);
    }

    #[test]
    fn test_payload_value_classification() {
        let keys = vec!["k1".to_string(), "k2".to_string()];
        let mut params = Params::new();
        params.insert("archive".into(), "1".into());
        params.insert("badge".into(), "-3.14".into());
        params.insert("big".into(), "1e10".into());
        params.insert("isArchive".into(), "true".into());
        params.insert("muted".into(), "false".into());
        params.insert("level".into(), "critical".into());
        params.insert("note".into(), "line\n\"quoted\"".into());

        let json = build_payload(&keys, "t", "b", &params).unwrap();
        assert!(json.contains(r#""archive":1"#));
        assert!(json.contains(r#""badge":-3.14"#));
        assert!(json.contains(r#""big":1e10"#));
        assert!(json.contains(r#""isArchive":true"#));
        assert!(json.contains(r#""muted":false"#));
        assert!(json.contains(r#""level":"critical""#));

        let v = parse(&json);
        assert_eq!(v["device_keys"], serde_json::json!(["k1", "k2"]));
        assert_eq!(v["note"], "line\n\"quoted\"");
    }

    #[test]
    fn test_payload_escapes_title_and_body() {
        let keys = vec!["key\"with\\quote".to_string()];
        let json = build_payload(&keys, "tab\there", "nul\u{0}bell\u{7}", &Params::new()).unwrap();
        let v = parse(&json);
        assert_eq!(v["device_keys"][0], "key\"with\\quote");
        assert_eq!(v["title"], "tab\there");
        assert_eq!(v["body"], "nul\u{0}bell\u{7}");
        assert!(json.contains(r"\u0000"));
        assert!(json.contains(r"\u0007"));
    }
}
