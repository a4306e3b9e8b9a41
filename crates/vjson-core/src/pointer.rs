//! # JSON Pointer
//!
//! RFC 6901 pointers in their URI-fragment form (`#/definitions/a%20b/0`).
//!
//! Two consumers share this module: the reference resolver navigates
//! `$ref` fragments with [`navigate`], and both validators build the
//! `#`-rooted instance and schema paths they report with [`join`].

use crate::error::PointerError;
use crate::value::Value;

/// Path of the document root.
pub const ROOT: &str = "#";

/// Unescape a pointer token: `~1` becomes `/`, then `~0` becomes `~`.
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    // ~1 before ~0, otherwise "~01" would decode to "/".
    component.replace("~1", "/").replace("~0", "~")
}

/// Escape a pointer token: `~` becomes `~0`, then `/` becomes `~1`.
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Append one segment to a `#`-rooted path, escaping it.
///
/// ```
/// use vjson_core::pointer::{join, ROOT};
///
/// let path = join(&join(ROOT, "properties"), "a/b");
/// assert_eq!(path, "#/properties/a~1b");
/// ```
pub fn join(path: &str, segment: impl AsRef<str>) -> String {
    let segment = escape_component(segment.as_ref());
    let mut out = String::with_capacity(path.len() + segment.len() + 1);
    out.push_str(path);
    out.push('/');
    out.push_str(&segment);
    out
}

/// Split a fragment into unescaped tokens.
///
/// Accepts `""`, `"#"`, `"/a/b"` and `"#/a/b"`. Tokens are percent-decoded
/// (fragment form) and then pointer-unescaped.
pub fn parse_fragment(fragment: &str) -> Result<Vec<String>, PointerError> {
    let pointer = fragment.strip_prefix('#').unwrap_or(fragment);
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let rest = pointer
        .strip_prefix('/')
        .ok_or_else(|| PointerError::NotAPointer {
            fragment: fragment.to_string(),
        })?;

    let mut tokens = Vec::new();
    let mut at = String::from(ROOT);
    for raw in rest.split('/') {
        let decoded = percent_decode(raw).ok_or_else(|| PointerError::InvalidEscape {
            at: at.clone(),
            token: raw.to_string(),
        })?;
        let token = unescape_component(&decoded);
        at = join(&at, &token);
        tokens.push(token);
    }
    Ok(tokens)
}

/// Resolve `fragment` inside `doc`.
///
/// Objects are indexed by key and arrays by canonical decimal index.
/// Looking up a missing key, indexing past the end of an array, or
/// descending into a scalar is an error.
pub fn navigate<'a>(doc: &'a Value, fragment: &str) -> Result<&'a Value, PointerError> {
    let tokens = parse_fragment(fragment)?;
    navigate_tokens(doc, &tokens)
}

/// Resolve pre-parsed `tokens` inside `doc`.
pub fn navigate_tokens<'a>(doc: &'a Value, tokens: &[String]) -> Result<&'a Value, PointerError> {
    let mut current = doc;
    let mut at = String::from(ROOT);
    for token in tokens {
        current = match current {
            Value::Object(map) => map.get(token).ok_or_else(|| PointerError::MissingKey {
                at: at.clone(),
                key: token.clone(),
            })?,
            Value::Array(items) => {
                let index = parse_index(token).ok_or_else(|| PointerError::InvalidIndex {
                    at: at.clone(),
                    token: token.clone(),
                })?;
                items.get(index).ok_or(PointerError::IndexOutOfRange {
                    at: at.clone(),
                    index,
                    len: items.len(),
                })?
            }
            scalar => {
                return Err(PointerError::NotAContainer {
                    at,
                    kind: scalar.kind().as_str(),
                    token: token.clone(),
                })
            }
        };
        at = join(&at, token);
    }
    Ok(current)
}

/// `0`, or digits without a leading zero.
fn parse_index(token: &str) -> Option<usize> {
    let canonical = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'));
    if canonical {
        token.parse().ok()
    } else {
        None
    }
}

fn percent_decode(raw: &str) -> Option<String> {
    if !raw.contains('%') {
        return Some(raw.to_string());
    }
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        Value::from(json!({
            "definitions": {
                "a": {"type": "integer"},
                "b/c": {"type": "string"},
                "d~e": {"type": "null"},
                "percent%field": {"type": "boolean"},
                "with space": {"type": "array"}
            },
            "items": [{"type": "number"}, {"type": "object"}]
        }))
    }

    #[test]
    fn empty_fragment_is_root() {
        let doc = doc();
        assert_eq!(navigate(&doc, "").unwrap(), &doc);
        assert_eq!(navigate(&doc, "#").unwrap(), &doc);
    }

    #[test]
    fn navigates_objects_and_arrays() {
        let doc = doc();
        let target = navigate(&doc, "#/definitions/a").unwrap();
        assert_eq!(target.get("type").and_then(Value::as_str), Some("integer"));
        let target = navigate(&doc, "/items/1").unwrap();
        assert_eq!(target.get("type").and_then(Value::as_str), Some("object"));
    }

    #[test]
    fn unescapes_tokens() {
        let doc = doc();
        assert_eq!(
            navigate(&doc, "#/definitions/b~1c/type").unwrap().as_str(),
            Some("string")
        );
        assert_eq!(
            navigate(&doc, "#/definitions/d~0e/type").unwrap().as_str(),
            Some("null")
        );
        assert_eq!(
            navigate(&doc, "#/definitions/percent%25field/type").unwrap().as_str(),
            Some("boolean")
        );
        assert_eq!(
            navigate(&doc, "#/definitions/with%20space/type").unwrap().as_str(),
            Some("array")
        );
    }

    #[test]
    fn missing_key_reports_prefix() {
        let err = navigate(&doc(), "#/definitions/zzz").unwrap_err();
        assert_eq!(
            err,
            PointerError::MissingKey {
                at: "#/definitions".into(),
                key: "zzz".into()
            }
        );
    }

    #[test]
    fn array_index_errors() {
        let doc = doc();
        assert!(matches!(
            navigate(&doc, "#/items/2"),
            Err(PointerError::IndexOutOfRange { index: 2, len: 2, .. })
        ));
        assert!(matches!(
            navigate(&doc, "#/items/01"),
            Err(PointerError::InvalidIndex { .. })
        ));
        assert!(matches!(
            navigate(&doc, "#/items/x"),
            Err(PointerError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn cannot_descend_into_scalars() {
        let err = navigate(&doc(), "#/definitions/a/type/x").unwrap_err();
        assert!(matches!(err, PointerError::NotAContainer { kind: "string", .. }));
    }

    #[test]
    fn rejects_non_pointer_fragments() {
        assert!(matches!(
            navigate(&doc(), "#foo"),
            Err(PointerError::NotAPointer { .. })
        ));
        assert!(matches!(
            navigate(&doc(), "#/definitions/%zz"),
            Err(PointerError::InvalidEscape { .. })
        ));
    }

    #[test]
    fn join_escapes_segments() {
        assert_eq!(join(ROOT, "a"), "#/a");
        assert_eq!(join("#/a", "b/c~d"), "#/a/b~1c~0d");
        assert_eq!(join("#/items", 3.to_string()), "#/items/3");
    }

    #[test]
    fn join_output_navigates_back() {
        let doc = doc();
        let path = join(&join(ROOT, "definitions"), "b/c");
        assert_eq!(navigate(&doc, &path).unwrap().get("type").and_then(Value::as_str), Some("string"));
    }
}
