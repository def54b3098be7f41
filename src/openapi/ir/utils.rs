//! Naming and quoting helpers shared by resolution, synthesis and printing.

use std::collections::HashSet;
use std::sync::LazyLock;

use super::types::{TsLiteral, TsPrimitive, TsType};
use crate::openapi::spec::EnumValue;

/// TypeScript reserved words that cannot be used as identifiers.
pub static TS_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "break",
        "case",
        "catch",
        "class",
        "const",
        "continue",
        "debugger",
        "default",
        "delete",
        "do",
        "else",
        "enum",
        "export",
        "extends",
        "false",
        "finally",
        "for",
        "function",
        "if",
        "import",
        "in",
        "instanceof",
        "new",
        "null",
        "return",
        "super",
        "switch",
        "this",
        "throw",
        "true",
        "try",
        "typeof",
        "var",
        "void",
        "while",
        "with",
        "yield",
        "let",
        "static",
        "implements",
        "interface",
        "package",
        "private",
        "protected",
        "public",
        "await",
        "async",
    ]
    .into_iter()
    .collect()
});

/// Check if a property or key name must be quoted.
///
/// Returns true if the name is empty, does not start with a letter, `_` or `$`,
/// or contains anything other than alphanumerics, `_` and `$`.
pub fn needs_bracket_notation(name: &str) -> bool {
    name.is_empty()
        || !name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Escape a string for a double-quoted JavaScript literal.
pub fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Quote a property or enum key unless it is already a valid identifier.
pub fn quote_if_needed(name: &str) -> String {
    if needs_bracket_notation(name) {
        format!("\"{}\"", escape_js_string(name))
    } else {
        name.to_string()
    }
}

/// Sanitize a parameter name into a valid TypeScript identifier.
///
/// `-`, `.` and spaces split words that are re-joined in camelCase, a leading
/// digit gains a `_` prefix, and reserved words are escaped with `_`.
pub fn sanitize_ts_identifier(name: &str) -> String {
    let mut result = String::new();
    for (i, part) in name.split(['-', '.', ' ']).enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 || result.is_empty() {
            result.push_str(part);
        } else {
            result.push_str(&capitalize_first(part));
        }
    }

    let mut result: String = result
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();

    if result.is_empty() {
        return "_empty".to_string();
    }

    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result = format!("_{result}");
    }

    if TS_RESERVED_WORDS.contains(result.as_str()) {
        result = format!("_{result}");
    }

    result
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Lower-case the first letter of a string.
pub fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Canonical TypeScript name for a schema.
///
/// Every non-alphanumeric character becomes `_`; a lower-case letter at the
/// start or right after `_` is upper-cased and absorbs that `_`; a leading
/// digit gains a `_` prefix.
pub fn pascal_case_type(name: &str) -> String {
    let replaced: Vec<char> = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    let mut out = String::with_capacity(replaced.len());
    let mut i = 0;
    while i < replaced.len() {
        let c = replaced[i];
        if i == 0 && c.is_ascii_lowercase() {
            out.push(c.to_ascii_uppercase());
        } else if c == '_' && replaced.get(i + 1).is_some_and(char::is_ascii_lowercase) {
            out.push(replaced[i + 1].to_ascii_uppercase());
            i += 1;
        } else {
            out.push(c);
        }
        i += 1;
    }

    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Group-name normalization: a lower-case letter at the start or after `-`/`_`
/// is upper-cased and absorbs the separator.
pub fn pascal_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if i == 0 && c.is_ascii_lowercase() {
            out.push(c.to_ascii_uppercase());
        } else if (c == '-' || c == '_') && chars.get(i + 1).is_some_and(char::is_ascii_lowercase) {
            out.push(chars[i + 1].to_ascii_uppercase());
            i += 1;
        } else {
            out.push(c);
        }
        i += 1;
    }
    out
}

/// camelCase: a `-` or `_` followed by a word character is dropped and the
/// character upper-cased; the first character is then lower-cased.
pub fn camel_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let next_is_word = chars
            .get(i + 1)
            .is_some_and(|n| n.is_alphanumeric() || *n == '_');
        if (c == '-' || c == '_') && next_is_word {
            out.extend(chars[i + 1].to_uppercase());
            i += 2;
        } else {
            out.push(c);
            i += 1;
        }
    }
    lowercase_first(&out)
}

/// kebab-case for file names: a dash between a lower-case and an upper-case
/// letter, then everything lower-cased.
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if prev_lower && c.is_ascii_uppercase() {
            out.push('-');
        }
        prev_lower = c.is_ascii_lowercase();
        out.push(c);
    }
    out.to_lowercase()
}

/// Member key for a TypeScript `enum`: non-alphanumerics become `_`, a
/// leading digit gains a `_` prefix, and the result is upper-cased.
pub fn enum_key(label: &str) -> String {
    let mut key: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if key.starts_with(|c: char| c.is_ascii_digit()) {
        key.insert(0, '_');
    }
    if key.is_empty() {
        key.push('_');
    }
    key.to_uppercase()
}

/// Convert an enum value to a TypeScript literal.
pub fn enum_value_to_literal(v: &EnumValue) -> TsLiteral {
    match v {
        EnumValue::String(s) => TsLiteral::String(s.clone()),
        EnumValue::Integer(n) => TsLiteral::Int(*n),
        EnumValue::Float(f) => TsLiteral::Number(*f),
        EnumValue::Bool(b) => TsLiteral::Bool(*b),
        EnumValue::Null => TsLiteral::Null,
    }
}

/// Create a `Record<string, T>` type.
pub fn make_string_record(value_type: TsType) -> TsType {
    TsType::Record {
        key: Box::new(TsType::Primitive(TsPrimitive::String)),
        value: Box::new(value_type),
    }
}

/// `Record<string, unknown>`, the fallback for open objects.
pub fn make_unknown_record() -> TsType {
    make_string_record(TsType::Primitive(TsPrimitive::Unknown))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_bracket_notation() {
        assert!(!needs_bracket_notation("foo"));
        assert!(!needs_bracket_notation("_foo"));
        assert!(!needs_bracket_notation("$foo"));
        assert!(!needs_bracket_notation("foo123"));

        assert!(needs_bracket_notation(""));
        assert!(needs_bracket_notation("123foo"));
        assert!(needs_bracket_notation("foo-bar"));
        assert!(needs_bracket_notation("foo bar"));
    }

    #[test]
    fn test_escape_js_string() {
        assert_eq!(escape_js_string("hello"), "hello");
        assert_eq!(escape_js_string("hel\"lo"), "hel\\\"lo");
        assert_eq!(escape_js_string("hel\\lo"), "hel\\\\lo");
        assert_eq!(escape_js_string("a\nb"), "a\\nb");
    }

    #[test]
    fn test_quote_if_needed() {
        assert_eq!(quote_if_needed("foo"), "foo");
        assert_eq!(quote_if_needed("content-type"), "\"content-type\"");
        assert_eq!(quote_if_needed("123"), "\"123\"");
    }

    #[test]
    fn test_sanitize_ts_identifier() {
        assert_eq!(sanitize_ts_identifier("foo"), "foo");
        assert_eq!(sanitize_ts_identifier("page-size"), "pageSize");
        assert_eq!(sanitize_ts_identifier("filter.name"), "filterName");
        assert_eq!(sanitize_ts_identifier("filter[name]"), "filter_name_");
        assert_eq!(sanitize_ts_identifier("123foo"), "_123foo");
        assert_eq!(sanitize_ts_identifier("delete"), "_delete");
        assert_eq!(sanitize_ts_identifier(""), "_empty");
    }

    #[test]
    fn test_pascal_case_type() {
        assert_eq!(pascal_case_type("user"), "User");
        assert_eq!(pascal_case_type("user_profile"), "UserProfile");
        assert_eq!(pascal_case_type("user-profile.v2"), "UserProfileV2");
        assert_eq!(pascal_case_type("Page«User»"), "Page_User_");
        assert_eq!(pascal_case_type("2fa"), "_2fa");
        assert_eq!(pascal_case_type("Order_Line"), "Order_Line");
    }

    #[test]
    fn test_pascal_case_groups() {
        assert_eq!(pascal_case("billing"), "Billing");
        assert_eq!(pascal_case("user-accounts"), "UserAccounts");
        assert_eq!(pascal_case("Invoice"), "Invoice");
        assert_eq!(pascal_case("pet store"), "Pet store");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("Invoice"), "invoice");
        assert_eq!(camel_case("create_item"), "createItem");
        assert_eq!(camel_case("get-user-by-id"), "getUserById");
        assert_eq!(camel_case("UploadAvatar"), "uploadAvatar");
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("UserAccounts"), "user-accounts");
        assert_eq!(kebab_case("Billing"), "billing");
        assert_eq!(kebab_case("APIKeys"), "apikeys");
    }

    #[test]
    fn test_enum_key() {
        assert_eq!(enum_key("Active"), "ACTIVE");
        assert_eq!(enum_key("on hold"), "ON_HOLD");
        assert_eq!(enum_key("1st"), "_1ST");
    }
}
