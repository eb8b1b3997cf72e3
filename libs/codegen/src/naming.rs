//! Identifier derivation for generated C# code

use crate::error::{Error, Result};
use heck::{ToLowerCamelCase, ToUpperCamelCase};

/// Type or accessor identifier (`orderId` -> `OrderId`, `line_item` -> `LineItem`)
pub fn pascal_identifier(raw: &str) -> Result<String> {
    let ident = if is_plain(raw) {
        let mut chars = raw.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        strip_invalid(&raw.to_upper_camel_case())
    };

    finish(raw, ident)
}

/// Parameter or local identifier (`OrderId` -> `orderId`)
pub fn camel_identifier(raw: &str) -> Result<String> {
    let ident = if is_plain(raw) {
        let mut chars = raw.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        strip_invalid(&raw.to_lower_camel_case())
    };

    finish(raw, ident)
}

/// Backing field for an accessor (`OrderId` -> `_orderId`)
pub fn field_name(accessor: &str) -> String {
    let trimmed = accessor.trim_start_matches('@');
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => format!("_{}", first.to_lowercase().chain(chars).collect::<String>()),
        None => "_value".to_string(),
    }
}

/// Escape a value for a C# string literal, including the quotes
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Escape text for an XML documentation comment
pub fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn is_plain(raw: &str) -> bool {
    !raw.is_empty() && raw.chars().all(char::is_alphanumeric)
}

fn strip_invalid(ident: &str) -> String {
    ident
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

fn finish(raw: &str, mut ident: String) -> Result<String> {
    if ident.is_empty() {
        return Err(Error::InvalidIdentifier(raw.to_string()));
    }

    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }

    if is_csharp_keyword(&ident) {
        ident.insert(0, '@');
    }

    Ok(ident)
}

/// Check if a string is a reserved C# keyword
pub fn is_csharp_keyword(s: &str) -> bool {
    matches!(
        s,
        "abstract"
            | "as"
            | "base"
            | "bool"
            | "break"
            | "byte"
            | "case"
            | "catch"
            | "char"
            | "checked"
            | "class"
            | "const"
            | "continue"
            | "decimal"
            | "default"
            | "delegate"
            | "do"
            | "double"
            | "else"
            | "enum"
            | "event"
            | "explicit"
            | "extern"
            | "false"
            | "finally"
            | "fixed"
            | "float"
            | "for"
            | "foreach"
            | "goto"
            | "if"
            | "implicit"
            | "in"
            | "int"
            | "interface"
            | "internal"
            | "is"
            | "lock"
            | "long"
            | "namespace"
            | "new"
            | "null"
            | "object"
            | "operator"
            | "out"
            | "override"
            | "params"
            | "private"
            | "protected"
            | "public"
            | "readonly"
            | "ref"
            | "return"
            | "sbyte"
            | "sealed"
            | "short"
            | "sizeof"
            | "stackalloc"
            | "static"
            | "string"
            | "struct"
            | "switch"
            | "this"
            | "throw"
            | "true"
            | "try"
            | "typeof"
            | "uint"
            | "ulong"
            | "unchecked"
            | "unsafe"
            | "ushort"
            | "using"
            | "virtual"
            | "void"
            | "volatile"
            | "while"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_identifier() {
        assert_eq!(pascal_identifier("orderId").unwrap(), "OrderId");
        assert_eq!(pascal_identifier("HTTPStatus").unwrap(), "HTTPStatus");
        assert_eq!(pascal_identifier("line_item").unwrap(), "LineItem");
        assert_eq!(pascal_identifier("get-by-email").unwrap(), "GetByEmail");
        assert_eq!(pascal_identifier("2fa").unwrap(), "_2fa");
        assert!(pascal_identifier("{}").is_err());
    }

    #[test]
    fn test_camel_identifier_escapes_keywords() {
        assert_eq!(camel_identifier("OrderId").unwrap(), "orderId");
        assert_eq!(camel_identifier("class").unwrap(), "@class");
        assert_eq!(camel_identifier("page-size").unwrap(), "pageSize");
    }

    #[test]
    fn test_field_name() {
        assert_eq!(field_name("OrderId"), "_orderId");
        assert_eq!(field_name("@Event"), "_event");
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(string_literal("say \"hi\"\n"), r#""say \"hi\"\n""#);
    }
}
