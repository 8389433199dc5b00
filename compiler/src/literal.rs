//! Delphi constant expressions for protobuf default values.

use std::fmt;

use delphi_proto_schema::{EnumDescriptor, FieldType};
use tracing::warn;

/// Renders a descriptor's textual default as a Delphi literal.
///
/// Enum defaults name a value of `enum_type` and render as its number.
/// An empty result means the default has no Delphi spelling and should not
/// be annotated.
pub fn render_default(kind: FieldType, raw: &str, enum_type: Option<&EnumDescriptor>) -> String {
    match kind {
        FieldType::Int32 | FieldType::Sint32 | FieldType::Sfixed32 | FieldType::Int64
        | FieldType::Sint64 | FieldType::Sfixed64 => {
            raw.trim().parse::<i64>().map(|v| v.to_string()).unwrap_or_default()
        }
        FieldType::Uint32 | FieldType::Fixed32 | FieldType::Uint64 | FieldType::Fixed64 => {
            raw.trim().parse::<u64>().map(|v| v.to_string()).unwrap_or_default()
        }
        FieldType::Float => finite(raw, raw.trim().parse::<f32>().ok().map(|v| (v.is_finite(), real(v, f64::from(v))))),
        FieldType::Double => finite(raw, raw.trim().parse::<f64>().ok().map(|v| (v.is_finite(), real(v, v)))),
        FieldType::Bool => match raw.trim() {
            "true" => "True".to_string(),
            "false" => "False".to_string(),
            _ => String::new(),
        },
        FieldType::Enum => enum_type
            .and_then(|desc| desc.value_by_name(raw.trim()))
            .map(|value| value.number.to_string())
            .unwrap_or_default(),
        FieldType::String => quote_string(raw),
        FieldType::Bytes => byte_literal(&unescape_bytes(raw)),
        FieldType::Message | FieldType::Group => String::new(),
    }
}

/// Shortest round-trip digits, switching to exponent notation outside the
/// range where plain notation stays compact.
fn real<T: fmt::Display + fmt::LowerExp>(value: T, magnitude: f64) -> String {
    let magnitude = magnitude.abs();
    if magnitude == 0.0 || (1e-5..1e16).contains(&magnitude) {
        value.to_string()
    } else {
        format!("{:e}", value)
    }
}

fn finite(raw: &str, parsed: Option<(bool, String)>) -> String {
    match parsed {
        Some((true, text)) => text,
        Some((false, _)) => {
            warn!(default = raw, "non-finite default has no Delphi literal; skipping");
            String::new()
        }
        None => String::new(),
    }
}

/// Single-quoted Pascal string. Embedded quotes are doubled and control
/// characters are spliced in as `#<code>`.
pub fn quote_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    let mut quoted = false;
    for ch in text.chars() {
        if ch.is_control() {
            if quoted {
                out.push('\'');
                quoted = false;
            }
            out.push_str(&format!("#{}", ch as u32));
        } else {
            if !quoted {
                out.push('\'');
                quoted = true;
            }
            if ch == '\'' {
                out.push_str("''");
            } else {
                out.push(ch);
            }
        }
    }
    if quoted {
        out.push('\'');
    }
    if out.is_empty() {
        out.push_str("''");
    }
    out
}

fn byte_literal(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "''".to_string();
    }
    bytes.iter().map(|b| format!("#${:02X}", b)).collect()
}

/// Decodes the C-style escaping protoc applies to `bytes` defaults.
pub fn unescape_bytes(text: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 == bytes.len() {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        i += 1;
        match bytes[i] {
            b'0'..=b'7' => {
                let mut value: u32 = 0;
                let mut digits = 0;
                while digits < 3 && i < bytes.len() && (b'0'..=b'7').contains(&bytes[i]) {
                    value = value * 8 + u32::from(bytes[i] - b'0');
                    i += 1;
                    digits += 1;
                }
                out.push(value as u8);
            }
            b'x' | b'X' => {
                i += 1;
                let mut value: u32 = 0;
                let mut digits = 0;
                while digits < 2 && i < bytes.len() && bytes[i].is_ascii_hexdigit() {
                    value = value * 16 + (bytes[i] as char).to_digit(16).unwrap_or(0);
                    i += 1;
                    digits += 1;
                }
                out.push(value as u8);
            }
            other => {
                out.push(match other {
                    b'n' => b'\n',
                    b'r' => b'\r',
                    b't' => b'\t',
                    b'a' => 0x07,
                    b'b' => 0x08,
                    b'f' => 0x0c,
                    b'v' => 0x0b,
                    // \\ \' \" \? and anything unknown stand for themselves
                    c => c,
                });
                i += 1;
            }
        }
    }
    out
}
