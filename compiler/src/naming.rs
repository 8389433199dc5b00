//! Identifier conversions from protobuf names to Delphi declarations.

/// Delphi reserved words. Identifiers matching one (case-insensitively)
/// must be written with a leading `&`.
const RESERVED_WORDS: [&str; 64] = [
    "and", "array", "as", "asm", "begin", "case", "class", "const",
    "constructor", "destructor", "dispinterface", "div", "do", "downto",
    "else", "end", "except", "exports", "file", "finalization", "finally",
    "for", "function", "goto", "if", "implementation", "in", "inherited",
    "initialization", "inline", "interface", "is", "label", "library", "mod",
    "nil", "not", "object", "of", "or", "packed", "procedure",
    "program", "property", "raise", "record", "repeat", "resourcestring",
    "set", "shl", "shr", "string", "then", "threadvar", "to", "try", "type",
    "unit", "until", "uses", "var", "while", "with", "xor",
];

/// Converts a protobuf identifier to PascalCase.
///
/// Underscores are dropped and the letter after any non-letter is
/// upper-cased. Letters that continue a run are kept as written, so
/// `HTTPServer` and `http_server` become `HTTPServer` and `HttpServer`.
pub fn to_pascal_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut in_word = false;
    for ch in name.chars() {
        if ch == '_' {
            in_word = false;
        } else if !ch.is_ascii_alphabetic() {
            result.push(ch);
            in_word = false;
        } else if in_word {
            result.push(ch);
        } else {
            result.push(ch.to_ascii_uppercase());
            in_word = true;
        }
    }
    result
}

/// PascalCases every dotted segment and joins them without separators.
pub fn flatten_qualified_name(name: &str) -> String {
    to_pascal_case(name).replace('.', "")
}

/// Record and enumeration declarations share one namespace: `T` + the
/// flattened qualified name.
pub fn type_decl_name(name: &str) -> String {
    format!("T{}", flatten_qualified_name(name))
}

pub fn field_decl_name(name: &str) -> String {
    format!("F{}", to_pascal_case(name))
}

pub fn array_of(type_name: &str) -> String {
    format!("TArray<{}>", type_name)
}

/// Derives an enumerator identifier, dropping the enum's own name when the
/// value repeats it (`PHONE_TYPE_MOBILE` in `PhoneType` becomes `Mobile`).
///
/// The prefix is only removed when it ends on a word boundary, so the rest
/// is still a valid identifier.
pub fn strip_enum_prefix(value_name: &str, enum_pascal_name: &str) -> String {
    let name = to_pascal_case(&value_name.to_ascii_lowercase());
    if enum_pascal_name.is_empty() {
        return name;
    }
    let has_prefix = name
        .get(..enum_pascal_name.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(enum_pascal_name));
    if has_prefix {
        let rest = &name[enum_pascal_name.len()..];
        if rest.starts_with(|ch: char| ch.is_ascii_uppercase()) {
            return rest.to_string();
        }
    }
    name
}

/// Maps a `.proto` path such as `google/type/date.proto` onto a dotted unit
/// name (`Google.Type.Date.Proto`).
pub fn unit_name_from_path(path: &str) -> String {
    to_pascal_case(path).replace('/', ".")
}

pub fn is_reserved_word(ident: &str) -> bool {
    RESERVED_WORDS
        .iter()
        .any(|word| word.eq_ignore_ascii_case(ident))
}

pub fn escape_reserved_word(ident: &str) -> String {
    if is_reserved_word(ident) {
        format!("&{}", ident)
    } else {
        ident.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case() {
        assert_eq!(to_pascal_case("contact_info"), "ContactInfo");
        assert_eq!(to_pascal_case("name"), "Name");
        assert_eq!(to_pascal_case("clientID"), "ClientID");
        assert_eq!(to_pascal_case("HTTPServer"), "HTTPServer");
        assert_eq!(to_pascal_case("field_2_name"), "Field2Name");
        assert_eq!(to_pascal_case("v2beta"), "V2Beta");
        assert_eq!(to_pascal_case("__leading"), "Leading");
        assert_eq!(to_pascal_case(""), "");
    }

    #[test]
    fn test_flatten_qualified_name() {
        assert_eq!(flatten_qualified_name("Person.phone_number"), "PersonPhoneNumber");
        assert_eq!(type_decl_name("Person.PhoneType"), "TPersonPhoneType");
        assert_eq!(type_decl_name("Person"), "TPerson");
    }

    #[test]
    fn test_field_and_array_names() {
        assert_eq!(field_decl_name("user_id"), "FUserId");
        assert_eq!(array_of("Int32"), "TArray<Int32>");
    }

    #[test]
    fn test_strip_enum_prefix() {
        assert_eq!(strip_enum_prefix("PHONE_TYPE_MOBILE", "PhoneType"), "Mobile");
        assert_eq!(strip_enum_prefix("MOBILE", "PhoneType"), "Mobile");
        assert_eq!(strip_enum_prefix("phone_type_home", "PHONETYPE"), "Home");
        // Stripped once only.
        assert_eq!(strip_enum_prefix("KIND_KIND_A", "Kind"), "KindA");
        // Not on a word boundary.
        assert_eq!(strip_enum_prefix("FOOBAR", "Foo"), "Foobar");
        // Nothing usable would remain.
        assert_eq!(strip_enum_prefix("KIND", "Kind"), "Kind");
        assert_eq!(strip_enum_prefix("KIND_1", "Kind"), "Kind1");
        assert_eq!(strip_enum_prefix("A", ""), "A");
    }

    #[test]
    fn test_unit_name_from_path() {
        assert_eq!(unit_name_from_path("addressbook.proto"), "Addressbook.Proto");
        assert_eq!(unit_name_from_path("google/type/lat_lng.proto"), "Google.Type.LatLng.Proto");
    }

    #[test]
    fn test_reserved_words() {
        assert!(is_reserved_word("Type"));
        assert!(is_reserved_word("END"));
        assert!(!is_reserved_word("Mobile"));
        assert_eq!(escape_reserved_word("Record"), "&Record");
        assert_eq!(escape_reserved_word("Home"), "Home");
    }
}
