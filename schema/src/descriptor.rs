use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SchemaError;

/// A set of parsed `.proto` files, in the JSON shape protobuf tooling prints
/// for a `FileDescriptorSet`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptorSet {
    #[serde(rename = "file", default)]
    pub files: Vec<FileDescriptor>,
}

impl DescriptorSet {
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Looks a file up by its `.proto` path as recorded in the set.
    pub fn file(&self, name: &str) -> Option<&FileDescriptor> {
        self.files.iter().find(|file| file.name == name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    #[default]
    Proto2,
    Proto3,
    /// Editions files pack repeated scalars unless a feature says otherwise.
    Editions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub name:         String,
    #[serde(default)]
    pub package:      Option<String>,
    #[serde(default)]
    pub syntax:       Syntax,
    #[serde(rename = "dependency", default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub message_type: Vec<MessageDescriptor>,
    #[serde(default)]
    pub enum_type:    Vec<EnumDescriptor>,
    #[serde(default)]
    pub options:      FileOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileOptions {
    #[serde(default)]
    pub features: Option<FeatureSet>,
}

/// The subset of editions features that changes the generated declarations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSet {
    #[serde(default)]
    pub repeated_field_encoding: Option<RepeatedFieldEncoding>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatedFieldEncoding {
    #[serde(rename = "REPEATED_FIELD_ENCODING_UNKNOWN")]
    Unknown,
    #[serde(rename = "PACKED")]
    Packed,
    #[serde(rename = "EXPANDED")]
    Expanded,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDescriptor {
    pub name:        String,
    #[serde(rename = "field", default)]
    pub fields:      Vec<FieldDescriptor>,
    #[serde(default)]
    pub nested_type: Vec<MessageDescriptor>,
    #[serde(default)]
    pub enum_type:   Vec<EnumDescriptor>,
    #[serde(default)]
    pub oneof_decl:  Vec<OneofDescriptor>,
}

impl MessageDescriptor {
    /// The oneof a field belongs to, if it is a member of a real tagged union.
    /// Synthetic oneofs backing proto3 `optional` fields are not reported.
    pub fn containing_oneof(&self, field: &FieldDescriptor) -> Option<(usize, &OneofDescriptor)> {
        if field.proto3_optional {
            return None;
        }
        let index = field.oneof_index?;
        self.oneof_decl.get(index).map(|oneof| (index, oneof))
    }

    /// Member fields of the oneof at `index`, in declaration order.
    pub fn oneof_fields(&self, index: usize) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(move |field| !field.proto3_optional && field.oneof_index == Some(index))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OneofDescriptor {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    pub name:   String,
    #[serde(rename = "value", default)]
    pub values: Vec<EnumValueDescriptor>,
}

impl EnumDescriptor {
    pub fn value_by_name(&self, name: &str) -> Option<&EnumValueDescriptor> {
        self.values.iter().find(|value| value.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumValueDescriptor {
    pub name:   String,
    #[serde(default)]
    pub number: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    #[default]
    #[serde(rename = "LABEL_OPTIONAL")]
    Optional,
    #[serde(rename = "LABEL_REQUIRED")]
    Required,
    #[serde(rename = "LABEL_REPEATED")]
    Repeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "TYPE_DOUBLE")]
    Double,
    #[serde(rename = "TYPE_FLOAT")]
    Float,
    #[serde(rename = "TYPE_INT64")]
    Int64,
    #[serde(rename = "TYPE_UINT64")]
    Uint64,
    #[serde(rename = "TYPE_INT32")]
    Int32,
    #[serde(rename = "TYPE_FIXED64")]
    Fixed64,
    #[serde(rename = "TYPE_FIXED32")]
    Fixed32,
    #[serde(rename = "TYPE_BOOL")]
    Bool,
    #[serde(rename = "TYPE_STRING")]
    String,
    #[serde(rename = "TYPE_GROUP")]
    Group,
    #[serde(rename = "TYPE_MESSAGE")]
    Message,
    #[serde(rename = "TYPE_BYTES")]
    Bytes,
    #[serde(rename = "TYPE_UINT32")]
    Uint32,
    #[serde(rename = "TYPE_ENUM")]
    Enum,
    #[serde(rename = "TYPE_SFIXED32")]
    Sfixed32,
    #[serde(rename = "TYPE_SFIXED64")]
    Sfixed64,
    #[serde(rename = "TYPE_SINT32")]
    Sint32,
    #[serde(rename = "TYPE_SINT64")]
    Sint64,
}

impl FieldType {
    /// Kinds eligible for packed repeated encoding.
    pub fn is_packable(self) -> bool {
        !matches!(
            self,
            FieldType::String | FieldType::Bytes | FieldType::Message | FieldType::Group
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOptions {
    #[serde(default)]
    pub packed:   Option<bool>,
    #[serde(default)]
    pub features: Option<FeatureSet>,
}

fn repeated_field_encoding(features: &Option<FeatureSet>) -> Option<RepeatedFieldEncoding> {
    features
        .as_ref()
        .and_then(|features| features.repeated_field_encoding)
        .filter(|encoding| *encoding != RepeatedFieldEncoding::Unknown)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name:            String,
    pub number:          i32,
    #[serde(default)]
    pub label:           Label,
    #[serde(rename = "type")]
    pub kind:            FieldType,
    /// Fully-qualified target for enum and message kinds, usually dot-prefixed.
    #[serde(default)]
    pub type_name:       Option<String>,
    #[serde(default)]
    pub json_name:       Option<String>,
    #[serde(default)]
    pub default_value:   Option<String>,
    #[serde(default)]
    pub oneof_index:     Option<usize>,
    #[serde(default)]
    pub proto3_optional: bool,
    #[serde(default)]
    pub options:         FieldOptions,
}

impl FieldDescriptor {
    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }

    pub fn is_required(&self) -> bool {
        self.label == Label::Required
    }

    pub fn is_packable(&self) -> bool {
        self.is_repeated() && self.kind.is_packable()
    }

    /// An explicit `packed` option wins; otherwise proto3 packs every
    /// packable field and proto2 packs none. Editions files pack unless the
    /// field or file sets `repeated_field_encoding = EXPANDED`.
    pub fn is_packed(&self, file: &FileDescriptor) -> bool {
        if !self.is_packable() {
            return false;
        }
        if let Some(packed) = self.options.packed {
            return packed;
        }
        match file.syntax {
            Syntax::Proto2 => false,
            Syntax::Proto3 => true,
            Syntax::Editions => repeated_field_encoding(&self.options.features)
                .or_else(|| repeated_field_encoding(&file.options.features))
                .map_or(true, |encoding| encoding == RepeatedFieldEncoding::Packed),
        }
    }

    /// The JSON alias, derived the way protoc does when the descriptor
    /// does not carry one.
    pub fn json_name(&self) -> String {
        match &self.json_name {
            Some(name) => name.clone(),
            None => to_json_name(&self.name),
        }
    }
}

fn to_json_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut capitalize_next = false;
    for ch in name.chars() {
        if ch == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.extend(ch.to_uppercase());
            capitalize_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(json: &str) -> FieldDescriptor {
        serde_json::from_str(json).expect("field should decode")
    }

    #[test]
    fn test_decode_field_defaults() {
        let f = field(r#"{ "name": "id", "number": 2, "type": "TYPE_INT32" }"#);
        assert_eq!(f.label, Label::Optional);
        assert_eq!(f.kind, FieldType::Int32);
        assert!(f.type_name.is_none());
        assert!(!f.is_repeated());
        assert!(!f.proto3_optional);
    }

    #[test]
    fn test_json_name_derivation() {
        let f = field(r#"{ "name": "user_id", "number": 1, "type": "TYPE_INT64" }"#);
        assert_eq!(f.json_name(), "userId");

        let f = field(r#"{ "name": "user_id", "number": 1, "type": "TYPE_INT64", "jsonName": "uid" }"#);
        assert_eq!(f.json_name(), "uid");
    }

    fn file_with(syntax: Syntax) -> FileDescriptor {
        FileDescriptor {
            name: "a.proto".into(),
            syntax,
            ..Default::default()
        }
    }

    #[test]
    fn test_packing_rules() {
        let proto2 = file_with(Syntax::Proto2);
        let proto3 = file_with(Syntax::Proto3);

        let ints = field(r#"{ "name": "xs", "number": 1, "type": "TYPE_INT32", "label": "LABEL_REPEATED" }"#);
        assert!(ints.is_packable());
        assert!(!ints.is_packed(&proto2));
        assert!(ints.is_packed(&proto3));

        let explicit = field(
            r#"{ "name": "xs", "number": 1, "type": "TYPE_INT32", "label": "LABEL_REPEATED", "options": { "packed": false } }"#,
        );
        assert!(!explicit.is_packed(&proto3));

        let names = field(r#"{ "name": "names", "number": 1, "type": "TYPE_STRING", "label": "LABEL_REPEATED" }"#);
        assert!(!names.is_packable());
        assert!(!names.is_packed(&proto3));

        let single = field(r#"{ "name": "x", "number": 1, "type": "TYPE_INT32" }"#);
        assert!(!single.is_packable());
    }

    #[test]
    fn test_editions_packing_follows_features() {
        let set = DescriptorSet::from_json_str(
            r#"{ "file": [
                { "name": "a.proto", "syntax": "editions", "edition": "EDITION_2023" },
                { "name": "b.proto", "syntax": "editions", "edition": "EDITION_2023",
                  "options": { "features": { "repeatedFieldEncoding": "EXPANDED" } } }
            ] }"#,
        )
        .unwrap();
        let packed_file = &set.files[0];
        let expanded_file = &set.files[1];
        assert_eq!(packed_file.syntax, Syntax::Editions);

        let ints = field(r#"{ "name": "xs", "number": 1, "type": "TYPE_INT32", "label": "LABEL_REPEATED" }"#);
        assert!(ints.is_packed(packed_file));
        assert!(!ints.is_packed(expanded_file));

        let overridden = field(
            r#"{ "name": "xs", "number": 1, "type": "TYPE_INT32", "label": "LABEL_REPEATED",
                 "options": { "features": { "repeatedFieldEncoding": "PACKED" } } }"#,
        );
        assert!(overridden.is_packed(expanded_file));

        let expanded = field(
            r#"{ "name": "xs", "number": 1, "type": "TYPE_INT32", "label": "LABEL_REPEATED",
                 "options": { "features": { "repeatedFieldEncoding": "EXPANDED" } } }"#,
        );
        assert!(!expanded.is_packed(packed_file));
    }

    #[test]
    fn test_synthetic_oneof_is_not_a_union() {
        let message: MessageDescriptor = serde_json::from_str(
            r#"{
                "name": "M",
                "field": [
                    { "name": "a", "number": 1, "type": "TYPE_INT32", "oneofIndex": 0, "proto3Optional": true },
                    { "name": "b", "number": 2, "type": "TYPE_INT32", "oneofIndex": 1 }
                ],
                "oneofDecl": [ { "name": "_a" }, { "name": "choice" } ]
            }"#,
        )
        .unwrap();
        assert!(message.containing_oneof(&message.fields[0]).is_none());
        let (index, oneof) = message.containing_oneof(&message.fields[1]).unwrap();
        assert_eq!(index, 1);
        assert_eq!(oneof.name, "choice");
        assert_eq!(message.oneof_fields(1).count(), 1);
    }

    #[test]
    fn test_syntax_defaults_to_proto2() {
        let set = DescriptorSet::from_json_str(r#"{ "file": [ { "name": "a.proto" } ] }"#).unwrap();
        assert_eq!(set.files[0].syntax, Syntax::Proto2);
        assert!(set.file("a.proto").is_some());
        assert!(set.file("b.proto").is_none());
    }

    #[test]
    fn test_from_json_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "file": [ {{ "name": "a.proto", "syntax": "proto3", "package": "pkg" }} ] }}"#
        )
        .unwrap();
        let set = DescriptorSet::from_json_file(file.path()).unwrap();
        assert_eq!(set.files[0].syntax, Syntax::Proto3);
        assert_eq!(set.files[0].package.as_deref(), Some("pkg"));
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = DescriptorSet::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SchemaError::Json(_)));
    }
}
