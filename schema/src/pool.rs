use std::collections::HashMap;

use crate::{
    descriptor::{DescriptorSet, EnumDescriptor, FileDescriptor, MessageDescriptor},
    error::SchemaError,
};

/// The kinds of schema node that become type declarations.
#[derive(Debug, Clone, Copy)]
pub enum TypeNode<'a> {
    Message(&'a MessageDescriptor),
    Enum(&'a EnumDescriptor),
}

#[derive(Debug, Clone)]
pub struct TypeEntry<'a> {
    /// Dotted name including the package, without a leading dot.
    pub full_name:  String,
    /// Dotted name relative to the declaring file's package.
    pub local_name: String,
    pub file:       &'a FileDescriptor,
    pub node:       TypeNode<'a>,
}

/// Index of every message and enum in a descriptor set.
#[derive(Debug)]
pub struct DescriptorPool<'a> {
    set:   &'a DescriptorSet,
    types: HashMap<String, TypeEntry<'a>>,
}

impl<'a> DescriptorPool<'a> {
    pub fn new(set: &'a DescriptorSet) -> Result<Self, SchemaError> {
        let mut types = HashMap::new();
        for file in &set.files {
            let package = file.package.as_deref().unwrap_or("");
            for enum_desc in &file.enum_type {
                insert(&mut types, file, package, "", TypeNode::Enum(enum_desc), &enum_desc.name)?;
            }
            for message in &file.message_type {
                index_message(&mut types, file, package, "", message)?;
            }
        }
        Ok(Self { set, types })
    }

    pub fn file(&self, name: &str) -> Option<&'a FileDescriptor> {
        self.set.file(name)
    }

    /// Resolves a fully-qualified type name. A leading dot, as used in
    /// field `typeName` references, is accepted.
    pub fn get(&self, name: &str) -> Option<&TypeEntry<'a>> {
        self.types.get(name.strip_prefix('.').unwrap_or(name))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Joins a dotted scope and a simple name.
pub fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope, name)
    }
}

fn index_message<'a>(
    types: &mut HashMap<String, TypeEntry<'a>>,
    file: &'a FileDescriptor,
    scope: &str,
    local_scope: &str,
    message: &'a MessageDescriptor,
) -> Result<(), SchemaError> {
    insert(types, file, scope, local_scope, TypeNode::Message(message), &message.name)?;

    let scope = qualify(scope, &message.name);
    let local_scope = qualify(local_scope, &message.name);
    for enum_desc in &message.enum_type {
        insert(types, file, &scope, &local_scope, TypeNode::Enum(enum_desc), &enum_desc.name)?;
    }
    for nested in &message.nested_type {
        index_message(types, file, &scope, &local_scope, nested)?;
    }
    Ok(())
}

fn insert<'a>(
    types: &mut HashMap<String, TypeEntry<'a>>,
    file: &'a FileDescriptor,
    scope: &str,
    local_scope: &str,
    node: TypeNode<'a>,
    name: &str,
) -> Result<(), SchemaError> {
    let full_name = qualify(scope, name);
    if types.contains_key(&full_name) {
        return Err(SchemaError::DuplicateType(full_name));
    }
    types.insert(
        full_name.clone(),
        TypeEntry {
            full_name,
            local_name: qualify(local_scope, name),
            file,
            node,
        },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DescriptorSet {
        DescriptorSet::from_json_str(
            r#"{
                "file": [
                    {
                        "name": "addressbook.proto",
                        "package": "tutorial",
                        "enumType": [ { "name": "Kind", "value": [ { "name": "KIND_A", "number": 0 } ] } ],
                        "messageType": [
                            {
                                "name": "Person",
                                "nestedType": [ { "name": "PhoneNumber" } ],
                                "enumType": [ { "name": "PhoneType" } ]
                            }
                        ]
                    },
                    { "name": "bare.proto", "messageType": [ { "name": "Loose" } ] }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_indexes_nested_types() {
        let set = sample();
        let pool = DescriptorPool::new(&set).unwrap();
        assert_eq!(pool.len(), 5);

        let phone = pool.get("tutorial.Person.PhoneNumber").unwrap();
        assert_eq!(phone.local_name, "Person.PhoneNumber");
        assert_eq!(phone.file.name, "addressbook.proto");
        assert!(matches!(phone.node, TypeNode::Message(_)));

        let phone_type = pool.get(".tutorial.Person.PhoneType").unwrap();
        assert_eq!(phone_type.full_name, "tutorial.Person.PhoneType");
        assert!(matches!(phone_type.node, TypeNode::Enum(_)));
    }

    #[test]
    fn test_file_without_package() {
        let set = sample();
        let pool = DescriptorPool::new(&set).unwrap();
        let loose = pool.get(".Loose").unwrap();
        assert_eq!(loose.full_name, "Loose");
        assert_eq!(loose.local_name, "Loose");
        assert!(pool.get("tutorial.Missing").is_none());
    }

    #[test]
    fn test_duplicate_type_is_rejected() {
        let set = DescriptorSet::from_json_str(
            r#"{ "file": [
                { "name": "a.proto", "package": "p", "messageType": [ { "name": "M" } ] },
                { "name": "b.proto", "package": "p", "enumType": [ { "name": "M" } ] }
            ] }"#,
        )
        .unwrap();
        let err = DescriptorPool::new(&set).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateType(name) if name == "p.M"));
    }
}
