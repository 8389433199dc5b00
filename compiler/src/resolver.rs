//! Walks a file's reachable type graph and produces a [`UnitPlan`].
//!
//! Types are resolved depth first: a field referring to a type that has not
//! been declared yet resolves that type before its own record is finished,
//! so the declaration list comes out in first-use order with every type
//! ahead of the records that mention it.

use std::collections::HashSet;

use delphi_proto_schema::{
    qualify, DescriptorPool, EnumDescriptor, FieldDescriptor, FieldType, FileDescriptor,
    MessageDescriptor, OneofDescriptor, TypeEntry, TypeNode,
};
use tracing::{debug, warn};

use crate::{
    error::GenerateError,
    literal::render_default,
    naming::{
        array_of, escape_reserved_word, field_decl_name, strip_enum_prefix, to_pascal_case,
        type_decl_name, unit_name_from_path,
    },
    options::Options,
    registry::TypeRegistry,
    types::{
        Declaration, EnumDecl, EnumEntry, FieldDecl, FieldOption, Member, OneofDecl, RecordDecl,
        UnitPlan,
    },
};

pub const PROTOBUF_UNIT: &str = "Delphi.Serial.Protobuf";
pub const SERIAL_UNIT: &str = "Delphi.Serial";

/// Name of the synthetic discriminant inside a flattened oneof record.
pub const ONEOF_CASE_FIELD: &str = "FCase";

/// Delphi spelling of a scalar field kind, as bound by the protobuf runtime
/// unit. `None` for kinds that reference a declared type.
pub fn scalar_type_name(kind: FieldType) -> Option<&'static str> {
    let name = match kind {
        FieldType::Double => "Double",
        FieldType::Float => "Float",
        FieldType::Int64 => "Int64",
        FieldType::Uint64 => "UInt64",
        FieldType::Int32 => "Int32",
        FieldType::Fixed64 => "Fixed64",
        FieldType::Fixed32 => "Fixed32",
        FieldType::Bool => "Boolean",
        FieldType::String => "string",
        FieldType::Bytes => "TBytes",
        FieldType::Uint32 => "UInt32",
        FieldType::Sfixed32 => "SFixed32",
        FieldType::Sfixed64 => "SFixed64",
        FieldType::Sint32 => "SInt32",
        FieldType::Sint64 => "SInt64",
        FieldType::Message | FieldType::Group | FieldType::Enum => return None,
    };
    Some(name)
}

/// Per-enum bookkeeping: the next number the output expects and the
/// identifiers already taken in this enum.
struct EnumRenderContext {
    prefix:      String,
    next_number: i32,
    used:        HashSet<String>,
}

impl EnumRenderContext {
    fn new(prefix: String) -> Self {
        EnumRenderContext {
            prefix,
            next_number: 0,
            used: HashSet::new(),
        }
    }

    /// Pads `entries` with `_unusedN` placeholders up to (excluding) `number`.
    /// Delphi enumerations are dense, so an entry's position must equal its
    /// value.
    fn fill_gaps(&mut self, number: i32, entries: &mut Vec<EnumEntry>) {
        for k in self.next_number..number {
            entries.push(EnumEntry {
                name:        format!("_unused{}", k),
                value:       k,
                placeholder: true,
            });
        }
    }

    /// Reserves `name` (case-insensitively). Returns `false` if it is taken.
    fn claim(&mut self, name: &str) -> bool {
        self.used.insert(name.to_ascii_lowercase())
    }

    fn advance_past(&mut self, number: i32) {
        self.next_number = number.saturating_add(1);
    }
}

enum Reservation {
    /// Newly reserved; the caller builds the declaration.
    Fresh(String),
    /// Declared earlier in this unit, or in progress further up the stack.
    Declared(String),
}

/// Traversal state for one unit. Built fresh for every generation call.
pub struct Resolver<'p, 'a> {
    pool:         &'p DescriptorPool<'a>,
    options:      Options,
    registry:     TypeRegistry,
    declarations: Vec<Declaration>,
}

impl<'p, 'a> Resolver<'p, 'a> {
    pub fn new(pool: &'p DescriptorPool<'a>, options: Options) -> Self {
        Resolver {
            pool,
            options,
            registry: TypeRegistry::new(),
            declarations: Vec::new(),
        }
    }

    pub fn resolve_file(mut self, file: &'a FileDescriptor) -> Result<UnitPlan, GenerateError> {
        let package = file.package.as_deref().unwrap_or("");

        // Without emit_unused_types, enums are declared lazily on first use.
        if self.options.emit_unused_types {
            for enum_desc in &file.enum_type {
                self.resolve_named(&qualify(package, &enum_desc.name), &enum_desc.name)?;
            }
        }
        for message in &file.message_type {
            self.resolve_named(&qualify(package, &message.name), &message.name)?;
        }

        let mut uses = Vec::new();
        if self.options.emit_json_names {
            uses.push(SERIAL_UNIT.to_string());
        }
        uses.push(PROTOBUF_UNIT.to_string());

        Ok(UnitPlan {
            unit_name: unit_name_from_path(&file.name),
            uses,
            declarations: self.declarations,
        })
    }

    /// Resolves a type by fully-qualified name; `referrer` names the field
    /// (or declaration) that asked for it, for error reporting.
    fn resolve_named(&mut self, full_name: &str, referrer: &str) -> Result<String, GenerateError> {
        let pool = self.pool;
        let entry = pool.get(full_name).ok_or_else(|| GenerateError::UnresolvedType {
            type_name: full_name.to_string(),
            field:     referrer.to_string(),
        })?;
        self.resolve_entry(entry)
    }

    fn resolve_entry(&mut self, entry: &TypeEntry<'a>) -> Result<String, GenerateError> {
        match entry.node {
            TypeNode::Message(message) => self.resolve_message(entry, message),
            TypeNode::Enum(enum_desc) => self.resolve_enum(entry, enum_desc),
        }
    }

    /// Picks the declared name for `entry`. The package-relative name is
    /// preferred; when another type already holds it, the package is
    /// flattened in as well.
    fn reserve(&mut self, entry: &TypeEntry<'a>) -> Result<Reservation, GenerateError> {
        if let Some(name) = self.registry.declared_name(&entry.full_name) {
            return Ok(Reservation::Declared(name.to_string()));
        }
        let local = type_decl_name(&entry.local_name);
        if self.registry.try_begin(&entry.full_name, &local) {
            return Ok(Reservation::Fresh(local));
        }
        let qualified = type_decl_name(&entry.full_name);
        if self.registry.try_begin(&entry.full_name, &qualified) {
            debug!(type_name = %entry.full_name, taken = %local, declared = %qualified, "qualifying clashing name");
            return Ok(Reservation::Fresh(qualified));
        }
        Err(GenerateError::NameCollision {
            type_name: entry.full_name.clone(),
            name:      qualified,
        })
    }

    fn resolve_message(
        &mut self,
        entry: &TypeEntry<'a>,
        message: &'a MessageDescriptor,
    ) -> Result<String, GenerateError> {
        let name = match self.reserve(entry)? {
            Reservation::Fresh(name) => name,
            Reservation::Declared(name) => return Ok(name),
        };
        debug!(record = %name, message = %entry.full_name, "resolving record");

        if self.options.emit_unused_types {
            for enum_desc in &message.enum_type {
                self.resolve_named(&qualify(&entry.full_name, &enum_desc.name), &enum_desc.name)?;
            }
            for nested in &message.nested_type {
                self.resolve_named(&qualify(&entry.full_name, &nested.name), &nested.name)?;
            }
        }

        let members = self.resolve_members(entry.file, message)?;
        self.declarations.push(Declaration::Record(RecordDecl {
            name: name.clone(),
            members,
        }));
        Ok(name)
    }

    /// Lays out a record's members in schema order. Consecutive fields of
    /// the same oneof share a single nested block.
    fn resolve_members(
        &mut self,
        file: &'a FileDescriptor,
        message: &'a MessageDescriptor,
    ) -> Result<Vec<Member>, GenerateError> {
        let mut members = Vec::with_capacity(message.fields.len());
        let mut open_block: Option<OneofDecl> = None;
        let mut open_index: Option<usize> = None;

        for field in &message.fields {
            let oneof = message.containing_oneof(field);
            let index = oneof.map(|(index, _)| index);
            if index != open_index {
                if let Some(block) = open_block.take() {
                    members.push(Member::Oneof(block));
                }
                if let Some((index, oneof_desc)) = oneof {
                    open_block = Some(open_oneof(message, index, oneof_desc));
                }
                open_index = index;
            }

            let decl = self.resolve_field(file, field)?;
            match open_block.as_mut() {
                Some(block) => block.fields.push(decl),
                None => members.push(Member::Field(decl)),
            }
        }
        if let Some(block) = open_block.take() {
            members.push(Member::Oneof(block));
        }
        Ok(members)
    }

    fn resolve_field(
        &mut self,
        file: &'a FileDescriptor,
        field: &'a FieldDescriptor,
    ) -> Result<FieldDecl, GenerateError> {
        let (element, enum_type) = self.resolve_field_type(field)?;
        let type_name = if field.is_repeated() { array_of(&element) } else { element };

        let mut options = Vec::new();
        if field.is_required() {
            options.push(FieldOption::Required);
        }
        if field.is_packable() && !field.is_packed(file) {
            options.push(FieldOption::UnPacked);
        }
        if let Some(raw) = &field.default_value {
            let literal = render_default(field.kind, raw, enum_type);
            if !literal.is_empty() {
                options.push(FieldOption::Default(literal));
            }
        }
        if self.options.emit_json_names {
            options.push(FieldOption::FieldName(field.json_name()));
        }

        Ok(FieldDecl {
            name: field_decl_name(&field.name),
            tag: field.number,
            type_name,
            options,
        })
    }

    /// The element type of a field, plus the enum it refers to, if any.
    fn resolve_field_type(
        &mut self,
        field: &'a FieldDescriptor,
    ) -> Result<(String, Option<&'a EnumDescriptor>), GenerateError> {
        if let Some(scalar) = scalar_type_name(field.kind) {
            return Ok((scalar.to_string(), None));
        }
        let type_name = field.type_name.as_deref().unwrap_or_default();
        let pool = self.pool;
        let entry = pool.get(type_name).ok_or_else(|| GenerateError::UnresolvedType {
            type_name: type_name.to_string(),
            field:     field.name.clone(),
        })?;
        let enum_type = match entry.node {
            TypeNode::Enum(enum_desc) => Some(enum_desc),
            TypeNode::Message(_) => None,
        };
        Ok((self.resolve_entry(entry)?, enum_type))
    }

    fn resolve_enum(
        &mut self,
        entry: &TypeEntry<'a>,
        enum_desc: &'a EnumDescriptor,
    ) -> Result<String, GenerateError> {
        let name = match self.reserve(entry)? {
            Reservation::Fresh(name) => name,
            Reservation::Declared(name) => return Ok(name),
        };
        debug!(enumeration = %name, values = enum_desc.values.len(), "resolving enumeration");

        let mut values: Vec<_> = enum_desc.values.iter().collect();
        values.sort_by_key(|value| value.number);

        let mut context = EnumRenderContext::new(to_pascal_case(&enum_desc.name));
        let mut entries = Vec::with_capacity(values.len());
        for value in values {
            context.fill_gaps(value.number, &mut entries);
            let ident = strip_enum_prefix(&value.name, &context.prefix);
            if !context.claim(&ident) {
                warn!(
                    enumeration = %name,
                    value = %value.name,
                    number = value.number,
                    identifier = %ident,
                    "dropping enum value whose identifier is already used"
                );
                continue;
            }
            entries.push(EnumEntry {
                name:        escape_reserved_word(&ident),
                value:       value.number,
                placeholder: false,
            });
            context.advance_past(value.number);
        }

        self.declarations.push(Declaration::Enumeration(EnumDecl {
            name: name.clone(),
            entries,
        }));
        Ok(name)
    }
}

/// Starts the nested block for a oneof: its discriminant lists an
/// unspecified case at 0, then every branch from 1 in declaration order.
///
/// Every case needs its own member, so a branch whose identifier is taken
/// gets its case number appended instead of being dropped.
fn open_oneof(message: &MessageDescriptor, index: usize, oneof: &OneofDescriptor) -> OneofDecl {
    let unspecified = format!("{}Unspecified", to_pascal_case(&oneof.name));
    let mut used = HashSet::from([unspecified.to_ascii_lowercase()]);
    let mut discriminant = vec![EnumEntry {
        name:        escape_reserved_word(&unspecified),
        value:       0,
        placeholder: false,
    }];
    for (value, branch) in (1..).zip(message.oneof_fields(index)) {
        let base = to_pascal_case(&branch.name);
        let mut ident = base.clone();
        let mut suffix = value;
        while !used.insert(ident.to_ascii_lowercase()) {
            ident = format!("{}{}", base, suffix);
            suffix += 1;
        }
        if ident != base {
            warn!(
                oneof = %oneof.name,
                branch = %branch.name,
                identifier = %ident,
                "renaming oneof case whose identifier is already used"
            );
        }
        discriminant.push(EnumEntry {
            name: escape_reserved_word(&ident),
            value,
            placeholder: false,
        });
    }
    OneofDecl {
        name: field_decl_name(&oneof.name),
        discriminant,
        fields: Vec::new(),
    }
}
