use serde::Serialize;

/// Everything needed to print one Delphi unit, resolved ahead of rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitPlan {
    pub unit_name:    String,
    pub uses:         Vec<String>,
    /// In dependency order: every declaration precedes its first use.
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Declaration {
    Record(RecordDecl),
    Enumeration(EnumDecl),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Record(record) => &record.name,
            Declaration::Enumeration(enumeration) => &enumeration.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordDecl {
    pub name:    String,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Member {
    Field(FieldDecl),
    Oneof(OneofDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDecl {
    pub name:      String,
    pub tag:       i32,
    pub type_name: String,
    pub options:   Vec<FieldOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldOption {
    Required,
    UnPacked,
    Default(String),
    FieldName(String),
}

/// A tagged union flattened into a nested record: a discriminant followed
/// by one field per branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OneofDecl {
    pub name:         String,
    pub discriminant: Vec<EnumEntry>,
    pub fields:       Vec<FieldDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDecl {
    pub name:    String,
    pub entries: Vec<EnumEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumEntry {
    pub name:        String,
    pub value:       i32,
    /// Filler for a number the schema does not declare.
    pub placeholder: bool,
}
