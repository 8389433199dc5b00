use std::io::Write;

use crate::{
    error::GenerateError,
    literal::quote_string,
    printer::Printer,
    resolver::ONEOF_CASE_FIELD,
    types::{Declaration, EnumDecl, EnumEntry, FieldDecl, FieldOption, Member, OneofDecl, RecordDecl, UnitPlan},
};

/// Prints a resolved unit to `sink` and hands the sink back.
pub fn render_unit<W: Write>(plan: &UnitPlan, sink: W) -> Result<W, GenerateError> {
    let mut printer = Printer::new(sink);

    printer.set("unitname", plan.unit_name.as_str());
    printer.print("unit $unitname$;\n\n")?;
    printer.print("{$$SCOPEDENUMS ON}\n\n")?;
    printer.print("interface\n\n")?;

    if !plan.uses.is_empty() {
        printer.print("uses\n")?;
        printer.indent();
        for (i, unit) in plan.uses.iter().enumerate() {
            printer.set("usedunit", unit.as_str());
            if i + 1 == plan.uses.len() {
                printer.print("$usedunit$;\n\n")?;
            } else {
                printer.print("$usedunit$,\n")?;
            }
        }
        printer.outdent();
    }

    printer.print("type\n\n")?;
    printer.indent();
    for declaration in &plan.declarations {
        match declaration {
            Declaration::Record(record) => render_record(&mut printer, record)?,
            Declaration::Enumeration(enumeration) => render_enum(&mut printer, enumeration)?,
        }
    }
    printer.outdent();

    printer.print("implementation\n\n")?;
    printer.print("end.\n")?;
    Ok(printer.into_inner())
}

fn render_record<W: Write>(printer: &mut Printer<W>, record: &RecordDecl) -> Result<(), GenerateError> {
    printer.set("recordname", record.name.as_str());
    printer.print("$recordname$ = record\n")?;
    printer.indent();
    for member in &record.members {
        match member {
            Member::Field(field) => render_field(printer, field)?,
            Member::Oneof(oneof) => render_oneof(printer, oneof)?,
        }
    }
    printer.outdent();
    printer.print("end;\n\n")
}

fn render_oneof<W: Write>(printer: &mut Printer<W>, oneof: &OneofDecl) -> Result<(), GenerateError> {
    printer.set("oneofname", oneof.name.as_str());
    printer.set("casefield", ONEOF_CASE_FIELD);
    printer.set("caseentries", inline_entries(&oneof.discriminant));
    printer.print("$oneofname$: record\n")?;
    printer.indent();
    printer.print("$casefield$: ($caseentries$);\n")?;
    for field in &oneof.fields {
        render_field(printer, field)?;
    }
    printer.outdent();
    printer.print("end;\n")
}

fn render_field<W: Write>(printer: &mut Printer<W>, field: &FieldDecl) -> Result<(), GenerateError> {
    let options: String = field
        .options
        .iter()
        .map(|option| match option {
            FieldOption::Required => ", Required".to_string(),
            FieldOption::UnPacked => ", UnPacked".to_string(),
            FieldOption::Default(literal) => format!(", Default({})", literal),
            FieldOption::FieldName(name) => format!(", FieldName({})", quote_string(name)),
        })
        .collect();

    printer.set("fieldtag", field.tag.to_string());
    printer.set("fieldoptions", options);
    printer.set("fieldname", field.name.as_str());
    printer.set("fieldtype", field.type_name.as_str());
    printer.print("[Tag($fieldtag$)$fieldoptions$] $fieldname$: $fieldtype$;\n")
}

fn render_enum<W: Write>(printer: &mut Printer<W>, enumeration: &EnumDecl) -> Result<(), GenerateError> {
    printer.set("enumname", enumeration.name.as_str());
    printer.print("$enumname$ = (\n")?;
    printer.indent();
    for (i, entry) in enumeration.entries.iter().enumerate() {
        printer.set("valuename", entry.name.as_str());
        printer.set("valuenumber", entry.value.to_string());
        if i + 1 == enumeration.entries.len() {
            printer.print("$valuename$ = $valuenumber$\n")?;
        } else {
            printer.print("$valuename$ = $valuenumber$,\n")?;
        }
    }
    printer.outdent();
    printer.print(");\n\n")
}

fn inline_entries(entries: &[EnumEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("{} = {}", entry.name, entry.value))
        .collect::<Vec<_>>()
        .join(", ")
}
