use std::collections::BTreeMap;
use std::io::Write;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::error::GenerateError;

lazy_static! {
    /// `$name$` is a variable reference, `$$` a literal dollar sign.
    static ref PLACEHOLDER: Regex = Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)?\$").unwrap();
}

const INDENT: &str = "  ";

/// Indentation-aware template writer.
///
/// Every line written while the indent level is `n` is prefixed with `n`
/// indent units; blank lines stay blank. `indent` and `outdent` calls must
/// be paired by the caller.
pub struct Printer<W: Write> {
    sink:          W,
    indent:        usize,
    at_line_start: bool,
    variables:     BTreeMap<String, String>,
}

impl<W: Write> Printer<W> {
    pub fn new(sink: W) -> Self {
        Printer {
            sink,
            indent:        0,
            at_line_start: true,
            variables:     BTreeMap::new(),
        }
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.variables.insert(name.to_string(), value.into());
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn outdent(&mut self) {
        debug_assert!(self.indent > 0, "outdent without matching indent");
        self.indent = self.indent.saturating_sub(1);
    }

    /// Substitutes the current variables into `template` and writes it.
    pub fn print(&mut self, template: &str) -> Result<(), GenerateError> {
        let text = self.substitute(template)?;
        for segment in text.split_inclusive('\n') {
            if self.at_line_start && segment != "\n" {
                for _ in 0..self.indent {
                    self.sink.write_all(INDENT.as_bytes())?;
                }
            }
            self.sink.write_all(segment.as_bytes())?;
            self.at_line_start = segment.ends_with('\n');
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn substitute(&self, template: &str) -> Result<String, GenerateError> {
        let mut result = String::with_capacity(template.len());
        let mut last_end = 0;
        for caps in PLACEHOLDER.captures_iter(template) {
            let Some(whole) = caps.get(0) else { continue };
            result.push_str(&template[last_end..whole.start()]);
            result.push_str(self.lookup(&caps)?);
            last_end = whole.end();
        }
        result.push_str(&template[last_end..]);
        Ok(result)
    }

    fn lookup<'t>(&'t self, caps: &Captures<'_>) -> Result<&'t str, GenerateError> {
        match caps.get(1) {
            None => Ok("$"),
            Some(name) => self
                .variables
                .get(name.as_str())
                .map(String::as_str)
                .ok_or_else(|| GenerateError::UndefinedVariable(name.as_str().to_string())),
        }
    }
}
