use std::io::Write;

use delphi_proto_schema::{DescriptorPool, DescriptorSet};
use tracing::debug;

use crate::{
    error::GenerateError,
    gen_delphi::render_unit,
    options::Options,
    resolver::Resolver,
    types::UnitPlan,
};

/// Suffix of every generated source file.
pub const UNIT_FILE_SUFFIX: &str = ".pas";

/// A rendered Delphi unit.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedUnit {
    pub unit_name: String,
    pub file_name: String,
    pub content:   String,
}

/// Generates one unit per `.proto` file. Options are fixed at construction;
/// every call builds its own traversal state, so one generator can serve
/// any number of files.
#[derive(Debug, Clone, Copy, Default)]
pub struct Generator {
    options: Options,
}

impl Generator {
    pub fn new(options: Options) -> Self {
        Generator { options }
    }

    /// Resolves the declarations of `file_name` without rendering them.
    pub fn plan(&self, pool: &DescriptorPool<'_>, file_name: &str) -> Result<UnitPlan, GenerateError> {
        let file = pool
            .file(file_name)
            .ok_or_else(|| GenerateError::UnknownFile(file_name.to_string()))?;
        let plan = Resolver::new(pool, self.options).resolve_file(file)?;
        debug!(
            file = file_name,
            unit = %plan.unit_name,
            declarations = plan.declarations.len(),
            "resolved unit"
        );
        Ok(plan)
    }

    /// Writes the unit for `file_name` to `sink`. On error the sink holds
    /// an incomplete unit and should be discarded.
    pub fn generate_to<W: Write>(
        &self,
        pool: &DescriptorPool<'_>,
        file_name: &str,
        sink: W,
    ) -> Result<W, GenerateError> {
        let plan = self.plan(pool, file_name)?;
        render_unit(&plan, sink)
    }

    pub fn generate(&self, pool: &DescriptorPool<'_>, file_name: &str) -> Result<GeneratedUnit, GenerateError> {
        let plan = self.plan(pool, file_name)?;
        let content = String::from_utf8(render_unit(&plan, Vec::new())?)?;
        Ok(GeneratedUnit {
            file_name: format!("{}{}", plan.unit_name, UNIT_FILE_SUFFIX),
            unit_name: plan.unit_name,
            content,
        })
    }
}

/// Generates a unit for every file in `set`, in set order.
pub fn generate_units(set: &DescriptorSet, options: Options) -> Result<Vec<GeneratedUnit>, GenerateError> {
    let pool = DescriptorPool::new(set)?;
    let generator = Generator::new(options);
    set.files
        .iter()
        .map(|file| generator.generate(&pool, &file.name))
        .collect()
}
