use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use delphi_proto_compiler::{GenerateError, Generator, Options};
use delphi_proto_schema::{DescriptorPool, DescriptorSet, SchemaError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode plan: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser)]
#[command(name = "protoc-gen-delphi")]
#[command(about = "Generate Delphi record declarations from protobuf descriptor sets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct OptionArgs {
    /// Annotate fields with their JSON names
    #[arg(long)]
    emit_json_names: bool,

    /// Declare enums and nested messages no field refers to
    #[arg(long)]
    emit_unused_types: bool,

    /// protoc-style parameter string, e.g. `emit_json_names,emit_unused_types`
    #[arg(long, default_value = "")]
    parameter: String,
}

impl OptionArgs {
    fn options(&self) -> Options {
        Options::from_parameter(&self.parameter).merge(Options {
            emit_json_names:   self.emit_json_names,
            emit_unused_types: self.emit_unused_types,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one `.pas` unit per `.proto` file in a JSON descriptor set
    Generate {
        /// Input descriptor set (JSON form of a `FileDescriptorSet`)
        #[arg(short, long)]
        input: PathBuf,

        /// Directory receiving the generated units
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Only generate these `.proto` files (defaults to every file in the set)
        #[arg(short, long)]
        file: Vec<String>,

        /// Print the units to stdout instead of writing files
        #[arg(long)]
        stdout: bool,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Print the resolved declarations of one file as JSON
    Plan {
        /// Input descriptor set (JSON form of a `FileDescriptorSet`)
        #[arg(short, long)]
        input: PathBuf,

        /// The `.proto` file to resolve
        #[arg(short, long)]
        file: String,

        #[command(flatten)]
        options: OptionArgs,
    },
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate { input, output_dir, file, stdout, options } => {
            let set = DescriptorSet::from_json_file(input)?;
            let pool = DescriptorPool::new(&set)?;
            let generator = Generator::new(options.options());

            let files: Vec<&str> = if file.is_empty() {
                set.files.iter().map(|f| f.name.as_str()).collect()
            } else {
                file.iter().map(String::as_str).collect()
            };

            if !*stdout {
                fs::create_dir_all(output_dir)?;
            }
            for name in files {
                let unit = generator.generate(&pool, name)?;
                if *stdout {
                    print!("{}", unit.content);
                } else {
                    let out_path = output_dir.join(&unit.file_name);
                    fs::write(&out_path, &unit.content)?;
                    info!(file = name, unit = %unit.unit_name, "generated unit");
                    println!("Generated {} → {}", name, out_path.display());
                }
            }
            Ok(())
        }

        Commands::Plan { input, file, options } => {
            let set = DescriptorSet::from_json_file(input)?;
            let pool = DescriptorPool::new(&set)?;
            let plan = Generator::new(options.options()).plan(&pool, file)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
            Ok(())
        }
    }
}
