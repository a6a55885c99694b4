//! Command-line frontend: validate, convert and fingerprint instance
//! documents against a schema pack. The engine crates expose no CLI of
//! their own; this binary is the only process-shaped component.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value as JsonValue;

use stannum_format::{from_json, from_xml, to_json_string, to_xml, ParseOptions};
use stannum_model::{fingerprint_hex, Instance};
use stannum_schema::SchemaRegistry;
use stannum_validator::Validator;

#[derive(Parser)]
#[command(name = "stannum", about = "Schema-driven FHIR model engine", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate an instance document; exits non-zero when invalid
    Validate(CommonArgs),
    /// Convert an instance document between JSON and XML
    Convert(ConvertArgs),
    /// Print the structural SHA-256 fingerprint of an instance document
    Fingerprint(CommonArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Schema pack (JSON document)
    #[arg(long, value_name = "FILE")]
    schema: PathBuf,

    /// Type to parse as; defaults to the document's resourceType (JSON only)
    #[arg(long = "type", value_name = "NAME")]
    type_name: Option<String>,

    /// Treat the input as XML rather than JSON
    #[arg(long)]
    xml: bool,

    /// Reject unknown fields on non-extensible types
    #[arg(long)]
    strict: bool,

    /// Instance document
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

#[derive(Args)]
struct ConvertArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Xml)]
    to: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Xml,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    match Cli::parse().command {
        Command::Validate(args) => {
            let registry = load_registry(&args.schema)?;
            let instance = parse_input(&registry, &args)?;

            let validator = Validator::new(Arc::new(registry));
            let outcome = validator.validate(&instance)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&outcome.to_operation_outcome())?
            );
            Ok(if outcome.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Convert(args) => {
            let registry = load_registry(&args.common.schema)?;
            let instance = parse_input(&registry, &args.common)?;

            let output = match args.to {
                OutputFormat::Json => to_json_string(&instance, &registry)?,
                OutputFormat::Xml => to_xml(&instance, &registry)?,
            };
            println!("{output}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Fingerprint(args) => {
            let registry = load_registry(&args.schema)?;
            let instance = parse_input(&registry, &args)?;
            println!("{}", fingerprint_hex(&instance, &registry)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_registry(path: &PathBuf) -> Result<SchemaRegistry> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading schema pack {}", path.display()))?;
    stannum_schema::load_str(&text)
        .with_context(|| format!("loading schema pack {}", path.display()))
}

fn parse_input(registry: &SchemaRegistry, args: &CommonArgs) -> Result<Instance> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let options = if args.strict {
        ParseOptions::strict()
    } else {
        ParseOptions::lenient()
    };

    if args.xml {
        let Some(type_name) = args.type_name.as_deref() else {
            bail!("--type is required for XML input");
        };
        return Ok(from_xml(&text, type_name, registry, &options)?);
    }

    let doc: JsonValue = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", args.input.display()))?;
    let type_name = match args.type_name.as_deref() {
        Some(name) => name.to_string(),
        None => doc
            .get("resourceType")
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .context("document has no resourceType; pass --type")?,
    };
    Ok(from_json(&doc, &type_name, registry, &options)?)
}
