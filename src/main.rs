//! typebridge CLI - documentation tools for the reflected type catalogue
//!
//! Commands:
//!   typebridge dump [TYPE]       - Display the schema of one or all types
//!   typebridge formats           - List the registered formats
//!   typebridge check-selector    - Validate a format selector given as JSON

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use typebridge::{Context, Format, Formats, Limits, Registry, TypeSchema};

#[derive(Parser)]
#[command(name = "typebridge")]
#[command(about = "Inspect the types and formats known to typebridge", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the schema of every registered type, or of one type
    Dump {
        /// Type name, e.g. Vector3
        type_name: Option<String>,

        /// Show schema fingerprints
        #[arg(long, short = 'H')]
        hashes: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the registered formats and their options
    Formats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a format selector written as JSON, e.g. '{"Format":"csv"}'
    CheckSelector {
        selector: String,

        /// JSON file with conversion limits
        #[arg(long)]
        limits: Option<std::path::PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("TYPEBRIDGE_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Dump {
            type_name,
            hashes,
            json,
        } => dump_command(type_name.as_deref(), hashes, json),
        Commands::Formats { json } => formats_command(json),
        Commands::CheckSelector { selector, limits } => {
            check_selector_command(&selector, limits.as_deref())
        }
    }
}

fn dump_command(type_name: Option<&str>, show_hashes: bool, json: bool) -> anyhow::Result<()> {
    let registry = Registry::global();
    let schemas: Vec<TypeSchema> = match type_name {
        Some(name) => vec![registry.get(name)?.schema()],
        None => registry.all().map(|r| r.schema()).collect(),
    };
    debug!(count = schemas.len(), "dumping schemas");

    if json {
        let output: Vec<serde_json::Value> = schemas
            .iter()
            .map(|schema| schema_to_json(schema, show_hashes))
            .collect::<anyhow::Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for schema in &schemas {
        print!("{}", schema.render());
        if show_hashes {
            println!("  hash: {}", schema.hash().short());
        }
    }
    Ok(())
}

fn schema_to_json(schema: &TypeSchema, show_hashes: bool) -> anyhow::Result<serde_json::Value> {
    let mut value = serde_json::to_value(schema)?;
    if show_hashes {
        if let Some(map) = value.as_object_mut() {
            map.insert("hash".into(), schema.hash().to_hex().into());
        }
    }
    Ok(value)
}

fn formats_command(json: bool) -> anyhow::Result<()> {
    let formats = Formats::global();
    if json {
        let output = serde_json::Value::Array(formats.all().map(format_to_json).collect());
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for format in formats.all() {
        let media = if format.media_types.is_empty() {
            String::new()
        } else {
            format!(" ({})", format.media_types.join(", "))
        };
        println!("{}{}", format.name, media);
        for (option, types) in format.options {
            println!("  {}: {}", option, types.join(" | "));
        }
        if format.allow_extra {
            println!("  (extra options ignored)");
        }
    }
    Ok(())
}

fn format_to_json(format: &Format) -> serde_json::Value {
    serde_json::json!({
        "name": format.name,
        "media_types": format.media_types,
        "options": format.options.iter().map(|(name, types)| serde_json::json!({
            "name": name,
            "types": types,
        })).collect::<Vec<_>>(),
        "allow_extra": format.allow_extra,
        "encode": format.encode.is_some(),
        "decode": format.decode.is_some(),
    })
}

fn check_selector_command(
    selector: &str,
    limits: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let limits = match limits {
        Some(path) => Limits::load(path)?,
        None => Limits::default(),
    };
    let ctx = Context::new(Registry::global(), Formats::global()).with_limits(limits);

    let json: serde_json::Value =
        serde_json::from_str(selector).context("selector is not valid JSON")?;
    let dynamic = json_to_dynamic(&json);
    let resolved = typebridge::format::resolve(&ctx, &dynamic)?;

    println!("format: {}", resolved.format);
    for (name, value) in &resolved.options {
        println!("  {}: {:?}", name, value);
    }
    Ok(())
}

/// JSON as a script would write it: objects and arrays become tables.
fn json_to_dynamic(json: &serde_json::Value) -> typebridge::Dynamic {
    use typebridge::{Dynamic, Table};

    match json {
        serde_json::Value::Null => Dynamic::Nil,
        serde_json::Value::Bool(b) => Dynamic::Bool(*b),
        serde_json::Value::Number(n) => Dynamic::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Dynamic::string(s),
        serde_json::Value::Array(items) => {
            Dynamic::Table(Table::from_seq(items.iter().map(json_to_dynamic).collect()))
        }
        serde_json::Value::Object(map) => Dynamic::Table(Table::from_fields(
            map.iter().map(|(k, v)| (k.as_str(), json_to_dynamic(v))),
        )),
    }
}
