//! Genex Registry Binary
//!
//! Run with: `genex [OPTIONS] <COMMAND>`

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use genexc::compose::{self, Thunk};
use genexc::config::OutputFormat;
use genexc::value::MISSING;
use genexc::{Config, Registry, Resolution, Signature, Type, Value};

#[derive(Parser)]
#[command(name = "genex")]
#[command(about = "Inspect and query the genex function registry")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (TOML)
    #[arg(short = 'c', long, env = "GENEX_CONFIG")]
    config: Option<PathBuf>,

    /// Output format, overriding the configuration
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Only resolve exact signatures
    #[arg(long)]
    strict: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered bindings
    Catalog {
        /// Only list overloads of this name
        name: Option<String>,
    },
    /// Resolve a name against argument types, e.g. `resolve max Int Double`
    Resolve {
        name: String,

        /// Argument types; for methods and fields the first is the receiver
        #[arg(value_name = "TYPE")]
        types: Vec<String>,

        /// Signature kind to resolve
        #[arg(short, long, value_enum, default_value = "function")]
        kind: Kind,
    },
    /// Resolve and invoke a function on literal arguments
    ///
    /// Literals are typed by shape: `true`/`false` are Boolean, integers are
    /// Int (or Long when out of range), decimals are Double, and anything
    /// else is a String. `NA:<Type>` is a missing value of that type.
    Call {
        name: String,

        #[arg(value_name = "LITERAL", allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Print the default configuration
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Field,
    Method,
    Function,
}

/// One catalog row.
#[derive(Serialize)]
struct BindingView {
    name: String,
    kind: String,
    signature: String,
    returns: String,
    partial: bool,
}

/// A successful resolution.
#[derive(Serialize)]
struct ResolutionView {
    signature: String,
    priority: u32,
    returns: String,
}

#[derive(Serialize)]
struct CallView {
    signature: String,
    returns: String,
    value: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    if let Commands::Config = cli.command {
        print!("{}", Config::default().to_toml()?);
        return Ok(());
    }

    let config = build_config(&cli)?;
    let registry = Registry::from_config(&config);
    let format = config.output.format;

    match &cli.command {
        Commands::Catalog { name } => list_catalog(&registry, name.as_deref(), format),
        Commands::Resolve { name, types, kind } => resolve(&registry, name, types, *kind, format),
        Commands::Call { name, args } => call(&registry, name, args, format),
        Commands::Config => Ok(()),
    }
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?;
            info!("Loaded config from {}", path.display());
            config
        }
        None => Config::default(),
    };

    // CLI flags override the file
    if cli.strict {
        config.dispatch.implicit_conversions = false;
    }
    if let Some(format) = cli.format {
        config.output.format = match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        };
    }
    debug!(?config, "effective configuration");
    Ok(config)
}

fn list_catalog(registry: &Registry, name: Option<&str>, format: OutputFormat) -> Result<()> {
    let rows: Vec<BindingView> = registry
        .bindings()
        .filter(|(n, _)| name.map_or(true, |wanted| *n == wanted))
        .map(|(n, binding)| BindingView {
            name: n.to_string(),
            kind: binding.signature.kind().to_string(),
            signature: binding.signature.display_call(n),
            returns: binding.callable.ret().to_string(),
            partial: binding.callable.is_partial(),
        })
        .collect();

    if let Some(name) = name {
        if rows.is_empty() {
            bail!("no bindings named `{name}`");
        }
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Text => {
            let width = rows.iter().map(|r| r.signature.len()).max().unwrap_or(0);
            for row in &rows {
                let partial = if row.partial { " (partial)" } else { "" };
                println!("{:<width$}  -> {}{partial}", row.signature, row.returns);
            }
        }
    }
    Ok(())
}

fn parse_types(types: &[String]) -> Result<Vec<Type>> {
    types
        .iter()
        .map(|t| t.parse::<Type>().map_err(anyhow::Error::from))
        .collect()
}

fn requested_signature(kind: Kind, types: Vec<Type>) -> Result<Signature> {
    let mut types = types.into_iter();
    Ok(match kind {
        Kind::Function => Signature::function(types),
        Kind::Field => match (types.next(), types.next()) {
            (Some(receiver), None) => Signature::field(receiver),
            _ => bail!("a field lookup takes exactly one receiver type"),
        },
        Kind::Method => match types.next() {
            Some(receiver) => Signature::method(receiver, types),
            None => bail!("a method lookup needs a receiver type"),
        },
    })
}

fn resolve(
    registry: &Registry,
    name: &str,
    types: &[String],
    kind: Kind,
    format: OutputFormat,
) -> Result<()> {
    let types = parse_types(types)?;

    // Declared struct fields are not registry bindings
    if let (Kind::Field, [receiver]) = (kind, types.as_slice()) {
        if let Some((_, ty)) = receiver.field(name) {
            let view = ResolutionView {
                signature: Signature::field(receiver.clone()).display_call(name),
                priority: 0,
                returns: ty.to_string(),
            };
            return print_resolution(&view, format);
        }
    }

    let requested = requested_signature(kind, types)?;
    let Resolution { signature, priority, callable } = registry.lookup(name, &requested)?;
    let view = ResolutionView {
        signature: signature.display_call(name),
        priority,
        returns: callable.ret().to_string(),
    };
    print_resolution(&view, format)
}

fn print_resolution(view: &ResolutionView, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
        OutputFormat::Text => {
            println!("{} -> {} (priority {})", view.signature, view.returns, view.priority)
        }
    }
    Ok(())
}

/// Parse a command-line literal into its type and value.
fn parse_literal(text: &str) -> Result<(Type, Option<Value>)> {
    if let Some(ty) = text.strip_prefix("NA:") {
        return Ok((ty.parse()?, None));
    }
    let typed = match text {
        "true" => (Type::Boolean, Value::Boolean(true)),
        "false" => (Type::Boolean, Value::Boolean(false)),
        _ => {
            if let Ok(i) = text.parse::<i32>() {
                (Type::Int, Value::Int(i))
            } else if let Ok(i) = text.parse::<i64>() {
                (Type::Long, Value::Long(i))
            } else if let Ok(x) = text.parse::<f64>() {
                (Type::Double, Value::Double(x))
            } else {
                (Type::String, Value::string(text))
            }
        }
    };
    Ok((typed.0, Some(typed.1)))
}

fn call(registry: &Registry, name: &str, args: &[String], format: OutputFormat) -> Result<()> {
    let literals = args
        .iter()
        .map(|arg| parse_literal(arg))
        .collect::<Result<Vec<_>>>()?;
    let types: Vec<Type> = literals.iter().map(|(ty, _)| ty.clone()).collect();

    let resolution = registry.lookup(name, &Signature::function(types))?;
    debug!(priority = resolution.priority, "resolved {}", resolution.signature.display_call(name));

    let thunks: Vec<Thunk> = literals.into_iter().map(|(_, v)| compose::constant(v)).collect();
    let thunk = compose::compose(&resolution.callable, thunks)?;
    let no_inputs: &[Option<Value>] = &[];
    let value = thunk(no_inputs)?;

    let view = CallView {
        signature: resolution.signature.display_call(name),
        returns: resolution.callable.ret().to_string(),
        value: value.as_ref().map(Value::to_string),
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Text => println!("{}", view.value.as_deref().unwrap_or(MISSING)),
    }
    Ok(())
}

