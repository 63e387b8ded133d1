use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use xmljson::{decode, ConversionOptions, ReaderConfig};

#[derive(Debug, Parser)]
#[command(
    name = "xmljson",
    version,
    about = "Convert XML to JSON and decode base64url / URI components"
)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG applies otherwise
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert an XML document to JSON
    Convert(ConvertArgs),
    /// Decode an encoded value
    #[command(subcommand)]
    Decode(DecodeCommand),
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Input file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
    /// Prefix for attribute keys
    #[arg(long, env = "XMLJSON_ATTRIBUTE_PREFIX", default_value = "@")]
    attribute_prefix: String,
    /// Drop namespace prefixes and xmlns bindings
    #[arg(long)]
    no_namespaces: bool,
    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,
    /// Maximum element nesting depth (0 means unlimited)
    #[arg(long, default_value_t = ReaderConfig::default().max_depth)]
    max_depth: usize,
}

#[derive(Debug, Subcommand)]
enum DecodeCommand {
    /// Decode URL-safe base64 and write the raw bytes
    #[command(name = "base64url")]
    Base64Url {
        value: String,
    },
    /// Decode a URI component (`+` is a space, `%XY` escapes are bytes)
    Uri {
        value: String,
        /// Charset the escaped bytes are encoded in
        #[arg(long, default_value = "UTF-8")]
        charset: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Convert(args) => run_convert(&args),
        Command::Decode(command) => run_decode(&command),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_convert(args: &ConvertArgs) -> Result<()> {
    let options = ConversionOptions::new(args.attribute_prefix.clone(), !args.no_namespaces);
    let config = ReaderConfig::new(args.max_depth);
    let input = read_input(&args.input)?;
    debug!(bytes = input.len(), "read input");

    let value = xmljson::xml_to_json_with_config(&input, &options, config)
        .with_context(|| format!("failed to convert {}", describe(&args.input)))?;

    let mut output = if args.pretty {
        value.to_json_pretty()
    } else {
        value.to_json_string()
    };
    output.push('\n');

    write_output(&args.output, output.as_bytes())?;
    info!(bytes = output.len(), "wrote json");
    Ok(())
}

fn run_decode(command: &DecodeCommand) -> Result<()> {
    match command {
        DecodeCommand::Base64Url { value } => {
            let bytes = decode::base64_url(value)?;
            write_output(&None, &bytes)
        }
        DecodeCommand::Uri { value, charset } => {
            let mut text = decode::uri_component(value, charset)?;
            text.push('\n');
            write_output(&None, text.as_bytes())
        }
    }
}

fn read_input(path: &Option<PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_output(path: &Option<PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(data).context("failed to write stdout")?;
            Ok(())
        }
    }
}

fn describe(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "stdin".to_string(),
    }
}
