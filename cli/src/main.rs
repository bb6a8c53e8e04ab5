use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use wiregen::{
    compile_protocol, generate, sync_handler_file, write_if_changed, GenerateOptions, ProtocolConfig,
    ProtocolError, SchemaFormat,
};

#[derive(Parser)]
#[command(name = "wiregen")]
#[command(about = "Generate typed declarations, marshaling and handler stubs from a protocol schema", long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

impl From<Format> for SchemaFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Yaml => SchemaFormat::Yaml,
            Format::Json => SchemaFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate both artifacts, and synchronize handler stubs when `--handlers` is given
    Generate {
        /// Input schema (YAML, or JSON when the extension is `.json`)
        #[arg(short, long)]
        schema: PathBuf,

        /// Override the format guessed from the schema extension
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Output file for the declaration artifact
        #[arg(long)]
        decl_out: PathBuf,

        /// Output file for the marshaling artifact
        #[arg(long)]
        marshal_out: PathBuf,

        /// Handler file to add missing stubs to
        #[arg(long)]
        handlers: Option<PathBuf>,

        /// Path of the declarations module as seen from the marshaling module
        #[arg(long)]
        declarations_path: Option<String>,

        /// Path of the handler module as seen from the marshaling module
        #[arg(long)]
        handlers_path: Option<String>,

        /// Path of the broadcast function as seen from the marshaling module
        #[arg(long)]
        broadcast_path: Option<String>,
    },

    /// Load and verify a schema
    Check {
        #[arg(short, long)]
        schema: PathBuf,

        #[arg(short, long, value_enum)]
        format: Option<Format>,
    },

    /// Print the resolved schema as JSON
    Dump {
        #[arg(short, long)]
        schema: PathBuf,

        #[arg(short, long, value_enum)]
        format: Option<Format>,
    },

    /// Add missing handler stubs without generating anything else
    Stubs {
        #[arg(short, long)]
        schema: PathBuf,

        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Handler file to add missing stubs to
        #[arg(long)]
        handlers: PathBuf,
    },
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else if cli.quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(schema: &Path, format: Option<Format>) -> Result<ProtocolConfig, ProtocolError> {
    let text = fs::read_to_string(schema)?;
    let format = format.map_or_else(|| SchemaFormat::from_path(schema), SchemaFormat::from);
    compile_protocol(&text, format)
}

fn schema_name(schema: &Path) -> String {
    schema
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| schema.display().to_string())
}

fn sync(config: &ProtocolConfig, handlers: &Path) -> Result<(), ProtocolError> {
    let inserted = sync_handler_file(config, handlers)?;
    if inserted.is_empty() {
        info!(path = %handlers.display(), "all handlers present");
    } else {
        info!(path = %handlers.display(), stubs = inserted.len(), "inserted handler stubs");
    }
    Ok(())
}

fn main() -> Result<(), ProtocolError> {
    let cli = Cli::parse();
    init_logging(&cli);

    match &cli.command {
        Commands::Generate {
            schema,
            format,
            decl_out,
            marshal_out,
            handlers,
            declarations_path,
            handlers_path,
            broadcast_path,
        } => {
            let config = load(schema, *format)?;
            let mut options = GenerateOptions::new(&schema_name(schema));
            if let Some(path) = declarations_path {
                options = options.with_declarations_path(path);
            }
            if let Some(path) = handlers_path {
                options = options.with_handlers_path(path);
            }
            if let Some(path) = broadcast_path {
                options = options.with_broadcast_path(path);
            }

            let artifacts = generate(&config, &options)?;
            write_if_changed(decl_out, &artifacts.declarations)?;
            write_if_changed(marshal_out, &artifacts.marshaling)?;
            if let Some(handlers) = handlers {
                sync(&config, handlers)?;
            }
            Ok(())
        }

        Commands::Check { schema, format } => {
            let config = load(schema, *format)?;
            println!(
                "{}: {} types, {} commands, {} events",
                schema.display(),
                config.types.len(),
                config.commands.len(),
                config.events.len()
            );
            Ok(())
        }

        Commands::Dump { schema, format } => {
            let config = load(schema, *format)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }

        Commands::Stubs { schema, format, handlers } => {
            let config = load(schema, *format)?;
            sync(&config, handlers)
        }
    }
}
