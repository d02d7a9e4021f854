//! docforge CLI
//!
//! Usage:
//!   docforge [OPTIONS] <COMMAND>
//!
//! Commands:
//!   placeholders  List the placeholders of a template file
//!   fill          Fill a template with values from a JSON object
//!   render        Render a Markdown body into another format
//!   bundle        Render several Markdown bodies into one PDF
//!
//! Options:
//!   -c, --config <FILE>  Render configuration (TOML format)
//!   -v, --verbose        Log debug output to stderr

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docforge::{
    render, render_bundle, DocumentFormat, FillMode, PlaceholderExtractor, RenderConfig,
    RenderedDocument, SemanticDocument, Template, TemplateFiller,
};

#[derive(Parser)]
#[command(name = "docforge")]
#[command(about = "Fill document templates and render documents to office formats")]
struct Cli {
    /// Render configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the placeholders of a template file, one per line
    Placeholders {
        file: PathBuf,
    },
    /// Fill a template with values from a JSON object
    Fill {
        template: PathBuf,
        /// JSON object mapping placeholder names to values
        #[arg(short, long)]
        data: PathBuf,
        /// Fail when a placeholder has no value
        #[arg(long)]
        strict: bool,
        /// Output path (defaults to the generated file name)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Render a Markdown body into another format
    Render {
        body: PathBuf,
        #[arg(short, long)]
        title: String,
        /// md, txt, csv, xlsx, docx or pdf
        #[arg(short, long)]
        format: String,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Render several Markdown bodies into one PDF
    Bundle {
        #[arg(required = true)]
        bodies: Vec<PathBuf>,
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => match RenderConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => RenderConfig::default(),
    };

    match cli.command {
        Command::Placeholders { file } => {
            let bytes = read_bytes(&file);
            let name = file.file_name().and_then(|n| n.to_str());
            match PlaceholderExtractor::shared().try_extract_from_file(&bytes, None, name) {
                Ok(names) => {
                    for name in names {
                        println!("{}", name);
                    }
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Command::Fill {
            template,
            data,
            strict,
            out,
        } => {
            let bytes = read_bytes(&template);
            let name = template
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string);
            let template = Template::file(bytes, None, name);
            let data = read_data(&data);
            let mode = if strict { FillMode::Strict } else { FillMode::Lenient };
            match TemplateFiller::new().with_mode(mode).fill(&template, &data) {
                Ok(doc) => write_output(&doc, out),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Command::Render {
            body,
            title,
            format,
            out,
        } => {
            let Some(format) = DocumentFormat::parse_name(&format) else {
                eprintln!("Error: unknown format '{}'", format);
                std::process::exit(1);
            };
            let doc = SemanticDocument::new(title, read_text(&body));
            match render(&doc, format, &config) {
                Ok(doc) => write_output(&doc, out),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Command::Bundle { bodies, title, out } => {
            let items: Vec<SemanticDocument> = bodies
                .iter()
                .map(|path| SemanticDocument::new(item_title(path), read_text(path)))
                .collect();
            match render_bundle(&title, &items, DocumentFormat::PortableDocument, &config) {
                Ok(doc) => write_output(&doc, out),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "docforge=debug" } else { "docforge=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_bytes(path: &Path) -> Vec<u8> {
    match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn read_text(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

/// A JSON object; non-string values are written with their JSON text
fn read_data(path: &Path) -> BTreeMap<String, String> {
    let values: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&read_text(path)) {
        Ok(values) => values,
        Err(e) => {
            eprintln!("Error parsing data '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    };
    values
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            (key, text)
        })
        .collect()
}

/// The body file stem
fn item_title(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("item")
        .to_string()
}

fn write_output(doc: &RenderedDocument, out: Option<PathBuf>) {
    let path = out.unwrap_or_else(|| PathBuf::from(&doc.file_name));
    if let Err(e) = fs::write(&path, &doc.bytes) {
        eprintln!("Error writing '{}': {}", path.display(), e);
        std::process::exit(1);
    }
    eprintln!("Wrote {} ({}, {} bytes)", path.display(), doc.mime_type, doc.bytes.len());
}
