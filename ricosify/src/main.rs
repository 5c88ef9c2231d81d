use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Deserialize;

use ricos_core::{convert, ricos, ConvertOptions};

#[derive(Parser)]
#[command(name = "ricosify")]
#[command(version)]
#[command(about = "Convert HTML to a Ricos rich-content document", long_about = None)]
struct Cli {
    /// Input HTML file, or `-` for stdin
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// JSON payload file carrying `html` plus the conversion options
    #[arg(
        long,
        value_name = "FILE",
        conflicts_with_all = ["input", "base_url", "image_map", "images"]
    )]
    payload: Option<PathBuf>,

    /// Base URL for resolving relative image sources
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// JSON object mapping raw image sources to hosted urls or media ids
    #[arg(long, value_name = "FILE")]
    image_map: Option<PathBuf>,

    /// JSON array of pre-resolved media references, consumed in document order
    #[arg(long, value_name = "FILE")]
    images: Option<PathBuf>,

    /// Pretty-print the emitted document
    #[arg(long)]
    pretty: bool,

    /// Output file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

/// The request body the original service accepted, taken as a file.
#[derive(Deserialize)]
struct Payload {
    html: Option<String>,
    #[serde(flatten)]
    options: ConvertOptions,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let (html, options) = gather_inputs(&cli)?;
    let document = convert(&html, options)?;
    log::info!("converted {} blocks", document.blocks.len());
    let value = ricos::document_to_value(&document);
    let mut rendered = if cli.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    rendered.push('\n');
    match &cli.output {
        Some(path) => fs::write(path, rendered)?,
        None => io::stdout().lock().write_all(rendered.as_bytes())?,
    }
    Ok(())
}

fn gather_inputs(cli: &Cli) -> Result<(String, ConvertOptions), Box<dyn std::error::Error>> {
    if let Some(path) = &cli.payload {
        let payload: Payload = serde_json::from_str(&fs::read_to_string(path)?)?;
        let html = payload
            .html
            .filter(|h| !h.trim().is_empty())
            .ok_or("payload is missing the `html` field")?;
        return Ok((html, payload.options));
    }
    let html = match cli.input.as_deref() {
        Some(path) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
        Some(path) => fs::read_to_string(path)?,
        None => {
            return Err("missing input: pass an HTML file, `-` for stdin, or --payload".into())
        }
    };
    let mut options = ConvertOptions {
        base_url: cli.base_url.clone(),
        ..ConvertOptions::default()
    };
    if let Some(path) = &cli.image_map {
        options.image_map = serde_json::from_str(&fs::read_to_string(path)?)?;
    }
    if let Some(path) = &cli.images {
        options.image_queue = serde_json::from_str(&fs::read_to_string(path)?)?;
    }
    Ok((html, options))
}
