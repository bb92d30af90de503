use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use transport_catalogue::handler::TransportCatalogueHandler;
use transport_catalogue::json_io::JsonIO;

#[derive(Parser, Debug)]
#[command(name = "transport_catalogue", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the catalogue and router from the input document and persist
    /// them to the configured binary file
    #[command(name = "make_base")]
    MakeBase {
        #[arg(long, default_value = "make_base.json")]
        input: PathBuf,
    },
    /// Restore the persisted state and answer the document's stat requests
    #[command(name = "process_requests")]
    ProcessRequests {
        #[arg(long, default_value = "process_requests.json")]
        input: PathBuf,
        #[arg(long, default_value = "result.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Argument misuse exits with code 1, not clap's default 2.
    let cli = Cli::try_parse().unwrap_or_else(|err| {
        let _ = err.print();
        std::process::exit(1);
    });

    match cli.command {
        Command::MakeBase { input } => make_base(&input),
        Command::ProcessRequests { input, output } => process_requests(&input, &output),
    }
}

fn load_document(path: &Path) -> Result<JsonIO> {
    let file =
        File::open(path).with_context(|| format!("opening input document {}", path.display()))?;
    JsonIO::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing input document {}", path.display()))
}

fn make_base(input: &Path) -> Result<()> {
    let json = load_document(input)?;
    let mut handler = TransportCatalogueHandler::new();
    handler.load_from_json(&json)?;
    handler.serialize_data().context("serializing catalogue")?;
    Ok(())
}

fn process_requests(input: &Path, output: &Path) -> Result<()> {
    let json = load_document(input)?;
    let mut handler = TransportCatalogueHandler::new();
    handler.load_from_json(&json)?;
    handler
        .deserialize_data()
        .context("deserializing catalogue")?;

    let file = File::create(output)
        .with_context(|| format!("creating output file {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    handler.answer_requests(&json, &mut writer)?;
    writer
        .flush()
        .with_context(|| format!("writing output file {}", output.display()))?;
    Ok(())
}
