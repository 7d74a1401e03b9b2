//! doclayout CLI - batch Document AI layout extraction

mod report;
mod serve;

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use crossbeam_channel::Receiver;
use indicatif::{ProgressBar, ProgressStyle};

use doclayout::dataset::{self, single_document_file_name, write_document};
use doclayout::diagnostics::{KeyInspection, ZERO_PAGE_HINTS};
use doclayout::extract::{DEFAULT_MIN_LENGTH, DEFAULT_OUTPUT_DIR};
use doclayout::service::auth::{locate_credentials, CredentialSource};
use doclayout::service::{LayoutService, PDF_MIME_TYPE};
use doclayout::{
    collect_pdfs, BatchEvent, BatchProcessor, Config, Corpus, DatasetWriter, DocumentAiClient,
    ParagraphExtractor, PdfCheck,
};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "doclayout")]
#[command(version)]
#[command(about = "Extract PDF layout with Document AI into JSON, CSV and JSONL datasets", long_about = None)]
struct Cli {
    /// Configuration file (default: doclayout.local.toml or doclayout.toml)
    #[arg(long, global = true, value_name = "FILE", env = "DOCLAYOUT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every PDF in the configured directory and write the dataset
    Process,

    /// Process one PDF and show its layout in detail
    Single {
        /// Input PDF file
        #[arg(value_name = "PDF")]
        input: PathBuf,
    },

    /// Extract long paragraphs into a JSONL text dataset
    #[command(name = "extract-llm")]
    ExtractLlm {
        /// Dataset file
        #[arg(long, default_value = "output/layout_dataset.json")]
        dataset: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// Minimum paragraph length in characters
        #[arg(long, default_value_t = DEFAULT_MIN_LENGTH)]
        min_length: usize,
    },

    /// Serve the dataset viewer
    Serve {
        /// Directory to serve
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Host to bind
        #[arg(long, default_value = "localhost")]
        host: String,

        /// Port to bind
        #[arg(short, long, default_value_t = 8000)]
        port: u16,

        /// Do not open a browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Copy the dataset next to the viewer page
    #[command(name = "copy-dataset")]
    CopyDataset {
        /// Dataset to copy
        #[arg(long, default_value = "output/layout_dataset.json")]
        source: PathBuf,

        /// Destination
        #[arg(long, default_value = "interface/layout_dataset.json")]
        target: PathBuf,

        /// Overwrite without asking
        #[arg(short, long)]
        force: bool,
    },

    /// Check PDF files for header, ending, encryption and structure problems
    #[command(name = "check-pdf")]
    CheckPdf {
        /// Files to check (default: every PDF in the configured directory)
        #[arg(value_name = "PDF")]
        inputs: Vec<PathBuf>,
    },

    /// Inspect the configured credentials
    #[command(name = "check-credentials")]
    CheckCredentials,

    /// Run the setup checks step by step
    Diagnose,

    /// List processors in the configured project location
    #[command(name = "list-processors")]
    ListProcessors,

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Process => cmd_process(config_path),
        Commands::Single { input } => cmd_single(config_path, &input),
        Commands::ExtractLlm {
            dataset,
            output,
            min_length,
        } => cmd_extract_llm(&dataset, &output, min_length),
        Commands::Serve {
            root,
            host,
            port,
            no_browser,
        } => serve::run(serve::ServeOptions {
            root,
            host,
            port,
            open_browser: !no_browser,
        }),
        Commands::CopyDataset {
            source,
            target,
            force,
        } => cmd_copy_dataset(&source, &target, force),
        Commands::CheckPdf { inputs } => cmd_check_pdf(config_path, inputs),
        Commands::CheckCredentials => cmd_check_credentials(config_path),
        Commands::Diagnose => cmd_diagnose(config_path),
        Commands::ListProcessors => cmd_list_processors(config_path),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        if let Some(err) = e.downcast_ref::<doclayout::Error>() {
            report::print_hint(err);
        }
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> doclayout::Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::discover("."),
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}") {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

fn drive_progress(events: Receiver<BatchEvent>, pb: &ProgressBar) {
    for event in events {
        match event {
            BatchEvent::Started { path, .. } => {
                pb.set_message(display_name(&path));
            }
            BatchEvent::Retrying {
                path,
                attempt,
                error,
                delay,
                ..
            } => {
                pb.println(format!(
                    "{} {} (attempt {} failed: {}; next in {:?})",
                    "Retrying".yellow(),
                    display_name(&path),
                    attempt,
                    error,
                    delay
                ));
            }
            BatchEvent::Finished { path, success, .. } => {
                if !success {
                    pb.println(format!("{} {}", "Failed".red(), display_name(&path)));
                }
                pb.inc(1);
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn cmd_process(config_path: Option<&Path>) -> CmdResult {
    let config = load_config(config_path)?;
    let paths = collect_pdfs(&config.pdf_directory)?;
    if paths.is_empty() {
        println!(
            "{} {}",
            "No PDF files found in".yellow(),
            config.pdf_directory.display()
        );
        return Ok(());
    }

    let client = DocumentAiClient::from_config(&config)?;
    let (sender, receiver) = crossbeam_channel::unbounded();
    let processor = BatchProcessor::from_config(client, &config).with_events(sender);

    println!(
        "{} {} PDF files from {}",
        "Processing".cyan().bold(),
        paths.len(),
        config.pdf_directory.display()
    );
    let pb = progress_bar(paths.len() as u64);
    let records = std::thread::scope(|scope| {
        let pb = &pb;
        scope.spawn(move || drive_progress(receiver, pb));
        let records = processor.process_paths(&paths);
        // Closes the channel so the progress thread ends.
        drop(processor);
        records
    })?;
    pb.finish_with_message("Done!");

    let corpus = Corpus::new(records);
    let written = DatasetWriter::new(&config.output_directory).write(&corpus)?;
    report::print_summary(&corpus.summary(), corpus.records());

    println!("\n{}", "Output files:".green().bold());
    for (i, path) in written.iter().enumerate() {
        let branch = if i + 1 == written.len() { "└─" } else { "├─" };
        println!("  {} {}", branch.dimmed(), path.display());
    }

    Ok(())
}

fn cmd_single(config_path: Option<&Path>, input: &Path) -> CmdResult {
    let config = load_config(config_path)?;
    let client = DocumentAiClient::from_config(&config)?;
    let processor = BatchProcessor::from_config(client, &config);

    println!("{} {}", "Processing".cyan(), input.display());
    let record = processor.process_file(input);

    if let Some(failure) = record.as_failure() {
        println!("{} {} [{}]", "✗".red(), failure.error, failure.error_kind);
        return Err(format!("could not process {}", input.display()).into());
    }
    if let Some(doc) = record.as_success() {
        report::print_document(doc);
    }

    let path = config
        .output_directory
        .join(single_document_file_name(input));
    write_document(&record, &path)?;
    println!("\n{} {}", "Detailed results saved to".green(), path.display());
    Ok(())
}

fn cmd_extract_llm(dataset: &Path, output: &Path, min_length: usize) -> CmdResult {
    println!("{}", "LLM Dataset Extractor".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("Loading dataset from {}", dataset.display());

    let corpus = Corpus::load(dataset)?;
    let report = ParagraphExtractor::new()
        .with_min_length(min_length)
        .with_output_dir(output)
        .extract(&corpus)?;
    report::print_extraction(&report, min_length);
    Ok(())
}

fn cmd_copy_dataset(source: &Path, target: &Path, force: bool) -> CmdResult {
    if !source.is_file() {
        return Err(doclayout::Error::InputNotFound(source.to_path_buf()).into());
    }
    let mb = |p: &Path| fs::metadata(p).map(|m| m.len() as f64 / (1024.0 * 1024.0));

    println!("{}: {} ({:.1} MB)", "Source".bold(), source.display(), mb(source)?);
    println!("{}: {}", "Target".bold(), target.display());

    if target.exists() && !force {
        print!(
            "{} target exists ({:.1} MB). Overwrite? (y/N): ",
            "!".yellow(),
            mb(target)?
        );
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("{}", "Copy cancelled".yellow());
            return Ok(());
        }
    }

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, target)?;
    println!("{} {}", "Copied to".green(), target.display());
    Ok(())
}

fn cmd_check_pdf(config_path: Option<&Path>, inputs: Vec<PathBuf>) -> CmdResult {
    let inputs = if inputs.is_empty() {
        let dir = load_config(config_path)
            .map(|c| c.pdf_directory)
            .unwrap_or_else(|_| PathBuf::from("PDFs"));
        collect_pdfs(&dir)?
    } else {
        inputs
    };
    if inputs.is_empty() {
        println!("{}", "No PDF files to check".yellow());
        return Ok(());
    }

    let mut invalid = 0;
    for input in &inputs {
        match PdfCheck::from_path(input) {
            Ok(check) => {
                if !check.is_valid() {
                    invalid += 1;
                }
                report::print_pdf_check(&check);
            }
            Err(e) => {
                invalid += 1;
                println!("{} {}", "✗".red(), e);
            }
        }
        println!("{}", "─".repeat(50).dimmed());
    }

    println!("{} checked, {} invalid", inputs.len(), invalid);
    Ok(())
}

fn cmd_check_credentials(config_path: Option<&Path>) -> CmdResult {
    let config = load_config(config_path)?;
    match locate_credentials(&config)? {
        CredentialSource::KeyFile(path) => {
            let key = KeyInspection::from_path(&path)?;
            report::print_key(&key, &config.project_id);
        }
        CredentialSource::AccessToken(_) => {
            println!("{} using a static access token", "✓".green());
            println!("  Tokens expire after about an hour; refresh with `gcloud auth print-access-token`");
        }
    }
    Ok(())
}

fn step(title: &str) {
    println!("\n{} {}", "▶".cyan(), title.bold());
}

fn cmd_diagnose(config_path: Option<&Path>) -> CmdResult {
    step("Configuration");
    let config = load_config(config_path)?;
    if let Some(source) = &config.source {
        println!("  {} loaded {}", "✓".green(), source.display());
    }
    println!("  Project: {}", config.project_id);
    println!("  Location: {}", config.location);
    println!("  Processor: {}", config.processor_id);

    step("Credentials");
    match locate_credentials(&config)? {
        CredentialSource::KeyFile(path) => {
            let key = KeyInspection::from_path(&path)?;
            report::print_key(&key, &config.project_id);
        }
        CredentialSource::AccessToken(_) => println!("  {} static access token", "✓".green()),
    }

    step("Client");
    let client = DocumentAiClient::from_config(&config)?;
    println!("  {} {}", "✓".green(), client.processor_name());

    step("Processor access");
    let info = client.get_processor()?;
    report::print_processor(&info, true);

    step("Sample processing");
    let Some(sample) = collect_pdfs(&config.pdf_directory)?.into_iter().next() else {
        println!("  {} no PDF files in {}", "!".yellow(), config.pdf_directory.display());
        return Ok(());
    };
    let content = fs::read(&sample)?;
    println!("  Testing with {} ({} bytes)", display_name(&sample), content.len());

    let document = client.process(&content, PDF_MIME_TYPE)?;
    println!("  {} processed", "✓".green());
    println!("  Pages: {}", document.page_count());
    println!("  Text length: {}", document.text_length());
    println!(
        "  First 100 chars: {:?}",
        doclayout::extract::preview(&document.text, 100)
    );

    if document.is_empty() {
        println!("  {} the service returned 0 pages. Possible causes:", "!".yellow());
        for hint in ZERO_PAGE_HINTS {
            println!("    - {}", hint);
        }
    }

    println!("\n{}", "All checks passed".green().bold());
    Ok(())
}

fn cmd_list_processors(config_path: Option<&Path>) -> CmdResult {
    let config = load_config(config_path)?;
    let client = DocumentAiClient::from_config(&config)?;
    let processors = client.list_processors()?;

    println!(
        "{} in {}",
        "Processors".cyan().bold(),
        config.location_path()
    );
    println!("{}", "─".repeat(40).dimmed());
    if processors.is_empty() {
        println!("{}", "No processors found".yellow());
        return Ok(());
    }

    let configured = processors.iter().any(|p| p.name == client.processor_name());
    for info in &processors {
        report::print_processor(info, info.name == client.processor_name());
    }
    if !configured {
        println!(
            "\n{} configured processor {} is not in this list",
            "!".yellow(),
            config.processor_id
        );
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "doclayout".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document AI layout extraction tool");
    println!();
    println!("Dataset files: {}, {}", dataset::DATASET_FILE, dataset::SUMMARY_FILE);
    println!("License: MIT");
}
