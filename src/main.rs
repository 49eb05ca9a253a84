// src/main.rs
use clap::{Parser, Subcommand};
use paper_extractor::assembly;
use paper_extractor::report::SectionStatus;
use paper_extractor::storage::StorageManager;
use paper_extractor::utils::{self, AppError};
use paper_extractor::EngineConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Command Line Interface for the manuscript section extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract sections, figures, tables and equations from a LaTeX manuscript
    Extract {
        /// Source manuscript (.tex)
        input: PathBuf,

        /// Output directory for extracted content
        #[arg(short, long, default_value = "./extracted_sections")]
        output_dir: PathBuf,

        /// YAML rule table (optional, defaults to the bundled IEEE table)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Reject inputs larger than this many bytes (overrides the config)
        #[arg(long)]
        max_input_bytes: Option<usize>,

        /// Debug mode - save an annotated copy of the manuscript
        #[arg(short, long)]
        debug: bool,
    },

    /// Fill a journal template with previously extracted sections
    Assemble {
        /// Directory written by `extract`
        #[arg(short, long, default_value = "./extracted_sections")]
        sections_dir: PathBuf,

        /// Template with {{section}} placeholders (optional, defaults to the bundled elsarticle skeleton)
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Output file
        #[arg(short, long, default_value = "main_integrated.tex")]
        output: PathBuf,
    },

    /// List the configured section rules and block kinds
    Rules {
        /// YAML rule table (optional, defaults to the bundled IEEE table)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(cli.verbose);
    tracing::debug!("Starting with args: {:?}", cli);

    match cli.command {
        Command::Extract {
            input,
            output_dir,
            config,
            max_input_bytes,
            debug,
        } => run_extract(&input, &output_dir, config.as_deref(), max_input_bytes, debug),
        Command::Assemble {
            sections_dir,
            template,
            output,
        } => run_assemble(&sections_dir, template.as_deref(), &output),
        Command::Rules { config } => run_rules(config.as_deref()),
    }
}

fn run_extract(
    input: &Path,
    output_dir: &Path,
    config_path: Option<&Path>,
    max_input_bytes: Option<usize>,
    debug: bool,
) -> Result<(), AppError> {
    // 1. Load configuration and compile the rule table (fails fast on bad patterns)
    let mut config = EngineConfig::load(config_path)?;
    if max_input_bytes.is_some() {
        config.max_input_bytes = max_input_bytes;
    }
    let registry = config.registry()?;
    tracing::info!("Loaded {} section rules and {} block kinds", registry.len(), registry.blocks().len());

    // 2. Read the manuscript
    tracing::info!("Reading manuscript: {}", input.display());
    let document = fs::read_to_string(input)?;
    if document.trim().is_empty() {
        tracing::warn!("Manuscript {} is empty", input.display());
    }

    // 3. Extract
    let set = config.extractor().extract(&document, &registry)?;

    // 4. Transform for the target journal
    let transformed = config.transforms.apply_set(&set);

    // 5. Save sections, blocks, summary and metadata
    let storage = StorageManager::new(output_dir)?;
    let written = storage.save_set(&transformed)?;

    let report = config.report_builder().build_with(&set, &transformed);
    let title = transformed.result("title").filter(|r| r.is_found()).map(|r| r.text());
    storage.save_summary(&report, title)?;
    storage.save_metadata(&report, input)?;

    if debug {
        let annotated_path = output_dir.join("debug").join("annotated.tex");
        if let Err(e) = utils::debug::save_annotated(&document, &set, &annotated_path) {
            tracing::warn!("Failed to create annotated document: {}", e);
        }
    }

    for section in &report.sections {
        match section.status {
            SectionStatus::Found => {
                tracing::info!("Extracted {} ({} words)", section.id, section.word_count)
            }
            SectionStatus::Empty => {
                tracing::warn!("{} matched but is empty", section.id)
            }
            SectionStatus::NotFound => tracing::warn!("{} not found", section.id),
        }
        for check in section.limits.iter().filter(|c| !c.passed) {
            tracing::warn!(
                "{} is outside its limit: {} (allowed {}-{})",
                section.id,
                check.actual,
                check.min,
                check.max
            );
        }
    }

    tracing::info!(
        "Processing finished. Found: {}, Empty: {}, Missing: {}, Files written: {}",
        report.found_count(),
        report.empty_count(),
        report.not_found_count(),
        written.len()
    );
    for block in &report.blocks {
        tracing::info!("{}: {}", block.kind, block.count);
    }

    if report.found_count() == 0 && !report.sections.is_empty() {
        return Err(AppError::Processing(format!(
            "No sections could be extracted from {}",
            input.display()
        )));
    }

    Ok(())
}

fn run_assemble(sections_dir: &Path, template_path: Option<&Path>, output: &Path) -> Result<(), AppError> {
    let storage = StorageManager::open(sections_dir)?;

    let template = match template_path {
        Some(path) => {
            tracing::info!("Using template {}", path.display());
            fs::read_to_string(path)?
        }
        None => assembly::DEFAULT_TEMPLATE.to_string(),
    };

    // Storage errors while reading a section are logged and treated as missing
    let assembled = assembly::fill(&template, |id| match storage.load_section(id) {
        Ok(section) => section,
        Err(e) => {
            tracing::error!("Failed to read section '{}': {}", id, e);
            None
        }
    });

    fs::write(output, &assembled.text)?;
    tracing::info!("Created {} ({} bytes)", output.display(), assembled.text.len());
    if !assembled.missing.is_empty() {
        tracing::warn!("Placeholders left empty: {}", assembled.missing.join(", "));
    }

    // Figures are placed by hand, so collect them next to the output
    match storage.load_section(assembly::FIGURES_ID)? {
        Some(figures) => {
            let main_file = output.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            let helper_path = output.with_file_name(assembly::FIGURE_HELPER_FILE);
            fs::write(&helper_path, assembly::figure_helper(&figures, &main_file))?;
            tracing::info!("Created {}", helper_path.display());
        }
        None => tracing::debug!("No stored figures, skipping {}", assembly::FIGURE_HELPER_FILE),
    }

    Ok(())
}

fn run_rules(config_path: Option<&Path>) -> Result<(), AppError> {
    let config = EngineConfig::load(config_path)?;
    let registry = config.registry()?;

    println!("Section rules ({}):", registry.len());
    for rule in registry.rules() {
        let kind = if rule.is_bounded() { "bounded" } else { "single" };
        println!("  {:<18} {:<8} group {}  {}", rule.id(), kind, rule.capture(), rule.pattern().as_str());
        if let Some(stop) = rule.stop() {
            println!("  {:<18} {:<8}          until {}", "", "", stop.as_str());
        }
    }
    println!("Block kinds ({}):", registry.blocks().len());
    for block in registry.blocks() {
        println!("  {:<18} {}", block.kind(), block.pattern().as_str());
    }
    Ok(())
}
