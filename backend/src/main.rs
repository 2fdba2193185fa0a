//! mecgen CLI - Convert metadata spreadsheets to MovieLabs MEC XML
//!
//! # Main Commands
//!
//! ```bash
//! mecgen generate input.csv -o MEC_Metadata.xml   # CSV to MEC XML
//! mecgen compare sample.xml MEC_Metadata.xml     # Structural diff
//! mecgen serve                                   # Start HTTP server (port 3000)
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! mecgen validate input.csv     # Summary length check only
//! mecgen check output.xml       # Well-formedness check
//! mecgen parse input.csv        # Dump parsed rows as JSON
//! ```

use clap::{Parser, Subcommand};
use mecgen::{
    annotate_xml_error, check_well_formed, compare_files, convert_csv, parse_csv_file_auto,
    require_fields, validate_summary_length, ConversionStatus, ConvertOptions, StructureDiff,
    REQUIRED_FIELDS,
};
use mecgen::config::{ServerConfig, DEFAULT_OUTPUT_FILE};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "mecgen")]
#[command(about = "Generate MovieLabs MEC XML from multilingual metadata CSV", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: CSV → summary check → MEC XML
    Generate {
        /// Input CSV file
        input: PathBuf,

        /// Output XML file
        #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
        output: PathBuf,

        /// Write XML even if summaries are too long
        #[arg(long)]
        allow_violations: bool,

        /// Skip the summary length check
        #[arg(long)]
        skip_validation: bool,
    },

    /// Check Summary190 / Summary400 lengths
    Validate {
        /// Input CSV file
        input: PathBuf,

        /// Print violations as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that an XML file is well-formed
    Check {
        /// XML file
        input: PathBuf,
    },

    /// Compare the element/attribute structure of two XML files
    Compare {
        /// Reference MEC file
        sample: PathBuf,

        /// Generated MEC file
        generated: PathBuf,

        /// Print the diff as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a CSV file and output JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (overrides MECGEN_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            input,
            output,
            allow_violations,
            skip_validation,
        } => cmd_generate(
            &input,
            &output,
            ConvertOptions {
                skip_validation,
                allow_violations,
            },
        ),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Check { input } => cmd_check(&input),

        Commands::Compare {
            sample,
            generated,
            json,
        } => cmd_compare(&sample, &generated, json),

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_generate(input: &Path, output: &Path, options: ConvertOptions) -> CliResult {
    let result = convert_csv(input, &options)?;

    if let Some(ref xml) = result.xml {
        fs::write(output, xml)?;
        eprintln!("💾 Output written to: {}", output.display());
    }

    match result.status {
        ConversionStatus::Ready => {
            eprintln!("\n✨ Done!");
            Ok(())
        }
        ConversionStatus::Warning => {
            eprintln!("\n⚠️  Done with {} summary violations", result.validation_errors.len());
            Ok(())
        }
        ConversionStatus::Invalid => Err(format!(
            "{} summaries exceed their limit, no XML written",
            result.validation_errors.len()
        )
        .into()),
        ConversionStatus::Malformed => Err("generated XML is not well-formed".into()),
    }
}

fn cmd_validate(input: &Path, as_json: bool) -> CliResult {
    eprintln!("✔️  Validating: {}", input.display());

    let parsed = parse_csv_file_auto(input)?;
    require_fields(&parsed.table, REQUIRED_FIELDS)?;
    let errors = validate_summary_length(&parsed.table);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&errors)?);
    } else {
        for err in &errors {
            println!("{}", err);
        }
    }

    eprintln!("\n📊 Results: {} rows, {} violations", parsed.table.len(), errors.len());

    if !errors.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_check(input: &Path) -> CliResult {
    let xml = fs::read_to_string(input)?;

    match check_well_formed(&xml) {
        Ok(()) => {
            eprintln!("✅ {} is well-formed", input.display());
            Ok(())
        }
        Err(err) => {
            if let Some(report) = annotate_xml_error(&xml) {
                println!("{}", report);
            }
            Err(err.into())
        }
    }
}

fn cmd_compare(sample: &Path, generated: &Path, as_json: bool) -> CliResult {
    let diff = compare_files(sample, generated)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&diff_to_json(&diff))?);
    } else {
        print_diff(&diff);
    }

    if !diff.is_identical() {
        std::process::exit(1);
    }

    Ok(())
}

fn diff_to_json(diff: &StructureDiff) -> Value {
    json!({
        "identical": diff.is_identical(),
        "missing": diff.missing,
        "extra": diff.extra,
    })
}

fn print_diff(diff: &StructureDiff) {
    if diff.is_identical() {
        println!("✅ Structures match");
        return;
    }

    if !diff.missing.is_empty() {
        println!("❌ Missing from generated XML:");
        for entry in &diff.missing {
            println!("   - {}", entry);
        }
    }
    if !diff.extra.is_empty() {
        println!("⚠️  Extra in generated XML:");
        for entry in &diff.extra {
            println!("   + {}", entry);
        }
    }
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> CliResult {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let result = parse_csv_file_auto(input)?;

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(result.delimiter));
    eprintln!("   Columns: {}", result.headers.join(", "));
    eprintln!("✅ Parsed {} rows", result.table.len());

    let rows: Vec<Value> = result.table.rows().iter().map(|row| row.to_json()).collect();
    let json = serde_json::to_string_pretty(&rows)?;
    write_output(&json, output)?;

    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

async fn cmd_serve(port: Option<u16>) -> CliResult {
    let config = ServerConfig::from_env().with_port(port);
    mecgen::server::start_server(config).await
}

fn write_output(content: &str, path: Option<&Path>) -> CliResult {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
