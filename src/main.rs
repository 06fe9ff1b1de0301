//! # wa2csv CLI
//!
//! Command-line interface for the wa2csv library.

use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use wa2csv::cli::{Args, OutputStyle};
use wa2csv::output::{write_delimited_text, write_quoted_csv};
use wa2csv::{ChatLogParser, Wa2csvError};

fn main() {
    let args = <Args as ClapParser>::parse();
    init_logging(&args);

    if let Err(e) = run(&args) {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wa2csv={}", args.log_level())));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), Wa2csvError> {
    let total_start = Instant::now();
    let output_path = args.output_path();

    println!("📦 wa2csv v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Input:   {}", args.input.display());
    println!("💾 Output:  {}", output_path.display());
    println!("📄 Style:   {}", args.style);
    if args.multiline {
        println!("📜 Mode:    Multi-line");
    }
    if let Some(zone) = &args.timezone {
        println!("🌍 Zone:    {}", zone);
    }
    println!();

    let parser = ChatLogParser::with_config(args.parser_config());

    println!("⏳ Parsing...");
    let parse_start = Instant::now();
    let records = parser.parse_file(&args.input)?;
    println!(
        "   Found {} records ({:.2}s)",
        records.len(),
        parse_start.elapsed().as_secs_f64()
    );

    let invalid_dates = records.iter().filter(|r| r.invalid_date).count();
    if invalid_dates > 0 {
        println!("⚠️  {} records kept their raw timestamp", invalid_dates);
    }

    println!("💾 Writing...");
    let fields = args.fields();
    match args.style {
        OutputStyle::Legacy => {
            write_delimited_text(&records, &output_path, &fields)?;
        }
        OutputStyle::Quoted => write_quoted_csv(&records, &output_path, &fields)?,
    }

    println!();
    println!("✅ Done! Output saved to {}", output_path.display());
    println!(
        "   Total time:  {:.2}s",
        total_start.elapsed().as_secs_f64()
    );

    Ok(())
}
