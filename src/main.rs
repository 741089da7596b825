mod model;
mod output;
mod parser;
mod source;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use model::{Summary, DEFAULT_COUNTRY};
use output::Layout;
use parser::{ExtractOptions, PageRange};
use source::{Document, PageSource};

const DEFAULT_INPUT: &str = "data/report.txt";
const POPULATION_OUTPUT: &str = "data/population_stats.json";
const ADMINISTRATIVE_OUTPUT: &str = "data/dataset.json";

#[derive(Parser)]
#[command(
    name = "census_units",
    about = "Extract regions, councils and wards from the 2022 PHC distribution report"
)]
struct Cli {
    /// Page text: a form-feed separated dump (pdftotext) or a directory of per-page .txt files
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    input: PathBuf,
    /// Where to write the JSON (default depends on --admin-only)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// First page to read, 1-indexed
    #[arg(long, default_value_t = PageRange::default().start)]
    start_page: usize,
    /// Last page to read, inclusive
    #[arg(long, default_value_t = PageRange::default().end)]
    end_page: usize,
    /// Names only: skip the population statistics columns
    #[arg(long)]
    admin_only: bool,
    #[arg(long, default_value = DEFAULT_COUNTRY)]
    country: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let with_statistics = !cli.admin_only;
    let layout = Layout::for_mode(with_statistics);
    let output_path = cli.output.unwrap_or_else(|| {
        PathBuf::from(if with_statistics {
            POPULATION_OUTPUT
        } else {
            ADMINISTRATIVE_OUTPUT
        })
    });
    let range = PageRange {
        start: cli.start_page,
        end: cli.end_page,
    };

    println!("{}", "=".repeat(80));
    println!(
        "Extracting {} from {}",
        if with_statistics { "population statistics" } else { "administrative units" },
        cli.input.display()
    );
    println!("Processing pages {}-{}", range.start, range.end);
    println!("{}", "=".repeat(80));

    let document = Document::open(&cli.input)
        .with_context(|| format!("Cannot open input {}", cli.input.display()))?;

    let pages = range.clamp(document.page_count());
    let pb = ProgressBar::new(pages.clone().count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages")?
            .progress_chars("#>-"),
    );

    let options = ExtractOptions {
        with_statistics,
        country: cli.country,
    };
    let dataset = parser::extract_pages(&document, range, &options, &pb);
    pb.finish_and_clear();
    info!("Extraction complete");

    print_summary(&Summary::of(&dataset), with_statistics);
    output::write_dataset(&output_path, &dataset, layout)?;
    println!("\nData saved to: {}", output_path.display());

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("Done in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}

fn print_summary(summary: &Summary, with_statistics: bool) {
    println!("Regions found: {}", summary.regions.len());
    for r in &summary.regions {
        if with_statistics {
            println!(
                "\n  {}: {} councils, {} wards, {} people",
                r.name,
                r.councils,
                r.wards,
                with_thousands(r.population)
            );
        } else {
            println!("\n  {}: {} councils, {} wards", r.name, r.councils, r.wards);
        }
    }
    println!("\nTotal councils: {}", summary.total_councils);
    println!("Total wards: {}", summary.total_wards);
    if with_statistics {
        println!("Total population: {}", with_thousands(summary.total_population));
    }
}

/// 1694310 → "1,694,310".
fn with_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
