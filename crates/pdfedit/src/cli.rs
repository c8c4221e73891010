use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use pdfedit_core::Hit;
use std::path::PathBuf;

#[derive(Debug, clap::Args)]
pub struct FindOptions {
    /// Path to the PDF file
    path: PathBuf,

    /// 1-based page number
    #[arg(short, long)]
    page: u32,

    /// Text to search for
    #[arg(short, long)]
    query: String,

    /// Print the hits as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, clap::Args)]
pub struct ReplaceOptions {
    /// Path to the PDF file
    path: PathBuf,

    /// 1-based page number
    #[arg(short, long)]
    page: u32,

    /// Position of the occurrence among the page hits, starting at 0
    #[arg(short, long, default_value = "0")]
    index: usize,

    /// Text to replace
    #[arg(long)]
    old: String,

    /// Replacement text
    #[arg(long)]
    new: String,

    /// Where to write the result (defaults to overwriting the input)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run_find(options: FindOptions, global: crate::Global) -> Result<()> {
    let bytes = std::fs::read(&options.path)
        .with_context(|| f!("Failed to read {}", options.path.display()))?;
    let hits =
        pdf::find_text(&bytes, options.page, &options.query).map_err(|e| eyre!(e))?;

    if global.verbose {
        eprintln!(
            "{} hit(s) for {:?} on page {}",
            hits.len(),
            options.query,
            options.page
        );
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else if hits.is_empty() {
        eprintln!("{}", f!("No matches for {:?}", options.query).yellow());
    } else {
        hits_table(&hits).printstd();
    }

    Ok(())
}

pub async fn run_replace(options: ReplaceOptions, global: crate::Global) -> Result<()> {
    let bytes = std::fs::read(&options.path)
        .with_context(|| f!("Failed to read {}", options.path.display()))?;
    let out = pdf::replace_text(
        &bytes,
        options.page,
        options.index,
        &options.old,
        &options.new,
    )
    .map_err(|e| eyre!(e))?;

    let target = options.output.as_ref().unwrap_or(&options.path);
    std::fs::write(target, &out).with_context(|| f!("Failed to write {}", target.display()))?;

    if global.verbose {
        eprintln!("Wrote {} bytes", out.len());
    }
    println!(
        "{}",
        f!(
            "Replaced {:?} with {:?} on page {} -> {}",
            options.old,
            options.new,
            options.page,
            target.display()
        )
        .green()
    );

    Ok(())
}

fn format_bbox(hit: &Hit) -> String {
    let b = hit.bbox;
    f!("[{:.2}, {:.2}, {:.2}, {:.2}]", b.x0, b.y0, b.x1, b.y1)
}

fn hits_table(hits: &[Hit]) -> prettytable::Table {
    let mut table = new_table();
    table.add_row(prettytable::row![
        "#".bold().cyan(),
        "Span".bold().cyan(),
        "BBox".bold().cyan(),
        "Font".bold().cyan(),
        "Size".bold().cyan(),
        "Color".bold().cyan()
    ]);

    for (index, hit) in hits.iter().enumerate() {
        table.add_row(prettytable::row![
            index,
            hit.span_text,
            format_bbox(hit),
            hit.font.as_deref().unwrap_or("-"),
            hit.size.map(|s| f!("{s:.1}")).unwrap_or_else(|| "-".to_string()),
            hit.color
                .map(|c| f!("#{c:06X}"))
                .unwrap_or_else(|| "-".to_string())
        ]);
    }

    table
}
