use crate::convert::{write_output, Converter};
use crate::error::ConvertResult;
use crate::pdf::PdfSink;
use crate::types::{ConvertOptions, DocumentSink};
use crate::xlsx::XlsxSource;
use colored::Colorize;
use std::path::PathBuf;

/// Execute the convert command
pub fn convert(
    input: PathBuf,
    output: PathBuf,
    options: ConvertOptions,
    verbose: bool,
) -> ConvertResult<()> {
    println!("{}", "📄 xlsx2pdf - Workbook Conversion".bold().green());
    println!("   Input:  {}", input.display());
    println!("   Output: {}\n", output.display());

    if verbose {
        println!("{}", "📖 Reading workbook...".cyan());
    }

    let mut source = XlsxSource::open(&input)?;

    if verbose {
        let names = source.sheet_names();
        println!("   Found {} sheets: {}\n", names.len(), names.join(", "));
        println!("{}", "📐 Laying out tables...".cyan());
    }

    let converter = Converter::new(options);
    let mut sink = PdfSink::new();
    let stats = converter.run(&mut source, &mut sink)?;

    if verbose {
        println!("   Prepared {} rows, {} cells\n", stats.rows, stats.cells);
        println!("{}", "📄 Writing PDF...".cyan());
    }

    let pages = sink.page_count();
    let bytes = sink.finish()?;
    write_output(&output, &bytes)?;

    println!("{}", "✅ Conversion Complete!".bold().green());
    println!("   Sheets: {}", stats.sheets);
    println!("   Pages:  {}", pages);
    println!("   PDF file: {}\n", output.display());

    Ok(())
}
