use clap::Parser;
use std::path::PathBuf;
use xlsx2pdf::cli;
use xlsx2pdf::error::ConvertResult;
use xlsx2pdf::types::ConvertOptions;

#[derive(Parser)]
#[command(name = "xlsx2pdf")]
#[command(about = "Convert Excel workbooks to paginated PDF tables, one sheet per page")]
#[command(long_about = "xlsx2pdf - Batch workbook to PDF conversion

Renders every worksheet of an .xlsx workbook as a bordered table on A4
pages. The first sheet starts the document, each following sheet starts
on a fresh page, and sheets with more rows than fit on a page continue
onto additional pages.

UNITS:
  Column widths: workbook pixels converted to points (x 0.75)
  Row heights:   workbook points, reported in centimetres when verbose

EXAMPLES:
  xlsx2pdf report.xlsx                  # writes report.pdf
  xlsx2pdf report.xlsx out/report.pdf   # missing directories are created
  xlsx2pdf report.xlsx -v               # show per-sheet progress")]
#[command(version)]
struct Cli {
    /// Path to the workbook (.xlsx)
    input: PathBuf,

    /// Output PDF path, defaults to the input path with a .pdf extension
    output: Option<PathBuf>,

    /// Points per pixel applied to column widths
    #[arg(long, default_value_t = 0.75)]
    pixel_to_point: f64,

    /// Centimetres per point used for row height diagnostics
    #[arg(long, default_value_t = 0.0352778)]
    point_to_cm: f64,

    /// Show conversion steps and row diagnostics
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ConvertResult<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "xlsx2pdf=debug"
    } else {
        "xlsx2pdf=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let options = ConvertOptions {
        pixel_to_point: cli.pixel_to_point,
        point_to_cm: cli.point_to_cm,
    };
    let output = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension("pdf"));

    cli::convert(cli.input, output, options, cli.verbose)
}
