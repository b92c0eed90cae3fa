//! Page geometry and table layout math

/// A4 portrait in points
pub const A4_WIDTH_PT: f64 = 595.2756;
pub const A4_HEIGHT_PT: f64 = 841.8898;

/// Uniform page margin in points
pub const PAGE_MARGIN_PT: f64 = 36.0;

/// Width available to a table after margins
pub const PRINTABLE_WIDTH_PT: f64 = A4_WIDTH_PT - 2.0 * PAGE_MARGIN_PT;

/// Inner padding on every cell side
pub const CELL_PADDING_PT: f64 = 2.0;

/// Cell border stroke width
pub const BORDER_WIDTH_PT: f64 = 0.5;

/// Baseline-to-baseline distance as a multiple of font size
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Distance from line top to baseline as a fraction of font size
pub const ASCENDER_RATIO: f64 = 0.75;

/// Average glyph advance as a fraction of font size
const CHAR_WIDTH_RATIO: f64 = 0.6;

/// Estimated width of a string at the given font size
pub fn estimated_text_width(text: &str, font_size: f64) -> f64 {
    text.len() as f64 * font_size * CHAR_WIDTH_RATIO
}

/// Greedy word wrap against an estimated line width
pub fn wrap_text(text: &str, max_width: f64, font_size: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if estimated_text_width(&candidate, font_size) > max_width && !current.is_empty() {
            lines.push(current);
            current = word.to_string();
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Scale column widths so the table spans the target width
///
/// Widths that sum to zero or less are returned untouched, the caller
/// treats such a table as degenerate.
pub fn scale_column_widths(widths: &[f64], target_width: f64) -> Vec<f64> {
    let total: f64 = widths.iter().sum();
    if total <= 0.0 {
        return widths.to_vec();
    }
    widths.iter().map(|w| w / total * target_width).collect()
}

/// Height a cell needs for its wrapped lines, padding included
pub fn cell_required_height(font_size: f64, lines: usize) -> f64 {
    let lines = lines.max(1) as f64;
    2.0 * CELL_PADDING_PT + font_size + (lines - 1.0) * font_size * LINE_HEIGHT_FACTOR
}
