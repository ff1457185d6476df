//! Structural analysis of uploaded movie lists.
//!
//! Parses CSV text into a [`ParsedTable`], infers what each column holds and
//! guesses which service exported the file.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    error::{AppError, AppResult},
    models::{ColumnType, CsvColumn, CsvFormat, ParsedTable},
};

/// Values inspected per column when the header says nothing useful
const SAMPLE_SIZE: usize = 10;
/// Sampled values longer than this suggest a free-text title column
const TITLE_MIN_CHARS: usize = 10;

static YEAR_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:19|20)\d{2}$").unwrap());

static DATE_VALUES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // YYYY-MM-DD, YYYY/MM/DD
        Regex::new(r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}$").unwrap(),
        // MM/DD/YYYY, MM-DD-YYYY
        Regex::new(r"^\d{1,2}[-/]\d{1,2}[-/]\d{4}$").unwrap(),
        // DD-MMM-YYYY
        Regex::new(r"^\d{1,2}[-/][A-Za-z]{3}[-/]\d{4}$").unwrap(),
    ]
});

static RATING_VALUE: Lazy<Regex> = Lazy::new(|| {
    // 0-10 whole numbers, one-decimal values, star glyphs (with optional half)
    Regex::new(r"^(?:10|[0-9]|10\.0|[0-9]?\.[0-9]|★+½?|½)$").unwrap()
});

/// Parses CSV text with a header row and analyses its structure
///
/// Blank lines are skipped. Short rows are padded and long rows truncated so
/// every row has one cell per header.
pub fn parse_csv(content: &str) -> AppResult<ParsedTable> {
    let content = content.trim_start_matches('\u{feff}');
    if content.trim().is_empty() {
        return Err(AppError::Parse("CSV input is empty".to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::Parse(format!("Could not read header row: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(AppError::Parse(
            "Could not determine column headers".to_string(),
        ));
    }

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| AppError::Parse(format!("Malformed row {}: {}", line + 1, e)))?;

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let row: Vec<String> = (0..headers.len())
            .map(|i| record.get(i).unwrap_or_default().to_string())
            .collect();
        rows.push(row);
    }

    let columns: Vec<CsvColumn> = headers
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let values: Vec<&str> = rows
                .iter()
                .map(|row| row[index].as_str())
                .filter(|v| !v.is_empty())
                .collect();

            CsvColumn {
                name: name.clone(),
                column_type: detect_column_type(name, &values),
                index,
            }
        })
        .collect();

    let detected_format = detect_format(&headers);

    tracing::info!(
        columns = headers.len(),
        rows = rows.len(),
        format = ?detected_format,
        "Parsed CSV upload"
    );

    Ok(ParsedTable {
        headers,
        columns,
        rows,
        detected_format,
    })
}

/// Infers a column type from its header, falling back to sampled values
pub fn detect_column_type(header: &str, values: &[&str]) -> ColumnType {
    if let Some(column_type) = column_type_from_header(header) {
        return column_type;
    }

    let sample: Vec<&str> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .take(SAMPLE_SIZE)
        .collect();

    if sample.is_empty() {
        return ColumnType::Unknown;
    }

    if sample.iter().all(|v| YEAR_VALUE.is_match(v)) {
        return ColumnType::Year;
    }

    if sample
        .iter()
        .any(|v| DATE_VALUES.iter().any(|pattern| pattern.is_match(v)))
    {
        return ColumnType::Date;
    }

    if sample.iter().all(|v| RATING_VALUE.is_match(v)) {
        return ColumnType::Rating;
    }

    if sample.iter().any(|v| v.chars().count() > TITLE_MIN_CHARS) {
        return ColumnType::Title;
    }

    ColumnType::Unknown
}

fn column_type_from_header(header: &str) -> Option<ColumnType> {
    let header = header.trim().to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| header.contains(n));

    if has(&["title", "name", "film"]) || header == "movie" {
        Some(ColumnType::Title)
    } else if has(&["year"]) || header == "yr" {
        Some(ColumnType::Year)
    } else if has(&["date", "watched", "viewed", "rated on"]) {
        Some(ColumnType::Date)
    } else if has(&["rating", "score", "stars"]) || header == "rate" {
        Some(ColumnType::Rating)
    } else {
        None
    }
}

/// Guesses the exporter from the set of header names
pub fn detect_format(headers: &[String]) -> CsvFormat {
    let headers: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    let exact = |name: &str| headers.iter().any(|h| h == name);
    let containing = |needles: &[&str]| {
        headers
            .iter()
            .any(|h| needles.iter().any(|n| h.contains(n)))
    };

    if exact("name") && exact("date") && containing(&["rating"]) {
        return CsvFormat::Letterboxd;
    }

    if exact("title") && exact("year") && containing(&["rating"]) {
        return CsvFormat::Imdb;
    }

    let has_id_header = headers
        .iter()
        .any(|h| h.split(|c: char| !c.is_alphanumeric()).any(|word| word == "id"));
    if containing(&["tmdb"]) || (exact("title") && has_id_header) {
        return CsvFormat::Tmdb;
    }

    let has_title = containing(&["title", "name", "movie"]);
    let has_year = containing(&["year"]);
    let has_date = containing(&["date", "watched"]);
    let has_rating = containing(&["rating", "score"]);

    if has_title && (has_year || has_date || has_rating) {
        return CsvFormat::Custom;
    }

    CsvFormat::Unknown
}
