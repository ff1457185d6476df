//! Per-row field extraction.
//!
//! Pulls a best-guess title, year, date and rating out of a CSV row using the
//! column types inferred by the structural analysis. Pure functions, no I/O.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{import::first_column_of, ColumnType, CsvColumn, ParsedTable, RowFields};

static YEAR_IN_CELL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());
static YEAR_IN_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d{4})\)").unwrap());
static SLASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap());
static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)").unwrap());

const STAR_GLYPH: char = '★';

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

fn cell<'a>(row: &'a [String], columns: &[CsvColumn], column_type: ColumnType) -> Option<&'a str> {
    first_column_of(columns, column_type)
        .and_then(|column| row.get(column.index))
        .map(|value| value.trim())
}

/// Title cell, or the first non-empty cell when no column looks like a title
pub fn extract_title(row: &[String], columns: &[CsvColumn]) -> String {
    if let Some(title) = cell(row, columns, ColumnType::Title) {
        return title.to_string();
    }

    row.iter()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Year cell, falling back to a `(YYYY)` suffix in the title
pub fn extract_year(row: &[String], columns: &[CsvColumn]) -> Option<i32> {
    let from_column = cell(row, columns, ColumnType::Year)
        .and_then(|value| YEAR_IN_CELL.find(value))
        .and_then(|m| m.as_str().parse().ok());

    from_column.or_else(|| {
        let title = extract_title(row, columns);
        YEAR_IN_TITLE
            .captures(&title)
            .and_then(|caps| caps[1].parse().ok())
    })
}

/// Date cell normalised to `YYYY-MM-DD`
pub fn extract_date(row: &[String], columns: &[CsvColumn]) -> Option<String> {
    let value = cell(row, columns, ColumnType::Date)?;
    if value.is_empty() {
        return None;
    }

    parse_date(value)
}

/// Parses common date layouts into `YYYY-MM-DD`
///
/// Slash dates are read as MM/DD/YYYY, or DD/MM/YYYY when the first part
/// cannot be a month. Dates that do not exist on the calendar are rejected.
pub fn parse_date(value: &str) -> Option<String> {
    if let Some(date) = parse_generic_date(value) {
        return Some(date.format("%Y-%m-%d").to_string());
    }

    let caps = SLASH_DATE.captures(value)?;
    let first: u32 = caps[1].parse().ok()?;
    let second: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;

    let (month, day) = if first > 12 && second <= 12 {
        (second, first)
    } else {
        (first, second)
    };

    NaiveDate::from_ymd_opt(year, month, day).map(|date| date.format("%Y-%m-%d").to_string())
}

fn parse_generic_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|dt| dt.date())
        })
}

/// Rating cell normalised onto a 1-10 scale
pub fn extract_rating(row: &[String], columns: &[CsvColumn]) -> Option<f64> {
    let value = cell(row, columns, ColumnType::Rating)?;
    if value.is_empty() {
        return None;
    }

    normalize_rating(value)
}

/// Rescales a raw rating onto 1-10
///
/// Star glyphs count one point each. Numbers up to 5 are a five-point scale
/// (doubled), up to 10 are kept, up to 100 are a percentage (divided by 10).
/// Anything landing outside 1-10 is rejected.
pub fn normalize_rating(value: &str) -> Option<f64> {
    let rating = if value.contains(STAR_GLYPH) {
        value.chars().filter(|c| *c == STAR_GLYPH).count() as f64
    } else {
        let number: f64 = LEADING_NUMBER.find(value)?.as_str().parse().ok()?;
        if number <= 5.0 {
            number * 2.0
        } else if number <= 10.0 {
            number
        } else if number <= 100.0 {
            number / 10.0
        } else {
            return None;
        }
    };

    (1.0..=10.0).contains(&rating).then_some(rating)
}

/// Extracts every field of one row
pub fn extract_fields(row: &[String], columns: &[CsvColumn]) -> RowFields {
    RowFields {
        title: extract_title(row, columns),
        year: extract_year(row, columns),
        date: extract_date(row, columns),
        rating: extract_rating(row, columns),
    }
}

/// Extracts fields for every row of a parsed table, in row order
pub fn extract_table(table: &ParsedTable) -> Vec<RowFields> {
    table
        .rows
        .iter()
        .map(|row| extract_fields(row, &table.columns))
        .collect()
}
