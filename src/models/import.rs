use serde::{Deserialize, Serialize};

/// Semantic type inferred for a CSV column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Title,
    Year,
    Date,
    Rating,
    Unknown,
}

/// A single source column with its inferred type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CsvColumn {
    /// Header text as it appeared in the file
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Zero-based position in the header row
    pub index: usize,
}

/// Exporter the CSV most likely came from
///
/// Informational only; extraction never branches on it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CsvFormat {
    /// Letterboxd diary/ratings export (Name, Date, Rating)
    Letterboxd,
    /// IMDb ratings export (Title, Year, Your Rating)
    Imdb,
    /// Export carrying TMDB identifiers
    Tmdb,
    /// Recognisable movie columns in a non-standard layout
    Custom,
    Unknown,
}

/// Result of structural analysis of a CSV upload
///
/// Every row holds exactly `headers.len()` cells and `columns[i].index == i`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub columns: Vec<CsvColumn>,
    pub rows: Vec<Vec<String>>,
    pub detected_format: CsvFormat,
}

impl ParsedTable {
    /// First column inferred as the given type
    pub fn first_column_of(&self, column_type: ColumnType) -> Option<&CsvColumn> {
        first_column_of(&self.columns, column_type)
    }
}

pub(crate) fn first_column_of(columns: &[CsvColumn], column_type: ColumnType) -> Option<&CsvColumn> {
    columns.iter().find(|c| c.column_type == column_type)
}

/// Best-guess fields pulled out of one CSV row
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RowFields {
    pub title: String,
    pub year: Option<i32>,
    /// ISO `YYYY-MM-DD`
    pub date: Option<String>,
    /// Normalised onto a 1-10 scale
    pub rating: Option<f64>,
}
