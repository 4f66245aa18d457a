//! Delimited table reader.

use crate::config::Dialect;
use crate::error::{ComuniError, Result};
use tracing::debug;

/// One parsed row, aligned by column index with the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    line: u64,
    cells: Vec<String>,
}

impl RawRow {
    pub fn new(line: u64, cells: Vec<String>) -> Self {
        RawRow { line, cells }
    }

    /// Line of the source text the row starts on (1-based)
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Header plus body rows of a delimited table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: RawRow,
    pub body: Vec<RawRow>,
}

/// Parse decoded text into rows. The first non-comment row is the header.
/// Every row must have as many cells as the header.
pub fn read_table(text: &str, dialect: &Dialect) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(dialect.delimiter)
        .comment(Some(dialect.comment))
        .has_headers(false)
        .flexible(false)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        rows.push(RawRow::new(line, record.iter().map(str::to_owned).collect()));
    }

    let mut rows = rows.into_iter();
    let header = rows.next().ok_or_else(|| ComuniError::Parse {
        line: None,
        message: "no header row found".to_string(),
    })?;
    let body: Vec<RawRow> = rows.collect();

    debug!(
        columns = header.len(),
        rows = body.len(),
        "parsed delimited table"
    );
    Ok(Table { header, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(row: &RawRow) -> Vec<&str> {
        row.cells().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_read_semicolon_table() {
        let text = "Codice Regione;Denominazione\n01;Torino\n01;Aglié\n";
        let table = read_table(text, &Dialect::default()).unwrap();
        assert_eq!(cells(&table.header), vec!["Codice Regione", "Denominazione"]);
        assert_eq!(table.body.len(), 2);
        assert_eq!(cells(&table.body[1]), vec!["01", "Aglié"]);
        assert_eq!(table.body[1].line(), 3);
    }

    #[test]
    fn test_comment_lines_skipped() {
        let text = "# export generated by ISTAT\nA;B\n# footnote\n1;2\n";
        let table = read_table(text, &Dialect::default()).unwrap();
        assert_eq!(cells(&table.header), vec!["A", "B"]);
        assert_eq!(table.body.len(), 1);
        assert_eq!(cells(&table.body[0]), vec!["1", "2"]);
    }

    #[test]
    fn test_quoted_delimiter() {
        let text = "A;\"B;extra\"\n1;2\n";
        let table = read_table(text, &Dialect::default()).unwrap();
        assert_eq!(cells(&table.header), vec!["A", "B;extra"]);
    }

    #[test]
    fn test_cells_keep_padding() {
        let text = "A;B\r\n  1 ; 2\r\n";
        let table = read_table(text, &Dialect::default()).unwrap();
        assert_eq!(cells(&table.body[0]), vec!["  1 ", " 2"]);
    }

    #[test]
    fn test_inconsistent_row_fails() {
        let text = "A;B;C\n1;2;3\n4;5\n6;7;8\n";
        let err = read_table(text, &Dialect::default()).unwrap_err();
        match err {
            ComuniError::Parse { line, .. } => assert_eq!(line, Some(3)),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_header_only() {
        let table = read_table("A;B\n", &Dialect::default()).unwrap();
        assert!(table.body.is_empty());
    }

    #[test]
    fn test_empty_input_fails() {
        let err = read_table("# only a comment\n", &Dialect::default()).unwrap_err();
        assert!(matches!(err, ComuniError::Parse { line: None, .. }));
    }

    #[test]
    fn test_custom_dialect() {
        let dialect = Dialect::new(',', '%').unwrap();
        let table = read_table("%skip\nA,B\n1,2\n", &dialect).unwrap();
        assert_eq!(cells(&table.body[0]), vec!["1", "2"]);
    }
}
