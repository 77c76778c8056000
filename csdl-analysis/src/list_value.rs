//! List values and CSV import
//!
//!     Operators like `in` or `contains_any` take a single string holding a comma separated
//!     list. A literal comma inside an item is written `\,`. Items are trimmed and blank items
//!     are dropped when reading, and commas are escaped again when writing.
//!
//!     Lists can be imported from CSV text: a single line is one list of items, several lines
//!     with one column each are a list as well, anything wider is a table the host has to pick
//!     a column from.

/// Split a list value into its items.
pub fn parse_list(value: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                chars.next();
                current.push(',');
            }
            ',' => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);

    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Join items into a list value, escaping commas and skipping blank items.
pub fn format_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .filter(|item| !item.as_ref().trim().is_empty())
        .map(|item| item.as_ref().replace(',', "\\,"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Fields of one CSV record. Fields may be double quoted, with `""` for a literal quote.
pub fn split_csv_record(record: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = record.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            ('"', true) => quoted = false,
            ('"', false) if field.trim().is_empty() => {
                field.clear();
                quoted = true;
            }
            (',', false) => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    if !record.is_empty() {
        fields.push(field);
    }
    fields
}

/// Result of reading CSV text for the list editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvImport {
    List(Vec<String>),
    /// Rows of a multi-column import, `columns` being the widest row.
    Table {
        rows: Vec<Vec<String>>,
        columns: usize,
    },
}

impl CsvImport {
    /// Items of one table column, blank cells skipped. A list import is its own column 0.
    pub fn column(&self, index: usize) -> Vec<String> {
        match self {
            CsvImport::List(items) if index == 0 => items.clone(),
            CsvImport::List(_) => Vec::new(),
            CsvImport::Table { rows, .. } => rows
                .iter()
                .filter_map(|row| row.get(index))
                .filter(|cell| !cell.trim().is_empty())
                .cloned()
                .collect(),
        }
    }
}

pub fn parse_csv(text: &str) -> CsvImport {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<&str> = normalized.split('\n').collect();
    if lines.len() > 1 && lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    if lines.len() == 1 {
        return CsvImport::List(split_csv_record(lines[0]));
    }

    let rows: Vec<Vec<String>> = lines.iter().map(|line| split_csv_record(line)).collect();
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
    if columns == 1 {
        return CsvImport::List(rows.into_iter().flatten().collect());
    }
    CsvImport::Table { rows, columns }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("en,de", vec!["en", "de"])]
    #[case(" en , de ,, ", vec!["en", "de"])]
    #[case("a\\,b,c", vec!["a,b", "c"])]
    #[case("", vec![])]
    #[case("path\\x", vec!["path\\x"])]
    fn parses_list_values(#[case] value: &str, #[case] expected: Vec<&str>) {
        assert_eq!(parse_list(value), expected);
    }

    #[test]
    fn formatting_escapes_commas_and_skips_blanks() {
        assert_eq!(format_list(["new york, ny", " ", "london"]), "new york\\, ny,london");
        assert_eq!(parse_list(&format_list(["a,b", "c"])), vec!["a,b", "c"]);
    }

    #[test]
    fn csv_records_honour_quotes() {
        assert_eq!(
            split_csv_record("one,\"two, three\",\"say \"\"hi\"\"\""),
            vec!["one", "two, three", "say \"hi\""]
        );
        assert_eq!(split_csv_record("a,"), vec!["a", ""]);
        assert!(split_csv_record("").is_empty());
    }

    #[test]
    fn single_line_csv_is_a_list() {
        assert_eq!(
            parse_csv("apple,banana,cherry"),
            CsvImport::List(vec!["apple".into(), "banana".into(), "cherry".into()])
        );
    }

    #[test]
    fn single_column_csv_is_a_list() {
        assert_eq!(
            parse_csv("apple\r\nbanana\rcherry\n"),
            CsvImport::List(vec!["apple".into(), "banana".into(), "cherry".into()])
        );
    }

    #[test]
    fn wide_csv_is_a_table() {
        let import = parse_csv("name,code\nGermany,de\nFrance");
        match &import {
            CsvImport::Table { rows, columns } => {
                assert_eq!(*columns, 2);
                assert_eq!(rows.len(), 3);
            }
            other => panic!("expected table, got {other:?}"),
        }
        assert_eq!(import.column(1), vec!["code", "de"]);
    }
}
