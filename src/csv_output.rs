//! CSV export of summary tables
//!
//! Missing values are written as empty cells so the files load back into
//! spreadsheet tools and dataframe libraries as NA.

use crate::error::Result;
use crate::report::TableRow;
use csv::Writer;
use std::io::Write;
use std::path::Path;

/// Write rows (header first) to any writer
pub fn write_rows<W: Write, R: TableRow>(writer: W, rows: &[R]) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    if let Some(first) = rows.first() {
        wtr.write_record(first.headers())?;
    }
    for row in rows {
        wtr.write_record(row.fields().iter().map(|f| f.to_csv()))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write rows to a CSV file, replacing any existing file
pub fn write_csv_file<R: TableRow>(path: &Path, rows: &[R]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_rows(file, rows)
}

/// Render rows as a CSV string
pub fn to_csv_string<R: TableRow>(rows: &[R]) -> Result<String> {
    let mut buffer = Vec::new();
    write_rows(&mut buffer, rows)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Field;

    struct Summary {
        graph_type: &'static str,
        count: usize,
        mean: f64,
    }

    impl TableRow for Summary {
        fn headers(&self) -> Vec<String> {
            vec!["graph_type".into(), "count".into(), "mean".into()]
        }
        fn fields(&self) -> Vec<Field> {
            vec![
                Field::Text(self.graph_type.to_string()),
                Field::Count(self.count),
                Field::float(self.mean),
            ]
        }
    }

    #[test]
    fn test_csv_export_empty() {
        let out = to_csv_string::<Summary>(&[]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_csv_export_rows() {
        let rows = [
            Summary {
                graph_type: "CSRGraph",
                count: 3,
                mean: 1.25,
            },
            Summary {
                graph_type: "Matrix, dense",
                count: 1,
                mean: f64::NAN,
            },
        ];
        let out = to_csv_string(&rows).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "graph_type,count,mean");
        assert_eq!(lines[1], "CSRGraph,3,1.25");
        assert_eq!(lines[2], "\"Matrix, dense\",1,");
    }

    #[test]
    fn test_write_csv_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("summary.csv");
        let rows = [Summary {
            graph_type: "A",
            count: 1,
            mean: 2.0,
        }];
        write_csv_file(&path, &rows).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "graph_type,count,mean\nA,1,2\n");
    }
}
