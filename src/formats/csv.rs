use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::Error;
use crate::inference::TypeInferencer;
use crate::types::{Column, ColumnValues, Dataset, FileFormat, Result};

use super::TableFormat;

/// CSV reader/writer
pub struct CsvFormat {
    delimiter: u8,
}

impl CsvFormat {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Parse CSV text from any reader
    pub fn read_from<R: Read>(&self, reader: R, row_limit: Option<usize>) -> Result<Dataset> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| Error::Input(format!("cannot read CSV header: {e}")))?
            .iter()
            .map(|h| h.to_string())
            .collect();
        let num_cols = headers.len();

        let mut inferencers: Vec<TypeInferencer> =
            (0..num_cols).map(|_| TypeInferencer::new()).collect();
        let mut cells: Vec<Vec<String>> = vec![Vec::new(); num_cols];

        for result in csv_reader.records().take(row_limit.unwrap_or(usize::MAX)) {
            let record =
                result.map_err(|e| Error::Input(format!("malformed CSV input: {e}")))?;
            for (col_idx, field) in record.iter().enumerate() {
                inferencers[col_idx].observe(field);
                cells[col_idx].push(field.to_string());
            }
        }

        let columns = headers
            .into_iter()
            .zip(inferencers)
            .zip(cells)
            .map(|((name, inferencer), cells)| Column::new(name, inferencer.convert(cells)))
            .collect();

        Dataset::new(columns)
    }

    /// Write a dataset as CSV with a header row
    pub fn write_to<W: Write>(&self, dataset: &Dataset, writer: W) -> Result<()> {
        let mut csv_writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        csv_writer.write_record(dataset.column_names())?;
        for row in 0..dataset.row_count() {
            let record: Vec<String> = dataset
                .columns()
                .iter()
                .map(|c| format_cell(&c.values, row))
                .collect();
            csv_writer.write_record(&record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl TableFormat for CsvFormat {
    fn format(&self) -> FileFormat {
        FileFormat::Csv
    }

    fn read(&self, path: &Path, row_limit: Option<usize>) -> Result<Dataset> {
        let file = File::open(path)
            .map_err(|e| Error::Input(format!("cannot read {}: {e}", path.display())))?;
        self.read_from(BufReader::new(file), row_limit)
    }

    fn write(&self, dataset: &Dataset, file: &mut File) -> Result<()> {
        self.write_to(dataset, BufWriter::new(file))
    }
}

/// Render one cell; missing cells are empty
fn format_cell(values: &ColumnValues, row: usize) -> String {
    match values {
        ColumnValues::Integer(v) => v[row].map(|x| x.to_string()),
        ColumnValues::Numeric(v) => v[row].map(format_float),
        ColumnValues::String(v) => v[row].clone(),
        ColumnValues::Categorical(v) => v[row].map(|x| x.to_string()),
    }
    .unwrap_or_default()
}

/// Floats keep a decimal point so the column reads back as numeric, not integer
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DType;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_basic_csv_read() {
        let file = create_test_csv("id,name,age\n1,Alice,30\n2,Bob,25\n3,Charlie,35\n");

        let dataset = CsvFormat::new().read(file.path(), None).unwrap();

        assert_eq!(dataset.column_names(), vec!["id", "name", "age"]);
        assert_eq!(dataset.row_count(), 3);
    }

    #[test]
    fn test_type_inference() {
        let file =
            create_test_csv("int_col,float_col,str_col\n1,1.5,hello\n2,2.5,world\n3,NA,test\n");

        let dataset = CsvFormat::new().read(file.path(), None).unwrap();

        assert_eq!(dataset.columns()[0].dtype(), DType::Integer);
        assert_eq!(dataset.columns()[1].dtype(), DType::Numeric);
        assert_eq!(dataset.columns()[2].dtype(), DType::String);
        assert_eq!(
            dataset.columns()[1].values,
            ColumnValues::Numeric(vec![Some(1.5), Some(2.5), None])
        );
    }

    #[test]
    fn test_row_limit() {
        let file = create_test_csv("a\n1\n2\n3\n4\n");

        let dataset = CsvFormat::new().read(file.path(), Some(2)).unwrap();

        assert_eq!(dataset.row_count(), 2);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let file = create_test_csv("a,b\n1,2\n3\n");
        let err = CsvFormat::new().read(file.path(), None).unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }

    #[test]
    fn test_invalid_utf8_is_input_error() {
        let err = CsvFormat::new()
            .read_from(&b"a,b\n1,\xff\n"[..], None)
            .unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let err = CsvFormat::new()
            .read(Path::new("/nonexistent/input.csv"), None)
            .unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }

    #[test]
    fn test_write_formats_cells() {
        let dataset = Dataset::new(vec![
            Column::new("n", ColumnValues::Integer(vec![Some(1), None])),
            Column::new("x", ColumnValues::Numeric(vec![Some(1.0), Some(0.25)])),
            Column::new(
                "s",
                ColumnValues::String(vec![Some("a,b".to_string()), None]),
            ),
            Column::new("c", ColumnValues::Categorical(vec![Some(0), Some(1)])),
        ])
        .unwrap();

        let mut buf = Vec::new();
        CsvFormat::new().write_to(&dataset, &mut buf).unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "n,x,s,c\n1,1.0,\"a,b\",0\n,0.25,,1\n"
        );
    }

    #[test]
    fn test_write_then_read_keeps_types() {
        let dataset = Dataset::new(vec![
            Column::new("x", ColumnValues::Numeric(vec![Some(0.0), Some(1.0)])),
            Column::new("n", ColumnValues::Integer(vec![Some(5), Some(6)])),
        ])
        .unwrap();
        let mut buf = Vec::new();
        let format = CsvFormat::new();
        format.write_to(&dataset, &mut buf).unwrap();

        let back = format.read_from(buf.as_slice(), None).unwrap();

        assert_eq!(back, dataset);
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(0.5), "0.5");
        assert_eq!(format_float(2.0), "2.0");
        assert_eq!(format_float(f64::NAN), "NaN");
        assert_eq!(format_float(f64::INFINITY), "inf");
    }
}
