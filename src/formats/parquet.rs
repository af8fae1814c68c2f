use std::fs::File;
use std::path::Path;

use polars::prelude::*;

use crate::error::Error;
use crate::types::{Column, ColumnValues, Dataset, FileFormat, Result};

use super::TableFormat;

/// Parquet reader/writer backed by polars
pub struct ParquetFormat;

impl TableFormat for ParquetFormat {
    fn format(&self) -> FileFormat {
        FileFormat::Parquet
    }

    fn read(&self, path: &Path, row_limit: Option<usize>) -> Result<Dataset> {
        if row_limit.is_some() {
            tracing::warn!("Row limit is not supported for Parquet input; reading all rows");
        }

        let file = File::open(path)
            .map_err(|e| Error::Input(format!("cannot read {}: {e}", path.display())))?;
        let df = ParquetReader::new(file).finish()?;
        from_data_frame(&df)
    }

    fn write(&self, dataset: &Dataset, file: &mut File) -> Result<()> {
        let mut df = to_data_frame(dataset)?;
        ParquetWriter::new(file).finish(&mut df)?;
        Ok(())
    }
}

fn from_data_frame(df: &DataFrame) -> Result<Dataset> {
    let columns = df
        .get_columns()
        .iter()
        .map(|col| -> Result<Column> {
            let series = col.as_materialized_series();
            let name = series.name().to_string();
            let dtype = series.dtype();

            let values = if dtype.is_integer() {
                let cast = series.cast(&DataType::Int64)?;
                ColumnValues::Integer(cast.i64()?.into_iter().collect())
            } else if dtype.is_float() {
                let cast = series.cast(&DataType::Float64)?;
                ColumnValues::Numeric(cast.f64()?.into_iter().collect())
            } else {
                let cast = series.cast(&DataType::String)?;
                ColumnValues::String(
                    cast.str()?
                        .into_iter()
                        .map(|v| v.map(str::to_string))
                        .collect(),
                )
            };
            Ok(Column::new(name, values))
        })
        .collect::<Result<Vec<_>>>()?;

    Dataset::new(columns)
}

fn to_data_frame(dataset: &Dataset) -> Result<DataFrame> {
    let columns: Vec<polars::prelude::Column> = dataset
        .columns()
        .iter()
        .map(|c| {
            let name = PlSmallStr::from(c.name.as_str());
            match &c.values {
                ColumnValues::Integer(v) => polars::prelude::Column::new(name, v.as_slice()),
                ColumnValues::Numeric(v) => polars::prelude::Column::new(name, v.as_slice()),
                ColumnValues::String(v) => polars::prelude::Column::new(name, v.as_slice()),
                ColumnValues::Categorical(v) => polars::prelude::Column::new(name, v.as_slice()),
            }
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}
