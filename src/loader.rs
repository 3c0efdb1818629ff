use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use polars::prelude::*;

use crate::error::{Result, VisualizerError};
use crate::records::{ExaminationRecord, RAW_COLUMNS};

pub async fn read_csv<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    /* Checks the header for every expected column, then reads the examination
    CSV with the declared column types */
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|source| VisualizerError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    check_header(&file, path)?;
    file.rewind().map_err(|source| VisualizerError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let df = CsvReader::new(file)
        .has_header(true)
        .with_dtypes(Option::from(Arc::new(ExaminationRecord::raw_schema())))
        .finish()?;

    info!("loaded {} examinations from {}", df.height(), path.display());
    debug!("{}", df.head(Some(5)));
    Ok(df)
}

fn check_header(file: &File, path: &Path) -> Result<()> {
    let mut reader = csv::Reader::from_reader(file);
    let headers = reader.headers()?;
    for column in RAW_COLUMNS {
        if !headers.iter().any(|name| name.trim() == column) {
            return Err(VisualizerError::MissingColumn {
                column: column.to_string(),
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

pub fn write_csv<P: AsRef<Path>>(path: P, df: &mut DataFrame) -> Result<()> {
    let path = path.as_ref();
    let mut file = File::create(path).map_err(|source| VisualizerError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    CsvWriter::new(&mut file).finish(df)?;
    info!("wrote {} rows to {}", df.height(), path.display());

    Ok(())
}
