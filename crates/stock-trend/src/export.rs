//! CSV persistence of a price series

use crate::error::Result;
use crate::series::PriceSeries;
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Writes `<SYMBOL>_stock_data.csv` files into a directory
#[derive(Debug, Clone)]
pub struct CsvExporter {
    dir: PathBuf,
}

impl CsvExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path the series for `symbol` is written to
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}_stock_data.csv"))
    }

    /// Write the series with header `Date,Open,High,Low,Close,Volume`,
    /// replacing any existing file
    #[instrument(skip(self, series), fields(symbol = series.symbol()))]
    pub fn export(&self, series: &PriceSeries) -> Result<PathBuf> {
        let path = self.path_for(series.symbol());

        let mut writer = csv::Writer::from_path(&path)?;
        for bar in series.bars() {
            writer.serialize(bar)?;
        }
        writer.flush()?;

        debug!(path = %path.display(), rows = series.len(), "Series exported");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::PriceBar;
    use crate::series::fixtures::series_with_highs;

    #[test]
    fn test_export_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path());
        let series = series_with_highs(&[10.0, 12.0, 15.0, 11.0, 9.0]);

        let path = exporter.export(&series).unwrap();
        assert_eq!(path, dir.path().join("AAPL_stock_data.csv"));

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "Date,Open,High,Low,Close,Volume");
        assert_eq!(lines[1], "2024-01-02,9.0,10.0,8.0,9.5,1000");
    }

    #[test]
    fn test_export_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let series = series_with_highs(&[101.25, 99.5]);
        let path = CsvExporter::new(dir.path()).export(&series).unwrap();

        let mut reader = csv::Reader::from_path(path).unwrap();
        let bars: Vec<PriceBar> = reader.deserialize().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(bars, series.bars());
    }

    #[test]
    fn test_export_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path());
        std::fs::write(exporter.path_for("AAPL"), "stale\nstale\nstale\nstale\nstale\nstale\nstale\n").unwrap();

        let path = exporter.export(&series_with_highs(&[10.0, 12.0])).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(!text.contains("stale"));
    }

    #[test]
    fn test_export_missing_dir_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path().join("missing"));

        let err = exporter.export(&series_with_highs(&[10.0])).unwrap_err();
        assert_eq!(err.kind(), "IOFailure");
    }
}
