//! Calibration table loading
//!
//! The table is tab-separated text. The first non-comment row is the
//! header: one `T (C)` column and one or more probe columns holding the
//! resistance ratio R/R(25°C). The selected probe column is scaled by the
//! probe's reference resistance to get ohms.
//!
//! ```text
//! T (C)	Type 8016	Type 8017
//! 0	3.3621	3.3900
//! 25	1.0000	1.0000
//! 50	0.3588	0.3563
//! ```

use heapless::Vec;

use crate::config::ConfigError;

/// Header label of the temperature column
pub const TEMPERATURE_COLUMN: &str = "T (C)";

/// Maximum number of rows in a calibration table
pub const MAX_CALIBRATION_POINTS: usize = 256;

/// One temperature/resistance correspondence
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationPoint {
    /// Temperature in °C
    pub temperature_c: f32,
    /// Probe resistance in ohms
    pub resistance_ohms: f32,
}

impl CalibrationPoint {
    pub const fn new(temperature_c: f32, resistance_ohms: f32) -> Self {
        Self {
            temperature_c,
            resistance_ohms,
        }
    }

    fn is_finite(&self) -> bool {
        self.temperature_c.is_finite() && self.resistance_ohms.is_finite()
    }
}

/// Calibration points in file order
pub type CalibrationTable = Vec<CalibrationPoint, MAX_CALIBRATION_POINTS>;

/// Parse a tab-separated calibration table
///
/// # Arguments
/// - `input`: Table text
/// - `column`: Header label of the probe curve to use
/// - `reference_ohms`: Probe resistance at 25°C, multiplies the ratio column
pub fn parse_table(
    input: &str,
    column: &str,
    reference_ohms: f32,
) -> Result<CalibrationTable, ConfigError> {
    if !(reference_ohms > 0.0 && reference_ohms.is_finite()) {
        return Err(ConfigError::InvalidReference);
    }

    let mut rows = input
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        });

    let (_, header) = rows.next().ok_or(ConfigError::EmptyTable)?;
    let temperature_idx =
        column_index(header, TEMPERATURE_COLUMN).ok_or(ConfigError::MissingTemperatureColumn)?;
    let ratio_idx = column_index(header, column).ok_or(ConfigError::MissingColumn)?;

    let mut table = CalibrationTable::new();
    for (line, row) in rows {
        let temperature_c = cell(row, temperature_idx, line)?;
        let ratio = cell(row, ratio_idx, line)?;
        table
            .push(CalibrationPoint::new(temperature_c, ratio * reference_ohms))
            .map_err(|_| ConfigError::TooManyPoints)?;
    }

    Ok(table)
}

/// Check every point is finite
pub(crate) fn check_finite(points: &[CalibrationPoint]) -> Result<(), ConfigError> {
    if points.iter().all(CalibrationPoint::is_finite) {
        Ok(())
    } else {
        Err(ConfigError::NonFinitePoint)
    }
}

fn column_index(header: &str, label: &str) -> Option<usize> {
    header.split('\t').position(|name| name.trim() == label)
}

fn cell(row: &str, index: usize, line: usize) -> Result<f32, ConfigError> {
    let raw = row
        .split('\t')
        .nth(index)
        .ok_or(ConfigError::RaggedRow { line })?;
    let value: f32 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { line })?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::InvalidNumber { line })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "# Probe curves\n\
        T (C)\tType 8016\tType 8017\n\
        0\t3.3621\t3.3900\n\
        25\t1.0000\t1.0000\n\
        \n\
        50\t0.3588\t0.3563\n";

    #[test]
    fn test_parse_selects_column_and_scales() {
        let table = parse_table(TABLE, "Type 8017", 10_000.0).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table[0].temperature_c, 0.0);
        assert!((table[0].resistance_ohms - 33_900.0).abs() < 0.5);
        assert!((table[1].resistance_ohms - 10_000.0).abs() < 0.01);
        assert_eq!(table[2].temperature_c, 50.0);
    }

    #[test]
    fn test_parse_handles_crlf() {
        let input = "T (C)\tType 8016\r\n0\t3.3621\r\n25\t1.0\r\n";
        let table = parse_table(input, "Type 8016", 1.0).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[1].resistance_ohms, 1.0);
    }

    #[test]
    fn test_missing_column() {
        assert_eq!(
            parse_table(TABLE, "Type 9999", 10_000.0),
            Err(ConfigError::MissingColumn)
        );
        assert_eq!(
            parse_table("Temp\tType 8016\n0\t1.0\n", "Type 8016", 10_000.0),
            Err(ConfigError::MissingTemperatureColumn)
        );
    }

    #[test]
    fn test_bad_rows() {
        let ragged = "T (C)\tType 8016\n0\t3.3\n25\n";
        assert_eq!(
            parse_table(ragged, "Type 8016", 1.0),
            Err(ConfigError::RaggedRow { line: 3 })
        );

        let garbage = "T (C)\tType 8016\n0\tabc\n";
        assert_eq!(
            parse_table(garbage, "Type 8016", 1.0),
            Err(ConfigError::InvalidNumber { line: 2 })
        );

        let nan = "T (C)\tType 8016\n0\tNaN\n";
        assert_eq!(
            parse_table(nan, "Type 8016", 1.0),
            Err(ConfigError::InvalidNumber { line: 2 })
        );
    }

    #[test]
    fn test_empty_and_bad_reference() {
        assert_eq!(
            parse_table("# nothing\n\n", "Type 8016", 1.0),
            Err(ConfigError::EmptyTable)
        );
        assert_eq!(
            parse_table(TABLE, "Type 8016", 0.0),
            Err(ConfigError::InvalidReference)
        );
    }
}
