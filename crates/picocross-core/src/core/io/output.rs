use super::error::{LineListError, OutputError};
use crate::core::models::cross_section::CrossSection;
use crate::core::units::Dimension;
use std::io::Write;
use std::path::Path;

pub const CROSS_SECTION_HEADER: [&str; 2] = ["wavenumber_cm-1", "cross_section_cm2"];

/// Writes a cross-section as a two-column CSV table (cm⁻¹, cm²).
///
/// Both columns are written with full `f64` precision, so a table read back parses to
/// the same grid and values.
///
/// # Arguments
///
/// * `writer` - Destination of the CSV text.
/// * `cross_section` - Values must carry an area unit; they are converted to cm².
///
/// # Errors
///
/// [`OutputError::Units`] if the values are untagged or not an area, checked before
/// anything is written. [`OutputError::Csv`] for failures of the underlying writer.
pub fn write_cross_section<W: Write>(
    writer: W,
    cross_section: &CrossSection,
) -> Result<(), OutputError> {
    let values = cross_section
        .values()
        .to_base(Dimension::Area, "cross_section")?;

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CROSS_SECTION_HEADER)?;
    for (wavenumber, value) in cross_section.grid().as_slice().iter().zip(values.iter()) {
        csv.write_record([wavenumber.to_string(), format!("{:e}", value)])?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Creates (or truncates) `path` and writes the cross-section table into it.
///
/// # Errors
///
/// [`LineListError::Io`] if the file cannot be created, [`LineListError::Output`] for
/// anything [`write_cross_section`] rejects.
pub fn write_cross_section_to_path<P: AsRef<Path>>(
    path: P,
    cross_section: &CrossSection,
) -> Result<(), LineListError> {
    let path = path.as_ref();
    let file = std::fs::File::create(path).map_err(|source| LineListError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_cross_section(std::io::BufWriter::new(file), cross_section).map_err(|source| {
        LineListError::Output {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::grid::SpectralGrid;
    use crate::core::units::{Quantity, Unit, UnitsError};
    use tempfile::tempdir;

    fn sample() -> CrossSection {
        let grid = SpectralGrid::new(&Quantity::new(vec![1.0, 2.0], Unit::PerCentimeter)).unwrap();
        CrossSection::new(
            grid,
            Quantity::new(vec![0.0, 1.5e-20], Unit::SquareCentimeter),
            3,
        )
    }

    #[test]
    fn written_file_has_header_and_one_row_per_grid_point() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("xsec.csv");
        write_cross_section_to_path(&path, &sample()).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), CROSS_SECTION_HEADER);

        let rows: Vec<(f64, f64)> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], (1.0, 0.0));
        assert!((rows[1].1 - 1.5e-20).abs() < 1e-26);
    }

    #[test]
    fn unwritable_path_reports_io_error() {
        let dir = tempdir().unwrap();
        let result = write_cross_section_to_path(dir.path(), &sample());
        assert!(matches!(result, Err(LineListError::Io { .. })));
    }

    #[test]
    fn grid_positions_keep_full_precision() {
        let positions = vec![1594.873096123, 1594.873096124];
        let grid = SpectralGrid::new(&Quantity::new(positions.clone(), Unit::PerCentimeter)).unwrap();
        let cross_section = CrossSection::new(
            grid,
            Quantity::new(vec![1.234567890123e-20, 0.0], Unit::SquareCentimeter),
            1,
        );

        let mut buffer = Vec::new();
        write_cross_section(&mut buffer, &cross_section).unwrap();
        let mut reader = csv::Reader::from_reader(buffer.as_slice());
        let rows: Vec<(f64, f64)> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(rows[0].0, positions[0]);
        assert_eq!(rows[1].0, positions[1]);
        assert_eq!(rows[0].1, 1.234567890123e-20);
    }

    #[test]
    fn untagged_values_are_rejected_before_writing() {
        let grid = SpectralGrid::new(&Quantity::new(vec![1.0, 2.0], Unit::PerCentimeter)).unwrap();
        let cross_section = CrossSection::new(grid, Quantity::raw(vec![0.0, 1.0]), 1);

        let mut buffer = Vec::new();
        let result = write_cross_section(&mut buffer, &cross_section);
        assert!(matches!(
            result,
            Err(OutputError::Units(UnitsError::Missing { .. }))
        ));
        assert!(buffer.is_empty());
    }

    #[test]
    fn values_in_another_dimension_are_rejected() {
        let grid = SpectralGrid::new(&Quantity::new(vec![1.0, 2.0], Unit::PerCentimeter)).unwrap();
        let cross_section = CrossSection::new(
            grid,
            Quantity::new(vec![0.0, 1.0], Unit::Centimeter),
            1,
        );

        let dir = tempdir().unwrap();
        let result = write_cross_section_to_path(dir.path().join("xsec.csv"), &cross_section);
        assert!(matches!(
            result,
            Err(LineListError::Output {
                source: OutputError::Units(UnitsError::Mismatch { .. }),
                ..
            })
        ));
    }
}
