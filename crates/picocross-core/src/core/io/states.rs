use super::error::{LineListError, ParseErrorKind};
use super::fields::Fields;
use super::traits::LineListFile;
use crate::core::models::level::{EnergyLevel, LevelTable};
use std::io::BufRead;
use std::path::Path;
use tracing::debug;

const STATE_COLUMNS: usize = 4;

/// ExoMol `.states` file: `ID  Energy  g_total  J  [...]`.
pub struct StatesFile;

impl LineListFile for StatesFile {
    type Output = LevelTable;

    fn read_from(reader: &mut impl BufRead, source: &Path) -> Result<LevelTable, LineListError> {
        let mut table = LevelTable::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res.map_err(|e| LineListError::Io {
                path: source.to_path_buf(),
                source: e,
            })?;
            let Some(fields) = Fields::split(&line, source, line_num + 1, STATE_COLUMNS) else {
                continue;
            };
            let fields = fields?;

            let level = EnergyLevel::new(
                fields.int(0)?,
                fields.float(1)?,
                fields.float(2)?,
                fields.float(3)?,
            );
            if !table.insert(level) {
                return Err(fields.error(ParseErrorKind::DuplicateId(level.id)));
            }
        }

        debug!(
            levels = table.len(),
            "Read states file {}",
            source.display()
        );
        Ok(table)
    }
}

/// Reads an ExoMol states file into a [`LevelTable`].
///
/// # Arguments
///
/// * `path` - Path to a `.states` file. Only the first four columns are read.
///
/// # Return
///
/// The levels keyed by state id, in file order.
///
/// # Errors
///
/// Returns [`LineListError::NotFound`] for a missing file, and
/// [`LineListError::Parse`] for short rows, unparsable numbers or a repeated id.
pub fn read_exomol_states<P: AsRef<Path>>(path: P) -> Result<LevelTable, LineListError> {
    StatesFile::read_from_path(path)
}
