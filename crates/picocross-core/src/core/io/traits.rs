use super::error::LineListError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Opens a regular file, mapping a missing path to [`LineListError::NotFound`].
pub fn open_file(path: &Path) -> Result<File, LineListError> {
    if !path.is_file() {
        return Err(LineListError::NotFound {
            path: path.to_path_buf(),
        });
    }
    File::open(path).map_err(|source| LineListError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Common interface of the whole-file ExoMol readers.
pub trait LineListFile {
    /// The table produced from one file.
    type Output;

    /// Parses a complete table from `reader`; `source` is used in error messages only.
    ///
    /// # Errors
    ///
    /// Returns [`LineListError::Parse`] on the first malformed line and
    /// [`LineListError::Io`] if reading fails.
    fn read_from(reader: &mut impl BufRead, source: &Path) -> Result<Self::Output, LineListError>;

    /// Reads a table from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`LineListError::NotFound`] if `path` is not an existing file, otherwise
    /// whatever [`LineListFile::read_from`] reports.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self::Output, LineListError> {
        let path = path.as_ref();
        let file = open_file(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, path)
    }
}
