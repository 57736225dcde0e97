use super::error::LineListError;
use super::fields::Fields;
use super::traits::{LineListFile, open_file};
use crate::core::models::transition::{Transition, TransitionChunk};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

const TRANSITION_COLUMNS: usize = 3;

/// Rows per chunk when none is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// File extension of ExoMol transitions files.
pub const TRANSITIONS_EXTENSION: &str = "trans";

fn parse_transition(fields: &Fields<'_>) -> Result<Transition, LineListError> {
    Ok(Transition::new(
        fields.int(0)?,
        fields.int(1)?,
        fields.float(2)?,
    ))
}

/// ExoMol `.trans` file: `UpperId  LowerId  Afi  [...]`, read in full.
pub struct TransitionsFile;

impl LineListFile for TransitionsFile {
    type Output = TransitionChunk;

    fn read_from(
        reader: &mut impl BufRead,
        source: &Path,
    ) -> Result<TransitionChunk, LineListError> {
        let mut transitions = Vec::new();
        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res.map_err(|e| LineListError::Io {
                path: source.to_path_buf(),
                source: e,
            })?;
            if let Some(fields) = Fields::split(&line, source, line_num + 1, TRANSITION_COLUMNS) {
                transitions.push(parse_transition(&fields?)?);
            }
        }
        Ok(TransitionChunk::new(transitions))
    }
}

/// Reads a whole ExoMol transitions file.
///
/// # Arguments
///
/// * `path` - Path to a `.trans` file (`UpperId LowerId Afi [...]`).
///
/// # Return
///
/// Every row of the file as one chunk.
///
/// # Errors
///
/// Returns [`LineListError::NotFound`] for a missing file and
/// [`LineListError::Parse`] on the first malformed row.
pub fn read_exomol_transitions<P: AsRef<Path>>(path: P) -> Result<TransitionChunk, LineListError> {
    TransitionsFile::read_from_path(path)
}

/// Reads one transitions file lazily, at most `chunk_size` rows at a time.
///
/// The iterator stops after the first error.
pub struct TransitionFileReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_num: usize,
    chunk_size: usize,
    finished: bool,
}

impl TransitionFileReader {
    /// # Errors
    ///
    /// [`LineListError::InvalidChunkSize`] for a zero chunk size, checked before the
    /// file is touched; [`LineListError::NotFound`] if `path` is not a file.
    pub fn open<P: AsRef<Path>>(path: P, chunk_size: usize) -> Result<Self, LineListError> {
        if chunk_size == 0 {
            return Err(LineListError::InvalidChunkSize);
        }
        let path = path.as_ref().to_path_buf();
        let file = open_file(&path)?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            path,
            line_num: 0,
            chunk_size,
            finished: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_chunk(&mut self) -> Result<TransitionChunk, LineListError> {
        let mut transitions = Vec::with_capacity(self.chunk_size);
        while transitions.len() < self.chunk_size {
            let Some(line_res) = self.lines.next() else {
                self.finished = true;
                break;
            };
            self.line_num += 1;
            let line = line_res.map_err(|e| LineListError::Io {
                path: self.path.clone(),
                source: e,
            })?;
            if let Some(fields) =
                Fields::split(&line, &self.path, self.line_num, TRANSITION_COLUMNS)
            {
                transitions.push(parse_transition(&fields?)?);
            }
        }
        Ok(TransitionChunk::new(transitions))
    }
}

impl Iterator for TransitionFileReader {
    type Item = Result<TransitionChunk, LineListError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_chunk() {
            Ok(chunk) if chunk.is_empty() => None,
            Ok(chunk) => {
                trace!(rows = chunk.len(), file = %self.path.display(), "Read transition chunk.");
                Some(Ok(chunk))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Lists the `*.trans` files of a directory in name order.
///
/// Subdirectories and files with other extensions are skipped.
///
/// # Errors
///
/// Returns [`LineListError::NotFound`] if `directory` is not a directory and
/// [`LineListError::Io`] if it cannot be listed.
pub fn transition_files<P: AsRef<Path>>(directory: P) -> Result<Vec<PathBuf>, LineListError> {
    let directory = directory.as_ref();
    if !directory.is_dir() {
        return Err(LineListError::NotFound {
            path: directory.to_path_buf(),
        });
    }
    let io_err = |source| LineListError::Io {
        path: directory.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(directory).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == TRANSITIONS_EXTENSION)
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Every chunk of every `*.trans` file in a directory, one file after another.
///
/// Files are opened lazily as the previous one is exhausted. After an error the
/// iterator is finished.
pub struct TransitionChunks {
    files: Vec<PathBuf>,
    next_file: usize,
    current: Option<TransitionFileReader>,
    chunk_size: usize,
    finished: bool,
}

impl TransitionChunks {
    /// # Errors
    ///
    /// [`LineListError::NotFound`] if `directory` does not exist or is not a directory,
    /// [`LineListError::InvalidChunkSize`] for a zero chunk size.
    pub fn open<P: AsRef<Path>>(directory: P, chunk_size: usize) -> Result<Self, LineListError> {
        if chunk_size == 0 {
            return Err(LineListError::InvalidChunkSize);
        }
        let files = transition_files(&directory)?;
        debug!(
            files = files.len(),
            chunk_size,
            "Opened transitions directory {}",
            directory.as_ref().display()
        );
        Ok(Self {
            files,
            next_file: 0,
            current: None,
            chunk_size,
            finished: false,
        })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Number of files opened so far.
    pub fn files_started(&self) -> usize {
        self.next_file
    }
}

impl Iterator for TransitionChunks {
    type Item = Result<TransitionChunk, LineListError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            if let Some(reader) = self.current.as_mut() {
                match reader.next() {
                    Some(Ok(chunk)) => return Some(Ok(chunk)),
                    Some(Err(e)) => {
                        self.finished = true;
                        return Some(Err(e));
                    }
                    None => self.current = None,
                }
            }

            let Some(path) = self.files.get(self.next_file) else {
                self.finished = true;
                break;
            };
            self.next_file += 1;
            match TransitionFileReader::open(path, self.chunk_size) {
                Ok(reader) => self.current = Some(reader),
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::error::ParseErrorKind;
    use std::fs;
    use tempfile::tempdir;

    const FIVE_TRANSITIONS: &str = "       2        1 6.4700e-22
       2        5 1.4010e-20
      5       3 3.5010e-26
      3       4 2.3110e-24
       7        6 1.3020e-19
";

    fn fixture_dir() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("test.trans"), FIVE_TRANSITIONS).unwrap();
        dir
    }

    #[test]
    fn reads_five_line_fixture_with_expected_columns() {
        let dir = fixture_dir();
        let chunk = read_exomol_transitions(dir.path().join("test.trans")).unwrap();

        assert_eq!(chunk.len(), 5);
        assert_eq!(chunk.as_slice()[0], Transition::new(2, 1, 6.47e-22));
        assert_eq!(chunk.as_slice()[4].upper_id, 7);
        assert_eq!(chunk.as_slice()[4].lower_id, 6);
        assert_eq!(chunk.as_slice()[4].afi, 1.302e-19);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let result = read_exomol_transitions(dir.path().join("absent.trans"));
        assert!(matches!(result, Err(LineListError::NotFound { .. })));
    }

    #[test]
    fn file_reader_splits_into_bounded_chunks() {
        let dir = fixture_dir();
        let sizes: Vec<usize> = TransitionFileReader::open(dir.path().join("test.trans"), 2)
            .unwrap()
            .map(|chunk| chunk.unwrap().len())
            .collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn exact_multiple_of_chunk_size_has_no_trailing_empty_chunk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.trans");
        fs::write(&path, "2 1 1.0\n3 1 2.0\n3 2 3.0\n4 1 4.0\n").unwrap();
        let chunks: Vec<_> = TransitionFileReader::open(&path, 2)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let dir = fixture_dir();
        assert!(matches!(
            TransitionChunks::open(dir.path(), 0),
            Err(LineListError::InvalidChunkSize)
        ));
    }

    #[test]
    fn directory_iteration_visits_every_trans_file_in_name_order() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.trans"), "3 1 3.0\n").unwrap();
        fs::write(dir.path().join("a.trans"), "2 1 1.0\n3 2 2.0\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a transitions file\n").unwrap();

        let chunks = TransitionChunks::open(dir.path(), 1000).unwrap();
        assert_eq!(chunks.files().len(), 2);

        let afi: Vec<f64> = chunks
            .map(|c| c.unwrap())
            .flat_map(|c| c.iter().map(|t| t.afi).collect::<Vec<_>>())
            .collect();
        assert_eq!(afi, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn missing_directory_is_not_found() {
        let dir = tempdir().unwrap();
        let result = TransitionChunks::open(dir.path().join("nope"), 1000);
        assert!(matches!(result, Err(LineListError::NotFound { .. })));
    }

    #[test]
    fn iteration_stops_after_a_parse_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.trans"), "2 1 1.0\nx 1 2.0\n3 1 3.0\n").unwrap();
        fs::write(dir.path().join("b.trans"), "3 1 3.0\n").unwrap();

        let mut chunks = TransitionChunks::open(dir.path(), 1).unwrap();
        assert!(chunks.next().unwrap().is_ok());
        let err = chunks.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            LineListError::Parse {
                line: 2,
                kind: ParseErrorKind::InvalidInt { column: 1, .. },
                ..
            }
        ));
        assert!(chunks.next().is_none());
    }
}
