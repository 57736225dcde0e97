use super::error::{LineListError, ParseErrorKind};
use std::path::Path;

/// Whitespace-split columns of one data line, with enough context to report errors.
pub(crate) struct Fields<'a> {
    tokens: Vec<&'a str>,
    path: &'a Path,
    line: usize,
}

impl<'a> Fields<'a> {
    /// Splits `content`, returning `None` for blank lines.
    pub(crate) fn split(
        content: &'a str,
        path: &'a Path,
        line: usize,
        required: usize,
    ) -> Option<Result<Self, LineListError>> {
        let tokens: Vec<&str> = content.split_whitespace().collect();
        if tokens.is_empty() {
            return None;
        }
        let fields = Self { tokens, path, line };
        if fields.tokens.len() < required {
            return Some(Err(fields.error(ParseErrorKind::TooFewColumns {
                expected: required,
                found: fields.tokens.len(),
            })));
        }
        Some(Ok(fields))
    }

    pub(crate) fn error(&self, kind: ParseErrorKind) -> LineListError {
        LineListError::Parse {
            path: self.path.to_path_buf(),
            line: self.line,
            kind,
        }
    }

    pub(crate) fn int(&self, column: usize) -> Result<u64, LineListError> {
        let value = self.tokens[column];
        value.parse().map_err(|_| {
            self.error(ParseErrorKind::InvalidInt {
                column: column + 1,
                value: value.to_string(),
            })
        })
    }

    pub(crate) fn float(&self, column: usize) -> Result<f64, LineListError> {
        let value = self.tokens[column];
        parse_fortran_float(value).ok_or_else(|| {
            self.error(ParseErrorKind::InvalidFloat {
                column: column + 1,
                value: value.to_string(),
            })
        })
    }
}

/// Accepts Fortran `D` exponents (`1.0D-03`) as well as the usual forms.
fn parse_fortran_float(value: &str) -> Option<f64> {
    value
        .parse()
        .ok()
        .or_else(|| value.replace(['D', 'd'], "E").parse().ok())
}
