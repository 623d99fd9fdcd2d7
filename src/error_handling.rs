use std::fmt::Display;
use std::path::{Path, PathBuf};

pub trait ErrorType: Display + PartialEq {}

#[derive(Debug, PartialEq, Clone)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize
}

impl Location {
    // A location that refers to a whole file rather than one line
    pub fn file(path: &Path) -> Self {
        Location { file: path.to_path_buf(), line: 0 }
    }

    pub fn line(path: &Path, line: usize) -> Self {
        Location { file: path.to_path_buf(), line }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.file.display())
        } else {
            write!(f, "{}:{}", self.file.display(), self.line)
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Error<T: ErrorType> {
    pub location: Location,
    pub error: T
}

impl<T: ErrorType> Error<T> {
    pub fn new(location: Location, error: T) -> Self {
        Error { location, error }
    }
}

impl<T: ErrorType> Display for Error<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\x1b[31;49;1m[{}]\x1b[39;49;1m  {}\x1b[0m", self.location, self.error)
    }
}

impl<T: ErrorType + std::fmt::Debug> std::error::Error for Error<T> {}

pub type Errors<T> = Vec<Error<T>>;

// Writes every error of a batch to stderr, one per line
pub fn report<T: ErrorType>(errors: &Errors<T>) {
    for error in errors {
        eprintln!("{}", error);
    }
}
