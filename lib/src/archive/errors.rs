use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use zip::result::ZipError;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Zip(ZipError),

    /// Entry is not present in the archive
    MissingEntry { archive: PathBuf, name: String },

    /// Archive was opened for reading only
    ReadOnly(PathBuf),

    /// Archive was used after it was released
    Released(PathBuf),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Error::Io(err) => write!(f, "io error: {}", err),
            Error::Zip(err) => write!(f, "zip error: {}", err),
            Error::MissingEntry { archive, name } => {
                write!(f, "no entry '{}' in {}", name, archive.display())
            }
            Error::ReadOnly(archive) => write!(f, "{} is not writable", archive.display()),
            Error::Released(archive) => write!(f, "{} was already released", archive.display()),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Zip(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ZipError> for Error {
    fn from(err: ZipError) -> Error {
        Error::Zip(err)
    }
}

/// One handle that failed to release
#[derive(Debug)]
pub struct ReleaseFailure {
    /// Position of the handle in acquisition order
    pub index: usize,
    pub error: Error,
}

/// Every failure from releasing a batch of handles
///
/// The first failure is `primary` and the remaining ones are kept in `suppressed`, so no failure
/// is lost when several handles fail to close.
#[derive(Debug)]
pub struct ResourceReleaseError {
    pub primary: ReleaseFailure,
    pub suppressed: Vec<ReleaseFailure>,

    /// Number of handles a release was attempted on (successful or not)
    pub attempted: usize,
}

impl ResourceReleaseError {
    /// Assemble the error from a list of failures, or `None` if there were none
    pub fn from_failures(
        mut failures: Vec<ReleaseFailure>,
        attempted: usize,
    ) -> Option<ResourceReleaseError> {
        if failures.is_empty() {
            return None;
        }
        let primary = failures.remove(0);
        Some(ResourceReleaseError {
            primary,
            suppressed: failures,
            attempted,
        })
    }

    /// All failures, primary first
    pub fn failures(&self) -> impl Iterator<Item = &ReleaseFailure> {
        std::iter::once(&self.primary).chain(&self.suppressed)
    }
}

impl Display for ResourceReleaseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} of {} archives failed to close: ",
            1 + self.suppressed.len(),
            self.attempted
        )?;
        for (idx, failure) in self.failures().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "#{}: {}", failure.index, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ResourceReleaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.primary.error)
    }
}
