use crate::archive::{self, ResourceReleaseError, ScopeError};
use crate::jvm;
use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug)]
pub enum Error {
    /// A class in one of the inputs could not be read or rewritten
    Class { entry: String, error: jvm::Error },
    Jvm(jvm::Error),
    Archive(archive::Error),
    Release(ResourceReleaseError),

    /// Archives also failed to close after `error` aborted the split
    ReleaseAfter {
        error: Box<Error>,
        release: ResourceReleaseError,
    },
    Io(std::io::Error),

    /// Class name mappings could not be parsed
    Mappings { line: usize, message: String },
}

impl Error {
    /// Attach the archive entry a class error happened in
    pub fn in_class(entry: &str) -> impl FnOnce(jvm::Error) -> Error + '_ {
        move |error| Error::Class {
            entry: entry.to_owned(),
            error,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Error::Class { entry, error } => write!(f, "{}: {}", entry, error),
            Error::Jvm(error) => error.fmt(f),
            Error::Archive(error) => error.fmt(f),
            Error::Release(error) => error.fmt(f),
            Error::ReleaseAfter { error, release } => {
                write!(f, "{} (then {})", error, release)
            }
            Error::Io(error) => write!(f, "io error: {}", error),
            Error::Mappings { line, message } => {
                write!(f, "mappings line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Class { error, .. } | Error::Jvm(error) => Some(error),
            Error::Archive(error) => Some(error),
            Error::Release(error) => Some(error),
            Error::ReleaseAfter { error, .. } => Some(error.as_ref()),
            Error::Io(error) => Some(error),
            Error::Mappings { .. } => None,
        }
    }
}

impl From<jvm::Error> for Error {
    fn from(err: jvm::Error) -> Error {
        Error::Jvm(err)
    }
}

impl From<archive::Error> for Error {
    fn from(err: archive::Error) -> Error {
        Error::Archive(err)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Error {
        Error::Archive(archive::Error::Zip(err))
    }
}

impl From<ResourceReleaseError> for Error {
    fn from(err: ResourceReleaseError) -> Error {
        Error::Release(err)
    }
}

impl ScopeError for Error {
    fn with_release_failure(self, release: ResourceReleaseError) -> Error {
        Error::ReleaseAfter {
            error: Box::new(self),
            release,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
