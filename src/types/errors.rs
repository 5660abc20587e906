use serde::Serialize;
use thiserror::Error;

/// Failures raised while loading or serving a content package.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PackageError {
    #[error("Invalid or corrupt archive: {0}")]
    CorruptArchive(String),
    #[error("Archive exceeds configured limits: {0}")]
    ArchiveTooLarge(String),
    #[error("imsmanifest.xml not found")]
    ManifestMissing,
    #[error("Error parsing imsmanifest.xml: {0}")]
    ManifestInvalid(String),
    #[error("No SCOs found in package")]
    NoLaunchableUnits,
    #[error("SCO file not found: {0}")]
    UnitFileNotFound(String),
    #[error("Page not found: {0}")]
    PageNotFound(String),
    #[error("No package loaded")]
    NotLoaded,
}

pub type PackageResult<T> = Result<T, PackageError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Invalid package: {0}")]
    InvalidPackage(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PackageError> for CommandError {
    fn from(error: PackageError) -> Self {
        match error {
            PackageError::UnitFileNotFound(_)
            | PackageError::PageNotFound(_)
            | PackageError::NotLoaded => CommandError::NotFound(error.to_string()),
            other => CommandError::InvalidPackage(other.to_string()),
        }
    }
}

impl From<std::io::Error> for CommandError {
    fn from(error: std::io::Error) -> Self {
        CommandError::Io(error.to_string())
    }
}

impl Serialize for CommandError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

pub type CommandResult<T> = Result<T, CommandError>;
