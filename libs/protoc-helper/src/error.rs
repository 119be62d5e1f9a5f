//! Error types for packaging and provider registration.

use std::path::PathBuf;

/// Errors raised while resolving versions or composing a package descriptor.
///
/// Every variant is fatal for the build: there is no fallback version and no
/// partial descriptor.
#[derive(Debug, thiserror::Error)]
pub enum PackagingError {
    #[error("required file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("VERSION file {} is empty", path.display())]
    EmptyVersion { path: PathBuf },

    #[error("invalid version '{value}': {source}")]
    InvalidVersion {
        value: String,
        #[source]
        source: semver::Error,
    },

    #[error("invalid namespace '{value}': {reason}")]
    InvalidNamespace { value: String, reason: String },

    #[error("invalid requirement '{requirement}' for '{name}': {source}")]
    InvalidRequirement {
        name: String,
        requirement: String,
        #[source]
        source: semver::Error,
    },

    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("invalid package configuration: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("failed to serialize package descriptor: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("required build environment variable '{0}' is not set")]
    MissingEnv(&'static str),

    #[error("build command '{command}' failed: {message}")]
    Command { command: String, message: String },
}

impl PackagingError {
    /// Map an I/O error on `path`, keeping "not found" as its own variant.
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Returns `true` for the missing-required-file class of failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. })
    }
}

impl From<figment::Error> for PackagingError {
    fn from(e: figment::Error) -> Self {
        Self::Config(Box::new(e))
    }
}

/// Errors raised when validating the static proto-provider table.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("provider '{entry}' must register itself, but points to '{target}'")]
    NotSelfRegistered { entry: String, target: String },

    #[error("proto provider '{namespace}' is registered more than once")]
    Duplicate { namespace: String },

    #[error("proto provider '{namespace}' is invalid: {source}")]
    Invalid {
        namespace: String,
        #[source]
        source: PackagingError,
    },
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn not_found_io_maps_to_file_not_found() {
        let err = PackagingError::from_io("VERSION", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "required file not found: VERSION");
    }

    #[test]
    fn other_io_errors_keep_source() {
        let err = PackagingError::from_io(
            "README.md",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(!err.is_not_found());
        assert!(matches!(err, PackagingError::Io { .. }));
        assert!(err.to_string().starts_with("failed to read README.md"));
    }
}
