//! Error types for the CMDL codec.

use thiserror::Error;

/// Main error type for CMDL decode/encode operations.
///
/// Every error is structural: nothing here is transient, so callers never retry.
#[derive(Error, Debug)]
pub enum Error {
    /// The leading 4-byte constant is not `0xDEADBABE`.
    #[error("Invalid CMDL file: expected magic 0xDEADBABE, found {found:#010X}")]
    MagicMismatch { found: u32 },

    /// A variant selector or tagged value has no supported encoding.
    #[error("Unsupported variant for {field}: {detail}")]
    UnsupportedVariant { field: &'static str, detail: String },

    /// A context lookup walked every scope without finding the field.
    #[error("Field not found in context: {0}")]
    FieldNotFound(&'static str),

    /// Section table and section stream disagree about slot count or order.
    #[error("Section length table out of sync: {0}")]
    LengthTableDesync(String),

    /// A stored count/length field disagrees with the value derived from the data.
    #[error("Stale computed field {field}: stored {stored}, derived {derived}")]
    StaleComputedField {
        field: &'static str,
        stored: u64,
        derived: u64,
    },

    /// Input ended before a read could complete.
    #[error("Unexpected end of data at offset {offset:#x} (needed {needed} bytes)")]
    UnexpectedEof { offset: usize, needed: usize },

    /// A framed section was not fully consumed by its schema.
    #[error("Section has {remaining} trailing bytes after offset {offset:#x}")]
    TrailingBytes { offset: usize, remaining: usize },

    /// An array's length does not match the count that governs it.
    #[error("Count mismatch: expected {expected} elements, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    /// An optional value is present (or missing) against what its predicate says.
    #[error("Presence mismatch: predicate says present={expected}, value present={actual}")]
    PresenceMismatch { expected: bool, actual: bool },

    /// A surface references a material outside material set 0.
    #[error("Material index {index} out of bounds (count: {count})")]
    MaterialIndex { index: u32, count: usize },

    /// Alignment padding holds a non-zero byte and would not survive re-encoding.
    #[error("Non-zero padding byte {value:#04x} at offset {offset:#x}")]
    NonZeroPadding { offset: usize, value: u8 },

    /// A value does not fit the width selected for it.
    #[error("Value {value} does not fit in {width} byte(s)")]
    ValueOutOfRange { value: u64, width: usize },

    /// Target game selector disagrees with the document version.
    #[error("Version mismatch: {game} expects model version {expected}, document has {found}")]
    VersionMismatch {
        game: &'static str,
        expected: u32,
        found: u32,
    },

    /// Error raised inside a composite, tagged with the composite chain.
    #[error("{path}: {source}")]
    Field {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Attach a field path unless one is already attached.
    ///
    /// The innermost composite wins, so an error keeps the most precise path.
    pub fn at(self, path: impl FnOnce() -> String) -> Self {
        match self {
            Self::Field { .. } => self,
            other => Self::Field {
                path: path(),
                source: Box::new(other),
            },
        }
    }

    /// Field path this error was raised under, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Field { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The underlying error with any path wrapper removed.
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type alias for CMDL operations.
pub type Result<T> = std::result::Result<T, Error>;
