use std::fmt;
use std::path::PathBuf;

/// Which attribute array an index was resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Position,
    TexCoord,
    Normal,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeKind::Position => "position",
            AttributeKind::TexCoord => "texture coordinate",
            AttributeKind::Normal => "normal",
        };
        f.write_str(name)
    }
}

/// Errors that abort an OBJ load. Line numbers are 1-based.
#[derive(Debug, thiserror::Error)]
pub enum ObjError {
    #[error("I/O error reading '{}': {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: expected more numeric components")]
    MalformedNumber { line: usize },

    #[error("line {line}: malformed face index")]
    MalformedIndex { line: usize },

    #[error("line {line}: face has fewer than 3 corners")]
    FaceTooSmall { line: usize },

    #[error("line {line}: face has more than {limit} corners")]
    FaceTooLarge { line: usize, limit: usize },

    #[error("{kind} index {index} out of range (only {bound} declared)")]
    IndexOutOfRange {
        kind: AttributeKind,
        index: i64,
        bound: usize,
    },

    #[error("mesh has {count} vertices, more than 32-bit indices can address")]
    TooManyVertices { count: usize },

    #[error("failed to grow geometry buffer")]
    Allocation,
}

impl From<std::collections::TryReserveError> for ObjError {
    fn from(_: std::collections::TryReserveError) -> Self {
        ObjError::Allocation
    }
}
