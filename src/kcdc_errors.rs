use thiserror::Error;

#[derive(Error, Debug)]
pub enum KcdcError {
    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unable to open {path}: {source}")]
    OpenFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("NaN encountered in a site or reference coordinate")]
    NanCoordinate(#[from] ordered_float::FloatIsNan),

    #[error("Invalid run parameter: {0}")]
    InvalidParameter(String),

    #[error("Malformed record at line {line}: field {field} = {value:?}")]
    InvalidRecord {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("Record at line {line} has {found} fields, expected {expected}")]
    ShortRecord {
        line: u64,
        found: usize,
        expected: usize,
    },

    #[error("Input file is empty (no header line): {0}")]
    MissingHeader(String),

    #[error("JSON (de)serialization failed: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl PartialEq for KcdcError {
    fn eq(&self, other: &Self) -> bool {
        use KcdcError::*;
        match (self, other) {
            // I/O and serde errors carry no comparable payload: same variant is enough
            (IoError(_), IoError(_)) => true,
            (JsonError(_), JsonError(_)) => true,
            (OpenFile { path: a, .. }, OpenFile { path: b, .. }) => a == b,

            (NanCoordinate(_), NanCoordinate(_)) => true,
            (InvalidParameter(a), InvalidParameter(b)) => a == b,
            (
                InvalidRecord {
                    line: l1,
                    field: f1,
                    value: v1,
                },
                InvalidRecord {
                    line: l2,
                    field: f2,
                    value: v2,
                },
            ) => l1 == l2 && f1 == f2 && v1 == v2,
            (
                ShortRecord {
                    line: l1,
                    found: f1,
                    expected: e1,
                },
                ShortRecord {
                    line: l2,
                    found: f2,
                    expected: e2,
                },
            ) => l1 == l2 && f1 == f2 && e1 == e2,
            (MissingHeader(a), MissingHeader(b)) => a == b,

            _ => false,
        }
    }
}
