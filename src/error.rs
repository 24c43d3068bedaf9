use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Symbol {symbol:#04x} is not part of the alphabet scope")]
    Scope { symbol: u8 },

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Export failed: {0}")]
    Exporter(String),

    #[error("Import failed: {0}")]
    Importer(String),

    #[error("Not a cipher model: {0}")]
    Contract(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Unsupported setting: {0}")]
    UnsupportedSetting(String),
}

pub type Result<T> = std::result::Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_error_formats_symbol_as_hex() {
        let err = ChainError::Scope { symbol: 0x07 };
        assert_eq!(
            err.to_string(),
            "Symbol 0x07 is not part of the alphabet scope"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ChainError = io.into();
        assert!(matches!(err, ChainError::Io(_)));
    }
}
