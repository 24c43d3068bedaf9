use crate::error::Result;
use crate::models::Direction;
use crate::registry::TypeRegistry;
use crate::store::{load_chain, FileStore};
use std::path::Path;

/// Encrypt `input` with the stored chain `name` and write the result to `output`.
/// Returns the number of bytes written.
pub fn encrypt_file(name: &str, input: &Path, output: &Path, dir: &Path) -> Result<usize> {
    transform_file(name, input, output, dir, Direction::Encrypt)
}

/// Inverse of [`encrypt_file`]
pub fn decrypt_file(name: &str, input: &Path, output: &Path, dir: &Path) -> Result<usize> {
    transform_file(name, input, output, dir, Direction::Decrypt)
}

fn transform_file(
    name: &str,
    input: &Path,
    output: &Path,
    dir: &Path,
    direction: Direction,
) -> Result<usize> {
    let registry = TypeRegistry::with_builtin();
    let mut chain = load_chain(&FileStore::new(dir), &registry, name)?;
    let data = std::fs::read(input)?;

    let result = match direction {
        Direction::Encrypt => chain.encrypt(&data)?,
        Direction::Decrypt => chain.decrypt(&data)?,
    };

    std::fs::write(output, &result)?;
    Ok(result.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::new::{create_chain, NewOptions};
    use crate::error::ChainError;
    use tempfile::tempdir;

    #[test]
    fn test_file_roundtrip() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("plain.txt");
        let cipher = dir.path().join("plain.txt.enc");
        let output = dir.path().join("plain.out");

        let original = b"Hello, World!\nThis file goes through the whole chain.\n";
        std::fs::write(&input, original).unwrap();

        let options = NewOptions {
            dir: dir.path().join("saves"),
            seed: Some(99),
            ..Default::default()
        };
        create_chain("files", &options).unwrap();

        let written = encrypt_file("files", &input, &cipher, &options.dir).unwrap();
        assert_eq!(written, original.len());
        assert_ne!(std::fs::read(&cipher).unwrap(), original);

        decrypt_file("files", &cipher, &output, &options.dir).unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), original);
    }

    #[test]
    fn test_unknown_chain() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("plain.txt");
        std::fs::write(&input, b"data").unwrap();

        let result = encrypt_file("missing", &input, &dir.path().join("out"), dir.path());
        assert!(matches!(result, Err(ChainError::Storage(_))));
    }

    #[test]
    fn test_symbol_outside_scope() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("binary.bin");
        std::fs::write(&input, [0x00u8, 0x01, 0x02]).unwrap();

        let options = NewOptions {
            dir: dir.path().to_path_buf(),
            seed: Some(5),
            ..Default::default()
        };
        create_chain("printable", &options).unwrap();

        let result = encrypt_file("printable", &input, &dir.path().join("out"), dir.path());
        assert!(matches!(result, Err(ChainError::Scope { symbol: 0x00 })));
    }
}
