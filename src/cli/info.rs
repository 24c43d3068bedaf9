use crate::error::Result;
use crate::registry::TypeRegistry;
use crate::store::{ChainDocument, FileStore, Store};
use std::path::Path;

/// Display information about a stored chain
pub fn show_info(name: &str, dir: &Path) -> Result<String> {
    let store = FileStore::new(dir);
    let document = ChainDocument::from_json(&store.read(name)?)?;
    let chain = document.to_chain(&TypeRegistry::with_builtin())?;

    let mut output = String::new();
    output.push_str(&format!("File: {}\n", store.path_for(name).display()));
    output.push_str(&format!("Exported: {} (unix seconds)\n\n", document.date));
    output.push_str(&chain.describe());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::new::{create_chain, NewOptions};
    use tempfile::tempdir;

    #[test]
    fn test_info_describes_chain() {
        let dir = tempdir().unwrap();
        let options = NewOptions {
            dir: dir.path().to_path_buf(),
            rotors: 2,
            seed: Some(3),
            ..Default::default()
        };
        create_chain("described", &options).unwrap();

        let info = show_info("described", dir.path()).unwrap();
        assert!(info.contains("described.json"));
        assert!(info.contains("Cipher chain with 3 models"));
        assert!(info.contains("2 rotors"));
        assert!(info.contains("model.shift"));
    }
}
