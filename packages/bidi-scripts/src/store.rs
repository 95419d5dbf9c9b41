//! Contract ID Store
//!
//! Deployed contract IDs are handed from one command to the next through two
//! plain text files, one ID per file.

use bidi_codec::EntityId;
use eyre::{eyre, Result, WrapErr};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Flat-file store for the token and NFT contract IDs
#[derive(Debug, Clone)]
pub struct ContractStore {
    token_file: PathBuf,
    nft_file: PathBuf,
}

impl ContractStore {
    pub fn new(token_file: impl Into<PathBuf>, nft_file: impl Into<PathBuf>) -> Self {
        Self {
            token_file: token_file.into(),
            nft_file: nft_file.into(),
        }
    }

    pub fn read_token_contract(&self) -> Result<EntityId> {
        read_id(&self.token_file, "BIDI token contract ID")
    }

    pub fn read_nft_contract(&self) -> Result<EntityId> {
        read_id(&self.nft_file, "NFT contract ID")
    }

    /// Whether an NFT contract has been deployed from this directory
    pub fn has_nft_contract(&self) -> bool {
        self.nft_file.exists()
    }

    pub fn write_token_contract(&self, id: &EntityId) -> Result<()> {
        write_id(&self.token_file, id)
    }

    pub fn write_nft_contract(&self, id: &EntityId) -> Result<()> {
        write_id(&self.nft_file, id)
    }

    /// An explicitly given NFT contract wins over the stored one
    pub fn resolve_nft_contract(&self, explicit: Option<EntityId>) -> Result<EntityId> {
        match explicit {
            Some(id) => {
                debug!(contract = %id, "Using contract ID from command line argument");
                Ok(id)
            }
            None => {
                let id = self.read_nft_contract().wrap_err(
                    "No contract ID provided. Please either provide it as an argument or deploy a collection first",
                )?;
                debug!(contract = %id, file = %self.nft_file.display(), "Using contract ID from file");
                Ok(id)
            }
        }
    }
}

fn read_id(path: &Path, what: &str) -> Result<EntityId> {
    if !path.exists() {
        return Err(eyre!(
            "{} not found. Please ensure {} exists.",
            what,
            path.display()
        ));
    }

    let contents = fs::read_to_string(path)
        .wrap_err_with(|| format!("Unable to read {} file {}", what, path.display()))?;

    contents
        .trim()
        .parse::<EntityId>()
        .wrap_err_with(|| format!("{} file {} is corrupt", what, path.display()))
}

fn write_id(path: &Path, id: &EntityId) -> Result<()> {
    fs::write(path, id.to_string())
        .wrap_err_with(|| format!("Failed to write contract ID to {}", path.display()))?;
    debug!(contract = %id, file = %path.display(), "Contract ID saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ContractStore {
        ContractStore::new(
            dir.path().join("token-contract-id.txt"),
            dir.path().join("nft-contract-id.txt"),
        )
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.write_token_contract(&EntityId::from_num(5001)).unwrap();
        assert_eq!(store.read_token_contract().unwrap(), EntityId::from_num(5001));
        assert!(!store.has_nft_contract());
    }

    #[test]
    fn test_read_trims_whitespace() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        fs::write(dir.path().join("nft-contract-id.txt"), "  0.0.777\n").unwrap();
        assert!(store.has_nft_contract());
        assert_eq!(store.read_nft_contract().unwrap(), EntityId::from_num(777));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = store_in(&dir).read_token_contract().unwrap_err();
        assert!(err.to_string().contains("BIDI token contract ID not found"));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("token-contract-id.txt"), "not an id").unwrap();
        assert!(store_in(&dir).read_token_contract().is_err());
    }

    #[test]
    fn test_resolve_prefers_explicit() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.write_nft_contract(&EntityId::from_num(1)).unwrap();

        assert_eq!(
            store.resolve_nft_contract(Some(EntityId::from_num(2))).unwrap(),
            EntityId::from_num(2)
        );
        assert_eq!(store.resolve_nft_contract(None).unwrap(), EntityId::from_num(1));
    }

    #[test]
    fn test_resolve_without_any_source() {
        let dir = TempDir::new().unwrap();
        let err = store_in(&dir).resolve_nft_contract(None).unwrap_err();
        assert!(err.to_string().contains("No contract ID provided"));
    }
}
