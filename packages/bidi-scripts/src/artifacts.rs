//! Compiled contract artifacts
//!
//! Hardhat writes one JSON file per contract under
//! `{artifacts_dir}/contracts/{Name}.sol/{Name}.json`; only its `bytecode`
//! field is needed for deployment.

use eyre::{eyre, Result, WrapErr};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Contract names as compiled by hardhat
pub const HELLO_WORLD: &str = "HelloWorld";
pub const TOKEN: &str = "CreateToken";
pub const COLLECTION: &str = "DeployCollection";

#[derive(Debug, Deserialize)]
pub struct Artifact {
    #[serde(rename = "contractName", default)]
    pub contract_name: Option<String>,
    pub bytecode: String,
}

impl Artifact {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Artifact not found at: {}", path.display()))?;
        let artifact: Artifact = serde_json::from_str(&content)
            .wrap_err_with(|| format!("Malformed artifact: {}", path.display()))?;

        if artifact.bytecode.is_empty() || artifact.bytecode == "0x" {
            return Err(eyre!("Artifact {} has no bytecode", path.display()));
        }
        Ok(artifact)
    }
}

pub fn artifact_path(artifacts_dir: &Path, name: &str) -> PathBuf {
    artifacts_dir
        .join("contracts")
        .join(format!("{}.sol", name))
        .join(format!("{}.json", name))
}

/// Hex bytecode of a compiled contract, as uploaded to the file service
pub fn load_bytecode(artifacts_dir: &Path, name: &str) -> Result<String> {
    Ok(Artifact::from_file(&artifact_path(artifacts_dir, name))?.bytecode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_artifact(dir: &Path, name: &str, body: &str) {
        let path = artifact_path(dir, name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    #[test]
    fn test_load_bytecode() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(
            dir.path(),
            TOKEN,
            r#"{"contractName":"CreateToken","abi":[],"bytecode":"0x6080604052"}"#,
        );

        assert_eq!(load_bytecode(dir.path(), TOKEN).unwrap(), "0x6080604052");
    }

    #[test]
    fn test_artifact_path_layout() {
        let path = artifact_path(Path::new("artifacts"), HELLO_WORLD);
        assert_eq!(
            path,
            Path::new("artifacts/contracts/HelloWorld.sol/HelloWorld.json")
        );
    }

    #[test]
    fn test_missing_or_empty_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_bytecode(dir.path(), COLLECTION).unwrap_err();
        assert!(err.to_string().contains("Artifact not found"));

        write_artifact(dir.path(), COLLECTION, r#"{"bytecode":"0x"}"#);
        assert!(load_bytecode(dir.path(), COLLECTION).is_err());
    }
}
