//! Compiled contract artifacts.
//!
//! Both the Hardhat layout (`artifacts/contracts/X.sol/X.json`, bytecode as a hex
//! string) and the Foundry layout (`out/X.sol/X.json`, bytecode under `object`) are
//! accepted.

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_json_abi::JsonAbi;
use alloy_primitives::Bytes;
use serde::Deserialize;

use crate::{DeployError, Result};

/// A compiled contract ready to be deployed.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    /// Contract name.
    pub contract_name: String,
    /// Contract ABI.
    pub abi: JsonAbi,
    /// Creation bytecode without constructor arguments.
    pub bytecode: Bytes,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    contract_name: Option<String>,
    abi: JsonAbi,
    bytecode: RawBytecode,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hex(Bytes),
    Object { object: Bytes },
}

impl ContractArtifact {
    /// Parses an artifact file, falling back to `contract` when the file has no name.
    pub fn from_file(path: &Path, contract: &str) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| DeployError::io(path, e))?;
        let raw: RawArtifact =
            serde_json::from_str(&contents).map_err(|e| DeployError::json(path, e))?;

        let bytecode = match raw.bytecode {
            RawBytecode::Hex(bytes) | RawBytecode::Object { object: bytes } => bytes,
        };

        Ok(Self {
            contract_name: raw.contract_name.unwrap_or_else(|| contract.to_string()),
            abi: raw.abi,
            bytecode,
        })
    }

    /// Returns the creation bytecode followed by the ABI-encoded constructor arguments.
    pub fn deploy_code(&self, args: &[DynSolValue]) -> Result<Bytes> {
        if self.bytecode.is_empty() {
            return Err(DeployError::EmptyBytecode(self.contract_name.clone()));
        }

        let mut code = self.bytecode.to_vec();
        match self.abi.constructor() {
            Some(constructor) => code.extend(constructor.abi_encode_input(args)?),
            None if args.is_empty() => {}
            None => {
                return Err(DeployError::ConstructorArgs {
                    contract: self.contract_name.clone(),
                    got: args.len(),
                });
            }
        }
        Ok(code.into())
    }
}

/// Looks up artifacts below a root directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Creates a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads the artifact for `contract`.
    pub fn load(&self, contract: &str) -> Result<ContractArtifact> {
        let path = self.find(contract)?;
        tracing::trace!(target: "deploy", contract, path = %path.display(), "Loading artifact");
        ContractArtifact::from_file(&path, contract)
    }

    /// Finds `<contract>.json` below the root, visiting entries in name order.
    pub fn find(&self, contract: &str) -> Result<PathBuf> {
        let file_name = format!("{contract}.json");
        find_file(&self.root, &file_name)?.ok_or_else(|| DeployError::ArtifactNotFound {
            contract: contract.to_string(),
            dir: self.root.clone(),
        })
    }
}

fn find_file(dir: &Path, file_name: &str) -> Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut entries = fs::read_dir(dir)
        .map_err(|e| DeployError::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| DeployError::io(dir, e))?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            if path.file_name().is_some_and(|name| name == "build-info") {
                continue;
            }
            if let Some(found) = find_file(&path, file_name)? {
                return Ok(Some(found));
            }
        } else if path.file_name().is_some_and(|name| name == file_name) {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{U256, bytes};
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    const MOCK_USDC_ABI: &str = r#"[
        {
            "type": "constructor",
            "stateMutability": "nonpayable",
            "inputs": [
                { "name": "name", "type": "string", "internalType": "string" },
                { "name": "symbol", "type": "string", "internalType": "string" },
                { "name": "initialSupply", "type": "uint256", "internalType": "uint256" }
            ]
        }
    ]"#;

    fn write(dir: &Path, relative: &str, value: serde_json::Value) -> PathBuf {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
        path
    }

    fn mock_usdc_args() -> Vec<DynSolValue> {
        vec![
            DynSolValue::String("Mock USDC".into()),
            DynSolValue::String("mUSDC".into()),
            DynSolValue::Uint(U256::from(1_000_000u64), 256),
        ]
    }

    #[test]
    fn loads_hardhat_artifact() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "contracts/ArtworkImpl.sol/ArtworkImpl.json",
            json!({ "contractName": "ArtworkImpl", "abi": [], "bytecode": "0x6080604052" }),
        );

        let artifact = ArtifactStore::new(dir.path()).load("ArtworkImpl").unwrap();
        assert_eq!(artifact.contract_name, "ArtworkImpl");
        assert_eq!(artifact.bytecode, bytes!("6080604052"));
        assert!(artifact.abi.constructor().is_none());
    }

    #[test]
    fn loads_foundry_artifact() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "MockUSDC.sol/MockUSDC.json",
            json!({
                "abi": serde_json::from_str::<serde_json::Value>(MOCK_USDC_ABI).unwrap(),
                "bytecode": { "object": "0x60806040", "linkReferences": {} }
            }),
        );

        let artifact = ArtifactStore::new(dir.path()).load("MockUSDC").unwrap();
        assert_eq!(artifact.contract_name, "MockUSDC");
        assert_eq!(artifact.bytecode, bytes!("60806040"));
        assert_eq!(artifact.abi.constructor().unwrap().inputs.len(), 3);
    }

    #[test]
    fn skips_debug_and_build_info_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "build-info/ArtworkImpl.json", json!({ "id": "abc" }));
        write(dir.path(), "contracts/ArtworkImpl.sol/ArtworkImpl.dbg.json", json!({}));
        let expected = write(
            dir.path(),
            "contracts/ArtworkImpl.sol/ArtworkImpl.json",
            json!({ "abi": [], "bytecode": "0x00" }),
        );

        assert_eq!(ArtifactStore::new(dir.path()).find("ArtworkImpl").unwrap(), expected);
    }

    #[test]
    fn missing_artifact_is_an_error() {
        let dir = TempDir::new().unwrap();

        let err = ArtifactStore::new(dir.path()).load("ArtworkImpl").unwrap_err();
        assert!(matches!(
            err,
            DeployError::ArtifactNotFound { contract, .. } if contract == "ArtworkImpl"
        ));
    }

    #[test]
    fn deploy_code_appends_constructor_args() {
        let artifact = ContractArtifact {
            contract_name: "MockUSDC".into(),
            abi: serde_json::from_str(MOCK_USDC_ABI).unwrap(),
            bytecode: bytes!("60806040"),
        };
        let args = mock_usdc_args();

        let code = artifact.deploy_code(&args).unwrap();

        let encoded = DynSolValue::Tuple(args).abi_encode_params();
        assert_eq!(&code[..4], &[0x60, 0x80, 0x60, 0x40]);
        assert_eq!(&code[4..], encoded.as_slice());
    }

    #[test]
    fn deploy_code_without_constructor() {
        let artifact = ContractArtifact {
            contract_name: "ArtworkImpl".into(),
            abi: JsonAbi::default(),
            bytecode: bytes!("6080"),
        };

        assert_eq!(artifact.deploy_code(&[]).unwrap(), bytes!("6080"));

        let err = artifact.deploy_code(&mock_usdc_args()).unwrap_err();
        assert!(matches!(err, DeployError::ConstructorArgs { got: 3, .. }));
    }

    #[test]
    fn deploy_code_rejects_wrong_arity() {
        let artifact = ContractArtifact {
            contract_name: "MockUSDC".into(),
            abi: serde_json::from_str(MOCK_USDC_ABI).unwrap(),
            bytecode: bytes!("6080"),
        };

        let err = artifact.deploy_code(&[DynSolValue::String("Mock USDC".into())]).unwrap_err();
        assert!(matches!(err, DeployError::AbiEncode(_)));
    }

    #[test]
    fn empty_bytecode_is_rejected() {
        let artifact = ContractArtifact {
            contract_name: "IArtwork".into(),
            abi: JsonAbi::default(),
            bytecode: Bytes::new(),
        };

        assert!(matches!(artifact.deploy_code(&[]), Err(DeployError::EmptyBytecode(_))));
    }
}
