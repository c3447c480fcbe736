//! Compiled contract artifacts and library linking.
//!
//! Creation bytecode is read at runtime from a directory of compiler
//! artifacts. Both the flat Hardhat layout (`<dir>/<Name>.json` with a hex
//! `bytecode` string) and the Foundry layout (`<dir>/<Name>.sol/<Name>.json`
//! with `bytecode.object`) are understood.

use std::{
    collections::HashMap,
    path::{Path, PathBuf}
};

use alloy::primitives::{Address, Bytes, hex};
use serde::Deserialize;
use tracing::{debug, info};

/// Placeholder the compiler leaves in `NonfungibleTokenPositionDescriptor`
/// for the address of the `NFTDescriptor` library.
pub const NFT_DESCRIPTOR_LIB_PLACEHOLDER: &str = "__$cea9be979eee3d87fb124d6cbb244bb0b5$__";

/// Every artifact the suite and the token deployments may ask for.
pub const CONTRACT_NAMES: [&str; 14] = [
    "WETH9",
    "UniswapV3Factory",
    "UniswapInterfaceMulticall",
    "ProxyAdmin",
    "TickLens",
    "NFTDescriptor",
    "NonfungibleTokenPositionDescriptor",
    "TransparentUpgradeableProxy",
    "NonfungiblePositionManager",
    "V3Migrator",
    "UniswapV3Staker",
    "QuoterV2",
    "SwapRouter02",
    "Swapper"
];

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact directory {0} does not exist")]
    MissingDirectory(PathBuf),
    #[error("no bytecode loaded for contract {0}")]
    Missing(String),
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error
    },
    #[error("failed to parse artifact {path}: {source}")]
    Json {
        path:   PathBuf,
        #[source]
        source: serde_json::Error
    },
    #[error("bytecode of {name} is not valid hex: {source}")]
    InvalidHex {
        name:   String,
        #[source]
        source: hex::FromHexError
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("library placeholder {placeholder} not found in bytecode")]
    PlaceholderNotFound { placeholder: String },
    #[error("linked bytecode is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError)
}

/// Hex encoded creation bytecode, possibly still containing unlinked
/// library placeholders. Stored without a `0x` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bytecode {
    name: String,
    hex:  String
}

impl Bytecode {
    pub fn new(name: impl Into<String>, hex: impl AsRef<str>) -> Self {
        let hex = hex.as_ref();
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        Self { name: name.into(), hex: hex.to_string() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_hex(&self) -> &str {
        &self.hex
    }

    /// Decodes the bytecode. Fails if it still contains placeholders.
    pub fn to_bytes(&self) -> Result<Bytes, ArtifactError> {
        hex::decode(&self.hex)
            .map(Into::into)
            .map_err(|source| ArtifactError::InvalidHex { name: self.name.clone(), source })
    }

    pub fn link(&self, placeholder: &str, library: Address) -> Result<Bytes, LinkError> {
        link_library(&self.hex, placeholder, library)
    }
}

/// Substitutes every occurrence of `placeholder` in `template` with the
/// lowercase hex of `library` and decodes the result.
pub fn link_library(template: &str, placeholder: &str, library: Address) -> Result<Bytes, LinkError> {
    let linked = template.replace(placeholder, &hex::encode(library.as_slice()));
    if linked == template {
        return Err(LinkError::PlaceholderNotFound { placeholder: placeholder.to_string() })
    }

    Ok(hex::decode(&linked)?.into())
}

#[derive(Debug, Deserialize)]
struct ArtifactFile {
    bytecode: ArtifactBytecode
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ArtifactBytecode {
    Hex(String),
    Object { object: String }
}

impl ArtifactBytecode {
    fn into_hex(self) -> String {
        match self {
            Self::Hex(hex) => hex,
            Self::Object { object } => object
        }
    }
}

/// Creation bytecode keyed by contract name.
#[derive(Debug, Clone, Default)]
pub struct Artifacts {
    bytecodes: HashMap<String, Bytecode>
}

impl Artifacts {
    /// Loads every artifact of [`CONTRACT_NAMES`] found in `dir`. Missing
    /// files are skipped so that runs binding to known addresses need no
    /// artifacts at all; asking for one later fails with
    /// [`ArtifactError::Missing`].
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ArtifactError::MissingDirectory(dir.to_path_buf()))
        }

        let mut artifacts = Self::default();
        for name in CONTRACT_NAMES {
            let Some(path) = artifact_path(dir, name) else {
                debug!(name, dir = %dir.display(), "no artifact found");
                continue
            };

            let contents = std::fs::read_to_string(&path)
                .map_err(|source| ArtifactError::Io { path: path.clone(), source })?;
            let file: ArtifactFile = serde_json::from_str(&contents)
                .map_err(|source| ArtifactError::Json { path: path.clone(), source })?;

            artifacts.insert(Bytecode::new(name, file.bytecode.into_hex()));
        }

        info!(dir = %dir.display(), loaded = artifacts.bytecodes.len(), "loaded contract artifacts");
        Ok(artifacts)
    }

    pub fn insert(&mut self, bytecode: Bytecode) {
        self.bytecodes.insert(bytecode.name.clone(), bytecode);
    }

    pub fn bytecode(&self, name: &str) -> Result<&Bytecode, ArtifactError> {
        self.bytecodes
            .get(name)
            .ok_or_else(|| ArtifactError::Missing(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.bytecodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytecodes.is_empty()
    }
}

fn artifact_path(dir: &Path, name: &str) -> Option<PathBuf> {
    [dir.join(format!("{name}.json")), dir.join(format!("{name}.sol")).join(format!("{name}.json"))]
        .into_iter()
        .find(|path| path.is_file())
}
