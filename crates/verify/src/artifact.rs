//! Screenshot artifacts
//!
//! Scripts write PNGs straight into the output directory. After a run each
//! reported file is fingerprinted so the results file pins exactly which
//! image each scenario produced.

use image::GenericImageView;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::VerifyResult;
use crate::playwright::ArtifactKind;

/// A captured screenshot as found on disk after the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub path: PathBuf,
    pub kind: ArtifactKind,

    /// `false` when the script reported the file but it is not on disk
    pub present: bool,

    #[serde(default)]
    pub sha256: Option<String>,

    #[serde(default)]
    pub bytes: Option<u64>,

    /// Pixel dimensions, when the file decodes as an image
    #[serde(default)]
    pub dimensions: Option<(u32, u32)>,
}

/// Owner of the output directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create the output directory and pin it to an absolute path
    pub fn prepare(dir: &Path) -> VerifyResult<Self> {
        std::fs::create_dir_all(dir)?;
        let root = std::fs::canonicalize(dir)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fingerprint a reported artifact; missing or undecodable files are
    /// recorded, not fatal
    pub fn inspect(&self, path: &Path, kind: ArtifactKind) -> ArtifactRecord {
        let mut record = ArtifactRecord {
            path: path.to_path_buf(),
            kind,
            present: false,
            sha256: None,
            bytes: None,
            dimensions: None,
        };

        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                warn!("Artifact {} not readable: {}", path.display(), e);
                return record;
            }
        };

        record.present = true;
        record.bytes = Some(data.len() as u64);
        record.sha256 = Some(hex::encode(Sha256::digest(&data)));

        match image::load_from_memory_with_format(&data, image::ImageFormat::Png) {
            Ok(img) => record.dimensions = Some(img.dimensions()),
            Err(e) => warn!("Artifact {} is not a valid PNG: {}", path.display(), e),
        }

        record
    }

    /// Remove a stale failure screenshot from an earlier run
    pub fn clear_failure(&self, path: &Path) -> VerifyResult<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
