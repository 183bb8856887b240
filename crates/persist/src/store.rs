//! File-backed persistence of the depletion overlay.
//!
//! Layout inside the store directory:
//! ```text
//! changes.meta.json            - schema/generator versions and world seed
//! saves/
//!   000001.changes.cbor.zst    - CBOR+zstd compressed overlay saves
//! integrity/
//!   manifest.json              - hash chain manifest
//! ```

use crate::tracker::WorldChanges;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use voidspace_kernel::{GENERATOR_VERSION, WorldSeed};

/// Current on-disk schema version.
const CHANGES_SCHEMA_VERSION: u32 = 1;

/// Errors from file-backed persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CBOR serialization error: {0}")]
    CborEncode(String),
    #[error("CBOR deserialization error: {0}")]
    CborDecode(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("generator version mismatch: store written by v{file_version}, running v{expected_version}")]
    GeneratorMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("store belongs to world seed {file_seed}, opened with {expected_seed}")]
    SeedMismatch {
        file_seed: WorldSeed,
        expected_seed: WorldSeed,
    },
    #[error("no saves found")]
    NoSaves,
}

/// Metadata stored in changes.meta.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMeta {
    pub schema_version: u32,
    /// Entity ids only mean something under the generator that produced them.
    pub generator_version: u32,
    pub seed: WorldSeed,
    pub save_count: u32,
}

/// A single entry in the integrity manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub filename: String,
    pub sha256: String,
    pub prev_hash: Option<String>,
}

/// Integrity manifest tracking all save hashes in a chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrityManifest {
    pub entries: Vec<ManifestEntry>,
}

/// File-backed overlay store with schema versioning and integrity checking.
pub struct ChangeStore {
    root: PathBuf,
    meta: StoreMeta,
    manifest: IntegrityManifest,
}

impl ChangeStore {
    /// Open or create a store for the world with the given seed.
    pub fn open(path: impl AsRef<Path>, seed: WorldSeed) -> Result<Self, StoreError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(root.join("saves"))?;
        std::fs::create_dir_all(root.join("integrity"))?;

        let meta_path = root.join("changes.meta.json");
        let manifest_path = root.join("integrity").join("manifest.json");

        let (meta, manifest) = if meta_path.exists() {
            let meta: StoreMeta = serde_json::from_reader(std::fs::File::open(&meta_path)?)?;
            if meta.schema_version != CHANGES_SCHEMA_VERSION {
                return Err(StoreError::SchemaMismatch {
                    file_version: meta.schema_version,
                    expected_version: CHANGES_SCHEMA_VERSION,
                });
            }
            if meta.generator_version != GENERATOR_VERSION {
                return Err(StoreError::GeneratorMismatch {
                    file_version: meta.generator_version,
                    expected_version: GENERATOR_VERSION,
                });
            }
            if meta.seed != seed {
                return Err(StoreError::SeedMismatch {
                    file_seed: meta.seed,
                    expected_seed: seed,
                });
            }
            let manifest: IntegrityManifest = if manifest_path.exists() {
                serde_json::from_reader(std::fs::File::open(&manifest_path)?)?
            } else {
                IntegrityManifest::default()
            };
            (meta, manifest)
        } else {
            let meta = StoreMeta {
                schema_version: CHANGES_SCHEMA_VERSION,
                generator_version: GENERATOR_VERSION,
                seed,
                save_count: 0,
            };
            let manifest = IntegrityManifest::default();
            serde_json::to_writer_pretty(std::fs::File::create(&meta_path)?, &meta)?;
            serde_json::to_writer_pretty(std::fs::File::create(&manifest_path)?, &manifest)?;
            (meta, manifest)
        };

        Ok(Self {
            root,
            meta,
            manifest,
        })
    }

    /// Write the overlay as a new save. Pending events are not persisted.
    pub fn save(&mut self, changes: &WorldChanges) -> Result<(), StoreError> {
        self.meta.save_count += 1;
        let filename = save_filename(self.meta.save_count);
        let path = self.root.join("saves").join(&filename);

        let cbor_bytes = cbor_serialize(changes)?;
        let compressed = zstd_compress(&cbor_bytes)?;

        let hash = sha256_hex(&compressed);
        let prev_hash = self.manifest.entries.last().map(|e| e.sha256.clone());

        std::fs::write(&path, &compressed)?;

        self.manifest.entries.push(ManifestEntry {
            filename,
            sha256: hash,
            prev_hash,
        });

        self.save_meta()?;
        self.save_manifest()?;
        tracing::debug!(
            save = self.meta.save_count,
            depleted = changes.len(),
            "saved world changes"
        );
        Ok(())
    }

    /// Load the most recent save.
    pub fn load_latest(&self) -> Result<WorldChanges, StoreError> {
        if self.meta.save_count == 0 {
            return Err(StoreError::NoSaves);
        }
        let filename = save_filename(self.meta.save_count);
        let compressed = std::fs::read(self.root.join("saves").join(&filename))?;
        self.verify_file_hash(&filename, &compressed)?;

        let cbor_bytes = zstd_decompress(&compressed)?;
        cbor_deserialize(&cbor_bytes)
    }

    /// Verify all integrity hashes in the manifest.
    pub fn verify_integrity(&self) -> Result<(), StoreError> {
        let mut prev_hash: Option<String> = None;
        for entry in &self.manifest.entries {
            if entry.prev_hash != prev_hash {
                return Err(StoreError::IntegrityMismatch {
                    expected: prev_hash.unwrap_or_else(|| "None".into()),
                    actual: entry.prev_hash.clone().unwrap_or_else(|| "None".into()),
                });
            }

            let data = std::fs::read(self.root.join("saves").join(&entry.filename))?;
            let actual_hash = sha256_hex(&data);
            if actual_hash != entry.sha256 {
                return Err(StoreError::IntegrityMismatch {
                    expected: entry.sha256.clone(),
                    actual: actual_hash,
                });
            }

            prev_hash = Some(entry.sha256.clone());
        }
        Ok(())
    }

    /// Get the path to the store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the metadata.
    pub fn meta(&self) -> &StoreMeta {
        &self.meta
    }

    fn verify_file_hash(&self, filename: &str, data: &[u8]) -> Result<(), StoreError> {
        let actual = sha256_hex(data);
        match self.manifest.entries.iter().find(|e| e.filename == filename) {
            Some(entry) if entry.sha256 != actual => Err(StoreError::IntegrityMismatch {
                expected: entry.sha256.clone(),
                actual,
            }),
            Some(_) => Ok(()),
            None => Err(StoreError::IntegrityMismatch {
                expected: format!("manifest entry for {filename}"),
                actual: "none".into(),
            }),
        }
    }

    fn save_meta(&self) -> Result<(), StoreError> {
        let path = self.root.join("changes.meta.json");
        serde_json::to_writer_pretty(std::fs::File::create(path)?, &self.meta)?;
        Ok(())
    }

    fn save_manifest(&self) -> Result<(), StoreError> {
        let path = self.root.join("integrity").join("manifest.json");
        serde_json::to_writer_pretty(std::fs::File::create(path)?, &self.manifest)?;
        Ok(())
    }
}

fn save_filename(index: u32) -> String {
    format!("{index:06}.changes.cbor.zst")
}

fn cbor_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| StoreError::CborEncode(e.to_string()))?;
    Ok(buf)
}

fn cbor_deserialize<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, StoreError> {
    ciborium::from_reader(data).map_err(|e| StoreError::CborDecode(e.to_string()))
}

fn zstd_compress(data: &[u8]) -> Result<Vec<u8>, StoreError> {
    let mut encoder = zstd::Encoder::new(Vec::new(), 3)?;
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn zstd_decompress(data: &[u8]) -> Result<Vec<u8>, StoreError> {
    let mut decoder = zstd::Decoder::new(data)?;
    let mut buf = Vec::new();
    decoder.read_to_end(&mut buf)?;
    Ok(buf)
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
