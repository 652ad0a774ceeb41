//! File-backed implementation of `LedgerStore`.
//!
//! Entries are persisted as JSON lines in an append-only file. On open the
//! file is replayed to rebuild the in-memory chain and index; appends write,
//! flush, and sync the new line *before* the in-memory tip advances, so a
//! failed write leaves the store exactly as it was (`StoreUnavailable`, safe
//! to retry).
//!
//! The file is trusted only as far as `verify_chain` confirms it: tampering
//! with any persisted byte surfaces as `ChainIntegrity` on the next audit.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use medledger_contracts::{
    AuditEntry, CandidateEntry, EntryFilter, LedgerError, LedgerResult,
};
use medledger_core::traits::LedgerStore;

use crate::chain::broken_sequences;
use crate::state::ChainState;

#[derive(Debug)]
struct FileState {
    chain: ChainState,
    file: File,
}

/// A durable, append-only audit ledger persisted as JSON lines.
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    state: Mutex<FileState>,
}

impl FileLedger {
    /// Open (or create) the ledger file at `path` and replay it.
    ///
    /// Returns `StoreUnavailable` when the file cannot be opened or a line
    /// cannot be decoded — an undecodable ledger must never be silently
    /// truncated or repaired.
    pub fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| LedgerError::StoreUnavailable {
                    reason: format!("cannot create ledger directory '{}': {e}", parent.display()),
                })?;
            }
        }

        let mut chain = ChainState::new();
        if path.exists() {
            let reader =
                BufReader::new(File::open(&path).map_err(|e| LedgerError::StoreUnavailable {
                    reason: format!("cannot open ledger file '{}': {e}", path.display()),
                })?);
            for (line_no, line) in reader.lines().enumerate() {
                let line = line.map_err(|e| LedgerError::StoreUnavailable {
                    reason: format!("cannot read ledger file '{}': {e}", path.display()),
                })?;
                if line.trim().is_empty() {
                    continue;
                }
                let entry: AuditEntry =
                    serde_json::from_str(&line).map_err(|e| LedgerError::StoreUnavailable {
                        reason: format!(
                            "undecodable entry at line {} of '{}': {e}",
                            line_no + 1,
                            path.display()
                        ),
                    })?;
                chain.push(entry);
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LedgerError::StoreUnavailable {
                reason: format!("cannot open ledger file '{}' for append: {e}", path.display()),
            })?;

        info!(
            path = %path.display(),
            entries = chain.entries.len(),
            "ledger file opened"
        );

        Ok(Self {
            path,
            state: Mutex::new(FileState { chain, file }),
        })
    }

    /// The on-disk location of this ledger.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> LedgerResult<std::sync::MutexGuard<'_, FileState>> {
        self.state.lock().map_err(|e| LedgerError::StoreUnavailable {
            reason: format!("ledger state lock poisoned: {e}"),
        })
    }

    fn persist(file: &mut File, entry: &AuditEntry) -> LedgerResult<()> {
        let line = serde_json::to_string(entry).map_err(|e| LedgerError::StoreUnavailable {
            reason: format!("cannot encode entry {}: {e}", entry.sequence_id),
        })?;
        writeln!(file, "{line}").map_err(|e| LedgerError::StoreUnavailable {
            reason: format!("cannot write entry {}: {e}", entry.sequence_id),
        })?;
        file.flush().map_err(|e| LedgerError::StoreUnavailable {
            reason: format!("cannot flush entry {}: {e}", entry.sequence_id),
        })?;
        file.sync_all().map_err(|e| LedgerError::StoreUnavailable {
            reason: format!("cannot sync entry {}: {e}", entry.sequence_id),
        })
    }
}

impl LedgerStore for FileLedger {
    fn append(&self, candidate: CandidateEntry) -> LedgerResult<AuditEntry> {
        let mut state = self.lock()?;
        let entry = state.chain.seal(candidate);

        // Durability first: the tip only advances once the bytes are synced.
        Self::persist(&mut state.file, &entry)?;
        state.chain.push(entry.clone());

        debug!(
            sequence_id = entry.sequence_id,
            patient_id = %entry.patient_id,
            "entry sealed into file chain"
        );
        Ok(entry)
    }

    fn list(&self, filter: &EntryFilter) -> LedgerResult<Vec<AuditEntry>> {
        let state = self.lock()?;
        Ok(state
            .chain
            .entries
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    fn latest_for(&self, patient_id: &str) -> LedgerResult<Option<AuditEntry>> {
        let state = self.lock()?;
        Ok(state.chain.latest_for(patient_id).cloned())
    }

    fn entry(&self, sequence_id: u64) -> LedgerResult<Option<AuditEntry>> {
        let state = self.lock()?;
        Ok(state.chain.entries.get(sequence_id as usize).cloned())
    }

    fn verify_chain(&self) -> LedgerResult<()> {
        let state = self.lock()?;
        let broken = broken_sequences(&state.chain.entries);
        if broken.is_empty() {
            Ok(())
        } else {
            Err(LedgerError::ChainIntegrity { broken })
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
