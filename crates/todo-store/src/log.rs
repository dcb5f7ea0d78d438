use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use fs4::fs_std::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use todo_types::{Item, ItemId, Page, PageRequest};

use crate::error::{StoreError, StoreResult};
use crate::records::RecordSet;
use crate::traits::ItemStore;

/// One mutation in the record log.
///
/// On-disk format of an entry:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized LogRecord)]
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
enum LogRecord {
    /// An item stored under its (already assigned) id.
    Saved(Item),
    /// An id whose record was removed.
    Deleted(ItemId),
    /// Highest id handed out so far. Written at the head of a compacted log
    /// so ids of records dropped by compaction stay retired.
    Retired(ItemId),
}

/// Flush/sync strategy for the record log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// `fsync` after every append (safest, highest latency).
    EveryWrite,
    /// Flush to the OS page cache only.
    #[default]
    OsDefault,
}

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: u64 = 8;

struct LogState {
    records: RecordSet,
    file: File,
    /// End of the last committed entry.
    offset: u64,
    /// Set when a failed append could not be rolled back.
    failure: Option<String>,
}

/// Durable item store backed by an append-only record log.
///
/// Every mutation is appended to the log before it becomes visible. Opening
/// the store takes an exclusive lock on the file and replays it front to back
/// to rebuild the record set and the id counter. Entries failing the CRC
/// check are skipped; a torn tail (short header or payload) stops the replay
/// and is cut off before new entries are appended. An append that fails is
/// cut back off the file, so the log always ends at the last committed entry.
pub struct LogItemStore {
    path: PathBuf,
    sync_mode: SyncMode,
    state: RwLock<LogState>,
}

impl LogItemStore {
    /// Open (or create) the record log at `path`.
    ///
    /// Fails with [`StoreError::Locked`] while another store holds the log.
    pub fn open(path: impl AsRef<Path>, sync_mode: SyncMode) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        lock_exclusive(&file, &path)?;

        let file_len = file.metadata()?.len();
        let (records, valid_len) = replay(BufReader::new(&file), file_len)?;
        if valid_len < file_len {
            warn!(
                path = %path.display(),
                valid_len,
                file_len,
                "discarding torn tail of record log"
            );
            file.set_len(valid_len)?;
        }

        info!(
            path = %path.display(),
            items = records.len(),
            last_id = ?records.last_id(),
            "record log opened"
        );

        Ok(Self {
            path,
            sync_mode,
            state: RwLock::new(LogState {
                records,
                file,
                offset: valid_len,
                failure: None,
            }),
        })
    }

    /// Path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current size of the log in bytes.
    pub fn log_len(&self) -> StoreResult<u64> {
        Ok(self.read()?.offset)
    }

    /// Rewrite the log so it holds only the live records.
    ///
    /// The compacted log starts with the highest id handed out so far, so
    /// ids of deleted records are still never reassigned. The new log is
    /// written and locked beside the old one, then renamed over it.
    pub fn compact(&self) -> StoreResult<u64> {
        let mut state = self.write()?;

        let tmp_path = self.path.with_extension("compact");
        match fs::remove_file(&tmp_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        let mut tmp = OpenOptions::new()
            .create_new(true)
            .read(true)
            .append(true)
            .open(&tmp_path)?;
        lock_exclusive(&tmp, &tmp_path)?;

        let mut buf = Vec::new();
        if let Some(last) = state.records.last_id() {
            buf.extend_from_slice(&encode_entry(&LogRecord::Retired(last))?);
        }
        for item in state.records.iter() {
            buf.extend_from_slice(&encode_entry(&LogRecord::Saved(item.clone()))?);
        }
        tmp.write_all(&buf)?;
        tmp.sync_all()?;

        fs::rename(&tmp_path, &self.path)?;
        let before = state.offset;
        state.file = tmp;
        state.offset = buf.len() as u64;
        state.failure = None;

        info!(before, after = state.offset, "record log compacted");
        Ok(state.offset)
    }

    fn append(&self, state: &mut LogState, record: &LogRecord) -> StoreResult<()> {
        if let Some(reason) = &state.failure {
            return Err(StoreError::LogUnusable(reason.clone()));
        }

        let entry = encode_entry(record)?;
        let entry_offset = state.offset;
        if let Err(e) = append_entry(&mut state.file, entry_offset, &entry, self.sync_mode) {
            if let StoreError::LogUnusable(reason) = &e {
                state.failure = Some(reason.clone());
            }
            return Err(e);
        }

        state.offset += entry.len() as u64;
        debug!(offset = entry_offset, len = entry.len(), "record log append");
        Ok(())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, LogState>> {
        self.state.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, LogState>> {
        self.state.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl ItemStore for LogItemStore {
    fn save(&self, item: Item) -> StoreResult<Item> {
        let mut state = self.write()?;
        let item = state.records.assign(item)?;
        self.append(&mut state, &LogRecord::Saved(item.clone()))?;
        state.records.insert(item.clone());
        Ok(item)
    }

    fn find_by_id(&self, id: ItemId) -> StoreResult<Option<Item>> {
        Ok(self.read()?.records.get(id).cloned())
    }

    fn find_page(&self, request: &PageRequest) -> StoreResult<Page<Item>> {
        Ok(self.read()?.records.page(request))
    }

    fn delete_by_id(&self, id: ItemId) -> StoreResult<bool> {
        let mut state = self.write()?;
        if state.records.get(id).is_none() {
            return Ok(false);
        }
        self.append(&mut state, &LogRecord::Deleted(id))?;
        Ok(state.records.remove(id))
    }

    fn count(&self) -> StoreResult<u64> {
        Ok(self.read()?.records.len() as u64)
    }
}

impl std::fmt::Debug for LogItemStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogItemStore")
            .field("path", &self.path)
            .field("sync_mode", &self.sync_mode)
            .finish()
    }
}

fn lock_exclusive(file: &File, path: &Path) -> StoreResult<()> {
    file.try_lock_exclusive().map_err(|source| StoreError::Locked {
        path: path.to_path_buf(),
        source,
    })
}

/// Where framed entries are appended.
trait LogSink: Write {
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
    fn sync_to_disk(&mut self) -> io::Result<()>;
}

impl LogSink for File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync_to_disk(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Serialize and frame one record.
fn encode_entry(record: &LogRecord) -> StoreResult<Vec<u8>> {
    let payload =
        bincode::serialize(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let length = u32::try_from(payload.len())
        .map_err(|_| StoreError::Serialization(format!("entry too large: {} bytes", payload.len())))?;
    let crc = crc32fast::hash(&payload);

    let mut entry = Vec::with_capacity(HEADER_SIZE as usize + payload.len());
    entry.extend_from_slice(&length.to_le_bytes());
    entry.extend_from_slice(&crc.to_le_bytes());
    entry.extend_from_slice(&payload);
    Ok(entry)
}

/// Append a framed entry to a sink whose committed length is `offset`.
///
/// On failure the sink is cut back to `offset`. If that also fails the
/// result is [`StoreError::LogUnusable`].
fn append_entry(
    sink: &mut impl LogSink,
    offset: u64,
    entry: &[u8],
    sync_mode: SyncMode,
) -> StoreResult<()> {
    let Err(e) = write_through(sink, entry, sync_mode) else {
        return Ok(());
    };
    match sink.truncate_to(offset) {
        Ok(()) => {
            warn!(offset, error = %e, "log append failed; rolled back");
            Err(e.into())
        }
        Err(rollback) => {
            error!(offset, error = %e, rollback = %rollback, "log append failed and could not be rolled back");
            Err(StoreError::LogUnusable(format!(
                "append at offset {offset} failed ({e}) and rollback failed ({rollback})"
            )))
        }
    }
}

fn write_through(sink: &mut impl LogSink, entry: &[u8], sync_mode: SyncMode) -> io::Result<()> {
    sink.write_all(entry)?;
    sink.flush()?;
    if sync_mode == SyncMode::EveryWrite {
        sink.sync_to_disk()?;
    }
    Ok(())
}

/// Rebuild the record set from `len` bytes of log. Returns the set and the
/// length of the valid prefix.
fn replay(mut reader: impl Read + Seek, len: u64) -> StoreResult<(RecordSet, u64)> {
    let mut records = RecordSet::new();
    let mut offset: u64 = 0;
    let mut applied = 0usize;

    while offset + HEADER_SIZE <= len {
        reader.seek(SeekFrom::Start(offset))?;

        let mut header = [0u8; HEADER_SIZE as usize];
        match reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }

        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        if length == 0 || offset + HEADER_SIZE + u64::from(length) > len {
            warn!(offset, length, len, "invalid log entry length; stopping replay");
            break;
        }

        let mut payload = vec![0u8; length as usize];
        match reader.read_exact(&mut payload) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                warn!(offset, "truncated log entry; stopping replay");
                break;
            }
            Err(e) => return Err(e.into()),
        }

        let next = offset + HEADER_SIZE + u64::from(length);
        let actual_crc = crc32fast::hash(&payload);
        if actual_crc != expected_crc {
            warn!(
                offset,
                expected = expected_crc,
                actual = actual_crc,
                "CRC mismatch; skipping log entry"
            );
            offset = next;
            continue;
        }

        let record: LogRecord =
            bincode::deserialize(&payload).map_err(|e| StoreError::CorruptEntry {
                offset,
                reason: e.to_string(),
            })?;
        match record {
            LogRecord::Saved(item) => records.insert(item),
            LogRecord::Deleted(id) => {
                records.remove(id);
            }
            LogRecord::Retired(id) => records.retire_through(id),
        }
        applied += 1;
        offset = next;
    }

    debug!(applied, valid_len = offset, "record log replay complete");
    Ok((records, offset))
}
