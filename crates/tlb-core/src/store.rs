//! Single-file document store.
//!
//! All record collections live in one JSON file. The store itself only
//! guarantees that each `read`/`mutate` call is atomic; multi-step
//! read-modify-write sequences are serialized per channel by the service
//! layer (see `service::ChannelLocks`).

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{Channel, ChatId, LegacyShortList, LegacyThemeInfo, ShortlistEntry, Topic},
    Result,
};

/// Every persisted collection. The legacy collections are only populated in
/// pre-migration store files and are purged by the migrator.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub shortlist: Vec<ShortlistEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub legacy_themes: Vec<LegacyThemeInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub legacy_shortlists: Vec<LegacyShortList>,
}

impl StoreData {
    pub fn channel(&self, chat_id: ChatId) -> Option<&Channel> {
        self.channels.iter().find(|c| c.chat_id == chat_id)
    }

    pub fn channel_mut(&mut self, chat_id: ChatId) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|c| c.chat_id == chat_id)
    }
}

pub struct Store {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl Store {
    /// Load the store file, or start empty if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = load_store_file(&path)?.unwrap_or_default();
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    /// Read-only access to the current data.
    pub fn read<R>(&self, f: impl FnOnce(&StoreData) -> R) -> R {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        f(&data)
    }

    /// Mutate the data and persist. The file is only rewritten when the
    /// closure succeeds, so a failed operation leaves no partial state.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut StoreData) -> Result<R>) -> Result<R> {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        let snapshot = data.clone();
        match f(&mut data) {
            Ok(out) => {
                save_store_file(&self.path, &data)?;
                Ok(out)
            }
            Err(e) => {
                *data = snapshot;
                Err(e)
            }
        }
    }

    /// Dump the full store, pretty-printed, into `dir` for `/export`.
    pub fn export_to(&self, dir: &Path) -> Result<PathBuf> {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        let path = dir.join(format!("export-{}.json", Local::now().format("%Y-%m-%d")));
        fs::write(&path, serde_json::to_string_pretty(&*data)?)?;
        Ok(path)
    }
}

fn load_store_file(path: &Path) -> Result<Option<StoreData>> {
    if !path.exists() {
        return Ok(None);
    }
    let txt = fs::read_to_string(path)?;
    if txt.trim().is_empty() {
        return Ok(None);
    }
    let data: StoreData = serde_json::from_str(&txt)?;
    Ok(Some(data))
}

fn save_store_file(path: &Path, data: &StoreData) -> Result<()> {
    let txt = serde_json::to_string(data)?;
    fs::write(path, txt)?;
    Ok(())
}
