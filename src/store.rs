// 🗄️ Flat-file JSON store - data.json with whole-file read/overwrite
//
// The data file is a single JSON document {clients: [], interactions: []}.
// Reads are tolerant: a missing file is initialized, an empty or corrupt
// file degrades to the empty structure instead of failing. Writes replace
// the whole file with pretty-printed JSON. No durability guarantees and no
// cross-process locking; callers serialize access themselves.

use crate::model::{Client, ClientStatus, ClientType, Interaction, InteractionType};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

// ============================================================================
// DATA FILE
// ============================================================================

/// On-disk shape of the data file. Missing keys default to empty arrays.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataFile {
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

// ============================================================================
// NEW-RECORD PAYLOADS
// ============================================================================

/// Client fields supplied by the caller; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub status: ClientStatus,
    #[serde(rename = "type")]
    pub client_type: ClientType,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub brand: String,
}

/// Interaction fields supplied by the caller; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInteraction {
    #[serde(rename = "clientId")]
    pub client_id: String,
    #[serde(rename = "type")]
    pub interaction_type: InteractionType,
    pub date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(rename = "repurchasePotential", default)]
    pub repurchase_potential: bool,
}

// ============================================================================
// JSON STORE
// ============================================================================

pub struct JsonStore {
    path: PathBuf,
    data: DataFile,
    // Ids are creation-time millis; bumped past the last issued id so two
    // creations inside the same millisecond stay unique.
    last_id: i64,
}

impl JsonStore {
    /// Open the store, creating and initializing the data file if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = read_data(&path)?;

        let last_id = data
            .clients
            .iter()
            .map(|c| c.id)
            .chain(data.interactions.iter().map(|i| i.id))
            .max()
            .unwrap_or(0);

        Ok(JsonStore { path, data, last_id })
    }

    pub fn clients(&self) -> &[Client] {
        &self.data.clients
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.data.interactions
    }

    fn next_id(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        self.last_id = now.max(self.last_id + 1);
        self.last_id
    }

    /// Add a client and persist. Returns the stored record with its id.
    pub fn add_client(&mut self, new: NewClient) -> Result<Client> {
        let client = Client {
            id: self.next_id(),
            name: new.name,
            status: new.status,
            client_type: new.client_type,
            product: new.product,
            brand: new.brand,
        };
        self.data.clients.push(client.clone());
        self.persist()?;
        Ok(client)
    }

    /// Replace the mutable fields of an existing client. None if the id is
    /// unknown.
    pub fn update_client(&mut self, id: i64, new: NewClient) -> Result<Option<Client>> {
        let Some(client) = self.data.clients.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        client.name = new.name;
        client.status = new.status;
        client.client_type = new.client_type;
        client.product = new.product;
        client.brand = new.brand;
        let updated = client.clone();
        self.persist()?;
        Ok(Some(updated))
    }

    /// Delete a client by id. Returns false if the id is unknown. Deleting a
    /// client does NOT cascade to its interactions; stale references are
    /// expected and tolerated by every consumer.
    pub fn delete_client(&mut self, id: i64) -> Result<bool> {
        let before = self.data.clients.len();
        self.data.clients.retain(|c| c.id != id);
        if self.data.clients.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    pub fn find_client(&self, id: i64) -> Option<&Client> {
        self.data.clients.iter().find(|c| c.id == id)
    }

    /// Add an interaction and persist. Returns the stored record with its id.
    pub fn add_interaction(&mut self, new: NewInteraction) -> Result<Interaction> {
        let interaction = Interaction {
            id: self.next_id(),
            client_id: new.client_id,
            interaction_type: new.interaction_type,
            date: new.date,
            notes: new.notes,
            repurchase_potential: new.repurchase_potential,
        };
        self.data.interactions.push(interaction.clone());
        self.persist()?;
        Ok(interaction)
    }

    pub fn update_interaction(
        &mut self,
        id: i64,
        new: NewInteraction,
    ) -> Result<Option<Interaction>> {
        let Some(interaction) = self.data.interactions.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        interaction.client_id = new.client_id;
        interaction.interaction_type = new.interaction_type;
        interaction.date = new.date;
        interaction.notes = new.notes;
        interaction.repurchase_potential = new.repurchase_potential;
        let updated = interaction.clone();
        self.persist()?;
        Ok(Some(updated))
    }

    pub fn delete_interaction(&mut self, id: i64) -> Result<bool> {
        let before = self.data.interactions.len();
        self.data.interactions.retain(|i| i.id != id);
        if self.data.interactions.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Overwrite the data file with the in-memory state.
    fn persist(&self) -> Result<()> {
        write_data(&self.path, &self.data)
    }
}

// ============================================================================
// FILE I/O
// ============================================================================

/// Read the data file, degrading to the empty structure wherever possible.
fn read_data(path: &Path) -> Result<DataFile> {
    if !path.exists() {
        let initial = DataFile::default();
        write_data(path, &initial)?;
        return Ok(initial);
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read data file {}", path.display()))?;

    if raw.trim().is_empty() {
        return Ok(DataFile::default());
    }

    match serde_json::from_str(&raw) {
        Ok(data) => Ok(data),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "data file is corrupt, starting from empty structure");
            Ok(DataFile::default())
        }
    }
}

fn write_data(path: &Path, data: &DataFile) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("failed to serialize data file")?;
    fs::write(path, json)
        .with_context(|| format!("failed to write data file {}", path.display()))?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_client(name: &str) -> NewClient {
        NewClient {
            name: name.to_string(),
            status: ClientStatus::Activo,
            client_type: ClientType::Ordinario,
            product: String::new(),
            brand: String::new(),
        }
    }

    fn new_interaction(client_id: &str, date: &str) -> NewInteraction {
        NewInteraction {
            client_id: client_id.to_string(),
            interaction_type: InteractionType::Preventa,
            date: date.to_string(),
            notes: String::new(),
            repurchase_potential: false,
        }
    }

    #[test]
    fn test_open_missing_file_initializes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");

        let store = JsonStore::open(&path).unwrap();

        assert!(path.exists());
        assert!(store.clients().is_empty());
        assert!(store.interactions().is_empty());
    }

    #[test]
    fn test_open_empty_file_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "   \n").unwrap();

        let store = JsonStore::open(&path).unwrap();
        assert!(store.clients().is_empty());
    }

    #[test]
    fn test_open_corrupt_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonStore::open(&path).unwrap();
        assert!(store.clients().is_empty());
        assert!(store.interactions().is_empty());
    }

    #[test]
    fn test_open_missing_keys_default_to_arrays() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, r#"{"clients":[]}"#).unwrap();

        let store = JsonStore::open(&path).unwrap();
        assert!(store.interactions().is_empty());
    }

    #[test]
    fn test_add_client_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");

        let mut store = JsonStore::open(&path).unwrap();
        let created = store.add_client(new_client("Acme")).unwrap();
        assert!(created.id > 0);

        let reopened = JsonStore::open(&path).unwrap();
        assert_eq!(reopened.clients().len(), 1);
        assert_eq!(reopened.clients()[0].name, "Acme");
        assert_eq!(reopened.clients()[0].id, created.id);
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(dir.path().join("data.json")).unwrap();

        let a = store.add_client(new_client("A")).unwrap();
        let b = store.add_client(new_client("B")).unwrap();
        let c = store.add_client(new_client("C")).unwrap();

        assert!(a.id < b.id && b.id < c.id);
    }

    #[test]
    fn test_update_client() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(dir.path().join("data.json")).unwrap();
        let created = store.add_client(new_client("Acme")).unwrap();

        let mut changed = new_client("Acme Corp");
        changed.status = ClientStatus::Dormido;
        let updated = store.update_client(created.id, changed).unwrap().unwrap();

        assert_eq!(updated.name, "Acme Corp");
        assert_eq!(updated.status, ClientStatus::Dormido);
        assert_eq!(updated.id, created.id);
    }

    #[test]
    fn test_update_unknown_client_is_none() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(dir.path().join("data.json")).unwrap();

        assert!(store.update_client(999, new_client("X")).unwrap().is_none());
    }

    #[test]
    fn test_delete_client_keeps_interactions() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(dir.path().join("data.json")).unwrap();
        let created = store.add_client(new_client("Acme")).unwrap();
        store
            .add_interaction(new_interaction("Acme", "2024-01-01"))
            .unwrap();

        assert!(store.delete_client(created.id).unwrap());
        assert!(!store.delete_client(created.id).unwrap());

        // Stale clientId references stay behind; they are tolerated downstream.
        assert_eq!(store.interactions().len(), 1);
    }

    #[test]
    fn test_interaction_crud() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(dir.path().join("data.json")).unwrap();

        let created = store
            .add_interaction(new_interaction("Acme", "2024-01-01"))
            .unwrap();

        let mut changed = new_interaction("Acme", "2024-02-01");
        changed.repurchase_potential = true;
        let updated = store
            .update_interaction(created.id, changed)
            .unwrap()
            .unwrap();
        assert_eq!(updated.date, "2024-02-01");
        assert!(updated.repurchase_potential);

        assert!(store.delete_interaction(created.id).unwrap());
        assert!(store.interactions().is_empty());
        assert!(!store.delete_interaction(created.id).unwrap());
    }
}
