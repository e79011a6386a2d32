use crate::error::{Error, Result};
use crate::index::types::SlotId;
use crate::record::Record;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Content of one slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Live(Record),
    Tombstone,
}

impl Slot {
    pub fn is_live(&self) -> bool {
        matches!(self, Slot::Live(_))
    }

    pub fn record(&self) -> Option<&Record> {
        match self {
            Slot::Live(record) => Some(record),
            Slot::Tombstone => None,
        }
    }
}

/// Record table addressed by slot id.
///
/// Ids are handed out from a counter; a freed id goes onto a LIFO free list
/// and is handed out again before the counter advances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotStore {
    slots: Vec<Slot>,
    free_ids: Vec<SlotId>,
}

impl SlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted parts, checking that the free list only
    /// names tombstoned slots, each once.
    pub fn from_parts(slots: Vec<Slot>, free_ids: Vec<SlotId>) -> Result<Self> {
        let mut listed = vec![false; slots.len()];
        for &id in &free_ids {
            let idx = id as usize;
            match slots.get(idx) {
                None => {
                    return Err(Error::InvalidSnapshot(format!(
                        "free id {} is beyond the slot table ({} slots)",
                        id,
                        slots.len()
                    )));
                }
                Some(Slot::Live(_)) => {
                    return Err(Error::InvalidSnapshot(format!("free id {} holds a live record", id)));
                }
                Some(Slot::Tombstone) if listed[idx] => {
                    return Err(Error::InvalidSnapshot(format!("free id {} listed twice", id)));
                }
                Some(Slot::Tombstone) => listed[idx] = true,
            }
        }
        Ok(Self { slots, free_ids })
    }

    /// Reserve an id. The slot stays a tombstone until [`store`](Self::store).
    pub fn allocate(&mut self) -> SlotId {
        if let Some(id) = self.free_ids.pop() {
            debug!(id, "reusing freed slot");
            return id;
        }
        let id = self.slots.len() as SlotId;
        self.slots.push(Slot::Tombstone);
        id
    }

    /// Put `record` into an allocated slot.
    pub fn store(&mut self, id: SlotId, record: Record) -> Result<()> {
        let slot = self
            .slots
            .get_mut(id as usize)
            .ok_or(Error::UnknownRecordId(id))?;
        *slot = Slot::Live(record);
        Ok(())
    }

    /// Live record at `id`; `None` once it has been freed.
    pub fn get(&self, id: SlotId) -> Result<Option<&Record>> {
        self.slots
            .get(id as usize)
            .map(Slot::record)
            .ok_or(Error::UnknownRecordId(id))
    }

    /// Live record at `id`, treating a freed slot as an error.
    pub fn get_live(&self, id: SlotId) -> Result<&Record> {
        self.get(id)?.ok_or(Error::StaleRecordId(id))
    }

    /// Tombstone the slot and return its id to the free list.
    pub fn free(&mut self, id: SlotId) -> Result<Record> {
        let slot = self
            .slots
            .get_mut(id as usize)
            .ok_or(Error::UnknownRecordId(id))?;
        match std::mem::replace(slot, Slot::Tombstone) {
            Slot::Live(record) => {
                self.free_ids.push(id);
                Ok(record)
            }
            Slot::Tombstone => Err(Error::StaleRecordId(id)),
        }
    }

    /// Next id the counter would hand out
    pub fn next_id(&self) -> SlotId {
        self.slots.len() as SlotId
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn free_ids(&self) -> &[SlotId] {
        &self.free_ids
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_live()).count()
    }

    pub fn tombstone_count(&self) -> usize {
        self.slots.len() - self.live_count()
    }

    /// Iterate live records in id order
    pub fn iter_live(&self) -> impl Iterator<Item = (SlotId, &Record)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.record().map(|r| (i as SlotId, r)))
    }

    pub fn is_live(&self, id: SlotId) -> bool {
        self.slots.get(id as usize).is_some_and(Slot::is_live)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_ids.clear();
    }
}
