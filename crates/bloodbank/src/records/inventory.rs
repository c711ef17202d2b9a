//! Blood inventory counters.
//!
//! The inventory is persisted as one JSON object mapping blood-type tokens to
//! unit counts. Keys other than the eight tokens are carried through writes
//! untouched but never reported.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::RecordStore;
use crate::config::InventoryConfig;
use crate::error::Result;
use crate::model::BloodType;
use crate::storage::KeyValueStore;

/// Storage key of the inventory map.
pub const INVENTORY_KEY: &str = "bloodInventory";

/// The raw persisted map.
type RawInventory = BTreeMap<String, i64>;

/// Units in stock for each blood type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    counts: BTreeMap<BloodType, u32>,
}

impl Inventory {
    fn from_raw(raw: &RawInventory) -> Self {
        let counts = BloodType::ALL
            .into_iter()
            .map(|bt| (bt, clamp_units(raw.get(bt.as_str()).copied().unwrap_or(0))))
            .collect();
        Self { counts }
    }

    /// Units of `blood_type`; 0 when missing.
    #[must_use]
    pub fn get(&self, blood_type: BloodType) -> u32 {
        self.counts.get(&blood_type).copied().unwrap_or(0)
    }

    /// All eight types with their counts, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (BloodType, u32)> + '_ {
        BloodType::ALL.into_iter().map(|bt| (bt, self.get(bt)))
    }

    /// Units across all types.
    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.counts.values().map(|&n| u64::from(n)).sum()
    }
}

/// Stored counts are never reported below zero.
fn clamp_units(n: i64) -> u32 {
    u32::try_from(n.max(0)).unwrap_or(u32::MAX)
}

/// How well stocked a blood type is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    /// Needs immediate donors.
    Critical,
    /// Running low.
    Low,
    /// Adequate.
    Medium,
    /// Well stocked.
    High,
}

impl std::fmt::Display for StockLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => f.pad("critical"),
            Self::Low => f.pad("low"),
            Self::Medium => f.pad("medium"),
            Self::High => f.pad("high"),
        }
    }
}

/// Exclusive upper bounds for each stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockThresholds {
    /// Below this a type is critical.
    pub critical_below: u32,
    /// Below this a type is low.
    pub low_below: u32,
    /// Below this a type is medium; otherwise high.
    pub medium_below: u32,
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self::from(&InventoryConfig::default())
    }
}

impl From<&InventoryConfig> for StockThresholds {
    fn from(config: &InventoryConfig) -> Self {
        Self {
            critical_below: config.critical_below,
            low_below: config.low_below,
            medium_below: config.medium_below,
        }
    }
}

impl StockThresholds {
    /// Classify a unit count.
    #[must_use]
    pub fn classify(&self, units: u32) -> StockLevel {
        if units < self.critical_below {
            StockLevel::Critical
        } else if units < self.low_below {
            StockLevel::Low
        } else if units < self.medium_below {
            StockLevel::Medium
        } else {
            StockLevel::High
        }
    }
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Snapshot of all eight counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read, or
    /// `MalformedPersistedData` under the strict policy.
    pub fn inventory(&self) -> Result<Inventory> {
        let raw: RawInventory = self.read_json(INVENTORY_KEY)?;
        Ok(Inventory::from_raw(&raw))
    }

    /// Units of one blood type; 0 when missing.
    ///
    /// # Errors
    ///
    /// Same as [`RecordStore::inventory`].
    pub fn units(&self, blood_type: BloodType) -> Result<u32> {
        Ok(self.inventory()?.get(blood_type))
    }

    /// Units for a blood-type token.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBloodType` for an unknown token.
    pub fn units_for_token(&self, token: &str) -> Result<u32> {
        self.units(token.parse()?)
    }

    /// Add `delta` units (negative to remove), clamping at zero.
    ///
    /// Returns the new count.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the backend refuses the write, or
    /// `MalformedPersistedData` if the stored map cannot be parsed; the stored
    /// value is then left untouched.
    pub fn adjust(&mut self, blood_type: BloodType, delta: i64) -> Result<u32> {
        let mut raw: RawInventory = self.read_json_for_update(INVENTORY_KEY)?;
        let current = i64::from(clamp_units(raw.get(blood_type.as_str()).copied().unwrap_or(0)));
        let updated = clamp_units(current.saturating_add(delta));
        raw.insert(blood_type.as_str().to_string(), i64::from(updated));
        self.write_json(INVENTORY_KEY, &raw)?;
        debug!(blood_type = %blood_type, delta, units = updated, "Adjusted inventory");
        Ok(updated)
    }

    /// [`RecordStore::adjust`] for a blood-type token.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBloodType` for an unknown token, or `StorageUnavailable`
    /// if the backend refuses the write.
    pub fn adjust_token(&mut self, token: &str, delta: i64) -> Result<u32> {
        self.adjust(token.parse()?, delta)
    }

    /// Stock level of one blood type under the configured thresholds.
    ///
    /// # Errors
    ///
    /// Same as [`RecordStore::inventory`].
    pub fn stock_level(&self, blood_type: BloodType) -> Result<StockLevel> {
        Ok(self.thresholds.classify(self.units(blood_type)?))
    }

    /// The configured stock thresholds.
    #[must_use]
    pub fn stock_thresholds(&self) -> StockThresholds {
        self.thresholds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MalformedPolicy;
    use crate::error::Error;
    use crate::storage::MemoryStore;

    fn store_with_inventory(raw: &str) -> RecordStore<MemoryStore> {
        let mut backend = MemoryStore::new();
        backend.set(INVENTORY_KEY, raw).unwrap();
        RecordStore::new(backend)
    }

    #[test]
    fn test_missing_inventory_is_all_zero() {
        let store = RecordStore::new(MemoryStore::new());
        let inventory = store.inventory().unwrap();
        assert_eq!(inventory.iter().count(), 8);
        assert!(inventory.iter().all(|(_, n)| n == 0));
        assert_eq!(store.units(BloodType::OPositive).unwrap(), 0);
    }

    #[test]
    fn test_get_known_and_missing_types() {
        let store = store_with_inventory(r#"{"A+":45,"O-":34}"#);
        assert_eq!(store.units(BloodType::APositive).unwrap(), 45);
        assert_eq!(store.units(BloodType::ONegative).unwrap(), 34);
        assert_eq!(store.units(BloodType::BNegative).unwrap(), 0);
    }

    #[test]
    fn test_units_for_token() {
        let store = store_with_inventory(r#"{"AB-":8}"#);
        assert_eq!(store.units_for_token("AB-").unwrap(), 8);
        assert_eq!(store.units_for_token("ab\u{2212}").unwrap(), 8);

        let err = store.units_for_token("Z+").unwrap_err();
        assert!(matches!(err, Error::InvalidBloodType(_)));
    }

    #[test]
    fn test_adjust_increments_and_decrements() {
        let mut store = store_with_inventory(r#"{"B+":38}"#);
        assert_eq!(store.adjust(BloodType::BPositive, 2).unwrap(), 40);
        assert_eq!(store.adjust(BloodType::BPositive, -10).unwrap(), 30);
        assert_eq!(store.units(BloodType::BPositive).unwrap(), 30);
    }

    #[test]
    fn test_adjust_clamps_at_zero() {
        let mut store = store_with_inventory(r#"{"AB-":8}"#);
        assert_eq!(store.adjust(BloodType::AbNegative, -20).unwrap(), 0);
        assert_eq!(store.units(BloodType::AbNegative).unwrap(), 0);
    }

    #[test]
    fn test_adjust_token_rejects_unknown() {
        let mut store = RecordStore::new(MemoryStore::new());
        let err = store.adjust_token("C+", 1).unwrap_err();
        assert!(matches!(err, Error::InvalidBloodType(ref t) if t == "C+"));
        assert!(!store.backend().contains(INVENTORY_KEY).unwrap());
    }

    #[test]
    fn test_negative_stored_count_reads_as_zero() {
        let mut store = store_with_inventory(r#"{"O+":-5}"#);
        assert_eq!(store.units(BloodType::OPositive).unwrap(), 0);
        assert_eq!(store.adjust(BloodType::OPositive, 3).unwrap(), 3);
    }

    #[test]
    fn test_unknown_keys_survive_adjust() {
        let mut store = store_with_inventory(r#"{"A+":1,"legacy":7}"#);
        store.adjust(BloodType::APositive, 1).unwrap();
        let raw = store.backend().get(INVENTORY_KEY).unwrap().unwrap();
        assert!(raw.contains("\"legacy\":7"));
        assert_eq!(store.inventory().unwrap().total_units(), 2);
    }

    #[test]
    fn test_adjust_keeps_unreadable_inventory_intact() {
        let stored = r#"{"A+":45,"O+":67,"B-":12.5}"#;
        let mut store = store_with_inventory(stored);

        assert_eq!(store.inventory().unwrap().total_units(), 0);

        let err = store.adjust(BloodType::ANegative, 1).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedPersistedData { ref key, .. } if key == INVENTORY_KEY
        ));
        assert_eq!(store.backend().get(INVENTORY_KEY).unwrap().as_deref(), Some(stored));
    }

    #[test]
    fn test_malformed_inventory_strict() {
        let store = store_with_inventory("[1,2]").with_malformed_policy(MalformedPolicy::Error);
        assert!(matches!(
            store.inventory().unwrap_err(),
            Error::MalformedPersistedData { .. }
        ));
    }

    #[test]
    fn test_stock_levels() {
        let thresholds = StockThresholds::default();
        assert_eq!(thresholds.classify(0), StockLevel::Critical);
        assert_eq!(thresholds.classify(9), StockLevel::Critical);
        assert_eq!(thresholds.classify(12), StockLevel::Low);
        assert_eq!(thresholds.classify(18), StockLevel::Medium);
        assert_eq!(thresholds.classify(38), StockLevel::Medium);
        assert_eq!(thresholds.classify(45), StockLevel::High);
    }

    #[test]
    fn test_stock_level_uses_store_thresholds() {
        let store = store_with_inventory(r#"{"O+":20}"#).with_stock_thresholds(StockThresholds {
            critical_below: 5,
            low_below: 10,
            medium_below: 20,
        });
        assert_eq!(store.stock_level(BloodType::OPositive).unwrap(), StockLevel::High);
    }

    #[test]
    fn test_inventory_serializes_as_token_map() {
        let store = store_with_inventory(r#"{"A+":45}"#);
        let value = serde_json::to_value(store.inventory().unwrap()).unwrap();
        assert_eq!(value["A+"], 45);
        assert_eq!(value["O-"], 0);
    }
}
