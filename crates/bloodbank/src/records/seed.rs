//! Starter data and explicit initialization.

use chrono::{DateTime, Utc};
use tracing::info;

use super::inventory::INVENTORY_KEY;
use super::RecordStore;
use crate::error::Result;
use crate::model::{BloodType, Donor, Record, Recipient, Urgency};
use crate::storage::KeyValueStore;

/// Starting unit counts, in canonical blood-type order.
const STARTING_UNITS: [(BloodType, i64); 8] = [
    (BloodType::APositive, 45),
    (BloodType::ANegative, 23),
    (BloodType::BPositive, 38),
    (BloodType::BNegative, 15),
    (BloodType::AbPositive, 12),
    (BloodType::AbNegative, 8),
    (BloodType::OPositive, 67),
    (BloodType::ONegative, 34),
];

fn default_donors(now: DateTime<Utc>) -> Vec<Donor> {
    vec![
        Donor {
            id: "1".to_string(),
            name: "Garvita Jain".to_string(),
            age: 19,
            blood_type: BloodType::APositive,
            phone: "+91-9876543210".to_string(),
            email: "garvita.jain@email.com".to_string(),
            address: "123 Medical Street, Healthcare City".to_string(),
            registration_date: now,
        },
        Donor {
            id: "2".to_string(),
            name: "Govind Jangid".to_string(),
            age: 19,
            blood_type: BloodType::OPositive,
            phone: "+91-9876543211".to_string(),
            email: "govind.jangid@email.com".to_string(),
            address: "456 Donor Avenue, Blood City".to_string(),
            registration_date: now,
        },
    ]
}

fn default_recipients(now: DateTime<Utc>) -> Vec<Recipient> {
    vec![Recipient {
        id: "1".to_string(),
        name: "Bhawana Sen".to_string(),
        age: 25,
        blood_type_needed: BloodType::BPositive,
        phone: "+91-9876543212".to_string(),
        email: "bhawana.sen@email.com".to_string(),
        condition: "Surgery requirement".to_string(),
        urgency: Urgency::High,
        hospital: None,
        registration_date: now,
    }]
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Write starter data for any of `donors`, `acceptors` and
    /// `bloodInventory` that is absent.
    ///
    /// Idempotent: existing keys are never touched, even if empty or
    /// malformed. Does nothing when seeding is disabled. Returns the keys
    /// that were written.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the backend refuses a write.
    pub fn initialize(&mut self) -> Result<Vec<&'static str>> {
        if !self.seed_enabled {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let mut seeded = Vec::new();

        if !self.backend.contains(Donor::KEY)? {
            self.write_json(Donor::KEY, &default_donors(now))?;
            seeded.push(Donor::KEY);
        }

        if !self.backend.contains(Recipient::KEY)? {
            self.write_json(Recipient::KEY, &default_recipients(now))?;
            seeded.push(Recipient::KEY);
        }

        if !self.backend.contains(INVENTORY_KEY)? {
            let units: std::collections::BTreeMap<&str, i64> = STARTING_UNITS
                .iter()
                .map(|(bt, n)| (bt.as_str(), *n))
                .collect();
            self.write_json(INVENTORY_KEY, &units)?;
            seeded.push(INVENTORY_KEY);
        }

        if !seeded.is_empty() {
            info!(keys = ?seeded, "Seeded starter data");
        }
        Ok(seeded)
    }
}
