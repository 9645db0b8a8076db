// src/data_input/session.rs

use log::debug;

use crate::data_input::measurement::Measurement;

/// The measurements entered during one interactive session, in insertion order.
///
/// Owned by the caller and passed by reference; nothing here is global.
/// Duplicate frequencies are kept as separate records.
#[derive(Debug, Clone, Default)]
pub struct Session {
    measurements: Vec<Measurement>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a measurement at the end of the insertion order.
    pub fn append(&mut self, measurement: Measurement) {
        debug!(
            "Appending measurement #{}: {} Hz, {} V",
            self.measurements.len(),
            measurement.frequency_hz(),
            measurement.output_voltage_v()
        );
        self.measurements.push(measurement);
    }

    /// All measurements ordered by ascending frequency.
    ///
    /// The sort is stable: records with equal frequency keep their insertion order.
    /// The stored order is left untouched.
    pub fn all_sorted(&self) -> Vec<Measurement> {
        self.sorted_with_index()
            .into_iter()
            .map(|(_, measurement)| measurement)
            .collect()
    }

    /// Like [`Session::all_sorted`], paired with each record's insertion index
    /// (the index [`Session::remove`] expects).
    pub fn sorted_with_index(&self) -> Vec<(usize, Measurement)> {
        let mut indexed: Vec<(usize, Measurement)> =
            self.measurements.iter().copied().enumerate().collect();
        indexed.sort_by(|a, b| a.1.frequency_hz().total_cmp(&b.1.frequency_hz()));
        indexed
    }

    /// Removes the record at `index` in insertion order.
    ///
    /// Survivors keep their relative order, so `all_sorted` remains a stable sort of them.
    /// Returns `None` and changes nothing if the index is out of range.
    pub fn remove(&mut self, index: usize) -> Option<Measurement> {
        if index >= self.measurements.len() {
            return None;
        }
        let removed = self.measurements.remove(index);
        debug!("Removed measurement #{}: {} Hz", index, removed.frequency_hz());
        Some(removed)
    }

    pub fn reset(&mut self) {
        debug!("Clearing {} measurements", self.measurements.len());
        self.measurements.clear();
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.measurements.iter()
    }
}

impl Extend<Measurement> for Session {
    fn extend<T: IntoIterator<Item = Measurement>>(&mut self, iter: T) {
        for measurement in iter {
            self.append(measurement);
        }
    }
}
