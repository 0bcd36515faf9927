// 📈 Rate Chart - market rate (Tk.) per raw-material size
//
// Size is the key. A size can only be added once; changing its rate is an
// explicit update, never a silent overwrite on insert.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

const CONTEXT: &str = "RateChart";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub size: u32,
    /// Rate in Tk.
    pub rate: f64,
}

fn validate_size(size: u32) -> Result<(), ValidationError> {
    if size == 0 {
        return Err(ValidationError::new(CONTEXT, "size", "Size must be a positive integer"));
    }
    Ok(())
}

fn validate_rate(rate: f64) -> Result<(), ValidationError> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(ValidationError::new(
            CONTEXT,
            "rate",
            format!("Rate must be a non-negative amount, got {}", rate),
        ));
    }
    Ok(())
}

// ============================================================================
// RATE CHART
// ============================================================================

/// Rate entries kept ascending by size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RateEntry>", into = "Vec<RateEntry>")]
pub struct RateChart {
    entries: Vec<RateEntry>,
}

impl RateChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sizes 5-24 on the stepped schedule the tool ships with
    pub fn with_defaults() -> Self {
        let mut chart = RateChart::new();
        for size in 5..=24u32 {
            let rate = match size {
                5..=7 => 1700.0,
                8..=11 => 1500.0,
                12..=15 => 1200.0,
                16..=20 => 950.0,
                _ => 850.0,
            };
            chart.entries.push(RateEntry { size, rate });
        }
        chart
    }

    /// Insert a new size. Existing sizes are rejected and keep their rate.
    pub fn insert(&mut self, size: u32, rate: f64) -> Result<(), ValidationError> {
        validate_size(size)?;
        validate_rate(rate)?;

        match self.entries.binary_search_by_key(&size, |e| e.size) {
            Ok(_) => Err(ValidationError::duplicate(
                CONTEXT,
                "size",
                format!("Size {} already exists. Please edit the existing entry.", size),
            )),
            Err(pos) => {
                self.entries.insert(pos, RateEntry { size, rate });
                Ok(())
            }
        }
    }

    /// Change the rate of an existing size
    pub fn update(&mut self, size: u32, rate: f64) -> Result<(), ValidationError> {
        validate_rate(rate)?;

        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.size == size)
            .ok_or_else(|| ValidationError::missing(CONTEXT, "size", format!("No rate for size {}", size)))?;
        entry.rate = rate;
        Ok(())
    }

    pub fn remove(&mut self, size: u32) -> Option<RateEntry> {
        let pos = self.entries.iter().position(|e| e.size == size)?;
        Some(self.entries.remove(pos))
    }

    pub fn get(&self, size: u32) -> Option<f64> {
        self.entries.iter().find(|e| e.size == size).map(|e| e.rate)
    }

    /// Entries whose size falls within `smallest..=largest`
    pub fn in_range(&self, smallest: u32, largest: u32) -> impl Iterator<Item = &RateEntry> {
        self.entries
            .iter()
            .filter(move |e| e.size >= smallest && e.size <= largest)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RateEntry> {
        self.entries.iter()
    }

    pub fn get_index(&self, index: usize) -> Option<&RateEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Vec<RateEntry>> for RateChart {
    type Error = ValidationError;

    /// Rebuild through `insert` so stored charts obey the same rules as edits
    fn try_from(entries: Vec<RateEntry>) -> Result<Self, Self::Error> {
        let mut chart = RateChart::new();
        for entry in entries {
            chart.insert(entry.size, entry.rate)?;
        }
        Ok(chart)
    }
}

impl From<RateChart> for Vec<RateEntry> {
    fn from(chart: RateChart) -> Self {
        chart.entries
    }
}
