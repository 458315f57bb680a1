//! Station complexes: stops joined by a shared parent station or a transfer.
//!
//! Only the grouping mechanism is meaningful here. Which stop ends up as a
//! complex's representative depends on input order.

use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::static_data::{StopRow, read_rows_from_path};

/// Row of `transfers.txt`. Unlisted columns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferRow {
    pub from_stop_id: String,
    pub to_stop_id: String,
}

/// Disjoint-set forest over string ids with path compression.
#[derive(Debug, Default)]
pub struct DisjointSet {
    parent: HashMap<String, String>,
}

impl DisjointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the root of `id`, adding it as a singleton when unseen.
    pub fn find(&mut self, id: &str) -> String {
        let mut root = id.to_string();
        loop {
            let next = self
                .parent
                .entry(root.clone())
                .or_insert_with(|| root.clone())
                .clone();
            if next == root {
                break;
            }
            root = next;
        }

        // Point every node on the walked path straight at the root.
        let mut node = id.to_string();
        while node != root {
            let next = self.parent.insert(node, root.clone()).unwrap_or_else(|| root.clone());
            node = next;
        }

        root
    }

    /// Joins the sets containing `a` and `b`; `b`'s root becomes the root.
    pub fn union(&mut self, a: &str, b: &str) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            self.parent.insert(root_a, root_b);
        }
    }
}

/// Result of grouping stops into complexes.
#[derive(Debug, Default)]
pub struct StationComplexes {
    /// Names of stops that are their own parent station.
    pub station_names: HashMap<String, String>,
    /// Representative id to member stop ids, in stops-table order.
    pub complexes: HashMap<String, Vec<String>>,
    complex_of: HashMap<String, String>,
}

impl StationComplexes {
    /// Representative of the complex containing `stop_id`.
    pub fn complex_of(&self, stop_id: &str) -> Option<&str> {
        self.complex_of.get(stop_id).map(String::as_str)
    }

    pub fn members(&self, complex_id: &str) -> &[String] {
        self.complexes
            .get(complex_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.complexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.complexes.is_empty()
    }
}

/// Unions the parent stations of every transfer pair and groups each stop
/// under the root of its parent station.
///
/// A stop with an empty `parent_station` is its own parent. Transfers that
/// name a stop missing from `stops` are skipped.
pub fn build(stops: &[StopRow], transfers: &[TransferRow]) -> StationComplexes {
    let mut stop_to_parent: Vec<(&str, &str)> = Vec::with_capacity(stops.len());
    let mut parent_of: HashMap<&str, &str> = HashMap::with_capacity(stops.len());
    let mut station_names = HashMap::new();

    for stop in stops {
        let parent = if stop.parent_station.is_empty() {
            stop.stop_id.as_str()
        } else {
            stop.parent_station.as_str()
        };
        stop_to_parent.push((stop.stop_id.as_str(), parent));
        parent_of.insert(stop.stop_id.as_str(), parent);
        if parent == stop.stop_id {
            station_names.insert(stop.stop_id.clone(), stop.stop_name.clone());
        }
    }

    let mut sets = DisjointSet::new();
    for transfer in transfers {
        let from = parent_of.get(transfer.from_stop_id.as_str());
        let to = parent_of.get(transfer.to_stop_id.as_str());
        match (from, to) {
            (Some(from), Some(to)) => sets.union(from, to),
            _ => warn!(
                from_stop_id = %transfer.from_stop_id,
                to_stop_id = %transfer.to_stop_id,
                "Transfer references unknown stop, skipping"
            ),
        }
    }

    let mut complexes: HashMap<String, Vec<String>> = HashMap::new();
    let mut complex_of = HashMap::with_capacity(stop_to_parent.len());
    for (stop_id, parent) in stop_to_parent {
        let root = sets.find(parent);
        complexes
            .entry(root.clone())
            .or_default()
            .push(stop_id.to_string());
        complex_of.insert(stop_id.to_string(), root);
    }

    StationComplexes {
        station_names,
        complexes,
        complex_of,
    }
}

/// Reads `stops.txt` and `transfers.txt` and builds the complexes.
#[tracing::instrument]
pub fn load(stops_path: &Path, transfers_path: &Path) -> Result<StationComplexes> {
    let stops: Vec<StopRow> = read_rows_from_path(stops_path)?;
    let transfers: Vec<TransferRow> = read_rows_from_path(transfers_path)?;

    let complexes = build(&stops, &transfers);
    info!(
        stops = stops.len(),
        transfers = transfers.len(),
        complexes = complexes.len(),
        "Station complexes built"
    );
    Ok(complexes)
}
