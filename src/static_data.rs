//! GTFS static reference tables: stop names and trip headsigns.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Row of `stops.txt`. Unlisted columns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct StopRow {
    pub stop_id: String,
    pub stop_name: String,
    #[serde(default)]
    pub parent_station: String,
}

#[derive(Debug, Deserialize)]
struct TripRow {
    trip_id: String,
    trip_headsign: String,
}

/// Reads every row of a GTFS table, matching columns by header name.
pub fn read_rows<T, R>(reader: R) -> Result<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
    R: Read,
{
    let mut reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Like [`read_rows`], naming `path` in any error.
pub fn read_rows_from_path<T>(path: &Path) -> Result<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
{
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    read_rows(file).with_context(|| format!("malformed GTFS table {}", path.display()))
}

/// Strips the leading service/schedule segment from a static trip id so it
/// matches the realtime feed's trip id.
///
/// `AFA24GEN-1038-Sunday-00_000600_1..S03R` becomes `000600_1..S03R`. Ids
/// without an underscore are returned unchanged.
pub fn realtime_trip_id(static_trip_id: &str) -> &str {
    static_trip_id
        .split_once('_')
        .map(|(_, rest)| rest)
        .unwrap_or(static_trip_id)
}

pub fn stop_names<R: Read>(reader: R) -> Result<HashMap<String, String>> {
    let rows: Vec<StopRow> = read_rows(reader)?;
    Ok(rows
        .into_iter()
        .map(|row| (row.stop_id, row.stop_name))
        .collect())
}

/// Maps realtime trip ids to headsigns. Later rows win on duplicate ids.
pub fn headsigns<R: Read>(reader: R) -> Result<HashMap<String, String>> {
    let rows: Vec<TripRow> = read_rows(reader)?;
    Ok(rows
        .into_iter()
        .map(|row| (realtime_trip_id(&row.trip_id).to_string(), row.trip_headsign))
        .collect())
}

/// Loads `stop_id → stop_name` from a `stops.txt` file.
pub fn load_stop_names(path: &Path) -> Result<HashMap<String, String>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let names = stop_names(file).with_context(|| format!("malformed {}", path.display()))?;
    debug!(path = %path.display(), stops = names.len(), "Loaded stop names");
    Ok(names)
}

/// Loads realtime `trip_id → headsign` from a `trips.txt` file.
pub fn load_headsigns(path: &Path) -> Result<HashMap<String, String>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let map = headsigns(file).with_context(|| format!("malformed {}", path.display()))?;
    debug!(path = %path.display(), trips = map.len(), "Loaded headsigns");
    Ok(map)
}

/// Returns `base` with every entry of `overlay` applied on top.
pub fn merge(
    mut base: HashMap<String, String>,
    overlay: HashMap<String, String>,
) -> HashMap<String, String> {
    base.extend(overlay);
    base
}

/// Distinct headsign strings, longest first (ties alphabetical).
pub fn distinct_headsigns(headsigns: &HashMap<String, String>) -> Vec<String> {
    let unique: HashSet<&str> = headsigns.values().map(String::as_str).collect();
    let mut sorted: Vec<String> = unique.into_iter().map(str::to_string).collect();
    sorted.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    sorted
}

/// Stop names and merged headsigns used to label predictions.
#[derive(Debug, Clone, Default)]
pub struct StaticData {
    pub stop_names: HashMap<String, String>,
    pub headsigns: HashMap<String, String>,
}

impl StaticData {
    /// Loads `stops.txt` and `trips.txt` from `base_dir`, then overlays
    /// `trips.txt` from `supplemental_dir` when it exists.
    #[tracing::instrument]
    pub fn load(base_dir: &Path, supplemental_dir: Option<&Path>) -> Result<Self> {
        let stop_names = load_stop_names(&base_dir.join("stops.txt"))?;
        let mut data = Self {
            stop_names,
            headsigns: load_headsigns(&base_dir.join("trips.txt"))?,
        };

        if let Some(dir) = supplemental_dir {
            data.overlay_headsigns(dir)?;
        }

        info!(
            stops = data.stop_names.len(),
            trips = data.headsigns.len(),
            "Static reference data loaded"
        );
        Ok(data)
    }

    /// Merges `trips.txt` from `dir` over the current headsigns. A missing
    /// file leaves the data untouched and returns `false`.
    pub fn overlay_headsigns(&mut self, dir: &Path) -> Result<bool> {
        let path: PathBuf = dir.join("trips.txt");
        if !path.exists() {
            debug!(path = %path.display(), "No supplemental trips file");
            return Ok(false);
        }
        let overlay = load_headsigns(&path)?;
        self.headsigns = merge(std::mem::take(&mut self.headsigns), overlay);
        Ok(true)
    }

    pub fn headsign(&self, trip_id: &str) -> Option<&str> {
        self.headsigns.get(trip_id).map(String::as_str)
    }

    pub fn stop_name(&self, stop_id: &str) -> Option<&str> {
        self.stop_names.get(stop_id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOPS: &str = "\
stop_id,stop_name,stop_lat,stop_lon,location_type,parent_station
R36,36 St,40.655144,-74.003549,1,
R36N,36 St,40.655144,-74.003549,,R36
R36S,36 St,40.655144,-74.003549,,R36
";

    const TRIPS: &str = "\
route_id,trip_id,service_id,trip_headsign,direction_id,shape_id
R,AFA24GEN-1038-Sunday-00_000600_1..S03R,Sunday,Bay Ridge-95 St,1,R..S03R
N,AFA24GEN-1038-Sunday-00_001000_N..N20R,Sunday,Astoria-Ditmars Blvd,0,N..N20R
";

    fn map(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_realtime_trip_id_strips_service_segment() {
        assert_eq!(
            realtime_trip_id("AFA24GEN-1038-Sunday-00_000600_1..S03R"),
            "000600_1..S03R"
        );
    }

    #[test]
    fn test_realtime_trip_id_without_underscore() {
        assert_eq!(realtime_trip_id("plain"), "plain");
    }

    #[test]
    fn test_stop_names() {
        let names = stop_names(STOPS.as_bytes()).unwrap();
        assert_eq!(names.len(), 3);
        assert_eq!(names["R36N"], "36 St");
    }

    #[test]
    fn test_headsigns_use_realtime_ids() {
        let map = headsigns(TRIPS.as_bytes()).unwrap();
        assert_eq!(map["000600_1..S03R"], "Bay Ridge-95 St");
        assert_eq!(map["001000_N..N20R"], "Astoria-Ditmars Blvd");
    }

    #[test]
    fn test_headsigns_missing_column() {
        let bad = "trip_id,route_id\nx_1,R\n";
        assert!(headsigns(bad.as_bytes()).is_err());
    }

    #[test]
    fn test_merge_overlay_wins() {
        let base = map(&[("000600_1..S03R", "A"), ("only_base", "X")]);
        let overlay = map(&[("000600_1..S03R", "B")]);

        let merged = merge(base, overlay);
        assert_eq!(merged["000600_1..S03R"], "B");
        assert_eq!(merged["only_base"], "X");
    }

    #[test]
    fn test_distinct_headsigns_longest_first() {
        let headsigns = map(&[("a", "Bay Ridge"), ("b", "Astoria-Ditmars Blvd"), ("c", "Bay Ridge")]);
        assert_eq!(
            distinct_headsigns(&headsigns),
            vec!["Astoria-Ditmars Blvd".to_string(), "Bay Ridge".to_string()]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_stop_names(Path::new("/nonexistent/stops.txt")).unwrap_err();
        assert!(err.to_string().contains("stops.txt"));
    }

    #[test]
    fn test_overlay_missing_dir_is_noop() {
        let mut data = StaticData {
            stop_names: HashMap::new(),
            headsigns: map(&[("t", "A")]),
        };
        assert!(!data.overlay_headsigns(Path::new("/nonexistent")).unwrap());
        assert_eq!(data.headsign("t"), Some("A"));
    }
}
