//! Countdown board: the rows a station sign shows for ranked predictions.
//!
//! Row 1 always shows the next train. Row 2 cycles through the remaining
//! predictions on each [`Board::rotate`].

use std::fmt;
use std::path::PathBuf;

use crate::predictions::Prediction;
use crate::static_data::StaticData;

/// Directory holding the route bullet SVGs.
pub const BULLET_DIR: &str = "bullets-cropped";

/// Shown when a trip has no known headsign.
pub const UNKNOWN_DESTINATION: &str = "Unknown";

/// Path of the route bullet icon for `route_id`.
pub fn bullet_icon(route_id: &str) -> PathBuf {
    PathBuf::from(BULLET_DIR).join(format!(
        "NYCS-bull-trans-{}.svg",
        route_id.to_uppercase()
    ))
}

pub fn countdown_label(minutes: i64) -> String {
    format!("{minutes} min")
}

/// One rendered line of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRow {
    /// 1-based rank of the prediction.
    pub rank: usize,
    pub route_id: String,
    pub destination: String,
    /// Whole minutes until arrival, never negative.
    pub minutes: i64,
    /// Set when the train is less than a minute away.
    pub highlight: bool,
}

impl BoardRow {
    pub fn new(rank: usize, prediction: &Prediction, data: &StaticData, now: i64) -> Self {
        let seconds = prediction.seconds_until(now).max(0);
        Self {
            rank,
            route_id: prediction.route_id.clone(),
            destination: data
                .headsign(&prediction.trip_id)
                .unwrap_or(UNKNOWN_DESTINATION)
                .to_string(),
            minutes: seconds / 60,
            highlight: seconds < 60,
        }
    }

    pub fn bullet_icon(&self) -> PathBuf {
        bullet_icon(&self.route_id)
    }
}

impl fmt::Display for BoardRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.highlight { '*' } else { ' ' };
        write!(
            f,
            "{marker}{}. ({}) {:<28} {:>7}",
            self.rank,
            self.route_id,
            self.destination,
            countdown_label(self.minutes)
        )
    }
}

/// Current predictions plus which secondary prediction is on display.
#[derive(Debug, Default)]
pub struct Board {
    predictions: Vec<Prediction>,
    secondary: usize,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in a freshly ranked list. The secondary row restarts at the
    /// second prediction.
    pub fn replace(&mut self, predictions: Vec<Prediction>) {
        self.predictions = predictions;
        self.secondary = 0;
    }

    /// Advances the secondary row to the next prediction, wrapping around.
    pub fn rotate(&mut self) {
        let candidates = self.predictions.len().saturating_sub(1);
        if candidates > 0 {
            self.secondary = (self.secondary + 1) % candidates;
        }
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    /// Rows currently visible: the next train, then the secondary one.
    pub fn rows(&self, data: &StaticData, now: i64) -> Vec<BoardRow> {
        let mut rows = Vec::with_capacity(2);
        if let Some(first) = self.predictions.first() {
            rows.push(BoardRow::new(1, first, data, now));
        }
        let rank = self.secondary + 2;
        if let Some(second) = self.predictions.get(rank - 1) {
            rows.push(BoardRow::new(rank, second, data, now));
        }
        rows
    }

    /// Renders a header naming the station at `stop_id`, then the visible
    /// rows separated by rule lines.
    pub fn render(&self, stop_id: &str, data: &StaticData, now: i64) -> String {
        let rule = "-".repeat(48);
        let mut out = String::new();
        out.push_str(data.stop_name(stop_id).unwrap_or(stop_id));
        out.push('\n');
        out.push_str(&rule);
        out.push('\n');
        for row in self.rows(data, now) {
            out.push_str(&row.to_string());
            out.push('\n');
            out.push_str(&rule);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const NOW: i64 = 1_700_000_000;

    fn prediction(trip_id: &str, route_id: &str, in_secs: i64) -> Prediction {
        Prediction {
            trip_id: trip_id.to_string(),
            route_id: route_id.to_string(),
            stop_id: "R36S".to_string(),
            arrival_time: NOW + in_secs,
        }
    }

    fn data() -> StaticData {
        StaticData {
            stop_names: HashMap::from([("R36".to_string(), "36 St".to_string())]),
            headsigns: HashMap::from([("t1".to_string(), "Bay Ridge-95 St".to_string())]),
        }
    }

    fn board() -> Board {
        let mut board = Board::new();
        board.replace(vec![
            prediction("t1", "r", 30),
            prediction("t2", "N", 250),
            prediction("t3", "W", 400),
            prediction("t4", "R", 700),
        ]);
        board
    }

    #[test]
    fn test_bullet_icon_uppercases_route() {
        assert_eq!(
            bullet_icon("r"),
            PathBuf::from("bullets-cropped/NYCS-bull-trans-R.svg")
        );
    }

    #[test]
    fn test_countdown_label() {
        assert_eq!(countdown_label(4), "4 min");
    }

    #[test]
    fn test_row_labels() {
        let rows = board().rows(&data(), NOW);

        assert_eq!(rows[0].destination, "Bay Ridge-95 St");
        assert_eq!(rows[0].minutes, 0);
        assert!(rows[0].highlight);
        assert_eq!(rows[1].destination, UNKNOWN_DESTINATION);
        assert_eq!(rows[1].minutes, 4);
        assert!(!rows[1].highlight);
    }

    #[test]
    fn test_rotate_cycles_secondary_row() {
        let mut board = board();
        let data = data();
        let secondary = |b: &Board| b.rows(&data, NOW)[1].rank;

        assert_eq!(secondary(&board), 2);
        board.rotate();
        assert_eq!(secondary(&board), 3);
        board.rotate();
        assert_eq!(secondary(&board), 4);
        board.rotate();
        assert_eq!(secondary(&board), 2);
        // first row never moves
        assert_eq!(board.rows(&data, NOW)[0].rank, 1);
    }

    #[test]
    fn test_replace_resets_rotation() {
        let mut board = board();
        board.rotate();
        board.replace(vec![prediction("t9", "R", 100), prediction("t8", "R", 200)]);

        let rows = board.rows(&data(), NOW);
        assert_eq!(rows[1].rank, 2);
    }

    #[test]
    fn test_rotate_single_prediction() {
        let mut board = Board::new();
        board.replace(vec![prediction("t1", "R", 100)]);
        board.rotate();
        assert_eq!(board.rows(&data(), NOW).len(), 1);
    }

    #[test]
    fn test_past_arrival_clamped() {
        let row = BoardRow::new(1, &prediction("t1", "R", -90), &data(), NOW);
        assert_eq!(row.minutes, 0);
    }

    #[test]
    fn test_render_empty_board() {
        assert_eq!(Board::new().render("R36", &data(), NOW).lines().count(), 2);
    }

    #[test]
    fn test_render_header_names_station() {
        let text = board().render("R36", &data(), NOW);
        assert_eq!(text.lines().next(), Some("36 St"));
        // unknown stops fall back to the id
        let text = board().render("X99", &data(), NOW);
        assert_eq!(text.lines().next(), Some("X99"));
    }

    #[test]
    fn test_render_contains_rows() {
        let text = board().render("R36", &data(), NOW);
        assert!(text.contains("1. (r) Bay Ridge-95 St"));
        assert!(text.contains("4 min"));
    }
}
