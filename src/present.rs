//! Presentation collaborator interface.
//!
//! The library never renders anything itself. A [`RoomPresenter`] owns the
//! room table and the statistics panel; [`crate::upload::parse_upload`] tells
//! it to clear both before a new parse and hands it the results afterwards.

use crate::output::RoomRecord;
use crate::stats::RoomStats;

pub trait RoomPresenter {
    /// Remove any previously displayed room table.
    fn clear_table(&mut self);

    /// Remove any previously displayed statistics.
    fn clear_stats(&mut self);

    /// Display a freshly extracted room list.
    fn show_rooms(&mut self, rooms: &[RoomRecord]);

    /// Display statistics for the room list.
    fn show_stats(&mut self, stats: &RoomStats);

    /// Tell the user something went wrong before parsing started.
    fn alert(&mut self, message: &str) {
        let _ = message;
    }
}
