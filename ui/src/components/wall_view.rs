use std::sync::Arc;

use tokio::sync::watch;

use wishwall_common::navigation::guest_entry_url;
use wishwall_common::view::{wall_view, WallEntry};
use wishwall_store::LiveQuery;

use super::shared_state::{Board, LiveBoard};

pub const EMPTY_WALL: &str = "Santa is waiting for wishes...";
pub const SCAN_PROMPT: &str = "Scan & Send";

pub type WallBoard = Board<WallEntry>;

/// The public display: approved messages, newest first.
pub struct WallScreen {
    board: LiveBoard<WallEntry>,
    guest_link: String,
}

impl WallScreen {
    /// Start following `query`. `page_url` is the address this wall is shown
    /// at; the guest link is derived from it.
    pub fn open(query: Arc<dyn LiveQuery>, page_url: &str) -> Self {
        WallScreen {
            board: LiveBoard::open(query, wall_view),
            guest_link: guest_entry_url(page_url),
        }
    }

    /// Link encoded in the join QR code.
    pub fn guest_link(&self) -> &str {
        &self.guest_link
    }

    pub fn current(&self) -> WallBoard {
        self.board.current().clone()
    }

    pub fn changes(&self) -> watch::Receiver<WallBoard> {
        self.board.changes()
    }

    pub fn resync(&mut self) {
        self.board.resync();
    }

    pub fn close(&self) {
        self.board.close();
    }
}
