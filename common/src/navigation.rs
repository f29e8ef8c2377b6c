use serde::{Deserialize, Serialize};

/// Query parameter and value that open the guest screen directly.
pub const MODE_PARAM: &str = "mode";
pub const GUEST_MODE: &str = "guest";

/// The screens of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Landing,
    Guest,
    Wall,
    Admin,
}

/// A landing menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub screen: Screen,
    pub title: &'static str,
    pub description: &'static str,
}

const MENU: [MenuEntry; 3] = [
    MenuEntry {
        screen: Screen::Guest,
        title: "Guest Mode",
        description: "Scan QR to open this",
    },
    MenuEntry {
        screen: Screen::Wall,
        title: "Wall Mode",
        description: "The Giant Display",
    },
    MenuEntry {
        screen: Screen::Admin,
        title: "Admin Mode",
        description: "Moderator Dashboard",
    },
];

impl Screen {
    /// Initial screen for a query string such as `?mode=guest&x=1`.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let guest = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .any(|(key, value)| key == MODE_PARAM && value == GUEST_MODE);
        if guest {
            Screen::Guest
        } else {
            Screen::Landing
        }
    }

    /// Entries offered by the landing screen.
    pub fn menu() -> &'static [MenuEntry] {
        &MENU
    }
}

/// Link that opens the guest screen, derived from the page the wall is on.
///
/// Any existing query string or fragment is dropped.
pub fn guest_entry_url(current_url: &str) -> String {
    let base = current_url
        .split(['?', '#'])
        .next()
        .unwrap_or(current_url);
    format!("{base}?{MODE_PARAM}={GUEST_MODE}")
}
