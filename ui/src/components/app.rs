use std::sync::Arc;

use tracing::info;

use wishwall_common::error::Result;
use wishwall_common::identity::Session;
use wishwall_common::navigation::{MenuEntry, Screen};
use wishwall_store::{ClientConfig, LiveQuery, MemoryRoom, MessageStore, RemoteStore};

use super::admin_view::AdminScreen;
use super::guest_view::GuestScreen;
use super::wall_view::WallScreen;

/// Entry point shared by the three screens.
///
/// An `App` only exists once an identity is established, so every screen it
/// opens can read and write the room.
pub struct App {
    store: Arc<dyn MessageStore>,
    query: Arc<dyn LiveQuery>,
    session: Option<Session>,
    initial: Screen,
}

impl App {
    /// Sign in to the node and pick the first screen from `query_string`.
    pub async fn connect(config: ClientConfig, query_string: &str) -> Result<Self> {
        let remote = Arc::new(RemoteStore::connect(config).await?);
        let session = remote.session().clone();
        Ok(App {
            store: remote.clone(),
            query: remote,
            session: Some(session),
            initial: Screen::from_query(query_string),
        })
    }

    /// Run against a room in this process.
    pub fn local(room: MemoryRoom, query_string: &str) -> Self {
        info!(room = %room.room(), "Using in-process room");
        let room = Arc::new(room);
        App {
            store: room.clone(),
            query: room,
            session: None,
            initial: Screen::from_query(query_string),
        }
    }

    pub fn initial_screen(&self) -> Screen {
        self.initial
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn room(&self) -> &str {
        self.store.room()
    }

    pub fn menu(&self) -> &'static [MenuEntry] {
        Screen::menu()
    }

    pub fn guest(&self) -> GuestScreen {
        GuestScreen::new(Arc::clone(&self.store))
    }

    pub fn wall(&self, page_url: &str) -> WallScreen {
        WallScreen::open(Arc::clone(&self.query), page_url)
    }

    pub fn admin(&self) -> AdminScreen {
        AdminScreen::open(Arc::clone(&self.store), Arc::clone(&self.query))
    }
}
