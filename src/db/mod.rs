//! Persistence module split across logical submodules: the document store for
//! songs, the realtime key-value store for shared state, and the pollers that
//! turn both into subscriptions.

mod connection;
mod documents;
mod realtime;
mod songs;
mod watch;

pub use connection::{data_dir, default_db_path, ensure_schema, open_connection};
pub use documents::{get_document, insert_document, query_documents};
pub use realtime::{read_value, write_value, RealtimePath, LIVE_KEY, PREVIEW_KEY};
pub use songs::{create_song, fetch_songs, get_song, song_from_document, SONGS_COLLECTION};
pub use watch::{watch_songs, watch_value, Subscription};
