pub mod item;
pub mod reader;

pub use item::WorkItem;
pub use reader::{read_artists, read_items, read_song_pairs, InputMode};
