pub mod filesystem;

pub use filesystem::RecordStore;
