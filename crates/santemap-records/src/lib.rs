pub mod migrations;
mod store;

pub use store::RecordStore;
