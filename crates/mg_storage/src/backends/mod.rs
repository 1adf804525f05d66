pub mod local;
pub mod memory;

#[cfg(feature = "gcs")]
pub mod gcs;

pub use local::LocalStorage;
pub use memory::MemoryStorage;

#[cfg(feature = "gcs")]
pub use gcs::GcsStorage;
