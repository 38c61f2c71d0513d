pub mod browser;
pub mod orchestrator;
pub mod profile;
pub mod rankings;
pub mod record;
pub mod roster;
pub mod text;
pub mod timeline;
pub mod validate;
pub mod writer;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use record::PlayerRecord;
