//! # Split Store
//!
//! 記憶體內的交易式持久化層（測試與示範用）

pub mod memory;

// Re-export 主要類型
pub use memory::MemoryStore;
