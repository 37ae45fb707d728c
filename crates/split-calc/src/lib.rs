//! # Split Calculation Engine
//!
//! 生產單拆分引擎：按目標數量拆分生產單，並按比例分配投入與產出的庫存移動

pub mod move_splitter;
pub mod permit;
pub mod production_splitter;
pub mod quantity_map;
pub mod wizard;

// Re-export 主要類型
pub use move_splitter::{MoveAction, MoveSplitter};
pub use permit::EditPermit;
pub use production_splitter::ProductionSplitter;
pub use quantity_map::{PendingQuantity, QuantityMap};
pub use wizard::{SplitProductionWizard, SplitStart, WizardState};

use split_core::StockMove;

/// 拆分鍵：決定哪些庫存移動共用同一筆待分配數量
///
/// 同一個鍵下的移動應使用相同的預設單位。
pub type SplitKeyFn = dyn Fn(&StockMove) -> String + Send + Sync;

/// 預設拆分鍵：產品ID
pub fn product_key(stock_move: &StockMove) -> String {
    stock_move.product.id.clone()
}
