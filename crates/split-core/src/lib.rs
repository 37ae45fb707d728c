//! # Split Core
//!
//! 生產單拆分的核心資料模型與類型定義

pub mod config;
pub mod product;
pub mod production;
pub mod stock_move;
pub mod store;
pub mod uom;

// Re-export 主要類型
pub use config::{SplitConfig, SplitRequest};
pub use product::Product;
pub use production::{ProductionOrder, ProductionState};
pub use stock_move::{Direction, MoveState, StockMove};
pub use store::{MoveValues, ProductionStore, ProductionValues};
pub use uom::{FactorConverter, Uom, UomConverter};

use rust_decimal::Decimal;
use uuid::Uuid;

/// 拆分錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    #[error("生產單 {0} 沒有產品或數量，無法拆分")]
    NoProductNorQuantity(String),

    #[error("無效的拆分數量: {0}（必須大於 0）")]
    InvalidQuantity(Decimal),

    #[error("無效的拆分次數: {0}（必須至少為 1）")]
    InvalidCount(u32),

    #[error("單位類別不一致: {from} ({from_category}) → {to} ({to_category})")]
    UomCategoryMismatch {
        from: String,
        from_category: String,
        to: String,
        to_category: String,
    },

    #[error("配置錯誤: {0}")]
    InvalidConfig(String),

    #[error("缺少必要欄位: {0}")]
    MissingField(&'static str),

    #[error("生產單 {number} 的狀態 {state:?} 不允許拆分")]
    NotSplittable {
        number: String,
        state: ProductionState,
    },

    #[error("找不到生產單: {0}")]
    ProductionNotFound(Uuid),

    #[error("找不到庫存移動: {0}")]
    MoveNotFound(Uuid),

    #[error("庫存移動 {id} 的狀態為 {state:?}，只有草稿狀態可修改數量")]
    MoveNotEditable { id: Uuid, state: MoveState },

    #[error("交易錯誤: {0}")]
    Transaction(String),

    #[error("數量不變式被破壞: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, SplitError>;
