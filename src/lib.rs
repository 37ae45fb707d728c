//! # Production Split
//!
//! 按目標數量拆分生產單，並按比例分配投入與產出的庫存移動
//!
//! ```
//! use production_split::{
//!     MemoryStore, Product, ProductionOrder, ProductionSplitter, SplitConfig, SplitRequest,
//!     StockMove, Uom,
//! };
//! use rust_decimal::Decimal;
//!
//! let mut store = MemoryStore::new();
//! let product = Product::new("BIKE-001", "Bike", Uom::unit());
//! let id = store.insert_production(ProductionOrder::new(
//!     product.clone(),
//!     Decimal::from(10),
//!     Uom::unit(),
//! ));
//! store.insert_move(StockMove::output(product, Decimal::from(10), Uom::unit(), id));
//!
//! let splitter = ProductionSplitter::new(SplitConfig::default());
//! let productions = splitter
//!     .split(&mut store, id, &SplitRequest::new(Decimal::from(5), Uom::unit()))
//!     .unwrap();
//! assert_eq!(productions.len(), 2);
//! ```

pub use split_calc::{
    product_key, EditPermit, MoveAction, MoveSplitter, PendingQuantity, ProductionSplitter,
    QuantityMap, SplitKeyFn, SplitProductionWizard, SplitStart, WizardState,
};
pub use split_core::{
    Direction, FactorConverter, MoveState, MoveValues, Product, ProductionOrder, ProductionState,
    ProductionStore, ProductionValues, Result, SplitConfig, SplitError, SplitRequest, StockMove,
    Uom, UomConverter,
};
pub use split_store::MemoryStore;
