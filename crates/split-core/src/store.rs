//! 持久化介面
//!
//! 拆分演算法只透過此介面讀寫生產單與庫存移動，
//! 交易的原子性（全部成功或全部回滾）由實作負責。

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{Direction, MoveState, ProductionOrder, ProductionState, Result, StockMove, Uom};

/// 生產單欄位更新值（None 表示不修改）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductionValues {
    pub number: Option<String>,
    pub quantity: Option<Decimal>,
    pub uom: Option<Uom>,
    pub state: Option<ProductionState>,
}

impl ProductionValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_number(mut self, number: String) -> Self {
        self.number = Some(number);
        self
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_uom(mut self, uom: Uom) -> Self {
        self.uom = Some(uom);
        self
    }

    pub fn with_state(mut self, state: ProductionState) -> Self {
        self.state = Some(state);
        self
    }

    /// 套用到生產單
    pub fn apply(&self, production: &mut ProductionOrder) {
        if let Some(number) = &self.number {
            production.number = Some(number.clone());
        }
        if let Some(quantity) = self.quantity {
            production.quantity = Some(quantity);
        }
        if let Some(uom) = &self.uom {
            production.uom = Some(uom.clone());
        }
        if let Some(state) = self.state {
            production.state = state;
        }
    }
}

/// 庫存移動欄位更新值（None 表示不修改）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveValues {
    /// 改寫關聯欄位：方向與新的生產單
    pub production: Option<(Direction, Uuid)>,
    pub quantity: Option<Decimal>,
    pub state: Option<MoveState>,
}

impl MoveValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_production(mut self, direction: Direction, production_id: Uuid) -> Self {
        self.production = Some((direction, production_id));
        self
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_state(mut self, state: MoveState) -> Self {
        self.state = Some(state);
        self
    }

    /// 套用到庫存移動
    pub fn apply(&self, stock_move: &mut StockMove) {
        if let Some((direction, production_id)) = self.production {
            stock_move.set_production(direction, production_id);
        }
        if let Some(quantity) = self.quantity {
            stock_move.quantity = quantity;
        }
        if let Some(state) = self.state {
            stock_move.state = state;
        }
    }
}

/// 生產單與庫存移動的持久化層
pub trait ProductionStore {
    /// 讀取生產單
    fn production(&self, id: Uuid) -> Result<ProductionOrder>;

    /// 讀取生產單在指定方向上目前關聯的庫存移動
    fn moves(&self, production_id: Uuid, direction: Direction) -> Result<Vec<StockMove>>;

    /// 為尚未編號的生產單分配單號
    fn set_number(&mut self, production_id: Uuid) -> Result<String>;

    /// 複製生產單外殼（不含庫存移動）並套用覆寫值
    fn copy_production(&mut self, id: Uuid, values: &ProductionValues) -> Result<ProductionOrder>;

    /// 複製庫存移動並套用覆寫值
    fn copy_move(&mut self, id: Uuid, values: &MoveValues) -> Result<StockMove>;

    /// 批次更新生產單
    fn write_productions(&mut self, ids: &[Uuid], values: &ProductionValues) -> Result<()>;

    /// 批次更新庫存移動
    fn write_moves(&mut self, ids: &[Uuid], values: &MoveValues) -> Result<()>;

    /// 開始交易
    fn begin(&mut self) -> Result<()>;

    /// 提交交易
    fn commit(&mut self) -> Result<()>;

    /// 回滾交易
    fn rollback(&mut self) -> Result<()>;
}
