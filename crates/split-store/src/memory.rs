//! 記憶體儲存
//!
//! 以快照實現交易：`begin` 保存整份資料，`rollback` 還原。
//! 與正式的庫存模組一樣，非草稿狀態的庫存移動不允許修改數量。

use split_core::{
    Direction, MoveState, MoveValues, ProductionOrder, ProductionState, ProductionStore,
    ProductionValues, Result, SplitError, StockMove,
};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct Tables {
    productions: Vec<ProductionOrder>,
    moves: Vec<StockMove>,
    last_number: u64,
}

/// 記憶體儲存
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Tables,
    snapshot: Option<Tables>,
}

impl MemoryStore {
    /// 創建空的儲存
    pub fn new() -> Self {
        Self::default()
    }

    /// 新增生產單
    pub fn insert_production(&mut self, production: ProductionOrder) -> Uuid {
        let id = production.id;
        self.tables.productions.push(production);
        id
    }

    /// 新增庫存移動
    pub fn insert_move(&mut self, stock_move: StockMove) -> Uuid {
        let id = stock_move.id;
        self.tables.moves.push(stock_move);
        id
    }

    /// 所有生產單（依建立順序）
    pub fn productions(&self) -> &[ProductionOrder] {
        &self.tables.productions
    }

    /// 所有庫存移動（依建立順序）
    pub fn all_moves(&self) -> &[StockMove] {
        &self.tables.moves
    }

    /// 讀取單筆庫存移動
    pub fn stock_move(&self, id: Uuid) -> Result<StockMove> {
        self.tables
            .moves
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(SplitError::MoveNotFound(id))
    }

    /// 是否有進行中的交易
    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    fn production_index(&self, id: Uuid) -> Result<usize> {
        self.tables
            .productions
            .iter()
            .position(|p| p.id == id)
            .ok_or(SplitError::ProductionNotFound(id))
    }

    fn move_index(&self, id: Uuid) -> Result<usize> {
        self.tables
            .moves
            .iter()
            .position(|m| m.id == id)
            .ok_or(SplitError::MoveNotFound(id))
    }
}

impl ProductionStore for MemoryStore {
    fn production(&self, id: Uuid) -> Result<ProductionOrder> {
        let index = self.production_index(id)?;
        Ok(self.tables.productions[index].clone())
    }

    fn moves(&self, production_id: Uuid, direction: Direction) -> Result<Vec<StockMove>> {
        self.production_index(production_id)?;
        Ok(self
            .tables
            .moves
            .iter()
            .filter(|m| m.production(direction) == Some(production_id))
            .cloned()
            .collect())
    }

    fn set_number(&mut self, production_id: Uuid) -> Result<String> {
        let index = self.production_index(production_id)?;
        if let Some(number) = &self.tables.productions[index].number {
            return Ok(number.clone());
        }

        self.tables.last_number += 1;
        let number = self.tables.last_number.to_string();
        self.tables.productions[index].number = Some(number.clone());
        tracing::debug!("生產單 {} 分配單號 {}", production_id, number);
        Ok(number)
    }

    fn copy_production(&mut self, id: Uuid, values: &ProductionValues) -> Result<ProductionOrder> {
        let index = self.production_index(id)?;
        let mut copy = self.tables.productions[index].clone();
        copy.id = Uuid::new_v4();
        copy.number = None;
        copy.state = ProductionState::default();
        values.apply(&mut copy);

        self.tables.productions.push(copy.clone());
        Ok(copy)
    }

    fn copy_move(&mut self, id: Uuid, values: &MoveValues) -> Result<StockMove> {
        let index = self.move_index(id)?;
        let mut copy = self.tables.moves[index].clone();
        copy.id = Uuid::new_v4();
        copy.state = MoveState::Draft;
        values.apply(&mut copy);

        self.tables.moves.push(copy.clone());
        Ok(copy)
    }

    fn write_productions(&mut self, ids: &[Uuid], values: &ProductionValues) -> Result<()> {
        let indexes = ids
            .iter()
            .map(|id| self.production_index(*id))
            .collect::<Result<Vec<_>>>()?;

        for index in indexes {
            values.apply(&mut self.tables.productions[index]);
        }
        Ok(())
    }

    fn write_moves(&mut self, ids: &[Uuid], values: &MoveValues) -> Result<()> {
        let indexes = ids
            .iter()
            .map(|id| self.move_index(*id))
            .collect::<Result<Vec<_>>>()?;

        // 整批檢查後才寫入，避免部分寫入
        if values.quantity.is_some() {
            for &index in &indexes {
                let stock_move = &self.tables.moves[index];
                if !stock_move.state.is_editable() {
                    return Err(SplitError::MoveNotEditable {
                        id: stock_move.id,
                        state: stock_move.state,
                    });
                }
            }
        }

        for index in indexes {
            values.apply(&mut self.tables.moves[index]);
        }
        Ok(())
    }

    fn begin(&mut self) -> Result<()> {
        if self.snapshot.is_some() {
            return Err(SplitError::Transaction("不支援巢狀交易".to_string()));
        }
        self.snapshot = Some(self.tables.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.snapshot
            .take()
            .map(|_| ())
            .ok_or_else(|| SplitError::Transaction("沒有進行中的交易".to_string()))
    }

    fn rollback(&mut self) -> Result<()> {
        let snapshot = self
            .snapshot
            .take()
            .ok_or_else(|| SplitError::Transaction("沒有進行中的交易".to_string()))?;
        self.tables = snapshot;
        tracing::debug!("交易已回滾");
        Ok(())
    }
}
