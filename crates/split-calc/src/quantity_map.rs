//! 待分配數量映射

use rust_decimal::Decimal;
use serde::Serialize;
use split_core::{Direction, Result, SplitError, StockMove, Uom, UomConverter};
use std::collections::HashMap;

use crate::SplitKeyFn;

/// 某個拆分鍵尚待移到新生產單的數量（以產品預設單位表示）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingQuantity {
    pub quantity: Decimal,
    pub uom: Uom,
    /// 因不足某筆移動的精度而留在原生產單的上限（同樣以產品預設單位表示）
    pub tolerance: Decimal,
}

/// 比較待分配數量前保留的小數位數，吸收 28 位有效數字的除法截斷
pub const QUANTITY_DIGITS: u32 = 20;

/// 拆分鍵 → 待分配數量
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuantityMap {
    entries: HashMap<String, PendingQuantity>,
}

impl QuantityMap {
    /// 創建空的映射
    pub fn new() -> Self {
        Self::default()
    }

    /// 按 `target / initial` 的比例建立每張新生產單應分得的數量
    ///
    /// 先乘後除，且不做捨入，避免多次拆分時誤差累積。
    pub fn scaled(
        moves: &[StockMove],
        target: Decimal,
        initial: Decimal,
        converter: &dyn UomConverter,
        split_key: &SplitKeyFn,
    ) -> Result<Self> {
        let mut map = Self::new();
        for stock_move in moves {
            let default_uom = &stock_move.product.default_uom;
            let quantity = converter.compute_qty(
                &stock_move.uom,
                stock_move.quantity * target / initial,
                default_uom,
                false,
            )?;
            map.add(split_key(stock_move), quantity, default_uom);
        }
        Ok(map)
    }

    /// 累加數量
    pub fn add(&mut self, key: String, quantity: Decimal, uom: &Uom) {
        self.entries
            .entry(key)
            .and_modify(|pending| pending.quantity += quantity)
            .or_insert_with(|| PendingQuantity {
                quantity,
                uom: uom.clone(),
                tolerance: Decimal::ZERO,
            });
    }

    /// 記錄某筆移動因精度不足而沒有分出的上限，取最大值
    pub fn tolerate(&mut self, key: &str, quantity: Decimal) {
        if let Some(pending) = self.entries.get_mut(key) {
            pending.tolerance = pending.tolerance.max(quantity);
        }
    }

    pub fn get(&self, key: &str) -> Option<&PendingQuantity> {
        self.entries.get(key)
    }

    /// 待分配數量，不存在的鍵視為 0
    pub fn quantity(&self, key: &str) -> Decimal {
        self.entries
            .get(key)
            .map(|pending| pending.quantity)
            .unwrap_or(Decimal::ZERO)
    }

    /// 扣減待分配數量（可能變為負數：整筆移動略多於所需）
    pub fn consume(&mut self, key: &str, quantity: Decimal) {
        if let Some(pending) = self.entries.get_mut(key) {
            pending.quantity -= quantity;
        }
    }

    /// 標記為已滿足
    pub fn settle(&mut self, key: &str) {
        if let Some(pending) = self.entries.get_mut(key) {
            pending.quantity = Decimal::ZERO;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 仍有至少一個精度單位未滿足、且不是因移動精度而留下的鍵（按鍵排序）
    pub fn unsatisfied(&self) -> Vec<(&str, &PendingQuantity)> {
        let mut unsatisfied: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, pending)| {
                pending.quantity.round_dp(QUANTITY_DIGITS)
                    >= pending.uom.rounding.max(pending.tolerance)
            })
            .map(|(key, pending)| (key.as_str(), pending))
            .collect();
        unsatisfied.sort_by(|a, b| a.0.cmp(b.0));
        unsatisfied
    }

    /// 所有鍵都已滿足，否則為數量帳目錯誤
    pub fn ensure_satisfied(&self, production: &str, direction: Direction) -> Result<()> {
        let unsatisfied = self.unsatisfied();
        if unsatisfied.is_empty() {
            return Ok(());
        }

        let detail = unsatisfied
            .iter()
            .map(|(key, pending)| format!("{}={} {}", key, pending.quantity, pending.uom.symbol))
            .collect::<Vec<_>>()
            .join(", ");
        Err(SplitError::InvariantViolation(format!(
            "生產單 {} 的 {} 無法分得足夠數量: {}",
            production,
            direction.relation_field(),
            detail
        )))
    }
}
