//! 庫存移動拆分
//!
//! 把原生產單在某一方向（投入或產出）上的庫存移動，按待分配數量分到新生產單：
//! - 待分配數量不足一個精度單位：移動留在原生產單，該數量不視為缺口
//! - 移動數量與待分配數量相差不足一個精度單位：整筆移到新生產單（不拆碎）
//! - 否則：拆出待分配數量到新生產單，原移動保留其餘數量

use rust_decimal::Decimal;
use serde::Serialize;
use split_core::{
    Direction, MoveState, MoveValues, ProductionStore, Result, StockMove, UomConverter,
};
use uuid::Uuid;

use crate::quantity_map::QUANTITY_DIGITS;
use crate::{EditPermit, QuantityMap, SplitKeyFn};

/// 單筆庫存移動的處理方式（留在原生產單的移動不產生動作）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MoveAction {
    /// 整筆移到新生產單
    Reassign { move_id: Uuid },

    /// 拆出 `quantity` 到新生產單，原移動保留 `remaining`
    Split {
        move_id: Uuid,
        state: MoveState,
        quantity: Decimal,
        remaining: Decimal,
    },
}

/// 庫存移動拆分器
pub struct MoveSplitter<'a> {
    converter: &'a dyn UomConverter,
    split_key: &'a SplitKeyFn,
}

impl<'a> MoveSplitter<'a> {
    pub fn new(converter: &'a dyn UomConverter, split_key: &'a SplitKeyFn) -> Self {
        Self {
            converter,
            split_key,
        }
    }

    /// 規劃每筆移動的處理方式，並從 `pending` 扣減已分配的數量
    pub fn plan(&self, moves: &[StockMove], pending: &mut QuantityMap) -> Result<Vec<MoveAction>> {
        let mut actions = Vec::new();

        for stock_move in moves {
            let key = (self.split_key)(stock_move);
            let Some(owed) = pending.get(&key) else {
                continue;
            };
            let canonical_uom = owed.uom.clone();
            let pending_qty = self
                .converter
                .compute_qty(&canonical_uom, owed.quantity, &stock_move.uom, false)?
                .round_dp(QUANTITY_DIGITS);
            let rounding = stock_move.uom.rounding;

            if pending_qty < rounding {
                let tolerance =
                    self.converter
                        .compute_qty(&stock_move.uom, rounding, &canonical_uom, false)?;
                pending.tolerate(&key, tolerance);
                continue;
            }

            if stock_move.quantity - pending_qty < rounding {
                let moved = self.converter.compute_qty(
                    &stock_move.uom,
                    stock_move.quantity,
                    &canonical_uom,
                    false,
                )?;
                pending.consume(&key, moved);
                actions.push(MoveAction::Reassign {
                    move_id: stock_move.id,
                });
                continue;
            }

            pending.settle(&key);
            let quantity = self.converter.round(pending_qty, &stock_move.uom);
            let remaining = self
                .converter
                .round(stock_move.quantity - quantity, &stock_move.uom);
            actions.push(MoveAction::Split {
                move_id: stock_move.id,
                state: stock_move.state,
                quantity,
                remaining,
            });
        }

        Ok(actions)
    }

    /// 把 `moves` 中應分給 `target_id` 的數量移過去，回傳未能滿足的剩餘待分配數量
    pub fn split_moves(
        &self,
        store: &mut dyn ProductionStore,
        moves: &[StockMove],
        target_id: Uuid,
        mut pending: QuantityMap,
        direction: Direction,
    ) -> Result<QuantityMap> {
        let actions = self.plan(moves, &mut pending)?;
        let relation = MoveValues::new().with_production(direction, target_id);

        let mut reassigned = Vec::new();
        let mut quantity_writes = Vec::new();
        let mut permit = EditPermit::new();

        for action in &actions {
            match *action {
                MoveAction::Reassign { move_id } => reassigned.push(move_id),
                MoveAction::Split {
                    move_id,
                    state,
                    quantity,
                    remaining,
                } => {
                    let copy = store.copy_move(
                        move_id,
                        &relation
                            .clone()
                            .with_quantity(quantity)
                            .with_state(MoveState::Draft),
                    )?;
                    quantity_writes.push((move_id, remaining));
                    permit.add(move_id, Some(copy.id), state);
                }
            }
        }

        permit.scoped(store, |store| {
            if !reassigned.is_empty() {
                store.write_moves(&reassigned, &relation)?;
            }
            for (move_id, remaining) in &quantity_writes {
                store.write_moves(&[*move_id], &MoveValues::new().with_quantity(*remaining))?;
            }
            Ok(())
        })?;

        tracing::debug!(
            "{}: 整筆移動 {} 筆，拆分 {} 筆 → 生產單 {}",
            direction.relation_field(),
            reassigned.len(),
            quantity_writes.len(),
            target_id
        );

        Ok(pending)
    }
}
