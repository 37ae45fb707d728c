//! 庫存移動模型（生產的投入與產出）

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Product, Uom};

/// 庫存移動狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveState {
    /// 暫存
    Staging,
    /// 草稿（唯一可修改數量的狀態）
    Draft,
    /// 已分配
    Assigned,
    /// 完成
    Done,
    /// 取消
    Cancelled,
}

impl MoveState {
    /// 檢查是否可修改數量
    pub fn is_editable(&self) -> bool {
        *self == MoveState::Draft
    }
}

/// 移動方向（對應生產單的關聯欄位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// 投入（`production_input`）
    Input,
    /// 產出（`production_output`）
    Output,
}

impl Direction {
    /// 關聯欄位名稱
    pub fn relation_field(&self) -> &'static str {
        match self {
            Direction::Input => "production_input",
            Direction::Output => "production_output",
        }
    }
}

/// 庫存移動
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMove {
    /// 移動ID
    pub id: Uuid,

    /// 產品
    pub product: Product,

    /// 數量（以 `uom` 表示）
    pub quantity: Decimal,

    /// 數量單位
    pub uom: Uom,

    /// 狀態
    pub state: MoveState,

    /// 作為投入所屬的生產單
    pub production_input: Option<Uuid>,

    /// 作為產出所屬的生產單
    pub production_output: Option<Uuid>,

    /// 來源庫位
    pub from_location: Option<String>,

    /// 目的庫位
    pub to_location: Option<String>,

    /// 單價
    pub unit_price: Option<Decimal>,
}

impl StockMove {
    /// 創建屬於生產單的庫存移動（草稿狀態）
    pub fn new(
        product: Product,
        quantity: Decimal,
        uom: Uom,
        direction: Direction,
        production_id: Uuid,
    ) -> Self {
        let mut stock_move = Self {
            id: Uuid::new_v4(),
            product,
            quantity,
            uom,
            state: MoveState::Draft,
            production_input: None,
            production_output: None,
            from_location: None,
            to_location: None,
            unit_price: None,
        };
        stock_move.set_production(direction, production_id);
        stock_move
    }

    /// 創建投入移動
    pub fn input(product: Product, quantity: Decimal, uom: Uom, production_id: Uuid) -> Self {
        Self::new(product, quantity, uom, Direction::Input, production_id)
    }

    /// 創建產出移動
    pub fn output(product: Product, quantity: Decimal, uom: Uom, production_id: Uuid) -> Self {
        Self::new(product, quantity, uom, Direction::Output, production_id)
    }

    /// 建構器模式：設置狀態
    pub fn with_state(mut self, state: MoveState) -> Self {
        self.state = state;
        self
    }

    /// 建構器模式：設置庫位
    pub fn with_locations(mut self, from_location: &str, to_location: &str) -> Self {
        self.from_location = Some(from_location.to_string());
        self.to_location = Some(to_location.to_string());
        self
    }

    /// 建構器模式：設置單價
    pub fn with_unit_price(mut self, unit_price: Decimal) -> Self {
        self.unit_price = Some(unit_price);
        self
    }

    /// 指定方向上所屬的生產單
    pub fn production(&self, direction: Direction) -> Option<Uuid> {
        match direction {
            Direction::Input => self.production_input,
            Direction::Output => self.production_output,
        }
    }

    /// 改寫指定方向的關聯欄位
    pub fn set_production(&mut self, direction: Direction, production_id: Uuid) {
        match direction {
            Direction::Input => self.production_input = Some(production_id),
            Direction::Output => self.production_output = Some(production_id),
        }
    }
}
