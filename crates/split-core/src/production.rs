//! 生產單模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Product, Uom};

/// 生產單狀態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductionState {
    /// 需求
    Request,
    /// 草稿
    #[default]
    Draft,
    /// 等待
    Waiting,
    /// 已分配
    Assigned,
    /// 生產中
    Running,
    /// 完成
    Done,
    /// 取消
    Cancelled,
}

impl ProductionState {
    /// 檢查是否允許拆分（拆分按鈕只在這些狀態可用）
    pub fn is_splittable(&self) -> bool {
        matches!(
            self,
            ProductionState::Request
                | ProductionState::Draft
                | ProductionState::Waiting
                | ProductionState::Assigned
        )
    }
}

/// 生產單
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionOrder {
    /// 生產單ID
    pub id: Uuid,

    /// 單號（拆分後為 "<原單號>-<序號>"）
    pub number: Option<String>,

    /// 生產的產品
    pub product: Option<Product>,

    /// 生產數量（以 `uom` 表示）
    pub quantity: Option<Decimal>,

    /// 數量單位
    pub uom: Option<Uom>,

    /// 狀態
    pub state: ProductionState,

    /// BOM
    pub bom_id: Option<String>,

    /// 倉庫
    pub warehouse_id: Option<String>,

    /// 生產庫位
    pub location_id: Option<String>,

    /// 計劃日期
    pub planned_date: Option<NaiveDate>,
}

impl ProductionOrder {
    /// 創建新的生產單（草稿狀態，尚未編號）
    pub fn new(product: Product, quantity: Decimal, uom: Uom) -> Self {
        Self {
            id: Uuid::new_v4(),
            number: None,
            product: Some(product),
            quantity: Some(quantity),
            uom: Some(uom),
            state: ProductionState::Draft,
            bom_id: None,
            warehouse_id: None,
            location_id: None,
            planned_date: None,
        }
    }

    /// 建構器模式：設置單號
    pub fn with_number(mut self, number: &str) -> Self {
        self.number = Some(number.to_string());
        self
    }

    /// 建構器模式：設置狀態
    pub fn with_state(mut self, state: ProductionState) -> Self {
        self.state = state;
        self
    }

    /// 建構器模式：設置 BOM
    pub fn with_bom_id(mut self, bom_id: &str) -> Self {
        self.bom_id = Some(bom_id.to_string());
        self
    }

    /// 建構器模式：設置倉庫與生產庫位
    pub fn with_warehouse(mut self, warehouse_id: &str, location_id: &str) -> Self {
        self.warehouse_id = Some(warehouse_id.to_string());
        self.location_id = Some(location_id.to_string());
        self
    }

    /// 建構器模式：設置計劃日期
    pub fn with_planned_date(mut self, date: NaiveDate) -> Self {
        self.planned_date = Some(date);
        self
    }

    /// 顯示名稱：有單號用單號，否則用ID
    pub fn rec_name(&self) -> String {
        self.number.clone().unwrap_or_else(|| self.id.to_string())
    }
}
