//! 產品模型

use serde::{Deserialize, Serialize};

use crate::Uom;

/// 產品（物料）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// 產品ID
    pub id: String,

    /// 產品名稱
    pub name: String,

    /// 預設單位（數量映射的基準單位）
    pub default_uom: Uom,
}

impl Product {
    /// 創建新的產品
    pub fn new(id: &str, name: &str, default_uom: Uom) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            default_uom,
        }
    }
}
