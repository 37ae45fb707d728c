//! 拆分配置與拆分請求

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Result, SplitError, Uom};

/// 拆分參數配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// 單號序號的位數（2 → "-01"）
    pub suffix_width: usize,

    /// 原生產單（保留餘量）使用的序號
    pub remainder_suffix: u32,

    /// 第一張新生產單使用的序號
    pub first_child_suffix: u32,

    /// 是否將餘量捨入到目標單位精度
    /// - true: 餘量與目標單位精度一致（預設）
    /// - false: 保留精確運算結果
    pub round_remainder: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            suffix_width: 2,
            remainder_suffix: 1,
            first_child_suffix: 2,
            round_remainder: true,
        }
    }
}

impl SplitConfig {
    /// 從 JSON 讀取配置，未提供的欄位使用預設值
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SplitError::InvalidConfig(e.to_string()))
    }

    /// 建構器模式：設置序號位數
    pub fn with_suffix_width(mut self, width: usize) -> Self {
        self.suffix_width = width;
        self
    }

    /// 建構器模式：設置是否捨入餘量
    pub fn with_round_remainder(mut self, round: bool) -> Self {
        self.round_remainder = round;
        self
    }

    /// 組合拆分後的單號
    pub fn format_number(&self, root: &str, suffix: u32) -> String {
        format!("{}-{:0width$}", root, suffix, width = self.suffix_width)
    }
}

/// 拆分請求：目標數量、目標單位與最多拆分次數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitRequest {
    /// 每張生產單的目標數量（以 `uom` 表示）
    pub quantity: Decimal,

    /// 目標單位
    pub uom: Uom,

    /// 最多新增的生產單數量（None 表示拆到餘量不足為止）
    pub count: Option<u32>,
}

impl SplitRequest {
    /// 創建新的拆分請求
    pub fn new(quantity: Decimal, uom: Uom) -> Self {
        Self {
            quantity,
            uom,
            count: None,
        }
    }

    /// 建構器模式：設置最多拆分次數
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// 檢查請求參數
    pub fn validate(&self) -> Result<()> {
        if self.quantity <= Decimal::ZERO {
            return Err(SplitError::InvalidQuantity(self.quantity));
        }
        if let Some(count) = self.count {
            if count == 0 {
                return Err(SplitError::InvalidCount(count));
            }
        }
        Ok(())
    }
}
