//! 計量單位與數量換算

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Result, SplitError};

/// 計量單位（唯讀參考資料）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uom {
    /// 單位代號（如 "u"、"kg"）
    pub symbol: String,

    /// 單位名稱
    pub name: String,

    /// 單位類別，只有同類別的單位可以互相換算
    pub category: String,

    /// 換算係數：1 個本單位 = factor 個基準單位
    pub factor: Decimal,

    /// 最小有效增量（捨入精度）
    pub rounding: Decimal,

    /// 小數位數
    pub digits: u32,
}

impl Uom {
    /// 創建新的計量單位
    pub fn new(symbol: &str, name: &str, category: &str, factor: Decimal, rounding: Decimal) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            factor,
            rounding,
            digits: rounding.scale(),
        }
    }

    /// 「個」：精度 1 的計數單位
    pub fn unit() -> Self {
        Self::new("u", "Unit", "Units", Decimal::ONE, Decimal::ONE)
    }

    /// 建構器模式：設置小數位數
    pub fn with_digits(mut self, digits: u32) -> Self {
        self.digits = digits;
        self
    }

    /// 捨入到本單位的精度（銀行家捨入）
    pub fn round(&self, quantity: Decimal) -> Decimal {
        if self.rounding.is_zero() {
            return quantity;
        }
        ((quantity / self.rounding).round() * self.rounding).round_dp(self.digits)
    }

    /// 檢查是否與另一單位同類別
    pub fn same_category(&self, other: &Uom) -> bool {
        self.category == other.category
    }
}

/// 單位換算服務
pub trait UomConverter {
    /// 將數量從 `from` 單位換算到 `to` 單位，`round` 為 true 時按目標單位捨入
    fn compute_qty(&self, from: &Uom, quantity: Decimal, to: &Uom, round: bool) -> Result<Decimal>;

    /// 捨入到單位精度
    fn round(&self, quantity: Decimal, uom: &Uom) -> Decimal {
        uom.round(quantity)
    }
}

/// 以換算係數實現的單位換算
#[derive(Debug, Clone, Copy, Default)]
pub struct FactorConverter;

impl UomConverter for FactorConverter {
    fn compute_qty(&self, from: &Uom, quantity: Decimal, to: &Uom, round: bool) -> Result<Decimal> {
        if !from.same_category(to) {
            return Err(SplitError::UomCategoryMismatch {
                from: from.symbol.clone(),
                from_category: from.category.clone(),
                to: to.symbol.clone(),
                to_category: to.category.clone(),
            });
        }

        let amount = if from == to {
            quantity
        } else {
            quantity * from.factor / to.factor
        };

        Ok(if round { to.round(amount) } else { amount })
    }
}
