//! 拆分生產單精靈
//!
//! 兩個狀態：`Start` 收集目標數量、單位與次數，按下「拆分」後執行拆分並進入 `End`。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use split_core::{
    ProductionOrder, ProductionStore, Result, SplitError, SplitRequest, Uom, UomConverter,
};
use uuid::Uuid;

use crate::ProductionSplitter;

/// 精靈狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardState {
    Start,
    End,
}

/// 起始畫面欄位
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitStart {
    /// 最多新增的生產單數量
    pub count: Option<u32>,

    /// 每張生產單的數量
    pub quantity: Option<Decimal>,

    /// 數量單位（須與 `uom_category` 同類別）
    pub uom: Option<Uom>,

    /// 生產單單位的類別（唯讀）
    pub uom_category: Option<String>,
}

/// 拆分生產單精靈
pub struct SplitProductionWizard<'a, U: UomConverter> {
    splitter: &'a ProductionSplitter<U>,
    production_id: Uuid,
    state: WizardState,
}

impl<'a, U: UomConverter> SplitProductionWizard<'a, U> {
    /// 為指定生產單開啟精靈
    pub fn new(splitter: &'a ProductionSplitter<U>, production_id: Uuid) -> Self {
        Self {
            splitter,
            production_id,
            state: WizardState::Start,
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    /// 拆分按鈕是否可用
    pub fn is_split_allowed(production: &ProductionOrder) -> bool {
        production.state.is_splittable()
    }

    /// 起始畫面預設值：生產單的單位與其類別
    pub fn default_start(&self, store: &dyn ProductionStore) -> Result<SplitStart> {
        let production = store.production(self.production_id)?;
        let has_quantity = production
            .quantity
            .is_some_and(|quantity| quantity != Decimal::ZERO);
        if production.product.is_none() || !has_quantity {
            return Err(SplitError::NoProductNorQuantity(production.rec_name()));
        }

        let mut start = SplitStart::default();
        if let Some(uom) = production.uom {
            start.uom_category = Some(uom.category.clone());
            start.uom = Some(uom);
        }
        Ok(start)
    }

    /// 按下「拆分」：執行拆分並結束精靈
    pub fn transition_split(
        &mut self,
        store: &mut dyn ProductionStore,
        start: &SplitStart,
    ) -> Result<Vec<ProductionOrder>> {
        let production = store.production(self.production_id)?;
        if !Self::is_split_allowed(&production) {
            return Err(SplitError::NotSplittable {
                number: production.rec_name(),
                state: production.state,
            });
        }

        let quantity = start.quantity.ok_or(SplitError::MissingField("quantity"))?;
        let uom = start.uom.clone().ok_or(SplitError::MissingField("uom"))?;
        if let Some(category) = &start.uom_category {
            if &uom.category != category {
                return Err(SplitError::UomCategoryMismatch {
                    from: production
                        .uom
                        .as_ref()
                        .map(|u| u.symbol.clone())
                        .unwrap_or_default(),
                    from_category: category.clone(),
                    to: uom.symbol.clone(),
                    to_category: uom.category.clone(),
                });
            }
        }

        let mut request = SplitRequest::new(quantity, uom);
        if let Some(count) = start.count {
            request = request.with_count(count);
        }

        let productions = self.splitter.split(store, self.production_id, &request)?;
        self.state = WizardState::End;
        Ok(productions)
    }

    /// 按下「取消」
    pub fn cancel(&mut self) {
        self.state = WizardState::End;
    }
}
