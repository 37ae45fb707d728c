//! 生產單拆分主流程

use rust_decimal::Decimal;
use split_core::{
    Direction, FactorConverter, ProductionOrder, ProductionState, ProductionStore,
    ProductionValues, Result, SplitConfig, SplitError, SplitRequest, StockMove, UomConverter,
};
use uuid::Uuid;

use crate::{product_key, MoveSplitter, QuantityMap, SplitKeyFn};

/// 生產單拆分器
pub struct ProductionSplitter<U: UomConverter = FactorConverter> {
    /// 單位換算服務
    converter: U,

    /// 拆分配置
    config: SplitConfig,

    /// 拆分鍵
    split_key: Box<SplitKeyFn>,
}

impl ProductionSplitter<FactorConverter> {
    /// 創建使用係數換算的拆分器
    pub fn new(config: SplitConfig) -> Self {
        Self::with_converter(FactorConverter, config)
    }
}

impl Default for ProductionSplitter<FactorConverter> {
    fn default() -> Self {
        Self::new(SplitConfig::default())
    }
}

impl<U: UomConverter> ProductionSplitter<U> {
    /// 創建使用指定換算服務的拆分器（預設以產品分組）
    pub fn with_converter(converter: U, config: SplitConfig) -> Self {
        Self {
            converter,
            config,
            split_key: Box::new(product_key),
        }
    }

    /// 建構器模式：設置拆分鍵
    pub fn with_split_key<F>(mut self, split_key: F) -> Self
    where
        F: Fn(&StockMove) -> String + Send + Sync + 'static,
    {
        self.split_key = Box::new(split_key);
        self
    }

    /// 獲取配置引用
    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// 獲取單位換算服務引用
    pub fn converter(&self) -> &U {
        &self.converter
    }

    /// 把生產單拆成每張 `request.quantity` 的多張生產單
    ///
    /// 未指定 `count` 時拆到餘量不足一張為止；指定時最多新增 `count` 張。
    /// 原生產單保留餘量，排在回傳結果的最後。
    /// 若原生產單的數量不大於目標數量，原樣回傳。
    ///
    /// 整個拆分在一個交易內完成，任何錯誤都會回滾。
    pub fn split(
        &self,
        store: &mut dyn ProductionStore,
        production_id: Uuid,
        request: &SplitRequest,
    ) -> Result<Vec<ProductionOrder>> {
        request.validate()?;

        let production = store.production(production_id)?;
        let (quantity, uom) = match (production.quantity, production.uom.as_ref()) {
            (Some(quantity), Some(uom)) if quantity > Decimal::ZERO => (quantity, uom),
            _ => return Err(SplitError::NoProductNorQuantity(production.rec_name())),
        };

        let initial = self
            .converter
            .compute_qty(uom, quantity, &request.uom, true)?;

        tracing::info!(
            "拆分生產單 {}：{} {} → 每張 {} {}，最多 {:?} 張",
            production.rec_name(),
            initial,
            request.uom.symbol,
            request.quantity,
            request.uom.symbol,
            request.count
        );

        if initial <= request.quantity {
            tracing::info!("生產單數量不大於目標數量，無需拆分");
            return Ok(vec![production]);
        }

        store.begin()?;
        match self.split_in_transaction(store, &production, initial, request) {
            Ok(productions) => {
                store.commit()?;
                tracing::info!(
                    "生產單 {} 拆分完成，共 {} 張",
                    production.rec_name(),
                    productions.len()
                );
                Ok(productions)
            }
            Err(e) => {
                tracing::error!("拆分生產單 {} 失敗，回滾: {}", production.rec_name(), e);
                if let Err(rollback_error) = store.rollback() {
                    tracing::error!("回滾失敗: {}", rollback_error);
                }
                Err(e)
            }
        }
    }

    fn split_in_transaction(
        &self,
        store: &mut dyn ProductionStore,
        production: &ProductionOrder,
        initial: Decimal,
        request: &SplitRequest,
    ) -> Result<Vec<ProductionOrder>> {
        let target = request.quantity;
        let rounding = request.uom.rounding;

        // Step 1: 每張新生產單應分得的投入/產出數量
        let input2qty = QuantityMap::scaled(
            &store.moves(production.id, Direction::Input)?,
            target,
            initial,
            &self.converter,
            &*self.split_key,
        )?;
        let output2qty = QuantityMap::scaled(
            &store.moves(production.id, Direction::Output)?,
            target,
            initial,
            &self.converter,
            &*self.split_key,
        )?;
        tracing::debug!(
            "拆分比例 {}/{}：投入 {} 種，產出 {} 種",
            target,
            initial,
            input2qty.len(),
            output2qty.len()
        );

        // Step 2: 單號
        let number = match &production.number {
            Some(number) => number.clone(),
            None => store.set_number(production.id)?,
        };
        let state = production.state;

        // Step 3: 逐張拆出新生產單（最後一刀在迴圈後處理）
        let mut suffix = self.config.first_child_suffix;
        let mut remainder = initial - target;
        let mut count = request.count.map(|count| count - 1);
        let mut children = Vec::new();

        while remainder - target >= rounding && count != Some(0) {
            children.push(self.split_child(
                store,
                production.id,
                self.config.format_number(&number, suffix),
                request,
                &input2qty,
                &output2qty,
            )?);
            remainder -= target;
            count = count.map(|count| count - 1);
            suffix += 1;
        }

        let remainder = if self.config.round_remainder {
            self.converter.round(remainder, &request.uom)
        } else {
            remainder
        };
        if remainder <= Decimal::ZERO {
            return Err(SplitError::InvariantViolation(format!(
                "生產單 {} 拆分後餘量為 {}",
                number, remainder
            )));
        }

        children.push(self.split_child(
            store,
            production.id,
            self.config.format_number(&number, suffix),
            request,
            &input2qty,
            &output2qty,
        )?);

        // Step 4: 原生產單保留餘量
        store.write_productions(
            &[production.id],
            &ProductionValues::new()
                .with_number(self.config.format_number(&number, self.config.remainder_suffix))
                .with_quantity(remainder)
                .with_uom(request.uom.clone()),
        )?;

        // Step 5: 所有數量寫完後才恢復狀態
        let ids: Vec<Uuid> = children
            .iter()
            .map(|child| child.id)
            .chain(std::iter::once(production.id))
            .collect();
        store.write_productions(&ids, &ProductionValues::new().with_state(state))?;

        ids.iter().map(|id| store.production(*id)).collect()
    }

    /// 複製生產單外殼並把應分得的庫存移動移過去
    fn split_child(
        &self,
        store: &mut dyn ProductionStore,
        original_id: Uuid,
        number: String,
        request: &SplitRequest,
        input2qty: &QuantityMap,
        output2qty: &QuantityMap,
    ) -> Result<ProductionOrder> {
        let child = store.copy_production(
            original_id,
            &ProductionValues::new()
                .with_number(number)
                .with_quantity(request.quantity)
                .with_uom(request.uom.clone())
                .with_state(ProductionState::Draft),
        )?;
        let child_name = child.rec_name();

        let splitter = MoveSplitter::new(&self.converter, &*self.split_key);
        for (direction, pending) in [(Direction::Input, input2qty), (Direction::Output, output2qty)] {
            let moves = store.moves(original_id, direction)?;
            let residual = splitter.split_moves(store, &moves, child.id, pending.clone(), direction)?;
            residual.ensure_satisfied(&child_name, direction)?;
        }

        tracing::debug!("新生產單 {}: {} {}", child_name, request.quantity, request.uom.symbol);
        Ok(child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use split_core::{MoveState, Product, StockMove, Uom};
    use split_store::MemoryStore;

    /// 產品每 1 單位需要 5 個 A、2 個 B，產出 1 個產品
    fn create_production(store: &mut MemoryStore, quantity: Decimal) -> Uuid {
        let unit = Uom::unit();
        let product = Product::new("PRODUCT", "Product", unit.clone());
        let production = ProductionOrder::new(product.clone(), quantity, unit.clone());
        let id = store.insert_production(production);

        let a = Product::new("COMPONENT-1", "Component 1", unit.clone());
        let b = Product::new("COMPONENT-2", "Component 2", unit.clone());
        store.insert_move(StockMove::input(a, quantity * dec!(5), unit.clone(), id));
        store.insert_move(StockMove::input(b, quantity * dec!(2), unit.clone(), id));
        store.insert_move(StockMove::output(product, quantity, unit, id));
        id
    }

    fn quantities(productions: &[ProductionOrder]) -> Vec<Decimal> {
        productions.iter().filter_map(|p| p.quantity).collect()
    }

    /// 按產品加總某張生產單在某方向上的移動數量
    fn totals(store: &MemoryStore, production_id: Uuid, direction: Direction) -> Vec<(String, Decimal)> {
        let mut totals: Vec<(String, Decimal)> = Vec::new();
        for stock_move in store.moves(production_id, direction).unwrap() {
            match totals.iter_mut().find(|(id, _)| *id == stock_move.product.id) {
                Some((_, quantity)) => *quantity += stock_move.quantity,
                None => totals.push((stock_move.product.id.clone(), stock_move.quantity)),
            }
        }
        totals.sort();
        totals
    }

    #[test]
    fn test_split_even() {
        let mut store = MemoryStore::new();
        let id = create_production(&mut store, dec!(10));

        let splitter = ProductionSplitter::new(SplitConfig::default());
        let productions = splitter
            .split(&mut store, id, &SplitRequest::new(dec!(5), Uom::unit()))
            .unwrap();

        assert_eq!(quantities(&productions), vec![dec!(5), dec!(5)]);
        let numbers: Vec<_> = productions.iter().filter_map(|p| p.number.clone()).collect();
        assert_eq!(numbers, vec!["1-02", "1-01"]);
        assert_eq!(productions.last().unwrap().id, id);
        assert!(!store.in_transaction());
    }

    #[test]
    fn test_no_split_when_target_not_smaller() {
        let mut store = MemoryStore::new();
        let id = create_production(&mut store, dec!(7));
        let before = store.production(id).unwrap();

        let splitter = ProductionSplitter::new(SplitConfig::default());
        let productions = splitter
            .split(&mut store, id, &SplitRequest::new(dec!(8), Uom::unit()))
            .unwrap();

        assert_eq!(productions, vec![before]);
        assert_eq!(store.productions().len(), 1);
        // 沒有分配單號
        assert_eq!(store.production(id).unwrap().number, None);
    }

    #[test]
    fn test_count_limits_new_productions() {
        let mut store = MemoryStore::new();
        let id = create_production(&mut store, dec!(20));

        let splitter = ProductionSplitter::new(SplitConfig::default());
        let productions = splitter
            .split(
                &mut store,
                id,
                &SplitRequest::new(dec!(5), Uom::unit()).with_count(1),
            )
            .unwrap();

        assert_eq!(quantities(&productions), vec![dec!(5), dec!(15)]);
    }

    #[test]
    fn test_keeps_existing_number_and_shell() {
        let mut store = MemoryStore::new();
        let id = create_production(&mut store, dec!(10));
        store
            .write_productions(
                &[id],
                &ProductionValues::new().with_number("MO-42".to_string()),
            )
            .unwrap();

        let splitter = ProductionSplitter::new(SplitConfig::default().with_suffix_width(3));
        let productions = splitter
            .split(&mut store, id, &SplitRequest::new(dec!(4), Uom::unit()))
            .unwrap();

        let numbers: Vec<_> = productions.iter().filter_map(|p| p.number.clone()).collect();
        assert_eq!(numbers, vec!["MO-42-002", "MO-42-003", "MO-42-001"]);
        assert_eq!(quantities(&productions), vec![dec!(4), dec!(4), dec!(2)]);
        assert!(productions.iter().all(|p| p.product.as_ref().map(|p| p.id.as_str()) == Some("PRODUCT")));
    }

    #[test]
    fn test_precondition_errors_do_not_touch_store() {
        let mut store = MemoryStore::new();
        let id = create_production(&mut store, dec!(10));
        let splitter = ProductionSplitter::new(SplitConfig::default());

        let kilogram = Uom::new("kg", "Kilogram", "Weight", dec!(1), dec!(0.01));
        assert!(matches!(
            splitter.split(&mut store, id, &SplitRequest::new(dec!(5), kilogram)),
            Err(SplitError::UomCategoryMismatch { .. })
        ));
        assert!(matches!(
            splitter.split(&mut store, id, &SplitRequest::new(dec!(0), Uom::unit())),
            Err(SplitError::InvalidQuantity(_))
        ));
        assert!(matches!(
            splitter.split(&mut store, Uuid::new_v4(), &SplitRequest::new(dec!(5), Uom::unit())),
            Err(SplitError::ProductionNotFound(_))
        ));

        store
            .write_productions(&[id], &ProductionValues::new().with_quantity(Decimal::ZERO))
            .unwrap();
        assert!(matches!(
            splitter.split(&mut store, id, &SplitRequest::new(dec!(5), Uom::unit())),
            Err(SplitError::NoProductNorQuantity(_))
        ));

        assert_eq!(store.productions().len(), 1);
        assert_eq!(store.all_moves().len(), 3);
    }

    #[test]
    fn test_unsatisfiable_quantity_rolls_back() {
        // 每張分得 1.5，捨入為 2，原有投入提早用完
        let mut store = MemoryStore::new();
        let unit = Uom::unit();
        let product = Product::new("PRODUCT", "Product", unit.clone());
        let id = store.insert_production(
            ProductionOrder::new(product, dec!(20), unit.clone()).with_state(ProductionState::Waiting),
        );
        let part = Product::new("PART", "Part", unit.clone());
        store.insert_move(
            StockMove::input(part, dec!(30), unit.clone(), id).with_state(MoveState::Assigned),
        );
        let productions_before = store.productions().to_vec();
        let moves_before = store.all_moves().to_vec();

        let splitter = ProductionSplitter::new(SplitConfig::default());
        let result = splitter.split(&mut store, id, &SplitRequest::new(dec!(1), unit));

        assert!(matches!(result, Err(SplitError::InvariantViolation(_))));
        assert_eq!(store.productions(), productions_before.as_slice());
        assert_eq!(store.all_moves(), moves_before.as_slice());
        assert!(!store.in_transaction());
    }

    #[test]
    fn test_remainder_rounding_is_configurable() {
        let mut store = MemoryStore::new();
        let tenth = Uom::new("u10", "Tenth", "Units", dec!(1), dec!(0.1));
        let product = Product::new("PRODUCT", "Product", tenth.clone());
        let id = store.insert_production(ProductionOrder::new(product, dec!(10), tenth.clone()));

        // 目標 9.99 不在精度 0.1 的格點上，餘量 0.01 捨入後為 0
        let rounded = ProductionSplitter::new(SplitConfig::default());
        let result = rounded.split(&mut store, id, &SplitRequest::new(dec!(9.99), tenth.clone()));
        assert!(matches!(result, Err(SplitError::InvariantViolation(_))));
        assert_eq!(store.productions().len(), 1);

        let exact = ProductionSplitter::new(SplitConfig::default().with_round_remainder(false));
        let productions = exact
            .split(&mut store, id, &SplitRequest::new(dec!(9.99), tenth))
            .unwrap();
        assert_eq!(quantities(&productions), vec![dec!(9.99), dec!(0.01)]);
    }

    #[rstest]
    #[case::even(dec!(10), dec!(5), vec![dec!(5), dec!(5)])]
    #[case::thirds(dec!(10), dec!(3), vec![dec!(3), dec!(3), dec!(3), dec!(1)])]
    #[case::sevenths(dec!(7), dec!(3), vec![dec!(3), dec!(3), dec!(1)])]
    #[case::thirteenths(dec!(13), dec!(5), vec![dec!(5), dec!(5), dec!(3)])]
    #[case::just_below_whole(dec!(27), dec!(26), vec![dec!(26), dec!(1)])]
    fn test_moves_follow_production_quantity(
        #[case] quantity: Decimal,
        #[case] target: Decimal,
        #[case] expected: Vec<Decimal>,
    ) {
        let mut store = MemoryStore::new();
        let id = create_production(&mut store, quantity);

        let splitter = ProductionSplitter::new(SplitConfig::default());
        let productions = splitter
            .split(&mut store, id, &SplitRequest::new(target, Uom::unit()))
            .unwrap();

        assert_eq!(quantities(&productions), expected);
        for production in &productions {
            let quantity = production.quantity.unwrap();
            assert_eq!(
                totals(&store, production.id, Direction::Input),
                vec![
                    ("COMPONENT-1".to_string(), quantity * dec!(5)),
                    ("COMPONENT-2".to_string(), quantity * dec!(2)),
                ]
            );
            assert_eq!(
                totals(&store, production.id, Direction::Output),
                vec![("PRODUCT".to_string(), quantity)]
            );
        }
    }

    #[test]
    fn test_non_terminating_share_across_moves() {
        // 每張應分得 10 × 3/7 + 25 × 3/7 = 15
        let mut store = MemoryStore::new();
        let unit = Uom::unit();
        let product = Product::new("PRODUCT", "Product", unit.clone());
        let id = store.insert_production(ProductionOrder::new(product.clone(), dec!(7), unit.clone()));
        let part = Product::new("COMPONENT-1", "Component 1", unit.clone());
        store.insert_move(StockMove::input(part.clone(), dec!(10), unit.clone(), id));
        store.insert_move(StockMove::input(part, dec!(25), unit.clone(), id));
        store.insert_move(StockMove::output(product, dec!(7), unit.clone(), id));

        let splitter = ProductionSplitter::new(SplitConfig::default());
        let productions = splitter
            .split(&mut store, id, &SplitRequest::new(dec!(3), unit))
            .unwrap();

        assert_eq!(quantities(&productions), vec![dec!(3), dec!(3), dec!(1)]);
        let inputs: Vec<_> = productions
            .iter()
            .map(|p| totals(&store, p.id, Direction::Input))
            .collect();
        assert_eq!(
            inputs,
            vec![
                vec![("COMPONENT-1".to_string(), dec!(15))],
                vec![("COMPONENT-1".to_string(), dec!(15))],
                vec![("COMPONENT-1".to_string(), dec!(5))],
            ]
        );
    }

    #[rstest]
    #[case::below_move_rounding(dec!(0.05), Decimal::ZERO)]
    #[case::above_move_rounding(dec!(0.5), dec!(0.05))]
    fn test_residual_measured_in_move_unit(#[case] glue: Decimal, #[case] per_child: Decimal) {
        // 膠的預設單位是克（精度 1），移動以公斤（精度 0.01）記錄
        let gram = Uom::new("g", "Gram", "Weight", dec!(0.001), dec!(1));
        let kilogram = Uom::new("kg", "Kilogram", "Weight", dec!(1), dec!(0.01));
        let unit = Uom::unit();

        let mut store = MemoryStore::new();
        let product = Product::new("PRODUCT", "Product", unit.clone());
        let id = store.insert_production(ProductionOrder::new(product, dec!(100), unit.clone()));
        let glue_product = Product::new("GLUE", "Glue", gram);
        store.insert_move(StockMove::input(glue_product, glue, kilogram, id));

        let splitter = ProductionSplitter::new(SplitConfig::default());
        let productions = splitter
            .split(&mut store, id, &SplitRequest::new(dec!(10), unit))
            .unwrap();

        let glue_total = |production_id: Uuid| -> Decimal {
            store
                .moves(production_id, Direction::Input)
                .unwrap()
                .iter()
                .map(|m| m.quantity)
                .sum()
        };
        assert_eq!(productions.len(), 10);
        let (original, children) = productions.split_last().unwrap();
        for child in children {
            assert_eq!(glue_total(child.id), per_child);
        }
        // 不足一個精度單位的部分留在原生產單
        assert_eq!(glue_total(original.id), dec!(0.05));
    }
}
