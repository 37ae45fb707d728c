//! 生產單拆分示例
//!
//! 執行：`RUST_LOG=debug cargo run --example split_production`

use chrono::NaiveDate;
use production_split::{
    Direction, MemoryStore, MoveState, Product, ProductionOrder, ProductionSplitter,
    ProductionState, ProductionStore, SplitConfig, SplitProductionWizard, StockMove, Uom,
};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    println!("=== 生產單拆分示例 ===\n");

    let unit = Uom::unit();
    let bike = Product::new("BIKE-001", "Bike", unit.clone());
    let frame = Product::new("FRAME-001", "Frame", unit.clone());
    let wheel = Product::new("WHEEL-001", "Wheel", unit.clone());

    // 13 台自行車，已分配物料
    let mut store = MemoryStore::new();
    let planned_date = NaiveDate::from_ymd_opt(2025, 11, 1)
        .ok_or_else(|| anyhow::anyhow!("無效的日期"))?;
    let production_id = store.insert_production(
        ProductionOrder::new(bike.clone(), Decimal::from(13), unit.clone())
            .with_bom_id("BOM-BIKE")
            .with_warehouse("WH", "WH-PROD")
            .with_planned_date(planned_date)
            .with_state(ProductionState::Assigned),
    );
    store.insert_move(
        StockMove::input(frame, Decimal::from(13), unit.clone(), production_id)
            .with_locations("WH-STO", "WH-PROD")
            .with_state(MoveState::Assigned),
    );
    store.insert_move(
        StockMove::input(wheel, Decimal::from(26), unit.clone(), production_id)
            .with_locations("WH-STO", "WH-PROD")
            .with_state(MoveState::Assigned),
    );
    store.insert_move(
        StockMove::output(bike, Decimal::from(13), unit, production_id)
            .with_locations("WH-PROD", "WH-STO"),
    );

    // 透過精靈拆成每張 5 台
    let splitter = ProductionSplitter::new(SplitConfig::default());
    let mut wizard = SplitProductionWizard::new(&splitter, production_id);
    let mut start = wizard.default_start(&store)?;
    start.quantity = Some(Decimal::from(5));

    let productions = wizard.transition_split(&mut store, &start)?;

    println!("拆分結果:");
    for production in &productions {
        println!(
            "  - {}: {} {} ({:?})",
            production.rec_name(),
            production.quantity.unwrap_or_default(),
            production.uom.as_ref().map(|u| u.symbol.as_str()).unwrap_or(""),
            production.state
        );
        for direction in [Direction::Input, Direction::Output] {
            for stock_move in store.moves(production.id, direction)? {
                println!(
                    "      {} {}: {} ({:?})",
                    direction.relation_field(),
                    stock_move.product.id,
                    stock_move.quantity,
                    stock_move.state
                );
            }
        }
    }

    println!("\nJSON:");
    println!("{}", serde_json::to_string_pretty(&productions)?);

    Ok(())
}
