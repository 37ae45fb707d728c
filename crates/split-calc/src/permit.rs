//! 編輯許可
//!
//! 非草稿狀態的庫存移動不能修改數量。修改前先把它們轉回草稿，
//! 修改後（無論成功與否）把原移動及其拆出的副本恢復為原來的狀態。

use split_core::{MoveState, MoveValues, ProductionStore, Result};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct PermitEntry {
    original: Uuid,
    copy: Option<Uuid>,
    state: MoveState,
}

/// 一組庫存移動的暫時編輯許可
#[derive(Debug, Clone, Default)]
pub struct EditPermit {
    entries: Vec<PermitEntry>,
}

impl EditPermit {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登記需要修改數量的移動；草稿狀態的移動不需要許可
    pub fn add(&mut self, original: Uuid, copy: Option<Uuid>, state: MoveState) {
        if state.is_editable() {
            return;
        }
        self.entries.push(PermitEntry {
            original,
            copy,
            state,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 在許可範圍內執行修改
    pub fn scoped<T, F>(&self, store: &mut dyn ProductionStore, edit: F) -> Result<T>
    where
        F: FnOnce(&mut dyn ProductionStore) -> Result<T>,
    {
        if self.entries.is_empty() {
            return edit(store);
        }

        self.acquire(store)?;
        let outcome = edit(&mut *store);
        let released = self.release(store);

        match outcome {
            Ok(value) => released.map(|_| value),
            Err(e) => {
                if let Err(release_error) = released {
                    tracing::error!("恢復庫存移動狀態失敗: {}", release_error);
                }
                Err(e)
            }
        }
    }

    fn acquire(&self, store: &mut dyn ProductionStore) -> Result<()> {
        let originals: Vec<Uuid> = self.entries.iter().map(|e| e.original).collect();
        tracing::debug!("{} 筆庫存移動暫時轉為草稿", originals.len());
        store.write_moves(&originals, &MoveValues::new().with_state(MoveState::Draft))
    }

    fn release(&self, store: &mut dyn ProductionStore) -> Result<()> {
        let mut by_state: HashMap<MoveState, Vec<Uuid>> = HashMap::new();
        for entry in &self.entries {
            let ids = by_state.entry(entry.state).or_default();
            ids.push(entry.original);
            ids.extend(entry.copy);
        }

        for (state, ids) in by_state {
            store.write_moves(&ids, &MoveValues::new().with_state(state))?;
        }
        Ok(())
    }
}
