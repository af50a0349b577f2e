use crate::core::pipeline_model::{ColumnKey, PipelineColumn, PipelineModel};
use crate::domain::model::ApplicationId;
use std::collections::{HashMap, HashSet};

/// 單一欄位的勾選狀態，成員固定為建立時的欄位內容
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionTracker {
    key: ColumnKey,
    members: Vec<ApplicationId>,
    selected: HashSet<ApplicationId>,
}

impl SelectionTracker {
    pub fn new(column: &PipelineColumn) -> Self {
        Self {
            key: column.key,
            members: column.ids(),
            selected: HashSet::new(),
        }
    }

    pub fn key(&self) -> ColumnKey {
        self.key
    }

    pub fn contains(&self, id: ApplicationId) -> bool {
        self.members.contains(&id)
    }

    /// 切換單一成員，回傳新的勾選狀態；不屬於本欄位的 id 一律拒絕
    pub fn toggle(&mut self, id: ApplicationId) -> Option<bool> {
        if !self.contains(id) {
            tracing::warn!("☑️ {}: ignoring toggle for non-member {}", self.key, id);
            return None;
        }
        if self.selected.remove(&id) {
            Some(false)
        } else {
            self.selected.insert(id);
            Some(true)
        }
    }

    /// 直接設定單一成員的勾選狀態，重複設定結果相同
    pub fn set(&mut self, id: ApplicationId, selected: bool) -> Option<bool> {
        if !self.contains(id) {
            tracing::warn!("☑️ {}: ignoring selection of non-member {}", self.key, id);
            return None;
        }
        if selected {
            self.selected.insert(id);
        } else {
            self.selected.remove(&id);
        }
        Some(selected)
    }

    pub fn select_all(&mut self, applied: bool) {
        if applied {
            self.selected = self.members.iter().copied().collect();
        } else {
            self.selected.clear();
        }
    }

    pub fn is_all_selected(&self) -> bool {
        !self.members.is_empty() && self.members.iter().all(|id| self.selected.contains(id))
    }

    /// 依欄位順序回傳目前勾選的 id
    pub fn selected(&self) -> Vec<ApplicationId> {
        self.members
            .iter()
            .copied()
            .filter(|id| self.selected.contains(id))
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }
}

/// 整個 Pipeline 的勾選狀態：每個欄位一個 tracker，重建時整組丟棄
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionBoard {
    trackers: HashMap<ColumnKey, SelectionTracker>,
}

impl SelectionBoard {
    pub fn for_model(model: &PipelineModel) -> Self {
        let trackers = model
            .columns()
            .map(|column| (column.key, SelectionTracker::new(column)))
            .collect();
        Self { trackers }
    }

    pub fn tracker(&self, key: ColumnKey) -> Option<&SelectionTracker> {
        self.trackers.get(&key)
    }

    pub fn tracker_mut(&mut self, key: ColumnKey) -> Option<&mut SelectionTracker> {
        self.trackers.get_mut(&key)
    }

    pub fn total_selected(&self) -> usize {
        self.trackers.values().map(SelectionTracker::selected_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_selected() == 0
    }
}
