// ==========================================
// 动力电池供应链账本 - 原材料数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 键: material/<id>, usage/<id>, consumption/<requestID>
// ==========================================

use crate::domain::material::{ConsumptionMarker, MaterialRecord, UsageCounter};
use crate::repository::error::RepositoryResult;
use crate::repository::record_store::{get_json, keys, scan_json, RecordStore, WriteBatch};
use std::sync::Arc;

/// 原材料仓储
/// 职责: 原材料记录、累计消耗计数、幂等消耗标记的读写
pub struct MaterialRepository {
    store: Arc<dyn RecordStore>,
}

impl MaterialRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    // ===== 原材料记录 =====

    pub fn find_by_id(&self, material_id: &str) -> RepositoryResult<Option<MaterialRecord>> {
        get_json(self.store.as_ref(), &keys::material(material_id))
    }

    /// 全量查询（按 materialID 升序，损坏记录跳过）
    pub fn list_all(&self) -> RepositoryResult<Vec<MaterialRecord>> {
        scan_json(self.store.as_ref(), keys::MATERIAL)
    }

    pub fn save(&self, record: &MaterialRecord) -> RepositoryResult<()> {
        let mut batch = WriteBatch::new();
        Self::stage_record(&mut batch, record)?;
        self.store.put_batch(&batch)?;
        Ok(())
    }

    /// 将记录加入批次（由引擎统一提交）
    pub fn stage_record(batch: &mut WriteBatch, record: &MaterialRecord) -> RepositoryResult<()> {
        batch.put_json(keys::material(&record.material_id), record)
    }

    // ===== 累计消耗计数 =====

    /// 读取累计消耗（不存在视为 0）
    pub fn usage_of(&self, material_id: &str) -> RepositoryResult<UsageCounter> {
        Ok(get_json(self.store.as_ref(), &keys::usage(material_id))?.unwrap_or_else(UsageCounter::zero))
    }

    pub fn stage_usage(
        batch: &mut WriteBatch,
        material_id: &str,
        counter: &UsageCounter,
    ) -> RepositoryResult<()> {
        batch.put_json(keys::usage(material_id), counter)
    }

    // ===== 幂等消耗标记 =====

    pub fn find_consumption(&self, request_id: &str) -> RepositoryResult<Option<ConsumptionMarker>> {
        get_json(self.store.as_ref(), &keys::consumption(request_id))
    }

    pub fn stage_consumption(batch: &mut WriteBatch, marker: &ConsumptionMarker) -> RepositoryResult<()> {
        batch.put_json(keys::consumption(&marker.request_id), marker)
    }

    /// 原子提交批次
    pub fn commit(&self, batch: &WriteBatch) -> RepositoryResult<usize> {
        self.store.put_batch(batch)
    }
}
