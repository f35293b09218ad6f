// ==========================================
// 动力电池供应链账本 - 电池/护照数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 键: battery/<batteryID>, passport/<passportID>, extraction/<batteryID>
// ==========================================

use crate::domain::battery::{Battery, BatteryPassport};
use crate::repository::error::RepositoryResult;
use crate::repository::record_store::{get_json, keys, scan_json, RecordStore, WriteBatch};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// 电池仓储
pub struct BatteryRepository {
    store: Arc<dyn RecordStore>,
}

impl BatteryRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    // ===== 电池 =====

    pub fn find_by_id(&self, battery_id: &str) -> RepositoryResult<Option<Battery>> {
        get_json(self.store.as_ref(), &keys::battery(battery_id))
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Battery>> {
        scan_json(self.store.as_ref(), keys::BATTERY)
    }

    /// 整体覆盖写（read-modify-write 的写半部）
    pub fn save(&self, battery: &Battery) -> RepositoryResult<()> {
        let mut batch = WriteBatch::new();
        Self::stage_battery(&mut batch, battery)?;
        self.store.put_batch(&batch)?;
        Ok(())
    }

    pub fn stage_battery(batch: &mut WriteBatch, battery: &Battery) -> RepositoryResult<()> {
        batch.put_json(keys::battery(&battery.battery_id), battery)
    }

    // ===== 护照 =====

    pub fn find_passport(&self, passport_id: &str) -> RepositoryResult<Option<BatteryPassport>> {
        get_json(self.store.as_ref(), &keys::passport(passport_id))
    }

    pub fn list_passports(&self) -> RepositoryResult<Vec<BatteryPassport>> {
        scan_json(self.store.as_ref(), keys::PASSPORT)
    }

    pub fn stage_passport(batch: &mut WriteBatch, passport: &BatteryPassport) -> RepositoryResult<()> {
        batch.put_json(keys::passport(&passport.passport_id), passport)
    }

    // ===== 拆解提取记录 =====

    pub fn find_extraction<T: DeserializeOwned>(&self, battery_id: &str) -> RepositoryResult<Option<T>> {
        get_json(self.store.as_ref(), &keys::extraction(battery_id))
    }

    pub fn stage_extraction<T: Serialize>(
        batch: &mut WriteBatch,
        battery_id: &str,
        record: &T,
    ) -> RepositoryResult<()> {
        batch.put_json(keys::extraction(battery_id), record)
    }

    pub fn commit(&self, batch: &WriteBatch) -> RepositoryResult<usize> {
        self.store.put_batch(batch)
    }
}
