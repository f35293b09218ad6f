// ==========================================
// 动力电池供应链账本 - 原材料库存引擎
// ==========================================
// 职责: 登记 / 消耗 / 累计消耗计数 / 供应快照对账
// 红线: quantity 永不为负；availability 随每次写入重新派生
// 红线: 记录写入与累计计数在同一批次提交
// ==========================================

use crate::domain::material::{ConsumptionMarker, MaterialCatalog, MaterialRecord, UsageCounter};
use crate::domain::types::{MaterialOrigin, MaterialStatus, VerificationMark};
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::{MaterialRepository, WriteBatch};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// 幂等消耗结果
#[derive(Debug, Clone, PartialEq)]
pub enum ConsumeOutcome {
    /// 本次生效，返回更新后的记录
    Applied(MaterialRecord),
    /// 该 requestID 已处理过，状态未变
    AlreadyApplied(ConsumptionMarker),
}

/// 快照对账报告
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub applied: usize,
    pub skipped: usize,
    /// 因本地累计消耗而下调数量的 materialID
    pub adjusted: Vec<String>,
}

// ==========================================
// MaterialInventory - 原材料库存
// ==========================================
pub struct MaterialInventory {
    repo: Arc<MaterialRepository>,
}

impl MaterialInventory {
    pub fn new(repo: Arc<MaterialRepository>) -> Self {
        Self { repo }
    }

    // ==========================================
    // 写操作
    // ==========================================

    /// 登记新开采原材料
    pub fn register(
        &self,
        material_id: &str,
        supplier_id: &str,
        name: &str,
        quantity: u64,
    ) -> EngineResult<MaterialRecord> {
        self.register_lot(material_id, supplier_id, name, quantity, MaterialOrigin::New)
    }

    /// 登记原材料批次
    ///
    /// 已存在的 ID 做加法合并（数量累加、时间戳刷新），否则新建
    #[instrument(skip(self))]
    pub fn register_lot(
        &self,
        material_id: &str,
        supplier_id: &str,
        name: &str,
        quantity: u64,
        origin: MaterialOrigin,
    ) -> EngineResult<MaterialRecord> {
        if material_id.trim().is_empty() {
            return Err(EngineError::MalformedInput("materialID 不能为空".to_string()));
        }
        if quantity == 0 {
            return Err(EngineError::MalformedInput(format!(
                "登记数量必须大于 0: material_id={}",
                material_id
            )));
        }

        let record = match self.repo.find_by_id(material_id)? {
            Some(mut existing) => {
                existing.quantity = existing.quantity.saturating_add(quantity);
                existing.timestamp = Utc::now();
                existing.refresh_availability();
                existing
            }
            None => MaterialRecord::new_lot(material_id, supplier_id, name, quantity, origin),
        };

        self.repo.save(&record)?;
        info!(
            material_id = %record.material_id,
            quantity = record.quantity,
            origin = %record.origin,
            "原材料登记完成"
        );
        Ok(record)
    }

    /// 消耗原材料
    #[instrument(skip(self))]
    pub fn consume(&self, material_id: &str, amount: u64) -> EngineResult<MaterialRecord> {
        let mut record = self.load(material_id)?;
        let mut batch = WriteBatch::new();
        self.stage_consumption(&mut batch, &mut record, amount)?;
        self.repo.commit(&batch)?;

        info!(material_id, amount, remaining = record.quantity, "原材料消耗完成");
        Ok(record)
    }

    /// 幂等消耗：同一 requestID 只生效一次
    #[instrument(skip(self))]
    pub fn consume_once(
        &self,
        request_id: &str,
        material_id: &str,
        amount: u64,
    ) -> EngineResult<ConsumeOutcome> {
        if let Some(marker) = self.repo.find_consumption(request_id)? {
            debug!(request_id, "重复投递的消耗请求，跳过");
            return Ok(ConsumeOutcome::AlreadyApplied(marker));
        }

        let mut record = self.load(material_id)?;
        let mut batch = WriteBatch::new();
        self.stage_consumption(&mut batch, &mut record, amount)?;

        let marker = ConsumptionMarker {
            request_id: request_id.to_string(),
            material_id: material_id.to_string(),
            amount,
            applied_at: Utc::now(),
        };
        MaterialRepository::stage_consumption(&mut batch, &marker)?;
        self.repo.commit(&batch)?;

        info!(request_id, material_id, amount, "幂等消耗已生效");
        Ok(ConsumeOutcome::Applied(record))
    }

    /// 累加本地消耗计数
    pub fn record_usage(&self, material_id: &str, amount: u64) -> EngineResult<UsageCounter> {
        let mut counter = self.repo.usage_of(material_id)?;
        counter.increment(amount);

        let mut batch = WriteBatch::new();
        MaterialRepository::stage_usage(&mut batch, material_id, &counter)?;
        self.repo.commit(&batch)?;
        Ok(counter)
    }

    /// 按供应分区快照对账
    ///
    /// 本地数量 = 快照数量 − 本地累计消耗（饱和到 0），随后整体覆盖本地记录。
    /// 同一快照重复应用结果一致。
    #[instrument(skip(self, snapshot), fields(count = snapshot.len()))]
    pub fn reconcile_from_supply_snapshot(
        &self,
        snapshot: Vec<MaterialRecord>,
    ) -> EngineResult<ReconcileReport> {
        let mut report = ReconcileReport::default();
        let mut batch = WriteBatch::new();

        for mut record in snapshot {
            if record.material_id.trim().is_empty() {
                warn!("快照中存在空 materialID 记录，跳过");
                report.skipped += 1;
                continue;
            }

            let usage = self.repo.usage_of(&record.material_id)?;
            if usage.consumed > 0 {
                report.adjusted.push(record.material_id.clone());
            }
            record.quantity = record.quantity.saturating_sub(usage.consumed);
            record.refresh_availability();

            MaterialRepository::stage_record(&mut batch, &record)?;
            report.applied += 1;
        }

        self.repo.commit(&batch)?;
        info!(
            applied = report.applied,
            skipped = report.skipped,
            adjusted = report.adjusted.len(),
            "供应快照对账完成"
        );
        Ok(report)
    }

    /// 认证机构标记原材料为已认证
    pub fn verify_material(&self, material_id: &str) -> EngineResult<MaterialRecord> {
        let mut record = self.load(material_id)?;
        record.verified = VerificationMark::Verified;
        record.timestamp = Utc::now();
        self.repo.save(&record)?;

        info!(material_id, "原材料已认证");
        Ok(record)
    }

    // ==========================================
    // 读操作
    // ==========================================

    pub fn query(&self, material_id: &str) -> EngineResult<MaterialRecord> {
        self.load(material_id)
    }

    /// 全量查询（空 ID 记录跳过）
    pub fn query_all(&self) -> EngineResult<Vec<MaterialRecord>> {
        let records = self.repo.list_all()?;
        debug!(count = records.len(), "查询全部原材料");
        Ok(records
            .into_iter()
            .filter(|r| {
                let keep = !r.material_id.trim().is_empty();
                if !keep {
                    warn!("跳过空 materialID 记录");
                }
                keep
            })
            .collect())
    }

    pub fn query_by_status(&self, status: MaterialStatus) -> EngineResult<Vec<MaterialRecord>> {
        Ok(self
            .query_all()?
            .into_iter()
            .filter(|r| r.matches_status(status))
            .collect())
    }

    /// 新/回收分组视图（数量为 0 的记录不列出）
    pub fn catalog(&self) -> EngineResult<MaterialCatalog> {
        let mut catalog = MaterialCatalog::default();
        for record in self.query_all()? {
            if record.quantity == 0 {
                continue;
            }
            if record.is_recycled() {
                catalog.recycled_materials.push(record);
            } else {
                catalog.new_materials.push(record);
            }
        }
        Ok(catalog)
    }

    pub fn usage_of(&self, material_id: &str) -> EngineResult<UsageCounter> {
        Ok(self.repo.usage_of(material_id)?)
    }

    // ==========================================
    // 内部
    // ==========================================

    pub(crate) fn load(&self, material_id: &str) -> EngineResult<MaterialRecord> {
        self.repo
            .find_by_id(material_id)?
            .ok_or_else(|| EngineError::material_not_found(material_id))
    }

    /// 扣减数量并把记录与累计计数加入批次
    ///
    /// 同一批次内每个 materialID 只能调用一次
    pub(crate) fn stage_consumption(
        &self,
        batch: &mut WriteBatch,
        record: &mut MaterialRecord,
        amount: u64,
    ) -> EngineResult<()> {
        if amount == 0 {
            return Err(EngineError::MalformedInput(format!(
                "消耗数量必须大于 0: material_id={}",
                record.material_id
            )));
        }
        if amount > record.quantity {
            return Err(EngineError::InsufficientQuantity {
                material_id: record.material_id.clone(),
                required: amount,
                available: record.quantity,
            });
        }

        record.quantity -= amount;
        record.refresh_availability();
        record.timestamp = Utc::now();
        MaterialRepository::stage_record(batch, record)?;

        let mut counter = self.repo.usage_of(&record.material_id)?;
        counter.increment(amount);
        MaterialRepository::stage_usage(batch, &record.material_id, &counter)?;
        Ok(())
    }
}
