// ==========================================
// 动力电池供应链账本 - 跨分区同步协调器
// ==========================================
// 拉取式同步: 远端只读查询 → 反序列化 → 本地按标识 upsert
// 红线: 远端失败或载荷损坏时本地不做任何写入
// 红线: 原材料一律经对账（扣除本地累计消耗）写入
// 红线: 本地已拆解（DISASSEMBLED）的电池不被远端副本覆盖，终态只由回收分区产生
// ==========================================
// 已知风险: 远端读取与本地写入之间若有生命周期事件写入同一电池，
// 该事件会被覆盖（lost update）。当前不做版本比较。
// ==========================================

use crate::domain::battery::{Battery, BatteryPassport};
use crate::domain::material::MaterialRecord;
use crate::domain::types::PartitionKind;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::inventory::ReconcileReport;
use crate::partition::client::{invoke_checked, InvokeRequest, PartitionClient};
use crate::partition::node::{functions, PartitionNode};
use crate::repository::{BatteryRepository, WriteBatch};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 同步来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSource {
    pub partition: String,
    pub contract: String,
}

impl SyncSource {
    pub fn new(partition: impl Into<String>, contract: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            contract: contract.into(),
        }
    }

    /// 以分区类型的默认名称/合约作为来源
    pub fn of(kind: PartitionKind) -> Self {
        Self::new(kind.default_name(), kind.contract_name())
    }

    fn request(&self, function: &str) -> InvokeRequest {
        InvokeRequest::new(&self.partition, &self.contract, function)
    }
}

/// 电池同步报告
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatterySyncReport {
    pub batteries: usize,
    pub passports: usize,
    pub skipped: usize,
    /// 本地已拆解、保留本地状态的电池数
    #[serde(default)]
    pub terminal_kept: usize,
}

/// 解码远端载荷；null 视为空集合，损坏视为上游失败
fn decode_records<T: DeserializeOwned>(source: &SyncSource, function: &str, payload: &[u8]) -> EngineResult<Vec<T>> {
    if payload.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_slice::<Option<Vec<T>>>(payload)
        .map(Option::unwrap_or_default)
        .map_err(|e| EngineError::UpstreamFailure {
            partition: source.partition.clone(),
            function: function.to_string(),
            message: format!("载荷解析失败: {}", e),
        })
}

// ==========================================
// PartitionSyncCoordinator - 同步协调器
// ==========================================
pub struct PartitionSyncCoordinator {
    local: Arc<PartitionNode>,
    client: Arc<dyn PartitionClient>,
}

impl PartitionSyncCoordinator {
    pub fn new(local: Arc<PartitionNode>, client: Arc<dyn PartitionClient>) -> Self {
        Self { local, client }
    }

    pub fn local(&self) -> &Arc<PartitionNode> {
        &self.local
    }

    /// 从远端拉取全部原材料并对账写入
    #[instrument(skip(self), fields(local = %self.local.name()))]
    pub fn sync_materials_from(&self, source: &SyncSource) -> EngineResult<ReconcileReport> {
        let function = functions::QUERY_ALL_RAW_MATERIALS;
        let payload = invoke_checked(self.client.as_ref(), &source.request(function))?;
        let records: Vec<MaterialRecord> = decode_records(source, function, &payload)?;

        let report = self.local.inventory.reconcile_from_supply_snapshot(records)?;
        info!(
            source = %source.partition,
            applied = report.applied,
            "原材料同步完成"
        );
        Ok(report)
    }

    /// 从远端拉取全部电池与护照并整体覆盖写入（本地已拆解的电池除外）
    ///
    /// 两次远端调用都成功后才写入本地
    #[instrument(skip(self), fields(local = %self.local.name()))]
    pub fn sync_batteries_from(&self, source: &SyncSource) -> EngineResult<BatterySyncReport> {
        let batteries_fn = functions::QUERY_ALL_BATTERIES;
        let payload = invoke_checked(self.client.as_ref(), &source.request(batteries_fn))?;
        let batteries: Vec<Battery> = decode_records(source, batteries_fn, &payload)?;

        let passports_fn = functions::QUERY_ALL_PASSPORTS;
        let payload = invoke_checked(self.client.as_ref(), &source.request(passports_fn))?;
        let passports: Vec<BatteryPassport> = decode_records(source, passports_fn, &payload)?;

        let mut report = BatterySyncReport::default();
        let mut batch = WriteBatch::new();
        for battery in &batteries {
            if battery.battery_id.trim().is_empty() {
                warn!(source = %source.partition, "远端电池记录缺少 batteryID，跳过");
                report.skipped += 1;
                continue;
            }
            let local_terminal = self
                .local
                .batteries
                .find_by_id(&battery.battery_id)?
                .map(|b| b.is_disassembled())
                .unwrap_or(false);
            if local_terminal && !battery.is_disassembled() {
                warn!(
                    source = %source.partition,
                    battery_id = %battery.battery_id,
                    "本地电池已拆解，忽略远端非终态副本"
                );
                report.terminal_kept += 1;
                continue;
            }
            BatteryRepository::stage_battery(&mut batch, battery)?;
            report.batteries += 1;
        }
        for passport in &passports {
            if passport.passport_id.trim().is_empty() {
                warn!(source = %source.partition, "远端护照记录缺少 passportID，跳过");
                report.skipped += 1;
                continue;
            }
            BatteryRepository::stage_passport(&mut batch, passport)?;
            report.passports += 1;
        }

        self.local.batteries.commit(&batch)?;
        info!(
            source = %source.partition,
            batteries = report.batteries,
            passports = report.passports,
            terminal_kept = report.terminal_kept,
            "电池同步完成"
        );
        Ok(report)
    }
}
