// ==========================================
// 动力电池供应链账本 - 拆解提取引擎
// ==========================================
// 职责: 将可回收电池拆解为新的 RECYCLED 原材料记录
// 口径: 按调用方声明的数量生成新记录 + 电池置为 DISASSEMBLED
// 红线: 新记录、电池、提取记录同一批次提交
// 注意: 声明数量不与电池实际含量校验，超出时仅告警
// ==========================================

use crate::domain::battery::Battery;
use crate::domain::lifecycle::{apply_event, validate_event, LifecycleEvent, LifecycleSteps};
use crate::domain::material::MaterialRecord;
use crate::domain::types::MaterialOrigin;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::{BatteryRepository, MaterialRepository, WriteBatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 原材料 ID 前缀
pub const MATERIAL_ID_PREFIX: &str = "MATERIAL-";

/// 生成新的原材料 ID
pub fn new_material_id() -> String {
    format!("{}{}", MATERIAL_ID_PREFIX, Uuid::new_v4())
}

/// 默认提取率表
pub fn default_extraction_rates() -> BTreeMap<String, f64> {
    [("Lithium", 0.30), ("Cobalt", 0.20), ("Manganese", 0.25), ("Nickel", 0.25)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// 提取参数
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionSettings {
    pub recycle_supplier_id: String,
    pub rates: BTreeMap<String, f64>,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            recycle_supplier_id: "recycle-source".to_string(),
            rates: default_extraction_rates(),
        }
    }
}

/// 单一类型的提取结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedMaterial {
    #[serde(rename = "materialID")]
    pub material_id: String,
    pub quantity: u64,
    pub status: MaterialOrigin,
}

/// 提取报告（同时作为 extraction/<batteryID> 记录存储）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    #[serde(rename = "batteryID")]
    pub battery_id: String,
    pub extracted_at: DateTime<Utc>,
    /// 原材料类型 → 新记录
    pub materials: BTreeMap<String, ExtractedMaterial>,
}

// ==========================================
// ExtractionEngine - 拆解提取引擎
// ==========================================
pub struct ExtractionEngine {
    materials: Arc<MaterialRepository>,
    batteries: Arc<BatteryRepository>,
    settings: ExtractionSettings,
}

impl ExtractionEngine {
    pub fn new(
        materials: Arc<MaterialRepository>,
        batteries: Arc<BatteryRepository>,
        settings: ExtractionSettings,
    ) -> Self {
        Self {
            materials,
            batteries,
            settings,
        }
    }

    fn load_battery(&self, battery_id: &str) -> EngineResult<Battery> {
        self.batteries
            .find_by_id(battery_id)?
            .ok_or_else(|| EngineError::battery_not_found(battery_id))
    }

    /// 拆解电池并生成回收原材料
    ///
    /// 只处理电池中存在、且声明数量 > 0 的原材料类型（去重、按类型排序）
    #[instrument(skip(self, requested), fields(types = requested.len()))]
    pub fn extract(
        &self,
        battery_id: &str,
        requested: &BTreeMap<String, u64>,
    ) -> EngineResult<ExtractionReport> {
        let mut battery = self.load_battery(battery_id)?;
        validate_event(&battery, &LifecycleEvent::Disassembled)
            .map_err(|v| EngineError::from_violation(battery_id, v))?;

        for ty in requested.keys() {
            if !battery.raw_materials.values().any(|d| &d.material_type == ty) {
                warn!(battery_id, material_type = %ty, "电池不含该原材料类型，忽略");
            }
        }

        let now = Utc::now();
        let mut batch = WriteBatch::new();
        let mut extracted = BTreeMap::new();

        for (material_type, contained) in battery.quantity_by_type() {
            let quantity = match requested.get(&material_type) {
                Some(q) if *q > 0 => *q,
                _ => continue,
            };
            if quantity > contained {
                warn!(
                    battery_id,
                    material_type = %material_type,
                    requested = quantity,
                    contained,
                    "声明的提取数量超过电池含量"
                );
            }

            let material_id = new_material_id();
            let mut record = MaterialRecord::new_lot(
                material_id.clone(),
                self.settings.recycle_supplier_id.clone(),
                material_type.clone(),
                quantity,
                MaterialOrigin::Recycled,
            );
            record.timestamp = now;
            MaterialRepository::stage_record(&mut batch, &record)?;

            extracted.insert(
                material_type,
                ExtractedMaterial {
                    material_id,
                    quantity,
                    status: MaterialOrigin::Recycled,
                },
            );
        }

        apply_event(&mut battery, &LifecycleEvent::Disassembled, &LifecycleSteps::default())
            .map_err(|v| EngineError::from_violation(battery_id, v))?;
        BatteryRepository::stage_battery(&mut batch, &battery)?;

        let report = ExtractionReport {
            battery_id: battery_id.to_string(),
            extracted_at: now,
            materials: extracted,
        };
        BatteryRepository::stage_extraction(&mut batch, battery_id, &report)?;
        self.materials.commit(&batch)?;

        info!(
            battery_id,
            materials = report.materials.len(),
            "电池拆解提取完成"
        );
        Ok(report)
    }

    /// 查询已存储的提取记录
    pub fn query_extraction(&self, battery_id: &str) -> EngineResult<ExtractionReport> {
        self.batteries
            .find_extraction(battery_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "ExtractionReport",
                id: battery_id.to_string(),
            })
    }

    /// 按提取率估算可回收量: floor(数量 × 提取率)
    ///
    /// 只读；提取率表中没有的类型不列出
    pub fn estimate_recoverable(&self, battery_id: &str) -> EngineResult<BTreeMap<String, u64>> {
        let battery = self.load_battery(battery_id)?;
        Ok(estimate_by_rates(&battery, &self.settings.rates))
    }
}

/// 提取率估算
pub fn estimate_by_rates(battery: &Battery, rates: &BTreeMap<String, f64>) -> BTreeMap<String, u64> {
    battery
        .quantity_by_type()
        .into_iter()
        .filter_map(|(ty, qty)| {
            rates
                .get(&ty)
                .map(|rate| (ty, (qty as f64 * rate).floor().max(0.0) as u64))
        })
        .collect()
}
