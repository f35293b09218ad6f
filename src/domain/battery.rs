// ==========================================
// 动力电池供应链账本 - 电池领域模型
// ==========================================
// Battery: 电池主体 + 生命周期可变字段
// BatteryPassport: 电池护照（制造时一次生成）
// ==========================================
// 红线: SOC/SOH ∈ [0,100]；维保/事故日志只追加不截断
// 约定: 跨分区拉取的 JSON 可能出现 null 集合，统一归一化为空
// ==========================================

use crate::domain::material::RawMaterialDetail;
use crate::domain::types::{BatteryStatus, VerificationMark};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// SOC / SOH 上限
pub const PERCENT_MAX: f64 = 100.0;

/// 护照 ID 前缀（passportID = PASS-<batteryID>）
pub const PASSPORT_ID_PREFIX: &str = "PASS-";

/// null 与缺省都视为空集合
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 将百分比类数值钳制到 [0, 100]
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, PERCENT_MAX)
}

/// 由电池 ID 派生护照 ID
pub fn passport_id_for(battery_id: &str) -> String {
    format!("{}{}", PASSPORT_ID_PREFIX, battery_id)
}

// ==========================================
// PhysicalAttributes - 物理属性
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalAttributes {
    pub capacity: f64,
    pub voltage: f64,
    pub weight: f64,
    #[serde(default)]
    pub category: String,
    pub total_life_cycle: u32,
    #[serde(default)]
    pub manufacturer_name: String,
    #[serde(default)]
    pub location: String,
}

// ==========================================
// Battery - 电池
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Battery {
    // ===== 主键与关联 =====
    #[serde(rename = "batteryID")]
    pub battery_id: String,
    #[serde(rename = "passportID", default)]
    pub passport_id: String,

    // ===== 原材料明细（行键 → 明细）=====
    #[serde(default, deserialize_with = "null_as_default")]
    pub raw_materials: BTreeMap<String, RawMaterialDetail>,

    // ===== 制造信息 =====
    pub manufacture_date: DateTime<Utc>,
    #[serde(default)]
    pub manufacturer_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub weight: f64,
    pub capacity: f64,
    #[serde(default)]
    pub voltage: f64,

    // ===== 性能指标 =====
    pub soc: f64,  // 荷电状态
    pub soh: f64,  // 健康状态
    pub soce: f64, // 充电效率（生命周期事件不修改）
    pub total_life_cycle: u32,
    pub remaining_life_cycle: u32,

    // ===== 运行日志（只追加）=====
    #[serde(default, deserialize_with = "null_as_default")]
    pub maintenance_logs: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub accident_logs: Vec<String>,

    // ===== 请求/可用标志 =====
    #[serde(default)]
    pub maintenance_request: bool,
    #[serde(default)]
    pub analysis_request: bool,
    #[serde(default)]
    pub recycle_availability: bool,

    // ===== 状态 =====
    #[serde(default)]
    pub status: BatteryStatus,
    #[serde(default)]
    pub verified: VerificationMark,
}

impl Battery {
    /// 制造时构造电池：SOC=SOH=SOCE=100，剩余寿命=总寿命
    pub fn manufactured(
        battery_id: String,
        raw_materials: BTreeMap<String, RawMaterialDetail>,
        attributes: &PhysicalAttributes,
        manufacture_date: DateTime<Utc>,
    ) -> Self {
        let passport_id = passport_id_for(&battery_id);
        Self {
            battery_id,
            passport_id,
            raw_materials,
            manufacture_date,
            manufacturer_name: attributes.manufacturer_name.clone(),
            location: attributes.location.clone(),
            category: attributes.category.clone(),
            weight: attributes.weight,
            capacity: attributes.capacity,
            voltage: attributes.voltage,
            soc: PERCENT_MAX,
            soh: PERCENT_MAX,
            soce: PERCENT_MAX,
            total_life_cycle: attributes.total_life_cycle,
            remaining_life_cycle: attributes.total_life_cycle,
            maintenance_logs: Vec::new(),
            accident_logs: Vec::new(),
            maintenance_request: false,
            analysis_request: false,
            recycle_availability: false,
            status: BatteryStatus::Original,
            verified: VerificationMark::NotVerified,
        }
    }

    /// 是否已拆解（终态）
    pub fn is_disassembled(&self) -> bool {
        self.status == BatteryStatus::Disassembled
    }

    /// 按原材料类型汇总数量
    pub fn quantity_by_type(&self) -> BTreeMap<String, u64> {
        let mut totals = BTreeMap::new();
        for detail in self.raw_materials.values() {
            let total = totals.entry(detail.material_type.clone()).or_insert(0u64);
            *total = total.saturating_add(detail.quantity);
        }
        totals
    }
}

// ==========================================
// BatteryPassport - 电池护照
// ==========================================
// recycledMaterialRatio: 原材料类型 → 回收占比（百分比，2位小数）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryPassport {
    #[serde(rename = "batteryID")]
    pub battery_id: String,
    #[serde(rename = "passportID")]
    pub passport_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recycled_material_ratio: BTreeMap<String, f64>,
    #[serde(default)]
    pub contains_hazardous: bool,
    pub manufacture_date: DateTime<Utc>,
}

// ==========================================
// 生命周期事件载荷
// ==========================================

/// 维保读数：实测值或固定步长衰减
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceReading {
    /// 调用方提供实测 SOC/SOH（钳制到 [0,100]）
    #[serde(rename_all = "camelCase")]
    Measured {
        soc: f64,
        soh: f64,
        #[serde(default)]
        remaining_life_cycle: Option<u32>,
    },
    /// SOC 按配置步长递减
    FixedStep,
}

/// 维保记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceEntry {
    pub info: String,
    pub maintenance_date: String,
    pub company: String,
}

impl MaintenanceEntry {
    pub fn to_log_line(&self) -> String {
        format!(
            "Maintenance on {} by {}: {}",
            self.maintenance_date, self.company, self.info
        )
    }
}

/// 事故报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentReport {
    pub incident_date: String,
    pub incident_type: String,
    #[serde(default)]
    pub battery_impact_assessment: String,
    #[serde(default)]
    pub action_information: String,
}

impl IncidentReport {
    pub fn to_log_line(&self) -> String {
        format!(
            "Accident on {}: {}, Impact: {}, Action: {}",
            self.incident_date,
            self.incident_type,
            self.battery_impact_assessment,
            self.action_information
        )
    }
}

// ==========================================
// 查询视图
// ==========================================

/// 电池 + 护照合并详情
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryDetails {
    #[serde(flatten)]
    pub battery: Battery,
    pub recycled_ratio: BTreeMap<String, f64>,
    pub contains_hazardous: bool,
}

/// 性能指标视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceView {
    #[serde(rename = "batteryID")]
    pub battery_id: String,
    pub soce: f64,
    pub soc: f64,
    pub soh: f64,
    pub remaining_life_cycle: u32,
    pub voltage: f64,
}

/// 充电效率与寿命视图（分析机构使用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeCycleView {
    #[serde(rename = "batteryID")]
    pub battery_id: String,
    pub capacity: f64,
    pub soce: f64,
    pub remaining_life_cycle: u32,
    pub total_life_cycle: u32,
}

/// 回收判定摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecycleStatusSummary {
    #[serde(rename = "batteryID")]
    pub battery_id: String,
    pub capacity: f64,
    pub soce: f64,
    pub remaining_life_cycle: u32,
    pub recycle_availability: bool,
    pub status: BatteryStatus,
}
