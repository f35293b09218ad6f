// ==========================================
// 动力电池供应链账本 - 原材料领域模型
// ==========================================
// MaterialRecord: 分区内原材料批次的权威剩余量
// UsageCounter: 本地累计消耗量（只增不减）
// RawMaterialDetail: 电池内嵌的消耗快照
// ==========================================

use crate::domain::types::{Availability, MaterialOrigin, MaterialStatus, VerificationMark};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// MaterialRecord - 原材料记录
// ==========================================
// 红线: quantity ≥ 0（类型保证），availability 由 quantity 派生
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    #[serde(rename = "materialID")]
    pub material_id: String, // 原材料批次唯一标识

    #[serde(rename = "supplierID", default)]
    pub supplier_id: String, // 供应商标识

    #[serde(alias = "materialType", default)]
    pub name: String, // 原材料类型（Lithium / Cobalt / ...）

    pub quantity: u64, // 剩余数量

    #[serde(rename = "status", default = "default_origin")]
    pub origin: MaterialOrigin,

    #[serde(default)]
    pub availability: Availability,

    #[serde(default)]
    pub verified: VerificationMark,

    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>, // 最后修改时间
}

fn default_origin() -> MaterialOrigin {
    MaterialOrigin::New
}

impl MaterialRecord {
    /// 新建原材料批次（AVAILABLE / NOT VERIFIED）
    pub fn new_lot(
        material_id: impl Into<String>,
        supplier_id: impl Into<String>,
        name: impl Into<String>,
        quantity: u64,
        origin: MaterialOrigin,
    ) -> Self {
        let mut record = Self {
            material_id: material_id.into(),
            supplier_id: supplier_id.into(),
            name: name.into(),
            quantity,
            origin,
            availability: Availability::Available,
            verified: VerificationMark::NotVerified,
            timestamp: Utc::now(),
        };
        record.refresh_availability();
        record
    }

    /// 按剩余数量重新派生可用状态
    pub fn refresh_availability(&mut self) {
        self.availability = if self.quantity == 0 {
            Availability::Used
        } else {
            Availability::Available
        };
    }

    /// 是否为回收来源
    pub fn is_recycled(&self) -> bool {
        self.origin == MaterialOrigin::Recycled
    }

    /// 是否匹配对外状态口径
    pub fn matches_status(&self, status: MaterialStatus) -> bool {
        match status {
            MaterialStatus::New => self.origin == MaterialOrigin::New,
            MaterialStatus::Recycled => self.origin == MaterialOrigin::Recycled,
            MaterialStatus::Verified => self.verified == VerificationMark::Verified,
            MaterialStatus::Available => self.availability == Availability::Available,
            MaterialStatus::Used => self.availability == Availability::Used,
        }
    }
}

// ==========================================
// UsageCounter - 累计消耗计数
// ==========================================
// 存储为独立键 usage/<materialID>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounter {
    pub consumed: u64,
}

impl UsageCounter {
    pub fn zero() -> Self {
        Self { consumed: 0 }
    }

    /// 只增不减
    pub fn increment(&mut self, amount: u64) {
        self.consumed = self.consumed.saturating_add(amount);
    }
}

// ==========================================
// RawMaterialDetail - 电池原材料明细
// ==========================================
// 生命周期: 随电池一同存储，不随库存变化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMaterialDetail {
    #[serde(rename = "materialID")]
    pub material_id: String,
    #[serde(rename = "materialType", default)]
    pub material_type: String,
    pub quantity: u64,
    #[serde(default = "default_origin")]
    pub status: MaterialOrigin, // 消耗时刻的来源状态
}

// ==========================================
// MaterialCatalog - 新/回收原材料分组视图
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialCatalog {
    pub new_materials: Vec<MaterialRecord>,
    pub recycled_materials: Vec<MaterialRecord>,
}

// ==========================================
// ConsumptionMarker - 幂等消耗标记
// ==========================================
// 存储为 consumption/<requestID>，重复投递时据此跳过
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionMarker {
    #[serde(rename = "requestID")]
    pub request_id: String,
    #[serde(rename = "materialID")]
    pub material_id: String,
    pub amount: u64,
    pub applied_at: DateTime<Utc>,
}
