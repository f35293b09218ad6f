// ==========================================
// 动力电池供应链账本 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE（与账本 JSON 一致）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 原材料来源 (Material Origin)
// ==========================================
// JSON 字段名为 "status"，只记录来源，不记录消耗状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialOrigin {
    New,      // 新开采原材料
    Recycled, // 回收提取原材料
}

impl fmt::Display for MaterialOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialOrigin::New => write!(f, "NEW"),
            MaterialOrigin::Recycled => write!(f, "RECYCLED"),
        }
    }
}

// ==========================================
// 可用状态 (Availability)
// ==========================================
// 红线: quantity == 0 ⇔ USED，由 MaterialRecord::refresh_availability 统一派生
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Availability {
    Available,
    Used,
}

impl Default for Availability {
    fn default() -> Self {
        Availability::Available
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Available => write!(f, "AVAILABLE"),
            Availability::Used => write!(f, "USED"),
        }
    }
}

// ==========================================
// 认证标记 (Verification Mark)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationMark {
    #[serde(rename = "VERIFIED")]
    Verified,
    #[serde(rename = "NOT VERIFIED")]
    NotVerified,
}

impl Default for VerificationMark {
    fn default() -> Self {
        VerificationMark::NotVerified
    }
}

impl fmt::Display for VerificationMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationMark::Verified => write!(f, "VERIFIED"),
            VerificationMark::NotVerified => write!(f, "NOT VERIFIED"),
        }
    }
}

// ==========================================
// 原材料状态过滤 (Material Status)
// ==========================================
// 对外查询口径: NEW / RECYCLED / VERIFIED / AVAILABLE / USED
// 分别映射到 origin / verified / availability 三个字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialStatus {
    New,
    Recycled,
    Verified,
    Available,
    Used,
}

impl fmt::Display for MaterialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MaterialStatus::New => "NEW",
            MaterialStatus::Recycled => "RECYCLED",
            MaterialStatus::Verified => "VERIFIED",
            MaterialStatus::Available => "AVAILABLE",
            MaterialStatus::Used => "USED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for MaterialStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NEW" => Ok(MaterialStatus::New),
            "RECYCLED" => Ok(MaterialStatus::Recycled),
            "VERIFIED" => Ok(MaterialStatus::Verified),
            "AVAILABLE" => Ok(MaterialStatus::Available),
            "USED" => Ok(MaterialStatus::Used),
            other => Err(format!("未知的原材料状态: {}", other)),
        }
    }
}

// ==========================================
// 电池状态 (Battery Status)
// ==========================================
// DISASSEMBLED 为终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatteryStatus {
    Original,
    Disassembled,
}

impl Default for BatteryStatus {
    fn default() -> Self {
        BatteryStatus::Original
    }
}

impl fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatteryStatus::Original => write!(f, "ORIGINAL"),
            BatteryStatus::Disassembled => write!(f, "DISASSEMBLED"),
        }
    }
}

// ==========================================
// 组织角色 (Org Role)
// ==========================================
// 由调用方 MSP ID 经配置映射得到
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrgRole {
    MaterialSupplier, // 原材料供应商
    Manufacturer,     // 电池制造商
    EvOperator,       // 整车/运营方
    Maintenance,      // 维保机构
    Analysis,         // 电池检测分析机构
    Recycler,         // 回收拆解机构
    Verifier,         // 第三方认证机构
}

impl fmt::Display for OrgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrgRole::MaterialSupplier => "MATERIAL_SUPPLIER",
            OrgRole::Manufacturer => "MANUFACTURER",
            OrgRole::EvOperator => "EV_OPERATOR",
            OrgRole::Maintenance => "MAINTENANCE",
            OrgRole::Analysis => "ANALYSIS",
            OrgRole::Recycler => "RECYCLER",
            OrgRole::Verifier => "VERIFIER",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// 分区类型 (Partition Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartitionKind {
    MaterialSupply, // 原材料供应分区
    Manufacturing,  // 电池制造分区
    Update,         // 在役更新分区
    Recycle,        // 回收提取分区
    Public,         // 公共聚合视图
}

impl PartitionKind {
    /// 分区默认名称
    pub fn default_name(&self) -> &'static str {
        match self {
            PartitionKind::MaterialSupply => "material-supply",
            PartitionKind::Manufacturing => "battery-ev",
            PartitionKind::Update => "battery-update",
            PartitionKind::Recycle => "recycled-material-extraction",
            PartitionKind::Public => "public",
        }
    }

    /// 分区上部署的合约名
    pub fn contract_name(&self) -> &'static str {
        match self {
            PartitionKind::MaterialSupply => "material",
            PartitionKind::Manufacturing => "batteryev",
            PartitionKind::Update => "batteryupdate",
            PartitionKind::Recycle => "recycle",
            PartitionKind::Public => "public",
        }
    }

    pub fn all() -> [PartitionKind; 5] {
        [
            PartitionKind::MaterialSupply,
            PartitionKind::Manufacturing,
            PartitionKind::Update,
            PartitionKind::Recycle,
            PartitionKind::Public,
        ]
    }
}

impl fmt::Display for PartitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.default_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_mark_序列化() {
        let json = serde_json::to_string(&VerificationMark::NotVerified).unwrap();
        assert_eq!(json, "\"NOT VERIFIED\"");
    }

    #[test]
    fn test_material_status_from_str() {
        assert_eq!("available".parse::<MaterialStatus>().unwrap(), MaterialStatus::Available);
        assert_eq!(" USED ".parse::<MaterialStatus>().unwrap(), MaterialStatus::Used);
        assert!("BROKEN".parse::<MaterialStatus>().is_err());
    }
}
