// ==========================================
// 动力电池供应链账本 - 电池制造引擎
// ==========================================
// 职责: 消耗原材料 → 生成 Battery + BatteryPassport
// 输入: ManufactureOrder（原材料明细 + 物理属性 + 声明的回收料）
// 输出: ManufactureReceipt
// 红线: 先整体校验再写入；消耗、电池、护照同一批次提交
// ==========================================

use crate::domain::battery::{passport_id_for, Battery, BatteryPassport, PhysicalAttributes};
use crate::domain::material::{MaterialRecord, RawMaterialDetail};
use crate::domain::types::MaterialOrigin;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::inventory::MaterialInventory;
use crate::repository::{BatteryRepository, WriteBatch};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// 电池 ID 前缀
pub const BATTERY_ID_PREFIX: &str = "BATTERY-";

/// 制造订单
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufactureOrder {
    /// 行键 → 原材料明细（materialID + 数量）
    pub materials: BTreeMap<String, RawMaterialDetail>,
    pub attributes: PhysicalAttributes,
    /// 额外声明的回收料（不从本地库存扣减，只计入回收占比）
    #[serde(default, deserialize_with = "crate::domain::battery::null_as_default")]
    pub recycled: BTreeMap<String, RawMaterialDetail>,
    #[serde(default)]
    pub contains_hazardous: bool,
}

/// 制造回执
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufactureReceipt {
    #[serde(rename = "batteryID")]
    pub battery_id: String,
    #[serde(rename = "passportID")]
    pub passport_id: String,
    pub recycled_material_ratio: BTreeMap<String, f64>,
}

/// 保留两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 单一原材料类型的数量累计
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatioTally {
    pub total: u64,
    pub recycled: u64,
}

impl RatioTally {
    /// 累计数量（饱和，不溢出）
    pub fn add(&mut self, quantity: u64, recycled: bool) {
        self.total = self.total.saturating_add(quantity);
        if recycled {
            self.recycled = self.recycled.saturating_add(quantity);
        }
    }

    /// 回收占比（百分比）；total 为 0 时无意义，返回 None
    pub fn percentage(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(round2(self.recycled as f64 / self.total as f64 * 100.0))
    }
}

/// 按类型计算回收占比
pub fn recycled_ratio(tallies: &BTreeMap<String, RatioTally>) -> BTreeMap<String, f64> {
    tallies
        .iter()
        .filter_map(|(ty, tally)| tally.percentage().map(|p| (ty.clone(), p)))
        .collect()
}

// ==========================================
// ManufacturingEngine - 电池制造引擎
// ==========================================
pub struct ManufacturingEngine {
    inventory: Arc<MaterialInventory>,
    batteries: Arc<BatteryRepository>,
}

impl ManufacturingEngine {
    pub fn new(inventory: Arc<MaterialInventory>, batteries: Arc<BatteryRepository>) -> Self {
        Self {
            inventory,
            batteries,
        }
    }

    /// 制造电池
    ///
    /// 步骤:
    /// 1. 按 materialID 汇总需求，逐条校验存在性与余量（任一失败则无任何写入）
    /// 2. 扣减库存 + 累计计数
    /// 3. 计算各类型回收占比
    /// 4. 生成电池与护照，统一提交
    #[instrument(skip(self, order), fields(lines = order.materials.len()))]
    pub fn manufacture(&self, order: &ManufactureOrder) -> EngineResult<ManufactureReceipt> {
        if order.materials.is_empty() {
            return Err(EngineError::MalformedInput("原材料明细不能为空".to_string()));
        }

        // ===== 1. 汇总需求并校验 =====
        let mut demand: BTreeMap<String, u64> = BTreeMap::new();
        for (line, detail) in &order.materials {
            if detail.material_id.trim().is_empty() || detail.quantity == 0 {
                return Err(EngineError::MalformedInput(format!(
                    "原材料明细无效: line={}, material_id={}, quantity={}",
                    line, detail.material_id, detail.quantity
                )));
            }
            let total = demand.entry(detail.material_id.clone()).or_insert(0);
            match total.checked_add(detail.quantity) {
                Some(sum) => *total = sum,
                None => {
                    // 需求总量超出 u64，必然超过任何库存
                    let record = self.inventory.load(&detail.material_id)?;
                    return Err(EngineError::InsufficientQuantity {
                        material_id: detail.material_id.clone(),
                        required: u64::MAX,
                        available: record.quantity,
                    });
                }
            }
        }
        for (line, detail) in &order.recycled {
            if detail.material_type.trim().is_empty() {
                return Err(EngineError::MalformedInput(format!(
                    "声明的回收料缺少 materialType: line={}",
                    line
                )));
            }
        }

        let mut records: BTreeMap<String, MaterialRecord> = BTreeMap::new();
        for (material_id, required) in &demand {
            let record = self.inventory.load(material_id)?;
            if *required > record.quantity {
                return Err(EngineError::InsufficientQuantity {
                    material_id: material_id.clone(),
                    required: *required,
                    available: record.quantity,
                });
            }
            records.insert(material_id.clone(), record);
        }

        // ===== 2. 扣减 =====
        let mut batch = WriteBatch::new();
        let mut origins = BTreeMap::new();
        for (material_id, required) in &demand {
            if let Some(record) = records.get_mut(material_id) {
                origins.insert(material_id.clone(), (record.origin, record.name.clone()));
                self.inventory.stage_consumption(&mut batch, record, *required)?;
            }
        }

        // ===== 3. 明细快照 + 回收占比 =====
        let mut raw_materials = BTreeMap::new();
        let mut tallies: BTreeMap<String, RatioTally> = BTreeMap::new();
        for (line, detail) in &order.materials {
            let mut snapshot = detail.clone();
            if let Some((origin, name)) = origins.get(&detail.material_id) {
                snapshot.status = *origin;
                if snapshot.material_type.trim().is_empty() {
                    snapshot.material_type = name.clone();
                }
            }

            let tally = tallies.entry(snapshot.material_type.clone()).or_default();
            tally.add(snapshot.quantity, snapshot.status == MaterialOrigin::Recycled);
            raw_materials.insert(line.clone(), snapshot);
        }
        for detail in order.recycled.values() {
            tallies
                .entry(detail.material_type.clone())
                .or_default()
                .add(detail.quantity, true);
        }
        let ratio = recycled_ratio(&tallies);

        // ===== 4. 电池 + 护照 =====
        let now = Utc::now();
        let battery_id = format!("{}{}", BATTERY_ID_PREFIX, Uuid::new_v4());
        let battery = Battery::manufactured(battery_id.clone(), raw_materials, &order.attributes, now);
        let passport = BatteryPassport {
            battery_id: battery_id.clone(),
            passport_id: passport_id_for(&battery_id),
            recycled_material_ratio: ratio.clone(),
            contains_hazardous: order.contains_hazardous,
            manufacture_date: now,
        };

        BatteryRepository::stage_battery(&mut batch, &battery)?;
        BatteryRepository::stage_passport(&mut batch, &passport)?;
        let written = self.batteries.commit(&batch)?;

        info!(
            battery_id = %battery_id,
            materials = demand.len(),
            written,
            "电池制造完成"
        );

        Ok(ManufactureReceipt {
            battery_id,
            passport_id: passport.passport_id,
            recycled_material_ratio: ratio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2_舍入() {
        let tally = RatioTally {
            total: 120,
            recycled: 20,
        };
        assert_eq!(tally.percentage(), Some(16.67));
        assert_eq!(round2(33.333), 33.33);
    }

    #[test]
    fn test_ratio_tally_饱和累计() {
        let mut tally = RatioTally::default();
        tally.add(u64::MAX, true);
        tally.add(10, false);
        assert_eq!(tally.total, u64::MAX);
        assert_eq!(tally.recycled, u64::MAX);
        assert_eq!(tally.percentage(), Some(100.0));
    }

    #[test]
    fn test_recycled_ratio_跳过零总量() {
        let mut tallies = BTreeMap::new();
        tallies.insert("Lithium".to_string(), RatioTally { total: 50, recycled: 50 });
        tallies.insert("Cobalt".to_string(), RatioTally::default());

        let ratio = recycled_ratio(&tallies);
        assert_eq!(ratio.len(), 1);
        assert_eq!(ratio["Lithium"], 100.0);
    }
}
