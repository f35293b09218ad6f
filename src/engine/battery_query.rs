// ==========================================
// 动力电池供应链账本 - 电池只读查询
// ==========================================
// 职责: 详情（电池 + 护照）、性能指标、寿命视图、按标志位过滤
// 红线: 只读，不修改任何状态
// ==========================================

use crate::domain::battery::{
    Battery, BatteryDetails, BatteryPassport, LifeCycleView, PerformanceView, RecycleStatusSummary,
};
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::BatteryRepository;
use std::sync::Arc;
use tracing::debug;

/// 按标志位过滤电池
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryFlag {
    MaintenanceRequest,
    AnalysisRequest,
    RecycleAvailability,
}

pub struct BatteryQueryService {
    batteries: Arc<BatteryRepository>,
}

impl BatteryQueryService {
    pub fn new(batteries: Arc<BatteryRepository>) -> Self {
        Self { batteries }
    }

    pub fn query_battery(&self, battery_id: &str) -> EngineResult<Battery> {
        self.batteries
            .find_by_id(battery_id)?
            .ok_or_else(|| EngineError::battery_not_found(battery_id))
    }

    /// 全部电池（空 ID 记录跳过）
    pub fn query_all(&self) -> EngineResult<Vec<Battery>> {
        let batteries: Vec<Battery> = self
            .batteries
            .list_all()?
            .into_iter()
            .filter(|b| !b.battery_id.trim().is_empty())
            .collect();
        debug!(count = batteries.len(), "查询全部电池");
        Ok(batteries)
    }

    pub fn query_all_passports(&self) -> EngineResult<Vec<BatteryPassport>> {
        Ok(self.batteries.list_passports()?)
    }

    pub fn query_passport(&self, battery_id: &str) -> EngineResult<BatteryPassport> {
        let battery = self.query_battery(battery_id)?;
        self.batteries
            .find_passport(&battery.passport_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "BatteryPassport",
                id: battery.passport_id.clone(),
            })
    }

    /// 电池 + 护照合并详情（护照缺失时占比为空）
    pub fn battery_details(&self, battery_id: &str) -> EngineResult<BatteryDetails> {
        let battery = self.query_battery(battery_id)?;
        let passport = self.batteries.find_passport(&battery.passport_id)?;
        let (recycled_ratio, contains_hazardous) = match passport {
            Some(p) => (p.recycled_material_ratio, p.contains_hazardous),
            None => (Default::default(), false),
        };
        Ok(BatteryDetails {
            battery,
            recycled_ratio,
            contains_hazardous,
        })
    }

    pub fn query_performance(&self, battery_id: &str) -> EngineResult<PerformanceView> {
        let b = self.query_battery(battery_id)?;
        Ok(PerformanceView {
            battery_id: b.battery_id,
            soce: b.soce,
            soc: b.soc,
            soh: b.soh,
            remaining_life_cycle: b.remaining_life_cycle,
            voltage: b.voltage,
        })
    }

    pub fn query_soce_and_life_cycle(&self, battery_id: &str) -> EngineResult<LifeCycleView> {
        let b = self.query_battery(battery_id)?;
        Ok(LifeCycleView {
            battery_id: b.battery_id,
            capacity: b.capacity,
            soce: b.soce,
            remaining_life_cycle: b.remaining_life_cycle,
            total_life_cycle: b.total_life_cycle,
        })
    }

    pub fn recycle_status_summary(&self, battery_id: &str) -> EngineResult<RecycleStatusSummary> {
        let b = self.query_battery(battery_id)?;
        Ok(RecycleStatusSummary {
            battery_id: b.battery_id,
            capacity: b.capacity,
            soce: b.soce,
            remaining_life_cycle: b.remaining_life_cycle,
            recycle_availability: b.recycle_availability,
            status: b.status,
        })
    }

    pub fn query_by_flag(&self, flag: BatteryFlag) -> EngineResult<Vec<Battery>> {
        Ok(self
            .query_all()?
            .into_iter()
            .filter(|b| match flag {
                BatteryFlag::MaintenanceRequest => b.maintenance_request,
                BatteryFlag::AnalysisRequest => b.analysis_request,
                BatteryFlag::RecycleAvailability => b.recycle_availability && !b.is_disassembled(),
            })
            .collect())
    }
}
