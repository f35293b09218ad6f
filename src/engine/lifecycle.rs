// ==========================================
// 动力电池供应链账本 - 生命周期追踪引擎
// ==========================================
// 职责: 读取电池 → 状态机校验并应用事件 → 整体回写
// 红线: 校验失败不写入任何状态
// ==========================================

use crate::domain::battery::{Battery, IncidentReport, MaintenanceEntry, MaintenanceReading};
use crate::domain::lifecycle::{apply_event, LifecycleEvent, LifecycleSteps};
use crate::domain::types::VerificationMark;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::BatteryRepository;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct LifecycleTracker {
    batteries: Arc<BatteryRepository>,
    steps: LifecycleSteps,
}

impl LifecycleTracker {
    pub fn new(batteries: Arc<BatteryRepository>, steps: LifecycleSteps) -> Self {
        Self { batteries, steps }
    }

    /// 对电池应用一个生命周期事件（read-modify-write）
    #[instrument(skip(self, event), fields(event = event.name()))]
    pub fn apply(&self, battery_id: &str, event: LifecycleEvent) -> EngineResult<Battery> {
        let mut battery = self
            .batteries
            .find_by_id(battery_id)?
            .ok_or_else(|| EngineError::battery_not_found(battery_id))?;

        if let Err(violation) = apply_event(&mut battery, &event, &self.steps) {
            warn!(battery_id, event = event.name(), %violation, "生命周期事件被拒绝");
            return Err(EngineError::from_violation(battery_id, violation));
        }

        self.batteries.save(&battery)?;
        info!(
            battery_id,
            event = event.name(),
            soc = battery.soc,
            soh = battery.soh,
            "生命周期事件已应用"
        );
        Ok(battery)
    }

    pub fn request_maintenance(&self, battery_id: &str) -> EngineResult<Battery> {
        self.apply(battery_id, LifecycleEvent::MaintenanceRequested)
    }

    pub fn request_analysis(&self, battery_id: &str) -> EngineResult<Battery> {
        self.apply(battery_id, LifecycleEvent::AnalysisRequested)
    }

    pub fn add_maintenance_log(
        &self,
        battery_id: &str,
        entry: MaintenanceEntry,
        reading: MaintenanceReading,
    ) -> EngineResult<Battery> {
        self.apply(battery_id, LifecycleEvent::MaintenanceLogged { entry, reading })
    }

    pub fn add_accident_log(&self, battery_id: &str, report: IncidentReport) -> EngineResult<Battery> {
        self.apply(battery_id, LifecycleEvent::AccidentLogged { report })
    }

    pub fn set_recycle_availability(&self, battery_id: &str, available: bool) -> EngineResult<Battery> {
        self.apply(battery_id, LifecycleEvent::RecycleAvailabilityDecided { available })
    }

    /// 认证机构标记电池为已认证（不属于生命周期事件）
    pub fn verify_battery(&self, battery_id: &str) -> EngineResult<Battery> {
        let mut battery = self
            .batteries
            .find_by_id(battery_id)?
            .ok_or_else(|| EngineError::battery_not_found(battery_id))?;
        battery.verified = VerificationMark::Verified;
        self.batteries.save(&battery)?;

        info!(battery_id, "电池已认证");
        Ok(battery)
    }
}
