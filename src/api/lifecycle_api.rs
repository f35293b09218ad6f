// ==========================================
// 动力电池供应链账本 - 生命周期 API
// ==========================================
// 职责: 维保/分析请求、维保日志、事故日志、回收判定
// 说明: 事故日志不限角色
// ==========================================

use std::sync::Arc;

use crate::api::error::{parse_payload, ApiResult};
use crate::api::identity::{permissions, CallerIdentity, RoleGuard};
use crate::domain::battery::{Battery, IncidentReport, MaintenanceEntry, MaintenanceReading};
use crate::partition::PartitionNode;

pub struct LifecycleApi {
    node: Arc<PartitionNode>,
    guard: RoleGuard,
}

impl LifecycleApi {
    pub fn new(node: Arc<PartitionNode>) -> Self {
        let guard = RoleGuard::new(node.config().msp_roles.clone());
        Self { node, guard }
    }

    pub fn request_maintenance(&self, caller: &CallerIdentity, battery_id: &str) -> ApiResult<Battery> {
        self.guard
            .require(caller, "RequestMaintenance", permissions::REQUEST_MAINTENANCE)?;
        let _gate = self.node.write_gate()?;
        Ok(self.node.lifecycle.request_maintenance(battery_id)?)
    }

    pub fn request_analysis(&self, caller: &CallerIdentity, battery_id: &str) -> ApiResult<Battery> {
        self.guard
            .require(caller, "RequestAnalysis", permissions::REQUEST_ANALYSIS)?;
        let _gate = self.node.write_gate()?;
        Ok(self.node.lifecycle.request_analysis(battery_id)?)
    }

    pub fn add_maintenance_log(
        &self,
        caller: &CallerIdentity,
        battery_id: &str,
        entry: MaintenanceEntry,
        reading: MaintenanceReading,
    ) -> ApiResult<Battery> {
        self.guard
            .require(caller, "AddMaintenanceLog", permissions::MAINTENANCE_LOG)?;
        let _gate = self.node.write_gate()?;
        Ok(self
            .node
            .lifecycle
            .add_maintenance_log(battery_id, entry, reading)?)
    }

    pub fn add_accident_log(&self, _caller: &CallerIdentity, battery_id: &str, report: IncidentReport) -> ApiResult<Battery> {
        let _gate = self.node.write_gate()?;
        Ok(self.node.lifecycle.add_accident_log(battery_id, report)?)
    }

    /// 事故日志（JSON 载荷）
    pub fn add_accident_log_json(&self, caller: &CallerIdentity, battery_id: &str, payload: &str) -> ApiResult<Battery> {
        let report: IncidentReport = parse_payload("IncidentReport", payload)?;
        self.add_accident_log(caller, battery_id, report)
    }

    pub fn set_recycle_availability(
        &self,
        caller: &CallerIdentity,
        battery_id: &str,
        available: bool,
    ) -> ApiResult<Battery> {
        self.guard
            .require(caller, "SetRecycleAvailability", permissions::RECYCLE_AVAILABILITY)?;
        let _gate = self.node.write_gate()?;
        Ok(self
            .node
            .lifecycle
            .set_recycle_availability(battery_id, available)?)
    }
}
