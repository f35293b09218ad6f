// ==========================================
// 动力电池供应链账本 - 电池 API
// ==========================================
// 职责: 电池制造、认证与各类查询
// ==========================================

use std::sync::Arc;

use crate::api::error::{parse_payload, ApiResult};
use crate::api::identity::{permissions, CallerIdentity, RoleGuard};
use crate::domain::battery::{
    Battery, BatteryDetails, BatteryPassport, LifeCycleView, PerformanceView, RecycleStatusSummary,
};
use crate::engine::battery_query::BatteryFlag;
use crate::engine::manufacturing::{ManufactureOrder, ManufactureReceipt};
use crate::partition::PartitionNode;

pub struct BatteryApi {
    node: Arc<PartitionNode>,
    guard: RoleGuard,
}

impl BatteryApi {
    pub fn new(node: Arc<PartitionNode>) -> Self {
        let guard = RoleGuard::new(node.config().msp_roles.clone());
        Self { node, guard }
    }

    // ==========================================
    // 写操作
    // ==========================================

    pub fn manufacture(&self, caller: &CallerIdentity, order: &ManufactureOrder) -> ApiResult<ManufactureReceipt> {
        self.guard.require(caller, "Manufacture", permissions::MANUFACTURE)?;
        let _gate = self.node.write_gate()?;
        Ok(self.node.manufacturing.manufacture(order)?)
    }

    /// 制造（JSON 载荷）；载荷解析失败不产生任何写入
    pub fn manufacture_json(&self, caller: &CallerIdentity, payload: &str) -> ApiResult<ManufactureReceipt> {
        self.guard.require(caller, "Manufacture", permissions::MANUFACTURE)?;
        let order: ManufactureOrder = parse_payload("ManufactureOrder", payload)?;
        self.manufacture(caller, &order)
    }

    pub fn verify_battery(&self, caller: &CallerIdentity, battery_id: &str) -> ApiResult<Battery> {
        self.guard.require(caller, "VerifyBattery", permissions::VERIFY)?;
        let _gate = self.node.write_gate()?;
        Ok(self.node.lifecycle.verify_battery(battery_id)?)
    }

    // ==========================================
    // 公开查询
    // ==========================================

    pub fn query_battery(&self, battery_id: &str) -> ApiResult<Battery> {
        Ok(self.node.queries.query_battery(battery_id)?)
    }

    pub fn query_all_batteries(&self) -> ApiResult<Vec<Battery>> {
        Ok(self.node.queries.query_all()?)
    }

    pub fn query_passport(&self, battery_id: &str) -> ApiResult<BatteryPassport> {
        Ok(self.node.queries.query_passport(battery_id)?)
    }

    pub fn battery_details(&self, battery_id: &str) -> ApiResult<BatteryDetails> {
        Ok(self.node.queries.battery_details(battery_id)?)
    }

    pub fn recycle_status_summary(&self, battery_id: &str) -> ApiResult<RecycleStatusSummary> {
        Ok(self.node.queries.recycle_status_summary(battery_id)?)
    }

    // ==========================================
    // 角色受限查询
    // ==========================================

    pub fn query_performance(&self, caller: &CallerIdentity, battery_id: &str) -> ApiResult<PerformanceView> {
        self.guard
            .require(caller, "QueryPerformance", permissions::QUERY_PERFORMANCE)?;
        Ok(self.node.queries.query_performance(battery_id)?)
    }

    pub fn query_soce_and_life_cycle(
        &self,
        caller: &CallerIdentity,
        battery_id: &str,
    ) -> ApiResult<LifeCycleView> {
        self.guard
            .require(caller, "QuerySoceAndLifeCycle", permissions::QUERY_ANALYSIS)?;
        Ok(self.node.queries.query_soce_and_life_cycle(battery_id)?)
    }

    pub fn list_maintenance_requests(&self, caller: &CallerIdentity) -> ApiResult<Vec<Battery>> {
        self.guard.require(
            caller,
            "ListMaintenanceRequests",
            permissions::QUERY_MAINTENANCE_REQUESTS,
        )?;
        Ok(self.node.queries.query_by_flag(BatteryFlag::MaintenanceRequest)?)
    }

    pub fn list_analysis_requests(&self, caller: &CallerIdentity) -> ApiResult<Vec<Battery>> {
        self.guard
            .require(caller, "ListAnalysisRequests", permissions::QUERY_ANALYSIS)?;
        Ok(self.node.queries.query_by_flag(BatteryFlag::AnalysisRequest)?)
    }

    pub fn list_recyclable(&self, caller: &CallerIdentity) -> ApiResult<Vec<Battery>> {
        self.guard
            .require(caller, "ListRecyclable", permissions::QUERY_RECYCLABLE)?;
        Ok(self.node.queries.query_by_flag(BatteryFlag::RecycleAvailability)?)
    }
}
