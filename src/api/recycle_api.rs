// ==========================================
// 动力电池供应链账本 - 回收 API
// ==========================================
// 职责: 拆解提取、提取记录查询、可回收量估算
// ==========================================

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::error::{parse_payload, ApiResult};
use crate::api::identity::{permissions, CallerIdentity, RoleGuard};
use crate::engine::extraction::ExtractionReport;
use crate::partition::PartitionNode;

pub struct RecycleApi {
    node: Arc<PartitionNode>,
    guard: RoleGuard,
}

impl RecycleApi {
    pub fn new(node: Arc<PartitionNode>) -> Self {
        let guard = RoleGuard::new(node.config().msp_roles.clone());
        Self { node, guard }
    }

    /// 拆解提取；requested: 原材料类型 → 声明数量
    pub fn extract(
        &self,
        caller: &CallerIdentity,
        battery_id: &str,
        requested: &BTreeMap<String, u64>,
    ) -> ApiResult<ExtractionReport> {
        self.guard.require(caller, "ExtractMaterials", permissions::EXTRACT)?;
        let _gate = self.node.write_gate()?;
        Ok(self.node.extraction.extract(battery_id, requested)?)
    }

    pub fn extract_json(&self, caller: &CallerIdentity, battery_id: &str, payload: &str) -> ApiResult<ExtractionReport> {
        self.guard.require(caller, "ExtractMaterials", permissions::EXTRACT)?;
        let requested: BTreeMap<String, u64> = parse_payload("ExtractionQuantities", payload)?;
        self.extract(caller, battery_id, &requested)
    }

    pub fn query_extraction(&self, battery_id: &str) -> ApiResult<ExtractionReport> {
        Ok(self.node.extraction.query_extraction(battery_id)?)
    }

    pub fn estimate_recoverable(&self, battery_id: &str) -> ApiResult<BTreeMap<String, u64>> {
        Ok(self.node.extraction.estimate_recoverable(battery_id)?)
    }
}
