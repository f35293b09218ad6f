// ==========================================
// 动力电池供应链账本 - 同步 API
// ==========================================
// 职责: 触发本分区从远端分区拉取同步
// 说明: 同步属于平台操作，不做角色校验；执行期间持有本分区写入闸门
// ==========================================

use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::engine::inventory::ReconcileReport;
use crate::partition::{BatterySyncReport, PartitionClient, PartitionNode, PartitionSyncCoordinator, SyncSource};

pub struct SyncApi {
    coordinator: PartitionSyncCoordinator,
}

impl SyncApi {
    pub fn new(node: Arc<PartitionNode>, client: Arc<dyn PartitionClient>) -> Self {
        Self {
            coordinator: PartitionSyncCoordinator::new(node, client),
        }
    }

    pub fn sync_materials_from(&self, source: &SyncSource) -> ApiResult<ReconcileReport> {
        let _gate = self.coordinator.local().write_gate()?;
        Ok(self.coordinator.sync_materials_from(source)?)
    }

    pub fn sync_batteries_from(&self, source: &SyncSource) -> ApiResult<BatterySyncReport> {
        let _gate = self.coordinator.local().write_gate()?;
        Ok(self.coordinator.sync_batteries_from(source)?)
    }
}
