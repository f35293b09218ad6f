// ==========================================
// 动力电池供应链账本 - 分区层
// ==========================================
// 职责: 分区节点组装、跨分区只读调用、拉取式同步
// ==========================================

pub mod client;
pub mod node;
pub mod sync;

pub use client::{
    invoke_checked, InvokeRequest, InvokeResponse, LocalPartitionClient, PartitionClient,
};
pub use node::{functions, PartitionNode};
pub use sync::{BatterySyncReport, PartitionSyncCoordinator, SyncSource};
