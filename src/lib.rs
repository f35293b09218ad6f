// ==========================================
// 动力电池供应链账本 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 按组织角色分区的原材料溯源与电池生命周期账本
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体、类型与生命周期状态机
pub mod domain;

// 数据仓储层 - 分区键值存储
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 分区层 - 节点、跨分区调用、同步
pub mod partition;

// 导入层 - 种子数据
pub mod importer;

// 配置层 - 分区配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 身份校验与业务接口
pub mod api;

// 应用层 - 分区网络组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    Availability, BatteryStatus, MaterialOrigin, MaterialStatus, OrgRole, PartitionKind,
    VerificationMark,
};

// 领域实体
pub use domain::{
    Battery, BatteryPassport, LifecycleEvent, MaterialRecord, RawMaterialDetail, UsageCounter,
};

// 引擎
pub use engine::{
    ExtractionEngine, LifecycleTracker, ManufacturingEngine, MaterialInventory,
};

// 分区
pub use partition::{LocalPartitionClient, PartitionClient, PartitionNode, PartitionSyncCoordinator};

// API
pub use api::{ApiError, ApiResult, CallerIdentity};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "动力电池供应链账本";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
