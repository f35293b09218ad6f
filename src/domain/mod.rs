// ==========================================
// 动力电池供应链账本 - 领域模型层
// ==========================================
// 职责: 定义原材料、电池、护照与生命周期状态机
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod battery;
pub mod lifecycle;
pub mod material;
pub mod types;

// 重导出核心类型
pub use battery::{
    Battery, BatteryDetails, BatteryPassport, IncidentReport, LifeCycleView, MaintenanceEntry,
    MaintenanceReading, PerformanceView, PhysicalAttributes, RecycleStatusSummary,
};
pub use lifecycle::{apply_event, validate_event, LifecycleEvent, LifecycleSteps, TransitionViolation};
pub use material::{
    ConsumptionMarker, MaterialCatalog, MaterialRecord, RawMaterialDetail, UsageCounter,
};
pub use types::{
    Availability, BatteryStatus, MaterialOrigin, MaterialStatus, OrgRole, PartitionKind,
    VerificationMark,
};
