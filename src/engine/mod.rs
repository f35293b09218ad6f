// ==========================================
// 动力电池供应链账本 - 引擎层
// ==========================================
// 职责: 库存、制造、生命周期、拆解提取的业务规则
// 红线: Engine 不拼 SQL, 多记录写入经 WriteBatch 原子提交
// ==========================================

pub mod battery_query;
pub mod error;
pub mod extraction;
pub mod inventory;
pub mod lifecycle;
pub mod manufacturing;

// 重导出核心引擎
pub use battery_query::{BatteryFlag, BatteryQueryService};
pub use error::{EngineError, EngineResult};
pub use extraction::{ExtractedMaterial, ExtractionEngine, ExtractionReport, ExtractionSettings};
pub use inventory::{ConsumeOutcome, MaterialInventory, ReconcileReport};
pub use lifecycle::LifecycleTracker;
pub use manufacturing::{ManufactureOrder, ManufactureReceipt, ManufacturingEngine};
