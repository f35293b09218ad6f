// ==========================================
// 动力电池供应链账本 - API 层
// ==========================================
// 职责: 调用方身份校验 + 写入闸门 + 载荷解析，委托给分区引擎
// ==========================================

pub mod battery_api;
pub mod error;
pub mod identity;
pub mod lifecycle_api;
pub mod material_api;
pub mod recycle_api;
pub mod sync_api;

// 重导出核心类型
pub use battery_api::BatteryApi;
pub use error::{ApiError, ApiResult};
pub use identity::{permissions, CallerIdentity, RoleGuard};
pub use lifecycle_api::LifecycleApi;
pub use material_api::{MaterialApi, RegisterMaterialRequest};
pub use recycle_api::RecycleApi;
pub use sync_api::SyncApi;
