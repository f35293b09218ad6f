// ==========================================
// 动力电池供应链账本 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 分区键值存储之上的类型化读写
// 约束: 多记录写入一律经 WriteBatch 原子提交
// ==========================================

pub mod battery_repo;
pub mod error;
pub mod material_repo;
pub mod record_store;

// 重导出核心仓储
pub use battery_repo::BatteryRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use material_repo::MaterialRepository;
pub use record_store::{keys, RecordStore, SqliteRecordStore, WriteBatch};
