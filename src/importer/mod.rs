// ==========================================
// 动力电池供应链账本 - 导入层
// ==========================================
// 职责: 从 CSV 播种原材料批次
// ==========================================

pub mod error;
pub mod material_seed;

pub use error::{ImportError, ImportResult};
pub use material_seed::{ImportSummary, MaterialSeedImporter, RejectedRow};
