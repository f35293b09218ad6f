// ==========================================
// 动力电池供应链账本 - 应用层
// ==========================================
// 职责: 组装分区网络，供命令行入口使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_data_dir, LedgerNetwork};
