// ==========================================
// 动力电池供应链账本 - 配置层
// ==========================================
// 职责: 分区配置管理（生命周期步长、提取参数、MSP 角色映射）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, default_msp_roles, ConfigManager, LedgerConfig};
