// ==========================================
// 动力电池供应链账本 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)，与分区状态同库
// ==========================================

use crate::db::open_partition_connection;
use crate::domain::lifecycle::LifecycleSteps;
use crate::domain::types::OrgRole;
use crate::engine::extraction::{default_extraction_rates, ExtractionSettings};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// LedgerConfig - 类型化配置
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    pub lifecycle_steps: LifecycleSteps,
    pub extraction: ExtractionSettings,
    /// MSP ID → 组织角色
    pub msp_roles: BTreeMap<String, OrgRole>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            lifecycle_steps: LifecycleSteps::default(),
            extraction: ExtractionSettings::default(),
            msp_roles: default_msp_roles(),
        }
    }
}

/// 默认 MSP → 角色映射（Org1..Org7）
pub fn default_msp_roles() -> BTreeMap<String, OrgRole> {
    [
        ("Org1MSP", OrgRole::MaterialSupplier),
        ("Org2MSP", OrgRole::Manufacturer),
        ("Org3MSP", OrgRole::EvOperator),
        ("Org4MSP", OrgRole::Maintenance),
        ("Org5MSP", OrgRole::Analysis),
        ("Org6MSP", OrgRole::Recycler),
        ("Org7MSP", OrgRole::Verifier),
    ]
    .into_iter()
    .map(|(msp, role)| (msp.to_string(), role))
    .collect()
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 分区数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_partition_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 从 config_kv 表读取配置值，带默认值
    pub fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global 配置（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        serde_json::to_string(&json!(config_map)).map_err(|e| RepositoryError::SerializationError {
            key: "config_snapshot".to_string(),
            message: e.to_string(),
        })
    }

    // ===== 类型化读取 =====

    /// 数值型配置；缺失或格式错误时使用默认值
    fn get_parsed_or<T: FromStr + Copy>(&self, key: &str, default: T) -> RepositoryResult<T> {
        match self.get_config_value(key)? {
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    warn!(key, value = %raw, "配置值格式错误，使用默认值");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    /// JSON 型配置；缺失或格式错误时使用默认值
    fn get_json_or<T: serde::de::DeserializeOwned>(&self, key: &str, default: T) -> RepositoryResult<T> {
        match self.get_config_value(key)? {
            Some(raw) => match serde_json::from_str::<T>(&raw) {
                Ok(v) => Ok(v),
                Err(e) => {
                    warn!(key, error = %e, "配置 JSON 解析失败，使用默认值");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    /// 加载分区账本配置
    pub fn load_ledger_config(&self) -> RepositoryResult<LedgerConfig> {
        let defaults = LedgerConfig::default();

        let lifecycle_steps = LifecycleSteps {
            maintenance_soc_step: self.get_parsed_or(
                config_keys::MAINTENANCE_SOC_STEP,
                defaults.lifecycle_steps.maintenance_soc_step,
            )?,
            accident_soh_step: self.get_parsed_or(
                config_keys::ACCIDENT_SOH_STEP,
                defaults.lifecycle_steps.accident_soh_step,
            )?,
        };

        let supplier = self.get_config_or_default(
            config_keys::RECYCLE_SUPPLIER_ID,
            &defaults.extraction.recycle_supplier_id,
        )?;
        let extraction = ExtractionSettings {
            recycle_supplier_id: supplier,
            rates: self.get_json_or(config_keys::EXTRACTION_RATES, default_extraction_rates())?,
        };

        let msp_roles = self.get_json_or(config_keys::MSP_ROLE_MAP, default_msp_roles())?;

        Ok(LedgerConfig {
            lifecycle_steps,
            extraction,
            msp_roles,
        })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 生命周期
    pub const MAINTENANCE_SOC_STEP: &str = "lifecycle/maintenance_soc_step";
    pub const ACCIDENT_SOH_STEP: &str = "lifecycle/accident_soh_step";

    // 拆解提取
    pub const RECYCLE_SUPPLIER_ID: &str = "extraction/recycle_supplier_id";
    pub const EXTRACTION_RATES: &str = "extraction/rates"; // JSON: {"Lithium": 0.3, ...}

    // 身份
    pub const MSP_ROLE_MAP: &str = "roles/msp_map"; // JSON: {"Org1MSP": "MATERIAL_SUPPLIER", ...}
}
