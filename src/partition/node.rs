// ==========================================
// 动力电池供应链账本 - 分区节点
// ==========================================
// 一个分区 = 一个 SQLite 数据库 + 一组引擎 + 一把写入闸门
// 只读查询经 handle_query 对其他分区开放
// ==========================================

use crate::config::{ConfigManager, LedgerConfig};
use crate::domain::types::PartitionKind;
use crate::engine::error::EngineError;
use crate::engine::{
    BatteryQueryService, ExtractionEngine, LifecycleTracker, MaterialInventory, ManufacturingEngine,
};
use crate::partition::client::{
    InvokeResponse, STATUS_BAD_REQUEST, STATUS_INTERNAL_ERROR, STATUS_NOT_FOUND,
};
use crate::repository::{
    BatteryRepository, MaterialRepository, RecordStore, RepositoryError, RepositoryResult,
    SqliteRecordStore,
};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// 对外开放的只读函数
pub mod functions {
    pub const QUERY_ALL_RAW_MATERIALS: &str = "QueryAllRawMaterials";
    pub const QUERY_RAW_MATERIAL: &str = "QueryRawMaterial";
    pub const QUERY_ALL_BATTERIES: &str = "QueryAllBatteries";
    pub const QUERY_ALL: &str = "QueryAll";
    pub const QUERY_BATTERY: &str = "QueryBattery";
    pub const QUERY_ALL_PASSPORTS: &str = "QueryAllPassports";
}

pub struct PartitionNode {
    kind: PartitionKind,
    name: String,
    store: Arc<SqliteRecordStore>,
    config_manager: ConfigManager,
    config: LedgerConfig,
    write_gate: Mutex<()>,

    pub materials: Arc<MaterialRepository>,
    pub batteries: Arc<BatteryRepository>,
    pub inventory: Arc<MaterialInventory>,
    pub manufacturing: ManufacturingEngine,
    pub lifecycle: LifecycleTracker,
    pub extraction: ExtractionEngine,
    pub queries: BatteryQueryService,
}

impl PartitionNode {
    /// 打开分区（使用默认名称）
    pub fn open(kind: PartitionKind, db_path: &str) -> RepositoryResult<Self> {
        Self::open_named(kind, kind.default_name(), db_path)
    }

    /// 打开分区：建表 → 读取配置 → 组装引擎
    pub fn open_named(kind: PartitionKind, name: &str, db_path: &str) -> RepositoryResult<Self> {
        let store = Arc::new(SqliteRecordStore::new(db_path)?);
        let config_manager = ConfigManager::from_connection(store.connection())?;
        let config = config_manager.load_ledger_config()?;

        let dyn_store: Arc<dyn RecordStore> = store.clone();
        let materials = Arc::new(MaterialRepository::new(Arc::clone(&dyn_store)));
        let batteries = Arc::new(BatteryRepository::new(dyn_store));

        let inventory = Arc::new(MaterialInventory::new(Arc::clone(&materials)));
        let manufacturing = ManufacturingEngine::new(Arc::clone(&inventory), Arc::clone(&batteries));
        let lifecycle = LifecycleTracker::new(Arc::clone(&batteries), config.lifecycle_steps);
        let extraction = ExtractionEngine::new(
            Arc::clone(&materials),
            Arc::clone(&batteries),
            config.extraction.clone(),
        );
        let queries = BatteryQueryService::new(Arc::clone(&batteries));

        info!(partition = name, kind = ?kind, db_path, "分区已打开");

        Ok(Self {
            kind,
            name: name.to_string(),
            store,
            config_manager,
            config,
            write_gate: Mutex::new(()),
            materials,
            batteries,
            inventory,
            manufacturing,
            lifecycle,
            extraction,
            queries,
        })
    }

    pub fn kind(&self) -> PartitionKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contract_name(&self) -> &'static str {
        self.kind.contract_name()
    }

    pub fn store(&self) -> &Arc<SqliteRecordStore> {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn config_manager(&self) -> &ConfigManager {
        &self.config_manager
    }

    /// 获取写入闸门：同一分区的写操作串行执行
    pub fn write_gate(&self) -> RepositoryResult<MutexGuard<'_, ()>> {
        self.write_gate
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 只读查询入口
    // ==========================================

    /// 处理跨分区只读调用
    pub fn handle_query(&self, function: &str, args: &[String]) -> InvokeResponse {
        match function {
            functions::QUERY_ALL_RAW_MATERIALS => respond(self.inventory.query_all()),
            functions::QUERY_RAW_MATERIAL => match args.first() {
                Some(id) => respond(self.inventory.query(id)),
                None => InvokeResponse::error(STATUS_BAD_REQUEST, "缺少参数: materialID"),
            },
            functions::QUERY_ALL_BATTERIES | functions::QUERY_ALL => respond(self.queries.query_all()),
            functions::QUERY_BATTERY => match args.first() {
                Some(id) => respond(self.queries.query_battery(id)),
                None => InvokeResponse::error(STATUS_BAD_REQUEST, "缺少参数: batteryID"),
            },
            functions::QUERY_ALL_PASSPORTS => respond(self.queries.query_all_passports()),
            other => InvokeResponse::error(STATUS_BAD_REQUEST, format!("未知函数: {}", other)),
        }
    }
}

/// 查询结果 → 响应
fn respond<T: Serialize>(result: Result<T, EngineError>) -> InvokeResponse {
    match result {
        Ok(value) => match serde_json::to_vec(&value) {
            Ok(payload) => InvokeResponse::ok(payload),
            Err(e) => InvokeResponse::error(STATUS_INTERNAL_ERROR, e.to_string()),
        },
        Err(e @ EngineError::NotFound { .. }) => InvokeResponse::error(STATUS_NOT_FOUND, e.to_string()),
        Err(e) => InvokeResponse::error(STATUS_INTERNAL_ERROR, e.to_string()),
    }
}
