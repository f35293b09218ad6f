// ==========================================
// 动力电池供应链账本 - 应用状态
// ==========================================
// 职责: 在数据目录下打开五个分区，并通过进程内客户端互联
// ==========================================

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::{BatteryApi, LifecycleApi, MaterialApi, RecycleApi, SyncApi};
use crate::domain::types::PartitionKind;
use crate::partition::{LocalPartitionClient, PartitionClient, PartitionNode};
use crate::repository::{RepositoryError, RepositoryResult};

/// 账本网络：五个分区 + 进程内调用客户端
pub struct LedgerNetwork {
    data_dir: PathBuf,
    client: Arc<LocalPartitionClient>,
    material_supply: Arc<PartitionNode>,
    manufacturing: Arc<PartitionNode>,
    update: Arc<PartitionNode>,
    recycle: Arc<PartitionNode>,
    public: Arc<PartitionNode>,
}

impl LedgerNetwork {
    /// 打开（或创建）数据目录下的全部分区数据库
    ///
    /// 每个分区一个文件: <data_dir>/<partition-name>.db
    pub fn open(data_dir: &Path) -> RepositoryResult<Self> {
        std::fs::create_dir_all(data_dir).map_err(|e| {
            RepositoryError::InternalError(format!(
                "无法创建数据目录 {}: {}",
                data_dir.display(),
                e
            ))
        })?;

        let open = |kind: PartitionKind| -> RepositoryResult<Arc<PartitionNode>> {
            let path = data_dir.join(format!("{}.db", kind.default_name()));
            Ok(Arc::new(PartitionNode::open(kind, &path.to_string_lossy())?))
        };

        let network = Self {
            data_dir: data_dir.to_path_buf(),
            client: Arc::new(LocalPartitionClient::new()),
            material_supply: open(PartitionKind::MaterialSupply)?,
            manufacturing: open(PartitionKind::Manufacturing)?,
            update: open(PartitionKind::Update)?,
            recycle: open(PartitionKind::Recycle)?,
            public: open(PartitionKind::Public)?,
        };

        for kind in PartitionKind::all() {
            network.client.register(network.node(kind));
        }

        tracing::info!(data_dir = %data_dir.display(), "账本网络已就绪");
        Ok(network)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn node(&self, kind: PartitionKind) -> Arc<PartitionNode> {
        let node = match kind {
            PartitionKind::MaterialSupply => &self.material_supply,
            PartitionKind::Manufacturing => &self.manufacturing,
            PartitionKind::Update => &self.update,
            PartitionKind::Recycle => &self.recycle,
            PartitionKind::Public => &self.public,
        };
        Arc::clone(node)
    }

    pub fn client(&self) -> Arc<dyn PartitionClient> {
        self.client.clone()
    }

    // ===== API 工厂 =====

    pub fn material_api(&self, kind: PartitionKind) -> MaterialApi {
        MaterialApi::new(self.node(kind))
    }

    pub fn battery_api(&self, kind: PartitionKind) -> BatteryApi {
        BatteryApi::new(self.node(kind))
    }

    pub fn lifecycle_api(&self, kind: PartitionKind) -> LifecycleApi {
        LifecycleApi::new(self.node(kind))
    }

    pub fn recycle_api(&self, kind: PartitionKind) -> RecycleApi {
        RecycleApi::new(self.node(kind))
    }

    pub fn sync_api(&self, kind: PartitionKind) -> SyncApi {
        SyncApi::new(self.node(kind), self.client())
    }
}

/// 获取默认数据目录
///
/// 优先读取环境变量 BATTERY_LEDGER_DATA_DIR，否则使用用户数据目录
pub fn get_default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var("BATTERY_LEDGER_DATA_DIR") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    match dirs::data_dir() {
        Some(data_dir) => {
            #[cfg(debug_assertions)]
            {
                data_dir.join("battery-ledger-dev")
            }
            #[cfg(not(debug_assertions))]
            {
                data_dir.join("battery-ledger")
            }
        }
        None => PathBuf::from("./battery-ledger-data"),
    }
}
