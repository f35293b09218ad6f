// ==========================================
// 动力电池供应链账本 - API层错误类型
// ==========================================
// 职责: 汇总引擎/仓储错误，补充身份与载荷错误
// 所有错误信息必须包含出错的标识与原因
// ==========================================

use crate::domain::types::OrgRole;
use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 身份与权限
    // ==========================================
    #[error("权限不足: msp_id={msp_id}, operation={operation}, allowed={allowed:?}")]
    PermissionDenied {
        msp_id: String,
        operation: String,
        allowed: Vec<OrgRole>,
    },

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("库存不足: material_id={material_id}, required={required}, available={available}")]
    InsufficientQuantity {
        material_id: String,
        required: u64,
        available: u64,
    },

    #[error("前置条件不满足: {0}")]
    PreconditionFailed(String),

    #[error("电池不可回收: battery_id={0}")]
    NotRecyclable(String),

    #[error("输入格式错误: {0}")]
    MalformedInput(String),

    #[error("远端分区调用失败: {0}")]
    UpstreamFailure(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => ApiError::DatabaseTransactionError(msg),
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::SerializationError { key, message }
            | RepositoryError::CorruptRecord { key, message } => {
                ApiError::InternalError(format!("记录编解码失败 (key={}): {}", key, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            EngineError::InsufficientQuantity {
                material_id,
                required,
                available,
            } => ApiError::InsufficientQuantity {
                material_id,
                required,
                available,
            },
            EngineError::PreconditionFailed { battery_id, reason } => {
                ApiError::PreconditionFailed(format!("battery_id={}, {}", battery_id, reason))
            }
            EngineError::NotRecyclable { battery_id } => ApiError::NotRecyclable(battery_id),
            EngineError::MalformedInput(msg) => ApiError::MalformedInput(msg),
            EngineError::UpstreamFailure {
                partition,
                function,
                message,
            } => ApiError::UpstreamFailure(format!(
                "partition={}, function={}, {}",
                partition, function, message
            )),
            EngineError::Repository(e) => ApiError::from(e),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

/// 解析调用方提交的 JSON 载荷
pub fn parse_payload<T: serde::de::DeserializeOwned>(what: &str, raw: &str) -> ApiResult<T> {
    serde_json::from_str(raw).map_err(|e| ApiError::MalformedInput(format!("{}: {}", what, e)))
}
