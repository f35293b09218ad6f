// ==========================================
// 动力电池供应链账本 - 引擎层错误类型
// ==========================================
// 每条错误信息都带上出错的标识与违反的前置条件
// ==========================================

use crate::domain::lifecycle::TransitionViolation;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("记录不存在: {entity} id={id}")]
    NotFound { entity: &'static str, id: String },

    #[error("库存不足: material_id={material_id}, required={required}, available={available}")]
    InsufficientQuantity {
        material_id: String,
        required: u64,
        available: u64,
    },

    #[error("前置条件不满足: battery_id={battery_id}, {reason}")]
    PreconditionFailed { battery_id: String, reason: String },

    #[error("电池不可回收: battery_id={battery_id}, recycleAvailability=false")]
    NotRecyclable { battery_id: String },

    #[error("输入格式错误: {0}")]
    MalformedInput(String),

    #[error("远端分区调用失败: partition={partition}, function={function}, {message}")]
    UpstreamFailure {
        partition: String,
        function: String,
        message: String,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl EngineError {
    pub fn material_not_found(id: &str) -> Self {
        EngineError::NotFound {
            entity: "MaterialRecord",
            id: id.to_string(),
        }
    }

    pub fn battery_not_found(id: &str) -> Self {
        EngineError::NotFound {
            entity: "Battery",
            id: id.to_string(),
        }
    }

    /// 生命周期违规 → 引擎错误
    pub fn from_violation(battery_id: &str, violation: TransitionViolation) -> Self {
        match violation {
            TransitionViolation::NotRecyclable => EngineError::NotRecyclable {
                battery_id: battery_id.to_string(),
            },
            other => EngineError::PreconditionFailed {
                battery_id: battery_id.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
