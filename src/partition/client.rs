// ==========================================
// 动力电池供应链账本 - 跨分区调用端口
// ==========================================
// PartitionClient: 向指定分区的合约发起只读调用
// LocalPartitionClient: 进程内注册表实现（分区名 → PartitionNode）
// ==========================================

use crate::engine::error::{EngineError, EngineResult};
use crate::partition::node::PartitionNode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// 调用请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub partition: String,
    pub contract: String,
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl InvokeRequest {
    pub fn new(partition: &str, contract: &str, function: &str) -> Self {
        Self {
            partition: partition.to_string(),
            contract: contract.to_string(),
            function: function.to_string(),
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// 调用响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeResponse {
    pub status: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub payload: Vec<u8>,
}

impl InvokeResponse {
    pub fn ok(payload: Vec<u8>) -> Self {
        Self {
            status: STATUS_OK,
            message: String::new(),
            payload,
        }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            payload: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

// ==========================================
// PartitionClient - 跨分区调用接口
// ==========================================
pub trait PartitionClient: Send + Sync {
    fn invoke(&self, request: &InvokeRequest) -> InvokeResponse;
}

/// 发起调用，非 200 映射为 UpstreamFailure
pub fn invoke_checked(client: &dyn PartitionClient, request: &InvokeRequest) -> EngineResult<Vec<u8>> {
    let response = client.invoke(request);
    if !response.is_success() {
        return Err(EngineError::UpstreamFailure {
            partition: request.partition.clone(),
            function: request.function.clone(),
            message: format!("status={}, message={}", response.status, response.message),
        });
    }
    Ok(response.payload)
}

// ==========================================
// LocalPartitionClient - 进程内分区注册表
// ==========================================
#[derive(Default)]
pub struct LocalPartitionClient {
    nodes: RwLock<HashMap<String, Arc<PartitionNode>>>,
}

impl LocalPartitionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册分区（同名覆盖）
    pub fn register(&self, node: Arc<PartitionNode>) {
        if let Ok(mut nodes) = self.nodes.write() {
            nodes.insert(node.name().to_string(), node);
        }
    }

    pub fn node(&self, partition: &str) -> Option<Arc<PartitionNode>> {
        self.nodes
            .read()
            .ok()
            .and_then(|nodes| nodes.get(partition).cloned())
    }
}

impl PartitionClient for LocalPartitionClient {
    fn invoke(&self, request: &InvokeRequest) -> InvokeResponse {
        debug!(
            partition = %request.partition,
            contract = %request.contract,
            function = %request.function,
            "跨分区调用"
        );

        let node = match self.node(&request.partition) {
            Some(node) => node,
            None => {
                return InvokeResponse::error(
                    STATUS_NOT_FOUND,
                    format!("分区不存在: {}", request.partition),
                )
            }
        };

        if node.contract_name() != request.contract {
            return InvokeResponse::error(
                STATUS_NOT_FOUND,
                format!(
                    "合约未部署: partition={}, contract={}",
                    request.partition, request.contract
                ),
            );
        }

        node.handle_query(&request.function, &request.args)
    }
}
