// ==========================================
// 动力电池供应链账本 - 原材料 API
// ==========================================
// 职责: 原材料登记、消耗、认证与查询
// 写操作: 角色校验 → 分区写入闸门 → 引擎
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::error::{parse_payload, ApiError, ApiResult};
use crate::api::identity::{permissions, CallerIdentity, RoleGuard};
use crate::domain::material::{MaterialCatalog, MaterialRecord};
use crate::domain::types::MaterialStatus;
use crate::engine::extraction::new_material_id;
use crate::engine::inventory::ConsumeOutcome;
use crate::partition::PartitionNode;

/// 登记请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterMaterialRequest {
    #[serde(rename = "materialID", default)]
    pub material_id: Option<String>,
    #[serde(rename = "supplierID")]
    pub supplier_id: String,
    #[serde(alias = "materialType")]
    pub name: String,
    pub quantity: u64,
}

// ==========================================
// MaterialApi - 原材料 API
// ==========================================
pub struct MaterialApi {
    node: Arc<PartitionNode>,
    guard: RoleGuard,
}

impl MaterialApi {
    pub fn new(node: Arc<PartitionNode>) -> Self {
        let guard = RoleGuard::new(node.config().msp_roles.clone());
        Self { node, guard }
    }

    // ==========================================
    // 写操作
    // ==========================================

    /// 登记原材料（未提供 ID 时生成 MATERIAL-<uuid>）
    pub fn register_material(
        &self,
        caller: &CallerIdentity,
        request: &RegisterMaterialRequest,
    ) -> ApiResult<MaterialRecord> {
        self.guard
            .require(caller, "RegisterMaterial", permissions::REGISTER_MATERIAL)?;
        let _gate = self.node.write_gate()?;

        let material_id = match request.material_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => new_material_id(),
        };

        Ok(self.node.inventory.register(
            &material_id,
            &request.supplier_id,
            &request.name,
            request.quantity,
        )?)
    }

    /// 登记原材料（JSON 载荷）
    pub fn register_material_json(&self, caller: &CallerIdentity, payload: &str) -> ApiResult<MaterialRecord> {
        let request: RegisterMaterialRequest = parse_payload("RegisterMaterialRequest", payload)?;
        self.register_material(caller, &request)
    }

    pub fn consume_material(
        &self,
        caller: &CallerIdentity,
        material_id: &str,
        amount: u64,
    ) -> ApiResult<MaterialRecord> {
        self.guard
            .require(caller, "ConsumeMaterial", permissions::CONSUME_MATERIAL)?;
        let _gate = self.node.write_gate()?;
        Ok(self.node.inventory.consume(material_id, amount)?)
    }

    /// 幂等消耗（重复投递的 requestID 不再扣减）
    pub fn consume_material_once(
        &self,
        caller: &CallerIdentity,
        request_id: &str,
        material_id: &str,
        amount: u64,
    ) -> ApiResult<ConsumeOutcome> {
        self.guard
            .require(caller, "ConsumeMaterial", permissions::CONSUME_MATERIAL)?;
        if request_id.trim().is_empty() {
            return Err(ApiError::MalformedInput("requestID 不能为空".to_string()));
        }
        let _gate = self.node.write_gate()?;
        Ok(self.node.inventory.consume_once(request_id, material_id, amount)?)
    }

    pub fn verify_material(&self, caller: &CallerIdentity, material_id: &str) -> ApiResult<MaterialRecord> {
        self.guard.require(caller, "VerifyMaterial", permissions::VERIFY)?;
        let _gate = self.node.write_gate()?;
        Ok(self.node.inventory.verify_material(material_id)?)
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn query_material(&self, material_id: &str) -> ApiResult<MaterialRecord> {
        Ok(self.node.inventory.query(material_id)?)
    }

    pub fn query_all_materials(&self) -> ApiResult<Vec<MaterialRecord>> {
        Ok(self.node.inventory.query_all()?)
    }

    /// 按状态查询（NEW / RECYCLED / VERIFIED / AVAILABLE / USED）
    pub fn query_by_status(&self, status: &str) -> ApiResult<Vec<MaterialRecord>> {
        let status: MaterialStatus = status.parse().map_err(ApiError::MalformedInput)?;
        debug!(%status, "按状态查询原材料");
        Ok(self.node.inventory.query_by_status(status)?)
    }

    pub fn catalog(&self) -> ApiResult<MaterialCatalog> {
        Ok(self.node.inventory.catalog()?)
    }
}
