// ==========================================
// 动力电池供应链账本 - 调用方身份与角色校验
// ==========================================
// 调用方 MSP ID 经配置映射为 OrgRole，再与操作允许的角色集合比对
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::OrgRole;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// 调用方身份
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub msp_id: String,
}

impl CallerIdentity {
    pub fn new(msp_id: impl Into<String>) -> Self {
        Self {
            msp_id: msp_id.into(),
        }
    }
}

/// 各操作允许的角色
pub mod permissions {
    use crate::domain::types::OrgRole::{self, *};

    pub const REGISTER_MATERIAL: &[OrgRole] = &[MaterialSupplier];
    pub const CONSUME_MATERIAL: &[OrgRole] = &[MaterialSupplier];
    pub const MANUFACTURE: &[OrgRole] = &[Manufacturer];
    pub const REQUEST_MAINTENANCE: &[OrgRole] = &[EvOperator];
    pub const REQUEST_ANALYSIS: &[OrgRole] = &[EvOperator];
    pub const MAINTENANCE_LOG: &[OrgRole] = &[Maintenance];
    pub const RECYCLE_AVAILABILITY: &[OrgRole] = &[Analysis];
    pub const EXTRACT: &[OrgRole] = &[Recycler];
    pub const VERIFY: &[OrgRole] = &[Verifier];
    pub const QUERY_MAINTENANCE_REQUESTS: &[OrgRole] = &[EvOperator, Maintenance];
    pub const QUERY_ANALYSIS: &[OrgRole] = &[EvOperator, Analysis];
    pub const QUERY_RECYCLABLE: &[OrgRole] = &[EvOperator, Recycler];
    pub const QUERY_PERFORMANCE: &[OrgRole] = &[EvOperator, Maintenance, Analysis];
}

// ==========================================
// RoleGuard - 角色校验
// ==========================================
#[derive(Debug, Clone)]
pub struct RoleGuard {
    msp_roles: BTreeMap<String, OrgRole>,
}

impl RoleGuard {
    pub fn new(msp_roles: BTreeMap<String, OrgRole>) -> Self {
        Self { msp_roles }
    }

    pub fn role_of(&self, caller: &CallerIdentity) -> Option<OrgRole> {
        self.msp_roles.get(&caller.msp_id).copied()
    }

    /// 校验调用方角色，返回其角色
    pub fn require(
        &self,
        caller: &CallerIdentity,
        operation: &str,
        allowed: &[OrgRole],
    ) -> ApiResult<OrgRole> {
        match self.role_of(caller) {
            Some(role) if allowed.contains(&role) => Ok(role),
            _ => {
                warn!(msp_id = %caller.msp_id, operation, "调用方角色不允许执行该操作");
                Err(ApiError::PermissionDenied {
                    msp_id: caller.msp_id.clone(),
                    operation: operation.to_string(),
                    allowed: allowed.to_vec(),
                })
            }
        }
    }
}
