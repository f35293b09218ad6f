// ==========================================
// 动力电池供应链账本 - 电池生命周期状态机
// ==========================================
// 状态不是单一字段，而是标志位 + 计数的组合:
//   manufactured → maintenance-requested → maintenance-logged
//   accident-logged（独立分支，副作用: 清除 maintenanceRequest）
//   analysis-requested → recycle-availability-decided → disassembled
// 红线: DISASSEMBLED 为终态，任何事件都被拒绝
// ==========================================

use crate::domain::battery::{
    clamp_percent, Battery, IncidentReport, MaintenanceEntry, MaintenanceReading,
};
use crate::domain::types::BatteryStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 生命周期事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleEvent {
    MaintenanceRequested,
    AnalysisRequested,
    MaintenanceLogged {
        entry: MaintenanceEntry,
        reading: MaintenanceReading,
    },
    AccidentLogged {
        report: IncidentReport,
    },
    RecycleAvailabilityDecided {
        available: bool,
    },
    Disassembled,
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::MaintenanceRequested => "MAINTENANCE_REQUESTED",
            LifecycleEvent::AnalysisRequested => "ANALYSIS_REQUESTED",
            LifecycleEvent::MaintenanceLogged { .. } => "MAINTENANCE_LOGGED",
            LifecycleEvent::AccidentLogged { .. } => "ACCIDENT_LOGGED",
            LifecycleEvent::RecycleAvailabilityDecided { .. } => "RECYCLE_AVAILABILITY_DECIDED",
            LifecycleEvent::Disassembled => "DISASSEMBLED",
        }
    }
}

/// 固定步长（来自配置）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifecycleSteps {
    pub maintenance_soc_step: f64,
    pub accident_soh_step: f64,
}

impl Default for LifecycleSteps {
    fn default() -> Self {
        Self {
            maintenance_soc_step: 5.0,
            accident_soh_step: 10.0,
        }
    }
}

/// 状态转换违规
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionViolation {
    /// 电池已拆解
    Terminal,
    /// 缺少前置标志位
    MissingFlag(&'static str),
    /// 未被判定为可回收
    NotRecyclable,
}

impl fmt::Display for TransitionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionViolation::Terminal => write!(f, "电池已拆解（终态）"),
            TransitionViolation::MissingFlag(flag) => write!(f, "前置标志未置位: {}", flag),
            TransitionViolation::NotRecyclable => write!(f, "recycleAvailability=false"),
        }
    }
}

/// 校验事件前置条件（不修改电池）
pub fn validate_event(battery: &Battery, event: &LifecycleEvent) -> Result<(), TransitionViolation> {
    if battery.status == BatteryStatus::Disassembled {
        return Err(TransitionViolation::Terminal);
    }

    match event {
        LifecycleEvent::MaintenanceLogged { .. } if !battery.maintenance_request => {
            Err(TransitionViolation::MissingFlag("maintenanceRequest"))
        }
        LifecycleEvent::RecycleAvailabilityDecided { .. } if !battery.analysis_request => {
            Err(TransitionViolation::MissingFlag("analysisRequest"))
        }
        LifecycleEvent::Disassembled if !battery.recycle_availability => {
            Err(TransitionViolation::NotRecyclable)
        }
        _ => Ok(()),
    }
}

/// 状态转换: 先校验，再应用效果
///
/// 失败时电池保持原样
pub fn apply_event(
    battery: &mut Battery,
    event: &LifecycleEvent,
    steps: &LifecycleSteps,
) -> Result<(), TransitionViolation> {
    validate_event(battery, event)?;

    match event {
        LifecycleEvent::MaintenanceRequested => {
            battery.maintenance_request = true;
        }
        LifecycleEvent::AnalysisRequested => {
            battery.analysis_request = true;
        }
        LifecycleEvent::MaintenanceLogged { entry, reading } => {
            battery.maintenance_logs.push(entry.to_log_line());
            match reading {
                MaintenanceReading::Measured {
                    soc,
                    soh,
                    remaining_life_cycle,
                } => {
                    battery.soc = clamp_percent(*soc);
                    battery.soh = clamp_percent(*soh);
                    if let Some(remaining) = remaining_life_cycle {
                        battery.remaining_life_cycle = (*remaining).min(battery.total_life_cycle);
                    }
                }
                MaintenanceReading::FixedStep => {
                    battery.soc = clamp_percent(battery.soc - steps.maintenance_soc_step);
                }
            }
            battery.maintenance_request = false;
        }
        LifecycleEvent::AccidentLogged { report } => {
            battery.accident_logs.push(report.to_log_line());
            battery.soh = clamp_percent(battery.soh - steps.accident_soh_step);
            // 事故会作废未完成的维保请求
            battery.maintenance_request = false;
        }
        LifecycleEvent::RecycleAvailabilityDecided { available } => {
            battery.recycle_availability = *available;
        }
        LifecycleEvent::Disassembled => {
            battery.status = BatteryStatus::Disassembled;
        }
    }

    Ok(())
}
