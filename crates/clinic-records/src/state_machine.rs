//! 预约状态机
//!
//! 管理预约的生命周期状态转换：已预约 → 已完成 / 已取消，两者均为终态。

use clinic_core::{AppointmentStatus, ClinicError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 预约状态转换事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentEvent {
    Complete,
    Cancel,
}

impl AppointmentEvent {
    /// 目标状态对应的事件，`Scheduled` 没有对应事件
    pub fn for_target(status: AppointmentStatus) -> Option<Self> {
        match status {
            AppointmentStatus::Scheduled => None,
            AppointmentStatus::Completed => Some(AppointmentEvent::Complete),
            AppointmentStatus::Cancelled => Some(AppointmentEvent::Cancel),
        }
    }
}

/// 预约状态机
#[derive(Debug)]
pub struct AppointmentStateMachine {
    transitions: HashMap<(AppointmentStatus, AppointmentEvent), AppointmentStatus>,
}

impl AppointmentStateMachine {
    /// 创建新的状态机实例
    pub fn new() -> Self {
        let mut transitions = HashMap::new();

        transitions.insert(
            (AppointmentStatus::Scheduled, AppointmentEvent::Complete),
            AppointmentStatus::Completed,
        );
        transitions.insert(
            (AppointmentStatus::Scheduled, AppointmentEvent::Cancel),
            AppointmentStatus::Cancelled,
        );

        Self { transitions }
    }

    /// 检查状态转换是否有效
    pub fn can_transition(&self, from: AppointmentStatus, event: AppointmentEvent) -> bool {
        self.transitions.contains_key(&(from, event))
    }

    /// 执行状态转换
    pub fn transition(&self, from: AppointmentStatus, event: AppointmentEvent) -> Result<AppointmentStatus> {
        self.transitions.get(&(from, event)).copied().ok_or_else(|| {
            ClinicError::validation(
                "status",
                format!("Cannot apply {:?} to a {} appointment", event, from),
            )
        })
    }
}

impl Default for AppointmentStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
