use crate::domain::a001_device::aggregate::DeviceId;
use crate::domain::a002_operator::aggregate::OperatorId;
use crate::domain::a003_supervisor::aggregate::SupervisorId;
use crate::enums::alert_priority::AlertPriority;
use crate::enums::alert_type::AlertType;
use serde::{Deserialize, Serialize};

/// Заявка на создание оповещения
///
/// Единственная точка входа, через которую планировщик порождает
/// оповещения при срабатывании задания.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertDraft {
    pub message: String,

    #[serde(rename = "alertType")]
    pub alert_type: AlertType,

    pub priority: AlertPriority,

    #[serde(rename = "deviceId")]
    pub device_id: DeviceId,

    #[serde(rename = "operatorId")]
    pub operator_id: Option<OperatorId>,

    #[serde(rename = "supervisorId")]
    pub supervisor_id: Option<SupervisorId>,
}
