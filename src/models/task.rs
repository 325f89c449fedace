use chrono::Local;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

pub const INVALID_STATUS: &str =
    "Status inválido. Os status válidos são: Em Andamento, Pendente, Concluído.";

/// The three task states. A free-form enum field, not a workflow: any update
/// may move between labels in any order.
///
/// The upstream system disagreed with itself on casing ("Em andamento" /
/// "Concluída" as schema defaults vs "Em Andamento" / "Concluído" in the
/// update validator). This enum is the single source of truth: the validator
/// casing is canonical and the schema-default spellings are accepted as input
/// aliases. See DESIGN.md for the open product question.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    #[serde(rename = "Pendente")]
    Pendente,
    #[serde(rename = "Em Andamento", alias = "Em andamento")]
    EmAndamento,
    #[serde(rename = "Concluído", alias = "Concluída")]
    Concluido,
}

impl TaskStatus {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Pendente" => Some(TaskStatus::Pendente),
            "Em Andamento" | "Em andamento" => Some(TaskStatus::EmAndamento),
            "Concluído" | "Concluída" => Some(TaskStatus::Concluido),
            _ => None,
        }
    }

    /// Validates an optional incoming label, falling back to the pending
    /// default when the field was not supplied.
    pub fn from_payload(label: Option<&str>) -> Result<Self, AppError> {
        match label {
            None => Ok(TaskStatus::Pendente),
            Some(label) => {
                Self::from_label(label).ok_or_else(|| AppError::BadRequest(INVALID_STATUS.into()))
            }
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            TaskStatus::Pendente => "Pendente",
            TaskStatus::EmAndamento => "Em Andamento",
            TaskStatus::Concluido => "Concluído",
        }
    }
}

/// Task row as stored and as returned by the API. Date fields are formatted
/// strings, not timestamps: `createdAt` is `DD/MM/YYYY`, `updatedAt` is
/// `DD/MM/YYYY HH:mm:ss` and absent until the first update.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    /// Owning user id. Serialized as `user` on the wire.
    #[serde(rename = "user")]
    pub user_id: Uuid,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<String>,
}

/// Create/update payload. Optional fields so presence checks report the
/// domain messages in declared order.
#[derive(Debug, Deserialize)]
pub struct TaskPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// Query parameters for `GET /tasks/search`.
#[derive(Debug, Deserialize)]
pub struct TaskSearchQuery {
    pub status: Option<String>,
    /// Exact match against the stored `createdAt` string (`DD/MM/YYYY`).
    pub date: Option<String>,
}

/// Creation stamp, `DD/MM/YYYY` in server-local time.
pub fn created_stamp() -> String {
    Local::now().format("%d/%m/%Y").to_string()
}

/// Update stamp, `DD/MM/YYYY HH:mm:ss` in server-local time.
pub fn updated_stamp() -> String {
    Local::now().format("%d/%m/%Y %H:%M:%S").to_string()
}
