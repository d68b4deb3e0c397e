//! Notes (tickets) as seen by the client.

pub mod api;
pub mod calendar;
pub mod format;
pub mod lifecycle;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::identity::Role;

pub use api::NotesApi;
pub use calendar::{Calendar, Recency, Summary};
pub use lifecycle::{Priority, Status};

/// Note record as listed by the backend.
///
/// Status and priority stay raw so unknown values still render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    #[serde(default, rename = "numero_nota_interno")]
    pub internal_number: Option<String>,
    #[serde(default, rename = "numero_nota_externo")]
    pub external_number: Option<String>,
    #[serde(default, rename = "tema")]
    pub subject: String,
    #[serde(default, rename = "estado", deserialize_with = "nullable")]
    pub status: String,
    #[serde(default, rename = "prioridad", deserialize_with = "nullable")]
    pub priority: String,
    #[serde(default, rename = "responsable")]
    pub assignee: Option<String>,
    #[serde(rename = "fecha_ingreso")]
    pub entry_date: NaiveDate,
    #[serde(default, rename = "fecha_limite")]
    pub due_date: Option<NaiveDate>,
}

/// `null` reads as an empty string, which renders as `—`.
fn nullable<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Note {
    /// Known status, if any.
    pub fn status(&self) -> Option<Status> {
        self.status.parse().ok()
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority.parse().ok()
    }

    pub fn status_label(&self) -> std::borrow::Cow<'_, str> {
        lifecycle::status_label(&self.status)
    }

    pub fn status_color(&self) -> &'static str {
        lifecycle::status_color(&self.status)
    }

    pub fn priority_label(&self) -> std::borrow::Cow<'_, str> {
        lifecycle::priority_label(&self.priority)
    }

    pub fn priority_color(&self) -> &'static str {
        lifecycle::priority_color(&self.priority)
    }

    /// Internal number, else external one, else the id.
    pub fn reference(&self) -> String {
        [&self.internal_number, &self.external_number]
            .into_iter()
            .flatten()
            .find(|number| !number.is_empty())
            .cloned()
            .unwrap_or_else(|| format!("#{}", self.id))
    }
}

/// Server-side list filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub assignee: Option<u64>,
    pub overdue_only: bool,
}

impl NoteFilter {
    /// Query string pairs understood by the backend.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("estado", status.as_str().to_owned()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("prioridad", priority.as_str().to_owned()));
        }
        if let Some(assignee) = self.assignee {
            pairs.push(("responsable", assignee.to_string()));
        }
        if self.overdue_only {
            pairs.push(("atrasadas", "true".to_owned()));
        }
        pairs
    }
}

/// Request to move a note through the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    #[serde(rename = "estado_nuevo")]
    pub target: Status,
    #[serde(rename = "motivo", skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(rename = "responsable_nuevo", skip_serializing_if = "Option::is_none")]
    pub assignee: Option<u64>,
}

impl StatusChange {
    pub fn to(target: Status) -> Self {
        Self {
            target,
            reason: None,
            assignee: None,
        }
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn assignee(mut self, user_id: u64) -> Self {
        self.assignee = Some(user_id);
        self
    }
}

/// Why a status change would be refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("No se puede cambiar de {} a {}", .from.as_str(), .to.as_str())]
    NotAllowed { from: Status, to: Status },
    #[error("Solo Director o Administrador pueden anular notas.")]
    VoidForbidden,
    #[error("No tiene permiso para asignar notas.")]
    AssignForbidden,
    #[error("El motivo es obligatorio para el estado {}", .0.as_str())]
    ReasonRequired(Status),
    #[error("El responsable es obligatorio para asignar una nota")]
    AssigneeRequired,
}

impl StatusChange {
    /// Check the change against the workflow before sending it.
    ///
    /// The backend still decides; this only avoids offering actions that
    /// would be refused.
    pub fn check(&self, from: Status, role: Role) -> Result<(), TransitionError> {
        let to = self.target;
        if !from.can_transition_to(to) {
            return Err(TransitionError::NotAllowed { from, to });
        }
        if to == Status::Anulada && !role.can_void_notes() {
            return Err(TransitionError::VoidForbidden);
        }
        if to.requires_reason() && self.reason.as_deref().is_none_or(|r| r.trim().is_empty()) {
            return Err(TransitionError::ReasonRequired(to));
        }
        if to.requires_assignee() && self.assignee.is_none() {
            return Err(TransitionError::AssigneeRequired);
        }
        if self.assignee.is_some() && !role.can_assign_notes() {
            return Err(TransitionError::AssignForbidden);
        }
        Ok(())
    }
}

/// Transitions `role` may take from `from`.
pub fn allowed_transitions(from: Status, role: Role) -> Vec<Status> {
    from.next()
        .into_iter()
        .filter(|to| *to != Status::Anulada || role.can_void_notes())
        .filter(|to| !to.requires_assignee() || role.can_assign_notes())
        .collect()
}

/// Editable fields of a note. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoteUpdate {
    #[serde(rename = "tema", skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "prioridad", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(rename = "fecha_limite", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "responsable", skip_serializing_if = "Option::is_none")]
    pub assignee: Option<u64>,
}

impl NoteUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// User listed as a possible assignee.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Member {
    pub id: u64,
    #[serde(rename = "nombre_completo")]
    pub full_name: String,
    #[serde(default, rename = "rol")]
    pub role: String,
}
