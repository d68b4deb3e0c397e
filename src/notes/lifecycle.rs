//! Status and priority vocabulary.
//!
//! Wire values are kept as raw strings on [`Note`](super::Note) so lookups
//! here are total: unknown values render with a neutral color and their own
//! text as label.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Label used for empty values.
pub const EMPTY_LABEL: &str = "—";
const STATUS_FALLBACK_COLOR: &str = "#64748b";
const PRIORITY_FALLBACK_COLOR: &str = "#cbd5e1";

/// Step of the note workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ingresada,
    EnRevision,
    Asignada,
    EnProceso,
    EnEspera,
    Devuelta,
    Resuelta,
    Archivada,
    Anulada,
}

/// Unknown wire value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value `{0}`")]
pub struct UnknownValue(pub String);

impl Status {
    pub const ALL: [Status; 9] = [
        Status::Ingresada,
        Status::EnRevision,
        Status::Asignada,
        Status::EnProceso,
        Status::EnEspera,
        Status::Devuelta,
        Status::Resuelta,
        Status::Archivada,
        Status::Anulada,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ingresada => "INGRESADA",
            Status::EnRevision => "EN_REVISION",
            Status::Asignada => "ASIGNADA",
            Status::EnProceso => "EN_PROCESO",
            Status::EnEspera => "EN_ESPERA",
            Status::Devuelta => "DEVUELTA",
            Status::Resuelta => "RESUELTA",
            Status::Archivada => "ARCHIVADA",
            Status::Anulada => "ANULADA",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Ingresada => "Ingresada",
            Status::EnRevision => "En Revisión",
            Status::Asignada => "Asignada",
            Status::EnProceso => "En Proceso",
            Status::EnEspera => "En Espera",
            Status::Devuelta => "Devuelta",
            Status::Resuelta => "Resuelta",
            Status::Archivada => "Archivada",
            Status::Anulada => "Anulada",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Status::Ingresada => "#475569",
            Status::EnRevision => "#0891b2",
            Status::Asignada => "#6366f1",
            Status::EnProceso => "#1d4ed8",
            Status::EnEspera => "#d97706",
            Status::Devuelta => "#e11d48",
            Status::Resuelta => "#059669",
            Status::Archivada => "#94a3b8",
            Status::Anulada => "#450a0a",
        }
    }

    /// Archived and voided notes are out of the workflow: never overdue.
    pub fn is_archival(self) -> bool {
        matches!(self, Status::Archivada | Status::Anulada)
    }

    /// Statuses a note can still be voided from.
    pub fn is_active(self) -> bool {
        !self.is_archival()
    }

    /// Work sitting with the assignee.
    pub fn is_pending(self) -> bool {
        matches!(self, Status::Asignada | Status::EnProceso | Status::EnEspera)
    }

    /// Statuses reachable from this one.
    pub fn next(self) -> Vec<Status> {
        let mut next = match self {
            Status::Ingresada => vec![Status::EnRevision],
            Status::EnRevision => vec![Status::Asignada],
            Status::Asignada => vec![Status::EnProceso],
            Status::EnProceso => {
                vec![Status::EnEspera, Status::Devuelta, Status::Resuelta]
            },
            Status::EnEspera => vec![Status::EnProceso],
            Status::Devuelta => vec![Status::Asignada],
            Status::Resuelta => vec![Status::Archivada, Status::EnProceso],
            Status::Archivada | Status::Anulada => Vec::new(),
        };
        if self.is_active() {
            next.push(Status::Anulada);
        }
        next
    }

    pub fn can_transition_to(self, target: Status) -> bool {
        self.next().contains(&target)
    }

    /// Moving into this status needs a written reason.
    pub fn requires_reason(self) -> bool {
        matches!(self, Status::EnEspera | Status::Devuelta | Status::Anulada)
    }

    /// Moving into this status needs an assignee.
    pub fn requires_assignee(self) -> bool {
        matches!(self, Status::Asignada)
    }
}

impl FromStr for Status {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownValue(value.to_owned()))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Urgency bucket. `NORMAL` and `MEDIA` are the same bucket on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "BAJA")]
    Baja,
    #[serde(rename = "MEDIA", alias = "NORMAL")]
    Normal,
    #[serde(rename = "ALTA")]
    Alta,
    #[serde(rename = "URGENTE")]
    Urgente,
}

impl Priority {
    /// Value the backend stores.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Baja => "BAJA",
            Priority::Normal => "MEDIA",
            Priority::Alta => "ALTA",
            Priority::Urgente => "URGENTE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Baja => "Baja",
            Priority::Normal => "Normal",
            Priority::Alta => "Alta",
            Priority::Urgente => "Urgente",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Priority::Baja => "#cbd5e1",
            Priority::Normal => "#0ea5e9",
            Priority::Alta => "#f97316",
            Priority::Urgente => "#dc2626",
        }
    }
}

impl FromStr for Priority {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "BAJA" => Ok(Priority::Baja),
            "NORMAL" | "MEDIA" => Ok(Priority::Normal),
            "ALTA" => Ok(Priority::Alta),
            "URGENTE" => Ok(Priority::Urgente),
            other => Err(UnknownValue(other.to_owned())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn raw_label(raw: &str) -> Cow<'_, str> {
    if raw.is_empty() {
        Cow::Borrowed(EMPTY_LABEL)
    } else {
        Cow::Borrowed(raw)
    }
}

pub fn status_color(raw: &str) -> &'static str {
    raw.parse::<Status>()
        .map(Status::color)
        .unwrap_or(STATUS_FALLBACK_COLOR)
}

pub fn status_label(raw: &str) -> Cow<'_, str> {
    match raw.parse::<Status>() {
        Ok(status) => Cow::Borrowed(status.label()),
        Err(_) => raw_label(raw),
    }
}

pub fn priority_color(raw: &str) -> &'static str {
    raw.parse::<Priority>()
        .map(Priority::color)
        .unwrap_or(PRIORITY_FALLBACK_COLOR)
}

pub fn priority_label(raw: &str) -> Cow<'_, str> {
    match raw.parse::<Priority>() {
        Ok(priority) => Cow::Borrowed(priority.label()),
        Err(_) => raw_label(raw),
    }
}
