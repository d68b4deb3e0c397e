//! Authenticated user representation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of roles known by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Director,
    Jefe,
    Empleado,
    SoloLectura,
}

impl Role {
    /// Human name of the role.
    pub fn display_name(self) -> &'static str {
        match self {
            Role::Admin => "Administrador",
            Role::Director => "Director",
            Role::Jefe => "Jefe",
            Role::Empleado => "Empleado",
            Role::SoloLectura => "Solo Lectura",
        }
    }

    pub fn can_create_notes(self) -> bool {
        !matches!(self, Role::SoloLectura)
    }

    /// Assign or reassign notes. Also gates editing a note.
    pub fn can_assign_notes(self) -> bool {
        matches!(self, Role::Admin | Role::Director | Role::Jefe)
    }

    /// Only directors and administrators may void a note.
    pub fn can_void_notes(self) -> bool {
        matches!(self, Role::Admin | Role::Director)
    }

    /// Employees only see notes they own or created.
    pub fn can_see_all_notes(self) -> bool {
        !matches!(self, Role::Empleado)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Session-derived profile of the current user.
///
/// Every field is required: a payload missing one does not deserialize, so a
/// partial identity cannot exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: u64,
    pub username: String,
    #[serde(rename = "nombre_completo")]
    pub full_name: String,
    #[serde(rename = "rol")]
    pub role: Role,
}

/// Login form.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub legajo: String,
    pub password: String,
}

impl Credentials {
    pub fn new(legajo: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            legajo: legajo.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("legajo", &self.legajo)
            .field("password", &"***")
            .finish()
    }
}
