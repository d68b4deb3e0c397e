//! Notes endpoints.

use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::form_urlencoded;

use super::{Member, Note, NoteFilter, NoteUpdate, StatusChange};
use crate::error::{ClientError, Result};
use crate::http::HttpClient;
use crate::session::SessionStore;

const NOTES_PATH: &str = "/api/notas/";
const ATTACHMENTS_PATH: &str = "/api/adjuntos/";
const MEMBERS_PATH: &str = "/api/usuarios/";

/// Plain list or paginated page, depending on backend settings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Page { results: Vec<T> },
    Plain(Vec<T>),
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Page { results } => results,
            Listing::Plain(items) => items,
        }
    }
}

/// Read and move notes through the shared [`HttpClient`] session.
///
/// Refused requests are reported to the [`SessionStore`] before being
/// returned, so an expired session turns into a guard redirect on the next
/// navigation.
#[derive(Clone)]
pub struct NotesApi {
    http: HttpClient,
    session: Arc<SessionStore>,
}

impl NotesApi {
    pub fn new(http: HttpClient, session: Arc<SessionStore>) -> Self {
        Self { http, session }
    }

    async fn checked<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.session.observe(err).await;
        }
        result
    }

    async fn listing<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let result: Result<Vec<T>> = async {
            let listing: Listing<T> = self.http.get(path).await?.into_json()?;
            Ok(listing.into_vec())
        }
        .await;
        self.checked(result).await
    }

    /// List notes visible to the current user, newest entry first.
    pub async fn list(&self, filter: &NoteFilter) -> Result<Vec<Note>> {
        let pairs = filter.query_pairs();
        let path = if pairs.is_empty() {
            NOTES_PATH.to_owned()
        } else {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish();
            format!("{NOTES_PATH}?{query}")
        };

        self.listing(&path).await
    }

    pub async fn get(&self, id: u64) -> Result<Note> {
        let result: Result<Note> = async {
            self.http
                .get(&format!("{NOTES_PATH}{id}/"))
                .await?
                .into_json()
        }
        .await;
        self.checked(result).await
    }

    /// Notes assigned to the current user and still being worked on.
    pub async fn pending(&self) -> Result<Vec<Note>> {
        self.listing(&format!("{NOTES_PATH}pendientes/")).await
    }

    /// Notes past their due date, oldest deadline first.
    pub async fn overdue(&self) -> Result<Vec<Note>> {
        self.listing(&format!("{NOTES_PATH}atrasadas/")).await
    }

    /// Ask the backend to move a note. The backend validates the transition.
    pub async fn change_status(&self, id: u64, change: &StatusChange) -> Result<Note> {
        tracing::info!(note = id, target = change.target.as_str(), "changing note status");
        let result: Result<Note> = async {
            self.http
                .post(&format!("{NOTES_PATH}{id}/cambiar_estado/"), change)
                .await?
                .into_json()
        }
        .await;
        self.checked(result).await
    }

    /// Partially update the editable fields of a note.
    pub async fn update(&self, id: u64, update: &NoteUpdate) -> Result<Note> {
        tracing::info!(note = id, "updating note");
        let result: Result<Note> = async {
            self.http
                .patch(&format!("{NOTES_PATH}{id}/"), update)
                .await?
                .into_json()
        }
        .await;
        self.checked(result).await
    }

    /// Remove an attachment. The backend answers without a body.
    pub async fn delete_attachment(&self, id: u64) -> Result<()> {
        let result: Result<()> = async {
            let raw = self.http.delete(&format!("{ATTACHMENTS_PATH}{id}/")).await?;
            if raw.status.is_success() {
                return Ok(());
            }
            let body: serde_json::Value = serde_json::from_slice(&raw.body).unwrap_or_default();
            Err(ClientError::api(raw.status, &body))
        }
        .await;
        self.checked(result).await
    }

    /// Users that notes can be assigned to.
    pub async fn members(&self) -> Result<Vec<Member>> {
        self.listing(MEMBERS_PATH).await
    }
}
