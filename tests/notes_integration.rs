use std::sync::Arc;

use notas::config::Configuration;
use notas::error::ClientError;
use notas::identity::Credentials;
use notas::initialize_state;
use chrono::NaiveDate;
use notas::notes::{NoteFilter, NoteUpdate, Priority, Status, StatusChange};
use notas::router::{Navigation, Verdict};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn nota(id: u64, estado: &str) -> serde_json::Value {
    json!({
        "id": id,
        "numero_nota_interno": format!("NOTA-2025-{id:04}"),
        "numero_nota_externo": null,
        "tema": "Solicitud de relevamiento de expedientes del área contable",
        "estado": estado,
        "prioridad": "ALTA",
        "responsable": "Gómez, María",
        "fecha_ingreso": "2025-03-01",
        "fecha_limite": "2025-03-20",
    })
}

fn state_for(server: &MockServer) -> notas::AppState {
    let config = Configuration::default().url(server.uri());
    initialize_state(Arc::new(config)).unwrap()
}

#[tokio::test]
async fn test_list_with_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notas/"))
        .and(query_param("estado", "EN_ESPERA"))
        .and(query_param("prioridad", "ALTA"))
        .and(query_param("atrasadas", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([nota(1, "EN_ESPERA")])))
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let filter = NoteFilter {
        status: Some(Status::EnEspera),
        priority: Some(Priority::Alta),
        assignee: None,
        overdue_only: true,
    };
    let notes = state.notes.list(&filter).await.unwrap();

    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].status(), Some(Status::EnEspera));
    assert_eq!(notes[0].priority_label(), "Alta");
    assert_eq!(notes[0].reference(), "NOTA-2025-0001");
}

#[tokio::test]
async fn test_paginated_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notas/pendientes/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "next": null,
            "previous": null,
            "results": [nota(1, "ASIGNADA"), nota(2, "EN_PROCESO")],
        })))
        .mount(&server)
        .await;

    let state = state_for(&server);
    let notes = state.notes.pending().await.unwrap();

    assert_eq!(
        notes.iter().map(|note| note.id).collect::<Vec<_>>(),
        vec![1, 2]
    );
}

#[tokio::test]
async fn test_session_cookie_is_shared_with_notes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "sessionid=s3ss10n; Path=/; HttpOnly")
                .set_body_json(json!({ "usuario": {
                    "id": 2,
                    "username": "lruiz",
                    "nombre_completo": "Ruiz, Laura",
                    "rol": "EMPLEADO",
                }})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notas/atrasadas/"))
        .and(|req: &Request| {
            req.headers
                .get("cookie")
                .and_then(|value| value.to_str().ok())
                .is_some_and(|cookies| cookies.contains("sessionid=s3ss10n"))
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([nota(9, "DEVUELTA")])))
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(&server);
    state
        .session
        .login(&Credentials::new("1002", "secreto"))
        .await
        .unwrap();

    let overdue = state.notes.overdue().await.unwrap();
    assert_eq!(overdue[0].status_label(), "Devuelta");
}

#[tokio::test]
async fn test_change_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/notas/5/cambiar_estado/"))
        .and(body_json(json!({
            "estado_nuevo": "DEVUELTA",
            "motivo": "Falta la firma del director",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(nota(5, "DEVUELTA")))
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let change = StatusChange::to(Status::Devuelta).reason("Falta la firma del director");
    let note = state.notes.change_status(5, &change).await.unwrap();

    assert_eq!(note.status(), Some(Status::Devuelta));
}

#[tokio::test]
async fn test_change_status_refused() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/notas/5/cambiar_estado/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Transición no permitida de ARCHIVADA a EN_PROCESO",
        })))
        .mount(&server)
        .await;

    let state = state_for(&server);
    let err = state
        .notes
        .change_status(5, &StatusChange::to(Status::EnProceso))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Api { .. }));
    assert_eq!(err.to_string(), "Transición no permitida de ARCHIVADA a EN_PROCESO");
    assert!(!err.is_unauthorized());
}

#[tokio::test]
async fn test_members() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/usuarios/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "nombre_completo": "Gómez, María", "rol": "DIRECTOR" },
            { "id": 2, "nombre_completo": "Ruiz, Laura", "rol": "EMPLEADO" },
        ])))
        .mount(&server)
        .await;

    let state = state_for(&server);
    let members = state.notes.members().await.unwrap();

    assert_eq!(members.len(), 2);
    assert_eq!(members[1].full_name, "Ruiz, Laura");
}

fn usuario() -> serde_json::Value {
    json!({
        "id": 2,
        "username": "lruiz",
        "nombre_completo": "Ruiz, Laura",
        "rol": "JEFE",
    })
}

async fn logged_in(server: &MockServer) -> notas::AppState {
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "csrftoken=t0k3n; Path=/")
                .set_body_json(json!({ "usuario": usuario() })),
        )
        .mount(server)
        .await;

    let state = state_for(server);
    state
        .session
        .login(&Credentials::new("1002", "secreto"))
        .await
        .unwrap();
    state
}

#[tokio::test]
async fn test_expired_session_redirects_to_login() {
    let server = MockServer::start().await;
    let state = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/notas/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detalle": "No autenticado." })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/usuarios/yo/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detalle": "No autenticado." })),
        )
        .mount(&server)
        .await;

    let err = state.notes.list(&NoteFilter::default()).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!state.session.is_authenticated());
    assert_eq!(
        state.navigator.navigate("/notas").await,
        Navigation::Redirect {
            verdict: Verdict::RedirectToLogin,
            to: "/login".into(),
        }
    );
}

#[tokio::test]
async fn test_forbidden_with_live_session_keeps_identity() {
    let server = MockServer::start().await;
    let state = logged_in(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/notas/5/cambiar_estado/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": "Sin permiso",
            "detalle": "Solo Director o Administrador pueden anular notas.",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/usuarios/yo/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(usuario()))
        .expect(1)
        .mount(&server)
        .await;

    let change = StatusChange::to(Status::Anulada).reason("Duplicada");
    let err = state.notes.change_status(5, &change).await.unwrap_err();

    assert_eq!(err.to_string(), "Sin permiso");
    assert!(state.session.is_authenticated());
    assert_eq!(state.navigator.navigate("/notas").await.verdict(), Verdict::Proceed);
}

#[tokio::test]
async fn test_forbidden_without_session_drops_identity() {
    let server = MockServer::start().await;
    let state = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/notas/pendientes/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "detalle": "Las credenciales de autenticación no se proveyeron.",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/usuarios/yo/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "detalle": "Las credenciales de autenticación no se proveyeron.",
        })))
        .mount(&server)
        .await;

    assert!(state.notes.pending().await.is_err());
    assert!(!state.session.is_authenticated());
}

#[tokio::test]
async fn test_update_note() {
    let server = MockServer::start().await;
    let state = logged_in(&server).await;
    Mock::given(method("PATCH"))
        .and(path("/api/notas/5/"))
        .and(header("X-CSRFToken", "t0k3n"))
        .and(body_json(json!({ "prioridad": "URGENTE", "fecha_limite": "2025-04-30" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(nota(5, "EN_PROCESO")))
        .expect(1)
        .mount(&server)
        .await;

    let update = NoteUpdate {
        priority: Some(Priority::Urgente),
        due_date: NaiveDate::from_ymd_opt(2025, 4, 30),
        ..Default::default()
    };
    let note = state.notes.update(5, &update).await.unwrap();

    assert_eq!(note.id, 5);
}

#[tokio::test]
async fn test_delete_attachment() {
    let server = MockServer::start().await;
    let state = logged_in(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api/adjuntos/3/"))
        .and(header("X-CSRFToken", "t0k3n"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/adjuntos/4/"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "detalle": "No encontrado." })),
        )
        .mount(&server)
        .await;

    state.notes.delete_attachment(3).await.unwrap();

    let err = state.notes.delete_attachment(4).await.unwrap_err();
    assert_eq!(err.to_string(), "No encontrado.");
    assert!(state.session.is_authenticated());
}
