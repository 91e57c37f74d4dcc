//! # Catalog Client
//!
//! The [`CatalogApi`] seam and its HTTP implementation.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  workflow ──► CatalogApi::create_method(&payload)                       │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  HttpCatalog::request()                                                 │
//! │    • x-request-id: <uuid v4>                                            │
//! │    • Authorization: Bearer <token>   (when the session has one)         │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  HttpCatalog::execute()                                                 │
//! │    2xx ──► decode body                                                  │
//! │    4xx/5xx ──► CatalogError::Status { mensajeError | message }          │
//! │    transport ──► CatalogError::Transport / Timeout                      │
//! │                                                                         │
//! │  One attempt per call. Nothing is retried.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uuid::Uuid;

use caja_core::{
    ComponentRow, ComponentsPayload, CreatedMethod, MethodId, MethodPayload, PaymentMethod,
};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult};

/// Collection path on the API.
pub const METHODS_PATH: &str = "medios-pago";

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// =============================================================================
// Session
// =============================================================================

/// Who is calling. Passed explicitly to the client, never read from
/// globals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub operator: Option<String>,
    pub token: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Session {
            operator: None,
            token: Some(token.into()),
        }
    }

    fn bearer(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

// =============================================================================
// Catalog API
// =============================================================================

/// The payment-methods catalog as seen by the console workflows.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /medios-pago`
    async fn list_methods(&self) -> CatalogResult<Vec<PaymentMethod>>;

    /// `GET /medios-pago/{id}/componentes`
    async fn list_components(&self, composite_id: MethodId) -> CatalogResult<Vec<ComponentRow>>;

    /// `POST /medios-pago`, returning the new id.
    async fn create_method(&self, payload: &MethodPayload) -> CatalogResult<MethodId>;

    /// `PUT /medios-pago/{id}`
    async fn update_method(&self, id: MethodId, payload: &MethodPayload) -> CatalogResult<()>;

    /// `PUT /medios-pago/{id}/componentes`. Replaces the whole set.
    async fn replace_components(
        &self,
        composite_id: MethodId,
        components: &ComponentsPayload,
    ) -> CatalogResult<()>;
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// [`CatalogApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: String,
    session: Session,
}

/// Error body shape. Either field may be present.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(rename = "mensajeError", default)]
    error_message: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl HttpCatalog {
    /// Builds a client from validated configuration.
    pub fn from_config(config: &CatalogConfig) -> CatalogResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.api.timeout())
            .connect_timeout(config.api.connect_timeout())
            .build()
            .map_err(|e| CatalogError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(HttpCatalog::with_client(client, config.base_url()?.as_str(), config.session()))
    }

    /// Wraps an existing reqwest client.
    pub fn with_client(client: Client, base_url: &str, session: Session) -> Self {
        HttpCatalog {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> (RequestBuilder, String) {
        let request_id = Uuid::new_v4().to_string();

        let mut builder = self
            .client
            .request(method, self.url(path))
            .header(REQUEST_ID_HEADER, &request_id);
        if let Some(token) = self.session.bearer() {
            builder = builder.bearer_auth(token);
        }

        (builder, request_id)
    }

    /// Sends the request and turns any non-success status into an error.
    async fn execute(
        &self,
        builder: RequestBuilder,
        request_id: &str,
        target: Option<MethodId>,
    ) -> CatalogResult<Response> {
        let response = builder.send().await.map_err(|e| {
            error!(request_id, error = %e, "Catalog request failed");
            CatalogError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(request_id, status = status.as_u16(), "Catalog request ok");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = server_message(&body);
        error!(
            request_id,
            status = status.as_u16(),
            detail = message.as_deref().unwrap_or(""),
            "Catalog request rejected"
        );

        match (status, target, message) {
            (StatusCode::NOT_FOUND, Some(id), None) => Err(CatalogError::NotFound(id)),
            (status, _, message) => Err(CatalogError::Status {
                status: status.as_u16(),
                message,
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        target: Option<MethodId>,
    ) -> CatalogResult<T> {
        let (builder, request_id) = self.request(Method::GET, path);
        let response = self.execute(builder, &request_id, target).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Extracts `mensajeError` (preferred) or `message` from an error body.
fn server_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .error_message
        .or(parsed.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

#[async_trait]
impl CatalogApi for HttpCatalog {
    async fn list_methods(&self) -> CatalogResult<Vec<PaymentMethod>> {
        let methods: Vec<PaymentMethod> = self.get_json(METHODS_PATH, None).await?;
        debug!(count = methods.len(), "Fetched payment methods");
        Ok(methods)
    }

    async fn list_components(&self, composite_id: MethodId) -> CatalogResult<Vec<ComponentRow>> {
        let path = format!("{}/{}/componentes", METHODS_PATH, composite_id);
        self.get_json(&path, Some(composite_id)).await
    }

    async fn create_method(&self, payload: &MethodPayload) -> CatalogResult<MethodId> {
        let (builder, request_id) = self.request(Method::POST, METHODS_PATH);
        let response = self
            .execute(builder.json(payload), &request_id, None)
            .await?;

        let created: CreatedMethod = response.json().await?;
        let id = created.id().ok_or(CatalogError::MissingId)?;

        info!(
            id,
            name = %payload.name,
            operator = ?self.session.operator,
            "Payment method created"
        );
        Ok(id)
    }

    async fn update_method(&self, id: MethodId, payload: &MethodPayload) -> CatalogResult<()> {
        let path = format!("{}/{}", METHODS_PATH, id);
        let (builder, request_id) = self.request(Method::PUT, &path);
        self.execute(builder.json(payload), &request_id, Some(id)).await?;

        info!(
            id,
            name = %payload.name,
            operator = ?self.session.operator,
            "Payment method updated"
        );
        Ok(())
    }

    async fn replace_components(
        &self,
        composite_id: MethodId,
        components: &ComponentsPayload,
    ) -> CatalogResult<()> {
        let path = format!("{}/{}/componentes", METHODS_PATH, composite_id);
        let (builder, request_id) = self.request(Method::PUT, &path);
        self.execute(builder.json(components), &request_id, Some(composite_id))
            .await?;

        info!(
            composite_id,
            count = components.components.len(),
            "Composite components replaced"
        );
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, State};
    use axum::http::HeaderMap;
    use axum::routing::{get, put};
    use axum::{Json, Router};
    use caja_core::{CompositeComponent, MethodKind};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorded {
        headers: Arc<Mutex<Vec<HeaderMap>>>,
        bodies: Arc<Mutex<Vec<Value>>>,
    }

    async fn list_methods(State(rec): State<Recorded>, headers: HeaderMap) -> Json<Value> {
        rec.headers.lock().unwrap().push(headers);
        Json(json!([
            {"id": 1, "nombre": "Efectivo", "activo": 1, "orden": 1, "tipo": "SIMPLE"},
            {"id": 9, "nombre": "Mixto", "activo": "1", "orden": 2, "tipo": "COMPUESTO"}
        ]))
    }

    async fn list_components(Path(id): Path<i64>) -> (StatusCode, Json<Value>) {
        if id == 404 {
            return (StatusCode::NOT_FOUND, Json(json!({})));
        }
        (
            StatusCode::OK,
            Json(json!([
                {"orden": 2, "medio": {"id": 2}},
                {"orden": 1, "medio_pago_id": 1}
            ])),
        )
    }

    async fn create_method(
        State(rec): State<Recorded>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        rec.headers.lock().unwrap().push(headers);
        let missing_id = body["nombre"] == "sin id";
        rec.bodies.lock().unwrap().push(body);
        if missing_id {
            Json(json!({"ok": true}))
        } else {
            Json(json!({"medio": {"id": 42}}))
        }
    }

    async fn update_method(Path(id): Path<i64>) -> (StatusCode, Json<Value>) {
        if id == 99 {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"mensajeError": "Nombre duplicado", "message": "ignored"})),
            );
        }
        (StatusCode::OK, Json(json!({})))
    }

    async fn replace_components(
        State(rec): State<Recorded>,
        Path(_id): Path<i64>,
        Json(body): Json<Value>,
    ) -> StatusCode {
        rec.bodies.lock().unwrap().push(body);
        StatusCode::NO_CONTENT
    }

    async fn spawn_server() -> (String, Recorded) {
        let rec = Recorded::default();
        let app = Router::new()
            .route("/medios-pago", get(list_methods).post(create_method))
            .route("/medios-pago/{id}", put(update_method))
            .route(
                "/medios-pago/{id}/componentes",
                get(list_components).put(replace_components),
            )
            .with_state(rec.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/", addr), rec)
    }

    fn payload(name: &str) -> MethodPayload {
        MethodPayload {
            name: name.to_string(),
            description: String::new(),
            icon: "FaLayerGroup".to_string(),
            order: 0,
            percentage_adjustment: Some(0.0),
            kind: MethodKind::Composite,
        }
    }

    #[tokio::test]
    async fn test_list_methods_sends_request_id_and_token() {
        let (base, rec) = spawn_server().await;
        let catalog = HttpCatalog::with_client(Client::new(), &base, Session::with_token("t0k"));

        let methods = catalog.list_methods().await.unwrap();
        assert_eq!(methods.len(), 2);
        assert!(methods[1].is_active_composite());

        let headers = rec.headers.lock().unwrap();
        let request_id = headers[0][REQUEST_ID_HEADER].to_str().unwrap();
        assert!(Uuid::parse_str(request_id).is_ok());
        assert_eq!(headers[0]["authorization"], "Bearer t0k");
    }

    #[tokio::test]
    async fn test_anonymous_session_sends_no_authorization() {
        let (base, rec) = spawn_server().await;
        let catalog = HttpCatalog::with_client(Client::new(), &base, Session::anonymous());

        catalog.list_methods().await.unwrap();
        assert!(rec.headers.lock().unwrap()[0].get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_list_components() {
        let (base, _rec) = spawn_server().await;
        let catalog = HttpCatalog::with_client(Client::new(), &base, Session::anonymous());

        let rows = catalog.list_components(9).await.unwrap();
        assert_eq!(caja_core::ordered_member_ids(rows), vec![1, 2]);

        assert!(matches!(
            catalog.list_components(404).await,
            Err(CatalogError::NotFound(404))
        ));
    }

    #[tokio::test]
    async fn test_create_method() {
        let (base, rec) = spawn_server().await;
        let catalog = HttpCatalog::with_client(Client::new(), &base, Session::anonymous());

        let id = catalog.create_method(&payload("Mixto")).await.unwrap();
        assert_eq!(id, 42);

        let bodies = rec.bodies.lock().unwrap();
        assert_eq!(bodies[0]["tipo"], "COMPUESTO");
        assert_eq!(bodies[0]["ajuste_porcentual"], 0.0);
    }

    #[tokio::test]
    async fn test_create_method_without_id() {
        let (base, _rec) = spawn_server().await;
        let catalog = HttpCatalog::with_client(Client::new(), &base, Session::anonymous());

        assert!(matches!(
            catalog.create_method(&payload("sin id")).await,
            Err(CatalogError::MissingId)
        ));
    }

    #[tokio::test]
    async fn test_update_method_surfaces_server_message() {
        let (base, _rec) = spawn_server().await;
        let catalog = HttpCatalog::with_client(Client::new(), &base, Session::anonymous());

        assert!(catalog.update_method(7, &payload("Mixto")).await.is_ok());

        let err = catalog.update_method(99, &payload("Mixto")).await.unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.operator_message(), "Nombre duplicado");
    }

    #[tokio::test]
    async fn test_replace_components_body() {
        let (base, rec) = spawn_server().await;
        let catalog = HttpCatalog::with_client(Client::new(), &base, Session::anonymous());

        let components = ComponentsPayload {
            components: vec![
                CompositeComponent {
                    composite_id: 9,
                    member_id: 3,
                    order: 1,
                    active: true,
                },
                CompositeComponent {
                    composite_id: 9,
                    member_id: 1,
                    order: 2,
                    active: true,
                },
            ],
        };
        catalog.replace_components(9, &components).await.unwrap();

        let bodies = rec.bodies.lock().unwrap();
        assert_eq!(
            bodies[0],
            json!({"componentes": [
                {"medio_pago_id": 3, "orden": 1, "activo": 1},
                {"medio_pago_id": 1, "orden": 2, "activo": 1}
            ]})
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Port 9 (discard) is not listening on loopback in test environments.
        let catalog =
            HttpCatalog::with_client(Client::new(), "http://127.0.0.1:9", Session::anonymous());
        let err = catalog.list_methods().await.unwrap_err();
        assert!(matches!(err, CatalogError::Transport(_) | CatalogError::Timeout));
    }

    #[test]
    fn test_server_message() {
        assert_eq!(
            server_message(r#"{"message": "Bad input"}"#).as_deref(),
            Some("Bad input")
        );
        assert_eq!(
            server_message(r#"{"mensajeError": " Falta nombre ", "message": "x"}"#).as_deref(),
            Some("Falta nombre")
        );
        assert_eq!(server_message("<html>oops</html>"), None);
        assert_eq!(server_message(r#"{"mensajeError": ""}"#), None);
    }

    #[test]
    fn test_from_config_trims_trailing_slash() {
        let mut config = CatalogConfig::default();
        config.api.base_url = "https://backoffice.example/api/".to_string();
        let catalog = HttpCatalog::from_config(&config).unwrap();
        assert_eq!(catalog.url(METHODS_PATH), "https://backoffice.example/api/medios-pago");
    }
}
