use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::entities::product::{Credentials, Product, ProductDraft, ProductId};
use crate::usecase::ports::catalog_api::{ApiError, CatalogApi};
use crate::usecase::ports::session_store::SessionStore;
use crate::usecase::services::auth_service::TOKEN_COOKIE;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Serialize)]
struct UpdateProductRequest<'a> {
    id: ProductId,
    #[serde(flatten)]
    draft: &'a ProductDraft,
}

/// `CatalogApi` over REST/JSON.
pub struct HttpCatalogApi {
    agent: ureq::Agent,
    base_url: Url,
    session: Arc<dyn SessionStore>,
}

impl HttpCatalogApi {
    pub fn new(base_url: Url, request_timeout: Duration, session: Arc<dyn SessionStore>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(request_timeout)
            .timeout_write(request_timeout)
            .build();
        Self {
            agent,
            base_url,
            session,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let url = self.endpoint(path);
        let request = self
            .agent
            .request(method, &url)
            .set("Accept", "application/json");
        match self.session.get(TOKEN_COOKIE, Utc::now()) {
            Ok(Some(cookie)) => request.set("Cookie", &cookie.header_pair()),
            Ok(None) => request,
            Err(err) => {
                tracing::warn!("failed to read session cookie: {err}");
                request
            }
        }
    }
}

fn map_call_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(404, _) => ApiError::NotFound,
        ureq::Error::Status(code, response) => {
            let body = response
                .into_string()
                .unwrap_or_else(|err| format!("<unreadable body: {err}>"));
            ApiError::Status { code, body }
        }
        ureq::Error::Transport(err) => ApiError::Transport(err.to_string()),
    }
}

/// Empty and `null` bodies mean the resource does not exist.
fn read_json<T: DeserializeOwned>(response: ureq::Response) -> Result<T, ApiError> {
    let body = response
        .into_string()
        .map_err(|err| ApiError::Decode(err.to_string()))?;
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(ApiError::NotFound);
    }
    serde_json::from_str(trimmed).map_err(|err| ApiError::Decode(err.to_string()))
}

impl CatalogApi for HttpCatalogApi {
    fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let response = self
            .request("GET", "/products")
            .call()
            .map_err(map_call_error)?;
        match read_json(response) {
            Err(ApiError::NotFound) => Ok(Vec::new()),
            other => other,
        }
    }

    fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let response = self
            .request("GET", &format!("/products/{id}"))
            .call()
            .map_err(map_call_error)?;
        read_json(response)
    }

    fn create_product(&self, draft: &ProductDraft) -> Result<Product, ApiError> {
        let response = self
            .request("POST", "/products")
            .send_json(draft)
            .map_err(map_call_error)?;
        read_json(response)
    }

    fn update_product(&self, id: ProductId, draft: &ProductDraft) -> Result<Product, ApiError> {
        let response = self
            .request("PUT", &format!("/products/{id}"))
            .send_json(UpdateProductRequest { id, draft })
            .map_err(map_call_error)?;
        read_json(response)
    }

    fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.request("DELETE", &format!("/products/{id}"))
            .call()
            .map_err(map_call_error)?;
        Ok(())
    }

    fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        let response = self
            .request("POST", "/auth/login")
            .send_json(credentials)
            .map_err(map_call_error)?;
        let body: LoginResponse = read_json(response)?;
        Ok(body.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    use chrono::Duration as ChronoDuration;

    use crate::domain::entities::product::Category;
    use crate::tests::MemorySessionStore;
    use crate::usecase::ports::session_store::SessionCookie;

    /// Serves one canned response and hands back the raw request text.
    fn serve_once(response: String) -> (Url, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("should bind listener");
        let addr = listener.local_addr().expect("listener should have addr");
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 8192];
                let read = stream.read(&mut buf).unwrap_or(0);
                let _ = tx.send(String::from_utf8_lossy(&buf[..read]).into_owned());
                let _ = stream.write_all(response.as_bytes());
            }
        });
        let url = Url::parse(&format!("http://{addr}")).expect("should build url");
        (url, rx)
    }

    fn json_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn api(url: Url, session: Arc<MemorySessionStore>) -> HttpCatalogApi {
        HttpCatalogApi::new(url, Duration::from_secs(5), session)
    }

    #[test]
    fn list_products_decodes_payload() {
        let body = r#"[{"id":1,"title":"Mouse","price":10,"category":"electronics","description":"d","image":"i"}]"#;
        let (url, _requests) = serve_once(json_response("200 OK", body));

        let products = api(url, Arc::new(MemorySessionStore::default()))
            .list_products()
            .expect("list should succeed");

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].category, Category::Electronics);
    }

    #[test]
    fn get_product_maps_empty_body_to_not_found() {
        let (url, _requests) = serve_once(json_response("200 OK", ""));

        let err = api(url, Arc::new(MemorySessionStore::default()))
            .get_product(ProductId(999))
            .expect_err("empty body should be not found");

        assert_eq!(err, ApiError::NotFound);
    }

    #[test]
    fn status_errors_keep_code_and_body() {
        let (url, _requests) = serve_once(json_response("500 Internal Server Error", "boom"));

        let err = api(url, Arc::new(MemorySessionStore::default()))
            .delete_product(ProductId(1))
            .expect_err("500 should fail");

        assert_eq!(
            err,
            ApiError::Status {
                code: 500,
                body: "boom".to_string()
            }
        );
    }

    #[test]
    fn login_returns_token_and_requests_attach_cookie() {
        let (url, requests) = serve_once(json_response("200 OK", r#"{"token":"abc.def"}"#));
        let session = Arc::new(MemorySessionStore::default());
        session
            .put(SessionCookie {
                name: TOKEN_COOKIE.to_string(),
                value: "previous".to_string(),
                path: "/".to_string(),
                expires_at: Utc::now() + ChronoDuration::seconds(60),
            })
            .expect("should store cookie");

        let token = api(url, session)
            .login(&Credentials {
                username: "mor_2314".to_string(),
                password: "83r5^_".to_string(),
            })
            .expect("login should succeed");

        assert_eq!(token, "abc.def");
        let request = requests.recv().expect("server should see request");
        assert!(request.starts_with("POST /auth/login"));
        assert!(request.contains("Cookie: token=previous"));
    }

    #[test]
    fn transport_failure_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("should bind listener");
        let addr = listener.local_addr().expect("listener should have addr");
        drop(listener);
        let url = Url::parse(&format!("http://{addr}")).expect("should build url");

        let err = api(url, Arc::new(MemorySessionStore::default()))
            .list_products()
            .expect_err("closed port should fail");

        assert!(matches!(err, ApiError::Transport(_)));
    }
}
