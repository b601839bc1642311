use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use super::error::ApiError;
use crate::model::{Car, CarRecord};

/// Create/update access to the remote car collection.
#[async_trait]
pub trait CarApi: Send + Sync + 'static {
    /// Creates a new car and returns the stored record.
    async fn create(&self, car: &Car) -> Result<CarRecord, ApiError>;

    /// Replaces the car with the given id and returns the stored record.
    async fn update(&self, id: &str, car: &Car) -> Result<CarRecord, ApiError>;

    /// Fetches a single car by id.
    async fn get(&self, id: &str) -> Result<CarRecord, ApiError>;
}

/// Response body: either `{ "data": <record>, ... }` or the bare record.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Wrapped { data: CarRecord },
    Bare(CarRecord),
}

impl Envelope {
    fn into_record(self) -> CarRecord {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(record) => record,
        }
    }
}

/// [`CarApi`] over HTTP/JSON.
pub struct HttpCarApi {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpCarApi {
    /// Creates a client rooted at `base_url`; every request is bounded by `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let raw = base_url.into();
        let base_url =
            Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(raw));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    /// Collection URL: `{base}/car`.
    fn collection_url(&self) -> Result<Url, ApiError> {
        self.url_with(&["car"])
    }

    /// Item URL: `{base}/car/{id}`, with `id` percent-encoded as one segment.
    fn item_url(&self, id: &str) -> Result<Url, ApiError> {
        self.url_with(&["car", id])
    }

    fn url_with(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Turns a non-success status into [`ApiError::Server`].
    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::Server {
            status: status.as_u16(),
            message: body,
        })
    }

    /// Decodes a fetched record; the body must hold one.
    async fn parse(resp: reqwest::Response) -> Result<CarRecord, ApiError> {
        Self::check_status(resp)
            .await?
            .json::<Envelope>()
            .await
            .map(Envelope::into_record)
            .map_err(|e| ApiError::Decode(format!("response body: {e}")))
    }

    /// Reads the answer to a create or update. Any 2xx status means the car
    /// was stored, whatever the body holds.
    async fn parse_saved(
        resp: reqwest::Response,
        id: Option<&str>,
        car: &Car,
    ) -> Result<CarRecord, ApiError> {
        let resp = Self::check_status(resp).await?;
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "could not read the body of a successful save");
                String::new()
            }
        };
        Ok(saved_record(&body, id, car))
    }
}

/// The record in a successful save's body, or one rebuilt from `car` when
/// the body is not a car record. The id then comes from `id` or from the
/// first `_id` string found in the body.
fn saved_record(body: &str, id: Option<&str>, car: &Car) -> CarRecord {
    match serde_json::from_str::<Envelope>(body) {
        Ok(envelope) => envelope.into_record(),
        Err(e) => {
            let id = id
                .map(str::to_string)
                .or_else(|| serde_json::from_str::<Value>(body).ok().and_then(|v| first_id(&v)))
                .unwrap_or_default();
            tracing::warn!(error = %e, %id, "save succeeded but the response was not a car record");
            CarRecord::from_car(id, car)
        }
    }
}

fn first_id(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => match map.get("_id") {
            Some(Value::String(id)) => Some(id.clone()),
            _ => map.values().find_map(first_id),
        },
        Value::Array(items) => items.iter().find_map(first_id),
        _ => None,
    }
}

#[async_trait]
impl CarApi for HttpCarApi {
    async fn create(&self, car: &Car) -> Result<CarRecord, ApiError> {
        let url = self.collection_url()?;
        tracing::debug!(%url, "creating car");
        let resp = self.http.post(url).json(car).send().await?;
        Self::parse_saved(resp, None, car).await
    }

    async fn update(&self, id: &str, car: &Car) -> Result<CarRecord, ApiError> {
        let url = self.item_url(id)?;
        tracing::debug!(%url, "updating car");
        let resp = self.http.put(url).json(car).send().await?;
        Self::parse_saved(resp, Some(id), car).await
    }

    async fn get(&self, id: &str) -> Result<CarRecord, ApiError> {
        let url = self.item_url(id)?;
        tracing::debug!(%url, "fetching car");
        let resp = self.http.get(url).send().await?;
        Self::parse(resp).await
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{get, post, put};
    use serde_json::{Value, json};

    use super::*;
    use crate::model::{CarSize, TransmissionType};

    fn make_car() -> Car {
        Car {
            name: "X5".into(),
            model: "X5".into(),
            year: 2020,
            transmission_type: TransmissionType::Automatic,
            price: 45000,
            size: CarSize::Large,
            style: "SUV".into(),
        }
    }

    fn with_id(id: &str, mut body: Value) -> Value {
        if let Some(map) = body.as_object_mut() {
            map.insert("_id".into(), json!(id));
        }
        body
    }

    async fn create_car(axum::Json(body): axum::Json<Value>) -> (StatusCode, axum::Json<Value>) {
        let record = with_id("new-1", body);
        (
            StatusCode::CREATED,
            axum::Json(json!({ "success": true, "data": record, "message": "Created" })),
        )
    }

    async fn update_car(
        Path(id): Path<String>,
        axum::Json(body): axum::Json<Value>,
    ) -> axum::Json<Value> {
        axum::Json(with_id(&id, body))
    }

    async fn get_car(Path(id): Path<String>) -> Result<axum::Json<Value>, (StatusCode, String)> {
        match id.as_str() {
            "missing" => Err((StatusCode::NOT_FOUND, "car not found".into())),
            "garbage" => Ok(axum::Json(json!([1, 2, 3]))),
            _ => Ok(axum::Json(json!({ "_id": id, "name": "Civic", "__v": 0 }))),
        }
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api/")
    }

    async fn start_test_server() -> String {
        serve(
            Router::new()
                .route("/api/car", post(create_car))
                .route("/api/car/:id", get(get_car).put(update_car)),
        )
        .await
    }

    fn client(base_url: &str) -> HttpCarApi {
        HttpCarApi::new(base_url, Duration::from_secs(5)).unwrap()
    }

    mod urls {
        use super::*;

        #[test]
        fn trailing_slash_trimmed() {
            let api = client("http://localhost:8000/api/");
            assert_eq!(
                api.collection_url().unwrap().as_str(),
                "http://localhost:8000/api/car"
            );
            assert_eq!(
                api.item_url("abc").unwrap().as_str(),
                "http://localhost:8000/api/car/abc"
            );
        }

        #[test]
        fn bare_host_gets_car_path() {
            let api = client("http://localhost:8000");
            assert_eq!(
                api.collection_url().unwrap().as_str(),
                "http://localhost:8000/car"
            );
        }

        #[test]
        fn id_is_one_encoded_segment() {
            let api = client("http://localhost:8000/api");
            assert_eq!(
                api.item_url("a/b?c#d").unwrap().as_str(),
                "http://localhost:8000/api/car/a%2Fb%3Fc%23d"
            );
        }

        #[test]
        fn unusable_base_url_rejected() {
            for bad in ["not a url", "mailto:cars@example.com"] {
                assert!(
                    matches!(
                        HttpCarApi::new(bad, Duration::from_secs(1)),
                        Err(ApiError::InvalidUrl(_))
                    ),
                    "{bad}"
                );
            }
        }
    }

    mod requests {
        use super::*;

        #[tokio::test]
        async fn create_unwraps_data_envelope() {
            let base = start_test_server().await;
            let record = client(&base).create(&make_car()).await.unwrap();
            assert_eq!(record.id, "new-1");
            assert_eq!(record.fields.get("transmissionType"), Some(&json!("AUTOMATIC")));
            assert_eq!(record.fields.get("price"), Some(&json!(45000)));
        }

        #[tokio::test]
        async fn update_puts_to_item_path() {
            let base = start_test_server().await;
            let record = client(&base).update("car-7", &make_car()).await.unwrap();
            assert_eq!(record.id, "car-7");
            assert_eq!(record.fields.get("style"), Some(&json!("SUV")));
        }

        #[tokio::test]
        async fn update_sends_id_with_slash_as_one_segment() {
            let base = start_test_server().await;
            let record = client(&base).update("a/b", &make_car()).await.unwrap();
            assert_eq!(record.id, "a/b");
        }

        #[tokio::test]
        async fn get_returns_bare_record_with_extra_keys() {
            let base = start_test_server().await;
            let record = client(&base).get("abc").await.unwrap();
            assert_eq!(record.id, "abc");
            assert_eq!(record.fields.get("__v"), Some(&json!(0)));
        }
    }

    mod saved_without_record {
        use super::*;

        async fn nested_body() -> axum::Json<Value> {
            axum::Json(json!({
                "success": true,
                "data": { "car": { "_id": "x1" } },
                "message": "Create Car Successfully"
            }))
        }

        async fn start_unusual_server() -> String {
            serve(
                Router::new()
                    .route("/api/car", post(nested_body))
                    .route("/api/car/:id", put(|| async { StatusCode::NO_CONTENT })),
            )
            .await
        }

        #[tokio::test]
        async fn create_succeeds_with_id_found_in_body() {
            let base = start_unusual_server().await;
            let record = client(&base).create(&make_car()).await.unwrap();
            assert_eq!(record, CarRecord::from_car("x1", &make_car()));
        }

        #[tokio::test]
        async fn update_succeeds_on_empty_body() {
            let base = start_unusual_server().await;
            let record = client(&base).update("car-3", &make_car()).await.unwrap();
            assert_eq!(record, CarRecord::from_car("car-3", &make_car()));
        }

        #[test]
        fn body_without_any_id_gives_empty_id() {
            let record = saved_record("{\"ok\":true}", None, &make_car());
            assert_eq!(record.id, "");
            assert_eq!(record.fields.get("name"), Some(&json!("X5")));
        }
    }

    mod failures {
        use super::*;

        #[tokio::test]
        async fn non_success_status_is_server_error() {
            let base = start_test_server().await;
            let err = client(&base).get("missing").await.unwrap_err();
            match err {
                ApiError::Server { status, message } => {
                    assert_eq!(status, 404);
                    assert_eq!(message, "car not found");
                }
                other => panic!("expected Server, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn unexpected_body_is_decode_error() {
            let base = start_test_server().await;
            let err = client(&base).get("garbage").await.unwrap_err();
            assert!(matches!(err, ApiError::Decode(_)), "got {err:?}");
        }

        #[tokio::test]
        async fn refused_connection_is_network_error() {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);
            let err = client(&format!("http://{addr}"))
                .create(&make_car())
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
        }
    }
}
