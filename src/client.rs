use std::path::Path;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, warn};

use crate::download::ImageStream;
use crate::errors::{Result, VanceAiError};
use crate::job::Job;
use crate::models::{ProgressRequest, Response, TransformRequest};

const DEFAULT_BASE_URL: &str = "https://api-service.vanceai.com/web_api/v1";
const API_KEY_ENV: &str = "VANCEAI_API_KEY";

const UPLOAD: &str = "/upload";
const TRANSFORM: &str = "/transform";
const PROGRESS: &str = "/progress";
const DOWNLOAD: &str = "/download";
const POINT: &str = "/point";

/// Builder for constructing a [`Client`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// use vanceai::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> vanceai::Result<()> {
/// let client = ClientBuilder::new()
///     .api_key("your_api_token")
///     .webhook("https://example.com/vanceai/callback")
///     .timeout(Duration::from_secs(120))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    api_key: Option<String>,
    webhook: String,
    base_url: String,
    timeout: Option<Duration>,
    http: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            api_key: None,
            webhook: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            http: None,
        }
    }

    /// Set the API token sent with every request.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// URL the service calls when a submitted job completes. Empty by default.
    pub fn webhook(mut self, url: impl Into<String>) -> Self {
        self.webhook = url.into();
        self
    }

    /// Override the base URL (defaults to `https://api-service.vanceai.com/web_api/v1`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Per-request timeout. There is none unless set here.
    ///
    /// Ignored when a client is supplied through [`http_client`](Self::http_client).
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = Some(d);
        self
    }

    /// Use a pre-configured `reqwest::Client` (proxies, TLS, pool settings).
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the [`Client`].
    ///
    /// If no API key was set via [`api_key`](Self::api_key), the builder will
    /// attempt to read the `VANCEAI_API_KEY` environment variable.
    ///
    /// Returns [`VanceAiError::MissingApiKey`] if no key is available.
    pub fn build(self) -> Result<Client> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.is_empty())
            .ok_or(VanceAiError::MissingApiKey)?;

        let http = match self.http {
            Some(http) => http,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(Client {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            api_key,
            webhook: self.webhook,
            http,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The VanceAI API client.
///
/// Every method issues exactly one HTTP request. The client keeps no per-call
/// state, so it can be cloned and shared across tasks freely. There is no
/// retry and no default timeout; wrap calls in `tokio::time::timeout` or drop
/// the future to cancel.
///
/// # Example
///
/// ```no_run
/// use vanceai::{Client, Config, Job, ModuleParams};
///
/// # async fn example() -> vanceai::Result<()> {
/// let client = Client::new("your_api_token", "");
///
/// let uploaded = client.upload_file("cat.jpg").await?;
/// let job = Job::single(
///     "enlarge",
///     Config::new("enlarge", ModuleParams {
///         model_name: "EnlargeStable".into(),
///         scale: "2x".into(),
///         ..Default::default()
///     }),
/// );
/// let submitted = client.transform(&uploaded.data.uid, &job).await?;
/// let progress = client.get_progress(&submitted.data.trans_id).await?;
/// println!("status: {:?}", progress.data.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    base_url: String,
    api_key: String,
    webhook: String,
    http: reqwest::Client,
}

impl Client {
    /// Create a client with the given API token and webhook URL (may be empty).
    ///
    /// For customization, use [`ClientBuilder`] instead.
    pub fn new(api_key: impl Into<String>, webhook: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            webhook: webhook.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn webhook(&self) -> &str {
        &self.webhook
    }

    /// Upload an image read from `reader` under the display name `name`.
    ///
    /// The returned envelope carries the image `uid` and its dimensions.
    ///
    /// # Errors
    ///
    /// - [`VanceAiError::Io`] if reading `reader` fails.
    /// - [`VanceAiError::Status`] for any HTTP status other than 200.
    /// - [`VanceAiError::Api`] if the envelope reports a known failure.
    pub async fn upload<R>(&self, mut reader: R, name: impl Into<String>) -> Result<Response>
    where
        R: AsyncRead + Unpin,
    {
        let mut content = Vec::new();
        reader.read_to_end(&mut content).await?;
        self.upload_bytes(content, name.into()).await
    }

    /// Upload a local image file, using its file name as the display name.
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<Response> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.jpg".to_string());

        let content = tokio::fs::read(path).await?;
        self.upload_bytes(content, name).await
    }

    /// Submit a processing job for an uploaded image.
    ///
    /// `uid` comes from [`upload`](Self::upload). The response carries the
    /// `trans_id` used by [`get_progress`](Self::get_progress) and
    /// [`download`](Self::download).
    pub async fn transform(&self, uid: &str, job: &Job) -> Result<Response> {
        let body = TransformRequest {
            api_token: &self.api_key,
            uid,
            webhook: &self.webhook,
            jconfig: job.to_jconfig()?,
        };
        debug!(uid, job = job.kind(), "submitting job");

        let req = self.http.post(self.url(TRANSFORM)).json(&body);
        self.request(TRANSFORM, req).await
    }

    /// Query the current status of a submitted job.
    ///
    /// This is a single point-in-time query; callers own the polling cadence.
    pub async fn get_progress(&self, trans_id: &str) -> Result<Response> {
        let body = ProgressRequest {
            api_token: &self.api_key,
            trans_id,
        };
        let req = self.http.post(self.url(PROGRESS)).json(&body);
        self.request(PROGRESS, req).await
    }

    /// Fetch the processed image as an open byte stream.
    ///
    /// # Errors
    ///
    /// - [`VanceAiError::Status`] for any HTTP status other than 200.
    /// - [`VanceAiError::Api`] if the service answers with an error envelope.
    /// - [`VanceAiError::UnexpectedPayload`] if it answers with a non-error
    ///   envelope instead of image data.
    pub async fn download(&self, trans_id: &str) -> Result<ImageStream> {
        let form = Form::new()
            .text("api_token", self.api_key.clone())
            .text("trans_id", trans_id.to_string());
        let req = self.http.post(self.url(DOWNLOAD)).multipart(form);

        let resp = self.send(DOWNLOAD, req).await?;
        if resp.status() != StatusCode::OK {
            return Err(status_error(DOWNLOAD, resp).await);
        }

        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));
        if !is_json {
            return Ok(ImageStream::new(resp));
        }

        let envelope = check_envelope(DOWNLOAD, decode(DOWNLOAD, resp).await?)?;
        Err(VanceAiError::UnexpectedPayload {
            route: DOWNLOAD,
            code: envelope.code,
            message: envelope.msg.to_string(),
        })
    }

    /// Retrieve the account quota. `data.max_num` and `data.used_num` are set.
    pub async fn get_point(&self) -> Result<Response> {
        let req = self
            .http
            .get(self.url(POINT))
            .query(&[("api_token", self.api_key.as_str())]);
        self.request(POINT, req).await
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    async fn upload_bytes(&self, content: Vec<u8>, name: String) -> Result<Response> {
        debug!(name = %name, size = content.len(), "uploading image");
        let form = Form::new()
            .part("file", Part::bytes(content).file_name(name))
            .text("api_token", self.api_key.clone());

        let req = self.http.post(self.url(UPLOAD)).multipart(form);
        self.request(UPLOAD, req).await
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    /// Send a request whose answer is an envelope, then apply error mapping.
    async fn request(&self, route: &'static str, req: RequestBuilder) -> Result<Response> {
        let resp = self.send(route, req).await?;
        if resp.status() != StatusCode::OK {
            return Err(status_error(route, resp).await);
        }
        let envelope = decode(route, resp).await?;
        check_envelope(route, envelope)
    }

    async fn send(&self, route: &'static str, req: RequestBuilder) -> Result<reqwest::Response> {
        debug!(route, "sending request");
        let resp = req.send().await?;
        debug!(route, status = %resp.status(), "received response");
        Ok(resp)
    }
}

/// Read the body of a non-200 response into a [`VanceAiError::Status`].
async fn status_error(route: &'static str, resp: reqwest::Response) -> VanceAiError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    VanceAiError::Status {
        route,
        status,
        body,
    }
}

async fn decode(route: &'static str, resp: reqwest::Response) -> Result<Response> {
    let body = resp.bytes().await?;
    serde_json::from_slice(&body).map_err(|source| VanceAiError::Decode { route, source })
}

fn check_envelope(route: &'static str, envelope: Response) -> Result<Response> {
    if let Some(kind) = envelope.error() {
        return Err(VanceAiError::Api {
            route,
            kind,
            code: envelope.code,
            message: envelope.msg.to_string(),
        });
    }
    if !envelope.is_success_code() {
        warn!(
            route,
            code = envelope.code,
            msg = %envelope.msg,
            "unrecognized response code, treating as success"
        );
    }
    debug!(route, code = envelope.code, "decoded envelope");
    Ok(envelope)
}
