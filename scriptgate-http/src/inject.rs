//! Snippet injection into HTML responses

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use bytes::{Bytes, BytesMut};
use http_body_util::BodyExt;
use hyper::body::{Body as HttpBody, Frame};
use scriptgate_common::DEFAULT_BACKEND_PREFIX;
use scriptgate_provider::{Location, Snippet, Zone};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{debug, warn};

/// Limits and zone settings for snippet injection
#[derive(Debug, Clone)]
pub struct InjectionConfig {
    /// Paths equal to or under this prefix are backend pages
    pub backend_prefix: String,
    /// Pages larger than this are passed through untouched (default: 5MB)
    pub max_page_bytes: usize,
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self {
            backend_prefix: DEFAULT_BACKEND_PREFIX.to_string(),
            max_page_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Zone a request path belongs to
pub fn zone_for_path(path: &str, backend_prefix: &str) -> Zone {
    let prefix = backend_prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return Zone::Frontend;
    }
    match path.strip_prefix(prefix) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => Zone::Backend,
        _ => Zone::Frontend,
    }
}

/// Render the snippets that apply to `zone`, lowest priority first.
///
/// A snippet that fails to render is logged and left out.
pub fn render_snippets(snippets: &[Snippet], zone: Zone) -> Vec<(Location, String)> {
    let mut applicable: Vec<&Snippet> = snippets.iter().filter(|s| s.applies_to(zone)).collect();
    applicable.sort_by_key(|s| s.priority());

    let mut rendered = Vec::with_capacity(applicable.len());
    for snippet in applicable {
        match snippet.render() {
            Ok(html) => rendered.push((snippet.location(), html)),
            Err(e) => {
                warn!(provider = snippet.provider_name(), error = %e, "Skipping tracking snippet");
                #[cfg(feature = "metrics")]
                {
                    use scriptgate_observability::{metrics_enabled, tracking_metrics};
                    if metrics_enabled() {
                        tracking_metrics()
                            .snippet_failures
                            .with_label_values(&[snippet.provider_name()])
                            .inc();
                    }
                }
            }
        }
    }
    rendered
}

/// Insert rendered fragments into a page.
///
/// End-of-body fragments go before the last `</body>`, end-of-head fragments
/// before the first `</head>`. Without the closing tag the fragment is
/// appended to the document.
pub fn inject_snippets(html: &str, fragments: &[(Location, String)]) -> String {
    let head = joined(fragments, Location::EndOfHead);
    let body = joined(fragments, Location::EndOfBody);
    if head.is_empty() && body.is_empty() {
        return html.to_string();
    }

    // ASCII lowercasing keeps byte offsets identical.
    let lower = html.to_ascii_lowercase();
    let head_at = (!head.is_empty()).then(|| lower.find("</head>")).flatten();
    let body_at = (!body.is_empty()).then(|| lower.rfind("</body>")).flatten();

    let mut out = String::with_capacity(html.len() + head.len() + body.len());
    let mut cursor = 0;
    let mut trailing = String::new();

    let mut inserts: Vec<(usize, &str)> = Vec::new();
    match head_at {
        Some(at) => inserts.push((at, head.as_str())),
        None => trailing.push_str(&head),
    }
    match body_at {
        Some(at) => inserts.push((at, body.as_str())),
        None => trailing.push_str(&body),
    }
    inserts.sort_by_key(|(at, _)| *at);

    for (at, fragment) in inserts {
        out.push_str(&html[cursor..at]);
        out.push_str(fragment);
        cursor = at;
    }
    out.push_str(&html[cursor..]);
    out.push_str(&trailing);
    out
}

fn joined(fragments: &[(Location, String)], location: Location) -> String {
    fragments
        .iter()
        .filter(|(l, _)| *l == location)
        .map(|(_, html)| html.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_injectable(headers: &HeaderMap) -> bool {
    let is_html = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().to_ascii_lowercase().starts_with("text/html"));
    let encoded = headers
        .get(header::CONTENT_ENCODING)
        .is_some_and(|v| v.as_bytes() != b"identity");
    is_html && !encoded
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Outcome of reading a page body against the size limit
enum PageBody<B> {
    Complete(Bytes),
    /// Limit hit (or trailers seen); the frames read so far are replayed
    /// ahead of the unread remainder.
    PassThrough(ReplayBody<B>),
}

async fn read_page<B>(body: B, limit: usize) -> Result<PageBody<B>, axum::BoxError>
where
    B: HttpBody<Data = Bytes>,
    B::Error: Into<axum::BoxError>,
{
    let mut rest = Box::pin(body);
    let mut buf = BytesMut::new();

    while let Some(frame) = rest.frame().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => return Err(e.into()),
        };
        if let Some(data) = frame.data_ref() {
            if buf.len() + data.len() <= limit {
                buf.extend_from_slice(data);
                continue;
            }
            debug!(limit, "Page exceeds size limit, skipping snippet injection");
        } else {
            debug!("Page carries trailers, skipping snippet injection");
        }

        let mut replay = VecDeque::with_capacity(2);
        if !buf.is_empty() {
            replay.push_back(Frame::data(buf.freeze()));
        }
        replay.push_back(frame);
        return Ok(PageBody::PassThrough(ReplayBody { replay, rest }));
    }

    Ok(PageBody::Complete(buf.freeze()))
}

/// Body that yields already-read frames before polling the original body
struct ReplayBody<B> {
    replay: VecDeque<Frame<Bytes>>,
    rest: Pin<Box<B>>,
}

impl<B> HttpBody for ReplayBody<B>
where
    B: HttpBody<Data = Bytes>,
    B::Error: Into<axum::BoxError>,
{
    type Data = Bytes;
    type Error = axum::BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, Self::Error>>> {
        let this = self.get_mut();
        if let Some(frame) = this.replay.pop_front() {
            return Poll::Ready(Some(Ok(frame)));
        }
        this.rest
            .as_mut()
            .poll_frame(cx)
            .map(|frame| frame.map(|r| r.map_err(Into::into)))
    }

    fn is_end_stream(&self) -> bool {
        self.replay.is_empty() && self.rest.is_end_stream()
    }
}

/// Layer that injects frontend snippets into HTML responses
#[derive(Clone)]
pub struct SnippetInjectionLayer {
    snippets: Arc<Vec<Snippet>>,
    config: Arc<InjectionConfig>,
}

impl SnippetInjectionLayer {
    pub fn new(snippets: Arc<Vec<Snippet>>) -> Self {
        Self::with_config(snippets, InjectionConfig::default())
    }

    pub fn with_config(snippets: Arc<Vec<Snippet>>, config: InjectionConfig) -> Self {
        Self {
            snippets,
            config: Arc::new(config),
        }
    }
}

impl<S> Layer<S> for SnippetInjectionLayer {
    type Service = SnippetInjectionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SnippetInjectionService {
            inner,
            snippets: self.snippets.clone(),
            config: self.config.clone(),
        }
    }
}

#[derive(Clone)]
pub struct SnippetInjectionService<S> {
    inner: S,
    snippets: Arc<Vec<Snippet>>,
    config: Arc<InjectionConfig>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for SnippetInjectionService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: HttpBody<Data = Bytes> + Send + 'static,
    ResBody::Error: Into<axum::BoxError>,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // Take the service that was driven to readiness, leave a clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let snippets = self.snippets.clone();
        let config = self.config.clone();
        let zone = zone_for_path(req.uri().path(), &config.backend_prefix);
        let is_head = req.method() == Method::HEAD;

        Box::pin(async move {
            let res = inner.call(req).await?;

            // Partial content and HEAD responses describe the page without
            // carrying all of it, rewriting either breaks the framing.
            if snippets.is_empty()
                || zone != Zone::Frontend
                || is_head
                || res.status() != StatusCode::OK
                || !is_injectable(res.headers())
            {
                return Ok(res.map(Body::new));
            }
            if declared_length(res.headers()).is_some_and(|len| len > config.max_page_bytes) {
                debug!("Page too large, skipping snippet injection");
                return Ok(res.map(Body::new));
            }

            let (mut parts, body) = res.into_parts();
            let bytes = match read_page(body, config.max_page_bytes).await {
                Ok(PageBody::Complete(bytes)) => bytes,
                Ok(PageBody::PassThrough(body)) => {
                    return Ok(Response::from_parts(parts, Body::new(body)));
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read page body for snippet injection");
                    return Ok(Response::builder()
                        .status(StatusCode::BAD_GATEWAY)
                        .body(Body::from("Failed to read page body"))
                        .unwrap_or_default());
                }
            };

            let Ok(html) = std::str::from_utf8(&bytes) else {
                debug!("Page is not UTF-8, skipping snippet injection");
                return Ok(Response::from_parts(parts, Body::from(bytes)));
            };

            let fragments = render_snippets(&snippets, zone);
            if fragments.is_empty() {
                return Ok(Response::from_parts(parts, Body::from(bytes)));
            }
            let page = inject_snippets(html, &fragments);

            #[cfg(feature = "metrics")]
            {
                use scriptgate_observability::{metrics_enabled, tracking_metrics};
                if metrics_enabled() {
                    tracking_metrics()
                        .snippets_injected
                        .inc_by(fragments.len() as u64);
                }
            }

            parts.headers.remove(header::CONTENT_LENGTH);
            parts
                .headers
                .insert(header::CONTENT_LENGTH, HeaderValue::from(page.len()));
            Ok(Response::from_parts(parts, Body::from(page)))
        })
    }
}
