use crate::{
    page::{Action, Page, SessionView},
    service::LoopService,
    session::{new_session_id, SessionId},
};
use anyhow::{format_err, Context, Result};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::Local;
use serde::Deserialize;
use std::{io, net::SocketAddr, path::PathBuf};
use tokio::{runtime::Runtime, sync::oneshot};
use tracing::{error, info};

pub const SESSION_COOKIE: &str = "auction_session";

pub struct Ui {
    // cancels all tasks on drop
    _runtime: Runtime,
    server_rx: oneshot::Receiver<Result<()>>,
}

/// Internal failure while handling a request, reported as a 500
pub struct UiError(anyhow::Error);

impl<E> From<E> for UiError
where
    E: Into<anyhow::Error>,
{
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for UiError {
    fn into_response(self) -> Response {
        error!("request failed: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

#[derive(Deserialize, Debug)]
pub struct BidForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    bid: String,
}

pub fn router(page: Page) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/state", get(state))
        .route("/bid", post(bid))
        .route("/nav/previous", post(previous_image))
        .route("/nav/next", post(next_image))
        .route("/image/:index", get(image))
        .route("/logo", get(logo))
        .with_state(page)
}

/// Session id from the cookie, or a fresh one if there is none
fn session_id(headers: &HeaderMap) -> (SessionId, bool) {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| (value.to_owned(), false))
        .unwrap_or_else(|| (new_session_id(), true))
}

fn with_session_cookie(response: impl IntoResponse, id: &str, fresh: bool) -> Response {
    let mut response = response.into_response();
    if fresh {
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

async fn run_tick(page: &Page, session_id: &str, action: Action) -> Result<SessionView, UiError> {
    let page = page.clone();
    let session_id = session_id.to_owned();
    let view = tokio::task::spawn_blocking(move || page.tick(&session_id, action, Local::now()))
        .await??;
    Ok(view)
}

async fn index(State(page): State<Page>, headers: HeaderMap) -> Result<Response, UiError> {
    let (id, fresh) = session_id(&headers);
    let view = run_tick(&page, &id, Action::Refresh).await?;
    Ok(with_session_cookie(Html(page.render(&view)), &id, fresh))
}

async fn state(State(page): State<Page>, headers: HeaderMap) -> Result<Response, UiError> {
    let (id, fresh) = session_id(&headers);
    let view = run_tick(&page, &id, Action::Refresh).await?;
    Ok(with_session_cookie(Json(view), &id, fresh))
}

async fn act(page: &Page, headers: &HeaderMap, action: Action) -> Result<Response, UiError> {
    let (id, fresh) = session_id(headers);
    run_tick(page, &id, action).await?;
    Ok(with_session_cookie(Redirect::to("/"), &id, fresh))
}

async fn bid(
    State(page): State<Page>,
    headers: HeaderMap,
    Form(form): Form<BidForm>,
) -> Result<Response, UiError> {
    act(
        &page,
        &headers,
        Action::Bid {
            email: form.email,
            amount: form.bid,
        },
    )
    .await
}

async fn previous_image(State(page): State<Page>, headers: HeaderMap) -> Result<Response, UiError> {
    act(&page, &headers, Action::PreviousImage).await
}

async fn next_image(State(page): State<Page>, headers: HeaderMap) -> Result<Response, UiError> {
    act(&page, &headers, Action::NextImage).await
}

async fn image(
    State(page): State<Page>,
    Path(index): Path<usize>,
) -> Result<Response, UiError> {
    match page.config().image_paths.get(index) {
        Some(path) => serve_file(path.clone()).await,
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

async fn logo(State(page): State<Page>) -> Result<Response, UiError> {
    serve_file(page.config().logo_path.clone()).await
}

async fn serve_file(path: PathBuf) -> Result<Response, UiError> {
    let content_type = match path.extension().and_then(|e| e.to_str()) {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(StatusCode::NOT_FOUND.into_response()),
        Err(e) => Err(UiError::from(
            anyhow::Error::from(e).context(format!("reading {}", path.display())),
        )),
    }
}

async fn run_http_server(page: Page, bind_addr: SocketAddr) -> Result<()> {
    let server = axum::Server::try_bind(&bind_addr)?;
    info!(addr = %bind_addr, "auction page listening");

    server.serve(router(page).into_make_service()).await?;

    Ok(())
}

impl Ui {
    pub fn new(page: Page) -> Result<Self> {
        let runtime = Runtime::new()?;
        let bind_addr = page.config().bind_addr;

        let (tx, rx) = oneshot::channel();

        runtime.spawn(async move {
            // receiver only goes away together with `Ui`
            let _ = tx.send(
                run_http_server(page, bind_addr)
                    .await
                    .with_context(|| format!("Failed to run http server on {}", bind_addr)),
            );
        });

        Ok(Self {
            _runtime: runtime,
            server_rx: rx,
        })
    }
}

impl LoopService for Ui {
    fn name(&self) -> &'static str {
        "ui"
    }

    fn run_iteration(&mut self) -> Result<()> {
        // don't hog the cpu
        std::thread::sleep(std::time::Duration::from_millis(100));

        match self.server_rx.try_recv() {
            Ok(res) => res,
            Err(oneshot::error::TryRecvError::Empty) => Ok(()),
            Err(oneshot::error::TryRecvError::Closed) => {
                Err(format_err!("ui server died with leaving a response?!"))
            }
        }
    }
}
