//! Static viewer server for datasets, exports and source PDFs.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Uri};
use axum::middleware::{self, Next};
use axum::response::{Redirect, Response};
use axum::routing::get;
use axum::Router;
use colored::Colorize;
use tower_http::services::ServeDir;

/// Page the root path redirects to.
pub const INDEX_PATH: &str = "/interface/index.html";

/// Options for [`run`].
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub root: PathBuf,
    pub host: String,
    pub port: u16,
    pub open_browser: bool,
}

/// What the server found in its root directory at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
    pub main_dataset: bool,
    pub demo_data: bool,
    pub index_page: bool,
    /// `None` if the PDFs directory is missing
    pub pdf_count: Option<usize>,
}

impl StartupReport {
    /// Inspect a root directory.
    pub fn inspect(root: &Path) -> Self {
        let pdfs = root.join("PDFs");
        Self {
            main_dataset: root.join("output").join("layout_dataset.json").is_file(),
            demo_data: root.join("interface").join("demo-data.json").is_file(),
            index_page: root.join(INDEX_PATH.trim_start_matches('/')).is_file(),
            pdf_count: doclayout::collect_pdfs(&pdfs).ok().map(|p| p.len()),
        }
    }

    fn print(&self) {
        if self.main_dataset {
            println!("{} Main dataset found: output/layout_dataset.json", "✓".green());
        } else if self.demo_data {
            println!("{} Using demo data (interface/demo-data.json)", "•".cyan());
            println!("  Run `doclayout process` to generate real data");
        } else {
            println!("{} No dataset files found", "!".yellow());
            println!("  Run `doclayout process` to generate data");
        }

        if !self.index_page {
            println!("{} {} is missing", "!".yellow(), INDEX_PATH.trim_start_matches('/'));
        }

        match self.pdf_count {
            Some(n) => println!("{} Found {} PDF files in PDFs/", "✓".green(), n),
            None => println!("{} PDFs directory not found", "!".yellow()),
        }
    }
}

/// Build the router serving `root`.
pub fn router(root: PathBuf) -> Router {
    let root = Arc::new(root);
    Router::new()
        .route("/", get(|| async { Redirect::temporary(INDEX_PATH) }))
        .fallback_service(ServeDir::new(root.as_path()))
        .layer(middleware::from_fn_with_state(root, rewrite_request))
}

/// Start the server and block until Ctrl+C.
pub fn run(options: ServeOptions) -> Result<(), Box<dyn std::error::Error>> {
    let root = options.root.canonicalize()?;

    println!("{}", "Dataset Viewer".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Serving".bold(), root.display());
    StartupReport::inspect(&root).print();
    println!();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind((options.host.as_str(), options.port))
            .await
            .map_err(|e| format!("could not bind {}:{} ({})", options.host, options.port, e))?;
        let addr: SocketAddr = listener.local_addr()?;
        let url = format!("http://{}:{}{}", options.host, addr.port(), INDEX_PATH);

        println!("{} {}", "Interface:".green().bold(), url);
        println!("{} http://{}:{}/PDFs/", "PDFs:".bold(), options.host, addr.port());
        println!("{}", "Press Ctrl+C to stop".dimmed());

        if options.open_browser {
            if let Err(e) = opener::open(&url) {
                println!("{} could not open a browser ({}); open {} manually", "!".yellow(), e, url);
            }
        }

        axum::serve(listener, router(root))
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        println!("\n{}", "Server stopped".dimmed());
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Could not listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn rewrite_request(State(root): State<Arc<PathBuf>>, mut request: Request, next: Next) -> Response {
    if let Some(path) = html_fallback(&root, request.uri().path()) {
        let query = request
            .uri()
            .query()
            .map(|q| format!("?{}", q))
            .unwrap_or_default();
        match format!("{}{}", path, query).parse::<Uri>() {
            Ok(uri) => *request.uri_mut() = uri,
            Err(e) => log::debug!("Not rewriting {}: {}", path, e),
        }
    }

    let content_type = content_type_override(request.uri().path());
    let mut response = next.run(request).await;
    if let Some(value) = content_type {
        if response.status().is_success() {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(value));
        }
    }
    response
}

/// `<path>.html` if the last segment has no extension and that file exists under `root`.
pub fn html_fallback(root: &Path, path: &str) -> Option<String> {
    let trimmed = path.trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or("");
    if last.is_empty() || last.contains('.') {
        return None;
    }

    let candidate = format!("{}.html", trimmed);
    let relative = candidate.trim_start_matches('/');
    if relative.split('/').any(|segment| segment == "..") {
        return None;
    }
    root.join(relative).is_file().then_some(candidate)
}

/// Content types the static file service does not know.
fn content_type_override(path: &str) -> Option<&'static str> {
    if path.ends_with(".jsonl") {
        Some("application/jsonl; charset=utf-8")
    } else {
        None
    }
}
