//! MCP Server for bookshelf-mcp
//!
//! MCP Protocol (stdio) <-> application::LibraryService
//!
//! 5 tools: shelf, add_book, remove_book, open_book, save

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;

use rmcp::{
    handler::server::{tool::ToolCallContext, tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
    transport::{stdio, IntoTransport},
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::application::error::AppError;
use crate::application::service::LibraryService;
use crate::domain::model::book::BookRecord;
use crate::domain::opener::DocumentOpener;
use crate::infra::json_store::JsonLibraryRepository;
use crate::infra::opener::SystemOpener;

type SharedService = Arc<Mutex<LibraryService<JsonLibraryRepository>>>;

// =============================================================================
// Public entry point
// =============================================================================

/// stdio上でMCP Serverを起動する。SIGTERM / SIGINT でも保存してから終了する。
pub async fn run(data_path: PathBuf) -> anyhow::Result<()> {
    serve_with(data_path, stdio(), Arc::new(SystemOpener), shutdown_signal()).await
}

/// 任意のトランスポートでMCP Serverを動かす。
///
/// 起動時に本棚を読み込み、接続終了・`shutdown` 完了・接続エラーのいずれでも保存してから戻る。
pub async fn serve_with<T, E, A>(
    data_path: PathBuf,
    transport: T,
    opener: Arc<dyn DocumentOpener + Send + Sync>,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()>
where
    T: IntoTransport<RoleServer, E, A>,
    E: std::error::Error + Send + Sync + 'static,
{
    let svc = open_library(&data_path)?;
    tracing::info!(path = %data_path.display(), books = svc.list().len(), "Bookshelf ready");

    let server = BookshelfMcpServer::new(svc, opener);
    let shared = Arc::clone(&server.service);

    let outcome = match server.serve(transport).await {
        Ok(running) => tokio::select! {
            res = running.waiting() => res.map(|_| ()).map_err(anyhow::Error::from),
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
        },
        Err(e) => Err(e.into()),
    };

    persist(&shared)?;
    outcome
}

/// 本棚を読み込む。読めないファイルは `<path>.corrupt` へ退避して空の本棚で始める。
fn open_library(data_path: &Path) -> anyhow::Result<LibraryService<JsonLibraryRepository>> {
    let mut svc = LibraryService::new(JsonLibraryRepository::new(data_path));
    if let Err(e) = svc.load() {
        let moved = svc.repository().quarantine().with_context(|| {
            format!("cannot move unreadable bookshelf {} aside", data_path.display())
        })?;
        tracing::warn!(
            path = %data_path.display(),
            moved_to = %moved.display(),
            error = %e,
            "Failed to load bookshelf; moved it aside and starting empty"
        );
    }
    Ok(svc)
}

fn persist(shared: &SharedService) -> anyhow::Result<()> {
    let svc = shared
        .lock()
        .map_err(|_| anyhow::anyhow!("bookshelf lock poisoned"))?;
    svc.save()
        .inspect_err(|e| tracing::error!(error = %e, "Failed to save bookshelf"))?;
    tracing::info!(books = svc.list().len(), "Bookshelf saved");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                tracing::warn!("Failed to register signal handlers; saving on disconnect only");
                std::future::pending::<()>().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

// =============================================================================
// MCP Server
// =============================================================================

#[derive(Clone)]
struct BookshelfMcpServer {
    service: SharedService,
    opener: Arc<dyn DocumentOpener + Send + Sync>,
    tool_router: ToolRouter<Self>,
}

impl BookshelfMcpServer {
    fn new(
        service: LibraryService<JsonLibraryRepository>,
        opener: Arc<dyn DocumentOpener + Send + Sync>,
    ) -> Self {
        Self {
            service: Arc::new(Mutex::new(service)),
            opener,
            tool_router: Self::tool_router(),
        }
    }

    fn service(&self) -> Result<MutexGuard<'_, LibraryService<JsonLibraryRepository>>, McpError> {
        self.service
            .lock()
            .map_err(|_| McpError::internal_error("Lock poisoned", None))
    }

    fn to_mcp_error(e: AppError) -> McpError {
        match e {
            AppError::Domain(_) | AppError::BookNotFound(_) | AppError::FileMissing(_) => {
                McpError::invalid_params(format!("{e}"), None)
            }
            _ => McpError::internal_error(format!("{e}"), None),
        }
    }
}

/// 完全一致タイトル → `shelf` の番号 の順に解決してタイトルを返す。
fn resolve_book_ref(books: &[BookRecord], book_ref: &str) -> Result<String, McpError> {
    if books.iter().any(|b| b.title() == book_ref) {
        return Ok(book_ref.to_string());
    }
    if let Ok(num) = book_ref.parse::<usize>() {
        if num == 0 || num > books.len() {
            return Err(McpError::invalid_params(
                format!(
                    "Book number {} out of range (1-{}). Use `shelf` to see available books.",
                    num,
                    books.len()
                ),
                None,
            ));
        }
        return Ok(books[num - 1].title().to_string());
    }
    Err(McpError::invalid_params(
        format!("No book titled '{book_ref}'. Use `shelf` to see available books."),
        None,
    ))
}

fn format_shelf(books: &[BookRecord]) -> String {
    let mut output = format!("# Shelf ({} books)\n\n", books.len());
    for (i, book) in books.iter().enumerate() {
        let kind = book
            .kind()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "?".to_string());
        output.push_str(&format!(
            "{}. {} [{}] — {} (page {})\n",
            i + 1,
            book.title(),
            kind,
            book.file_path(),
            book.current_page()
        ));
    }
    output
}

// =============================================================================
// ServerHandler impl
// =============================================================================

impl ServerHandler for BookshelfMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "bookshelf-mcp".to_string(),
                title: Some("Bookshelf MCP — Personal Document Shelf".to_string()),
                description: Some(
                    "Keeps a list of text/PDF documents and opens them in the system viewer."
                        .to_string(),
                ),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Manage a personal bookshelf of .txt and .pdf files.\n\
                 \n\
                 Tools: `shelf` to list, `add_book` with a file path, `remove_book` by title, \
                 `open_book` by title or number. Changes are saved immediately and again on shutdown."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool_ctx = ToolCallContext::new(self, request, context);
        self.tool_router.call(tool_ctx).await
    }
}

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpShelfRequest {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpAddBookRequest {
    #[schemars(description = "Absolute path to a .txt or .pdf file")]
    pub path: String,

    #[schemars(description = "Display title (default: the file name)")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpRemoveBookRequest {
    #[schemars(description = "Exact title. Every book with this title is removed.")]
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpOpenBookRequest {
    #[schemars(description = "Book title or number from `shelf` output (e.g. '2')")]
    pub book: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpSaveRequest {}

// =============================================================================
// Tool implementations
// =============================================================================

#[tool_router]
impl BookshelfMcpServer {
    #[tool(
        name = "shelf",
        description = "List all books on the shelf in insertion order, with file path and reading page.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn shelf(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpShelfRequest>,
    ) -> Result<CallToolResult, McpError> {
        let svc = self.service()?;
        let books = svc.list();

        if books.is_empty() {
            return Ok(CallToolResult::success(vec![Content::text(
                "Shelf is empty. Use `add_book` to add a .txt or .pdf file.",
            )]));
        }

        Ok(CallToolResult::success(vec![Content::text(format_shelf(books))]))
    }

    #[tool(
        name = "add_book",
        description = "Add a document to the shelf and save it. The title defaults to the file name; only .txt and .pdf files are accepted unless a title is given explicitly.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = false
        )
    )]
    async fn add_book(
        &self,
        Parameters(req): Parameters<McpAddBookRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut svc = self.service()?;
        let path = req.path.trim();

        let explicit = req
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let title = match explicit {
            Some(title) => {
                svc.add(title, path);
                title.to_string()
            }
            None => svc
                .add_file(Path::new(path))
                .map_err(Self::to_mcp_error)?
                .title()
                .to_string(),
        };
        svc.save().map_err(Self::to_mcp_error)?;
        tracing::info!(title = %title, path = %path, "Added book");

        Ok(CallToolResult::success(vec![Content::text(format!(
            "Added: {}. {}",
            svc.list().len(),
            title
        ))]))
    }

    #[tool(
        name = "remove_book",
        description = "Remove every book whose title matches exactly and save the shelf. Removing a title that is not on the shelf does nothing.",
        annotations(
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn remove_book(
        &self,
        Parameters(req): Parameters<McpRemoveBookRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut svc = self.service()?;
        let removed = svc.remove(&req.title);
        if removed > 0 {
            svc.save().map_err(Self::to_mcp_error)?;
        }
        tracing::info!(title = %req.title, removed, "Removed book");

        let text = if removed == 0 {
            format!("No book titled '{}'. Shelf unchanged.", req.title)
        } else {
            format!("Removed {} book(s) titled '{}'.", removed, req.title)
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        name = "open_book",
        description = "Open a book in the system's default viewer. Reports an error if the file no longer exists on disk.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    async fn open_book(
        &self,
        Parameters(req): Parameters<McpOpenBookRequest>,
    ) -> Result<CallToolResult, McpError> {
        let svc = self.service()?;
        let title = resolve_book_ref(svc.list(), req.book.trim())?;
        let path = svc
            .open(&title, self.opener.as_ref())
            .map_err(Self::to_mcp_error)?;

        Ok(CallToolResult::success(vec![Content::text(format!(
            "Opened: {} ({})",
            title,
            path.display()
        ))]))
    }

    #[tool(
        name = "save",
        description = "Write the shelf to disk now. The shelf is also saved after every change and on shutdown.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn save(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpSaveRequest>,
    ) -> Result<CallToolResult, McpError> {
        let svc = self.service()?;
        svc.save().map_err(Self::to_mcp_error)?;

        Ok(CallToolResult::success(vec![Content::text(format!(
            "Saved {} book(s).",
            svc.list().len()
        ))]))
    }
}
