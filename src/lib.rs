//! RAML Language Server implementation.

use std::path::PathBuf;
use std::sync::OnceLock;

use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService};

mod document;
pub mod logging;
mod lsp;
pub mod providers;
mod rename;
pub(crate) mod settings;
pub mod syntax;

pub use document::{Document, DocumentStore, LineIndex};
pub use lsp::{report_to_diagnostics, symbol_kind, to_symbols, Dispatcher, EditAggregator};
pub use rename::{rename_in_attribute, ChangedDocument, EditList, RenameEngine, RenameError, TextEdit};
pub use settings::{discover_settings, load_settings, Feature, Settings};

use logging::MessageSeverity;

pub struct Backend {
    client: Client,
    documents: DocumentStore,
    workspace_root: OnceLock<PathBuf>,
    dispatcher: OnceLock<Dispatcher>,
}

impl Backend {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            documents: DocumentStore::new(),
            workspace_root: OnceLock::new(),
            dispatcher: OnceLock::new(),
        }
    }

    fn dispatcher(&self) -> &Dispatcher {
        self.dispatcher
            .get_or_init(|| Dispatcher::from_settings(&Settings::default()))
    }

    /// Log locally and forward the message to the client.
    async fn report(&self, severity: MessageSeverity, message: &str) {
        logging::log(severity, "server", message);
        self.client.log_message(severity.message_type(), message).await;
    }

    /// Store the new text and publish diagnostics.
    async fn on_document_change(&self, uri: Url, text: String, version: i32) {
        self.documents.open(uri.clone(), text, version);
        self.publish_diagnostics_for(&uri, version).await;
    }

    /// Validate a document and publish the diagnostics of every report.
    async fn publish_diagnostics_for(&self, uri: &Url, version: i32) {
        for (report_uri, diagnostics) in self.dispatcher().validate(&self.documents, uri) {
            let version = (report_uri == *uri).then_some(version);
            self.client
                .publish_diagnostics(report_uri, diagnostics, version)
                .await;
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        // Extract workspace root from params
        let workspace_root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .and_then(|f| f.uri.to_file_path().ok())
            .or_else(|| {
                #[allow(deprecated)]
                params.root_uri.as_ref()?.to_file_path().ok()
            });

        let settings = match workspace_root {
            Some(root) => {
                let _ = self.workspace_root.set(root.clone());
                // Discover settings by walking up the directory tree
                let (settings, settings_dir) = settings::discover_settings(&root);
                tracing::info!(component = "server", dir = %settings_dir.display(), "settings loaded");
                settings
            }
            None => Settings::default(),
        };

        let enabled = |feature| settings.feature_enabled(feature);
        let capabilities = ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(
                TextDocumentSyncKind::FULL,
            )),
            document_symbol_provider: enabled(Feature::Symbols).then_some(OneOf::Left(true)),
            completion_provider: enabled(Feature::Completion).then(|| CompletionOptions {
                trigger_characters: Some(vec![":".to_string(), " ".to_string()]),
                resolve_provider: Some(false),
                ..Default::default()
            }),
            definition_provider: enabled(Feature::Definition).then_some(OneOf::Left(true)),
            references_provider: enabled(Feature::References).then_some(OneOf::Left(true)),
            document_highlight_provider: enabled(Feature::Highlight).then_some(OneOf::Left(true)),
            rename_provider: enabled(Feature::Rename).then(|| {
                OneOf::Right(RenameOptions {
                    prepare_provider: Some(true),
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                })
            }),
            ..Default::default()
        };

        let _ = self.dispatcher.set(Dispatcher::from_settings(&settings));

        Ok(InitializeResult {
            capabilities,
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.report(MessageSeverity::DebugOverview, "RAML language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.on_document_change(
            params.text_document.uri,
            params.text_document.text,
            params.text_document.version,
        )
        .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // We use FULL sync, so there's exactly one change with the full text
        if let Some(change) = params.content_changes.into_iter().next() {
            self.on_document_change(
                params.text_document.uri,
                change.text,
                params.text_document.version,
            )
            .await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.close(&params.text_document.uri);
        // Clear diagnostics
        self.client
            .publish_diagnostics(params.text_document.uri, vec![], None)
            .await;
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let symbols = self
            .dispatcher()
            .symbols(&self.documents, &params.text_document.uri);
        Ok(Some(DocumentSymbolResponse::Flat(symbols)))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let items = self.dispatcher().completion(&self.documents, uri, position);
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let locations = self.dispatcher().definition(&self.documents, uri, position);
        if locations.is_empty() {
            return Ok(None);
        }
        Ok(Some(GotoDefinitionResponse::Array(locations)))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        Ok(Some(
            self.dispatcher().references(&self.documents, uri, position),
        ))
    }

    async fn document_highlight(
        &self,
        params: DocumentHighlightParams,
    ) -> Result<Option<Vec<DocumentHighlight>>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        Ok(Some(
            self.dispatcher().highlight(&self.documents, uri, position),
        ))
    }

    async fn prepare_rename(
        &self,
        params: TextDocumentPositionParams,
    ) -> Result<Option<PrepareRenameResponse>> {
        let range = self
            .dispatcher()
            .prepare_rename(&self.documents, &params.text_document.uri, params.position);
        Ok(range.map(PrepareRenameResponse::Range))
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        match self
            .dispatcher()
            .rename(&self.documents, uri, position, &params.new_name)
        {
            Ok(edit) => Ok(Some(edit)),
            Err(e) => {
                self.report(MessageSeverity::Warning, &format!("rename rejected: {e}"))
                    .await;
                Err(Error::invalid_params(e.to_string()))
            }
        }
    }
}

pub fn create_service() -> (LspService<Backend>, tower_lsp::ClientSocket) {
    LspService::new(Backend::new)
}
