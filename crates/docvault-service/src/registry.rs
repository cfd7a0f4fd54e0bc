//! Service graph wiring.

use std::sync::Arc;

use docvault_core::config::{LedgerConfig, TokenConfig};
use docvault_core::result::AppResult;
use docvault_core::traits::AuditSink;
use docvault_database::DatabasePool;
use docvault_database::memory::{
    MemoryAuditSink, MemoryDocumentStore, MemoryPolicyStore, MemoryTokenStore, MemoryVersionStore,
};
use docvault_database::store::{DocumentStore, PolicyStore, TokenStore, VersionStore};

use crate::access::{AccessGuard, AccessService};
use crate::audit::AuditLogger;
use crate::document::DocumentService;
use crate::download::DownloadService;
use crate::ledger::LedgerService;
use crate::token::TokenService;
use crate::upload::UploadService;

/// The stores every service is built on.
#[derive(Debug, Clone)]
pub struct StoreSet {
    /// Version ledger storage.
    pub versions: Arc<dyn VersionStore>,
    /// Access policy storage.
    pub policies: Arc<dyn PolicyStore>,
    /// Download token storage.
    pub tokens: Arc<dyn TokenStore>,
    /// Document directory.
    pub documents: Arc<dyn DocumentStore>,
    /// Audit destination.
    pub audit_sink: Arc<dyn AuditSink>,
}

impl StoreSet {
    /// In-process stores. Versions are checked against the document directory
    /// the same way the PostgreSQL foreign key checks them.
    pub fn memory() -> Self {
        let documents: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        Self {
            versions: Arc::new(MemoryVersionStore::with_documents(Arc::clone(&documents))),
            policies: Arc::new(MemoryPolicyStore::new()),
            tokens: Arc::new(MemoryTokenStore::new()),
            documents,
            audit_sink: Arc::new(MemoryAuditSink::new()),
        }
    }

    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(db: &DatabasePool) -> Self {
        let repos = db.repositories();
        Self {
            versions: Arc::new(repos.versions),
            policies: Arc::new(repos.policies),
            tokens: Arc::new(repos.tokens),
            documents: Arc::new(repos.documents),
            audit_sink: Arc::new(repos.audit),
        }
    }
}

/// All services, wired.
#[derive(Debug, Clone)]
pub struct Services {
    /// Version ledger.
    pub ledger: Arc<LedgerService>,
    /// Download token lifecycle.
    pub tokens: Arc<TokenService>,
    /// Policy management and access checks.
    pub access: Arc<AccessService>,
    /// Upload confirmation.
    pub upload: Arc<UploadService>,
    /// Download request and redemption.
    pub download: Arc<DownloadService>,
    /// Document lifecycle.
    pub documents: Arc<DocumentService>,
    /// Shared audit logger.
    pub audit: AuditLogger,
}

impl Services {
    /// Build the service graph over `stores`.
    ///
    /// Fails when the token configuration is out of range.
    pub fn build(
        stores: StoreSet,
        ledger_config: &LedgerConfig,
        token_config: &TokenConfig,
    ) -> AppResult<Self> {
        let audit = AuditLogger::new(Arc::clone(&stores.audit_sink));
        let guard = AccessGuard::new(Arc::clone(&stores.documents), Arc::clone(&stores.policies));

        let ledger = Arc::new(LedgerService::new(
            Arc::clone(&stores.versions),
            audit.clone(),
            ledger_config.clone(),
        ));
        let tokens = Arc::new(TokenService::new(
            Arc::clone(&stores.tokens),
            Arc::clone(&stores.documents),
            Arc::clone(&ledger),
            token_config.clone(),
        )?);
        let access = Arc::new(AccessService::new(
            guard.clone(),
            Arc::clone(&stores.policies),
            audit.clone(),
        ));
        let upload = Arc::new(UploadService::new(guard.clone(), Arc::clone(&ledger)));
        let download = Arc::new(DownloadService::new(
            guard.clone(),
            Arc::clone(&tokens),
            Arc::clone(&ledger),
            audit.clone(),
        ));
        let documents = Arc::new(DocumentService::new(
            guard,
            Arc::clone(&stores.documents),
            Arc::clone(&stores.policies),
            Arc::clone(&ledger),
            audit.clone(),
        ));

        Ok(Self {
            ledger,
            tokens,
            access,
            upload,
            download,
            documents,
            audit,
        })
    }
}
