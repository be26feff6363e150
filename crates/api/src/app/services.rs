//! Infrastructure wiring: stores, directory, verifier, cache.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use dealgate_audit::{AuditSink, AuditStore};
use dealgate_auth::{
    ClaimGuard, Hs256TokenVerifier, OrganizationStore, TokenVerifier, UserStore,
};
use dealgate_cache::ResponseCache;
use dealgate_entitlements::{EntitlementResolver, OrganizationDirectory};
use dealgate_infra::{
    ClerkDirectory, InMemoryAuditStore, InMemoryOrganizationStore, InMemoryUserStore,
    PgAuditStore, PgOrganizationStore, PgUserStore, StaticDirectory,
};

/// Service graph shared by all handlers.
#[derive(Clone)]
pub struct AppServices {
    pub guard: ClaimGuard,
    pub resolver: Arc<EntitlementResolver>,
    pub cache: ResponseCache,
    pub audit: AuditSink,
    pub users: Arc<dyn UserStore>,
    pub orgs: Arc<dyn OrganizationStore>,
}

impl AppServices {
    /// Wire the service graph from explicit parts. Production wiring goes
    /// through [`build_services`]; tests inject in-memory parts directly.
    pub fn new(
        users: Arc<dyn UserStore>,
        orgs: Arc<dyn OrganizationStore>,
        audit_store: Arc<dyn AuditStore>,
        verifier: Arc<dyn TokenVerifier>,
        directory: Arc<dyn OrganizationDirectory>,
        cache: ResponseCache,
    ) -> Self {
        let audit = AuditSink::new(audit_store);
        let guard = ClaimGuard::new(users.clone(), orgs.clone(), verifier, audit.clone());
        let resolver = Arc::new(EntitlementResolver::new(directory));

        Self {
            guard,
            resolver,
            cache,
            audit,
            users,
            orgs,
        }
    }
}

/// Build the production service graph from configuration.
///
/// Each absent backing service downgrades one concern so a bare checkout
/// still boots: in-memory stores, a fixed-tier directory, a disabled cache.
pub async fn build_services(config: &crate::config::ApiConfig) -> anyhow::Result<AppServices> {
    let (users, orgs, audit_store): (
        Arc<dyn UserStore>,
        Arc<dyn OrganizationStore>,
        Arc<dyn AuditStore>,
    ) = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new().connect(url).await?;
            info!("connected to postgres");
            (
                Arc::new(PgUserStore::new(pool.clone())),
                Arc::new(PgOrganizationStore::new(pool.clone())),
                Arc::new(PgAuditStore::new(pool)),
            )
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory stores (dev only)");
            (
                Arc::new(InMemoryUserStore::new()),
                Arc::new(InMemoryOrganizationStore::new()),
                Arc::new(InMemoryAuditStore::new()),
            )
        }
    };

    let directory: Arc<dyn OrganizationDirectory> = match &config.clerk_secret_key {
        Some(key) => Arc::new(ClerkDirectory::new(key.clone())),
        None => {
            warn!("CLERK_SECRET_KEY not set; all organizations resolve to the starter tier");
            Arc::new(StaticDirectory::new(None))
        }
    };

    let cache = match &config.redis_url {
        Some(url) => ResponseCache::connect(url),
        None => {
            warn!("REDIS_URL not set; response cache disabled");
            ResponseCache::disabled()
        }
    };

    let verifier: Arc<dyn TokenVerifier> =
        Arc::new(Hs256TokenVerifier::new(config.jwt_secret.as_bytes()));

    Ok(AppServices::new(
        users,
        orgs,
        audit_store,
        verifier,
        directory,
        cache,
    ))
}
