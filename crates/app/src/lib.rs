//! Chatrelay application composition root
//!
//! Builds the identity verifier, completion service and store from
//! configuration, then composes the domain router with the infrastructure
//! routes and CORS.

use std::sync::Arc;

use axum::{http::HeaderValue, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use chatrelay_auth::{AuthBackend, AuthConfig, Identity, IdentityVerifier, JwtVerifier, StaticVerifier};
use chatrelay_common::Config;
use chatrelay_conversations::{ConversationService, ConversationsState, StoreConfig, StoreFactory};
use chatrelay_llm::{LlmConfig, LlmServiceFactory};

/// Create the main application router with all routes and middleware
pub async fn create_app(config: &Config) -> Result<Router, anyhow::Error> {
    let verifier = build_verifier(config)?;

    let mut llm_config = LlmConfig::new(
        config.llm_provider.clone(),
        config.openai_api_key.clone().unwrap_or_default(),
    );
    llm_config.base_url = config.openai_base_url.clone();
    let llm = LlmServiceFactory::create(llm_config)?;

    let store_config = StoreConfig {
        provider: config.store_provider.clone(),
        supabase_url: config.supabase_url.clone(),
        supabase_key: config.supabase_key.clone(),
        database_url: config.database_url.clone(),
        run_migrations: config.run_migrations,
    };
    let repos = StoreFactory::create(&store_config).await?;

    let state = ConversationsState::new(
        ConversationService::new(repos, Arc::from(llm)),
        AuthBackend::new(verifier),
    );

    Ok(build_router(state, config.cors_allowed_origins.as_deref()))
}

/// Compose domain routes with shared infrastructure routes
pub fn build_router(state: ConversationsState, cors_allowed_origins: Option<&str>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(chatrelay_conversations::routes().with_state(state))
        .layer(cors_layer(cors_allowed_origins))
}

/// Select the identity verifier named by `AUTH_PROVIDER`
pub fn build_verifier(config: &Config) -> Result<Arc<dyn IdentityVerifier>, anyhow::Error> {
    match config.auth_provider.as_str() {
        "jwt" => {
            let jwt_secret = config
                .jwt_secret
                .clone()
                .ok_or_else(|| anyhow::anyhow!("JWT_SECRET is required for the jwt auth provider"))?;

            Ok(Arc::new(JwtVerifier::new(AuthConfig {
                jwt_secret,
                issuer: config.jwt_issuer.clone(),
                audience: config.jwt_audience.clone(),
            })))
        }
        "static" => {
            let (Some(uid), Some(email)) = (&config.dev_user_id, &config.dev_user_email) else {
                anyhow::bail!("DEV_USER_ID and DEV_USER_EMAIL are required for the static auth provider");
            };

            let mut identity = Identity::new(uid.clone(), email.clone());
            if let Some(name) = &config.dev_user_name {
                identity = identity.with_name(name.clone());
            }

            tracing::warn!(uid = %uid, "Static auth provider enabled; every bearer token resolves to one identity");
            Ok(Arc::new(StaticVerifier::new(identity)))
        }
        provider => anyhow::bail!("Unknown auth provider: {provider}. Supported providers: jwt, static"),
    }
}

/// CORS from a comma-separated origin list; unset or unparseable allows any origin
pub fn cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new().allow_headers(Any).allow_methods(Any);
    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Chatrelay API is running!" }))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
