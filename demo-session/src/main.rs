use std::env;
use std::sync::Arc;

use session_auth::{
    InMemorySessionStore, SessionConfig, SessionError, SessionManager, SessionStore,
    SessionValidationResult, store_from_env,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "demo_session=debug,session_auth=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // The users table belongs to the application; for SQL stores this id must already exist
    let user_id = env::var("DEMO_USER_ID").unwrap_or_else(|_| "demo-user".to_string());
    let config = SessionConfig::from_env();

    match env::var("GENERIC_DATA_STORE_TYPE").as_deref() {
        Ok("memory") | Err(_) => {
            let store = Arc::new(InMemorySessionStore::new());
            store.add_user(&user_id).await;
            walk_through(SessionManager::with_config(store, config), &user_id).await?;
        }
        Ok(_) => {
            let store = store_from_env()?;
            store.init().await?;
            walk_through(SessionManager::with_config(Arc::new(store), config), &user_id).await?;
        }
    }

    Ok(())
}

/// Log in, make an authenticated request, log out, and try again.
async fn walk_through<S: SessionStore>(
    manager: SessionManager<S>,
    user_id: &str,
) -> Result<(), SessionError> {
    let token = manager.generate_session_token()?;
    let session = manager.create_session(&token, user_id).await?;
    tracing::info!(
        session_id = %session.id,
        expires_at = %session.expires_at,
        "Logged in"
    );

    match manager.validate_session_token(&token).await? {
        SessionValidationResult::Found { session, user } => {
            let json = serde_json::to_string_pretty(&session).unwrap_or_default();
            tracing::info!(user_id = %user.id, "Authenticated request\n{}", json);
        }
        SessionValidationResult::Absent => {
            tracing::warn!("Freshly created session did not validate");
        }
    }

    manager.invalidate_session(&session.id).await?;
    tracing::info!(session_id = %session.id, "Logged out");

    let after_logout = manager.validate_session_token(&token).await?;
    tracing::info!(found = after_logout.is_found(), "Request after logout");

    Ok(())
}
