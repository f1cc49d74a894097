use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;

/// Creates or repairs the seed admin account at startup so a fresh
/// deployment is reachable without manual SQL.
pub(crate) async fn ensure_admin(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_admin_password.is_empty() {
        tracing::warn!("FIRST_ADMIN_PASSWORD not configured; skipping admin bootstrap");
        return Ok(());
    }

    let email = &admin.first_admin_email;
    let user = repositories::users::find_by_email(state.db(), email).await?;
    let now = primitive_now_utc();

    let Some(user) = user else {
        let hashed_password = security::hash_password(&admin.first_admin_password)?;
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO users (id, email, hashed_password, full_name, role, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&id)
        .bind(email)
        .bind(hashed_password)
        .bind("Administrator")
        .bind(UserRole::Admin)
        .bind(true)
        .bind(now)
        .bind(now)
        .execute(state.db())
        .await?;

        tracing::info!("Created bootstrap admin {email}");
        return Ok(());
    };

    let password_ok =
        security::verify_password(&admin.first_admin_password, &user.hashed_password)
            .unwrap_or(false);
    let needs_update = !password_ok || user.role != UserRole::Admin || !user.is_active;

    if !needs_update {
        tracing::info!("Bootstrap admin already up to date");
        return Ok(());
    }

    let hashed_password = if password_ok {
        user.hashed_password.clone()
    } else {
        security::hash_password(&admin.first_admin_password)?
    };

    sqlx::query(
        "UPDATE users
         SET hashed_password = $1, role = $2, is_active = TRUE, updated_at = $3
         WHERE id = $4",
    )
    .bind(hashed_password)
    .bind(UserRole::Admin)
    .bind(now)
    .bind(user.id)
    .execute(state.db())
    .await?;

    tracing::info!("Updated bootstrap admin {email}");
    Ok(())
}
