use sqlx::PgConnection;

/// Session setting read by the row-level security policies in `migrations/`.
pub const CURRENT_USER_SETTING: &str = "app.current_user_id";

/// Sets the current user for the database session.
/// This must be called on every connection before touching owned tables.
pub async fn set_current_user(conn: &mut PgConnection, user_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT set_config($1, $2, false)")
        .bind(CURRENT_USER_SETTING)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_name_matches_policies() {
        let migration = include_str!("../../migrations/0001_init.sql");
        assert!(migration.contains(CURRENT_USER_SETTING));
    }
}
