pub mod auth;
pub mod events;
pub mod products;
pub mod ratings;
pub mod users;

#[cfg(test)]
pub(crate) mod test_db {
    use sqlx::postgres::PgPoolOptions;
    use sqlx::PgPool;

    /// Migrated pool against DATABASE_URL. Returns None when the variable is
    /// unset so database tests skip on machines without Postgres.
    pub async fn pool() -> Option<PgPool> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("DATABASE_URL is set but unreachable");
        sqlx::migrate!("./src/db/migrations")
            .run(&pool)
            .await
            .expect("migrations failed");
        Some(pool)
    }
}
