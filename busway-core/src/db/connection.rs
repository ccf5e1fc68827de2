//! Opening the session connection

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;

/// Open a single PostgreSQL connection.
///
/// # Errors
///
/// Returns an error if the server is unreachable or rejects the credentials.
/// Callers treat this as fatal; there is no retry.
pub async fn connect(options: &PgConnectOptions) -> Result<PgConnection, sqlx::Error> {
    PgConnection::connect_with(options).await
}

#[cfg(test)]
mod tests {
    use super::*;

    // Run with: DATABASE_URL=postgres://... cargo test -p busway-core -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn connection_answers_queries() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let options: PgConnectOptions = url.parse().expect("valid DATABASE_URL");
        let mut conn = connect(&options).await.expect("connection failed");

        let result: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&mut conn)
            .await
            .expect("query failed");
        assert_eq!(result.0, 1);

        conn.close().await.expect("close failed");
    }

    #[tokio::test]
    async fn unreachable_server_is_an_error() {
        let options = PgConnectOptions::new()
            .host("127.0.0.1")
            .port(1)
            .database("busway")
            .username("nobody");

        assert!(connect(&options).await.is_err());
    }
}
