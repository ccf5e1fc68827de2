//! User table access over a single connection
//!
//! Handles user CRUD with these patterns:
//! - create: INSERT ... RETURNING for the generated identifier
//! - list: one SELECT ordered by identifier
//! - update/delete: zero affected rows rolls back and reports not found

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection, Postgres};
use sqlx::{Connection, Transaction};
use tracing::{debug, error, warn};

use crate::db::connection;
use crate::error::{StoreError, StoreResult};
use crate::model::{NewUser, User, UserId, UserUpdate};
use crate::store::UserStore;

pub const USER_TABLE: &str = "Usuario";
pub const USER_KEY: &str = "idUsuario";

const INSERT_USER: &str = r#"
    INSERT INTO Usuario (nome, email, senha, cpf, cidade, uf)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING idUsuario
"#;

const SELECT_USERS: &str = r#"
    SELECT idUsuario AS id, nome AS name, email, senha AS password,
           cpf AS national_id, cidade AS city, uf AS region
    FROM Usuario
    ORDER BY idUsuario
"#;

const SELECT_USER: &str = r#"
    SELECT idUsuario AS id, nome AS name, email, senha AS password,
           cpf AS national_id, cidade AS city, uf AS region
    FROM Usuario
    WHERE idUsuario = $1
"#;

const UPDATE_USER: &str = r#"
    UPDATE Usuario
    SET nome = $1, email = $2, senha = $3, cpf = $4, cidade = $5, uf = $6
    WHERE idUsuario = $7
"#;

const DELETE_USER: &str = "DELETE FROM Usuario WHERE idUsuario = $1";

/// User store holding the session's only database connection
pub struct PgUserStore {
    conn: Option<PgConnection>,
}

impl PgUserStore {
    /// Connect and take ownership of the connection.
    pub async fn connect(options: &PgConnectOptions) -> StoreResult<Self> {
        let conn = connection::connect(options).await?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: PgConnection) -> Self {
        Self { conn: Some(conn) }
    }

    fn conn(&mut self) -> StoreResult<&mut PgConnection> {
        self.conn.as_mut().ok_or(StoreError::Closed)
    }

    /// Check whether `table` has a row whose `key_column` equals `key`.
    ///
    /// Both names are `'static` so only compiled-in identifiers reach the
    /// statement text. Any failure is logged and reported as "absent".
    pub async fn record_exists(
        &mut self,
        table: &'static str,
        key_column: &'static str,
        key: UserId,
    ) -> bool {
        let conn = match self.conn() {
            Ok(conn) => conn,
            Err(err) => {
                error!(table, key, "existence check failed: {err}");
                return false;
            }
        };

        let sql = format!("SELECT 1 FROM {table} WHERE {key_column} = $1");
        match sqlx::query(&sql).bind(key).fetch_optional(&mut *conn).await {
            Ok(row) => row.is_some(),
            Err(err) => {
                error!(table, key, "existence check failed: {err}");
                false
            }
        }
    }
}

/// Commit when the statement succeeded, roll back otherwise.
async fn finish<T>(
    tx: Transaction<'_, Postgres>,
    outcome: StoreResult<T>,
) -> StoreResult<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!("rollback failed: {rollback_err}");
            }
            Err(err)
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn exists(&mut self, id: UserId) -> bool {
        self.record_exists(USER_TABLE, USER_KEY, id).await
    }

    async fn create(&mut self, user: &NewUser) -> StoreResult<UserId> {
        let mut tx = self.conn()?.begin().await?;

        let outcome = sqlx::query_scalar::<_, UserId>(INSERT_USER)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(&user.national_id)
            .bind(&user.city)
            .bind(&user.region)
            .fetch_one(&mut *tx)
            .await
            .map_err(StoreError::from);

        let id = finish(tx, outcome).await?;
        debug!(id, "user inserted");
        Ok(id)
    }

    async fn list(&mut self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(SELECT_USERS)
            .fetch_all(self.conn()?)
            .await?;
        Ok(users)
    }

    async fn get(&mut self, id: UserId) -> StoreResult<User> {
        sqlx::query_as::<_, User>(SELECT_USER)
            .bind(id)
            .fetch_optional(self.conn()?)
            .await?
            .ok_or_else(|| StoreError::not_found(id))
    }

    async fn update(&mut self, update: &UserUpdate) -> StoreResult<()> {
        let mut tx = self.conn()?.begin().await?;

        let outcome = sqlx::query(UPDATE_USER)
            .bind(&update.name)
            .bind(&update.email)
            .bind(&update.password)
            .bind(&update.national_id)
            .bind(&update.city)
            .bind(&update.region)
            .bind(update.id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from)
            .and_then(|done| match done.rows_affected() {
                0 => Err(StoreError::not_found(update.id)),
                _ => Ok(()),
            });

        finish(tx, outcome).await?;
        debug!(id = update.id, "user updated");
        Ok(())
    }

    async fn delete(&mut self, id: UserId) -> StoreResult<()> {
        let mut tx = self.conn()?.begin().await?;

        let outcome = sqlx::query(DELETE_USER)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from)
            .and_then(|done| match done.rows_affected() {
                0 => Err(StoreError::not_found(id)),
                _ => Ok(()),
            });

        finish(tx, outcome).await?;
        debug!(id, "user deleted");
        Ok(())
    }

    async fn close(&mut self) -> StoreResult<()> {
        match self.conn.take() {
            Some(conn) => {
                conn.close().await?;
                debug!("database connection closed");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Integration tests - run against a database that has the Usuario table:
    // DATABASE_URL=postgres://... cargo test -p busway-core -- --ignored

    async fn store() -> PgUserStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let options: PgConnectOptions = url.parse().expect("valid DATABASE_URL");
        PgUserStore::connect(&options).await.expect("connection failed")
    }

    fn ana() -> NewUser {
        NewUser::new("Ana", "ana@x.com", "p1", "111", "Recife", "PE").unwrap()
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_list_update_delete() {
        let mut store = store().await;
        let before = store.list().await.unwrap().len();

        let id = store.create(&ana()).await.unwrap();
        assert!(store.exists(id).await);

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), before + 1);
        assert_eq!(listed.iter().find(|u| u.id == id), Some(&ana().into_user(id)));

        let current = store.get(id).await.unwrap();
        let update = UserUpdate::from_current(&current).city("Olinda");
        store.update(&update).await.unwrap();
        assert_eq!(store.get(id).await.unwrap().city, "Olinda");

        store.delete(id).await.unwrap();
        assert!(!store.exists(id).await);
        assert_eq!(store.list().await.unwrap().len(), before);

        store.close().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn missing_rows_are_not_found() {
        let mut store = store().await;

        assert!(!store.exists(-1).await);
        assert!(matches!(store.get(-1).await, Err(StoreError::NotFound { id: -1 })));
        assert!(matches!(store.delete(-1).await, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn lookup_on_unknown_table_reports_absent() {
        let mut store = store().await;

        assert!(!store.record_exists("no_such_table", "id", 1).await);
        // The failed statement must not poison the connection.
        assert!(store.list().await.is_ok());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn close_is_idempotent() {
        let mut store = store().await;

        store.close().await.unwrap();
        store.close().await.unwrap();
        assert!(matches!(store.list().await, Err(StoreError::Closed)));
        assert!(!store.exists(1).await);
    }
}
