//! MySQL destination: `TRUNCATE`, `LOAD DATA LOCAL INFILE`, then reconcile.
//!
//! The payload is streamed to the server through a per-connection local-infile
//! handler, so the server never reads our filesystem. The server must run with
//! `local_infile=ON`.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use mysql_async::prelude::*;
use mysql_async::{Conn, OptsBuilder};
use thiserror::Error;

use super::encoder::BulkPayload;
use super::store::DestinationStore;
use crate::config::DestinationConfig;

/// Errors from the MySQL destination.
#[derive(Debug, Error)]
pub enum MySqlStoreError {
    /// Driver or server error.
    #[error("MySQL error: {0}")]
    Mysql(#[from] mysql_async::Error),

    /// The payload file could not be read back.
    #[error("Payload read error: {0}")]
    Payload(#[from] std::io::Error),
}

/// One connection to the destination table.
pub struct MySqlStore {
    conn: Conn,
    table: String,
    date_column: String,
    invalid_date: String,
}

impl MySqlStore {
    /// Open a connection for one load request.
    pub async fn connect(config: &DestinationConfig) -> Result<Self, MySqlStoreError> {
        let opts = OptsBuilder::default()
            .ip_or_hostname(config.host.clone())
            .tcp_port(config.port)
            .user(config.user.clone())
            .pass(config.password.clone())
            .db_name(Some(config.database.clone()));

        let conn = Conn::new(opts).await?;

        Ok(Self {
            conn,
            table: qualified_table(&config.database, &config.table),
            date_column: quote_ident(&config.date_column),
            invalid_date: config.invalid_date.clone(),
        })
    }

    /// Close the connection.
    pub async fn close(self) -> Result<(), MySqlStoreError> {
        self.conn.disconnect().await?;
        Ok(())
    }
}

#[async_trait]
impl DestinationStore for MySqlStore {
    type Error = MySqlStoreError;

    async fn truncate(&mut self) -> Result<(), Self::Error> {
        self.conn
            .query_drop(format!("TRUNCATE TABLE {}", self.table))
            .await?;
        Ok(())
    }

    async fn bulk_load(&mut self, payload: &BulkPayload) -> Result<(), Self::Error> {
        let chunk = Bytes::from(tokio::fs::read(payload.path()).await?);

        self.conn.set_infile_handler(async move {
            let data: BoxStream<'static, std::io::Result<Bytes>> =
                stream::once(futures::future::ready(Ok(chunk))).boxed();
            Ok(data)
        });

        let path = payload.path().to_string_lossy();
        self.conn
            .query_drop(load_statement(&self.table, &path))
            .await?;
        Ok(())
    }

    async fn count_invalid_dates(&mut self) -> Result<u64, Self::Error> {
        let count = self
            .conn
            .exec_first::<u64, _, _>(
                format!(
                    "SELECT COUNT(*) FROM {} WHERE {} = ?",
                    self.table, self.date_column
                ),
                (self.invalid_date.clone(),),
            )
            .await?;
        Ok(count.unwrap_or(0))
    }

    async fn purge_invalid_dates(&mut self) -> Result<(), Self::Error> {
        self.conn
            .exec_drop(
                format!("DELETE FROM {} WHERE {} = ?", self.table, self.date_column),
                (self.invalid_date.clone(),),
            )
            .await?;
        Ok(())
    }

    async fn count_rows(&mut self) -> Result<u64, Self::Error> {
        let count = self
            .conn
            .query_first::<u64, _>(format!("SELECT COUNT(*) FROM {}", self.table))
            .await?;
        Ok(count.unwrap_or(0))
    }
}

/// Backtick-quote an identifier, doubling embedded backticks.
fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn qualified_table(database: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(database), quote_ident(table))
}

/// Single-quoted SQL string literal.
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn load_statement(table: &str, path: &str) -> String {
    format!(
        "LOAD DATA LOCAL INFILE {} INTO TABLE {} CHARACTER SET utf8mb4 \
         FIELDS TERMINATED BY ',' ENCLOSED BY '\"' ESCAPED BY '\"' \
         LINES TERMINATED BY '\\n'",
        quote_literal(path),
        table
    )
}
