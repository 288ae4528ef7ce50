use crate::{destination::DestinationClient, error::DbError, relay::client::RelayClient};
use async_trait::async_trait;
use model::core::value::Value;
use query_builder::{
    ast::{delete::Delete, insert::Insert},
    dialect::{Dialect, Postgres},
    renderer::{Render, Renderer},
};
use tracing::debug;

/// Destination store reached through the relay process. Statements are
/// rendered with bound placeholders and shipped as a `{query, params}`
/// payload so the relay binds the values server-side.
pub struct RelayDestination {
    client: RelayClient,
    server: String,
    dialect: Postgres,
}

impl RelayDestination {
    pub fn new(client: RelayClient, server: &str) -> Self {
        RelayDestination {
            client,
            server: server.to_string(),
            dialect: Postgres,
        }
    }

    async fn exec(&self, sql: String, params: Vec<Value>) -> Result<serde_json::Value, DbError> {
        debug!("Executing against '{}': {}", self.server, sql);

        let payload = serde_json::json!({
            "query": sql,
            "params": params.iter().map(Value::to_json).collect::<Vec<_>>(),
        });

        let reply = self.client.invoke(&self.server, "query", &payload).await?;
        Ok(reply)
    }
}

#[async_trait]
impl DestinationClient for RelayDestination {
    async fn delete_all(&self, table: &str) -> Result<(), DbError> {
        let ast = Delete::all_rows(table);
        let mut renderer = Renderer::new(&self.dialect);
        ast.render(&mut renderer);
        let (sql, params) = renderer.finish();

        self.exec(sql, params).await?;
        Ok(())
    }

    async fn write_batch(
        &self,
        table: &str,
        columns: &[String],
        rows: Vec<Vec<Value>>,
    ) -> Result<(), DbError> {
        if rows.is_empty() {
            return Ok(());
        }

        let ast = Insert::multi_row(table, columns, rows);
        let mut renderer = Renderer::new(&self.dialect);
        ast.render(&mut renderer);
        let (sql, params) = renderer.finish();

        self.exec(sql, params).await?;
        Ok(())
    }

    async fn row_count(&self, table: &str) -> Result<u64, DbError> {
        let sql = format!(
            "SELECT COUNT(*) AS count FROM {};",
            self.dialect.quote_identifier(table)
        );
        let reply = self.exec(sql, Vec::new()).await?;

        reply["results"][0]["count"]
            .as_u64()
            .or_else(|| reply["results"][0]["count"].as_f64().map(|n| n as u64))
            .ok_or_else(|| DbError::Decode("relay count reply has no count member".into()))
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.exec("SELECT 1;".to_string(), Vec::new()).await?;
        Ok(())
    }
}
