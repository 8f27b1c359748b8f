use crate::config::Config;
use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use surrealdb::engine::remote::http::{Client, Http};
use surrealdb::opt::auth::Root;
use surrealdb::{Response, Surreal};
use tracing::{error, info};

/// Database service wrapping the SurrealDB HTTP client.
///
/// Record ids are UUID strings minted by the caller. Read queries project
/// `meta::id(id)` so documents deserialize with plain string ids.
#[derive(Clone)]
pub struct Database {
    client: Surreal<Client>,
    pub config: Config,
}

impl Database {
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Initializing database connection to {}", config.database_url);

        let client = Surreal::new::<Http>(config.database_url.as_str()).await?;

        client
            .signin(Root {
                username: &config.database_username,
                password: &config.database_password,
            })
            .await?;

        client
            .use_ns(&config.database_namespace)
            .use_db(&config.database_name)
            .await?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub async fn verify_connection(&self) -> Result<()> {
        match self.client.query("INFO FOR DB").await {
            Ok(_) => {
                info!("Database connection verified successfully");
                Ok(())
            }
            Err(e) => {
                error!("Failed to verify database connection: {}", e);
                Err(AppError::from(e))
            }
        }
    }

    /// Executes a parameterized query; fields of `params` become bindings.
    pub async fn query_with_params<P>(&self, sql: &str, params: P) -> Result<Response>
    where
        P: Serialize + 'static,
    {
        self.client
            .query(sql)
            .bind(params)
            .await
            .map_err(AppError::from)
    }

    /// Creates a record under `table:id`. The document's own `id` field is
    /// stripped from the content so the record id stays authoritative.
    pub async fn create<T>(&self, table: &str, id: &str, data: &T) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let mut content = serde_json::to_value(data)?;
        if let Some(object) = content.as_object_mut() {
            object.remove("id");
        }

        self.query_with_params(
            "CREATE type::thing($tb, $id) CONTENT $data",
            json!({ "tb": table, "id": id, "data": content }),
        )
        .await?;

        self.get_by_id(table, id)
            .await?
            .ok_or_else(|| AppError::internal("Failed to create record"))
    }

    pub async fn get_by_id<T>(&self, table: &str, id: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let mut response = self
            .query_with_params(
                "SELECT *, meta::id(id) AS id FROM type::thing($tb, $id)",
                json!({ "tb": table, "id": id }),
            )
            .await?;

        let records: Vec<T> = response.take(0)?;
        Ok(records.into_iter().next())
    }

    /// Merges `updates` into `table:id` and returns the updated document.
    pub async fn update_by_id_with_json<T>(
        &self,
        table: &str,
        id: &str,
        updates: serde_json::Value,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.query_with_params(
            "UPDATE type::thing($tb, $id) MERGE $updates",
            json!({ "tb": table, "id": id, "updates": updates }),
        )
        .await?;

        self.get_by_id(table, id).await
    }

    pub async fn delete_by_id(&self, table: &str, id: &str) -> Result<()> {
        self.query_with_params(
            "DELETE type::thing($tb, $id)",
            json!({ "tb": table, "id": id }),
        )
        .await?;
        Ok(())
    }

    /// Finds the first record where `field` equals `value`. The field name is
    /// interpolated and must come from code, never from request input.
    pub async fn find_one<T>(&self, table: &str, field: &str, value: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let sql = format!(
            "SELECT *, meta::id(id) AS id FROM type::table($tb) WHERE {} = $value LIMIT 1",
            field
        );

        let mut response = self
            .query_with_params(&sql, json!({ "tb": table, "value": value }))
            .await?;

        let records: Vec<T> = response.take(0)?;
        Ok(records.into_iter().next())
    }
}
