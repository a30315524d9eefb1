use sqlx::{migrate::Migrator, postgres::PgPoolOptions};

use crate::{
    conf::settings,
    pkg::internal::adaptors::postgres::GetTxn,
    prelude::{Error, Result},
};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn apply() -> Result<()> {
    if settings.uses_memory_store() {
        return Err(Error::Config(config::ConfigError::Message(
            "migrations need a postgres DATABASE_URL".into(),
        )));
    }
    let pool = PgPoolOptions::new()
        .connect(&settings.database_url)
        .await?;

    tracing::debug!("connected to db");
    let mut tx = pool.begin_txn().await?;
    MIGRATOR.run(&mut *tx).await?;
    tx.commit().await?;

    tracing::info!("migrations applied successfully");
    Ok(())
}
