use crate::warehouse::base::error::WarehouseError;
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::{Client, Config, NoTls, config::SslMode, error::SqlState};
use tracing::{error, warn};

pub(crate) async fn connect_client(url: &str) -> Result<Client, WarehouseError> {
    let config = url
        .parse::<Config>()
        .map_err(|e| WarehouseError::InvalidConfig(e.to_string()))?;
    let ssl_mode = config.get_ssl_mode();

    match ssl_mode {
        SslMode::Disable => connect_without_tls(config).await,
        SslMode::Require => connect_with_tls(config).await,
        SslMode::Prefer => match connect_with_tls(config.clone()).await {
            Ok(client) => Ok(client),
            Err(error) => {
                warn!(%error, "Postgres TLS handshake failed, retrying without TLS");
                connect_without_tls(config).await
            }
        },
        _ => connect_with_tls(config).await,
    }
}

async fn connect_with_tls(config: Config) -> Result<Client, WarehouseError> {
    let connector = TlsConnector::builder()
        .build()
        .map_err(|e| WarehouseError::InvalidConfig(format!("TLS setup failed: {e}")))?;
    let tls = MakeTlsConnector::new(connector);
    let (client, connection) = config.connect(tls).await.map_err(classify_pg_error)?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!(%err, "Postgres connection error");
        }
    });
    Ok(client)
}

async fn connect_without_tls(config: Config) -> Result<Client, WarehouseError> {
    let (client, connection) = config.connect(NoTls).await.map_err(classify_pg_error)?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!(%err, "Postgres connection error");
        }
    });
    Ok(client)
}

/// A missing relation, column or schema means the destination has not
/// been created yet; every other failure is fatal to the run.
pub(crate) fn classify_pg_error(err: tokio_postgres::Error) -> WarehouseError {
    error_for_state(err.code(), err.to_string())
}

pub(crate) fn error_for_state(code: Option<&SqlState>, message: String) -> WarehouseError {
    match code {
        Some(code) if is_compilation_code(code) => WarehouseError::Compilation(message),
        _ => WarehouseError::Connectivity(message),
    }
}

fn is_compilation_code(code: &SqlState) -> bool {
    matches!(
        *code,
        SqlState::UNDEFINED_TABLE | SqlState::UNDEFINED_COLUMN | SqlState::INVALID_SCHEMA_NAME
    )
}
