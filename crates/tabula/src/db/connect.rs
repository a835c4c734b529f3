use tabula_core::{
    driver::{ConnectArgs, Connection, Dialect},
    Result,
};

/// Opens a connection with the driver matching the URL scheme.
pub(super) async fn connect(url: &str) -> Result<Box<dyn Connection>> {
    let args = ConnectArgs::parse(url)?;

    match args.dialect {
        Dialect::Mysql => connect_mysql(url).await,
        Dialect::Postgresql => connect_postgresql(url).await,
    }
}

#[cfg(feature = "mysql")]
async fn connect_mysql(url: &str) -> Result<Box<dyn Connection>> {
    use tabula_core::Driver;

    tabula_driver_mysql::MySQL::new(url)?.connect().await
}

#[cfg(not(feature = "mysql"))]
async fn connect_mysql(_url: &str) -> Result<Box<dyn Connection>> {
    tabula_core::bail!("`mysql` feature not enabled")
}

#[cfg(feature = "postgresql")]
async fn connect_postgresql(url: &str) -> Result<Box<dyn Connection>> {
    use tabula_core::Driver;

    tabula_driver_postgresql::PostgreSQL::new(url)?.connect().await
}

#[cfg(not(feature = "postgresql"))]
async fn connect_postgresql(_url: &str) -> Result<Box<dyn Connection>> {
    tabula_core::bail!("`postgresql` feature not enabled")
}
