use super::{connect, Db};
use crate::{ModelDef, Registry};

use tabula_core::{driver::Connection, Driver, Result};

use std::sync::Arc;

#[derive(Debug, Default)]
pub struct Builder {
    registry: Registry,
}

impl Builder {
    /// Registers the model for `table`. The closure declares its fields and
    /// relations on the empty definition it receives.
    pub fn register<F>(&mut self, table: &str, model: F) -> &mut Self
    where
        F: Fn(ModelDef) -> ModelDef + Send + Sync + 'static,
    {
        self.registry.register(table, model);
        self
    }

    /// Connects through the driver picked by the URL scheme (`mysql://`,
    /// `postgresql://`, `pgsql://`).
    pub async fn connect(&mut self, url: &str) -> Result<Db> {
        let conn = connect::connect(url).await?;
        Ok(self.build_boxed(conn))
    }

    pub async fn build_with_driver(&mut self, driver: impl Driver) -> Result<Db> {
        let conn = driver.connect().await?;
        Ok(self.build_boxed(conn))
    }

    pub fn build(&mut self, conn: impl Connection) -> Db {
        self.build_boxed(Box::new(conn))
    }

    pub fn build_boxed(&mut self, conn: Box<dyn Connection>) -> Db {
        Db {
            registry: Arc::new(std::mem::take(&mut self.registry)),
            conn,
        }
    }
}
