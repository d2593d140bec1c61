use std::sync::Arc;

use anyhow::Result;

use crate::config::{ClientConfig, CommonConfig, PathSet};
use crate::navigate::Navigator;
use crate::store::FileStore;

use super::RequestClient;

pub struct ClientFactory {
    cfg: ClientConfig,
}

impl ClientFactory {
    pub fn new(cfg: ClientConfig) -> Self {
        Self { cfg }
    }

    pub fn load(ps: &PathSet) -> Result<Self> {
        let cfg = ps.load_config("client", ClientConfig::default)?;
        Ok(Self { cfg })
    }

    pub fn build_store(&self) -> FileStore {
        FileStore::new(&self.cfg.store_path)
    }

    pub fn build_client(&self, navigator: Arc<dyn Navigator>) -> Result<RequestClient> {
        let store = Arc::new(self.build_store());
        RequestClient::builder(&self.cfg.server, store, navigator)
            .timeout(self.cfg.timeout())
            .login_path(self.cfg.login_path.as_str())
            .login_return(self.cfg.login_return)
            .build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigate::LogNavigator;
    use crate::store::{CredentialStore, TOKEN_KEY};

    #[test]
    fn test_build_client() {
        let dir = tempfile::tempdir().unwrap();
        let ps = PathSet::new(
            Some(dir.path().join("config")),
            Some(dir.path().join("data")),
        )
        .unwrap();

        let factory = ClientFactory::load(&ps).unwrap();
        let client = factory.build_client(Arc::new(LogNavigator)).unwrap();
        assert_eq!(client.url(), "http://127.0.0.1:8080");

        // The client and a fresh store handle share the same file.
        client.store().set(TOKEN_KEY, "abc").unwrap();
        let store = factory.build_store();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        assert_eq!(store.path(), ps.data_path.join("store.json"));
    }
}
