use anyhow::{bail, Result};
use async_trait::async_trait;
use clap::{Args, Subcommand};
use log::info;
use tokenwire::{CredentialStore, TOKEN_KEY};

use super::{ConfigArgs, RunCommand};

/// Manage the stored token.
#[derive(Args)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub action: TokenAction,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Subcommand)]
pub enum TokenAction {
    /// Print the stored token.
    Show,

    /// Save a token, e.g. one issued by a login done elsewhere.
    Set { token: String },

    /// Remove the stored token.
    Clear,
}

#[async_trait]
impl RunCommand for TokenArgs {
    async fn run(&self) -> Result<()> {
        let factory = self.config.setup()?;
        let store = factory.build_store();

        match self.action {
            TokenAction::Show => match store.get(TOKEN_KEY)? {
                Some(token) => println!("{token}"),
                None => bail!("no token stored"),
            },
            TokenAction::Set { ref token } => {
                if token.is_empty() {
                    bail!("token cannot be empty");
                }
                store.set(TOKEN_KEY, token)?;
                info!("Token saved to '{}'", store.path().display());
            }
            TokenAction::Clear => {
                store.remove(TOKEN_KEY)?;
                info!("Token removed from '{}'", store.path().display());
            }
        }
        Ok(())
    }
}
