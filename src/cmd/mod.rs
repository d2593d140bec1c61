mod request;
mod token;

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use tokenwire::client::factory::ClientFactory;
use tokenwire::config::PathSet;
use tokenwire::logs;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// The config directory, default is `~/.config/tokenwire`.
    #[arg(short, long)]
    pub config_path: Option<PathBuf>,

    /// The data directory, holds the credential store. Default is
    /// `~/.local/share/tokenwire`.
    #[arg(short, long)]
    pub data_path: Option<PathBuf>,

    /// Print debug logs, overrides `log_level` in config.
    #[arg(long)]
    pub debug: bool,
}

impl ConfigArgs {
    pub fn build_path_set(&self) -> Result<PathSet> {
        PathSet::new(self.config_path.clone(), self.data_path.clone())
    }

    /// Load the client config and start logging with its level.
    pub fn setup(&self) -> Result<ClientFactory> {
        let ps = self.build_path_set()?;
        let factory = ClientFactory::load(&ps)?;

        let level = if self.debug {
            "debug"
        } else {
            factory.config().log_level.as_str()
        };
        logs::init(level)?;

        Ok(factory)
    }
}

#[async_trait]
pub trait RunCommand {
    async fn run(&self) -> Result<()>;
}

/// Send requests to the server with the stored token attached.
#[derive(Parser)]
#[command(author, about, version)]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Get(request::GetArgs),
    Delete(request::DeleteArgs),
    Post(request::BodyArgs),
    Put(request::BodyArgs),
    Patch(request::BodyArgs),
    Token(token::TokenArgs),
}

#[async_trait]
impl RunCommand for App {
    async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Get(args) => args.run().await,
            Commands::Delete(args) => args.run().await,
            Commands::Post(args) => args.send(reqwest::Method::POST).await,
            Commands::Put(args) => args.send(reqwest::Method::PUT).await,
            Commands::Patch(args) => args.send(reqwest::Method::PATCH).await,
            Commands::Token(args) => args.run().await,
        }
    }
}
