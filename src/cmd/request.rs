use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;
use reqwest::Method;
use tokenwire::navigate::LogNavigator;
use tokenwire::{ApiResponse, RequestClient, RequestError};

use super::{ConfigArgs, RunCommand};

/// Send a GET request and print the response body.
#[derive(Args)]
pub struct GetArgs {
    /// Request path, relative to the configured server.
    pub path: String,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Send a DELETE request and print the response body.
#[derive(Args)]
pub struct DeleteArgs {
    /// Request path, relative to the configured server.
    pub path: String,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Send a request with a json body and print the response body.
#[derive(Args)]
pub struct BodyArgs {
    /// Request path, relative to the configured server.
    pub path: String,

    /// Json body to send, default is an empty object.
    pub body: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[async_trait]
impl RunCommand for GetArgs {
    async fn run(&self) -> Result<()> {
        let client = build_client(&self.config)?;
        let result = client.get(&self.path).await;
        show_result(result)
    }
}

#[async_trait]
impl RunCommand for DeleteArgs {
    async fn run(&self) -> Result<()> {
        let client = build_client(&self.config)?;
        let result = client.delete(&self.path).await;
        show_result(result)
    }
}

impl BodyArgs {
    pub async fn send(&self, method: Method) -> Result<()> {
        let body: serde_json::Value = match self.body {
            Some(ref body) => serde_json::from_str(body).context("parse request body json")?,
            None => serde_json::Value::Object(serde_json::Map::new()),
        };

        let client = build_client(&self.config)?;
        let result = client.request(method, &self.path, Some(&body)).await;
        show_result(result)
    }
}

fn build_client(config: &ConfigArgs) -> Result<RequestClient> {
    let factory = config.setup()?;
    factory.build_client(Arc::new(LogNavigator))
}

fn show_result(result: Result<ApiResponse, RequestError>) -> Result<()> {
    match result {
        Ok(resp) => {
            show_body(&resp);
            Ok(())
        }
        Err(err) => {
            if let Some(resp) = err.response() {
                show_body(resp);
            }
            Err(err.into())
        }
    }
}

fn show_body(resp: &ApiResponse) {
    if resp.body.is_empty() {
        return;
    }
    match serde_json::from_str::<serde_json::Value>(&resp.body) {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(pretty) => println!("{pretty}"),
            Err(_) => println!("{}", resp.body),
        },
        Err(_) => println!("{}", resp.body),
    }
}
