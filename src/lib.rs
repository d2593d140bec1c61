pub mod client;
pub mod config;
pub mod effect;
pub mod error;
pub mod logs;
pub mod navigate;
pub mod response;
pub mod store;

mod filelock;

pub use client::{RequestClient, RequestClientBuilder, TOKEN_HEADER};
pub use effect::Effect;
pub use error::RequestError;
pub use navigate::{Navigator, Route};
pub use response::{ApiResponse, Payload};
pub use store::{CredentialStore, TOKEN_KEY};
