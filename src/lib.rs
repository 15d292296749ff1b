//! Connected-vehicle cloud client: a federated login chain, SigV4-signed vehicle reads, and
//! PIN step-up commands behind one authenticated surface.
//!
//! A [`Client`](client::Client) owns a single [`Session`](session::Session). Every public
//! operation first calls [`Client::ensure_fresh`](client::Client::ensure_fresh), which reruns the
//! identity-provider → JWT → token-vending → federated-credential chain whenever the stored
//! credential falls inside the freshness margin, then signs and sends the request.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod brand;
pub mod client;
pub mod command;
pub mod envelope;
pub mod error;
pub mod http;
pub mod obs;
pub mod request;
pub mod session;
pub mod signer;
pub mod store;

pub use client::Client;

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError, Request as ReqwestRequest};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use serde_json;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
