//! Outbound OAuth 2.0 request interceptor: attaches bearer tokens, caches them across
//! requests, and recovers from a rejected token by refreshing and retrying exactly once.
//!
//! The crate is built around two capabilities. An [`Authorizer`](authorizer::Authorizer)
//! produces tokens and a [`Transport`](transport::Transport) delivers requests.
//! [`RequestInterceptor`](interceptor::RequestInterceptor) wraps a transport, keeps a single
//! cached token behind an async lock, and is itself a transport so it can be stacked as a
//! pipeline stage.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod authorizer;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod obs;
pub mod transport;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};
	pub use oauth2::{
		HttpRequest, HttpResponse,
		http::{
			Error as HttpError, HeaderValue, StatusCode,
			header::{AUTHORIZATION, InvalidHeaderValue},
		},
	};
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use tokio_util::sync::CancellationToken;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use tokio_util::sync::CancellationToken;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};

pub use authorizer::{Authorizer, AuthorizerOptions, OAuth2Authorizer};
pub use interceptor::RequestInterceptor;
#[cfg(feature = "reqwest")] pub use interceptor::ReqwestInterceptor;
pub use transport::Transport;
