//! Scenario harness pairing a Tokio runtime with a Wiremock Blogify API.

use std::future::Future;
use std::rc::Rc;

use blogify::{FeedError, HttpGateway};
use rstest_bdd::Slot;
use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer};

use super::api::gateway_for;

/// Mock API server and the runtime driving it, shared by the steps of one
/// scenario.
#[derive(Clone)]
pub struct MockApi {
    server: Rc<MockServer>,
    runtime: Rc<Runtime>,
}

impl MockApi {
    /// Starts a runtime and a mock server on it.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Configuration`] when the runtime cannot be built.
    pub fn start() -> Result<Self, FeedError> {
        let runtime = Runtime::new().map_err(|error| FeedError::Configuration {
            message: format!("failed to create Tokio runtime: {error}"),
        })?;
        let server = runtime.block_on(MockServer::start());
        Ok(Self {
            server: Rc::new(server),
            runtime: Rc::new(runtime),
        })
    }

    /// Drives `future` to completion on the scenario runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Registers `mock` with the server.
    pub fn mount(&self, mock: Mock) {
        self.block_on(mock.mount(&self.server));
    }

    /// Builds a gateway pointed at the server's `/api` prefix.
    ///
    /// # Errors
    ///
    /// Returns an error when the gateway cannot be built.
    pub fn gateway(&self) -> Result<HttpGateway, FeedError> {
        gateway_for(&self.server)
    }
}

/// Returns the scenario's mock API, starting it on first use.
///
/// # Errors
///
/// Returns an error when the runtime cannot be built.
pub fn ensure_mock_api(slot: &Slot<MockApi>) -> Result<MockApi, FeedError> {
    if let Some(api) = slot.get() {
        return Ok(api);
    }
    let api = MockApi::start()?;
    slot.set(api.clone());
    Ok(api)
}
