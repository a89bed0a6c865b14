//! Bearer-token attachment and 401 interception.

use std::sync::Arc;

use crate::core::client::auth::TokenRefresher;
use crate::core::dispatch::Dispatcher;
use crate::core::error::{ErrorRecord, Failure, classify};
use crate::core::request::RequestDescriptor;
use crate::core::token::TokenStore;

pub(crate) struct AuthInterceptor {
    dispatcher: Dispatcher,
    refresher: TokenRefresher,
    store: Arc<dyn TokenStore>,
    refresh_path: String,
}

impl AuthInterceptor {
    pub(crate) fn new(
        dispatcher: Dispatcher,
        refresher: TokenRefresher,
        store: Arc<dyn TokenStore>,
        refresh_path: String,
    ) -> Self {
        Self {
            dispatcher,
            refresher,
            store,
            refresh_path,
        }
    }

    /// Run one logical request: attach the current token, dispatch, and on a
    /// 401 renew the token once and resubmit.
    ///
    /// Terminal 401 cases all invalidate the stored credentials and surface
    /// as [`crate::ErrorKind::Auth`]: a 401 from the refresh endpoint itself,
    /// a second 401 after the one permitted resubmit, or a failed renewal.
    pub(crate) async fn execute(&self, mut desc: RequestDescriptor) -> Result<String, ErrorRecord> {
        loop {
            match self.store.get() {
                Some(token) => desc.set_authorization(&token),
                None => desc.clear_authorization(),
            }

            let failure = match self.dispatcher.execute(&desc).await {
                Ok(body) => return Ok(body),
                Err(f) => f,
            };

            let Failure::Status { status: 401, .. } = &failure else {
                return Err(classify(&failure));
            };

            if desc.path == self.refresh_path {
                // Never refresh the refresh call.
                self.store.clear();
                return Err(ErrorRecord::auth(Some(401)));
            }
            if desc.retried_auth {
                // Loop breaker: one renewal per original request.
                self.store.clear();
                return Err(ErrorRecord::auth(Some(401)));
            }

            if self.refresher.refresh().await.is_err() {
                // The refresher already cleared the stored token.
                return Err(ErrorRecord::auth(Some(401)));
            }
            desc.retried_auth = true;
        }
    }
}
