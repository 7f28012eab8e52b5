//! Replays queued mutations against the backend's collection routes.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Method;
use std::sync::Arc;

use mesfactures_core::auth::AuthSession;
use mesfactures_core::errors::{Error, Result};
use mesfactures_core::sync::{SyncOperation, SyncQueueItem, SyncTransmitter};

use crate::client::ApiClient;
use crate::error::ConnectError;

/// HTTP method and path for a queued mutation.
///
/// `create` posts to the collection, `update` and `delete` address the entity
/// by the id carried in the payload.
pub fn route_for(item: &SyncQueueItem) -> Result<(Method, String)> {
    let collection = item.collection.as_str();
    match item.operation {
        SyncOperation::Create => Ok((Method::POST, collection.to_string())),
        SyncOperation::Update | SyncOperation::Delete => {
            let id = item.entity_id().ok_or_else(|| {
                Error::transmit(format!(
                    "{} on {} carries no entity id",
                    item.operation, collection
                ))
            })?;
            let method = if item.operation == SyncOperation::Update {
                Method::PUT
            } else {
                Method::DELETE
            };
            Ok((method, format!("{}/{}", collection, id)))
        }
    }
}

/// [`SyncTransmitter`] over HTTP with a bearer token.
///
/// The token is read from the session on every transmit so a login made
/// after startup is picked up; `fallback_token` covers headless setups.
pub struct HttpTransmitter {
    api: ApiClient,
    session: Option<Arc<AuthSession>>,
    fallback_token: Option<String>,
}

impl HttpTransmitter {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            session: None,
            fallback_token: None,
        }
    }

    pub fn with_session(mut self, session: Arc<AuthSession>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.fallback_token = token;
        self
    }

    async fn token(&self) -> Option<String> {
        if let Some(session) = &self.session {
            match session.token().await {
                Ok(Some(token)) => return Some(token),
                Ok(None) => {}
                Err(e) => warn!("Could not read session token: {}", e),
            }
        }
        self.fallback_token.clone()
    }
}

#[async_trait]
impl SyncTransmitter for HttpTransmitter {
    async fn transmit(&self, item: &SyncQueueItem) -> Result<()> {
        let (method, path) = route_for(item)?;
        let token = self.token().await;
        debug!("Transmitting {} {} (item {})", method, path, item.id);

        let mut request = self
            .api
            .request(method.clone(), &path, token.as_deref())
            .map_err(Error::from)?;
        if method != Method::DELETE {
            request = request.json(&item.payload);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::from(ConnectError::from(e)))?;
        ApiClient::check_status(response).await.map_err(Error::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesfactures_core::store::Collection;
    use serde_json::json;

    #[test]
    fn routes_follow_the_operation() {
        let item =
            |collection, operation| SyncQueueItem::new(collection, operation, json!({"id": 9}));
        let create = item(Collection::Expenses, SyncOperation::Create);
        let update = item(Collection::Goals, SyncOperation::Update);
        let delete = item(Collection::Revenues, SyncOperation::Delete);

        assert_eq!(route_for(&create).unwrap(), (Method::POST, "expenses".to_string()));
        assert_eq!(route_for(&update).unwrap(), (Method::PUT, "goals/9".to_string()));
        assert_eq!(route_for(&delete).unwrap(), (Method::DELETE, "revenues/9".to_string()));
    }

    #[test]
    fn update_without_id_cannot_be_routed() {
        let item = SyncQueueItem::new(Collection::Loans, SyncOperation::Update, json!({}));
        assert!(matches!(route_for(&item), Err(Error::TransmitFailure(_))));
    }
}
