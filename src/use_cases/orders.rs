use std::sync::Arc;

use crate::domain::{ClientError, Failure, Order, PersistedOrder, PosBackend, StatusSink};
use crate::use_cases::auth::AuthClient;

/// Submits orders on behalf of the authenticated user.
///
/// Each submission is attempted exactly once; retry policy belongs to the caller.
pub struct OrderClient {
    auth: Arc<AuthClient>,
    backend: Arc<dyn PosBackend>,
    status: Arc<dyn StatusSink>,
}

impl OrderClient {
    pub fn new(
        auth: Arc<AuthClient>,
        backend: Arc<dyn PosBackend>,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            auth,
            backend,
            status,
        }
    }

    #[tracing::instrument(
        name = "submit_order",
        skip_all,
        fields(items = order.items.len(), total = %order.total)
    )]
    pub async fn submit(&self, order: &Order) -> Result<PersistedOrder, ClientError> {
        // No token means no order request at all.
        let token = self.auth.ensure_authenticated().await.inspect_err(|err| {
            self.status
                .record(&format!("Cannot submit order: {err}"), false);
        })?;

        tracing::debug!("submitting order.");
        let reply = self
            .backend
            .create_order(token.value(), order)
            .await
            .map_err(|err| ClientError::OrderSubmission(Failure::transport(&err)))
            .inspect_err(|err| self.record_failure(err))?;

        if !reply.is_success() {
            let err = ClientError::OrderSubmission(Failure::status(reply.status, reply.body));
            self.record_failure(&err);
            return Err(err);
        }

        let persisted = serde_json::from_str::<PersistedOrder>(&reply.body)
            .map_err(|err| {
                ClientError::OrderSubmission(Failure::status(
                    reply.status,
                    format!("malformed order response: {err}"),
                ))
            })
            .inspect_err(|err| self.record_failure(err))?;

        self.status.record(
            &format!(
                "Order submitted successfully. Order ID: {}, total: {}, status: {}",
                persisted.id, persisted.total, persisted.status
            ),
            true,
        );
        Ok(persisted)
    }

    fn record_failure(&self, err: &ClientError) {
        self.status
            .record(&format!("Error submitting order: {err}"), false);
    }
}
