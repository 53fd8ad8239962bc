//! Gmail REST client and lazy message stream.

use std::collections::VecDeque;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::NormalizedEmail;
use crate::payload::{self, MessageList, MessageStub};
use crate::query::SearchQuery;

const API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

/// Gmail REST API client for a single authenticated user.
///
/// Holds a bearer token for its whole lifetime. When the token expires,
/// calls start failing with [`Error::AuthExpired`] and the caller builds a
/// new client with a fresh token.
#[derive(Debug, Clone)]
pub struct GmailClient {
    http: Client,
    access_token: String,
}

impl GmailClient {
    /// Creates a client from a bearer access token.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            access_token: access_token.into(),
        }
    }

    /// Searches the mailbox and returns a lazy stream over the matches.
    ///
    /// Only the id list is retrieved here (a single page, bounded by
    /// `max_results`); message content is fetched as the stream is pulled.
    ///
    /// # Errors
    ///
    /// Returns an error if the search call fails or the token is rejected.
    pub async fn search(&self, query: &SearchQuery, max_results: u32) -> Result<MessageStream> {
        let response = self
            .http
            .get(format!("{API_BASE}/messages"))
            .bearer_auth(&self.access_token)
            .query(&[("q", query.build()), ("maxResults", max_results.to_string())])
            .send()
            .await?;
        map_status(response.status(), "message search")?;

        let list: MessageList = response.json().await?;
        debug!(matches = list.messages.len(), "mailbox search complete");

        Ok(MessageStream {
            client: self.clone(),
            pending: list.messages.into(),
        })
    }

    async fn fetch_detail(&self, id: &str) -> Result<payload::MessageDetail> {
        let response = self
            .http
            .get(format!("{API_BASE}/messages/{id}"))
            .bearer_auth(&self.access_token)
            .query(&[("format", "full")])
            .send()
            .await?;
        map_status(response.status(), "message fetch")?;

        Ok(response.json().await?)
    }
}

fn map_status(status: StatusCode, context: &'static str) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::UNAUTHORIZED {
        Err(Error::AuthExpired)
    } else {
        Err(Error::Status {
            status: status.as_u16(),
            context,
        })
    }
}

/// Lazy, finite stream over one search's results.
///
/// Messages are fetched one at a time as the consumer pulls, so dropping
/// the stream early stops further provider calls. Restart is a new
/// [`GmailClient::search`] with the same query.
pub struct MessageStream {
    client: GmailClient,
    pending: VecDeque<MessageStub>,
}

impl MessageStream {
    /// Number of matches not yet fetched.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Fetches and normalizes the next message, or `None` when the result
    /// set is exhausted.
    ///
    /// A message whose body cannot be decoded is skipped with a warning and
    /// the stream moves on. A failed fetch call is yielded as an error; the
    /// remainder of the result set is unreachable at that point.
    pub async fn next(&mut self) -> Option<Result<NormalizedEmail>> {
        while let Some(stub) = self.pending.pop_front() {
            match self.client.fetch_detail(&stub.id).await {
                Ok(detail) => match payload::normalize(detail) {
                    Ok(email) => return Some(Ok(email)),
                    Err(err) => {
                        warn!(provider_id = %stub.id, error = %err, "skipping undecodable message");
                    }
                },
                Err(err) => return Some(Err(err)),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_maps_to_auth_expired() {
        assert!(matches!(
            map_status(StatusCode::UNAUTHORIZED, "message search"),
            Err(Error::AuthExpired)
        ));
    }

    #[test]
    fn test_other_failures_keep_status_and_context() {
        match map_status(StatusCode::INTERNAL_SERVER_ERROR, "message fetch") {
            Err(Error::Status { status, context }) => {
                assert_eq!(status, 500);
                assert_eq!(context, "message fetch");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_success_statuses_pass() {
        assert!(map_status(StatusCode::OK, "message search").is_ok());
        assert!(map_status(StatusCode::NO_CONTENT, "message fetch").is_ok());
    }
}
