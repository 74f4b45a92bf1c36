// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Paginated activity retrieval with one refresh per rejected request.

use crate::error::{AuthError, FetchError};
use crate::models::RawActivity;
use crate::services::credentials::SharedCredentialStore;
use crate::services::strava::{ActivityQuery, StravaClient, TokenRefresher};
use chrono::{DateTime, Utc};

/// Strava caps `per_page` at 200.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Fetches every activity in a time window, page by page.
#[derive(Clone)]
pub struct ActivityFetcher {
    client: StravaClient,
    refresher: TokenRefresher,
    store: SharedCredentialStore,
}

impl ActivityFetcher {
    pub fn new(client: StravaClient, store: SharedCredentialStore) -> Self {
        Self {
            refresher: TokenRefresher::new(client.clone(), store.clone()),
            client,
            store,
        }
    }

    /// Fetch all activities between `after` and `before`.
    ///
    /// Pages are requested from 1 upward and the walk stops at the first
    /// page that is empty or shorter than `page_size`. A 401 triggers one
    /// token refresh and a retry of the same page; the refreshed token is
    /// used for the rest of the walk.
    pub async fn fetch_activities(
        &self,
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
        page_size: u32,
    ) -> Result<Vec<RawActivity>, FetchError> {
        let per_page = page_size.clamp(1, MAX_PAGE_SIZE);
        let query = ActivityQuery { after, before };
        let mut credential = self.store.load()?;
        let mut activities = Vec::new();
        let mut page = 1;

        loop {
            let mut refreshed = false;
            let batch = loop {
                let result = self
                    .client
                    .list_activities(&credential.access_token, &query, page, per_page)
                    .await;

                match result {
                    Ok(batch) => break batch,
                    Err(e) if e.is_unauthorized() && !refreshed => {
                        credential = self.refresher.refresh(&credential).await?;
                        refreshed = true;
                    }
                    Err(e) if e.is_unauthorized() => {
                        return Err(FetchError::AuthExpired(AuthError::StillRejected));
                    }
                    Err(e) => return Err(e),
                }
            };

            let count = batch.len();
            tracing::debug!(page, count, "Fetched activity page");
            activities.extend(batch);

            if count < per_page as usize {
                break;
            }
            page += 1;
        }

        tracing::info!(
            count = activities.len(),
            pages = page,
            "Fetched activities from Strava"
        );
        Ok(activities)
    }
}
