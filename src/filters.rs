//! Filtering module for activity records
//!
//! This module provides flexible filtering capabilities for activity data,
//! supporting date ranges and market/channel/campaign selection.
//!
//! # Examples
//!
//! ```
//! use emistat::filters::ActivityFilter;
//! use chrono::NaiveDate;
//!
//! // Activities in January 2025 for a single market
//! let filter = ActivityFilter::new()
//!     .with_since(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
//!     .with_until(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap())
//!     .with_market("US".to_string());
//! ```

use crate::types::ActivityInput;
use chrono::NaiveDate;

/// Filter configuration for activity records
///
/// All filters are optional and combine conjunctively. String filters are
/// case-insensitive.
#[derive(Debug, Default, Clone)]
pub struct ActivityFilter {
    /// Start date filter (inclusive)
    pub since_date: Option<NaiveDate>,
    /// End date filter (inclusive)
    pub until_date: Option<NaiveDate>,
    /// Market filter
    pub market: Option<String>,
    /// Channel filter
    pub channel: Option<String>,
    /// Campaign filter
    pub campaign: Option<String>,
}

impl ActivityFilter {
    /// Create a new filter with no restrictions
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start date filter
    pub fn with_since(mut self, date: NaiveDate) -> Self {
        self.since_date = Some(date);
        self
    }

    /// Set the end date filter
    pub fn with_until(mut self, date: NaiveDate) -> Self {
        self.until_date = Some(date);
        self
    }

    /// Set the market filter
    pub fn with_market(mut self, market: String) -> Self {
        self.market = Some(market);
        self
    }

    /// Set the channel filter
    pub fn with_channel(mut self, channel: String) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Set the campaign filter
    pub fn with_campaign(mut self, campaign: String) -> Self {
        self.campaign = Some(campaign);
        self
    }

    /// Check if an activity passes the filter
    pub fn matches(&self, activity: &ActivityInput) -> bool {
        let date = activity.date.inner();

        if let Some(since) = &self.since_date {
            if date < since {
                return false;
            }
        }

        if let Some(until) = &self.until_date {
            if date > until {
                return false;
            }
        }

        if let Some(market) = &self.market {
            if !activity.market.matches(market) {
                return false;
            }
        }

        if let Some(channel) = &self.channel {
            if !activity.channel.as_str().eq_ignore_ascii_case(channel) {
                return false;
            }
        }

        if let Some(campaign_filter) = &self.campaign {
            match &activity.campaign {
                Some(campaign) => {
                    if !campaign.eq_ignore_ascii_case(campaign_filter) {
                        return false;
                    }
                }
                // Filter names a campaign but the activity is untagged
                None => return false,
            }
        }

        true
    }

    /// Filter a stream of activities
    ///
    /// Applies the configured filters to a stream of activity records,
    /// returning only those that match all criteria. Errors pass through
    /// unfiltered so the consumer decides how to handle them.
    pub async fn filter_stream<S>(
        self,
        stream: S,
    ) -> impl futures::Stream<Item = crate::error::Result<ActivityInput>>
    where
        S: futures::Stream<Item = crate::error::Result<ActivityInput>>,
    {
        use futures::StreamExt;

        stream.filter_map(move |result| {
            let filter = self.clone();
            async move {
                match result {
                    Ok(activity) => {
                        if filter.matches(&activity) {
                            Some(Ok(activity))
                        } else {
                            None
                        }
                    }
                    Err(e) => Some(Err(e)),
                }
            }
        })
    }
}
