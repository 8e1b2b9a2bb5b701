//! Recommendations dialog with per-kind tabs.
//!
//! Every open, tab switch or refresh asks the backend to generate a fresh
//! set; failures show an empty list.

#[cfg(test)]
#[path = "recommendation_modal_test.rs"]
mod recommendation_modal_test;

use crate::net::api::ApiClient;
use crate::net::types::{Recommendation, Tab};

/// Coarse label for a match score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfidenceBand {
    Strong,
    Good,
    Fair,
    Weak,
}

impl ConfidenceBand {
    #[must_use]
    pub fn from_score(confidence: f64) -> Self {
        if confidence >= 0.8 {
            Self::Strong
        } else if confidence >= 0.6 {
            Self::Good
        } else if confidence >= 0.4 {
            Self::Fair
        } else {
            Self::Weak
        }
    }
}

/// Score as a whole percentage, for "NN% Match" badges.
#[must_use]
pub fn match_percent(confidence: f64) -> u32 {
    // Clamped to 0..=100 first, so the cast cannot truncate or wrap.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = (confidence.clamp(0.0, 1.0) * 100.0).round() as u32;
    percent
}

pub struct RecommendationsView {
    api: ApiClient,
    active_tab: Tab,
    recommendations: Vec<Recommendation>,
    is_loading: bool,
}

impl RecommendationsView {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api, active_tab: Tab::All, recommendations: Vec::new(), is_loading: false }
    }

    #[must_use]
    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Switch tabs and regenerate.
    pub async fn set_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
        self.refresh().await;
    }

    /// Regenerate for the active tab.
    pub async fn refresh(&mut self) {
        self.is_loading = true;
        self.recommendations = match self.api.recommendations(self.active_tab).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(tab = self.active_tab.as_str(), error = %e, "recommendation generation failed");
                Vec::new()
            }
        };
        self.is_loading = false;
    }

    /// Recommendations matching the active tab.
    #[must_use]
    pub fn filtered(&self) -> Vec<&Recommendation> {
        self.recommendations
            .iter()
            .filter(|item| self.active_tab.includes(item.kind))
            .collect()
    }
}
