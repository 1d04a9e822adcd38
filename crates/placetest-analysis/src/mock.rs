//! Mock analyzer for testing.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use placetest_core::scoring::PlacementAnalysis;
use placetest_core::traits::{AnalysisRequest, ResultAnalyzer};

/// A mock analyzer for exercising the fallback chain without API calls.
pub struct MockAnalyzer {
    response: Result<PlacementAnalysis, String>,
    call_count: AtomicU32,
}

impl MockAnalyzer {
    /// A mock that always returns the given analysis.
    pub fn with_analysis(analysis: PlacementAnalysis) -> Self {
        Self {
            response: Ok(analysis),
            call_count: AtomicU32::new(0),
        }
    }

    /// A mock that always fails with the given message.
    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Number of analyze calls made.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ResultAnalyzer for MockAnalyzer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze(&self, _request: &AnalysisRequest) -> anyhow::Result<PlacementAnalysis> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        match &self.response {
            Ok(analysis) => Ok(analysis.clone()),
            Err(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placetest_core::scoring::score_session;

    #[test]
    fn counts_calls() {
        let mock = MockAnalyzer::failing("boom");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn returns_canned_analysis() {
        let canned = score_session(&[]);
        let mock = MockAnalyzer::with_analysis(canned.clone());
        let result = mock.analyze(&AnalysisRequest::new(vec![])).await.unwrap();
        assert_eq!(
            result.placement.novakid_level,
            canned.placement.novakid_level
        );
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn fails_on_demand() {
        let mock = MockAnalyzer::failing("quota exceeded");
        let err = mock
            .analyze(&AnalysisRequest::new(vec![]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
