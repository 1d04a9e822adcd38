//! Gemini API analyzer implementation.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use placetest_core::scoring::PlacementAnalysis;
use placetest_core::traits::{extract_json_from_markdown, AnalysisRequest, ResultAnalyzer};

use crate::error::AnalysisError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-pro";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Gemini API analyzer.
pub struct GeminiAnalyzer {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiAnalyzer {
    pub fn new(api_key: &str, model: Option<String>, base_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client,
        }
    }

    /// The model this analyzer talks to.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Build the analysis prompt from the enriched session history.
fn build_prompt(request: &AnalysisRequest) -> String {
    let history_json = serde_json::to_string_pretty(&request.history)
        .unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"Analyze this student's ESL placement test results to determine their Novakid level.

TEST RESULTS:
{history_json}

NOVAKID LEVEL SYSTEM:
- Level 0 (pre-A1): Complete beginner, basic words only
- Level 1 (A1): Basic vocabulary and simple phrases
- Level 2 (A1+): Expanded vocabulary and basic grammar
- Level 3 (A2): Simple conversations and grammar
- Level 4 (B1): Complex sentences and varied vocabulary
- Level 5 (B2): Fluent communication and complex grammar

ANALYSIS REQUIREMENTS:
1. Determine the student's placement level (0-5)
2. Calculate confidence in the placement
3. Identify strengths and weaknesses
4. Provide specific recommendations

Consider:
- Accuracy patterns across different mechanics
- Performance at different levels
- Consistency of responses
- Skills demonstrated

Return ONLY valid JSON in this exact format:
{{
  "placement": {{
    "novakid_level": 2,
    "confidence": 0.75,
    "cefr_equivalent": "A1+",
    "level_justification": "Consistent performance at Level 2 tasks"
  }},
  "skill_analysis": {{
    "Grammar": {{
      "score": 0.6,
      "evidence": ["Understands present simple", "Difficulty with past tense"]
    }}
  }},
  "recommendations": {{
    "immediate_focus": ["Review past tense forms"],
    "strengths_to_build_on": ["Strong basic vocabulary"],
    "suggested_starting_point": "Begin at Novakid Level 2",
    "estimated_progress": "Ready for Level 3 in 4-6 weeks with regular practice"
  }}
}}"#
    )
}

#[async_trait]
impl ResultAnalyzer for GeminiAnalyzer {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(model = %self.model, answers = request.history.len()))]
    async fn analyze(&self, request: &AnalysisRequest) -> anyhow::Result<PlacementAnalysis> {
        let start = Instant::now();

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: build_prompt(request),
                }],
            }],
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    AnalysisError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(AnalysisError::RateLimited {
                retry_after_ms: retry_after,
            }
            .into());
        }
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::AuthenticationFailed(body).into());
        }
        if status == 404 {
            return Err(AnalysisError::ModelNotFound(self.model.clone()).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(AnalysisError::ApiError { status, message }.into());
        }

        let api_response: GeminiResponse =
            response.json().await.map_err(|e| AnalysisError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        let text = api_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(AnalysisError::MalformedResponse("empty candidate text".into()).into());
        }

        let payload = extract_json_from_markdown(&text);
        let analysis: PlacementAnalysis = serde_json::from_str(&payload)
            .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

        if !(0.0..=1.0).contains(&analysis.placement.confidence) {
            return Err(AnalysisError::MalformedResponse(format!(
                "confidence out of range: {}",
                analysis.placement.confidence
            ))
            .into());
        }

        tracing::debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            level = %analysis.placement.novakid_level,
            "AI analysis complete"
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placetest_core::model::{Level, Mechanic};
    use placetest_core::session::HistoryEntry;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> AnalysisRequest {
        AnalysisRequest::new(vec![HistoryEntry {
            question_id: "L2_MC_001".into(),
            correct: true,
            level: Level::new(2).unwrap(),
            assigned_level: Level::new(2).unwrap(),
            mechanic: Mechanic::MultipleChoiceText,
            skill: "Grammar".into(),
            grammar_point: Some("present simple".into()),
        }])
    }

    fn candidate_json(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [
                {"content": {"parts": [{"text": text}]}}
            ],
            "usageMetadata": {"promptTokenCount": 400, "candidatesTokenCount": 150}
        })
    }

    const VALID_ANALYSIS: &str = r#"```json
{
  "placement": {
    "novakid_level": 2,
    "confidence": 0.75,
    "cefr_equivalent": "A1+",
    "level_justification": "Consistent Level 2 performance"
  },
  "skill_analysis": {
    "Grammar": {"score": 0.8, "evidence": ["Handled present simple well"]}
  },
  "recommendations": {
    "immediate_focus": ["Practice past tense"],
    "strengths_to_build_on": ["Good grammar base"],
    "suggested_starting_point": "Begin at Novakid Level 2",
    "estimated_progress": "Level 3 in 4-6 weeks"
  }
}
```"#;

    #[tokio::test]
    async fn successful_analysis() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(candidate_json(VALID_ANALYSIS)),
            )
            .mount(&server)
            .await;

        let analyzer = GeminiAnalyzer::new("test-key", None, Some(server.uri()));
        let analysis = analyzer.analyze(&request()).await.unwrap();
        assert_eq!(analysis.placement.novakid_level.value(), 2);
        assert_eq!(analysis.placement.cefr_equivalent, "A1+");
        assert!(analysis.skill_analysis.contains_key("Grammar"));
    }

    #[tokio::test]
    async fn authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let analyzer = GeminiAnalyzer::new("bad-key", None, Some(server.uri()));
        let err = analyzer.analyze(&request()).await.unwrap_err();
        assert!(err.to_string().contains("authentication"));
        let analysis_err = err.downcast_ref::<AnalysisError>().unwrap();
        assert!(analysis_err.is_permanent());
    }

    #[tokio::test]
    async fn rate_limiting_carries_retry_hint() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let analyzer = GeminiAnalyzer::new("test-key", None, Some(server.uri()));
        let err = analyzer.analyze(&request()).await.unwrap_err();
        let analysis_err = err.downcast_ref::<AnalysisError>().unwrap();
        assert_eq!(analysis_err.retry_after_ms(), Some(7000));
    }

    #[tokio::test]
    async fn model_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let analyzer =
            GeminiAnalyzer::new("test-key", Some("gemini-nope".into()), Some(server.uri()));
        let err = analyzer.analyze(&request()).await.unwrap_err();
        assert!(err.to_string().contains("gemini-nope"));
    }

    #[tokio::test]
    async fn prose_response_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_json(
                "The student seems to be around level 2, good luck!",
            )))
            .mount(&server)
            .await;

        let analyzer = GeminiAnalyzer::new("test-key", None, Some(server.uri()));
        let err = analyzer.analyze(&request()).await.unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }

    #[tokio::test]
    async fn out_of_range_confidence_is_rejected() {
        let server = MockServer::start().await;

        let bad = VALID_ANALYSIS.replace("0.75", "7.5");
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_json(&bad)))
            .mount(&server)
            .await;

        let analyzer = GeminiAnalyzer::new("test-key", None, Some(server.uri()));
        let err = analyzer.analyze(&request()).await.unwrap_err();
        assert!(err.to_string().contains("confidence"));
    }

    #[test]
    fn prompt_includes_history_and_rubric() {
        let prompt = build_prompt(&request());
        assert!(prompt.contains("L2_MC_001"));
        assert!(prompt.contains("multiple-choice-text-text"));
        assert!(prompt.contains("Level 5 (B2)"));
        assert!(prompt.contains("novakid_level"));
    }
}
