//! Wire format for the hosted classification endpoint.
//!
//! Request body: `{"instances": ["text", ...]}`.
//! Response body: `[{"label": ["__label__x", ...], "prob": [0.9, ...]}, ...]`,
//! one entry per instance, in request order.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One inference call: cleaned texts in record order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InferenceRequest {
    pub instances: Vec<String>,
}

impl InferenceRequest {
    pub fn new(instances: Vec<String>) -> Self {
        Self { instances }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Serialize to the JSON document the endpoint expects.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Top-ranked prediction for one request entry.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceResult {
    pub label: String,
    pub probability: f64,
}

#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("response is not a JSON array of predictions: {0}")]
    Json(#[from] serde_json::Error),
    #[error("prediction {index} has an empty 'label' list")]
    EmptyLabels { index: usize },
    #[error("prediction {index} has an empty 'prob' list")]
    EmptyProbs { index: usize },
}

#[derive(Deserialize)]
struct RawPrediction {
    label: Vec<String>,
    prob: Vec<f64>,
}

/// Decode a raw endpoint response, keeping the first label/probability of each entry.
///
/// Does not compare the result count with the request; alignment is checked
/// when predictions are merged back onto the records.
pub fn parse_response(raw: &[u8]) -> Result<Vec<InferenceResult>, ResponseError> {
    let entries: Vec<RawPrediction> = serde_json::from_slice(raw)?;
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let label = entry
                .label
                .into_iter()
                .next()
                .ok_or(ResponseError::EmptyLabels { index })?;
            let probability = *entry
                .prob
                .first()
                .ok_or(ResponseError::EmptyProbs { index })?;
            Ok(InferenceResult { label, probability })
        })
        .collect()
}

/// Sends an [`InferenceRequest`] to a classification service and returns the raw body.
///
/// Implementations block the run until the service answers or the call fails;
/// they do not retry.
#[async_trait]
pub trait Invoker: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn invoke(&self, request: &InferenceRequest) -> Result<Vec<u8>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_instances_document() {
        let req = InferenceRequest::new(vec!["printer cartridges".into(), "".into()]);
        let json: serde_json::Value = serde_json::from_slice(&req.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"instances": ["printer cartridges", ""]})
        );
    }

    #[test]
    fn parse_keeps_first_label_and_prob() {
        let raw = br#"[
            {"label": ["__label__office_supplies", "__label__furniture"], "prob": [0.91, 0.05]},
            {"label": ["__label__furniture"], "prob": [0.77]}
        ]"#;
        let results = parse_response(raw).unwrap();
        assert_eq!(
            results,
            vec![
                InferenceResult {
                    label: "__label__office_supplies".into(),
                    probability: 0.91,
                },
                InferenceResult {
                    label: "__label__furniture".into(),
                    probability: 0.77,
                },
            ]
        );
    }

    #[test]
    fn parse_empty_array() {
        assert!(parse_response(b"[]").unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_missing_field() {
        let raw = br#"[{"label": ["__label__x"]}]"#;
        assert!(matches!(parse_response(raw), Err(ResponseError::Json(_))));
    }

    #[test]
    fn parse_rejects_non_array() {
        let raw = br#"{"predictions": []}"#;
        assert!(matches!(parse_response(raw), Err(ResponseError::Json(_))));
    }

    #[test]
    fn parse_rejects_malformed_json() {
        assert!(matches!(
            parse_response(b"not json"),
            Err(ResponseError::Json(_))
        ));
    }

    #[test]
    fn parse_rejects_empty_label_list_with_index() {
        let raw = br#"[
            {"label": ["__label__a"], "prob": [0.5]},
            {"label": [], "prob": [0.5]}
        ]"#;
        let err = parse_response(raw).unwrap_err();
        assert!(matches!(err, ResponseError::EmptyLabels { index: 1 }));
        assert_eq!(err.to_string(), "prediction 1 has an empty 'label' list");
    }

    #[test]
    fn parse_rejects_empty_prob_list() {
        let raw = br#"[{"label": ["__label__a"], "prob": []}]"#;
        assert!(matches!(
            parse_response(raw),
            Err(ResponseError::EmptyProbs { index: 0 })
        ));
    }

    struct Echo;

    #[async_trait]
    impl Invoker for Echo {
        type Error = std::convert::Infallible;

        async fn invoke(&self, request: &InferenceRequest) -> Result<Vec<u8>, Self::Error> {
            let body: Vec<serde_json::Value> = request
                .instances
                .iter()
                .map(|_| serde_json::json!({"label": ["__label__echo"], "prob": [1.0]}))
                .collect();
            Ok(serde_json::to_vec(&body).unwrap())
        }
    }

    #[tokio::test]
    async fn invoker_output_feeds_parser() {
        let req = InferenceRequest::new(vec!["a".into(), "b".into()]);
        let raw = Echo.invoke(&req).await.unwrap();
        let results = parse_response(&raw).unwrap();
        assert_eq!(results.len(), req.len());
        assert_eq!(results[0].label, "__label__echo");
    }
}
