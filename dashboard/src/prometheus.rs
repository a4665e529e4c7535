use std::time::Duration;

use anyhow::{anyhow, Result};
use prometheus_http_api::{
    DataSourceBuilder, InstantQuery, Query, Response as PromResponse, ResponseData,
};
use resources::objects::metrics::Sample;
use serde_json::Value as JsonValue;
use tokio::time::timeout;

/// Client for the instant-query endpoint of the metrics backend.
#[derive(Clone)]
pub struct MetricsClient {
    source: String,
    /// Upper bound on one query round-trip.
    timeout: Duration,
}

impl MetricsClient {
    pub fn new(source: String, timeout: Duration) -> Self {
        MetricsClient {
            source,
            timeout,
        }
    }

    /// Run one instant query, degrading to an empty sample set on any
    /// failure so a broken metric family cannot abort the aggregation
    /// of the others.
    pub async fn query_or_empty(&self, expression: &str) -> Vec<Sample> {
        match self.query(expression).await {
            Ok(samples) => samples,
            Err(err) => {
                tracing::warn!("Query {} failed: {:#}", expression, err);
                Vec::new()
            },
        }
    }

    async fn query(&self, expression: &str) -> Result<Vec<Sample>> {
        let query = Query::Instant(InstantQuery::new(expression));
        let source = DataSourceBuilder::new(&self.source)
            .with_query(query)
            .build()
            .map_err(|err| anyhow!("Failed to build data source: {}", err))?;
        let response = timeout(self.timeout, source.get())
            .await
            .map_err(|_| anyhow!("Timed out after {:?}", self.timeout))?
            .map_err(|err| anyhow!("Failed to get metrics: {}", err))?;
        Ok(unwrap_vector_result(response))
    }
}

/// Pull the instant vector out of the response envelope. A scalar or
/// matrix payload is unexpected for an instant query and treated as an
/// empty result.
fn unwrap_vector_result(response: PromResponse) -> Vec<Sample> {
    match response.data {
        ResponseData::Vector {
            result,
        } => result
            .into_iter()
            .filter_map(|series| {
                let (timestamp, value) = unwrap_instant_value(&series.value)?;
                Some(Sample {
                    labels: series.labels,
                    timestamp,
                    value,
                })
            })
            .collect(),
        _ => {
            tracing::warn!("Expecting vector result");
            Vec::new()
        },
    }
}

/// Split a `[timestamp, "value"]` pair, `None` when malformed.
fn unwrap_instant_value(value: &[JsonValue]) -> Option<(f64, String)> {
    if value.len() != 2 {
        tracing::warn!("Expecting value array of length 2, got {}", value.len());
        return None;
    }
    match (value[0].as_f64(), value[1].as_str()) {
        (Some(timestamp), Some(value)) => Some((timestamp, value.to_string())),
        _ => {
            tracing::warn!("Expecting pair of f64 and string");
            None
        },
    }
}
