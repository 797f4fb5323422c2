use base64::Engine as _;
use otk_logs::{AnyValue, KeyAnyValue};
use serde_json::{json, Value};

use crate::aggregation::AggregationTemporalitySelector;
use crate::data::{InstrumentType, MetricData, NumberPoint};
use crate::exporter::ExportError;

pub(crate) const SCOPE_NAME: &str = "otk";

/// Build an OTLP/JSON `ExportMetricsServiceRequest`. Histograms carry
/// bucket data that number points cannot express and are rejected.
pub(crate) fn metrics_request(
    metrics: &[MetricData],
    temporality: AggregationTemporalitySelector,
) -> Result<Value, ExportError> {
    let metrics = metrics
        .iter()
        .map(|metric| metric_json(metric, temporality))
        .collect::<Result<Vec<Value>, ExportError>>()?;
    Ok(json!({
        "resourceMetrics": [{
            "resource": { "attributes": [] },
            "scopeMetrics": [{
                "scope": { "name": SCOPE_NAME },
                "metrics": metrics,
            }],
        }],
    }))
}

fn metric_json(
    metric: &MetricData,
    temporality: AggregationTemporalitySelector,
) -> Result<Value, ExportError> {
    let points: Vec<Value> = metric.points.iter().map(point_json).collect();
    let mut out = json!({
        "name": metric.name,
        "description": metric.description,
        "unit": metric.unit,
    });
    let data = match metric.instrument_type {
        InstrumentType::Histogram => {
            return Err(ExportError::UnsupportedInstrument {
                metric: metric.name.clone(),
                instrument: InstrumentType::Histogram.as_str(),
            })
        }
        InstrumentType::ObservableGauge | InstrumentType::Gauge => {
            ("gauge", json!({ "dataPoints": points }))
        }
        instrument => (
            "sum",
            json!({
                "dataPoints": points,
                "aggregationTemporality": temporality.select(instrument).otlp_value(),
                "isMonotonic": instrument.is_monotonic(),
            }),
        ),
    };
    out[data.0] = data.1;
    Ok(out)
}

fn point_json(point: &NumberPoint) -> Value {
    json!({
        "attributes": point.attributes.iter().map(key_value_json).collect::<Vec<_>>(),
        "startTimeUnixNano": point.start_time_unix_nano.to_string(),
        "timeUnixNano": point.time_unix_nano.to_string(),
        "asDouble": point.value,
    })
}

fn key_value_json(kv: &KeyAnyValue) -> Value {
    json!({ "key": kv.key, "value": any_value_json(&kv.value) })
}

fn any_value_json(value: &AnyValue) -> Value {
    match value {
        AnyValue::String(s) => json!({ "stringValue": s }),
        AnyValue::Bool(b) => json!({ "boolValue": b }),
        // 64-bit integers are strings in OTLP/JSON
        AnyValue::Long(n) => json!({ "intValue": n.to_string() }),
        AnyValue::Double(d) => json!({ "doubleValue": d }),
        AnyValue::Array(values) => json!({
            "arrayValue": { "values": values.iter().map(any_value_json).collect::<Vec<_>>() }
        }),
        AnyValue::KeyValueList(entries) => json!({
            "kvlistValue": { "values": entries.iter().map(key_value_json).collect::<Vec<_>>() }
        }),
        AnyValue::Bytes(bytes) => json!({
            "bytesValue": base64::engine::general_purpose::STANDARD.encode(bytes.value())
        }),
    }
}
