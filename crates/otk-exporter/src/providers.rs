//! Constructors for the built-in exporter variants.

use std::sync::Arc;

use otk_compress::validate_and_resolve_compressor;
use otk_config::model::DefaultHistogramAggregation;
use otk_config::{DeclarativeConfigError, DeclarativeConfigProperties, ResourceRegistry};

use crate::aggregation::{Aggregation, AggregationTemporalitySelector, DefaultAggregationSelector};
use crate::data::InstrumentType;
use crate::logging::LoggingMetricExporter;
use crate::otlp::{HttpChannel, OtlpHttpMetricExporter, OtlpProtocol};

/// Build an OTLP exporter from an `otlp` node. The exporter's channel is
/// appended to `resources`.
pub fn create_otlp_exporter(
    config: &DeclarativeConfigProperties,
    resources: &mut ResourceRegistry,
) -> Result<Arc<OtlpHttpMetricExporter>, DeclarativeConfigError> {
    let mut builder = OtlpHttpMetricExporter::builder();

    if let Some(protocol) = config.get_string("protocol") {
        let protocol = OtlpProtocol::from_wire(&protocol).ok_or_else(|| {
            DeclarativeConfigError::new(format!("Unsupported protocol \"{protocol}\"."))
        })?;
        builder = builder.set_protocol(protocol);
    }
    if let Some(endpoint) = config.get_string("endpoint") {
        builder = builder.set_endpoint(endpoint);
    }
    for (key, value) in headers(config)? {
        builder = builder.add_header(key, value);
    }
    if let Some(method) = config.get_string("compression") {
        let compressor = validate_and_resolve_compressor(&method, &config.component_loader())
            .map_err(|err| DeclarativeConfigError::new(err.to_string()))?;
        builder = builder.set_compressor(compressor);
    }
    if let Some(timeout) = config.get_int("timeout") {
        let timeout = config.get_duration_millis("timeout").ok_or_else(|| {
            DeclarativeConfigError::new(format!("timeout must be non-negative, found {timeout}"))
        })?;
        builder = builder.set_timeout(timeout);
    }
    if let Some(certificate) = config.get_string("certificate") {
        builder = builder.set_trusted_certificates(certificate);
    }
    match (
        config.get_string("client_key"),
        config.get_string("client_certificate"),
    ) {
        (Some(key), Some(certificate)) => builder = builder.set_client_tls(key, certificate),
        (None, None) => {}
        _ => {
            return Err(DeclarativeConfigError::new(
                "client_key and client_certificate must be set together",
            ))
        }
    }
    if let Some(preference) = config.get_string("temporality_preference") {
        let selector =
            AggregationTemporalitySelector::from_preference(&preference).ok_or_else(|| {
                DeclarativeConfigError::new(format!(
                    "Unrecognized aggregation temporality: {preference}"
                ))
            })?;
        builder = builder.set_aggregation_temporality_selector(selector);
    }
    if let Some(aggregation) = config.get_string("default_histogram_aggregation") {
        let aggregation = DefaultHistogramAggregation::from_wire(&aggregation).ok_or_else(|| {
            DeclarativeConfigError::new(format!(
                "Unrecognized default histogram aggregation: {aggregation}"
            ))
        })?;
        builder = builder.set_default_aggregation_selector(histogram_selector(aggregation));
    }

    let channel = resources.add_and_return(Arc::new(HttpChannel::default()));
    Ok(Arc::new(builder.set_channel(channel).build()))
}

/// Build the console exporter from a `console` node.
pub fn create_console_exporter(
    _config: &DeclarativeConfigProperties,
    _resources: &mut ResourceRegistry,
) -> Result<Arc<LoggingMetricExporter>, DeclarativeConfigError> {
    Ok(Arc::new(LoggingMetricExporter::new()))
}

fn histogram_selector(aggregation: DefaultHistogramAggregation) -> DefaultAggregationSelector {
    let histogram = match aggregation {
        DefaultHistogramAggregation::ExplicitBucketHistogram => {
            Aggregation::explicit_bucket_histogram()
        }
        DefaultHistogramAggregation::Base2ExponentialBucketHistogram => {
            Aggregation::base2_exponential_bucket_histogram()
        }
    };
    DefaultAggregationSelector::new().with(InstrumentType::Histogram, histogram)
}

/// `headers` entries first, then `headers_list` (`k1=v1,k2=v2`).
fn headers(
    config: &DeclarativeConfigProperties,
) -> Result<Vec<(String, String)>, DeclarativeConfigError> {
    let mut out = Vec::new();
    if let Some(entries) = config.get_structured_list("headers") {
        for entry in entries {
            match (entry.get_string("name"), entry.get_string("value")) {
                (Some(name), Some(value)) => out.push((name, value)),
                _ => {
                    return Err(DeclarativeConfigError::new(
                        "headers entries must have a name and a value",
                    ))
                }
            }
        }
    }
    if let Some(list) = config.get_string("headers_list") {
        for pair in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((name, value)) = pair.split_once('=') else {
                return Err(DeclarativeConfigError::new(format!(
                    "Invalid headers_list entry \"{pair}\", expected key=value"
                )));
            };
            out.push((name.trim().to_string(), value.trim().to_string()));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::MetricExporter;
    use otk_spi::ComponentRegistry;
    use serde_json::{json, Map, Value};

    fn props(value: Value) -> DeclarativeConfigProperties {
        let Value::Object(map) = value else {
            unreachable!()
        };
        DeclarativeConfigProperties::from_map(map, Arc::new(ComponentRegistry::new()))
    }

    #[test]
    fn headers_list_follows_headers() {
        let config = props(json!({
            "headers": [{"name": "a", "value": "1"}],
            "headers_list": "b=2, c = 3 ,",
        }));
        assert_eq!(
            headers(&config).unwrap(),
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
                ("c".to_string(), "3".to_string()),
            ]
        );
        let err = headers(&props(json!({"headers_list": "novalue"}))).unwrap_err();
        assert!(err.message().contains("novalue"));
    }

    #[test]
    fn rejects_unknown_enumerations() {
        let mut resources = ResourceRegistry::new();
        for (key, value, expected) in [
            ("protocol", "grpc", "Unsupported protocol \"grpc\"."),
            (
                "temporality_preference",
                "sometimes",
                "Unrecognized aggregation temporality: sometimes",
            ),
            (
                "default_histogram_aggregation",
                "Base2ExponentialBucketHistogram",
                "Unrecognized default histogram aggregation: Base2ExponentialBucketHistogram",
            ),
        ] {
            let mut map = Map::new();
            map.insert(key.to_string(), json!(value));
            let err = create_otlp_exporter(&props(Value::Object(map)), &mut resources)
                .err()
                .unwrap();
            assert_eq!(err.message(), expected);
        }
        assert!(resources.is_empty());
    }

    #[test]
    fn unknown_compression_lists_alternatives() {
        let mut resources = ResourceRegistry::new();
        let err = create_otlp_exporter(&props(json!({"compression": "brotli"})), &mut resources)
            .err()
            .unwrap();
        assert_eq!(
            err.message(),
            "Unsupported compressionMethod. Compression method must be \"none\" or one of: [gzip]"
        );
    }

    #[test]
    fn negative_timeout_is_rejected() {
        let mut resources = ResourceRegistry::new();
        let err = create_otlp_exporter(&props(json!({"timeout": -1})), &mut resources)
            .err()
            .unwrap();
        assert_eq!(err.message(), "timeout must be non-negative, found -1");
    }

    #[test]
    fn half_configured_client_tls_is_rejected() {
        let mut resources = ResourceRegistry::new();
        assert!(
            create_otlp_exporter(&props(json!({"client_key": "/k.pem"})), &mut resources).is_err()
        );
        let exporter = create_otlp_exporter(
            &props(json!({"client_key": "/k.pem", "client_certificate": "/c.pem"})),
            &mut resources,
        )
        .unwrap();
        assert_eq!(exporter.tls().client_key.as_deref(), Some("/k.pem"));
        assert_eq!(resources.len(), 1);
    }

    #[test]
    fn console_is_cumulative() {
        let mut resources = ResourceRegistry::new();
        let exporter = create_console_exporter(&props(json!({})), &mut resources).unwrap();
        assert_eq!(
            exporter.aggregation_temporality(InstrumentType::Counter),
            crate::aggregation::AggregationTemporality::Cumulative
        );
        assert!(resources.is_empty());
    }
}
