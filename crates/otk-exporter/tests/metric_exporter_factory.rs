use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use flate2::read::GzDecoder;
use once_cell::sync::Lazy;
use otk_config::model::{
    ConsoleModel, DefaultHistogramAggregation, NameStringValuePairModel,
    OpenTelemetryConfigurationModel, OtlpMetricModel, PushMetricExporterModel,
};
use otk_config::{
    parse, CloseError, Closeable, ComponentProvider, ConfigFormat, DeclarativeConfigError,
    DeclarativeConfigProperties, Factory, ResourceRegistry,
};
use otk_exporter::otlp::{NoopTransport, OtlpHttpMetricExporter, OtlpProtocol, DEFAULT_ENDPOINT};
use otk_exporter::{
    create_metric_exporters, downcast_exporter, Aggregation, AggregationTemporality,
    ExportError, InstrumentType, LoggingMetricExporter, MetricData, MetricExporter,
    MetricExporterFactory, NumberPoint,
};
use otk_spi::SpiHelper;
use serde_json::{json, Map, Value};

#[derive(Debug)]
struct TestMetricExporter {
    config: DeclarativeConfigProperties,
}

impl MetricExporter for TestMetricExporter {
    fn export(&self, _metrics: &[MetricData]) -> Result<(), ExportError> {
        Ok(())
    }

    fn shutdown(&self) -> Result<(), ExportError> {
        Ok(())
    }

    fn aggregation_temporality(&self, _instrument: InstrumentType) -> AggregationTemporality {
        AggregationTemporality::Cumulative
    }
}

impl Closeable for TestMetricExporter {
    fn close(&self) -> Result<(), CloseError> {
        Ok(())
    }
}

struct TestMetricExporterProvider;

impl ComponentProvider<dyn MetricExporter> for TestMetricExporterProvider {
    fn name(&self) -> &str {
        "test"
    }

    fn create(
        &self,
        config: &DeclarativeConfigProperties,
    ) -> Result<Arc<dyn MetricExporter>, DeclarativeConfigError> {
        Ok(Arc::new(TestMetricExporter {
            config: config.clone(),
        }))
    }
}

otk_spi::register_provider!(
    dyn ComponentProvider<dyn MetricExporter>,
    "test",
    TestMetricExporterProvider
);

/// Claims the built-in `otlp` key; must never be consulted.
struct HijackingOtlpProvider;

impl ComponentProvider<dyn MetricExporter> for HijackingOtlpProvider {
    fn name(&self) -> &str {
        "otlp"
    }

    fn create(
        &self,
        _config: &DeclarativeConfigProperties,
    ) -> Result<Arc<dyn MetricExporter>, DeclarativeConfigError> {
        Err(DeclarativeConfigError::new("plugin otlp provider was used"))
    }
}

otk_spi::register_provider!(
    dyn ComponentProvider<dyn MetricExporter>,
    "otlp",
    HijackingOtlpProvider
);

static SPI: Lazy<SpiHelper> = Lazy::new(SpiHelper::global);

fn create(
    model: &PushMetricExporterModel,
) -> (Result<Arc<dyn MetricExporter>, DeclarativeConfigError>, ResourceRegistry) {
    let mut resources = ResourceRegistry::new();
    let result = MetricExporterFactory::instance().create(model, &SPI, &mut resources);
    (result, resources)
}

fn config_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

#[test]
fn otlp_defaults() {
    let (exporter, mut resources) =
        create(&PushMetricExporterModel::Otlp(OtlpMetricModel::default()));
    let exporter = exporter.unwrap();
    let otlp = downcast_exporter::<OtlpHttpMetricExporter>(exporter.as_ref()).unwrap();

    assert_eq!(otlp.endpoint(), DEFAULT_ENDPOINT);
    assert_eq!(otlp.protocol(), OtlpProtocol::HttpProtobuf);
    assert!(otlp.headers().is_empty());
    assert_eq!(otlp.compression(), None);
    assert_eq!(otlp.timeout(), Duration::from_secs(10));
    assert_eq!(otlp.tls().certificate, None);
    assert_eq!(
        otlp.aggregation_temporality(InstrumentType::Counter),
        AggregationTemporality::Cumulative
    );
    assert_eq!(
        otlp.default_aggregation(InstrumentType::Histogram),
        Aggregation::Default
    );

    // channel, then the exporter itself
    assert_eq!(resources.len(), 2);
    resources.close_all().unwrap();
    assert!(otlp.channel().is_closed());
}

#[test]
fn otlp_configured() {
    let model = OtlpMetricModel::default()
        .with_protocol("http/json")
        .with_endpoint("http://collector:4318/v1/metrics")
        .with_headers(vec![NameStringValuePairModel::new("key1", "value1")])
        .with_headers_list("key2=value2")
        .with_compression("gzip")
        .with_timeout(15_000)
        .with_certificate("/ca.pem")
        .with_client_key("/client-key.pem")
        .with_client_certificate("/client-cert.pem")
        .with_temporality_preference("delta")
        .with_default_histogram_aggregation(
            DefaultHistogramAggregation::Base2ExponentialBucketHistogram,
        );
    let (exporter, resources) = create(&PushMetricExporterModel::Otlp(model));
    let exporter = exporter.unwrap();
    let otlp = downcast_exporter::<OtlpHttpMetricExporter>(exporter.as_ref()).unwrap();

    assert_eq!(otlp.endpoint(), "http://collector:4318/v1/metrics");
    assert_eq!(otlp.protocol(), OtlpProtocol::HttpJson);
    assert_eq!(
        otlp.headers(),
        &[
            ("key1".to_string(), "value1".to_string()),
            ("key2".to_string(), "value2".to_string()),
        ]
    );
    assert_eq!(otlp.compression(), Some("gzip"));
    assert_eq!(otlp.timeout(), Duration::from_secs(15));
    assert_eq!(otlp.tls().certificate.as_deref(), Some("/ca.pem"));
    assert_eq!(otlp.tls().client_key.as_deref(), Some("/client-key.pem"));
    assert_eq!(
        otlp.tls().client_certificate.as_deref(),
        Some("/client-cert.pem")
    );
    assert_eq!(
        otlp.aggregation_temporality(InstrumentType::Counter),
        AggregationTemporality::Delta
    );
    assert_eq!(
        otlp.aggregation_temporality(InstrumentType::UpDownCounter),
        AggregationTemporality::Cumulative
    );
    assert_eq!(
        otlp.default_aggregation(InstrumentType::Histogram),
        Aggregation::base2_exponential_bucket_histogram()
    );
    assert_eq!(resources.len(), 2);
}

#[test]
fn otlp_gzip_body_decodes_to_the_json_request() {
    let (exporter, _resources) = create(&PushMetricExporterModel::Otlp(
        OtlpMetricModel::default().with_compression("gzip"),
    ));
    let exporter = exporter.unwrap();
    let otlp = downcast_exporter::<OtlpHttpMetricExporter>(exporter.as_ref()).unwrap();

    exporter
        .export(&[MetricData::new("requests", InstrumentType::Counter)
            .with_point(NumberPoint::new(42.0))])
        .unwrap();

    let noop = otlp_transport(otlp);
    let request = noop.last_request().unwrap();
    assert_eq!(request.content_encoding.as_deref(), Some("gzip"));
    let mut json = String::new();
    GzDecoder::new(&request.body[..])
        .read_to_string(&mut json)
        .unwrap();
    let body: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        body["resourceMetrics"][0]["scopeMetrics"][0]["metrics"][0]["sum"]["dataPoints"][0]
            ["asDouble"],
        json!(42.0)
    );
}

fn otlp_transport(otlp: &OtlpHttpMetricExporter) -> &NoopTransport {
    let transport: &dyn std::any::Any = otlp.channel().transport().as_ref();
    transport.downcast_ref::<NoopTransport>().unwrap()
}

#[test]
fn console() {
    let (exporter, resources) = create(&PushMetricExporterModel::Console(ConsoleModel {}));
    let exporter = exporter.unwrap();
    assert!(downcast_exporter::<LoggingMetricExporter>(exporter.as_ref()).is_some());
    assert_eq!(resources.len(), 1);
}

#[test]
fn unknown_plugin() {
    let (result, resources) = create(&PushMetricExporterModel::named(
        "unknown_key",
        config_map(json!({"key1": "value1"})),
    ));
    let err = result.err().unwrap();
    assert_eq!(
        err.to_string(),
        "No component provider detected for otk_exporter::MetricExporter with name \"unknown_key\"."
    );
    assert!(resources.is_empty());
}

#[test]
fn valid_plugin() {
    let (result, resources) = create(&PushMetricExporterModel::named(
        "test",
        config_map(json!({"key1": "value1"})),
    ));
    let exporter = result.unwrap();
    let test = downcast_exporter::<TestMetricExporter>(exporter.as_ref()).unwrap();
    assert_eq!(test.config.get_string("key1").as_deref(), Some("value1"));
    assert_eq!(resources.len(), 1);
}

#[test]
fn built_in_keys_never_reach_plugins() {
    let model: PushMetricExporterModel = serde_json::from_value(json!({"otlp": {}})).unwrap();
    let (result, _resources) = create(&model);
    let exporter = result.unwrap();
    assert!(downcast_exporter::<OtlpHttpMetricExporter>(exporter.as_ref()).is_some());
}

#[test]
fn named_built_in_keys_resolve_like_their_documents() {
    let named = PushMetricExporterModel::named("otlp", config_map(json!({"timeout": 15000})));
    let (result, resources) = create(&named);
    let exporter = result.unwrap();
    let otlp = downcast_exporter::<OtlpHttpMetricExporter>(exporter.as_ref()).unwrap();
    assert_eq!(otlp.timeout(), Duration::from_secs(15));
    assert_eq!(resources.len(), 2);

    let reread: PushMetricExporterModel =
        serde_json::from_value(serde_json::to_value(&named).unwrap()).unwrap();
    assert!(matches!(reread, PushMetricExporterModel::Otlp(_)));
    let (result, _resources) = create(&reread);
    let exporter = result.unwrap();
    let otlp = downcast_exporter::<OtlpHttpMetricExporter>(exporter.as_ref()).unwrap();
    assert_eq!(otlp.timeout(), Duration::from_secs(15));

    let (result, _resources) = create(&PushMetricExporterModel::named("console", Map::new()));
    let exporter = result.unwrap();
    assert!(downcast_exporter::<LoggingMetricExporter>(exporter.as_ref()).is_some());
}

#[test]
fn named_built_in_key_with_bad_shape_is_a_config_error() {
    let (result, resources) = create(&PushMetricExporterModel::named(
        "otlp",
        config_map(json!({"timeout": "soon"})),
    ));
    let err = result.err().unwrap();
    assert!(err.message().starts_with("otlp: "), "{}", err.message());
    assert!(resources.is_empty());
}

const OTLP_KEYS: [&str; 11] = [
    "protocol",
    "endpoint",
    "headers",
    "headers_list",
    "compression",
    "timeout",
    "certificate",
    "client_key",
    "client_certificate",
    "temporality_preference",
    "default_histogram_aggregation",
];

#[test]
fn otlp_default_view_has_no_properties() {
    let view =
        DeclarativeConfigProperties::from_model(&OtlpMetricModel::default(), SPI.component_loader())
            .unwrap();
    assert!(view.property_keys().is_empty());
    for key in OTLP_KEYS {
        assert_eq!(view.get_string(key), None, "{key}");
        assert_eq!(view.get_int(key), None, "{key}");
        assert!(view.get_structured_list(key).is_none(), "{key}");
    }
}

#[test]
fn otlp_configured_view_exposes_every_property() {
    let model = OtlpMetricModel::default()
        .with_protocol("http/json")
        .with_endpoint("http://collector:4318/v1/metrics")
        .with_headers(vec![
            NameStringValuePairModel::new("key1", "value1"),
            NameStringValuePairModel::new("key2", "value2"),
        ])
        .with_headers_list("key3=value3")
        .with_compression("gzip")
        .with_timeout(15_000)
        .with_certificate("/ca.pem")
        .with_client_key("/client-key.pem")
        .with_client_certificate("/client-cert.pem")
        .with_temporality_preference("delta")
        .with_default_histogram_aggregation(
            DefaultHistogramAggregation::Base2ExponentialBucketHistogram,
        );
    let view = DeclarativeConfigProperties::from_model(&model, SPI.component_loader()).unwrap();

    let mut keys = OTLP_KEYS.map(str::to_string).to_vec();
    keys.sort();
    assert_eq!(view.property_keys(), keys);
    assert_eq!(view.get_int("timeout"), Some(15_000));
    assert_eq!(
        view.get_duration_millis("timeout"),
        Some(Duration::from_secs(15))
    );
    let headers: Vec<(Option<String>, Option<String>)> = view
        .get_structured_list("headers")
        .unwrap()
        .iter()
        .map(|h| (h.get_string("name"), h.get_string("value")))
        .collect();
    assert_eq!(
        headers,
        vec![
            (Some("key1".into()), Some("value1".into())),
            (Some("key2".into()), Some("value2".into())),
        ]
    );
    assert_eq!(view.get_string("headers_list").as_deref(), Some("key3=value3"));
    assert_eq!(view.get_string("compression").as_deref(), Some("gzip"));
    assert_eq!(view.get_string("protocol").as_deref(), Some("http/json"));
    assert_eq!(view.get_string("temporality_preference").as_deref(), Some("delta"));
    assert_eq!(
        view.get_string("default_histogram_aggregation").as_deref(),
        Some("base2_exponential_bucket_histogram")
    );
    assert_eq!(view.get_string("client_certificate").as_deref(), Some("/client-cert.pem"));
}

#[test]
fn document_exporters_resolve_in_order() {
    let model: OpenTelemetryConfigurationModel = parse(
        r#"
file_format: "0.3"
meter_provider:
  readers:
    - periodic:
        exporter:
          console:
    - periodic:
        exporter:
          test:
            key1: value1
    - periodic:
        exporter:
          otlp:
            compression: none
"#,
        ConfigFormat::Yaml,
    )
    .unwrap();
    let mut resources = ResourceRegistry::new();
    let exporters = create_metric_exporters(&model, &SPI, &mut resources).unwrap();
    assert_eq!(exporters.len(), 3);
    assert!(downcast_exporter::<LoggingMetricExporter>(exporters[0].as_ref()).is_some());
    assert!(downcast_exporter::<TestMetricExporter>(exporters[1].as_ref()).is_some());
    let otlp = downcast_exporter::<OtlpHttpMetricExporter>(exporters[2].as_ref()).unwrap();
    assert_eq!(otlp.compression(), None);
    // console, test, channel, otlp
    assert_eq!(resources.len(), 4);
    resources.close_all().unwrap();
}

#[test]
fn document_failure_stops_resolution() {
    let model: OpenTelemetryConfigurationModel = parse(
        r#"{"file_format": "0.3", "meter_provider": {"readers": [
            {"periodic": {"exporter": {"console": {}}}},
            {"periodic": {"exporter": {"missing": {}}}}
        ]}}"#,
        ConfigFormat::Json,
    )
    .unwrap();
    let mut resources = ResourceRegistry::new();
    let err = create_metric_exporters(&model, &SPI, &mut resources)
        .err()
        .unwrap();
    assert!(err.message().ends_with("with name \"missing\"."));
    assert_eq!(resources.len(), 1);
}
