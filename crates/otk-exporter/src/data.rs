use otk_logs::KeyAnyValue;

/// Kind of instrument that produced a metric stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentType {
    Counter,
    UpDownCounter,
    Histogram,
    ObservableCounter,
    ObservableUpDownCounter,
    ObservableGauge,
    Gauge,
}

impl InstrumentType {
    pub const ALL: [InstrumentType; 7] = [
        InstrumentType::Counter,
        InstrumentType::UpDownCounter,
        InstrumentType::Histogram,
        InstrumentType::ObservableCounter,
        InstrumentType::ObservableUpDownCounter,
        InstrumentType::ObservableGauge,
        InstrumentType::Gauge,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InstrumentType::Counter => "counter",
            InstrumentType::UpDownCounter => "up_down_counter",
            InstrumentType::Histogram => "histogram",
            InstrumentType::ObservableCounter => "observable_counter",
            InstrumentType::ObservableUpDownCounter => "observable_up_down_counter",
            InstrumentType::ObservableGauge => "observable_gauge",
            InstrumentType::Gauge => "gauge",
        }
    }

    pub fn is_monotonic(self) -> bool {
        matches!(
            self,
            InstrumentType::Counter | InstrumentType::ObservableCounter | InstrumentType::Histogram
        )
    }
}

/// One collected metric stream.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricData {
    pub name: String,
    pub description: String,
    pub unit: String,
    pub instrument_type: InstrumentType,
    pub points: Vec<NumberPoint>,
}

impl MetricData {
    pub fn new(name: impl Into<String>, instrument_type: InstrumentType) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            unit: String::new(),
            instrument_type,
            points: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_point(mut self, point: NumberPoint) -> Self {
        self.points.push(point);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberPoint {
    pub attributes: Vec<KeyAnyValue>,
    pub start_time_unix_nano: u64,
    pub time_unix_nano: u64,
    pub value: f64,
}

impl NumberPoint {
    pub fn new(value: f64) -> Self {
        Self {
            attributes: Vec::new(),
            start_time_unix_nano: 0,
            time_unix_nano: 0,
            value,
        }
    }

    pub fn with_attribute(mut self, attribute: KeyAnyValue) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_times(mut self, start_unix_nano: u64, time_unix_nano: u64) -> Self {
        self.start_time_unix_nano = start_unix_nano;
        self.time_unix_nano = time_unix_nano;
        self
    }
}
