use std::net::Ipv4Addr;
use std::time::Duration;

/// Raw register value reported by analog inputs with no probe attached.
pub const PROBE_ABSENT: i32 = -1;

/// Semantic kind of one telemetry field.
///
/// Every kind knows how many raw registers it consumes, how to decode them
/// into a [`Value`], and (for the writable kinds) how to encode a [`Value`]
/// back into raw registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    Celsius,
    Kelvin,
    Pressure,
    Voltage,
    Energy,
    Power,
    Percent2,
    Flow,
    Frequency,
    Speed,
    Seconds,
    Count,
    Level,
    Bool,
    OperationMode,
    SecOperationMode,
    HeatpumpCode,
    BivalenceLevel,
    StatusLine1,
    StatusLine2,
    StatusLine3,
    Icon,
    Errorcode,
    Switchoff,
    IPv4Address,
    Version,
    Timestamp,
    MajorMinorVersion,
    Unknown,
}

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("expected {expected} raw registers, got {actual}")]
    Width { expected: usize, actual: usize },
    #[error("flag register holds {0}, expected 0 or 1")]
    Flag(i32),
    #[error("register holds {1}, which is not a representable epoch second")]
    Epoch(#[source] jiff::Error, i32),
}

#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    #[error("{} values are never written back to the controller", .0.kind_name())]
    Unsupported(DataType),
    #[error("cannot encode a {found} value as {}", .expected.kind_name())]
    TypeMismatch { expected: DataType, found: &'static str },
    #[error("timestamp {0} does not fit a 32-bit register")]
    EpochRange(jiff::Timestamp),
}

impl DataType {
    /// How many consecutive raw registers this kind consumes.
    pub const fn registers(self) -> usize {
        match self {
            Self::Version => 10,
            _ => 1,
        }
    }

    /// Whether values of this kind can be encoded back into raw registers.
    pub const fn encodable(self) -> bool {
        !matches!(self, Self::Version)
    }

    /// Unit suffix for display purposes, where one applies.
    pub const fn unit(self) -> Option<&'static str> {
        Some(match self {
            Self::Celsius => "°C",
            Self::Kelvin => "K",
            Self::Pressure => "bar",
            Self::Voltage => "V",
            Self::Energy => "kWh",
            Self::Power => "W",
            Self::Percent2 => "%",
            Self::Flow => "l/h",
            Self::Frequency => "Hz",
            Self::Speed => "rpm",
            Self::Seconds => "s",
            _ => return None,
        })
    }

    pub const fn kind_name(self) -> &'static str {
        match self {
            Self::Celsius => "celsius",
            Self::Kelvin => "kelvin",
            Self::Pressure => "pressure",
            Self::Voltage => "voltage",
            Self::Energy => "energy",
            Self::Power => "power",
            Self::Percent2 => "percent",
            Self::Flow => "flow",
            Self::Frequency => "frequency",
            Self::Speed => "speed",
            Self::Seconds => "seconds",
            Self::Count => "count",
            Self::Level => "level",
            Self::Bool => "bool",
            Self::OperationMode => "operation mode",
            Self::SecOperationMode => "sec operation mode",
            Self::HeatpumpCode => "heatpump code",
            Self::BivalenceLevel => "bivalence level",
            Self::StatusLine1 => "status line 1",
            Self::StatusLine2 => "status line 2",
            Self::StatusLine3 => "status line 3",
            Self::Icon => "icon",
            Self::Errorcode => "errorcode",
            Self::Switchoff => "switchoff",
            Self::IPv4Address => "ipv4 address",
            Self::Version => "version",
            Self::Timestamp => "timestamp",
            Self::MajorMinorVersion => "major.minor version",
            Self::Unknown => "unknown",
        }
    }

    /// Divisor applied to the raw register for the scaled numeric kinds.
    const fn scale(self) -> Option<f64> {
        Some(match self {
            Self::Celsius | Self::Kelvin | Self::Voltage | Self::Energy => 10.0,
            Self::Pressure => 100.0,
            Self::Percent2 => 2.0,
            Self::Power | Self::Flow => 1.0,
            _ => return None,
        })
    }

    /// Reserved raw value meaning "no reading available" for this kind.
    const fn sentinel(self) -> Option<i32> {
        match self {
            Self::Voltage => Some(PROBE_ABSENT),
            _ => None,
        }
    }

    pub fn decode(self, raw: &[i32]) -> Result<Value, DecodeError> {
        if raw.len() != self.registers() {
            return Err(DecodeError::Width { expected: self.registers(), actual: raw.len() });
        }
        let word = raw[0];
        if let Some(scale) = self.scale() {
            if self.sentinel() == Some(word) {
                return Ok(Value::Unavailable);
            }
            let scaled = f64::from(word) / scale;
            return Ok(match self {
                Self::Celsius => Value::Celsius(scaled),
                Self::Kelvin => Value::Kelvin(scaled),
                Self::Pressure => Value::Pressure(scaled),
                Self::Voltage => Value::Voltage(scaled),
                Self::Energy => Value::Energy(scaled),
                Self::Power => Value::Power(scaled),
                Self::Percent2 => Value::Percent(scaled),
                Self::Flow => Value::Flow(scaled),
                _ => panic!("malformed DataType"),
            });
        }
        Ok(match self {
            Self::Frequency => Value::Frequency(word),
            Self::Speed => Value::Speed(word),
            Self::Seconds => Value::Seconds(word),
            Self::Count => Value::Count(word),
            Self::Level => Value::Level(word),
            Self::Bool => match word {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                other => return Err(DecodeError::Flag(other)),
            },
            Self::OperationMode => Value::OperationMode(Coded::new(word, labels::operation_mode(word))),
            Self::SecOperationMode => {
                Value::SecOperationMode(Coded::new(word, labels::sec_operation_mode(word)))
            }
            Self::HeatpumpCode => Value::HeatpumpCode(Coded::new(word, labels::heatpump_model(word))),
            Self::BivalenceLevel => {
                Value::BivalenceLevel(Coded::new(word, labels::bivalence_level(word)))
            }
            Self::StatusLine1 => Value::StatusLine(Coded::new(word, labels::status_line_1(word))),
            Self::StatusLine2 => Value::StatusLine(Coded::new(word, labels::status_line_2(word))),
            Self::StatusLine3 => Value::StatusLine(Coded::new(word, labels::status_line_3(word))),
            Self::Icon => Value::Icon(Coded::new(word, labels::icon(word))),
            Self::Errorcode => Value::Errorcode(Coded::new(word, labels::errorcode(word))),
            Self::Switchoff => Value::Switchoff(Coded::new(word, labels::switchoff(word))),
            Self::IPv4Address => Value::IPv4Address(Ipv4Addr::from(word as u32)),
            Self::Version => Value::Version(assemble_version(raw)),
            Self::Timestamp => match word {
                0 => Value::Timestamp(None),
                seconds => Value::Timestamp(Some(
                    jiff::Timestamp::from_second(i64::from(seconds))
                        .map_err(|e| DecodeError::Epoch(e, seconds))?,
                )),
            },
            Self::MajorMinorVersion => {
                Value::MajorMinor { major: word / 100, minor: word % 100 }
            }
            Self::Unknown => Value::Unknown(word),
            _ => panic!("malformed DataType"),
        })
    }

    /// Exact inverse of [`DataType::decode`] for the encodable kinds.
    pub fn encode(self, value: &Value) -> Result<Vec<i32>, EncodeError> {
        if !self.encodable() {
            return Err(EncodeError::Unsupported(self));
        }
        let mismatch = || EncodeError::TypeMismatch { expected: self, found: value.kind_name() };
        if let Some(scale) = self.scale() {
            if let Value::Unavailable = value {
                return match self.sentinel() {
                    Some(sentinel) => Ok(vec![sentinel]),
                    None => Err(mismatch()),
                };
            }
            let scaled = self.scaled_of(value).ok_or_else(mismatch)?;
            return Ok(vec![(scaled * scale).round() as i32]);
        }
        let word = match (self, value) {
            (Self::Frequency, Value::Frequency(v))
            | (Self::Speed, Value::Speed(v))
            | (Self::Seconds, Value::Seconds(v))
            | (Self::Count, Value::Count(v))
            | (Self::Level, Value::Level(v))
            | (Self::Unknown, Value::Unknown(v)) => *v,
            (Self::Bool, Value::Bool(flag)) => *flag as i32,
            (Self::OperationMode, Value::OperationMode(c))
            | (Self::SecOperationMode, Value::SecOperationMode(c))
            | (Self::HeatpumpCode, Value::HeatpumpCode(c))
            | (Self::BivalenceLevel, Value::BivalenceLevel(c))
            | (Self::StatusLine1 | Self::StatusLine2 | Self::StatusLine3, Value::StatusLine(c))
            | (Self::Icon, Value::Icon(c))
            | (Self::Errorcode, Value::Errorcode(c))
            | (Self::Switchoff, Value::Switchoff(c)) => c.code,
            (Self::IPv4Address, Value::IPv4Address(address)) => u32::from(*address) as i32,
            (Self::Timestamp, Value::Timestamp(None)) => 0,
            (Self::Timestamp, Value::Timestamp(Some(ts))) => {
                i32::try_from(ts.as_second()).map_err(|_| EncodeError::EpochRange(*ts))?
            }
            (Self::MajorMinorVersion, Value::MajorMinor { major, minor }) => major * 100 + minor,
            _ => return Err(mismatch()),
        };
        Ok(vec![word])
    }

    /// Whether a value has the shape this kind decodes to.
    pub fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (Self::Celsius, Value::Celsius(_))
            | (Self::Kelvin, Value::Kelvin(_))
            | (Self::Pressure, Value::Pressure(_))
            | (Self::Voltage, Value::Voltage(_))
            | (Self::Energy, Value::Energy(_))
            | (Self::Power, Value::Power(_))
            | (Self::Percent2, Value::Percent(_))
            | (Self::Flow, Value::Flow(_))
            | (Self::Frequency, Value::Frequency(_))
            | (Self::Speed, Value::Speed(_))
            | (Self::Seconds, Value::Seconds(_))
            | (Self::Count, Value::Count(_))
            | (Self::Level, Value::Level(_))
            | (Self::Bool, Value::Bool(_))
            | (Self::OperationMode, Value::OperationMode(_))
            | (Self::SecOperationMode, Value::SecOperationMode(_))
            | (Self::HeatpumpCode, Value::HeatpumpCode(_))
            | (Self::BivalenceLevel, Value::BivalenceLevel(_))
            | (Self::StatusLine1 | Self::StatusLine2 | Self::StatusLine3, Value::StatusLine(_))
            | (Self::Icon, Value::Icon(_))
            | (Self::Errorcode, Value::Errorcode(_))
            | (Self::Switchoff, Value::Switchoff(_))
            | (Self::IPv4Address, Value::IPv4Address(_))
            | (Self::Version, Value::Version(_))
            | (Self::Timestamp, Value::Timestamp(_))
            | (Self::MajorMinorVersion, Value::MajorMinor { .. })
            | (Self::Unknown, Value::Unknown(_)) => true,
            (kind, Value::Unavailable) => kind.sentinel().is_some(),
            _ => false,
        }
    }

    fn scaled_of(self, value: &Value) -> Option<f64> {
        match (self, value) {
            (Self::Celsius, Value::Celsius(v))
            | (Self::Kelvin, Value::Kelvin(v))
            | (Self::Pressure, Value::Pressure(v))
            | (Self::Voltage, Value::Voltage(v))
            | (Self::Energy, Value::Energy(v))
            | (Self::Power, Value::Power(v))
            | (Self::Percent2, Value::Percent(v))
            | (Self::Flow, Value::Flow(v)) => Some(*v),
            _ => None,
        }
    }
}

impl serde::Serialize for DataType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.kind_name())
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind_name())
    }
}

/// An enumeration register: the raw code plus the label the schema knows
/// for it, if any. Codes introduced by newer firmware decode with no label
/// rather than failing the whole snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Coded {
    pub code: i32,
    pub label: Option<&'static str>,
}

impl Coded {
    pub(crate) fn new(code: i32, label: Option<&'static str>) -> Self {
        Self { code, label }
    }
}

impl std::fmt::Display for Coded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.label {
            Some(label) => f.write_str(label),
            None => write!(f, "unrecognized code {}", self.code),
        }
    }
}

/// One decoded telemetry value, tagged by kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Celsius(f64),
    Kelvin(f64),
    Pressure(f64),
    Voltage(f64),
    Energy(f64),
    Power(f64),
    Percent(f64),
    Flow(f64),
    Frequency(i32),
    Speed(i32),
    Seconds(i32),
    Count(i32),
    Level(i32),
    Bool(bool),
    OperationMode(Coded),
    SecOperationMode(Coded),
    HeatpumpCode(Coded),
    BivalenceLevel(Coded),
    StatusLine(Coded),
    Icon(Coded),
    Errorcode(Coded),
    Switchoff(Coded),
    IPv4Address(Ipv4Addr),
    Version(String),
    Timestamp(Option<jiff::Timestamp>),
    MajorMinor { major: i32, minor: i32 },
    Unknown(i32),
    /// A sentinel reading: the register reported "nothing connected here".
    Unavailable,
}

impl Value {
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Celsius(_) => "celsius",
            Self::Kelvin(_) => "kelvin",
            Self::Pressure(_) => "pressure",
            Self::Voltage(_) => "voltage",
            Self::Energy(_) => "energy",
            Self::Power(_) => "power",
            Self::Percent(_) => "percent",
            Self::Flow(_) => "flow",
            Self::Frequency(_) => "frequency",
            Self::Speed(_) => "speed",
            Self::Seconds(_) => "seconds",
            Self::Count(_) => "count",
            Self::Level(_) => "level",
            Self::Bool(_) => "bool",
            Self::OperationMode(_) => "operation mode",
            Self::SecOperationMode(_) => "sec operation mode",
            Self::HeatpumpCode(_) => "heatpump code",
            Self::BivalenceLevel(_) => "bivalence level",
            Self::StatusLine(_) => "status line",
            Self::Icon(_) => "icon",
            Self::Errorcode(_) => "errorcode",
            Self::Switchoff(_) => "switchoff",
            Self::IPv4Address(_) => "ipv4 address",
            Self::Version(_) => "version",
            Self::Timestamp(_) => "timestamp",
            Self::MajorMinor { .. } => "major.minor version",
            Self::Unknown(_) => "unknown",
            Self::Unavailable => "unavailable",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Celsius(v) => write!(f, "{v} °C"),
            Value::Kelvin(v) => write!(f, "{v} K"),
            Value::Pressure(v) => write!(f, "{v} bar"),
            Value::Voltage(v) => write!(f, "{v} V"),
            Value::Energy(v) => write!(f, "{v} kWh"),
            Value::Power(v) => write!(f, "{v} W"),
            Value::Percent(v) => write!(f, "{v} %"),
            Value::Flow(v) => write!(f, "{v} l/h"),
            Value::Frequency(v) => write!(f, "{v} Hz"),
            Value::Speed(v) => write!(f, "{v} rpm"),
            Value::Seconds(v) if *v >= 0 => {
                write!(f, "{}", humantime::format_duration(Duration::from_secs(*v as u64)))
            }
            Value::Seconds(v) => write!(f, "{v} s"),
            Value::Count(v) | Value::Level(v) | Value::Unknown(v) => write!(f, "{v}"),
            Value::Bool(flag) => write!(f, "{flag}"),
            Value::OperationMode(c)
            | Value::SecOperationMode(c)
            | Value::HeatpumpCode(c)
            | Value::BivalenceLevel(c)
            | Value::StatusLine(c)
            | Value::Icon(c)
            | Value::Errorcode(c)
            | Value::Switchoff(c) => write!(f, "{c}"),
            Value::IPv4Address(address) => write!(f, "{address}"),
            Value::Version(version) => f.write_str(version),
            Value::Timestamp(None) => f.write_str("never"),
            Value::Timestamp(Some(ts)) => write!(f, "{ts}"),
            Value::MajorMinor { major, minor } => write!(f, "{major}.{minor:02}"),
            Value::Unavailable => f.write_str("unavailable"),
        }
    }
}

impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Celsius(v)
            | Value::Kelvin(v)
            | Value::Pressure(v)
            | Value::Voltage(v)
            | Value::Energy(v)
            | Value::Power(v)
            | Value::Percent(v)
            | Value::Flow(v) => serializer.serialize_f64(*v),
            Value::Frequency(v)
            | Value::Speed(v)
            | Value::Seconds(v)
            | Value::Count(v)
            | Value::Level(v)
            | Value::Unknown(v) => serializer.serialize_i32(*v),
            Value::Bool(flag) => serializer.serialize_bool(*flag),
            Value::OperationMode(c)
            | Value::SecOperationMode(c)
            | Value::HeatpumpCode(c)
            | Value::BivalenceLevel(c)
            | Value::StatusLine(c)
            | Value::Icon(c)
            | Value::Errorcode(c)
            | Value::Switchoff(c) => match c.label {
                Some(label) => serializer.serialize_str(label),
                None => serializer.serialize_i32(c.code),
            },
            Value::IPv4Address(address) => serializer.collect_str(address),
            Value::Version(version) => serializer.serialize_str(version),
            Value::Timestamp(None) | Value::Unavailable => serializer.serialize_none(),
            Value::Timestamp(Some(ts)) => serializer.collect_str(ts),
            Value::MajorMinor { .. } => serializer.collect_str(self),
        }
    }
}

/// Build the firmware version string out of its per-character registers.
///
/// Each register contributes its low byte. NUL padding is dropped, runs of
/// whitespace collapse to a single space and both ends are trimmed.
fn assemble_version(raw: &[i32]) -> String {
    let mut characters = String::with_capacity(raw.len());
    for &word in raw {
        let byte = (word & 0xFF) as u8;
        if byte.is_ascii_graphic() || byte == b' ' {
            characters.push(char::from(byte));
        }
    }
    let mut version = String::with_capacity(characters.len());
    for part in characters.split_whitespace() {
        if !version.is_empty() {
            version.push(' ');
        }
        version.push_str(part);
    }
    version
}

mod labels {
    pub(super) fn operation_mode(code: i32) -> Option<&'static str> {
        Some(match code {
            0 => "heating",
            1 => "hot water",
            2 => "swimming pool/solar",
            3 => "evu",
            4 => "defrost",
            5 => "no request",
            6 => "heating external source",
            7 => "cooling",
            _ => return None,
        })
    }

    pub(super) fn sec_operation_mode(code: i32) -> Option<&'static str> {
        Some(match code {
            0 => "off",
            1 => "cooling",
            2 => "heating",
            3 => "fault",
            4 => "transition",
            5 => "defrost",
            6 => "waiting",
            7 => "waiting",
            8 => "transition",
            9 => "stop",
            10 => "manual",
            11 => "simulation start",
            12 => "evu lock",
            _ => return None,
        })
    }

    pub(super) fn heatpump_model(code: i32) -> Option<&'static str> {
        Some(match code {
            0 => "ERC",
            1 => "SW1",
            2 => "SW2",
            3 => "WW1",
            4 => "WW2",
            5 => "L1I",
            6 => "L2I",
            7 => "L1A",
            8 => "L2A",
            9 => "KSW",
            10 => "KLW",
            11 => "SWC",
            12 => "LWC",
            13 => "L2G",
            14 => "WZS",
            15 => "L1I407",
            16 => "L2I407",
            17 => "L1A407",
            18 => "L2A407",
            19 => "L2G407",
            20 => "LWC407",
            21 => "L1AREV",
            22 => "L2AREV",
            23 => "WWC1",
            24 => "WWC2",
            25 => "L2G404",
            26 => "WZW",
            27 => "L1S",
            28 => "L1H",
            29 => "L2H",
            30 => "WZWD",
            31 => "ERC",
            40 => "WWB_20",
            41 => "LD5",
            42 => "LD7",
            _ => return None,
        })
    }

    pub(super) fn bivalence_level(code: i32) -> Option<&'static str> {
        Some(match code {
            1 => "one compressor allowed to run",
            2 => "two compressors allowed to run",
            3 => "additional compressor allowed",
            _ => return None,
        })
    }

    pub(super) fn status_line_1(code: i32) -> Option<&'static str> {
        Some(match code {
            0 => "heatpump running",
            1 => "heatpump idle",
            2 => "heatpump coming",
            3 => "errorcode slot 0",
            4 => "defrost",
            5 => "waiting on LIN connection",
            6 => "compressor heating up",
            7 => "pump forerun",
            _ => return None,
        })
    }

    pub(super) fn status_line_2(code: i32) -> Option<&'static str> {
        Some(match code {
            0 => "since",
            1 => "in",
            _ => return None,
        })
    }

    pub(super) fn status_line_3(code: i32) -> Option<&'static str> {
        Some(match code {
            0 => "heating",
            1 => "no request",
            2 => "grid switch on delay",
            3 => "cycle lock",
            4 => "lock time",
            5 => "domestic water",
            6 => "info bake out program",
            7 => "defrost",
            8 => "pump forerun",
            9 => "thermal desinfection",
            10 => "cooling",
            12 => "swimming pool/solar",
            13 => "heating external energy source",
            14 => "domestic water external energy source",
            16 => "flow monitoring",
            17 => "second heat generator 1 active",
            _ => return None,
        })
    }

    // Heating-circuit symbol codes shown by the controller display. To be
    // confirmed against further device captures.
    pub(super) fn icon(code: i32) -> Option<&'static str> {
        Some(match code {
            0 => "off",
            1 => "automatic",
            2 => "party",
            3 => "holidays",
            4 => "second heat generator",
            5 => "cooling",
            _ => return None,
        })
    }

    pub(super) fn errorcode(code: i32) -> Option<&'static str> {
        Some(match code {
            701 => "low pressure fault",
            702 => "low pressure lockout",
            703 => "frost protection",
            704 => "hot gas fault",
            705 => "motor protection VEN",
            706 => "motor protection BSP",
            707 => "coding heat pump",
            708 => "return flow sensor",
            709 => "flow sensor",
            710 => "hot gas sensor",
            711 => "outside temperature sensor",
            712 => "hot water sensor",
            713 => "heat source inlet sensor",
            714 => "hot gas hot water",
            715 => "high pressure switch-off",
            716 => "high pressure fault",
            717 => "flow rate",
            718 => "max outside temperature",
            719 => "min outside temperature",
            720 => "heat source min temperature",
            721 => "low pressure switch-off",
            722 => "temperature spread heating",
            723 => "temperature spread domestic water",
            724 => "temperature spread defrost",
            725 => "fault domestic water",
            726 => "mixing circuit 1 sensor",
            727 => "brine pressure",
            728 => "heat source outlet sensor",
            729 => "rotation field error",
            730 => "power limitation",
            _ => return None,
        })
    }

    pub(super) fn switchoff(code: i32) -> Option<&'static str> {
        Some(match code {
            1 => "heatpump error",
            2 => "system error",
            3 => "evu lock",
            4 => "operation mode second heat generator",
            5 => "air defrost",
            6 => "maximal usage temperature",
            7 => "minimal usage temperature",
            8 => "lower usage limit",
            9 => "no request",
            11 => "flow rate",
            19 => "PV max",
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenths_scaling_is_exact() {
        assert_eq!(DataType::Celsius.decode(&[237]).unwrap(), Value::Celsius(23.7));
        assert_eq!(DataType::Celsius.decode(&[-45]).unwrap(), Value::Celsius(-4.5));
        assert_eq!(DataType::Voltage.decode(&[237]).unwrap(), Value::Voltage(23.7));
        assert_eq!(DataType::Pressure.decode(&[1520]).unwrap(), Value::Pressure(15.2));
        assert_eq!(DataType::Percent2.decode(&[85]).unwrap(), Value::Percent(42.5));
    }

    #[test]
    fn probe_absent_sentinel_is_not_a_reading() {
        assert_eq!(DataType::Voltage.decode(&[PROBE_ABSENT]).unwrap(), Value::Unavailable);
        assert_eq!(DataType::Voltage.encode(&Value::Unavailable).unwrap(), vec![PROBE_ABSENT]);
        // Temperatures have no sentinel: -0.1 °C is a legitimate reading.
        assert_eq!(DataType::Celsius.decode(&[-1]).unwrap(), Value::Celsius(-0.1));
        assert!(DataType::Celsius.encode(&Value::Unavailable).is_err());
    }

    #[test]
    fn flags_reject_anything_but_zero_and_one() {
        assert_eq!(DataType::Bool.decode(&[0]).unwrap(), Value::Bool(false));
        assert_eq!(DataType::Bool.decode(&[1]).unwrap(), Value::Bool(true));
        assert!(matches!(DataType::Bool.decode(&[2]), Err(DecodeError::Flag(2))));
    }

    #[test]
    fn address_octets_are_msb_first() {
        let value = DataType::IPv4Address.decode(&[0xC0A80101u32 as i32]).unwrap();
        assert_eq!(value, Value::IPv4Address(Ipv4Addr::new(192, 168, 1, 1)));
        assert_eq!(
            DataType::IPv4Address.encode(&value).unwrap(),
            vec![0xC0A80101u32 as i32],
        );
    }

    #[test]
    fn version_string_is_trimmed() {
        let raw: Vec<i32> = "V1  2  03"
            .bytes()
            .map(i32::from)
            .chain(std::iter::once(0))
            .collect();
        assert_eq!(raw.len(), 10);
        assert_eq!(DataType::Version.decode(&raw).unwrap(), Value::Version("V1 2 03".into()));

        let nul_padded: Vec<i32> =
            "V3.86.0".bytes().map(i32::from).chain([0, 0, 0]).collect();
        assert_eq!(
            DataType::Version.decode(&nul_padded).unwrap(),
            Value::Version("V3.86.0".into()),
        );
    }

    #[test]
    fn version_is_never_written_back() {
        assert!(matches!(
            DataType::Version.encode(&Value::Version("V3.86.0".into())),
            Err(EncodeError::Unsupported(DataType::Version)),
        ));
    }

    #[test]
    fn unrecognized_enumeration_codes_degrade() {
        let Value::OperationMode(coded) = DataType::OperationMode.decode(&[99]).unwrap() else {
            panic!("wrong value kind");
        };
        assert_eq!(coded.code, 99);
        assert_eq!(coded.label, None);
        assert_eq!(coded.to_string(), "unrecognized code 99");

        let Value::OperationMode(known) = DataType::OperationMode.decode(&[2]).unwrap() else {
            panic!("wrong value kind");
        };
        assert_eq!(known.to_string(), "swimming pool/solar");
    }

    #[test]
    fn opaque_kind_accepts_anything() {
        for raw in [i32::MIN, -1, 0, 1, i32::MAX] {
            let value = DataType::Unknown.decode(&[raw]).unwrap();
            assert_eq!(value, Value::Unknown(raw));
            assert_eq!(value.to_string(), raw.to_string());
        }
    }

    #[test]
    fn zero_timestamp_means_never() {
        assert_eq!(DataType::Timestamp.decode(&[0]).unwrap(), Value::Timestamp(None));
        assert_eq!(DataType::Timestamp.decode(&[0]).unwrap().to_string(), "never");
        let decoded = DataType::Timestamp.decode(&[1675000000]).unwrap();
        assert_eq!(DataType::Timestamp.encode(&decoded).unwrap(), vec![1675000000]);
    }

    #[test]
    fn major_minor_split() {
        let value = DataType::MajorMinorVersion.decode(&[203]).unwrap();
        assert_eq!(value, Value::MajorMinor { major: 2, minor: 3 });
        assert_eq!(value.to_string(), "2.03");
        assert_eq!(DataType::MajorMinorVersion.encode(&value).unwrap(), vec![203]);
    }

    #[test]
    fn decode_checks_the_register_window() {
        assert!(matches!(
            DataType::Celsius.decode(&[1, 2]),
            Err(DecodeError::Width { expected: 1, actual: 2 }),
        ));
        assert!(matches!(
            DataType::Version.decode(&[86; 4]),
            Err(DecodeError::Width { expected: 10, actual: 4 }),
        ));
    }

    #[test]
    fn encode_rejects_mismatched_values() {
        assert!(matches!(
            DataType::Celsius.encode(&Value::Bool(true)),
            Err(EncodeError::TypeMismatch { expected: DataType::Celsius, found: "bool" }),
        ));
        assert!(matches!(
            DataType::Seconds.encode(&Value::Count(5)),
            Err(EncodeError::TypeMismatch { .. }),
        ));
    }

    #[test]
    fn round_trips() {
        let cases = [
            (DataType::Celsius, vec![237]),
            (DataType::Celsius, vec![-45]),
            (DataType::Kelvin, vec![30]),
            (DataType::Pressure, vec![1520]),
            (DataType::Voltage, vec![-1]),
            (DataType::Energy, vec![123456]),
            (DataType::Power, vec![8450]),
            (DataType::Percent2, vec![85]),
            (DataType::Flow, vec![1200]),
            (DataType::Frequency, vec![66]),
            (DataType::Speed, vec![2800]),
            (DataType::Seconds, vec![3602]),
            (DataType::Count, vec![42]),
            (DataType::Level, vec![3]),
            (DataType::Bool, vec![1]),
            (DataType::OperationMode, vec![7]),
            (DataType::OperationMode, vec![99]),
            (DataType::SecOperationMode, vec![2]),
            (DataType::HeatpumpCode, vec![12]),
            (DataType::BivalenceLevel, vec![1]),
            (DataType::StatusLine1, vec![0]),
            (DataType::StatusLine2, vec![1]),
            (DataType::StatusLine3, vec![9]),
            (DataType::Icon, vec![2]),
            (DataType::Errorcode, vec![717]),
            (DataType::Switchoff, vec![3]),
            (DataType::IPv4Address, vec![0xC0A80101u32 as i32]),
            (DataType::Timestamp, vec![0]),
            (DataType::Timestamp, vec![1675000000]),
            (DataType::MajorMinorVersion, vec![203]),
            (DataType::Unknown, vec![-77]),
        ];
        for (data_type, raw) in cases {
            let value = data_type.decode(&raw).unwrap();
            let encoded = data_type.encode(&value).unwrap();
            assert_eq!(encoded, raw, "{data_type} should round-trip {raw:?}");
            assert_eq!(data_type.decode(&encoded).unwrap(), value);
        }
    }

    #[test]
    fn seconds_format_as_durations() {
        assert_eq!(DataType::Seconds.decode(&[3602]).unwrap().to_string(), "1h 2s");
        assert_eq!(DataType::Seconds.decode(&[0]).unwrap().to_string(), "0s");
    }
}
