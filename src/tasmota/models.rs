use serde::Deserialize;

// ---------------------------------------------------------------------------
// Status 8 envelope
//
// `GET /cm?cmnd=Status 8` on a Tasmota power-monitoring plug answers with:
//
//   {
//     "StatusSNS": {
//       "Time": "2022-09-01T01:07:30",
//       "ENERGY": {
//         "TotalStartTime": "2020-12-11T16:15:26",
//         "Total": 1048.895,
//         "Yesterday": 0.923, "Today": 0.337,
//         "Power": 367, "ApparentPower": 507, "ReactivePower": 350,
//         "Factor": 0.72, "Voltage": 235, "Current": 2.156
//       }
//     }
//   }
//
// Every field we read is required; anything else is ignored.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    #[serde(rename = "StatusSNS")]
    pub status_sns: SensorStatus,
}

#[derive(Debug, Deserialize)]
pub struct SensorStatus {
    #[serde(rename = "Time")]
    pub time: String,

    #[serde(rename = "ENERGY")]
    pub energy: EnergyReading,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnergyReading {
    /// kWh, previous full day.
    pub yesterday: f64,
    /// kWh since local midnight.
    pub today: f64,
    pub power: i64,
    pub apparent_power: i64,
    pub reactive_power: i64,
    pub factor: f64,
    pub voltage: i64,
    pub current: f64,
}

// ---------------------------------------------------------------------------
// DeviceSnapshot
// ---------------------------------------------------------------------------

/// One complete set of measurements from a single successful poll.
///
/// Only ever built from a fully decoded [`StatusResponse`].
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSnapshot {
    /// Device-local measurement time, passed through as reported.
    pub timestamp: String,
    /// V
    pub voltage: i64,
    /// A
    pub current: f64,
    /// W, active power.
    pub power: i64,
    /// VA
    pub apparent_power: i64,
    /// var
    pub reactive_power: i64,
    pub power_factor: f64,
    /// kWh accumulated since local midnight.
    pub power_today: f64,
    /// kWh accumulated over the previous day.
    pub power_yesterday: f64,
}

impl From<StatusResponse> for DeviceSnapshot {
    fn from(resp: StatusResponse) -> Self {
        let SensorStatus { time, energy } = resp.status_sns;
        Self {
            timestamp: time,
            voltage: energy.voltage,
            current: energy.current,
            power: energy.power,
            apparent_power: energy.apparent_power,
            reactive_power: energy.reactive_power,
            power_factor: energy.factor,
            power_today: energy.today,
            power_yesterday: energy.yesterday,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
