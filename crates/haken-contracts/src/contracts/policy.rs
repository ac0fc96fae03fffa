use serde::{Deserialize, Serialize};

const DEFAULT_EXPIRY_HORIZON_DAYS: u32 = 30;
// 労働者派遣法第40条の2: three years per organisational unit.
const DEFAULT_MAX_DISPATCH_DAYS: u32 = 365 * 3;
const DEFAULT_DAILY_OVERTIME_HOURS: f64 = 4.0;
// 36協定 monthly ceiling.
const DEFAULT_MONTHLY_OVERTIME_HOURS: f64 = 45.0;
const DEFAULT_MINIMUM_HOURLY_RATE: u32 = 900;

/// Statutory thresholds applied by the terms checker and the audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    pub expiry_horizon_days: u32,
    pub max_dispatch_days: u32,
    pub daily_overtime_limit_hours: f64,
    pub monthly_overtime_limit_hours: f64,
    pub minimum_hourly_rate: u32,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            expiry_horizon_days: DEFAULT_EXPIRY_HORIZON_DAYS,
            max_dispatch_days: DEFAULT_MAX_DISPATCH_DAYS,
            daily_overtime_limit_hours: DEFAULT_DAILY_OVERTIME_HOURS,
            monthly_overtime_limit_hours: DEFAULT_MONTHLY_OVERTIME_HOURS,
            minimum_hourly_rate: DEFAULT_MINIMUM_HOURLY_RATE,
        }
    }
}

impl ValidationPolicy {
    pub fn dispatch_cap_days(&self) -> i64 {
        i64::from(self.max_dispatch_days)
    }

    pub fn horizon_days(&self) -> i64 {
        i64::from(self.expiry_horizon_days)
    }
}
