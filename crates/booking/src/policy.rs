//! Tunable booking limits.

use anyhow::Context;
use chrono::Duration;
use serde::{Deserialize, Serialize};

use voyage_core::{NonEmpty, Validation, combine4};

/// Business limits applied by booking transitions.
///
/// Deserialization fills missing fields with defaults and then runs
/// [`BookingPolicy::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PolicyFields")]
pub struct BookingPolicy {
    /// Time a pending booking has to be paid.
    pub payment_window_minutes: u32,
    /// Time after confirmation during which a booking can still be cancelled.
    pub cancellation_window_hours: u32,
    pub no_show_penalty_percent: u32,
    pub max_items: u32,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            payment_window_minutes: 30,
            cancellation_window_hours: 24,
            no_show_penalty_percent: 30,
            max_items: 10,
        }
    }
}

/// Unchecked wire form of [`BookingPolicy`].
#[derive(Deserialize)]
#[serde(default)]
struct PolicyFields {
    payment_window_minutes: u32,
    cancellation_window_hours: u32,
    no_show_penalty_percent: u32,
    max_items: u32,
}

impl Default for PolicyFields {
    fn default() -> Self {
        let defaults = BookingPolicy::default();
        Self {
            payment_window_minutes: defaults.payment_window_minutes,
            cancellation_window_hours: defaults.cancellation_window_hours,
            no_show_penalty_percent: defaults.no_show_penalty_percent,
            max_items: defaults.max_items,
        }
    }
}

impl TryFrom<PolicyFields> for BookingPolicy {
    type Error = String;

    fn try_from(fields: PolicyFields) -> Result<Self, Self::Error> {
        BookingPolicy {
            payment_window_minutes: fields.payment_window_minutes,
            cancellation_window_hours: fields.cancellation_window_hours,
            no_show_penalty_percent: fields.no_show_penalty_percent,
            max_items: fields.max_items,
        }
        .validate()
        .map_err(|errors| format!("invalid booking policy: {}", errors.as_slice().join("; ")))
    }
}

impl BookingPolicy {
    pub fn payment_window(&self) -> Duration {
        Duration::minutes(i64::from(self.payment_window_minutes))
    }

    pub fn cancellation_window(&self) -> Duration {
        Duration::hours(i64::from(self.cancellation_window_hours))
    }

    /// Build a policy from `VOYAGE_*` environment variables.
    ///
    /// Unset variables keep their default; set but unparsable ones are an
    /// error, as is a combination that fails [`BookingPolicy::validate`].
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`BookingPolicy::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str, default: u32| -> anyhow::Result<u32> {
            match lookup(key) {
                None => Ok(default),
                Some(raw) => raw
                    .trim()
                    .parse::<u32>()
                    .with_context(|| format!("{key} must be a non-negative integer, got {raw:?}")),
            }
        };

        let policy = Self {
            payment_window_minutes: read(
                "VOYAGE_PAYMENT_WINDOW_MINUTES",
                defaults.payment_window_minutes,
            )?,
            cancellation_window_hours: read(
                "VOYAGE_CANCELLATION_WINDOW_HOURS",
                defaults.cancellation_window_hours,
            )?,
            no_show_penalty_percent: read(
                "VOYAGE_NO_SHOW_PENALTY_PERCENT",
                defaults.no_show_penalty_percent,
            )?,
            max_items: read("VOYAGE_MAX_ITEMS", defaults.max_items)?,
        };

        policy.validate().map_err(|errors| {
            anyhow::anyhow!("invalid booking policy: {}", errors.as_slice().join("; "))
        })
    }

    /// Check every field, reporting all problems at once.
    pub fn validate(self) -> Result<Self, NonEmpty<String>> {
        combine4(
            Validation::ensure(
                self.payment_window_minutes,
                self.payment_window_minutes > 0,
                || "payment window must be at least one minute".to_string(),
            ),
            Validation::ensure(
                self.cancellation_window_hours,
                self.cancellation_window_hours > 0,
                || "cancellation window must be at least one hour".to_string(),
            ),
            Validation::ensure(
                self.no_show_penalty_percent,
                self.no_show_penalty_percent <= 100,
                || {
                    format!(
                        "no-show penalty must be at most 100%, got {}%",
                        self.no_show_penalty_percent
                    )
                },
            ),
            Validation::ensure(self.max_items, self.max_items > 0, || {
                "at least one item per booking must be allowed".to_string()
            }),
            |payment_window_minutes, cancellation_window_hours, no_show_penalty_percent, max_items| {
                Self {
                    payment_window_minutes,
                    cancellation_window_hours,
                    no_show_penalty_percent,
                    max_items,
                }
            },
        )
        .to_result()
    }
}
