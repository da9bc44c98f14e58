use crate::domain::RuntimeConfig;
use crate::use_cases::LoopSettings;
use std::{env, str::FromStr, time::Duration};

// Runtime constants (not gameplay tuning). Unset or malformed variables fall back to these.

pub const DEFAULT_TICK_RATE_HZ: u32 = 60;
pub const MAX_TICK_RATE_HZ: u32 = 1_000_000_000;
pub const DEFAULT_COLLISION_ITERATIONS: u32 = 1;
pub const DEFAULT_COLLISION_EPSILON: f32 = 0.4;
pub const SNAPSHOT_CHANNEL_CAPACITY: usize = 128;
pub const COMMAND_CHANNEL_CAPACITY: usize = 1024;

fn env_or<T: FromStr>(key: &str, default: T, valid: impl Fn(&T) -> bool) -> T {
    parse_or(env::var(key).ok().as_deref(), default, valid)
}

fn parse_or<T: FromStr>(value: Option<&str>, default: T, valid: impl Fn(&T) -> bool) -> T {
    value
        .and_then(|v| v.trim().parse::<T>().ok())
        .filter(|v| valid(v))
        .unwrap_or(default)
}

pub fn tick_rate_hz() -> u32 {
    env_or("TICK_RATE_HZ", DEFAULT_TICK_RATE_HZ, |hz| (1..=MAX_TICK_RATE_HZ).contains(hz))
}

pub fn tick_interval() -> Duration {
    interval_for_rate(tick_rate_hz())
}

/// Fixed step length for a tick rate in hertz, never shorter than 1ns.
pub fn interval_for_rate(hz: u32) -> Duration {
    Duration::from_nanos((1_000_000_000 / u64::from(hz.max(1))).max(1))
}

pub fn collision_iterations() -> u32 {
    env_or("COLLISION_ITERATIONS", DEFAULT_COLLISION_ITERATIONS, |n| *n > 0)
}

pub fn collision_epsilon() -> f32 {
    env_or("COLLISION_EPSILON", DEFAULT_COLLISION_EPSILON, |eps| {
        eps.is_finite() && *eps >= 0.0
    })
}

pub fn snapshot_channel_capacity() -> usize {
    env_or("SNAPSHOT_CHANNEL_CAPACITY", SNAPSHOT_CHANNEL_CAPACITY, |n| *n > 0)
}

pub fn command_channel_capacity() -> usize {
    env_or("COMMAND_CHANNEL_CAPACITY", COMMAND_CHANNEL_CAPACITY, |n| *n > 0)
}

/// Steps to run before exiting; 0 runs until Ctrl-C.
pub fn max_ticks() -> u64 {
    env_or("MAX_TICKS", 0, |_| true)
}

pub fn runtime_config() -> RuntimeConfig {
    RuntimeConfig {
        collision_iterations: collision_iterations(),
        collision_epsilon: collision_epsilon(),
    }
}

pub fn loop_settings() -> LoopSettings {
    LoopSettings {
        command_channel_capacity: command_channel_capacity(),
        snapshot_channel_capacity: snapshot_channel_capacity(),
        tick_interval: tick_interval(),
        max_ticks: max_ticks(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_value_is_missing_or_malformed_then_default_is_used() {
        assert_eq!(parse_or::<u32>(None, 60, |_| true), 60);
        assert_eq!(parse_or::<u32>(Some("fast"), 60, |_| true), 60);
        assert_eq!(parse_or::<u32>(Some(" 30 "), 60, |_| true), 30);
    }

    #[test]
    fn when_value_fails_validation_then_default_is_used() {
        assert_eq!(parse_or::<u32>(Some("0"), 60, |hz| *hz > 0), 60);
        assert_eq!(
            parse_or::<f32>(Some("-1.0"), 0.4, |eps| *eps >= 0.0),
            0.4
        );
    }

    #[test]
    fn when_converting_rate_then_interval_is_its_reciprocal() {
        assert_eq!(interval_for_rate(50), Duration::from_millis(20));
        assert_eq!(interval_for_rate(0), Duration::from_secs(1));
    }

    #[test]
    fn when_rate_exceeds_a_gigahertz_then_interval_stays_non_zero() {
        assert_eq!(interval_for_rate(u32::MAX), Duration::from_nanos(1));
        assert_eq!(
            parse_or::<u32>(Some("4000000000"), DEFAULT_TICK_RATE_HZ, |hz| {
                (1..=MAX_TICK_RATE_HZ).contains(hz)
            }),
            DEFAULT_TICK_RATE_HZ
        );
    }
}
