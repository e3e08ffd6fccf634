//! Synthetic provider that moves along a straight line.
//!
//! The simulated receiver travels from an origin along a fixed bearing,
//! following a [`SpeedProfile`]. Each request completes after the configured
//! update interval with the position reached by then. Optional periodic
//! dropouts complete with [`Completion::Timeout`] after the update timeout,
//! which exercises the poller's lost/restored transitions.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;
use tokio::time::Instant;

use super::{
    BoxFuture, Capabilities, Completion, ModuleInfo, PositionProvider, ProviderError,
    UpdateOptions,
};
use crate::fix::{CourseInfo, Coordinate, FixDetail, FixShape, PositionFix, SatelliteInfo};

/// A stretch of constant speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedSegment {
    /// Ground speed in metres per second.
    pub speed_mps: f64,
    pub duration: Duration,
}

/// Errors parsing a speed profile string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileParseError {
    #[error("empty speed profile")]
    Empty,

    #[error("invalid segment '{segment}': expected SPEED@SECONDS")]
    InvalidSegment { segment: String },
}

/// Piecewise-constant speed over time.
///
/// After the last segment ends the last speed is held.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedProfile {
    segments: Vec<SpeedSegment>,
}

impl SpeedProfile {
    /// Constant speed forever.
    pub fn constant(speed_mps: f64) -> Self {
        Self {
            segments: vec![SpeedSegment {
                speed_mps,
                duration: Duration::MAX,
            }],
        }
    }

    /// Build from explicit segments. An empty list means standing still.
    pub fn new(segments: Vec<SpeedSegment>) -> Self {
        if segments.is_empty() {
            return Self::constant(0.0);
        }
        Self { segments }
    }

    /// Speed at `elapsed` since the start.
    pub fn speed_at(&self, elapsed: Duration) -> f64 {
        let mut remaining = elapsed;
        for segment in &self.segments {
            if remaining < segment.duration {
                return segment.speed_mps;
            }
            remaining -= segment.duration;
        }
        self.segments.last().map_or(0.0, |s| s.speed_mps)
    }

    /// Distance travelled (metres) after `elapsed`.
    pub fn distance_at(&self, elapsed: Duration) -> f64 {
        let mut remaining = elapsed;
        let mut distance = 0.0;
        for segment in &self.segments {
            let span = remaining.min(segment.duration);
            distance += segment.speed_mps * span.as_secs_f64();
            remaining -= span;
            if remaining.is_zero() {
                return distance;
            }
        }
        let last_speed = self.segments.last().map_or(0.0, |s| s.speed_mps);
        distance + last_speed * remaining.as_secs_f64()
    }
}

impl FromStr for SpeedProfile {
    type Err = ProfileParseError;

    /// Parse `SPEED@SECONDS[,SPEED@SECONDS...]`, e.g. `0@20,8.5@60,30@60`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ProfileParseError::Empty);
        }

        let segments = s
            .split(',')
            .map(|raw| {
                let invalid = || ProfileParseError::InvalidSegment {
                    segment: raw.trim().to_string(),
                };
                let (speed, secs) = raw.trim().split_once('@').ok_or_else(invalid)?;
                let speed_mps: f64 = speed.trim().parse().map_err(|_| invalid())?;
                let secs: f64 = secs.trim().parse().map_err(|_| invalid())?;
                if !speed_mps.is_finite() || speed_mps < 0.0 || !secs.is_finite() || secs <= 0.0 {
                    return Err(invalid());
                }
                let duration = Duration::try_from_secs_f64(secs).map_err(|_| invalid())?;
                Ok(SpeedSegment {
                    speed_mps,
                    duration,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }
}

/// Simulated positioning module.
#[derive(Debug)]
pub struct SimulatedProvider {
    origin: Coordinate,
    bearing_deg: f64,
    profile: SpeedProfile,
    capabilities: Capabilities,
    options: UpdateOptions,
    dropout_every: Option<u32>,
    requests: u32,
    /// Set on the first request.
    epoch: Option<(Instant, DateTime<Utc>)>,
}

impl SimulatedProvider {
    pub fn new(origin: Coordinate, bearing_deg: f64, profile: SpeedProfile) -> Self {
        Self {
            origin,
            bearing_deg,
            profile,
            capabilities: Capabilities::all(),
            options: UpdateOptions::default(),
            dropout_every: None,
            requests: 0,
            epoch: None,
        }
    }

    /// Time out every `n`th request (0 disables dropouts).
    pub fn with_dropout_every(mut self, n: u32) -> Self {
        self.dropout_every = (n > 0).then_some(n);
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Options most recently applied by the poller.
    pub fn options(&self) -> &UpdateOptions {
        &self.options
    }

    fn detail_for(&self, shape: FixShape, speed_mps: f64) -> FixDetail {
        let course = CourseInfo {
            speed_mps: Some(speed_mps as f32),
            heading_deg: Some(self.bearing_deg as f32),
        };
        match shape {
            FixShape::Basic => FixDetail::Basic,
            FixShape::Course => FixDetail::Course(course),
            FixShape::Satellite => FixDetail::Satellite(SatelliteInfo {
                course,
                satellites_in_view: 11,
                satellites_used: 8,
                hdop: Some(0.9),
                vdop: Some(1.4),
                tdop: Some(1.5),
            }),
        }
    }
}

impl PositionProvider for SimulatedProvider {
    fn module_info(&self) -> ModuleInfo {
        ModuleInfo {
            name: "simulated".to_string(),
            capabilities: self.capabilities,
        }
    }

    fn configure(&mut self, options: &UpdateOptions) -> Result<(), ProviderError> {
        self.options = *options;
        Ok(())
    }

    fn request_fix(&mut self, shape: FixShape) -> BoxFuture<'_, Completion> {
        self.requests = self.requests.wrapping_add(1);
        let (started, started_utc) = *self.epoch.get_or_insert_with(|| (Instant::now(), Utc::now()));
        let dropout = self
            .dropout_every
            .is_some_and(|n| self.requests % n == 0);
        let options = self.options;
        let this = &*self;

        Box::pin(async move {
            if dropout {
                tokio::time::sleep(options.update_timeout()).await;
                return Completion::Timeout;
            }

            tokio::time::sleep(options.update_interval()).await;

            let elapsed = started.elapsed();
            let timestamp = started_utc
                + TimeDelta::from_std(elapsed).unwrap_or(TimeDelta::zero());
            let coordinate = this
                .origin
                .destination(this.bearing_deg, this.profile.distance_at(elapsed));
            let speed = this.profile.speed_at(elapsed);

            Completion::Success(
                PositionFix::at(timestamp, coordinate)
                    .with_altitude(25.0)
                    .with_detail(this.detail_for(shape, speed)),
            )
        })
    }

    fn cancel(&mut self) {
        tracing::trace!(requests = self.requests, "Simulated request cancelled");
    }
}
