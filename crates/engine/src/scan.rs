//! Window scan: walk an ephemeris forward and keep the events every
//! constraint accepts.

use thiserror::Error;
use tracing::{debug, warn};
use transit_core::JulianDate;

use crate::constraints::{Constraint, Probe, all_hold};
use crate::ephemeris::{CoverageMode, Ephemeris, Event};
use crate::error::InputError;
use crate::observer::Observer;
use crate::target::Target;

#[derive(Debug, Error, PartialEq)]
pub enum WindowError {
    #[error("window end {end} precedes its start {start}")]
    Reversed { start: JulianDate, end: JulianDate },
    #[error("window bounds must be finite")]
    NotFinite,
}

/// Closed interval `[start, end]` in UTC Julian days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationWindow {
    start: JulianDate,
    end: JulianDate,
}

impl ObservationWindow {
    pub fn new(start: JulianDate, end: JulianDate) -> Result<Self, WindowError> {
        if !start.days().is_finite() || !end.days().is_finite() {
            return Err(WindowError::NotFinite);
        }
        if end < start {
            return Err(WindowError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> JulianDate {
        self.start
    }

    pub fn end(&self) -> JulianDate {
        self.end
    }

    pub fn contains(&self, t: JulianDate) -> bool {
        self.start <= t && t <= self.end
    }

    pub fn span_days(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanOptions {
    n_events: usize,
    mode: CoverageMode,
}

impl ScanOptions {
    pub fn new(n_events: usize, mode: CoverageMode) -> Result<Self, InputError> {
        if n_events == 0 {
            return Err(InputError::EventCount);
        }
        Ok(Self { n_events, mode })
    }

    /// Number of events generated from the window start.
    pub fn n_events(&self) -> usize {
        self.n_events
    }

    pub fn mode(&self) -> CoverageMode {
        self.mode
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            n_events: 100,
            mode: CoverageMode::Midpoint,
        }
    }
}

/// Everything one scan needs, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct ScanRequest<'a> {
    pub ephemeris: &'a Ephemeris,
    pub observer: &'a Observer,
    pub target: &'a Target,
    pub constraints: &'a [Constraint],
    pub window: ObservationWindow,
    pub options: ScanOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// No generated event passed the constraints.
    NoObservableEvent,
    /// Nothing observable inside the window; this is the first observable event after it.
    NextAfterWindow(Event),
    /// Observable events inside the window, in cycle order.
    Observable(Vec<Event>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub outcome: ScanOutcome,
    pub mode: CoverageMode,
    pub window: ObservationWindow,
    /// Events generated from the window start.
    pub generated: usize,
    /// Observable events among those generated, inside or past the window.
    pub observable_total: usize,
    /// The last generated event fell before the window end.
    pub horizon_short: bool,
}

impl ScanResult {
    /// Observable events inside the window; empty for the other outcomes.
    pub fn events(&self) -> &[Event] {
        match &self.outcome {
            ScanOutcome::Observable(events) => events,
            _ => &[],
        }
    }

    /// Human-readable report line(s).
    pub fn summary(&self, target_name: &str, site_name: &str) -> String {
        let noun = self.mode.noun();
        let start = self.window.start().format_iso();
        let end = self.window.end().format_iso();
        match &self.outcome {
            ScanOutcome::NoObservableEvent => format!(
                "{target_name}: No observable {noun} from {site_name} between {start} & {end}"
            ),
            ScanOutcome::NextAfterWindow(event) => format!(
                "{target_name}: Next observable event from {site_name} is on {}",
                event.midpoint.format_iso()
            ),
            ScanOutcome::Observable(events) => {
                let mut text = format!(
                    "{target_name}: {} observable {noun}s from {site_name} between {start} & {end}",
                    events.len()
                );
                for event in events {
                    text.push('\n');
                    text.push_str(&event.midpoint.format_iso());
                }
                text
            }
        }
    }
}

/// Scan the next `n_events` events from the window start.
///
/// Events whose bound falls inside the window and that pass every constraint
/// are returned; otherwise the first observable event past the window is
/// reported, or none at all.
pub fn scan(request: &ScanRequest<'_>) -> ScanResult {
    let mode = request.options.mode();
    let window = request.window;
    let events = request
        .ephemeris
        .next_events(window.start(), request.options.n_events(), mode);

    let mut generated = 0;
    let mut last_bound = None;
    let mut inside = Vec::new();
    let mut first_after = None;
    let mut observable_total = 0;

    for event in events {
        generated += 1;
        last_bound = Some(event.bound(mode));
        let checked = Probe::for_event(&event, mode);
        if !all_hold(request.constraints, request.observer, request.target, checked) {
            continue;
        }
        observable_total += 1;
        if event.bound(mode) <= window.end() {
            inside.push(event);
        } else if first_after.is_none() {
            first_after = Some(event);
        }
    }

    let horizon_short = last_bound.is_some_and(|bound| bound < window.end());
    if horizon_short {
        warn!(
            planet = request.target.name(),
            generated,
            window_end = %window.end(),
            "generated events end before the window closes; raise the event count to cover it"
        );
    }

    let outcome = if !inside.is_empty() {
        ScanOutcome::Observable(inside)
    } else if let Some(event) = first_after {
        ScanOutcome::NextAfterWindow(event)
    } else {
        ScanOutcome::NoObservableEvent
    };

    let in_window = match &outcome {
        ScanOutcome::Observable(events) => events.len(),
        _ => 0,
    };
    debug!(
        planet = request.target.name(),
        site = request.observer.name(),
        generated,
        observable_total,
        in_window,
        "scan finished"
    );

    ScanResult {
        outcome,
        mode,
        window,
        generated,
        observable_total,
        horizon_short,
    }
}
