//! Per-region check scheduling.
//!
//! Each region moves through `Idle -> Debouncing -> Requesting -> Idle`.
//! Every input event or forced check mints a fresh [`Generation`]; anything
//! carrying an older generation (a timer that was not cancelled in time, a
//! response that arrives late) is stale and must be dropped. Cancellation is
//! by invalidation: the network call is never aborted, its result is simply
//! refused on arrival.
//!
//! The scheduler owns no timers. The browser layer arms a timeout for the
//! generation returned by [`CheckScheduler::input`] and reports back through
//! [`CheckScheduler::fire`].

use std::collections::HashMap;

use web_time::Instant;

/// Stable identity of a registered region.
pub type RegionId = u64;

/// Monotonic token identifying one pending check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Whether live checks may start at all, derived from the settings snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckGate {
    Open,
    Closed,
}

impl CheckGate {
    pub fn from_bool(open: bool) -> Self {
        if open { CheckGate::Open } else { CheckGate::Closed }
    }
}

/// Handle for one in-flight analysis request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckTicket {
    pub region: RegionId,
    pub generation: Generation,
    /// Text snapshot the request was made for.
    pub text: String,
    issued_at: Instant,
}

impl CheckTicket {
    /// Milliseconds since the request was issued.
    pub fn elapsed_ms(&self) -> u128 {
        self.issued_at.elapsed().as_millis()
    }
}

/// Observable state of one region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CheckState {
    #[default]
    Idle,
    Debouncing(Generation),
    Requesting(Generation),
}

/// Result of a debounce timer firing (or a forced check).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FireOutcome {
    /// Go ahead and call the analysis service.
    Request(CheckTicket),
    /// Text was empty or whitespace; region returned to idle.
    Empty,
    /// A newer input superseded this timer.
    Stale,
}

/// Result of reporting a response back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// The response belongs to the newest check and may be applied.
    Current,
    /// The region moved on; discard the response.
    Stale,
}

#[derive(Debug, Default)]
struct RegionSlot {
    state: CheckState,
}

/// Debounce / in-flight bookkeeping for every region.
#[derive(Debug, Default)]
pub struct CheckScheduler {
    regions: HashMap<RegionId, RegionSlot>,
    next_generation: u64,
}

impl CheckScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn mint(&mut self) -> Generation {
        self.next_generation += 1;
        Generation(self.next_generation)
    }

    /// Record an input event. Returns the generation to arm a debounce timer
    /// for, or `None` when checks are gated off.
    ///
    /// Any earlier debounce or in-flight request for the region becomes stale.
    pub fn input(&mut self, region: RegionId, gate: CheckGate) -> Option<Generation> {
        if gate == CheckGate::Closed {
            return None;
        }
        let generation = self.mint();
        let slot = self.regions.entry(region).or_default();
        if let CheckState::Requesting(old) = slot.state {
            tracing::trace!(
                target: "proofmark::scheduler",
                region,
                superseded = old.get(),
                "input while request in flight"
            );
        }
        slot.state = CheckState::Debouncing(generation);
        Some(generation)
    }

    /// The debounce timer for `generation` fired with the region's current text.
    pub fn fire(&mut self, region: RegionId, generation: Generation, text: &str) -> FireOutcome {
        let Some(slot) = self.regions.get_mut(&region) else {
            return FireOutcome::Stale;
        };
        if slot.state != CheckState::Debouncing(generation) {
            return FireOutcome::Stale;
        }
        Self::start_request(slot, region, generation, text)
    }

    /// Skip the debounce and start a request right away.
    ///
    /// Supersedes any pending timer or request for the region.
    pub fn force(&mut self, region: RegionId, text: &str) -> FireOutcome {
        let generation = self.mint();
        let slot = self.regions.entry(region).or_default();
        Self::start_request(slot, region, generation, text)
    }

    fn start_request(
        slot: &mut RegionSlot,
        region: RegionId,
        generation: Generation,
        text: &str,
    ) -> FireOutcome {
        if text.trim().is_empty() {
            slot.state = CheckState::Idle;
            return FireOutcome::Empty;
        }
        slot.state = CheckState::Requesting(generation);
        FireOutcome::Request(CheckTicket {
            region,
            generation,
            text: text.to_string(),
            issued_at: Instant::now(),
        })
    }

    /// Report that the request for `ticket` finished (successfully or not).
    ///
    /// Only the newest request moves the region back to idle.
    pub fn complete(&mut self, ticket: &CheckTicket) -> Completion {
        let Some(slot) = self.regions.get_mut(&ticket.region) else {
            return Completion::Stale;
        };
        if slot.state != CheckState::Requesting(ticket.generation) {
            tracing::debug!(
                target: "proofmark::scheduler",
                region = ticket.region,
                generation = ticket.generation.get(),
                elapsed_ms = ticket.elapsed_ms() as u64,
                "discarding stale response"
            );
            return Completion::Stale;
        }
        slot.state = CheckState::Idle;
        Completion::Current
    }

    pub fn state(&self, region: RegionId) -> CheckState {
        self.regions
            .get(&region)
            .map(|slot| slot.state)
            .unwrap_or_default()
    }

    /// Forget a region; anything still pending for it becomes stale.
    pub fn remove(&mut self, region: RegionId) {
        self.regions.remove(&region);
    }

    /// Invalidate pending work for every region without forgetting them.
    pub fn cancel_all(&mut self) {
        for slot in self.regions.values_mut() {
            slot.state = CheckState::Idle;
        }
    }
}
