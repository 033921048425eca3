//! Packet Dispatcher (C5): the table-driven legality matrix gating which
//! inbound codes a peer class may send in a given session phase, plus the
//! per-code rate bucket and invalid-packet bookkeeping described in spec
//! §4.5.
//!
//! The table itself (`legality_for`) is pure and stateless; per-connection
//! state (the invalid-packet counter, the rolling rate buckets) lives in
//! [`InvalidPacketTracker`] and [`RateLimiter`], owned by the connection and
//! consulted on every inbound frame before it reaches `handle_packet`.

use bitflags::bitflags;
use gserver_protocol::PacketTypeIn;
use std::collections::HashMap;
use std::time::{Duration, Instant};

bitflags! {
    /// Which peer classes may send a given code. Named to match spec §3's
    /// compound flags (`AnyClient`, `AnyControl`, ...).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PeerClass: u8 {
        const CLIENT     = 0b0001;
        const RC         = 0b0010;
        const NC         = 0b0100;
        const NPC_SERVER = 0b1000;

        const ANY_CLIENT  = Self::CLIENT.bits();
        const ANY_RC      = Self::RC.bits();
        const ANY_NC      = Self::NC.bits() | Self::NPC_SERVER.bits();
        const ANY_CONTROL = Self::RC.bits() | Self::NC.bits() | Self::NPC_SERVER.bits();
    }
}

bitflags! {
    /// Which session phases a code is legal in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PhaseSet: u8 {
        const AWAIT         = 0b001;
        const AUTHENTICATED = 0b010;
        const LOADED        = 0b100;
    }
}

/// A single session's current position in the C4 state machine, collapsed
/// to the three phases the legality table cares about (Terminated sessions
/// are never dispatched at all, so it has no `PhaseSet` bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Await,
    Authenticated,
    Loaded,
}

impl Phase {
    fn as_set(self) -> PhaseSet {
        match self {
            Phase::Await => PhaseSet::AWAIT,
            Phase::Authenticated => PhaseSet::AUTHENTICATED,
            Phase::Loaded => PhaseSet::LOADED,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LegalityRule {
    pub classes: PeerClass,
    pub phases: PhaseSet,
    /// Packets per minute; `None` means no rate bucket (trusted peer classes).
    pub rate_per_minute: Option<u32>,
}

/// Codes that remain legal during the file-sync handshake of Authenticated,
/// not just once Loaded (§4.4: "asks the peer to wantfile any files it does
/// not yet have" happens before the client acknowledges readiness).
fn authenticated_and_loaded(code: PacketTypeIn) -> bool {
    matches!(
        code,
        PacketTypeIn::WantFile
            | PacketTypeIn::UpdateFile
            | PacketTypeIn::PacketCount
            | PacketTypeIn::AdjacentLevel
            | PacketTypeIn::VerifyWantSend
    )
}

fn classes_for(code: PacketTypeIn) -> PeerClass {
    let n = code as u8;
    match n {
        // RC (admin console) codes, per the `Rc*` block of PacketTypeIn.
        51..=98 | 155 | 156 | 160 | 162 => PeerClass::RC,
        // NC (scripting host) codes, per the `Nc*` block.
        103..=119 | 150 | 151 => PeerClass::NC,
        // Codes legal from any scripting/control peer.
        94 | 95 => PeerClass::ANY_CONTROL,
        _ => PeerClass::CLIENT,
    }
}

fn rate_for(code: PacketTypeIn, classes: PeerClass) -> Option<u32> {
    if classes.intersects(PeerClass::ANY_CONTROL) {
        // RC/NC peers are trusted operator/scripting connections; the
        // original imposes no per-minute cap on them.
        return None;
    }
    match code {
        // High-frequency per-tick traffic gets a generous bucket.
        PacketTypeIn::PlayerProps | PacketTypeIn::BoardModify | PacketTypeIn::ShowImg => {
            Some(2400)
        }
        PacketTypeIn::ToAll | PacketTypeIn::PrivateMessage => Some(60),
        _ => Some(1200),
    }
}

/// Look up the legality rule for an inbound code. Built once logically (the
/// table is pure), consulted on every dispatch.
pub fn legality_for(code: PacketTypeIn) -> LegalityRule {
    let classes = classes_for(code);
    let phases = if authenticated_and_loaded(code) {
        PhaseSet::AUTHENTICATED | PhaseSet::LOADED
    } else {
        PhaseSet::LOADED
    };
    LegalityRule {
        classes,
        phases,
        rate_per_minute: rate_for(code, classes),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Legal,
    IllegalForClass,
    IllegalForPhase,
    RateLimited,
}

/// Check whether `code` may be dispatched right now. Does not mutate any
/// rate-bucket state; callers pair this with [`RateLimiter::record`].
pub fn check(code: PacketTypeIn, class: PeerClass, phase: Phase) -> Verdict {
    let rule = legality_for(code);
    if !rule.classes.intersects(class) {
        return Verdict::IllegalForClass;
    }
    if !rule.phases.intersects(phase.as_set()) {
        return Verdict::IllegalForPhase;
    }
    Verdict::Legal
}

/// Per-session invalid-packet counter (§4.5): unknown codes, illegal
/// codes for the class/phase, and rate-limited drops all increment this.
/// Crossing the threshold within the window terminates the session.
pub struct InvalidPacketTracker {
    threshold: u32,
    window: Duration,
    count: u32,
    window_start: Instant,
}

impl InvalidPacketTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            window: Duration::from_secs(60),
            count: 0,
            window_start: Instant::now(),
        }
    }

    /// Record one invalid packet. Returns `true` if the session should now
    /// be terminated with a protocol error.
    pub fn record(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.window_start) > self.window {
            self.window_start = now;
            self.count = 0;
        }
        self.count += 1;
        self.count >= self.threshold
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Per-code rolling-minute rate buckets for one session.
#[derive(Default)]
pub struct RateLimiter {
    buckets: HashMap<PacketTypeIn, (Instant, u32)>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one packet of `code` against its bucket. Returns `true` if
    /// still within `limit` packets/minute, `false` if this packet exceeds
    /// it and should be dropped.
    pub fn record(&mut self, code: PacketTypeIn, limit: u32) -> bool {
        let now = Instant::now();
        let entry = self.buckets.entry(code).or_insert((now, 0));
        if now.duration_since(entry.0) > Duration::from_secs(60) {
            *entry = (now, 0);
        }
        entry.1 += 1;
        entry.1 <= limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_props_illegal_before_loaded() {
        let verdict = check(PacketTypeIn::PlayerProps, PeerClass::CLIENT, Phase::Await);
        assert_eq!(verdict, Verdict::IllegalForPhase);
    }

    #[test]
    fn client_props_legal_once_loaded() {
        let verdict = check(PacketTypeIn::PlayerProps, PeerClass::CLIENT, Phase::Loaded);
        assert_eq!(verdict, Verdict::Legal);
    }

    #[test]
    fn rc_only_code_illegal_for_client() {
        let verdict = check(
            PacketTypeIn::RcDisconnectPlayer,
            PeerClass::CLIENT,
            Phase::Loaded,
        );
        assert_eq!(verdict, Verdict::IllegalForClass);
    }

    #[test]
    fn rc_only_code_legal_for_rc() {
        let verdict = check(PacketTypeIn::RcDisconnectPlayer, PeerClass::RC, Phase::Loaded);
        assert_eq!(verdict, Verdict::Legal);
    }

    #[test]
    fn want_file_legal_during_authenticated_handshake() {
        let verdict = check(PacketTypeIn::WantFile, PeerClass::CLIENT, Phase::Authenticated);
        assert_eq!(verdict, Verdict::Legal);
    }

    #[test]
    fn invalid_packet_storm_terminates_after_threshold() {
        let mut tracker = InvalidPacketTracker::new(10);
        let mut terminated = false;
        for _ in 0..11 {
            terminated = tracker.record();
        }
        assert!(terminated, "11th invalid packet within the window must terminate");
    }

    #[test]
    fn invalid_packet_window_resets() {
        let mut tracker = InvalidPacketTracker::new(10);
        tracker.window = Duration::from_millis(10);
        for _ in 0..5 {
            tracker.record();
        }
        std::thread::sleep(Duration::from_millis(20));
        let terminated = tracker.record();
        assert!(!terminated);
        assert_eq!(tracker.count(), 1);
    }

    #[test]
    fn rate_limiter_drops_past_limit() {
        let mut limiter = RateLimiter::new();
        for i in 0..5 {
            let ok = limiter.record(PacketTypeIn::ToAll, 5);
            assert!(ok, "packet {i} should be within the bucket");
        }
        assert!(!limiter.record(PacketTypeIn::ToAll, 5), "6th packet exceeds the bucket");
    }
}
