//! The liveness engine: challenge sequencing, countdowns, retries and the
//! camera stream's lifetime, driven by tracked timers.

use crate::camera::{CameraCapture, Frame};
use crate::challenge::{select_challenges, Challenge};
use crate::detector::ChallengeDetector;
use crate::error::LivenessError;
use crate::state::{LivenessEvent, LivenessStatus};
use crate::timer::{TimerId, TimerQueue};
use campus_types::{PortalParams, Timestamp};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

const CHALLENGE_RETRY_MESSAGE: &str = "Challenge failed, please try again.";
const CAMERA_FAILURE_MESSAGE: &str =
    "Could not access camera. Please ensure camera permissions are granted.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Timer {
    InitialDetection,
    FacePoll,
    CountdownTick,
    NextChallenge,
    ProcessingDone,
}

/// Runs one liveness session at a time against a camera and a detector.
///
/// State machine:
///
/// ```text
/// idle --start--> capturing --face found--> challenge-active --all done--> processing --delay--> verified
///   ^                 |                          |   ^  (failed check: retry same challenge)
///   |                 +------------+-------------+   |
///   |                              v                 |
///   +--reset-- failed <-- camera error / retry cap / abort
/// ```
///
/// The session's verdict is emitted once as [`LivenessEvent::Verified`]. The
/// camera stream is released on every path out of an active session,
/// including `Drop`.
pub struct LivenessEngine<C: CameraCapture, D: ChallengeDetector> {
    camera: C,
    detector: D,
    params: PortalParams,
    rng: ChaCha8Rng,
    stream: Option<C::Stream>,
    timers: TimerQueue<Timer>,
    face_poll: Option<TimerId>,
    challenges: Vec<Challenge>,
    current_index: usize,
    face_detected: bool,
    countdown: Option<u32>,
    /// Consecutive failed checks on the current challenge.
    attempts: u32,
    status: LivenessStatus,
    outcome: Option<bool>,
    last_error: Option<String>,
    pending_events: Vec<LivenessEvent>,
}

impl<C: CameraCapture, D: ChallengeDetector> LivenessEngine<C, D> {
    /// Create an engine whose challenge order is seeded from OS entropy.
    pub fn new(camera: C, detector: D, params: PortalParams) -> Result<Self, LivenessError> {
        Self::with_rng(camera, detector, params, ChaCha8Rng::from_entropy())
    }

    /// Create an engine with a reproducible challenge order.
    pub fn with_seed(
        camera: C,
        detector: D,
        params: PortalParams,
        seed: u64,
    ) -> Result<Self, LivenessError> {
        Self::with_rng(camera, detector, params, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(
        camera: C,
        detector: D,
        params: PortalParams,
        mut rng: ChaCha8Rng,
    ) -> Result<Self, LivenessError> {
        params.validate()?;
        let challenges = select_challenges(params.challenge_count as usize, &mut rng);
        Ok(Self {
            camera,
            detector,
            params,
            rng,
            stream: None,
            timers: TimerQueue::new(),
            face_poll: None,
            challenges,
            current_index: 0,
            face_detected: false,
            countdown: None,
            attempts: 0,
            status: LivenessStatus::Idle,
            outcome: None,
            last_error: None,
            pending_events: Vec::new(),
        })
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    /// Open the camera and begin waiting for a face.
    ///
    /// Any session already in progress is reset first, so its stream is
    /// released before a new one is requested. On camera failure the session
    /// is left in [`LivenessStatus::Failed`]; calling `start` again retries.
    pub fn start(&mut self, now: Timestamp) -> Result<(), LivenessError> {
        if self.status != LivenessStatus::Idle {
            self.reset();
        }

        match self.camera.acquire_stream() {
            Ok(stream) => {
                self.stream = Some(stream);
                self.status = LivenessStatus::Capturing;
                self.last_error = None;
                self.pending_events.push(LivenessEvent::CameraStarted);
                self.timers.schedule(
                    now.plus_millis(self.params.face_detection_delay_ms),
                    Timer::InitialDetection,
                );
                self.face_poll = Some(self.timers.schedule(
                    now.plus_millis(self.params.face_poll_interval_ms),
                    Timer::FacePoll,
                ));
                info!(challenges = self.challenges.len(), "liveness session started");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "camera access failed");
                let message = format!("{CAMERA_FAILURE_MESSAGE} {e}");
                self.status = LivenessStatus::Failed;
                self.last_error = Some(message.clone());
                self.pending_events.push(LivenessEvent::CameraFailed(message));
                Err(LivenessError::CameraAccess(e))
            }
        }
    }

    /// Fire every timer due at or before `now`, in deadline order.
    ///
    /// Follow-up timers are scheduled relative to the deadline that fired, so
    /// a late call replays the session exactly as if it had been on time.
    pub fn advance(&mut self, now: Timestamp) {
        while let Some((at, _, timer)) = self.timers.pop_due(now) {
            self.fire(timer, at);
        }
    }

    /// Leave the session without a verdict. Only allowed when the caller
    /// enabled `allow_skip`.
    pub fn skip(&mut self) -> Result<(), LivenessError> {
        if !self.params.allow_skip {
            return Err(LivenessError::SkipDisabled);
        }
        if !matches!(
            self.status,
            LivenessStatus::Capturing | LivenessStatus::ChallengeActive
        ) {
            return Err(LivenessError::NotActive(self.status));
        }
        info!("liveness detection skipped");
        self.teardown();
        self.status = LivenessStatus::Idle;
        self.pending_events.push(LivenessEvent::Skipped);
        Ok(())
    }

    /// Fail the active session from outside, emitting `Verified(false)`.
    pub fn abort(&mut self, reason: impl Into<String>) -> Result<(), LivenessError> {
        if !self.status.is_active() {
            return Err(LivenessError::NotActive(self.status));
        }
        self.fail(reason.into());
        Ok(())
    }

    /// Return to idle with a fresh, uncompleted challenge set. Safe from any state.
    ///
    /// Undrained events of the previous session are discarded, so the next
    /// session's events never carry an earlier verdict.
    pub fn reset(&mut self) {
        self.teardown();
        self.pending_events.clear();
        self.challenges = select_challenges(self.params.challenge_count as usize, &mut self.rng);
        self.current_index = 0;
        self.face_detected = false;
        self.attempts = 0;
        self.status = LivenessStatus::Idle;
        self.outcome = None;
        self.last_error = None;
    }

    /// Release the camera and drop every pending timer.
    ///
    /// Called on unmount; also runs from `Drop`. Idempotent.
    pub fn teardown(&mut self) {
        let dropped = self.timers.clear();
        if dropped > 0 {
            debug!(dropped, "cleared pending liveness timers");
        }
        self.face_poll = None;
        self.countdown = None;
        self.release_stream();
        if self.status.is_active() {
            self.status = LivenessStatus::Idle;
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn status(&self) -> LivenessStatus {
        self.status
    }

    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    /// The challenge being (or about to be) performed.
    pub fn current_challenge(&self) -> Option<&Challenge> {
        match self.status {
            LivenessStatus::ChallengeActive => self.challenges.get(self.current_index),
            _ => None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Ticks left on the running countdown.
    pub fn countdown(&self) -> Option<u32> {
        self.countdown
    }

    pub fn face_detected(&self) -> bool {
        self.face_detected
    }

    pub fn completed_count(&self) -> usize {
        self.challenges.iter().filter(|c| c.completed).count()
    }

    /// Completion percentage: `completed / total * 100`.
    pub fn progress(&self) -> f64 {
        if self.challenges.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 / self.challenges.len() as f64 * 100.0
    }

    /// The session verdict, once emitted.
    pub fn outcome(&self) -> Option<bool> {
        self.outcome
    }

    /// User-facing message for the most recent failure.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether the engine currently holds a camera stream.
    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// When the next timer is due, for drivers that sleep between calls.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.timers.next_deadline()
    }

    pub fn params(&self) -> &PortalParams {
        &self.params
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    /// Drain pending events for the caller to process.
    pub fn drain_events(&mut self) -> Vec<LivenessEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ── Timer handlers ──────────────────────────────────────────────────

    fn fire(&mut self, timer: Timer, at: Timestamp) {
        match timer {
            Timer::InitialDetection => self.on_initial_detection(at),
            Timer::FacePoll => self.on_face_poll(at),
            Timer::CountdownTick => self.on_countdown_tick(at),
            Timer::NextChallenge => {
                if self.status == LivenessStatus::ChallengeActive {
                    self.start_current_challenge(at);
                }
            }
            Timer::ProcessingDone => self.on_processing_done(),
        }
    }

    fn on_initial_detection(&mut self, at: Timestamp) {
        if self.status != LivenessStatus::Capturing {
            return;
        }
        let frame = self.capture();
        if self.detector.face_present(frame.as_ref()) {
            self.set_face_detected(true);
            self.status = LivenessStatus::ChallengeActive;
            self.current_index = 0;
            self.start_current_challenge(at);
        } else {
            debug!("no face in frame yet");
            self.timers.schedule(
                at.plus_millis(self.params.face_poll_interval_ms),
                Timer::InitialDetection,
            );
        }
    }

    fn on_face_poll(&mut self, at: Timestamp) {
        self.face_poll = None;
        if !matches!(
            self.status,
            LivenessStatus::Capturing | LivenessStatus::ChallengeActive
        ) {
            return;
        }
        let frame = self.capture();
        let present = self.detector.face_present(frame.as_ref());
        if !present && self.face_detected {
            debug!("face temporarily lost from frame");
        }
        self.set_face_detected(present);
        self.face_poll = Some(self.timers.schedule(
            at.plus_millis(self.params.face_poll_interval_ms),
            Timer::FacePoll,
        ));
    }

    fn on_countdown_tick(&mut self, at: Timestamp) {
        if self.status != LivenessStatus::ChallengeActive {
            return;
        }
        match self.countdown {
            Some(remaining) if remaining > 1 => {
                let remaining = remaining - 1;
                self.countdown = Some(remaining);
                self.pending_events
                    .push(LivenessEvent::CountdownTick { remaining });
                self.timers
                    .schedule(at.plus_millis(self.params.tick_ms), Timer::CountdownTick);
            }
            _ => {
                self.countdown = None;
                self.check_current_challenge(at);
            }
        }
    }

    fn on_processing_done(&mut self) {
        if self.status != LivenessStatus::Processing {
            return;
        }
        debug_assert!(self.challenges.iter().all(|c| c.completed));
        self.status = LivenessStatus::Verified;
        self.emit_outcome(true);
    }

    // ── Transitions ─────────────────────────────────────────────────────

    fn start_current_challenge(&mut self, at: Timestamp) {
        let index = self.current_index;
        let kind = self.challenges[index].kind;
        debug!(index, %kind, "challenge started");
        self.pending_events
            .push(LivenessEvent::ChallengeStarted { index, kind });
        self.restart_countdown(at);
    }

    fn restart_countdown(&mut self, at: Timestamp) {
        let ticks = self.params.countdown_ticks;
        self.countdown = Some(ticks);
        self.pending_events
            .push(LivenessEvent::CountdownTick { remaining: ticks });
        self.timers
            .schedule(at.plus_millis(self.params.tick_ms), Timer::CountdownTick);
    }

    fn check_current_challenge(&mut self, at: Timestamp) {
        let index = self.current_index;
        let kind = self.challenges[index].kind;
        let frame = self.capture();

        if self.detector.challenge_passed(kind, frame.as_ref()) {
            self.challenges[index].completed = true;
            self.attempts = 0;
            self.last_error = None;
            let progress = self.progress();
            info!(index, %kind, progress, "challenge completed");
            self.pending_events
                .push(LivenessEvent::ChallengeCompleted { index });
            self.pending_events.push(LivenessEvent::Progress(progress));

            if index + 1 < self.challenges.len() {
                self.current_index += 1;
                self.timers.schedule(
                    at.plus_millis(self.params.challenge_pause_ms),
                    Timer::NextChallenge,
                );
            } else {
                self.enter_processing(at);
            }
            return;
        }

        self.attempts += 1;
        let attempt = self.attempts;
        debug!(index, %kind, attempt, "challenge not confirmed");
        self.pending_events
            .push(LivenessEvent::ChallengeFailed { index, attempt });
        self.last_error = Some(CHALLENGE_RETRY_MESSAGE.to_string());

        if let Some(max) = self.params.max_challenge_attempts {
            if attempt >= max {
                self.fail(format!("challenge '{kind}' was not confirmed after {attempt} attempts"));
                return;
            }
        }
        self.restart_countdown(at);
    }

    fn enter_processing(&mut self, at: Timestamp) {
        self.status = LivenessStatus::Processing;
        self.countdown = None;
        if let Some(id) = self.face_poll.take() {
            self.timers.cancel(id);
        }
        self.release_stream();
        self.pending_events.push(LivenessEvent::Processing);
        self.timers.schedule(
            at.plus_millis(self.params.processing_delay_ms),
            Timer::ProcessingDone,
        );
    }

    fn fail(&mut self, reason: String) {
        warn!(%reason, "liveness session failed");
        self.timers.clear();
        self.face_poll = None;
        self.countdown = None;
        self.release_stream();
        self.status = LivenessStatus::Failed;
        self.last_error = Some(reason);
        self.emit_outcome(false);
    }

    fn emit_outcome(&mut self, success: bool) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(success);
        info!(success, "liveness verdict");
        self.pending_events.push(LivenessEvent::Verified(success));
    }

    fn set_face_detected(&mut self, present: bool) {
        if self.face_detected != present {
            self.face_detected = present;
            self.pending_events.push(LivenessEvent::FaceDetected(present));
        }
    }

    fn capture(&mut self) -> Option<Frame> {
        let stream = self.stream.as_ref()?;
        self.camera.capture_frame(stream)
    }

    fn release_stream(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.camera.release_stream(stream);
            debug!("camera stream released");
        }
    }
}

impl<C: CameraCapture, D: ChallengeDetector> Drop for LivenessEngine<C, D> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CameraAccessError;
    use crate::ChallengeKind;
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[derive(Default)]
    struct Counters {
        acquired: Cell<u32>,
        released: Cell<u32>,
    }

    struct TestCamera {
        counters: Rc<Counters>,
        deny: Rc<Cell<bool>>,
    }

    impl CameraCapture for TestCamera {
        type Stream = u32;

        fn acquire_stream(&mut self) -> Result<u32, CameraAccessError> {
            if self.deny.get() {
                return Err(CameraAccessError::PermissionDenied);
            }
            self.counters.acquired.set(self.counters.acquired.get() + 1);
            Ok(self.counters.acquired.get())
        }

        fn release_stream(&mut self, _stream: u32) {
            self.counters.released.set(self.counters.released.get() + 1);
        }

        fn capture_frame(&mut self, _stream: &u32) -> Option<Frame> {
            Some(Frame::new(2, 2, vec![0; 4]))
        }
    }

    /// Face always present; challenge answers are consumed in order, then pass.
    struct TestDetector {
        answers: VecDeque<bool>,
        face_after: u32,
    }

    impl ChallengeDetector for TestDetector {
        fn face_present(&mut self, _frame: Option<&Frame>) -> bool {
            if self.face_after > 0 {
                self.face_after -= 1;
                return false;
            }
            true
        }

        fn challenge_passed(&mut self, _kind: ChallengeKind, _frame: Option<&Frame>) -> bool {
            self.answers.pop_front().unwrap_or(true)
        }
    }

    struct Harness {
        counters: Rc<Counters>,
        deny: Rc<Cell<bool>>,
        engine: LivenessEngine<TestCamera, TestDetector>,
    }

    fn harness(params: PortalParams, answers: &[bool]) -> Harness {
        let counters = Rc::new(Counters::default());
        let deny = Rc::new(Cell::new(false));
        let camera = TestCamera {
            counters: counters.clone(),
            deny: deny.clone(),
        };
        let detector = TestDetector {
            answers: answers.iter().copied().collect(),
            face_after: 0,
        };
        let engine = LivenessEngine::with_seed(camera, detector, params, 42).unwrap();
        Harness {
            counters,
            deny,
            engine,
        }
    }

    fn ts(ms: u64) -> Timestamp {
        Timestamp::new(ms)
    }

    fn verdicts(events: &[LivenessEvent]) -> Vec<bool> {
        events
            .iter()
            .filter_map(|e| match e {
                LivenessEvent::Verified(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn all_challenges_pass_first_time() {
        let mut h = harness(PortalParams::default(), &[]);
        h.engine.start(ts(0)).unwrap();
        assert_eq!(h.engine.status(), LivenessStatus::Capturing);

        h.engine.advance(ts(60_000));

        assert_eq!(h.engine.status(), LivenessStatus::Verified);
        assert_eq!(h.engine.outcome(), Some(true));
        assert_eq!(h.engine.progress(), 100.0);
        assert!(h.engine.challenges().iter().all(|c| c.completed));

        let events = h.engine.drain_events();
        let progress: Vec<f64> = events
            .iter()
            .filter_map(|e| match e {
                LivenessEvent::Progress(p) => Some((p * 10.0).round() / 10.0),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![33.3, 66.7, 100.0]);
        assert_eq!(verdicts(&events), vec![true]);
        assert_eq!(h.counters.acquired.get(), 1);
        assert_eq!(h.counters.released.get(), 1);
        assert_eq!(h.engine.pending_timers(), 0);
    }

    #[test]
    fn verdict_follows_processing_delay() {
        let mut h = harness(PortalParams::default(), &[]);
        h.engine.start(ts(0)).unwrap();
        // Detection at 1.5s, three 5s countdowns with two 1s pauses: last check at 18.5s.
        h.engine.advance(ts(18_500));
        assert_eq!(h.engine.status(), LivenessStatus::Processing);
        assert!(!h.engine.is_streaming());
        assert_eq!(h.engine.outcome(), None);

        h.engine.advance(ts(19_999));
        assert_eq!(h.engine.outcome(), None);
        h.engine.advance(ts(20_000));
        assert_eq!(h.engine.outcome(), Some(true));
    }

    #[test]
    fn countdown_runs_down_before_check() {
        let mut h = harness(PortalParams::default(), &[]);
        h.engine.start(ts(0)).unwrap();
        h.engine.advance(ts(1500));
        assert_eq!(h.engine.status(), LivenessStatus::ChallengeActive);
        assert_eq!(h.engine.countdown(), Some(5));
        h.engine.advance(ts(2500));
        assert_eq!(h.engine.countdown(), Some(4));
        h.engine.advance(ts(5500));
        assert_eq!(h.engine.countdown(), Some(1));
        h.engine.advance(ts(6500));
        assert_eq!(h.engine.countdown(), None);
        assert_eq!(h.engine.completed_count(), 1);
        assert_eq!(h.engine.current_index(), 1);
    }

    #[test]
    fn failed_check_retries_same_challenge() {
        let mut h = harness(PortalParams::default(), &[false, false, true]);
        h.engine.start(ts(0)).unwrap();
        let first = h.engine.challenges()[0].kind;

        // Two failed checks at 6.5s and 11.5s, success at 16.5s.
        h.engine.advance(ts(11_500));
        assert_eq!(h.engine.current_index(), 0);
        assert_eq!(h.engine.attempts(), 2);
        assert_eq!(h.engine.current_challenge().map(|c| c.kind), Some(first));
        assert_eq!(h.engine.last_error(), Some(CHALLENGE_RETRY_MESSAGE));

        h.engine.advance(ts(16_500));
        assert_eq!(h.engine.completed_count(), 1);
        assert_eq!(h.engine.attempts(), 0);
        assert_eq!(h.engine.last_error(), None);

        h.engine.advance(ts(120_000));
        assert_eq!(h.engine.outcome(), Some(true));
    }

    #[test]
    fn retry_cap_fails_session() {
        let params = PortalParams {
            max_challenge_attempts: Some(2),
            ..PortalParams::default()
        };
        let mut h = harness(params, &[true, false, false]);
        h.engine.start(ts(0)).unwrap();
        h.engine.advance(ts(120_000));

        assert_eq!(h.engine.status(), LivenessStatus::Failed);
        assert_eq!(h.engine.outcome(), Some(false));
        assert_eq!(h.engine.completed_count(), 1);
        assert_eq!(verdicts(&h.engine.drain_events()), vec![false]);
        assert_eq!(h.counters.released.get(), 1);
        assert_eq!(h.engine.pending_timers(), 0);
    }

    #[test]
    fn unbounded_retry_without_cap() {
        let params = PortalParams {
            max_challenge_attempts: None,
            ..PortalParams::default()
        };
        let mut answers = vec![false; 25];
        answers.push(true);
        let mut h = harness(params, &answers);
        h.engine.start(ts(0)).unwrap();
        h.engine.advance(ts(1_000_000));
        assert_eq!(h.engine.outcome(), Some(true));
    }

    #[test]
    fn waits_for_face_before_challenges() {
        let mut h = harness(PortalParams::default(), &[]);
        h.engine.detector.face_after = 3;
        h.engine.start(ts(0)).unwrap();
        // Poll at 1.0s and detection at 1.5s see no face, poll at 2.0s sees none either.
        h.engine.advance(ts(2000));
        assert_eq!(h.engine.status(), LivenessStatus::Capturing);
        assert!(!h.engine.face_detected());
        h.engine.advance(ts(2500));
        assert_eq!(h.engine.status(), LivenessStatus::ChallengeActive);
        assert!(h.engine.face_detected());
    }

    #[test]
    fn camera_denied_then_retry() {
        let mut h = harness(PortalParams::default(), &[]);
        h.deny.set(true);
        let err = h.engine.start(ts(0)).unwrap_err();
        assert!(matches!(
            err,
            LivenessError::CameraAccess(CameraAccessError::PermissionDenied)
        ));
        assert_eq!(h.engine.status(), LivenessStatus::Failed);
        assert!(h.engine.last_error().unwrap().contains("camera permissions"));
        let events = h.engine.drain_events();
        assert!(matches!(events.as_slice(), [LivenessEvent::CameraFailed(_)]));
        assert_eq!(h.engine.pending_timers(), 0);

        h.deny.set(false);
        h.engine.start(ts(10)).unwrap();
        assert_eq!(h.engine.status(), LivenessStatus::Capturing);
        h.engine.advance(ts(100_000));
        assert_eq!(h.engine.outcome(), Some(true));
    }

    #[test]
    fn teardown_mid_challenge_releases_once() {
        let mut h = harness(PortalParams::default(), &[]);
        h.engine.start(ts(0)).unwrap();
        h.engine.advance(ts(3000));
        assert!(h.engine.pending_timers() > 0);

        h.engine.teardown();
        h.engine.teardown();
        assert_eq!(h.counters.released.get(), 1);
        assert_eq!(h.engine.pending_timers(), 0);

        h.engine.drain_events();
        h.engine.advance(ts(1_000_000));
        assert!(h.engine.drain_events().is_empty());
        assert_eq!(h.engine.outcome(), None);
    }

    #[test]
    fn drop_releases_stream() {
        let h = harness(PortalParams::default(), &[]);
        let counters = h.counters.clone();
        let mut engine = h.engine;
        engine.start(ts(0)).unwrap();
        drop(engine);
        assert_eq!(counters.acquired.get(), 1);
        assert_eq!(counters.released.get(), 1);
    }

    #[test]
    fn restart_releases_previous_stream_first() {
        let mut h = harness(PortalParams::default(), &[]);
        h.engine.start(ts(0)).unwrap();
        h.engine.start(ts(100)).unwrap();
        assert_eq!(h.counters.acquired.get(), 2);
        assert_eq!(h.counters.released.get(), 1);
        assert!(h.engine.is_streaming());
    }

    #[test]
    fn skip_is_disabled_by_default() {
        let mut h = harness(PortalParams::default(), &[]);
        h.engine.start(ts(0)).unwrap();
        assert!(matches!(h.engine.skip(), Err(LivenessError::SkipDisabled)));
        assert_eq!(h.engine.status(), LivenessStatus::Capturing);
    }

    #[test]
    fn skip_when_enabled() {
        let params = PortalParams {
            allow_skip: true,
            ..PortalParams::default()
        };
        let mut h = harness(params, &[]);
        assert!(matches!(h.engine.skip(), Err(LivenessError::NotActive(_))));

        h.engine.start(ts(0)).unwrap();
        h.engine.advance(ts(2000));
        h.engine.skip().unwrap();

        assert_eq!(h.engine.status(), LivenessStatus::Idle);
        assert_eq!(h.engine.outcome(), None);
        assert_eq!(h.counters.released.get(), 1);
        assert_eq!(h.engine.pending_timers(), 0);
        let events = h.engine.drain_events();
        assert_eq!(events.last(), Some(&LivenessEvent::Skipped));
        assert!(verdicts(&events).is_empty());
    }

    #[test]
    fn abort_reports_failure_once() {
        let mut h = harness(PortalParams::default(), &[]);
        assert!(h.engine.abort("no session").is_err());
        h.engine.start(ts(0)).unwrap();
        h.engine.abort("user closed dialog").unwrap();
        assert!(h.engine.abort("again").is_err());

        assert_eq!(h.engine.status(), LivenessStatus::Failed);
        assert_eq!(h.engine.last_error(), Some("user closed dialog"));
        assert_eq!(verdicts(&h.engine.drain_events()), vec![false]);
    }

    #[test]
    fn reset_clears_completion_and_allows_new_verdict() {
        let mut h = harness(PortalParams::default(), &[]);
        h.engine.start(ts(0)).unwrap();
        h.engine.advance(ts(60_000));
        assert_eq!(h.engine.outcome(), Some(true));

        h.engine.reset();
        assert_eq!(h.engine.status(), LivenessStatus::Idle);
        assert_eq!(h.engine.completed_count(), 0);
        assert_eq!(h.engine.challenges().len(), 3);
        assert_eq!(h.engine.progress(), 0.0);
        assert_eq!(h.engine.outcome(), None);

        h.engine.drain_events();
        h.engine.start(ts(100_000)).unwrap();
        h.engine.advance(ts(200_000));
        assert_eq!(verdicts(&h.engine.drain_events()), vec![true]);
    }

    #[test]
    fn undrained_verdict_does_not_leak_into_next_session() {
        let mut h = harness(PortalParams::default(), &[]);
        h.engine.start(ts(0)).unwrap();
        h.engine.abort("user closed dialog").unwrap();

        h.engine.start(ts(1_000)).unwrap();
        h.engine.advance(ts(100_000));
        let events = h.engine.drain_events();
        assert_eq!(events.first(), Some(&LivenessEvent::CameraStarted));
        assert_eq!(verdicts(&events), vec![true]);
    }

    #[test]
    fn invalid_params_rejected() {
        let params = PortalParams {
            challenge_count: 0,
            ..PortalParams::default()
        };
        let camera = TestCamera {
            counters: Rc::new(Counters::default()),
            deny: Rc::new(Cell::new(false)),
        };
        let detector = TestDetector {
            answers: VecDeque::new(),
            face_after: 0,
        };
        assert!(matches!(
            LivenessEngine::new(camera, detector, params),
            Err(LivenessError::InvalidParams(_))
        ));
    }
}
