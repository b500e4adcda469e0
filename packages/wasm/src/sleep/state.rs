//! Per-object sleep state machine.
//!
//! The state only moves Awake -> Asleep inside the sweep
//! ([`super::update_awake_objects`]) and Asleep -> Awake inside
//! `SleepState::wake_up`. Both edges move the object between the
//! containers of its manager, so they are crate-private: outside code
//! wakes a managed object with [`crate::manager::ObjectManager::wake_up`].

use std::fmt;

/// Monotonic frame counter owned by the surrounding scene.
pub type FrameIndex = u64;

/// Number of idle frames after which an object may fall asleep.
///
/// About one second at 60 Hz, but counted in frames so that it does not
/// depend on the timestep.
pub const FRAMES_BEFORE_SLEEP: u64 = 60;

/// Sleep status of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SleepStatus {
    /// Active; stays in the awake set until idle long enough.
    #[default]
    Awake,
    /// Awake, but parked on the next sweep regardless of idle time.
    CanSleepThisFrame,
    /// Dormant; held by the spatial index only.
    Asleep,
}

/// Subscriber notified when an object goes from Asleep to Awake.
///
/// Listeners are single-shot: they are drained by the wake-up that fires
/// them and must be registered again to observe the next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WakeListener(pub u32);

impl WakeListener {
    /// The object manager's own re-insertion into the awake set.
    pub const OBJECT_MANAGER: WakeListener = WakeListener(0);

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for WakeListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({})", self.0)
    }
}

/// Tracks whether an object has been idle long enough to sleep.
///
/// Waking up is reserved to the owning manager:
///
/// ```compile_fail
/// let mut state = scene_index_wasm::SleepState::new(0);
/// state.wake_up(1, |_| {});
/// ```
#[derive(Debug, Clone)]
pub struct SleepState {
    status: SleepStatus,
    /// Frame of the last detected activity. `None` means forced to sleep:
    /// the object never refreshes itself automatically.
    last_activity_frame: Option<FrameIndex>,
    on_waking_up: Vec<WakeListener>,
}

impl SleepState {
    /// Create an awake state whose last activity is `frame`.
    pub fn new(frame: FrameIndex) -> Self {
        Self::with_status(frame, SleepStatus::Awake)
    }

    /// Create a state with an explicit initial status.
    ///
    /// `CanSleepThisFrame` is useful for objects known to be static at
    /// creation: they are parked by the first sweep.
    pub fn with_status(frame: FrameIndex, status: SleepStatus) -> Self {
        Self {
            status,
            last_activity_frame: Some(frame),
            on_waking_up: Vec::new(),
        }
    }

    #[inline]
    pub fn status(&self) -> SleepStatus {
        self.status
    }

    /// Frame of the last activity, `None` if forced to sleep.
    #[inline]
    pub fn last_activity_frame(&self) -> Option<FrameIndex> {
        self.last_activity_frame
    }

    /// True unless the object is asleep.
    #[inline]
    pub fn is_awake(&self) -> bool {
        self.status != SleepStatus::Asleep
    }

    /// Whether the object may fall asleep at `frame`, using
    /// [`FRAMES_BEFORE_SLEEP`].
    pub fn can_sleep(&self, frame: FrameIndex) -> bool {
        self.can_sleep_within(frame, FRAMES_BEFORE_SLEEP)
    }

    /// Whether the object may fall asleep at `frame` given an idle
    /// threshold in frames. Pure read.
    pub fn can_sleep_within(&self, frame: FrameIndex, frames_before_sleep: u64) -> bool {
        if self.status == SleepStatus::CanSleepThisFrame {
            return true;
        }
        match self.last_activity_frame {
            None => true,
            Some(last) => frame.saturating_sub(last) >= frames_before_sleep,
        }
    }

    /// Record activity at `frame` and wake the object if it was asleep.
    ///
    /// The activity frame is refreshed on every call, even when already
    /// awake. On an Asleep -> Awake edge, every registered listener is
    /// passed to `on_waking_up` in registration order and the list is
    /// drained. Returns true if the edge was taken.
    pub(crate) fn wake_up<F>(&mut self, frame: FrameIndex, mut on_waking_up: F) -> bool
    where
        F: FnMut(WakeListener),
    {
        self.last_activity_frame = Some(frame);
        if self.is_awake() {
            return false;
        }

        self.status = SleepStatus::Awake;
        for listener in std::mem::take(&mut self.on_waking_up) {
            on_waking_up(listener);
        }
        true
    }

    /// Register a listener for the next Asleep -> Awake edge.
    ///
    /// Does not fire immediately, even if the object is awake.
    pub(crate) fn register_on_waking_up(&mut self, listener: WakeListener) {
        self.on_waking_up.push(listener);
    }

    /// Listeners waiting for the next wake-up.
    pub fn waking_up_listeners(&self) -> &[WakeListener] {
        &self.on_waking_up
    }

    pub(crate) fn clear_waking_up_listeners(&mut self) {
        self.on_waking_up.clear();
    }

    /// Refresh the activity frame if the object still needs to be awake.
    ///
    /// Must run before [`SleepState::can_sleep`] in the same sweep. A
    /// forced-to-sleep object is never refreshed.
    pub fn try_to_sleep(&mut self, frame: FrameIndex, is_needing_to_be_awake: bool) {
        if self.last_activity_frame.is_some() && is_needing_to_be_awake {
            self.last_activity_frame = Some(frame);
        }
    }

    /// Make the object eligible for sleep on the next sweep.
    ///
    /// No-op if already asleep.
    pub fn force_to_sleep(&mut self) {
        if !self.is_awake() {
            return;
        }
        self.last_activity_frame = None;
    }

    /// Transition to Asleep. Only the sweep calls this.
    pub(super) fn fall_asleep(&mut self) {
        self.status = SleepStatus::Asleep;
    }
}
