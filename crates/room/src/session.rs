use std::time::Instant;

use readingroom_common::{RoomSettings, SessionIdentity, SettingsError};
use readingroom_input::{
    Action, IntentHandle, LockEvent, LockState, LookLock, NavigationFlag, Platform,
    PointerCapture,
};
use readingroom_motion::{FirstPersonCamera, MotionController};
use readingroom_persist::{ClubConfig, KvError, KvStore, save_club_config};
use readingroom_presence::{
    BroadcastOutcome, ChannelStatus, IngestOutcome, PresenceBroadcaster, RemotePresenceStore,
    RoomChannel,
};
use readingroom_render::{AvatarSet, RenderView};

use crate::catalog::{Book, highlight_id};
use crate::summary::RoomSummary;
use crate::ui::{NavRequest, UiState};

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("invalid room settings: {0}")]
    Settings(#[from] SettingsError),
}

/// What happened during one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport {
    pub received: usize,
    pub lock: Option<LockEvent>,
    pub broadcast: BroadcastOutcome,
}

/// One participant's live session in the room.
pub struct RoomSession {
    identity: SessionIdentity,
    platform: Platform,
    camera: FirstPersonCamera,
    intents: IntentHandle,
    motion: MotionController,
    look_lock: LookLock,
    nav: NavigationFlag,
    broadcaster: PresenceBroadcaster,
    store: RemotePresenceStore,
    avatars: AvatarSet,
    channel: Option<Box<dyn RoomChannel>>,
    live: bool,
    ui: UiState,
    club: ClubConfig,
}

impl std::fmt::Debug for RoomSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomSession")
            .field("user", &self.identity.user_id)
            .field("live", &self.live)
            .field("remote", &self.store.len())
            .finish_non_exhaustive()
    }
}

impl RoomSession {
    pub fn new(
        identity: SessionIdentity,
        settings: &RoomSettings,
        platform: Platform,
    ) -> Result<Self, RoomError> {
        settings.validate()?;
        let mut camera = FirstPersonCamera::default();
        camera.position.y = settings.eye_height;
        camera.sensitivity = settings.look_sensitivity;

        tracing::info!(
            user = identity.user_id.short(),
            name = %identity.display_name,
            touch = platform.touch_primary,
            "room session created"
        );
        Ok(Self {
            camera,
            intents: IntentHandle::new(),
            motion: MotionController::new(platform, settings),
            look_lock: LookLock::new(settings.lock_settle_delay()),
            nav: NavigationFlag::default(),
            broadcaster: PresenceBroadcaster::new(identity.clone(), settings),
            store: RemotePresenceStore::new(identity.user_id.clone())
                .with_expiry(settings.presence_expiry()),
            avatars: AvatarSet::new(settings.avatar_smoothing),
            channel: None,
            live: false,
            ui: UiState::default(),
            club: ClubConfig::default(),
            platform,
            identity,
        })
    }

    /// Handle for keyboard and touch sources to drive movement.
    pub fn intent_handle(&self) -> IntentHandle {
        self.intents.clone()
    }

    /// Attach a room subscription. Presence goes live once the channel
    /// reports `Subscribed`; until then broadcasting is a no-op.
    pub fn connect(&mut self, channel: Box<dyn RoomChannel>) {
        tracing::info!(topic = channel.topic(), "joining room channel");
        if let Some(mut old) = self.channel.replace(channel) {
            old.unsubscribe();
        }
        self.live = false;
        self.poll_channel_status();
    }

    fn poll_channel_status(&mut self) {
        let Some(channel) = self.channel.as_ref() else {
            return;
        };
        match channel.status() {
            ChannelStatus::Subscribed if !self.live => {
                self.live = true;
                self.broadcaster.reset();
                tracing::info!(topic = channel.topic(), "room channel live");
            }
            ChannelStatus::ChannelError | ChannelStatus::TimedOut | ChannelStatus::Closed
                if self.live =>
            {
                self.live = false;
                tracing::warn!(topic = channel.topic(), status = ?channel.status(), "room channel lost");
            }
            _ => {}
        }
    }

    /// Feed one input action.
    pub fn handle_action(&mut self, action: &Action, now: Instant) {
        if self.intents.apply(action) {
            return;
        }
        match action {
            Action::Look { dx, dy } => {
                let locked = self.look_lock.is_locked();
                let navigating = self.nav.is_navigating();
                self.motion.look(&mut self.camera, *dx, *dy, locked, navigating);
            }
            Action::EnterNavigation => self.set_navigating(true, now),
            Action::ExitNavigation => self.set_navigating(false, now),
            _ => {}
        }
    }

    /// Set the navigation flag. The look lock follows on the next frame.
    pub fn set_navigating(&mut self, navigating: bool, now: Instant) {
        if self.nav.set(navigating) {
            tracing::debug!(navigating, "navigation mode changed");
            if !navigating {
                self.intents.clear();
                self.look_lock.cancel();
            } else if self.platform.supports_pointer_capture() {
                self.look_lock.request_lock(now);
            }
        }
    }

    /// The platform released the pointer on its own (escape, focus loss).
    pub fn on_platform_unlock(&mut self) {
        if self.look_lock.on_platform_unlock(&mut self.nav).is_some() {
            self.intents.clear();
        }
    }

    /// The user asked to let go of the pointer (escape, window focus lost).
    ///
    /// A held capture is released and synced back like a platform unlock; a
    /// capture that is still pending is abandoned by leaving navigation so
    /// it never fires.
    pub fn release_pointer(&mut self, capture: &mut dyn PointerCapture, now: Instant) {
        match self.look_lock.state() {
            LockState::Locked => {
                capture.unlock();
                self.on_platform_unlock();
            }
            LockState::PendingLock { .. } => self.set_navigating(false, now),
            LockState::Unlocked => {}
        }
    }

    /// Run one frame: inbound presence, look lock, movement, outbound pose,
    /// avatar easing.
    pub fn frame(
        &mut self,
        now: Instant,
        dt: f32,
        capture: &mut dyn PointerCapture,
    ) -> FrameReport {
        let _span = tracing::info_span!("room_frame").entered();

        self.poll_channel_status();
        let mut received = 0;
        if let Some(channel) = self.channel.as_ref().filter(|_| self.live) {
            for frame in channel.drain() {
                if matches!(self.store.ingest(&frame, now), IngestOutcome::Stored(_)) {
                    received += 1;
                }
            }
        }
        self.store.expire(now);

        // Touch-primary platforms navigate without pointer capture.
        let lock = if self.platform.supports_pointer_capture() {
            self.look_lock.reconcile(now, capture, &mut self.nav)
        } else {
            None
        };
        if lock == Some(LockEvent::Failed) {
            self.intents.clear();
        }

        self.motion.update(
            &mut self.camera,
            self.intents.snapshot(),
            dt,
            self.look_lock.is_locked(),
            self.nav.is_navigating(),
        );

        let live = self.channel.as_deref().filter(|_| self.live);
        let broadcast = self.broadcaster.tick(now, &self.camera.pose(), live);

        self.avatars.sync(&self.store);
        self.avatars.step();

        FrameReport {
            received,
            lock,
            broadcast,
        }
    }

    /// Leave the room: close the subscription, forget everyone, release the
    /// pointer and drop any pending lock attempt.
    pub fn teardown(&mut self, capture: &mut dyn PointerCapture) {
        if let Some(mut channel) = self.channel.take() {
            channel.unsubscribe();
        }
        self.live = false;
        self.store.clear();
        self.avatars.sync(&self.store);
        self.look_lock.cancel();
        self.look_lock.request_unlock(capture);
        self.nav.set(false);
        self.intents.clear();
        tracing::info!(user = self.identity.user_id.short(), "room session torn down");
    }

    fn apply_nav_request(&mut self, request: NavRequest, now: Instant) {
        if let Some(navigating) = request {
            self.set_navigating(navigating, now);
        }
    }

    pub fn open_search(&mut self, now: Instant) {
        let request = self.ui.open_search();
        self.apply_nav_request(request, now);
    }

    pub fn select_search_result(&mut self, book: &Book, now: Instant) {
        let request = self.ui.select_search_result(highlight_id(book));
        self.apply_nav_request(request, now);
    }

    pub fn select_book(&mut self, book_id: &str, now: Instant) {
        let request = self.ui.select_book(book_id);
        self.apply_nav_request(request, now);
    }

    pub fn open_admin(&mut self, now: Instant) {
        let request = self.ui.open_admin();
        self.apply_nav_request(request, now);
    }

    pub fn close_modal(&mut self, now: Instant) {
        let request = self.ui.close_modal();
        self.apply_nav_request(request, now);
    }

    /// Adopt a new club config and persist it. The form closes and the new
    /// value is shown even if the write fails.
    pub fn save_club(
        &mut self,
        store: &mut dyn KvStore,
        config: ClubConfig,
        now: Instant,
    ) -> Result<(), KvError> {
        self.club = config;
        let result = save_club_config(store, &self.club);
        let request = self.ui.admin_saved();
        self.apply_nav_request(request, now);
        result
    }

    pub fn set_club(&mut self, config: ClubConfig) {
        self.club = config;
    }

    pub fn club(&self) -> &ClubConfig {
        &self.club
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn camera(&self) -> &FirstPersonCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut FirstPersonCamera {
        &mut self.camera
    }

    pub fn store(&self) -> &RemotePresenceStore {
        &self.store
    }

    pub fn avatars(&self) -> &AvatarSet {
        &self.avatars
    }

    pub fn lock_state(&self) -> LockState {
        self.look_lock.state()
    }

    pub fn is_navigating(&self) -> bool {
        self.nav.is_navigating()
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn render_view(&self) -> RenderView {
        RenderView {
            eye: self.camera.position,
            forward: self.camera.forward(),
            fov_degrees: self.camera.fov.to_degrees(),
        }
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            users_in_room: self.store.len(),
            position: self.camera.position,
            yaw: self.camera.yaw,
            lock: self.look_lock.state(),
            navigating: self.nav.is_navigating(),
            connected: self.live,
            broadcasts_sent: self.broadcaster.sent_count(),
            strategy: self.motion.strategy_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use readingroom_common::UserId;
    use readingroom_input::{CaptureError, KeyBindings, MoveDirection};
    use readingroom_persist::{MemoryKvStore, load_club_config};
    use readingroom_presence::{MemoryHub, PresenceMessage, encode_frame};
    use std::time::Duration;

    #[derive(Default)]
    struct Capture {
        fail: bool,
        locks: usize,
    }

    impl PointerCapture for Capture {
        fn lock(&mut self) -> Result<(), CaptureError> {
            self.locks += 1;
            if self.fail {
                Err(CaptureError::Unsupported)
            } else {
                Ok(())
            }
        }
        fn unlock(&mut self) {}
    }

    const DT: f32 = 1.0 / 60.0;

    fn identity(id: &str) -> SessionIdentity {
        SessionIdentity {
            user_id: UserId::from(id),
            account: format!("{id}@example.org"),
            color: "#445566".into(),
            display_name: id.into(),
        }
    }

    fn session(id: &str, platform: Platform) -> RoomSession {
        RoomSession::new(identity(id), &RoomSettings::default(), platform).unwrap()
    }

    fn run(s: &mut RoomSession, cap: &mut Capture, t0: Instant, frames: u32) -> Instant {
        let step = Duration::from_secs_f32(DT);
        let mut now = t0;
        for _ in 0..frames {
            now += step;
            s.frame(now, DT, cap);
        }
        now
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = RoomSettings {
            avatar_smoothing: 0.0,
            ..RoomSettings::default()
        };
        let err = RoomSession::new(identity("me"), &settings, Platform::desktop()).unwrap_err();
        assert!(matches!(err, RoomError::Settings(_)));
    }

    #[test]
    fn uncapped_broadcast_interval_is_rejected() {
        let settings = RoomSettings {
            broadcast_interval_ms: 0,
            ..RoomSettings::default()
        };
        let err = RoomSession::new(identity("me"), &settings, Platform::desktop()).unwrap_err();
        assert!(matches!(err, RoomError::Settings(_)));
    }

    #[test]
    fn reentering_navigation_restarts_settle_delay() {
        let mut s = session("me", Platform::desktop());
        let mut cap = Capture::default();
        let t0 = Instant::now();
        s.set_navigating(true, t0);
        s.set_navigating(false, t0 + Duration::from_millis(10));
        assert_eq!(s.lock_state(), LockState::Unlocked);

        let t1 = t0 + Duration::from_millis(95);
        s.set_navigating(true, t1);
        assert_eq!(
            s.lock_state(),
            LockState::PendingLock {
                attempt_at: t1 + Duration::from_millis(100)
            }
        );
        s.frame(t0 + Duration::from_millis(110), DT, &mut cap);
        assert_eq!(cap.locks, 0);
        s.frame(t1 + Duration::from_millis(100), DT, &mut cap);
        assert_eq!(cap.locks, 1);
        assert_eq!(s.lock_state(), LockState::Locked);
    }

    #[test]
    fn escape_while_pending_abandons_capture() {
        let mut s = session("me", Platform::desktop());
        let mut cap = Capture::default();
        let t0 = Instant::now();
        s.set_navigating(true, t0);
        s.frame(t0 + Duration::from_millis(16), DT, &mut cap);
        assert!(matches!(s.lock_state(), LockState::PendingLock { .. }));

        s.release_pointer(&mut cap, t0 + Duration::from_millis(30));
        assert!(!s.is_navigating());
        assert_eq!(s.lock_state(), LockState::Unlocked);
        run(&mut s, &mut cap, t0 + Duration::from_millis(30), 30);
        assert_eq!(cap.locks, 0);
    }

    #[test]
    fn escape_while_locked_releases_once() {
        let mut s = session("me", Platform::desktop());
        let mut cap = Capture::default();
        let t0 = Instant::now();
        s.set_navigating(true, t0);
        let t1 = run(&mut s, &mut cap, t0, 10);
        assert_eq!(s.lock_state(), LockState::Locked);

        s.release_pointer(&mut cap, t1);
        assert!(!s.is_navigating());
        assert_eq!(s.lock_state(), LockState::Unlocked);
        s.release_pointer(&mut cap, t1);
        run(&mut s, &mut cap, t1, 10);
        assert_eq!(cap.locks, 1);
    }

    #[test]
    fn keyboard_walks_only_after_lock() {
        let mut s = session("me", Platform::desktop());
        let mut cap = Capture::default();
        let keys = KeyBindings::default();
        let t0 = Instant::now();
        let start = s.camera().position;

        s.handle_action(&keys.action_for("KeyW", true), t0);
        run(&mut s, &mut cap, t0, 3);
        assert_eq!(s.camera().position, start);

        s.handle_action(&Action::EnterNavigation, t0);
        let t1 = run(&mut s, &mut cap, t0, 30);
        assert_eq!(s.lock_state(), LockState::Locked);
        assert!(s.camera().position.z < start.z);
        assert_eq!(s.camera().position.y, 1.7);

        s.handle_action(&keys.action_for("KeyW", false), t1);
        let here = s.camera().position;
        run(&mut s, &mut cap, t1, 5);
        assert_eq!(s.camera().position, here);
    }

    #[test]
    fn failed_lock_drops_navigation_and_never_retries() {
        let mut s = session("me", Platform::desktop());
        let mut cap = Capture {
            fail: true,
            ..Default::default()
        };
        let t0 = Instant::now();
        s.handle_action(&Action::EnterNavigation, t0);
        run(&mut s, &mut cap, t0, 120);
        assert!(!s.is_navigating());
        assert_eq!(s.lock_state(), LockState::Unlocked);
        assert_eq!(cap.locks, 1);
    }

    #[test]
    fn escape_syncs_navigation_off() {
        let mut s = session("me", Platform::desktop());
        let mut cap = Capture::default();
        let t0 = Instant::now();
        s.set_navigating(true, t0);
        run(&mut s, &mut cap, t0, 10);
        assert_eq!(s.lock_state(), LockState::Locked);

        s.intent_handle()
            .apply(&Action::MoveStart(MoveDirection::Left));
        s.on_platform_unlock();
        assert!(!s.is_navigating());
        assert!(s.intent_handle().snapshot().is_idle());
        s.on_platform_unlock();
        assert!(!s.is_navigating());
    }

    #[test]
    fn touch_platform_moves_without_capture() {
        let mut s = session("me", Platform::touch());
        let mut cap = Capture {
            fail: true,
            ..Default::default()
        };
        let t0 = Instant::now();
        let start = s.camera().position;
        s.open_search(t0);
        s.close_modal(t0);
        assert!(s.is_navigating());
        s.intent_handle().apply(&Action::MoveStart(MoveDirection::Forward));
        run(&mut s, &mut cap, t0, 30);
        assert!(s.camera().position.z < start.z);
        assert!(s.is_navigating());
        assert_eq!(s.lock_state(), LockState::Unlocked);
        assert_eq!(cap.locks, 0);
    }

    #[test]
    fn two_sessions_see_each_other_but_not_themselves() {
        let hub = MemoryHub::new();
        let mut a = session("alice", Platform::desktop());
        let mut b = session("bob", Platform::desktop());
        a.connect(Box::new(hub.subscribe("room-1")));
        b.connect(Box::new(hub.subscribe("room-1")));
        assert!(a.is_live() && b.is_live());

        let mut cap = Capture::default();
        let t0 = Instant::now();
        a.camera_mut().position = Vec3::new(2.0, 1.7, 0.0);
        a.frame(t0, DT, &mut cap);
        let report = b.frame(t0, DT, &mut cap);
        assert_eq!(report.received, 1);
        a.frame(t0 + Duration::from_millis(1), DT, &mut cap);

        assert_eq!(b.summary().users_in_room, 1);
        let seen = b.store().get(&UserId::from("alice")).unwrap();
        assert_eq!(seen.position(), Vec3::new(2.0, 0.0, 0.0));
        let avatar = b.avatars().get(&UserId::from("alice")).unwrap();
        assert!(avatar.position.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-6));

        assert!(a.store().get(&UserId::from("alice")).is_none());
        assert_eq!(a.summary().users_in_room, 1);
    }

    #[test]
    fn echoed_own_frames_are_not_stored() {
        let hub = MemoryHub::new();
        let mut s = session("me", Platform::desktop());
        s.connect(Box::new(hub.subscribe("room-1")));
        let spoof = hub.subscribe("room-1");
        let mine = PresenceMessage {
            id: UserId::from("me"),
            pos: [0.0; 3],
            rot: [0.0; 3],
            color: "#000".into(),
            name: "me".into(),
        };
        spoof.send(&encode_frame(&mine).unwrap()).unwrap();
        let mut cap = Capture::default();
        s.frame(Instant::now(), DT, &mut cap);
        assert!(s.store().is_empty());
        assert!(s.avatars().is_empty());
    }

    #[test]
    fn broadcasts_stay_under_ten_per_second() {
        let hub = MemoryHub::new();
        let mut s = session("me", Platform::desktop());
        s.connect(Box::new(hub.subscribe("room-1")));
        let listener = hub.subscribe("room-1");
        let mut cap = Capture::default();
        run(&mut s, &mut cap, Instant::now(), 120);
        let n = listener.drain().len();
        assert!(n <= 21, "sent {n} in two seconds");
        assert!(n >= 15);
    }

    #[test]
    fn offline_session_still_moves() {
        let mut s = session("me", Platform::desktop());
        let mut cap = Capture::default();
        let report = s.frame(Instant::now(), DT, &mut cap);
        assert_eq!(report.broadcast, BroadcastOutcome::Offline);
    }

    #[test]
    fn teardown_clears_everything() {
        let hub = MemoryHub::new();
        let mut a = session("alice", Platform::desktop());
        let b = hub.subscribe("room-1");
        a.connect(Box::new(hub.subscribe("room-1")));
        let other = PresenceMessage {
            id: UserId::from("bob"),
            pos: [1.0, 0.0, 1.0],
            rot: [0.0; 3],
            color: "#111".into(),
            name: "bob".into(),
        };
        b.send(&encode_frame(&other).unwrap()).unwrap();

        let mut cap = Capture::default();
        let t0 = Instant::now();
        a.set_navigating(true, t0);
        a.frame(t0, DT, &mut cap);
        assert_eq!(a.summary().users_in_room, 1);
        assert!(matches!(a.lock_state(), LockState::PendingLock { .. }));

        a.teardown(&mut cap);
        assert!(a.store().is_empty());
        assert!(a.avatars().is_empty());
        assert_eq!(a.lock_state(), LockState::Unlocked);
        assert!(!a.is_live());
        assert_eq!(hub.subscriber_count("room-1"), 1);

        // The cancelled attempt never fires.
        a.frame(t0 + Duration::from_secs(1), DT, &mut cap);
        assert_eq!(cap.locks, 0);
    }

    #[test]
    fn search_flow_highlights_and_resumes_navigation() {
        let mut s = session("me", Platform::desktop());
        let t0 = Instant::now();
        s.set_navigating(true, t0);
        s.open_search(t0);
        assert!(!s.is_navigating());
        let hit = crate::catalog::search("borges")[0];
        s.select_search_result(hit, t0);
        assert!(s.is_navigating());
        assert_eq!(s.ui().highlighted(), Some("classic-Ficciones"));
    }

    #[test]
    fn saving_club_config_persists_and_closes_admin() {
        let mut s = session("me", Platform::desktop());
        let mut kv = MemoryKvStore::new();
        let t0 = Instant::now();
        s.open_admin(t0);
        let config = ClubConfig {
            current_book_title: "Ficciones".into(),
            ..ClubConfig::default()
        };
        s.save_club(&mut kv, config.clone(), t0).unwrap();
        assert_eq!(s.club(), &config);
        assert!(s.ui().modal().is_none());
        assert!(!s.is_navigating());
        assert_eq!(load_club_config(&kv), config);
    }
}
