//! Host collaborators consumed by the compositor.
//!
//! The compositor never looks these up globally: a [`HostServices`] bundle is handed to it at
//! construction and it only ever calls through these traits.

use crate::foundation::core::PixelRect;
use crate::pixel::format::PixelFormat;
use std::sync::mpsc;

/// Why a cooperative switch is being offered to the timing coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwitchReason {
    /// Screen content changed; a composite may be run at the next switch.
    Update,
}

/// Cooperative timing partner that decides when deferred composites run.
///
/// `request_switch` is fire-and-forget: implementations must not block the caller.
pub trait TimingCoordinator: Send {
    /// Offer a switch point tagged with `reason`.
    fn request_switch(&self, reason: SwitchReason);
}

/// Host settings consulted by the update path.
pub trait HostSettings: Send {
    /// Whether the host tolerates timing inaccuracies (skips the update rendezvous).
    fn timing_inaccuracies_enabled(&self) -> bool;
}

/// Windowing/presentation side of the host, told when screen geometry may have changed.
pub trait HostIntegration: Send {
    /// Called after every reflow with the geometry the host should present.
    fn refresh_settings(&self, info: &ScreenInfo);
}

/// Geometry reported to the host after a reflow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenInfo {
    /// Logical width of the active source.
    pub logical_width: u32,
    /// Logical height of the active source.
    pub logical_height: u32,
    /// Format of the active source.
    pub format: PixelFormat,
    /// Width / height the presented image should be shown at.
    pub aspect_ratio: f32,
    /// Fixed output surface width.
    pub output_width: u32,
    /// Fixed output surface height.
    pub output_height: u32,
    /// Where the active source lands inside the output surface.
    pub display_area: PixelRect,
}

/// Settings store with fixed answers, for hosts without a live settings backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StaticSettings {
    /// Answer for [`HostSettings::timing_inaccuracies_enabled`].
    #[serde(default)]
    pub timing_inaccuracies: bool,
}

impl HostSettings for StaticSettings {
    fn timing_inaccuracies_enabled(&self) -> bool {
        self.timing_inaccuracies
    }
}

/// Coordinator that ignores every switch request.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTiming;

impl TimingCoordinator for NoopTiming {
    fn request_switch(&self, _reason: SwitchReason) {}
}

/// Host integration that ignores geometry refreshes.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopIntegration;

impl HostIntegration for NoopIntegration {
    fn refresh_settings(&self, _info: &ScreenInfo) {}
}

/// Coordinator that forwards switch requests into a channel drained by the host loop.
///
/// The host receives each [`SwitchReason`] and decides when to call
/// [`GraphicsBackend::present_if_pending`](crate::GraphicsBackend::present_if_pending). At most
/// one request is queued; requests made while one is waiting coalesce into it.
#[derive(Debug)]
pub struct ChannelCoordinator {
    tx: mpsc::SyncSender<SwitchReason>,
}

impl ChannelCoordinator {
    /// Create a coordinator and the receiving end for the host loop.
    pub fn new() -> (Self, mpsc::Receiver<SwitchReason>) {
        let (tx, rx) = mpsc::sync_channel(1);
        (Self { tx }, rx)
    }
}

impl TimingCoordinator for ChannelCoordinator {
    fn request_switch(&self, reason: SwitchReason) {
        tracing::trace!(?reason, "switch requested");
        // Full: a request is already waiting. Disconnected: the host stopped listening.
        let _ = self.tx.try_send(reason);
    }
}

/// The collaborator handles a compositor is constructed with.
pub struct HostServices {
    /// Timing coordinator for the update rendezvous.
    pub timing: Box<dyn TimingCoordinator>,
    /// Settings store.
    pub settings: Box<dyn HostSettings>,
    /// Presentation-side notifications.
    pub integration: Box<dyn HostIntegration>,
}

impl HostServices {
    /// Services that accept every call and do nothing; timing inaccuracies are not tolerated.
    pub fn detached() -> Self {
        Self {
            timing: Box::new(NoopTiming),
            settings: Box::new(StaticSettings::default()),
            integration: Box::new(NoopIntegration),
        }
    }

    /// Replace the timing coordinator.
    pub fn with_timing(mut self, timing: impl TimingCoordinator + 'static) -> Self {
        self.timing = Box::new(timing);
        self
    }

    /// Replace the settings store.
    pub fn with_settings(mut self, settings: impl HostSettings + 'static) -> Self {
        self.settings = Box::new(settings);
        self
    }

    /// Replace the host integration.
    pub fn with_integration(mut self, integration: impl HostIntegration + 'static) -> Self {
        self.integration = Box::new(integration);
        self
    }
}

impl Default for HostServices {
    fn default() -> Self {
        Self::detached()
    }
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../tests/unit/host.rs"]
mod tests;
