//! Mixer passthrough
//!
//! Thin validation layer over the optional mixer collaborator. Mixer faults
//! are contained the same way backend faults are: the operation degrades to
//! "unknown" or "declined" instead of failing the coordinator.

use crate::config::CoreConfig;
use crate::events::{CoreEvent, EventEmitter};
use crate::state::MixerState;
use ensemble_models::{CoreError, Mixer, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

/// Volume and mute control
pub struct MixerController {
    mixer: Option<Arc<dyn Mixer>>,
    events: EventEmitter,
    call_timeout: Option<Duration>,
}

impl MixerController {
    /// Wrap the optional mixer collaborator
    pub fn new(mixer: Option<Arc<dyn Mixer>>, events: EventEmitter, config: &CoreConfig) -> Self {
        Self {
            mixer,
            events,
            call_timeout: config.backend_call_timeout,
        }
    }

    /// Current volume in `[0..=100]`, or `None` without a mixer or answer
    pub async fn get_volume(&self) -> Option<u32> {
        let mixer = self.mixer.as_ref()?;
        self.contain("get_volume", mixer.get_volume()).await.flatten()
    }

    /// Set the volume; out-of-range values are a validation error
    pub async fn set_volume(&self, volume: u32) -> Result<bool> {
        if volume > 100 {
            return Err(CoreError::validation(format!(
                "Volume must be within [0..=100], got {volume}"
            )));
        }
        let Some(mixer) = self.mixer.as_ref() else {
            return Ok(false);
        };
        let accepted = self
            .contain("set_volume", mixer.set_volume(volume))
            .await
            .unwrap_or(false);
        if accepted {
            self.events.emit(CoreEvent::VolumeChanged { volume });
        }
        Ok(accepted)
    }

    /// Current mute state, or `None` without a mixer or answer
    pub async fn get_mute(&self) -> Option<bool> {
        let mixer = self.mixer.as_ref()?;
        self.contain("get_mute", mixer.get_mute()).await.flatten()
    }

    /// Set the mute state
    pub async fn set_mute(&self, mute: bool) -> bool {
        let Some(mixer) = self.mixer.as_ref() else {
            return false;
        };
        let accepted = self
            .contain("set_mute", mixer.set_mute(mute))
            .await
            .unwrap_or(false);
        if accepted {
            self.events.emit(CoreEvent::MuteChanged { mute });
        }
        accepted
    }

    /// Snapshot volume and mute for persistence
    pub async fn save_state(&self) -> MixerState {
        MixerState {
            volume: self.get_volume().await,
            mute: self.get_mute().await,
        }
    }

    /// Reapply a saved volume and mute
    pub async fn load_state(&self, state: &MixerState) -> Result<()> {
        if let Some(volume) = state.volume {
            self.set_volume(volume.min(100)).await?;
        }
        if let Some(mute) = state.mute {
            self.set_mute(mute).await;
        }
        Ok(())
    }

    async fn contain<T>(
        &self,
        operation: &str,
        call: impl std::future::Future<Output = Result<T>>,
    ) -> Option<T> {
        let outcome = match self.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    error!(operation, "mixer call timed out");
                    return None;
                }
            },
            None => call.await,
        };
        match outcome {
            Ok(value) => Some(value),
            Err(err) => {
                error!(operation, %err, "mixer call failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeMixer {
        volume: Mutex<Option<u32>>,
        mute: Mutex<Option<bool>>,
        faulty: bool,
    }

    #[async_trait]
    impl Mixer for FakeMixer {
        async fn get_volume(&self) -> Result<Option<u32>> {
            if self.faulty {
                return Err(CoreError::backend("boom"));
            }
            Ok(*self.volume.lock().unwrap())
        }

        async fn set_volume(&self, volume: u32) -> Result<bool> {
            if self.faulty {
                return Err(CoreError::backend("boom"));
            }
            *self.volume.lock().unwrap() = Some(volume);
            Ok(true)
        }

        async fn get_mute(&self) -> Result<Option<bool>> {
            Ok(*self.mute.lock().unwrap())
        }

        async fn set_mute(&self, mute: bool) -> Result<bool> {
            *self.mute.lock().unwrap() = Some(mute);
            Ok(true)
        }
    }

    fn controller(mixer: Option<Arc<dyn Mixer>>) -> MixerController {
        MixerController::new(mixer, EventEmitter::new(8), &CoreConfig::default())
    }

    #[tokio::test]
    async fn volume_round_trip_emits_event() {
        let controller = controller(Some(Arc::new(FakeMixer::default())));
        let mut rx = controller.events.subscribe();

        assert!(controller.set_volume(60).await.unwrap());
        assert_eq!(controller.get_volume().await, Some(60));
        assert_eq!(rx.recv().await.unwrap(), CoreEvent::VolumeChanged { volume: 60 });
    }

    #[tokio::test]
    async fn out_of_range_volume_is_rejected() {
        let controller = controller(Some(Arc::new(FakeMixer::default())));
        assert!(matches!(
            controller.set_volume(101).await,
            Err(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn missing_mixer_reports_unknown() {
        let controller = controller(None);
        assert_eq!(controller.get_volume().await, None);
        assert!(!controller.set_volume(50).await.unwrap());
        assert!(!controller.set_mute(true).await);
    }

    #[tokio::test]
    async fn mixer_fault_is_contained() {
        let controller = controller(Some(Arc::new(FakeMixer {
            faulty: true,
            ..Default::default()
        })));
        assert_eq!(controller.get_volume().await, None);
        assert!(!controller.set_volume(50).await.unwrap());
    }

    #[tokio::test]
    async fn mute_round_trip() {
        let controller = controller(Some(Arc::new(FakeMixer::default())));
        assert!(controller.set_mute(true).await);
        assert_eq!(controller.get_mute().await, Some(true));
    }
}
