//! Video frame timing and audio frames per video frame.

use crate::system_info::{SystemInfo, NTSC_FRAME_TIME, PAL_FRAME_TIME};
use emu_core::logging::{log, LogCategory, LogLevel};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoSystem {
    Ntsc,
    Pal,
}

impl VideoSystem {
    /// Accepted frame rates in frames per second
    pub fn valid_rates(self) -> std::ops::RangeInclusive<f64> {
        match self {
            VideoSystem::Ntsc => 55.0..=65.0,
            VideoSystem::Pal => 45.0..=65.0,
        }
    }

    pub fn default_frame_time(self) -> Duration {
        match self {
            VideoSystem::Ntsc => NTSC_FRAME_TIME,
            VideoSystem::Pal => PAL_FRAME_TIME,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FrameTiming {
    ntsc_frame_time: f64,
    pal_frame_time: f64,
    video_system: VideoSystem,
    audio_rate: u32,
    audio_frames_per_video_frame: u32,
    audio_frames_per_video_frame_exact: f64,
    carry: f64,
    speed: f64,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self {
            ntsc_frame_time: NTSC_FRAME_TIME.as_secs_f64(),
            pal_frame_time: PAL_FRAME_TIME.as_secs_f64(),
            video_system: VideoSystem::Ntsc,
            audio_rate: 0,
            audio_frames_per_video_frame: 0,
            audio_frames_per_video_frame_exact: 0.0,
            carry: 0.0,
            speed: 1.0,
        }
    }
}

impl FrameTiming {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timing for `info`, honoring PAL mode only on systems that have it
    pub fn for_system(info: &SystemInfo, pal_mode: bool) -> Self {
        let mut timing = Self::new();
        if pal_mode && info.has_pal {
            timing.video_system = VideoSystem::Pal;
        }
        timing
    }

    pub fn video_system(&self) -> VideoSystem {
        self.video_system
    }

    pub fn set_video_system(&mut self, system: VideoSystem) {
        self.video_system = system;
        self.reconfigure();
    }

    pub fn frame_time_for(&self, system: VideoSystem) -> f64 {
        match system {
            VideoSystem::Ntsc => self.ntsc_frame_time,
            VideoSystem::Pal => self.pal_frame_time,
        }
    }

    /// Seconds per frame of the active video system
    pub fn frame_time(&self) -> f64 {
        self.frame_time_for(self.video_system)
    }

    pub fn frame_rate(&self) -> f64 {
        let time = self.frame_time();
        if time > 0.0 {
            1.0 / time
        } else {
            0.0
        }
    }

    pub fn frame_time_is_valid(system: VideoSystem, secs: f64) -> bool {
        secs > 0.0 && system.valid_rates().contains(&(1.0 / secs))
    }

    /// Override a video system's frame time, e.g. to match the display.
    /// Returns false and keeps the old value when out of range.
    pub fn set_frame_time(&mut self, system: VideoSystem, secs: f64) -> bool {
        if !Self::frame_time_is_valid(system, secs) {
            log(LogCategory::Timing, LogLevel::Warn, || {
                format!("rejected {:?} frame time {:.6}s", system, secs)
            });
            return false;
        }
        match system {
            VideoSystem::Ntsc => self.ntsc_frame_time = secs,
            VideoSystem::Pal => self.pal_frame_time = secs,
        }
        self.reconfigure();
        true
    }

    pub fn reset_frame_time(&mut self, system: VideoSystem) {
        let secs = system.default_frame_time().as_secs_f64();
        match system {
            VideoSystem::Ntsc => self.ntsc_frame_time = secs,
            VideoSystem::Pal => self.pal_frame_time = secs,
        }
        self.reconfigure();
    }

    /// Configure for an audio output rate in Hz
    pub fn configure_audio(&mut self, rate: u32) {
        self.audio_rate = rate;
        self.reconfigure();
    }

    fn reconfigure(&mut self) {
        let exact = self.audio_rate as f64 * self.frame_time();
        self.audio_frames_per_video_frame_exact = exact;
        self.audio_frames_per_video_frame = exact.ceil() as u32;
        self.carry = exact;
        log(LogCategory::Timing, LogLevel::Debug, || {
            format!(
                "{:.3} fps, {:.3} audio frames per video frame",
                self.frame_rate(),
                exact
            )
        });
    }

    /// Upper bound of audio frames produced per video frame
    pub fn audio_frames_per_video_frame(&self) -> u32 {
        self.audio_frames_per_video_frame
    }

    /// Audio frames to produce for the next video frame, carrying the
    /// fractional remainder forward so the long-run average is exact.
    pub fn update_audio_frames_per_video_frame(&mut self) -> u32 {
        let whole = self.carry.trunc();
        self.carry = self.carry.fract() + self.audio_frames_per_video_frame_exact;
        whole as u32
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Emulation speed multiplier, 1.0 for normal speed
    pub fn set_speed(&mut self, speed: f64) {
        if speed > 0.0 {
            self.speed = speed;
        }
    }

    /// Wall-clock time per emulated frame at the current speed
    pub fn effective_frame_time(&self) -> Duration {
        Duration::from_secs_f64(self.frame_time() / self.speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system_info::SystemId;

    #[test]
    fn test_default_rates() {
        let timing = FrameTiming::new();
        assert!((timing.frame_rate() - 60.0).abs() < 0.001);
        let pal = FrameTiming::for_system(SystemId::MegaDrive.info(), true);
        assert_eq!(pal.video_system(), VideoSystem::Pal);
        assert!((pal.frame_rate() - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_pal_ignored_without_support() {
        let timing = FrameTiming::for_system(SystemId::GameBoyAdvance.info(), true);
        assert_eq!(timing.video_system(), VideoSystem::Ntsc);
    }

    #[test]
    fn test_set_frame_time_validation() {
        let mut timing = FrameTiming::new();
        assert!(timing.set_frame_time(VideoSystem::Ntsc, 1.0 / 59.94));
        assert!(!timing.set_frame_time(VideoSystem::Ntsc, 1.0 / 50.0));
        assert!((timing.frame_rate() - 59.94).abs() < 0.001);

        assert!(timing.set_frame_time(VideoSystem::Pal, 1.0 / 50.0));
        assert!(!timing.set_frame_time(VideoSystem::Pal, 1.0 / 70.0));
        assert!(!timing.set_frame_time(VideoSystem::Pal, 0.0));

        timing.reset_frame_time(VideoSystem::Ntsc);
        assert!((timing.frame_rate() - 60.0).abs() < 0.001);
    }

    #[test]
    fn test_audio_frames_carry() {
        let mut timing = FrameTiming::new();
        assert!(timing.set_frame_time(VideoSystem::Ntsc, 1.0 / 64.0));
        timing.configure_audio(48000);
        assert_eq!(timing.audio_frames_per_video_frame(), 750);
        assert_eq!(timing.update_audio_frames_per_video_frame(), 750);

        // 689.0625 per frame
        timing.configure_audio(44100);
        assert_eq!(timing.audio_frames_per_video_frame(), 690);
        let total: u32 = (0..17).map(|_| timing.update_audio_frames_per_video_frame()).sum();
        assert_eq!(total, 689 * 17 + 1);
    }

    #[test]
    fn test_speed_multiplier() {
        let mut timing = FrameTiming::new();
        timing.set_speed(2.0);
        let t = timing.effective_frame_time().as_secs_f64();
        assert!((t - 1.0 / 120.0).abs() < 1e-6);
        timing.set_speed(0.0);
        assert_eq!(timing.speed(), 2.0);
    }
}
