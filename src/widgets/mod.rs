//! Widget-facing contract of the controller.
//!
//! Rendering belongs to the widgets; the controller only calls the methods
//! below. In the other direction widgets emit `player_events` on the
//! `EventEmitter` they were built with.

use crate::entities::PlaybackSpeed;

/// Play/pause button and the time label
pub trait TransportControl {
    fn play(&mut self);
    fn pause(&mut self);
    /// "m:ss / m:ss"
    fn set_time_label(&mut self, label: &str);
}

pub trait CaptionWidget {
    fn play(&mut self);
    fn pause(&mut self);
    fn update_play_time(&mut self, time: f64);
    /// Layout changed (fullscreen toggled)
    fn resize(&mut self);
    fn set_current_speed(&mut self, speed: &PlaybackSpeed);
}

pub trait ProgressSlider {
    fn play(&mut self);
    fn update_play_time(&mut self, time: f64, duration: f64);
}

pub trait SpeedControl {
    fn set_speeds(&mut self, speeds: &[PlaybackSpeed], current: &PlaybackSpeed);
}

pub trait VolumeControl {
    fn set_volume(&mut self, level: u8);
}

pub trait QualityControl {
    /// HD indicator on/off
    fn set_hd(&mut self, hd: bool);
}

pub trait FullscreenButton {
    /// Presentation switched; `title` is the button's new tooltip
    fn set_fullscreen(&mut self, fullscreen: bool, title: &str);
}

/// Everything the controller drives. Optional widgets may be absent; the
/// controller also drops the volume control on touch devices and the
/// quality control once a ready backend reports no quality levels.
pub struct Widgets {
    pub control: Box<dyn TransportControl>,
    pub caption: Box<dyn CaptionWidget>,
    pub speed_control: Box<dyn SpeedControl>,
    pub progress_slider: Box<dyn ProgressSlider>,
    pub volume_control: Option<Box<dyn VolumeControl>>,
    pub quality_control: Option<Box<dyn QualityControl>>,
    pub fullscreen_button: Box<dyn FullscreenButton>,
}
