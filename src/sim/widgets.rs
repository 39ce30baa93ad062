//! Recording widgets and analytics sink.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::entities::{AnalyticsEvent, AnalyticsSink, PlaybackSpeed};
use crate::widgets::{
    CaptionWidget, FullscreenButton, ProgressSlider, QualityControl, SpeedControl,
    TransportControl, VolumeControl, Widgets,
};

/// One call the controller made on a widget
#[derive(Clone, Debug, PartialEq)]
pub enum WidgetCall {
    ControlPlay,
    ControlPause,
    TimeLabel(String),
    CaptionPlay,
    CaptionPause,
    CaptionTime(f64),
    CaptionResize,
    CaptionSpeed(String),
    SliderPlay,
    SliderTime(f64, f64),
    Speeds(Vec<String>, String),
    Volume(u8),
    Hd(bool),
    Fullscreen(bool, String),
}

/// Shared, ordered log of widget calls
#[derive(Clone, Debug, Default)]
pub struct WidgetLog {
    calls: Arc<Mutex<Vec<WidgetCall>>>,
}

impl WidgetLog {
    fn lock(&self) -> MutexGuard<'_, Vec<WidgetCall>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, call: WidgetCall) {
        self.lock().push(call);
    }

    pub fn calls(&self) -> Vec<WidgetCall> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn count(&self, call: &WidgetCall) -> usize {
        self.lock().iter().filter(|c| *c == call).count()
    }

    pub fn last_time_label(&self) -> Option<String> {
        self.lock().iter().rev().find_map(|c| match c {
            WidgetCall::TimeLabel(label) => Some(label.clone()),
            _ => None,
        })
    }

    /// Last time pushed to captions
    pub fn last_caption_time(&self) -> Option<f64> {
        self.lock().iter().rev().find_map(|c| match c {
            WidgetCall::CaptionTime(t) => Some(*t),
            _ => None,
        })
    }
}

/// Implements every widget trait, each one writing to the shared log.
#[derive(Clone, Debug)]
pub struct RecordingWidget {
    log: WidgetLog,
}

impl RecordingWidget {
    pub fn new(log: WidgetLog) -> Self {
        Self { log }
    }
}

impl TransportControl for RecordingWidget {
    fn play(&mut self) {
        self.log.push(WidgetCall::ControlPlay);
    }
    fn pause(&mut self) {
        self.log.push(WidgetCall::ControlPause);
    }
    fn set_time_label(&mut self, label: &str) {
        self.log.push(WidgetCall::TimeLabel(label.to_string()));
    }
}

impl CaptionWidget for RecordingWidget {
    fn play(&mut self) {
        self.log.push(WidgetCall::CaptionPlay);
    }
    fn pause(&mut self) {
        self.log.push(WidgetCall::CaptionPause);
    }
    fn update_play_time(&mut self, time: f64) {
        self.log.push(WidgetCall::CaptionTime(time));
    }
    fn resize(&mut self) {
        self.log.push(WidgetCall::CaptionResize);
    }
    fn set_current_speed(&mut self, speed: &PlaybackSpeed) {
        self.log.push(WidgetCall::CaptionSpeed(speed.as_str().to_string()));
    }
}

impl ProgressSlider for RecordingWidget {
    fn play(&mut self) {
        self.log.push(WidgetCall::SliderPlay);
    }
    fn update_play_time(&mut self, time: f64, duration: f64) {
        self.log.push(WidgetCall::SliderTime(time, duration));
    }
}

impl SpeedControl for RecordingWidget {
    fn set_speeds(&mut self, speeds: &[PlaybackSpeed], current: &PlaybackSpeed) {
        self.log.push(WidgetCall::Speeds(
            speeds.iter().map(|s| s.as_str().to_string()).collect(),
            current.as_str().to_string(),
        ));
    }
}

impl VolumeControl for RecordingWidget {
    fn set_volume(&mut self, level: u8) {
        self.log.push(WidgetCall::Volume(level));
    }
}

impl QualityControl for RecordingWidget {
    fn set_hd(&mut self, hd: bool) {
        self.log.push(WidgetCall::Hd(hd));
    }
}

impl FullscreenButton for RecordingWidget {
    fn set_fullscreen(&mut self, fullscreen: bool, title: &str) {
        self.log.push(WidgetCall::Fullscreen(fullscreen, title.to_string()));
    }
}

/// Full widget set (all optional widgets present) sharing one log
pub fn recording_widgets() -> (Widgets, WidgetLog) {
    let log = WidgetLog::default();
    let w = || RecordingWidget::new(log.clone());
    let widgets = Widgets {
        control: Box::new(w()),
        caption: Box::new(w()),
        speed_control: Box::new(w()),
        progress_slider: Box::new(w()),
        volume_control: Some(Box::new(w())),
        quality_control: Some(Box::new(w())),
        fullscreen_button: Box::new(w()),
    };
    (widgets, log)
}

/// Analytics sink keeping every event. Clones share the record.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<AnalyticsEvent>>>,
}

impl RecordingSink {
    fn lock(&self) -> MutexGuard<'_, Vec<AnalyticsEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.lock().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.lock().iter().map(AnalyticsEvent::name).collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl AnalyticsSink for RecordingSink {
    fn log(&self, event: &AnalyticsEvent) {
        log::debug!(target: "analytics", "{}", event.name());
        self.lock().push(event.clone());
    }
}
