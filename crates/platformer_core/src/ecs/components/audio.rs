//! Audio announcement component
//!
//! Maps gameplay event names to clip names and forwards them to an
//! [`AudioSink`]. Playback itself is the sink's concern.

use crate::ecs::{AudioEmitter, Component, ComponentTag};
use log::trace;
use std::collections::HashMap;
use std::fmt;

/// Destination for clip playback requests
pub trait AudioSink {
    /// Play the named clip
    fn play_clip(&mut self, clip: &str);
}

/// Plays a bound clip whenever its entity announces an event
pub struct AudioComponent {
    sounds: HashMap<String, String>,
    sink: Box<dyn AudioSink>,
}

impl AudioComponent {
    /// Create a component with no bound events
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sounds: HashMap::new(),
            sink,
        }
    }

    /// Bind `clip` to `event`, replacing any previous binding
    pub fn bind(&mut self, event: impl Into<String>, clip: impl Into<String>) {
        self.sounds.insert(event.into(), clip.into());
    }

    /// Builder form of [`Self::bind`]
    #[must_use]
    pub fn with_sound(mut self, event: impl Into<String>, clip: impl Into<String>) -> Self {
        self.bind(event, clip);
        self
    }

    /// Clip bound to `event`
    pub fn clip_for(&self, event: &str) -> Option<&str> {
        self.sounds.get(event).map(String::as_str)
    }
}

impl fmt::Debug for AudioComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioComponent")
            .field("sounds", &self.sounds)
            .finish_non_exhaustive()
    }
}

impl Component for AudioComponent {
    fn tag(&self) -> ComponentTag {
        ComponentTag::AUDIO
    }

    fn as_audio_emitter(&mut self) -> Option<&mut dyn AudioEmitter> {
        Some(self)
    }
}

impl AudioEmitter for AudioComponent {
    fn play(&mut self, event: &str) {
        match self.sounds.get(event) {
            Some(clip) => self.sink.play_clip(clip),
            None => trace!("No clip bound to audio event '{event}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Scene, SceneConfig, REMOVE_EVENT};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingSink(Rc<RefCell<Vec<String>>>);

    impl AudioSink for RecordingSink {
        fn play_clip(&mut self, clip: &str) {
            self.0.borrow_mut().push(clip.to_string());
        }
    }

    #[test]
    fn test_unbound_event_is_silent() {
        let sink = RecordingSink::default();
        let mut audio = AudioComponent::new(Box::new(sink.clone())).with_sound("jump", "jump.ogg");

        audio.play("land");
        audio.play("jump");
        assert_eq!(*sink.0.borrow(), vec!["jump.ogg".to_string()]);
        assert_eq!(audio.clip_for("land"), None);
    }

    #[test]
    fn test_remove_announces_event_once() {
        let sink = RecordingSink::default();
        let mut scene = Scene::new(SceneConfig::default());
        let id = scene.spawn(0.0, 0.0, 0.0);
        scene.entity_mut(id).unwrap().add_component(
            AudioComponent::new(Box::new(sink.clone())).with_sound(REMOVE_EVENT, "pop.wav"),
        );

        let mut entity = scene.entity_mut(id).unwrap();
        entity.remove();
        entity.remove();
        assert_eq!(*sink.0.borrow(), vec!["pop.wav".to_string()]);
    }
}
