// Copyright (c) 2026 rezky_nightky

//! Terminal stand-in for the sound layer. Cues become short captions shown
//! in the HUD, thunder rings the terminal bell, and ambient loops are
//! tracked so the same loop is never restarted while it plays.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::collab::{Ambient, Audio, Cue};

const CAPTION_TIME: Duration = Duration::from_millis(2500);

#[derive(Clone, Debug)]
struct Caption {
    text: &'static str,
    shown_at: Instant,
}

#[derive(Clone, Debug)]
pub struct AudioDeck {
    enabled: bool,
    ambient: Option<Ambient>,
    caption: Option<Caption>,
    bell: bool,
    starts: u32,
}

impl AudioDeck {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ambient: None,
            caption: None,
            bell: false,
            starts: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[cfg(test)]
    pub fn ambient(&self) -> Option<Ambient> {
        self.ambient
    }

    /// How many times an ambient loop has actually been (re)started.
    #[cfg(test)]
    pub fn ambient_starts(&self) -> u32 {
        self.starts
    }

    /// Flip mute. Muting silences the running loop; unmuting does not bring
    /// it back until the next phase asks for one.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        if !self.enabled {
            self.ambient = None;
            self.caption = None;
            self.bell = false;
        }
        debug!(enabled = self.enabled, "sound toggled");
        self.enabled
    }

    /// Caption to show right now, if a cue played recently.
    pub fn caption(&self, now: Instant) -> Option<&'static str> {
        let c = self.caption.as_ref()?;
        (now.duration_since(c.shown_at) < CAPTION_TIME).then_some(c.text)
    }

    /// Whether thunder asked for the bell since the last call.
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell)
    }
}

impl Audio for AudioDeck {
    fn play_cue(&mut self, cue: Cue) {
        if !self.enabled {
            return;
        }
        let text = cue.caption();
        if !text.is_empty() {
            self.caption = Some(Caption {
                text,
                shown_at: Instant::now(),
            });
        }
        if cue == Cue::Thunder {
            self.bell = true;
        }
    }

    fn play_ambient(&mut self, ambient: Ambient) {
        if !self.enabled || self.ambient == Some(ambient) {
            return;
        }
        self.ambient = Some(ambient);
        self.starts += 1;
        debug!(ambient = ambient.label(), starts = self.starts, "ambient loop started");
    }

    fn stop_ambient(&mut self) {
        self.ambient = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::Phase;

    #[test]
    fn same_loop_is_not_restarted() {
        let mut deck = AudioDeck::new(true);
        deck.play_ambient(Ambient::Rain);
        deck.play_ambient(Ambient::Rain);
        assert_eq!(deck.ambient_starts(), 1);
        deck.play_ambient(Ambient::Ocean);
        assert_eq!(deck.ambient(), Some(Ambient::Ocean));
        assert_eq!(deck.ambient_starts(), 2);
        deck.stop_ambient();
        assert_eq!(deck.ambient(), None);
    }

    #[test]
    fn muted_deck_ignores_everything() {
        let mut deck = AudioDeck::new(false);
        deck.play_ambient(Ambient::Rain);
        deck.play_cue(Cue::Thunder);
        assert_eq!(deck.ambient(), None);
        assert!(!deck.take_bell());
        assert_eq!(deck.caption(Instant::now()), None);
    }

    #[test]
    fn muting_stops_the_loop() {
        let mut deck = AudioDeck::new(true);
        deck.play_ambient(Ambient::Ocean);
        assert!(!deck.toggle());
        assert_eq!(deck.ambient(), None);
        assert!(deck.toggle());
        assert_eq!(deck.ambient(), None);
    }

    #[test]
    fn thunder_rings_once_and_captions_expire() {
        let mut deck = AudioDeck::new(true);
        deck.play_cue(Cue::Thunder);
        assert!(deck.take_bell());
        assert!(!deck.take_bell());

        deck.play_cue(Cue::Narration(Phase::Evaporation));
        let now = Instant::now();
        assert_eq!(
            deck.caption(now),
            Some(Cue::Narration(Phase::Evaporation).caption())
        );
        assert_eq!(deck.caption(now + CAPTION_TIME), None);
    }
}
