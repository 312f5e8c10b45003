//! Lifecycle contract for an external frame producer, such as a trace player
//! hosted in a window. Nothing here renders; [`Player`] only tracks which
//! calls are legal and what state the producer is in.

use crate::{log_info, log_warn};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackConfig {
    pub trace_path: Option<PathBuf>,
    pub start_paused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Pause,
    Stop,
    Error,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Uninitialized,
    Playing,
    Paused,
    Stopped,
    Finished,
    Errored,
}

impl PlaybackState {
    /// Terminal states accept no more frames.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PlaybackState::Stopped | PlaybackState::Finished | PlaybackState::Errored
        )
    }
}

pub trait FrameSource {
    fn initialize(&mut self, config: &PlaybackConfig) -> bool;
    fn begin(&mut self);
    fn produce_frame(&mut self) -> FrameOutcome;
    fn shutdown(&mut self);
}

pub struct Player<S: FrameSource> {
    source: S,
    state: PlaybackState,
    frames: u64,
    shut_down: bool,
}

impl<S: FrameSource> Player<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: PlaybackState::Uninitialized,
            frames: 0,
            shut_down: false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn start(&mut self, config: &PlaybackConfig) -> PlaybackState {
        if self.state != PlaybackState::Uninitialized {
            log_warn!("Player already started ({:?})", self.state);
            return self.state;
        }

        if !self.source.initialize(config) {
            log_warn!("Frame source failed to initialize");
            self.state = PlaybackState::Errored;
            return self.state;
        }

        self.source.begin();
        self.state = if config.start_paused {
            PlaybackState::Paused
        } else {
            PlaybackState::Playing
        };
        log_info!("Playback started ({:?})", self.state);
        self.state
    }

    /// Produces one frame when playing. Any other state is returned as is.
    pub fn poll(&mut self) -> PlaybackState {
        if self.state != PlaybackState::Playing {
            return self.state;
        }

        let outcome = self.source.produce_frame();
        self.frames += 1;
        self.state = match outcome {
            FrameOutcome::Continue => PlaybackState::Playing,
            FrameOutcome::Pause => PlaybackState::Paused,
            FrameOutcome::Stop => PlaybackState::Stopped,
            FrameOutcome::Error => PlaybackState::Errored,
            FrameOutcome::Finished => PlaybackState::Finished,
        };
        if self.state != PlaybackState::Playing {
            log_info!("Playback {:?} after {} frames", self.state, self.frames);
        }
        self.state
    }

    pub fn pause(&mut self) -> PlaybackState {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
        self.state
    }

    pub fn resume(&mut self) -> PlaybackState {
        if self.state == PlaybackState::Paused {
            self.state = PlaybackState::Playing;
        }
        self.state
    }

    pub fn stop(&mut self) -> PlaybackState {
        if matches!(self.state, PlaybackState::Playing | PlaybackState::Paused) {
            self.state = PlaybackState::Stopped;
        }
        self.state
    }

    /// Polls until playback leaves `Playing` or `max_frames` frames have been
    /// produced. Returns the number of frames produced by this call.
    pub fn run_until_settled(&mut self, max_frames: u64) -> u64 {
        let before = self.frames;
        while self.state == PlaybackState::Playing && self.frames - before < max_frames {
            self.poll();
        }
        self.frames - before
    }

    pub fn shutdown(&mut self) {
        if self.shut_down || self.state == PlaybackState::Uninitialized {
            return;
        }
        self.source.shutdown();
        self.shut_down = true;
        if !self.state.is_terminal() {
            self.state = PlaybackState::Stopped;
        }
    }
}

impl<S: FrameSource> Drop for Player<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
