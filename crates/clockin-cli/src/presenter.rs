use std::io::Write;

use clockin_core::{Celebration, Presenter, SoundCue};

/// Rings the terminal bell and prints a line per effect.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn play_sound(&self, cue: SoundCue) {
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "\x07\n[{}]", cue.id());
        let _ = out.flush();
    }

    fn celebrate(&self, celebration: Celebration) {
        println!("\n*** {} ***", celebration.describe());
    }
}
