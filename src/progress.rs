//! A console progress bar counting ticks toward the run's tick limit.
//!
//! Only one bar is drawn at a time. It is finalized when the limit is reached or when the run
//! finishes early, whichever comes first.
use progress_bar::{
    finalize_progress_bar, init_progress_bar, set_progress_bar_action, set_progress_bar_progress,
    Color, Style,
};

use crate::log::trace;

pub struct TickProgress {
    max_ticks: usize,
    finalized: bool,
}

impl TickProgress {
    /// Draws an empty bar labeled "Ticks".
    #[must_use]
    pub fn start(max_ticks: usize) -> Self {
        trace!("initializing tick progress bar with max ticks {}", max_ticks);
        init_progress_bar(max_ticks);
        set_progress_bar_action("Ticks", Color::Blue, Style::Bold);
        TickProgress {
            max_ticks,
            finalized: false,
        }
    }

    pub fn update(&mut self, tick: usize) {
        if self.finalized {
            return;
        }
        set_progress_bar_progress(tick.min(self.max_ticks));
        if tick >= self.max_ticks {
            self.finish();
        }
    }

    pub fn finish(&mut self) {
        if !self.finalized {
            finalize_progress_bar();
            self.finalized = true;
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finalized
    }
}

impl Drop for TickProgress {
    fn drop(&mut self) {
        self.finish();
    }
}
