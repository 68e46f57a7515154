/// Debounce between the last keystroke and an automatic save.
pub(crate) const AUTO_SAVE_TIMEOUT_MS: i32 = 2400;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum SaveState {
    #[default]
    Clean,
    Unsaved,
    Saving,
}

/// What the editor must do after feeding an event into [`Autosave`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AutosaveAction {
    Nothing,
    /// (Re)start the debounce timer.
    Schedule,
    /// Cancel any pending timer and send the current content, tagged with this generation.
    Save(u64),
}

/// Autosave state machine for one open document.
///
/// Every dispatched save carries a generation number; completions for a
/// generation older than the latest dispatched one are discarded.
#[derive(Clone, Debug)]
pub(crate) struct Autosave {
    state: SaveState,
    enabled: bool,
    generation: u64,
    edited_while_saving: bool,
}

impl Default for Autosave {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Autosave {
    pub fn new(enabled: bool) -> Self {
        Self {
            state: SaveState::Clean,
            enabled,
            generation: 0,
            edited_while_saving: false,
        }
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn dispatch(&mut self) -> AutosaveAction {
        self.generation += 1;
        self.state = SaveState::Saving;
        self.edited_while_saving = false;
        tracing::debug!(generation = self.generation, "dispatching note save");
        AutosaveAction::Save(self.generation)
    }

    pub fn edit(&mut self) -> AutosaveAction {
        match self.state {
            SaveState::Saving => self.edited_while_saving = true,
            SaveState::Clean | SaveState::Unsaved => self.state = SaveState::Unsaved,
        }
        if self.enabled {
            AutosaveAction::Schedule
        } else {
            AutosaveAction::Nothing
        }
    }

    pub fn timer_fired(&mut self) -> AutosaveAction {
        if self.enabled && self.state == SaveState::Unsaved {
            self.dispatch()
        } else {
            AutosaveAction::Nothing
        }
    }

    /// Explicit save from the toolbar button or the keyboard shortcut.
    /// The shortcut does nothing while a save is in flight.
    pub fn manual_save(&mut self, from_shortcut: bool) -> AutosaveAction {
        if from_shortcut && self.state == SaveState::Saving {
            return AutosaveAction::Nothing;
        }
        self.dispatch()
    }

    pub fn set_enabled(&mut self, enabled: bool) -> AutosaveAction {
        self.enabled = enabled;
        if enabled && self.state == SaveState::Unsaved {
            self.dispatch()
        } else {
            AutosaveAction::Nothing
        }
    }

    /// Start over for another document. Saves already in flight become stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = SaveState::Clean;
        self.edited_while_saving = false;
    }

    /// Record the outcome of the save tagged `generation`.
    ///
    /// Returns `None` when the completion is stale and must be ignored entirely.
    pub fn save_finished(&mut self, generation: u64, ok: bool) -> Option<AutosaveAction> {
        if generation != self.generation {
            tracing::debug!(
                generation,
                latest = self.generation,
                "discarding stale save completion"
            );
            return None;
        }

        if ok && !self.edited_while_saving {
            self.state = SaveState::Clean;
            return Some(AutosaveAction::Nothing);
        }

        self.state = SaveState::Unsaved;
        let pending_edits = std::mem::take(&mut self.edited_while_saving);
        if pending_edits && self.enabled {
            Some(AutosaveAction::Schedule)
        } else {
            Some(AutosaveAction::Nothing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn edit_then_timer_saves_and_cleans() {
        let mut a = Autosave::default();
        assert_eq!(a.edit(), AutosaveAction::Schedule);
        assert_eq!(a.state(), SaveState::Unsaved);

        let AutosaveAction::Save(g) = a.timer_fired() else {
            panic!("timer should dispatch a save");
        };
        assert_eq!(a.state(), SaveState::Saving);
        assert_eq!(a.save_finished(g, true), Some(AutosaveAction::Nothing));
        assert_eq!(a.state(), SaveState::Clean);
    }

    #[test]
    fn disabled_autosave_never_fires() {
        let mut a = Autosave::new(false);
        assert_eq!(a.edit(), AutosaveAction::Nothing);
        assert_eq!(a.timer_fired(), AutosaveAction::Nothing);
        assert_eq!(a.state(), SaveState::Unsaved);
    }

    #[test]
    fn enabling_while_unsaved_saves_immediately() {
        let mut a = Autosave::new(false);
        a.edit();
        assert_eq!(a.set_enabled(true), AutosaveAction::Save(1));
        assert_eq!(a.state(), SaveState::Saving);

        let mut clean = Autosave::new(false);
        assert_eq!(clean.set_enabled(true), AutosaveAction::Nothing);
    }

    #[test]
    fn shortcut_is_ignored_while_saving() {
        let mut a = Autosave::default();
        a.edit();
        a.manual_save(true);
        assert_eq!(a.manual_save(true), AutosaveAction::Nothing);
        assert_eq!(a.generation(), 1);
    }

    #[test]
    fn edit_during_save_stays_unsaved() {
        let mut a = Autosave::default();
        a.edit();
        let AutosaveAction::Save(g) = a.manual_save(false) else {
            panic!("manual save should dispatch");
        };
        assert_eq!(a.edit(), AutosaveAction::Schedule);
        assert_eq!(a.state(), SaveState::Saving);

        assert_eq!(a.save_finished(g, true), Some(AutosaveAction::Schedule));
        assert_eq!(a.state(), SaveState::Unsaved);
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut a = Autosave::default();
        a.edit();
        let AutosaveAction::Save(first) = a.manual_save(false) else {
            panic!("first save should dispatch");
        };
        let AutosaveAction::Save(second) = a.manual_save(false) else {
            panic!("button save during save should dispatch");
        };
        assert!(second > first);

        assert_eq!(a.save_finished(second, true), Some(AutosaveAction::Nothing));
        assert_eq!(a.save_finished(first, false), None);
        assert_eq!(a.state(), SaveState::Clean);
    }

    #[test]
    fn reset_discards_in_flight_save_and_keeps_toggle() {
        let mut a = Autosave::new(false);
        a.edit();
        let AutosaveAction::Save(g) = a.manual_save(false) else {
            panic!("manual save should dispatch");
        };
        a.reset();
        assert_eq!(a.state(), SaveState::Clean);
        assert!(!a.enabled());
        assert_eq!(a.save_finished(g, false), None);
        assert_eq!(a.state(), SaveState::Clean);
    }

    #[test]
    fn failed_save_leaves_document_unsaved() {
        let mut a = Autosave::default();
        a.edit();
        let AutosaveAction::Save(g) = a.timer_fired() else {
            panic!("timer should dispatch a save");
        };
        assert_eq!(a.save_finished(g, false), Some(AutosaveAction::Nothing));
        assert_eq!(a.state(), SaveState::Unsaved);
    }
}
