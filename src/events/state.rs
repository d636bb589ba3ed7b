use crate::error::ValidationError;

/// The derived state every event handler carries: the time accumulator,
/// the current track index and the running status.
///
/// Strictly instance-scoped; each decode or encode pipeline owns its own
/// copy and nothing here is ever shared between pipelines.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HandlerState {
    absolute_time: i64,
    relative_time: i64,
    current_track: u16,
    running_status: Option<u8>,
}

impl HandlerState {
    /// A fresh state: time zero, track zero, no running status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the time accumulator.
    ///
    /// With `relative` set, `new_time` is a delta added to the absolute
    /// time. Otherwise `new_time` becomes the absolute time and the
    /// relative time becomes the distance from the prior absolute time.
    /// The absolute time may never go negative.
    pub fn update_time(&mut self, new_time: i64, relative: bool) -> Result<(), ValidationError> {
        if relative {
            self.relative_time = new_time;
            self.absolute_time += new_time;
        } else {
            self.relative_time = new_time - self.absolute_time;
            self.absolute_time = new_time;
        }
        if self.absolute_time < 0 {
            return Err(ValidationError::NegativeTime(self.absolute_time));
        }
        Ok(())
    }

    /// Resets both times to zero. Called at the start of every track.
    pub fn reset_time(&mut self) {
        self.relative_time = 0;
        self.absolute_time = 0;
    }

    /// The delta since the previous event.
    pub const fn relative_time(&self) -> i64 {
        self.relative_time
    }

    /// Zeroes the relative time, leaving the absolute time alone.
    ///
    /// A serializer calls this once it has written the delta, so the next
    /// event starts at delta zero unless `update_time` runs again.
    pub fn reset_relative_time(&mut self) {
        self.relative_time = 0;
    }

    /// Ticks since the start of the track.
    pub const fn absolute_time(&self) -> i64 {
        self.absolute_time
    }

    /// Records a new running status byte.
    ///
    /// Only true status bytes qualify, so the high bit must be set.
    pub fn set_running_status(&mut self, status: u8) -> Result<(), ValidationError> {
        if status & 0x80 == 0 {
            return Err(ValidationError::StatusHighBitUnset(status));
        }
        self.running_status = Some(status);
        Ok(())
    }

    /// The running status, if one is recorded.
    pub const fn running_status(&self) -> Option<u8> {
        self.running_status
    }

    /// Invalidates the running status. Any System message does this.
    pub fn reset_running_status(&mut self) {
        self.running_status = None;
    }

    /// Verifies that an event claiming to reuse the running status
    /// actually matches it.
    pub fn check_running_status(
        &self,
        use_running_status: bool,
        status: u8,
    ) -> Result<(), ValidationError> {
        if use_running_status && self.running_status != Some(status) {
            return Err(ValidationError::RunningStatusMismatch {
                status,
                running: self.running_status,
            });
        }
        Ok(())
    }

    /// Sets the current track index.
    pub fn set_current_track(&mut self, track: u16) {
        self.current_track = track;
    }

    /// The current track index.
    pub const fn current_track(&self) -> u16 {
        self.current_track
    }
}

#[test]
fn relative_and_absolute_updates() {
    use pretty_assertions::assert_eq;
    let mut state = HandlerState::new();
    state.update_time(100, true).unwrap();
    assert_eq!((state.relative_time(), state.absolute_time()), (100, 100));
    state.update_time(100, true).unwrap();
    assert_eq!((state.relative_time(), state.absolute_time()), (100, 200));
    state.update_time(500, false).unwrap();
    assert_eq!((state.relative_time(), state.absolute_time()), (300, 500));
    state.reset_time();
    assert_eq!((state.relative_time(), state.absolute_time()), (0, 0));
}

#[test]
fn absolute_time_never_goes_negative() {
    use pretty_assertions::assert_eq;
    let mut state = HandlerState::new();
    state.update_time(10, true).unwrap();
    assert_eq!(
        state.update_time(-20, true),
        Err(ValidationError::NegativeTime(-10))
    );
}

#[test]
fn running_status_needs_high_bit() {
    use pretty_assertions::assert_eq;
    let mut state = HandlerState::new();
    state.set_running_status(0b1001_0001).unwrap();
    assert_eq!(state.running_status(), Some(0x91));
    assert_eq!(
        state.set_running_status(0b0111_1111),
        Err(ValidationError::StatusHighBitUnset(0x7F))
    );
    state.reset_running_status();
    assert_eq!(state.running_status(), None);
}

#[test]
fn running_status_mismatch() {
    use pretty_assertions::assert_eq;
    let mut state = HandlerState::new();
    assert_eq!(
        state.check_running_status(true, 0x90),
        Err(ValidationError::RunningStatusMismatch {
            status: 0x90,
            running: None,
        })
    );
    state.set_running_status(0x90).unwrap();
    state.check_running_status(true, 0x90).unwrap();
    state.check_running_status(false, 0x80).unwrap();
}
