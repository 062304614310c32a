//! Per-sentence answer buffer.

/// Answers typed so far for the blanks of the current sentence.
///
/// The buffer knows how many slots the sentence has, but the stored values
/// follow the survey's clearing rule: after every write, trailing empty
/// entries are dropped. An empty value written into a middle slot stays as a
/// placeholder, so the buffer can be shorter than the slot count but never
/// loses the position of a non-empty answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    slots: usize,
    values: Vec<String>,
}

impl InputBuffer {
    /// An all-empty buffer for a sentence with `slots` blanks.
    pub fn with_slots(slots: usize) -> Self {
        Self {
            slots,
            values: vec![String::new(); slots],
        }
    }

    /// Number of blanks in the sentence this buffer belongs to.
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Current number of stored entries. Equals `slots()` until trimming kicks in.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value shown in `slot`; slots past the stored entries read as empty.
    pub fn get(&self, slot: usize) -> &str {
        self.values.get(slot).map(String::as_str).unwrap_or("")
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Write `value` into `slot`, then drop trailing empty entries.
    ///
    /// Returns `false` without touching the buffer if `slot` is out of range.
    pub fn set(&mut self, slot: usize, value: impl Into<String>) -> bool {
        if slot >= self.slots {
            return false;
        }
        if self.values.len() <= slot {
            self.values.resize(slot + 1, String::new());
        }
        self.values[slot] = value.into();
        self.trim_trailing_empty();
        true
    }

    fn trim_trailing_empty(&mut self) {
        while self.values.last().is_some_and(|v| v.is_empty()) {
            self.values.pop();
        }
    }
}
