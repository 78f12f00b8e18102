use std::collections::HashMap;

use crate::annotation::TextBoxId;

/// Recognizes two clicks on the same text box within `threshold_secs`.
///
/// Click times come from the UI clock (`egui::InputState::time`). Each box
/// keeps its own last-click time, so clicking box A and then box B never
/// counts as a double click.
#[derive(Clone, Debug)]
pub struct DoubleClickRecognizer {
    threshold_secs: f64,
    last_click: HashMap<TextBoxId, f64>,
}

impl DoubleClickRecognizer {
    pub fn new(threshold_ms: u64) -> Self {
        Self {
            threshold_secs: threshold_ms as f64 / 1000.0,
            last_click: HashMap::new(),
        }
    }

    /// Records a click and returns `true` when it completes a double click.
    /// A recognized pair is consumed, so a third click starts over.
    pub fn register(&mut self, id: TextBoxId, now: f64) -> bool {
        match self.last_click.remove(&id) {
            Some(previous) if now - previous <= self.threshold_secs && now >= previous => true,
            _ => {
                self.last_click.insert(id, now);
                false
            }
        }
    }

    pub fn forget(&mut self, id: TextBoxId) {
        self.last_click.remove(&id);
    }

    pub fn reset(&mut self) {
        self.last_click.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::DoubleClickRecognizer;

    #[test]
    fn two_quick_clicks_on_same_box() {
        let mut recognizer = DoubleClickRecognizer::new(300);
        assert!(!recognizer.register(1, 10.0));
        assert!(recognizer.register(1, 10.25));
        // Consumed: the next click begins a new pair.
        assert!(!recognizer.register(1, 10.4));
    }

    #[test]
    fn slow_clicks_do_not_count() {
        let mut recognizer = DoubleClickRecognizer::new(300);
        assert!(!recognizer.register(1, 1.0));
        assert!(!recognizer.register(1, 1.5));
        assert!(recognizer.register(1, 1.7));
    }

    #[test]
    fn clicks_are_scoped_per_box() {
        let mut recognizer = DoubleClickRecognizer::new(300);
        assert!(!recognizer.register(1, 5.0));
        assert!(!recognizer.register(2, 5.1));
        assert!(recognizer.register(1, 5.2));
    }

    #[test]
    fn threshold_is_configurable() {
        let mut recognizer = DoubleClickRecognizer::new(600);
        assert!(!recognizer.register(4, 0.0));
        assert!(recognizer.register(4, 0.5));
    }
}
