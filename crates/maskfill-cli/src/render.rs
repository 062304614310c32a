//! Plain-text rendering of a session view.

use maskfill_core::view::{Part, SessionView};

/// Render a view for the terminal.
///
/// Empty blanks show as `[n]`, filled ones as `[n:value]` (1-based).
pub fn render(view: &SessionView) -> String {
    match view {
        SessionView::Setup { round, dataset } => {
            format!("Round: {round}\nDataset: {dataset}")
        }
        SessionView::Collecting {
            prompt,
            completed,
            total,
        } => {
            let mut line = String::new();
            for part in &prompt.parts {
                match part {
                    Part::Text(text) => line.push_str(text),
                    Part::Slot { index, value } if value.is_empty() => {
                        line.push_str(&format!("[{}]", index + 1))
                    }
                    Part::Slot { index, value } => {
                        line.push_str(&format!("[{}:{}]", index + 1, value))
                    }
                }
            }
            format!("\n({}/{}) {line}", completed + 1, total)
        }
        SessionView::Complete { message, completed } => {
            format!("\n{message}\nResponses submitted: {completed}")
        }
        SessionView::Unavailable { message } => message.clone(),
    }
}
