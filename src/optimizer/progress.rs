//! Progress reporting for long searches, kept apart from the search itself

use crate::schedule::Bank;

/// Something that happened during a deposit search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    PassStarted {
        salary_bank: Option<Bank>,
        /// Upper bound on distributions the pass will visit
        estimated_candidates: u64,
    },
    /// Sent every `progress_interval` candidates
    Checked {
        salary_bank: Option<Bank>,
        checked: u64,
        admissible: u64,
    },
    /// The pass found a better solution than any before it
    NewBest {
        salary_bank: Option<Bank>,
        total_interest: f64,
    },
    PassFinished {
        salary_bank: Option<Bank>,
        checked: u64,
        admissible: u64,
    },
}

/// Receiver for search events
///
/// Passes run in parallel, so events from different passes may interleave.
pub trait ProgressObserver: Sync {
    fn on_event(&self, event: &SearchEvent);
}

impl<F> ProgressObserver for F
where
    F: Fn(&SearchEvent) + Sync,
{
    fn on_event(&self, event: &SearchEvent) {
        self(event)
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl ProgressObserver for Silent {
    fn on_event(&self, _event: &SearchEvent) {}
}

/// Forwards events to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_event(&self, event: &SearchEvent) {
        match event {
            SearchEvent::PassStarted {
                salary_bank,
                estimated_candidates,
            } => log::info!(
                "pass {}: up to {} distributions",
                pass_name(*salary_bank),
                estimated_candidates
            ),
            SearchEvent::Checked {
                salary_bank,
                checked,
                admissible,
            } => log::info!(
                "pass {}: checked {} ({} admissible)",
                pass_name(*salary_bank),
                checked,
                admissible
            ),
            SearchEvent::NewBest {
                salary_bank,
                total_interest,
            } => log::info!(
                "pass {}: new best {:.2}/yr",
                pass_name(*salary_bank),
                total_interest
            ),
            SearchEvent::PassFinished {
                salary_bank,
                checked,
                admissible,
            } => log::info!(
                "pass {} done: {} checked, {} admissible",
                pass_name(*salary_bank),
                checked,
                admissible
            ),
        }
    }
}

/// Label for a pass in progress output
pub fn pass_name(salary_bank: Option<Bank>) -> String {
    match salary_bank {
        Some(bank) => format!("salary to {}", bank),
        None => "no salary credit".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_closure_observer() {
        let seen = Mutex::new(Vec::new());
        let observer = |event: &SearchEvent| seen.lock().unwrap().push(event.clone());

        observer.on_event(&SearchEvent::PassStarted {
            salary_bank: None,
            estimated_candidates: 10,
        });
        Silent.on_event(&SearchEvent::PassStarted {
            salary_bank: None,
            estimated_candidates: 99,
        });

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_pass_name() {
        assert_eq!(pass_name(Some(Bank::Ocbc360)), "salary to OCBC 360");
        assert_eq!(pass_name(None), "no salary credit");
    }
}
