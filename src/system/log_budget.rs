use std::sync::atomic::{AtomicU64, Ordering};

/// Outcome of asking the budget for one log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogPermit {
    Granted,
    /// Granted, and no further lines will be.
    Last,
    Denied,
}

/// Caps per-request failure log lines across all hammers.
#[derive(Debug)]
pub struct LogBudget {
    remaining: Option<AtomicU64>,
}

impl LogBudget {
    /// `None` means unlimited.
    #[must_use]
    pub fn new(limit: Option<u64>) -> Self {
        Self {
            remaining: limit.map(AtomicU64::new),
        }
    }

    pub fn acquire(&self) -> LogPermit {
        let Some(remaining) = self.remaining.as_ref() else {
            return LogPermit::Granted;
        };
        match remaining.fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| {
            left.checked_sub(1)
        }) {
            Ok(1) => LogPermit::Last,
            Ok(_) => LogPermit::Granted,
            Err(_) => LogPermit::Denied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn unlimited_budget_always_grants() -> Result<(), String> {
        let budget = LogBudget::new(None);
        for _ in 0..1_000 {
            if budget.acquire() != LogPermit::Granted {
                return Err("Unlimited budget denied a line".to_owned());
            }
        }
        Ok(())
    }

    #[test]
    fn limited_budget_is_shared_across_threads() -> Result<(), String> {
        let budget = Arc::new(LogBudget::new(Some(50)));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let budget = Arc::clone(&budget);
                std::thread::spawn(move || {
                    (0..100)
                        .map(|_| budget.acquire())
                        .filter(|permit| *permit != LogPermit::Denied)
                        .count()
                })
            })
            .collect();
        let mut granted = 0usize;
        for handle in handles {
            let count = handle
                .join()
                .map_err(|_panic| "worker thread panicked".to_owned())?;
            granted = granted.saturating_add(count);
        }
        if granted != 50 {
            return Err(format!("Expected 50 grants, got {}", granted));
        }
        if budget.acquire() != LogPermit::Denied {
            return Err("Exhausted budget must deny".to_owned());
        }
        Ok(())
    }

    #[test]
    fn final_grant_is_marked_last() -> Result<(), String> {
        let budget = LogBudget::new(Some(2));
        let permits = [budget.acquire(), budget.acquire(), budget.acquire()];
        if permits != [LogPermit::Granted, LogPermit::Last, LogPermit::Denied] {
            return Err(format!("Unexpected permits {:?}", permits));
        }
        Ok(())
    }
}
