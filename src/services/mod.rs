pub mod outcome;

pub use outcome::{LogOutcomeReporter, MatchOutcome, OutcomeReporter, ReportError};
