/// Operation lifecycle for the three remote actions
///
/// The update loop drives exactly one of these at a time. Progress is only
/// determinate for uploads; download and delete run indeterminate.

/// The three remote actions a user can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Upload,
    Download,
    Delete,
}

/// State of the current (or last) remote operation
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Nothing running, nothing to report
    Idle,
    /// A remote call is in flight; `percent` is Some for determinate progress
    InProgress {
        action: Action,
        percent: Option<u8>,
    },
    /// The last operation finished successfully
    Success { action: Action },
    /// The last operation failed with a user-visible message
    Failed { action: Action, message: String },
}

impl Operation {
    /// Start a determinate operation at 0%
    pub fn determinate(action: Action) -> Self {
        Operation::InProgress {
            action,
            percent: Some(0),
        }
    }

    /// Start an indeterminate operation
    pub fn indeterminate(action: Action) -> Self {
        Operation::InProgress {
            action,
            percent: None,
        }
    }

    /// True while a remote call is running. This is the one-slot guard:
    /// triggers arriving while it holds are rejected.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Operation::InProgress { .. })
    }

    /// Record transfer progress; ignored unless an operation is in flight
    pub fn advance(&mut self, percent: u8) {
        if let Operation::InProgress { percent: current, .. } = self {
            *current = Some(percent.min(100));
        }
    }

    /// Current determinate completion fraction, if any
    pub fn percent(&self) -> Option<u8> {
        match self {
            Operation::InProgress { percent, .. } => *percent,
            _ => None,
        }
    }
}
