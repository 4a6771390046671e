use serde::{Deserialize, Serialize};

/// Lifecycle of a job. `Ok` is the only live value; a job never returns to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    #[default]
    Ok,
    Done,
    Fail,
    Abort,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        self != Self::Ok
    }
}

/// Tick-level result of an executed primitive action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionState {
    /// Still in flight.
    #[default]
    Ok,
    Done,
    Fail,
    Abort,
}

impl ActionState {
    pub fn is_finished(self) -> bool {
        self != Self::Ok
    }

    pub fn to_job_status(self) -> JobStatus {
        match self {
            Self::Ok => JobStatus::Ok,
            Self::Done => JobStatus::Done,
            Self::Fail => JobStatus::Fail,
            Self::Abort => JobStatus::Abort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ok_is_live() {
        assert!(!JobStatus::Ok.is_terminal());
        assert!(JobStatus::Done.is_terminal());
        assert!(JobStatus::Fail.is_terminal());
        assert!(JobStatus::Abort.is_terminal());
        assert!(!ActionState::Ok.is_finished());
        assert_eq!(ActionState::Fail.to_job_status(), JobStatus::Fail);
    }

    #[test]
    fn statuses_persist_as_plain_names() {
        let raw = serde_json::to_string(&JobStatus::Abort).expect("serialize");
        assert_eq!(raw, "\"Abort\"");
        let parsed: ActionState = serde_json::from_str("\"Done\"").expect("deserialize");
        assert_eq!(parsed, ActionState::Done);
    }
}
