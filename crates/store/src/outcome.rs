/// Result of a store read that never fails outright.
///
/// `Degraded` carries the fallback value (empty) together with the backend
/// error that forced it, so callers can keep the conversation going while
/// tests and logs can still tell "nothing stored" from "store unavailable".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome<T> {
    Fresh(T),
    Degraded { value: T, reason: String },
}

impl<T> ReadOutcome<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Fresh(v) => v,
            Self::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Fresh(v) => v,
            Self::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Fresh(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ReadOutcome<U> {
        match self {
            Self::Fresh(v) => ReadOutcome::Fresh(f(v)),
            Self::Degraded { value, reason } => ReadOutcome::Degraded {
                value: f(value),
                reason,
            },
        }
    }
}

impl<T: Default> ReadOutcome<T> {
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self::Degraded {
            value: T::default(),
            reason: reason.into(),
        }
    }
}
