// Result envelope returned by every action
//
// Serialized as `{"success": true, "data": ...}` or
// `{"success": false, "error": "..."}`. There is no third state.

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::ActionError;

/// Two-variant outcome of an action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult<T> {
    Success(T),
    Failure(ActionError),
}

impl<T> ActionResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success(_))
    }

    /// Payload of a successful result
    pub fn data(&self) -> Option<&T> {
        match self {
            ActionResult::Success(data) => Some(data),
            ActionResult::Failure(_) => None,
        }
    }

    /// Failure reason, if any
    pub fn error(&self) -> Option<&ActionError> {
        match self {
            ActionResult::Success(_) => None,
            ActionResult::Failure(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<T, ActionError> {
        self.into()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ActionResult<U> {
        match self {
            ActionResult::Success(data) => ActionResult::Success(f(data)),
            ActionResult::Failure(err) => ActionResult::Failure(err),
        }
    }
}

impl<T> From<Result<T, ActionError>> for ActionResult<T> {
    fn from(result: Result<T, ActionError>) -> Self {
        match result {
            Ok(data) => ActionResult::Success(data),
            Err(err) => ActionResult::Failure(err),
        }
    }
}

impl<T> From<ActionResult<T>> for Result<T, ActionError> {
    fn from(result: ActionResult<T>) -> Self {
        match result {
            ActionResult::Success(data) => Ok(data),
            ActionResult::Failure(err) => Err(err),
        }
    }
}

impl<T: Serialize> Serialize for ActionResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ActionResult", 2)?;
        match self {
            ActionResult::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            }
            ActionResult::Failure(err) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", &err.to_string())?;
            }
        }
        state.end()
    }
}
