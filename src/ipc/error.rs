use crate::calendar::GridError;
use crate::store::StoreError;
use crate::workflow::WorkflowError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

#[derive(Debug)]
pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_params(message: impl Into<String>) -> Self {
        Self::new("bad_params", message)
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<StoreError> for HandlerErr {
    fn from(e: StoreError) -> Self {
        let details = match &e {
            StoreError::Conflict {
                table,
                expected,
                found,
            } => Some(json!({ "table": table, "expected": expected, "found": found })),
            StoreError::Malformed { table, row, .. } => Some(json!({ "table": table, "row": row })),
            StoreError::Connectivity(_) => None,
        };
        Self {
            code: e.code(),
            message: e.to_string(),
            details,
        }
    }
}

impl From<WorkflowError> for HandlerErr {
    fn from(e: WorkflowError) -> Self {
        Self::new(e.code(), e.to_string())
    }
}

impl From<GridError> for HandlerErr {
    fn from(e: GridError) -> Self {
        Self::bad_params(e.to_string())
    }
}
