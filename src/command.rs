//! Wire shapes for the external request/response boundary. No transport is
//! implemented here — this crate's scope ends at `Command` — but the
//! response shapes are given real
//! `serde` types matching
//! `original_source/spatial_requests/planner_service.py`'s
//! `on_init`/`on_observation`/`on_plan` handlers, for a future transport
//! layer to serialize.

use serde::Serialize;

use crate::planner::Command;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "response")]
pub enum PlannerResponse {
    #[serde(rename = "ack")]
    Ack,
    #[serde(rename = "none")]
    None { spec_satisfied: bool },
    #[serde(rename = "execute")]
    Execute { spec_satisfied: bool, name: String, new_pos: (f64, f64), edge: (usize, usize) },
    #[serde(rename = "request")]
    Request { spec_satisfied: bool, text: String },
}

impl From<&Command> for PlannerResponse {
    fn from(cmd: &Command) -> Self {
        match cmd {
            Command::None { spec_satisfied } => PlannerResponse::None { spec_satisfied: *spec_satisfied },
            Command::Execute { name, new_pos, edge } => {
                PlannerResponse::Execute { spec_satisfied: false, name: name.clone(), new_pos: *new_pos, edge: *edge }
            }
            Command::Request { text } => PlannerResponse::Request { spec_satisfied: false, text: text.clone() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_command_serializes_with_tagged_response_field() {
        let cmd = Command::Execute { name: "blue".into(), new_pos: (1.0, 2.0), edge: (0, 1) };
        let resp = PlannerResponse::from(&cmd);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"response\":\"execute\""));
        assert!(json.contains("\"name\":\"blue\""));
    }
}
