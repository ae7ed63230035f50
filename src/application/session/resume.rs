use super::errors::SessionError;
use crate::application::agent::{Decision, ResumePayload, TurnInput};

/// Turns the decisions of one round into the next submission. One decision
/// is sent bare, several as an ordered sequence.
pub fn resume_input(decisions: Vec<Decision>) -> Result<TurnInput, SessionError> {
    let payload = match decisions.len() {
        0 => return Err(SessionError::EmptyDecisions),
        1 => ResumePayload::Single(decisions[0]),
        _ => ResumePayload::Batch(decisions),
    };
    Ok(TurnInput::Resume(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload_json(input: TurnInput) -> serde_json::Value {
        match input {
            TurnInput::Resume(payload) => serde_json::to_value(payload).expect("serializes"),
            other => panic!("expected resume input, got {other:?}"),
        }
    }

    #[test]
    fn single_decision_is_sent_bare() {
        let input = resume_input(vec![Decision::new(false)]).expect("resume input");
        assert_eq!(payload_json(input), json!({"authorized": false}));
    }

    #[test]
    fn several_decisions_keep_their_order() {
        let input = resume_input(vec![
            Decision::new(true),
            Decision::new(false),
            Decision::new(true),
        ])
        .expect("resume input");
        assert_eq!(
            payload_json(input),
            json!([{"authorized": true}, {"authorized": false}, {"authorized": true}])
        );
    }

    #[test]
    fn no_decisions_is_an_error() {
        assert!(matches!(
            resume_input(Vec::new()),
            Err(SessionError::EmptyDecisions)
        ));
    }
}
