use std::time::Duration;

use log::{debug, info};
use serde_json::Value;
use tokio::time::sleep;

use crate::error::ResearchError;
use crate::gemini::{GeminiError, InteractionTransport, JobRequest};
use crate::report::describe_failure;
use crate::state_machine::{InteractionStatus, StateMachine, TrackedInteraction, Transition};

/// One progress observation handed to the caller while polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate<'a> {
    pub status: &'a InteractionStatus,
    pub message: &'a str,
    pub poll: u32,
}

/// Drives one interaction through submit → poll → terminal state.
///
/// Polling uses a fixed interval with no backoff. A non-200 response while
/// polling ends the run immediately; it is not retried.
pub struct LifecycleClient<T> {
    transport: T,
    agent: String,
    poll_interval: Duration,
}

impl<T: InteractionTransport> LifecycleClient<T> {
    pub fn new(transport: T, agent: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            transport,
            agent: agent.into(),
            poll_interval,
        }
    }

    /// Create the background interaction and return its id.
    pub async fn submit(&self, request: &JobRequest) -> Result<String, ResearchError> {
        let body = request.to_create_request(&self.agent);
        let response = self
            .transport
            .create_interaction(&body)
            .await
            .map_err(ResearchError::Submission)?;

        match response.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => {
                info!("interaction {id} created with agent {}", self.agent);
                Ok(id.to_string())
            }
            _ => Err(ResearchError::Submission(GeminiError::MalformedResponse(
                format!("no interaction id in response: {response}"),
            ))),
        }
    }

    /// Poll until the interaction completes or fails.
    ///
    /// Returns the full completed payload. When `on_progress` is given, it is
    /// called for every poll whose payload carries a `statusMessage`.
    pub async fn await_completion(
        &self,
        interaction_id: &str,
        mut on_progress: Option<&mut dyn FnMut(&StatusUpdate<'_>)>,
    ) -> Result<Value, ResearchError> {
        let mut tracked = TrackedInteraction::new(interaction_id.to_string());

        loop {
            let payload = self
                .transport
                .get_interaction(interaction_id)
                .await
                .map_err(ResearchError::Transport)?;

            let status = InteractionStatus::from_payload(&payload);
            let transition = StateMachine::next(&mut tracked, &status);
            debug!(
                "poll #{} for {}: status={status} state={}",
                tracked.poll_count, tracked.id, tracked.state
            );

            if let (Some(callback), Some(message)) = (on_progress.as_mut(), status_message(&payload))
            {
                callback(&StatusUpdate {
                    status: &status,
                    message,
                    poll: tracked.poll_count,
                });
            }

            match transition {
                Transition::Complete => {
                    info!(
                        "interaction {interaction_id} completed after {} polls ({}s)",
                        tracked.poll_count,
                        tracked.elapsed().num_seconds()
                    );
                    return Ok(payload);
                }
                Transition::Fail => {
                    return Err(ResearchError::JobFailed(describe_failure(&payload)));
                }
                Transition::Continue => sleep(self.poll_interval).await,
            }
        }
    }
}

fn status_message(payload: &Value) -> Option<&str> {
    payload
        .get("statusMessage")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::types::CreateInteractionRequest;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    const INTERVAL: Duration = Duration::from_secs(10);

    /// Transport fake that replays a script of poll responses.
    struct ScriptedTransport {
        create: Mutex<Option<Result<Value, GeminiError>>>,
        polls: Mutex<VecDeque<Result<Value, GeminiError>>>,
        sent: Mutex<Vec<CreateInteractionRequest>>,
        poll_times: Mutex<Vec<Instant>>,
    }

    impl ScriptedTransport {
        fn new(polls: Vec<Result<Value, GeminiError>>) -> Self {
            Self {
                create: Mutex::new(None),
                polls: Mutex::new(polls.into()),
                sent: Mutex::new(Vec::new()),
                poll_times: Mutex::new(Vec::new()),
            }
        }

        fn statuses(statuses: &[&str]) -> Self {
            Self::new(
                statuses
                    .iter()
                    .map(|s| Ok(json!({"id": "int-1", "status": s})))
                    .collect(),
            )
        }

        fn with_create(self, response: Result<Value, GeminiError>) -> Self {
            *self.create.lock().unwrap() = Some(response);
            self
        }

        fn poll_count(&self) -> usize {
            self.poll_times.lock().unwrap().len()
        }
    }

    impl InteractionTransport for ScriptedTransport {
        async fn create_interaction(
            &self,
            req: &CreateInteractionRequest,
        ) -> Result<Value, GeminiError> {
            self.sent.lock().unwrap().push(req.clone());
            self.create
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(json!({"id": "int-1", "status": "in_progress"})))
        }

        async fn get_interaction(&self, id: &str) -> Result<Value, GeminiError> {
            assert_eq!(id, "int-1");
            self.poll_times.lock().unwrap().push(Instant::now());
            self.polls
                .lock()
                .unwrap()
                .pop_front()
                .expect("polled past the end of the script")
        }
    }

    fn client(transport: ScriptedTransport) -> LifecycleClient<ScriptedTransport> {
        LifecycleClient::new(transport, "agent-x", INTERVAL)
    }

    #[tokio::test]
    async fn submit_returns_interaction_id() {
        let lc = client(ScriptedTransport::new(vec![]));
        let req = JobRequest::new("quantum error correction")
            .with_format(Some("bullet points".into()));

        let id = lc.submit(&req).await.unwrap();
        assert_eq!(id, "int-1");

        let sent = lc.transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].agent, "agent-x");
        assert!(sent[0].background);
        assert!(sent[0].input.ends_with("Format the output as follows:\nbullet points"));
    }

    #[tokio::test]
    async fn submit_rejection_is_submission_error() {
        let transport = ScriptedTransport::new(vec![]).with_create(Err(GeminiError::Api {
            status: 400,
            body: "bad agent".into(),
        }));
        let err = client(transport).submit(&JobRequest::new("q")).await.unwrap_err();
        assert!(matches!(
            err,
            ResearchError::Submission(GeminiError::Api { status: 400, .. })
        ));
    }

    #[tokio::test]
    async fn submit_without_id_is_submission_error() {
        let transport = ScriptedTransport::new(vec![]).with_create(Ok(json!({"status": "ok"})));
        let err = client(transport).submit(&JobRequest::new("q")).await.unwrap_err();
        assert!(matches!(
            err,
            ResearchError::Submission(GeminiError::MalformedResponse(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn polls_until_completed_at_fixed_interval() {
        let lc = client(ScriptedTransport::statuses(&["queued", "running", "completed"]));

        let payload = lc.await_completion("int-1", None).await.unwrap();
        assert_eq!(payload["status"], "completed");

        let times = lc.transport.poll_times.lock().unwrap();
        assert_eq!(times.len(), 3);
        for pair in times.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= INTERVAL && gap < INTERVAL + Duration::from_millis(5), "gap {gap:?}");
        }
        assert!(lc.transport.polls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_statuses_keep_polling() {
        let lc = client(ScriptedTransport::new(vec![
            Ok(json!({"id": "int-1"})),
            Ok(json!({"id": "int-1", "status": "reticulating_splines"})),
            Ok(json!({"id": "int-1", "status": "completed", "output": "done"})),
        ]));
        let payload = lc.await_completion("int-1", None).await.unwrap();
        assert_eq!(payload["output"], "done");
        assert_eq!(lc.transport.poll_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_status_surfaces_error_message() {
        let lc = client(ScriptedTransport::new(vec![
            Ok(json!({"id": "int-1", "status": "running"})),
            Ok(json!({"id": "int-1", "status": "failed", "error": "disk full"})),
        ]));
        let err = lc.await_completion("int-1", None).await.unwrap_err();
        match err {
            ResearchError::JobFailed(msg) => assert_eq!(msg, "disk full"),
            other => panic!("expected JobFailed, got {other:?}"),
        }
        assert_eq!(lc.transport.poll_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_while_polling_is_fatal() {
        let lc = client(ScriptedTransport::new(vec![
            Ok(json!({"id": "int-1", "status": "running"})),
            Err(GeminiError::Api {
                status: 502,
                body: "bad gateway".into(),
            }),
            Ok(json!({"id": "int-1", "status": "completed"})),
        ]));
        let err = lc.await_completion("int-1", None).await.unwrap_err();
        assert!(matches!(
            err,
            ResearchError::Transport(GeminiError::Api { status: 502, .. })
        ));
        assert_eq!(lc.transport.poll_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn progress_reported_only_when_message_present() {
        let lc = client(ScriptedTransport::new(vec![
            Ok(json!({"id": "int-1", "status": "running", "statusMessage": "Searching sources"})),
            Ok(json!({"id": "int-1", "status": "running"})),
            Ok(json!({"id": "int-1", "status": "running", "statusMessage": ""})),
            Ok(json!({"id": "int-1", "status": "completed", "statusMessage": "Done"})),
        ]));

        let mut seen = Vec::new();
        let record: &mut dyn FnMut(&StatusUpdate<'_>) = &mut |u: &StatusUpdate<'_>| {
            seen.push(format!("{}#{}: {}", u.status, u.poll, u.message));
        };
        lc.await_completion("int-1", Some(record)).await.unwrap();

        assert_eq!(
            seen,
            vec!["running#1: Searching sources", "completed#4: Done"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_completion_polls_once_without_waiting() {
        let lc = client(ScriptedTransport::statuses(&["completed"]));
        let start = Instant::now();
        lc.await_completion("int-1", None).await.unwrap();
        assert_eq!(lc.transport.poll_count(), 1);
        assert_eq!(Instant::now() - start, Duration::ZERO);
    }
}
