//! Graph interpreter. Runs nodes from the thread's resume point until END or
//! an interrupt, writing a checkpoint after every node.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::state::Services;
use crate::workflow::checkpoint::{Checkpoint, Checkpointer};
use crate::workflow::graph::{GraphKind, NodeId, Target};
use crate::workflow::nodes::{run_node, NodeEnv};
use crate::workflow::state::{WorkflowInput, WorkflowState};
use crate::workflow::{WorkflowError, RECURSION_LIMIT};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    /// Paused at an interrupt; the next invocation starts at `next`.
    Interrupted { next: NodeId },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub thread_id: String,
    pub graph: GraphKind,
    pub status: RunStatus,
    /// Nodes executed by this invocation, in order.
    pub visited: Vec<NodeId>,
    pub state: WorkflowState,
}

#[derive(Clone)]
pub struct WorkflowRunner {
    services: Services,
    checkpointer: Arc<dyn Checkpointer>,
    /// One run at a time per thread. Idle entries are pruned on every acquisition.
    thread_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl WorkflowRunner {
    pub fn new(services: Services, checkpointer: Arc<dyn Checkpointer>) -> Self {
        Self {
            services,
            checkpointer,
            thread_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn checkpointer(&self) -> &Arc<dyn Checkpointer> {
        &self.checkpointer
    }

    /// Merges `input` into the thread's latest state and runs `kind` from its
    /// resume point (or the entry node for a fresh or finished thread).
    pub async fn invoke(
        &self,
        kind: GraphKind,
        thread_id: &str,
        input: WorkflowInput,
    ) -> Result<RunOutcome, WorkflowError> {
        self.run(kind, thread_id, None, input).await
    }

    /// Like `invoke`, but starts at `node` regardless of the checkpoint.
    pub async fn resume_at(
        &self,
        kind: GraphKind,
        thread_id: &str,
        node: NodeId,
        input: WorkflowInput,
    ) -> Result<RunOutcome, WorkflowError> {
        self.run(kind, thread_id, Some(node), input).await
    }

    pub async fn latest(&self, thread_id: &str) -> Result<Option<Checkpoint>, WorkflowError> {
        Ok(self.checkpointer.latest(thread_id).await?)
    }

    /// Edits the latest state outside a run. The new checkpoint keeps the
    /// previous position so the next invocation resumes where it would have.
    pub async fn update_state<F>(&self, thread_id: &str, edit: F) -> Result<Checkpoint, WorkflowError>
    where
        F: FnOnce(&mut WorkflowState) -> Result<(), WorkflowError>,
    {
        let _guard = self.lock_thread(thread_id).await;
        let latest = self.require_latest(thread_id).await?;

        let mut state = latest.state;
        edit(&mut state)?;

        let checkpoint = Checkpoint::new(
            thread_id,
            latest.seq + 1,
            latest.graph,
            latest.node,
            latest.next,
            state,
        );
        self.checkpointer.put(checkpoint.clone()).await?;
        debug!("[{thread_id}] state updated at seq {}", checkpoint.seq);
        Ok(checkpoint)
    }

    /// Resumes the thread's checkpointed graph at `node`, provided `check`
    /// accepts the latest checkpoint. The check and the run happen under the
    /// same thread lock.
    pub async fn resume_checked<F>(
        &self,
        thread_id: &str,
        node: NodeId,
        input: WorkflowInput,
        check: F,
    ) -> Result<RunOutcome, WorkflowError>
    where
        F: FnOnce(&Checkpoint) -> Result<(), WorkflowError>,
    {
        let _guard = self.lock_thread(thread_id).await;
        let latest = self.require_latest(thread_id).await?;
        check(&latest)?;

        let kind = latest.graph;
        self.run_locked(kind, thread_id, Some(node), input, Some(latest))
            .await
    }

    /// Deletes every checkpoint of the thread once no run holds it.
    pub async fn clear(&self, thread_id: &str) -> Result<u64, WorkflowError> {
        let guard = self.lock_thread(thread_id).await;
        let removed = self.checkpointer.clear(thread_id).await?;
        drop(guard);

        self.thread_locks.lock().await.retain(|_, l| Arc::strong_count(l) > 1);
        Ok(removed)
    }

    async fn require_latest(&self, thread_id: &str) -> Result<Checkpoint, WorkflowError> {
        self.checkpointer
            .latest(thread_id)
            .await?
            .ok_or_else(|| WorkflowError::ThreadNotFound(thread_id.to_string()))
    }

    async fn lock_thread(&self, thread_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.thread_locks.lock().await;
            // the map holds one reference; anything more is a holder or a waiter
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            locks
                .entry(thread_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    async fn run(
        &self,
        kind: GraphKind,
        thread_id: &str,
        start: Option<NodeId>,
        input: WorkflowInput,
    ) -> Result<RunOutcome, WorkflowError> {
        let _guard = self.lock_thread(thread_id).await;
        let latest = self.checkpointer.latest(thread_id).await?;
        self.run_locked(kind, thread_id, start, input, latest).await
    }

    async fn run_locked(
        &self,
        kind: GraphKind,
        thread_id: &str,
        start: Option<NodeId>,
        input: WorkflowInput,
        latest: Option<Checkpoint>,
    ) -> Result<RunOutcome, WorkflowError> {
        let graph = kind.build();

        let mut seq = latest.as_ref().map(|c| c.seq).unwrap_or(0);
        let resume_point = latest
            .as_ref()
            .filter(|c| c.graph == kind)
            .and_then(|c| c.next)
            .filter(|n| graph.contains(*n));
        let mut state = latest.map(|c| c.state).unwrap_or_default();

        state.merge(input);
        // errors from earlier runs were already reported
        state.error = None;

        let mut node = match start {
            Some(node) if graph.contains(node) => node,
            Some(node) => {
                return Err(WorkflowError::InvalidState(format!(
                    "node '{node}' is not part of the {} graph",
                    kind.as_str()
                )))
            }
            None => resume_point.unwrap_or(graph.entry()),
        };

        info!("[{thread_id}] running {} graph from {node}", kind.as_str());
        let env = NodeEnv {
            services: &self.services,
            thread_id,
        };
        let mut visited = Vec::new();

        loop {
            if visited.len() >= RECURSION_LIMIT {
                return Err(WorkflowError::RecursionLimit(RECURSION_LIMIT));
            }

            debug!("[{thread_id}] node {node}");
            run_node(node, &mut state, &env).await;
            visited.push(node);
            seq += 1;

            if let Some(resume_at) = graph.resume_point(node) {
                self.save(thread_id, seq, kind, node, Some(resume_at), &state)
                    .await?;
                info!("[{thread_id}] interrupted at {node}, resumes at {resume_at}");
                return Ok(RunOutcome {
                    thread_id: thread_id.to_string(),
                    graph: graph.kind(),
                    status: RunStatus::Interrupted { next: resume_at },
                    visited,
                    state,
                });
            }

            match graph.next(node, &state)? {
                Target::Node(next) => {
                    self.save(thread_id, seq, kind, node, Some(next), &state)
                        .await?;
                    node = next;
                }
                Target::End => {
                    self.save(thread_id, seq, kind, node, None, &state).await?;
                    info!(
                        "[{thread_id}] {} graph completed after {} nodes",
                        kind.as_str(),
                        visited.len()
                    );
                    return Ok(RunOutcome {
                        thread_id: thread_id.to_string(),
                        graph: graph.kind(),
                        status: RunStatus::Completed,
                        visited,
                        state,
                    });
                }
            }
        }
    }

    async fn save(
        &self,
        thread_id: &str,
        seq: i64,
        kind: GraphKind,
        node: NodeId,
        next: Option<NodeId>,
        state: &WorkflowState,
    ) -> Result<(), WorkflowError> {
        let checkpoint = Checkpoint::new(thread_id, seq, kind, node, next, state.clone());
        self.checkpointer.put(checkpoint).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::{InterviewSession, QuestionResponse};
    use crate::job_search::JobQuery;
    use crate::resume::ResumeData;
    use crate::test_utils::{sample_listing, sample_questions, sample_resume, MockProviders, MockReply};
    use crate::workflow::checkpoint::MemoryCheckpointer;
    use crate::workflow::state::{AudioClip, Message, NextAction, Step};
    use serde_json::json;

    fn runner(mock: &MockProviders) -> (WorkflowRunner, Arc<MemoryCheckpointer>) {
        let checkpointer = Arc::new(MemoryCheckpointer::new());
        (
            WorkflowRunner::new(mock.services(), checkpointer.clone()),
            checkpointer,
        )
    }

    fn questions_json(n: usize) -> serde_json::Value {
        let questions: Vec<_> = (0..n)
            .map(|i| {
                json!({
                    "question": format!("Question number {}?", i + 1),
                    "category": "technical",
                    "difficulty": "medium",
                    "tips": "Be concrete"
                })
            })
            .collect();
        json!({ "questions": questions })
    }

    fn feedback_json() -> serde_json::Value {
        json!({
            "evaluation": "Good answer",
            "strengths": ["Clear structure"],
            "weaknesses": [],
            "suggestions": ["More metrics"],
            "confidence_score": 8,
            "accuracy_score": 7
        })
    }

    fn interview_input(question_count: u32) -> WorkflowInput {
        let mut resume = ResumeData::from_text("raw");
        resume.profile = Some(sample_resume());
        let mut input = WorkflowInput {
            resume: Some(resume),
            selected_job: Some(sample_listing()),
            ..WorkflowInput::default()
        };
        let mut prefs = crate::workflow::UserPreferences::default();
        prefs.question_count = question_count;
        input.user_preferences = Some(prefs);
        input
    }

    fn answer(bytes: &[u8]) -> WorkflowInput {
        WorkflowInput {
            audio: Some(AudioClip {
                bytes: bytes.to_vec(),
                mime: "audio/wav".to_string(),
            }),
            ..WorkflowInput::default()
        }
    }

    #[tokio::test]
    async fn test_resume_graph_runs_to_end() {
        let mock = MockProviders::start().await;
        mock.push_chat_json(serde_json::to_value(sample_resume()).unwrap());
        mock.push_chat_json(json!({"overall_assessment": "Strong"}));
        let (runner, checkpointer) = runner(&mock);

        let outcome = runner
            .invoke(
                GraphKind::Resume,
                "workflow_u1_resume",
                WorkflowInput {
                    resume: Some(ResumeData::from_text("Priya Raman ...")),
                    ..WorkflowInput::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(
            outcome.visited,
            vec![NodeId::ParseResume, NodeId::AnalyzeResume, NodeId::ValidateResume]
        );
        assert_eq!(outcome.state.current_step, Step::JobSearch);

        let history = checkpointer.list("workflow_u1_resume").await.unwrap();
        let seqs: Vec<i64> = history.iter().map(|c| c.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(history[2].next, None);
        assert_eq!(history[0].next, Some(NodeId::AnalyzeResume));
    }

    #[tokio::test]
    async fn test_interview_interrupts_and_finalizes_once() {
        let mock = MockProviders::start().await;
        mock.push_chat_json(questions_json(2));
        let (runner, checkpointer) = runner(&mock);
        let thread = "interview_u1_senior_rust_engineer";

        let outcome = runner
            .invoke(GraphKind::Interview, thread, interview_input(2))
            .await
            .unwrap();
        assert_eq!(
            outcome.status,
            RunStatus::Interrupted {
                next: NodeId::ConductQuestion
            }
        );
        assert_eq!(outcome.state.current_step, Step::AwaitingResponse);
        assert_eq!(
            outcome.visited,
            vec![
                NodeId::GenerateQuestions,
                NodeId::InitializeSession,
                NodeId::ConductQuestion,
                NodeId::AwaitInput
            ]
        );

        // first answer: graded, advanced, paused on question 2
        mock.push_transcript("I would use ownership to avoid data races");
        mock.push_chat_json(feedback_json());
        let outcome = runner
            .invoke(GraphKind::Interview, thread, answer(b"RIFF-one"))
            .await
            .unwrap();
        assert!(matches!(outcome.status, RunStatus::Interrupted { .. }));
        let session = outcome.state.interview_session.as_ref().unwrap();
        assert_eq!(session.current_question_index, 1);
        assert_eq!(session.responses.len(), 1);
        assert!(session.is_active);

        // second answer: finalized
        mock.push_transcript("Tokio tasks and channels");
        mock.push_chat_json(feedback_json());
        let outcome = runner
            .invoke(GraphKind::Interview, thread, answer(b"RIFF-two"))
            .await
            .unwrap();
        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.state.current_step, Step::InterviewComplete);
        let session = outcome.state.interview_session.as_ref().unwrap();
        assert!(!session.is_active);
        assert_eq!(session.progress_percentage(), 100.0);
        let finalized = outcome
            .visited
            .iter()
            .filter(|n| **n == NodeId::FinalizeInterview)
            .count();
        assert_eq!(finalized, 1);

        let history = checkpointer.list(thread).await.unwrap();
        assert!(history.windows(2).all(|w| w[0].seq < w[1].seq));
        assert_eq!(history.last().unwrap().next, None);
    }

    #[tokio::test]
    async fn test_resume_without_audio_repeats_question() {
        let mock = MockProviders::start().await;
        mock.push_chat_json(questions_json(1));
        let (runner, _) = runner(&mock);
        let thread = "interview_u2_rust";

        runner
            .invoke(GraphKind::Interview, thread, interview_input(1))
            .await
            .unwrap();
        let outcome = runner
            .invoke(GraphKind::Interview, thread, WorkflowInput::default())
            .await
            .unwrap();

        assert_eq!(
            outcome.visited,
            vec![NodeId::ConductQuestion, NodeId::AwaitInput]
        );
        assert!(outcome.state.interview_session.unwrap().responses.is_empty());
    }

    #[tokio::test]
    async fn test_job_graph_no_results() {
        let mock = MockProviders::start().await;
        mock.push_serp(MockReply::json(json!({"jobs_results": []})));
        let (runner, _) = runner(&mock);

        let outcome = runner
            .invoke(
                GraphKind::Job,
                "workflow_u3_job",
                WorkflowInput {
                    job_query: Some(JobQuery::new("cobol", "Mars")),
                    ..WorkflowInput::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            outcome.visited,
            vec![NodeId::SearchJobs, NodeId::NoResultsHandler]
        );
        assert_eq!(outcome.state.current_step, Step::JobSearchComplete);
    }

    #[tokio::test]
    async fn test_master_graph_search_to_interview() {
        let mock = MockProviders::start().await;
        mock.push_chat_text("job_search");
        mock.push_serp(MockReply::json(json!({
            "jobs_results": [{
                "title": "Senior Rust Engineer",
                "company_name": "Ferrous Labs",
                "description": "Rust, PostgreSQL, Tokio"
            }]
        })));
        mock.push_chat_json(questions_json(1));
        let (runner, _) = runner(&mock);

        let mut resume = ResumeData::from_text("raw");
        resume.profile = Some(sample_resume());
        let mut prefs = crate::workflow::UserPreferences::default();
        prefs.next_action = NextAction::Interview;
        prefs.question_count = 1;

        let outcome = runner
            .invoke(
                GraphKind::Master,
                "workflow_u4_master",
                WorkflowInput {
                    resume: Some(resume),
                    job_query: Some(JobQuery::new("rust", "Remote")),
                    current_step: Some(Step::Complete),
                    user_preferences: Some(prefs),
                    messages: vec![Message::human("find rust jobs")],
                    ..WorkflowInput::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            outcome.status,
            RunStatus::Interrupted {
                next: NodeId::ConductQuestion
            }
        );
        assert_eq!(
            &outcome.visited[..4],
            &[
                NodeId::IntentClassifier,
                NodeId::SearchJobs,
                NodeId::SelectJob,
                NodeId::GenerateQuestions
            ]
        );
    }

    #[tokio::test]
    async fn test_master_graph_reports_errors() {
        let mock = MockProviders::start().await;
        let (runner, _) = runner(&mock);

        // no resume text: the first failure is the one reported
        let outcome = runner
            .invoke(GraphKind::Master, "workflow_u5_master", WorkflowInput::default())
            .await
            .unwrap();

        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(
            outcome.visited,
            vec![
                NodeId::IntentClassifier,
                NodeId::ParseResume,
                NodeId::AnalyzeResume,
                NodeId::ValidateResume,
                NodeId::ErrorHandler,
                NodeId::WorkflowComplete
            ]
        );
        assert!(outcome.state.error.is_none());
        assert!(outcome
            .state
            .messages
            .iter()
            .any(|m| m.content == "Error occurred: No resume text provided for parsing"));
        assert_eq!(outcome.state.current_step, Step::Complete);
    }

    #[tokio::test]
    async fn test_update_state_keeps_position() {
        let mock = MockProviders::start().await;
        mock.push_chat_json(questions_json(3));
        let (runner, _) = runner(&mock);
        let thread = "interview_u6_rust";

        let missing = runner
            .update_state(thread, |_| Ok(()))
            .await
            .unwrap_err();
        assert!(matches!(missing, WorkflowError::ThreadNotFound(_)));

        runner
            .invoke(GraphKind::Interview, thread, interview_input(3))
            .await
            .unwrap();
        let before = runner.latest(thread).await.unwrap().unwrap();

        let updated = runner
            .update_state(thread, |state| {
                let session = state.interview_session.as_mut().unwrap();
                session
                    .navigate_to(2)
                    .map_err(|e| WorkflowError::InvalidState(e.to_string()))
            })
            .await
            .unwrap();

        assert_eq!(updated.seq, before.seq + 1);
        assert_eq!(updated.next, Some(NodeId::ConductQuestion));
        assert_eq!(
            updated
                .state
                .interview_session
                .unwrap()
                .current_question_index,
            2
        );
    }

    #[tokio::test]
    async fn test_recursion_limit() {
        let mock = MockProviders::start().await;
        let (runner, _) = runner(&mock);

        // every question already answered: check/advance alternate past the limit
        let mut session = InterviewSession::start(
            "Senior Rust Engineer",
            "Ferrous Labs",
            "Technical Interview",
            sample_questions(20),
        )
        .unwrap();
        for i in 0..20 {
            session.record_response(QuestionResponse {
                question_id: i,
                question_text: String::new(),
                audio_response_key: None,
                transcribed_text: "answer".to_string(),
                time_taken_seconds: None,
                feedback: None,
                confidence_score: None,
                accuracy_score: None,
                timestamp: chrono::Utc::now(),
            });
        }

        let err = runner
            .resume_at(
                GraphKind::Interview,
                "interview_u7_rust",
                NodeId::CheckProgress,
                WorkflowInput {
                    interview_session: Some(session),
                    ..WorkflowInput::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::RecursionLimit(25)));
    }

    #[tokio::test]
    async fn test_resume_at_rejects_foreign_node() {
        let mock = MockProviders::start().await;
        let (runner, _) = runner(&mock);
        let err = runner
            .resume_at(
                GraphKind::Resume,
                "t",
                NodeId::ConductQuestion,
                WorkflowInput::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }

    fn require_active(checkpoint: &Checkpoint) -> Result<(), WorkflowError> {
        match &checkpoint.state.interview_session {
            Some(session) if session.is_active => Ok(()),
            _ => Err(WorkflowError::InvalidState("no active interview".to_string())),
        }
    }

    #[tokio::test]
    async fn test_concurrent_answers_after_last_question() {
        let mock = MockProviders::start().await;
        mock.push_chat_json(questions_json(1));
        let (runner, checkpointer) = runner(&mock);
        let thread = "interview_u1_one_question";

        runner
            .invoke(GraphKind::Interview, thread, interview_input(5))
            .await
            .unwrap();

        mock.push_transcript("Only answer");
        mock.push_chat_json(feedback_json());
        let (first, second) = tokio::join!(
            runner.resume_checked(thread, NodeId::ConductQuestion, answer(b"a"), require_active),
            runner.resume_checked(thread, NodeId::ConductQuestion, answer(b"b"), require_active),
        );

        let (done, rejected) = match (first, second) {
            (Ok(done), Err(rejected)) | (Err(rejected), Ok(done)) => (done, rejected),
            other => panic!("expected one accepted answer, got {other:?}"),
        };
        assert!(matches!(rejected, WorkflowError::InvalidState(_)));
        assert_eq!(done.status, RunStatus::Completed);

        let latest = checkpointer.latest(thread).await.unwrap().unwrap();
        assert_eq!(latest.state.error, None);
        let session = latest.state.interview_session.unwrap();
        assert!(!session.is_active);
        assert_eq!(session.responses.len(), 1);
        assert_eq!(mock.requests_to("/v1/listen").len(), 1);
    }

    #[tokio::test]
    async fn test_resume_checked_needs_a_thread() {
        let mock = MockProviders::start().await;
        let (runner, _) = runner(&mock);
        let err = runner
            .resume_checked("nobody", NodeId::ConductQuestion, answer(b"a"), |_| Ok(()))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::ThreadNotFound(_)));
    }

    #[tokio::test]
    async fn test_clear_waits_for_running_thread() {
        let mock = MockProviders::start().await;
        let (runner, checkpointer) = runner(&mock);
        runner
            .invoke(GraphKind::Job, "t", WorkflowInput::default())
            .await
            .unwrap();
        let before = checkpointer.list("t").await.unwrap().len() as u64;

        // a run in progress holds the thread
        let held = runner.lock_thread("t").await;
        let clearing = tokio::spawn({
            let runner = runner.clone();
            async move { runner.clear("t").await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!clearing.is_finished());
        assert_eq!(checkpointer.list("t").await.unwrap().len() as u64, before);

        drop(held);
        let removed = clearing.await.unwrap().unwrap();
        assert_eq!(removed, before);
        assert!(checkpointer.latest("t").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_idle_thread_locks_are_pruned() {
        let mock = MockProviders::start().await;
        let (runner, _) = runner(&mock);

        for thread in ["a", "b", "c"] {
            runner
                .invoke(GraphKind::Job, thread, WorkflowInput::default())
                .await
                .unwrap();
        }
        // only the most recent thread can still have an entry
        assert!(runner.thread_locks.lock().await.len() <= 1);

        runner.clear("c").await.unwrap();
        assert!(runner.thread_locks.lock().await.is_empty());
    }
}
