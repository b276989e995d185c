use chrono::Utc;
use tracing::{info, warn};

use crate::artifacts::{answer_audio_key, question_audio_key, ArtifactStore};
use crate::interview::{self, InterviewSession, QuestionResponse};
use crate::llm_client::LlmClient;
use crate::speech::DeepgramClient;
use crate::workflow::nodes::NodeEnv;
use crate::workflow::state::{Step, WorkflowState};

pub async fn generate_questions(state: &mut WorkflowState, llm: &LlmClient) {
    let Some(job) = state.selected_job.clone() else {
        state.interview_questions.clear();
        state.fail(
            "No job selected for interview preparation",
            Step::JobSelection,
        );
        return;
    };

    let profile = state.resume.as_ref().and_then(|r| r.profile.clone());
    let count = state.user_preferences.question_count;

    match interview::generate_questions(&job, profile.as_ref(), count, llm).await {
        Ok(questions) => {
            state.interview_questions = questions;
            state.current_step = Step::InterviewSetup;
        }
        Err(e) => {
            state.interview_questions.clear();
            state.fail(
                format!("Question generation failed: {e}"),
                Step::InterviewPrep,
            );
        }
    }
}

pub fn initialize_session(state: &mut WorkflowState) {
    if state.interview_questions.is_empty() {
        state.interview_session = None;
        state.fail(
            "No interview questions available for session",
            Step::InterviewPrep,
        );
        return;
    }
    let Some(job) = state.selected_job.as_ref() else {
        state.interview_session = None;
        state.fail("No job selected for interview session", Step::JobSelection);
        return;
    };

    match InterviewSession::start(
        job.title.clone(),
        job.company.clone(),
        state.user_preferences.interview_type.clone(),
        state.interview_questions.clone(),
    ) {
        Ok(session) => {
            info!(
                "Interview session started: {} questions for '{}'",
                session.questions.len(),
                session.job_title
            );
            state.interview_session = Some(session);
            state.question_audio_key = None;
            state.current_step = Step::InterviewActive;
        }
        Err(e) => state.fail(e.to_string(), Step::InterviewPrep),
    }
}

/// Presents the current question, or grades the pending answer when audio is attached.
pub async fn conduct_question(state: &mut WorkflowState, env: &NodeEnv<'_>) {
    let Some(session) = state.interview_session.as_ref() else {
        state.fail("No active interview session", Step::InterviewPrep);
        return;
    };
    let index = session.current_question_index;
    let asked_at = session.question_asked_at;
    let Some(question) = session.current_question().cloned() else {
        state.fail("Question index out of bounds", Step::InterviewComplete);
        return;
    };

    let Some(audio) = state.pending_audio.take() else {
        if let Some(store) = &env.services.artifacts {
            state.question_audio_key = present_question(
                &env.services.speech,
                store,
                env.thread_id,
                index,
                &question.question,
            )
            .await;
        }
        state.current_step = Step::AwaitingResponse;
        state.say("Waiting for candidate audio response...");
        return;
    };

    let transcript = match env.services.speech.transcribe(&audio.bytes, &audio.mime).await {
        Ok(text) => text,
        Err(e) => {
            state.fail(format!("Transcription failed: {e}"), Step::InterviewActive);
            return;
        }
    };

    let feedback = match interview::generate_feedback(
        &question.question,
        question.category,
        &transcript,
        &env.services.llm,
    )
    .await
    {
        Ok(feedback) => feedback,
        Err(e) => {
            warn!("Feedback generation failed, recording fallback: {e}");
            interview::fallback_feedback(&e.to_string())
        }
    };

    let now = Utc::now();
    let audio_response_key = match &env.services.artifacts {
        Some(store) => {
            let key = answer_audio_key(env.thread_id, index, &audio.mime, now);
            match store.put(&key, audio.bytes, &audio.mime).await {
                Ok(()) => Some(key),
                Err(e) => {
                    warn!("Could not store answer audio: {e}");
                    None
                }
            }
        }
        None => None,
    };

    let response = QuestionResponse {
        question_id: index,
        question_text: question.question.clone(),
        audio_response_key,
        transcribed_text: transcript,
        time_taken_seconds: asked_at
            .map(|t| (now - t).num_milliseconds().max(0) as f64 / 1000.0),
        feedback: Some(feedback.to_formatted_string()),
        confidence_score: Some(feedback.confidence_score),
        accuracy_score: Some(feedback.accuracy_score),
        timestamp: now,
    };

    if let Some(session) = state.interview_session.as_mut() {
        session.record_response(response);
        info!(
            "Recorded answer to question {} ({}/{} answered)",
            index + 1,
            session.responses.len(),
            session.questions.len()
        );
    }
    state.current_step = Step::InterviewActive;
}

/// Speaks the question and stores the MP3. Failures only cost the audio.
async fn present_question(
    speech: &DeepgramClient,
    store: &ArtifactStore,
    thread_id: &str,
    index: usize,
    text: &str,
) -> Option<String> {
    let audio = match speech.synthesize(text).await {
        Ok(audio) => audio,
        Err(e) => {
            warn!("Question audio generation failed: {e}");
            return None;
        }
    };

    let key = question_audio_key(thread_id, index, Utc::now());
    match store.put(&key, audio.to_vec(), "audio/mpeg").await {
        Ok(()) => Some(key),
        Err(e) => {
            warn!("Could not store question audio: {e}");
            None
        }
    }
}

pub fn advance_question(state: &mut WorkflowState) {
    let Some(session) = state.interview_session.as_mut() else {
        state.fail("No active interview session", Step::InterviewPrep);
        return;
    };

    session.current_question_index += 1;
    session.question_asked_at = Some(Utc::now());
    state.question_audio_key = None;
    state.current_step = Step::InterviewActive;
}

pub fn finalize_interview(state: &mut WorkflowState) {
    let Some(session) = state.interview_session.as_mut() else {
        state.fail(
            "No active interview session to finalize",
            Step::InterviewPrep,
        );
        return;
    };

    session.finish();
    let answered = session.responses.len();
    let total = session.questions.len();
    let confidence = session.average_confidence();
    let accuracy = session.average_accuracy();
    info!("Interview finalized: {answered}/{total} answered");

    state.current_step = Step::InterviewComplete;
    state.say(format!(
        "Interview completed! {answered}/{total} questions answered."
    ));
    state.say(match confidence {
        Some(avg) if avg > 0.0 => format!("Average Confidence: {avg:.1}/10"),
        _ => "No confidence scores".to_string(),
    });
    state.say(match accuracy {
        Some(avg) if avg > 0.0 => format!("Average Accuracy: {avg:.1}/10"),
        _ => "No accuracy scores".to_string(),
    });
}
