//! Tests for [`chat_engine::ChatEngine`]: prompt construction over the engine's history,
//! retry behavior of both response paths, and the record-after-exchange discipline.
//!
//! Uses a scripted fake LLM and paused tokio time; no network, no real waiting.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chat_engine::{
    aggregate_stream, format_exchange, ChatEngine, ChatError, RetryPolicy, STREAM_ERROR_SENTINEL,
};
use common::{engine_with, FakeLlm, StreamScript};
use futures::StreamExt;
use llm_client::CompletionRequest;
use prompt::{FileTemplateLoader, NO_HISTORY_FALLBACK, NO_HISTORY_TO_SUMMARIZE};

// --- construct_turn_prompt / construct_summary_prompt ---

/// **Test: Fresh engine renders the turn template with the no-history fallback.**
#[test]
fn turn_prompt_on_empty_history_uses_fallback() {
    let engine = engine_with(Arc::new(FakeLlm::new()));
    let prompt = engine.construct_turn_prompt("Dr. Lee", "Why {so} tired?").unwrap();
    assert_eq!(
        prompt,
        format!(
            "Persona: Dr. Lee\nHistory: {}\nQuestion: Why {{so}} tired?",
            NO_HISTORY_FALLBACK
        )
    );
}

/// **Test: A recorded exchange reappears verbatim as the history of the next turn prompt.**
#[test]
fn recorded_exchange_round_trips_into_next_prompt() {
    let mut engine = engine_with(Arc::new(FakeLlm::new()));
    engine.record_exchange("first question", "  first answer \n");
    engine.record_exchange("second question", "second answer");

    let expected = format_exchange("second question", "second answer");
    assert_eq!(engine.history().last(), Some(expected.as_str()));

    let prompt = engine.construct_turn_prompt("Ana", "third").unwrap();
    assert!(prompt.contains(&format!("History: {}\n", expected)));
    assert!(!prompt.contains("first question"));
}

/// **Test: Summary prompt is the sentinel on empty history and the joined history otherwise.**
#[test]
fn summary_prompt_over_engine_history() {
    let mut engine = engine_with(Arc::new(FakeLlm::new()));
    assert_eq!(engine.construct_summary_prompt().unwrap(), NO_HISTORY_TO_SUMMARIZE);

    engine.record_exchange("a", "1");
    engine.record_exchange("b", "2");
    assert_eq!(
        engine.construct_summary_prompt().unwrap(),
        "Summarize:\nUser: a\nPsychologist: 1\nUser: b\nPsychologist: 2"
    );
}

/// **Test: A missing template file is a Configuration error.**
#[test]
fn missing_template_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let engine = ChatEngine::new(
        Arc::new(FakeLlm::new()),
        Arc::new(FileTemplateLoader::new(dir.path())),
    );
    let err = engine.construct_turn_prompt("Ana", "hi").unwrap_err();
    assert!(matches!(err, ChatError::Configuration(_)));
}

// --- get_response ---

/// **Test: Success on the first attempt sends one single-user request with the engine's model.**
#[tokio::test]
async fn get_response_returns_unstripped_text() {
    let llm = Arc::new(FakeLlm::with_replies(vec![Ok("  hello \n")]));
    let engine = engine_with(llm.clone()).with_model("gpt-4o-mini");

    let response = engine.get_response("the prompt").await.unwrap();

    assert_eq!(response, "  hello \n");
    assert_eq!(
        llm.requests(),
        vec![CompletionRequest::single_user("gpt-4o-mini", "the prompt")]
    );
}

/// **Test: All attempts failing yields UpstreamRequest after max_retries + 1 calls, with the delay between each.**
#[tokio::test(start_paused = true)]
async fn get_response_exhausts_retries_then_fails() {
    let llm = Arc::new(FakeLlm::with_replies(vec![
        Err("boom 1"),
        Err("boom 2"),
        Err("boom 3"),
        Err("boom 4"),
    ]));
    let engine = engine_with(llm.clone());

    let start = tokio::time::Instant::now();
    let err = engine.get_response("p").await.unwrap_err();
    let elapsed = start.elapsed();

    assert_eq!(llm.calls(), 4);
    assert!(elapsed >= Duration::from_secs(3) && elapsed < Duration::from_secs(4));
    match err {
        ChatError::UpstreamRequest { attempts, source } => {
            assert_eq!(attempts, 4);
            assert_eq!(source.to_string(), "boom 4");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

/// **Test: A transient failure is retried and the later success is returned.**
#[tokio::test(start_paused = true)]
async fn get_response_recovers_after_transient_failures() {
    let llm = Arc::new(FakeLlm::with_replies(vec![Err("timeout"), Err("timeout"), Ok("ok")]));
    let engine = engine_with(llm.clone());

    let start = tokio::time::Instant::now();
    let response = engine.get_response("p").await.unwrap();

    assert_eq!(response, "ok");
    assert_eq!(llm.calls(), 3);
    assert!(start.elapsed() >= Duration::from_secs(2) && start.elapsed() < Duration::from_secs(3));
}

/// **Test: A custom policy with zero retries makes exactly one attempt.**
#[tokio::test]
async fn get_response_with_zero_retries() {
    let llm = Arc::new(FakeLlm::new());
    let engine = engine_with(llm.clone());

    let err = engine
        .get_response_with("p", &RetryPolicy::new(0, Duration::from_millis(5)))
        .await
        .unwrap_err();

    assert_eq!(llm.calls(), 1);
    assert!(matches!(err, ChatError::UpstreamRequest { attempts: 1, .. }));
}

// --- get_response_streaming ---

/// **Test: Fragments are yielded exactly as received with no trailing sentinel.**
#[tokio::test]
async fn streaming_yields_fragments_without_sentinel() {
    let llm = Arc::new(FakeLlm::with_streams(vec![StreamScript::Items(vec![
        Ok("Hel"),
        Ok("lo"),
    ])]));
    let engine = engine_with(llm.clone());

    let fragments: Vec<String> = engine.get_response_streaming("p").collect().await;

    assert_eq!(fragments, vec!["Hel", "lo"]);
    assert_eq!(llm.calls(), 1);
}

/// **Test: The stream is lazy; no request is sent before the first poll.**
#[tokio::test]
async fn streaming_sends_nothing_until_polled() {
    let llm = Arc::new(FakeLlm::with_streams(vec![StreamScript::Items(vec![Ok("x")])]));
    let engine = engine_with(llm.clone());

    let stream = engine.get_response_streaming("p");
    assert_eq!(llm.calls(), 0);

    let fragments: Vec<String> = stream.collect().await;
    assert_eq!(fragments, vec!["x"]);
    assert_eq!(llm.calls(), 1);
}

/// **Test: Failing on every attempt yields exactly one sentinel fragment after max_retries + 1 attempts.**
#[tokio::test(start_paused = true)]
async fn streaming_exhausted_retries_yield_single_sentinel() {
    let llm = Arc::new(FakeLlm::new());
    let engine = engine_with(llm.clone());

    let start = tokio::time::Instant::now();
    let fragments: Vec<String> = engine.get_response_streaming("p").collect().await;

    assert_eq!(fragments, vec![STREAM_ERROR_SENTINEL]);
    assert_eq!(llm.calls(), 4);
    assert!(start.elapsed() >= Duration::from_secs(3));
}

/// **Test: A failure before any text is retried; the retry's fragments are all that is seen.**
#[tokio::test(start_paused = true)]
async fn streaming_retries_failures_before_text() {
    let llm = Arc::new(FakeLlm::with_streams(vec![
        StreamScript::OpenFails,
        StreamScript::Items(vec![Ok(""), Err("reset by peer")]),
        StreamScript::Items(vec![Ok(""), Ok("Hi"), Ok(" there")]),
    ]));
    let engine = engine_with(llm.clone());

    let fragments: Vec<String> = engine.get_response_streaming("p").collect().await;

    assert_eq!(fragments, vec!["", "", "Hi", " there"]);
    assert_eq!(llm.calls(), 3);
}

/// **Test: A failure after visible text degrades to the sentinel without another request.**
#[tokio::test]
async fn streaming_failure_after_text_yields_sentinel() {
    let llm = Arc::new(FakeLlm::with_streams(vec![
        StreamScript::Items(vec![Ok("Hel"), Err("reset by peer")]),
        StreamScript::Items(vec![Ok("never")]),
    ]));
    let engine = engine_with(llm.clone());

    let fragments: Vec<String> = engine.get_response_streaming("p").collect().await;

    assert_eq!(fragments, vec!["Hel", STREAM_ERROR_SENTINEL]);
    assert_eq!(llm.calls(), 1);
}

// --- ask / ask_streaming / summarize ---

/// **Test: ask trims the reply and records exactly one formatted exchange.**
#[tokio::test]
async fn ask_records_trimmed_exchange() {
    let llm = Arc::new(FakeLlm::with_replies(vec![Ok("\n  Breathe slowly.  ")]));
    let mut engine = engine_with(llm.clone());

    let reply = engine.ask("Dr. Lee", "How to relax?").await.unwrap();

    assert_eq!(reply, "Breathe slowly.");
    assert_eq!(
        engine.history().entries(),
        &["User: How to relax?\nPsychologist: Breathe slowly.".to_string()]
    );
    assert!(llm.requests()[0].prompt.contains("Persona: Dr. Lee"));
}

/// **Test: A failed ask leaves history untouched.**
#[tokio::test(start_paused = true)]
async fn ask_failure_records_nothing() {
    let mut engine = engine_with(Arc::new(FakeLlm::new()));
    let err = engine.ask("Dr. Lee", "hello").await.unwrap_err();
    assert!(matches!(err, ChatError::UpstreamRequest { .. }));
    assert!(engine.history().is_empty());
}

/// **Test: ask_streaming forwards non-empty fragments in order and records once at the end.**
#[tokio::test]
async fn ask_streaming_forwards_and_records_once() {
    let llm = Arc::new(FakeLlm::with_streams(vec![StreamScript::Items(vec![
        Ok(""),
        Ok("Try "),
        Ok(""),
        Ok("journaling."),
    ])]));
    let mut engine = engine_with(llm);
    let forwarded = Arc::new(Mutex::new(Vec::new()));

    let sink = forwarded.clone();
    let reply = engine
        .ask_streaming("Dr. Lee", "Any tips?", move |fragment| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push(fragment);
                Ok(())
            }
        })
        .await
        .unwrap();

    assert_eq!(reply, "Try journaling.");
    assert_eq!(*forwarded.lock().unwrap(), vec!["Try ", "journaling."]);
    assert_eq!(engine.history().len(), 1);
    assert_eq!(
        engine.history().last(),
        Some("User: Any tips?\nPsychologist: Try journaling.")
    );
}

/// **Test: A forward error aborts aggregation and nothing is recorded.**
#[tokio::test]
async fn ask_streaming_forward_error_records_nothing() {
    let llm = Arc::new(FakeLlm::with_streams(vec![StreamScript::Items(vec![Ok("a"), Ok("b")])]));
    let mut engine = engine_with(llm);

    let err = engine
        .ask_streaming("Dr. Lee", "q", |_| async { Err(anyhow::anyhow!("client gone")) })
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::Forward(_)));
    assert!(engine.history().is_empty());
}

/// **Test: aggregate_stream skips empty fragments and concatenates the rest.**
#[tokio::test]
async fn aggregate_stream_concatenates_non_empty() {
    let fragments = futures::stream::iter(vec![
        "".to_string(),
        "Hel".to_string(),
        "".to_string(),
        "lo".to_string(),
    ]);
    let mut seen = Vec::new();
    let full = aggregate_stream(fragments, |f| {
        seen.push(f);
        async { Ok(()) }
    })
    .await
    .unwrap();
    assert_eq!(full, "Hello");
    assert_eq!(seen, vec!["Hel", "lo"]);
}

/// **Test: summarize on empty history returns the sentinel without calling the model.**
#[tokio::test]
async fn summarize_empty_history_skips_model() {
    let llm = Arc::new(FakeLlm::new());
    let engine = engine_with(llm.clone());
    assert_eq!(engine.summarize().await.unwrap(), NO_HISTORY_TO_SUMMARIZE);
    assert_eq!(llm.calls(), 0);
}

/// **Test: summarize sends the full joined history and does not record the summary.**
#[tokio::test]
async fn summarize_uses_whole_history() {
    let llm = Arc::new(FakeLlm::with_replies(vec![Ok(" Two topics. ")]));
    let mut engine = engine_with(llm.clone());
    engine.record_exchange("a", "1");
    engine.record_exchange("b", "2");

    let summary = engine.summarize().await.unwrap();

    assert_eq!(summary, "Two topics.");
    assert_eq!(
        llm.requests()[0].prompt,
        "Summarize:\nUser: a\nPsychologist: 1\nUser: b\nPsychologist: 2"
    );
    assert_eq!(engine.history().len(), 2);
}

/// **Test: Two engines over the same client keep separate histories.**
#[tokio::test]
async fn engines_have_independent_histories() {
    let llm = Arc::new(FakeLlm::with_replies(vec![Ok("one"), Ok("two")]));
    let mut first = engine_with(llm.clone());
    let mut second = engine_with(llm);

    first.ask("A", "q1").await.unwrap();
    assert!(second.history().is_empty());

    second.ask("B", "q2").await.unwrap();
    assert_eq!(first.history().len(), 1);
    assert_eq!(second.history().last(), Some("User: q2\nPsychologist: two"));
}
