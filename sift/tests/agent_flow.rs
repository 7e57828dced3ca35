//! End-to-end agent flows over mock collaborators: event ordering, evidence
//! scoping, and the fatal empty-plan path.


use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use sift::{
    BasicAgent, ChatEvent, ChatTurn, EventEmitter, ExpertAgent, MockLlm, MockSearchProvider,
    SearchClient, SearchResponse, SearchResult,
};

fn turn(query: &str) -> ChatTurn {
    ChatTurn {
        query: query.to_string(),
        history: Vec::new(),
        model: "test-model".to_string(),
        thread_id: Some(7),
    }
}

fn hit(url: &str) -> SearchResult {
    SearchResult::new(format!("title-{url}"), url, format!("summary-{url}"))
}

async fn run_expert(
    llm: MockLlm,
    provider: MockSearchProvider,
    turn: ChatTurn,
) -> (Result<(), String>, Vec<ChatEvent>) {
    let (emitter, mut rx) = EventEmitter::channel(64);
    let agent = ExpertAgent::new(
        Arc::new(llm),
        SearchClient::without_enrichment(Arc::new(provider)),
    );
    let handle = tokio::spawn(async move { agent.run(turn, &emitter).await.map_err(|e| e.to_string()) });
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    (handle.await.unwrap(), events)
}

fn kinds(events: &[ChatEvent]) -> Vec<&'static str> {
    events.iter().map(|e| e.kind()).collect()
}

const TWO_STEP_PLAN: &str = r#"[
    {"id": 0, "step": "A", "dependencies": []},
    {"id": 1, "step": "B", "dependencies": [0]}
]"#;

#[tokio::test]
async fn two_step_plan_streams_events_in_order_with_step_zero_evidence_only() {
    // Call order with empty history: plan, step-0 queries, synthesis, related.
    let llm = MockLlm::with_responses([
        TWO_STEP_PLAN,
        r#"["find a"]"#,
        "The answer[1].",
        r#"["r1?", "r2?", "r3?"]"#,
    ]);
    let provider = MockSearchProvider::new().with_response(
        "find a",
        SearchResponse {
            results: vec![hit("u1")],
            images: vec!["i1".to_string()],
        },
    );

    let (result, events) = run_expert(llm, provider, turn("compare a")).await;
    result.unwrap();

    assert_eq!(
        kinds(&events),
        vec![
            "begin-stream",
            "agent-query-plan",
            "agent-search-queries",
            "agent-read-results",
            "search-results",
            "text-chunk",
            "final-response",
            "related-queries",
            "stream-end",
        ]
    );

    // Final synthesis evidence derives solely from step 0.
    let ChatEvent::SearchResults { results, images } = &events[4] else {
        panic!("expected search-results at index 4");
    };
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, "u1");
    assert_eq!(images, &vec!["i1".to_string()]);

    let ChatEvent::FinalResponse { response } = &events[6] else {
        panic!("expected final-response at index 6");
    };
    assert_eq!(response, "The answer[1].");

    let ChatEvent::StreamEnd { thread_id } = &events[8] else {
        panic!("expected stream-end last");
    };
    assert_eq!(*thread_id, Some(7));
}

#[tokio::test]
async fn research_steps_are_visited_in_ascending_id_order() {
    // Plan listed out of id order; the final step is the last element.
    let plan = r#"[
        {"id": 1, "step": "B", "dependencies": []},
        {"id": 0, "step": "A", "dependencies": []},
        {"id": 2, "step": "final", "dependencies": [0, 1]}
    ]"#;
    let llm = MockLlm::with_responses([
        plan,
        r#"["qa"]"#,
        r#"["qb"]"#,
        "done",
        r#"["x?", "y?", "z?"]"#,
    ]);
    let provider = MockSearchProvider::new()
        .with_response(
            "qa",
            SearchResponse {
                results: vec![hit("ua")],
                images: vec![],
            },
        )
        .with_response(
            "qb",
            SearchResponse {
                results: vec![hit("ub")],
                images: vec![],
            },
        );

    let (result, events) = run_expert(llm, provider, turn("q")).await;
    result.unwrap();

    let step_numbers: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            ChatEvent::AgentSearchQueries { step_number, .. } => Some(*step_number),
            _ => None,
        })
        .collect();
    assert_eq!(step_numbers, vec![0, 1]);

    // Both steps' sources are merged for synthesis, in dependency order.
    let ChatEvent::SearchResults { results, .. } =
        events.iter().find(|e| e.kind() == "search-results").unwrap()
    else {
        unreachable!();
    };
    let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["ua", "ub"]);
}

#[tokio::test]
async fn empty_plan_emits_error_and_stops_before_any_step() {
    let llm = MockLlm::with_responses(["I have no plan for you."]);
    let provider = MockSearchProvider::new();

    let (result, events) = run_expert(llm, provider, turn("q")).await;
    assert!(result.is_err());

    assert_eq!(
        kinds(&events),
        vec!["begin-stream", "agent-query-plan", "error"]
    );
    let ChatEvent::AgentQueryPlan { steps } = &events[1] else {
        panic!("expected agent-query-plan");
    };
    assert!(steps.is_empty());
}

#[tokio::test]
async fn step_with_unextractable_queries_proceeds_with_no_results() {
    // Sub-query extraction fails softly; the step stores empty evidence and
    // the request still completes.
    let llm = MockLlm::with_responses([
        TWO_STEP_PLAN,
        "no list here, sorry",
        "answer",
        r#"["a?", "b?", "c?"]"#,
    ]);
    let (result, events) = run_expert(llm, MockSearchProvider::new(), turn("q")).await;
    result.unwrap();

    let ChatEvent::AgentSearchQueries { queries, .. } = &events[2] else {
        panic!("expected agent-search-queries");
    };
    assert!(queries.is_empty());
    let ChatEvent::AgentReadResults { results, .. } = &events[3] else {
        panic!("expected agent-read-results");
    };
    assert!(results.is_empty());
    assert_eq!(events.last().unwrap().kind(), "stream-end");
}

#[tokio::test]
async fn cancelled_request_stops_without_an_error_event() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let (emitter, mut rx) = EventEmitter::channel(8);
    let agent = ExpertAgent::new(
        Arc::new(MockLlm::always("unused")),
        SearchClient::without_enrichment(Arc::new(MockSearchProvider::new())),
    )
    .with_cancellation(cancel);
    let handle =
        tokio::spawn(async move { agent.run(turn("q"), &emitter).await.map_err(|e| e.to_string()) });
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    assert!(handle.await.unwrap().is_err());
    assert_eq!(kinds(&events), vec!["begin-stream"]);
}

#[tokio::test]
async fn basic_mode_streams_subset_with_final_message() {
    let llm = MockLlm::with_responses(["basic answer", r#"["1?", "2?", "3?"]"#]);
    let provider = MockSearchProvider::new().with_response(
        "weather",
        SearchResponse {
            results: vec![hit("w1"), hit("w2")],
            images: vec!["wi".to_string()],
        },
    );

    let (emitter, mut rx) = EventEmitter::channel(64);
    let agent = BasicAgent::new(
        Arc::new(llm),
        SearchClient::without_enrichment(Arc::new(provider)),
    );
    let handle = tokio::spawn(async move {
        agent
            .run(turn("weather"), &emitter)
            .await
            .map_err(|e| e.to_string())
    });
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    handle.await.unwrap().unwrap();

    assert_eq!(
        kinds(&events),
        vec![
            "begin-stream",
            "search-results",
            "text-chunk",
            "final-response",
            "related-queries",
            "final-message",
            "stream-end",
        ]
    );
    let ChatEvent::FinalMessage { message } = &events[5] else {
        panic!("expected final-message");
    };
    assert_eq!(message, "basic answer");
}
