use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{
    file_test_app, get_authed, patch_authed, post_json_authed, seed_case, signup_judge, test_app,
    test_app_with, test_config,
};

fn decision(case_id: &str, status: &str, comments: Option<&str>) -> Value {
    let mut body = json!({ "caseId": case_id, "status": status });
    if let Some(comments) = comments {
        body["comments"] = json!(comments);
    }
    body
}

#[tokio::test]
async fn full_path_from_raise_to_decision() {
    let (app, _pool) = test_app().await;
    let parties = seed_case(&app, "C-100").await;

    let (status, case) = patch_authed(&app, "/detainee/C-100/raise-bail", &parties.detainee).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["bailStatus"], "Pending to lawyer");
    let filed_at = case["bailFilingDate"].as_str().unwrap().to_string();

    let (status, case) =
        patch_authed(&app, "/lawyer/C-100/forward-to-judge", &parties.lawyer).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["bailStatus"], "Pending to judge");
    // The filing date is stamped once, when bail is first raised.
    assert_eq!(case["bailFilingDate"], filed_at.as_str());

    let (status, case) = post_json_authed(
        &app,
        "/judge/bail-decision",
        &json!({
            "caseId": "C-100",
            "status": "Accepted",
            "comments": "Surety furnished, report weekly,",
            "aiRecommendation": "Grant bail with conditions",
        }),
        &parties.judge,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["bailStatus"], "Accepted");
    assert_eq!(case["judgeComments"], json!(["Surety furnished", "report weekly"]));
    assert_eq!(case["aiRecommendation"], "Grant bail with conditions");
}

#[tokio::test]
async fn lawyer_may_forward_without_a_detainee_request() {
    let (app, _pool) = test_app().await;
    let parties = seed_case(&app, "C-100").await;

    let (status, case) =
        patch_authed(&app, "/lawyer/C-100/forward-to-judge", &parties.lawyer).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["bailStatus"], "Pending to judge");
    assert!(case["bailFilingDate"].is_string());
}

#[tokio::test]
async fn out_of_order_steps_are_conflicts() {
    let (app, _pool) = test_app().await;
    let parties = seed_case(&app, "C-100").await;

    // A judge cannot decide a case nobody has forwarded.
    let (status, err) = post_json_authed(
        &app,
        "/judge/bail-decision",
        &decision("C-100", "Declined", None),
        &parties.judge,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["kind"], "Conflict");

    patch_authed(&app, "/detainee/C-100/raise-bail", &parties.detainee).await;
    let (status, _) = patch_authed(&app, "/detainee/C-100/raise-bail", &parties.detainee).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn decided_cases_are_final_by_default() {
    let (app, _pool) = test_app().await;
    let parties = seed_case(&app, "C-100").await;
    patch_authed(&app, "/lawyer/C-100/forward-to-judge", &parties.lawyer).await;

    let (status, _) = post_json_authed(
        &app,
        "/judge/bail-decision",
        &decision("C-100", "Accepted", Some("Granted")),
        &parties.judge,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Whether a judge may revise a decision is still an open question. With
    // `allow_redecision` a second call flips Accepted to Declined; without
    // it decisions are final.
    let (status, _) = post_json_authed(
        &app,
        "/judge/bail-decision",
        &decision("C-100", "Declined", Some("Changed my mind")),
        &parties.judge,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, case) = get_authed(&app, "/case/C-100", &parties.judge).await;
    assert_eq!(case["bailStatus"], "Accepted");
    assert_eq!(case["judgeComments"], json!(["Granted"]));

    // Nor can anyone reopen it.
    let (status, _) = patch_authed(&app, "/lawyer/C-100/forward-to-judge", &parties.lawyer).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn redecision_can_be_enabled() {
    let mut config = test_config();
    config.lifecycle.allow_redecision = true;
    let (app, _pool) = test_app_with(config).await;
    let parties = seed_case(&app, "C-100").await;
    patch_authed(&app, "/lawyer/C-100/forward-to-judge", &parties.lawyer).await;

    let (status, _) = post_json_authed(
        &app,
        "/judge/bail-decision",
        &decision("C-100", "Accepted", Some("Granted")),
        &parties.judge,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, case) = post_json_authed(
        &app,
        "/judge/bail-decision",
        &decision("C-100", "Declined", None),
        &parties.judge,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["bailStatus"], "Declined");
    // Omitted comments leave the earlier ones in place.
    assert_eq!(case["judgeComments"], json!(["Granted"]));
}

#[tokio::test]
async fn comma_separated_comments_are_split_and_trimmed() {
    let (app, _pool) = test_app().await;
    let parties = seed_case(&app, "C-100").await;
    patch_authed(&app, "/lawyer/C-100/forward-to-judge", &parties.lawyer).await;

    let (status, case) = post_json_authed(
        &app,
        "/judge/bail-decision",
        &decision("C-100", "Accepted", Some("ok, reviewed")),
        &parties.judge,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["bailStatus"], "Accepted");
    assert_eq!(case["judgeComments"], json!(["ok", "reviewed"]));
}

#[tokio::test]
async fn redecision_comments_replace_the_earlier_ones() {
    let mut config = test_config();
    config.lifecycle.allow_redecision = true;
    let (app, _pool) = test_app_with(config).await;
    let parties = seed_case(&app, "C-100").await;
    patch_authed(&app, "/lawyer/C-100/forward-to-judge", &parties.lawyer).await;

    let (status, case) = post_json_authed(
        &app,
        "/judge/bail-decision",
        &decision("C-100", "Accepted", Some("ok, reviewed")),
        &parties.judge,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["judgeComments"], json!(["ok", "reviewed"]));

    let (status, case) = post_json_authed(
        &app,
        "/judge/bail-decision",
        &decision("C-100", "Declined", Some("second")),
        &parties.judge,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["bailStatus"], "Declined");
    assert_eq!(case["judgeComments"], json!(["second"]));
}

#[tokio::test]
async fn invalid_decision_status_is_400_and_changes_nothing() {
    let (app, _pool) = test_app().await;
    let parties = seed_case(&app, "C-100").await;
    patch_authed(&app, "/lawyer/C-100/forward-to-judge", &parties.lawyer).await;

    for status_text in ["accepted", "Maybe", "", " Accepted ", "Declined\n"] {
        let (status, err) = post_json_authed(
            &app,
            "/judge/bail-decision",
            &decision("C-100", status_text, Some("x")),
            &parties.judge,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "status {status_text:?}");
        assert_eq!(
            err["message"],
            "Invalid bail status. Must be 'Accepted' or 'Declined'"
        );
    }

    let (_, case) = get_authed(&app, "/case/C-100", &parties.judge).await;
    assert_eq!(case["bailStatus"], "Pending to judge");
    assert_eq!(case["judgeComments"], json!([]));
}

#[tokio::test]
async fn only_the_assigned_party_may_act() {
    let (app, _pool) = test_app().await;
    let parties = seed_case(&app, "C-100").await;
    patch_authed(&app, "/lawyer/C-100/forward-to-judge", &parties.lawyer).await;

    let other_judge = signup_judge(&app, "jkhan", 7002).await;
    let (status, err) = post_json_authed(
        &app,
        "/judge/bail-decision",
        &decision("C-100", "Accepted", None),
        &other_judge,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(err["message"], "Case C-100 is not assigned to jkhan");

    let (_, case) = get_authed(&app, "/case/C-100", &parties.judge).await;
    assert_eq!(case["bailStatus"], "Pending to judge");
}

#[tokio::test]
async fn missing_case_is_404() {
    let (app, _pool) = test_app().await;
    let parties = seed_case(&app, "C-100").await;

    let (status, _) = patch_authed(&app, "/detainee/NOPE/raise-bail", &parties.detainee).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post_json_authed(
        &app,
        "/judge/bail-decision",
        &decision("NOPE", "Accepted", None),
        &parties.judge,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn history_records_each_transition_in_order() {
    let (app, _pool) = test_app().await;
    let parties = seed_case(&app, "C-100").await;

    let (status, history) = get_authed(&app, "/case/C-100/history", &parties.lawyer).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history, json!([]));

    patch_authed(&app, "/detainee/C-100/raise-bail", &parties.detainee).await;
    patch_authed(&app, "/lawyer/C-100/forward-to-judge", &parties.lawyer).await;
    post_json_authed(
        &app,
        "/judge/bail-decision",
        &decision("C-100", "Declined", Some("Risk of absconding")),
        &parties.judge,
    )
    .await;

    let (status, history) = get_authed(&app, "/case/C-100/history", &parties.detainee).await;
    assert_eq!(status, StatusCode::OK);
    let steps: Vec<(String, String, String, String)> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["fromStatus"].as_str().unwrap().to_string(),
                e["toStatus"].as_str().unwrap().to_string(),
                e["event"].as_str().unwrap().to_string(),
                e["actorUsername"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    let expected = [
        ("", "Pending to lawyer", "raise_bail", "asha"),
        ("Pending to lawyer", "Pending to judge", "forward_to_judge", "rmehta"),
        ("Pending to judge", "Declined", "decline", "jrao"),
    ]
    .map(|(a, b, c, d)| (a.to_string(), b.to_string(), c.to_string(), d.to_string()));
    assert_eq!(steps, expected.to_vec());
    assert_eq!(history[2]["comments"], json!(["Risk of absconding"]));

    let (status, _) = get_authed(&app, "/case/NOPE/history", &parties.detainee).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_decisions_on_a_file_database_yield_one_winner() {
    let (app, pool, _dir) = file_test_app(test_config()).await;
    let parties = seed_case(&app, "C-100").await;
    let (status, _) = patch_authed(&app, "/lawyer/C-100/forward-to-judge", &parties.lawyer).await;
    assert_eq!(status, StatusCode::OK);

    let mut handles = Vec::new();
    for i in 0..8 {
        let app = app.clone();
        let judge = parties.judge.clone();
        let status_text = if i % 2 == 0 { "Accepted" } else { "Declined" };
        let comment = format!("decision {i}");
        handles.push(tokio::spawn(async move {
            post_json_authed(
                &app,
                "/judge/bail-decision",
                &decision("C-100", status_text, Some(&comment)),
                &judge,
            )
            .await
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        match status {
            StatusCode::OK => winners.push(body),
            StatusCode::CONFLICT => assert_eq!(body["kind"], "Conflict"),
            other => panic!("unexpected status {other}: {body}"),
        }
    }
    assert_eq!(winners.len(), 1, "exactly one decision should land");

    let (_, case) = get_authed(&app, "/case/C-100", &parties.judge).await;
    assert_eq!(case["bailStatus"], winners[0]["bailStatus"]);
    assert_eq!(case["judgeComments"], winners[0]["judgeComments"]);

    let decisions: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM case_events WHERE case_id = 'C-100' AND event IN ('accept', 'decline')",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(decisions, 1);
}
