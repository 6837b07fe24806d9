#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use subreddit_stats::{
	_preludet::*,
	client::{ReqwestRedditClient, RetryPolicy},
	config::ClientConfig,
	http::{ReqwestHttpClient, ReqwestTransportErrorMapper},
	stats::{ImageTextRatio, StatsResponse, StatsService},
};

fn build_service(
	server: &MockServer,
) -> StatsService<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	let config = ClientConfig::builder(
		"client-1",
		"secret-1",
		server.url("/api/v1/access_token"),
		server.url("/r/"),
		"subreddit-stats-tests/0.1",
	)
	.access_token("access-1")
	.retry(RetryPolicy::new(2, Duration::from_millis(10)))
	.build()
	.expect("Client config fixture should validate.");
	let client: ReqwestRedditClient = build_reqwest_test_client(config);

	StatsService::new(client)
}

fn post(
	title: &str,
	ups: i64,
	author: &str,
	flair: Option<&str>,
	hint: Option<&str>,
) -> serde_json::Value {
	json!({
		"kind": "t3",
		"data": {
			"title": title,
			"ups": ups,
			"author": author,
			"link_flair_text": flair,
			"post_hint": hint,
		},
	})
}

#[tokio::test]
async fn report_aggregates_top_and_new_listings() {
	let server = MockServer::start_async().await;
	let top = server
		.mock_async(|when, then| {
			when.method(GET).path("/r/rust/top").query_param("limit", "5");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"data": {
					"children": [
						post("Release", 900, "ferris", None, None),
						post("Guide", 400, "ann", None, None),
						post("Tips", 300, "ferris", None, None),
					],
				},
			}));
		})
		.await;
	let new = server
		.mock_async(|when, then| {
			when.method(GET).path("/r/rust/new").query_param("limit", "100");
			then.status(200)
				.header("content-type", "application/json")
				.header("X-Ratelimit-Used", "2")
				.header("X-Ratelimit-Remaining", "598")
				.header("X-Ratelimit-Reset", "300")
				.json_body(json!({
					"data": {
						"children": [
							post("Pic", 1, "bob", Some("Meme"), Some("image")),
							post("Ask", 1, "cat", Some("Question"), Some("self")),
							post("Link", 1, "dan", Some("Meme"), Some("link")),
							post("Plain", 1, "eve", Some(""), None),
						],
					},
				}));
		})
		.await;
	let service = build_service(&server);
	let report = service.report(" /r/rust ").await.expect("Report should build.");

	top.assert_calls_async(1).await;
	new.assert_calls_async(1).await;
	assert_eq!(report.top_posts.len(), 3);
	assert_eq!(report.top_posts[0].up_votes, 900);
	assert_eq!(report.top_users[0].user_name, "ferris");
	assert_eq!(report.top_users[0].post_count, 2);
	assert_eq!(report.post_flair_distribution.get("Meme"), Some(&2));
	assert_eq!(report.post_flair_distribution.get("Question"), Some(&1));
	assert_eq!(report.post_flair_distribution.len(), 2);
	assert_eq!(report.image_text_post_ratio, ImageTextRatio { image_posts: 1, text_posts: 2 });
	assert_eq!(report.rate_limit.remaining.as_deref(), Some("598"));
}

#[tokio::test]
async fn remote_throttling_maps_to_rate_limit_envelope() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/r/rust/top");
			then.status(429)
				.header("X-Ratelimit-Remaining", "0")
				.header("X-Ratelimit-Reset", "17");
		})
		.await;
	let service = build_service(&server);
	let response = service.respond("rust").await;

	mock.assert_calls_async(2).await;
	assert_eq!(
		serde_json::to_value(&response).expect("Response should serialize."),
		json!({
			"error": "Reddit rate limit exceeded",
			"rateLimit": {
				"rateLimitUsed": null,
				"rateLimitRemaining": "0",
				"rateLimitReset": "17",
			},
		})
	);
}

#[tokio::test]
async fn invalid_names_never_reach_the_network() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET);
			then.status(500);
		})
		.await;
	let service = build_service(&server);

	assert_eq!(
		service.respond("  /r/ ").await,
		StatsResponse::Failed { error: StatsResponse::EMPTY_SUBREDDIT }
	);
	assert_eq!(
		service.respond("rust?limit=1").await,
		StatsResponse::Failed { error: StatsResponse::INVALID_SUBREDDIT }
	);
	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn server_errors_map_to_generic_envelope() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/r/rust/top");
			then.status(502);
		})
		.await;
	let service = build_service(&server);
	let response = service.respond("rust").await;

	assert!(!response.is_report());
	assert_eq!(response, StatsResponse::Failed { error: StatsResponse::FAILED });
}
