//! Behavioural tests for the backend client against an in-process stub of the
//! recipe REST API.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::{Form, Path, RawQuery},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use recipe_feed::{
    app::{
        backend::{
            Ack, BackendClient, GenerateRequest, Outcome, Published, RecipeDraft, RetryPolicy,
            Submission,
        },
        session::Role,
    },
    config::BackendConfig,
};
use reqwest::Url;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_backoff: Duration::from_millis(5),
        max_backoff: Duration::from_millis(20),
    }
}

async fn spawn_stub(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub server");
    });
    Url::parse(&format!("http://{addr}/")).expect("stub url")
}

fn client_for(base_url: Url, retry: RetryPolicy) -> BackendClient {
    let config = BackendConfig {
        base_url,
        timeout: Duration::from_secs(5),
        retry,
    };
    BackendClient::new(&config).expect("client builds")
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[rstest]
#[tokio::test]
async fn login_posts_a_form_and_decodes_the_session(fast_retry: RetryPolicy) {
    let router = Router::new().route(
        "/login",
        post(|Form(form): Form<HashMap<String, String>>| async move {
            if form.get("password").map(String::as_str) == Some("secret") {
                Json(json!({"access_token": "T", "role": true})).into_response()
            } else {
                (StatusCode::UNAUTHORIZED, Json(json!({"detail": "bad credentials"}))).into_response()
            }
        }),
    );
    let client = client_for(spawn_stub(router).await, fast_retry);

    let reply = client
        .login("ada@example.com", "secret")
        .await
        .into_result()
        .expect("login succeeds");
    assert_eq!(reply.access_token, "T");
    assert_eq!(reply.role, Role::User);

    assert_eq!(client.login("ada@example.com", "wrong").await, Outcome::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn verify_sends_the_bearer_token(fast_retry: RetryPolicy) {
    let router = Router::new().route(
        "/auth/verify",
        get(|headers: HeaderMap| async move {
            match bearer(&headers) {
                Some("T") => Json(json!({"role": false})).into_response(),
                _ => StatusCode::UNAUTHORIZED.into_response(),
            }
        }),
    );
    let client = client_for(spawn_stub(router).await, fast_retry);

    let reply = client.verify("T").await.into_result().expect("token accepted");
    assert_eq!(reply.role, Role::Admin);
    assert_eq!(client.verify("expired").await, Outcome::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn blank_token_never_reaches_the_backend(fast_retry: RetryPolicy) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/posts",
        get(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Json(json!({"posts": []}))
        }),
    );
    let client = client_for(spawn_stub(router).await, fast_retry);

    assert_eq!(client.posts("  ").await, Outcome::Unauthorized);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[rstest]
#[tokio::test]
async fn feed_and_like_round_trip(fast_retry: RetryPolicy) {
    let router = Router::new()
        .route(
            "/posts",
            get(|| async {
                Json(json!({"posts": [
                    {"SMID": "1", "Likes": 3, "Recipe": {"RecipeID": "r1", "RecipeName": "Soup"}}
                ]}))
            }),
        )
        .route(
            "/like_post/:smid",
            post(|Path(smid): Path<String>| async move {
                assert_eq!(smid, "1");
                Json(json!({"Likes": 4}))
            }),
        );
    let client = client_for(spawn_stub(router).await, fast_retry);

    let posts = client.posts("T").await.into_result().expect("feed loads");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].recipe.name, "Soup");
    assert_eq!(posts[0].likes, 3);

    let liked = client.like("T", "1").await.into_result().expect("like confirmed");
    assert_eq!(liked.likes, 4);
}

#[rstest]
#[tokio::test]
async fn transient_get_failures_are_retried(fast_retry: RetryPolicy) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/recipesall",
        get(move || async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                StatusCode::SERVICE_UNAVAILABLE.into_response()
            } else {
                Json(json!([{"RecipeID": "r1", "RecipeName": "Soup"}])).into_response()
            }
        }),
    );
    let client = client_for(spawn_stub(router).await, fast_retry);

    let recipes = client.recipes("T").await.into_result().expect("third attempt succeeds");
    assert_eq!(recipes.len(), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[rstest]
#[tokio::test]
async fn retries_stop_at_the_attempt_limit(fast_retry: RetryPolicy) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/recipesall",
        get(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            (StatusCode::BAD_GATEWAY, Json(json!({"detail": "upstream down"})))
        }),
    );
    let client = client_for(spawn_stub(router).await, fast_retry);

    assert_eq!(
        client.recipes("T").await,
        Outcome::ServerError {
            status: 502,
            detail: Some("upstream down".into())
        }
    );
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[rstest]
#[tokio::test]
async fn mutations_are_sent_once(fast_retry: RetryPolicy) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/like_post/:smid",
        post(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            StatusCode::SERVICE_UNAVAILABLE
        }),
    );
    let client = client_for(spawn_stub(router).await, fast_retry);

    assert!(matches!(
        client.like("T", "1").await,
        Outcome::ServerError { status: 503, .. }
    ));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn unreachable_backend_is_a_network_error(fast_retry: RetryPolicy) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("reserve a port");
    let addr = listener.local_addr().expect("reserved address");
    drop(listener);
    let client = client_for(
        Url::parse(&format!("http://{addr}/")).expect("valid url"),
        fast_retry,
    );

    assert!(matches!(client.posts("T").await, Outcome::NetworkError(_)));
}

#[rstest]
#[tokio::test]
async fn empty_delete_reply_is_an_ack(fast_retry: RetryPolicy) {
    let router = Router::new().route("/recipes/:id", delete(|| async { StatusCode::NO_CONTENT }));
    let client = client_for(spawn_stub(router).await, fast_retry);

    assert_eq!(
        client.delete_recipe("T", "r1").await,
        Outcome::Success(Ack::default())
    );
}

#[rstest]
#[tokio::test]
async fn shopping_list_is_replaced_as_one_form_field(fast_retry: RetryPolicy) {
    let received = Arc::new(Mutex::new(None::<String>));
    let sink = received.clone();
    let router = Router::new().route(
        "/shopping_list",
        post(move |Form(form): Form<HashMap<String, String>>| async move {
            *sink.lock().expect("sink lock") = form.get("shopping_list").cloned();
            Json(json!({"message": "saved"}))
        }),
    );
    let client = client_for(spawn_stub(router).await, fast_retry);

    let ack = client
        .replace_shopping_list("T", &["milk".to_string(), "eggs".to_string()])
        .await
        .into_result()
        .expect("list saved");

    assert_eq!(ack.message.as_deref(), Some("saved"));
    assert_eq!(
        received.lock().expect("sink lock").as_deref(),
        Some("milk\neggs")
    );
}

#[rstest]
#[tokio::test]
async fn generation_repeats_list_parameters(fast_retry: RetryPolicy) {
    let received = Arc::new(Mutex::new(None::<String>));
    let sink = received.clone();
    let router = Router::new().route(
        "/generate-recipe",
        post(move |RawQuery(query): RawQuery| async move {
            *sink.lock().expect("sink lock") = query;
            Json(json!({"title": "Omelette", "content": "Whisk", "ingredients": "egg, flour"}))
        }),
    );
    let client = client_for(spawn_stub(router).await, fast_retry);

    let request = GenerateRequest {
        question: "lunch".into(),
        ingredients: vec!["egg".into(), "flour".into()],
        dietary_restrictions: vec!["vegan".into()],
    };
    let generated = client
        .generate("T", &request)
        .await
        .into_result()
        .expect("recipe generated");

    assert_eq!(generated.ingredient_list(), vec!["egg", "flour"]);
    assert_eq!(
        received.lock().expect("sink lock").as_deref(),
        Some("question=lunch&ingredients=egg&ingredients=flour&dietary_restrictions=vegan")
    );
}

struct PublishStub {
    created: Arc<AtomicUsize>,
    published: Arc<AtomicUsize>,
    router: Router,
}

fn publish_stub(create_reply: serde_json::Value, publish_status: StatusCode) -> PublishStub {
    let created = Arc::new(AtomicUsize::new(0));
    let published = Arc::new(AtomicUsize::new(0));
    let (create_count, publish_count) = (created.clone(), published.clone());

    let router = Router::new()
        .route(
            "/recipes",
            post(move || async move {
                create_count.fetch_add(1, Ordering::SeqCst);
                Json(create_reply)
            }),
        )
        .route(
            "/add_post",
            post(move || async move {
                publish_count.fetch_add(1, Ordering::SeqCst);
                if publish_status.is_success() {
                    (publish_status, Json(json!({"SMID": "9"})))
                } else {
                    (publish_status, Json(json!({"detail": "boom"})))
                }
            }),
        );

    PublishStub {
        created,
        published,
        router,
    }
}

fn soup_draft() -> RecipeDraft {
    RecipeDraft {
        title: "Soup".into(),
        content: "Boil water".into(),
        ..Default::default()
    }
}

#[rstest]
#[tokio::test]
async fn created_recipe_is_published(fast_retry: RetryPolicy) {
    let stub = publish_stub(json!({"id": "r1"}), StatusCode::OK);
    let client = client_for(spawn_stub(stub.router).await, fast_retry);

    assert_eq!(
        client.create_and_publish("T", &soup_draft()).await,
        Outcome::Success(Submission::Published(Published {
            smid: Some("9".into())
        }))
    );
    assert_eq!(stub.created.load(Ordering::SeqCst), 1);
    assert_eq!(stub.published.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn failed_publish_still_reports_the_created_recipe(fast_retry: RetryPolicy) {
    let stub = publish_stub(json!({"id": "r1"}), StatusCode::INTERNAL_SERVER_ERROR);
    let client = client_for(spawn_stub(stub.router).await, fast_retry);

    let submission = client
        .create_and_publish("T", &soup_draft())
        .await
        .into_result()
        .expect("the recipe was created");

    match &submission {
        Submission::CreatedOnly { recipe_id, reason } => {
            assert_eq!(recipe_id.as_deref(), Some("r1"));
            assert_eq!(reason, "boom");
        }
        other => panic!("expected an unpublished recipe, got {other:?}"),
    }
    assert!(!submission.is_published());
    assert_eq!(stub.created.load(Ordering::SeqCst), 1);
    assert_eq!(stub.published.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn missing_recipe_id_skips_publishing(fast_retry: RetryPolicy) {
    let stub = publish_stub(json!({"message": "Recipe created"}), StatusCode::OK);
    let client = client_for(spawn_stub(stub.router).await, fast_retry);

    let submission = client
        .create_and_publish("T", &soup_draft())
        .await
        .into_result()
        .expect("the recipe was created");

    assert!(matches!(
        submission,
        Submission::CreatedOnly { recipe_id: None, .. }
    ));
    assert!(!submission.summary().contains("was published"));
    assert_eq!(stub.published.load(Ordering::SeqCst), 0);
}
