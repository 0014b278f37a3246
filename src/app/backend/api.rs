use bytes::Bytes;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{
    retry::RetryPolicy, Ack, Allergy, AuthReply, Bookmark, Comment, CreatedRecipe,
    GenerateRequest, GeneratedRecipe, LikeReply, Outcome, Post, Published, Recipe, RecipeDraft,
    RecipeUpdate, Submission, VerifyReply,
};
use crate::config::BackendConfig;

#[derive(Debug, thiserror::Error)]
pub enum ApiErr {
    #[error("reqwest error: {0}")]
    Reqwest(reqwest::Error),
    #[error("backend url `{0}` cannot carry a path")]
    BaseUrl(Url),
}

pub type ApiResult<T> = Result<T, ApiErr>;

#[derive(Debug, Deserialize)]
struct PostsEnvelope {
    posts: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct PostEnvelope {
    post: Post,
}

#[derive(Debug, Deserialize)]
struct CommentsEnvelope {
    comments: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
struct BookmarksEnvelope {
    bookmarks: Vec<Bookmark>,
}

#[derive(Debug, Deserialize)]
struct ShoppingListEnvelope {
    #[serde(default)]
    shopping_list: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RecipeRef<'a> {
    recipe_id: &'a str,
}

#[derive(Debug, Serialize)]
struct NewComment<'a> {
    smid: &'a str,
    comment_text: &'a str,
}

/// Typed client for the recipe REST backend. One instance is shared by every
/// server function.
#[derive(Debug)]
pub struct BackendClient {
    http: Client,
    base: Url,
    retry: RetryPolicy,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> ApiResult<Self> {
        if config.base_url.cannot_be_a_base() {
            return Err(ApiErr::BaseUrl(config.base_url.clone()));
        }

        let http = ClientBuilder::default()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(ApiErr::Reqwest)?;

        Ok(Self {
            http,
            base: config.base_url.clone(),
            retry: config.retry,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn login(&self, email: &str, password: &str) -> Outcome<AuthReply> {
        let request = self
            .request(Method::POST, &["login"])
            .form(&[("email", email), ("password", password)]);
        self.execute(Method::POST, request).await
    }

    pub async fn signup(&self, email: &str, password: &str, name: &str) -> Outcome<AuthReply> {
        let request = self.request(Method::POST, &["signup"]).form(&[
            ("email", email),
            ("password", password),
            ("name", name),
        ]);
        self.execute(Method::POST, request).await
    }

    pub async fn verify(&self, token: &str) -> Outcome<VerifyReply> {
        self.authed(Method::GET, &["auth", "verify"], token, |r| r)
            .await
    }

    pub async fn recipes(&self, token: &str) -> Outcome<Vec<Recipe>> {
        self.authed(Method::GET, &["recipesall"], token, |r| r).await
    }

    pub async fn recipe(&self, token: &str, id: &str) -> Outcome<Recipe> {
        self.authed(Method::GET, &["recipes", id], token, |r| r).await
    }

    pub async fn create_recipe(&self, token: &str, draft: &RecipeDraft) -> Outcome<CreatedRecipe> {
        self.authed(Method::POST, &["recipes"], token, |r| r.json(draft))
            .await
    }

    pub async fn update_recipe(
        &self,
        token: &str,
        id: &str,
        update: &RecipeUpdate,
    ) -> Outcome<Recipe> {
        self.authed(Method::PUT, &["recipes", id], token, |r| r.json(update))
            .await
    }

    pub async fn delete_recipe(&self, token: &str, id: &str) -> Outcome<Ack> {
        self.authed(Method::DELETE, &["recipes", id], token, |r| r)
            .await
    }

    pub async fn posts(&self, token: &str) -> Outcome<Vec<Post>> {
        self.authed(Method::GET, &["posts"], token, |r| r)
            .await
            .map(|envelope: PostsEnvelope| envelope.posts)
    }

    pub async fn post(&self, token: &str, smid: &str) -> Outcome<Post> {
        self.authed(Method::GET, &["posts", smid], token, |r| r)
            .await
            .map(|envelope: PostEnvelope| envelope.post)
    }

    pub async fn publish(&self, token: &str, recipe_id: &str) -> Outcome<Published> {
        self.authed(Method::POST, &["add_post"], token, |r| {
            r.json(&RecipeRef { recipe_id })
        })
        .await
    }

    /// Creates a recipe and publishes it when the backend hands back its id.
    /// Once the create succeeded the outcome is a success, tagged with
    /// whether the publish went through.
    pub async fn create_and_publish(&self, token: &str, draft: &RecipeDraft) -> Outcome<Submission> {
        let created = match self.create_recipe(token, draft).await.into_success() {
            Ok(created) => created,
            Err(failed) => return failed,
        };

        let Some(recipe_id) = created.id else {
            info!("backend did not return a recipe id, skipping publish");
            return Outcome::Success(Submission::CreatedOnly {
                recipe_id: None,
                reason: "the server did not return the new recipe's id".to_string(),
            });
        };

        match self.publish(token, &recipe_id).await.into_result() {
            Ok(published) => Outcome::Success(Submission::Published(published)),
            Err(failure) => {
                warn!(%recipe_id, %failure, "recipe created but publish failed");
                Outcome::Success(Submission::CreatedOnly {
                    recipe_id: Some(recipe_id),
                    reason: failure.to_string(),
                })
            }
        }
    }

    pub async fn like(&self, token: &str, smid: &str) -> Outcome<LikeReply> {
        self.authed(Method::POST, &["like_post", smid], token, |r| r)
            .await
    }

    pub async fn comments(&self, token: &str, smid: &str) -> Outcome<Vec<Comment>> {
        self.authed(Method::GET, &["comments", smid], token, |r| r)
            .await
            .map(|envelope: CommentsEnvelope| envelope.comments)
    }

    pub async fn add_comment(&self, token: &str, smid: &str, text: &str) -> Outcome<Ack> {
        self.authed(Method::POST, &["add_comment"], token, |r| {
            r.json(&NewComment {
                smid,
                comment_text: text,
            })
        })
        .await
    }

    pub async fn bookmarks(&self, token: &str) -> Outcome<Vec<Bookmark>> {
        self.authed(Method::GET, &["bookmarks"], token, |r| r)
            .await
            .map(|envelope: BookmarksEnvelope| envelope.bookmarks)
    }

    pub async fn add_bookmark(&self, token: &str, recipe_id: &str) -> Outcome<Ack> {
        self.authed(Method::POST, &["add_bookmark"], token, |r| {
            r.json(&RecipeRef { recipe_id })
        })
        .await
    }

    pub async fn shopping_list(&self, token: &str) -> Outcome<Vec<String>> {
        self.authed(Method::GET, &["shopping_list"], token, |r| r)
            .await
            .map(|envelope: ShoppingListEnvelope| envelope.shopping_list)
    }

    /// Replaces the whole stored list with `items`.
    pub async fn replace_shopping_list(&self, token: &str, items: &[String]) -> Outcome<Ack> {
        let serialized = items.join("\n");
        self.authed(Method::POST, &["shopping_list"], token, |r| {
            r.form(&[("shopping_list", serialized.as_str())])
        })
        .await
    }

    /// Merges a recipe's ingredients into the stored list, skipping duplicates.
    pub async fn merge_into_shopping_list(&self, token: &str, recipe_id: &str) -> Outcome<Ack> {
        self.authed(Method::GET, &["add_to_shopping_list", recipe_id], token, |r| r)
            .await
    }

    pub async fn allergies(&self, token: &str) -> Outcome<Vec<Allergy>> {
        self.authed(Method::GET, &["allergiesall"], token, |r| r)
            .await
    }

    pub async fn add_allergy(&self, token: &str, ingredient: &str) -> Outcome<Allergy> {
        self.authed(Method::POST, &["allergies"], token, |r| {
            r.query(&[("ingredient", ingredient)])
        })
        .await
    }

    pub async fn remove_allergy(&self, token: &str, id: &str) -> Outcome<Ack> {
        self.authed(Method::DELETE, &["allergies", id], token, |r| r)
            .await
    }

    pub async fn generate(&self, token: &str, request: &GenerateRequest) -> Outcome<GeneratedRecipe> {
        let mut params = vec![("question", request.question.as_str())];
        params.extend(request.ingredients.iter().map(|i| ("ingredients", i.as_str())));
        params.extend(
            request
                .dietary_restrictions
                .iter()
                .map(|r| ("dietary_restrictions", r.as_str())),
        );

        self.authed(Method::POST, &["generate-recipe"], token, |r| r.query(&params))
            .await
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base urls, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.http.request(method, self.endpoint(segments))
    }

    async fn authed<T, F>(&self, method: Method, segments: &[&str], token: &str, build: F) -> Outcome<T>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let token = token.trim();
        if token.is_empty() {
            debug!(path = ?segments, "no session token, backend call skipped");
            return Outcome::Unauthorized;
        }

        let request = build(self.request(method.clone(), segments).bearer_auth(token));
        self.execute(method, request).await
    }

    async fn execute<T>(&self, method: Method, request: RequestBuilder) -> Outcome<T>
    where
        T: DeserializeOwned,
    {
        let retries = self.retry.applies_to(&method);
        let mut attempt = 1;

        loop {
            let Some(this_try) = request.try_clone() else {
                return attempt_once(request).await;
            };

            let outcome = attempt_once(this_try).await;
            if retries && is_transient(&outcome) && self.retry.allows_another(attempt) {
                let delay = self.retry.delay_after(attempt);
                warn!(%method, attempt, ?delay, "transient backend failure, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            if !outcome.is_success() {
                debug!(%method, attempt, "backend call failed");
            }
            return outcome;
        }
    }
}

async fn attempt_once<T>(request: RequestBuilder) -> Outcome<T>
where
    T: DeserializeOwned,
{
    let response = match request.send().await {
        Ok(response) => response,
        Err(err) => return Outcome::NetworkError(err.to_string()),
    };

    let status = response.status();
    match response.bytes().await {
        Ok(body) => decode(status, &body),
        Err(err) => Outcome::NetworkError(err.to_string()),
    }
}

fn is_transient<T>(outcome: &Outcome<T>) -> bool {
    match outcome {
        Outcome::NetworkError(_) => true,
        Outcome::ServerError { status, .. } => *status >= 500,
        Outcome::Success(_) | Outcome::Unauthorized => false,
    }
}

fn decode<T>(status: StatusCode, body: &Bytes) -> Outcome<T>
where
    T: DeserializeOwned,
{
    if status == StatusCode::UNAUTHORIZED {
        return Outcome::Unauthorized;
    }

    if !status.is_success() {
        return Outcome::ServerError {
            status: status.as_u16(),
            detail: error_detail(body),
        };
    }

    // acknowledgements may come back with no body at all
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        body
    };

    match serde_json::from_slice(body) {
        Ok(value) => Outcome::Success(value),
        Err(err) => {
            warn!(%status, %err, "undecodable backend response");
            Outcome::ServerError {
                status: status.as_u16(),
                detail: Some(format!("Unexpected response from the server: {err}")),
            }
        }
    }
}

/// FastAPI style `{"detail": "..."}`. Validation errors carry a list instead
/// of a string and are dropped.
fn error_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("detail")?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn unauthorized_status_is_tagged() {
        let outcome: Outcome<Ack> = decode(StatusCode::UNAUTHORIZED, &Bytes::new());

        assert_eq!(outcome, Outcome::Unauthorized);
    }

    #[rstest]
    fn rejection_keeps_backend_detail() {
        let body = Bytes::from_static(br#"{"detail":"Recipe not found"}"#);
        let outcome: Outcome<Recipe> = decode(StatusCode::NOT_FOUND, &body);

        assert_eq!(
            outcome,
            Outcome::ServerError {
                status: 404,
                detail: Some("Recipe not found".into())
            }
        );
    }

    #[rstest]
    fn validation_detail_list_is_dropped() {
        let body = Bytes::from_static(br#"{"detail":[{"msg":"field required"}]}"#);
        let outcome: Outcome<Ack> = decode(StatusCode::UNPROCESSABLE_ENTITY, &body);

        assert_eq!(
            outcome,
            Outcome::ServerError {
                status: 422,
                detail: None
            }
        );
    }

    #[rstest]
    #[case(b"" as &[u8])]
    #[case(b"  \n" as &[u8])]
    fn empty_success_body_is_an_ack(#[case] body: &[u8]) {
        let outcome: Outcome<Ack> = decode(StatusCode::NO_CONTENT, &Bytes::copy_from_slice(body));

        assert_eq!(outcome, Outcome::Success(Ack::default()));
    }

    #[rstest]
    fn undecodable_success_is_a_server_error() {
        let outcome: Outcome<Vec<Allergy>> =
            decode(StatusCode::OK, &Bytes::from_static(b"<html>oops</html>"));

        assert!(matches!(outcome, Outcome::ServerError { status: 200, .. }));
    }

    #[rstest]
    #[case(Outcome::NetworkError("reset".into()), true)]
    #[case(Outcome::ServerError { status: 503, detail: None }, true)]
    #[case(Outcome::ServerError { status: 404, detail: None }, false)]
    #[case(Outcome::Unauthorized, false)]
    #[case(Outcome::Success(Ack::default()), false)]
    fn transient_classification(#[case] outcome: Outcome<Ack>, #[case] expected: bool) {
        assert_eq!(is_transient(&outcome), expected);
    }

    #[rstest]
    fn endpoint_encodes_segments() {
        let config = BackendConfig::new(Url::parse("http://127.0.0.1:5000/api").expect("valid url"));
        let client = BackendClient::new(&config).expect("client builds");

        assert_eq!(
            client.endpoint(&["recipes", "a/b c"]).as_str(),
            "http://127.0.0.1:5000/api/recipes/a%2Fb%20c"
        );
    }
}
