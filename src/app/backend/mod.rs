#[cfg(feature = "ssr")]
mod api;
#[cfg(feature = "ssr")]
mod retry;

#[cfg(feature = "ssr")]
pub use api::*;
#[cfg(feature = "ssr")]
pub use retry::RetryPolicy;

use leptos::ServerFnError;
use serde::{Deserialize, Serialize};

use super::session::Role;

/// Result of one backend call, tagged so views can branch without inspecting
/// status codes or error strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome<T> {
    Success(T),
    Unauthorized,
    ServerError { status: u16, detail: Option<String> },
    NetworkError(String),
}

/// The non-success half of an [`Outcome`], displayed to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
    #[error("Your session is no longer valid. Please log in again.")]
    Unauthorized,
    #[error("{}", server_message(.status, .detail))]
    Server { status: u16, detail: Option<String> },
    #[error("Could not reach the server: {0}")]
    Network(String),
}

fn server_message(status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => detail.clone(),
        None => format!("The server rejected the request (status {status})."),
    }
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Unauthorized => Outcome::Unauthorized,
            Outcome::ServerError { status, detail } => Outcome::ServerError { status, detail },
            Outcome::NetworkError(message) => Outcome::NetworkError(message),
        }
    }

    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Unauthorized => Err(Failure::Unauthorized),
            Outcome::ServerError { status, detail } => Err(Failure::Server { status, detail }),
            Outcome::NetworkError(message) => Err(Failure::Network(message)),
        }
    }

    /// Splits off the success value, re-tagging a failure for another
    /// success type so it can be returned as-is.
    pub fn into_success<U>(self) -> Result<T, Outcome<U>> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Unauthorized => Err(Outcome::Unauthorized),
            Outcome::ServerError { status, detail } => Err(Outcome::ServerError { status, detail }),
            Outcome::NetworkError(message) => Err(Outcome::NetworkError(message)),
        }
    }

    /// Folds a server function result into an outcome. A failure to reach our
    /// own server is indistinguishable from a failure to reach the backend.
    pub fn settle(result: Result<Outcome<T>, ServerFnError>) -> Self {
        result.unwrap_or_else(|err| Outcome::NetworkError(err.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(rename = "RecipeID", default)]
    pub id: String,
    #[serde(rename = "RecipeName")]
    pub name: String,
    #[serde(rename = "RecipeContent", default)]
    pub content: String,
    #[serde(rename = "Ingredients", default)]
    pub ingredients: Vec<String>,
    #[serde(rename = "Cuisine", default)]
    pub cuisine: Option<String>,
    #[serde(rename = "Visibility", default)]
    pub visibility: bool,
    #[serde(rename = "UserID", default)]
    pub user_id: String,
    #[serde(rename = "UserGenerated", default)]
    pub user_generated: bool,
}

impl Recipe {
    /// Case-insensitive cuisine match. A blank filter matches everything.
    pub fn matches_cuisine(&self, filter: &str) -> bool {
        let filter = filter.trim();
        if filter.is_empty() {
            return true;
        }

        self.cuisine
            .as_deref()
            .is_some_and(|cuisine| cuisine.trim().eq_ignore_ascii_case(filter))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "SMID", default)]
    pub smid: String,
    #[serde(rename = "Likes", default)]
    pub likes: u32,
    #[serde(rename = "Recipe")]
    pub recipe: Recipe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "CommentID", default)]
    pub id: String,
    #[serde(rename = "UserID", default)]
    pub user_id: String,
    #[serde(rename = "CommentText")]
    pub text: String,
    #[serde(rename = "UserName", default)]
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    #[serde(rename = "BookmarkID")]
    pub id: String,
    #[serde(rename = "SMID", default)]
    pub smid: String,
    #[serde(rename = "Recipe")]
    pub recipe: Recipe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allergy {
    #[serde(rename = "AllergyID")]
    pub id: String,
    #[serde(rename = "IngredientName")]
    pub ingredient: String,
}

/// Reply to `/login` and `/signup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthReply {
    pub access_token: String,
    pub role: Role,
    #[serde(default, alias = "username")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReply {
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeReply {
    #[serde(rename = "Likes")]
    pub likes: u32,
}

/// Reply to `/recipes` creation. Older backends answer with a message only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreatedRecipe {
    #[serde(default, alias = "RecipeID")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Published {
    #[serde(rename = "SMID", default)]
    pub smid: Option<String>,
}

/// How far a create-then-publish got once the recipe itself was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Submission {
    Published(Published),
    /// The recipe exists but is not on the feed.
    CreatedOnly {
        recipe_id: Option<String>,
        reason: String,
    },
}

impl Submission {
    pub fn is_published(&self) -> bool {
        matches!(self, Submission::Published(_))
    }

    /// Notice text for the user, worded after what actually happened.
    pub fn summary(&self) -> String {
        match self {
            Submission::Published(_) => "Your recipe was published to the feed.".to_string(),
            Submission::CreatedOnly { reason, .. } => {
                format!("Your recipe was saved but not published to the feed: {reason}")
            }
        }
    }
}

/// Bare acknowledgement; the backend's message is kept for notifications.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub cuisine: String,
    #[serde(rename = "userGenerated", default)]
    pub user_generated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecipeUpdate {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub question: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeneratedRecipe {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub ingredients: String,
}

impl GeneratedRecipe {
    /// The AI endpoint lists ingredients as one comma separated string.
    pub fn ingredient_list(&self) -> Vec<String> {
        self.ingredients
            .split(',')
            .map(str::trim)
            .filter(|ingredient| !ingredient.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn into_draft(self) -> RecipeDraft {
        RecipeDraft {
            ingredients: self.ingredient_list(),
            title: self.title,
            content: self.content,
            cuisine: String::new(),
            user_generated: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShoppingListUpdate {
    #[serde(default)]
    pub items: Vec<String>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn post_decodes_with_sparse_recipe() {
        let body = r#"{"SMID":"1","Likes":3,"Recipe":{"RecipeName":"Soup"}}"#;
        let post: Post = serde_json::from_str(body).expect("valid post");

        assert_eq!(post.smid, "1");
        assert_eq!(post.likes, 3);
        assert_eq!(post.recipe.name, "Soup");
        assert!(post.recipe.ingredients.is_empty());
    }

    #[rstest]
    fn auth_reply_reads_boolean_role_and_username_alias() {
        let body = r#"{"access_token":"T","role":true,"username":"Ada"}"#;
        let reply: AuthReply = serde_json::from_str(body).expect("valid reply");

        assert_eq!(reply.access_token, "T");
        assert_eq!(reply.role, Role::User);
        assert_eq!(reply.name.as_deref(), Some("Ada"));
    }

    #[rstest]
    fn draft_serialises_camel_case_flag() {
        let draft = RecipeDraft {
            title: "Soup".into(),
            content: "Boil".into(),
            user_generated: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&draft).expect("serialisable");

        assert_eq!(json["userGenerated"], true);
    }

    #[rstest]
    #[case("", true)]
    #[case("  ", true)]
    #[case("thai", true)]
    #[case("Thai ", true)]
    #[case("Italian", false)]
    fn cuisine_filter(#[case] filter: &str, #[case] expected: bool) {
        let recipe = Recipe {
            name: "Curry".into(),
            cuisine: Some("Thai".into()),
            ..Default::default()
        };

        assert_eq!(recipe.matches_cuisine(filter), expected);
    }

    #[rstest]
    fn untagged_recipe_only_matches_blank_filter() {
        let recipe = Recipe::default();

        assert!(recipe.matches_cuisine(""));
        assert!(!recipe.matches_cuisine("Thai"));
    }

    #[rstest]
    fn generated_recipe_splits_ingredients() {
        let generated = GeneratedRecipe {
            title: "Pasta".into(),
            content: "Cook it".into(),
            ingredients: "pasta, tomato,, basil ".into(),
        };
        let draft = generated.into_draft();

        assert_eq!(draft.ingredients, vec!["pasta", "tomato", "basil"]);
        assert!(draft.user_generated);
    }

    #[rstest]
    #[case(Submission::Published(Published { smid: Some("9".into()) }), true, "published to the feed")]
    #[case(
        Submission::CreatedOnly { recipe_id: Some("r1".into()), reason: "boom".into() },
        false,
        "not published to the feed: boom"
    )]
    fn submission_summary_matches_what_happened(
        #[case] submission: Submission,
        #[case] published: bool,
        #[case] wording: &str,
    ) {
        assert_eq!(submission.is_published(), published);
        assert!(submission.summary().contains(wording));
    }

    #[rstest]
    fn settle_maps_transport_errors_to_network() {
        let outcome: Outcome<u32> = Outcome::settle(Err(ServerFnError::new("offline")));

        assert!(matches!(outcome, Outcome::NetworkError(message) if message.contains("offline")));
    }

    #[rstest]
    fn failure_prefers_backend_detail() {
        let failure = Outcome::<()>::ServerError {
            status: 404,
            detail: Some("Recipe not found".into()),
        }
        .into_result()
        .expect_err("server error");

        assert_eq!(failure.to_string(), "Recipe not found");
        assert_eq!(
            Failure::Server { status: 500, detail: None }.to_string(),
            "The server rejected the request (status 500)."
        );
    }
}
