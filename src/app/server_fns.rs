//! Server functions: the browser's only way to the recipe backend. Each one
//! forwards to the shared [`BackendClient`](super::backend::BackendClient)
//! with the caller's bearer token.

use leptos::*;

use super::backend::{
    Ack, Allergy, AuthReply, Bookmark, Comment, GenerateRequest, GeneratedRecipe, LikeReply,
    Outcome, Post, Recipe, RecipeDraft, RecipeUpdate, ShoppingListUpdate, Submission, VerifyReply,
};

#[cfg(feature = "ssr")]
fn backend() -> Result<std::sync::Arc<super::backend::BackendClient>, ServerFnError> {
    use_context().ok_or_else(|| ServerFnError::new("backend client is not configured"))
}

#[server]
pub async fn login(email: String, password: String) -> Result<Outcome<AuthReply>, ServerFnError> {
    Ok(backend()?.login(email.trim(), &password).await)
}

#[server]
pub async fn signup(
    email: String,
    password: String,
    name: String,
) -> Result<Outcome<AuthReply>, ServerFnError> {
    Ok(backend()?.signup(email.trim(), &password, name.trim()).await)
}

#[server]
pub async fn verify_session(token: String) -> Result<Outcome<VerifyReply>, ServerFnError> {
    Ok(backend()?.verify(&token).await)
}

#[server]
pub async fn list_recipes(token: String) -> Result<Outcome<Vec<Recipe>>, ServerFnError> {
    Ok(backend()?.recipes(&token).await)
}

#[server]
pub async fn get_recipe(token: String, id: String) -> Result<Outcome<Recipe>, ServerFnError> {
    Ok(backend()?.recipe(&token, &id).await)
}

/// Creates a recipe and publishes it to the feed. A recipe that was stored
/// but could not be published is still a success, tagged as such.
#[server]
pub async fn create_and_publish(
    token: String,
    draft: RecipeDraft,
) -> Result<Outcome<Submission>, ServerFnError> {
    Ok(backend()?.create_and_publish(&token, &draft).await)
}

#[server]
pub async fn update_recipe(
    token: String,
    id: String,
    update: RecipeUpdate,
) -> Result<Outcome<Recipe>, ServerFnError> {
    Ok(backend()?.update_recipe(&token, &id, &update).await)
}

#[server]
pub async fn delete_recipe(token: String, id: String) -> Result<Outcome<Ack>, ServerFnError> {
    Ok(backend()?.delete_recipe(&token, &id).await)
}

#[server]
pub async fn list_posts(token: String) -> Result<Outcome<Vec<Post>>, ServerFnError> {
    Ok(backend()?.posts(&token).await)
}

#[server]
pub async fn get_post(token: String, smid: String) -> Result<Outcome<Post>, ServerFnError> {
    Ok(backend()?.post(&token, &smid).await)
}

#[server]
pub async fn like_post(token: String, smid: String) -> Result<Outcome<LikeReply>, ServerFnError> {
    Ok(backend()?.like(&token, &smid).await)
}

#[server]
pub async fn list_comments(token: String, smid: String) -> Result<Outcome<Vec<Comment>>, ServerFnError> {
    Ok(backend()?.comments(&token, &smid).await)
}

#[server]
pub async fn add_comment(
    token: String,
    smid: String,
    text: String,
) -> Result<Outcome<Ack>, ServerFnError> {
    Ok(backend()?.add_comment(&token, &smid, text.trim()).await)
}

#[server]
pub async fn list_bookmarks(token: String) -> Result<Outcome<Vec<Bookmark>>, ServerFnError> {
    Ok(backend()?.bookmarks(&token).await)
}

#[server]
pub async fn add_bookmark(token: String, recipe_id: String) -> Result<Outcome<Ack>, ServerFnError> {
    Ok(backend()?.add_bookmark(&token, &recipe_id).await)
}

#[server]
pub async fn get_shopping_list(token: String) -> Result<Outcome<Vec<String>>, ServerFnError> {
    Ok(backend()?.shopping_list(&token).await)
}

#[server]
pub async fn save_shopping_list(
    token: String,
    update: ShoppingListUpdate,
) -> Result<Outcome<Ack>, ServerFnError> {
    Ok(backend()?.replace_shopping_list(&token, &update.items).await)
}

#[server]
pub async fn add_recipe_to_shopping_list(
    token: String,
    recipe_id: String,
) -> Result<Outcome<Ack>, ServerFnError> {
    Ok(backend()?.merge_into_shopping_list(&token, &recipe_id).await)
}

#[server]
pub async fn list_allergies(token: String) -> Result<Outcome<Vec<Allergy>>, ServerFnError> {
    Ok(backend()?.allergies(&token).await)
}

#[server]
pub async fn add_allergy(token: String, ingredient: String) -> Result<Outcome<Allergy>, ServerFnError> {
    Ok(backend()?.add_allergy(&token, ingredient.trim()).await)
}

#[server]
pub async fn remove_allergy(token: String, id: String) -> Result<Outcome<Ack>, ServerFnError> {
    Ok(backend()?.remove_allergy(&token, &id).await)
}

#[server]
pub async fn generate_recipe(
    token: String,
    request: GenerateRequest,
) -> Result<Outcome<GeneratedRecipe>, ServerFnError> {
    Ok(backend()?.generate(&token, &request).await)
}
