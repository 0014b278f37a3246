use leptos::*;
use leptos_router::A;

use crate::app::{
    backend::{Outcome, Post},
    hooks::use_synced_list,
    server_fns::{add_bookmark, add_recipe_to_shopping_list, like_post, list_posts},
    session::use_session,
    sync::{cuisines, like_label, truncate_content},
    widgets::use_notices,
};

const PREVIEW_LINES: usize = 4;

#[component]
pub fn FeedPage() -> impl IntoView {
    let session = use_session();
    let notices = use_notices();
    let posts = use_synced_list("posts", list_posts);
    let cuisine = create_rw_signal(String::new());

    let options = create_memo(move |_| {
        posts
            .items
            .with(|list| cuisines(list.items().iter().map(|post| &post.recipe)))
    });
    let visible = move || {
        let filter = cuisine.get();
        posts
            .items
            .with(|list| list.filtered(|post| post.recipe.matches_cuisine(&filter)))
    };

    let on_like = Callback::new(move |smid: String| {
        spawn_local(async move {
            let outcome = Outcome::settle(like_post(session.token(), smid.clone()).await);
            let patched = posts.commit(outcome, |list, reply| {
                list.update(&smid, |post| post.likes = reply.likes);
            });
            if let Err(failure) = patched {
                notices.failure("Like Error", &failure);
            }
        });
    });

    let recipe_of = move |smid: &str| {
        posts
            .items
            .with_untracked(|list| list.get(smid).map(|post| post.recipe.id.clone()))
            .unwrap_or_default()
    };

    let on_bookmark = Callback::new(move |smid: String| {
        let recipe_id = recipe_of(&smid);
        spawn_local(async move {
            match Outcome::settle(add_bookmark(session.token(), recipe_id).await).into_result() {
                Ok(_) => notices.show("Bookmarked", "Recipe saved to your bookmarks."),
                Err(failure) => notices.failure("Bookmark Error", &failure),
            }
        });
    });

    let on_shop = Callback::new(move |smid: String| {
        let recipe_id = recipe_of(&smid);
        spawn_local(async move {
            let outcome =
                Outcome::settle(add_recipe_to_shopping_list(session.token(), recipe_id).await);
            match outcome.into_result() {
                Ok(_) => notices.show("Shopping List", "Ingredients added to your shopping list."),
                Err(failure) => notices.failure("Shopping List Error", &failure),
            }
        });
    });

    view! {
        <section class="feed">
            <header>
                <h1>"Recipe Feed"</h1>
                <select on:change=move |ev| cuisine.set(event_target_value(&ev))>
                    <option value="">"All cuisines"</option>
                    <For
                        each=move || options.get()
                        key=|option| option.clone()
                        children=|option| view! { <option value=option.clone()>{option}</option> }
                    />
                </select>
                <A href="/generate">"Generate a recipe"</A>
            </header>
            <Show when=move || !posts.loading.get() fallback=|| view! { <p class="loading">"Loading..."</p> }>
                <For
                    each=visible
                    key=|post| post.smid.clone()
                    children=move |post| {
                        let smid = post.smid.clone();
                        let likes = Signal::derive(move || {
                            posts.items.with(|list| list.get(&smid).map(|p| p.likes).unwrap_or_default())
                        });
                        view! { <FeedCard post likes on_like on_bookmark on_shop/> }
                    }
                />
            </Show>
        </section>
    }
}

/// One post in the feed. `likes` is read reactively so a confirmed like
/// updates the count without rebuilding the card.
#[component]
pub fn FeedCard(
    post: Post,
    #[prop(into)] likes: Signal<u32>,
    #[prop(into)] on_like: Callback<String>,
    #[prop(into)] on_bookmark: Callback<String>,
    #[prop(into)] on_shop: Callback<String>,
) -> impl IntoView {
    let Post { smid, recipe, .. } = post;
    let href = format!("/posts/{smid}");
    let preview = truncate_content(&recipe.content, PREVIEW_LINES);
    let cuisine = recipe.cuisine.clone().unwrap_or_default();
    let (like_id, bookmark_id, shop_id) = (smid.clone(), smid.clone(), smid);

    view! {
        <article class="card">
            <h2><a href=href>{recipe.name}</a></h2>
            <span class="cuisine">{cuisine}</span>
            <p class="ingredients">{recipe.ingredients.join(", ")}</p>
            <pre class="content">{preview}</pre>
            <footer>
                <button class="like" on:click=move |_| on_like.call(like_id.clone())>
                    {move || like_label(likes.get())}
                </button>
                <button on:click=move |_| on_bookmark.call(bookmark_id.clone())>"Bookmark"</button>
                <button on:click=move |_| on_shop.call(shop_id.clone())>"Add to shopping list"</button>
            </footer>
        </article>
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::app::backend::Recipe;

    #[rstest]
    fn card_shows_recipe_and_like_count() {
        let runtime = create_runtime();
        let post = Post {
            smid: "1".into(),
            likes: 3,
            recipe: Recipe {
                name: "Soup".into(),
                content: "Boil water".into(),
                ..Default::default()
            },
        };
        let (likes, _) = create_signal(post.likes);
        let noop = Callback::new(|_: String| {});

        let html = view! {
            <FeedCard post likes on_like=noop on_bookmark=noop on_shop=noop/>
        }
        .into_view()
        .render_to_string();

        assert!(html.contains("Soup"));
        assert!(html.contains("3 Likes"));
        assert!(html.contains("/posts/1"));
        runtime.dispose();
    }
}
