use leptos::*;
use leptos_router::use_params_map;

use crate::app::{
    backend::{Outcome, Post},
    hooks::use_synced_list,
    server_fns::{add_bookmark, add_comment, get_post, like_post, list_comments},
    session::use_session,
    sync::{like_label, with_occurrence},
    widgets::use_notices,
};

/// A single post with its full recipe and comment thread.
#[component]
pub fn PostPage() -> impl IntoView {
    let session = use_session();
    let notices = use_notices();
    let params = use_params_map();
    let smid = move || params.with_untracked(|p| p.get("id").cloned().unwrap_or_default());

    let post = create_rw_signal(None::<Post>);
    let loaded = create_local_resource(
        || (),
        move |_| async move { Outcome::settle(get_post(session.token(), smid()).await) },
    );
    create_effect(move |_| {
        if let Some(outcome) = loaded.get() {
            match outcome.into_result() {
                Ok(fetched) => post.set(Some(fetched)),
                Err(failure) => {
                    logging::warn!("failed to fetch post {}: {failure}", smid());
                    notices.failure("Fetch Error", &failure);
                }
            }
        }
    });

    let comments = use_synced_list("comments", move |token| list_comments(token, smid()));
    let draft = create_rw_signal(String::new());
    let posting = create_rw_signal(false);

    let like = move |_| {
        spawn_local(async move {
            match Outcome::settle(like_post(session.token(), smid()).await).into_result() {
                Ok(reply) => post.update(|post| {
                    if let Some(post) = post {
                        post.likes = reply.likes;
                    }
                }),
                Err(failure) => notices.failure("Like Error", &failure),
            }
        });
    };

    let bookmark = move |_| {
        let Some(recipe_id) = post.with_untracked(|post| post.as_ref().map(|p| p.recipe.id.clone()))
        else {
            return;
        };
        spawn_local(async move {
            match Outcome::settle(add_bookmark(session.token(), recipe_id).await).into_result() {
                Ok(_) => notices.show("Bookmarked", "Recipe saved to your bookmarks."),
                Err(failure) => notices.failure("Bookmark Error", &failure),
            }
        });
    };

    let submit_comment = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let text = draft.get_untracked();
        if text.trim().is_empty() || posting.get_untracked() {
            return;
        }
        posting.set(true);
        spawn_local(async move {
            match Outcome::settle(add_comment(session.token(), smid(), text).await).into_result() {
                Ok(_) => {
                    draft.set(String::new());
                    comments.reload();
                }
                Err(failure) => notices.failure("Comment Error", &failure),
            }
            posting.set(false);
        });
    };

    view! {
        <section class="post">
            {move || post.get().map(|post| view! {
                <h1>{post.recipe.name}</h1>
                {post.recipe.cuisine.map(|cuisine| view! { <span class="cuisine">{cuisine}</span> })}
                <h2>"Ingredients"</h2>
                <ul>
                    {post.recipe.ingredients.into_iter().map(|item| view! { <li>{item}</li> }).collect_view()}
                </ul>
                <pre class="content">{post.recipe.content}</pre>
                <button class="like" on:click=like>{like_label(post.likes)}</button>
                <button on:click=bookmark>"Bookmark"</button>
            })}
            <h2>"Comments"</h2>
            <ul class="comments">
                <For
                    // comment ids are optional on the wire
                    each=move || {
                        with_occurrence(comments.snapshot(), |comment| {
                            (comment.id.clone(), comment.user_id.clone(), comment.text.clone())
                        })
                    }
                    key=|(key, _)| key.clone()
                    children=|(_, comment)| view! {
                        <li>
                            <strong>{comment.user_name}</strong>
                            " "
                            {comment.text}
                        </li>
                    }
                />
            </ul>
            <form on:submit=submit_comment>
                <input
                    type="text"
                    placeholder="Add a comment"
                    prop:value=move || draft.get()
                    on:input=move |ev| draft.set(event_target_value(&ev))
                />
                <button type="submit" disabled=move || posting.get()>"Post"</button>
            </form>
        </section>
    }
}
