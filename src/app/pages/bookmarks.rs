use leptos::*;

use crate::app::{hooks::use_synced_list, server_fns::list_bookmarks, sync::truncate_content};

#[component]
pub fn BookmarksPage() -> impl IntoView {
    let bookmarks = use_synced_list("bookmarks", list_bookmarks);

    view! {
        <section class="bookmarks">
            <h1>"Bookmarks"</h1>
            <Show when=move || !bookmarks.loading.get() fallback=|| view! { <p class="loading">"Loading..."</p> }>
                <Show
                    when=move || !bookmarks.items.with(|list| list.is_empty())
                    fallback=|| view! { <p>"Nothing bookmarked yet."</p> }
                >
                    <For
                        each=move || bookmarks.snapshot()
                        key=|bookmark| bookmark.id.clone()
                        children=|bookmark| {
                            let title = if bookmark.smid.is_empty() {
                                view! { <span>{bookmark.recipe.name}</span> }.into_view()
                            } else {
                                let href = format!("/posts/{}", bookmark.smid);
                                view! { <a href=href>{bookmark.recipe.name}</a> }.into_view()
                            };
                            view! {
                                <article class="card">
                                    <h2>{title}</h2>
                                    <pre class="content">{truncate_content(&bookmark.recipe.content, 4)}</pre>
                                </article>
                            }
                        }
                    />
                </Show>
            </Show>
        </section>
    }
}
