use leptos::*;
use leptos_router::{use_navigate, use_params_map, NavigateOptions, A};

use crate::app::{
    backend::{Outcome, Recipe, RecipeDraft, RecipeUpdate},
    hooks::use_synced_list,
    server_fns::{create_and_publish, delete_recipe, get_recipe, list_recipes, update_recipe},
    session::use_session,
    sync::{cuisines, truncate_content, ChipSet},
    widgets::{use_notices, ChipInput},
};

const ADMIN_HOME: &str = "/admin";

/// Both upload and edit refuse to send a recipe without a title or body.
pub fn check_recipe_fields(title: &str, content: &str) -> Result<(), &'static str> {
    if title.trim().is_empty() || content.trim().is_empty() {
        return Err("A recipe needs a title and some content.");
    }
    Ok(())
}

/// Every recipe in the system, filterable by cuisine, with delete and edit.
#[component]
pub fn AdminPage() -> impl IntoView {
    let session = use_session();
    let notices = use_notices();
    let recipes = use_synced_list("recipes", list_recipes);
    let cuisine = create_rw_signal(String::new());

    let options = create_memo(move |_| recipes.items.with(|list| cuisines(list.items())));
    let visible = move || {
        let filter = cuisine.get();
        recipes
            .items
            .with(|list| list.filtered(|recipe: &Recipe| recipe.matches_cuisine(&filter)))
    };

    let delete = move |id: String| {
        spawn_local(async move {
            let outcome = Outcome::settle(delete_recipe(session.token(), id.clone()).await);
            let patched = recipes.commit(outcome, |list, _| {
                list.remove(&id);
            });
            if let Err(failure) = patched {
                notices.failure("Delete Error", &failure);
            }
        });
    };

    view! {
        <section class="admin">
            <header>
                <h1>"Recipes"</h1>
                <select on:change=move |ev| cuisine.set(event_target_value(&ev))>
                    <option value="">"All cuisines"</option>
                    <For
                        each=move || options.get()
                        key=|option| option.clone()
                        children=|option| view! { <option value=option.clone()>{option}</option> }
                    />
                </select>
                <A href="/admin/upload">"Upload a recipe"</A>
            </header>
            <Show when=move || !recipes.loading.get() fallback=|| view! { <p class="loading">"Loading..."</p> }>
                <table>
                    <thead>
                        <tr><th>"Name"</th><th>"Cuisine"</th><th>"Content"</th><th></th></tr>
                    </thead>
                    <tbody>
                        <For
                            each=visible
                            key=|recipe| recipe.id.clone()
                            children=move |recipe| {
                                let id = recipe.id.clone();
                                let edit = format!("/admin/edit/{}", recipe.id);
                                view! {
                                    <tr>
                                        <td>{recipe.name}</td>
                                        <td>{recipe.cuisine.unwrap_or_default()}</td>
                                        <td><pre>{truncate_content(&recipe.content, 2)}</pre></td>
                                        <td>
                                            <a href=edit>"Edit"</a>
                                            <button on:click=move |_| delete(id.clone())>"Delete"</button>
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>
            </Show>
        </section>
    }
}

#[component]
pub fn UploadRecipePage() -> impl IntoView {
    let session = use_session();
    let notices = use_notices();
    let navigate = use_navigate();

    let title = create_rw_signal(String::new());
    let cuisine = create_rw_signal(String::new());
    let content = create_rw_signal(String::new());
    let ingredients = create_rw_signal(ChipSet::default());
    let saving = create_rw_signal(false);

    let chips = Signal::derive(move || ingredients.with(ChipSet::to_vec));
    let on_add = Callback::new(move |text: String| ingredients.update(|set| {
        set.insert(&text);
    }));
    let on_remove = Callback::new(move |text: String| ingredients.update(|set| {
        set.remove(&text);
    }));

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let draft = RecipeDraft {
            title: title.get_untracked().trim().to_string(),
            content: content.get_untracked(),
            ingredients: ingredients.with_untracked(ChipSet::to_vec),
            cuisine: cuisine.get_untracked().trim().to_string(),
            user_generated: false,
        };
        if let Err(message) = check_recipe_fields(&draft.title, &draft.content) {
            notices.show("Upload Error", message);
            return;
        }
        saving.set(true);
        let navigate = navigate.clone();
        spawn_local(async move {
            match Outcome::settle(create_and_publish(session.token(), draft).await).into_result() {
                Ok(submission) => {
                    if !submission.is_published() {
                        notices.show("Recipe Saved", submission.summary());
                    }
                    navigate(ADMIN_HOME, NavigateOptions::default());
                }
                Err(failure) => notices.failure("Upload Error", &failure),
            }
            saving.set(false);
        });
    };

    view! {
        <section class="upload">
            <h1>"Upload a recipe"</h1>
            <form on:submit=submit>
                <input
                    type="text"
                    placeholder="Title"
                    prop:value=move || title.get()
                    on:input=move |ev| title.set(event_target_value(&ev))
                />
                <input
                    type="text"
                    placeholder="Cuisine"
                    prop:value=move || cuisine.get()
                    on:input=move |ev| cuisine.set(event_target_value(&ev))
                />
                <ChipInput chips on_add on_remove placeholder="Add an ingredient"/>
                <textarea
                    placeholder="Method"
                    prop:value=move || content.get()
                    on:input=move |ev| content.set(event_target_value(&ev))
                ></textarea>
                <button type="submit" disabled=move || saving.get()>"Upload"</button>
            </form>
        </section>
    }
}

#[component]
pub fn EditRecipePage() -> impl IntoView {
    let session = use_session();
    let notices = use_notices();
    let navigate = use_navigate();
    let params = use_params_map();
    let id = move || params.with_untracked(|p| p.get("id").cloned().unwrap_or_default());

    let title = create_rw_signal(String::new());
    let content = create_rw_signal(String::new());
    let saving = create_rw_signal(false);
    let loaded_ok = create_rw_signal(false);

    let loaded = create_local_resource(
        || (),
        move |_| async move { Outcome::settle(get_recipe(session.token(), id()).await) },
    );
    create_effect(move |_| {
        if let Some(outcome) = loaded.get() {
            match outcome.into_result() {
                Ok(recipe) => {
                    title.set(recipe.name);
                    content.set(recipe.content);
                    loaded_ok.set(true);
                }
                Err(failure) => {
                    logging::warn!("failed to fetch recipe {}: {failure}", id());
                    notices.failure("Fetch Error", &failure);
                }
            }
        }
    });

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if !loaded_ok.get_untracked() || saving.get_untracked() {
            return;
        }
        let update = RecipeUpdate {
            title: title.get_untracked().trim().to_string(),
            content: content.get_untracked(),
        };
        if let Err(message) = check_recipe_fields(&update.title, &update.content) {
            notices.show("Update Error", message);
            return;
        }
        saving.set(true);
        let navigate = navigate.clone();
        spawn_local(async move {
            match Outcome::settle(update_recipe(session.token(), id(), update).await).into_result() {
                Ok(_) => {
                    notices.show("Recipe Updated", "Your changes were saved.");
                    navigate(ADMIN_HOME, NavigateOptions::default());
                }
                Err(failure) => notices.failure("Update Error", &failure),
            }
            saving.set(false);
        });
    };

    view! {
        <section class="edit">
            <h1>"Edit recipe"</h1>
            <Show
                when=move || loaded_ok.get()
                fallback=move || {
                    if loaded.loading().get() {
                        view! { <p class="loading">"Loading..."</p> }
                    } else {
                        view! { <p class="error">"This recipe could not be loaded."</p> }
                    }
                }
            >
                <form on:submit=submit.clone()>
                    <input
                        type="text"
                        prop:value=move || title.get()
                        on:input=move |ev| title.set(event_target_value(&ev))
                    />
                    <textarea
                        prop:value=move || content.get()
                        on:input=move |ev| content.set(event_target_value(&ev))
                    ></textarea>
                    <button type="submit" disabled=move || saving.get()>"Save"</button>
                </form>
            </Show>
        </section>
    }
}
