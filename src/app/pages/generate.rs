use leptos::*;
use leptos_router::{use_navigate, NavigateOptions};

use crate::app::{
    backend::{GenerateRequest, GeneratedRecipe, Outcome},
    server_fns::{create_and_publish, generate_recipe},
    session::use_session,
    sync::ChipSet,
    widgets::{use_notices, ChipInput},
};

fn chip_callbacks(set: RwSignal<ChipSet>) -> (Signal<Vec<String>>, Callback<String>, Callback<String>) {
    let chips = Signal::derive(move || set.with(ChipSet::to_vec));
    let add = Callback::new(move |text: String| set.update(|set| {
        set.insert(&text);
    }));
    let remove = Callback::new(move |text: String| set.update(|set| {
        set.remove(&text);
    }));
    (chips, add, remove)
}

/// Asks the AI endpoint for a recipe and lets the user publish the result.
#[component]
pub fn GeneratePage() -> impl IntoView {
    let session = use_session();
    let notices = use_notices();
    let navigate = use_navigate();

    let question = create_rw_signal(String::new());
    let ingredients = create_rw_signal(ChipSet::default());
    let restrictions = create_rw_signal(ChipSet::default());
    let generated = create_rw_signal(None::<GeneratedRecipe>);
    let busy = create_rw_signal(false);

    let (ingredient_chips, add_ingredient, remove_ingredient) = chip_callbacks(ingredients);
    let (restriction_chips, add_restriction, remove_restriction) = chip_callbacks(restrictions);

    let generate = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let request = GenerateRequest {
            question: question.get_untracked().trim().to_string(),
            ingredients: ingredients.with_untracked(ChipSet::to_vec),
            dietary_restrictions: restrictions.with_untracked(ChipSet::to_vec),
        };
        busy.set(true);
        spawn_local(async move {
            match Outcome::settle(generate_recipe(session.token(), request).await).into_result() {
                Ok(recipe) => generated.set(Some(recipe)),
                Err(failure) => notices.failure("Generation Error", &failure),
            }
            busy.set(false);
        });
    };

    let save = move |_| {
        let Some(recipe) = generated.get_untracked() else {
            return;
        };
        busy.set(true);
        let navigate = navigate.clone();
        spawn_local(async move {
            let outcome = create_and_publish(session.token(), recipe.into_draft()).await;
            match Outcome::settle(outcome).into_result() {
                Ok(submission) => {
                    let title = if submission.is_published() {
                        "Recipe Published"
                    } else {
                        "Recipe Saved"
                    };
                    notices.show(title, submission.summary());
                    navigate(
                        "/feed",
                        NavigateOptions {
                            replace: true,
                            ..Default::default()
                        },
                    );
                }
                Err(failure) => notices.failure("Save Error", &failure),
            }
            busy.set(false);
        });
    };

    view! {
        <section class="generate">
            <h1>"Generate a recipe"</h1>
            <form on:submit=generate>
                <textarea
                    placeholder="What would you like to cook?"
                    prop:value=move || question.get()
                    on:input=move |ev| question.set(event_target_value(&ev))
                ></textarea>
                <h2>"Ingredients"</h2>
                <ChipInput
                    chips=ingredient_chips
                    on_add=add_ingredient
                    on_remove=remove_ingredient
                    placeholder="Add an ingredient"
                />
                <h2>"Dietary restrictions"</h2>
                <ChipInput
                    chips=restriction_chips
                    on_add=add_restriction
                    on_remove=remove_restriction
                    placeholder="Add a restriction"
                />
                <button type="submit" disabled=move || busy.get()>"Generate"</button>
            </form>
            {move || generated.get().map(|recipe| {
                let ingredients = recipe.ingredient_list();
                view! {
                    <article class="card generated">
                        <h2>{recipe.title}</h2>
                        <ul>
                            {ingredients.into_iter().map(|item| view! { <li>{item}</li> }).collect_view()}
                        </ul>
                        <pre class="content">{recipe.content}</pre>
                    </article>
                }
            })}
            <Show when=move || generated.with(Option::is_some)>
                <button class="save" on:click=save.clone() disabled=move || busy.get()>
                    "Publish"
                </button>
            </Show>
        </section>
    }
}
