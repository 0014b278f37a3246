use futures::future::join_all;
use leptos::*;

use crate::app::{
    backend::{Allergy, Outcome},
    hooks::use_synced_list,
    server_fns::{add_allergy, list_allergies, remove_allergy},
    session::use_session,
    sync::{stage_allergy, ChipSet},
    widgets::{use_notices, ChipInput},
};

/// Account details and the allergy list the recipe generator respects.
#[component]
pub fn ProfilePage() -> impl IntoView {
    let session = use_session();
    let notices = use_notices();
    let name = session.display_name();
    let allergies = use_synced_list("allergies", list_allergies);
    let staged = create_rw_signal(ChipSet::default());
    let saving = create_rw_signal(false);

    let remove_saved = move |allergy: Allergy| {
        spawn_local(async move {
            let outcome = Outcome::settle(remove_allergy(session.token(), allergy.id.clone()).await);
            let patched = allergies.commit(outcome, |list, _| {
                list.remove(&allergy.id);
            });
            if let Err(failure) = patched {
                notices.failure("Allergy Error", &failure);
            }
        });
    };

    let chips = Signal::derive(move || staged.with(ChipSet::to_vec));
    let on_add = Callback::new(move |text: String| {
        let added = allergies
            .items
            .with_untracked(|saved| staged.try_update(|staged| stage_allergy(saved, staged, &text)));
        if added == Some(false) {
            notices.show("Allergies", format!("{} is already on your list.", text.trim()));
        }
    });
    let on_remove = Callback::new(move |text: String| staged.update(|staged| {
        staged.remove(&text);
    }));

    let save = move |_| {
        let pending = staged.get_untracked().to_vec();
        if pending.is_empty() {
            return;
        }
        saving.set(true);
        spawn_local(async move {
            let token = session.token();
            let requests = pending
                .iter()
                .map(|ingredient| add_allergy(token.clone(), ingredient.clone()));
            let outcomes = join_all(requests).await;

            let mut failed = 0;
            for (ingredient, outcome) in pending.iter().zip(outcomes) {
                let patched = allergies.commit(Outcome::settle(outcome), |list, created| {
                    list.append(created);
                });
                match patched {
                    Ok(()) => staged.update(|staged| {
                        staged.remove(ingredient);
                    }),
                    Err(failure) => {
                        logging::warn!("failed to save allergy {ingredient}: {failure}");
                        failed += 1;
                    }
                }
            }

            if failed > 0 {
                notices.show(
                    "Allergy Error",
                    format!("{failed} of {} allergies could not be saved.", pending.len()),
                );
            }
            saving.set(false);
        });
    };

    view! {
        <section class="profile">
            <h1>"Profile"</h1>
            <p class="user-name">{name}</p>
            <h2>"Allergies"</h2>
            <ul class="allergies">
                <For
                    each=move || allergies.snapshot()
                    key=|allergy| allergy.id.clone()
                    children=move |allergy| {
                        let label = allergy.ingredient.clone();
                        view! {
                            <li>
                                {label}
                                <button on:click=move |_| remove_saved(allergy.clone())>"Remove"</button>
                            </li>
                        }
                    }
                />
            </ul>
            <ChipInput chips on_add on_remove placeholder="Add an allergy"/>
            <button
                class="save"
                on:click=save
                disabled=move || saving.get() || staged.with(ChipSet::is_empty)
            >
                "Save allergies"
            </button>
        </section>
    }
}
