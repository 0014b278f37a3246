use leptos::*;

use crate::app::{
    backend::{Outcome, ShoppingListUpdate},
    server_fns::{get_shopping_list, save_shopping_list},
    session::use_session,
    sync::ShoppingDraft,
    widgets::{use_notices, ChipInput},
};

#[component]
pub fn ShoppingListPage() -> impl IntoView {
    let session = use_session();
    let notices = use_notices();
    let list = create_rw_signal(ShoppingDraft::default());
    let saving = create_rw_signal(false);
    // edits made before the saved list arrives would be overwritten by it
    let ready = create_rw_signal(false);

    let loaded = create_local_resource(
        || (),
        move |_| async move { Outcome::settle(get_shopping_list(session.token()).await) },
    );
    create_effect(move |_| {
        if let Some(outcome) = loaded.get() {
            match outcome.into_result() {
                Ok(items) => {
                    list.set(ShoppingDraft::from_saved(items));
                    ready.set(true);
                }
                Err(failure) => {
                    logging::warn!("failed to fetch shopping list: {failure}");
                    notices.failure("Fetch Error", &failure);
                }
            }
        }
    });

    let chips = Signal::derive(move || list.with(|list| list.draft().to_vec()));
    let on_add = Callback::new(move |item: String| list.update(|list| {
        list.add(&item);
    }));
    let on_remove = Callback::new(move |item: String| list.update(|list| {
        list.remove(&item);
    }));

    let save = move |_| {
        let update = ShoppingListUpdate {
            items: list.with_untracked(|list| list.draft().to_vec()),
        };
        saving.set(true);
        spawn_local(async move {
            match Outcome::settle(save_shopping_list(session.token(), update).await).into_result() {
                Ok(_) => {
                    list.update(ShoppingDraft::confirm_saved);
                    notices.show("Shopping List", "Your shopping list was saved.");
                }
                Err(failure) => notices.failure("Save Error", &failure),
            }
            saving.set(false);
        });
    };

    view! {
        <section class="shopping-list">
            <h1>"Shopping List"</h1>
            <ChipInput
                chips
                on_add
                on_remove
                placeholder="Add an item"
                disabled=Signal::derive(move || !ready.get())
            />
            <button
                class="save"
                on:click=save
                disabled=move || !ready.get() || saving.get() || !list.with(ShoppingDraft::is_dirty)
            >
                "Save"
            </button>
        </section>
    }
}
