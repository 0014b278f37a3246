use std::future::Future;

use leptos::*;

use super::{
    backend::{Failure, Outcome},
    session::use_session,
    sync::{Keyed, SyncedList},
    widgets::use_notices,
};

/// Reactive handle on a list fetched once on mount.
pub struct ListState<T: 'static> {
    pub items: RwSignal<SyncedList<T>>,
    pub loading: Signal<bool>,
    loaded: Resource<(), Outcome<Vec<T>>>,
}

impl<T: 'static> Clone for ListState<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for ListState<T> {}

impl<T: Keyed + Clone + 'static> ListState<T> {
    /// Tracked copy of the items, in server order.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.with(SyncedList::to_vec)
    }

    /// Patches the list with the confirmed result of a mutation. Failures
    /// leave it as it was.
    pub fn commit<R>(
        &self,
        outcome: Outcome<R>,
        patch: impl FnOnce(&mut SyncedList<T>, R),
    ) -> Result<(), Failure> {
        let mut result = Ok(());
        self.items
            .update(|list| result = list.commit(outcome, patch));
        result
    }

    /// Fetches the whole list again and replaces the local copy.
    pub fn reload(&self) {
        self.loaded.refetch();
    }
}

/// Issues `fetch` with the session token on mount and keeps the result in a
/// [`SyncedList`]. A failed read leaves the list empty and raises a notice.
pub fn use_synced_list<T, F, Fut>(what: &'static str, fetch: F) -> ListState<T>
where
    T: Keyed + Clone + 'static,
    F: Fn(String) -> Fut + 'static,
    Fut: Future<Output = Result<Outcome<Vec<T>>, ServerFnError>> + 'static,
{
    let session = use_session();
    let notices = use_notices();
    let items = create_rw_signal(SyncedList::default());

    let loaded = create_local_resource(
        || (),
        move |_| {
            let request = fetch(session.token());
            async move { Outcome::settle(request.await) }
        },
    );

    create_effect(move |_| {
        if let Some(outcome) = loaded.get() {
            match outcome.into_result() {
                Ok(fetched) => items.set(SyncedList::from_server(fetched)),
                Err(failure) => {
                    logging::warn!("failed to fetch {what}: {failure}");
                    notices.failure("Fetch Error", &failure);
                }
            }
        }
    });

    ListState {
        items,
        loading: loaded.loading(),
        loaded,
    }
}
