use leptos::*;
use leptos_router::{use_navigate, A};

use super::{
    backend::Failure,
    session::{use_session, Role, LOGIN_ROUTE},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

/// App-wide dialog slot. One notice is shown at a time and a newer one
/// replaces whatever is open.
#[derive(Clone, Copy)]
pub struct Notices(RwSignal<Option<Notice>>);

impl Notices {
    pub fn show(&self, title: impl Into<String>, message: impl Into<String>) {
        self.0.set(Some(Notice {
            title: title.into(),
            message: message.into(),
        }));
    }

    pub fn failure(&self, title: impl Into<String>, failure: &Failure) {
        self.show(title, failure.to_string());
    }

    pub fn dismiss(&self) {
        self.0.set(None);
    }

    pub fn current(&self) -> Option<Notice> {
        self.0.get()
    }
}

pub fn provide_notices() -> Notices {
    let notices = Notices(create_rw_signal(None));
    provide_context(notices);
    notices
}

pub fn use_notices() -> Notices {
    expect_context::<Notices>()
}

#[component]
pub fn NoticeDialog() -> impl IntoView {
    let notices = use_notices();

    view! {
        {move || notices.current().map(|notice| view! {
            <div class="dialog-backdrop">
                <div class="dialog" role="alertdialog">
                    <h2>{notice.title}</h2>
                    <p>{notice.message}</p>
                    <button on:click=move |_| notices.dismiss()>"Close"</button>
                </div>
            </div>
        })}
    }
}

/// Removable text chips with an entry box that adds on Enter.
#[component]
pub fn ChipInput(
    #[prop(into)] chips: Signal<Vec<String>>,
    #[prop(into)] on_add: Callback<String>,
    #[prop(into)] on_remove: Callback<String>,
    #[prop(optional, into)] placeholder: String,
    #[prop(optional, into)] disabled: MaybeSignal<bool>,
) -> impl IntoView {
    let (text, set_text) = create_signal(String::new());
    let submit = move || {
        if disabled.get_untracked() {
            return;
        }
        let entry = text.get_untracked();
        if !entry.trim().is_empty() {
            on_add.call(entry);
            set_text.set(String::new());
        }
    };

    view! {
        <div class="chips">
            <For
                each=move || chips.get()
                key=|chip| chip.clone()
                children=move |chip| {
                    let removed = chip.clone();
                    view! {
                        <span class="chip">
                            {chip}
                            <button
                                class="chip-remove"
                                disabled=move || disabled.get()
                                on:click=move |_| on_remove.call(removed.clone())
                            >
                                "x"
                            </button>
                        </span>
                    }
                }
            />
            <input
                type="text"
                placeholder=placeholder
                disabled=move || disabled.get()
                prop:value=move || text.get()
                on:input=move |ev| set_text.set(event_target_value(&ev))
                on:keydown=move |ev: ev::KeyboardEvent| {
                    if ev.key() == "Enter" {
                        ev.prevent_default();
                        submit();
                    }
                }
            />
            <button type="button" disabled=move || disabled.get() on:click=move |_| submit()>
                "Add"
            </button>
        </div>
    }
}

#[component]
pub fn Navbar() -> impl IntoView {
    let session = use_session();
    let name = session.display_name();
    let role = move || session.get().role;
    let navigate = use_navigate();

    let logout = move |_| {
        session.clear();
        navigate(LOGIN_ROUTE, Default::default());
    };

    view! {
        <nav class="navbar">
            <span class="brand">"Recipe Feed"</span>
            {move || match role() {
                Some(Role::User) => view! {
                    <A href="/feed">"Feed"</A>
                    <A href="/bookmarks">"Bookmarks"</A>
                    <A href="/shopping-list">"Shopping List"</A>
                    <A href="/generate">"Generate"</A>
                    <A href="/profile">"Profile"</A>
                }
                .into_view(),
                Some(Role::Admin) => view! {
                    <A href="/admin">"Recipes"</A>
                    <A href="/admin/upload">"Upload"</A>
                }
                .into_view(),
                None => ().into_view(),
            }}
            <Show when=move || session.get().has_token()>
                <span class="user-name">{name}</span>
                <button class="logout" on:click=logout.clone()>"Log out"</button>
            </Show>
        </nav>
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn render_chips(disabled: bool) -> String {
        let runtime = create_runtime();
        let chips = Signal::derive(|| vec!["Milk".to_string()]);
        let noop = Callback::new(|_: String| {});

        let html = view! {
            <ChipInput chips on_add=noop on_remove=noop disabled/>
        }
        .into_view()
        .render_to_string()
        .to_string();
        runtime.dispose();
        html
    }

    #[rstest]
    fn chip_editor_can_be_locked() {
        let locked = render_chips(true);

        assert!(locked.contains("Milk"));
        assert!(locked.contains("disabled"));
    }

    #[rstest]
    fn chip_editor_is_open_by_default() {
        assert!(!render_chips(false).contains("disabled"));
    }
}
