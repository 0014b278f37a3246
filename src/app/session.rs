//! Session state and the guard that gates protected pages.
//!
//! The session (bearer token, role, display name) lives in browser local
//! storage and is exposed to the component tree through one
//! [`SessionContext`] provided at the app root. Login and signup write it,
//! logout clears it, everything else only reads.

use leptos::*;
use leptos_router::{use_navigate, NavigateOptions};
use leptos_use::{storage::use_local_storage, utils::JsonCodec};
use serde::{Deserialize, Serialize};

use super::{
    backend::{AuthReply, Outcome, VerifyReply},
    server_fns::verify_session,
};

pub const LOGIN_ROUTE: &str = "/";

const STORAGE_KEY: &str = "recipe-feed-session";

/// Binary account role. The backend encodes it as a boolean where `true`
/// marks an end-user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum Role {
    Admin,
    User,
}

impl From<bool> for Role {
    fn from(is_user: bool) -> Self {
        if is_user {
            Role::User
        } else {
            Role::Admin
        }
    }
}

impl From<Role> for bool {
    fn from(role: Role) -> Self {
        role == Role::User
    }
}

impl Role {
    /// Where a freshly authenticated user of this role lands.
    pub fn home_route(self) -> &'static str {
        match self {
            Role::User => "/feed",
            Role::Admin => "/admin",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Session {
    pub fn from_auth(reply: AuthReply) -> Self {
        Self {
            token: Some(reply.access_token),
            role: Some(reply.role),
            name: reply.name,
        }
    }

    pub fn token(&self) -> &str {
        self.token.as_deref().map(str::trim).unwrap_or_default()
    }

    pub fn has_token(&self) -> bool {
        !self.token().is_empty()
    }
}

#[derive(Clone, Copy)]
pub struct SessionContext {
    session: Signal<Session>,
    set_session: WriteSignal<Session>,
    clear: Callback<()>,
}

impl SessionContext {
    pub fn get(&self) -> Session {
        self.session.get()
    }

    /// Current token without subscribing; requests read it at call time.
    pub fn token(&self) -> String {
        self.session.with_untracked(|s| s.token().to_string())
    }

    pub fn display_name(&self) -> Signal<String> {
        let session = self.session;
        Signal::derive(move || session.with(|s| s.name.clone().unwrap_or_default()))
    }

    pub fn store(&self, session: Session) {
        self.set_session.set(session);
    }

    pub fn clear(&self) {
        self.clear.call(());
    }
}

/// Loads the persisted session and makes it available to the whole tree.
pub fn provide_session() -> SessionContext {
    let (session, set_session, remove) = use_local_storage::<Session, JsonCodec>(STORAGE_KEY);
    let context = SessionContext {
        session,
        set_session,
        clear: Callback::new(move |_| remove()),
    };
    provide_context(context);
    context
}

pub fn use_session() -> SessionContext {
    expect_context::<SessionContext>()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Verifying,
    Granted(Role),
    Redirect(&'static str),
}

/// Decides what a guarded page shows. Anything but a successful verification
/// with a permitted role sends the user to the login page.
pub fn resolve_guard(verification: Option<&Outcome<VerifyReply>>, allow: &[Role]) -> GuardState {
    match verification {
        None => GuardState::Verifying,
        Some(Outcome::Success(reply)) if allow.contains(&reply.role) => {
            GuardState::Granted(reply.role)
        }
        Some(_) => GuardState::Redirect(LOGIN_ROUTE),
    }
}

/// Verifies `token` with the backend. A blank token never leaves the browser.
pub async fn check_session(token: String) -> Outcome<VerifyReply> {
    if token.trim().is_empty() {
        return Outcome::Unauthorized;
    }

    Outcome::settle(verify_session(token).await)
}

/// Renders `children` only once the stored session has been verified and its
/// role is in `allow`. Verification runs once per mount.
#[component]
pub fn SessionGuard(#[prop(into)] allow: Vec<Role>, children: ChildrenFn) -> impl IntoView {
    let session = use_session();
    let verification = create_local_resource(|| (), move |_| check_session(session.token()));
    let state = create_memo(move |_| resolve_guard(verification.get().as_ref(), &allow));

    let navigate = use_navigate();
    create_effect(move |_| {
        if let GuardState::Redirect(to) = state.get() {
            logging::warn!("session check failed, redirecting to {to}");
            navigate(
                to,
                NavigateOptions {
                    replace: true,
                    ..Default::default()
                },
            );
        }
    });

    view! {
        <Show
            when=move || matches!(state.get(), GuardState::Granted(_))
            fallback=|| view! { <p class="loading">"Loading..."</p> }
        >
            {children()}
        </Show>
    }
}
