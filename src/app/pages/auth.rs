use leptos::*;
use leptos_router::{use_navigate, NavigateOptions, A};

use crate::app::{
    backend::{AuthReply, Failure, Outcome},
    server_fns::{login, signup},
    session::{use_session, Session},
};

/// Client-side checks run before a signup request is sent.
pub fn check_signup(name: &str, email: &str, password: &str, confirm: &str) -> Result<(), String> {
    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err("Name, email and password are required.".to_string());
    }
    if password != confirm {
        return Err("Passwords do not match.".to_string());
    }
    Ok(())
}

fn auth_error(failure: Failure) -> String {
    match failure {
        // a 401 from /login means bad credentials, not an expired session
        Failure::Unauthorized => "Incorrect email or password.".to_string(),
        other => other.to_string(),
    }
}

/// Stores a fresh session and sends the user to their role's landing page.
fn use_sign_in() -> impl Fn(Outcome<AuthReply>) -> Option<String> + Clone {
    let session = use_session();
    let navigate = use_navigate();

    move |outcome| match outcome.into_result() {
        Ok(reply) => {
            let home = reply.role.home_route();
            session.store(Session::from_auth(reply));
            navigate(
                home,
                NavigateOptions {
                    replace: true,
                    ..Default::default()
                },
            );
            None
        }
        Err(failure) => Some(auth_error(failure)),
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let (email, set_email) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let error = create_rw_signal(None::<String>);
    let pending = create_rw_signal(false);
    let sign_in = use_sign_in();

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if pending.get_untracked() {
            return;
        }
        pending.set(true);
        error.set(None);

        let sign_in = sign_in.clone();
        spawn_local(async move {
            let outcome = Outcome::settle(login(email.get_untracked(), password.get_untracked()).await);
            error.set(sign_in(outcome));
            pending.set(false);
        });
    };

    view! {
        <section class="auth">
            <h1>"Log in"</h1>
            <form on:submit=submit>
                <input
                    type="email"
                    placeholder="Email"
                    prop:value=move || email.get()
                    on:input=move |ev| set_email.set(event_target_value(&ev))
                />
                <input
                    type="password"
                    placeholder="Password"
                    prop:value=move || password.get()
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                />
                <button type="submit" disabled=move || pending.get()>"Log in"</button>
            </form>
            {move || error.get().map(|message| view! { <p class="error">{message}</p> })}
            <p>"No account yet? " <A href="/register">"Sign up"</A></p>
        </section>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let (name, set_name) = create_signal(String::new());
    let (email, set_email) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (confirm, set_confirm) = create_signal(String::new());
    let error = create_rw_signal(None::<String>);
    let pending = create_rw_signal(false);
    let sign_in = use_sign_in();

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if pending.get_untracked() {
            return;
        }
        let (name, email, password) = (
            name.get_untracked(),
            email.get_untracked(),
            password.get_untracked(),
        );
        if let Err(message) = check_signup(&name, &email, &password, &confirm.get_untracked()) {
            error.set(Some(message));
            return;
        }
        pending.set(true);
        error.set(None);

        let sign_in = sign_in.clone();
        spawn_local(async move {
            let outcome = Outcome::settle(signup(email, password, name).await);
            error.set(sign_in(outcome));
            pending.set(false);
        });
    };

    view! {
        <section class="auth">
            <h1>"Create an account"</h1>
            <form on:submit=submit>
                <input
                    type="text"
                    placeholder="Name"
                    prop:value=move || name.get()
                    on:input=move |ev| set_name.set(event_target_value(&ev))
                />
                <input
                    type="email"
                    placeholder="Email"
                    prop:value=move || email.get()
                    on:input=move |ev| set_email.set(event_target_value(&ev))
                />
                <input
                    type="password"
                    placeholder="Password"
                    prop:value=move || password.get()
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                />
                <input
                    type="password"
                    placeholder="Confirm password"
                    prop:value=move || confirm.get()
                    on:input=move |ev| set_confirm.set(event_target_value(&ev))
                />
                <button type="submit" disabled=move || pending.get()>"Sign up"</button>
            </form>
            {move || error.get().map(|message| view! { <p class="error">{message}</p> })}
            <p>"Already registered? " <A href="/">"Log in"</A></p>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Ada", "ada@example.com", "pw", "pw", true)]
    #[case("Ada", "ada@example.com", "pw", "pW", false)]
    #[case(" ", "ada@example.com", "pw", "pw", false)]
    #[case("Ada", "", "pw", "pw", false)]
    #[case("Ada", "ada@example.com", "", "", false)]
    fn signup_form_is_checked_before_sending(
        #[case] name: &str,
        #[case] email: &str,
        #[case] password: &str,
        #[case] confirm: &str,
        #[case] ok: bool,
    ) {
        assert_eq!(check_signup(name, email, password, confirm).is_ok(), ok);
    }

    #[rstest]
    fn mismatched_passwords_are_named() {
        assert_eq!(
            check_signup("Ada", "a@b.c", "one", "two"),
            Err("Passwords do not match.".to_string())
        );
    }

    #[rstest]
    fn rejected_login_reads_as_bad_credentials() {
        assert_eq!(auth_error(Failure::Unauthorized), "Incorrect email or password.");
        assert_eq!(
            auth_error(Failure::Server {
                status: 409,
                detail: Some("Email already registered".into())
            }),
            "Email already registered"
        );
    }
}
