pub mod backend;
pub mod hooks;
pub mod pages;
pub mod server_fns;
pub mod session;
pub mod sync;
pub mod widgets;

use crate::error_template::{AppError, ErrorTemplate};
use leptos::*;
use leptos_meta::*;
use leptos_router::*;

use self::{
    pages::*,
    session::{provide_session, Role, SessionGuard},
    widgets::{provide_notices, Navbar, NoticeDialog},
};

#[component]
pub fn App() -> impl IntoView {
    // Provides context that manages stylesheets, titles, meta tags, etc.
    provide_meta_context();
    provide_session();
    provide_notices();

    view! {
        // id=leptos means cargo-leptos will hot-reload this stylesheet
        <Stylesheet id="leptos" href="/pkg/recipe-feed.css"/>

        <Title text="Recipe Feed"/>

        <Router fallback=|| {
            let mut outside_errors = Errors::default();
            outside_errors.insert_with_default_key(AppError::NotFound);
            view! {
                <ErrorTemplate outside_errors/>
            }
            .into_view()
        }>
            <Navbar/>
            <main>
                <Routes>
                    <Route path="" view=LoginPage/>
                    <Route path="register" view=RegisterPage/>
                    <Route path="feed" view=|| view! {
                        <SessionGuard allow=vec![Role::User]><FeedPage/></SessionGuard>
                    }/>
                    <Route path="posts/:id" view=|| view! {
                        <SessionGuard allow=vec![Role::User]><PostPage/></SessionGuard>
                    }/>
                    <Route path="bookmarks" view=|| view! {
                        <SessionGuard allow=vec![Role::User]><BookmarksPage/></SessionGuard>
                    }/>
                    <Route path="shopping-list" view=|| view! {
                        <SessionGuard allow=vec![Role::User]><ShoppingListPage/></SessionGuard>
                    }/>
                    <Route path="profile" view=|| view! {
                        <SessionGuard allow=vec![Role::User]><ProfilePage/></SessionGuard>
                    }/>
                    <Route path="generate" view=|| view! {
                        <SessionGuard allow=vec![Role::User]><GeneratePage/></SessionGuard>
                    }/>
                    <Route path="admin" view=|| view! {
                        <SessionGuard allow=vec![Role::Admin]><AdminPage/></SessionGuard>
                    }/>
                    <Route path="admin/upload" view=|| view! {
                        <SessionGuard allow=vec![Role::Admin]><UploadRecipePage/></SessionGuard>
                    }/>
                    <Route path="admin/edit/:id" view=|| view! {
                        <SessionGuard allow=vec![Role::Admin]><EditRecipePage/></SessionGuard>
                    }/>
                </Routes>
            </main>
            <NoticeDialog/>
        </Router>
    }
}
